//! Integration test support for the Mona engine.
//!
//! Every test gets its own in-memory SQLite database with migrations
//! applied, and the language model is replaced by [`ScriptedModel`].
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mona-integration-tests
//! ```

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use mona_core::{Money, TenantId};
use mona_engine::config::EngineConfig;
use mona_engine::db::{self, ProductRepository};
use mona_engine::llm::{Completion, CompletionRequest, LanguageModel, LlmError};
use mona_engine::models::{NewProduct, Product};

/// A fresh, migrated in-memory database.
///
/// A single connection keeps every query on the same in-memory database.
pub async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid sqlite url")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");
    db::migrate(&pool).await.expect("Failed to run migrations");
    pool
}

/// Parse a tenant id.
#[must_use]
pub fn tenant(id: &str) -> TenantId {
    TenantId::parse(id).expect("valid tenant id")
}

/// Parse a naira amount.
#[must_use]
pub fn naira(amount: &str) -> Money {
    Money::parse(amount).expect("valid amount")
}

/// Insert one product for `tenant`.
pub async fn add_product(
    pool: &SqlitePool,
    tenant: &TenantId,
    name: &str,
    price: &str,
    stock: i64,
) -> Product {
    ProductRepository::new(pool, Some(tenant))
        .create(&NewProduct::new(name, naira(price)).with_stock(stock))
        .await
        .expect("Failed to insert product")
}

/// Engine configuration built from explicit variables only.
#[must_use]
pub fn test_config(vars: &[(&str, &str)]) -> EngineConfig {
    let vars: Vec<(String, String)> = vars
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    EngineConfig::from_lookup(move |key| {
        vars.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    })
    .expect("valid test configuration")
}

/// A language model that replays canned completions in order.
///
/// Once the script runs out every call fails with
/// [`LlmError::MissingApiKey`], which the engine treats as "no model".
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<Completion, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    /// Replay `replies`, then behave as unconfigured.
    #[must_use]
    pub fn new(replies: impl IntoIterator<Item = Completion>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            requests: Mutex::default(),
        }
    }

    /// A model that is never configured.
    #[must_use]
    pub fn offline() -> Self {
        Self::default()
    }

    /// Queue an error as the next reply.
    #[must_use]
    pub fn then_fail(self, error: LlmError) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(error));
        self
    }

    /// Requests seen so far.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LanguageModel for ScriptedModel {
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<Completion, LlmError>> + Send {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(Err(LlmError::MissingApiKey));
        std::future::ready(reply)
    }
}
