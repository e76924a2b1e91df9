//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::EngineConfig;
use crate::llm::{ChatClient, LlmError};
use crate::services::NotificationService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: EngineConfig,
    pool: SqlitePool,
    llm: ChatClient,
    notifications: NotificationService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The notification poller is not started here; call
    /// [`NotificationService::start`] once the server is ready.
    ///
    /// # Errors
    ///
    /// Returns an error if the LLM HTTP client cannot be built.
    pub fn new(config: EngineConfig, pool: SqlitePool) -> Result<Self, LlmError> {
        let llm = ChatClient::new(&config.llm)?;
        let notifications = NotificationService::new(config.notifications.queue_capacity);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                llm,
                notifications,
            }),
        })
    }

    /// Get a reference to the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the chat-completions client.
    #[must_use]
    pub fn llm(&self) -> &ChatClient {
        &self.inner.llm
    }

    /// Get a reference to the per-tenant notification queue.
    #[must_use]
    pub fn notifications(&self) -> &NotificationService {
        &self.inner.notifications
    }
}
