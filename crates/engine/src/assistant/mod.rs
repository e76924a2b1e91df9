//! The merchant-facing chat assistant.
//!
//! A message flows through three steps:
//!
//! 1. [`crate::intelligence::build_snapshot`] summarizes the tenant's store.
//! 2. [`router::route`] makes one function-calling request and parses the
//!    chosen tool into an [`Action`].
//! 3. [`Dispatcher`] runs the action and builds the [`ChatReply`].

pub mod actions;
pub mod dispatcher;
pub mod reply;
pub mod router;

pub use actions::Action;
pub use dispatcher::{DispatchError, Dispatcher, Outcome};
pub use reply::{Branding, ChatReply, Widget};
pub use router::{Routing, route};

use sqlx::SqlitePool;
use tracing::{error, info, instrument};

use mona_core::TenantId;

use crate::intelligence::build_snapshot;
use crate::llm::LanguageModel;
use crate::services::NotificationService;

/// Reply when an action fails unexpectedly.
pub const ACTION_FAILURE_REPLY: &str =
    "I ran into an issue with that request. Please try again.";

/// Chat entry point bound to a pool, a model, and the notification queue.
pub struct Assistant<'a, M> {
    pool: &'a SqlitePool,
    model: &'a M,
    notifications: &'a NotificationService,
}

impl<'a, M: LanguageModel> Assistant<'a, M> {
    #[must_use]
    pub const fn new(
        pool: &'a SqlitePool,
        model: &'a M,
        notifications: &'a NotificationService,
    ) -> Self {
        Self {
            pool,
            model,
            notifications,
        }
    }

    /// Answer one merchant message.
    ///
    /// Never fails. Dispatch errors are logged and replaced by
    /// [`ACTION_FAILURE_REPLY`]. Queued notifications for the tenant are
    /// drained into the reply.
    #[instrument(skip(self, message), fields(user_id = ?tenant, tool = tracing::field::Empty))]
    pub async fn handle(&self, message: &str, tenant: Option<&TenantId>) -> ChatReply {
        let snapshot = build_snapshot(self.pool, tenant).await;
        let routing = route(self.model, message, &snapshot).await;

        let mut reply = match routing.action {
            None => ChatReply::text(routing.content),
            Some(action) => {
                let tool = action.tool_name().to_owned();
                tracing::Span::current().record("tool", tool.as_str());
                info!("Dispatching assistant action");

                let outcome = Dispatcher::new(self.pool, self.model, tenant)
                    .dispatch(action, message, &snapshot, &routing.content)
                    .await;
                let reply = match outcome {
                    Ok(outcome) => outcome.unwrap_or_else(ChatReply::text),
                    Err(e) => {
                        error!(error = %e, "Assistant action failed");
                        ChatReply::text(ACTION_FAILURE_REPLY)
                    }
                };
                ChatReply {
                    tool: Some(tool),
                    ..reply
                }
            }
        };

        if let Some(tenant) = tenant {
            reply.notifications = self.notifications.drain(tenant);
        }
        reply
    }
}
