//! Language model integration.
//!
//! [`LanguageModel`] is the seam between the assistant and the hosted model:
//! production uses [`ChatClient`], tests substitute a scripted model.

pub mod client;
pub mod error;
pub mod tools;
pub mod types;

pub use client::ChatClient;
pub use error::LlmError;
pub use types::{Completion, CompletionRequest, Message, Role, ToolCall, ToolDefinition};

/// A chat model that can answer or request a tool call.
pub trait LanguageModel: Send + Sync {
    /// Run one completion.
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<Completion, LlmError>> + Send;
}

impl<T: LanguageModel> LanguageModel for &T {
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<Completion, LlmError>> + Send {
        (**self).complete(request)
    }
}
