//! One function-calling round trip that picks what to do with a message.

use askama::Template;
use tracing::{error, instrument, warn};

use crate::llm::{CompletionRequest, LanguageModel, LlmError, tools::assistant_tools};

use super::actions::Action;

/// Reply when no model API key is configured.
pub const NO_MODEL_REPLY: &str =
    "I can't connect to my brain right now. Please check the API key configuration.";

/// Reply when the model call fails for any other reason.
pub const MODEL_FAILURE_REPLY: &str =
    "I ran into an issue thinking that through. Please try again in a moment.";

const ROUTER_TEMPERATURE: f32 = 0.0;

#[derive(Template)]
#[template(path = "assistant/system_prompt.txt")]
struct SystemPrompt<'a> {
    snapshot: &'a str,
}

/// What the model decided.
#[derive(Debug, Clone, PartialEq)]
pub struct Routing {
    /// Text the model produced alongside (or instead of) a tool call.
    pub content: String,
    /// The chosen action; `None` means answer with `content` directly.
    pub action: Option<Action>,
}

impl Routing {
    fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            action: None,
        }
    }
}

/// Build the system prompt around a business snapshot.
#[must_use]
pub fn system_prompt(snapshot: &str) -> String {
    SystemPrompt { snapshot }.render().unwrap_or_else(|e| {
        warn!(error = %e, "System prompt failed to render; sending snapshot only");
        snapshot.to_owned()
    })
}

/// Route a merchant message. Never fails: model errors become canned text.
///
/// Only the first tool call is honoured.
#[instrument(skip_all, fields(message_len = message.len()))]
pub async fn route<M: LanguageModel>(model: &M, message: &str, snapshot: &str) -> Routing {
    let request = CompletionRequest::new(system_prompt(snapshot), message)
        .with_tools(assistant_tools())
        .with_temperature(ROUTER_TEMPERATURE);

    match model.complete(request).await {
        Ok(completion) => {
            let content = completion.text_or_empty().to_owned();
            let action = completion.tool_calls.first().map(Action::from_tool_call);
            if completion.tool_calls.len() > 1 {
                warn!(count = completion.tool_calls.len(), "Ignoring extra tool calls");
            }
            Routing { content, action }
        }
        Err(LlmError::MissingApiKey) => Routing::text(NO_MODEL_REPLY),
        Err(e) => {
            error!(error = %e, "Assistant model call failed");
            Routing::text(MODEL_FAILURE_REPLY)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_leads_with_snapshot() {
        let prompt = system_prompt("### LIVE BUSINESS SNAPSHOT\nStore: Glow");
        assert!(prompt.starts_with("### LIVE BUSINESS SNAPSHOT\nStore: Glow"));
        assert!(prompt.contains("Mona"));
    }
}
