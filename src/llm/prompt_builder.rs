use super::prompts;
use super::{ChatMessage, Role};

/// Build the ordered message sequence for a commit-message completion.
///
/// The order is a contract: instruction prefix, then the priority rule plus
/// the wrapped user context (when present), then the history block (when
/// present), then the diff itself as the final user message, unwrapped.
pub fn assemble(
    diff: &str,
    user_context: Option<&str>,
    history: Option<&str>,
    language: &str,
) -> Vec<ChatMessage> {
    let mut messages = prompts::init_messages(language);

    if let Some(context) = user_context {
        messages.push(ChatMessage::system(prompts::CONTEXT_PRIORITY_RULE));
        messages.push(ChatMessage::user(prompts::user_context_message(context)));
    }

    if let Some(history) = history {
        messages.push(ChatMessage::user(prompts::history_message(history)));
    }

    messages.push(ChatMessage::user(diff));
    messages
}
