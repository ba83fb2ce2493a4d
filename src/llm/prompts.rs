use super::ChatMessage;

const COMMIT_INSTRUCTIONS: &str = r#"You are a Git commit message assistant.
You will receive the output of `git diff` and must answer with a commit message for it.
Rules:
- Start with a summary line under 50 characters, no formatting.
- Follow with a short body explaining what changed and why, when the diff warrants one.
- Describe the intent of the change, not the mechanics the diff already shows.
- If something is new, call it 'Introduced', not 'Refactored' unless it was refactored.
- If it fixes broken or incomplete behavior, prefer 'Fixed' or 'Refined'.
- Avoid generic terms like 'update' or 'improve' unless strictly accurate.
- Mention repetitive changes (like renames) only once instead of repeating them per file.
- Do not narrate your thought process and do not wrap the answer in code fences.
  The response must contain the commit message and nothing else."#;

/// The fixed instruction prefix every prompt starts from.
pub fn init_messages(language: &str) -> Vec<ChatMessage> {
    let mut instructions = COMMIT_INSTRUCTIONS.to_owned();
    instructions.push_str(&format!("\n- Write the commit message in {language}."));
    vec![ChatMessage::system(instructions)]
}

/// Priority rule appended before user-supplied context: the context wins over
/// the instructions above when they conflict, but the output contract holds.
pub const CONTEXT_PRIORITY_RULE: &str = "The next user message contains additional context \
supplied by the author of the change. When it conflicts with earlier instructions, the \
author's context takes priority. The output contract is unchanged: respond with the commit \
message only, in the configured language.";

pub fn user_context_message(context: &str) -> String {
    format!(
        "Additional context for the changes, between the markers:\n\
         ---BEGIN CONTEXT---\n\
         {context}\n\
         ---END CONTEXT---\n\
         Preserve literal identifiers such as ticket or issue numbers exactly as written \
         and weave them into the commit message where appropriate."
    )
}

pub fn history_message(history: &str) -> String {
    format!(
        "Recent git commit history (git log --oneline). Use it only as style reference, \
         do not copy it blindly:\n{history}"
    )
}
