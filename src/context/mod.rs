//! Conversation context management
//!
//! Builds a bounded, prompt-ready view over a session's stored message
//! history. The context is a read-time projection rebuilt on every request;
//! messages themselves are immutable once written and arrive in insertion
//! order, which is the conversational order.

pub mod tokens;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CONFIG;
use crate::store::SqliteStore;

/// How many recent messages survive a summarization pass verbatim.
const SUMMARY_RECENT_KEEP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Label used when rendering the message into a prompt block.
    fn prompt_label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Counselor",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(anyhow::anyhow!("unknown message role: {other}")),
        }
    }
}

/// One conversational turn. Created once by the turn that produced it and
/// immutable afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

/// Request-scoped projection of a session's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    pub session_id: String,
    pub messages: Vec<ConversationMessage>,
    pub total_tokens: usize,
}

/// Assembles conversation contexts from the message store.
pub struct ContextManager {
    store: SqliteStore,
    max_messages: usize,
}

impl ContextManager {
    pub fn new(store: SqliteStore) -> Self {
        Self {
            store,
            max_messages: CONFIG.max_context_messages,
        }
    }

    pub fn with_cap(store: SqliteStore, max_messages: usize) -> Self {
        Self { store, max_messages }
    }

    /// Build the context projection for a session: stored messages in
    /// insertion order, reduced to the configured window, with an estimated
    /// token total.
    pub async fn conversation_context(&self, session_id: &str) -> Result<ConversationContext> {
        let messages = self.store.load_messages(session_id).await?;
        let windowed = truncate_to_window(messages, self.max_messages);
        let total_tokens = tokens::total_tokens(&windowed);

        debug!(
            session = session_id,
            messages = windowed.len(),
            total_tokens,
            "assembled conversation context"
        );

        Ok(ConversationContext {
            session_id: session_id.to_string(),
            messages: windowed,
            total_tokens,
        })
    }
}

/// Apply the message-count window: keep the most recent `cap` messages and
/// always keep the session's very first message (the conversational anchor),
/// prepended when it fell outside the recent window.
pub fn truncate_to_window(
    messages: Vec<ConversationMessage>,
    cap: usize,
) -> Vec<ConversationMessage> {
    if messages.len() <= cap {
        return messages;
    }

    let anchor = messages[0].clone();
    let mut kept: Vec<ConversationMessage> = messages[messages.len() - cap..].to_vec();
    kept.insert(0, anchor);
    kept
}

/// Render the context into a prompt-insertable text block: one line per
/// message between instructional markers. An empty history renders to an
/// empty string so callers can cheaply detect "no context available".
pub fn render_for_prompt(context: &ConversationContext) -> String {
    if context.messages.is_empty() {
        return String::new();
    }

    let mut block = String::from("\n\nPrevious conversation:\n");
    for message in &context.messages {
        block.push_str(&format!(
            "[{}]: {}\n",
            message.role.prompt_label(),
            message.content
        ));
    }
    block.push_str("\nConsider the conversation context above when responding.\n");
    block
}

/// Whether the context has outgrown the token budget.
pub fn is_context_too_long(context: &ConversationContext) -> bool {
    context.total_tokens > tokens::MAX_TOKENS
}

/// Compress an over-budget context: the most recent messages survive
/// verbatim and everything older collapses into one synthetic
/// assistant-authored summary line, prepended before the retained tail.
pub fn summarize_long_context(context: ConversationContext) -> ConversationContext {
    if !is_context_too_long(&context) {
        return context;
    }

    let split = context.messages.len().saturating_sub(SUMMARY_RECENT_KEEP);
    if split == 0 {
        return context;
    }

    let (older, recent) = context.messages.split_at(split);
    let summary = ConversationMessage {
        role: Role::Assistant,
        content: summarize_messages(older),
    };

    let mut messages = Vec::with_capacity(recent.len() + 1);
    messages.push(summary);
    messages.extend_from_slice(recent);

    let total_tokens = tokens::total_tokens(&messages);
    ConversationContext {
        session_id: context.session_id,
        messages,
        total_tokens,
    }
}

/// Deterministic description of a replaced span of conversation.
fn summarize_messages(messages: &[ConversationMessage]) -> String {
    let user_turns = messages.iter().filter(|m| m.role == Role::User).count();
    let assistant_turns = messages.len() - user_turns;

    format!(
        "[Earlier conversation summary] The user sent {user_turns} messages and the counselor \
         gave {assistant_turns} responses, mostly about the user's emotional state and everyday \
         stress."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(role: Role, content: &str) -> ConversationMessage {
        ConversationMessage {
            role,
            content: content.to_string(),
        }
    }

    fn context(messages: Vec<ConversationMessage>) -> ConversationContext {
        let total_tokens = tokens::total_tokens(&messages);
        ConversationContext {
            session_id: "session-1".to_string(),
            messages,
            total_tokens,
        }
    }

    #[test]
    fn test_window_keeps_anchor_plus_recent() {
        let messages: Vec<ConversationMessage> = (0..25)
            .map(|i| message(Role::User, &format!("message {i}")))
            .collect();

        let windowed = truncate_to_window(messages, 20);
        assert_eq!(windowed.len(), 21);
        assert_eq!(windowed[0].content, "message 0");
        assert_eq!(windowed[1].content, "message 5");
        assert_eq!(windowed[20].content, "message 24");
    }

    #[test]
    fn test_window_noop_under_cap() {
        let messages: Vec<ConversationMessage> = (0..5)
            .map(|i| message(Role::User, &format!("message {i}")))
            .collect();
        let windowed = truncate_to_window(messages.clone(), 20);
        assert_eq!(windowed.len(), 5);
    }

    #[test]
    fn test_render_empty_history_is_empty_string() {
        let rendered = render_for_prompt(&context(Vec::new()));
        assert_eq!(rendered, "");
    }

    #[test]
    fn test_render_format() {
        let rendered = render_for_prompt(&context(vec![
            message(Role::User, "I had a rough day"),
            message(Role::Assistant, "Tell me more about it"),
        ]));
        assert!(rendered.contains("[User]: I had a rough day\n"));
        assert!(rendered.contains("[Counselor]: Tell me more about it\n"));
        assert!(rendered.starts_with("\n\nPrevious conversation:"));
        assert!(rendered.trim_end().ends_with("when responding."));
    }

    #[test]
    fn test_summarize_under_budget_is_noop() {
        let ctx = context(vec![message(Role::User, "short")]);
        let summarized = summarize_long_context(ctx.clone());
        assert_eq!(summarized.messages.len(), ctx.messages.len());
    }

    #[test]
    fn test_summarize_replaces_older_messages() {
        // 15 messages, each large enough that the total tops the budget.
        let big = "x".repeat(250_000);
        let messages: Vec<ConversationMessage> = (0..15)
            .map(|i| {
                message(
                    if i % 2 == 0 { Role::User } else { Role::Assistant },
                    &format!("{i} {big}"),
                )
            })
            .collect();
        let ctx = context(messages);
        assert!(is_context_too_long(&ctx));

        let summarized = summarize_long_context(ctx);
        assert_eq!(summarized.messages.len(), 11);
        assert_eq!(summarized.messages[0].role, Role::Assistant);
        assert!(summarized.messages[0]
            .content
            .starts_with("[Earlier conversation summary]"));
        // The 3 user / 2 assistant turns of the replaced span are counted.
        assert!(summarized.messages[0].content.contains("3 messages"));
        assert!(summarized.messages[0].content.contains("2 responses"));
        assert!(summarized.messages[1].content.starts_with("5 "));
    }
}
