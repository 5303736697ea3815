// src/context/tokens.rs
//
// Approximate token accounting without a real tokenizer. The downstream
// generator tokenizes for itself; this only has to keep prompts safely
// under its limit, so a chars/4 heuristic with a safety margin is enough.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ConversationMessage;

/// Token ceiling of the downstream generation model.
pub const MAX_TOKENS: usize = 800_000;

/// Fraction of the ceiling held back as a safety margin.
pub const SAFETY_MARGIN: f64 = 0.1;

/// Messages shorter than this are dropped instead of truncated further.
const MIN_TRUNCATED_CHARS: usize = 50;

/// Approximate characters per token.
const CHARS_PER_TOKEN: usize = 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub estimated_tokens: usize,
    pub max_tokens: usize,
    pub is_over_limit: bool,
    pub truncation_needed: bool,
}

/// Estimate the token cost of a text: ceil(chars / 4).
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Total estimated tokens across a message list.
pub fn total_tokens(messages: &[ConversationMessage]) -> usize {
    messages.iter().map(|m| estimate_tokens(&m.content)).sum()
}

/// Analyze current usage against the budget. Truncation is flagged well
/// before the hard limit so reduction happens ahead of a rejected request.
pub fn analyze_tokens(current_tokens: usize) -> TokenInfo {
    let max_allowed = (MAX_TOKENS as f64 * (1.0 - SAFETY_MARGIN)).floor() as usize;

    TokenInfo {
        estimated_tokens: current_tokens,
        max_tokens: max_allowed,
        is_over_limit: current_tokens > max_allowed,
        truncation_needed: current_tokens as f64 > max_allowed as f64 * 0.8,
    }
}

/// Strategic truncation down to a target token count.
///
/// Keeps the first message (the conversational anchor), then admits the most
/// recent messages newest-first while they fit, then shrinks message bodies
/// if the set still overflows. Running this on an already-fitting list is a
/// no-op, so repeated application is stable.
pub fn smart_truncate(
    messages: &[ConversationMessage],
    target_tokens: usize,
) -> Vec<ConversationMessage> {
    if messages.is_empty() {
        return Vec::new();
    }

    let current = total_tokens(messages);
    if current <= target_tokens {
        return messages.to_vec();
    }

    let anchor = &messages[0];
    let mut used = estimate_tokens(&anchor.content);

    // Admit recent messages newest-first; stop at the first one that
    // would push past the target.
    let mut kept_recent: Vec<&ConversationMessage> = Vec::new();
    for message in messages[1..].iter().rev() {
        let cost = estimate_tokens(&message.content);
        if used + cost > target_tokens {
            break;
        }
        used += cost;
        kept_recent.push(message);
    }

    let mut result: Vec<ConversationMessage> = Vec::with_capacity(kept_recent.len() + 1);
    result.push(anchor.clone());
    result.extend(kept_recent.into_iter().rev().cloned());

    // The greedy pass can only overflow when the anchor alone is too large;
    // shrink bodies to what the remaining budget allows.
    if total_tokens(&result) > target_tokens {
        result = shrink_messages(&result, target_tokens);
    }

    debug!(
        "messages truncated: {} -> {} entries",
        messages.len(),
        result.len()
    );

    result
}

/// Shrink message bodies to fit the target: each message gets the remaining
/// budget in characters; too-small allowances drop the message entirely.
fn shrink_messages(
    messages: &[ConversationMessage],
    target_tokens: usize,
) -> Vec<ConversationMessage> {
    let mut result = Vec::new();
    let mut used = 0usize;

    for message in messages {
        let mut content = message.content.clone();
        let mut cost = estimate_tokens(&content);

        if used + cost > target_tokens {
            let allowed_chars = target_tokens.saturating_sub(used) * CHARS_PER_TOKEN;
            if allowed_chars <= MIN_TRUNCATED_CHARS {
                continue;
            }
            content = format!(
                "{}...",
                content.chars().take(allowed_chars).collect::<String>()
            );
            cost = estimate_tokens(&content);
        }

        result.push(ConversationMessage {
            content,
            ..message.clone()
        });
        used += cost;

        if used >= target_tokens {
            break;
        }
    }

    result
}

/// Reduce a message list only when the budget analysis calls for it.
pub fn optimize_context_window(messages: Vec<ConversationMessage>) -> Vec<ConversationMessage> {
    let info = analyze_tokens(total_tokens(&messages));
    if info.truncation_needed {
        debug!(
            "context window optimization needed: current {}, max {}",
            info.estimated_tokens, info.max_tokens
        );
        return smart_truncate(&messages, info.max_tokens);
    }
    messages
}
