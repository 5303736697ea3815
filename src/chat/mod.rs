//! Chat turn orchestration
//!
//! One counseling turn: assemble the session's bounded context, reduce it to
//! the token budget, build the prompt, call the generator, parse the reply,
//! and persist both sides of the exchange. Generation failures degrade to a
//! canned supportive reply; they never fail the turn.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::context::{self, tokens, ContextManager, ConversationContext, Role};
use crate::llm::{extract_json_object, TextGenerator};
use crate::prompt;
use crate::store::SqliteStore;

/// Emotion metadata the generator attaches to its reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyEmotionAnalysis {
    pub primary_emotion: String,
    pub confidence: f64,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// One completed counseling turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion_analysis: Option<ReplyEmotionAnalysis>,
    pub timestamp: DateTime<Utc>,
}

pub struct ChatService {
    store: SqliteStore,
    context: ContextManager,
    generator: Arc<dyn TextGenerator>,
}

impl ChatService {
    pub fn new(store: SqliteStore, generator: Arc<dyn TextGenerator>) -> Self {
        let context = ContextManager::new(store.clone());
        Self { store, context, generator }
    }

    /// Run one counseling turn for a session.
    pub async fn respond(&self, session_id: &str, message: &str) -> Result<ChatReply> {
        let ctx = self.context.conversation_context(session_id).await?;
        let ctx = self.bounded_context(ctx);
        let conversation_block = context::render_for_prompt(&ctx);

        let prompt = prompt::build_chat_prompt(message, &conversation_block, None);

        let reply = match self.generator.generate(&prompt).await {
            Ok(response) => parse_reply(&response),
            Err(e) => {
                warn!("chat generation failed, using fallback reply: {e}");
                fallback_reply()
            }
        };

        self.store.save_message(session_id, Role::User, message).await?;
        self.store
            .save_message(session_id, Role::Assistant, &reply.content)
            .await?;

        Ok(reply)
    }

    /// Apply the token budget to a projection: summarize when over the hard
    /// limit, then strategically truncate if usage still calls for it.
    fn bounded_context(&self, ctx: ConversationContext) -> ConversationContext {
        let ctx = context::summarize_long_context(ctx);

        let messages = tokens::optimize_context_window(ctx.messages);
        let total_tokens = tokens::total_tokens(&messages);
        if total_tokens != ctx.total_tokens {
            debug!(
                session = ctx.session_id.as_str(),
                total_tokens, "context reduced to token budget"
            );
        }

        ConversationContext {
            session_id: ctx.session_id,
            messages,
            total_tokens,
        }
    }
}

/// Parse the generator's `{content, emotionAnalysis}` reply. Any shape
/// problem degrades to using the raw text, and an empty raw text degrades to
/// the canned fallback.
fn parse_reply(response: &str) -> ChatReply {
    if let Ok(value) = extract_json_object(response) {
        if let Some(content) = value.get("content").and_then(|c| c.as_str()) {
            let emotion_analysis = value
                .get("emotionAnalysis")
                .and_then(|ea| serde_json::from_value(ea.clone()).ok());
            return ChatReply {
                content: content.to_string(),
                emotion_analysis,
                timestamp: Utc::now(),
            };
        }
    }

    if response.trim().is_empty() {
        return fallback_reply();
    }

    ChatReply {
        content: response.trim().to_string(),
        emotion_analysis: None,
        timestamp: Utc::now(),
    }
}

fn fallback_reply() -> ChatReply {
    ChatReply {
        content: "I'm sorry, something went wrong while forming a response. \
                  Could you tell me again how you are feeling right now?"
            .to_string(),
        emotion_analysis: None,
        timestamp: Utc::now(),
    }
}
