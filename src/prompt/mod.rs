// src/prompt/mod.rs

mod builder;

pub use builder::{build_chat_prompt, CBT_SYSTEM_PROMPT};
