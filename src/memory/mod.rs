//! 会话记忆：对话历史（追加写，按会话独占）

pub mod conversation;

pub use conversation::{format_labelled, DialogueHistory, Message, Role};
