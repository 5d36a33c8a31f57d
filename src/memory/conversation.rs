//! 对话历史
//!
//! 会话内只追加不删除；LLM 上下文需要时用 recent 取最近 N 轮，历史本身保持完整。

use serde::{Deserialize, Serialize};

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    System,
}

/// 单条消息
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// 对话历史：user/assistant 消息的有序序列，会话生命周期内单调增长
#[derive(Clone, Debug, Default)]
pub struct DialogueHistory {
    messages: Vec<Message>,
}

impl DialogueHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从上游 (user, assistant) 对构建历史
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut messages = Vec::with_capacity(pairs.len() * 2);
        for (user, assistant) in pairs {
            messages.push(Message::user(user.clone()));
            messages.push(Message::assistant(assistant.clone()));
        }
        Self { messages }
    }

    pub fn push(&mut self, msg: Message) {
        self.messages.push(msg);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// 最近 max_turns 轮（每轮约 user + assistant 两条），供 LLM 上下文使用
    pub fn recent(&self, max_turns: usize) -> &[Message] {
        let keep = max_turns * 2;
        if self.messages.len() > keep {
            &self.messages[self.messages.len() - keep..]
        } else {
            &self.messages
        }
    }

    /// 历史中已出现过的 assistant 文本（回复去重用）
    pub fn assistant_texts(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// 历史 → 带角色标签的行文本（抽取与智能体 prompt 共用格式）
pub fn format_labelled(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| {
            let label = match m.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
                Role::System => "System",
            };
            format!("{}: {}", label, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
