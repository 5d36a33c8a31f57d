//! 结构化意图抽取
//!
//! 把累积对话变成 {project, craft, experience_level, query} 四键记录。
//! 一次完成调用 + 共享 JSON 提取；解析失败也要产出全键的默认记录并带错误
//! 标记，抽取失败绝不中断本轮。

use std::sync::Arc;

use serde::Deserialize;

use crate::llm::{extract_json, LlmClient};
use crate::memory::{format_labelled, Message};

const EXTRACT_PROMPT: &str = r#"You read a conversation between a user and a craft-learning assistant. Extract what is currently known.

Return ONLY a JSON object with exactly these four keys (use "" when unknown):
- "project": the concrete project the user wants to make (e.g. "scarf", "paper crane")
- "craft": the craft involved (e.g. "knitting", "origami")
- "experience_level": one of "beginner", "intermediate", "advanced", or ""
- "query": a short topic phrase of at most 3 words for what the user is asking about right now (e.g. "casting on")"#;

const ALLOWED_LEVELS: [&str; 3] = ["beginner", "intermediate", "advanced"];

/// 抽取结果：四个键永远齐全（可为空串），不允许缺键
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractionResult {
    pub project: String,
    pub craft: String,
    pub experience_level: String,
    pub query: String,
    /// 错误标记：解析失败时携带细节，不参与序列化
    #[serde(skip)]
    pub error: Option<String>,
}

impl ExtractionResult {
    fn failed(details: impl Into<String>) -> Self {
        Self {
            error: Some(details.into()),
            ..Default::default()
        }
    }

    /// 收紧 experience_level 到允许集合，其余归一为空串
    fn normalize(mut self) -> Self {
        let level = self.experience_level.trim().to_lowercase();
        self.experience_level = if ALLOWED_LEVELS.contains(&level.as_str()) {
            level
        } else {
            String::new()
        };
        self
    }
}

/// 结构化意图抽取器
pub struct IntentExtractor {
    llm: Arc<dyn LlmClient>,
}

impl IntentExtractor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// 从对话历史抽取四键记录；任何失败都降级为默认记录 + 错误标记
    pub async fn extract(&self, history: &[Message]) -> ExtractionResult {
        let messages = vec![
            Message::system(EXTRACT_PROMPT),
            Message::user(format_labelled(history)),
        ];

        let raw = match self.llm.complete(&messages).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("extraction completion failed: {}", e);
                return ExtractionResult::failed(e);
            }
        };

        match extract_json(&raw) {
            Ok(value) => match serde_json::from_value::<ExtractionResult>(value) {
                Ok(result) => result.normalize(),
                Err(e) => {
                    tracing::warn!("extraction shape mismatch: {}", e);
                    ExtractionResult::failed(e.to_string())
                }
            },
            Err(e) => {
                tracing::warn!("extraction returned non-JSON output: {}", e.details);
                ExtractionResult::failed(e.details)
            }
        }
    }
}
