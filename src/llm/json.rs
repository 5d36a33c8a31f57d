//! 模型输出的 JSON 提取
//!
//! 模型常把 JSON 包在 ```json 围栏块里返回；先找围栏块，没有就把整段修剪后当 JSON。
//! 解析失败返回携带原文与细节的 JsonExtractError，调用方绝不会在这一层收到 panic。

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// 解析失败：保留原始输出与解析器细节，供日志与降级路径使用
#[derive(Debug, Error)]
#[error("Failed to parse JSON: {details}")]
pub struct JsonExtractError {
    pub raw: String,
    pub details: String,
}

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fence regex"))
}

/// 从模型输出中提取一个 JSON 对象
pub fn extract_json(response: &str) -> Result<Value, JsonExtractError> {
    let json_str = match fence_regex().captures(response) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(""),
        None => response.trim(),
    };

    serde_json::from_str(json_str).map_err(|e| JsonExtractError {
        raw: response.to_string(),
        details: e.to_string(),
    })
}
