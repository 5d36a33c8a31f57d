//! 错误类型定义
//!
//! 所有错误都是轮级别的：任何变体都不会终止进程，上层一律降级为尽力而为的文本回复。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),
}
