//! LLM 客户端抽象与实现

pub mod json;
pub mod mock;
pub mod openai;
pub mod traits;

pub use json::{extract_json, JsonExtractError};
pub use mock::{MockLlmClient, ScriptedLlmClient};
pub use openai::OpenAiClient;
pub use traits::LlmClient;
