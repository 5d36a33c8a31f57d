//! Mock LLM 客户端（用于测试，无需 API）
//!
//! MockLlmClient 回显最后一条 User 消息；ScriptedLlmClient 按脚本顺序出队应答，
//! 便于测试覆盖抽取 / 分类 / 路由等多次调用的轮次流程。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::LlmClient;
use crate::memory::{Message, Role};

/// Mock 客户端：回显用户最后一条消息
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");

        Ok(format!("Echo from Mock: {}", last_user))
    }
}

/// 脚本化客户端：按入队顺序返回预设应答，耗尽后返回错误
pub struct ScriptedLlmClient {
    responses: Mutex<VecDeque<String>>,
    /// 记录每次调用收到的消息内容，供测试断言上下文传递
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedLlmClient {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, response: impl Into<String>) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(response.into());
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        let joined = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().expect("prompts lock").push(joined);

        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .ok_or_else(|| "scripted responses exhausted".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_echoes_last_user_message() {
        let llm = MockLlmClient;
        let msgs = [Message::assistant("earlier"), Message::user("knitting")];
        assert_eq!(llm.complete(&msgs).await.unwrap(), "Echo from Mock: knitting");
    }

    #[tokio::test]
    async fn test_scripted_client_pops_in_order() {
        let llm = ScriptedLlmClient::new(vec!["first", "second"]);
        let msgs = [Message::user("hi")];
        assert_eq!(llm.complete(&msgs).await.unwrap(), "first");
        assert_eq!(llm.complete(&msgs).await.unwrap(), "second");
        assert!(llm.complete(&msgs).await.is_err());
    }
}
