//! 导师智能体
//!
//! 解释手工艺术语、对项目给出指导；可搜索网上的图文教程作为依据。
//! 不编造视频链接（视频由监督路由器的查找流程负责）。

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::{Agent, AgentReply};
use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::{format_labelled, Message};
use crate::tools::WebSearch;

const MENTOR_PROMPT: &str = r#"You are Craft Mentor. Your job is to help the user understand specific craft terminology and offer guidance on their craft project, grounded in the written tutorials found below.
Do not make up YouTube links or video references; only cite the written tutorials you were given."#;

/// 指导与术语答疑智能体
pub struct MentorAgent {
    llm: Arc<dyn LlmClient>,
    search: Arc<WebSearch>,
}

impl MentorAgent {
    pub fn new(llm: Arc<dyn LlmClient>, search: Arc<WebSearch>) -> Self {
        Self { llm, search }
    }
}

#[async_trait]
impl Agent for MentorAgent {
    fn name(&self) -> &str {
        "mentor_agent"
    }

    fn description(&self) -> &str {
        "explains craft terminology and gives project guidance, backed by written tutorials found online"
    }

    async fn invoke(&self, history: &[Message]) -> Result<Vec<AgentReply>, AgentError> {
        let conversation = format_labelled(history);

        let query_prompt = format!(
            "Write one short web search query for written tutorials that would help answer \
             the user's latest question below. Output only the query.\n\n{}",
            conversation
        );
        let query = self
            .llm
            .complete(&[Message::user(query_prompt)])
            .await
            .map_err(AgentError::LlmError)?;

        let tutorials = match self.search.search(query.trim()).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("mentor tutorial search failed: {}", e);
                "No results found.".to_string()
            }
        };

        let answer = self
            .llm
            .complete(&[
                Message::system(MENTOR_PROMPT),
                Message::user(format!(
                    "Conversation:\n{}\n\nWritten tutorials found:\n{}",
                    conversation, tutorials
                )),
            ])
            .await
            .map_err(AgentError::LlmError)?;

        if answer.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![AgentReply::text_reply(self.name(), answer.trim())])
    }
}
