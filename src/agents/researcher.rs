//! 研究智能体
//!
//! 面向小众/异域手工艺：先让 LLM 判断哪种语言的检索结果最有用（如保加利亚
//! 蕾丝 → 保加利亚语），用该语言做 Web 搜索，再把结果总结成固定结构的
//! 新手向介绍。

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::{Agent, AgentReply};
use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::{format_labelled, Message};
use crate::tools::WebSearch;

const SUMMARY_PROMPT: &str = r#"You are a helpful craft researcher assistant. Using the search results below, write a beginner-friendly summary of the craft the user asked about.

Please follow this exact structure in your response:

=== What is it? ===
Explain what this craft is, where it comes from, and what makes it unique or culturally important.

=== Types or Styles (if relevant) ===
Briefly describe any subtypes, styles, or traditions within the craft (if they exist).

=== Materials Needed ===
List the essential tools or materials required to practice the craft.

=== How to Get Started ===
Explain how a beginner can start, with basic techniques or entry-level projects.

=== Cultural or Historical Context (optional) ===
Add interesting background info if available.

Keep the tone friendly and informative. DO NOT add any introduction or closing lines. Just return the structured content above."#;

/// 手工艺研究智能体
pub struct ResearcherAgent {
    llm: Arc<dyn LlmClient>,
    search: Arc<WebSearch>,
}

impl ResearcherAgent {
    pub fn new(llm: Arc<dyn LlmClient>, search: Arc<WebSearch>) -> Self {
        Self { llm, search }
    }

    /// 用 LLM 判断对该工艺最有用的检索语言，失败时退回英语
    async fn detect_search_language(&self, conversation: &str) -> String {
        let prompt = format!(
            "Given this conversation about a craft, determine which language would likely \
             return the most useful search results online for that craft.\n\
             Respond only with the name of the language (e.g. 'Bulgarian', 'Japanese', 'English').\n\n{}",
            conversation
        );
        match self.llm.complete(&[Message::user(prompt)]).await {
            Ok(lang) if !lang.trim().is_empty() => lang.trim().to_string(),
            _ => "English".to_string(),
        }
    }
}

#[async_trait]
impl Agent for ResearcherAgent {
    fn name(&self) -> &str {
        "craft_research_agent"
    }

    fn description(&self) -> &str {
        "researches traditional or exotic crafts (searching in the craft's language of origin if needed) and returns a structured beginner introduction"
    }

    async fn invoke(&self, history: &[Message]) -> Result<Vec<AgentReply>, AgentError> {
        let conversation = format_labelled(history);
        let language = self.detect_search_language(&conversation).await;
        tracing::debug!("researcher searching in language: {}", language);

        // 搜索查询由 LLM 生成（含目标语言的关键词）
        let query_prompt = format!(
            "Write one short web search query (in {}) to find introductory information \
             about the craft discussed here. Output only the query.\n\n{}",
            language, conversation
        );
        let query = self
            .llm
            .complete(&[Message::user(query_prompt)])
            .await
            .map_err(AgentError::LlmError)?;

        let results = match self.search.search(query.trim()).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("researcher web search failed: {}", e);
                "No results found.".to_string()
            }
        };

        let summary = self
            .llm
            .complete(&[
                Message::system(SUMMARY_PROMPT),
                Message::user(format!(
                    "Conversation:\n{}\n\nSearch results (may be in {}):\n{}",
                    conversation, language, results
                )),
            ])
            .await
            .map_err(AgentError::LlmError)?;

        if summary.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![AgentReply::text_reply(self.name(), summary.trim())])
    }
}
