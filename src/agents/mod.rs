//! 能力智能体
//!
//! 所有智能体实现 Agent trait（name / description / invoke），由监督路由器
//! 按注册顺序严格串行调用；invoke 收到的是累积中的完整转录，返回零条或多条
//! AgentReply。智能体内部可再调用嵌套工具能力（搜索 / 地理编码等）。

pub mod mentor;
pub mod researcher;
pub mod shopper;

use async_trait::async_trait;

use crate::core::AgentError;
use crate::memory::Message;

pub use mentor::MentorAgent;
pub use researcher::ResearcherAgent;
pub use shopper::ShopperAgent;

/// 单轮内产生即消费的智能体回复
#[derive(Debug, Clone)]
pub struct AgentReply {
    pub agent_name: String,
    pub text: String,
    /// 交接/控制消息：永远不能出现在最终用户回复里
    pub is_control_message: bool,
}

impl AgentReply {
    pub fn text_reply(agent_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            text: text.into(),
            is_control_message: false,
        }
    }

    pub fn control(agent_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            text: text.into(),
            is_control_message: true,
        }
    }
}

/// 能力智能体契约：接受对话历史，返回零条或多条回复
#[async_trait]
pub trait Agent: Send + Sync {
    /// 注册名（路由决策中引用）
    fn name(&self) -> &str;

    /// 能力描述（拼进监督路由 prompt）
    fn description(&self) -> &str;

    async fn invoke(&self, history: &[Message]) -> Result<Vec<AgentReply>, AgentError>;
}
