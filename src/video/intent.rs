//! 视频意图分类
//!
//! 只看本轮最新输入做一次 yes/no 分类，不看完整历史：
//! 旧消息里已经满足过的视频请求不应在无关的新输入上再次触发。
//! prompt 明确偏向 "no"：没有明说要视频就判否；LLM 出错同样判否。

use std::sync::Arc;

use crate::llm::LlmClient;
use crate::memory::Message;

const CLASSIFY_PROMPT: &str = r#"You are a strict binary classifier. Decide whether the user's message explicitly asks for a video or video tutorial.

Rules:
- Answer "yes" ONLY if the message explicitly requests a video, video tutorial, or something to watch.
- If the message does not explicitly ask for a video, the answer MUST be "no".
- Mentioning a craft, project, or asking for instructions in general is NOT a video request.

Output exactly one word: yes or no."#;

/// 视频意图分类器：无跨轮状态
pub struct VideoIntentClassifier {
    llm: Arc<dyn LlmClient>,
}

impl VideoIntentClassifier {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// 最新用户输入是否明确要求视频
    pub async fn wants_video(&self, latest_message: &str) -> bool {
        let messages = vec![
            Message::system(CLASSIFY_PROMPT),
            Message::user(format!("User message: {}", latest_message)),
        ];

        match self.llm.complete(&messages).await {
            Ok(response) => response.trim().to_lowercase().starts_with("yes"),
            Err(e) => {
                tracing::warn!("video intent classification failed, defaulting to no: {}", e);
                false
            }
        }
    }
}
