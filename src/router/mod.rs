//! 监督路由器
//!
//! 每个用户轮执行一次的控制序列：
//! AwaitingInput → Extracting → (VideoLookup)? → Delegating → Assembling。
//! 抽取更新会话 CraftState；视频意图为真时先做查找并把结果作为 assistant
//! 轮写入转录；随后一次路由决策（直接回答或点名委派），委派严格串行，
//! 前一个智能体的完整回复先织入转录再调用下一个；最后组装过滤出用户可见
//! 回复。整轮持有会话状态锁，保证会话级单写者。

pub mod assemble;
pub mod extract;

use std::sync::Arc;

use serde::Deserialize;

use crate::agents::Agent;
use crate::core::{AgentError, StateStore};
use crate::llm::{extract_json, LlmClient};
use crate::memory::{format_labelled, DialogueHistory, Message};
use crate::video::{normalize_query, LookupOutcome, VideoIntentClassifier, VideoSearch};

pub use assemble::{assemble_reply, TranscriptEntry, FALLBACK_REPLY};
pub use extract::{ExtractionResult, IntentExtractor};

const SUPERVISOR_PROMPT_HEADER: &str = r#"You are a friendly assistant whose task is to help the user learn a new craft by making a certain project. Examples of crafts include origami, knitting, crochet, calligraphy, but also more exotic crafts like Bulgarian lacework.
If the user has no specific request yet, interview them to find out their desired craft (e.g. origami), skill level (e.g. beginner) and exact project (e.g. paper crane). Do not make assumptions about the user's preferences in terms of craft, skill or project; always ask for user input. If they have no idea for a project, suggest projects suitable to their skill.
If it is ambiguous which capability is needed, ask the user ONE clarifying question instead of guessing.
Before delegating to the shopper agent, make sure the user has provided their location and the list of supplies.
Never invoke agents in parallel.

You have these agents at your disposal:
"#;

const SUPERVISOR_PROMPT_FOOTER: &str = r#"
Decide what to do for the latest user message. Return ONLY a JSON object, one of:
{"action": "respond", "reply": "<your answer or clarifying question to the user>"}
{"action": "delegate", "agents": ["<agent name>", ...]}
Only use agent names from the list above. List multiple agents only when the request genuinely needs them, in the order they should run."#;

const SUMMARIZE_PROMPT: &str = r#"The specialist agents above have reported their results inside the conversation. Summarize their findings in your own words as one coherent answer to the user. Always integrate every agent's result; never skip or drop one. Do not mention the agents or any hand-off."#;

/// 路由决策（LLM 返回的 JSON）
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RouteDecision {
    action: String,
    reply: String,
    agents: Vec<String>,
}

/// 解析已提取出的 JSON 为路由决策
fn parse_route(value: serde_json::Value) -> Result<RouteDecision, AgentError> {
    serde_json::from_value(value).map_err(|e| AgentError::JsonParseError(e.to_string()))
}

/// 查找结果 → 写入转录的系统注记文本
fn video_note(outcome: &LookupOutcome) -> String {
    match outcome {
        LookupOutcome::Found { url, title, .. } => {
            if title.is_empty() {
                format!("I found a video tutorial you can follow: {}", url)
            } else {
                format!("I found a video tutorial you can follow: {} ({})", url, title)
            }
        }
        LookupOutcome::SearchFailed => {
            "Sorry, I couldn't reach the video search service just now. Please ask me for the video again in a moment.".to_string()
        }
        LookupOutcome::NoCandidates => {
            "Sorry, I couldn't find any video for that topic.".to_string()
        }
        LookupOutcome::NoValidResult => {
            "Sorry, the videos I found for that topic can't be played here.".to_string()
        }
    }
}

/// 监督路由器：顶层控制器，持有有序智能体注册表与会话状态存储
pub struct Supervisor {
    llm: Arc<dyn LlmClient>,
    extractor: IntentExtractor,
    classifier: VideoIntentClassifier,
    video_search: Arc<dyn VideoSearch>,
    agents: Vec<Arc<dyn Agent>>,
    states: StateStore,
    max_context_turns: usize,
}

impl Supervisor {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        video_search: Arc<dyn VideoSearch>,
        max_context_turns: usize,
    ) -> Self {
        Self {
            extractor: IntentExtractor::new(llm.clone()),
            classifier: VideoIntentClassifier::new(llm.clone()),
            llm,
            video_search,
            agents: Vec::new(),
            states: StateStore::new(),
            max_context_turns,
        }
    }

    /// 注册能力智能体；注册顺序即路由 prompt 中的列出顺序
    pub fn register(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.push(agent);
        self
    }

    fn find_agent(&self, name: &str) -> Option<&Arc<dyn Agent>> {
        self.agents.iter().find(|a| a.name() == name)
    }

    fn routing_prompt(&self) -> String {
        let mut prompt = String::from(SUPERVISOR_PROMPT_HEADER);
        for agent in &self.agents {
            prompt.push_str(&format!("- {}: {}\n", agent.name(), agent.description()));
        }
        prompt.push_str(SUPERVISOR_PROMPT_FOOTER);
        prompt
    }

    /// 处理一个用户轮：输入最新消息与 (user, assistant) 历史对，
    /// 返回一条用户可见回复。任何内部失败都降级，绝不向上抛。
    pub async fn handle_turn(
        &self,
        session_id: &str,
        message: &str,
        history_pairs: &[(String, String)],
    ) -> String {
        let mut history = DialogueHistory::from_pairs(history_pairs);
        let prior_assistant: Vec<String> = history
            .assistant_texts()
            .into_iter()
            .map(String::from)
            .collect();
        history.push(Message::user(message));

        let mut turn: Vec<TranscriptEntry> = vec![TranscriptEntry::user(message)];

        // 整轮持锁：会话级单写者
        let state_handle = self.states.get_or_create(session_id).await;
        let mut state = state_handle.lock().await;

        // Extracting
        tracing::debug!(session = session_id, "phase: extracting");
        let extraction = self
            .extractor
            .extract(history.recent(self.max_context_turns))
            .await;
        state.user_message = message.to_string();
        state.project = extraction.project;
        state.craft = extraction.craft;
        state.experience_level = extraction.experience_level;
        state.query = extraction.query;

        // VideoLookup?（只看本轮最新输入）
        state.asked_for_video = self.classifier.wants_video(message).await;
        if state.asked_for_video {
            tracing::debug!(session = session_id, "phase: video lookup");
            let query = normalize_query(&[
                state.project.as_str(),
                state.craft.as_str(),
                state.experience_level.as_str(),
                state.query.as_str(),
            ]);
            let outcome = self.video_search.lookup(&query).await;
            if let LookupOutcome::Found { url, .. } = &outcome {
                state.video_url = Some(url.clone());
            }
            let note = video_note(&outcome);
            // 消费并清零视频标记；注记作为 assistant 轮进入转录即成既定事实
            let _ = state.take_video_flags();
            history.push(Message::assistant(note.clone()));
            turn.push(TranscriptEntry::assistant(note));
        }

        // Delegating
        tracing::debug!(session = session_id, "phase: delegating");
        self.route_and_delegate(&mut history, &mut turn).await;

        // Assembling
        tracing::debug!(session = session_id, "phase: assembling");
        let prior: Vec<&str> = prior_assistant.iter().map(String::as_str).collect();
        let reply = assemble_reply(&turn, &prior);

        let (prompt_tokens, completion_tokens, total) = self.llm.token_usage();
        tracing::debug!(prompt_tokens, completion_tokens, total, "turn complete");
        reply
    }

    /// 一次路由决策，然后严格串行地执行委派
    async fn route_and_delegate(
        &self,
        history: &mut DialogueHistory,
        turn: &mut Vec<TranscriptEntry>,
    ) {
        let messages = vec![
            Message::system(self.routing_prompt()),
            Message::user(format_labelled(history.recent(self.max_context_turns))),
        ];

        let raw = match self.llm.complete(&messages).await {
            Ok(raw) => raw,
            Err(e) => {
                // 路由失败按空贡献处理：本轮还可能有视频注记可以交付
                tracing::warn!("routing completion failed: {}", e);
                return;
            }
        };

        // 只有完全不是 JSON 的输出才当作自由文本直接回复；一旦解析出了
        // 路由对象，它就是内部控制输出，形状不对或内容空都按空贡献处理，
        // 原文绝不进转录
        let decision = match extract_json(&raw) {
            Err(e) => {
                tracing::debug!("routing output not structured ({}), using as reply", e.details);
                let text = raw.trim().to_string();
                if !text.is_empty() {
                    history.push(Message::assistant(text.clone()));
                    turn.push(TranscriptEntry::assistant(text));
                }
                return;
            }
            Ok(value) => match parse_route(value) {
                Ok(decision) => decision,
                Err(e) => {
                    tracing::warn!("routing decision unusable, empty contribution: {}", e);
                    return;
                }
            },
        };

        if decision.action != "delegate" || decision.agents.is_empty() {
            let text = decision.reply.trim().to_string();
            if text.is_empty() {
                tracing::warn!("routing decision carried no reply and no agents, empty contribution");
                return;
            }
            history.push(Message::assistant(text.clone()));
            turn.push(TranscriptEntry::assistant(text));
            return;
        }

        let mut delegated = false;
        for name in &decision.agents {
            let Some(agent) = self.find_agent(name) else {
                tracing::warn!("{}", AgentError::UnknownAgent(name.clone()));
                continue;
            };

            turn.push(TranscriptEntry::control(format!("Transferring to {}", name)));
            tracing::info!("delegating to {}", name);

            // 前序智能体的回复已在 history 中，后续 prompt 必然包含它
            match agent.invoke(history.messages()).await {
                Ok(replies) => {
                    for reply in replies {
                        if reply.is_control_message {
                            turn.push(TranscriptEntry::control(reply.text));
                        } else {
                            history.push(Message::assistant(reply.text.clone()));
                            turn.push(TranscriptEntry::assistant(reply.text));
                        }
                    }
                }
                Err(e) => {
                    // 空贡献，不中断本轮
                    tracing::warn!("agent {} failed: {}", name, e);
                }
            }
            turn.push(TranscriptEntry::control(format!(
                "Transferring back to supervisor from {}",
                name
            )));
            delegated = true;
        }

        // 委派后由监督者把各智能体结果织成一段连贯回答
        if delegated {
            if let Some(summary) = self.summarize(history).await {
                history.push(Message::assistant(summary.clone()));
                turn.push(TranscriptEntry::assistant(summary));
            }
        }
    }

    async fn summarize(&self, history: &DialogueHistory) -> Option<String> {
        let messages = vec![
            Message::system(SUMMARIZE_PROMPT),
            Message::user(format_labelled(history.recent(self.max_context_turns))),
        ];
        match self.llm.complete(&messages).await {
            Ok(summary) if !summary.trim().is_empty() => Some(summary.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                // 汇总失败时智能体原文仍在转录里，照常交付
                tracing::warn!("summarize completion failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_route_delegate() {
        let value =
            extract_json(r#"{"action": "delegate", "agents": ["shopper_agent"]}"#).unwrap();
        let decision = parse_route(value).unwrap();
        assert_eq!(decision.action, "delegate");
        assert_eq!(decision.agents, vec!["shopper_agent"]);
    }

    #[test]
    fn test_parse_route_rejects_non_object_shape() {
        assert!(parse_route(serde_json::json!("just a string")).is_err());
    }

    #[test]
    fn test_video_note_variants_are_distinct() {
        let found = video_note(&LookupOutcome::Found {
            url: "https://www.youtube.com/watch?v=abc".to_string(),
            title: "Casting On".to_string(),
            channel: "KnitCo".to_string(),
        });
        assert!(found.contains("https://www.youtube.com/watch?v=abc"));

        let failed = video_note(&LookupOutcome::SearchFailed);
        let none = video_note(&LookupOutcome::NoCandidates);
        let invalid = video_note(&LookupOutcome::NoValidResult);
        assert!(failed.contains("again"));
        assert_ne!(failed, none);
        assert_ne!(none, invalid);
        assert_ne!(failed, invalid);
    }
}
