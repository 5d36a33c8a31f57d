//! 轮次处理集成测试
//!
//! 用脚本化 LLM 与桩实现驱动完整的监督路由轮次：抽取 → 视频查找 →
//! 委派 → 组装，覆盖端到端场景与串行委派的上下文传递。

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use craftmind::agents::{Agent, AgentReply};
use craftmind::core::AgentError;
use craftmind::llm::ScriptedLlmClient;
use craftmind::memory::Message;
use craftmind::router::FALLBACK_REPLY;
use craftmind::video::{LookupOutcome, VideoSearch};
use craftmind::Supervisor;

/// 桩视频查找：记录收到的查询，返回预设结果
struct StubVideoSearch {
    outcome: LookupOutcome,
    queries: Mutex<Vec<String>>,
}

impl StubVideoSearch {
    fn new(outcome: LookupOutcome) -> Self {
        Self {
            outcome,
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VideoSearch for StubVideoSearch {
    async fn lookup(&self, query: &str) -> LookupOutcome {
        self.queries.lock().unwrap().push(query.to_string());
        self.outcome.clone()
    }
}

/// 桩智能体：返回固定文本，并记录调用时收到的完整历史
struct StubAgent {
    name: &'static str,
    reply: &'static str,
    seen_histories: Mutex<Vec<String>>,
    fail: bool,
}

impl StubAgent {
    fn new(name: &'static str, reply: &'static str) -> Self {
        Self {
            name,
            reply,
            seen_histories: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    fn failing(name: &'static str) -> Self {
        Self {
            name,
            reply: "",
            seen_histories: Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

#[async_trait]
impl Agent for StubAgent {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "stub capability"
    }

    async fn invoke(&self, history: &[Message]) -> Result<Vec<AgentReply>, AgentError> {
        let joined = history
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.seen_histories.lock().unwrap().push(joined);

        if self.fail {
            return Err(AgentError::LlmError("stub failure".to_string()));
        }
        // 智能体自己的交接公告必须被过滤掉
        Ok(vec![
            AgentReply::control(self.name, format!("Invoking tool chain for {}", self.name)),
            AgentReply::text_reply(self.name, self.reply),
        ])
    }
}

const KNITTING_EXTRACTION: &str = r#"```json
{"project": "scarf", "craft": "knitting", "experience_level": "beginner", "query": "casting on"}
```"#;

#[tokio::test]
async fn test_end_to_end_video_turn() {
    // 调用顺序：抽取 → 视频分类 → 路由
    let llm = Arc::new(ScriptedLlmClient::new(vec![
        KNITTING_EXTRACTION,
        "yes",
        r#"{"action": "respond", "reply": "A garter stitch scarf is a great first project. Cast on about 30 stitches to start."}"#,
    ]));
    let video = Arc::new(StubVideoSearch::new(LookupOutcome::Found {
        url: "https://www.youtube.com/watch?v=cast123".to_string(),
        title: "Casting On Basics".to_string(),
        channel: "KnitCo".to_string(),
    }));

    let supervisor = Supervisor::new(llm, video.clone(), 20);
    let reply = supervisor
        .handle_turn(
            "s1",
            "I want to learn knitting, any beginner scarf ideas, and do you have a video for casting on?",
            &[],
        )
        .await;

    // 归一化查询：字段拼接去重，顺序 project craft level query
    assert_eq!(
        video.queries.lock().unwrap().as_slice(),
        ["scarf knitting beginner casting on"]
    );

    // 视频行恰好出现一次，且无控制话术
    assert_eq!(reply.matches("watch?v=cast123").count(), 1);
    assert!(reply.contains("garter stitch scarf"));
    assert!(!reply.to_lowercase().contains("transferring"));
}

#[tokio::test]
async fn test_no_video_request_skips_lookup() {
    let llm = Arc::new(ScriptedLlmClient::new(vec![
        KNITTING_EXTRACTION,
        "no",
        r#"{"action": "respond", "reply": "What kind of scarf would you like to make?"}"#,
    ]));
    let video = Arc::new(StubVideoSearch::new(LookupOutcome::NoCandidates));

    let supervisor = Supervisor::new(llm, video.clone(), 20);
    let reply = supervisor
        .handle_turn("s1", "I want to learn knitting", &[])
        .await;

    assert!(video.queries.lock().unwrap().is_empty());
    assert_eq!(reply, "What kind of scarf would you like to make?");
}

#[tokio::test]
async fn test_video_sentinel_becomes_apology() {
    let llm = Arc::new(ScriptedLlmClient::new(vec![
        KNITTING_EXTRACTION,
        "yes",
        r#"{"action": "respond", "reply": "Meanwhile, here is how casting on works."}"#,
    ]));
    let video = Arc::new(StubVideoSearch::new(LookupOutcome::NoCandidates));

    let supervisor = Supervisor::new(llm, video, 20);
    let reply = supervisor
        .handle_turn("s1", "show me a casting on video", &[])
        .await;

    assert!(reply.contains("couldn't find any video"));
    assert!(reply.contains("casting on works"));
}

#[tokio::test]
async fn test_sequential_delegation_weaves_context() {
    let llm = Arc::new(ScriptedLlmClient::new(vec![
        KNITTING_EXTRACTION,
        "no",
        r#"{"action": "delegate", "agents": ["craft_research_agent", "shopper_agent"]}"#,
        "Research says knitting comes from wool traditions; shops and costs are listed above.",
    ]));
    let video = Arc::new(StubVideoSearch::new(LookupOutcome::NoCandidates));

    let researcher = Arc::new(StubAgent::new(
        "craft_research_agent",
        "Knitting background: it grew out of regional wool traditions.",
    ));
    let shopper = Arc::new(StubAgent::new(
        "shopper_agent",
        "Estimated cost: 25 EUR for yarn and needles.",
    ));

    let supervisor = Supervisor::new(llm.clone(), video, 20)
        .register(researcher.clone())
        .register(shopper.clone());

    let reply = supervisor
        .handle_turn(
            "s1",
            "Where does knitting come from, and how much would a scarf cost in Berlin?",
            &[],
        )
        .await;

    // 两个贡献按调用顺序出现
    let research_pos = reply.find("wool traditions").expect("research reply present");
    let cost_pos = reply.find("25 EUR").expect("shopper reply present");
    assert!(research_pos < cost_pos);

    // 第二个智能体收到的上下文必须包含第一个的完整回复文本
    let shopper_seen = shopper.seen_histories.lock().unwrap();
    assert_eq!(shopper_seen.len(), 1);
    assert!(shopper_seen[0].contains("Knitting background: it grew out of regional wool traditions."));

    // 汇总调用的 prompt 同样看到两者
    let prompts = llm.prompts.lock().unwrap();
    let summary_prompt = prompts.last().unwrap();
    assert!(summary_prompt.contains("wool traditions"));
    assert!(summary_prompt.contains("25 EUR"));

    assert!(!reply.to_lowercase().contains("transferring"));
    assert!(!reply.contains("Invoking tool chain"));
}

#[tokio::test]
async fn test_failing_agent_is_empty_contribution() {
    let llm = Arc::new(ScriptedLlmClient::new(vec![
        KNITTING_EXTRACTION,
        "no",
        r#"{"action": "delegate", "agents": ["mentor_agent", "shopper_agent"]}"#,
        "The shops and prices are listed above.",
    ]));
    let video = Arc::new(StubVideoSearch::new(LookupOutcome::NoCandidates));

    let mentor = Arc::new(StubAgent::failing("mentor_agent"));
    let shopper = Arc::new(StubAgent::new(
        "shopper_agent",
        "Wool World on Main St sells yarn.",
    ));

    let supervisor = Supervisor::new(llm, video, 20)
        .register(mentor)
        .register(shopper);

    let reply = supervisor.handle_turn("s1", "help me buy yarn", &[]).await;
    assert!(reply.contains("Wool World"));
}

#[tokio::test]
async fn test_unstructured_routing_output_is_direct_reply() {
    let llm = Arc::new(ScriptedLlmClient::new(vec![
        KNITTING_EXTRACTION,
        "no",
        "Which craft would you like to learn first?",
    ]));
    let video = Arc::new(StubVideoSearch::new(LookupOutcome::NoCandidates));

    let supervisor = Supervisor::new(llm, video, 20);
    let reply = supervisor.handle_turn("s1", "hello", &[]).await;
    assert_eq!(reply, "Which craft would you like to learn first?");
}

#[tokio::test]
async fn test_empty_agents_decision_never_leaks_routing_json() {
    // 路由返回了合法 JSON 但 agents 为空：这是内部控制输出，
    // 不能原样落到用户回复里
    let raw_decision = r#"{"action": "delegate", "agents": []}"#;
    let llm = Arc::new(ScriptedLlmClient::new(vec![
        KNITTING_EXTRACTION,
        "no",
        raw_decision,
    ]));
    let video = Arc::new(StubVideoSearch::new(LookupOutcome::NoCandidates));

    let supervisor = Supervisor::new(llm, video, 20);
    let reply = supervisor.handle_turn("s1", "help me start", &[]).await;
    assert!(!reply.contains(raw_decision));
    assert!(!reply.contains("\"action\""));
    assert_eq!(reply, FALLBACK_REPLY);
}

#[tokio::test]
async fn test_empty_agents_decision_still_delivers_video_note() {
    // 路由决策不可用时按空贡献处理，本轮已有的视频注记照常交付
    let llm = Arc::new(ScriptedLlmClient::new(vec![
        KNITTING_EXTRACTION,
        "yes",
        r#"{"action": "delegate", "agents": []}"#,
    ]));
    let video = Arc::new(StubVideoSearch::new(LookupOutcome::Found {
        url: "https://www.youtube.com/watch?v=knit42".to_string(),
        title: "Scarf Basics".to_string(),
        channel: "KnitCo".to_string(),
    }));

    let supervisor = Supervisor::new(llm, video, 20);
    let reply = supervisor
        .handle_turn("s1", "any video on scarf basics?", &[])
        .await;
    assert!(reply.contains("watch?v=knit42"));
    assert!(!reply.contains("\"action\""));
}

#[tokio::test]
async fn test_duplicate_of_history_yields_fallback() {
    let llm = Arc::new(ScriptedLlmClient::new(vec![
        KNITTING_EXTRACTION,
        "no",
        r#"{"action": "respond", "reply": "Here are some shops..."}"#,
    ]));
    let video = Arc::new(StubVideoSearch::new(LookupOutcome::NoCandidates));

    let supervisor = Supervisor::new(llm, video, 20);
    let history = vec![("any shops?".to_string(), "Here are some shops...".to_string())];
    let reply = supervisor.handle_turn("s1", "shops again please", &history).await;
    assert_eq!(reply, FALLBACK_REPLY);
}
