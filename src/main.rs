//! CraftMind - 会话式手工艺学习助手
//!
//! 入口：初始化日志、加载配置、构建监督路由器与三个能力智能体，
//! 跑 stdin/stdout 聊天循环（quit/exit 退出）。

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use craftmind::agents::{MentorAgent, ResearcherAgent, ShopperAgent};
use craftmind::config::load_config;
use craftmind::llm::OpenAiClient;
use craftmind::tools::{Geocoder, PlacesClient, WebSearch};
use craftmind::video::YouTubeClient;
use craftmind::Supervisor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    craftmind::observability::init();

    let cfg = load_config(None).context("Failed to load config")?;

    let llm = Arc::new(OpenAiClient::new(
        cfg.llm.base_url.as_deref(),
        &cfg.llm.model,
        std::env::var("OPENAI_API_KEY").ok().as_deref(),
    ));

    let youtube = Arc::new(YouTubeClient::new(
        std::env::var("YOUTUBE_API_KEY").unwrap_or_default(),
        cfg.video.max_results,
        cfg.video.timeout_secs,
    ));

    let search = Arc::new(WebSearch::new(
        std::env::var("TAVILY_API_KEY").unwrap_or_default(),
        cfg.search.max_results,
        cfg.search.timeout_secs,
        cfg.search.max_result_chars,
    ));
    let geocoder = Arc::new(Geocoder::new(cfg.places.timeout_secs));
    let places = Arc::new(PlacesClient::new(
        std::env::var("GOOGLE_MAPS_API_KEY").unwrap_or_default(),
        cfg.places.radius_meters,
        cfg.places.timeout_secs,
    ));

    let supervisor = Supervisor::new(llm.clone(), youtube, cfg.app.max_context_turns)
        .register(Arc::new(ResearcherAgent::new(llm.clone(), search.clone())))
        .register(Arc::new(ShopperAgent::new(
            llm.clone(),
            search.clone(),
            geocoder,
            places,
        )))
        .register(Arc::new(MentorAgent::new(llm, search)));

    let name = cfg.app.name.as_deref().unwrap_or("CraftMind");
    println!("{}: I can help you learn about crafts and find supplies!", name);
    println!("Ask me anything about crafts, and I'll help you get started. (quit to exit)\n");

    // 单进程 REPL 只有一个会话；历史以 (user, assistant) 对的形式维护
    let session_id = "local";
    let mut history: Vec<(String, String)> = Vec::new();

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush().context("flush stdout")?;

        let mut line = String::new();
        if stdin.read_line(&mut line).context("read stdin")? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message == "quit" || message == "exit" {
            break;
        }

        let reply = supervisor.handle_turn(session_id, message, &history).await;
        println!("\n{}\n", reply);
        history.push((message.to_string(), reply));
    }

    Ok(())
}
