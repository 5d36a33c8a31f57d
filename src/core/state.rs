//! 按会话隔离的 CraftState 存储
//!
//! 每个会话一份 CraftState，每轮覆盖写；StateStore 按 session id 分发
//! Arc<Mutex<CraftState>>，监督路由器整轮持锁，实现会话级单写者。
//! 视频标记 asked_for_video / video_url 每轮写一次读一次，消费后必须清零，
//! 不允许把"待处理视频"泄漏到下一轮。

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

/// 每会话一份的抽取状态（每轮覆盖）
#[derive(Clone, Debug, Default)]
pub struct CraftState {
    /// 本轮最新的用户输入（不拼接上一轮，见视频分类的范围收窄决策）
    pub user_message: String,
    pub project: String,
    pub craft: String,
    /// beginner / intermediate / advanced / ""
    pub experience_level: String,
    /// 简短主题词（≤3 词）
    pub query: String,
    /// 瞬态：本轮是否明确要了视频，消费后清零
    pub asked_for_video: bool,
    /// 瞬态：本轮查到的视频 URL，消费后清零
    pub video_url: Option<String>,
}

impl CraftState {
    /// 消费视频标记：返回当前值并清零，保证写一次读一次
    pub fn take_video_flags(&mut self) -> (bool, Option<String>) {
        let asked = self.asked_for_video;
        let url = self.video_url.take();
        self.asked_for_video = false;
        (asked, url)
    }
}

/// 会话状态存储：get_or_create 返回该会话专属的 Arc<Mutex<CraftState>>，无跨会话可见性
#[derive(Default)]
pub struct StateStore {
    sessions: Mutex<HashMap<String, Arc<Mutex<CraftState>>>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_create(&self, session_id: &str) -> Arc<Mutex<CraftState>> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(CraftState::default())))
            .clone()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
