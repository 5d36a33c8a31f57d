//! YouTube 查找适配器
//!
//! 两次依赖调用：search 拿候选（限 embeddable 的公开视频），再用一次批量
//! videos?part=status 调用校验全部候选的 privacyStatus/embeddable，取第一个
//! 通过者的标准 watch URL。批量校验把请求数压到常数（搜索 + 一次状态查询）。
//! 三种失败各有哨兵值，调用方据此措辞：搜索挂了建议重试，没结果则直接道歉。

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// 查找结果：要么一个可用视频，要么三种可区分的失败哨兵
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// 第一个通过 public+embeddable 校验的候选
    Found {
        url: String,
        title: String,
        channel: String,
    },
    /// 传输失败 / 非 200 / 超时
    SearchFailed,
    /// 搜索成功但零候选
    NoCandidates,
    /// 有候选但没有一个通过 public+embeddable 校验
    NoValidResult,
}

/// 视频查找能力边界：路由器只依赖这个 trait，测试用桩实现替换
#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn lookup(&self, query: &str) -> LookupOutcome;
}

/// YouTube Data API v3 客户端
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    max_results: u8,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>, max_results: u8, timeout_secs: u64) -> Self {
        let client = crate::tools::build_http_client(
            Client::builder().timeout(std::time::Duration::from_secs(timeout_secs)),
        );
        Self {
            client,
            api_key: api_key.into(),
            max_results,
        }
    }

    fn search_request(&self, query: &str) -> reqwest::RequestBuilder {
        let max_results = self.max_results.to_string();
        self.client
            .get("https://www.googleapis.com/youtube/v3/search")
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("videoEmbeddable", "true"),
                ("maxResults", max_results.as_str()),
                ("q", query),
                ("key", self.api_key.as_str()),
            ])
    }

    /// 批量状态校验：一次请求覆盖全部候选
    fn details_request(&self, ids: &[String]) -> reqwest::RequestBuilder {
        self.client
            .get("https://www.googleapis.com/youtube/v3/videos")
            .query(&[
                ("part", "status,snippet"),
                ("id", ids.join(",").as_str()),
                ("key", self.api_key.as_str()),
            ])
    }

    async fn get_json(&self, request: reqwest::RequestBuilder) -> Result<Value, String> {
        let resp = request
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;
        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }
        resp.json().await.map_err(|e| format!("Read body: {}", e))
    }
}

/// search 响应 → 候选 videoId 列表
pub(crate) fn parse_search_ids(body: &Value) -> Vec<String> {
    body["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["id"]["videoId"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// videos?part=status,snippet 响应 → 第一个 public 且 embeddable 的候选
pub(crate) fn pick_valid_candidate(body: &Value) -> Option<(String, String, String)> {
    body["items"].as_array()?.iter().find_map(|item| {
        let status = &item["status"];
        if status["privacyStatus"].as_str() == Some("public")
            && status["embeddable"].as_bool() == Some(true)
        {
            let id = item["id"].as_str()?.to_string();
            let title = item["snippet"]["title"].as_str().unwrap_or("").to_string();
            let channel = item["snippet"]["channelTitle"]
                .as_str()
                .unwrap_or("")
                .to_string();
            Some((id, title, channel))
        } else {
            None
        }
    })
}

#[async_trait]
impl VideoSearch for YouTubeClient {
    async fn lookup(&self, query: &str) -> LookupOutcome {
        let body = match self.get_json(self.search_request(query)).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("video search failed: {}", e);
                return LookupOutcome::SearchFailed;
            }
        };

        let ids = parse_search_ids(&body);
        if ids.is_empty() {
            return LookupOutcome::NoCandidates;
        }

        let details = match self.get_json(self.details_request(&ids)).await {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!("video status check failed: {}", e);
                return LookupOutcome::SearchFailed;
            }
        };

        match pick_valid_candidate(&details) {
            Some((id, title, channel)) => LookupOutcome::Found {
                url: format!("https://www.youtube.com/watch?v={}", id),
                title,
                channel,
            },
            None => LookupOutcome::NoValidResult,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_search_ids() {
        let body = json!({
            "items": [
                {"id": {"videoId": "abc123"}},
                {"id": {"videoId": "def456"}},
                {"id": {"kind": "youtube#channel"}}
            ]
        });
        assert_eq!(parse_search_ids(&body), vec!["abc123", "def456"]);
    }

    #[test]
    fn test_parse_search_ids_empty() {
        assert!(parse_search_ids(&json!({"items": []})).is_empty());
        assert!(parse_search_ids(&json!({})).is_empty());
    }

    #[test]
    fn test_pick_valid_candidate_skips_private_and_nonembeddable() {
        let body = json!({
            "items": [
                {
                    "id": "priv1",
                    "status": {"privacyStatus": "private", "embeddable": true},
                    "snippet": {"title": "hidden", "channelTitle": "x"}
                },
                {
                    "id": "noembed",
                    "status": {"privacyStatus": "public", "embeddable": false},
                    "snippet": {"title": "locked", "channelTitle": "y"}
                },
                {
                    "id": "good1",
                    "status": {"privacyStatus": "public", "embeddable": true},
                    "snippet": {"title": "Casting On Basics", "channelTitle": "KnitCo"}
                }
            ]
        });
        let (id, title, channel) = pick_valid_candidate(&body).unwrap();
        assert_eq!(id, "good1");
        assert_eq!(title, "Casting On Basics");
        assert_eq!(channel, "KnitCo");
    }

    #[test]
    fn test_pick_valid_candidate_none() {
        let body = json!({
            "items": [
                {"id": "a", "status": {"privacyStatus": "unlisted", "embeddable": true}, "snippet": {}}
            ]
        });
        assert!(pick_valid_candidate(&body).is_none());
    }

    #[test]
    fn test_search_request_encodes_query() {
        let yt = YouTubeClient::new("test-key", 5, 15);
        let req = yt.search_request("crochet & knit basics").build().unwrap();
        let url = req.url().as_str();
        assert!(url.starts_with("https://www.googleapis.com/youtube/v3/search?"));
        assert!(url.contains("q=crochet+%26+knit+basics"));
        assert!(url.contains("part=snippet"));
        assert!(url.contains("videoEmbeddable=true"));
        assert!(url.contains("maxResults=5"));
        assert!(url.contains("key=test-key"));
    }

    #[test]
    fn test_details_request_joins_ids() {
        let yt = YouTubeClient::new("test-key", 5, 15);
        let ids = vec!["abc123".to_string(), "def456".to_string()];
        let req = yt.details_request(&ids).build().unwrap();
        let url = req.url().as_str();
        assert!(url.starts_with("https://www.googleapis.com/youtube/v3/videos?"));
        assert!(url.contains("id=abc123%2Cdef456"));
        assert!(url.contains("part=status%2Csnippet"));
    }
}
