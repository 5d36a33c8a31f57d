//! Web 搜索工具（Tavily API）
//!
//! POST https://api.tavily.com/search；结果渲染为 标题/摘要/链接 的文本块，
//! 超过 max_result_chars 截断并追加 ...[truncated]。

use reqwest::Client;
use serde_json::{json, Value};

/// Tavily 搜索客户端
pub struct WebSearch {
    client: Client,
    api_key: String,
    max_results: u8,
    max_result_chars: usize,
}

impl WebSearch {
    pub fn new(
        api_key: impl Into<String>,
        max_results: u8,
        timeout_secs: u64,
        max_result_chars: usize,
    ) -> Self {
        let client = crate::tools::build_http_client(
            Client::builder().timeout(std::time::Duration::from_secs(timeout_secs)),
        );
        Self {
            client,
            api_key: api_key.into(),
            max_results,
            max_result_chars,
        }
    }

    /// 搜索并返回格式化结果文本；零结果返回 "No results found."
    pub async fn search(&self, query: &str) -> Result<String, String> {
        let resp = self
            .client
            .post("https://api.tavily.com/search")
            .json(&json!({
                "api_key": self.api_key,
                "query": query,
                "max_results": self.max_results,
            }))
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }

        let body: Value = resp.json().await.map_err(|e| format!("Read body: {}", e))?;
        Ok(self.render_results(&body))
    }

    fn render_results(&self, body: &Value) -> String {
        let results = match body["results"].as_array() {
            Some(results) if !results.is_empty() => results,
            _ => return "No results found.".to_string(),
        };

        let mut blocks = Vec::new();
        for res in results {
            let title = res["title"].as_str().unwrap_or("");
            let content = res["content"].as_str().unwrap_or("");
            let url = res["url"].as_str().unwrap_or("");
            blocks.push(format!("**{}**\n{}\n{}", title, content, url));
        }
        let text = blocks.join("\n\n");

        if text.chars().count() > self.max_result_chars {
            text.chars().take(self.max_result_chars).collect::<String>() + "\n...[truncated]"
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> WebSearch {
        WebSearch::new("key", 5, 10, 200)
    }

    #[test]
    fn test_render_results_formats_blocks() {
        let body = json!({
            "results": [
                {"title": "Yarn guide", "content": "wool basics", "url": "https://example.com/yarn"}
            ]
        });
        let text = client().render_results(&body);
        assert!(text.contains("**Yarn guide**"));
        assert!(text.contains("https://example.com/yarn"));
    }

    #[test]
    fn test_render_results_empty() {
        assert_eq!(client().render_results(&json!({"results": []})), "No results found.");
    }

    #[test]
    fn test_render_results_truncates() {
        let long = "x".repeat(500);
        let body = json!({"results": [{"title": long, "content": "", "url": ""}]});
        let text = client().render_results(&body);
        assert!(text.ends_with("...[truncated]"));
    }
}
