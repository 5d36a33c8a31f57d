//! 附近商店查找（Google Places Nearby Search）
//!
//! 以 "lat,lng" 为圆心按关键词搜实体店，渲染前 5 条（名称 / 评分 / 地址）。

use reqwest::Client;
use serde_json::Value;

/// Places 客户端
pub struct PlacesClient {
    client: Client,
    api_key: String,
    radius_meters: u32,
}

impl PlacesClient {
    pub fn new(api_key: impl Into<String>, radius_meters: u32, timeout_secs: u64) -> Self {
        let client = crate::tools::build_http_client(
            Client::builder().timeout(std::time::Duration::from_secs(timeout_secs)),
        );
        Self {
            client,
            api_key: api_key.into(),
            radius_meters,
        }
    }

    /// 在 lat_lng 附近按关键词找商店，返回格式化列表文本
    pub async fn nearby_shops(&self, lat_lng: &str, keyword: &str) -> Result<String, String> {
        let resp = self
            .client
            .get("https://maps.googleapis.com/maps/api/place/nearbysearch/json")
            .query(&[
                ("location", lat_lng),
                ("radius", &self.radius_meters.to_string()),
                ("keyword", keyword),
                ("type", "store"),
                ("key", &self.api_key),
            ])
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }

        let body: Value = resp.json().await.map_err(|e| format!("Read body: {}", e))?;
        Ok(render_places(&body))
    }
}

/// Places 响应 → 前 5 条商店的列表文本
pub(crate) fn render_places(body: &Value) -> String {
    let results = match body["results"].as_array() {
        Some(results) if !results.is_empty() => results,
        _ => return "No nearby craft shops found.".to_string(),
    };

    let mut out = String::from("Nearby shops:\n");
    for place in results.iter().take(5) {
        let name = place["name"].as_str().unwrap_or("(unnamed)");
        let address = place["vicinity"].as_str().unwrap_or("address unknown");
        let rating = place["rating"]
            .as_f64()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        out.push_str(&format!("- {} ({}*) - {}\n", name, rating, address));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_places_lists_top_entries() {
        let body = json!({
            "results": [
                {"name": "Wool World", "vicinity": "Main St 1", "rating": 4.5},
                {"name": "Craft Corner", "vicinity": "Side St 2"}
            ]
        });
        let text = render_places(&body);
        assert!(text.contains("Wool World (4.5*) - Main St 1"));
        assert!(text.contains("Craft Corner (N/A*) - Side St 2"));
    }

    #[test]
    fn test_render_places_empty() {
        assert_eq!(render_places(&json!({"results": []})), "No nearby craft shops found.");
    }

    #[test]
    fn test_render_places_caps_at_five() {
        let results: Vec<_> = (0..8)
            .map(|i| json!({"name": format!("Shop {}", i), "vicinity": "x", "rating": 4.0}))
            .collect();
        let text = render_places(&json!({ "results": results }));
        assert!(text.contains("Shop 4"));
        assert!(!text.contains("Shop 5"));
    }
}
