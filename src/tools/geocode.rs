//! 地理编码工具（Nominatim）
//!
//! 地名 → "lat,lon" 字符串。Nominatim 要求固定 User-Agent。

use reqwest::Client;
use serde_json::Value;

const USER_AGENT: &str = "craftmind-agent";

/// Nominatim 地理编码客户端
pub struct Geocoder {
    client: Client,
}

impl Geocoder {
    pub fn new(timeout_secs: u64) -> Self {
        let client = crate::tools::build_http_client(
            Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .user_agent(USER_AGENT),
        );
        Self { client }
    }

    /// 解析地名；查不到时返回 None
    pub async fn lookup(&self, location_name: &str) -> Result<Option<String>, String> {
        let resp = self
            .client
            .get("https://nominatim.openstreetmap.org/search")
            .query(&[("q", location_name), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }

        let body: Value = resp.json().await.map_err(|e| format!("Read body: {}", e))?;
        Ok(parse_lat_lon(&body))
    }
}

/// Nominatim 响应 → "lat,lon"
pub(crate) fn parse_lat_lon(body: &Value) -> Option<String> {
    let first = body.as_array()?.first()?;
    let lat = first["lat"].as_str()?;
    let lon = first["lon"].as_str()?;
    Some(format!("{},{}", lat, lon))
}
