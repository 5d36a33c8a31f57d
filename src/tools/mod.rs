//! 智能体使用的 HTTP 工具客户端
//!
//! 统一风格：reqwest + 每客户端超时 + 显式状态码检查 + 结果大小上限。
//! 工具边界返回 Result<String, String>，由智能体决定如何措辞降级。

pub mod geocode;
pub mod places;
pub mod web_search;

pub use geocode::Geocoder;
pub use places::PlacesClient;
pub use web_search::WebSearch;

/// 构建工具客户端共用的 reqwest Client；构建失败时告警并退回默认客户端
/// （默认客户端丢失超时与 User-Agent 等配置，必须留下日志）
pub(crate) fn build_http_client(builder: reqwest::ClientBuilder) -> reqwest::Client {
    match builder.build() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("http client build failed, using default client: {}", e);
            reqwest::Client::new()
        }
    }
}
