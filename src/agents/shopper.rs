//! 采购智能体
//!
//! 给定材料清单与用户位置：地理编码 → 附近实体店 → 按条目搜线上价格 →
//! LLM 汇总购买渠道与总价估算。缺位置时不猜，直接向用户要。

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::agents::{Agent, AgentReply};
use crate::core::AgentError;
use crate::llm::{extract_json, LlmClient};
use crate::memory::{format_labelled, Message};
use crate::tools::{Geocoder, PlacesClient, WebSearch};

const COMPOSE_PROMPT: &str = r#"You are a shopper agent for craft tools and supplies. Using the gathered shop listings and price search results below, write the final shopping report:
- For every item in the supplies list, say where it can be bought online and the price if it can be inferred from the search results. If a price cannot be inferred, say you don't know how much that item will cost.
- Calculate the total estimated cost of the project from the known prices, and say which items are excluded from the total.
- List the nearby physical stores as an alternative.
Be concise and practical."#;

/// 从历史里抽出来的采购输入
#[derive(Debug, Default, Deserialize)]
struct ShoppingRequest {
    #[serde(default)]
    supplies: Vec<String>,
    #[serde(default)]
    location: String,
}

/// 采购与成本估算智能体
pub struct ShopperAgent {
    llm: Arc<dyn LlmClient>,
    search: Arc<WebSearch>,
    geocoder: Arc<Geocoder>,
    places: Arc<PlacesClient>,
}

impl ShopperAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        search: Arc<WebSearch>,
        geocoder: Arc<Geocoder>,
        places: Arc<PlacesClient>,
    ) -> Self {
        Self {
            llm,
            search,
            geocoder,
            places,
        }
    }

    /// 从对话中抽取 {supplies, location}；解析失败按空处理
    async fn extract_request(&self, conversation: &str) -> ShoppingRequest {
        let prompt = format!(
            "From the conversation below, extract the craft supplies to buy and the user's location.\n\
             Return ONLY a JSON object: {{\"supplies\": [\"item 1\", \"item 2\"], \"location\": \"city\"}}.\n\
             Use an empty list or empty string for anything not mentioned.\n\n{}",
            conversation
        );
        let raw = match self.llm.complete(&[Message::user(prompt)]).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("shopper extraction call failed: {}", e);
                return ShoppingRequest::default();
            }
        };
        match extract_json(&raw) {
            Ok(value) => serde_json::from_value(value).unwrap_or_default(),
            Err(e) => {
                tracing::warn!("shopper extraction parse failed: {}", e.details);
                ShoppingRequest::default()
            }
        }
    }
}

#[async_trait]
impl Agent for ShopperAgent {
    fn name(&self) -> &str {
        "shopper_agent"
    }

    fn description(&self) -> &str {
        "finds online and nearby physical shops for a list of craft supplies and estimates the total project cost (needs the user's location)"
    }

    async fn invoke(&self, history: &[Message]) -> Result<Vec<AgentReply>, AgentError> {
        let conversation = format_labelled(history);
        let request = self.extract_request(&conversation).await;

        if request.location.is_empty() {
            return Ok(vec![AgentReply::text_reply(
                self.name(),
                "Before I can look for shops, could you tell me your location (city or area)?",
            )]);
        }
        if request.supplies.is_empty() {
            return Ok(vec![AgentReply::text_reply(
                self.name(),
                "I need a list of supplies for the project before I can estimate costs. What do you need to buy?",
            )]);
        }

        // 附近实体店：地理编码失败只丢掉这一部分，线上搜索照常进行
        let nearby = match self.geocoder.lookup(&request.location).await {
            Ok(Some(lat_lng)) => {
                let keyword = format!("{} craft shop", request.supplies[0]);
                match self.places.nearby_shops(&lat_lng, &keyword).await {
                    Ok(listing) => listing,
                    Err(e) => {
                        tracing::warn!("places lookup failed: {}", e);
                        "No nearby shop data available.".to_string()
                    }
                }
            }
            Ok(None) => format!("Location not found: {}", request.location),
            Err(e) => {
                tracing::warn!("geocoding failed: {}", e);
                "No nearby shop data available.".to_string()
            }
        };

        // 逐条目线上比价（严格串行，结果拼接供汇总）
        let mut price_sections = Vec::new();
        for item in &request.supplies {
            let query = format!("buy {} price {}", item, request.location);
            match self.search.search(&query).await {
                Ok(results) => price_sections.push(format!("### {}\n{}", item, results)),
                Err(e) => {
                    tracing::warn!("price search failed for {}: {}", item, e);
                    price_sections.push(format!("### {}\nNo results found.", item));
                }
            }
        }

        let report = self
            .llm
            .complete(&[
                Message::system(COMPOSE_PROMPT),
                Message::user(format!(
                    "Supplies: {:?}\nLocation: {}\n\nNearby stores:\n{}\n\nOnline price search:\n{}",
                    request.supplies,
                    request.location,
                    nearby,
                    price_sections.join("\n\n")
                )),
            ])
            .await
            .map_err(AgentError::LlmError)?;

        if report.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![AgentReply::text_reply(self.name(), report.trim())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedLlmClient;

    fn agent(llm: ScriptedLlmClient) -> ShopperAgent {
        ShopperAgent::new(
            Arc::new(llm),
            Arc::new(WebSearch::new("k", 5, 10, 1000)),
            Arc::new(Geocoder::new(10)),
            Arc::new(PlacesClient::new("k", 5000, 10)),
        )
    }

    #[tokio::test]
    async fn test_missing_location_asks_user() {
        let llm = ScriptedLlmClient::new(vec![
            r#"{"supplies": ["300g silk yarn"], "location": ""}"#,
        ]);
        let replies = agent(llm)
            .invoke(&[Message::user("I need yarn for my scarf")])
            .await
            .unwrap();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("location"));
        assert!(!replies[0].is_control_message);
    }

    #[tokio::test]
    async fn test_unparseable_extraction_degrades_to_question() {
        let llm = ScriptedLlmClient::new(vec!["not json at all"]);
        let replies = agent(llm)
            .invoke(&[Message::user("shopping please")])
            .await
            .unwrap();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("location"));
    }
}
