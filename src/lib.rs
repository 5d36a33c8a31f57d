//! CraftMind - 会话式手工艺学习助手
//!
//! 模块划分：
//! - **agents**: 能力智能体（研究 / 采购 / 导师）与统一的 Agent trait
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、按会话隔离的 CraftState 存储
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）、JSON 提取
//! - **memory**: 会话内对话历史（追加写）
//! - **observability**: tracing 日志初始化
//! - **router**: 监督路由器（逐轮控制序列）、结构化意图抽取、回复组装过滤
//! - **tools**: 智能体使用的 HTTP 工具客户端（搜索 / 地理编码 / 附近商店）
//! - **video**: 视频意图分类、查询归一化、YouTube 查找适配器

pub mod agents;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod router;
pub mod tools;
pub mod video;

pub use router::Supervisor;
