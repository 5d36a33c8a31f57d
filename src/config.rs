//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `CRAFTMIND__*` 覆盖
//! （双下划线表示嵌套，如 `CRAFTMIND__LLM__MODEL=gpt-4o-mini`）。
//! API Key 不进配置文件，直接读 OPENAI_API_KEY / YOUTUBE_API_KEY /
//! TAVILY_API_KEY / GOOGLE_MAPS_API_KEY。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub video: VideoSection,
    pub search: SearchSection,
    pub places: PlacesSection,
}

/// [app] 段：应用名、对话轮数上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: Option<String>,
    /// LLM 上下文保留的对话轮数
    #[serde(default = "default_max_context_turns")]
    pub max_context_turns: usize,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            max_context_turns: default_max_context_turns(),
        }
    }
}

fn default_max_context_turns() -> usize {
    20
}

/// [llm] 段：模型与端点
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    #[serde(default = "default_model")]
    pub model: String,
    /// OpenAI 兼容端点；未设置时用官方端点
    pub base_url: Option<String>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: None,
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// [video] 段：视频查找
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideoSection {
    #[serde(default = "default_video_max_results")]
    pub max_results: u8,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for VideoSection {
    fn default() -> Self {
        Self {
            max_results: default_video_max_results(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_video_max_results() -> u8 {
    5
}

fn default_timeout_secs() -> u64 {
    15
}

/// [search] 段：Web 搜索
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    #[serde(default = "default_search_max_results")]
    pub max_results: u8,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_result_chars")]
    pub max_result_chars: usize,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            max_results: default_search_max_results(),
            timeout_secs: default_timeout_secs(),
            max_result_chars: default_max_result_chars(),
        }
    }
}

fn default_search_max_results() -> u8 {
    5
}

fn default_max_result_chars() -> usize {
    4000
}

/// [places] 段：附近商店查找
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlacesSection {
    #[serde(default = "default_radius_meters")]
    pub radius_meters: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PlacesSection {
    fn default() -> Self {
        Self {
            radius_meters: default_radius_meters(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_radius_meters() -> u32 {
    5000
}

/// 加载配置：TOML 文件（可选）+ CRAFTMIND__* 环境变量覆盖
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("CRAFTMIND")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
