//! 视频补充材料：意图分类、查询归一化、外部查找适配器

pub mod intent;
pub mod query;
pub mod youtube;

pub use intent::VideoIntentClassifier;
pub use query::normalize_query;
pub use youtube::{LookupOutcome, VideoSearch, YouTubeClient};
