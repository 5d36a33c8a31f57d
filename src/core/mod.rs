//! 核心：错误类型与按会话隔离的状态存储

pub mod error;
pub mod state;

pub use error::AgentError;
pub use state::{CraftState, StateStore};
