pub mod config;
pub mod fsutil;
pub mod schema;
pub mod types;

pub use config::{ConfigError, ConfigResult, LoopConfig};
pub use schema::FEATURE_COLUMNS;
pub use types::*;
