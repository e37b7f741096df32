//! 設定ファイルと設定管理
/// Config file loader
mod loader;
/// Configuration manager
mod manager;
/// Watched file name matcher
mod matcher;
/// Configuration types and settings
mod types;

pub use loader::CONFIG_FILE_NAME;
pub use manager::ConfigManager;
pub use matcher::{
    MatcherError,
    WatchMatcher,
};
pub use types::{
    AssetConfig,
    ConfigError,
    EngineSettings,
    HotReloadConfig,
    ValidationError,
    WrapConfig,
};
