//! 設定ファイルの読み込み関数

use std::fs;
use std::io;
use std::path::Path;

use super::{
    ConfigError,
    EngineSettings,
};

/// ゲームディレクトリに置く設定ファイル名
pub const CONFIG_FILE_NAME: &str = "retouch-tl.json";

/// ゲームディレクトリの `retouch-tl.json` を読み込む
///
/// ファイルがなければ `Ok(None)`（すべてデフォルト値で動作する）。
///
/// # Errors
/// - ファイル読み込みエラー（存在しない場合を除く）
/// - JSON パースエラー
pub(super) fn load_from_dir(base_dir: &Path) -> Result<Option<EngineSettings>, ConfigError> {
    let config_path = base_dir.join(CONFIG_FILE_NAME);

    let content = match fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %config_path.display(), "No settings file; using defaults");
            return Ok(None);
        }
        Err(error) => return Err(error.into()),
    };

    tracing::debug!(path = %config_path.display(), "Loading settings");
    Ok(Some(serde_json::from_str(&content)?))
}
