//! 設定管理を行うモジュール

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    EngineSettings,
    loader,
};

/// 設定管理を行う
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// 現在の設定
    current_settings: EngineSettings,

    /// ゲームディレクトリ（相対パスの基準）
    base_dir: PathBuf,
}

impl ConfigManager {
    /// 新しい設定マネージャーを作成
    #[must_use]
    pub fn new(base_dir: PathBuf) -> Self {
        Self { current_settings: EngineSettings::default(), base_dir }
    }

    /// ゲームディレクトリの設定ファイルを読み込む
    ///
    /// 設定ファイルがなければデフォルト値を使う。エラーの場合は現在の設定とゲームディレクトリを変更しない。
    ///
    /// # Errors
    /// - 設定ファイルの読み込み・JSON パースに失敗した場合
    /// - バリデーションエラー（失敗したすべての項目を返す）
    pub fn load_settings(&mut self, base_dir: PathBuf) -> Result<(), ConfigError> {
        let settings = loader::load_from_dir(&base_dir)?.unwrap_or_default();
        settings.validate().map_err(ConfigError::ValidationErrors)?;

        tracing::debug!(game_dir = %base_dir.display(), ?settings, "Settings loaded");
        self.current_settings = settings;
        self.base_dir = base_dir;
        Ok(())
    }

    /// 設定を差し替える（ゲームディレクトリは変えない）
    ///
    /// # Errors
    /// バリデーションエラー
    pub fn update_settings(&mut self, settings: EngineSettings) -> Result<(), ConfigError> {
        settings.validate().map_err(ConfigError::ValidationErrors)?;
        tracing::debug!(?settings, "Settings updated");
        self.current_settings = settings;
        Ok(())
    }

    /// 現在の設定を取得
    #[must_use]
    pub const fn get_settings(&self) -> &EngineSettings {
        &self.current_settings
    }

    /// ゲームディレクトリを取得
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// ゲームディレクトリ基準でパスを解決する
    #[must_use]
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.base_dir.join(relative)
    }

    /// メイン翻訳テーブルのパス
    #[must_use]
    pub fn translation_path(&self) -> PathBuf {
        self.resolve(&self.current_settings.translation_file)
    }

    /// グローバル名前テーブルのパス（無効なら `None`）
    #[must_use]
    pub fn names_path(&self) -> Option<PathBuf> {
        self.current_settings.names_file.as_deref().map(|names| self.resolve(names))
    }

    /// 未翻訳ログのパス
    #[must_use]
    pub fn untranslated_log_path(&self) -> PathBuf {
        self.resolve(&self.current_settings.untranslated_log)
    }
}
