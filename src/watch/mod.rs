//! 再読み込みのトリガー
//!
//! ファイル監視とホットキーの 2 つのバックグラウンドループから
//! [`Engine::reload`] を呼ぶ。

pub mod file_watcher;
pub mod hotkey;
pub mod task;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub use file_watcher::{
    WatchTargets,
    spawn_file_watcher,
};
pub use hotkey::{
    KeyState,
    spawn_hotkey_poller,
};
pub use task::{
    BackgroundTask,
    StopSignal,
};
use thiserror::Error;

use crate::config::{
    HotReloadConfig,
    MatcherError,
    WatchMatcher,
};
use crate::engine::Engine;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error(transparent)]
    Matcher(#[from] MatcherError),

    #[error("Failed to watch translation files: {0}")]
    Notify(#[from] notify::Error),

    #[error("Failed to start background thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// 起動中の再読み込みトリガー
#[derive(Debug)]
pub struct ReloadTriggers {
    /// 起動した順のタスク
    tasks: Vec<BackgroundTask>,
    /// 停止時にタスクごとに待つ上限
    shutdown_timeout: Duration,
}

/// トリガーから呼ばれる再読み込み
fn reload_callback(engine: Arc<Engine>, trigger: &'static str) -> impl Fn() + Send + 'static {
    move || {
        tracing::info!(trigger, "Reloading translations");
        if let Err(error) = engine.reload() {
            tracing::debug!(trigger, %error, "Triggered reload failed");
        }
    }
}

impl ReloadTriggers {
    /// 設定に従ってトリガーを開始する
    ///
    /// ファイル監視は `dir` 直下の `watchPatterns` に加えて、エンジン設定の翻訳テーブルと
    /// 名前テーブルを監視する。ホットキーは `key` が渡された場合のみ開始する。
    ///
    /// # Errors
    /// 監視パターンが不正な場合、監視を登録できない場合、スレッドを生成できない場合
    pub fn start(
        engine: &Arc<Engine>,
        config: &HotReloadConfig,
        dir: &Path,
        key: Option<Box<dyn KeyState>>,
    ) -> Result<Self, WatchError> {
        let mut triggers =
            Self { tasks: Vec::new(), shutdown_timeout: Duration::from_millis(config.shutdown_timeout_ms) };

        if config.watch_files {
            let tables = engine.config();
            let mut targets =
                WatchTargets::new(dir, WatchMatcher::new(&config.watch_patterns)?).with_file(tables.translation_path());
            if let Some(names) = tables.names_path() {
                targets = targets.with_file(names);
            }
            let callback = reload_callback(Arc::clone(engine), "file-watcher");
            triggers.tasks.push(spawn_file_watcher(targets, config, callback)?);
        }

        if config.hotkey
            && let Some(key) = key
        {
            let callback = reload_callback(Arc::clone(engine), "hotkey");
            let poll = Duration::from_millis(config.poll_interval_ms);
            triggers.tasks.push(spawn_hotkey_poller(key, poll, callback)?);
        }

        Ok(triggers)
    }

    /// 起動中のタスク数
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// 起動中のタスクがないかどうか
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// すべてのトリガーを停止する
    ///
    /// 期限内に止まらなかったタスクがあれば `false`（そのタスクは切り離される）。
    pub fn shutdown(self) -> bool {
        let timeout = self.shutdown_timeout;
        self.tasks.into_iter().fold(true, |all_stopped, task| task.stop(timeout) && all_stopped)
    }
}
