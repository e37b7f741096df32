//! 翻訳テーブルの変更監視
//!
//! 設定されたテーブルファイルの親ディレクトリとゲームディレクトリを `notify` で監視し、
//! テーブルファイルか監視パターンに一致するファイルが変わったらデバウンス後に
//! コールバックを呼ぶ。更新時刻が前回から変わっていない場合は呼ばない。

use std::fs;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::mpsc::{
    self,
    Receiver,
    RecvTimeoutError,
};
use std::time::{
    Duration,
    SystemTime,
};

use notify::{
    Event,
    EventKind,
    RecursiveMode,
    Watcher,
};

use super::WatchError;
use super::task::{
    BackgroundTask,
    StopSignal,
};
use crate::config::{
    HotReloadConfig,
    WatchMatcher,
};

/// 監視対象
///
/// `dir` 直下は `watchPatterns` で判定し、`files` は設定されたテーブルのパスそのものを見る。
#[derive(Debug, Clone)]
pub struct WatchTargets {
    /// パターンで監視するディレクトリ（ゲームディレクトリ）
    dir: PathBuf,
    /// `watchPatterns`
    matcher: WatchMatcher,
    /// 設定されたテーブルファイル
    files: Vec<PathBuf>,
}

impl WatchTargets {
    /// `dir` 直下を `matcher` で監視する対象を作る
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, matcher: WatchMatcher) -> Self {
        Self { dir: dir.into(), matcher, files: Vec::new() }
    }

    /// テーブルファイルを追加する
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if !self.files.contains(&path) {
            self.files.push(path);
        }
        self
    }

    /// 変更を見るべきファイルかどうか
    ///
    /// テーブルファイルはファイル名を大文字小文字を区別せずに比べ、親ディレクトリも一致させる。
    #[must_use]
    pub fn is_watched(&self, path: &Path) -> bool {
        self.matcher.is_watched(path) || self.files.iter().any(|file| same_file(file, path))
    }

    /// 監視するディレクトリ（重複なし、ゲームディレクトリが先頭）
    #[must_use]
    pub fn directories(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.dir.clone()];
        let parents = self.files.iter().filter_map(|file| file.parent()).filter(|parent| !parent.as_os_str().is_empty());
        for parent in parents {
            if !dirs.iter().any(|dir| dir == parent) {
                dirs.push(parent.to_path_buf());
            }
        }
        dirs
    }
}

/// 同じテーブルファイルへの変更か
fn same_file(file: &Path, changed: &Path) -> bool {
    let same_name = match (file.file_name(), changed.file_name()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    };
    same_name && file.parent() == changed.parent()
}

/// 監視対象ファイルの作成・変更イベントかどうか
#[must_use]
pub fn is_relevant(event: &Event, targets: &WatchTargets) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event.paths.iter().any(|path| targets.is_watched(path))
}

/// 監視対象ファイルのうち最も新しい更新時刻
#[must_use]
pub fn latest_modification(targets: &WatchTargets) -> Option<SystemTime> {
    targets.directories().iter().filter_map(|dir| latest_in_dir(dir, targets)).max()
}

/// ディレクトリ直下の監視対象ファイルの最新更新時刻
fn latest_in_dir(dir: &Path, targets: &WatchTargets) -> Option<SystemTime> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) => {
            tracing::debug!(dir = %dir.display(), %error, "Cannot scan watched directory");
            return None;
        }
    };

    entries
        .filter_map(Result::ok)
        .filter(|entry| targets.is_watched(&entry.path()))
        .filter_map(|entry| entry.metadata().ok()?.modified().ok())
        .max()
}

/// 監視ループの状態
#[derive(Debug)]
struct WatchLoop {
    /// 監視対象
    targets: WatchTargets,
    /// イベント待ちの周期（停止確認の間隔）
    poll: Duration,
    /// 変更検知後に待つ時間
    debounce: Duration,
    /// 最後にコールバックを呼んだときの更新時刻
    last_seen: Option<SystemTime>,
}

impl WatchLoop {
    fn run(mut self, events: &Receiver<notify::Result<Event>>, stop: &StopSignal, on_change: &dyn Fn()) {
        while !stop.is_stopped() {
            match events.recv_timeout(self.poll) {
                Ok(Ok(event)) if is_relevant(&event, &self.targets) => {
                    std::thread::sleep(self.debounce);
                    while events.try_recv().is_ok() {}
                    if stop.is_stopped() {
                        break;
                    }
                    self.fire_if_changed(on_change);
                }
                Ok(Ok(_)) | Err(RecvTimeoutError::Timeout) => {}
                Ok(Err(error)) => tracing::warn!(%error, "File watcher error"),
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::warn!("File watcher channel closed");
                    break;
                }
            }
        }
    }

    fn fire_if_changed(&mut self, on_change: &dyn Fn()) {
        let latest = latest_modification(&self.targets);
        if latest == self.last_seen {
            tracing::debug!("Watched files unchanged after debounce");
            return;
        }
        self.last_seen = latest;
        tracing::info!(dir = %self.targets.dir.display(), "Translation file change detected");
        on_change();
    }
}

/// ファイル監視スレッドを開始する
///
/// 監視の登録はこの関数内で行う。ゲームディレクトリが存在しない等のエラーはここで返る。
/// テーブルファイルの親ディレクトリを登録できない場合は警告を出してそのディレクトリを飛ばす。
///
/// # Errors
/// ゲームディレクトリを監視できない場合、スレッドを生成できない場合
pub fn spawn_file_watcher<F>(
    targets: WatchTargets,
    config: &HotReloadConfig,
    on_change: F,
) -> Result<BackgroundTask, WatchError>
where
    F: Fn() + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx)?;
    watcher.watch(&targets.dir, RecursiveMode::NonRecursive)?;
    for dir in targets.directories().iter().skip(1) {
        match watcher.watch(dir, RecursiveMode::NonRecursive) {
            Ok(()) => tracing::debug!(dir = %dir.display(), "Watching table directory"),
            Err(error) => tracing::warn!(dir = %dir.display(), %error, "Cannot watch table directory"),
        }
    }

    let dir = targets.dir.clone();
    let state = WatchLoop {
        last_seen: latest_modification(&targets),
        targets,
        poll: Duration::from_millis(config.poll_interval_ms),
        debounce: Duration::from_millis(config.debounce_ms),
    };

    let task = BackgroundTask::spawn("tl-file-watcher", move |stop| {
        // watcher はループの間保持する
        let _watcher = watcher;
        state.run(&rx, &stop, &on_change);
    })?;
    tracing::info!(dir = %dir.display(), "Watching translation files");
    Ok(task)
}
