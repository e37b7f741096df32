//! 翻訳エンジン
//!
//! フックされた呼び出しから渡される Shift-JIS の原文を翻訳し、インターンプールの
//! ハンドルで返す。テーブルの再読み込みと並行して検索できる。

pub mod state;

use std::path::PathBuf;
use std::sync::atomic::{
    AtomicBool,
    AtomicU64,
    Ordering,
};
use std::sync::{
    Arc,
    Mutex,
    PoisonError,
};
use std::time::Instant;

pub use state::EngineState;

use crate::asset::AssetPathResolver;
use crate::config::ConfigManager;
use crate::encoding;
use crate::indexer::{
    LoadError,
    LoadSummary,
    TranslationIndex,
};
use crate::input::source::{
    FsTableSource,
    TableSource,
};
use crate::interned::{
    InternedStr,
    StringInterner,
};
use crate::lookup::{
    self,
    EngineStats,
    Lookup,
    MissLog,
    ScenePosition,
    SceneTracker,
};
use crate::wrap;

/// シーン変化の通知先
pub type SceneCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// 台詞 1 行分（話者名 + 本文）の翻訳結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dialogue {
    pub name: Option<InternedStr>,
    pub message: Option<InternedStr>,
}

/// 翻訳エンジン
///
/// 検索・再読み込み・統計のすべてをこのオブジェクトが持つ。
/// 複数スレッドから共有する場合は `Arc<Engine>` にする。
pub struct Engine {
    /// 設定とゲームディレクトリ
    config: ConfigManager,
    /// テーブルの読み出し元
    source: Arc<dyn TableSource>,
    /// インデックスと統計
    state: EngineState,
    /// 返却文字列のプール
    interner: StringInterner,
    miss_log: MissLog,
    scene: SceneTracker,
    assets: AssetPathResolver,
    scene_callback: Mutex<Option<SceneCallback>>,
    /// 成功した再読み込みの回数
    reloads: AtomicU64,
    closed: AtomicBool,
}

impl Engine {
    /// ファイルシステムからテーブルを読み込んでエンジンを作る
    ///
    /// 読み込みに失敗しても空のインデックスで起動する（すべての検索が原文のまま）。
    #[must_use]
    pub fn open(config: &ConfigManager) -> Self {
        Self::with_source(config, Arc::new(FsTableSource))
    }

    /// 任意の `TableSource` からテーブルを読み込んでエンジンを作る
    #[must_use]
    pub fn with_source(config: &ConfigManager, source: Arc<dyn TableSource>) -> Self {
        let settings = config.get_settings();
        let engine = Self {
            miss_log: MissLog::new(settings.dump_untranslated, config.untranslated_log_path()),
            assets: AssetPathResolver::from_config(&settings.assets, config.base_dir()),
            config: config.clone(),
            source,
            state: EngineState::default(),
            interner: StringInterner::new(),
            scene: SceneTracker::new(),
            scene_callback: Mutex::new(None),
            reloads: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        };

        match engine.build_index() {
            Ok((index, summary)) => {
                *engine.state.lock_index() = index;
                tracing::info!(%summary, "Translations loaded");
            }
            Err(error) => {
                tracing::error!(%error, "No translations loaded; text will be shown untranslated");
            }
        }
        engine
    }

    #[must_use]
    pub const fn config(&self) -> &ConfigManager {
        &self.config
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn build_index(&self) -> Result<(TranslationIndex, LoadSummary), LoadError> {
        let names_path = self.config.names_path();
        TranslationIndex::load(
            self.source.as_ref(),
            &self.config.translation_path(),
            names_path.as_deref(),
        )
    }

    /// テーブルを読み直す
    ///
    /// 新しいインデックスを構築してから差し替える。失敗した場合は現在の翻訳を維持する。
    /// 成功すると、それ以前に返したハンドルはすべて無効になる。
    ///
    /// # Errors
    /// メインテーブルが読めず、グローバル名前も読めなかった場合
    pub fn reload(&self) -> Result<LoadSummary, LoadError> {
        let _reload = self.state.lock_reload();
        if self.is_closed() {
            tracing::debug!("Engine closed; reload skipped");
            return Ok(LoadSummary::default());
        }

        let started = Instant::now();
        let (index, summary) = self.build_index().inspect_err(|error| {
            tracing::error!(%error, "Reload failed; keeping previous translations");
        })?;

        {
            let mut current = self.state.lock_index();
            *current = index;
            let generation = self.interner.clear();
            tracing::debug!(generation, "String pool cleared");
        }

        self.reloads.fetch_add(1, Ordering::Relaxed);
        tracing::info!(%summary, elapsed = ?started.elapsed(), "Translations reloaded");
        Ok(summary)
    }

    /// 話者名を翻訳する
    ///
    /// `message` を渡すと、その本文と組になった文脈付き名前を優先する。
    #[must_use]
    pub fn find_name(&self, name: &[u8], message: Option<&[u8]>) -> Option<InternedStr> {
        if self.is_closed() {
            return None;
        }
        let name = encoding::to_universal(name);
        let message = message.map(encoding::to_universal);

        let (lookup, handle) = {
            let index = self.state.lock_index();
            let lookup = lookup::find_name(&index, &name, message.as_deref());
            let handle = lookup.translated().and_then(|translated| self.intern(translated, false));
            (lookup, handle)
        };

        self.log_miss(&lookup);
        handle
    }

    /// 本文・選択肢を翻訳する
    ///
    /// ヒットした本文の位置からシーンが変わっていればコールバックに通知する。
    #[must_use]
    pub fn find_message(&self, message: &[u8]) -> Option<InternedStr> {
        if self.is_closed() {
            return None;
        }
        let message = encoding::to_universal(message);

        let (lookup, handle) = {
            let (index, mut stats) = self.state.lock_index_and_stats();
            let lookup = lookup::find_message(&index, &mut stats, &message);
            drop(stats);
            let handle = lookup.result.translated().and_then(|translated| self.intern(translated, true));
            (lookup, handle)
        };

        if let Some(scene) = lookup.scene {
            self.notify_scene(scene);
        }
        self.log_miss(&lookup.result);
        handle
    }

    /// セーブスロット等のラベルを翻訳する
    #[must_use]
    pub fn find_label(&self, label: &[u8]) -> Option<InternedStr> {
        if self.is_closed() {
            return None;
        }
        let label = encoding::to_universal(label);

        let (lookup, handle) = {
            let index = self.state.lock_index();
            let lookup = lookup::find_label(&index, &label);
            let handle = lookup.translated().and_then(|translated| self.intern(translated, false));
            (lookup, handle)
        };

        self.log_miss(&lookup);
        handle
    }

    /// 台詞 1 行（話者名と本文）をまとめて翻訳する
    #[must_use]
    pub fn translate_dialogue(&self, name: Option<&[u8]>, message: Option<&[u8]>) -> Dialogue {
        let dialogue = Dialogue {
            name: name.and_then(|name| self.find_name(name, message)),
            message: message.and_then(|message| self.find_message(message)),
        };

        if self.config.get_settings().text_logging
            && let Some(original) = message
        {
            let speaker = name.map(encoding::to_universal).unwrap_or_default();
            let translated = self.resolve_text(dialogue.message);
            tracing::info!(
                speaker = %speaker,
                original = %encoding::to_universal(original),
                translated = translated.as_deref().unwrap_or("<untranslated>"),
                "Dialogue"
            );
        }
        dialogue
    }

    /// ハンドルを Shift-JIS バイト列に解決する
    ///
    /// 再読み込みより前のハンドルは `None`。
    #[must_use]
    pub fn resolve(&self, handle: InternedStr) -> Option<Arc<[u8]>> {
        self.interner.resolve(handle)
    }

    /// ハンドルを UTF-8 文字列に解決する
    #[must_use]
    pub fn resolve_text(&self, handle: Option<InternedStr>) -> Option<String> {
        handle.and_then(|handle| self.resolve(handle)).map(|bytes| encoding::to_universal(&bytes))
    }

    /// 差し替え画像を探す
    #[must_use]
    pub fn find_replacement_asset(&self, original: &str) -> Option<PathBuf> {
        if self.is_closed() {
            return None;
        }
        self.assets.find_replacement(original)
    }

    /// 統計を取得し、ログに出す
    pub fn print_stats(&self) -> EngineStats {
        let stats = {
            let (index, stats) = self.state.lock_index_and_stats();
            stats.snapshot(index.counts(), self.reloads.load(Ordering::Relaxed))
        };
        tracing::info!("Translation statistics\n{stats}");
        stats
    }

    /// シーン変化の通知先を設定する
    pub fn set_scene_callback(&self, callback: Box<dyn Fn(&str) + Send + Sync>) {
        *self.scene_callback.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::from(callback));
    }

    /// 現在のシーン位置
    #[must_use]
    pub fn current_scene(&self) -> Option<ScenePosition> {
        self.scene.current()
    }

    /// エンジンを閉じる
    ///
    /// インデックスとプールを破棄し、以後の検索はすべて `None` を返す。
    pub fn close(&self) {
        let _reload = self.state.lock_reload();
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        {
            let mut index = self.state.lock_index();
            *index = TranslationIndex::default();
            self.interner.clear();
        }
        self.scene.reset();
        self.scene_callback.lock().unwrap_or_else(PoisonError::into_inner).take();
        tracing::info!("Translation engine closed");
    }

    /// 翻訳を Shift-JIS に戻してプールに格納する
    ///
    /// 変換できない場合は `None`（原文のまま表示）。
    fn intern(&self, translated: &str, wrap_lines: bool) -> Option<InternedStr> {
        let mut legacy = encoding::to_legacy(translated);
        if legacy.is_empty() {
            return None;
        }

        let max_width = self.config.get_settings().wrap.max_width;
        if wrap_lines && max_width > 0 {
            legacy = wrap::wrap(&legacy, max_width);
        }
        Some(self.interner.store(&legacy))
    }

    fn log_miss(&self, lookup: &Lookup) {
        if let Some(miss) = lookup.miss() {
            self.miss_log.record(miss);
        }
    }

    fn notify_scene(&self, position: ScenePosition) {
        let Some(display) = self.scene.update(position) else {
            return;
        };
        let callback = self.scene_callback.lock().unwrap_or_else(PoisonError::into_inner).clone();
        if let Some(callback) = callback {
            callback(&display);
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("base_dir", &self.config.base_dir())
            .field("state", &"<EngineState>")
            .field("interner", &self.interner)
            .field("reloads", &self.reloads.load(Ordering::Relaxed))
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
