//! 差し替えアセットの探索

use std::path::{
    Component,
    Path,
    PathBuf,
};

use crate::config::AssetConfig;

/// 差し替えアセットのパス解決
///
/// 探索順:
/// 1. 元パス（相対形）をそのまま
/// 2. 1 の拡張子を代替拡張子に変更
/// 3. ファイル名のみ（ディレクトリを平坦化）
/// 4. 3 の拡張子を代替拡張子に変更
#[derive(Debug, Clone)]
pub struct AssetPathResolver {
    /// `assets.enabled`
    enabled: bool,
    /// 置き換えアセットのルート
    root: PathBuf,
    /// 代替の画像拡張子（ドットなし）
    alternate_extension: String,
}

impl AssetPathResolver {
    #[must_use]
    pub fn new(enabled: bool, root: PathBuf, alternate_extension: impl Into<String>) -> Self {
        Self { enabled, root, alternate_extension: alternate_extension.into() }
    }

    /// 設定から作成する（`replacementRoot` はゲームディレクトリ基準）
    #[must_use]
    pub fn from_config(config: &AssetConfig, base_dir: &Path) -> Self {
        Self::new(
            config.enabled,
            base_dir.join(&config.replacement_root),
            config.alternate_extension.clone(),
        )
    }

    /// 存在する最初の候補を返す
    #[must_use]
    pub fn find_replacement(&self, original: &str) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }
        let found = self.candidates(original).into_iter().find(|candidate| candidate.exists());
        match &found {
            Some(path) => tracing::debug!(original, replacement = %path.display(), "Asset replaced"),
            None => tracing::trace!(original, "No replacement asset"),
        }
        found
    }

    /// 探索候補を探索順で返す
    #[must_use]
    pub fn candidates(&self, original: &str) -> Vec<PathBuf> {
        let relative = subtree_relative(original);
        let Some(file_name) = relative.file_name().map(PathBuf::from) else {
            return Vec::new();
        };

        let mut candidates = Vec::with_capacity(4);
        for base in [relative, file_name] {
            let path = self.root.join(&base);
            let alternate = path.with_extension(&self.alternate_extension);
            candidates.push(path);
            candidates.push(alternate);
        }
        candidates
    }
}

/// ゲームが渡すパス（`res\bg\a.gyu`、`.\res\a.gyu` など）を相対パスに正規化する
fn subtree_relative(original: &str) -> PathBuf {
    let normalized = original.replace('\\', "/");
    Path::new(&normalized)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part),
            Component::Prefix(_) | Component::RootDir | Component::CurDir | Component::ParentDir => {
                None
            }
        })
        .collect()
}
