//! File name matcher for hot-reload watch patterns.

use std::path::Path;

use globset::{
    GlobBuilder,
    GlobSet,
    GlobSetBuilder,
};

#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("Invalid watch pattern '{pattern}': {source}")]
    InvalidWatchPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to build glob set: {0}")]
    GlobSetBuild(#[from] globset::Error),
}

/// Matches changed file names against `hotReload.watchPatterns`.
///
/// Only the final path component is compared, case-insensitively, so a
/// change reported as `C:\Game\Translation.TSV` matches `translation.tsv`.
#[derive(Debug, Clone)]
pub struct WatchMatcher {
    set: GlobSet,
}

impl WatchMatcher {
    pub fn new(patterns: &[String]) -> Result<Self, MatcherError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = GlobBuilder::new(pattern).case_insensitive(true).build().map_err(|source| {
                MatcherError::InvalidWatchPattern { pattern: pattern.clone(), source }
            })?;
            builder.add(glob);
        }
        Ok(Self { set: builder.build()? })
    }

    /// Returns true if the file name of `path` matches any pattern.
    #[must_use]
    pub fn is_watched(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| self.set.is_match(Path::new(name)))
    }
}
