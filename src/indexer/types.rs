//! Indexer type definitions.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::encoding::TableEncoding;

#[derive(Error, Debug)]
pub enum LoadError {
    /// The main table could not be read and no global name was loaded.
    #[error("Failed to read translation table '{}': {source}", table.display())]
    NothingLoaded {
        table: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Entry counts of a built index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexCounts {
    pub contextual_names: usize,
    pub names: usize,
    pub messages: usize,
    pub labels: usize,
}

/// What one load read from each table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadSummary {
    /// Encoding of the main table; `None` if it could not be read.
    pub encoding: Option<TableEncoding>,
    /// Rows accepted from the global names table.
    pub global_names: usize,
    /// `NAME` rows paired with a `TEXT`/`MSG` row at the same position.
    pub contextual_names: usize,
    /// `NAME` rows without such a pairing, applied as global overrides.
    pub name_overrides: usize,
    /// `TEXT` and `MSG` rows.
    pub texts: usize,
    /// `CHOICE_*` rows.
    pub choices: usize,
    /// `LABEL` rows.
    pub labels: usize,
    /// Data lines that were skipped as malformed.
    pub skipped: usize,
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoding = self.encoding.map_or_else(|| "unavailable".to_string(), |e| e.to_string());
        write!(
            f,
            "{} global names, {} contextual names, {} name overrides, {} texts, {} choices, {} labels ({encoding}, {} skipped)",
            self.global_names,
            self.contextual_names,
            self.name_overrides,
            self.texts,
            self.choices,
            self.labels,
            self.skipped,
        )
    }
}
