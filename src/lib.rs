pub mod bouquet;
pub mod category;
pub mod classifier;
pub mod flags;
pub mod reader;
pub mod reload;
pub mod tuners;
pub mod writer;

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use classifier::{classify, ClassifySummary};
use reader::BouquetReader;
use writer::{BouquetWriter, WriteSummary};

/// Where bouquets are read from and written to. Both may be the same
/// directory, in which case the files are rewritten in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupConfig {
    pub source: PathBuf,
    pub target: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Hide services on unreachable networks and bouquets left without any.
    HideUnreachable,
    /// Make every service and bouquet visible again.
    ReinstateAll,
}

impl Mode {
    pub fn hide_unreachable(self) -> bool {
        self == Mode::HideUnreachable
    }

    pub fn show_all(self) -> bool {
        self == Mode::ReinstateAll
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub mode: Mode,
    pub index_rows: usize,
    pub bouquets: usize,
    pub services: ClassifySummary,
    pub written: WriteSummary,
}

/// Reads, classifies and writes the bouquets in one go.
pub fn run_cleanup(config: &CleanupConfig, reachable: &BTreeSet<u32>, mode: Mode) -> Result<RunSummary> {
    info!(
        "Cleaning bouquets from {} into {} ({:?})",
        config.source.display(),
        config.target.display(),
        mode
    );

    let mut bouquets = BouquetReader::new(&config.source).read();
    let index_rows = bouquets.values().map(Vec::len).sum();
    let loaded = bouquets
        .values()
        .flatten()
        .filter(|entry| entry.bouquet().is_some())
        .count();

    let services = classify(&mut bouquets, reachable, mode.hide_unreachable());
    let written = BouquetWriter::new(&config.target).write(&mut bouquets, mode.show_all())?;

    Ok(RunSummary {
        mode,
        index_rows,
        bouquets: loaded,
        services,
        written,
    })
}
