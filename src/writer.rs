use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::bouquet::{Bouquet, CategoryMap};
use crate::flags::{clear_invisible, set_invisible, update_flags};

#[derive(Debug, Default, Clone, Serialize)]
pub struct WriteSummary {
    pub files_written: Vec<PathBuf>,
    /// Filenames of bouquets whose index row was marked invisible.
    pub bouquets_hidden: Vec<String>,
    /// Files that could not be written; the run carried on without them.
    pub failures: Vec<WriteFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Whether the index row of a bouquet stays visible. Bouquets the classifier
/// never saw count as having no active services.
pub fn keep_visible(bouquet: &Bouquet, show_all: bool) -> bool {
    show_all || bouquet.active_services.unwrap_or(0) > 0 || bouquet.is_protected()
}

pub struct BouquetWriter {
    path: PathBuf,
}

impl BouquetWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes every loaded bouquet and the index files, updating each index
    /// row's visibility to match its bouquet.
    ///
    /// Only failing to create the target directory is an error; single files
    /// that cannot be written are logged and reported in the summary.
    pub fn write(&self, map: &mut CategoryMap, show_all: bool) -> Result<WriteSummary> {
        let mut summary = WriteSummary::default();

        for (category, entries) in map.iter_mut() {
            std::fs::create_dir_all(&self.path)
                .with_context(|| format!("creating target directory {:?}", self.path))?;

            let mut index = Vec::with_capacity(entries.len());
            for entry in entries.iter_mut() {
                if let Some(bouquet) = entry.bouquet() {
                    self.write_file(&bouquet.filename, &bouquet.render(), &mut summary);

                    let visible = keep_visible(bouquet, show_all);
                    let update: fn(u32) -> u32 = if visible { clear_invisible } else { set_invisible };
                    match update_flags(&entry.raw_line, update) {
                        Some(row) => {
                            if !visible {
                                debug!("Hiding bouquet {} ({})", bouquet.filename, bouquet.name);
                                summary.bouquets_hidden.push(bouquet.filename.clone());
                            }
                            entry.raw_line = row;
                        }
                        None => warn!(
                            "Index row for {} has no flags field, leaving it as is: {:?}",
                            bouquet.filename, entry.raw_line
                        ),
                    }
                }
                index.push(entry.raw_line.as_str());
            }

            if index.is_empty() {
                debug!("No index rows for {}, not writing an index", category);
                continue;
            }
            self.write_file(&category.index_filename(), &index.join("\n"), &mut summary);
        }

        info!(
            "Wrote {} files to {} ({} bouquets hidden, {} failures)",
            summary.files_written.len(),
            self.path.display(),
            summary.bouquets_hidden.len(),
            summary.failures.len()
        );
        Ok(summary)
    }

    fn write_file(&self, filename: &str, content: &str, summary: &mut WriteSummary) {
        let path = self.path.join(filename);
        match std::fs::write(&path, content) {
            Ok(()) => summary.files_written.push(path),
            Err(e) => {
                error!("Failed to write {:?}: {}", path, e);
                summary.failures.push(WriteFailure {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }
}
