use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::bouquet::{
    empty_category_map, is_service_line, Bouquet, BouquetSource, CategoryMap, IndexEntry,
    DESCRIPTION_PREFIX, NAME_PREFIX, UNKNOWN_NAME,
};
use crate::category::Category;

lazy_static! {
    // `#SERVICE 1:7:1:0:0:0:0:0:0:0:FROM BOUQUET "userbouquet.a.tv" ORDER BY bouquet`
    static ref RE_BOUQUET_REF: Regex =
        Regex::new(r#"^.*FROM BOUQUET "(.+)" ORDER BY.*$"#).expect("bouquet reference pattern");
    // `#SERVICE: 1:7:1:0:0:0:0:0:0:0:userbouquet.a.tv`
    static ref RE_SERVICE_REF: Regex =
        Regex::new(r"(?i)^#SERVICE: (?:[0-9a-f]+:)+([^:]+\.(?:tv|radio))$")
            .expect("service reference pattern");
}

/// Bouquet file referenced by an index row. The two row shapes are tried in
/// a fixed order and the first match wins.
pub fn extract_filename(row: &str) -> Option<&str> {
    RE_BOUQUET_REF
        .captures(row)
        .or_else(|| RE_SERVICE_REF.captures(row))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Display name from the first line of a bouquet file.
pub fn display_name(first_line: &str) -> String {
    match first_line.strip_prefix(NAME_PREFIX) {
        Some(name) => name.to_string(),
        None => UNKNOWN_NAME.to_string(),
    }
}

/// Splits bouquet content into logical lines, folding each `#DESCRIPTION`
/// line into the service line above it.
pub fn parse_bouquet(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for item in content.split('\n') {
        match lines.last_mut() {
            Some(last) if item.starts_with(DESCRIPTION_PREFIX) && is_service_line(last) => {
                last.push('\n');
                last.push_str(item);
            }
            _ => lines.push(item.to_string()),
        }
    }
    lines
}

pub struct BouquetReader {
    path: PathBuf,
}

impl BouquetReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the index and bouquet files of every category. Never fails: files
    /// that cannot be read are skipped and logged.
    pub fn read(&self) -> CategoryMap {
        let mut map = empty_category_map();
        for category in Category::ALL {
            let entries = self.read_index(category);
            let loaded = entries.iter().filter(|e| e.bouquet().is_some()).count();
            info!(
                "Read {} index rows ({} bouquets loaded) for {} from {}",
                entries.len(),
                loaded,
                category,
                self.path.display()
            );
            map.insert(category, entries);
        }
        map
    }

    fn read_index(&self, category: Category) -> Vec<IndexEntry> {
        let path = self.path.join(category.index_filename());
        match std::fs::read(&path) {
            Ok(bytes) => self.parse_index(&String::from_utf8_lossy(&bytes)),
            Err(e) => {
                info!("No index for {} at {:?} ({}), skipping", category, path, e);
                Vec::new()
            }
        }
    }

    /// Parses index file content, resolving referenced bouquets relative to
    /// this reader's directory.
    pub fn parse_index(&self, content: &str) -> Vec<IndexEntry> {
        content
            .split('\n')
            .map(|row| {
                let row = row.trim();
                match extract_filename(row) {
                    Some(filename) => IndexEntry {
                        raw_line: row.to_string(),
                        source: self.load(filename),
                    },
                    None => IndexEntry::inline(row),
                }
            })
            .collect()
    }

    fn load(&self, filename: &str) -> BouquetSource {
        let path = self.path.join(filename);
        let name = match read_first_line(&path) {
            Ok(first) => display_name(&first),
            Err(e) => {
                warn!("Cannot open bouquet {:?}: {:#}", path, e);
                return BouquetSource::Missing {
                    filename: filename.to_string(),
                };
            }
        };
        match std::fs::read(&path) {
            Ok(bytes) => {
                let lines = parse_bouquet(&String::from_utf8_lossy(&bytes));
                debug!("Loaded {} ({}): {} lines", filename, name, lines.len());
                BouquetSource::Loaded(Bouquet {
                    filename: filename.to_string(),
                    name,
                    lines,
                    active_services: None,
                })
            }
            Err(e) => {
                warn!("Cannot read bouquet {:?}: {}", path, e);
                BouquetSource::Unreadable {
                    filename: filename.to_string(),
                    name,
                }
            }
        }
    }
}

fn read_first_line(path: &Path) -> Result<String> {
    let file = File::open(path).with_context(|| format!("opening {:?}", path))?;
    let mut buf = Vec::new();
    BufReader::new(file)
        .read_until(b'\n', &mut buf)
        .with_context(|| format!("reading {:?}", path))?;
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
