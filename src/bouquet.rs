use std::collections::BTreeMap;

use serde::Serialize;

use crate::category::Category;

pub const SERVICE_PREFIX: &str = "#SERVICE ";
pub const DESCRIPTION_PREFIX: &str = "#DESCRIPTION ";
pub const NAME_PREFIX: &str = "#NAME ";
pub const UNKNOWN_NAME: &str = "Unknown";

/// Marks a service that points at an internet stream rather than a tuner.
const STREAM_MARKER: &str = ":http";

/// Bouquets that stay visible even when nothing in them is reachable.
pub const PROTECTED_BOUQUETS: [&str; 3] = [
    "userbouquet.LastScanned.tv",
    "userbouquet.favourites.tv",
    "userbouquet.favourites.radio",
];

pub fn is_protected(filename: &str) -> bool {
    PROTECTED_BOUQUETS.contains(&filename)
}

pub fn is_service_line(line: &str) -> bool {
    line.starts_with(SERVICE_PREFIX)
}

pub fn is_stream_line(line: &str) -> bool {
    is_service_line(line) && line.contains(STREAM_MARKER)
}

/// A loaded bouquet file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bouquet {
    pub filename: String,
    pub name: String,
    /// Logical lines. A `#DESCRIPTION` line is folded into the service
    /// line above it, separated by `\n`.
    pub lines: Vec<String>,
    /// Services counted as active, set by the classifier.
    pub active_services: Option<usize>,
}

impl Bouquet {
    pub fn is_protected(&self) -> bool {
        is_protected(&self.filename)
    }

    /// The file as it is written back.
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

/// What an index row refers to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BouquetSource {
    /// Free text or an inline service; passed through as is.
    Inline,
    /// The referenced file could not be opened.
    Missing { filename: String },
    /// The name line was read but the full file was not.
    Unreadable { filename: String, name: String },
    Loaded(Bouquet),
}

/// One row of a `bouquets.<category>` index file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexEntry {
    pub raw_line: String,
    pub source: BouquetSource,
}

impl IndexEntry {
    pub fn inline(raw_line: impl Into<String>) -> Self {
        Self {
            raw_line: raw_line.into(),
            source: BouquetSource::Inline,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        match &self.source {
            BouquetSource::Inline => None,
            BouquetSource::Missing { filename } | BouquetSource::Unreadable { filename, .. } => {
                Some(filename.as_str())
            }
            BouquetSource::Loaded(bouquet) => Some(bouquet.filename.as_str()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match &self.source {
            BouquetSource::Unreadable { name, .. } => Some(name.as_str()),
            BouquetSource::Loaded(bouquet) => Some(bouquet.name.as_str()),
            _ => None,
        }
    }

    pub fn bouquet(&self) -> Option<&Bouquet> {
        match &self.source {
            BouquetSource::Loaded(bouquet) => Some(bouquet),
            _ => None,
        }
    }

    pub fn bouquet_mut(&mut self) -> Option<&mut Bouquet> {
        match &mut self.source {
            BouquetSource::Loaded(bouquet) => Some(bouquet),
            _ => None,
        }
    }
}

/// Index entries per category, in file order.
pub type CategoryMap = BTreeMap<Category, Vec<IndexEntry>>;

pub fn empty_category_map() -> CategoryMap {
    Category::ALL.into_iter().map(|c| (c, Vec::new())).collect()
}
