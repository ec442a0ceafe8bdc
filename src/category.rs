use serde::Serialize;

/// Bouquet categories. Each one has its own index file and bouquet file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tv,
    Radio,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Tv, Category::Radio];

    pub fn extension(self) -> &'static str {
        match self {
            Category::Tv => "tv",
            Category::Radio => "radio",
        }
    }

    pub fn index_filename(self) -> String {
        format!("bouquets.{}", self.extension())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}
