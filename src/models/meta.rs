use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of how much data the API holds, one entry per table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, deserialize_with = "super::lenient_datetime")]
    pub generated_at: Option<DateTime<Utc>>,
    pub tables: Tables,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    pub news_articles: TableMeta,
    #[serde(default)]
    pub news_raw: TableMeta,
    #[serde(default)]
    pub news_sources: TableMeta,
    #[serde(default)]
    pub tag_articles: TableMeta,
    #[serde(default)]
    pub tags: TableMeta,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    #[serde(default)]
    pub latest_id: u64,
}

/// Tables described by [`Meta`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    NewsArticles,
    NewsRaw,
    NewsSources,
    TagArticles,
    Tags,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::NewsArticles => "news_articles",
            Table::NewsRaw => "news_raw",
            Table::NewsSources => "news_sources",
            Table::TagArticles => "tag_articles",
            Table::Tags => "tags",
        }
    }

    pub fn all() -> [Table; 5] {
        [
            Table::NewsArticles,
            Table::NewsRaw,
            Table::NewsSources,
            Table::TagArticles,
            Table::Tags,
        ]
    }
}

impl Meta {
    pub fn latest_id(&self, table: Table) -> u64 {
        let entry = match table {
            Table::NewsArticles => &self.tables.news_articles,
            Table::NewsRaw => &self.tables.news_raw,
            Table::NewsSources => &self.tables.news_sources,
            Table::TagArticles => &self.tables.tag_articles,
            Table::Tags => &self.tables.tags,
        };
        entry.latest_id
    }
}
