mod meta;
mod news;
mod source;
mod taxonomy;

pub use meta::{Meta, Table, TableMeta, Tables};
pub use news::{Cluster, RawItem, SourceRef};
pub use source::Source;
pub use taxonomy::{Tag, TagArticles, TagTree};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Upstream rows sometimes carry `null` where a list is expected.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a timestamp in whatever shape upstream wrote it: RFC 3339, a bare
/// `YYYY-MM-DD HH:MM:SS` taken as UTC, or unix seconds. Anything else reads
/// as `None` instead of failing the whole document.
fn lenient_datetime<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => parse_datetime(&s),
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    };
    Ok(parsed)
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| {
            tracing::debug!("unparseable timestamp {:?}", s);
            None
        })
}
