//! Batched data access for a static news site.
//!
//! News data is published as JSON files: whole lists for small tables
//! (`news_sources`, `tags`, `tag_articles`), a `meta` snapshot, and
//! 100-id batch files for raw items (`news_raw.<n>`) and clusters
//! (`news_articles.<n>`). [`NewsStore`] fetches, caches and aggregates
//! them for whoever renders pages.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod store;

pub use cache::{batch_of, Batched, Caches, BATCH_SIZE};
pub use config::Config;
pub use error::{AppError, Result, Unavailable};
pub use fetch::{DirTransport, FileFetcher, HttpTransport, Transport};
pub use store::NewsStore;
