//! Id→batch resolution and the per-session batch caches.
//!
//! Items live in fixed-size batch files (`<entity>.<batch_start>.json`).
//! Every piece of code that maps an id to its batch goes through
//! [`batch_of`].

mod batch;
mod entity;

pub use batch::BatchCache;
pub use entity::{Batched, Caches};

/// Number of consecutive ids held by one batch file.
pub const BATCH_SIZE: u64 = 100;

/// First id of the batch holding `id`.
pub fn batch_of(id: u64) -> u64 {
    id / BATCH_SIZE * BATCH_SIZE
}

/// Resource name of a batch file, e.g. `news_raw.200`.
pub fn batch_resource(entity: &str, batch_id: u64) -> String {
    format!("{}.{}", entity, batch_of(batch_id))
}
