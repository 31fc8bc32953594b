//! Planning of which batches a bounded operation touches.

use crate::cache::{batch_of, BATCH_SIZE};

/// The ids eligible for bounded operations: the `retention` most recent
/// ids at or below `latest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdWindow {
    pub floor: u64,
    pub latest: u64,
}

impl IdWindow {
    /// `None` when the table is empty (`latest == 0`) or nothing is retained.
    pub fn new(latest: u64, retention: u64) -> Option<Self> {
        if latest == 0 || retention == 0 {
            return None;
        }
        Some(Self {
            floor: latest.saturating_sub(retention - 1),
            latest,
        })
    }

    pub fn contains(&self, id: u64) -> bool {
        id >= self.floor && id <= self.latest
    }

    pub fn len(&self) -> u64 {
        (self.latest - self.floor).saturating_add(1)
    }

    /// Batch ids overlapping the window, newest first.
    pub fn batches_desc(&self) -> Vec<u64> {
        (batch_of(self.floor)..=batch_of(self.latest))
            .rev()
            .step_by(BATCH_SIZE as usize)
            .collect()
    }

    /// How many batches, counted from the newest, are needed to cover
    /// `limit` ids of the window.
    pub fn batches_to_cover(&self, limit: usize) -> usize {
        let mut covered = 0u64;
        let mut count = 0;
        for batch in self.batches_desc() {
            let top = self.latest.min(batch.saturating_add(BATCH_SIZE - 1));
            let bottom = self.floor.max(batch);
            covered += top - bottom + 1;
            count += 1;
            if covered >= limit as u64 {
                break;
            }
        }
        count
    }

    /// Window ids, newest first.
    pub fn ids_desc(&self) -> impl Iterator<Item = u64> {
        (self.floor..=self.latest).rev()
    }
}

/// The `ceil(retention / BATCH_SIZE)` most recent batches at or below
/// `latest`, in ascending order.
pub fn search_batches(latest: u64, retention: u64) -> Vec<u64> {
    let count = retention.div_ceil(BATCH_SIZE) as usize;
    let mut batches: Vec<u64> = (0..=batch_of(latest))
        .rev()
        .step_by(BATCH_SIZE as usize)
        .take(count)
        .collect();
    batches.reverse();
    batches
}
