use std::sync::atomic::{AtomicU64, Ordering};

pub mod bitset;
pub mod config;
pub mod errors;
pub mod model;
pub mod selector;

pub use config::Policy;
pub use errors::{TipSelectError, TipSelectResult};
pub use selector::HeaviestSelector;

#[derive(Default)]
pub struct TipSelectCounters {
    pub solid_message_counts: AtomicU64,
    pub duplicate_message_counts: AtomicU64,
    pub selection_counts: AtomicU64,
    pub heaviest_tip_counts: AtomicU64,
    pub random_tip_counts: AtomicU64,
    pub reset_counts: AtomicU64,
}

impl TipSelectCounters {
    pub fn snapshot(&self) -> TipSelectCountersSnapshot {
        TipSelectCountersSnapshot {
            solid_message_counts: self.solid_message_counts.load(Ordering::Relaxed),
            duplicate_message_counts: self.duplicate_message_counts.load(Ordering::Relaxed),
            selection_counts: self.selection_counts.load(Ordering::Relaxed),
            heaviest_tip_counts: self.heaviest_tip_counts.load(Ordering::Relaxed),
            random_tip_counts: self.random_tip_counts.load(Ordering::Relaxed),
            reset_counts: self.reset_counts.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct TipSelectCountersSnapshot {
    pub solid_message_counts: u64,
    pub duplicate_message_counts: u64,
    pub selection_counts: u64,
    pub heaviest_tip_counts: u64,
    pub random_tip_counts: u64,
    pub reset_counts: u64,
}

impl TipSelectCountersSnapshot {
    /// Total tips handed out to the checkpoint issuer.
    pub fn tip_counts(&self) -> u64 {
        self.heaviest_tip_counts + self.random_tip_counts
    }

    /// Average number of tips returned per selection.
    pub fn tips_per_selection(&self) -> f64 {
        if self.selection_counts > 0 {
            self.tip_counts() as f64 / self.selection_counts as f64
        } else {
            0f64
        }
    }
}

impl core::ops::Sub for &TipSelectCountersSnapshot {
    type Output = TipSelectCountersSnapshot;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::Output {
            solid_message_counts: self.solid_message_counts.checked_sub(rhs.solid_message_counts).unwrap_or_default(),
            duplicate_message_counts: self.duplicate_message_counts.checked_sub(rhs.duplicate_message_counts).unwrap_or_default(),
            selection_counts: self.selection_counts.checked_sub(rhs.selection_counts).unwrap_or_default(),
            heaviest_tip_counts: self.heaviest_tip_counts.checked_sub(rhs.heaviest_tip_counts).unwrap_or_default(),
            random_tip_counts: self.random_tip_counts.checked_sub(rhs.random_tip_counts).unwrap_or_default(),
            reset_counts: self.reset_counts.checked_sub(rhs.reset_counts).unwrap_or_default(),
        }
    }
}
