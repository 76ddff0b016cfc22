use crate::errors::{TipSelectError, TipSelectResult};
use std::time::Duration;

/// Policy houses the configuration parameters which control the selection of
/// checkpoint tips. See `HeaviestSelector::select_tips` for details on how
/// each of these parameters is used.
#[derive(Clone, Debug)]
pub struct Policy {
    /// Minimum number of newly referenced messages a heaviest tip must contribute
    /// for the selection to keep collecting once `min_required` tips were reached.
    pub(crate) min_heaviest_threshold: u64,

    /// Maximum number of heaviest-branch tips collected per selection.
    pub(crate) max_heaviest_tips: usize,

    /// Number of random tips appended after heaviest selection, applied only if
    /// at least one heaviest tip was found.
    pub(crate) random_tips: usize,

    /// Wall-clock budget for a single selection call. Keeping it short keeps the
    /// view on the dag recent.
    pub(crate) deadline: Duration,
}

impl Policy {
    pub fn new(
        min_heaviest_threshold: u64,
        max_heaviest_tips: usize,
        random_tips: usize,
        deadline: Duration,
    ) -> TipSelectResult<Self> {
        if max_heaviest_tips == 0 {
            return Err(TipSelectError::InvalidPolicy("max_heaviest_tips must be at least 1"));
        }
        Ok(Self { min_heaviest_threshold, max_heaviest_tips, random_tips, deadline })
    }

    pub fn max_selected_tips(&self) -> usize {
        self.max_heaviest_tips + self.random_tips
    }
}
