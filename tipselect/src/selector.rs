use crate::bitset::RefsBitset;
use crate::config::Policy;
use crate::errors::{TipSelectError, TipSelectResult};
use crate::model::message::{MessageMeta, TrackedMessage};
use crate::model::tip_pool::TipPool;
use crate::TipSelectCounters;
use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, trace};
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use weave_hashes::MessageId;

/// Implements the heaviest branch selection strategy for checkpoint tips.
///
/// Solidified messages are fed in solidification order via
/// `on_new_solid_message`; the checkpoint issuer periodically calls
/// `select_tips` to obtain the parents of the next checkpoint.
pub struct HeaviestSelector {
    policy: Policy,
    counters: Arc<TipSelectCounters>,
    state: Mutex<SelectorState>,
}

#[derive(Default)]
struct SelectorState {
    /// All messages tracked since the last reset, keyed by id
    tracked: HashMap<MessageId, TrackedMessage>,

    /// The current tips among the tracked messages
    tips: TipPool,
}

/// A frozen working copy of the tip pool used by a single selection call.
///
/// The `refs` bitsets are deep copies: selection thins them in place as tips
/// get picked, while the originals under the selector lock stay untouched, so
/// a failed selection leaves the selector state exactly as it found it.
struct WorkingSet {
    entries: IndexMap<MessageId, RefsBitset>,
}

impl WorkingSet {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Scans all entries for the one referencing the most messages not yet
    /// covered by previously picked tips. Ties are broken uniformly at random.
    /// Returns the winning tip and its count, or `None` if the set is empty.
    fn heaviest_tip<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(MessageId, u64)> {
        let best = self.entries.iter().max_set_by_key(|(_, refs)| refs.count_ones());
        if best.is_empty() {
            return None;
        }
        let (id, refs) = best[rng.gen_range(0..best.len())];
        Some((*id, refs.count_ones()))
    }

    /// Draws a uniformly random tip from the set, or `None` if it is empty.
    fn random_tip<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<MessageId> {
        if self.entries.is_empty() {
            return None;
        }
        self.entries.get_index(rng.gen_range(0..self.entries.len())).map(|(id, _)| *id)
    }

    /// Removes `tip` from the set and clears all bits referenced by it in the
    /// remaining entries, so that subsequent counts only measure messages not
    /// already covered by the chosen tips.
    fn reference_tip(&mut self, tip: &MessageId) {
        if let Some(refs) = self.entries.swap_remove(tip) {
            for (_, other_refs) in self.entries.iter_mut() {
                other_refs.difference_with(&refs);
            }
        }
    }
}

impl HeaviestSelector {
    pub fn new(policy: Policy) -> Self {
        Self { policy, counters: Arc::new(TipSelectCounters::default()), state: Mutex::new(SelectorState::default()) }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn counters(&self) -> Arc<TipSelectCounters> {
        self.counters.clone()
    }

    /// Adds a new message to be tracked by the selector and returns the number
    /// of tracked messages.
    ///
    /// The message must be solid and must be fed in the order of
    /// solidification, so that any tracked ancestor was fed before it. Parents
    /// outside the current tracking window are ignored. Feeding the same
    /// message twice is a no-op.
    pub fn on_new_solid_message(&self, meta: &impl MessageMeta) -> usize {
        let mut state = self.state.lock();

        // filter duplicate messages
        if state.tracked.contains_key(&meta.id()) {
            self.counters.duplicate_message_counts.fetch_add(1, Ordering::Relaxed);
            return state.tracked.len();
        }

        // Every tracked message is represented by a unique bit. The new
        // message gets the next free bit and inherits the referenced cones of
        // both parents via bitset union, so its `refs` marks exactly the
        // tracked messages it would confirm.
        let bit_index = state.tracked.len();
        let mut refs = RefsBitset::with_capacity(bit_index + 1);
        refs.set(bit_index);
        let parents = [meta.parent1(), meta.parent2()];
        for parent in parents.iter() {
            if let Some(parent_msg) = state.tracked.get(parent) {
                refs.union_with(&parent_msg.refs);
            }
        }
        state.tracked.insert(meta.id(), TrackedMessage { id: meta.id(), bit_index, refs });

        // The parents now have a tracked child and stop being tips
        state.tips.add_tip(meta.id(), &parents);

        self.counters.solid_message_counts.fetch_add(1, Ordering::Relaxed);
        state.tracked.len()
    }

    /// The number of messages tracked since the last reset. Safe to call
    /// concurrently; intended for metrics.
    pub fn tracked_count(&self) -> usize {
        self.state.lock().tracked.len()
    }

    /// Clears all tracked messages and tips.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        *state = SelectorState::default();
        self.counters.reset_counts.fetch_add(1, Ordering::Relaxed);
        trace!("tip selector state was reset");
    }

    /// Collects tips that confirm the most messages tracked since the last
    /// reset of the selector.
    ///
    /// Heaviest tips are determined by counting the referenced messages of
    /// each candidate and thinning the referenced cone of every chosen tip out
    /// of the remaining candidates' bitsets, so each pick is weighed by its
    /// contribution beyond what was already selected. Only tips present at the
    /// beginning of the call are considered, preventing an attacker from
    /// growing heavier branches while the search runs.
    ///
    /// Up to `Policy::max_heaviest_tips` heaviest tips are collected. Once
    /// more than `min_required` tips were picked, collection stops as soon as
    /// the best remaining contribution falls below
    /// `Policy::min_heaviest_threshold` or the `Policy::deadline` budget is
    /// exhausted (returning the tips collected so far). If at least one
    /// heaviest tip was found, up to `Policy::random_tips` random tips are
    /// appended to make parasite chains costlier.
    ///
    /// On success the whole selector is reset; on `NoTipsAvailable` the state
    /// is left untouched.
    pub fn select_tips(&self, min_required: usize) -> TipSelectResult<Vec<MessageId>> {
        self.select_tips_with_rng(min_required, &mut rand::thread_rng())
    }

    /// Same as `select_tips`, drawing tie-breaks and random tips from the
    /// provided generator. Useful for deterministic selection in tests.
    pub fn select_tips_with_rng<R: Rng + ?Sized>(&self, min_required: usize, rng: &mut R) -> TipSelectResult<Vec<MessageId>> {
        // Freeze the current tips into a working copy so the scan below runs
        // without the lock and against a fixed view of the dag
        let mut working = {
            let state = self.state.lock();
            WorkingSet {
                entries: state
                    .tips
                    .iter()
                    .map(|id| (*id, state.tracked.get(id).expect("a tip is always tracked").refs.clone()))
                    .collect(),
            }
        };

        // tips could be empty after a reset
        if working.is_empty() {
            return Err(TipSelectError::NoTipsAvailable);
        }

        let deadline = Instant::now() + self.policy.deadline;
        let mut selected = Vec::new();

        for _ in 0..self.policy.max_heaviest_tips {
            let Some((tip, count)) = working.heaviest_tip(rng) else {
                break;
            };

            if selected.len() > min_required && (count < self.policy.min_heaviest_threshold || Instant::now() >= deadline) {
                // the minimum amount of tips was reached and the heaviest
                // branch does not confirm enough messages or the budget is
                // spent, so collecting more is not worth it
                trace!("stopping heaviest selection at {} tips, best remaining contribution {}", selected.len(), count);
                break;
            }

            working.reference_tip(&tip);
            trace!("selected heaviest tip {} confirming {} newly referenced messages", tip, count);
            selected.push(tip);
        }

        if selected.is_empty() {
            return Err(TipSelectError::NoTipsAvailable);
        }

        let heaviest_count = selected.len();

        // also pick random tips if at least one heaviest branch tip was found
        for _ in 0..self.policy.random_tips {
            let Some(tip) = working.random_tip(rng) else {
                break;
            };
            working.reference_tip(&tip);
            selected.push(tip);
        }

        debug!(
            "tip selection returned {} heaviest and {} random tips out of {} candidates",
            heaviest_count,
            selected.len() - heaviest_count,
            working.len() + selected.len()
        );

        self.counters.selection_counts.fetch_add(1, Ordering::Relaxed);
        self.counters.heaviest_tip_counts.fetch_add(heaviest_count as u64, Ordering::Relaxed);
        self.counters.random_tip_counts.fetch_add((selected.len() - heaviest_count) as u64, Ordering::Relaxed);

        // valid tips were found, so the next selection starts from a clean slate
        self.reset();

        Ok(selected)
    }
}
