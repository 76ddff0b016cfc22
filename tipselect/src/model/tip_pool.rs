use indexmap::IndexSet;
use weave_hashes::MessageId;

/// The set of tracked messages that currently have no tracked child, i.e. the
/// candidate parents for the next checkpoint.
///
/// Iteration follows insertion order, which keeps selection snapshots
/// deterministic for a fixed ingest sequence.
#[derive(Default)]
pub struct TipPool {
    tips: IndexSet<MessageId>,
}

impl TipPool {
    /// Adds `new_tip` to the pool and removes its parents, which are no longer
    /// tips now that a tracked child arrived. Unknown parents are skipped.
    pub fn add_tip(&mut self, new_tip: MessageId, new_tip_parents: &[MessageId]) {
        for parent in new_tip_parents {
            // shift_remove keeps the remaining tips in insertion order
            self.tips.shift_remove(parent);
        }
        self.tips.insert(new_tip);
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.tips.contains(id)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &MessageId> + '_ {
        self.tips.iter()
    }

    pub fn len(&self) -> usize {
        self.tips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tips.is_empty()
    }

    pub fn clear(&mut self) {
        self.tips.clear();
    }
}
