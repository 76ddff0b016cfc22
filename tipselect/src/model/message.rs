use crate::bitset::RefsBitset;
use weave_hashes::{MessageId, MESSAGE_ID_SIZE};

/// `message::NONE` is an id which is used to mark an absent parent reference.
/// It is never tracked, so the selector ignores it like any other unknown parent.
pub const NONE: MessageId = MessageId::from_bytes([0u8; MESSAGE_ID_SIZE]);

/// Metadata accessor for a solidified message: its id and its two parent
/// references. The solidification pipeline implements this for whatever
/// representation it stores messages in.
pub trait MessageMeta {
    fn id(&self) -> MessageId;
    fn parent1(&self) -> MessageId;
    fn parent2(&self) -> MessageId;
}

/// A plain solidified-message record, sufficient for feeding the selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolidMessage {
    pub id: MessageId,
    pub parent1: MessageId,
    pub parent2: MessageId,
}

impl SolidMessage {
    pub fn new(id: MessageId, parent1: MessageId, parent2: MessageId) -> Self {
        Self { id, parent1, parent2 }
    }
}

impl MessageMeta for SolidMessage {
    fn id(&self) -> MessageId {
        self.id
    }

    fn parent1(&self) -> MessageId {
        self.parent1
    }

    fn parent2(&self) -> MessageId {
        self.parent2
    }
}

/// A message tracked by the selector.
///
/// Every tracked message is represented by a unique bit. `refs` stores the
/// union of the parents' `refs` plus the message's own bit, i.e. the set of
/// tracked messages in this message's past cone (itself included).
#[derive(Clone, Debug)]
pub struct TrackedMessage {
    pub id: MessageId,

    /// Bit position assigned at insertion time; equals the number of messages
    /// tracked before this one, so positions are dense and 0-based.
    pub bit_index: usize,

    /// Bits of all tracked messages referenced by this message.
    pub refs: RefsBitset,
}
