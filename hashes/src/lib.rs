use hex::FromHex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const MESSAGE_ID_SIZE: usize = 32;

/// An opaque fixed-width message identifier. The node treats it as a key only;
/// its preimage and hashing scheme are the concern of the message layer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Debug, Serialize, Deserialize)]
pub struct MessageId([u8; MESSAGE_ID_SIZE]);

impl MessageId {
    pub const fn from_bytes(bytes: [u8; MESSAGE_ID_SIZE]) -> Self {
        MessageId(bytes)
    }

    pub const fn as_bytes(self) -> [u8; MESSAGE_ID_SIZE] {
        self.0
    }

    /// Builds an id whose first eight bytes hold `word` little-endian and whose
    /// remaining bytes are zero. Handy for tests and synthetic dags.
    pub fn from_u64(word: u64) -> Self {
        let mut bytes = [0u8; MESSAGE_ID_SIZE];
        bytes[..8].copy_from_slice(&word.to_le_bytes());
        MessageId(bytes)
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for MessageId {
    type Err = hex::FromHexError;

    fn from_str(id_str: &str) -> Result<Self, Self::Err> {
        <[u8; MESSAGE_ID_SIZE]>::from_hex(id_str).map(MessageId)
    }
}

impl From<u64> for MessageId {
    fn from(word: u64) -> Self {
        Self::from_u64(word)
    }
}

impl AsRef<[u8]> for MessageId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
