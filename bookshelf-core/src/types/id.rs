//! Document identifiers
//!
//! Identifiers are 12 bytes rendered as 24 lowercase hex characters:
//! a 4-byte big-endian seconds timestamp, a 5-byte value fixed for the
//! lifetime of the process, and a 3-byte counter.

use crate::error::IdError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use uuid::Uuid;

const ID_BYTES: usize = 12;
const COUNTER_MASK: u32 = 0x00ff_ffff;

/// Unique identifier of a stored book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookId([u8; ID_BYTES]);

impl BookId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        let timestamp = chrono::Utc::now().timestamp() as u32;
        let count = next_count();

        let mut bytes = [0u8; ID_BYTES];
        bytes[..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..9].copy_from_slice(process_unique());
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Check whether `s` has the shape of an identifier without allocating one
    pub fn is_valid(s: &str) -> bool {
        s.parse::<Self>().is_ok()
    }

    /// Seconds since the Unix epoch at which the identifier was generated
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

fn process_unique() -> &'static [u8; 5] {
    static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
    PROCESS_UNIQUE.get_or_init(|| {
        let random = Uuid::new_v4().into_bytes();
        [random[0], random[1], random[2], random[3], random[4]]
    })
}

fn next_count() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    COUNTER
        .get_or_init(|| {
            let random = Uuid::new_v4().into_bytes();
            AtomicU32::new(u32::from_be_bytes([0, random[10], random[11], random[12]]))
        })
        .fetch_add(1, Ordering::Relaxed)
        & COUNTER_MASK
}

impl FromStr for BookId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ID_BYTES * 2 {
            return Err(IdError::InvalidLength(s.len()));
        }
        let mut bytes = [0u8; ID_BYTES];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|_| IdError::InvalidCharacter(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for BookId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BookId> for String {
    fn from(id: BookId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}
