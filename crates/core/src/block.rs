//! Blocks and the factory that derives new candidates from the chain head.

use crate::hash::{hash_concat, optional_hex, Hash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in the ledger.
///
/// Fields are private: a block built through [`Block::genesis`] or
/// [`BlockFactory`] carries a hash that matches its contents, and nothing can
/// rewrite it in place afterwards. Blocks from untrusted sources come in
/// through [`Block::from_parts`] or deserialization and must be validated.
///
/// The serialized form is the service's wire shape: `Index`, `Timestamp`,
/// `BPM`, `Hash` and `PrevHash`, with `""` for the genesis prev hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    index: u64,
    timestamp: DateTime<Utc>,
    #[serde(rename = "BPM")]
    payload: i64,
    hash: Hash,
    #[serde(with = "optional_hex")]
    prev_hash: Option<Hash>,
}

impl Block {
    /// Create the genesis block stamped with the current time.
    pub fn genesis() -> Self {
        Self::genesis_at(Utc::now())
    }

    /// Create the genesis block with an explicit timestamp.
    pub fn genesis_at(timestamp: DateTime<Utc>) -> Self {
        Self::sealed(0, timestamp, 0, None)
    }

    /// Build a block and compute its hash over the given fields.
    pub fn sealed(index: u64, timestamp: DateTime<Utc>, payload: i64, prev_hash: Option<Hash>) -> Self {
        let hash = compute_hash(index, &timestamp, payload, prev_hash.as_ref());
        Self {
            index,
            timestamp,
            payload,
            hash,
            prev_hash,
        }
    }

    /// Reassemble a block from raw fields without recomputing the hash.
    ///
    /// The result may be inconsistent; callers must run it through the
    /// validator before trusting it.
    pub fn from_parts(
        index: u64,
        timestamp: DateTime<Utc>,
        payload: i64,
        prev_hash: Option<Hash>,
        hash: Hash,
    ) -> Self {
        Self {
            index,
            timestamp,
            payload,
            hash,
            prev_hash,
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn payload(&self) -> i64 {
        self.payload
    }

    /// The hash recorded at construction.
    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// Hash of the predecessor, `None` only for genesis.
    pub fn prev_hash(&self) -> Option<Hash> {
        self.prev_hash
    }

    /// Recompute the digest from the block's current fields.
    pub fn compute_hash(&self) -> Hash {
        compute_hash(self.index, &self.timestamp, self.payload, self.prev_hash.as_ref())
    }

    /// Check if this block has the shape of a genesis block.
    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.prev_hash.is_none()
    }
}

/// Digest over the canonical encoding of a block's fields.
///
/// Layout: index (u64 LE), timestamp seconds (i64 LE), timestamp
/// sub-second nanos (u32 LE), payload (i64 LE), then a presence tag byte
/// followed by the 32 raw bytes of the previous hash when present.
pub fn compute_hash(index: u64, timestamp: &DateTime<Utc>, payload: i64, prev_hash: Option<&Hash>) -> Hash {
    let (tag, prev): (u8, &[u8]) = match prev_hash {
        Some(h) => (1, h.as_bytes().as_slice()),
        None => (0, &[]),
    };

    hash_concat(&[
        &index.to_le_bytes(),
        &timestamp.timestamp().to_le_bytes(),
        &timestamp.timestamp_subsec_nanos().to_le_bytes(),
        &payload.to_le_bytes(),
        &[tag],
        prev,
    ])
}

/// Derives candidate blocks from the current chain head.
#[derive(Debug, Clone, Copy)]
pub struct BlockFactory {
    clock: fn() -> DateTime<Utc>,
}

impl BlockFactory {
    /// A factory stamping blocks with the system clock.
    pub fn new() -> Self {
        Self { clock: Utc::now }
    }

    /// A factory using a custom time source.
    pub fn with_clock(clock: fn() -> DateTime<Utc>) -> Self {
        Self { clock }
    }

    /// Build the block that follows `head` carrying `payload`.
    ///
    /// The result links to `head` by construction; it is still only a
    /// candidate until the store admits it. A head at `u64::MAX` has no
    /// successor index; the index saturates and validation rejects it.
    pub fn create_next(&self, head: &Block, payload: i64) -> Block {
        Block::sealed(head.index.saturating_add(1), (self.clock)(), payload, Some(head.hash))
    }
}

impl Default for BlockFactory {
    fn default() -> Self {
        Self::new()
    }
}
