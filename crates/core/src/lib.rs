//! Core ledger primitives for bpmchain.
//!
//! This crate provides the fundamental types used throughout the ledger:
//! - Hashing (Blake3 digests and the canonical block encoding)
//! - Blocks and the factory that derives candidates from the chain head

pub mod block;
pub mod hash;

// Re-export commonly used types at the crate root
pub use block::{compute_hash, Block, BlockFactory};
pub use hash::{hash_concat, Hash, H256};
