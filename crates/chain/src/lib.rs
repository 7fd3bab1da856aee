//! Canonical chain store for bpmchain.
//!
//! [`ChainStore`] owns the one chain the service treats as authoritative. It
//! exposes two operations to the outside world, reading a snapshot and
//! appending a payload, plus longest-chain replacement for chains obtained
//! elsewhere.
//!
//! # Example
//!
//! ```rust
//! use bpmchain_chain::ChainStore;
//!
//! let store = ChainStore::new();
//! let block = store.try_append(60).unwrap();
//! assert_eq!(block.index(), 1);
//!
//! let chain = store.snapshot();
//! assert_eq!(chain.len(), 2);
//! ```

pub mod store;

// Re-export commonly used types
pub use bpmchain_consensus::ValidationError;
pub use store::{Chain, ChainError, ChainStore, Result};
