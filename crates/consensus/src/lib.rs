//! Block validation and fork choice for bpmchain.
//!
//! This crate decides what the ledger accepts:
//! - Link validation (index, parent hash, hash integrity)
//! - Whole-chain validation starting from genesis
//! - Longest-valid-chain fork choice
//!
//! # Example
//!
//! ```rust
//! use bpmchain_consensus::{ChainValidator, LongestChainRule};
//! use bpmchain_core::{Block, BlockFactory};
//!
//! let genesis = Block::genesis();
//! let next = BlockFactory::new().create_next(&genesis, 60);
//! assert!(ChainValidator::is_valid(&next, &genesis));
//!
//! let canonical = vec![genesis.clone()];
//! let candidate = vec![genesis, next];
//! assert!(LongestChainRule::prefers(&canonical, &candidate));
//! ```

pub mod fork_choice;
pub mod validator;

// Re-export commonly used types
pub use fork_choice::{ForkChoiceError, LongestChainRule};
pub use validator::{ChainValidator, ValidationError};
