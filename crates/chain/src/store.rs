//! The canonical chain and its single point of mutation.
//!
//! Every mutation takes the write lock for the whole "read head, build or
//! validate candidate, commit" sequence, so two appends can never validate
//! against the same head. Readers get an `Arc` snapshot; a later append
//! copies the vector on write instead of disturbing outstanding snapshots.

use bpmchain_consensus::{ChainValidator, ForkChoiceError, LongestChainRule, ValidationError};
use bpmchain_core::{Block, BlockFactory};
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn, Level};

/// An immutable point-in-time view of the canonical chain.
pub type Chain = Arc<Vec<Block>>;

/// Errors that can occur during chain store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("block validation failed: {0}")]
    ValidationFailed(ValidationError),

    #[error("replacement chain is invalid: {0}")]
    InvalidChain(ValidationError),

    #[error("replacement chain is not longer (candidate {candidate}, canonical {canonical})")]
    ChainTooShort { candidate: usize, canonical: usize },

    #[error("chain has no blocks")]
    EmptyChain,
}

impl From<ForkChoiceError> for ChainError {
    fn from(err: ForkChoiceError) -> Self {
        match err {
            ForkChoiceError::NotLonger {
                candidate,
                canonical,
            } => ChainError::ChainTooShort {
                candidate,
                canonical,
            },
            ForkChoiceError::Invalid(e) => ChainError::InvalidChain(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChainError>;

/// Owns the canonical chain.
pub struct ChainStore {
    chain: RwLock<Chain>,
    factory: BlockFactory,
}

impl ChainStore {
    /// Create a store holding a freshly stamped genesis block.
    pub fn new() -> Self {
        Self {
            chain: RwLock::new(Arc::new(vec![Block::genesis()])),
            factory: BlockFactory::new(),
        }
    }

    /// Create a store rooted at the given genesis block.
    pub fn with_genesis(genesis: Block) -> Result<Self> {
        ChainValidator::validate_genesis(&genesis).map_err(ChainError::InvalidChain)?;
        Ok(Self {
            chain: RwLock::new(Arc::new(vec![genesis])),
            factory: BlockFactory::new(),
        })
    }

    /// Replace the factory used by [`ChainStore::try_append`].
    pub fn with_factory(mut self, factory: BlockFactory) -> Self {
        self.factory = factory;
        self
    }

    /// A point-in-time copy of the canonical chain.
    pub fn snapshot(&self) -> Chain {
        Arc::clone(&self.chain.read())
    }

    /// The current head block.
    pub fn head(&self) -> Result<Block> {
        self.chain.read().last().cloned().ok_or(ChainError::EmptyChain)
    }

    /// Number of blocks in the canonical chain, genesis included.
    pub fn len(&self) -> usize {
        self.chain.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.read().is_empty()
    }

    /// Build a block carrying `payload` on top of the current head and
    /// append it.
    pub fn try_append(&self, payload: i64) -> Result<Block> {
        let outcome = {
            let mut chain = self.chain.write();
            let head = chain.last().ok_or(ChainError::EmptyChain)?;
            let candidate = self.factory.create_next(head, payload);
            Self::commit(&mut chain, candidate)?
        };
        outcome.report()
    }

    /// Validate an externally built block against the current head and
    /// append it.
    pub fn try_append_block(&self, candidate: Block) -> Result<Block> {
        let outcome = {
            let mut chain = self.chain.write();
            Self::commit(&mut chain, candidate)?
        };
        outcome.report()
    }

    /// Adopt `candidate` if it is strictly longer and valid.
    ///
    /// Refusal is a policy outcome rather than a fault; use
    /// [`ChainStore::replace_chain`] to learn why a chain was refused.
    pub fn try_replace(&self, candidate: Vec<Block>) -> bool {
        self.replace_chain(candidate).is_ok()
    }

    /// Like [`ChainStore::try_replace`], reporting the reason for refusal.
    pub fn replace_chain(&self, candidate: Vec<Block>) -> Result<()> {
        let candidate_len = candidate.len();
        let (canonical_len, verdict) = {
            let mut chain = self.chain.write();
            let canonical_len = chain.len();
            let verdict = LongestChainRule::evaluate(&chain, &candidate);
            if verdict.is_ok() {
                *chain = Arc::new(candidate);
            }
            (canonical_len, verdict)
        };

        match verdict {
            Ok(()) => {
                info!(
                    old_len = canonical_len,
                    new_len = candidate_len,
                    "canonical chain replaced"
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    candidate_len,
                    canonical_len,
                    error = %err,
                    "replacement chain refused"
                );
                Err(err.into())
            }
        }
    }

    /// Validate `candidate` against the head of `chain` and push it.
    ///
    /// Runs under the write lock and does not log; the caller reports the
    /// outcome once the guard is released.
    fn commit(chain: &mut Chain, candidate: Block) -> Result<Commit> {
        let head = chain.last().ok_or(ChainError::EmptyChain)?;

        if let Err(error) = ChainValidator::validate(&candidate, head) {
            return Ok(Commit::Rejected {
                index: candidate.index(),
                head_index: head.index(),
                error,
            });
        }

        Arc::make_mut(chain).push(candidate.clone());
        let dump = tracing::enabled!(Level::DEBUG).then(|| Arc::clone(chain));
        Ok(Commit::Appended {
            block: candidate,
            dump,
        })
    }
}

/// What happened inside the critical section of an append.
enum Commit {
    Appended {
        block: Block,
        dump: Option<Chain>,
    },
    Rejected {
        index: u64,
        head_index: u64,
        error: ValidationError,
    },
}

impl Commit {
    fn report(self) -> Result<Block> {
        match self {
            Commit::Appended { block, dump } => {
                info!(
                    index = block.index(),
                    hash = %block.hash(),
                    payload = block.payload(),
                    "block appended"
                );
                if let Some(chain) = dump {
                    debug!(chain = ?chain, "canonical chain");
                }
                Ok(block)
            }
            Commit::Rejected {
                index,
                head_index,
                error,
            } => {
                warn!(index, head_index, error = %error, "candidate block rejected");
                Err(ChainError::ValidationFailed(error))
            }
        }
    }
}

impl Default for ChainStore {
    fn default() -> Self {
        Self::new()
    }
}
