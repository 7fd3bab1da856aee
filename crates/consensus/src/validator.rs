//! Block and chain validation rules.
//!
//! A candidate extends a head when its index follows the head's, it points
//! back at the head's hash, and its recorded hash matches its contents.

use bpmchain_core::Block;
use thiserror::Error;

/// Errors that can occur during validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("block index mismatch (expected {expected}, got {got})")]
    InvalidIndex { expected: u64, got: u64 },

    #[error("head index {head} has no successor")]
    IndexOverflow { head: u64 },

    #[error("block prev_hash does not match the head hash")]
    InvalidPrevHash,

    #[error("block hash does not match its contents")]
    HashMismatch,

    #[error("chain is empty")]
    EmptyChain,

    #[error("invalid genesis block: {0}")]
    InvalidGenesis(&'static str),

    #[error("invalid block at position {position}: {source}")]
    InvalidLink {
        position: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Block and chain validator.
pub struct ChainValidator;

impl ChainValidator {
    /// Check that `candidate` may extend `head`.
    ///
    /// Checks run in order and stop at the first failure: index, parent link,
    /// then hash recomputation.
    pub fn validate(candidate: &Block, head: &Block) -> Result<()> {
        let expected = head
            .index()
            .checked_add(1)
            .ok_or(ValidationError::IndexOverflow { head: head.index() })?;
        if candidate.index() != expected {
            return Err(ValidationError::InvalidIndex {
                expected,
                got: candidate.index(),
            });
        }

        if candidate.prev_hash() != Some(head.hash()) {
            return Err(ValidationError::InvalidPrevHash);
        }

        if candidate.compute_hash() != candidate.hash() {
            return Err(ValidationError::HashMismatch);
        }

        Ok(())
    }

    /// Boolean form of [`ChainValidator::validate`].
    pub fn is_valid(candidate: &Block, head: &Block) -> bool {
        Self::validate(candidate, head).is_ok()
    }

    /// Check that `block` is a well-formed genesis block.
    pub fn validate_genesis(block: &Block) -> Result<()> {
        if block.index() != 0 {
            return Err(ValidationError::InvalidGenesis("index must be 0"));
        }
        if block.prev_hash().is_some() {
            return Err(ValidationError::InvalidGenesis("prev_hash must be empty"));
        }
        if block.compute_hash() != block.hash() {
            return Err(ValidationError::InvalidGenesis("hash does not match contents"));
        }
        Ok(())
    }

    /// Validate a whole chain: a genesis block followed by valid links.
    pub fn validate_chain(chain: &[Block]) -> Result<()> {
        let genesis = chain.first().ok_or(ValidationError::EmptyChain)?;
        Self::validate_genesis(genesis)?;

        for (position, pair) in chain.windows(2).enumerate() {
            Self::validate(&pair[1], &pair[0]).map_err(|e| ValidationError::InvalidLink {
                position: position + 1,
                source: Box::new(e),
            })?;
        }

        Ok(())
    }

    /// Boolean form of [`ChainValidator::validate_chain`].
    pub fn is_chain_valid(chain: &[Block]) -> bool {
        Self::validate_chain(chain).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpmchain_core::{BlockFactory, Hash};

    fn build_chain(payloads: &[i64]) -> Vec<Block> {
        let factory = BlockFactory::new();
        let mut chain = vec![Block::genesis()];
        for &payload in payloads {
            let next = factory.create_next(chain.last().unwrap(), payload);
            chain.push(next);
        }
        chain
    }

    #[test]
    fn test_factory_output_is_valid() {
        let chain = build_chain(&[60, 72, 85]);
        let factory = BlockFactory::new();

        for head in &chain {
            let candidate = factory.create_next(head, 99);
            assert!(ChainValidator::is_valid(&candidate, head));
        }
    }

    #[test]
    fn test_wrong_index_rejected() {
        let genesis = Block::genesis();
        let next = BlockFactory::new().create_next(&genesis, 60);

        // Duplicate index
        let dup = Block::sealed(0, next.timestamp(), 60, Some(genesis.hash()));
        assert_eq!(
            ChainValidator::validate(&dup, &genesis),
            Err(ValidationError::InvalidIndex { expected: 1, got: 0 })
        );

        // Skipped index
        let skipped = Block::sealed(2, next.timestamp(), 60, Some(genesis.hash()));
        assert_eq!(
            ChainValidator::validate(&skipped, &genesis),
            Err(ValidationError::InvalidIndex { expected: 1, got: 2 })
        );
    }

    #[test]
    fn test_head_at_max_index_rejects_any_successor() {
        let head = Block::sealed(u64::MAX, Block::genesis().timestamp(), 60, Some(Hash::ZERO));

        let candidate = BlockFactory::new().create_next(&head, 70);
        assert_eq!(
            ChainValidator::validate(&candidate, &head),
            Err(ValidationError::IndexOverflow { head: u64::MAX })
        );

        let wrapped = Block::sealed(0, candidate.timestamp(), 70, Some(head.hash()));
        assert!(!ChainValidator::is_valid(&wrapped, &head));
    }

    #[test]
    fn test_wrong_prev_hash_rejected() {
        let genesis = Block::genesis();
        let fork = Block::sealed(1, genesis.timestamp(), 60, Some(Hash::ZERO));
        assert_eq!(
            ChainValidator::validate(&fork, &genesis),
            Err(ValidationError::InvalidPrevHash)
        );

        let orphan = Block::sealed(1, genesis.timestamp(), 60, None);
        assert_eq!(
            ChainValidator::validate(&orphan, &genesis),
            Err(ValidationError::InvalidPrevHash)
        );
    }

    #[test]
    fn test_tampered_fields_rejected() {
        let genesis = Block::genesis();
        let block = BlockFactory::new().create_next(&genesis, 60);

        // Payload rewritten but the recorded hash kept
        let tampered = Block::from_parts(
            block.index(),
            block.timestamp(),
            61,
            block.prev_hash(),
            block.hash(),
        );
        assert_eq!(
            ChainValidator::validate(&tampered, &genesis),
            Err(ValidationError::HashMismatch)
        );

        // Timestamp rewritten
        let tampered = Block::from_parts(
            block.index(),
            block.timestamp() + chrono::Duration::seconds(1),
            block.payload(),
            block.prev_hash(),
            block.hash(),
        );
        assert!(!ChainValidator::is_valid(&tampered, &genesis));

        // Index rewritten: caught by the index check first
        let tampered = Block::from_parts(
            2,
            block.timestamp(),
            block.payload(),
            block.prev_hash(),
            block.hash(),
        );
        assert!(!ChainValidator::is_valid(&tampered, &genesis));

        // prev_hash rewritten
        let tampered = Block::from_parts(
            block.index(),
            block.timestamp(),
            block.payload(),
            Some(Hash::ZERO),
            block.hash(),
        );
        assert!(!ChainValidator::is_valid(&tampered, &genesis));
    }

    #[test]
    fn test_genesis_only_chain_is_valid() {
        assert!(ChainValidator::is_chain_valid(&[Block::genesis()]));
    }

    #[test]
    fn test_empty_chain_is_invalid() {
        assert_eq!(
            ChainValidator::validate_chain(&[]),
            Err(ValidationError::EmptyChain)
        );
    }

    #[test]
    fn test_chain_starting_at_index_one_is_invalid() {
        let genesis = Block::genesis();
        let block = BlockFactory::new().create_next(&genesis, 60);

        assert!(matches!(
            ChainValidator::validate_chain(&[block]),
            Err(ValidationError::InvalidGenesis(_))
        ));
    }

    #[test]
    fn test_genesis_with_bad_hash_is_invalid() {
        let genesis = Block::genesis();
        let bad = Block::from_parts(0, genesis.timestamp(), 5, None, genesis.hash());
        assert!(!ChainValidator::is_chain_valid(&[bad]));
    }

    #[test]
    fn test_valid_chain() {
        assert!(ChainValidator::is_chain_valid(&build_chain(&[60, 72, 85, 90])));
    }

    #[test]
    fn test_broken_link_reports_position() {
        let mut chain = build_chain(&[60, 72, 85]);
        let victim = chain[2].clone();
        chain[2] = Block::from_parts(
            victim.index(),
            victim.timestamp(),
            100,
            victim.prev_hash(),
            victim.hash(),
        );

        match ChainValidator::validate_chain(&chain) {
            Err(ValidationError::InvalidLink { position, source }) => {
                assert_eq!(position, 2);
                assert_eq!(*source, ValidationError::HashMismatch);
            }
            other => panic!("expected InvalidLink, got {:?}", other),
        }
    }
}
