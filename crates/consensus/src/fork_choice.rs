//! Longest-valid-chain fork choice.

use crate::validator::{ChainValidator, ValidationError};
use bpmchain_core::Block;
use thiserror::Error;

/// Reasons a competing chain is not adopted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForkChoiceError {
    #[error("candidate chain is not longer (candidate {candidate}, canonical {canonical})")]
    NotLonger { candidate: usize, canonical: usize },

    #[error("candidate chain is invalid: {0}")]
    Invalid(#[from] ValidationError),
}

/// Prefers the strictly longer of two chains, provided it is internally valid.
pub struct LongestChainRule;

impl LongestChainRule {
    /// Decide whether `candidate` should replace `canonical`.
    ///
    /// Length is compared first, so an equal or shorter candidate is refused
    /// without being validated.
    pub fn evaluate(canonical: &[Block], candidate: &[Block]) -> Result<(), ForkChoiceError> {
        if candidate.len() <= canonical.len() {
            return Err(ForkChoiceError::NotLonger {
                candidate: candidate.len(),
                canonical: canonical.len(),
            });
        }

        ChainValidator::validate_chain(candidate)?;
        Ok(())
    }

    pub fn prefers(canonical: &[Block], candidate: &[Block]) -> bool {
        Self::evaluate(canonical, candidate).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpmchain_core::BlockFactory;

    fn extend(mut chain: Vec<Block>, payloads: &[i64]) -> Vec<Block> {
        let factory = BlockFactory::new();
        for &payload in payloads {
            let next = factory.create_next(chain.last().unwrap(), payload);
            chain.push(next);
        }
        chain
    }

    #[test]
    fn test_longer_valid_chain_preferred() {
        let canonical = extend(vec![Block::genesis()], &[60]);
        let candidate = extend(canonical.clone(), &[70, 80]);

        assert!(LongestChainRule::prefers(&canonical, &candidate));
    }

    #[test]
    fn test_equal_length_refused() {
        let canonical = extend(vec![Block::genesis()], &[60, 61]);
        let candidate = extend(vec![Block::genesis()], &[70, 71]);

        assert_eq!(
            LongestChainRule::evaluate(&canonical, &candidate),
            Err(ForkChoiceError::NotLonger {
                candidate: 3,
                canonical: 3
            })
        );
    }

    #[test]
    fn test_shorter_invalid_chain_reports_length_first() {
        let canonical = extend(vec![Block::genesis()], &[60, 61]);
        let candidate: Vec<Block> = Vec::new();

        assert!(matches!(
            LongestChainRule::evaluate(&canonical, &candidate),
            Err(ForkChoiceError::NotLonger { .. })
        ));
    }

    #[test]
    fn test_longer_invalid_chain_refused() {
        let canonical = vec![Block::genesis()];
        let mut candidate = extend(vec![Block::genesis()], &[60, 61]);
        candidate.remove(1);

        assert!(matches!(
            LongestChainRule::evaluate(&canonical, &candidate),
            Err(ForkChoiceError::Invalid(ValidationError::InvalidLink { .. }))
        ));
    }

    #[test]
    fn test_independent_genesis_fork_can_win() {
        let canonical = extend(vec![Block::genesis()], &[60]);
        let candidate = extend(vec![Block::genesis()], &[1, 2, 3]);

        assert!(LongestChainRule::prefers(&canonical, &candidate));
    }
}
