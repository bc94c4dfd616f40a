//! Natural-logic relation and polarity algebra
//!
//! This crate is the pure kernel of natural-logic-licensed sentence
//! simplification: a seven-relation lattice with a total composition table
//! and truth projection, a closed catalog of scope-introducing operators
//! tagged with monotonicity signatures, and the per-token polarity function
//! obtained by composing enclosing operator scopes.
//!
//! No I/O and no search happens here; graph handling and the two search
//! procedures live in `natlog-engine`.
//!
//! # Example
//!
//! ```rust
//! use natlog_core::{NaturalLogicRelation, Polarity, Operator};
//!
//! // Composition: A ⊑ B and B ^ C gives A | C.
//! let joined = NaturalLogicRelation::ForwardEntailment
//!     .join(NaturalLogicRelation::Negation);
//! assert_eq!(joined, NaturalLogicRelation::Alternation);
//!
//! // "all" is downward monotone in its restrictor, so inside it forward
//! // entailment flips.
//! let polarity = Polarity::from_signatures(&[Operator::All.subject_monotonicity()]);
//! assert_eq!(
//!     polarity.project_lexical_relation(NaturalLogicRelation::ForwardEntailment),
//!     NaturalLogicRelation::ReverseEntailment,
//! );
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod operator;
pub mod polarity;
pub mod relation;

pub use error::{CoreError, Result};
pub use operator::{Monotonicity, MonotonicitySignature, MonotonicityType, Operator, OperatorSpec};
pub use polarity::{project, Polarity};
pub use relation::{NaturalLogicRelation, TruthValue, RELATION_COUNT};

impl TryFrom<usize> for NaturalLogicRelation {
    type Error = CoreError;

    fn try_from(idx: usize) -> Result<NaturalLogicRelation> {
        NaturalLogicRelation::from_index(idx).ok_or(CoreError::InvalidRelationIndex(idx))
    }
}

impl TryFrom<&str> for Operator {
    type Error = CoreError;

    /// Parse a lemmatized surface form, any arity.
    fn try_from(form: &str) -> Result<Operator> {
        Operator::VALUES
            .iter()
            .copied()
            .find(|op| op.surface_form() == form)
            .ok_or_else(|| CoreError::UnknownOperator(form.to_string()))
    }
}
