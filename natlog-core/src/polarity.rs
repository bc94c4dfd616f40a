//! Per-token polarity: the composed projection of all enclosing operator
//! scopes
//!
//! A token's polarity is a function from lexical relations to projected
//! relations, obtained by pushing each base relation upward through every
//! operator whose scope contains the token, innermost operator first. The
//! table is fixed-size (one entry per relation) and immutable once built.

use crate::operator::{Monotonicity, MonotonicitySignature, MonotonicityType};
use crate::relation::{NaturalLogicRelation, RELATION_COUNT};
use serde::{Deserialize, Serialize};

/// Project one relation upward through one operator argument position.
///
/// The case table follows the standard projectivity calculus: entailments
/// track (or flip under) the monotonicity direction, while the
/// disjointness/exhaustivity relations survive only under the matching
/// distributivity strength.
pub fn project(
    relation: NaturalLogicRelation,
    monotonicity: Monotonicity,
    monotonicity_type: MonotonicityType,
) -> NaturalLogicRelation {
    use MonotonicityType::{Additive, Both, Multiplicative, None as NoneTy};
    use NaturalLogicRelation::*;

    match monotonicity {
        Monotonicity::Monotone => match relation {
            Equivalence => Equivalence,
            ForwardEntailment => ForwardEntailment,
            ReverseEntailment => ReverseEntailment,
            Negation => match monotonicity_type {
                Both => Negation,
                Additive => Cover,
                Multiplicative => Alternation,
                NoneTy => Independence,
            },
            Alternation => match monotonicity_type {
                Multiplicative | Both => Alternation,
                _ => Independence,
            },
            Cover => match monotonicity_type {
                Additive | Both => Cover,
                _ => Independence,
            },
            Independence => Independence,
        },
        Monotonicity::Antitone => match relation {
            Equivalence => Equivalence,
            ForwardEntailment => ReverseEntailment,
            ReverseEntailment => ForwardEntailment,
            Negation => match monotonicity_type {
                Both => Negation,
                Additive => Alternation,
                Multiplicative => Cover,
                NoneTy => Independence,
            },
            Alternation => match monotonicity_type {
                Multiplicative | Both => Cover,
                _ => Independence,
            },
            Cover => match monotonicity_type {
                Additive | Both => Alternation,
                _ => Independence,
            },
            Independence => Independence,
        },
        // Nonmonotone positions (and the Invalid sentinel) destroy
        // everything except equivalence.
        Monotonicity::Nonmonotone | Monotonicity::Invalid => match relation {
            Equivalence => Equivalence,
            _ => Independence,
        },
    }
}

/// The net projection function for one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polarity {
    /// `projection[r.index()]` is the index of the relation `r` projects to.
    projection: [u8; RELATION_COUNT],
}

impl Default for Polarity {
    /// Identity polarity: a token outside every operator scope.
    fn default() -> Polarity {
        let mut projection = [0u8; RELATION_COUNT];
        for (i, slot) in projection.iter_mut().enumerate() {
            *slot = i as u8;
        }
        Polarity { projection }
    }
}

impl Polarity {
    /// Build a polarity from the monotonicity signatures of all enclosing
    /// operator argument positions, ordered from widest scope to narrowest.
    ///
    /// The list is consumed in reverse so the innermost operator is applied
    /// to the lexical relation first, then each successively wider operator
    /// projects the result.
    pub fn from_signatures(signatures: &[MonotonicitySignature]) -> Polarity {
        let mut projection = [0u8; RELATION_COUNT];
        for (i, slot) in projection.iter_mut().enumerate() {
            let mut rel = NaturalLogicRelation::VALUES[i];
            for &(mono, ty) in signatures.iter().rev() {
                rel = project(rel, mono, ty);
            }
            *slot = rel.index() as u8;
        }
        Polarity { projection }
    }

    /// Project a lexical relation through this token's operator context.
    pub fn project_lexical_relation(&self, relation: NaturalLogicRelation) -> NaturalLogicRelation {
        let idx = self.projection[relation.index()] as usize;
        // The table is populated exclusively from relation indices.
        NaturalLogicRelation::VALUES[idx]
    }

    /// True iff entailments pass through unchanged (upward context).
    pub fn is_upwards(&self) -> bool {
        self.project_lexical_relation(NaturalLogicRelation::ForwardEntailment)
            == NaturalLogicRelation::ForwardEntailment
            && self.project_lexical_relation(NaturalLogicRelation::ReverseEntailment)
                == NaturalLogicRelation::ReverseEntailment
    }

    /// True iff entailments flip direction (downward context).
    pub fn is_downwards(&self) -> bool {
        self.project_lexical_relation(NaturalLogicRelation::ForwardEntailment)
            == NaturalLogicRelation::ReverseEntailment
            && self.project_lexical_relation(NaturalLogicRelation::ReverseEntailment)
                == NaturalLogicRelation::ForwardEntailment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Monotonicity::*;
    use MonotonicityType::*;
    use NaturalLogicRelation::*;

    #[test]
    fn default_polarity_is_identity() {
        let polarity = Polarity::default();
        for &rel in &NaturalLogicRelation::VALUES {
            assert_eq!(polarity.project_lexical_relation(rel), rel);
        }
        assert!(polarity.is_upwards());
        assert!(!polarity.is_downwards());
    }

    #[test]
    fn empty_signature_list_is_identity() {
        let polarity = Polarity::from_signatures(&[]);
        assert_eq!(polarity, Polarity::default());
    }

    #[test]
    fn single_antitone_scope_flips_entailment() {
        // The restrictor of "all": antitone, anti-additive.
        let polarity = Polarity::from_signatures(&[(Antitone, Additive)]);
        assert_eq!(
            polarity.project_lexical_relation(ForwardEntailment),
            ReverseEntailment
        );
        assert_eq!(
            polarity.project_lexical_relation(ReverseEntailment),
            ForwardEntailment
        );
        assert!(polarity.is_downwards());
    }

    #[test]
    fn double_negation_restores_upward() {
        let neg = (Antitone, Both);
        let polarity = Polarity::from_signatures(&[neg, neg]);
        assert!(polarity.is_upwards());
        assert_eq!(polarity.project_lexical_relation(Negation), Negation);
    }

    #[test]
    fn nonmonotone_destroys_information() {
        let polarity = Polarity::from_signatures(&[(Nonmonotone, None)]);
        assert_eq!(polarity.project_lexical_relation(Equivalence), Equivalence);
        for &rel in &[ForwardEntailment, ReverseEntailment, Negation, Alternation, Cover] {
            assert_eq!(polarity.project_lexical_relation(rel), Independence);
        }
        assert!(!polarity.is_upwards());
        assert!(!polarity.is_downwards());
    }

    #[test]
    fn negation_projects_by_strength() {
        // Upward multiplicative keeps exclusivity only.
        assert_eq!(project(Negation, Monotone, Multiplicative), Alternation);
        // Upward additive keeps exhaustivity only.
        assert_eq!(project(Negation, Monotone, Additive), Cover);
        // Anti-additive maps exhaustivity to exclusivity.
        assert_eq!(project(Negation, Antitone, Additive), Alternation);
        assert_eq!(project(Cover, Antitone, Additive), Alternation);
        assert_eq!(project(Alternation, Antitone, Multiplicative), Cover);
    }

    #[test]
    fn innermost_operator_applies_first() {
        // Outer "not" (antitone both) over inner nonmonotone scope: the
        // inner operator kills the entailment before negation can flip it.
        let polarity = Polarity::from_signatures(&[(Antitone, Both), (Nonmonotone, None)]);
        assert_eq!(
            polarity.project_lexical_relation(ForwardEntailment),
            Independence
        );
        // Reversed nesting: flip first, then destroy. Same end state here,
        // but ordering matters for the negation row.
        let nested = Polarity::from_signatures(&[(Monotone, Multiplicative), (Antitone, Additive)]);
        // Inner anti-additive: NEG -> ALT; outer multiplicative keeps ALT.
        assert_eq!(nested.project_lexical_relation(Negation), Alternation);
    }
}
