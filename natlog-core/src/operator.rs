//! Scope-introducing operators (quantifiers, negators) and their
//! monotonicity signatures
//!
//! The catalog is deliberately closed: operators are a fixed enum, matched
//! exhaustively, never extended at runtime. Each entry carries the surface
//! form it is recognized by, the monotonicity of its subject and (for binary
//! operators) object argument positions, and the relation induced by
//! deleting the operator itself.

use crate::relation::NaturalLogicRelation;
use serde::{Deserialize, Serialize};

/// Direction of entailment through an argument position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Monotonicity {
    /// Upward monotone: broadening the argument preserves truth.
    Monotone,
    /// Downward monotone: narrowing the argument preserves truth.
    Antitone,
    /// Neither direction is licensed.
    Nonmonotone,
    /// Sentinel for an argument position the operator does not have.
    Invalid,
}

/// Algebraic strength of a monotonicity marking.
///
/// Additive operators distribute over union, multiplicative over
/// intersection; for antitone operators the same tags mean anti-additive and
/// anti-multiplicative. The type decides how the disjointness/exhaustivity
/// relations project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonotonicityType {
    /// Plain monotone, no distributivity.
    None,
    /// (Anti-)additive.
    Additive,
    /// (Anti-)multiplicative.
    Multiplicative,
    /// Both additive and multiplicative.
    Both,
}

/// A (direction, strength) pair for one argument position.
pub type MonotonicitySignature = (Monotonicity, MonotonicityType);

/// The closed catalog of recognized operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Operator {
    // Universals: downward on the restrictor, upward on the body.
    All,
    Every,
    Each,
    Any,
    AllOf,
    EveryOne,
    // Existentials: upward in both argument positions.
    Some,
    SomeOf,
    Several,
    AFew,
    ThereBe,
    ThereExist,
    AtLeastAFew,
    // Negative quantifiers: downward in both argument positions.
    No,
    NoOne,
    Neither,
    NeitherOf,
    Few,
    // Proportional quantifiers: nonmonotone restrictor.
    Most,
    MostOf,
    Many,
    ManyOf,
    // Unary negation.
    Not,
    Nt,
    Never,
    Without,
    // Numeric and bounded quantifiers.
    AtLeast,
    AtMost,
    Exactly,
    // Implicative-ish adverbs treated as unary scope markers.
    Only,
    Barely,
    Hardly,
}

impl Operator {
    /// All catalog entries.
    pub const VALUES: [Operator; 32] = [
        Operator::All,
        Operator::Every,
        Operator::Each,
        Operator::Any,
        Operator::AllOf,
        Operator::EveryOne,
        Operator::Some,
        Operator::SomeOf,
        Operator::Several,
        Operator::AFew,
        Operator::ThereBe,
        Operator::ThereExist,
        Operator::AtLeastAFew,
        Operator::No,
        Operator::NoOne,
        Operator::Neither,
        Operator::NeitherOf,
        Operator::Few,
        Operator::Most,
        Operator::MostOf,
        Operator::Many,
        Operator::ManyOf,
        Operator::Not,
        Operator::Nt,
        Operator::Never,
        Operator::Without,
        Operator::AtLeast,
        Operator::AtMost,
        Operator::Exactly,
        Operator::Only,
        Operator::Barely,
        Operator::Hardly,
    ];

    /// The lemmatized surface form this operator is recognized by.
    /// Multi-word forms are space-separated.
    pub fn surface_form(self) -> &'static str {
        match self {
            Operator::All => "all",
            Operator::Every => "every",
            Operator::Each => "each",
            Operator::Any => "any",
            Operator::AllOf => "all of",
            Operator::EveryOne => "every one",
            Operator::Some => "some",
            Operator::SomeOf => "some of",
            Operator::Several => "several",
            Operator::AFew => "a few",
            Operator::ThereBe => "there be",
            Operator::ThereExist => "there exist",
            Operator::AtLeastAFew => "at least a few",
            Operator::No => "no",
            Operator::NoOne => "no one",
            Operator::Neither => "neither",
            Operator::NeitherOf => "neither of",
            Operator::Few => "few",
            Operator::Most => "most",
            Operator::MostOf => "most of",
            Operator::Many => "many",
            Operator::ManyOf => "many of",
            Operator::Not => "not",
            Operator::Nt => "n't",
            Operator::Never => "never",
            Operator::Without => "without",
            Operator::AtLeast => "at least",
            Operator::AtMost => "at most",
            Operator::Exactly => "exactly",
            Operator::Only => "only",
            Operator::Barely => "barely",
            Operator::Hardly => "hardly",
        }
    }

    /// Monotonicity signature for the subject (restrictor) argument.
    pub fn subject_monotonicity(self) -> MonotonicitySignature {
        use Monotonicity::*;
        use MonotonicityType::*;
        match self {
            Operator::All
            | Operator::Every
            | Operator::Each
            | Operator::Any
            | Operator::AllOf
            | Operator::EveryOne => (Antitone, Additive),
            Operator::Some
            | Operator::SomeOf
            | Operator::Several
            | Operator::AFew
            | Operator::ThereBe
            | Operator::ThereExist
            | Operator::AtLeastAFew => (Monotone, Additive),
            Operator::No | Operator::NoOne | Operator::Neither | Operator::NeitherOf => {
                (Antitone, Both)
            }
            Operator::Few => (Antitone, None),
            Operator::Most | Operator::MostOf | Operator::Many | Operator::ManyOf => {
                (Nonmonotone, None)
            }
            Operator::Not | Operator::Nt | Operator::Never => (Antitone, Both),
            Operator::Without => (Antitone, Additive),
            Operator::AtLeast => (Monotone, None),
            Operator::AtMost => (Antitone, None),
            Operator::Exactly => (Nonmonotone, None),
            Operator::Only => (Nonmonotone, None),
            Operator::Barely | Operator::Hardly => (Antitone, None),
        }
    }

    /// Monotonicity signature for the object (body) argument, or `None` for
    /// unary operators.
    pub fn object_monotonicity(self) -> Option<MonotonicitySignature> {
        use Monotonicity::*;
        use MonotonicityType::{Additive, Both, Multiplicative, None as NoneTy};
        match self {
            Operator::All
            | Operator::Every
            | Operator::Each
            | Operator::Any
            | Operator::AllOf
            | Operator::EveryOne => Some((Monotone, Multiplicative)),
            Operator::Some
            | Operator::SomeOf
            | Operator::Several
            | Operator::AFew
            | Operator::ThereBe
            | Operator::ThereExist
            | Operator::AtLeastAFew => Some((Monotone, Additive)),
            Operator::No | Operator::NoOne | Operator::Neither | Operator::NeitherOf => {
                Some((Antitone, Both))
            }
            Operator::Few => Some((Antitone, NoneTy)),
            Operator::Most | Operator::MostOf | Operator::Many | Operator::ManyOf => {
                Some((Monotone, NoneTy))
            }
            Operator::AtLeast => Some((Monotone, NoneTy)),
            Operator::AtMost => Some((Antitone, NoneTy)),
            Operator::Exactly => Some((Nonmonotone, NoneTy)),
            Operator::Only => Some((Monotone, NoneTy)),
            // Unary operators scope over a single span.
            Operator::Not
            | Operator::Nt
            | Operator::Never
            | Operator::Without
            | Operator::Barely
            | Operator::Hardly => None,
        }
    }

    /// True iff this operator takes a single argument span.
    pub fn is_unary(self) -> bool {
        self.object_monotonicity().is_none()
    }

    /// The relation between the original sentence and the sentence with this
    /// operator deleted.
    pub fn delete_relation(self) -> NaturalLogicRelation {
        match self {
            // Deleting a universal leaves the bare-plural (existential-ish)
            // reading: strictly weaker.
            Operator::All
            | Operator::Every
            | Operator::Each
            | Operator::Any
            | Operator::AllOf
            | Operator::EveryOne => NaturalLogicRelation::ForwardEntailment,
            // Bare plurals already read existentially.
            Operator::Some
            | Operator::SomeOf
            | Operator::Several
            | Operator::AFew
            | Operator::ThereBe
            | Operator::ThereExist
            | Operator::AtLeastAFew => NaturalLogicRelation::Equivalence,
            Operator::No
            | Operator::NoOne
            | Operator::Neither
            | Operator::NeitherOf
            | Operator::Not
            | Operator::Nt
            | Operator::Never
            | Operator::Without => NaturalLogicRelation::Negation,
            Operator::Few | Operator::Barely | Operator::Hardly => {
                NaturalLogicRelation::Independence
            }
            Operator::Most | Operator::MostOf | Operator::Many | Operator::ManyOf => {
                NaturalLogicRelation::ForwardEntailment
            }
            Operator::AtLeast | Operator::AtMost | Operator::Exactly | Operator::Only => {
                NaturalLogicRelation::Independence
            }
        }
    }

    /// Look up an operator by lemmatized surface form.
    ///
    /// `unary` disambiguates forms that could head either a unary or a
    /// binary reading; the catalog currently has no such collisions, so the
    /// flag only filters by arity.
    pub fn from_surface_form(form: &str, unary: bool) -> Option<Operator> {
        Operator::VALUES
            .iter()
            .copied()
            .find(|op| op.surface_form() == form && op.is_unary() == unary)
            .or_else(|| {
                Operator::VALUES
                    .iter()
                    .copied()
                    .find(|op| op.surface_form() == form)
            })
    }

    /// Number of whitespace-separated words in the surface form.
    pub fn word_count(self) -> usize {
        self.surface_form().split_whitespace().count()
    }
}

/// One occurrence of an operator in a sentence, with its resolved scopes.
///
/// All spans are half-open 1-based token-index ranges, clamped to sentence
/// bounds at construction. A unary occurrence has an empty object span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorSpec {
    /// Which catalog entry matched.
    pub operator: Operator,
    /// Start of the operator's own surface span.
    pub quantifier_begin: usize,
    /// End (exclusive) of the operator's own surface span.
    pub quantifier_end: usize,
    /// Start of the subject (restrictor) scope.
    pub subject_begin: usize,
    /// End (exclusive) of the subject scope.
    pub subject_end: usize,
    /// Start of the object (body) scope; equals `object_end` for unary.
    pub object_begin: usize,
    /// End (exclusive) of the object scope.
    pub object_end: usize,
}

impl OperatorSpec {
    /// Build a spec, clamping every span endpoint into `[1, sentence_len + 1]`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        operator: Operator,
        quantifier_begin: usize,
        quantifier_end: usize,
        subject_begin: usize,
        subject_end: usize,
        object_begin: usize,
        object_end: usize,
        sentence_length: usize,
    ) -> OperatorSpec {
        let clamp = |i: usize| i.clamp(1, sentence_length + 1);
        OperatorSpec {
            operator,
            quantifier_begin: clamp(quantifier_begin),
            quantifier_end: clamp(quantifier_end),
            subject_begin: clamp(subject_begin),
            subject_end: clamp(subject_end),
            object_begin: clamp(object_begin),
            object_end: clamp(object_end),
        }
    }

    /// Build a unary spec (no object scope).
    pub fn unary(
        operator: Operator,
        quantifier_begin: usize,
        quantifier_end: usize,
        subject_begin: usize,
        subject_end: usize,
        sentence_length: usize,
    ) -> OperatorSpec {
        Self::new(
            operator,
            quantifier_begin,
            quantifier_end,
            subject_begin,
            subject_end,
            subject_end,
            subject_end,
            sentence_length,
        )
    }

    /// True iff this occurrence has a non-empty object scope.
    pub fn is_binary(&self) -> bool {
        self.object_begin < self.object_end
    }

    /// True iff `token_index` falls inside the subject scope.
    pub fn subject_contains(&self, token_index: usize) -> bool {
        token_index >= self.subject_begin && token_index < self.subject_end
    }

    /// True iff `token_index` falls inside the object scope.
    pub fn object_contains(&self, token_index: usize) -> bool {
        token_index >= self.object_begin && token_index < self.object_end
    }

    /// True iff `token_index` falls inside either argument scope.
    pub fn scope_contains(&self, token_index: usize) -> bool {
        self.subject_contains(token_index) || self.object_contains(token_index)
    }

    /// Total number of tokens in either argument scope. Used to order
    /// enclosing operators from widest to narrowest.
    pub fn scope_size(&self) -> usize {
        (self.subject_end - self.subject_begin) + (self.object_end - self.object_begin)
    }

    /// Merge two specs that matched the same operator occurrence (identical
    /// quantifier span) through overlapping patterns: spans union pointwise.
    ///
    /// Returns `None` when the quantifier spans differ.
    pub fn merge(&self, other: &OperatorSpec) -> Option<OperatorSpec> {
        if self.quantifier_begin != other.quantifier_begin
            || self.quantifier_end != other.quantifier_end
        {
            return None;
        }
        Some(OperatorSpec {
            operator: self.operator,
            quantifier_begin: self.quantifier_begin,
            quantifier_end: self.quantifier_end,
            subject_begin: self.subject_begin.min(other.subject_begin),
            subject_end: self.subject_end.max(other.subject_end),
            object_begin: self.object_begin.min(other.object_begin),
            object_end: self.object_end.max(other.object_end),
        })
    }
}
