//! The seven-relation natural-logic algebra
//!
//! Relations between propositions form a small closed algebra: each of the
//! seven MacCartney relations carries four truth-preservation flags, a total
//! composition (`join`) table, and a projection onto three-valued truth.
//! Everything downstream (polarity projection, deletion licensing) is built
//! on this module.

use serde::{Deserialize, Serialize};

/// Number of relations in the algebra. Fixed; exhaustive matches everywhere
/// rely on it.
pub const RELATION_COUNT: usize = 7;

/// A set-theoretic relation between two propositions (or two lexical items,
/// viewed as the sets they denote).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NaturalLogicRelation {
    /// A and B denote the same set (cat ≡ feline).
    Equivalence,
    /// A denotes a subset of B (cat ⊑ animal).
    ForwardEntailment,
    /// A denotes a superset of B (animal ⊒ cat).
    ReverseEntailment,
    /// A and B are disjoint and exhaustive (alive ^ dead).
    Negation,
    /// A and B are disjoint but not exhaustive (cat | dog).
    Alternation,
    /// A and B are exhaustive but not disjoint (animal ‿ non-cat).
    Cover,
    /// No relation can be concluded (hungry # hippo).
    Independence,
}

/// Three-valued truth resulting from projecting a premise truth value through
/// a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TruthValue {
    /// The conclusion is entailed true.
    True,
    /// The conclusion is entailed false.
    False,
    /// Nothing can be concluded.
    Unknown,
}

impl TruthValue {
    /// True iff the value is [`TruthValue::True`].
    pub fn is_true(self) -> bool {
        matches!(self, TruthValue::True)
    }

    /// True iff the value is [`TruthValue::False`].
    pub fn is_false(self) -> bool {
        matches!(self, TruthValue::False)
    }

    /// True iff the value carries any information at all.
    pub fn is_known(self) -> bool {
        !matches!(self, TruthValue::Unknown)
    }
}

use NaturalLogicRelation::{
    Alternation, Cover, Equivalence, ForwardEntailment, Independence, Negation, ReverseEntailment,
};

impl NaturalLogicRelation {
    /// All seven relations, in fixed index order.
    pub const VALUES: [NaturalLogicRelation; RELATION_COUNT] = [
        Equivalence,
        ForwardEntailment,
        ReverseEntailment,
        Negation,
        Alternation,
        Cover,
        Independence,
    ];

    /// The fixed index of this relation (0..7), stable across versions.
    pub fn index(self) -> usize {
        match self {
            Equivalence => 0,
            ForwardEntailment => 1,
            ReverseEntailment => 2,
            Negation => 3,
            Alternation => 4,
            Cover => 5,
            Independence => 6,
        }
    }

    /// Inverse of [`NaturalLogicRelation::index`].
    pub fn from_index(idx: usize) -> Option<NaturalLogicRelation> {
        Self::VALUES.get(idx).copied()
    }

    /// If the premise is true, does the conclusion remain true?
    pub fn maintains_truth(self) -> bool {
        matches!(self, Equivalence | ForwardEntailment)
    }

    /// If the premise is true, is the conclusion false?
    pub fn negates_truth(self) -> bool {
        matches!(self, Negation | Alternation)
    }

    /// If the premise is false, does the conclusion remain false?
    pub fn maintains_falsehood(self) -> bool {
        matches!(self, Equivalence | ReverseEntailment)
    }

    /// If the premise is false, is the conclusion true?
    pub fn negates_falsehood(self) -> bool {
        matches!(self, Negation | Cover)
    }

    /// Project a premise truth value through this relation.
    ///
    /// Returns [`TruthValue::Unknown`] when neither flag for the given
    /// premise truth is set.
    pub fn apply_to_truth_value(self, premise_truth: bool) -> TruthValue {
        if premise_truth {
            if self.maintains_truth() {
                TruthValue::True
            } else if self.negates_truth() {
                TruthValue::False
            } else {
                TruthValue::Unknown
            }
        } else if self.maintains_falsehood() {
            TruthValue::False
        } else if self.negates_falsehood() {
            TruthValue::True
        } else {
            TruthValue::Unknown
        }
    }

    /// Compose two relations along a chain of entailment steps: given
    /// A `self` B and B `other` C, the returned relation holds between
    /// A and C.
    ///
    /// This is MacCartney's join table. `Equivalence` is the identity and
    /// `Independence` is absorbing.
    pub fn join(self, other: NaturalLogicRelation) -> NaturalLogicRelation {
        match (self, other) {
            (Equivalence, x) => x,
            (x, Equivalence) => x,
            (Independence, _) | (_, Independence) => Independence,

            (ForwardEntailment, ForwardEntailment) => ForwardEntailment,
            (ForwardEntailment, ReverseEntailment) => Independence,
            (ForwardEntailment, Negation) => Alternation,
            (ForwardEntailment, Alternation) => Alternation,
            (ForwardEntailment, Cover) => Independence,

            (ReverseEntailment, ForwardEntailment) => Independence,
            (ReverseEntailment, ReverseEntailment) => ReverseEntailment,
            (ReverseEntailment, Negation) => Cover,
            (ReverseEntailment, Alternation) => Independence,
            (ReverseEntailment, Cover) => Cover,

            (Negation, ForwardEntailment) => Cover,
            (Negation, ReverseEntailment) => Alternation,
            (Negation, Negation) => Equivalence,
            (Negation, Alternation) => ReverseEntailment,
            (Negation, Cover) => ForwardEntailment,

            (Alternation, ForwardEntailment) => Independence,
            (Alternation, ReverseEntailment) => Alternation,
            (Alternation, Negation) => ForwardEntailment,
            (Alternation, Alternation) => Independence,
            (Alternation, Cover) => ForwardEntailment,

            (Cover, ForwardEntailment) => Cover,
            (Cover, ReverseEntailment) => Independence,
            (Cover, Negation) => ReverseEntailment,
            (Cover, Alternation) => ReverseEntailment,
            (Cover, Cover) => Independence,
        }
    }

    /// The relation induced between a sentence and the same sentence with an
    /// arc labeled `label` *inserted*.
    ///
    /// Unknown labels degrade gracefully: clausal/nominal-modifier prefixes
    /// fall back to [`ReverseEntailment`] (inserting a modifier restricts),
    /// anything else to [`Independence`].
    pub fn for_dependency_insertion(label: &str) -> NaturalLogicRelation {
        if let Some(rel) = insertion_relation(label) {
            return rel;
        }
        if label.starts_with("nmod:") || label.starts_with("conj") || label.starts_with("advcl") {
            ReverseEntailment
        } else {
            Independence
        }
    }

    /// The relation induced between a sentence and the same sentence with an
    /// arc labeled `label` *deleted*. Defined as the insertion relation passed
    /// through [`NaturalLogicRelation::insertion_to_deletion`].
    pub fn for_dependency_deletion(label: &str) -> NaturalLogicRelation {
        Self::for_dependency_insertion(label).insertion_to_deletion()
    }

    /// Map an insertion relation to the corresponding deletion relation.
    ///
    /// Inserting and deleting the same material are mirror edits, so the
    /// entailment direction flips and alternation/cover swap; equivalence,
    /// negation and independence are self-dual.
    pub fn insertion_to_deletion(self) -> NaturalLogicRelation {
        match self {
            Equivalence => Equivalence,
            ForwardEntailment => ReverseEntailment,
            ReverseEntailment => ForwardEntailment,
            Negation => Negation,
            Alternation => Cover,
            Cover => Alternation,
            Independence => Independence,
        }
    }
}

/// Insertion relation for the known dependency-label vocabulary.
///
/// Covers both Stanford-Dependencies and Universal-Dependencies label sets;
/// collapsed preposition labels (`prep_*`, `nmod:*`) and collapsed
/// conjunction labels (`conj:*`) are enumerated for the common function
/// words. Everything absent degrades through the prefix fallback in
/// [`NaturalLogicRelation::for_dependency_insertion`].
fn insertion_relation(label: &str) -> Option<NaturalLogicRelation> {
    let rel = match label {
        "acomp" => ReverseEntailment,
        "acl" => ReverseEntailment,
        "acl:relcl" => ReverseEntailment,
        "advcl" => ReverseEntailment,
        "advmod" => ReverseEntailment,
        "agent" => ReverseEntailment,
        "amod" => ReverseEntailment,
        "appos" => Equivalence,
        "aux" => Independence,
        "auxpass" => Independence,
        "aux:pass" => Independence,
        "case" => Independence,
        "cc" => ReverseEntailment,
        "cc:preconj" => Independence,
        "ccomp" => Independence,
        "compound" => Independence,
        "compound:prt" => Independence,
        "conj" => ReverseEntailment,
        "cop" => Independence,
        "csubj" => Independence,
        "csubjpass" => Independence,
        "csubj:pass" => Independence,
        "dep" => Independence,
        "det" => Equivalence,
        "det:predet" => Independence,
        "discourse" => Equivalence,
        "dobj" => Independence,
        "obj" => Independence,
        "expl" => Equivalence,
        "fixed" => Independence,
        "flat" => Independence,
        "goeswith" => Equivalence,
        "iobj" => Independence,
        "list" => Independence,
        "mark" => ReverseEntailment,
        "mwe" => Independence,
        "neg" => Negation,
        "nn" => Independence,
        "nmod" => ReverseEntailment,
        "npadvmod" => ReverseEntailment,
        "nsubj" => Independence,
        "nsubjpass" => Independence,
        "nsubj:pass" => Independence,
        "num" => ReverseEntailment,
        "number" => Independence,
        "nummod" => ReverseEntailment,
        "obl" => ReverseEntailment,
        "orphan" => Independence,
        "parataxis" => ReverseEntailment,
        "pcomp" => Independence,
        "pobj" => Independence,
        "poss" => ReverseEntailment,
        "possessive" => Independence,
        "preconj" => Independence,
        "predet" => Independence,
        "prep" => ReverseEntailment,
        "prt" => Independence,
        "punct" => Equivalence,
        "quantmod" => ReverseEntailment,
        "rcmod" => ReverseEntailment,
        "ref" => Independence,
        "root" => Independence,
        "tmod" => ReverseEntailment,
        "vmod" => ReverseEntailment,
        "vocative" => Independence,
        "xcomp" => Independence,

        // Collapsed prepositional modifiers: inserting any restricts the
        // denoted event, so all are ReverseEntailment. Both the SD (prep_*)
        // and UD (nmod:*) spellings are listed.
        "prep_about" | "nmod:about" => ReverseEntailment,
        "prep_above" | "nmod:above" => ReverseEntailment,
        "prep_across" | "nmod:across" => ReverseEntailment,
        "prep_after" | "nmod:after" => ReverseEntailment,
        "prep_against" | "nmod:against" => ReverseEntailment,
        "prep_along" | "nmod:along" => ReverseEntailment,
        "prep_among" | "nmod:among" => ReverseEntailment,
        "prep_around" | "nmod:around" => ReverseEntailment,
        "prep_at" | "nmod:at" => ReverseEntailment,
        "prep_before" | "nmod:before" => ReverseEntailment,
        "prep_behind" | "nmod:behind" => ReverseEntailment,
        "prep_below" | "nmod:below" => ReverseEntailment,
        "prep_beneath" | "nmod:beneath" => ReverseEntailment,
        "prep_beside" | "nmod:beside" => ReverseEntailment,
        "prep_between" | "nmod:between" => ReverseEntailment,
        "prep_beyond" | "nmod:beyond" => ReverseEntailment,
        "prep_by" | "nmod:by" => ReverseEntailment,
        "prep_despite" | "nmod:despite" => ReverseEntailment,
        "prep_down" | "nmod:down" => ReverseEntailment,
        "prep_during" | "nmod:during" => ReverseEntailment,
        "prep_except" | "nmod:except" => ReverseEntailment,
        "prep_for" | "nmod:for" => ReverseEntailment,
        "prep_from" | "nmod:from" => ReverseEntailment,
        "prep_in" | "nmod:in" => ReverseEntailment,
        "prep_inside" | "nmod:inside" => ReverseEntailment,
        "prep_into" | "nmod:into" => ReverseEntailment,
        "prep_like" | "nmod:like" => ReverseEntailment,
        "prep_near" | "nmod:near" => ReverseEntailment,
        "prep_of" | "nmod:of" => ReverseEntailment,
        "prep_off" | "nmod:off" => ReverseEntailment,
        "prep_on" | "nmod:on" => ReverseEntailment,
        "prep_onto" | "nmod:onto" => ReverseEntailment,
        "prep_out" | "nmod:out" => ReverseEntailment,
        "prep_outside" | "nmod:outside" => ReverseEntailment,
        "prep_over" | "nmod:over" => ReverseEntailment,
        "prep_past" | "nmod:past" => ReverseEntailment,
        "prep_since" | "nmod:since" => ReverseEntailment,
        "prep_through" | "nmod:through" => ReverseEntailment,
        "prep_throughout" | "nmod:throughout" => ReverseEntailment,
        "prep_to" | "nmod:to" => ReverseEntailment,
        "prep_toward" | "nmod:toward" => ReverseEntailment,
        "prep_towards" | "nmod:towards" => ReverseEntailment,
        "prep_under" | "nmod:under" => ReverseEntailment,
        "prep_underneath" | "nmod:underneath" => ReverseEntailment,
        "prep_until" | "nmod:until" => ReverseEntailment,
        "prep_up" | "nmod:up" => ReverseEntailment,
        "prep_upon" | "nmod:upon" => ReverseEntailment,
        "prep_with" | "nmod:with" => ReverseEntailment,
        "prep_within" | "nmod:within" => ReverseEntailment,
        "prep_without" | "nmod:without" => ReverseEntailment,
        "nmod:poss" => ReverseEntailment,
        "nmod:tmod" => ReverseEntailment,
        "nmod:npmod" => ReverseEntailment,
        "nmod:agent" => ReverseEntailment,

        // Collapsed conjunctions.
        "conj_and" | "conj:and" => ReverseEntailment,
        "conj_or" | "conj:or" => ReverseEntailment,
        "conj_but" | "conj:but" => ReverseEntailment,
        "conj_nor" | "conj:nor" => ReverseEntailment,
        "conj_negcc" | "conj:negcc" => Alternation,

        _ => return None,
    };
    Some(rel)
}
