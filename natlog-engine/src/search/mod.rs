//! The two search procedures built on the relation/polarity algebra
//!
//! [`clause`] splits a sentence into independent clauses with a
//! classifier-guided best-first search; [`entail`] shortens one clause by a
//! bounded depth-first search over natural-logic-licensed deletions.

pub mod clause;
pub mod entail;

pub use clause::{
    ClauseClassifierLabel, ClauseSplitter, ClauseSplitterConfig, ClauseState, Classifier,
    DefaultFeaturizer, FeatureVector, Featurizer, LinearClassifier, SplitAction,
};
pub use entail::{ForwardEntailer, ForwardEntailerConfig, SearchResult};
