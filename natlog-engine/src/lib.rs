//! Sentence simplification by natural-logic deletion
//!
//! This crate layers sentence-level machinery on top of the relation
//! algebra in `natlog-core`:
//!
//! - [`graph`]: tokens and a mutable tree-shaped dependency graph with
//!   subtree surgery.
//! - [`annotator`]: operator detection and polarity marking over a graph.
//! - [`weights`]: the table-backed deletion-probability model.
//! - [`search`]: the clause-split search and the forward-entailment
//!   deletion search.
//!
//! The intended pipeline runs annotate, split, then entail:
//!
//! ```
//! use natlog_engine::{
//!     ClauseSplitter, ForwardEntailer, GraphBuilder, NaturalLogicAnnotator,
//!     NaturalLogicWeights,
//! };
//!
//! # fn main() -> natlog_engine::Result<()> {
//! let mut builder = GraphBuilder::new();
//! let all = builder.token("All", "all", "DT");
//! let cats = builder.token("cats", "cat", "NNS");
//! let have = builder.token("have", "have", "VBP");
//! let tails = builder.token("tails", "tail", "NNS");
//! builder.edge(have, cats, "nsubj")?;
//! builder.edge(cats, all, "det")?;
//! builder.edge(have, tails, "dobj")?;
//! let mut graph = builder.build()?;
//!
//! NaturalLogicAnnotator::new().annotate(&mut graph);
//!
//! let weights = NaturalLogicWeights::default();
//! let entailer = ForwardEntailer::new(&weights);
//! for clause in ClauseSplitter::new(&graph).top_clauses(8) {
//!     for result in entailer.search(clause.graph(), true) {
//!         println!("{} ({:.3})", result.fragment.to_sentence_string(), result.score);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod annotator;
pub mod error;
pub mod fragment;
pub mod graph;
pub mod search;
pub mod weights;

pub use annotator::NaturalLogicAnnotator;
pub use error::{EngineError, Result};
pub use fragment::SentenceFragment;
pub use graph::{DependencyEdge, DependencyGraph, GraphBuilder, Token};
pub use search::{
    ClauseSplitter, ClauseSplitterConfig, Classifier, DefaultFeaturizer, Featurizer,
    ForwardEntailer, ForwardEntailerConfig, LinearClassifier, SearchResult,
};
pub use weights::NaturalLogicWeights;
