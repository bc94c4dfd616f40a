//! Scored sentence fragments: the output type of both searches

use crate::graph::{DependencyGraph, Token};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A candidate simplified sentence or clause.
///
/// Owns a private copy of its sub-graph. The score starts at 1.0 and is
/// settable exactly once; later calls are ignored. Equality and hashing are
/// defined over the vertex index set only (structural identity), so two
/// fragments covering the same tokens compare equal even if produced by
/// different edit sequences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceFragment {
    graph: DependencyGraph,
    /// Truth value assumed for the source sentence when this fragment was
    /// licensed.
    pub assumed_truth: bool,
    score: f64,
    score_set: bool,
}

impl SentenceFragment {
    /// Wrap a sub-graph with score 1.0.
    pub fn new(graph: DependencyGraph, assumed_truth: bool) -> SentenceFragment {
        SentenceFragment {
            graph,
            assumed_truth,
            score: 1.0,
            score_set: false,
        }
    }

    /// The fragment's sub-graph.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Current score, in (0, 1].
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Set the score. Only the first call takes effect; returns whether this
    /// call did.
    pub fn change_score(&mut self, score: f64) -> bool {
        if self.score_set || !score.is_finite() {
            return false;
        }
        self.score = score;
        self.score_set = true;
        true
    }

    /// Tokens in sentence order.
    pub fn words(&self) -> Vec<&Token> {
        self.graph.tokens().collect()
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    /// True iff the fragment covers no tokens.
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Surface words in sentence order, space-joined.
    pub fn to_sentence_string(&self) -> String {
        self.graph.sentence_string()
    }
}

impl PartialEq for SentenceFragment {
    fn eq(&self, other: &SentenceFragment) -> bool {
        self.graph.len() == other.graph.len()
            && self
                .graph
                .vertex_indices()
                .eq(other.graph.vertex_indices())
    }
}

impl Eq for SentenceFragment {}

impl Hash for SentenceFragment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for index in self.graph.vertex_indices() {
            index.hash(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    fn small_graph(words: &[(&str, &str)]) -> DependencyGraph {
        let mut b = GraphBuilder::new();
        let mut prev = None;
        for &(word, pos) in words {
            let idx = b.token(word, word, pos);
            if let Some(p) = prev {
                b.edge(p, idx, "dep").unwrap();
            }
            prev = Some(idx);
        }
        b.build().unwrap()
    }

    #[test]
    fn score_sets_once() {
        let mut fragment =
            SentenceFragment::new(small_graph(&[("cats", "NNS"), ("purr", "VBP")]), true);
        assert_eq!(fragment.score(), 1.0);
        assert!(fragment.change_score(0.5));
        assert!(!fragment.change_score(0.25));
        assert_eq!(fragment.score(), 0.5);
    }

    #[test]
    fn non_finite_scores_are_rejected() {
        let mut fragment =
            SentenceFragment::new(small_graph(&[("cats", "NNS"), ("purr", "VBP")]), true);
        assert!(!fragment.change_score(f64::NAN));
        assert!(!fragment.change_score(f64::INFINITY));
        assert_eq!(fragment.score(), 1.0);
        // A rejected value does not burn the one-shot set.
        assert!(fragment.change_score(0.75));
    }

    #[test]
    fn equality_is_over_vertex_sets() {
        let a = SentenceFragment::new(small_graph(&[("cats", "NNS"), ("purr", "VBP")]), true);
        let mut b = SentenceFragment::new(small_graph(&[("cats", "NNS"), ("purr", "VBP")]), false);
        b.change_score(0.1);
        // Same indices, different truth and score: still equal.
        assert_eq!(a, b);

        let c = SentenceFragment::new(small_graph(&[("cats", "NNS")]), true);
        assert_ne!(a, c);
    }

    #[test]
    fn sentence_string_in_index_order() {
        let fragment = SentenceFragment::new(
            small_graph(&[("big", "JJ"), ("cats", "NNS"), ("purr", "VBP")]),
            true,
        );
        assert_eq!(fragment.to_sentence_string(), "big cats purr");
    }
}
