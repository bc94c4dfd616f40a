//! Tokens and the mutable tree-shaped dependency graph
//!
//! Tokens live in an arena keyed by their stable 1-based sentence index;
//! edges are (governor, dependent, label) records kept in mirrored
//! incoming/outgoing adjacency lists. Back-references are always by index,
//! never by pointer, so subtree surgery cannot dangle.
//!
//! Invariant: every non-root vertex has exactly one non-extra incoming edge,
//! the graph is acyclic, and the two adjacency maps are mutual inverses.
//! [`DependencyGraph::validate`] checks all three; structural mutation
//! helpers re-establish them before returning.

use crate::error::{EngineError, Result};
use natlog_core::{Operator, Polarity};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};

/// One token of the sentence. Owned by the graph; edges refer to it by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// 1-based sentence position, stable across graph mutation.
    pub index: usize,
    /// Surface word.
    pub word: String,
    /// Lemmatized form.
    pub lemma: String,
    /// Part-of-speech tag (Penn Treebank style).
    pub pos: String,
    /// Named-entity tag, `"O"` when none.
    pub ner: String,
    /// Operator-scope polarity; identity until the annotator runs.
    #[serde(default)]
    pub polarity: Polarity,
    /// The operator this token heads, if the annotator matched one here.
    /// Deleting such a token is governed by the operator's delete relation,
    /// not by its dependency label.
    #[serde(default)]
    pub operator: Option<Operator>,
}

impl Token {
    /// Convenience constructor with default NER and identity polarity.
    pub fn new(
        index: usize,
        word: impl Into<String>,
        lemma: impl Into<String>,
        pos: impl Into<String>,
    ) -> Token {
        Token {
            index,
            word: word.into(),
            lemma: lemma.into(),
            pos: pos.into(),
            ner: "O".to_string(),
            polarity: Polarity::default(),
            operator: None,
        }
    }
}

/// A labeled, weighted, directed edge (governor → dependent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Token index of the governor.
    pub governor: usize,
    /// Token index of the dependent.
    pub dependent: usize,
    /// Dependency relation label (e.g. `nsubj`, `nmod:in`).
    pub relation: String,
    /// Edge weight; 1.0 unless the parser says otherwise.
    pub weight: f64,
    /// Secondary edge (e.g. a propagated `ref` arc); not part of the tree.
    pub is_extra: bool,
}

impl DependencyEdge {
    /// A plain tree edge with weight 1.0.
    pub fn new(governor: usize, dependent: usize, relation: impl Into<String>) -> DependencyEdge {
        DependencyEdge {
            governor,
            dependent,
            relation: relation.into(),
            weight: 1.0,
            is_extra: false,
        }
    }
}

type EdgeList = SmallVec<[DependencyEdge; 4]>;

/// A mutable, tree-shaped dependency graph over [`Token`]s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyGraph {
    tokens: BTreeMap<usize, Token>,
    outgoing: BTreeMap<usize, EdgeList>,
    incoming: BTreeMap<usize, EdgeList>,
    roots: BTreeSet<usize>,
}

impl DependencyGraph {
    /// An empty graph.
    pub fn new() -> DependencyGraph {
        DependencyGraph::default()
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True iff the graph has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// True iff `index` is a vertex of this graph.
    pub fn contains(&self, index: usize) -> bool {
        self.tokens.contains_key(&index)
    }

    /// The token at `index`, if present.
    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(&index)
    }

    /// Mutable access to the token at `index`.
    pub fn token_mut(&mut self, index: usize) -> Option<&mut Token> {
        self.tokens.get_mut(&index)
    }

    /// All tokens in sentence order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values()
    }

    /// All vertex indices in sentence order.
    pub fn vertex_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.tokens.keys().copied()
    }

    /// The root set.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.roots.iter().copied()
    }

    /// The lowest-indexed root.
    pub fn first_root(&self) -> Result<usize> {
        self.roots
            .iter()
            .next()
            .copied()
            .ok_or_else(|| EngineError::InvalidGraph {
                reason: "graph has no root".to_string(),
            })
    }

    /// Add a token as a fresh vertex (and, until an incoming edge arrives, a
    /// root).
    pub fn add_token(&mut self, token: Token) -> Result<()> {
        let index = token.index;
        if self.tokens.contains_key(&index) {
            return Err(EngineError::DuplicateVertex { index });
        }
        self.tokens.insert(index, token);
        self.roots.insert(index);
        Ok(())
    }

    /// Add an edge. Both endpoints must already be vertices; a non-extra
    /// edge demotes the dependent from the root set.
    pub fn add_edge(&mut self, edge: DependencyEdge) -> Result<()> {
        if !self.contains(edge.governor) {
            return Err(EngineError::MissingVertex {
                index: edge.governor,
            });
        }
        if !self.contains(edge.dependent) {
            return Err(EngineError::MissingVertex {
                index: edge.dependent,
            });
        }
        if !edge.is_extra {
            self.roots.remove(&edge.dependent);
        }
        self.outgoing
            .entry(edge.governor)
            .or_default()
            .push(edge.clone());
        self.incoming.entry(edge.dependent).or_default().push(edge);
        Ok(())
    }

    /// Outgoing edges of `index` (empty slice for leaves and absent vertices).
    pub fn outgoing_edges(&self, index: usize) -> &[DependencyEdge] {
        self.outgoing.get(&index).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Incoming edges of `index` (extras included).
    pub fn incoming_edges(&self, index: usize) -> &[DependencyEdge] {
        self.incoming.get(&index).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// The unique non-extra incoming edge, or `None` for roots.
    pub fn incoming_edge(&self, index: usize) -> Option<&DependencyEdge> {
        self.incoming_edges(index).iter().find(|e| !e.is_extra)
    }

    /// Remove one edge (all copies matching governor/dependent/relation).
    /// A dependent left without non-extra incoming edges becomes a root.
    pub fn remove_edge(&mut self, governor: usize, dependent: usize, relation: &str) {
        if let Some(list) = self.outgoing.get_mut(&governor) {
            list.retain(|e| !(e.dependent == dependent && e.relation == relation));
        }
        if let Some(list) = self.incoming.get_mut(&dependent) {
            list.retain(|e| !(e.governor == governor && e.relation == relation));
        }
        if self.contains(dependent) && self.incoming_edge(dependent).is_none() {
            self.roots.insert(dependent);
        }
    }

    /// Remove a vertex and every edge touching it. Orphaned dependents
    /// become roots; use [`DependencyGraph::prune_subtree`] to delete whole
    /// constituents instead.
    pub fn remove_vertex(&mut self, index: usize) {
        if self.tokens.remove(&index).is_none() {
            return;
        }
        self.roots.remove(&index);
        let out: Vec<DependencyEdge> =
            self.outgoing.remove(&index).map(|v| v.into_vec()).unwrap_or_default();
        for edge in out {
            if let Some(list) = self.incoming.get_mut(&edge.dependent) {
                list.retain(|e| e.governor != index);
            }
            if self.contains(edge.dependent) && self.incoming_edge(edge.dependent).is_none() {
                self.roots.insert(edge.dependent);
            }
        }
        let inc: Vec<DependencyEdge> =
            self.incoming.remove(&index).map(|v| v.into_vec()).unwrap_or_default();
        for edge in inc {
            if let Some(list) = self.outgoing.get_mut(&edge.governor) {
                list.retain(|e| e.dependent != index);
            }
        }
    }

    /// Force `index` to be a root, severing its incoming edges.
    pub fn set_root(&mut self, index: usize) -> Result<()> {
        if !self.contains(index) {
            return Err(EngineError::MissingVertex { index });
        }
        let inc: Vec<DependencyEdge> = self.incoming_edges(index).to_vec();
        for edge in inc {
            self.remove_edge(edge.governor, edge.dependent, &edge.relation);
        }
        self.roots.insert(index);
        Ok(())
    }

    /// Vertex indices of the subtree rooted at `index`, following non-extra
    /// edges only. Bounded traversal: a cycle cannot loop forever.
    pub fn subtree(&self, index: usize) -> Vec<usize> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![index];
        while let Some(v) = stack.pop() {
            if !self.contains(v) || !seen.insert(v) {
                continue;
            }
            for edge in self.outgoing_edges(v) {
                if !edge.is_extra {
                    stack.push(edge.dependent);
                }
            }
        }
        seen.into_iter().collect()
    }

    /// The half-open token-index span covered by the subtree at `index`.
    pub fn yield_span(&self, index: usize) -> (usize, usize) {
        let nodes = self.subtree(index);
        match (nodes.first(), nodes.last()) {
            (Some(&lo), Some(&hi)) => (lo, hi + 1),
            _ => (index, index),
        }
    }

    /// Delete the whole subtree rooted at `index` (tokens and edges).
    pub fn prune_subtree(&mut self, index: usize) {
        for v in self.subtree(index) {
            self.remove_vertex(v);
        }
    }

    /// Extract the subtree rooted at `index` as an independent graph, with
    /// `index` as its root. Tokens keep their original indices.
    pub fn extract_subtree(&self, index: usize) -> Result<DependencyGraph> {
        if !self.contains(index) {
            return Err(EngineError::MissingVertex { index });
        }
        let nodes: BTreeSet<usize> = self.subtree(index).into_iter().collect();
        let mut out = DependencyGraph::new();
        for &v in &nodes {
            if let Some(token) = self.token(v) {
                out.add_token(token.clone())?;
            }
        }
        for &v in &nodes {
            for edge in self.outgoing_edges(v) {
                if !edge.is_extra && nodes.contains(&edge.dependent) {
                    out.add_edge(edge.clone())?;
                }
            }
        }
        Ok(out)
    }

    /// Vertices in topological order (roots first). Falls back to sentence
    /// order for vertices stranded by a malformed graph, so the result
    /// always covers every vertex.
    pub fn topological_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.len());
        let mut seen = BTreeSet::new();
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(v) = stack.pop() {
            if !seen.insert(v) {
                continue;
            }
            order.push(v);
            let mut children: Vec<usize> = self
                .outgoing_edges(v)
                .iter()
                .filter(|e| !e.is_extra)
                .map(|e| e.dependent)
                .collect();
            children.sort_unstable_by(|a, b| b.cmp(a));
            stack.extend(children);
        }
        for v in self.vertex_indices() {
            if seen.insert(v) {
                order.push(v);
            }
        }
        order
    }

    /// Check the tree invariant: a non-empty root set, exactly one non-extra
    /// incoming edge per non-root vertex, adjacency maps that mirror each
    /// other, and no cycles.
    pub fn validate(&self) -> Result<()> {
        if self.tokens.is_empty() {
            return Ok(());
        }
        if self.roots.is_empty() {
            return Err(EngineError::InvalidGraph {
                reason: "no root vertex".to_string(),
            });
        }
        for (&v, _) in &self.tokens {
            let non_extra = self
                .incoming_edges(v)
                .iter()
                .filter(|e| !e.is_extra)
                .count();
            if self.roots.contains(&v) {
                if non_extra != 0 {
                    return Err(EngineError::InvalidGraph {
                        reason: format!("root vertex {v} has an incoming edge"),
                    });
                }
            } else if non_extra != 1 {
                return Err(EngineError::InvalidGraph {
                    reason: format!("vertex {v} has {non_extra} non-extra incoming edges"),
                });
            }
        }
        // Mirror consistency.
        for (&gov, edges) in &self.outgoing {
            for edge in edges {
                let mirrored = self
                    .incoming_edges(edge.dependent)
                    .iter()
                    .any(|e| e.governor == gov && e.relation == edge.relation);
                if !mirrored {
                    return Err(EngineError::InvalidGraph {
                        reason: format!(
                            "edge {gov} -{}-> {} missing from incoming index",
                            edge.relation, edge.dependent
                        ),
                    });
                }
            }
        }
        // Reachability doubles as the cycle check: in a graph where every
        // non-root has exactly one parent, an unreachable vertex means a
        // cycle detached from the roots.
        let reachable: BTreeSet<usize> = {
            let mut seen = BTreeSet::new();
            let mut stack: Vec<usize> = self.roots.iter().copied().collect();
            while let Some(v) = stack.pop() {
                if !seen.insert(v) {
                    continue;
                }
                for edge in self.outgoing_edges(v) {
                    if !edge.is_extra {
                        stack.push(edge.dependent);
                    }
                }
            }
            seen
        };
        if reachable.len() != self.tokens.len() {
            return Err(EngineError::InvalidGraph {
                reason: "cycle detected: not all vertices reachable from roots".to_string(),
            });
        }
        Ok(())
    }

    /// Surface words in sentence order, space-joined.
    pub fn sentence_string(&self) -> String {
        let words: Vec<&str> = self.tokens.values().map(|t| t.word.as_str()).collect();
        words.join(" ")
    }
}

/// Incremental constructor for tests and embedders: push tokens, wire edges,
/// validate on build.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: DependencyGraph,
    next_index: usize,
    root: Option<usize>,
}

impl GraphBuilder {
    /// A builder with no tokens.
    pub fn new() -> GraphBuilder {
        GraphBuilder {
            graph: DependencyGraph::new(),
            next_index: 1,
            root: None,
        }
    }

    /// Append a token, assigning the next 1-based index. Returns the index.
    pub fn token(
        &mut self,
        word: impl Into<String>,
        lemma: impl Into<String>,
        pos: impl Into<String>,
    ) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        // Indices are assigned here, so insertion cannot collide.
        let _ = self.graph.add_token(Token::new(index, word, lemma, pos));
        index
    }

    /// Set the NER tag of an existing token.
    pub fn ner(&mut self, index: usize, ner: impl Into<String>) -> &mut Self {
        if let Some(token) = self.graph.token_mut(index) {
            token.ner = ner.into();
        }
        self
    }

    /// Add a tree edge.
    pub fn edge(&mut self, governor: usize, dependent: usize, relation: &str) -> Result<&mut Self> {
        self.graph
            .add_edge(DependencyEdge::new(governor, dependent, relation))?;
        Ok(self)
    }

    /// Declare the root explicitly (otherwise inferred from incoming edges).
    pub fn root(&mut self, index: usize) -> &mut Self {
        self.root = Some(index);
        self
    }

    /// Validate and return the finished graph.
    pub fn build(self) -> Result<DependencyGraph> {
        let graph = self.graph;
        if let Some(root) = self.root {
            if !graph.roots.contains(&root) {
                return Err(EngineError::InvalidGraph {
                    reason: format!("declared root {root} has an incoming edge"),
                });
            }
        }
        graph.validate()?;
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats_graph() -> DependencyGraph {
        // "All cats have tails": have -nsubj-> cats -det-> All; have -dobj-> tails
        let mut b = GraphBuilder::new();
        let all = b.token("All", "all", "DT");
        let cats = b.token("cats", "cat", "NNS");
        let have = b.token("have", "have", "VBP");
        let tails = b.token("tails", "tail", "NNS");
        b.edge(have, cats, "nsubj").unwrap();
        b.edge(cats, all, "det").unwrap();
        b.edge(have, tails, "dobj").unwrap();
        b.build().unwrap()
    }

    #[test]
    fn builder_assigns_stable_indices() {
        let g = cats_graph();
        assert_eq!(g.len(), 4);
        assert_eq!(g.token(2).unwrap().lemma, "cat");
        assert_eq!(g.first_root().unwrap(), 3);
        assert_eq!(g.sentence_string(), "All cats have tails");
    }

    #[test]
    fn incoming_outgoing_are_inverses() {
        let g = cats_graph();
        g.validate().unwrap();
        assert_eq!(g.incoming_edge(2).unwrap().relation, "nsubj");
        assert_eq!(g.outgoing_edges(3).len(), 2);
        assert!(g.incoming_edge(3).is_none());
    }

    #[test]
    fn subtree_and_yield() {
        let g = cats_graph();
        assert_eq!(g.subtree(2), vec![1, 2]);
        assert_eq!(g.yield_span(2), (1, 3));
        assert_eq!(g.subtree(3), vec![1, 2, 3, 4]);
    }

    #[test]
    fn prune_subtree_keeps_invariant() {
        let mut g = cats_graph();
        g.prune_subtree(2);
        assert_eq!(g.len(), 2);
        assert!(!g.contains(1));
        assert!(!g.contains(2));
        g.validate().unwrap();
        assert_eq!(g.sentence_string(), "have tails");
    }

    #[test]
    fn extract_subtree_is_rooted_copy() {
        let g = cats_graph();
        let sub = g.extract_subtree(2).unwrap();
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.first_root().unwrap(), 2);
        sub.validate().unwrap();
        // Original untouched.
        assert_eq!(g.len(), 4);
    }

    #[test]
    fn topological_order_starts_at_root() {
        let g = cats_graph();
        let order = g.topological_order();
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], 3);
        let pos_cats = order.iter().position(|&v| v == 2).unwrap();
        let pos_all = order.iter().position(|&v| v == 1).unwrap();
        assert!(pos_cats < pos_all);
    }

    #[test]
    fn validate_rejects_double_headed_vertex() {
        let mut b = GraphBuilder::new();
        let a = b.token("a", "a", "DT");
        let n = b.token("cat", "cat", "NN");
        let v = b.token("sat", "sit", "VBD");
        b.edge(v, n, "nsubj").unwrap();
        b.edge(n, a, "det").unwrap();
        b.edge(v, a, "det").unwrap();
        assert!(b.build().is_err());
    }

    #[test]
    fn validate_rejects_cycle() {
        let mut g = DependencyGraph::new();
        g.add_token(Token::new(1, "a", "a", "DT")).unwrap();
        g.add_token(Token::new(2, "b", "b", "NN")).unwrap();
        g.add_token(Token::new(3, "c", "c", "VB")).unwrap();
        g.add_edge(DependencyEdge::new(1, 2, "dep")).unwrap();
        g.add_edge(DependencyEdge::new(2, 1, "dep")).unwrap();
        assert!(g.validate().is_err());
    }

    #[test]
    fn graph_serializes_round_trip() {
        let g = cats_graph();
        let json = serde_json::to_string(&g).unwrap();
        let back: DependencyGraph = serde_json::from_str(&json).unwrap();
        back.validate().unwrap();
        assert_eq!(back.len(), g.len());
        assert_eq!(back.sentence_string(), g.sentence_string());
        assert_eq!(back.incoming_edge(2).unwrap().relation, "nsubj");
        assert_eq!(back.first_root().unwrap(), 3);
    }

    #[test]
    fn extra_edges_do_not_affect_roots() {
        let mut g = cats_graph();
        let mut extra = DependencyEdge::new(4, 2, "ref");
        extra.is_extra = true;
        g.add_edge(extra).unwrap();
        g.validate().unwrap();
        assert_eq!(g.incoming_edges(2).len(), 2);
        assert_eq!(g.incoming_edge(2).unwrap().relation, "nsubj");
    }
}
