//! Clause-split search
//!
//! A best-first search over a small action space applied to dependency
//! edges, producing ranked candidate clause splits. The fringe is ordered by
//! cumulative log-probability; a hard-coded per-relation preference table
//! short-circuits the classifier for relations whose split strategy is
//! known, and an injected [`Classifier`]/[`Featurizer`] pair scores
//! everything else. Without a classifier every applicable edge is treated as
//! an unconditional split candidate.

use crate::error::{EngineError, Result};
use crate::fragment::SentenceFragment;
use crate::graph::{DependencyEdge, DependencyGraph};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;
use tracing::{debug, trace};

/// Sparse named-feature map handed to the classifier.
pub type FeatureVector = HashMap<String, f64>;

/// The 3-way label set the classifier scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClauseClassifierLabel {
    /// This edge starts a complete, standalone clause.
    ClauseSplit,
    /// This edge is on the way to a clause but is not one itself.
    ClauseInterm,
    /// Nothing below this edge is a clause.
    NotAClause,
}

impl ClauseClassifierLabel {
    /// All labels, in score-array order.
    pub const VALUES: [ClauseClassifierLabel; 3] = [
        ClauseClassifierLabel::ClauseSplit,
        ClauseClassifierLabel::ClauseInterm,
        ClauseClassifierLabel::NotAClause,
    ];

    /// Position of this label in a classifier score array.
    pub fn index(self) -> usize {
        match self {
            ClauseClassifierLabel::ClauseSplit => 0,
            ClauseClassifierLabel::ClauseInterm => 1,
            ClauseClassifierLabel::NotAClause => 2,
        }
    }

    /// Decode a label index. An out-of-range index is a programming error in
    /// the classifier and aborts state construction.
    pub fn from_index(index: usize) -> Result<ClauseClassifierLabel> {
        Self::VALUES
            .get(index)
            .copied()
            .ok_or(EngineError::InvalidClassifierLabel { index })
    }
}

impl fmt::Display for ClauseClassifierLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClauseClassifierLabel::ClauseSplit => "clause_split",
            ClauseClassifierLabel::ClauseInterm => "clause_interm",
            ClauseClassifierLabel::NotAClause => "not_a_clause",
        };
        f.write_str(name)
    }
}

/// Scores a feature map into unnormalized non-negative weights for
/// `[ClauseSplit, ClauseInterm, NotAClause]`.
pub trait Classifier {
    /// Score the three labels; the search log-normalizes the result.
    fn score(&self, features: &FeatureVector) -> [f64; 3];
}

/// A linear model over named features with a softmax readout. The concrete
/// classifier shape produced by offline training; weights are external data,
/// never learned here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearClassifier {
    /// Per-feature weight triples, `[split, interm, not]`.
    pub weights: HashMap<String, [f64; 3]>,
    /// Label biases.
    pub bias: [f64; 3],
}

impl Classifier for LinearClassifier {
    fn score(&self, features: &FeatureVector) -> [f64; 3] {
        let mut logits = self.bias;
        for (name, &value) in features {
            if let Some(w) = self.weights.get(name) {
                for (logit, wi) in logits.iter_mut().zip(w) {
                    *logit += wi * value;
                }
            }
        }
        let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mut scores = [0.0; 3];
        for (s, &l) in scores.iter_mut().zip(&logits) {
            *s = (l - max).exp();
        }
        scores
    }
}

/// Turns a (from-state, action, to-state) triple into a sparse feature map.
pub trait Featurizer {
    /// Featurize one candidate transition.
    fn featurize(&self, from: &ClauseState, action: &str, to: &ClauseState) -> FeatureVector;
}

impl<F> Featurizer for F
where
    F: Fn(&ClauseState, &str, &ClauseState) -> FeatureVector,
{
    fn featurize(&self, from: &ClauseState, action: &str, to: &ClauseState) -> FeatureVector {
        self(from, action, to)
    }
}

/// The built-in featurizer: edge relation and coarse type, sibling-relation
/// signatures of the governor and dependent, a POS bigram, the action taken,
/// and the distance from the last subject.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFeaturizer;

impl Featurizer for DefaultFeaturizer {
    fn featurize(&self, from: &ClauseState, action: &str, to: &ClauseState) -> FeatureVector {
        let mut features = FeatureVector::new();
        features.insert(format!("action={action}"), 1.0);
        if let Some(edge) = &to.edge {
            features.insert(format!("edge_rel={}", edge.relation), 1.0);
            features.insert(format!("edge_type={}", coarse_type(&edge.relation)), 1.0);
            let gov_pos = from
                .graph
                .token(edge.governor)
                .map(|t| t.pos.as_str())
                .unwrap_or("?");
            let dep_pos = from
                .graph
                .token(edge.dependent)
                .map(|t| t.pos.as_str())
                .unwrap_or("?");
            features.insert(format!("pos_sig={gov_pos}_{dep_pos}"), 1.0);

            let mut parent_rels: Vec<&str> = from
                .graph
                .outgoing_edges(edge.governor)
                .iter()
                .filter(|e| !e.is_extra && e.dependent != edge.dependent)
                .map(|e| e.relation.as_str())
                .collect();
            parent_rels.sort_unstable();
            features.insert(format!("parent_rels={}", parent_rels.join(",")), 1.0);

            let mut child_rels: Vec<&str> = from
                .graph
                .outgoing_edges(edge.dependent)
                .iter()
                .filter(|e| !e.is_extra)
                .map(|e| e.relation.as_str())
                .collect();
            child_rels.sort_unstable();
            features.insert(format!("child_rels={}", child_rels.join(",")), 1.0);
        }
        features.insert(
            format!("dist_from_subj={}", to.distance_from_subject),
            1.0,
        );
        features.insert("bias".to_string(), 1.0);
        features
    }
}

fn coarse_type(relation: &str) -> &'static str {
    if relation.contains("subj") {
        "subj"
    } else if relation == "dobj" || relation == "obj" || relation == "iobj" {
        "obj"
    } else if relation.starts_with("nmod") || relation.starts_with("prep") || relation == "advmod" {
        "mod"
    } else if matches!(relation, "ccomp" | "xcomp" | "advcl" | "acl" | "acl:relcl" | "csubj") {
        "clause"
    } else {
        "other"
    }
}

/// The closed action space of the split search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitAction {
    /// Take the dependent's subtree as a standalone clause.
    Simple,
    /// Take the dependent's subtree and demote the governor (plus its noun
    /// modifiers) into it as a passive subject.
    CloneRootAsNsubjpass,
    /// Take the dependent's subtree and copy the enclosing clause's subject
    /// in as its subject.
    CloneNsubj,
    /// Take the dependent's subtree and copy the enclosing clause's direct
    /// object in as its subject.
    CloneDobj,
}

impl SplitAction {
    /// Every action, in default trial order.
    pub const VALUES: [SplitAction; 4] = [
        SplitAction::Simple,
        SplitAction::CloneRootAsNsubjpass,
        SplitAction::CloneNsubj,
        SplitAction::CloneDobj,
    ];

    /// Stable action name, as used in the hard-split preference table.
    pub fn name(self) -> &'static str {
        match self {
            SplitAction::Simple => "simple",
            SplitAction::CloneRootAsNsubjpass => "clone_root_as_nsubjpass",
            SplitAction::CloneNsubj => "clone_nsubj",
            SplitAction::CloneDobj => "clone_dobj",
        }
    }

    /// Look up an action by name.
    pub fn from_name(name: &str) -> Option<SplitAction> {
        Self::VALUES.iter().copied().find(|a| a.name() == name)
    }

    /// Cheap validity check before the action is materialized. `context`
    /// carries the argument edges visible at this point in the search.
    fn prerequisites_met(
        self,
        graph: &DependencyGraph,
        context: &ArgumentContext,
        edge: &DependencyEdge,
    ) -> bool {
        match self {
            SplitAction::Simple => graph
                .token(edge.dependent)
                .and_then(|t| t.pos.chars().next())
                .map_or(false, |c| matches!(c, 'N' | 'V' | 'J' | 'P' | 'D')),
            SplitAction::CloneRootAsNsubjpass => {
                let nontrivial = graph
                    .outgoing_edges(edge.governor)
                    .iter()
                    .filter(|e| !e.is_extra)
                    .filter(|e| !matches!(e.relation.as_str(), "nn" | "amod" | "compound"))
                    .count();
                nontrivial <= 1
            }
            SplitAction::CloneNsubj => {
                context.subject.is_some() && !has_subject_child(graph, edge.dependent)
            }
            SplitAction::CloneDobj => {
                context.object.is_some() && !has_subject_child(graph, edge.dependent)
            }
        }
    }

    /// Materialize the clause this action splits off, or `None` when the
    /// surgery cannot be performed on this edge.
    fn apply(
        self,
        graph: &DependencyGraph,
        context: &ArgumentContext,
        edge: &DependencyEdge,
    ) -> Option<DependencyGraph> {
        let mut clause = graph.extract_subtree(edge.dependent).ok()?;
        match self {
            SplitAction::Simple => {}
            SplitAction::CloneRootAsNsubjpass => {
                copy_argument(graph, &mut clause, edge.governor, edge.dependent, "nsubjpass")?;
                // Only noun-modifier children come along with the governor.
                for child in graph.outgoing_edges(edge.governor) {
                    if !matches!(child.relation.as_str(), "nn" | "amod" | "compound") {
                        let dependent = child.dependent;
                        if clause.contains(dependent) && dependent != edge.dependent {
                            clause.prune_subtree(dependent);
                        }
                    }
                }
            }
            SplitAction::CloneNsubj => {
                let subject = context.subject.as_ref()?;
                copy_argument(graph, &mut clause, subject.dependent, edge.dependent, "nsubj")?;
            }
            SplitAction::CloneDobj => {
                let object = context.object.as_ref()?;
                copy_argument(graph, &mut clause, object.dependent, edge.dependent, "nsubj")?;
            }
        }
        clause.validate().ok()?;
        Some(clause)
    }
}

/// Subject/object argument edges visible when expanding one edge: whatever
/// was accumulated along the search path, falling back to siblings of the
/// edge's governor.
struct ArgumentContext {
    subject: Option<DependencyEdge>,
    object: Option<DependencyEdge>,
    distance_from_subject: usize,
}

impl ArgumentContext {
    fn at(graph: &DependencyGraph, state: &ClauseState, edge: &DependencyEdge) -> ArgumentContext {
        let sibling = |pred: fn(&str) -> bool| {
            graph
                .outgoing_edges(edge.governor)
                .iter()
                .filter(|e| !e.is_extra && e.dependent != edge.dependent)
                .find(|e| pred(&e.relation))
                .cloned()
        };
        ArgumentContext {
            subject: state
                .subject
                .clone()
                .or_else(|| sibling(|rel| rel.contains("subj"))),
            object: state
                .object
                .clone()
                .or_else(|| sibling(|rel| rel == "dobj" || rel == "obj")),
            distance_from_subject: state.distance_from_subject,
        }
    }
}

fn has_subject_child(graph: &DependencyGraph, index: usize) -> bool {
    graph
        .outgoing_edges(index)
        .iter()
        .any(|e| e.relation.contains("subj"))
}

/// Copy the subtree at `argument` out of `source` and attach it under
/// `head` in `clause` with the given relation.
fn copy_argument(
    source: &DependencyGraph,
    clause: &mut DependencyGraph,
    argument: usize,
    head: usize,
    relation: &str,
) -> Option<()> {
    if clause.contains(argument) {
        return Some(());
    }
    let subtree = source.extract_subtree(argument).ok()?;
    for token in subtree.tokens() {
        clause.add_token(token.clone()).ok()?;
    }
    for v in subtree.vertex_indices() {
        for edge in subtree.outgoing_edges(v) {
            clause.add_edge(edge.clone()).ok()?;
        }
    }
    clause
        .add_edge(DependencyEdge::new(head, argument, relation))
        .ok()?;
    Some(())
}

/// One node of the implicit search tree. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct ClauseState {
    /// The clause this state would emit (a snapshot; edits are applied
    /// eagerly when the state is built).
    pub graph: DependencyGraph,
    /// Frontier word in the original sentence to expand from.
    pub frontier: usize,
    /// The edge traversed to reach this state, `None` for the root state.
    pub edge: Option<DependencyEdge>,
    /// Subject edge accumulated along the path, for clone actions.
    pub subject: Option<DependencyEdge>,
    /// Object edge accumulated along the path, for clone actions.
    pub object: Option<DependencyEdge>,
    /// Edges traversed since the last subject edge.
    pub distance_from_subject: usize,
    /// Cumulative log-probability (≤ 0).
    pub log_prob: f64,
    /// Whether this state is a complete clause split.
    pub done: bool,
}

/// Fringe entry: max-heap on log-probability, FIFO on ties.
struct ScoredState {
    state: ClauseState,
    seq: usize,
}

impl PartialEq for ScoredState {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for ScoredState {}
impl PartialOrd for ScoredState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ScoredState {
    fn cmp(&self, other: &Self) -> Ordering {
        self.state
            .log_prob
            .total_cmp(&other.state.log_prob)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Budget and behavior knobs for the split search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClauseSplitterConfig {
    /// Maximum number of fringe pops before the search silently truncates.
    pub max_ticks: usize,
}

impl Default for ClauseSplitterConfig {
    fn default() -> ClauseSplitterConfig {
        ClauseSplitterConfig { max_ticks: 1000 }
    }
}

/// The clause-split search problem over one sentence.
pub struct ClauseSplitter<'a> {
    graph: &'a DependencyGraph,
    classifier: Option<&'a dyn Classifier>,
    featurizer: &'a dyn Featurizer,
    hard_splits: HashMap<String, Vec<SplitAction>>,
    config: ClauseSplitterConfig,
}

impl<'a> ClauseSplitter<'a> {
    /// A splitter with no classifier: every applicable edge splits
    /// unconditionally, guided only by the hard-split preference table.
    pub fn new(graph: &'a DependencyGraph) -> ClauseSplitter<'a> {
        ClauseSplitter {
            graph,
            classifier: None,
            featurizer: &DefaultFeaturizer,
            hard_splits: default_hard_splits(),
            config: ClauseSplitterConfig::default(),
        }
    }

    /// Attach a classifier.
    pub fn with_classifier(mut self, classifier: &'a dyn Classifier) -> ClauseSplitter<'a> {
        self.classifier = Some(classifier);
        self
    }

    /// Replace the featurizer.
    pub fn with_featurizer(mut self, featurizer: &'a dyn Featurizer) -> ClauseSplitter<'a> {
        self.featurizer = featurizer;
        self
    }

    /// Replace the relation → action-preference table. Keys are relation
    /// labels; values are action names in forced trial order.
    pub fn with_hard_splits(mut self, table: HashMap<String, Vec<SplitAction>>) -> ClauseSplitter<'a> {
        self.hard_splits = table;
        self
    }

    /// Replace the budget configuration.
    pub fn with_config(mut self, config: ClauseSplitterConfig) -> ClauseSplitter<'a> {
        self.config = config;
        self
    }

    /// Run the search, handing each emitted clause to `candidate` together
    /// with its probability. Returning `false` stops the search entirely.
    pub fn search_with(&self, mut candidate: impl FnMut(&SentenceFragment) -> bool) {
        let Ok(root) = self.graph.first_root() else {
            debug!("clause split on rootless graph, nothing to do");
            return;
        };

        let mut fringe: BinaryHeap<ScoredState> = BinaryHeap::new();
        let mut seq = 0usize;
        let mut seen_words: HashSet<usize> = HashSet::new();

        let root_state = ClauseState {
            graph: self.graph.clone(),
            frontier: root,
            edge: None,
            subject: None,
            object: None,
            distance_from_subject: 0,
            log_prob: 0.0,
            done: true,
        };
        fringe.push(ScoredState {
            state: root_state,
            seq,
        });
        seq += 1;

        let mut ticks = 0usize;
        while let Some(ScoredState { state, .. }) = fringe.pop() {
            ticks += 1;
            if ticks > self.config.max_ticks {
                debug!(ticks, "clause split budget exhausted, truncating");
                return;
            }

            if state.done {
                let mut fragment = SentenceFragment::new(state.graph.clone(), true);
                fragment.change_score(state.log_prob.exp());
                trace!(score = fragment.score(), clause = %fragment.to_sentence_string(), "emitting clause");
                if !candidate(&fragment) {
                    return;
                }
            }

            for edge in self.graph.outgoing_edges(state.frontier) {
                if edge.is_extra || seen_words.contains(&edge.dependent) {
                    continue;
                }
                self.expand_edge(&state, edge, &mut fringe, &mut seq);
                seen_words.insert(edge.dependent);
            }
        }
    }

    /// Collect the `n` best clauses (including the whole sentence).
    pub fn top_clauses(&self, n: usize) -> Vec<SentenceFragment> {
        let mut clauses = Vec::new();
        self.search_with(|fragment| {
            clauses.push(fragment.clone());
            clauses.len() < n
        });
        clauses
    }

    fn expand_edge(
        &self,
        state: &ClauseState,
        edge: &DependencyEdge,
        fringe: &mut BinaryHeap<ScoredState>,
        seq: &mut usize,
    ) {
        let context = ArgumentContext::at(self.graph, state, edge);

        // Forced preference order for known relations: the first applicable
        // action is a zero-cost guaranteed split.
        if let Some(preferences) = self.hard_splits.get(&edge.relation) {
            for &action in preferences {
                if !action.prerequisites_met(self.graph, &context, edge) {
                    continue;
                }
                if let Some(clause) = action.apply(self.graph, &context, edge) {
                    trace!(relation = %edge.relation, action = action.name(), "hard split");
                    let next = self.make_state(&context, edge, clause, state.log_prob, true);
                    fringe.push(ScoredState {
                        state: next,
                        seq: *seq,
                    });
                    *seq += 1;
                    return;
                }
            }
            // Exhausted the forced choices; fall through to scoring.
        }

        for action in SplitAction::VALUES {
            if !action.prerequisites_met(self.graph, &context, edge) {
                continue;
            }
            let Some(clause) = action.apply(self.graph, &context, edge) else {
                continue;
            };
            let candidate = self.make_state(&context, edge, clause, state.log_prob, true);
            match self.classifier {
                None => {
                    fringe.push(ScoredState {
                        state: candidate,
                        seq: *seq,
                    });
                    *seq += 1;
                }
                Some(classifier) => {
                    let features = self
                        .featurizer
                        .featurize(state, action.name(), &candidate);
                    let Some((label, log_prob)) =
                        best_label(classifier.score(&features), &edge.relation)
                    else {
                        continue;
                    };
                    let total = state.log_prob + log_prob;
                    // A non-finite score means probability zero: do not take
                    // this action.
                    if !total.is_finite() {
                        continue;
                    }
                    match label {
                        ClauseClassifierLabel::NotAClause => {}
                        ClauseClassifierLabel::ClauseSplit => {
                            let mut done = candidate;
                            done.log_prob = total;
                            done.done = true;
                            fringe.push(ScoredState {
                                state: done,
                                seq: *seq,
                            });
                            *seq += 1;
                        }
                        ClauseClassifierLabel::ClauseInterm => {
                            let mut interm = candidate;
                            interm.log_prob = total;
                            interm.done = false;
                            fringe.push(ScoredState {
                                state: interm,
                                seq: *seq,
                            });
                            *seq += 1;
                        }
                    }
                }
            }
        }
    }

    fn make_state(
        &self,
        context: &ArgumentContext,
        edge: &DependencyEdge,
        clause: DependencyGraph,
        log_prob: f64,
        done: bool,
    ) -> ClauseState {
        let is_subj = edge.relation.contains("subj");
        let is_obj = edge.relation == "dobj" || edge.relation == "obj";
        ClauseState {
            graph: clause,
            frontier: edge.dependent,
            edge: Some(edge.clone()),
            subject: if is_subj {
                Some(edge.clone())
            } else {
                context.subject.clone()
            },
            object: if is_obj {
                Some(edge.clone())
            } else {
                context.object.clone()
            },
            distance_from_subject: if is_subj {
                0
            } else {
                context.distance_from_subject + 1
            },
            log_prob,
            done,
        }
    }
}

/// Normalize classifier scores, apply the subject/object floor (a `nsubj` or
/// `dobj` edge is never `NotAClause`), and return the argmax label with its
/// log-probability.
fn best_label(scores: [f64; 3], relation: &str) -> Option<(ClauseClassifierLabel, f64)> {
    let mut scores = scores;
    let floored = relation == "nsubj" || relation == "dobj";
    if floored {
        scores[ClauseClassifierLabel::NotAClause.index()] = 0.0;
    }
    let total: f64 = scores.iter().sum();
    if !(total > 0.0) || !total.is_finite() {
        // A subject or object edge still yields a free intermediate state
        // even when the classifier put all its mass on NotAClause.
        if floored && total == 0.0 {
            return Some((ClauseClassifierLabel::ClauseInterm, 0.0));
        }
        return None;
    }
    let (best, &weight) = scores
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))?;
    if weight <= 0.0 {
        return None;
    }
    // The label index comes from our own enumeration, so decoding cannot
    // fail here; classifiers feeding raw indices go through from_index.
    let label = ClauseClassifierLabel::from_index(best).ok()?;
    Some((label, (weight / total).ln()))
}

/// The built-in relation → action-preference table.
pub fn default_hard_splits() -> HashMap<String, Vec<SplitAction>> {
    let mut table = HashMap::new();
    table.insert(
        "xcomp".to_string(),
        vec![
            SplitAction::CloneDobj,
            SplitAction::CloneNsubj,
            SplitAction::Simple,
        ],
    );
    table.insert(
        "advcl".to_string(),
        vec![SplitAction::CloneNsubj, SplitAction::Simple],
    );
    table.insert(
        "acl:relcl".to_string(),
        vec![SplitAction::CloneNsubj, SplitAction::Simple],
    );
    table.insert(
        "rcmod".to_string(),
        vec![SplitAction::CloneNsubj, SplitAction::Simple],
    );
    table.insert(
        "vmod".to_string(),
        vec![SplitAction::CloneNsubj, SplitAction::Simple],
    );
    table.insert(
        "csubj".to_string(),
        vec![SplitAction::CloneDobj, SplitAction::Simple],
    );
    table.insert("ccomp".to_string(), vec![SplitAction::Simple]);
    table.insert("parataxis".to_string(), vec![SplitAction::Simple]);
    table.insert(
        "conj:and".to_string(),
        vec![SplitAction::CloneNsubj, SplitAction::Simple],
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    /// "Obama urged senators to pass the bill":
    /// urged -nsubj-> Obama, -dobj-> senators, -xcomp-> pass;
    /// pass -mark-> to, -dobj-> bill -det-> the
    fn xcomp_graph() -> DependencyGraph {
        let mut b = GraphBuilder::new();
        let obama = b.token("Obama", "Obama", "NNP");
        let urged = b.token("urged", "urge", "VBD");
        let senators = b.token("senators", "senator", "NNS");
        let to = b.token("to", "to", "TO");
        let pass = b.token("pass", "pass", "VB");
        let the = b.token("the", "the", "DT");
        let bill = b.token("bill", "bill", "NN");
        b.edge(urged, obama, "nsubj").unwrap();
        b.edge(urged, senators, "dobj").unwrap();
        b.edge(urged, pass, "xcomp").unwrap();
        b.edge(pass, to, "mark").unwrap();
        b.edge(pass, bill, "dobj").unwrap();
        b.edge(bill, the, "det").unwrap();
        b.build().unwrap()
    }

    #[test]
    fn root_clause_is_emitted_first() {
        let graph = xcomp_graph();
        let splitter = ClauseSplitter::new(&graph);
        let clauses = splitter.top_clauses(1);
        assert_eq!(clauses.len(), 1);
        assert_eq!(
            clauses[0].to_sentence_string(),
            "Obama urged senators to pass the bill"
        );
        assert_eq!(clauses[0].score(), 1.0);
    }

    #[test]
    fn xcomp_hard_split_prefers_clone_dobj() {
        let graph = xcomp_graph();
        let splitter = ClauseSplitter::new(&graph);
        let clauses = splitter.top_clauses(10);
        // The xcomp split must reuse the matrix object "senators" as the
        // subject of the split-off clause.
        assert!(
            clauses
                .iter()
                .any(|c| c.to_sentence_string() == "senators to pass the bill"),
            "clauses: {:?}",
            clauses
                .iter()
                .map(|c| c.to_sentence_string())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn callback_false_stops_after_one_candidate() {
        let graph = xcomp_graph();
        let splitter = ClauseSplitter::new(&graph);
        let mut count = 0;
        splitter.search_with(|_| {
            count += 1;
            false
        });
        assert_eq!(count, 1);
    }

    #[test]
    fn zero_tick_budget_emits_nothing() {
        let graph = xcomp_graph();
        let splitter =
            ClauseSplitter::new(&graph).with_config(ClauseSplitterConfig { max_ticks: 0 });
        assert!(splitter.top_clauses(10).is_empty());
    }

    #[test]
    fn classifier_not_a_clause_prunes_branch() {
        struct NeverAClause;
        impl Classifier for NeverAClause {
            fn score(&self, _features: &FeatureVector) -> [f64; 3] {
                [0.0, 0.0, 1.0]
            }
        }
        let graph = xcomp_graph();
        let classifier = NeverAClause;
        // Empty hard-split table so the classifier sees every edge.
        let splitter = ClauseSplitter::new(&graph)
            .with_classifier(&classifier)
            .with_hard_splits(HashMap::new());
        let clauses = splitter.top_clauses(10);
        // nsubj/dobj edges fall back to free intermediate states rather than
        // being pruned; the xcomp branch is pruned outright.
        assert!(clauses
            .iter()
            .all(|c| c.to_sentence_string() != "to pass the bill"));
        assert!(!clauses.is_empty());
    }

    #[test]
    fn label_decoding_rejects_out_of_range() {
        assert!(ClauseClassifierLabel::from_index(0).is_ok());
        assert!(ClauseClassifierLabel::from_index(3).is_err());
    }

    #[test]
    fn label_display_is_flat() {
        assert_eq!(ClauseClassifierLabel::ClauseSplit.to_string(), "clause_split");
        assert_eq!(ClauseClassifierLabel::NotAClause.to_string(), "not_a_clause");
    }

    #[test]
    fn best_label_floors_subject_edges() {
        // NotAClause dominates, but the edge is nsubj.
        let picked = best_label([0.1, 0.2, 0.7], "nsubj").unwrap();
        assert_eq!(picked.0, ClauseClassifierLabel::ClauseInterm);
        // On an ordinary edge NotAClause wins and the caller drops it.
        let picked = best_label([0.1, 0.2, 0.7], "amod").unwrap();
        assert_eq!(picked.0, ClauseClassifierLabel::NotAClause);
    }

    #[test]
    fn best_label_rejects_degenerate_scores() {
        assert!(best_label([0.0, 0.0, 0.0], "amod").is_none());
        assert!(best_label([f64::NAN, 0.0, 0.0], "amod").is_none());
    }

    #[test]
    fn best_label_subject_fallback_when_all_mass_on_not_a_clause() {
        let picked = best_label([0.0, 0.0, 1.0], "nsubj").unwrap();
        assert_eq!(picked.0, ClauseClassifierLabel::ClauseInterm);
        assert_eq!(picked.1, 0.0);
    }
}
