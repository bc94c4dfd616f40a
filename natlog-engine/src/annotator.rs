//! Operator scope annotation
//!
//! Finds operator occurrences in a dependency graph, computes their
//! quantifier/subject/object spans, resolves overlapping matches, and writes
//! the resulting [`Polarity`] into every token. This runs upstream of both
//! searches; tokens outside every operator scope keep the identity polarity.

use crate::graph::DependencyGraph;
use natlog_core::{MonotonicitySignature, Operator, OperatorSpec, Polarity};
use tracing::debug;

/// Relations that attach a quantifier word to the noun it restricts.
const QUANTIFIER_ATTACHMENTS: [&str; 5] = ["det", "amod", "nummod", "det:predet", "advmod"];

/// Relations that mark clausal negation on a verb.
const NEGATION_ATTACHMENTS: [&str; 2] = ["neg", "advmod"];

/// Pattern-matches operators and assigns per-token polarity.
#[derive(Debug, Clone, Default)]
pub struct NaturalLogicAnnotator {
    _private: (),
}

impl NaturalLogicAnnotator {
    /// A new annotator with the built-in operator catalog.
    pub fn new() -> NaturalLogicAnnotator {
        NaturalLogicAnnotator::default()
    }

    /// Annotate a graph in place: detect operators, resolve spans, set every
    /// token's polarity, and mark each operator's head token. Returns the
    /// resolved operator occurrences.
    pub fn annotate(&self, graph: &mut DependencyGraph) -> Vec<OperatorSpec> {
        let specs = self.detect_operators(graph);
        let specs = resolve_overlaps(specs);
        set_polarities(graph, &specs);
        mark_operator_heads(graph, &specs);
        specs
    }

    /// Find operator occurrences and compute their scopes, without touching
    /// token polarity.
    pub fn detect_operators(&self, graph: &DependencyGraph) -> Vec<OperatorSpec> {
        let sentence_length = graph.vertex_indices().max().unwrap_or(0);
        let mut specs = Vec::new();

        let indices: Vec<usize> = graph.vertex_indices().collect();
        for &idx in &indices {
            let Some((operator, span_end)) = match_operator_at(graph, idx) else {
                continue;
            };
            let spec = if operator.is_unary() {
                unary_scope(graph, operator, idx, span_end, sentence_length)
            } else {
                binary_scope(graph, operator, idx, span_end, sentence_length)
            };
            if let Some(spec) = spec {
                debug!(
                    operator = ?spec.operator,
                    quantifier = ?(spec.quantifier_begin, spec.quantifier_end),
                    subject = ?(spec.subject_begin, spec.subject_end),
                    object = ?(spec.object_begin, spec.object_end),
                    "matched operator"
                );
                specs.push(spec);
            }
        }
        specs
    }
}

/// Longest operator surface form whose lemmas start at `idx`. Returns the
/// operator and the exclusive end of its surface span.
fn match_operator_at(graph: &DependencyGraph, idx: usize) -> Option<(Operator, usize)> {
    let mut best: Option<(Operator, usize)> = None;
    for &op in &Operator::VALUES {
        let words: Vec<&str> = op.surface_form().split_whitespace().collect();
        let matches = words.iter().enumerate().all(|(offset, &form)| {
            graph
                .token(idx + offset)
                .is_some_and(|t| t.lemma.eq_ignore_ascii_case(form))
        });
        if matches {
            let end = idx + words.len();
            if best.map_or(true, |(_, prev_end)| end > prev_end) {
                best = Some((op, end));
            }
        }
    }
    best
}

/// Scope for a binary quantifier headed at `idx`.
///
/// The quantifier restricts the noun it attaches to: the subject span is the
/// remainder of that noun's yield, the object span the remainder of the
/// governing verb's yield. A quantifier with no governing verb degrades to a
/// subject-only (effectively unary) occurrence over the noun phrase.
fn binary_scope(
    graph: &DependencyGraph,
    operator: Operator,
    idx: usize,
    span_end: usize,
    sentence_length: usize,
) -> Option<OperatorSpec> {
    let attachment = graph
        .incoming_edge(idx)
        .filter(|e| QUANTIFIER_ATTACHMENTS.contains(&e.relation.as_str()))?;
    let noun = attachment.governor;
    let (noun_begin, noun_end) = graph.yield_span(noun);
    let subject_begin = span_end.max(noun_begin);
    let subject_end = noun_end.max(subject_begin);

    // Climb to the clause the noun is an argument of.
    let verb_edge = graph
        .incoming_edge(noun)
        .filter(|e| e.relation.contains("subj") || e.relation == "dobj" || e.relation == "obj");
    let (object_begin, object_end) = match verb_edge {
        Some(edge) => {
            let (_, verb_end) = graph.yield_span(edge.governor);
            (subject_end, verb_end.max(subject_end))
        }
        None => (subject_end, subject_end),
    };

    Some(OperatorSpec::new(
        operator,
        idx,
        span_end,
        subject_begin,
        subject_end,
        object_begin,
        object_end,
        sentence_length,
    ))
}

/// Scope for a unary operator (negation and kin) headed at `idx`: the rest
/// of the governing predicate's yield.
fn unary_scope(
    graph: &DependencyGraph,
    operator: Operator,
    idx: usize,
    span_end: usize,
    sentence_length: usize,
) -> Option<OperatorSpec> {
    let attachment = graph
        .incoming_edge(idx)
        .filter(|e| NEGATION_ATTACHMENTS.contains(&e.relation.as_str()))?;
    let governor = attachment.governor;
    let (_, gov_end) = graph.yield_span(governor);
    Some(OperatorSpec::unary(
        operator,
        idx,
        span_end,
        span_end,
        gov_end.max(span_end),
        sentence_length,
    ))
}

/// Merge specs that matched the same occurrence and drop matches whose
/// quantifier span is strictly contained in a longer match (e.g. `a few`
/// inside `at least a few`).
pub fn resolve_overlaps(mut specs: Vec<OperatorSpec>) -> Vec<OperatorSpec> {
    // Merge identical quantifier spans.
    let mut merged: Vec<OperatorSpec> = Vec::with_capacity(specs.len());
    specs.sort_by_key(|s| (s.quantifier_begin, s.quantifier_end));
    for spec in specs {
        if let Some(last) = merged.last_mut() {
            if let Some(joined) = last.merge(&spec) {
                *last = joined;
                continue;
            }
        }
        merged.push(spec);
    }
    // Drop strictly contained quantifier spans.
    let keep: Vec<bool> = merged
        .iter()
        .map(|s| {
            !merged.iter().any(|other| {
                (other.quantifier_begin <= s.quantifier_begin
                    && other.quantifier_end >= s.quantifier_end)
                    && (other.quantifier_end - other.quantifier_begin)
                        > (s.quantifier_end - s.quantifier_begin)
            })
        })
        .collect();
    merged
        .into_iter()
        .zip(keep)
        .filter_map(|(s, k)| k.then_some(s))
        .collect()
}

/// Write per-token polarity from resolved operator scopes. Enclosing scopes
/// are ordered widest first, so the narrowest operator is applied to the
/// lexical relation first.
pub fn set_polarities(graph: &mut DependencyGraph, specs: &[OperatorSpec]) {
    let indices: Vec<usize> = graph.vertex_indices().collect();
    for idx in indices {
        let mut enclosing: Vec<(usize, MonotonicitySignature)> = specs
            .iter()
            .filter_map(|spec| {
                if spec.subject_contains(idx) {
                    Some((spec.scope_size(), spec.operator.subject_monotonicity()))
                } else if spec.object_contains(idx) {
                    spec.operator
                        .object_monotonicity()
                        .map(|sig| (spec.scope_size(), sig))
                } else {
                    None
                }
            })
            .collect();
        enclosing.sort_by(|a, b| b.0.cmp(&a.0));
        let signatures: Vec<MonotonicitySignature> =
            enclosing.into_iter().map(|(_, sig)| sig).collect();
        let polarity = Polarity::from_signatures(&signatures);
        if let Some(token) = graph.token_mut(idx) {
            token.polarity = polarity;
        }
    }
}

/// Record on each operator's head token which catalog entry it introduces.
/// The entailment search consults this to score deleting the operator by its
/// delete relation instead of its attachment label.
pub fn mark_operator_heads(graph: &mut DependencyGraph, specs: &[OperatorSpec]) {
    for spec in specs {
        if let Some(token) = graph.token_mut(spec.quantifier_begin) {
            token.operator = Some(spec.operator);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use natlog_core::NaturalLogicRelation::{ForwardEntailment, ReverseEntailment};

    fn all_cats_eat_mice() -> DependencyGraph {
        // "All cats eat mice"
        let mut b = GraphBuilder::new();
        let all = b.token("All", "all", "DT");
        let cats = b.token("cats", "cat", "NNS");
        let eat = b.token("eat", "eat", "VBP");
        let mice = b.token("mice", "mouse", "NNS");
        b.edge(eat, cats, "nsubj").unwrap();
        b.edge(cats, all, "det").unwrap();
        b.edge(eat, mice, "dobj").unwrap();
        b.build().unwrap()
    }

    #[test]
    fn detects_universal_quantifier_spans() {
        let graph = all_cats_eat_mice();
        let specs = NaturalLogicAnnotator::new().detect_operators(&graph);
        assert_eq!(specs.len(), 1);
        let spec = &specs[0];
        assert_eq!(spec.operator, Operator::All);
        assert_eq!((spec.quantifier_begin, spec.quantifier_end), (1, 2));
        assert_eq!((spec.subject_begin, spec.subject_end), (2, 3));
        assert_eq!((spec.object_begin, spec.object_end), (3, 5));
        assert!(spec.is_binary());
    }

    #[test]
    fn universal_sets_downward_subject_upward_object() {
        let mut graph = all_cats_eat_mice();
        NaturalLogicAnnotator::new().annotate(&mut graph);
        // "cats" is in the restrictor: downward.
        assert!(graph.token(2).unwrap().polarity.is_downwards());
        assert_eq!(
            graph
                .token(2)
                .unwrap()
                .polarity
                .project_lexical_relation(ForwardEntailment),
            ReverseEntailment
        );
        // "eat" and "mice" are in the body: upward.
        assert!(graph.token(3).unwrap().polarity.is_upwards());
        assert!(graph.token(4).unwrap().polarity.is_upwards());
        // The quantifier itself is in neither scope.
        assert!(graph.token(1).unwrap().polarity.is_upwards());
    }

    #[test]
    fn annotation_marks_operator_head_tokens() {
        let mut graph = all_cats_eat_mice();
        NaturalLogicAnnotator::new().annotate(&mut graph);
        assert_eq!(graph.token(1).unwrap().operator, Some(Operator::All));
        assert!(graph.token(2).unwrap().operator.is_none());
        assert!(graph.token(3).unwrap().operator.is_none());
    }

    #[test]
    fn negation_scopes_over_rest_of_predicate() {
        // "Cats do not like water"
        let mut b = GraphBuilder::new();
        let cats = b.token("Cats", "cat", "NNS");
        let do_ = b.token("do", "do", "VBP");
        let not = b.token("not", "not", "RB");
        let like = b.token("like", "like", "VB");
        let water = b.token("water", "water", "NN");
        b.edge(like, cats, "nsubj").unwrap();
        b.edge(like, do_, "aux").unwrap();
        b.edge(like, not, "neg").unwrap();
        b.edge(like, water, "dobj").unwrap();
        let mut graph = b.build().unwrap();

        let specs = NaturalLogicAnnotator::new().annotate(&mut graph);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].operator, Operator::Not);
        assert!(!specs[0].is_binary());
        // Everything after "not" is downward.
        assert!(graph.token(4).unwrap().polarity.is_downwards());
        assert!(graph.token(5).unwrap().polarity.is_downwards());
        // The subject is untouched.
        assert!(graph.token(1).unwrap().polarity.is_upwards());
    }

    #[test]
    fn longest_surface_match_wins() {
        // "at least a few cats purr": "at least a few" shadows "a few".
        let mut b = GraphBuilder::new();
        let at = b.token("At", "at", "IN");
        let least = b.token("least", "least", "JJS");
        let a = b.token("a", "a", "DT");
        let few = b.token("few", "few", "JJ");
        let cats = b.token("cats", "cat", "NNS");
        let purr = b.token("purr", "purr", "VBP");
        b.edge(purr, cats, "nsubj").unwrap();
        b.edge(cats, at, "advmod").unwrap();
        b.edge(at, least, "advmod").unwrap();
        b.edge(at, a, "dep").unwrap();
        b.edge(at, few, "dep").unwrap();
        let graph = b.build().unwrap();

        let specs =
            resolve_overlaps(NaturalLogicAnnotator::new().detect_operators(&graph));
        assert!(specs
            .iter()
            .any(|s| s.operator == Operator::AtLeastAFew));
        assert!(!specs.iter().any(|s| s.operator == Operator::AFew));
    }

    #[test]
    fn unscoped_sentence_keeps_identity_polarity() {
        // "Cats purr" has no operators at all.
        let mut b = GraphBuilder::new();
        let cats = b.token("Cats", "cat", "NNS");
        let purr = b.token("purr", "purr", "VBP");
        b.edge(purr, cats, "nsubj").unwrap();
        let mut graph = b.build().unwrap();
        let specs = NaturalLogicAnnotator::new().annotate(&mut graph);
        assert!(specs.is_empty());
        assert_eq!(graph.token(1).unwrap().polarity, Polarity::default());
        assert_eq!(graph.token(2).unwrap().polarity, Polarity::default());
    }
}
