//! Forward-entailment search
//!
//! A budgeted depth-first search over subtree deletions. Vertices are
//! visited in topological order; at each vertex the search branches into a
//! skip continuation (keep the subtree) and, when natural logic licenses
//! it, a delete continuation (prune the subtree and emit the shortened
//! sentence). Every emitted fragment is forward-entailed by the input under
//! the assumed truth value, with a confidence score from the deletion
//! probability model.

use crate::fragment::SentenceFragment;
use crate::graph::{DependencyEdge, DependencyGraph};
use crate::weights::NaturalLogicWeights;
use natlog_core::NaturalLogicRelation;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

/// Upper bound on cursor advances over already-deleted vertices in a single
/// step. Tripping it means the topological order and the working graph have
/// diverged beyond repair; the search returns what it has.
const MAX_FRINGE_ADVANCE: usize = 10_000;

/// Cost of stripping a plain determiner during preprocessing.
const DETERMINER_DELETION_PROBABILITY: f64 = 0.9;

/// One entailed shortening of the input sentence.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The shortened sentence.
    pub fragment: SentenceFragment,
    /// Relation labels of the deleted edges, in deletion order.
    pub deleted_edges: Vec<String>,
    /// Product of the deletion probabilities along the path, in (0, 1].
    pub score: f64,
}

/// Budget knobs for the entailment search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardEntailerConfig {
    /// Maximum number of search states popped before truncating.
    pub max_ticks: usize,
    /// Maximum number of results returned.
    pub max_results: usize,
}

impl Default for ForwardEntailerConfig {
    fn default() -> ForwardEntailerConfig {
        ForwardEntailerConfig {
            max_ticks: 10_000,
            max_results: 100,
        }
    }
}

/// The deletion search over one clause, parameterized by a probability
/// model. Cheap to construct; holds no per-sentence state.
pub struct ForwardEntailer<'w> {
    weights: &'w NaturalLogicWeights,
    config: ForwardEntailerConfig,
}

/// An in-flight search state. The graph is an eager snapshot: deletions
/// already applied, nothing shared with sibling states.
struct SearchState {
    graph: DependencyGraph,
    cursor: usize,
    score: f64,
    deleted: SmallVec<[String; 4]>,
}

impl<'w> ForwardEntailer<'w> {
    /// An entailer with default budgets.
    pub fn new(weights: &'w NaturalLogicWeights) -> ForwardEntailer<'w> {
        ForwardEntailer {
            weights,
            config: ForwardEntailerConfig::default(),
        }
    }

    /// Replace the budget configuration.
    pub fn with_config(mut self, config: ForwardEntailerConfig) -> ForwardEntailer<'w> {
        self.config = config;
        self
    }

    /// Enumerate shortenings of `graph` entailed under `assumed_truth`.
    ///
    /// The input itself (after determiner stripping) is always the first
    /// result. Results come back in discovery order; see
    /// [`ForwardEntailer::search_ranked`] for score order.
    pub fn search(&self, graph: &DependencyGraph, assumed_truth: bool) -> Vec<SearchResult> {
        if self.config.max_ticks == 0 || self.config.max_results == 0 {
            return Vec::new();
        }
        let mut working = graph.clone();
        if let Err(err) = working.validate() {
            warn!(error = %err, "entailment search given a malformed graph");
            return Vec::new();
        }

        let mut base_score = 1.0;
        let mut base_deleted: SmallVec<[String; 4]> = SmallVec::new();
        strip_determiners(&mut working, &mut base_score, &mut base_deleted);
        let conjuncts = cut_and_conjuncts(&mut working);

        let mut results = Vec::new();
        push_result(
            &mut results,
            working.clone(),
            base_score,
            &base_deleted,
            assumed_truth,
        );

        let topo = working.topological_order();
        let mut stack = vec![SearchState {
            graph: working,
            cursor: 0,
            score: base_score,
            deleted: base_deleted,
        }];

        let mut ticks = 0usize;
        'search: while let Some(state) = stack.pop() {
            if results.len() >= self.config.max_results {
                break;
            }
            ticks += 1;
            if ticks > self.config.max_ticks {
                debug!(ticks, "entailment search budget exhausted, truncating");
                break;
            }

            // Vertices deleted on this path are skipped in place.
            let mut cursor = state.cursor;
            let mut advanced = 0usize;
            while cursor < topo.len() && !state.graph.contains(topo[cursor]) {
                cursor += 1;
                advanced += 1;
                if advanced > MAX_FRINGE_ADVANCE {
                    warn!("entailment search cursor diverged from the graph, aborting");
                    break 'search;
                }
            }
            if cursor >= topo.len() {
                continue;
            }
            let vertex = topo[cursor];

            // Skip continuation: keep this subtree, move on.
            stack.push(SearchState {
                graph: state.graph.clone(),
                cursor: cursor + 1,
                score: state.score,
                deleted: state.deleted.clone(),
            });

            // Delete continuation, when the algebra licenses it and the
            // probability model gives it mass.
            let Some(in_edge) = state.graph.incoming_edge(vertex).cloned() else {
                continue;
            };
            if !deletion_licensed(&state.graph, vertex, assumed_truth) {
                continue;
            }
            let probability = self.weights.edge_deletion_probability(&state.graph, &in_edge);
            let score = state.score * probability;
            if !(score > 0.0) || !score.is_finite() {
                continue;
            }
            let mut pruned = state.graph;
            pruned.prune_subtree(vertex);
            let mut deleted = state.deleted;
            deleted.push(in_edge.relation);
            push_result(&mut results, pruned.clone(), score, &deleted, assumed_truth);
            stack.push(SearchState {
                graph: pruned,
                cursor: cursor + 1,
                score,
                deleted,
            });
        }

        reattach_conjuncts(&mut results, &conjuncts, assumed_truth);
        results
    }

    /// [`ForwardEntailer::search`], sorted by score descending.
    pub fn search_ranked(&self, graph: &DependencyGraph, assumed_truth: bool) -> Vec<SearchResult> {
        let mut results = self.search(graph, assumed_truth);
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results
    }
}

/// True iff pruning the subtree at `vertex` keeps the sentence entailed:
/// the governor is not a cardinal number, and the deletion relation of
/// every incoming edge, projected through the vertex's polarity, preserves
/// the assumed truth value.
///
/// A token marked as an operator head uses the operator catalog's delete
/// relation instead of the dependency-label table: deleting "no" negates
/// the sentence no matter how benignly it is attached.
fn deletion_licensed(graph: &DependencyGraph, vertex: usize, assumed_truth: bool) -> bool {
    let Some(token) = graph.token(vertex) else {
        return false;
    };
    let Some(in_edge) = graph.incoming_edge(vertex) else {
        return false;
    };
    if graph
        .token(in_edge.governor)
        .map_or(false, |t| t.pos == "CD")
    {
        return false;
    }
    graph.incoming_edges(vertex).iter().all(|edge| {
        let lexical = match token.operator {
            Some(operator) => operator.delete_relation(),
            None => NaturalLogicRelation::for_dependency_deletion(&edge.relation),
        };
        token
            .polarity
            .project_lexical_relation(lexical)
            .apply_to_truth_value(assumed_truth)
            .is_true()
    })
}

/// Strip plain determiners (the, a, an) up front: they carry no operator
/// semantics and would otherwise double every branch of the search.
fn strip_determiners(
    graph: &mut DependencyGraph,
    score: &mut f64,
    deleted: &mut SmallVec<[String; 4]>,
) {
    let targets: Vec<usize> = graph
        .vertex_indices()
        .flat_map(|v| graph.outgoing_edges(v))
        .filter(|e| !e.is_extra && e.relation == "det")
        .filter(|e| {
            graph.token(e.dependent).map_or(false, |t| {
                ["the", "a", "an"]
                    .iter()
                    .any(|d| t.lemma.eq_ignore_ascii_case(d))
            })
        })
        .map(|e| e.dependent)
        .collect();
    for dependent in targets {
        graph.prune_subtree(dependent);
        *score *= DETERMINER_DELETION_PROBABILITY;
        deleted.push("det".to_string());
    }
}

/// Detach every `conj:and` conjunct before the search and remember it; the
/// search then shortens each conjunct's context independently, and
/// [`reattach_conjuncts`] splices the subtree back into every result whose
/// graph kept the attachment point.
fn cut_and_conjuncts(graph: &mut DependencyGraph) -> Vec<(DependencyEdge, DependencyGraph)> {
    let edges: Vec<DependencyEdge> = graph
        .vertex_indices()
        .flat_map(|v| graph.outgoing_edges(v))
        .filter(|e| !e.is_extra && matches!(e.relation.as_str(), "conj:and" | "conj_and"))
        .cloned()
        .collect();
    let mut cut = Vec::new();
    for edge in edges {
        if !graph.contains(edge.dependent) {
            continue;
        }
        match graph.extract_subtree(edge.dependent) {
            Ok(subtree) => {
                graph.prune_subtree(edge.dependent);
                cut.push((edge, subtree));
            }
            Err(err) => {
                debug!(error = %err, "leaving unextractable conjunct in place");
            }
        }
    }
    cut
}

fn reattach_conjuncts(
    results: &mut [SearchResult],
    conjuncts: &[(DependencyEdge, DependencyGraph)],
    assumed_truth: bool,
) {
    if conjuncts.is_empty() {
        return;
    }
    for result in results {
        let mut graph = result.fragment.graph().clone();
        let mut changed = false;
        for (edge, subtree) in conjuncts {
            if !graph.contains(edge.governor) || graph.contains(edge.dependent) {
                continue;
            }
            if splice_subtree(&mut graph, subtree, edge).is_err() {
                debug!(
                    governor = edge.governor,
                    dependent = edge.dependent,
                    "could not re-attach conjunct"
                );
                continue;
            }
            changed = true;
        }
        if changed {
            let mut fragment = SentenceFragment::new(graph, assumed_truth);
            fragment.change_score(result.score);
            result.fragment = fragment;
        }
    }
}

fn splice_subtree(
    graph: &mut DependencyGraph,
    subtree: &DependencyGraph,
    edge: &DependencyEdge,
) -> crate::error::Result<()> {
    for token in subtree.tokens() {
        graph.add_token(token.clone())?;
    }
    for v in subtree.vertex_indices() {
        for inner in subtree.outgoing_edges(v) {
            graph.add_edge(inner.clone())?;
        }
    }
    graph.add_edge(edge.clone())?;
    Ok(())
}

fn push_result(
    results: &mut Vec<SearchResult>,
    graph: DependencyGraph,
    score: f64,
    deleted: &SmallVec<[String; 4]>,
    assumed_truth: bool,
) {
    let mut fragment = SentenceFragment::new(graph, assumed_truth);
    fragment.change_score(score);
    results.push(SearchResult {
        fragment,
        deleted_edges: deleted.to_vec(),
        score,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use natlog_core::Operator;

    fn sentences(results: &[SearchResult]) -> Vec<String> {
        results
            .iter()
            .map(|r| r.fragment.to_sentence_string())
            .collect()
    }

    fn all_cats_graph() -> DependencyGraph {
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

    fn dinner_graph() -> DependencyGraph {
        // "She ate dinner in the park"
        let mut b = GraphBuilder::new();
        let she = b.token("She", "she", "PRP");
        let ate = b.token("ate", "eat", "VBD");
        let dinner = b.token("dinner", "dinner", "NN");
        let inw = b.token("in", "in", "IN");
        let the = b.token("the", "the", "DT");
        let park = b.token("park", "park", "NN");
        b.edge(ate, she, "nsubj").unwrap();
        b.edge(ate, dinner, "dobj").unwrap();
        b.edge(ate, park, "nmod:in").unwrap();
        b.edge(park, inw, "case").unwrap();
        b.edge(park, the, "det").unwrap();
        b.build().unwrap()
    }

    #[test]
    fn deletes_quantifier_but_protects_arguments() {
        let weights = NaturalLogicWeights::new();
        let entailer = ForwardEntailer::new(&weights);
        let results = entailer.search(&all_cats_graph(), true);
        let strings = sentences(&results);

        assert!(strings.contains(&"All cats have tails".to_string()));
        assert!(strings.contains(&"cats have tails".to_string()));
        // Subject and object deletion are not licensed.
        assert!(!strings.iter().any(|s| s == "All have tails"));
        assert!(!strings.iter().any(|s| s == "have tails"));
        assert!(!strings.iter().any(|s| s == "All cats have"));
    }

    #[test]
    fn identity_result_comes_first() {
        let weights = NaturalLogicWeights::new();
        let entailer = ForwardEntailer::new(&weights);
        let results = entailer.search(&all_cats_graph(), true);
        assert_eq!(results[0].fragment.to_sentence_string(), "All cats have tails");
        assert_eq!(results[0].score, 1.0);
        assert!(results[0].deleted_edges.is_empty());
    }

    #[test]
    fn plain_determiners_are_stripped_up_front() {
        // "the cat sat"
        let mut b = GraphBuilder::new();
        let the = b.token("the", "the", "DT");
        let cat = b.token("cat", "cat", "NN");
        let sat = b.token("sat", "sit", "VBD");
        b.edge(sat, cat, "nsubj").unwrap();
        b.edge(cat, the, "det").unwrap();
        let g = b.build().unwrap();

        let weights = NaturalLogicWeights::new();
        let entailer = ForwardEntailer::new(&weights);
        let results = entailer.search(&g, true);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].fragment.to_sentence_string(), "cat sat");
        assert!((results[0].score - 0.9).abs() < 1e-9);
        assert_eq!(results[0].deleted_edges, vec!["det".to_string()]);
    }

    #[test]
    fn scores_multiply_along_deletion_chains() {
        let weights = NaturalLogicWeights::new();
        let entailer = ForwardEntailer::new(&weights);
        let results = entailer.search(&dinner_graph(), true);
        let strings = sentences(&results);

        // Determiner stripped in preprocessing.
        assert_eq!(strings[0], "She ate dinner in park");
        assert!((results[0].score - 0.9).abs() < 1e-9);

        let shortened = results
            .iter()
            .find(|r| r.fragment.to_sentence_string() == "She ate dinner")
            .unwrap();
        // 0.9 for the determiner, 0.9 for the prepositional modifier.
        assert!((shortened.score - 0.81).abs() < 1e-9);
        assert_eq!(
            shortened.deleted_edges,
            vec!["det".to_string(), "nmod:in".to_string()]
        );

        for result in &results {
            assert!(result.score <= results[0].score + 1e-9);
        }
    }

    #[test]
    fn false_premise_blocks_forward_deletions() {
        // Under an assumed-false premise a ForwardEntailment deletion no
        // longer preserves the known truth value.
        let weights = NaturalLogicWeights::new();
        let entailer = ForwardEntailer::new(&weights);
        let results = entailer.search(&dinner_graph(), false);
        let strings = sentences(&results);
        assert!(!strings.iter().any(|s| s == "She ate dinner"));
    }

    #[test]
    fn privative_adjectives_survive_deletion() {
        // "a fake gun fired"
        let mut b = GraphBuilder::new();
        let a = b.token("a", "a", "DT");
        let fake = b.token("fake", "fake", "JJ");
        let gun = b.token("gun", "gun", "NN");
        let fired = b.token("fired", "fire", "VBD");
        b.edge(fired, gun, "nsubj").unwrap();
        b.edge(gun, fake, "amod").unwrap();
        b.edge(gun, a, "det").unwrap();
        let g = b.build().unwrap();

        let weights = NaturalLogicWeights::new();
        let entailer = ForwardEntailer::new(&weights);
        let results = entailer.search(&g, true);
        let strings = sentences(&results);
        assert!(strings.contains(&"fake gun fired".to_string()));
        assert!(!strings.iter().any(|s| s == "gun fired"));
    }

    #[test]
    fn zero_budgets_return_nothing() {
        let weights = NaturalLogicWeights::new();
        let g = all_cats_graph();
        let no_ticks = ForwardEntailer::new(&weights).with_config(ForwardEntailerConfig {
            max_ticks: 0,
            max_results: 100,
        });
        assert!(no_ticks.search(&g, true).is_empty());
        let no_results = ForwardEntailer::new(&weights).with_config(ForwardEntailerConfig {
            max_ticks: 100,
            max_results: 0,
        });
        assert!(no_results.search(&g, true).is_empty());
    }

    #[test]
    fn max_results_caps_output() {
        let weights = NaturalLogicWeights::new();
        let entailer = ForwardEntailer::new(&weights).with_config(ForwardEntailerConfig {
            max_ticks: 10_000,
            max_results: 1,
        });
        let results = entailer.search(&dinner_graph(), true);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn conjuncts_are_cut_and_reattached() {
        // "She ate apples and pears"
        let mut b = GraphBuilder::new();
        let she = b.token("She", "she", "PRP");
        let ate = b.token("ate", "eat", "VBD");
        let apples = b.token("apples", "apple", "NNS");
        let and = b.token("and", "and", "CC");
        let pears = b.token("pears", "pear", "NNS");
        b.edge(ate, she, "nsubj").unwrap();
        b.edge(ate, apples, "dobj").unwrap();
        b.edge(apples, and, "cc").unwrap();
        b.edge(apples, pears, "conj:and").unwrap();
        let g = b.build().unwrap();

        let weights = NaturalLogicWeights::new();
        let entailer = ForwardEntailer::new(&weights);
        let results = entailer.search(&g, true);
        let strings = sentences(&results);
        // The identity result recovers the full coordination.
        assert!(strings.contains(&"She ate apples and pears".to_string()));
        // The object itself is still protected.
        assert!(!strings.iter().any(|s| s == "She ate"));
    }

    #[test]
    fn operator_heads_delete_by_catalog_relation() {
        // "No cats drink milk", with "No" marked as an operator head.
        let mut b = GraphBuilder::new();
        let no = b.token("No", "no", "DT");
        let cats = b.token("cats", "cat", "NNS");
        let drink = b.token("drink", "drink", "VBP");
        let milk = b.token("milk", "milk", "NN");
        b.edge(drink, cats, "nsubj").unwrap();
        b.edge(cats, no, "det").unwrap();
        b.edge(drink, milk, "dobj").unwrap();
        let mut g = b.build().unwrap();
        g.token_mut(no).unwrap().operator = Some(Operator::No);

        let weights = NaturalLogicWeights::new();
        let entailer = ForwardEntailer::new(&weights);
        let strings = sentences(&entailer.search(&g, true));
        // Deleting "No" negates the sentence; the det label alone would
        // have licensed it.
        assert!(strings.contains(&"No cats drink milk".to_string()));
        assert!(!strings.iter().any(|s| s == "cats drink milk"));

        // A universal head stays deletable: its delete relation is a
        // forward entailment.
        let mut g2 = all_cats_graph();
        g2.token_mut(1).unwrap().operator = Some(Operator::All);
        let strings = sentences(&entailer.search(&g2, true));
        assert!(strings.contains(&"cats have tails".to_string()));
    }

    #[test]
    fn search_ranked_orders_by_score() {
        let weights = NaturalLogicWeights::new();
        let entailer = ForwardEntailer::new(&weights);
        let results = entailer.search_ranked(&dinner_graph(), true);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn malformed_graph_yields_no_results() {
        let mut g = DependencyGraph::new();
        g.add_token(crate::graph::Token::new(1, "a", "a", "DT")).unwrap();
        g.add_token(crate::graph::Token::new(2, "b", "b", "NN")).unwrap();
        g.add_edge(DependencyEdge::new(1, 2, "dep")).unwrap();
        g.add_edge(DependencyEdge::new(2, 1, "dep")).unwrap();
        let weights = NaturalLogicWeights::new();
        let entailer = ForwardEntailer::new(&weights);
        assert!(entailer.search(&g, true).is_empty());
    }
}
