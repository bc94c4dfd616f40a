//! Deletion-probability model
//!
//! A pure lookup/backoff estimator for the probability that deleting a given
//! dependency edge leaves an acceptable sentence. Affinity tables are loaded
//! from tab-separated files; every lookup backs off through increasingly
//! unspecific tables down to a relation-class default. The backoff order is
//! a contract (reordering changes scores), pinned by the tests below.

use crate::error::{EngineError, Result};
use crate::graph::{DependencyEdge, DependencyGraph};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Default deletion probability for prepositional modifiers.
const PP_DEFAULT: f64 = 0.9;

/// Adjectives that change what their noun denotes; deleting them never
/// preserves entailment ("a fake gun" is not a gun).
const PRIVATIVE_ADJECTIVES: [&str; 60] = [
    "alleged",
    "believed",
    "debatable",
    "disputed",
    "doubtful",
    "dubious",
    "faked",
    "fake",
    "fanciful",
    "fictional",
    "fictitious",
    "former",
    "hypothetical",
    "imaginary",
    "imagined",
    "impossible",
    "improbable",
    "mooted",
    "mythical",
    "ostensible",
    "postulated",
    "potential",
    "predicted",
    "presumed",
    "probable",
    "proposed",
    "prospective",
    "purported",
    "putative",
    "questionable",
    "quondam",
    "seeming",
    "simulated",
    "so-called",
    "supposed",
    "suspected",
    "theoretical",
    "uncertain",
    "unlikely",
    "unsuccessful",
    "would-be",
    "apparent",
    "arguable",
    "assumed",
    "anticipated",
    "conjectured",
    "counterfeit",
    "deputy",
    "erstwhile",
    "ex",
    "expected",
    "future",
    "historic",
    "likely",
    "mock",
    "onetime",
    "past",
    "phony",
    "pseudo",
    "sham",
];

/// Table-backed deletion-probability estimator with backoff.
///
/// Constructing with [`NaturalLogicWeights::default`] yields empty affinity
/// tables: every lookup then resolves to the relation-class default, which is
/// the documented degraded mode when no data files are available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaturalLogicWeights {
    /// (verb, preposition) → probability.
    verb_pp: HashMap<(String, String), f64>,
    /// (verb, subject, preposition) → probability.
    verb_subj_pp: HashMap<(String, String, String), f64>,
    /// (verb, subject, object, preposition) → probability.
    verb_subj_obj_pp: HashMap<(String, String, String, String), f64>,
    /// (verb, object) → probability, for object-deletion refinement.
    verb_obj: HashMap<(String, String), f64>,
    /// (verb, subject) → probability, for subject-deletion refinement.
    verb_subj: HashMap<(String, String), f64>,
    #[serde(skip, default = "privative_set")]
    privatives: HashSet<&'static str>,
}

fn privative_set() -> HashSet<&'static str> {
    PRIVATIVE_ADJECTIVES.iter().copied().collect()
}

impl Default for NaturalLogicWeights {
    fn default() -> NaturalLogicWeights {
        NaturalLogicWeights::new()
    }
}

impl NaturalLogicWeights {
    /// Empty tables; relation-class defaults only.
    pub fn new() -> NaturalLogicWeights {
        NaturalLogicWeights {
            verb_pp: HashMap::new(),
            verb_subj_pp: HashMap::new(),
            verb_subj_obj_pp: HashMap::new(),
            verb_obj: HashMap::new(),
            verb_subj: HashMap::new(),
            privatives: privative_set(),
        }
    }

    /// Load affinity tables from a directory. Each file is optional and
    /// tab-separated with a trailing probability column:
    ///
    /// - `pp.tab`: `verb \t prep \t prob`
    /// - `subj_pp.tab`: `verb \t subj \t prep \t prob`
    /// - `subj_obj_pp.tab`: `verb \t subj \t obj \t prep \t prob`
    /// - `obj.tab`: `verb \t obj \t prob`
    /// - `subj.tab`: `verb \t subj \t prob`
    ///
    /// Missing files degrade to defaults; malformed lines are an error.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<NaturalLogicWeights> {
        let dir = dir.as_ref();
        let mut weights = NaturalLogicWeights::new();
        for row in read_table(&dir.join("pp.tab"), 3)? {
            weights
                .verb_pp
                .insert((row.fields[0].clone(), row.fields[1].clone()), row.prob);
        }
        for row in read_table(&dir.join("subj_pp.tab"), 4)? {
            weights.verb_subj_pp.insert(
                (
                    row.fields[0].clone(),
                    row.fields[1].clone(),
                    row.fields[2].clone(),
                ),
                row.prob,
            );
        }
        for row in read_table(&dir.join("subj_obj_pp.tab"), 5)? {
            weights.verb_subj_obj_pp.insert(
                (
                    row.fields[0].clone(),
                    row.fields[1].clone(),
                    row.fields[2].clone(),
                    row.fields[3].clone(),
                ),
                row.prob,
            );
        }
        for row in read_table(&dir.join("obj.tab"), 3)? {
            weights
                .verb_obj
                .insert((row.fields[0].clone(), row.fields[1].clone()), row.prob);
        }
        for row in read_table(&dir.join("subj.tab"), 3)? {
            weights
                .verb_subj
                .insert((row.fields[0].clone(), row.fields[1].clone()), row.prob);
        }
        Ok(weights)
    }

    /// Relation-class default: prepositional modifiers 0.9, object-bearing
    /// relations 0.0, everything else 1.0.
    pub fn deletion_probability(&self, relation: &str) -> f64 {
        if is_prepositional(relation) {
            PP_DEFAULT
        } else if is_object_bearing(relation) {
            0.0
        } else {
            1.0
        }
    }

    /// Deletion probability for a prepositional edge, refined by the
    /// governor's subject and object siblings.
    ///
    /// Backoff order (a contract, see module docs):
    /// (verb, subj, obj, prep) → (verb, subj, prep) → (verb, prep) → default.
    pub fn pp_deletion_probability(&self, graph: &DependencyGraph, edge: &DependencyEdge) -> f64 {
        let Some(prep) = preposition_of(graph, edge) else {
            return self.deletion_probability(&edge.relation);
        };
        let Some(verb) = governor_lemma(graph, edge) else {
            return self.deletion_probability(&edge.relation);
        };
        let subj = sibling_lemma(graph, edge, |rel| rel.contains("subj"));
        let obj = sibling_lemma(graph, edge, |rel| {
            rel == "dobj" || rel == "obj" || rel == "iobj"
        });

        if let (Some(subj), Some(obj)) = (&subj, &obj) {
            let key = (verb.clone(), subj.clone(), obj.clone(), prep.clone());
            if let Some(&p) = self.verb_subj_obj_pp.get(&key) {
                return p;
            }
        }
        if let Some(subj) = &subj {
            let key = (verb.clone(), subj.clone(), prep.clone());
            if let Some(&p) = self.verb_subj_pp.get(&key) {
                return p;
            }
        }
        if let Some(&p) = self.verb_pp.get(&(verb, prep)) {
            return p;
        }
        self.deletion_probability(&edge.relation)
    }

    /// Deletion probability for a subject edge: (verb, subj) affinity, else
    /// the relation-class default.
    pub fn subj_deletion_probability(&self, graph: &DependencyGraph, edge: &DependencyEdge) -> f64 {
        if let (Some(verb), Some(subj)) = (governor_lemma(graph, edge), dependent_lemma(graph, edge))
        {
            if let Some(&p) = self.verb_subj.get(&(verb, subj)) {
                return p;
            }
        }
        self.deletion_probability(&edge.relation)
    }

    /// Deletion probability for an object edge: (verb, obj) affinity, else
    /// the relation-class default (0.0).
    pub fn obj_deletion_probability(&self, graph: &DependencyGraph, edge: &DependencyEdge) -> f64 {
        if let (Some(verb), Some(obj)) = (governor_lemma(graph, edge), dependent_lemma(graph, edge))
        {
            if let Some(&p) = self.verb_obj.get(&(verb, obj)) {
                return p;
            }
        }
        self.deletion_probability(&edge.relation)
    }

    /// Top-level dispatcher used by the entailment search: privative
    /// adjectives are vetoed outright, then the edge is routed to the
    /// subject/object/pp-specific estimator by relation class.
    pub fn edge_deletion_probability(&self, graph: &DependencyGraph, edge: &DependencyEdge) -> f64 {
        if edge.relation == "amod" {
            if let Some(lemma) = dependent_lemma(graph, edge) {
                if self.privatives.contains(lemma.as_str()) {
                    return 0.0;
                }
            }
        }
        if edge.relation.contains("subj") {
            self.subj_deletion_probability(graph, edge)
        } else if is_object_bearing(&edge.relation) {
            self.obj_deletion_probability(graph, edge)
        } else if is_prepositional(&edge.relation) {
            self.pp_deletion_probability(graph, edge)
        } else {
            self.deletion_probability(&edge.relation)
        }
    }
}

fn is_prepositional(relation: &str) -> bool {
    relation.starts_with("nmod")
        || relation.starts_with("prep")
        || relation.starts_with("obl")
        || relation == "pobj"
}

fn is_object_bearing(relation: &str) -> bool {
    matches!(relation, "dobj" | "obj" | "iobj")
}

/// The preposition named by a collapsed edge label (`nmod:in` → `in`).
fn preposition_of(_graph: &DependencyGraph, edge: &DependencyEdge) -> Option<String> {
    let label = &edge.relation;
    label
        .split_once(':')
        .map(|(_, prep)| prep.to_string())
        .or_else(|| {
            label
                .strip_prefix("prep_")
                .map(|prep| prep.to_string())
        })
}

fn governor_lemma(graph: &DependencyGraph, edge: &DependencyEdge) -> Option<String> {
    graph.token(edge.governor).map(|t| t.lemma.clone())
}

fn dependent_lemma(graph: &DependencyGraph, edge: &DependencyEdge) -> Option<String> {
    graph.token(edge.dependent).map(|t| t.lemma.clone())
}

/// Lemma of the first sibling (same governor, different dependent) whose
/// relation satisfies the predicate.
fn sibling_lemma(
    graph: &DependencyGraph,
    edge: &DependencyEdge,
    pred: impl Fn(&str) -> bool,
) -> Option<String> {
    graph
        .outgoing_edges(edge.governor)
        .iter()
        .filter(|e| e.dependent != edge.dependent && !e.is_extra)
        .find(|e| pred(&e.relation))
        .and_then(|e| dependent_lemma(graph, e))
}

struct TableRow {
    fields: Vec<String>,
    prob: f64,
}

/// Read a tab-separated table with `columns` fields per line, the last being
/// a probability. A missing file yields an empty table.
fn read_table(path: &Path, columns: usize) -> Result<Vec<TableRow>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "weights table absent, using defaults");
            return Ok(Vec::new());
        }
        Err(err) => return Err(err.into()),
    };
    let path_str = path.display().to_string();
    let mut rows = Vec::new();
    for (line_idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != columns {
            return Err(EngineError::WeightsFormat {
                path: path_str,
                line: line_idx + 1,
                reason: format!("expected {columns} columns, found {}", fields.len()),
            });
        }
        let prob: f64 = fields[columns - 1].parse().map_err(|_| EngineError::WeightsFormat {
            path: path_str.clone(),
            line: line_idx + 1,
            reason: format!("bad probability {:?}", fields[columns - 1]),
        })?;
        if !(0.0..=1.0).contains(&prob) {
            return Err(EngineError::WeightsFormat {
                path: path_str,
                line: line_idx + 1,
                reason: format!("probability {prob} outside [0, 1]"),
            });
        }
        rows.push(TableRow {
            fields: fields[..columns - 1].iter().map(|s| s.to_string()).collect(),
            prob,
        });
    }
    Ok(rows)
}
