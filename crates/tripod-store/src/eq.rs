//! Graph equality modulo blank-node relabeling.
//!
//! Ground (blank-free) triples must match exactly in both directions.
//! Blank nodes are then compared by a canonical signature built from the
//! labels reachable in one hop: for each blank node, the sorted set of
//! `(direction, predicate, neighbor)` strings, with blank neighbors
//! abstracted to a placeholder since their labels carry no identity across
//! graphs. Two graphs compare equal when the sorted multisets of
//! signatures agree.
//!
//! This is a heuristic. Blank neighborhoods that only differ beyond one
//! hop produce identical signatures, so structurally different graphs can
//! compare equal in pathological cases.

use std::collections::{HashMap, HashSet};

use oxrdf::{Subject, Term, Triple};

pub(crate) fn isomorphic(a: &[Triple], b: &[Triple]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    if node_count(a) != node_count(b) {
        return false;
    }

    let ground_a: HashSet<&Triple> = a.iter().filter(|t| is_ground(t)).collect();
    let ground_b: HashSet<&Triple> = b.iter().filter(|t| is_ground(t)).collect();
    if ground_a != ground_b {
        return false;
    }

    let mut sigs_a = signatures(a);
    let mut sigs_b = signatures(b);
    sigs_a.sort_unstable();
    sigs_b.sort_unstable();
    sigs_a == sigs_b
}

fn is_ground(t: &Triple) -> bool {
    !matches!(t.subject, Subject::BlankNode(_)) && !matches!(t.object, Term::BlankNode(_))
}

fn node_count(triples: &[Triple]) -> usize {
    let mut nodes: HashSet<Term> = HashSet::new();
    for t in triples {
        nodes.insert(Term::from(t.subject.clone()));
        nodes.insert(Term::from(t.predicate.clone()));
        nodes.insert(t.object.clone());
    }
    nodes.len()
}

/// One-hop signature per blank node, as a multiset.
fn signatures(triples: &[Triple]) -> Vec<String> {
    let mut hops: HashMap<String, Vec<String>> = HashMap::new();

    for t in triples {
        if let Subject::BlankNode(b) = &t.subject {
            hops.entry(b.as_str().to_owned())
                .or_default()
                .push(format!("+{} {}", t.predicate, neighbor_label(&t.object)));
        }
        if let Term::BlankNode(b) = &t.object {
            let subject_term = Term::from(t.subject.clone());
            hops.entry(b.as_str().to_owned())
                .or_default()
                .push(format!("-{} {}", t.predicate, neighbor_label(&subject_term)));
        }
    }

    hops.into_values()
        .map(|mut labels| {
            labels.sort_unstable();
            labels.dedup();
            labels.join("\n")
        })
        .collect()
}

fn neighbor_label(term: &Term) -> String {
    match term {
        Term::BlankNode(_) => "[]".to_owned(),
        other => other.to_string(),
    }
}
