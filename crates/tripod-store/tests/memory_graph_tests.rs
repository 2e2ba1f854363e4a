//! Memory engine end-to-end tests.

use oxrdf::{BlankNode, Literal, NamedNode, Term, Triple, Variable};
use tripod_store::{Graph, MemoryGraph, TriplePattern};

fn node(suffix: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.org/{suffix}"))
}

fn lit(value: &str) -> Literal {
    Literal::new_simple_literal(value)
}

fn var(name: &str) -> Variable {
    Variable::new_unchecked(name)
}

fn sample() -> MemoryGraph {
    let mut g = MemoryGraph::new();
    g.insert(&[
        Triple::new(node("a"), node("name"), lit("A")),
        Triple::new(node("a"), node("knows"), node("b")),
        Triple::new(node("b"), node("name"), lit("B")),
    ])
    .unwrap();
    g
}

// ============================================================================
// Mutation basics
// ============================================================================

#[test]
fn insert_is_idempotent() {
    let mut g = MemoryGraph::new();
    let t = Triple::new(node("a"), node("knows"), node("b"));
    assert_eq!(g.insert(std::slice::from_ref(&t)).unwrap(), 1);
    assert_eq!(g.insert(std::slice::from_ref(&t)).unwrap(), 0);
    assert_eq!(g.stats().unwrap().triples, 1);
}

#[test]
fn delete_of_absent_triple_is_a_noop() {
    let mut g = sample();
    let before = g.stats().unwrap();
    let gone = Triple::new(node("b"), node("knows"), node("a"));
    assert_eq!(g.delete(&[gone]).unwrap(), 0);
    assert_eq!(g.stats().unwrap(), before);
}

#[test]
fn triple_is_reachable_through_every_permutation() {
    let mut g = sample();

    // SPO: (a, knows) → ?o
    let objects = g
        .select(&[var("o")], &[TriplePattern::new(node("a"), node("knows"), var("o"))])
        .unwrap();
    assert_eq!(objects, vec![vec![Term::from(node("b"))]]);

    // POS: (knows, b) → ?s
    let subjects = g
        .select(&[var("s")], &[TriplePattern::new(var("s"), node("knows"), node("b"))])
        .unwrap();
    assert_eq!(subjects, vec![vec![Term::from(node("a"))]]);

    // OSP: (b, a) → ?p
    let predicates = g
        .select(&[var("p")], &[TriplePattern::new(node("a"), var("p"), node("b"))])
        .unwrap();
    assert_eq!(predicates, vec![vec![Term::from(node("knows"))]]);

    // After delete, none of the three report it.
    assert_eq!(
        g.delete(&[Triple::new(node("a"), node("knows"), node("b"))])
            .unwrap(),
        1
    );
    for pattern in [
        TriplePattern::new(node("a"), node("knows"), var("x")),
        TriplePattern::new(var("x"), node("knows"), node("b")),
        TriplePattern::new(node("a"), var("x"), node("b")),
    ] {
        assert!(g.select(&[var("x")], &[pattern]).unwrap().is_empty());
    }
}

#[test]
fn orphaned_nodes_leave_the_dictionary() {
    let mut g = MemoryGraph::new();
    g.insert(&[Triple::new(node("x"), node("p"), node("y"))])
        .unwrap();
    assert_eq!(g.stats().unwrap().nodes, 3);
    g.delete(&[Triple::new(node("x"), node("p"), node("y"))])
        .unwrap();
    let stats = g.stats().unwrap();
    assert_eq!(stats.nodes, 0);
    assert_eq!(stats.triples, 0);
}

// ============================================================================
// Blank nodes
// ============================================================================

#[test]
fn same_batch_blank_labels_map_to_one_node() {
    let mut g = MemoryGraph::new();
    let b = BlankNode::new_unchecked("shared");
    g.insert(&[
        Triple::new(b.clone(), node("name"), lit("N")),
        Triple::new(b.clone(), node("age"), lit("7")),
    ])
    .unwrap();

    let rows = g
        .select(
            &[var("s")],
            &[
                TriplePattern::new(var("s"), node("name"), lit("N")),
                TriplePattern::new(var("s"), node("age"), lit("7")),
            ],
        )
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn separate_calls_get_fresh_blank_identity() {
    let mut g = MemoryGraph::new();
    let t = Triple::new(BlankNode::new_unchecked("x"), node("name"), lit("N"));
    assert_eq!(g.insert(std::slice::from_ref(&t)).unwrap(), 1);
    // Same caller-visible label, new call: a distinct node, so a distinct
    // triple.
    assert_eq!(g.insert(std::slice::from_ref(&t)).unwrap(), 1);
    assert_eq!(g.stats().unwrap().triples, 2);
}

#[test]
fn delete_never_resolves_foreign_blank_labels() {
    let mut g = MemoryGraph::new();
    let t = Triple::new(BlankNode::new_unchecked("x"), node("name"), lit("N"));
    g.insert(std::slice::from_ref(&t)).unwrap();
    // The caller's label is not a store identity; nothing is deleted and
    // nothing is created.
    assert_eq!(g.delete(&[t]).unwrap(), 0);
    assert_eq!(g.stats().unwrap().triples, 1);
}

#[test]
fn dumped_blank_triples_can_be_deleted() {
    let mut g = MemoryGraph::new();
    g.insert(&[Triple::new(BlankNode::new_unchecked("x"), node("name"), lit("N"))])
        .unwrap();
    let dumped = g.triples().unwrap();
    assert_eq!(dumped.len(), 1);
    // The dump carries the internal identity, which does resolve.
    assert_eq!(g.delete(&dumped).unwrap(), 1);
    assert_eq!(g.stats().unwrap().triples, 0);
}

// ============================================================================
// Where / Select
// ============================================================================

#[test]
fn where_and_select_agree_on_name_pattern() {
    let g = sample();
    let pattern = TriplePattern::new(var("s"), node("name"), var("n"));

    let result = g.where_(std::slice::from_ref(&pattern)).unwrap();
    let mut triples = result.triples().unwrap();
    triples.sort_by_key(|t| t.to_string());
    assert_eq!(
        triples,
        vec![
            Triple::new(node("a"), node("name"), lit("A")),
            Triple::new(node("b"), node("name"), lit("B")),
        ]
    );

    let mut names: Vec<String> = g
        .select(&[var("n")], &[pattern])
        .unwrap()
        .into_iter()
        .map(|row| row[0].to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["\"A\"", "\"B\""]);
}

#[test]
fn shared_variables_join_across_patterns() {
    let g = sample();
    let rows = g
        .select(
            &[var("n")],
            &[
                TriplePattern::new(var("x"), node("knows"), var("y")),
                TriplePattern::new(var("y"), node("name"), var("n")),
            ],
        )
        .unwrap();
    assert_eq!(rows, vec![vec![Term::from(lit("B"))]]);
}

#[test]
fn disjoint_groups_combine_as_cartesian_product() {
    let g = sample();
    let rows = g
        .select(
            &[var("n"), var("o")],
            &[
                TriplePattern::new(var("s"), node("name"), var("n")),
                TriplePattern::new(var("x"), node("knows"), var("o")),
            ],
        )
        .unwrap();
    // Two names × one knows-edge.
    assert_eq!(rows.len(), 2);
}

#[test]
fn absent_node_prunes_its_whole_component() {
    let g = sample();
    // <nowhere> is not in the dictionary: the pattern and everything
    // sharing ?y with it yield nothing.
    let rows = g
        .select(
            &[var("x")],
            &[
                TriplePattern::new(var("x"), node("knows"), var("y")),
                TriplePattern::new(var("y"), node("name"), node("nowhere")),
            ],
        )
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn pruned_component_does_not_affect_independent_groups() {
    let g = sample();
    let rows = g
        .select(
            &[var("n")],
            &[
                TriplePattern::new(var("missing"), node("nowhere"), var("gone")),
                TriplePattern::new(var("s"), node("name"), var("n")),
            ],
        )
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn unmatched_combination_of_known_nodes_yields_nothing() {
    let g = sample();
    // Both nodes exist but the edge does not; the component is evaluated
    // and comes back empty.
    let rows = g
        .select(
            &[var("n")],
            &[
                TriplePattern::new(node("b"), node("knows"), var("y")),
                TriplePattern::new(var("y"), node("name"), var("n")),
            ],
        )
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn repeated_variable_matches_self_loops_only() {
    let mut g = sample();
    g.insert(&[Triple::new(node("loop"), node("knows"), node("loop"))])
        .unwrap();
    let x = var("x");
    let rows = g
        .select(
            std::slice::from_ref(&x),
            &[TriplePattern::new(x.clone(), node("knows"), x.clone())],
        )
        .unwrap();
    assert_eq!(rows, vec![vec![Term::from(node("loop"))]]);
}

#[test]
fn where_result_is_deduplicated_by_set_semantics() {
    let g = sample();
    // Both patterns match (a, knows, b); the result graph stores it once.
    let result = g
        .where_(&[
            TriplePattern::new(node("a"), node("knows"), var("o")),
            TriplePattern::new(var("s"), node("knows"), node("b")),
        ])
        .unwrap();
    assert_eq!(result.stats().unwrap().triples, 1);
}

#[test]
fn concrete_pattern_contributes_itself_when_present() {
    let g = sample();
    let result = g
        .where_(&[TriplePattern::new(node("a"), node("knows"), node("b"))])
        .unwrap();
    assert_eq!(
        result.triples().unwrap(),
        vec![Triple::new(node("a"), node("knows"), node("b"))]
    );

    let absent = g
        .where_(&[TriplePattern::new(node("b"), node("knows"), node("a"))])
        .unwrap();
    assert!(absent.triples().unwrap().is_empty());
}

// ============================================================================
// Update
// ============================================================================

#[test]
fn update_with_where_uses_one_snapshot() {
    let mut g = sample();
    let (deleted, inserted) = g
        .update(
            &[TriplePattern::new(var("x"), node("knows"), var("y"))],
            &[TriplePattern::new(var("x"), node("metKnows"), var("y"))],
            &[TriplePattern::new(var("x"), node("knows"), var("y"))],
        )
        .unwrap();
    assert_eq!((deleted, inserted), (1, 1));

    assert!(g
        .select(&[var("y")], &[TriplePattern::new(node("a"), node("knows"), var("y"))])
        .unwrap()
        .is_empty());
    let rows = g
        .select(
            &[var("y")],
            &[TriplePattern::new(node("a"), node("metKnows"), var("y"))],
        )
        .unwrap();
    assert_eq!(rows, vec![vec![Term::from(node("b"))]]);
}

#[test]
fn update_without_where_rejects_variables() {
    let mut g = sample();
    let err = g
        .update(
            &[TriplePattern::new(var("x"), node("knows"), var("y"))],
            &[],
            &[],
        )
        .unwrap_err();
    assert!(matches!(err, tripod_store::StoreError::NonConcretePattern));
}

#[test]
fn update_without_where_applies_concrete_patterns() {
    let mut g = sample();
    let (deleted, inserted) = g
        .update(
            &[TriplePattern::new(node("a"), node("knows"), node("b"))],
            &[TriplePattern::new(node("b"), node("knows"), node("a"))],
            &[],
        )
        .unwrap();
    assert_eq!((deleted, inserted), (1, 1));
    assert_eq!(
        g.select(&[var("s")], &[TriplePattern::new(var("s"), node("knows"), node("a"))])
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn update_keeps_nodes_referenced_by_insertions_alive() {
    let mut g = MemoryGraph::new();
    g.insert(&[Triple::new(node("x"), node("p"), node("y"))])
        .unwrap();
    // Deleting the only triple orphans x and y, but the insertion binds
    // them again in the same call.
    let (deleted, inserted) = g
        .update(
            &[TriplePattern::new(var("s"), node("p"), var("o"))],
            &[TriplePattern::new(var("o"), node("p"), var("s"))],
            &[TriplePattern::new(var("s"), node("p"), var("o"))],
        )
        .unwrap();
    assert_eq!((deleted, inserted), (1, 1));
    assert_eq!(
        g.triples().unwrap(),
        vec![Triple::new(node("y"), node("p"), node("x"))]
    );
}

// ============================================================================
// Stats / Eq
// ============================================================================

#[test]
fn stats_reports_structural_counts() {
    let g = sample();
    let stats = g.stats().unwrap();
    // a, b, knows, name, "A", "B"
    assert_eq!(stats.nodes, 6);
    assert_eq!(stats.triples, 3);
    assert_eq!(stats.predicates, 2);
}

#[test]
fn eq_tolerates_blank_node_relabeling() {
    let mut a = MemoryGraph::new();
    a.insert(&[
        Triple::new(node("k"), node("owner"), BlankNode::new_unchecked("p")),
        Triple::new(BlankNode::new_unchecked("p"), node("name"), lit("N")),
    ])
    .unwrap();

    let mut b = MemoryGraph::new();
    b.insert(&[
        Triple::new(BlankNode::new_unchecked("q"), node("name"), lit("N")),
        Triple::new(node("k"), node("owner"), BlankNode::new_unchecked("q")),
    ])
    .unwrap();

    assert!(a.eq(&b).unwrap());
    assert!(b.eq(&a).unwrap());
}

#[test]
fn eq_detects_ground_differences() {
    let mut a = MemoryGraph::new();
    a.insert(&[Triple::new(node("x"), node("p"), node("y"))])
        .unwrap();
    let mut b = MemoryGraph::new();
    b.insert(&[Triple::new(node("x"), node("p"), node("z"))])
        .unwrap();
    assert!(!a.eq(&b).unwrap());
}
