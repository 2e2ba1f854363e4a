//! Pattern compilation: triple patterns to encoded `[s, p, o, estimate]`
//! form against the dictionary.

use std::collections::HashMap;

use oxrdf::{Term, Variable};

use crate::error::StoreError;
use crate::pattern::{TermPattern, TriplePattern};
use crate::{is_variable_id, CardinalityHints, MAX_VARIABLES};

use super::IndexReader;

/// A compiled triple pattern.
///
/// Each slot is either a real dictionary ID (concrete position), a reserved
/// variable marker in `1..=MAX_VARIABLES`, or `0` for a concrete node that
/// is absent from the dictionary (the pattern can then match nothing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EncodedPattern {
    pub s: u32,
    pub p: u32,
    pub o: u32,
    /// Estimated result cardinality; drives scan order only.
    pub estimate: u64,
    /// Set when a concrete position failed to resolve (or cannot form a
    /// triple at all); the grouper drops the whole connected component.
    pub impossible: bool,
}

impl EncodedPattern {
    pub fn slots(&self) -> [u32; 3] {
        [self.s, self.p, self.o]
    }

    /// Distinct variable IDs of this pattern, in slot order.
    pub fn var_ids(&self) -> impl Iterator<Item = u32> {
        let mut out: Vec<u32> = Vec::with_capacity(3);
        for id in self.slots() {
            if is_variable_id(id) && !out.contains(&id) {
                out.push(id);
            }
        }
        out.into_iter()
    }
}

/// Per-query variable cache: repeated occurrences of one variable share one
/// pattern-local ID across all patterns of the query.
#[derive(Debug, Default)]
pub(crate) struct CompileCtx {
    vars: HashMap<Variable, u32>,
    next: u32,
}

impl CompileCtx {
    fn var_id(&mut self, var: &Variable) -> Result<u32, StoreError> {
        if let Some(&id) = self.vars.get(var) {
            return Ok(id);
        }
        if self.next >= MAX_VARIABLES {
            return Err(StoreError::TooManyVariables(MAX_VARIABLES));
        }
        self.next += 1;
        self.vars.insert(var.clone(), self.next);
        Ok(self.next)
    }

    pub fn id_of(&self, var: &Variable) -> Option<u32> {
        self.vars.get(var).copied()
    }
}

/// Which triple position a slot sits in, for structural legality checks.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Pos {
    Subject,
    Predicate,
    Object,
}

pub(crate) fn compile_pattern<R: IndexReader>(
    reader: &R,
    pattern: &TriplePattern,
    ctx: &mut CompileCtx,
    hints: CardinalityHints,
) -> Result<EncodedPattern, StoreError> {
    let mut impossible = false;
    let mut slot = |tp: &TermPattern, pos: Pos, ctx: &mut CompileCtx| -> Result<u32, StoreError> {
        match tp {
            TermPattern::Variable(v) => ctx.var_id(v),
            TermPattern::Term(t) => {
                let legal = match (pos, t) {
                    (Pos::Subject, Term::Literal(_)) => false,
                    (Pos::Predicate, Term::NamedNode(_)) => true,
                    (Pos::Predicate, _) => false,
                    _ => true,
                };
                let id = if legal { reader.lookup_id(t)? } else { None };
                Ok(match id {
                    Some(id) => id,
                    None => {
                        impossible = true;
                        0
                    }
                })
            }
        }
    };

    let s = slot(&pattern.subject, Pos::Subject, ctx)?;
    let p = slot(&pattern.predicate, Pos::Predicate, ctx)?;
    let o = slot(&pattern.object, Pos::Object, ctx)?;

    let estimate = if impossible {
        0
    } else {
        estimate(reader, s, p, o, hints)?
    };

    Ok(EncodedPattern {
        s,
        p,
        o,
        estimate,
        impossible,
    })
}

/// The fixed cardinality decision table, keyed by which slots are concrete.
///
/// All-concrete and two-concrete cases are exact (a presence check or one
/// bitmap length); one-concrete has no cheap exact count and uses the
/// pluggable hint; all-variable multiplies the subject and object key
/// counts, a deliberate over-estimate. Ordering only, never correctness.
fn estimate<R: IndexReader>(
    reader: &R,
    s: u32,
    p: u32,
    o: u32,
    hints: CardinalityHints,
) -> Result<u64, StoreError> {
    let sv = is_variable_id(s);
    let pv = is_variable_id(p);
    let ov = is_variable_id(o);
    Ok(match (sv, pv, ov) {
        (false, false, false) => match reader.spo(s, p)? {
            Some(objects) if objects.contains(o) => 1,
            _ => 0,
        },
        (false, false, true) => reader.spo(s, p)?.map_or(0, |b| b.len()),
        (true, false, false) => reader.pos(p, o)?.map_or(0, |b| b.len()),
        (false, true, false) => reader.osp(o, s)?.map_or(0, |b| b.len()),
        (true, true, true) => reader
            .subject_keys()?
            .saturating_mul(reader.object_keys()?),
        _ => hints.one_concrete,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGraph;
    use crate::Graph;
    use oxrdf::{Literal, NamedNode, Triple};

    fn node(suffix: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.org/{suffix}"))
    }

    fn sample() -> MemoryGraph {
        let mut g = MemoryGraph::new();
        g.insert(&[
            Triple::new(node("a"), node("knows"), node("b")),
            Triple::new(node("a"), node("knows"), node("c")),
            Triple::new(node("b"), node("name"), Literal::new_simple_literal("B")),
        ])
        .unwrap();
        g
    }

    fn compile(g: &MemoryGraph, pattern: &TriplePattern) -> EncodedPattern {
        let mut ctx = CompileCtx::default();
        compile_pattern(g, pattern, &mut ctx, CardinalityHints::default()).unwrap()
    }

    #[test]
    fn all_concrete_estimates_presence() {
        let g = sample();
        let present = compile(&g, &TriplePattern::new(node("a"), node("knows"), node("b")));
        assert_eq!(present.estimate, 1);
        let absent = compile(&g, &TriplePattern::new(node("b"), node("knows"), node("a")));
        assert_eq!(absent.estimate, 0);
        assert!(!absent.impossible);
    }

    #[test]
    fn two_concrete_estimates_exact_bitmap_length() {
        let g = sample();
        let p = compile(
            &g,
            &TriplePattern::new(node("a"), node("knows"), Variable::new_unchecked("o")),
        );
        assert_eq!(p.estimate, 2);
    }

    #[test]
    fn one_concrete_uses_the_hint() {
        let g = sample();
        let p = compile(
            &g,
            &TriplePattern::new(
                Variable::new_unchecked("s"),
                node("knows"),
                Variable::new_unchecked("o"),
            ),
        );
        assert_eq!(p.estimate, CardinalityHints::default().one_concrete);
    }

    #[test]
    fn all_variable_overestimates_from_key_counts() {
        let g = sample();
        let p = compile(
            &g,
            &TriplePattern::new(
                Variable::new_unchecked("s"),
                Variable::new_unchecked("p"),
                Variable::new_unchecked("o"),
            ),
        );
        // 2 subjects × 3 objects.
        assert_eq!(p.estimate, 6);
    }

    #[test]
    fn absent_node_marks_the_pattern_impossible() {
        let g = sample();
        let p = compile(
            &g,
            &TriplePattern::new(node("nobody"), node("knows"), Variable::new_unchecked("o")),
        );
        assert!(p.impossible);
        assert_eq!(p.s, 0);
        assert_eq!(p.estimate, 0);
    }

    #[test]
    fn repeated_variables_share_one_id() {
        let g = sample();
        let mut ctx = CompileCtx::default();
        let x = Variable::new_unchecked("x");
        let first = compile_pattern(
            &g,
            &TriplePattern::new(x.clone(), node("knows"), Variable::new_unchecked("y")),
            &mut ctx,
            CardinalityHints::default(),
        )
        .unwrap();
        let second = compile_pattern(
            &g,
            &TriplePattern::new(x.clone(), node("name"), Variable::new_unchecked("n")),
            &mut ctx,
            CardinalityHints::default(),
        )
        .unwrap();
        assert_eq!(first.s, second.s);
        assert_eq!(ctx.id_of(&x), Some(first.s));
    }
}
