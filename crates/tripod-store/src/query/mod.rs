//! BGP evaluation: compile → group → scan → join → substitute.
//!
//! The pipeline is generic over [`IndexReader`] so the memory engine (hash
//! maps) and the disk engine (one redb transaction's tables) evaluate
//! queries through the exact same code path. Scans are read-only; all
//! mutation goes through the engines.

mod compile;
mod group;
mod scan;
mod solutions;
mod substitute;

pub(crate) use compile::{compile_pattern, CompileCtx, EncodedPattern};
pub(crate) use group::group_patterns;
pub(crate) use solutions::{join, project, Solutions};
pub(crate) use substitute::terms_to_triple;

use std::collections::HashSet;

use oxrdf::{Term, Triple, Variable};
use roaring::RoaringBitmap;

use crate::error::StoreError;
use crate::pattern::{TermPattern, TriplePattern};
use crate::CardinalityHints;

/// Read-only view of a node dictionary plus the three permutation indexes.
///
/// `NotFound` is modeled as `None`/empty and never aborts a query.
pub(crate) trait IndexReader {
    /// Dictionary lookup, never allocating.
    fn lookup_id(&self, term: &Term) -> Result<Option<u32>, StoreError>;

    /// Reverse dictionary lookup. The ID must come from this store; a
    /// missing entry means an index references a node the dictionary lost,
    /// which is corruption and panics.
    fn lookup_term(&self, id: u32) -> Result<Term, StoreError>;

    fn spo(&self, s: u32, p: u32) -> Result<Option<RoaringBitmap>, StoreError>;
    fn osp(&self, o: u32, s: u32) -> Result<Option<RoaringBitmap>, StoreError>;
    fn pos(&self, p: u32, o: u32) -> Result<Option<RoaringBitmap>, StoreError>;

    /// All `(predicate, objects)` entries under one subject.
    fn spo_prefix(&self, s: u32) -> Result<Vec<(u32, RoaringBitmap)>, StoreError>;
    /// All `(subject, predicates)` entries under one object.
    fn osp_prefix(&self, o: u32) -> Result<Vec<(u32, RoaringBitmap)>, StoreError>;
    /// All `(object, subjects)` entries under one predicate.
    fn pos_prefix(&self, p: u32) -> Result<Vec<(u32, RoaringBitmap)>, StoreError>;

    /// Full SPO cursor scan: every `(subject, predicate, objects)` entry.
    fn spo_all(&self) -> Result<Vec<(u32, u32, RoaringBitmap)>, StoreError>;

    /// Key counts feeding the all-variable cardinality over-estimate.
    fn subject_keys(&self) -> Result<u64, StoreError>;
    fn object_keys(&self) -> Result<u64, StoreError>;
}

/// Compile and group a pattern list. Groups containing a pattern made
/// impossible by an absent concrete node are already dropped.
pub(crate) fn prepare<R: IndexReader>(
    reader: &R,
    patterns: &[TriplePattern],
    hints: CardinalityHints,
) -> Result<(Vec<Vec<EncodedPattern>>, CompileCtx), StoreError> {
    let mut ctx = CompileCtx::default();
    let mut compiled = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        compiled.push(compile_pattern(reader, pattern, &mut ctx, hints)?);
    }
    let groups = group_patterns(compiled);
    tracing::trace!(
        groups = groups.len(),
        patterns = patterns.len(),
        "grouped basic graph pattern"
    );
    Ok((groups, ctx))
}

/// Evaluate one group: scan patterns in ascending estimated cardinality
/// with a shared bound-variable map, joining the per-pattern tables.
///
/// A pattern that matches nothing short-circuits the group to an empty
/// table covering the group's variables.
pub(crate) fn evaluate_group<R: IndexReader>(
    reader: &R,
    group: &mut Vec<EncodedPattern>,
) -> Result<Solutions, StoreError> {
    group.sort_by_key(|p| p.estimate);

    let group_vars: Vec<u32> = {
        let mut seen = HashSet::new();
        group
            .iter()
            .flat_map(|p| p.var_ids())
            .filter(|v| seen.insert(*v))
            .collect()
    };

    let mut bound = scan::Bound::default();
    let mut joined = Solutions::unit();
    for pattern in group.iter() {
        let table = scan::scan_pattern(reader, pattern, &mut bound)?;
        if table.rows.is_empty() {
            return Ok(Solutions {
                vars: group_vars,
                rows: Vec::new(),
            });
        }
        joined = join(joined, table);
        if joined.rows.is_empty() {
            return Ok(Solutions {
                vars: group_vars,
                rows: Vec::new(),
            });
        }
    }
    Ok(joined)
}

/// `Where` evaluation: every pattern of every surviving group instantiated
/// against its group's solutions.
pub(crate) fn construct<R: IndexReader>(
    reader: &R,
    patterns: &[TriplePattern],
    hints: CardinalityHints,
) -> Result<Vec<Triple>, StoreError> {
    let (mut groups, _ctx) = prepare(reader, patterns, hints)?;
    let mut out = Vec::new();
    for group in &mut groups {
        let solutions = evaluate_group(reader, group)?;
        for pattern in group.iter() {
            substitute::substitute(reader, pattern, &solutions, &mut out)?;
        }
    }
    Ok(out)
}

/// `Select` evaluation: join every group's solutions (cartesian across
/// groups with disjoint variables), project the requested variables, and
/// resolve IDs back to terms.
pub(crate) fn select_rows<R: IndexReader>(
    reader: &R,
    vars: &[Variable],
    patterns: &[TriplePattern],
    hints: CardinalityHints,
) -> Result<Vec<Vec<Term>>, StoreError> {
    let (mut groups, ctx) = prepare(reader, patterns, hints)?;
    let mut table = Solutions::unit();
    for group in &mut groups {
        table = join(table, evaluate_group(reader, group)?);
    }

    let requested: Vec<u32> = vars.iter().filter_map(|v| ctx.id_of(v)).collect();
    let projected = project(&table, &requested);
    if projected.vars.is_empty() {
        return Ok(Vec::new());
    }

    let mut rows = Vec::with_capacity(projected.rows.len());
    for row in &projected.rows {
        let mut terms = Vec::with_capacity(row.len());
        for &id in row {
            terms.push(reader.lookup_term(id)?);
        }
        rows.push(terms);
    }
    Ok(rows)
}

/// Dump every stored triple through a reader's SPO cursor.
pub(crate) fn dump_triples<R: IndexReader>(reader: &R) -> Result<Vec<Triple>, StoreError> {
    let mut out = Vec::new();
    for (s, p, objects) in reader.spo_all()? {
        let subject = reader.lookup_term(s)?;
        let predicate = reader.lookup_term(p)?;
        for o in objects {
            let object = reader.lookup_term(o)?;
            if let Some(triple) = terms_to_triple(subject.clone(), predicate.clone(), object) {
                out.push(triple);
            }
        }
    }
    Ok(out)
}

/// One position of a planned mutation triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum PlannedTerm {
    /// An existing node, referenced by ID (variable bindings and resolved
    /// lookups).
    Id(u32),
    /// A concrete template term the engine resolves (and for insertions,
    /// allocates) at apply time.
    Term(Term),
}

/// Deletions and insertions computed from one solution snapshot.
#[derive(Debug, Default)]
pub(crate) struct UpdatePlan {
    pub deletions: Vec<[u32; 3]>,
    pub insertions: Vec<[PlannedTerm; 3]>,
}

/// Plan an `update` call. With a WHERE clause, it is evaluated exactly as
/// `where_` would, and both deletion and insertion templates are
/// instantiated from that one joined table; mutations never feed back
/// into the matching. Without one, templates must be fully concrete.
pub(crate) fn plan_update<R: IndexReader>(
    reader: &R,
    del: &[TriplePattern],
    ins: &[TriplePattern],
    wher: &[TriplePattern],
    hints: CardinalityHints,
) -> Result<UpdatePlan, StoreError> {
    let mut plan = UpdatePlan::default();

    if wher.is_empty() {
        for pattern in del {
            if !pattern.is_concrete() {
                return Err(StoreError::NonConcretePattern);
            }
            // A malformed concrete pattern cannot name a stored triple.
            let Some(triple) = pattern.to_triple() else {
                continue;
            };
            if let Some(ids) = lookup_triple(reader, &triple)? {
                plan.deletions.push(ids);
            }
        }
        for pattern in ins {
            if !pattern.is_concrete() {
                return Err(StoreError::NonConcretePattern);
            }
            let triple = pattern.to_triple().ok_or(StoreError::MalformedPattern)?;
            plan.insertions.push(triple_template(&triple));
        }
        return Ok(plan);
    }

    let (mut groups, ctx) = prepare(reader, wher, hints)?;
    if groups.is_empty() {
        // Every component was pruned: the clause matches nothing.
        return Ok(plan);
    }
    let mut table = Solutions::unit();
    for group in &mut groups {
        table = join(table, evaluate_group(reader, group)?);
    }

    let mut seen_del = HashSet::new();
    for pattern in del {
        plan_deletions(reader, pattern, &table, &ctx, &mut seen_del, &mut plan.deletions)?;
    }
    let mut seen_ins = HashSet::new();
    for pattern in ins {
        plan_insertions(pattern, &table, &ctx, &mut seen_ins, &mut plan.insertions);
    }
    Ok(plan)
}

fn lookup_triple<R: IndexReader>(
    reader: &R,
    triple: &Triple,
) -> Result<Option<[u32; 3]>, StoreError> {
    let s = reader.lookup_id(&Term::from(triple.subject.clone()))?;
    let p = reader.lookup_id(&Term::from(triple.predicate.clone()))?;
    let o = reader.lookup_id(&triple.object)?;
    Ok(match (s, p, o) {
        (Some(s), Some(p), Some(o)) => Some([s, p, o]),
        _ => None,
    })
}

pub(crate) fn triple_template(triple: &Triple) -> [PlannedTerm; 3] {
    [
        PlannedTerm::Term(Term::from(triple.subject.clone())),
        PlannedTerm::Term(Term::from(triple.predicate.clone())),
        PlannedTerm::Term(triple.object.clone()),
    ]
}

enum TemplateSlot {
    Col(usize),
    Term(Term),
}

/// Map a template pattern onto solution columns. `None` when the template
/// references a variable the WHERE clause never bound, so it can match
/// or produce nothing.
fn template_slots(
    pattern: &TriplePattern,
    table: &Solutions,
    ctx: &CompileCtx,
) -> Option<[TemplateSlot; 3]> {
    let slot = |tp: &TermPattern| -> Option<TemplateSlot> {
        match tp {
            TermPattern::Variable(v) => {
                let id = ctx.id_of(v)?;
                table.col(id).map(TemplateSlot::Col)
            }
            TermPattern::Term(t) => Some(TemplateSlot::Term(t.clone())),
        }
    };
    let s = slot(&pattern.subject)?;
    let p = slot(&pattern.predicate)?;
    let o = slot(&pattern.object)?;
    Some([s, p, o])
}

fn plan_deletions<R: IndexReader>(
    reader: &R,
    pattern: &TriplePattern,
    table: &Solutions,
    ctx: &CompileCtx,
    seen: &mut HashSet<[u32; 3]>,
    out: &mut Vec<[u32; 3]>,
) -> Result<(), StoreError> {
    let Some(slots) = template_slots(pattern, table, ctx) else {
        tracing::warn!("delete template references an unbound variable; skipped");
        return Ok(());
    };
    // Concrete slots resolve once, by lookup only.
    let mut resolved = [0u32; 3];
    let mut cols = [None; 3];
    for (i, slot) in slots.iter().enumerate() {
        match slot {
            TemplateSlot::Col(c) => cols[i] = Some(*c),
            TemplateSlot::Term(t) => match reader.lookup_id(t)? {
                Some(id) => resolved[i] = id,
                None => return Ok(()), // unknown node: nothing to delete
            },
        }
    }
    for row in &table.rows {
        let mut ids = resolved;
        for (i, col) in cols.iter().enumerate() {
            if let Some(c) = col {
                ids[i] = row[*c];
            }
        }
        if seen.insert(ids) {
            out.push(ids);
        }
    }
    Ok(())
}

fn plan_insertions(
    pattern: &TriplePattern,
    table: &Solutions,
    ctx: &CompileCtx,
    seen: &mut HashSet<[PlannedTerm; 3]>,
    out: &mut Vec<[PlannedTerm; 3]>,
) {
    let Some(slots) = template_slots(pattern, table, ctx) else {
        tracing::warn!("insert template references an unbound variable; skipped");
        return;
    };
    for row in &table.rows {
        let planned: [PlannedTerm; 3] = [
            planned_slot(&slots[0], row),
            planned_slot(&slots[1], row),
            planned_slot(&slots[2], row),
        ];
        if seen.insert(planned.clone()) {
            out.push(planned);
        }
    }
}

fn planned_slot(slot: &TemplateSlot, row: &[u32]) -> PlannedTerm {
    match slot {
        TemplateSlot::Col(c) => PlannedTerm::Id(row[*c]),
        TemplateSlot::Term(t) => PlannedTerm::Term(t.clone()),
    }
}
