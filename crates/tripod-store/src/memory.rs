//! In-memory engine.
//!
//! The dictionary maps `Term` values to dense IDs directly; the three
//! permutation indexes are two-level hash maps with Roaring bitmap leaves.
//! Everything is rebuilt on load; nothing here persists.
//!
//! Not internally synchronized: callers must serialize concurrent access
//! (one call at a time per graph), exactly like any other `&mut`-threaded
//! Rust value.

use std::collections::HashMap;

use oxrdf::{BlankNode, Term, Triple, Variable};
use roaring::RoaringBitmap;

use crate::codec::blank_label;
use crate::error::StoreError;
use crate::query::{self, IndexReader, PlannedTerm};
use crate::{CardinalityHints, Graph, Stats, TriplePattern, FIRST_NODE_ID};

/// One permutation: `(A, B) → bitmap of C`.
#[derive(Debug, Default)]
struct PairIndex {
    map: HashMap<u32, HashMap<u32, RoaringBitmap>>,
}

impl PairIndex {
    fn get(&self, a: u32, b: u32) -> Option<&RoaringBitmap> {
        self.map.get(&a)?.get(&b)
    }

    /// Returns false when the value was already present.
    fn insert(&mut self, a: u32, b: u32, c: u32) -> bool {
        self.map
            .entry(a)
            .or_default()
            .entry(b)
            .or_default()
            .insert(c)
    }

    /// Removes the value, pruning emptied entries. Returns false when it
    /// was absent.
    fn remove(&mut self, a: u32, b: u32, c: u32) -> bool {
        let Some(inner) = self.map.get_mut(&a) else {
            return false;
        };
        let Some(bitmap) = inner.get_mut(&b) else {
            return false;
        };
        if !bitmap.remove(c) {
            return false;
        }
        if bitmap.is_empty() {
            inner.remove(&b);
            if inner.is_empty() {
                self.map.remove(&a);
            }
        }
        true
    }

    fn has_first(&self, a: u32) -> bool {
        self.map.contains_key(&a)
    }

    fn prefix(&self, a: u32) -> Vec<(u32, RoaringBitmap)> {
        self.map
            .get(&a)
            .map(|inner| inner.iter().map(|(&b, c)| (b, c.clone())).collect())
            .unwrap_or_default()
    }

    fn all(&self) -> Vec<(u32, u32, RoaringBitmap)> {
        let mut out = Vec::new();
        for (&a, inner) in &self.map {
            for (&b, c) in inner {
                out.push((a, b, c.clone()));
            }
        }
        out
    }
}

/// The in-memory engine.
#[derive(Debug)]
pub struct MemoryGraph {
    node2id: HashMap<Term, u32>,
    id2node: HashMap<u32, Term>,
    next_id: u32,
    spo: PairIndex,
    osp: PairIndex,
    pos: PairIndex,
    n_triples: u64,
    hints: CardinalityHints,
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self {
            node2id: HashMap::new(),
            id2node: HashMap::new(),
            next_id: FIRST_NODE_ID,
            spo: PairIndex::default(),
            osp: PairIndex::default(),
            pos: PairIndex::default(),
            n_triples: 0,
            hints: CardinalityHints::default(),
        }
    }

    pub fn with_hints(hints: CardinalityHints) -> Self {
        Self {
            hints,
            ..Self::new()
        }
    }

    fn alloc_id(&mut self) -> Result<u32, StoreError> {
        if self.next_id == u32::MAX {
            return Err(StoreError::DbFull);
        }
        let id = self.next_id;
        self.next_id += 1;
        Ok(id)
    }

    /// Idempotent for named nodes and literals; callers handle blanks.
    fn add_node(&mut self, term: &Term) -> Result<u32, StoreError> {
        if let Some(&id) = self.node2id.get(term) {
            return Ok(id);
        }
        let id = self.alloc_id()?;
        self.node2id.insert(term.clone(), id);
        self.id2node.insert(id, term.clone());
        Ok(id)
    }

    /// Allocate a fresh blank node; its internal label carries its ID.
    fn add_blank(&mut self) -> Result<u32, StoreError> {
        let id = self.alloc_id()?;
        let term: Term = BlankNode::new_unchecked(blank_label(id)).into();
        self.node2id.insert(term.clone(), id);
        self.id2node.insert(id, term);
        Ok(id)
    }

    /// Store a triple in all three permutations, or none on duplicate.
    fn store_triple(&mut self, s: u32, p: u32, o: u32) -> bool {
        if self.spo.get(s, p).is_some_and(|b| b.contains(o)) {
            return false;
        }
        let a1 = self.spo.insert(s, p, o);
        let a2 = self.osp.insert(o, s, p);
        let a3 = self.pos.insert(p, o, s);
        if !(a1 && a2 && a3) {
            panic!("corrupt triple index: ({s},{p},{o}) present in only some permutations");
        }
        self.n_triples += 1;
        true
    }

    /// Remove a triple from all three permutations. Absence is judged by
    /// SPO alone; the others must then agree.
    fn remove_triple(&mut self, s: u32, p: u32, o: u32) -> bool {
        if !self.spo.remove(s, p, o) {
            return false;
        }
        if !self.osp.remove(o, s, p) || !self.pos.remove(p, o, s) {
            panic!("corrupt triple index: ({s},{p},{o}) present in only some permutations");
        }
        self.n_triples -= 1;
        true
    }

    /// Drop a node from the dictionary once no permutation references it.
    /// First positions cover all three roles (SPO: subject, POS:
    /// predicate, OSP: object), so the check is three key probes.
    fn remove_if_orphan(&mut self, id: u32) {
        if self.spo.has_first(id) || self.pos.has_first(id) || self.osp.has_first(id) {
            return;
        }
        if let Some(term) = self.id2node.remove(&id) {
            self.node2id.remove(&term);
        }
    }

    fn lookup_triple_ids(&self, triple: &Triple) -> Option<[u32; 3]> {
        let s = *self.node2id.get(&Term::from(triple.subject.clone()))?;
        let p = *self.node2id.get(&Term::from(triple.predicate.clone()))?;
        let o = *self.node2id.get(&triple.object)?;
        Some([s, p, o])
    }

    fn resolve_planned(
        &mut self,
        slot: &PlannedTerm,
        blanks: &mut HashMap<String, u32>,
        allocated: &mut Vec<u32>,
    ) -> Result<u32, StoreError> {
        match slot {
            PlannedTerm::Id(id) => Ok(*id),
            PlannedTerm::Term(Term::BlankNode(b)) => {
                if let Some(&id) = blanks.get(b.as_str()) {
                    return Ok(id);
                }
                let id = self.add_blank()?;
                blanks.insert(b.as_str().to_owned(), id);
                allocated.push(id);
                Ok(id)
            }
            PlannedTerm::Term(term) => {
                let known = self.node2id.contains_key(term);
                let id = self.add_node(term)?;
                if !known {
                    allocated.push(id);
                }
                Ok(id)
            }
        }
    }

    /// Apply planned insertions, undoing everything on failure so the call
    /// has no partial effect.
    fn insert_planned(&mut self, items: &[[PlannedTerm; 3]]) -> Result<usize, StoreError> {
        let mut blanks: HashMap<String, u32> = HashMap::new();
        let mut allocated: Vec<u32> = Vec::new();
        let mut stored: Vec<[u32; 3]> = Vec::new();

        for item in items {
            let mut ids = [0u32; 3];
            let mut failure = None;
            for (i, slot) in item.iter().enumerate() {
                match self.resolve_planned(slot, &mut blanks, &mut allocated) {
                    Ok(id) => ids[i] = id,
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }
            if let Some(e) = failure {
                for &[s, p, o] in stored.iter().rev() {
                    self.remove_triple(s, p, o);
                }
                for &id in &allocated {
                    self.remove_if_orphan(id);
                }
                return Err(e);
            }
            if self.store_triple(ids[0], ids[1], ids[2]) {
                stored.push(ids);
            }
        }
        Ok(stored.len())
    }

    /// A planned triple must keep the RDF positions well-formed: no
    /// literal subject, named-node predicate.
    fn planned_valid(&self, item: &[PlannedTerm; 3]) -> bool {
        let subject_ok = match &item[0] {
            PlannedTerm::Term(t) => !matches!(t, Term::Literal(_)),
            PlannedTerm::Id(id) => matches!(
                self.id2node.get(id),
                Some(Term::NamedNode(_)) | Some(Term::BlankNode(_))
            ),
        };
        let predicate_ok = match &item[1] {
            PlannedTerm::Term(t) => matches!(t, Term::NamedNode(_)),
            PlannedTerm::Id(id) => matches!(self.id2node.get(id), Some(Term::NamedNode(_))),
        };
        subject_ok && predicate_ok
    }
}

impl IndexReader for MemoryGraph {
    fn lookup_id(&self, term: &Term) -> Result<Option<u32>, StoreError> {
        Ok(self.node2id.get(term).copied())
    }

    fn lookup_term(&self, id: u32) -> Result<Term, StoreError> {
        match self.id2node.get(&id) {
            Some(term) => Ok(term.clone()),
            None => panic!("corrupt dictionary: node id {id} is referenced but missing"),
        }
    }

    fn spo(&self, s: u32, p: u32) -> Result<Option<RoaringBitmap>, StoreError> {
        Ok(self.spo.get(s, p).cloned())
    }

    fn osp(&self, o: u32, s: u32) -> Result<Option<RoaringBitmap>, StoreError> {
        Ok(self.osp.get(o, s).cloned())
    }

    fn pos(&self, p: u32, o: u32) -> Result<Option<RoaringBitmap>, StoreError> {
        Ok(self.pos.get(p, o).cloned())
    }

    fn spo_prefix(&self, s: u32) -> Result<Vec<(u32, RoaringBitmap)>, StoreError> {
        Ok(self.spo.prefix(s))
    }

    fn osp_prefix(&self, o: u32) -> Result<Vec<(u32, RoaringBitmap)>, StoreError> {
        Ok(self.osp.prefix(o))
    }

    fn pos_prefix(&self, p: u32) -> Result<Vec<(u32, RoaringBitmap)>, StoreError> {
        Ok(self.pos.prefix(p))
    }

    fn spo_all(&self) -> Result<Vec<(u32, u32, RoaringBitmap)>, StoreError> {
        Ok(self.spo.all())
    }

    fn subject_keys(&self) -> Result<u64, StoreError> {
        Ok(self.spo.map.len() as u64)
    }

    fn object_keys(&self) -> Result<u64, StoreError> {
        Ok(self.osp.map.len() as u64)
    }
}

impl Graph for MemoryGraph {
    fn insert(&mut self, triples: &[Triple]) -> Result<usize, StoreError> {
        let items: Vec<[PlannedTerm; 3]> = triples.iter().map(query::triple_template).collect();
        self.insert_planned(&items)
    }

    fn delete(&mut self, triples: &[Triple]) -> Result<usize, StoreError> {
        let mut removed: Vec<[u32; 3]> = Vec::new();
        for triple in triples {
            let Some([s, p, o]) = self.lookup_triple_ids(triple) else {
                continue;
            };
            if self.remove_triple(s, p, o) {
                removed.push([s, p, o]);
            }
        }
        for ids in &removed {
            for &id in ids {
                self.remove_if_orphan(id);
            }
        }
        Ok(removed.len())
    }

    fn update(
        &mut self,
        del: &[TriplePattern],
        ins: &[TriplePattern],
        wher: &[TriplePattern],
    ) -> Result<(usize, usize), StoreError> {
        let plan = query::plan_update(self, del, ins, wher, self.hints)?;

        let mut removed: Vec<[u32; 3]> = Vec::new();
        for &[s, p, o] in &plan.deletions {
            if self.remove_triple(s, p, o) {
                removed.push([s, p, o]);
            }
        }

        let items: Vec<[PlannedTerm; 3]> = plan
            .insertions
            .into_iter()
            .filter(|item| self.planned_valid(item))
            .collect();
        let inserted = match self.insert_planned(&items) {
            Ok(n) => n,
            Err(e) => {
                // Restore the deletions: the dictionary entries are still
                // in place because orphan cleanup runs last.
                for &[s, p, o] in removed.iter().rev() {
                    self.store_triple(s, p, o);
                }
                return Err(e);
            }
        };

        for ids in &removed {
            for &id in ids {
                self.remove_if_orphan(id);
            }
        }
        Ok((removed.len(), inserted))
    }

    fn where_(&self, patterns: &[TriplePattern]) -> Result<MemoryGraph, StoreError> {
        let triples = query::construct(self, patterns, self.hints)?;
        let mut result = MemoryGraph::new();
        result.insert(&triples)?;
        Ok(result)
    }

    fn select(
        &self,
        vars: &[Variable],
        patterns: &[TriplePattern],
    ) -> Result<Vec<Vec<Term>>, StoreError> {
        query::select_rows(self, vars, patterns, self.hints)
    }

    fn triples(&self) -> Result<Vec<Triple>, StoreError> {
        query::dump_triples(self)
    }

    fn stats(&self) -> Result<Stats, StoreError> {
        Ok(Stats {
            nodes: self.node2id.len() as u64,
            triples: self.n_triples,
            predicates: self.pos.map.len() as u64,
        })
    }

    fn eq(&self, other: &dyn Graph) -> Result<bool, StoreError> {
        Ok(crate::eq::isomorphic(&self.triples()?, &other.triples()?))
    }
}
