//! Disk engine: the same dictionary + three-permutation layout persisted
//! in a single redb file.
//!
//! # Storage design
//!
//! Five tables hold the graph:
//!
//! 1. **`id2node`**: 4-byte big-endian node ID → codec bytes (§ [`crate::codec`]).
//!    The reserved key `0` (never a node ID) holds the allocator cursor, so
//!    IDs stay monotonic across deletes and restarts and are never recycled.
//! 2. **`node2id`**: codec bytes → 4-byte big-endian node ID.
//! 3. **`spo`** / **`osp`** / **`pos`**: 8-byte key made of two 4-byte
//!    big-endian IDs (the first two positions of that permutation) →
//!    Roaring-serialized bitmap of the third position's IDs.
//!
//! A fresh store auto-creates all five tables on first open; opening an
//! existing store alters nothing. Every mutating call runs in one redb
//! write transaction (single writer, atomic commit); every query runs in
//! one read transaction, so readers see a stable snapshot. `update`
//! evaluates its WHERE clause inside the same write transaction that
//! applies the changes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use oxrdf::{Term, Triple, Variable};
use redb::{
    Database, ReadOnlyTable, ReadableTable, ReadableTableMetadata, Table, TableDefinition,
};
use roaring::RoaringBitmap;

use crate::codec;
use crate::error::StoreError;
use crate::memory::MemoryGraph;
use crate::query::{self, IndexReader, PlannedTerm};
use crate::{CardinalityHints, Graph, Stats, TriplePattern, FIRST_NODE_ID};

const ID2NODE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("id2node");
const NODE2ID: TableDefinition<&[u8], &[u8]> = TableDefinition::new("node2id");
const SPO: TableDefinition<&[u8], &[u8]> = TableDefinition::new("spo");
const OSP: TableDefinition<&[u8], &[u8]> = TableDefinition::new("osp");
const POS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("pos");

/// Reserved `id2node` key holding the allocator cursor.
const NEXT_ID_KEY: [u8; 4] = [0; 4];

type WTable<'txn> = Table<'txn, &'static [u8], &'static [u8]>;
type RTable = ReadOnlyTable<&'static [u8], &'static [u8]>;

/// Configuration for a [`DiskGraph`].
#[derive(Debug, Clone)]
pub struct DiskConfig {
    /// Store file; parent directories are created as needed.
    pub path: PathBuf,
    /// Named nodes under this IRI are encoded relative to it. Empty means
    /// every IRI is stored absolute.
    pub base_iri: String,
    /// Scan-ordering estimates for the pattern compiler.
    pub hints: CardinalityHints,
}

impl DiskConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            base_iri: String::new(),
            hints: CardinalityHints::default(),
        }
    }

    pub fn with_base(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = base_iri.into();
        self
    }
}

/// The disk-persisted engine.
pub struct DiskGraph {
    db: Database,
    base: String,
    hints: CardinalityHints,
}

impl DiskGraph {
    /// Open (or create) a store at `path` with default configuration.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with(DiskConfig::new(path.as_ref()))
    }

    pub fn open_with(config: DiskConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(&config.path)?;

        // First open must leave all five tables in place.
        let txn = db.begin_write()?;
        {
            txn.open_table(ID2NODE)?;
            txn.open_table(NODE2ID)?;
            txn.open_table(SPO)?;
            txn.open_table(OSP)?;
            txn.open_table(POS)?;
        }
        txn.commit()?;

        tracing::debug!(path = %config.path.display(), "opened triple store");
        Ok(Self {
            db,
            base: config.base_iri,
            hints: config.hints,
        })
    }

    /// Open one read transaction's tables. The returned set backs a
    /// [`TxnTables`] reader for the duration of the query.
    fn read_tables(&self) -> Result<[RTable; 5], StoreError> {
        let txn = self.db.begin_read()?;
        Ok([
            txn.open_table(ID2NODE)?,
            txn.open_table(NODE2ID)?,
            txn.open_table(SPO)?,
            txn.open_table(OSP)?,
            txn.open_table(POS)?,
        ])
    }
}

// ---------------------------------------------------------------------------
// Key and value plumbing
// ---------------------------------------------------------------------------

fn id_key(id: u32) -> [u8; 4] {
    id.to_be_bytes()
}

fn pair_key(a: u32, b: u32) -> [u8; 8] {
    let mut key = [0u8; 8];
    key[..4].copy_from_slice(&a.to_be_bytes());
    key[4..].copy_from_slice(&b.to_be_bytes());
    key
}

fn be_u32(bytes: &[u8]) -> Result<u32, StoreError> {
    bytes
        .try_into()
        .map(u32::from_be_bytes)
        .map_err(|_| StoreError::DecodeCorruption("bad id width".into()))
}

fn decode_bitmap(bytes: &[u8]) -> Result<RoaringBitmap, StoreError> {
    RoaringBitmap::deserialize_from(bytes)
        .map_err(|e| StoreError::DecodeCorruption(format!("bad bitmap: {e}")))
}

fn read_bitmap<T>(table: &T, key: &[u8]) -> Result<Option<RoaringBitmap>, StoreError>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    match table.get(key)? {
        Some(guard) => Ok(Some(decode_bitmap(guard.value())?)),
        None => Ok(None),
    }
}

fn write_bitmap(table: &mut WTable<'_>, key: &[u8], bitmap: &RoaringBitmap) -> Result<(), StoreError> {
    let mut buf = Vec::with_capacity(bitmap.serialized_size());
    bitmap.serialize_into(&mut buf)?;
    table.insert(key, buf.as_slice())?;
    Ok(())
}

/// All `(second-key, bitmap)` entries under one 4-byte prefix.
fn scan_prefix<T>(table: &T, a: u32) -> Result<Vec<(u32, RoaringBitmap)>, StoreError>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    let start = pair_key(a, 0);
    let end = a.checked_add(1).map(|next| pair_key(next, 0));
    let mut out = Vec::new();
    let range = match &end {
        Some(end) => table.range(start.as_slice()..end.as_slice())?,
        None => table.range(start.as_slice()..)?,
    };
    for item in range {
        let (key, value) = item?;
        out.push((be_u32(&key.value()[4..8])?, decode_bitmap(value.value())?));
    }
    Ok(out)
}

fn has_prefix<T>(table: &T, a: u32) -> Result<bool, StoreError>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    let start = pair_key(a, 0);
    let end = a.checked_add(1).map(|next| pair_key(next, 0));
    let mut range = match &end {
        Some(end) => table.range(start.as_slice()..end.as_slice())?,
        None => table.range(start.as_slice()..)?,
    };
    match range.next() {
        Some(item) => {
            item?;
            Ok(true)
        }
        None => Ok(false),
    }
}

// ---------------------------------------------------------------------------
// Read view: one transaction's tables behind the query pipeline's seam
// ---------------------------------------------------------------------------

struct TxnTables<'a, T>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    id2node: &'a T,
    node2id: &'a T,
    spo: &'a T,
    osp: &'a T,
    pos: &'a T,
    base: &'a str,
}

impl<'a, T> TxnTables<'a, T>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    /// Tables in `read_tables` order: id2node, node2id, spo, osp, pos.
    fn new(tables: &'a [T; 5], base: &'a str) -> Self {
        Self {
            id2node: &tables[0],
            node2id: &tables[1],
            spo: &tables[2],
            osp: &tables[3],
            pos: &tables[4],
            base,
        }
    }
}

impl<T> IndexReader for TxnTables<'_, T>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    fn lookup_id(&self, term: &Term) -> Result<Option<u32>, StoreError> {
        let Some(enc) = codec::encode(term, self.base) else {
            return Ok(None);
        };
        match self.node2id.get(enc.as_slice())? {
            Some(guard) => Ok(Some(be_u32(guard.value())?)),
            None => Ok(None),
        }
    }

    fn lookup_term(&self, id: u32) -> Result<Term, StoreError> {
        match self.id2node.get(id_key(id).as_slice())? {
            Some(guard) => codec::decode(guard.value(), self.base),
            None => panic!("corrupt dictionary: node id {id} is referenced but missing"),
        }
    }

    fn spo(&self, s: u32, p: u32) -> Result<Option<RoaringBitmap>, StoreError> {
        read_bitmap(self.spo, &pair_key(s, p))
    }

    fn osp(&self, o: u32, s: u32) -> Result<Option<RoaringBitmap>, StoreError> {
        read_bitmap(self.osp, &pair_key(o, s))
    }

    fn pos(&self, p: u32, o: u32) -> Result<Option<RoaringBitmap>, StoreError> {
        read_bitmap(self.pos, &pair_key(p, o))
    }

    fn spo_prefix(&self, s: u32) -> Result<Vec<(u32, RoaringBitmap)>, StoreError> {
        scan_prefix(self.spo, s)
    }

    fn osp_prefix(&self, o: u32) -> Result<Vec<(u32, RoaringBitmap)>, StoreError> {
        scan_prefix(self.osp, o)
    }

    fn pos_prefix(&self, p: u32) -> Result<Vec<(u32, RoaringBitmap)>, StoreError> {
        scan_prefix(self.pos, p)
    }

    fn spo_all(&self) -> Result<Vec<(u32, u32, RoaringBitmap)>, StoreError> {
        let mut out = Vec::new();
        for item in self.spo.iter()? {
            let (key, value) = item?;
            let key = key.value();
            out.push((
                be_u32(&key[..4])?,
                be_u32(&key[4..8])?,
                decode_bitmap(value.value())?,
            ));
        }
        Ok(out)
    }

    // Pair-key counts: cheap and strictly larger than the distinct
    // first-component counts, which is all the all-variable over-estimate
    // needs.
    fn subject_keys(&self) -> Result<u64, StoreError> {
        Ok(self.spo.len()?)
    }

    fn object_keys(&self) -> Result<u64, StoreError> {
        Ok(self.osp.len()?)
    }
}

// ---------------------------------------------------------------------------
// Write-side helpers
// ---------------------------------------------------------------------------

struct Allocator {
    next: u32,
    dirty: bool,
}

impl Allocator {
    fn load(id2node: &WTable<'_>) -> Result<Self, StoreError> {
        let next = match id2node.get(NEXT_ID_KEY.as_slice())? {
            Some(guard) => be_u32(guard.value())?,
            None => FIRST_NODE_ID,
        };
        Ok(Self { next, dirty: false })
    }

    fn alloc(&mut self) -> Result<u32, StoreError> {
        if self.next == u32::MAX {
            return Err(StoreError::DbFull);
        }
        let id = self.next;
        self.next += 1;
        self.dirty = true;
        Ok(id)
    }

    fn persist(&self, id2node: &mut WTable<'_>) -> Result<(), StoreError> {
        if self.dirty {
            id2node.insert(NEXT_ID_KEY.as_slice(), self.next.to_be_bytes().as_slice())?;
        }
        Ok(())
    }
}

/// Store a triple in all three permutations, or none on duplicate.
fn store_triple(
    spo: &mut WTable<'_>,
    osp: &mut WTable<'_>,
    pos: &mut WTable<'_>,
    s: u32,
    p: u32,
    o: u32,
) -> Result<bool, StoreError> {
    let key = pair_key(s, p);
    let mut bitmap = read_bitmap(spo, &key)?.unwrap_or_default();
    if !bitmap.insert(o) {
        return Ok(false);
    }
    write_bitmap(spo, &key, &bitmap)?;

    let key = pair_key(o, s);
    let mut bitmap = read_bitmap(osp, &key)?.unwrap_or_default();
    if !bitmap.insert(p) {
        panic!("corrupt triple index: ({s},{p},{o}) present in OSP but not SPO");
    }
    write_bitmap(osp, &key, &bitmap)?;

    let key = pair_key(p, o);
    let mut bitmap = read_bitmap(pos, &key)?.unwrap_or_default();
    if !bitmap.insert(s) {
        panic!("corrupt triple index: ({s},{p},{o}) present in POS but not SPO");
    }
    write_bitmap(pos, &key, &bitmap)?;
    Ok(true)
}

/// Remove a triple from all three permutations, deleting keys whose bitmap
/// empties. Absence is judged by SPO alone; the others must then agree.
fn remove_triple(
    spo: &mut WTable<'_>,
    osp: &mut WTable<'_>,
    pos: &mut WTable<'_>,
    s: u32,
    p: u32,
    o: u32,
) -> Result<bool, StoreError> {
    let key = pair_key(s, p);
    let Some(mut bitmap) = read_bitmap(spo, &key)? else {
        return Ok(false);
    };
    if !bitmap.remove(o) {
        return Ok(false);
    }
    if bitmap.is_empty() {
        spo.remove(key.as_slice())?;
    } else {
        write_bitmap(spo, &key, &bitmap)?;
    }

    let key = pair_key(o, s);
    let mut bitmap = read_bitmap(osp, &key)?.unwrap_or_default();
    if !bitmap.remove(p) {
        panic!("corrupt triple index: ({s},{p},{o}) present in SPO but not OSP");
    }
    if bitmap.is_empty() {
        osp.remove(key.as_slice())?;
    } else {
        write_bitmap(osp, &key, &bitmap)?;
    }

    let key = pair_key(p, o);
    let mut bitmap = read_bitmap(pos, &key)?.unwrap_or_default();
    if !bitmap.remove(s) {
        panic!("corrupt triple index: ({s},{p},{o}) present in SPO but not POS");
    }
    if bitmap.is_empty() {
        pos.remove(key.as_slice())?;
    } else {
        write_bitmap(pos, &key, &bitmap)?;
    }
    Ok(true)
}

fn lookup_node<T>(node2id: &T, enc: &[u8]) -> Result<Option<u32>, StoreError>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    match node2id.get(enc)? {
        Some(guard) => Ok(Some(be_u32(guard.value())?)),
        None => Ok(None),
    }
}

fn lookup_triple_ids(
    node2id: &WTable<'_>,
    base: &str,
    triple: &Triple,
) -> Result<Option<[u32; 3]>, StoreError> {
    let mut ids = [0u32; 3];
    let terms = [
        Term::from(triple.subject.clone()),
        Term::from(triple.predicate.clone()),
        triple.object.clone(),
    ];
    for (slot, term) in ids.iter_mut().zip(terms.iter()) {
        let Some(enc) = codec::encode(term, base) else {
            return Ok(None);
        };
        match lookup_node(node2id, &enc)? {
            Some(id) => *slot = id,
            None => return Ok(None),
        }
    }
    Ok(Some(ids))
}

/// Resolve one planned slot, allocating nodes (and fresh blank identities)
/// as needed.
fn resolve_planned(
    id2node: &mut WTable<'_>,
    node2id: &mut WTable<'_>,
    alloc: &mut Allocator,
    blanks: &mut HashMap<String, u32>,
    base: &str,
    slot: &PlannedTerm,
) -> Result<u32, StoreError> {
    match slot {
        PlannedTerm::Id(id) => Ok(*id),
        PlannedTerm::Term(Term::BlankNode(b)) => {
            if let Some(&id) = blanks.get(b.as_str()) {
                return Ok(id);
            }
            let id = alloc.alloc()?;
            let enc = codec::blank_bytes(id);
            id2node.insert(id_key(id).as_slice(), enc.as_slice())?;
            node2id.insert(enc.as_slice(), id_key(id).as_slice())?;
            blanks.insert(b.as_str().to_owned(), id);
            Ok(id)
        }
        PlannedTerm::Term(term) => {
            let Some(enc) = codec::encode(term, base) else {
                unreachable!("blank nodes are relabeled before encoding");
            };
            if let Some(id) = lookup_node(node2id, &enc)? {
                return Ok(id);
            }
            let id = alloc.alloc()?;
            id2node.insert(id_key(id).as_slice(), enc.as_slice())?;
            node2id.insert(enc.as_slice(), id_key(id).as_slice())?;
            Ok(id)
        }
    }
}

/// A planned triple must keep the RDF positions well-formed.
fn planned_valid(id2node: &WTable<'_>, item: &[PlannedTerm; 3]) -> Result<bool, StoreError> {
    let kind_of = |id: u32| -> Result<Option<u8>, StoreError> {
        Ok(id2node
            .get(id_key(id).as_slice())?
            .and_then(|guard| guard.value().first().copied()))
    };
    let subject_ok = match &item[0] {
        PlannedTerm::Term(t) => !matches!(t, Term::Literal(_)),
        PlannedTerm::Id(id) => kind_of(*id)?.is_some_and(codec::is_subject_tag),
    };
    if !subject_ok {
        return Ok(false);
    }
    let predicate_ok = match &item[1] {
        PlannedTerm::Term(t) => matches!(t, Term::NamedNode(_)),
        PlannedTerm::Id(id) => kind_of(*id)?.is_some_and(codec::is_named_tag),
    };
    Ok(predicate_ok)
}

/// Drop a node from the dictionary once no permutation references it.
fn remove_if_orphan(
    id2node: &mut WTable<'_>,
    node2id: &mut WTable<'_>,
    spo: &WTable<'_>,
    osp: &WTable<'_>,
    pos: &WTable<'_>,
    id: u32,
) -> Result<(), StoreError> {
    if has_prefix(spo, id)? || has_prefix(pos, id)? || has_prefix(osp, id)? {
        return Ok(());
    }
    let enc = match id2node.remove(id_key(id).as_slice())? {
        Some(guard) => guard.value().to_vec(),
        None => return Ok(()),
    };
    node2id.remove(enc.as_slice())?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Graph surface
// ---------------------------------------------------------------------------

impl Graph for DiskGraph {
    fn insert(&mut self, triples: &[Triple]) -> Result<usize, StoreError> {
        let items: Vec<[PlannedTerm; 3]> = triples.iter().map(query::triple_template).collect();
        let txn = self.db.begin_write()?;
        let count;
        {
            let mut id2node = txn.open_table(ID2NODE)?;
            let mut node2id = txn.open_table(NODE2ID)?;
            let mut spo = txn.open_table(SPO)?;
            let mut osp = txn.open_table(OSP)?;
            let mut pos = txn.open_table(POS)?;

            let mut alloc = Allocator::load(&id2node)?;
            let mut blanks = HashMap::new();
            let mut added = 0;
            for item in &items {
                let mut ids = [0u32; 3];
                for (slot, planned) in ids.iter_mut().zip(item.iter()) {
                    *slot = resolve_planned(
                        &mut id2node,
                        &mut node2id,
                        &mut alloc,
                        &mut blanks,
                        &self.base,
                        planned,
                    )?;
                }
                if store_triple(&mut spo, &mut osp, &mut pos, ids[0], ids[1], ids[2])? {
                    added += 1;
                }
            }
            alloc.persist(&mut id2node)?;
            count = added;
        }
        txn.commit()?;
        Ok(count)
    }

    fn delete(&mut self, triples: &[Triple]) -> Result<usize, StoreError> {
        let txn = self.db.begin_write()?;
        let count;
        {
            let mut id2node = txn.open_table(ID2NODE)?;
            let mut node2id = txn.open_table(NODE2ID)?;
            let mut spo = txn.open_table(SPO)?;
            let mut osp = txn.open_table(OSP)?;
            let mut pos = txn.open_table(POS)?;

            let mut removed: Vec<[u32; 3]> = Vec::new();
            for triple in triples {
                let Some([s, p, o]) = lookup_triple_ids(&node2id, &self.base, triple)? else {
                    continue;
                };
                if remove_triple(&mut spo, &mut osp, &mut pos, s, p, o)? {
                    removed.push([s, p, o]);
                }
            }
            for ids in &removed {
                for &id in ids {
                    remove_if_orphan(&mut id2node, &mut node2id, &spo, &osp, &pos, id)?;
                }
            }
            count = removed.len();
        }
        txn.commit()?;
        Ok(count)
    }

    fn update(
        &mut self,
        del: &[TriplePattern],
        ins: &[TriplePattern],
        wher: &[TriplePattern],
    ) -> Result<(usize, usize), StoreError> {
        let txn = self.db.begin_write()?;
        let counts;
        {
            let mut id2node = txn.open_table(ID2NODE)?;
            let mut node2id = txn.open_table(NODE2ID)?;
            let mut spo = txn.open_table(SPO)?;
            let mut osp = txn.open_table(OSP)?;
            let mut pos = txn.open_table(POS)?;

            // One snapshot: the WHERE clause is evaluated before any
            // mutation in this very transaction.
            let plan = {
                let reader = TxnTables {
                    id2node: &id2node,
                    node2id: &node2id,
                    spo: &spo,
                    osp: &osp,
                    pos: &pos,
                    base: &self.base,
                };
                query::plan_update(&reader, del, ins, wher, self.hints)?
            };

            let mut removed: Vec<[u32; 3]> = Vec::new();
            for &[s, p, o] in &plan.deletions {
                if remove_triple(&mut spo, &mut osp, &mut pos, s, p, o)? {
                    removed.push([s, p, o]);
                }
            }

            let mut alloc = Allocator::load(&id2node)?;
            let mut blanks = HashMap::new();
            let mut inserted = 0;
            for item in &plan.insertions {
                if !planned_valid(&id2node, item)? {
                    continue;
                }
                let mut ids = [0u32; 3];
                for (slot, planned) in ids.iter_mut().zip(item.iter()) {
                    *slot = resolve_planned(
                        &mut id2node,
                        &mut node2id,
                        &mut alloc,
                        &mut blanks,
                        &self.base,
                        planned,
                    )?;
                }
                if store_triple(&mut spo, &mut osp, &mut pos, ids[0], ids[1], ids[2])? {
                    inserted += 1;
                }
            }
            alloc.persist(&mut id2node)?;

            // Orphan cleanup last, so re-inserted bindings keep their IDs.
            for ids in &removed {
                for &id in ids {
                    remove_if_orphan(&mut id2node, &mut node2id, &spo, &osp, &pos, id)?;
                }
            }
            counts = (removed.len(), inserted);
        }
        txn.commit()?;
        Ok(counts)
    }

    fn where_(&self, patterns: &[TriplePattern]) -> Result<MemoryGraph, StoreError> {
        let tables = self.read_tables()?;
        let reader = TxnTables::new(&tables, &self.base);
        let triples = query::construct(&reader, patterns, self.hints)?;
        let mut result = MemoryGraph::new();
        result.insert(&triples)?;
        Ok(result)
    }

    fn select(
        &self,
        vars: &[Variable],
        patterns: &[TriplePattern],
    ) -> Result<Vec<Vec<Term>>, StoreError> {
        let tables = self.read_tables()?;
        let reader = TxnTables::new(&tables, &self.base);
        query::select_rows(&reader, vars, patterns, self.hints)
    }

    fn triples(&self) -> Result<Vec<Triple>, StoreError> {
        let tables = self.read_tables()?;
        let reader = TxnTables::new(&tables, &self.base);
        query::dump_triples(&reader)
    }

    fn stats(&self) -> Result<Stats, StoreError> {
        let txn = self.db.begin_read()?;
        let id2node = txn.open_table(ID2NODE)?;
        let spo = txn.open_table(SPO)?;
        let pos = txn.open_table(POS)?;

        let mut nodes = id2node.len()?;
        if id2node.get(NEXT_ID_KEY.as_slice())?.is_some() {
            nodes -= 1; // the allocator cursor is not a node
        }

        let mut triples = 0u64;
        for item in spo.iter()? {
            let (_, value) = item?;
            triples += decode_bitmap(value.value())?.len();
        }

        let mut predicates = 0u64;
        let mut last: Option<u32> = None;
        for item in pos.iter()? {
            let (key, _) = item?;
            let p = be_u32(&key.value()[..4])?;
            if last != Some(p) {
                predicates += 1;
                last = Some(p);
            }
        }

        Ok(Stats {
            nodes,
            triples,
            predicates,
        })
    }

    fn eq(&self, other: &dyn Graph) -> Result<bool, StoreError> {
        Ok(crate::eq::isomorphic(&self.triples()?, &other.triples()?))
    }
}
