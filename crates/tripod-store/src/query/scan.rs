//! Per-pattern scan strategies over the permutation indexes.
//!
//! The scanner dispatches on which of the three slots are concrete, and
//! for each variable slot whether earlier patterns already narrowed it in
//! the bound map. That yields a fixed strategy family:
//!
//! - all concrete: one presence probe against SPO;
//! - two concrete: a direct bitmap lookup against the permutation whose
//!   key pair matches (SPO, POS or OSP), intersected with the variable's
//!   bound set when present;
//! - one concrete: a prefix scan over that permutation, with separate
//!   handling for the two variables being distinct or the same;
//! - no concrete: a full SPO cursor scan, with every repeated-variable
//!   shape handled by equality filtering.
//!
//! Every strategy emits a solution table over exactly the pattern's
//! variable slots, then narrows the bound map: the union of values a
//! variable matched here is intersected into its existing candidate set,
//! so later patterns in the group scan a tighter space (semi-join
//! pushdown). Scans never mutate the store, and a scan only touches the
//! bound entries of its own pattern's variables.

use std::collections::HashMap;

use roaring::RoaringBitmap;

use crate::error::StoreError;
use crate::is_variable_id;

use super::{EncodedPattern, IndexReader, Solutions};

/// Candidate sets for variables, narrowed as a group's patterns are
/// scanned. Absence of an entry means "unconstrained".
#[derive(Debug, Default)]
pub(crate) struct Bound {
    map: HashMap<u32, RoaringBitmap>,
}

impl Bound {
    fn allows(&self, var: u32, id: u32) -> bool {
        self.map.get(&var).map_or(true, |b| b.contains(id))
    }

    fn mask(&self, var: u32) -> Option<&RoaringBitmap> {
        self.map.get(&var)
    }

    /// Intersect the values matched in one scan into the candidate set.
    fn narrow(&mut self, var: u32, matched: RoaringBitmap) {
        match self.map.entry(var) {
            std::collections::hash_map::Entry::Occupied(mut e) => {
                *e.get_mut() &= &matched;
            }
            std::collections::hash_map::Entry::Vacant(e) => {
                e.insert(matched);
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Slot {
    Concrete(u32),
    Var(u32),
}

fn classify(id: u32) -> Slot {
    debug_assert_ne!(id, 0, "impossible patterns must not reach the scanner");
    if is_variable_id(id) {
        Slot::Var(id)
    } else {
        Slot::Concrete(id)
    }
}

/// Scan one pattern, returning its solution table and narrowing `bound`.
pub(crate) fn scan_pattern<R: IndexReader>(
    reader: &R,
    pattern: &EncodedPattern,
    bound: &mut Bound,
) -> Result<Solutions, StoreError> {
    use Slot::{Concrete, Var};
    let [s, p, o] = pattern.slots().map(classify);
    match (s, p, o) {
        (Concrete(s), Concrete(p), Concrete(o)) => {
            let present = reader.spo(s, p)?.is_some_and(|b| b.contains(o));
            Ok(Solutions {
                vars: Vec::new(),
                rows: if present { vec![Vec::new()] } else { Vec::new() },
            })
        }
        (Concrete(s), Concrete(p), Var(v)) => Ok(direct(reader.spo(s, p)?, v, bound)),
        (Var(v), Concrete(p), Concrete(o)) => Ok(direct(reader.pos(p, o)?, v, bound)),
        (Concrete(s), Var(v), Concrete(o)) => Ok(direct(reader.osp(o, s)?, v, bound)),
        // Key variable first: the prefix entry key binds it, the bitmap
        // binds the value variable.
        (Concrete(s), Var(vp), Var(vo)) => Ok(pair(reader.spo_prefix(s)?, vp, vo, bound)),
        (Var(vs), Concrete(p), Var(vo)) => Ok(pair(reader.pos_prefix(p)?, vo, vs, bound)),
        (Var(vs), Var(vp), Concrete(o)) => Ok(pair(reader.osp_prefix(o)?, vs, vp, bound)),
        (Var(vs), Var(vp), Var(vo)) => Ok(full(reader.spo_all()?, vs, vp, vo, bound)),
    }
}

/// Two concrete slots: the matching permutation hands us the variable's
/// bitmap directly.
fn direct(bitmap: Option<RoaringBitmap>, var: u32, bound: &mut Bound) -> Solutions {
    let mut bitmap = bitmap.unwrap_or_default();
    if let Some(mask) = bound.mask(var) {
        bitmap &= mask;
    }
    let rows = bitmap.iter().map(|id| vec![id]).collect();
    bound.narrow(var, bitmap);
    Solutions {
        vars: vec![var],
        rows,
    }
}

/// One concrete slot: prefix entries bind `key_var`, bitmap values bind
/// `val_var`. When both slots carry the same variable, only entries whose
/// bitmap contains their own key match.
fn pair(
    entries: Vec<(u32, RoaringBitmap)>,
    key_var: u32,
    val_var: u32,
    bound: &mut Bound,
) -> Solutions {
    if key_var == val_var {
        let mut matched = RoaringBitmap::new();
        let mut rows = Vec::new();
        for (key, values) in entries {
            if values.contains(key) && bound.allows(key_var, key) {
                matched.insert(key);
                rows.push(vec![key]);
            }
        }
        bound.narrow(key_var, matched);
        return Solutions {
            vars: vec![key_var],
            rows,
        };
    }

    let mut matched_keys = RoaringBitmap::new();
    let mut matched_vals = RoaringBitmap::new();
    let mut rows = Vec::new();
    for (key, mut values) in entries {
        if !bound.allows(key_var, key) {
            continue;
        }
        if let Some(mask) = bound.mask(val_var) {
            values &= mask;
        }
        if values.is_empty() {
            continue;
        }
        matched_keys.insert(key);
        matched_vals |= &values;
        for value in values {
            rows.push(vec![key, value]);
        }
    }
    bound.narrow(key_var, matched_keys);
    bound.narrow(val_var, matched_vals);
    Solutions {
        vars: vec![key_var, val_var],
        rows,
    }
}

/// No concrete slot: full SPO cursor scan. Repeated variables filter by
/// equality across their slots.
fn full(
    entries: Vec<(u32, u32, RoaringBitmap)>,
    vs: u32,
    vp: u32,
    vo: u32,
    bound: &mut Bound,
) -> Solutions {
    let mut vars: Vec<u32> = vec![vs];
    if vp != vs {
        vars.push(vp);
    }
    if vo != vs && vo != vp {
        vars.push(vo);
    }

    let mut matched: HashMap<u32, RoaringBitmap> =
        vars.iter().map(|&v| (v, RoaringBitmap::new())).collect();
    let mut rows = Vec::new();
    for (s, p, objects) in entries {
        if vs == vp && s != p {
            continue;
        }
        if !bound.allows(vs, s) || !bound.allows(vp, p) {
            continue;
        }
        for o in objects {
            if vo == vs && o != s {
                continue;
            }
            if vo == vp && o != p {
                continue;
            }
            if !bound.allows(vo, o) {
                continue;
            }
            let row: Vec<u32> = vars
                .iter()
                .map(|&v| if v == vs { s } else if v == vp { p } else { o })
                .collect();
            for (i, &v) in vars.iter().enumerate() {
                if let Some(acc) = matched.get_mut(&v) {
                    acc.insert(row[i]);
                }
            }
            rows.push(row);
        }
    }
    for (v, acc) in matched {
        bound.narrow(v, acc);
    }
    Solutions { vars, rows }
}
