//! Reconstitution of concrete triples from a pattern plus a solution
//! table (CONSTRUCT-style results).

use oxrdf::{Subject, Term, Triple};

use crate::error::StoreError;
use crate::is_variable_id;

use super::{EncodedPattern, IndexReader, Solutions};

/// Instantiate `pattern` once per solution row: variable slots take the
/// row's value for that variable, concrete slots keep the pattern's own
/// node. Appends the decoded triples to `out`.
///
/// The table is expected to cover the pattern's variables (it always does
/// for patterns of the group the table was joined from); a row that cannot
/// instantiate the pattern contributes nothing.
pub(crate) fn substitute<R: IndexReader>(
    reader: &R,
    pattern: &EncodedPattern,
    solutions: &Solutions,
    out: &mut Vec<Triple>,
) -> Result<(), StoreError> {
    let cols = pattern.slots().map(|slot| {
        if is_variable_id(slot) {
            solutions.col(slot)
        } else {
            None
        }
    });
    // A variable the table does not cover can never instantiate.
    for (slot, col) in pattern.slots().iter().zip(cols.iter()) {
        if is_variable_id(*slot) && col.is_none() {
            return Ok(());
        }
    }

    for row in &solutions.rows {
        let ids: Vec<u32> = pattern
            .slots()
            .iter()
            .zip(cols.iter())
            .map(|(&slot, col)| match col {
                Some(c) => row[*c],
                None => slot,
            })
            .collect();
        let s = reader.lookup_term(ids[0])?;
        let p = reader.lookup_term(ids[1])?;
        let o = reader.lookup_term(ids[2])?;
        if let Some(triple) = terms_to_triple(s, p, o) {
            out.push(triple);
        }
    }
    Ok(())
}

/// Assemble a triple from three terms; `None` when the subject is a
/// literal or the predicate is not a named node.
pub(crate) fn terms_to_triple(s: Term, p: Term, o: Term) -> Option<Triple> {
    let subject = match s {
        Term::NamedNode(n) => Subject::NamedNode(n),
        Term::BlankNode(b) => Subject::BlankNode(b),
        Term::Literal(_) => return None,
    };
    let predicate = match p {
        Term::NamedNode(n) => n,
        _ => return None,
    };
    Some(Triple::new(subject, predicate, o))
}
