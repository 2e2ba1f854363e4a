//! Solution tables and their join/projection operations.

/// A set of variable bindings: `vars` names the columns, each row is a
/// same-length tuple of node IDs. Rows are distinct and conform to every
/// pattern that contributed to the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Solutions {
    pub vars: Vec<u32>,
    pub rows: Vec<Vec<u32>>,
}

impl Solutions {
    /// The join identity: no variables, one empty row. Joining it with any
    /// table returns that table; substituting a concrete pattern over it
    /// produces the pattern once.
    pub fn unit() -> Self {
        Solutions {
            vars: Vec::new(),
            rows: vec![Vec::new()],
        }
    }

    /// Column index of a variable.
    pub fn col(&self, var: u32) -> Option<usize> {
        self.vars.iter().position(|&v| v == var)
    }
}

/// Nested-loop join on shared variables.
///
/// A side with no variables is the identity element and the other side is
/// returned unchanged. Otherwise every row pair agreeing on all shared
/// variables emits the left row extended with the right side's non-shared
/// columns. No ordering guarantee.
pub(crate) fn join(a: Solutions, b: Solutions) -> Solutions {
    if a.vars.is_empty() {
        return b;
    }
    if b.vars.is_empty() {
        return a;
    }

    let shared: Vec<(usize, usize)> = a
        .vars
        .iter()
        .enumerate()
        .filter_map(|(ia, va)| b.col(*va).map(|ib| (ia, ib)))
        .collect();
    let b_extra: Vec<usize> = (0..b.vars.len())
        .filter(|ib| !shared.iter().any(|(_, sb)| sb == ib))
        .collect();

    let mut vars = a.vars.clone();
    vars.extend(b_extra.iter().map(|&ib| b.vars[ib]));

    let mut rows = Vec::new();
    for ra in &a.rows {
        for rb in &b.rows {
            if shared.iter().all(|&(ia, ib)| ra[ia] == rb[ib]) {
                let mut row = ra.clone();
                row.extend(b_extra.iter().map(|&ib| rb[ib]));
                rows.push(row);
            }
        }
    }
    Solutions { vars, rows }
}

/// Restrict a table to the requested variables (those present), preserving
/// row order and multiplicity. Not deduplicated.
pub(crate) fn project(table: &Solutions, vars: &[u32]) -> Solutions {
    let cols: Vec<usize> = vars.iter().filter_map(|&v| table.col(v)).collect();
    Solutions {
        vars: cols.iter().map(|&c| table.vars[c]).collect(),
        rows: table
            .rows
            .iter()
            .map(|row| cols.iter().map(|&c| row[c]).collect())
            .collect(),
    }
}
