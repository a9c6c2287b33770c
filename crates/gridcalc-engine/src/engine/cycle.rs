//! Circular reference detection for formula cells.
//!
//! Each top-level evaluation starts with an empty [`EvalPath`]. Resolving a
//! formula cell extends the path with that cell's id before recursing into its
//! references, so meeting an id already on the path means the chain loops
//! back on itself (A1 -> B1 -> C1 -> A1).

/// Cell ids under active resolution in one evaluation call.
///
/// The path is never mutated in place: [`EvalPath::extended`] returns a new
/// value, so sibling references each see only their own ancestors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalPath {
    cells: Vec<String>,
}

impl EvalPath {
    pub fn new() -> EvalPath {
        EvalPath::default()
    }

    pub fn contains(&self, cell_id: &str) -> bool {
        self.cells.iter().any(|c| c == cell_id)
    }

    /// A copy of this path with `cell_id` appended.
    pub fn extended(&self, cell_id: &str) -> EvalPath {
        let mut cells = Vec::with_capacity(self.cells.len() + 1);
        cells.extend(self.cells.iter().cloned());
        cells.push(cell_id.to_string());
        EvalPath { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(String::as_str)
    }
}
