//! Cell reference parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style cell identifiers
//! (e.g., "A1", "B2", "AA100") and a column-id / 1-based row pair.
//!
//! # Examples
//!
//! ```
//! use gridcalc_engine::engine::CellRef;
//!
//! let cell: CellRef = "B3".parse().unwrap();
//! assert_eq!(cell.column, "B");
//! assert_eq!(cell.row, 3);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

/// A reference to a cell by column identifier and 1-based row number.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct CellRef {
    pub column: String,
    pub row: usize,
}

impl CellRef {
    pub fn new(column: impl Into<String>, row: usize) -> CellRef {
        CellRef {
            column: column.into(),
            row,
        }
    }

    /// Parse a cell identifier such as "A1" or "AB12".
    /// Returns None for lowercase letters, a missing part, or row 0.
    pub fn parse(name: &str) -> Option<CellRef> {
        let caps = cell_id_re().captures(name)?;
        let row = caps["numbers"].parse::<usize>().ok()?;
        if row == 0 {
            return None;
        }
        Some(CellRef::new(&caps["letters"], row))
    }
}

/// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
pub fn col_to_letters(col: usize) -> String {
    let mut result = String::new();
    let mut n = col as u128 + 1;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}

/// Convert spreadsheet-style letters back to a column index (A -> 0, AA -> 26).
/// Returns None for empty input, non-uppercase characters, or overflow.
pub fn letters_to_col(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut acc = 0usize;
    for c in letters.bytes() {
        if !c.is_ascii_uppercase() {
            return None;
        }
        let digit = (c - b'A') as usize + 1;
        acc = acc.checked_mul(26)?.checked_add(digit)?;
    }
    acc.checked_sub(1)
}

/// Orders column identifiers by their position in the letter sequence,
/// so that "Z" sorts before "AA".
pub fn compare_columns(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn cell_id_re() -> &'static Regex {
    static CELL_ID_RE: OnceLock<Regex> = OnceLock::new();
    CELL_ID_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Z]+)(?<numbers>[0-9]+)$")
            .expect("cell identifier regex must compile")
    })
}

impl std::str::FromStr for CellRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

impl Ord for CellRef {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_columns(&self.column, &other.column).then_with(|| self.row.cmp(&other.row))
    }
}

impl PartialOrd for CellRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
