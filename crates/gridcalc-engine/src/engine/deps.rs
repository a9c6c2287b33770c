//! Dependency extraction from formula strings.
//!
//! Finds the cell references (`A1`, `B12`, `AA3`) a formula body mentions.
//! A reference is one or more uppercase letters followed by one or more
//! digits, standing as a whole word: `1A`, `A1B`, and `a1` are not references.
//! No existence or bounds checks happen here.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Extract the distinct cell ids a formula body references, in first-occurrence
/// order. Row digits are normalised, so `A01` is reported as `A1`.
pub fn extract_dependencies(body: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut deps = Vec::new();

    for caps in cell_ref_re().captures_iter(body) {
        let cell_id = format!("{}{}", &caps[1], parse_row(&caps[2]));
        if seen.insert(cell_id.clone()) {
            deps.push(cell_id);
        }
    }

    deps
}

/// Whole-word cell reference token: group 1 is the column, group 2 the row digits.
pub(crate) fn cell_ref_re() -> &'static Regex {
    static CELL_RE: OnceLock<Regex> = OnceLock::new();
    CELL_RE.get_or_init(|| {
        Regex::new(r"\b([A-Z]+)([0-9]+)\b").expect("dependency cell reference regex must compile")
    })
}

/// Parse the row digits of a reference token. Digit runs too large for `usize`
/// saturate, so they are still reported as an out-of-range row.
pub(crate) fn parse_row(digits: &str) -> usize {
    digits.parse::<usize>().unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_dependencies_ignores_embedded_tokens() {
        assert!(extract_dependencies("1A+5").is_empty());
        assert!(extract_dependencies("A1B+5").is_empty());
        assert!(extract_dependencies("a1+5").is_empty());
    }

    #[test]
    fn test_extract_dependencies_normalises_row_digits() {
        assert_eq!(extract_dependencies("A01+A1+B007"), vec!["A1", "B7"]);
    }

    #[test]
    fn test_parse_row_saturates() {
        assert_eq!(parse_row("12"), 12);
        assert_eq!(parse_row(&"9".repeat(40)), usize::MAX);
    }
}
