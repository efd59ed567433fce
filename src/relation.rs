//! Relation code grammar: the terse `C`/`F`/`P` annotations written in the
//! relation column of the interview form.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::Rin;

/// Typed relationship declared by one individual's relation code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationFact {
    /// `C<rin>`: partnered with the given rin.
    CoupleOf(Rin),
    /// `F<rin>[,<rin>]`: child of the listed parents (ascending rin order).
    ChildOfParents(BTreeSet<Rin>),
    /// `P<rin>`: parent of the given child.
    ParentOfChild(Rin),
    None,
}

fn code_regex() -> &'static Regex {
    static CODE: OnceLock<Regex> = OnceLock::new();
    CODE.get_or_init(|| Regex::new(r"^([CFP])(.*)$").expect("Invalid regex pattern"))
}

fn leading_digits_regex() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"^\s*(\d+)").expect("Invalid regex pattern"))
}

/// Parse the leading integer of `text` the way a lenient integer parse
/// would: surrounding whitespace is ignored, trailing garbage is dropped.
fn leading_rin(text: &str) -> Option<Rin> {
    leading_digits_regex()
        .captures(text)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse::<Rin>().ok())
}

/// Interpret a relation code. Case-insensitive; never fails.
///
/// ```
/// use oralgen::relation::{parse_relation, RelationFact};
///
/// assert_eq!(parse_relation("c7"), RelationFact::CoupleOf(7));
/// assert_eq!(parse_relation("P12"), RelationFact::ParentOfChild(12));
/// assert_eq!(parse_relation("??"), RelationFact::None);
/// ```
pub fn parse_relation(code: &str) -> RelationFact {
    let normalized = code.trim().to_uppercase();
    if normalized.is_empty() {
        return RelationFact::None;
    }

    let Some(cap) = code_regex().captures(&normalized) else {
        return RelationFact::None;
    };
    let prefix = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
    let rest = cap.get(2).map(|m| m.as_str()).unwrap_or_default();

    match prefix {
        "C" => leading_rin(rest).map_or(RelationFact::None, RelationFact::CoupleOf),
        "P" => leading_rin(rest).map_or(RelationFact::None, RelationFact::ParentOfChild),
        "F" => {
            // Every F is stripped, so `F3,F4` reads the same as `F3,4`.
            let parents: BTreeSet<Rin> = normalized
                .replace('F', "")
                .split(',')
                .filter_map(leading_rin)
                .collect();
            if parents.is_empty() {
                RelationFact::None
            } else {
                RelationFact::ChildOfParents(parents)
            }
        }
        _ => RelationFact::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(rins: &[Rin]) -> BTreeSet<Rin> {
        rins.iter().copied().collect()
    }

    #[test]
    fn test_parse_couple() {
        assert_eq!(parse_relation("C7"), RelationFact::CoupleOf(7));
        assert_eq!(parse_relation("  c 12 "), RelationFact::CoupleOf(12));
        assert_eq!(parse_relation("C7b"), RelationFact::CoupleOf(7));
    }

    #[test]
    fn test_parse_child_of_two_parents() {
        assert_eq!(parse_relation("F3,4"), RelationFact::ChildOfParents(set(&[3, 4])));
        assert_eq!(parse_relation("f4, 3"), RelationFact::ChildOfParents(set(&[3, 4])));
    }

    #[test]
    fn test_parse_child_of_single_parent() {
        assert_eq!(parse_relation("F9"), RelationFact::ChildOfParents(set(&[9])));
    }

    #[test]
    fn test_parse_child_discards_non_numeric_segments() {
        assert_eq!(parse_relation("F3,x,4"), RelationFact::ChildOfParents(set(&[3, 4])));
        assert_eq!(parse_relation("F?"), RelationFact::None);
        assert_eq!(parse_relation("F"), RelationFact::None);
    }

    #[test]
    fn test_parse_child_keeps_more_than_two_parents() {
        assert_eq!(
            parse_relation("F1,2,3"),
            RelationFact::ChildOfParents(set(&[1, 2, 3]))
        );
    }

    #[test]
    fn test_parse_parent_of_child() {
        assert_eq!(parse_relation("P12"), RelationFact::ParentOfChild(12));
        assert_eq!(parse_relation("p 5"), RelationFact::ParentOfChild(5));
    }

    #[test]
    fn test_parse_unrecognized() {
        assert_eq!(parse_relation(""), RelationFact::None);
        assert_eq!(parse_relation("   "), RelationFact::None);
        assert_eq!(parse_relation("X2"), RelationFact::None);
        assert_eq!(parse_relation("C"), RelationFact::None);
        assert_eq!(parse_relation("Cx"), RelationFact::None);
        assert_eq!(parse_relation("P-3"), RelationFact::None);
    }
}
