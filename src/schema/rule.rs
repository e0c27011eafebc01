//! Birth/survival rule descriptors.
//!
//! A rule is written `B<births>/S<survivals>`, where each side lists the
//! live-neighbor counts (0-8) that cause a dead cell to be born or a live cell
//! to survive. The canonical form lists each side in ascending order without
//! duplicates, e.g. `B3/S23`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Largest possible live-neighbor count in a Moore neighborhood.
pub const MAX_NEIGHBORS: u8 = 8;

const FULL_MASK: u16 = (1 << (MAX_NEIGHBORS + 1)) - 1;

/// Which half of a rule an operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RulePart {
    Births,
    Survivals,
}

impl fmt::Display for RulePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RulePart::Births => write!(f, "births"),
            RulePart::Survivals => write!(f, "survivals"),
        }
    }
}

/// Rule parsing and construction errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("Invalid rule format '{descriptor}': {reason}")]
    InvalidRuleFormat { descriptor: String, reason: String },
    #[error("Rule has an empty {part} set")]
    DegenerateRuleSet { part: RulePart },
}

/// A set of neighbor counts in `0..=8`, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NeighborSet(u16);

impl NeighborSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);
    /// All nine neighbor counts.
    pub const FULL: Self = Self(FULL_MASK);

    /// Insert a count. Returns false if the count is out of range.
    pub fn insert(&mut self, count: u8) -> bool {
        if count > MAX_NEIGHBORS {
            return false;
        }
        self.0 |= 1 << count;
        true
    }

    /// Whether the set contains the given neighbor count.
    #[inline]
    pub fn contains(&self, count: usize) -> bool {
        count <= MAX_NEIGHBORS as usize && self.0 & (1 << count) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_full(&self) -> bool {
        self.0 == FULL_MASK
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=MAX_NEIGHBORS).filter(move |&c| self.0 & (1 << c) != 0)
    }

    /// Members in ascending order, collected.
    pub fn digits(&self) -> Vec<u8> {
        self.iter().collect()
    }
}

impl FromIterator<u8> for NeighborSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for count in iter {
            let inserted = set.insert(count);
            debug_assert!(inserted, "neighbor count {count} out of range");
        }
        set
    }
}

impl fmt::Display for NeighborSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for count in self.iter() {
            write!(f, "{count}")?;
        }
        Ok(())
    }
}

/// A birth/survival cellular automaton rule.
///
/// Both sets are non-empty; this is checked at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rule {
    births: NeighborSet,
    survivals: NeighborSet,
}

impl Rule {
    /// Create a rule from two neighbor sets.
    pub fn new(births: NeighborSet, survivals: NeighborSet) -> Result<Self, RuleError> {
        if births.is_empty() {
            return Err(RuleError::DegenerateRuleSet {
                part: RulePart::Births,
            });
        }
        if survivals.is_empty() {
            return Err(RuleError::DegenerateRuleSet {
                part: RulePart::Survivals,
            });
        }
        Ok(Self { births, survivals })
    }

    /// Create a rule from digit lists in any order, duplicates allowed.
    pub fn from_digits(births: &[u8], survivals: &[u8]) -> Result<Self, RuleError> {
        Self::new(
            births.iter().copied().collect(),
            survivals.iter().copied().collect(),
        )
    }

    /// Conway's Game of Life, `B3/S23`.
    pub fn game_of_life() -> Self {
        Self {
            births: [3].into_iter().collect(),
            survivals: [2, 3].into_iter().collect(),
        }
    }

    /// Parse a descriptor of the form `B<digits>/S<digits>`.
    ///
    /// Digits must be in `0..=8`; order and duplicates are not checked.
    pub fn parse(descriptor: &str) -> Result<Self, RuleError> {
        let (births, survivals) = split_descriptor(descriptor)?;
        Self::new(digit_set(births), digit_set(survivals))
    }

    pub fn births(&self) -> NeighborSet {
        self.births
    }

    pub fn survivals(&self) -> NeighborSet {
        self.survivals
    }

    /// Get one half of the rule.
    pub fn part(&self, part: RulePart) -> NeighborSet {
        match part {
            RulePart::Births => self.births,
            RulePart::Survivals => self.survivals,
        }
    }

    /// Whether a dead cell with `count` live neighbors is born.
    #[inline]
    pub fn is_born(&self, count: usize) -> bool {
        self.births.contains(count)
    }

    /// Whether a live cell with `count` live neighbors stays alive.
    #[inline]
    pub fn survives(&self, count: usize) -> bool {
        self.survivals.contains(count)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}/S{}", self.births, self.survivals)
    }
}

impl FromStr for Rule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Rule {
    type Error = RuleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Rule> for String {
    fn from(rule: Rule) -> Self {
        rule.to_string()
    }
}

/// Sort and deduplicate both digit lists of a descriptor.
///
/// Idempotent: a canonical descriptor is returned unchanged.
pub fn canonicalize(descriptor: &str) -> Result<String, RuleError> {
    Rule::parse(descriptor).map(|rule| rule.to_string())
}

/// Whether both digit lists are strictly ascending.
///
/// Malformed descriptors are never canonical.
pub fn is_canonical(descriptor: &str) -> bool {
    match split_descriptor(descriptor) {
        Ok((births, survivals)) => strictly_ascending(births) && strictly_ascending(survivals),
        Err(_) => false,
    }
}

/// Split a descriptor into its digit strings, validating the grammar.
fn split_descriptor(descriptor: &str) -> Result<(&str, &str), RuleError> {
    let invalid = |reason: String| RuleError::InvalidRuleFormat {
        descriptor: descriptor.to_string(),
        reason,
    };

    let (births, survivals) = descriptor
        .split_once('/')
        .ok_or_else(|| invalid("expected 'B<digits>/S<digits>'".to_string()))?;
    let births = births
        .strip_prefix('B')
        .ok_or_else(|| invalid("births must start with 'B'".to_string()))?;
    let survivals = survivals
        .strip_prefix('S')
        .ok_or_else(|| invalid("survivals must start with 'S'".to_string()))?;

    for (part, digits) in [(RulePart::Births, births), (RulePart::Survivals, survivals)] {
        if digits.is_empty() {
            return Err(invalid(format!("{part} list is empty")));
        }
        if let Some(c) = digits.chars().find(|c| !matches!(c, '0'..='8')) {
            return Err(invalid(format!("'{c}' is not a neighbor count 0-8")));
        }
    }

    Ok((births, survivals))
}

/// Collect an already validated digit string.
fn digit_set(digits: &str) -> NeighborSet {
    digits.bytes().map(|b| b - b'0').collect()
}

fn strictly_ascending(digits: &str) -> bool {
    digits.as_bytes().windows(2).all(|w| w[0] < w[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_game_of_life() {
        let rule = Rule::parse("B3/S23").unwrap();
        assert_eq!(rule, Rule::game_of_life());
        assert!(rule.is_born(3));
        assert!(!rule.is_born(2));
        assert!(rule.survives(2));
        assert!(rule.survives(3));
        assert!(!rule.survives(4));
    }

    #[test]
    fn test_parse_unsorted_with_duplicates() {
        let rule = Rule::parse("B5323/S8008").unwrap();
        assert_eq!(rule.to_string(), "B235/S08");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "", "B3S23", "3/S23", "B3/23", "B/S23", "B3/S", "B9/S23", "B3/S2a", "b3/s23",
            "B3/S2/3", " B3/S23",
        ] {
            let err = Rule::parse(bad).unwrap_err();
            assert!(
                matches!(err, RuleError::InvalidRuleFormat { .. }),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_degenerate_sets_rejected() {
        assert_eq!(
            Rule::from_digits(&[], &[2, 3]).unwrap_err(),
            RuleError::DegenerateRuleSet {
                part: RulePart::Births
            }
        );
        assert_eq!(
            Rule::new(NeighborSet::FULL, NeighborSet::EMPTY).unwrap_err(),
            RuleError::DegenerateRuleSet {
                part: RulePart::Survivals
            }
        );
    }

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize("B33210/S876").unwrap(), "B0123/S678");
        assert_eq!(canonicalize("B3/S23").unwrap(), "B3/S23");
        assert!(canonicalize("B3/S29").is_err());
    }

    #[test]
    fn test_is_canonical() {
        assert!(is_canonical("B3/S23"));
        assert!(is_canonical("B012345678/S0"));
        assert!(!is_canonical("B33/S23"));
        assert!(!is_canonical("B3/S32"));
        assert!(!is_canonical("B3S23"));
    }

    #[test]
    fn test_neighbor_set() {
        let mut set = NeighborSet::EMPTY;
        assert!(set.is_empty());
        assert!(set.insert(8));
        assert!(set.insert(0));
        assert!(!set.insert(9));
        assert_eq!(set.digits(), vec![0, 8]);
        assert_eq!(set.len(), 2);
        assert!(!set.contains(9));
        assert!(NeighborSet::FULL.is_full());
        assert_eq!(NeighborSet::FULL.to_string(), "012345678");
    }

    #[test]
    fn test_serde_as_string() {
        let rule = Rule::parse("B36/S23").unwrap();
        let json = serde_json::to_string(&rule).unwrap();
        assert_eq!(json, "\"B36/S23\"");
        let back: Rule = serde_json::from_str("\"B63/S32\"").unwrap();
        assert_eq!(back, rule);
        assert!(serde_json::from_str::<Rule>("\"B36\"").is_err());
    }

    proptest! {
        #[test]
        fn prop_canonicalize_idempotent(d in "B[0-8]{1,12}/S[0-8]{1,12}") {
            let once = canonicalize(&d).unwrap();
            prop_assert!(is_canonical(&once));
            prop_assert_eq!(canonicalize(&once).unwrap(), once);
        }

        #[test]
        fn prop_canonical_roundtrip(
            births in proptest::collection::btree_set(0u8..=8, 1..=9),
            survivals in proptest::collection::btree_set(0u8..=8, 1..=9),
        ) {
            let text = format!(
                "B{}/S{}",
                births.iter().map(|d| d.to_string()).collect::<String>(),
                survivals.iter().map(|d| d.to_string()).collect::<String>(),
            );
            prop_assert_eq!(Rule::parse(&text).unwrap().to_string(), text);
        }
    }
}
