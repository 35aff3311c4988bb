//! Pattern matching implementation.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::crypto::AddressFormat;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const BECH32_CHARSET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const SEGWIT_PREFIX: &str = "bc1";

/// Where in the address the pattern must appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PatternPosition {
    /// Right after the format prefix (`1`, `3` or `bc1`)
    Start,
    /// At the end of the address
    End,
    /// Anywhere after the format prefix
    Middle,
    /// Anywhere in the address
    #[default]
    Anywhere,
}

impl FromStr for PatternPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" | "prefix" | "begin" => Ok(PatternPosition::Start),
            "end" | "suffix" => Ok(PatternPosition::End),
            "middle" | "inside" => Ok(PatternPosition::Middle),
            "anywhere" | "contains" | "any" => Ok(PatternPosition::Anywhere),
            _ => Err(format!("Unknown pattern position: {}", s)),
        }
    }
}

impl From<String> for PatternPosition {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl From<PatternPosition> for String {
    fn from(position: PatternPosition) -> Self {
        position.to_string()
    }
}

impl std::fmt::Display for PatternPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternPosition::Start => write!(f, "start"),
            PatternPosition::End => write!(f, "end"),
            PatternPosition::Middle => write!(f, "middle"),
            PatternPosition::Anywhere => write!(f, "anywhere"),
        }
    }
}

/// Result of a pattern match operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// Full match found
    Match,
    /// No match
    NoMatch,
}

impl MatchResult {
    #[inline]
    pub fn is_match(self) -> bool {
        matches!(self, MatchResult::Match)
    }
}

impl From<bool> for MatchResult {
    fn from(matched: bool) -> Self {
        if matched {
            MatchResult::Match
        } else {
            MatchResult::NoMatch
        }
    }
}

/// A compiled, case-insensitive pattern.
#[derive(Debug, Clone, Default)]
pub struct Pattern {
    /// Lowercased pattern; empty matches every address
    pattern: String,
    position: PatternPosition,
}

impl Pattern {
    /// Creates a new pattern. `None` or an empty string matches everything.
    pub fn new(pattern: Option<&str>, position: PatternPosition) -> Self {
        Self {
            pattern: pattern.map(str::to_lowercase).unwrap_or_default(),
            position,
        }
    }

    /// Returns the normalized pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn position(&self) -> PatternPosition {
        self.position
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// Matches an address against this pattern.
    #[inline]
    pub fn matches(&self, address: &str) -> MatchResult {
        if self.pattern.is_empty() {
            return MatchResult::Match;
        }
        let needle = self.pattern.as_bytes();

        let matched = match self.position {
            PatternPosition::Start => starts_with_ignore_case(strip_prefix(address), needle),
            PatternPosition::End => {
                let hay = address.as_bytes();
                hay.len() >= needle.len()
                    && hay[hay.len() - needle.len()..].eq_ignore_ascii_case(needle)
            }
            PatternPosition::Middle => contains_ignore_case(strip_prefix(address), needle),
            PatternPosition::Anywhere => contains_ignore_case(address.as_bytes(), needle),
        };

        matched.into()
    }

    /// Pattern characters that can never occur where the pattern must match.
    pub fn impossible_chars(&self, format: AddressFormat) -> Vec<char> {
        self.pattern
            .chars()
            .enumerate()
            .filter(|&(i, c)| char_choices(format, self.position, i, c) == 0)
            .map(|(_, c)| c)
            .collect()
    }

    /// Returns the expected number of attempts to find a match.
    ///
    /// Each pattern character contributes `alphabet / choices`, where
    /// `choices` counts the alphabet symbols equal to it ignoring case.
    pub fn estimated_difficulty(&self, format: AddressFormat) -> u64 {
        let alphabet = if format.is_segwit() { 32.0 } else { 58.0 };
        let mut expected = 1.0f64;
        for (i, c) in self.pattern.chars().enumerate() {
            match char_choices(format, self.position, i, c) {
                0 => return u64::MAX,
                n => expected *= alphabet / n as f64,
            }
        }
        expected as u64
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self, format: AddressFormat) -> String {
        let diff = self.estimated_difficulty(format);
        match diff {
            0..=1_000 => "Very Easy (< 1 second)".into(),
            1_001..=100_000 => "Easy (seconds)".into(),
            100_001..=10_000_000 => "Medium (minutes)".into(),
            10_000_001..=1_000_000_000 => "Hard (hours)".into(),
            _ => "Very Hard (days or more)".into(),
        }
    }
}

/// Checks `address` against an optional pattern at `position`, ignoring case.
pub fn check_pattern_match(address: &str, pattern: Option<&str>, position: PatternPosition) -> bool {
    Pattern::new(pattern, position).matches(address).is_match()
}

/// Drops `bc1` from segwit addresses and the version character otherwise.
#[inline]
fn strip_prefix(address: &str) -> &[u8] {
    let bytes = address.as_bytes();
    let skip = if starts_with_ignore_case(bytes, SEGWIT_PREFIX.as_bytes()) {
        SEGWIT_PREFIX.len()
    } else {
        1
    };
    bytes.get(skip..).unwrap_or_default()
}

#[inline]
fn contains_ignore_case(hay: &[u8], needle: &[u8]) -> bool {
    hay.windows(needle.len()).any(|w| w.eq_ignore_ascii_case(needle))
}

#[inline]
fn starts_with_ignore_case(hay: &[u8], needle: &[u8]) -> bool {
    hay.len() >= needle.len() && hay[..needle.len()].eq_ignore_ascii_case(needle)
}

/// Counts the address symbols that pattern character `c` at `index` can match.
///
/// A segwit address always continues its `bc1` prefix with the witness
/// version character, so a `Start` pattern's first character has to be it.
fn char_choices(format: AddressFormat, position: PatternPosition, index: usize, c: char) -> usize {
    if format.is_segwit() && position == PatternPosition::Start && index == 0 {
        let version = format.prefix().chars().last();
        usize::from(version == Some(c.to_ascii_lowercase()))
    } else if format.is_segwit() {
        let in_charset = BECH32_CHARSET.contains(c.to_ascii_lowercase());
        let in_prefix = position == PatternPosition::Anywhere && SEGWIT_PREFIX.contains(c);
        usize::from(in_charset || in_prefix)
    } else {
        BASE58_ALPHABET
            .chars()
            .filter(|a| a.eq_ignore_ascii_case(&c))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_skips_version_character() {
        let pattern = Pattern::new(Some("bgg"), PatternPosition::Start);
        assert!(pattern.matches("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH").is_match());
        let pattern = Pattern::new(Some("1bg"), PatternPosition::Start);
        assert!(!pattern.matches("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH").is_match());
    }

    #[test]
    fn test_start_skips_segwit_prefix() {
        let address = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";
        assert!(Pattern::new(Some("qw508"), PatternPosition::Start)
            .matches(address)
            .is_match());
        assert!(!Pattern::new(Some("w508"), PatternPosition::Start)
            .matches(address)
            .is_match());
    }

    #[test]
    fn test_start_is_case_insensitive_on_both_sides() {
        assert_eq!(
            check_pattern_match("BC1QW508D6QEJXTDG4Y5R3ZARVARY0C5XW7KV8F3T4", Some("q"), PatternPosition::Start),
            check_pattern_match("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4", Some("Q"), PatternPosition::Start),
        );
        assert!(check_pattern_match(
            "BC1QW508D6QEJXTDG4Y5R3ZARVARY0C5XW7KV8F3T4",
            Some("q"),
            PatternPosition::Start
        ));
    }

    #[test]
    fn test_suffix_match() {
        let pattern = Pattern::new(Some("SAMH"), PatternPosition::End);
        assert!(pattern.matches("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH").is_match());
        assert!(!pattern.matches("SAMH1BgGZ9tcN4rm9KBzDn7KprQz87SZ26").is_match());
        assert!(!pattern.matches("MH").is_match());
    }

    #[test]
    fn test_contains_match() {
        let pattern = Pattern::new(Some("kbzd"), PatternPosition::Anywhere);
        assert!(pattern.matches("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH").is_match());
        assert!(!pattern.matches("1BgGZ9tcN4rm9").is_match());
    }

    #[test]
    fn test_empty_pattern_matches_everything() {
        assert!(check_pattern_match("1abc", None, PatternPosition::Start));
        assert!(check_pattern_match("", Some(""), PatternPosition::End));
    }

    #[test]
    fn test_start_on_short_address() {
        assert!(!check_pattern_match("", Some("a"), PatternPosition::Start));
        assert!(!check_pattern_match("1", Some("a"), PatternPosition::Start));
    }

    #[test]
    fn test_position_parsing() {
        assert_eq!("START".parse::<PatternPosition>().unwrap(), PatternPosition::Start);
        assert_eq!(PatternPosition::from("sideways".to_string()), PatternPosition::Anywhere);
        assert!("sideways".parse::<PatternPosition>().is_err());
        assert_eq!("Middle".parse::<PatternPosition>().unwrap(), PatternPosition::Middle);
        assert_eq!(PatternPosition::Middle.to_string(), "middle");
    }

    #[test]
    fn test_middle_ignores_format_prefix() {
        let segwit = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";
        assert!(check_pattern_match(segwit, Some("d6qe"), PatternPosition::Middle));
        assert!(!check_pattern_match(segwit, Some("c1q"), PatternPosition::Middle));
        assert!(check_pattern_match(segwit, Some("c1q"), PatternPosition::Anywhere));

        let legacy = "1ABCdef123456789";
        assert!(check_pattern_match(legacy, Some("def"), PatternPosition::Middle));
        assert!(!check_pattern_match(legacy, Some("1abc"), PatternPosition::Middle));
    }

    #[test]
    fn test_segwit_start_must_begin_with_witness_version() {
        let pattern = Pattern::new(Some("a"), PatternPosition::Start);
        assert_eq!(pattern.impossible_chars(AddressFormat::NativeSegwit), vec!['a']);
        assert_eq!(pattern.estimated_difficulty(AddressFormat::NativeSegwit), u64::MAX);

        let taproot = Pattern::new(Some("Pq"), PatternPosition::Start);
        assert!(taproot.impossible_chars(AddressFormat::Taproot).is_empty());
        assert_eq!(taproot.estimated_difficulty(AddressFormat::Taproot), 32);
        assert_eq!(taproot.impossible_chars(AddressFormat::NativeSegwit), vec!['p']);

        // later characters are free
        let anywhere = Pattern::new(Some("a"), PatternPosition::End);
        assert!(anywhere.impossible_chars(AddressFormat::NativeSegwit).is_empty());
    }

    #[test]
    fn test_difficulty() {
        let pattern = Pattern::new(Some("qq"), PatternPosition::Start);
        // the witness version character is fixed, only the second 'q' is free
        assert_eq!(pattern.estimated_difficulty(AddressFormat::NativeSegwit), 32);
        // '1' has a single Base58 symbol, 'a' has two case variants
        let pattern = Pattern::new(Some("1a"), PatternPosition::Start);
        assert_eq!(pattern.estimated_difficulty(AddressFormat::Legacy), 58 * 29);
    }

    #[test]
    fn test_impossible_chars() {
        let pattern = Pattern::new(Some("b0o"), PatternPosition::Start);
        assert_eq!(pattern.impossible_chars(AddressFormat::NativeSegwit), vec!['b', 'o']);
        assert_eq!(pattern.impossible_chars(AddressFormat::Legacy), vec!['0']);
        let anywhere = Pattern::new(Some("bc1"), PatternPosition::Anywhere);
        assert!(anywhere.impossible_chars(AddressFormat::Taproot).is_empty());
    }
}
