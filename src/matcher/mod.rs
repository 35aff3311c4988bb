//! Pattern matching for Bitcoin addresses.
//!
//! Supports multiple matching positions:
//! - Start: Match right after the format prefix
//! - End: Match at the end of the address
//! - Anywhere: Match anywhere in the address

mod pattern;

pub use pattern::{check_pattern_match, MatchResult, Pattern, PatternPosition};
