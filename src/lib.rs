//! # btc_vanity
//!
//! High-performance Bitcoin vanity address generator.
//!
//! ## Architecture
//!
//! - `crypto`: Key generation, hashing and address derivation
//! - `codec`: Base58Check, Bech32/Bech32m and bit regrouping
//! - `matcher`: Pattern matching
//! - `worker`: Search units, their message protocol and the worker pool
//! - `config`: Runtime configuration

pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod matcher;
pub mod result;
pub mod worker;

pub use config::{Config, PerformanceConfig};
pub use crypto::{generate_address, AddressDeriver, AddressFormat, PrivateKey, PublicKey};
pub use error::{Result, VanityError};
pub use matcher::{check_pattern_match, MatchResult, Pattern, PatternPosition};
pub use result::SearchResult;
pub use worker::{SearchMode, SearchRequest, SearchUnit, UnitMessage, WorkerPool};
