//! Checksummed address encodings.
//!
//! - `bits`: 8-bit <-> 5-bit regrouping
//! - `base58`: Base58Check (legacy and P2SH addresses, WIF)
//! - `bech32`: Bech32 / Bech32m (segwit v0 and taproot addresses)

pub mod base58;
pub mod bech32;
mod bits;

pub use bits::convert_bits;
