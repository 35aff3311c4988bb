//! Error types shared across the crate.

use crate::config::ConfigError;

/// Errors produced while deriving, encoding, or searching for addresses.
#[derive(Debug, thiserror::Error)]
pub enum VanityError {
    /// The operating system could not supply entropy for key generation.
    #[error("Entropy unavailable: {0}")]
    EntropyUnavailable(String),

    /// A group width outside 1..=8 was passed to the bit converter.
    #[error("Invalid group widths for base conversion: {from_bits} -> {to_bits}")]
    InvalidBitWidth { from_bits: u32, to_bits: u32 },

    /// A value passed to the bit converter does not fit in the source width.
    #[error("Invalid data for base conversion: {value} does not fit in {from_bits} bits")]
    InvalidInputWidth { value: u8, from_bits: u32 },

    /// Leftover bits after an unpadded bit conversion.
    #[error("Invalid padding in base conversion")]
    InvalidPadding,

    /// Key or address derivation failed.
    #[error("Derivation failed: {0}")]
    DerivationFailure(String),

    #[error("Invalid base58 string: {0}")]
    InvalidBase58(String),

    #[error("Checksum mismatch")]
    ChecksumMismatch,

    #[error("Invalid bech32 string: {0}")]
    InvalidBech32(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, VanityError>;
