//! Bitcoin address formats and derivation.

use std::fmt;
use std::str::FromStr;

use secp256k1::{Secp256k1, SignOnly};
use serde::{Deserialize, Serialize};

use super::{Hashers, PrivateKey, PublicKey};
use crate::codec::{base58, bech32};
use crate::error::Result;
use crate::result::SearchResult;

const P2PKH_VERSION: u8 = 0x00;
const P2SH_VERSION: u8 = 0x05;
const SEGWIT_HRP: &str = "bc";

/// Supported address encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AddressFormat {
    /// Legacy pay-to-pubkey-hash (`1...`)
    #[default]
    Legacy,
    /// P2WPKH wrapped in pay-to-script-hash (`3...`)
    ScriptHash,
    /// Native segwit v0 pay-to-witness-pubkey-hash (`bc1q...`)
    NativeSegwit,
    /// Segwit v1 pay-to-taproot (`bc1p...`)
    Taproot,
}

impl AddressFormat {
    pub const ALL: [AddressFormat; 4] = [
        AddressFormat::Legacy,
        AddressFormat::ScriptHash,
        AddressFormat::NativeSegwit,
        AddressFormat::Taproot,
    ];

    /// Protocol name of the format.
    pub const fn name(self) -> &'static str {
        match self {
            AddressFormat::Legacy => "p2pkh",
            AddressFormat::ScriptHash => "p2sh",
            AddressFormat::NativeSegwit => "p2wpkh",
            AddressFormat::Taproot => "p2tr",
        }
    }

    /// Fixed leading characters shared by every address of this format.
    pub const fn prefix(self) -> &'static str {
        match self {
            AddressFormat::Legacy => "1",
            AddressFormat::ScriptHash => "3",
            AddressFormat::NativeSegwit => "bc1q",
            AddressFormat::Taproot => "bc1p",
        }
    }

    pub const fn is_segwit(self) -> bool {
        matches!(self, AddressFormat::NativeSegwit | AddressFormat::Taproot)
    }

    /// Looks up a format by name, falling back to legacy for unknown names.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            log::warn!("Unsupported address type {:?}, using p2pkh", name);
            AddressFormat::Legacy
        })
    }

    /// Builds the address string for a public key.
    #[inline]
    pub fn build(self, hashers: &mut Hashers, public_key: &PublicKey) -> Result<String> {
        match self {
            AddressFormat::Legacy => Ok(p2pkh_address(hashers, public_key)),
            AddressFormat::ScriptHash => Ok(p2sh_p2wpkh_address(hashers, public_key)),
            AddressFormat::NativeSegwit => p2wpkh_address(hashers, public_key),
            AddressFormat::Taproot => p2tr_address(public_key),
        }
    }
}

impl FromStr for AddressFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "p2pkh" | "legacy" => Ok(AddressFormat::Legacy),
            "p2sh" | "p2sh-p2wpkh" | "nested" => Ok(AddressFormat::ScriptHash),
            "p2wpkh" | "segwit" | "bech32" => Ok(AddressFormat::NativeSegwit),
            "p2tr" | "taproot" => Ok(AddressFormat::Taproot),
            _ => Err(format!("Unknown address type: {}", s)),
        }
    }
}

impl From<String> for AddressFormat {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<AddressFormat> for String {
    fn from(format: AddressFormat) -> Self {
        format.name().to_string()
    }
}

impl fmt::Display for AddressFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Legacy address: Base58Check(0x00 ‖ hash160(compressed pubkey)).
pub fn p2pkh_address(hashers: &mut Hashers, public_key: &PublicKey) -> String {
    let pubkey_hash = hashers.hash160(public_key.compressed());
    base58::encode_check(hashers, P2PKH_VERSION, &pubkey_hash)
}

/// Nested segwit address: Base58Check(0x05 ‖ hash160(OP_0 PUSH20 <pubkey hash>)).
pub fn p2sh_p2wpkh_address(hashers: &mut Hashers, public_key: &PublicKey) -> String {
    let pubkey_hash = hashers.hash160(public_key.compressed());

    let mut redeem_script = [0u8; 22];
    redeem_script[0] = 0x00; // OP_0
    redeem_script[1] = 0x14; // PUSH 20
    redeem_script[2..].copy_from_slice(&pubkey_hash);

    let script_hash = hashers.hash160(&redeem_script);
    base58::encode_check(hashers, P2SH_VERSION, &script_hash)
}

/// Native segwit v0 address over the compressed pubkey hash.
pub fn p2wpkh_address(hashers: &mut Hashers, public_key: &PublicKey) -> Result<String> {
    let pubkey_hash = hashers.hash160(public_key.compressed());
    bech32::segwit_encode(SEGWIT_HRP, 0, &pubkey_hash)
}

/// Taproot address whose output key is the untweaked x-only public key.
///
/// No BIP-341 tweak is applied, so this differs from the key-path-only
/// address a BIP-86 wallet derives for the same key.
pub fn p2tr_address(public_key: &PublicKey) -> Result<String> {
    bech32::segwit_encode(SEGWIT_HRP, 1, public_key.x_only())
}

/// Derives addresses for one search unit.
///
/// Owns its own secp256k1 context and hasher pools.
pub struct AddressDeriver {
    secp: Secp256k1<SignOnly>,
    hashers: Hashers,
}

impl Default for AddressDeriver {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressDeriver {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::signing_only(),
            hashers: Hashers::new(),
        }
    }

    /// Derives only the address, for the search hot loop.
    #[inline]
    pub fn derive(&mut self, format: AddressFormat, key: &PrivateKey) -> Result<String> {
        let public_key = PublicKey::from_private_key(&self.secp, key)?;
        format.build(&mut self.hashers, &public_key)
    }

    /// Derives the address and both private key encodings.
    pub fn generate(&mut self, format: AddressFormat, key: &PrivateKey) -> Result<SearchResult> {
        let address = self.derive(format, key)?;
        Ok(self.complete(address, key))
    }

    /// Pairs an already-derived address with its key encodings.
    pub fn complete(&mut self, address: String, key: &PrivateKey) -> SearchResult {
        SearchResult {
            address,
            private_key_hex: key.to_hex(),
            private_key_wif: key.to_wif(&mut self.hashers),
            attempts: None,
            unit_id: None,
        }
    }

    pub fn hashers(&mut self) -> &mut Hashers {
        &mut self.hashers
    }
}

/// Generates the address of the named type for a hex private key.
///
/// Unknown type names produce a legacy address.
pub fn generate_address(address_type: &str, private_key_hex: &str) -> Result<SearchResult> {
    let key = PrivateKey::from_hex(private_key_hex)?;
    AddressDeriver::new().generate(AddressFormat::from_name(address_type), &key)
}
