//! Bitcoin private/public key handling.

use std::fmt;

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use secp256k1::{Secp256k1, SecretKey, Signing};

use super::Hashers;
use crate::codec::base58;
use crate::error::{Result, VanityError};

/// WIF version byte for mainnet private keys.
const WIF_VERSION: u8 = 0x80;
/// WIF suffix marking a key whose public key is used compressed.
const WIF_COMPRESSED: u8 = 0x01;

/// A secp256k1 private key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parses a 64-character hex private key.
    pub fn from_hex(hex_key: &str) -> Result<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hex_key.trim(), &mut bytes).map_err(|e| {
            VanityError::DerivationFailure(format!("invalid private key hex: {}", e))
        })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the private key as lowercase hex (no prefix).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Wallet Import Format for a compressed-key wallet.
    pub fn to_wif(&self, hashers: &mut Hashers) -> String {
        let mut payload = [0u8; 33];
        payload[..32].copy_from_slice(&self.0);
        payload[32] = WIF_COMPRESSED;
        base58::encode_check(hashers, WIF_VERSION, &payload)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// Source of fresh private keys, seeded once from the operating system.
///
/// Each search unit owns one; the generator is never shared.
pub struct KeyGenerator {
    rng: StdRng,
}

impl KeyGenerator {
    /// Seeds a new generator from `OsRng`.
    pub fn new() -> Result<Self> {
        let rng = StdRng::from_rng(OsRng)
            .map_err(|e| VanityError::EntropyUnavailable(e.to_string()))?;
        Ok(Self { rng })
    }

    /// Draws 32 random bytes.
    #[inline]
    pub fn generate(&mut self) -> Result<PrivateKey> {
        let mut bytes = [0u8; 32];
        self.rng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| VanityError::EntropyUnavailable(e.to_string()))?;
        Ok(PrivateKey(bytes))
    }
}

/// Generates a random private key straight from the OS and returns it as hex.
pub fn generate_private_key() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| VanityError::EntropyUnavailable(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// A secp256k1 public key in both serializations.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    uncompressed: [u8; 65],
    compressed: [u8; 33],
}

impl PublicKey {
    /// Multiplies the generator by the private scalar.
    #[inline]
    pub fn from_private_key<C: Signing>(secp: &Secp256k1<C>, key: &PrivateKey) -> Result<Self> {
        let secret = SecretKey::from_slice(&key.0)
            .map_err(|e| VanityError::DerivationFailure(e.to_string()))?;
        let uncompressed = secp256k1::PublicKey::from_secret_key(secp, &secret).serialize_uncompressed();

        Ok(Self {
            uncompressed,
            compressed: compress(&uncompressed),
        })
    }

    /// `04 ‖ X ‖ Y`
    pub fn uncompressed(&self) -> &[u8; 65] {
        &self.uncompressed
    }

    /// `02|03 ‖ X`
    #[inline]
    pub fn compressed(&self) -> &[u8; 33] {
        &self.compressed
    }

    /// The 32-byte X coordinate.
    #[inline]
    pub fn x_only(&self) -> &[u8] {
        &self.compressed[1..]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.uncompressed)
    }

    pub fn compressed_hex(&self) -> String {
        hex::encode(self.compressed)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.compressed_hex())
    }
}

/// Compresses an uncompressed point: prefix 02 for even Y, 03 for odd Y.
#[inline]
pub fn compress(uncompressed: &[u8; 65]) -> [u8; 33] {
    let mut out = [0u8; 33];
    out[0] = if uncompressed[64] & 1 == 0 { 0x02 } else { 0x03 };
    out[1..].copy_from_slice(&uncompressed[1..33]);
    out
}

/// Hex form of [`compress`].
///
/// 66-character keys are already compressed and pass through; anything that
/// is not a 130-character `04`-prefixed key is also returned unchanged.
pub fn compress_public_key(public_key_hex: &str) -> Result<String> {
    if public_key_hex.len() == 130 && public_key_hex.is_ascii() && public_key_hex.starts_with("04") {
        let y_last = public_key_hex[129..]
            .chars()
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| {
                VanityError::DerivationFailure("public key is not valid hex".into())
            })?;
        let prefix = if y_last % 2 == 0 { "02" } else { "03" };
        return Ok(format!("{}{}", prefix, &public_key_hex[2..66]));
    }
    Ok(public_key_hex.to_string())
}

/// Derives the uncompressed public key hex for a private key hex.
pub fn private_key_to_public_key(private_key_hex: &str) -> Result<String> {
    let key = PrivateKey::from_hex(private_key_hex)?;
    let secp = Secp256k1::signing_only();
    Ok(PublicKey::from_private_key(&secp, &key)?.to_hex())
}

/// Encodes a private key hex in Wallet Import Format.
pub fn private_key_to_wif(private_key_hex: &str) -> Result<String> {
    let key = PrivateKey::from_hex(private_key_hex)?;
    Ok(key.to_wif(&mut Hashers::new()))
}
