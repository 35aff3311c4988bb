//! Cryptographic operations for Bitcoin key and address generation.
//!
//! This module provides:
//! - Pooled SHA-256 / RIPEMD-160 hashing
//! - Secure random key generation and secp256k1 public keys
//! - Address derivation for P2PKH, P2SH-P2WPKH, P2WPKH and P2TR

mod address;
mod hash;
mod keypair;

pub use address::{
    generate_address, p2pkh_address, p2sh_p2wpkh_address, p2tr_address, p2wpkh_address,
    AddressDeriver, AddressFormat,
};
pub use hash::{HasherPool, Hashers, POOL_CAPACITY};
pub use keypair::{
    compress, compress_public_key, generate_private_key, private_key_to_public_key,
    private_key_to_wif, KeyGenerator, PrivateKey, PublicKey,
};
