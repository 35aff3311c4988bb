//! SHA-256 / RIPEMD-160 hashing with pooled hasher state.

use ripemd::Ripemd160;
use sha2::digest::{FixedOutputReset, Output, Reset};
use sha2::{Digest, Sha256};

use crate::error::{Result, VanityError};

/// Maximum number of idle hashers kept per algorithm.
pub const POOL_CAPACITY: usize = 5;

/// A bounded free-list of reusable hasher instances.
///
/// Owned by a single search unit; never shared between threads.
#[derive(Debug)]
pub struct HasherPool<D> {
    free: Vec<D>,
    capacity: usize,
}

impl<D> HasherPool<D>
where
    D: Digest + Default + Reset + FixedOutputReset,
{
    /// Creates an empty pool that retains at most `capacity` idle hashers.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Takes an idle hasher, or allocates a fresh one if the pool is empty.
    #[inline]
    pub fn get(&mut self) -> D {
        self.free.pop().unwrap_or_default()
    }

    /// Resets a hasher and keeps it for reuse if there is room.
    #[inline]
    pub fn release(&mut self, mut hasher: D) {
        if self.free.len() < self.capacity {
            Digest::reset(&mut hasher);
            self.free.push(hasher);
        }
    }

    /// Number of idle hashers currently held.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    #[inline]
    fn digest(&mut self, data: &[u8]) -> Output<D> {
        let mut hasher = self.get();
        Digest::update(&mut hasher, data);
        let out = hasher.finalize_reset();
        self.release(hasher);
        out
    }
}

/// Per-unit hashing pipeline.
#[derive(Debug)]
pub struct Hashers {
    sha256: HasherPool<Sha256>,
    ripemd160: HasherPool<Ripemd160>,
}

impl Default for Hashers {
    fn default() -> Self {
        Self::new()
    }
}

impl Hashers {
    pub fn new() -> Self {
        Self {
            sha256: HasherPool::with_capacity(POOL_CAPACITY),
            ripemd160: HasherPool::with_capacity(POOL_CAPACITY),
        }
    }

    #[inline]
    pub fn sha256(&mut self, data: &[u8]) -> [u8; 32] {
        let out = self.sha256.digest(data);
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&out);
        hash
    }

    #[inline]
    pub fn ripemd160(&mut self, data: &[u8]) -> [u8; 20] {
        let out = self.ripemd160.digest(data);
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&out);
        hash
    }

    /// RIPEMD-160 of SHA-256.
    #[inline]
    pub fn hash160(&mut self, data: &[u8]) -> [u8; 20] {
        let sha = self.sha256(data);
        self.ripemd160(&sha)
    }

    /// Double SHA-256.
    #[inline]
    pub fn hash256(&mut self, data: &[u8]) -> [u8; 32] {
        let first = self.sha256(data);
        self.sha256(&first)
    }

    pub fn sha256_hex(&mut self, input_hex: &str) -> Result<String> {
        let data = decode_hex(input_hex)?;
        Ok(hex::encode(self.sha256(&data)))
    }

    pub fn ripemd160_hex(&mut self, input_hex: &str) -> Result<String> {
        let data = decode_hex(input_hex)?;
        Ok(hex::encode(self.ripemd160(&data)))
    }

    pub fn hash160_hex(&mut self, input_hex: &str) -> Result<String> {
        let data = decode_hex(input_hex)?;
        Ok(hex::encode(self.hash160(&data)))
    }

    pub fn hash256_hex(&mut self, input_hex: &str) -> Result<String> {
        let data = decode_hex(input_hex)?;
        Ok(hex::encode(self.hash256(&data)))
    }

    /// Idle hashers held as `(sha256, ripemd160)`.
    pub fn pooled(&self) -> (usize, usize) {
        (self.sha256.available(), self.ripemd160.available())
    }
}

fn decode_hex(input: &str) -> Result<Vec<u8>> {
    hex::decode(input).map_err(|e| VanityError::DerivationFailure(format!("invalid hex: {}", e)))
}
