//! Bech32 (BIP-173) and Bech32m (BIP-350) encoding for segwit addresses.

use super::bits::convert_bits;
use crate::error::{Result, VanityError};

/// Bech32 character set
const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

const GENERATOR: [u32; 5] = [0x3b6a_57b2, 0x2650_8e6d, 0x1ea1_19fa, 0x3d42_33dd, 0x2a14_62b3];

const CHECKSUM_LEN: usize = 6;

/// Longest string BIP-173 allows, separator and checksum included.
const MAX_LEN: usize = 90;

/// Checksum flavour. Witness version 0 uses Bech32, versions 1+ use Bech32m.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Bech32,
    Bech32m,
}

impl Variant {
    const fn constant(self) -> u32 {
        match self {
            Variant::Bech32 => 1,
            Variant::Bech32m => 0x2bc8_30a3,
        }
    }

    fn from_constant(c: u32) -> Option<Self> {
        match c {
            1 => Some(Variant::Bech32),
            0x2bc8_30a3 => Some(Variant::Bech32m),
            _ => None,
        }
    }

    /// The checksum variant mandated for a witness version.
    pub const fn for_witness_version(version: u8) -> Self {
        if version == 0 {
            Variant::Bech32
        } else {
            Variant::Bech32m
        }
    }
}

#[inline]
fn polymod_step(chk: u32, value: u8) -> u32 {
    let top = chk >> 25;
    let mut chk = ((chk & 0x01ff_ffff) << 5) ^ value as u32;
    for (i, g) in GENERATOR.iter().enumerate() {
        if (top >> i) & 1 != 0 {
            chk ^= g;
        }
    }
    chk
}

fn hrp_polymod(hrp: &[u8]) -> u32 {
    let mut chk = 1u32;
    for &c in hrp {
        chk = polymod_step(chk, c >> 5);
    }
    chk = polymod_step(chk, 0);
    for &c in hrp {
        chk = polymod_step(chk, c & 0x1f);
    }
    chk
}

fn create_checksum(hrp: &[u8], data: &[u8], variant: Variant) -> [u8; CHECKSUM_LEN] {
    let mut chk = hrp_polymod(hrp);
    for &d in data {
        chk = polymod_step(chk, d);
    }
    for _ in 0..CHECKSUM_LEN {
        chk = polymod_step(chk, 0);
    }
    chk ^= variant.constant();

    let mut checksum = [0u8; CHECKSUM_LEN];
    for (i, c) in checksum.iter_mut().enumerate() {
        *c = ((chk >> (5 * (5 - i))) & 0x1f) as u8;
    }
    checksum
}

/// Encodes 5-bit `data` under `hrp` with the given checksum variant.
pub fn encode(hrp: &str, data: &[u8], variant: Variant) -> Result<String> {
    if hrp.is_empty() || !hrp.bytes().all(|c| (33..=126).contains(&c)) {
        return Err(VanityError::InvalidBech32(format!("invalid hrp {:?}", hrp)));
    }
    if let Some(&word) = data.iter().find(|&&d| d > 31) {
        return Err(VanityError::InvalidInputWidth {
            value: word,
            from_bits: 5,
        });
    }

    let hrp = hrp.to_ascii_lowercase();
    let checksum = create_checksum(hrp.as_bytes(), data, variant);

    let mut out = String::with_capacity(hrp.len() + 1 + data.len() + CHECKSUM_LEN);
    out.push_str(&hrp);
    out.push('1');
    for &d in data.iter().chain(checksum.iter()) {
        out.push(CHARSET[d as usize] as char);
    }
    Ok(out)
}

/// Decodes a Bech32 or Bech32m string into `(hrp, data, variant)`.
///
/// `data` excludes the checksum.
pub fn decode(s: &str) -> Result<(String, Vec<u8>, Variant)> {
    if s.len() > MAX_LEN {
        return Err(VanityError::InvalidBech32(format!(
            "longer than {} characters",
            MAX_LEN
        )));
    }
    let has_lower = s.bytes().any(|c| c.is_ascii_lowercase());
    let has_upper = s.bytes().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(VanityError::InvalidBech32("mixed case".into()));
    }
    let s = s.to_ascii_lowercase();

    let sep = s
        .rfind('1')
        .ok_or_else(|| VanityError::InvalidBech32("missing separator".into()))?;
    if sep == 0 || sep + 1 + CHECKSUM_LEN > s.len() {
        return Err(VanityError::InvalidBech32("bad separator position".into()));
    }

    let (hrp, rest) = s.split_at(sep);
    if !hrp.bytes().all(|c| (33..=126).contains(&c)) {
        return Err(VanityError::InvalidBech32("invalid hrp character".into()));
    }

    let data = rest[1..]
        .bytes()
        .map(|c| {
            CHARSET
                .iter()
                .position(|&x| x == c)
                .map(|p| p as u8)
                .ok_or_else(|| VanityError::InvalidBech32(format!("invalid character {:?}", c as char)))
        })
        .collect::<Result<Vec<u8>>>()?;

    let mut chk = hrp_polymod(hrp.as_bytes());
    for &d in &data {
        chk = polymod_step(chk, d);
    }
    let variant = Variant::from_constant(chk).ok_or(VanityError::ChecksumMismatch)?;

    let payload_len = data.len() - CHECKSUM_LEN;
    Ok((hrp.to_string(), data[..payload_len].to_vec(), variant))
}

/// Encodes a witness program as a segwit address.
pub fn segwit_encode(hrp: &str, witness_version: u8, program: &[u8]) -> Result<String> {
    if witness_version > 16 {
        return Err(VanityError::InvalidBech32(format!(
            "witness version {} out of range",
            witness_version
        )));
    }
    let mut data = Vec::with_capacity(1 + (program.len() * 8).div_ceil(5));
    data.push(witness_version);
    data.extend(convert_bits(program, 8, 5, true)?);
    encode(hrp, &data, Variant::for_witness_version(witness_version))
}

/// Decodes a segwit address, checking the hrp and the version/checksum pairing.
pub fn segwit_decode(hrp: &str, address: &str) -> Result<(u8, Vec<u8>)> {
    let (decoded_hrp, data, variant) = decode(address)?;
    if decoded_hrp != hrp {
        return Err(VanityError::InvalidBech32(format!(
            "expected hrp {:?}, found {:?}",
            hrp, decoded_hrp
        )));
    }
    let (&version, words) = data
        .split_first()
        .ok_or_else(|| VanityError::InvalidBech32("empty data".into()))?;
    if version > 16 {
        return Err(VanityError::InvalidBech32("witness version out of range".into()));
    }
    if variant != Variant::for_witness_version(version) {
        return Err(VanityError::ChecksumMismatch);
    }

    let program = convert_bits(words, 5, 8, false)?;
    if !(2..=40).contains(&program.len()) {
        return Err(VanityError::InvalidBech32(format!(
            "witness program length {}",
            program.len()
        )));
    }
    Ok((version, program))
}
