//! Base58Check encoding (version byte, payload, 4-byte double-SHA-256 checksum).

use crate::crypto::Hashers;
use crate::error::{Result, VanityError};

const CHECKSUM_LEN: usize = 4;

/// Encodes `version ‖ payload ‖ checksum` as Base58.
pub fn encode_check(hashers: &mut Hashers, version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(1 + payload.len() + CHECKSUM_LEN);
    data.push(version);
    data.extend_from_slice(payload);

    let checksum = hashers.hash256(&data);
    data.extend_from_slice(&checksum[..CHECKSUM_LEN]);

    bs58::encode(data).into_string()
}

/// Decodes a Base58Check string into its version byte and payload.
pub fn decode_check(hashers: &mut Hashers, encoded: &str) -> Result<(u8, Vec<u8>)> {
    let data = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| VanityError::InvalidBase58(e.to_string()))?;

    if data.len() < 1 + CHECKSUM_LEN {
        return Err(VanityError::InvalidBase58(format!(
            "{} bytes is too short for version and checksum",
            data.len()
        )));
    }

    let (body, checksum) = data.split_at(data.len() - CHECKSUM_LEN);
    if hashers.hash256(body)[..CHECKSUM_LEN] != *checksum {
        return Err(VanityError::ChecksumMismatch);
    }

    Ok((body[0], body[1..].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

    #[test]
    fn test_encode_p2pkh_of_generator_point() {
        let mut hashers = Hashers::new();
        let hash = hex::decode("751e76e8199196d454941c45d1b3a323f1433bd6").unwrap();
        assert_eq!(
            encode_check(&mut hashers, 0x00, &hash),
            "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH"
        );
    }

    #[test]
    fn test_leading_zero_version_is_preserved() {
        let mut hashers = Hashers::new();
        let encoded = encode_check(&mut hashers, 0x00, &[0u8; 20]);
        assert_eq!(encoded, "1111111111111111111114oLvT2");
        let (version, payload) = decode_check(&mut hashers, &encoded).unwrap();
        assert_eq!(version, 0);
        assert_eq!(payload, vec![0u8; 20]);
    }

    #[test]
    fn test_decode_recovers_version_and_payload() {
        let mut hashers = Hashers::new();
        let (version, payload) =
            decode_check(&mut hashers, "3JvL6Ymt8MVWiCNHC7oWU6nLeHNJKLZGLN").unwrap();
        assert_eq!(version, 0x05);
        assert_eq!(payload.len(), 20);
    }

    #[test]
    fn test_any_single_character_mutation_is_rejected() {
        let mut hashers = Hashers::new();
        let original = "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH";
        for (i, c) in original.char_indices() {
            let replacement = ALPHABET.chars().find(|&r| r != c).unwrap();
            let mut mutated = original.to_string();
            mutated.replace_range(i..i + 1, &replacement.to_string());
            assert!(
                decode_check(&mut hashers, &mutated).is_err(),
                "mutation at {} accepted",
                i
            );
        }
    }

    #[test]
    fn test_rejects_non_alphabet_characters() {
        let mut hashers = Hashers::new();
        assert!(matches!(
            decode_check(&mut hashers, "1BgGZ9tcN4rm0KBzDn7KprQz87SZ26SAMH"),
            Err(VanityError::InvalidBase58(_))
        ));
    }
}
