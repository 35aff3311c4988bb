//! Regrouping of bit strings between group widths (8-bit bytes <-> 5-bit words).

use crate::error::{Result, VanityError};

/// Repacks `values` from `from_bits`-wide groups into `to_bits`-wide groups.
///
/// Both widths must be between 1 and 8. With `pad`, trailing bits are
/// flushed as one final zero-padded group; without it, leftover bits are
/// an error unless they are fewer than `from_bits` and all zero.
pub fn convert_bits(values: &[u8], from_bits: u32, to_bits: u32, pad: bool) -> Result<Vec<u8>> {
    if !(1..=8).contains(&from_bits) || !(1..=8).contains(&to_bits) {
        return Err(VanityError::InvalidBitWidth { from_bits, to_bits });
    }

    let max_value: u32 = (1 << to_bits) - 1;
    let max_acc: u32 = (1 << (from_bits + to_bits - 1)) - 1;
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut out = Vec::with_capacity((values.len() * from_bits as usize).div_ceil(to_bits as usize));

    for &value in values {
        if (value as u32) >> from_bits != 0 {
            return Err(VanityError::InvalidInputWidth { value, from_bits });
        }
        acc = ((acc << from_bits) | value as u32) & max_acc;
        bits += from_bits;
        while bits >= to_bits {
            bits -= to_bits;
            out.push(((acc >> bits) & max_value) as u8);
        }
    }

    if pad {
        if bits > 0 {
            out.push(((acc << (to_bits - bits)) & max_value) as u8);
        }
    } else if bits >= from_bits || (acc << (to_bits - bits)) & max_value != 0 {
        return Err(VanityError::InvalidPadding);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twenty_bytes_fill_exactly_32_words() {
        let words = convert_bits(&[0xffu8; 20], 8, 5, true).unwrap();
        assert_eq!(words.len(), 32);
        assert!(words.iter().all(|&w| w == 31));
    }

    #[test]
    fn test_padding_is_left_aligned() {
        // 0b1000_0000 -> 10000 000(00)
        assert_eq!(convert_bits(&[0x80], 8, 5, true).unwrap(), vec![16, 0]);
        assert_eq!(convert_bits(&[0x01], 8, 5, true).unwrap(), vec![0, 4]);
    }

    #[test]
    fn test_round_trip_up_to_trailing_padding() {
        let program: Vec<u8> = (0u8..32).map(|i| i.wrapping_mul(37).wrapping_add(11)).collect();
        let words = convert_bits(&program, 8, 5, true).unwrap();
        assert_eq!(words.len(), 52);

        let back = convert_bits(&words, 5, 8, true).unwrap();
        assert_eq!(&back[..program.len()], &program[..]);
        assert!(back[program.len()..].iter().all(|&b| b == 0));

        let strict = convert_bits(&words, 5, 8, false).unwrap();
        assert_eq!(strict, program);
    }

    #[test]
    fn test_rejects_wide_input() {
        match convert_bits(&[32], 5, 8, true) {
            Err(VanityError::InvalidInputWidth { value, from_bits }) => {
                assert_eq!(value, 32);
                assert_eq!(from_bits, 5);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_group_widths_outside_a_byte() {
        for (from_bits, to_bits) in [(8, 0), (0, 5), (9, 5), (5, 32)] {
            assert!(matches!(
                convert_bits(&[1], from_bits, to_bits, true),
                Err(VanityError::InvalidBitWidth { .. })
            ));
        }
        assert!(convert_bits(&[], 8, 0, false).is_err());
    }

    #[test]
    fn test_rejects_nonzero_residual_without_padding() {
        // 0x01 as 8->5 leaves three nonzero residual bits
        assert!(matches!(
            convert_bits(&[0x01], 8, 5, false),
            Err(VanityError::InvalidPadding)
        ));
        // seven leftover bits cover a whole 5-bit group, never valid padding
        assert!(matches!(
            convert_bits(&[0, 0, 0], 5, 8, false),
            Err(VanityError::InvalidPadding)
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(convert_bits(&[], 8, 5, true).unwrap().is_empty());
        assert!(convert_bits(&[], 5, 8, false).unwrap().is_empty());
    }
}
