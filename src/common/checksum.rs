// src/common/checksum.rs

use crc::{Algorithm, Crc};

/// Dallas/Maxim 1-Wire CRC-8 (CRC-8/MAXIM-DOW).
/// Polynomial: 0x31 (0x8C reflected)
/// Initial Value: 0x00
/// Input Reflected: true
/// Output Reflected: true
/// Final XOR: 0x00
/// Check Value: 0xA1 (for "123456789")
pub const LINK_CRC: Algorithm<u8> = crc::CRC_8_MAXIM_DOW;

// Shared table-driven engine, built at compile time.
const CRC_COMPUTER: Crc<u8> = Crc::<u8>::new(&LINK_CRC);

/// Calculates the link CRC-8 over `data`.
///
/// Equivalent to folding every byte, LSB first, into an 8-bit accumulator
/// starting at zero and XORing with `0x8C` whenever the shifted-out bit of
/// `byte ^ accumulator` is set. Inbound frames are checked with it over the
/// text before the first `!`; outbound commands are stamped with it over
/// `subject=action`.
#[inline]
pub fn compute(data: &[u8]) -> u8 {
    CRC_COMPUTER.checksum(data)
}

/// Returns `true` when `expected` matches the checksum of `data`.
#[inline]
pub fn verify(data: &[u8], expected: u8) -> bool {
    compute(data) == expected
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Bit-serial form of the same CRC, as the peer firmware computes it.
    fn bitwise_reference(data: &[u8]) -> u8 {
        let mut acc = 0u8;
        for &byte in data {
            let mut b = byte;
            for _ in 0..8 {
                let mix = (b ^ acc) & 0x01;
                acc >>= 1;
                if mix != 0 {
                    acc ^= 0x8C;
                }
                b >>= 1;
            }
        }
        acc
    }

    #[test]
    fn test_check_value() {
        assert_eq!(compute(b"123456789"), 0xA1);
    }

    #[test]
    fn test_empty_input_is_zero() {
        assert_eq!(compute(b""), 0);
    }

    #[test]
    fn test_known_command_checksums() {
        // Values cross-checked against a CRC-8/MAXIM reference calculator.
        assert_eq!(compute(b"rgbLEDs=0"), 243);
        assert_eq!(compute(b"rgbLEDs=1"), 173);
        assert_eq!(compute(b"rgbLEDs=2"), 79);
        assert_eq!(compute(b"rgbLEDs=4"), 146);
    }

    #[test]
    fn test_known_frame_checksum() {
        assert_eq!(compute(b"120,23.5,55.0,NAN,NAN"), 91);
        assert_eq!(compute(b"-1,NAN,NAN,NAN,NAN"), 145);
    }

    #[test]
    fn test_verify() {
        assert!(verify(b"rgbLEDs=1", 173));
        assert!(!verify(b"rgbLEDs=1", 174));
    }

    proptest! {
        #[test]
        fn prop_matches_bitwise_reference(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(compute(&data), bitwise_reference(&data));
        }

        #[test]
        fn prop_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            let first = compute(&data);
            prop_assert_eq!(first, compute(&data));
            prop_assert_eq!(first, compute(&data.clone()));
        }
    }
}
