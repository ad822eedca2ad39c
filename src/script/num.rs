//! Script numbers: little-endian sign-magnitude integers.
//!
//! Bitcoin scripts never operate on a native machine integer type —
//! every arithmetic opcode decodes its operands from the stack's byte
//! vectors and re-encodes its result back into one. `Num` wraps an
//! `i64`, wide enough for every legal script-number range (`CLTV`'s
//! 5-byte operand tops out at 2^39-1) while the *length* restriction
//! of 4 (or 5) bytes is enforced at decode time, not by the integer
//! representation itself.

use crate::error::{Error, Result};

/// A decoded script number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Num(i64);

impl Num {
    pub fn value(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Decode a script number from its little-endian sign-magnitude
    /// byte encoding.
    ///
    /// `max_len` is 4 for ordinary arithmetic opcodes and 5 for
    /// `OP_CHECKLOCKTIMEVERIFY`. When `require_minimal` is set the
    /// encoding must be the shortest one that represents the value,
    /// mirroring Bitcoin Core's `CScriptNum` constructor.
    pub fn from_slice(bytes: &[u8], require_minimal: bool, max_len: usize) -> Result<Num> {
        if bytes.len() > max_len {
            return Err(Error::UnknownError("script number overflow"));
        }

        if require_minimal && !bytes.is_empty() {
            // The most significant byte must carry meaningful magnitude
            // bits, unless it exists solely to hold the sign bit
            // because the next byte already has its high bit set.
            if bytes[bytes.len() - 1] & 0x7f == 0
                && (bytes.len() <= 1 || bytes[bytes.len() - 2] & 0x80 == 0)
            {
                return Err(Error::UnknownError("non-minimally encoded script number"));
            }
        }

        Ok(Num(decode(bytes)))
    }

    pub fn encode(self) -> Vec<u8> {
        encode(self.0)
    }
}

impl From<i64> for Num {
    fn from(value: i64) -> Self {
        Num(value)
    }
}

impl From<bool> for Num {
    fn from(value: bool) -> Self {
        Num(if value { 1 } else { 0 })
    }
}

fn decode(bytes: &[u8]) -> i64 {
    if bytes.is_empty() {
        return 0;
    }

    let mut result: i64 = 0;
    for (i, byte) in bytes.iter().enumerate() {
        result |= (*byte as i64) << (8 * i);
    }

    let last = bytes.len() - 1;
    if bytes[last] & 0x80 != 0 {
        // Clear the sign bit from the topmost occupied byte and negate.
        result &= !(0x80i64 << (8 * last));
        -result
    } else {
        result
    }
}

fn encode(value: i64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }

    let negative = value < 0;
    let mut absvalue = value.unsigned_abs();
    let mut result = Vec::new();

    while absvalue != 0 {
        result.push((absvalue & 0xff) as u8);
        absvalue >>= 8;
    }

    if result.last().copied().unwrap_or(0) & 0x80 != 0 {
        result.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        *result.last_mut().unwrap() |= 0x80;
    }

    result
}

/// `castToBool`: Bitcoin's rule for interpreting a stack element as a
/// boolean. Any non-zero byte makes it true, except that a sole
/// trailing `0x80` (negative zero) is still false.
pub fn cast_to_bool(bytes: &[u8]) -> bool {
    for (i, byte) in bytes.iter().enumerate() {
        if *byte != 0 {
            if i == bytes.len() - 1 && *byte == 0x80 {
                return false;
            }
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_empty_is_zero() {
        assert_eq!(Num::from_slice(&[], true, 4).unwrap().value(), 0);
    }

    #[test]
    fn encode_zero_is_empty() {
        assert!(Num::from(0i64).encode().is_empty());
    }

    #[test]
    fn round_trips_positive_and_negative() {
        for n in [1i64, -1, 127, 128, -128, 255, 256, -256, 32767, -32767, 2147483647, -2147483647] {
            let encoded = Num::from(n).encode();
            let decoded = Num::from_slice(&encoded, true, 5).unwrap();
            assert_eq!(decoded.value(), n, "round trip failed for {n}");
        }
    }

    #[test]
    fn rejects_non_minimal_encoding() {
        // A padding zero byte with no sign ambiguity is not minimal.
        assert!(Num::from_slice(&[0x01, 0x00], true, 4).is_err());
    }

    #[test]
    fn accepts_sign_disambiguating_padding() {
        // 0x80 alone would be -0 aka sign bit on a would-be-zero magnitude;
        // 0xff 0x00 keeps 0xff as magnitude, 0x00 only clarifying that the
        // preceding byte's high bit is not a sign bit.
        assert!(Num::from_slice(&[0xff, 0x00], true, 4).is_ok());
    }

    #[test]
    fn rejects_overlong() {
        assert!(Num::from_slice(&[1, 2, 3, 4, 5], true, 4).is_err());
    }

    #[test]
    fn cast_to_bool_rules() {
        assert!(!cast_to_bool(&[]));
        assert!(!cast_to_bool(&[0x00]));
        assert!(!cast_to_bool(&[0x00, 0x00]));
        assert!(!cast_to_bool(&[0x80]));
        assert!(cast_to_bool(&[0x01]));
        assert!(!cast_to_bool(&[0x00, 0x80]));
        assert!(cast_to_bool(&[0x01, 0x80]));
    }
}
