//! Script verification flags.
//!
//! Each field toggles one independently-specifiable consensus/policy
//! rule. Unlike Bitcoin Core's bitmask `unsigned int`, this crate has
//! no wire-format obligation to match the bit layout, so flags are a
//! plain struct — easier to construct, easier to `match`/destructure
//! in tests.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerifyFlags {
    /// Enables P2SH re-evaluation and the push-only rule during it.
    pub p2sh: bool,
    /// Require strict DER + defined hashtype signature encoding.
    pub strictenc: bool,
    /// Require strict DER signature encoding (subset of `strictenc`).
    pub dersig: bool,
    /// Require canonical (low) S values.
    pub low_s: bool,
    /// Require minimal push and minimal script-number encoding.
    pub minimaldata: bool,
    /// Reject unallocated NOPs instead of treating them as no-ops.
    pub discourage_upgradable_nops: bool,
    /// Enable OP_CHECKLOCKTIMEVERIFY; otherwise it behaves as a NOP.
    pub checklocktimeverify: bool,
    /// Require the OP_CHECKMULTISIG dummy element to be empty.
    pub nulldummy: bool,
    /// Enable OP_CAT/OP_SPLIT/OP_AND/OP_OR/OP_XOR/OP_DIV/OP_MOD/
    /// OP_NUM2BIN/OP_BIN2NUM.
    pub monolith_opcodes: bool,
    /// Require exactly one element left on the stack after a
    /// successful non-P2SH-redeem evaluation.
    pub cleanstack: bool,
}

impl VerifyFlags {
    pub fn none() -> Self {
        Self::default()
    }

    /// Just the P2SH rule, nothing else.
    pub fn p2sh_only() -> Self {
        VerifyFlags {
            p2sh: true,
            ..Default::default()
        }
    }

    /// A representative "everything sane is on" preset, mirroring the
    /// shape of Bitcoin Core's `STANDARD_SCRIPT_VERIFY_FLAGS`.
    pub fn standard() -> Self {
        VerifyFlags {
            p2sh: true,
            strictenc: true,
            dersig: true,
            low_s: true,
            minimaldata: true,
            discourage_upgradable_nops: true,
            checklocktimeverify: true,
            nulldummy: true,
            monolith_opcodes: false,
            cleanstack: true,
        }
    }

    pub fn requires_strict_signature_encoding(self) -> bool {
        self.strictenc || self.dersig || self.low_s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_disables_everything() {
        let flags = VerifyFlags::none();
        assert!(!flags.p2sh && !flags.strictenc && !flags.cleanstack);
    }

    #[test]
    fn standard_implies_strict_signature_encoding() {
        assert!(VerifyFlags::standard().requires_strict_signature_encoding());
    }
}
