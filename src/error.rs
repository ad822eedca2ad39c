//! Script evaluation errors.
//!
//! Every fallible operation in this crate — numeric decoding, signature
//! decoding, SIGHASH digest construction, opcode dispatch, and the
//! top-level verifier — returns `Result<T, Error>`. Evaluation is
//! single-shot: the first `Error` returned by any opcode handler aborts
//! the whole `eval_script`/`correctly_spends` call, it is never caught
//! and retried within interpretation.

use thiserror::Error;

/// One of Bitcoin's well-known `SCRIPT_ERR_*` codes.
///
/// Test vectors assert on these variants, not on the `Display` message,
/// so keep the discriminants stable and prefer unit/tuple variants over
/// a single `Other(String)` catch-all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("script is larger than the maximum allowed size")]
    ScriptSize,

    #[error("push exceeds the maximum allowed element size")]
    PushSize,

    #[error("non-push opcode count exceeds the limit")]
    OpCount,

    #[error("combined stack size exceeds the limit")]
    StackSize,

    #[error("attempt to use a disabled opcode")]
    DisabledOpcode,

    #[error("data push is not minimally encoded")]
    Minimaldata,

    #[error("bad opcode")]
    BadOpcode,

    #[error("unbalanced conditional at end of script")]
    UnbalancedConditional,

    #[error("invalid stack operation")]
    InvalidStackOperation,

    #[error("invalid altstack operation")]
    InvalidAltstackOperation,

    #[error("OP_VERIFY failed")]
    Verify,

    #[error("OP_EQUALVERIFY failed")]
    EqualVerify,

    #[error("OP_NUMEQUALVERIFY failed")]
    NumEqualVerify,

    #[error("OP_CHECKSIGVERIFY failed")]
    CheckSigVerify,

    #[error("OP_CHECKMULTISIGVERIFY failed")]
    CheckMultisigVerify,

    #[error("final stack is not clean")]
    CleanStack,

    #[error("script evaluated to false")]
    EvalFalse,

    #[error("OP_RETURN encountered")]
    ReturnOpcode,

    #[error("locktime operand is negative")]
    NegativeLocktime,

    #[error("locktime requirement not satisfied")]
    UnsatisfiedLocktime,

    #[error("upgradable NOP used while discouraged")]
    DiscourageUpgradableNops,

    #[error("invalid signature DER encoding")]
    SignatureDer,

    #[error("signature S value is not low")]
    SignatureHighS,

    #[error("invalid signature hash type")]
    SignatureHashtype,

    #[error("invalid public key encoding")]
    PubkeyType,

    #[error("scriptSig is not push-only")]
    SigPushOnly,

    #[error("multisig dummy element must be empty")]
    NullDummy,

    #[error("{0}")]
    UnknownError(&'static str),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Precondition violations by the caller rather than by the script or
/// transaction bytes being validated (e.g. invoking a signature opcode
/// with no transaction context). These are programmer errors, not
/// consensus-relevant script failures, so they panic rather than
/// return an `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal interpreter state: {0}")]
pub struct IllegalState(pub &'static str);
