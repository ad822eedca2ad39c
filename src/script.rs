//! Script parsing and evaluation.
//!
//! Layered bottom-up: `opcode`/`num` are the primitive vocabulary,
//! `chunk` turns bytes into instructions, `flags` configures which
//! consensus/policy rules apply, `signature`/`sighash` cover the
//! cryptographic side-channels `OP_CHECKSIG` needs, `interpreter` is
//! the dispatcher itself, and `verify` is the public entry point that
//! chains scriptSig/scriptPubKey/P2SH-redeem evaluation together.

pub mod chunk;
pub mod flags;
pub mod interpreter;
pub mod num;
pub mod opcode;
pub mod sighash;
pub mod signature;
pub mod verify;

pub use chunk::{Instruction, Script};
pub use flags::VerifyFlags;
pub use interpreter::{eval_script, NoopSignatureChecker, SignatureChecker, TransactionSignatureChecker};
pub use opcode::Opcode;
pub use verify::correctly_spends;
