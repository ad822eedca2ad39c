//! Consensus-critical Bitcoin (BSV-family) transaction script
//! validation: opcode interpreter, SIGHASH digest construction, and
//! the top-level `correctly_spends` verifier.
//!
//! This crate validates scripts against a caller-supplied transaction
//! view; it does not itself know how to fetch a previous output's
//! value or build a transaction. Logging goes through the `log` facade
//! — wire up `env_logger` or any other subscriber in the binary that
//! embeds this crate.

pub mod crypto;
pub mod error;
pub mod script;
pub mod serialize;
pub mod transaction;

pub use error::{Error, Result};
pub use script::{correctly_spends, eval_script, SignatureChecker, VerifyFlags};
pub use transaction::Transaction;
