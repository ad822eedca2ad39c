//! Top-level script verifier: chains scriptSig and scriptPubKey
//! evaluation and handles the P2SH redeem-script re-evaluation.

use super::chunk::Script;
use super::flags::VerifyFlags;
use super::interpreter::{eval_script, SignatureChecker, Stack};
use super::num::cast_to_bool;
use crate::error::{Error, Result};

/// Bitcoin's `VerifyScript`. `script_sig` and `script_pubkey` are the
/// raw bytes of the spending input and the output it spends; `checker`
/// supplies the signature/locktime math against whatever transaction
/// context the caller has (a real `TransactionSignatureChecker`, or a
/// `NoopSignatureChecker` for template-only checks).
pub fn correctly_spends(
    script_sig: &[u8],
    script_pubkey: &[u8],
    flags: &VerifyFlags,
    checker: &dyn SignatureChecker,
) -> Result<()> {
    let mut stack: Stack = Vec::new();
    eval_script(&mut stack, script_sig, flags, checker)?;

    let stack_copy = if flags.p2sh { Some(stack.clone()) } else { None };

    let success = eval_script(&mut stack, script_pubkey, flags, checker)?;
    if !success || stack.is_empty() || !cast_to_bool(stack.last().unwrap()) {
        return Err(Error::EvalFalse);
    }

    if flags.p2sh && Script::new(script_pubkey).is_pay_to_script_hash() {
        if !Script::new(script_sig).is_push_only() {
            return Err(Error::SigPushOnly);
        }

        let mut stack = stack_copy.expect("p2sh flag implies stack_copy was taken");

        let redeem_script = stack.pop().ok_or(Error::InvalidStackOperation)?;

        let redeem_success = eval_script(&mut stack, &redeem_script, flags, checker)?;
        if !redeem_success || stack.is_empty() || !cast_to_bool(stack.last().unwrap()) {
            return Err(Error::EvalFalse);
        }

        // CLEANSTACK does not apply here: it only governs the non-P2SH-
        // redeem path (step 7). A caller composing CLEANSTACK with P2SH
        // is expected to check the redeem script's own final stack itself.
        return Ok(());
    }

    if flags.cleanstack && stack.len() != 1 {
        return Err(Error::CleanStack);
    }

    Ok(())
}
