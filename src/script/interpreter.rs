//! Opcode dispatcher: the stack-based bytecode interpreter.
//!
//! `eval_script` runs one script (scriptSig, scriptPubKey, or a P2SH
//! redeem script) against a main stack that the caller owns and may
//! carry over between calls — the verifier (`super::verify`) is what
//! actually chains scriptSig into scriptPubKey and snapshots the stack
//! for a possible P2SH re-run.

use super::chunk::{check_minimal_push, Instruction, Script};
use super::flags::VerifyFlags;
use super::num::{cast_to_bool, Num};
use super::opcode::Opcode;
use super::signature;
use super::sighash;
use crate::error::{Error, Result};
use crate::transaction::{Transaction, LOCKTIME_THRESHOLD_BIG};

pub const MAX_SCRIPT_SIZE: usize = 10_000;
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;
pub const MAX_OPS_PER_SCRIPT: usize = 201;
pub const MAX_STACK_SIZE: usize = 1000;
pub const MAX_PUBKEYS_PER_MULTISIG: i64 = 20;

pub type Stack = Vec<Vec<u8>>;

/// Verifies the raw cryptographic half of a signature check.
///
/// Encoding-gate failures (bad DER shape, high S, undefined hashtype,
/// invalid pubkey type) are enforced by the dispatcher itself before a
/// checker is ever consulted — by the time `check_sig` runs, `signature`
/// and `pubkey` already satisfy whatever encoding flags were required.
/// A checker only reports whether the signature verifies, trapping its
/// own internal failures (bad DER the encoding gate didn't catch, an
/// unparseable pubkey, a sighash that can't be computed) to `false`
/// rather than propagating them — Bitcoin relies on this to let
/// partially-signed scripts evaluate without aborting.
pub trait SignatureChecker {
    fn check_sig(&self, signature: &[u8], pubkey: &[u8], script_code: &[u8]) -> bool;
    fn check_lock_time(&self, lock_time: i64) -> bool;
}

/// Always fails. Useful for contexts with no real transaction (fee
/// estimation, script template recognition) that still need to drive
/// `eval_script` to see whether it's push-only, balanced, etc.
pub struct NoopSignatureChecker;

impl SignatureChecker for NoopSignatureChecker {
    fn check_sig(&self, _signature: &[u8], _pubkey: &[u8], _script_code: &[u8]) -> bool {
        false
    }

    fn check_lock_time(&self, _lock_time: i64) -> bool {
        false
    }
}

/// Checks signatures against one input of a real transaction.
///
/// Takes a defensive serialize/deserialize clone of `transaction` at
/// construction time, so a caller mutating its own `Transaction` after
/// building the checker cannot be observed mid-evaluation.
pub struct TransactionSignatureChecker {
    pub transaction: Transaction,
    pub input_index: usize,
    pub input_value: i64,
}

impl TransactionSignatureChecker {
    /// Panics (an [`crate::error::IllegalState`]-class fault, not a
    /// script evaluation error) if `input_index` names no input of
    /// `transaction` — invoking a signature opcode with no valid
    /// transaction context is a caller precondition violation, not
    /// something a malicious script can trigger.
    pub fn new(transaction: &Transaction, input_index: usize, input_value: i64) -> Self {
        if input_index >= transaction.inputs.len() {
            panic!(
                "{}",
                crate::error::IllegalState("input_index out of range for transaction")
            );
        }
        TransactionSignatureChecker {
            transaction: transaction.defensive_clone(),
            input_index,
            input_value,
        }
    }
}

impl SignatureChecker for TransactionSignatureChecker {
    fn check_sig(&self, signature: &[u8], pubkey: &[u8], script_code: &[u8]) -> bool {
        if signature.is_empty() {
            return false;
        }

        let raw_sighash = signature[signature.len() - 1];
        let der = &signature[..signature.len() - 1];
        let cleaned = sighash::find_and_delete(script_code, signature);

        let digest = match sighash::signature_hash(
            &self.transaction,
            self.input_index,
            &cleaned,
            self.input_value,
            raw_sighash,
        ) {
            Ok(digest) => digest,
            Err(error) => {
                log::debug!("sighash computation failed: {error}");
                return false;
            }
        };

        let sig = match secp256k1::ecdsa::Signature::from_der(der) {
            Ok(sig) => sig,
            Err(_) => {
                log::debug!("signature rejected by secp256k1 DER parser");
                return false;
            }
        };
        let pk = match secp256k1::PublicKey::from_slice(pubkey) {
            Ok(pk) => pk,
            Err(_) => return false,
        };
        let message = secp256k1::Message::from_digest(digest);

        let secp = secp256k1::Secp256k1::verification_only();
        secp.verify_ecdsa(&message, &sig, &pk).is_ok()
    }

    fn check_lock_time(&self, lock_time: i64) -> bool {
        let tx_lock_time = self.transaction.lock_time as i64;

        let same_side =
            (tx_lock_time < LOCKTIME_THRESHOLD_BIG) == (lock_time < LOCKTIME_THRESHOLD_BIG);
        if !same_side {
            return false;
        }
        if lock_time > tx_lock_time {
            return false;
        }
        if self.transaction.inputs[self.input_index].sequence == 0xffff_ffff {
            return false;
        }
        true
    }
}

fn pop(stack: &mut Stack) -> Result<Vec<u8>> {
    stack.pop().ok_or(Error::InvalidStackOperation)
}

fn pop_num(stack: &mut Stack, flags: &VerifyFlags, max_len: usize) -> Result<Num> {
    Num::from_slice(&pop(stack)?, flags.minimaldata, max_len)
}

fn pop_bool(stack: &mut Stack) -> Result<bool> {
    Ok(cast_to_bool(&pop(stack)?))
}

fn push_num(stack: &mut Stack, value: i64) {
    stack.push(Num::from(value).encode());
}

fn push_bool(stack: &mut Stack, value: bool) {
    stack.push(Num::from(value).encode());
}

/// Bitcoin ABC's `MinimallyEncode`: trims a byte vector to the shortest
/// sign-magnitude encoding of the same numeric value, without ever
/// materializing that value as a fixed-width integer. Needed for
/// `OP_BIN2NUM`, whose operand may be up to 520 bytes — far wider than
/// `Num`'s `i64` can safely hold via shift-based decoding.
fn minimally_encode(mut data: Vec<u8>) -> Vec<u8> {
    let Some(&last) = data.last() else {
        return data;
    };
    if last & 0x7f != 0 {
        return data;
    }
    if data.len() == 1 {
        return Vec::new();
    }
    if data[data.len() - 2] & 0x80 != 0 {
        return data;
    }

    let mut i = data.len() - 1;
    while i > 0 {
        if data[i - 1] != 0 {
            if data[i - 1] & 0x80 != 0 {
                data[i] = last;
                i += 1;
            } else {
                data[i - 1] |= last;
            }
            data.truncate(i);
            return data;
        }
        i -= 1;
    }

    Vec::new()
}

fn verify_signature(
    checker: &dyn SignatureChecker,
    sig: &[u8],
    pubkey: &[u8],
    script_code: &[u8],
    flags: &VerifyFlags,
) -> Result<bool> {
    signature::check_signature_encoding(sig, flags)?;
    signature::check_pubkey_encoding(pubkey, flags)?;

    if sig.is_empty() {
        return Ok(false);
    }

    Ok(checker.check_sig(sig, pubkey, script_code))
}

/// Runs `script` against `stack`, mutating it in place. `stack` is not
/// reset at entry — callers chain scriptSig's final stack into
/// scriptPubKey's initial one, per the verifier contract.
pub fn eval_script(
    stack: &mut Stack,
    script: &[u8],
    flags: &VerifyFlags,
    checker: &dyn SignatureChecker,
) -> Result<bool> {
    if script.len() > MAX_SCRIPT_SIZE {
        return Err(Error::ScriptSize);
    }

    let mut altstack: Stack = Vec::new();
    let mut if_stack: Vec<bool> = Vec::new();
    let mut op_count = 0usize;
    let mut last_code_separator = 0usize;

    let parsed = Script::new(script);
    let mut iter = parsed.iter();

    while let Some(instruction) = iter.next() {
        let instruction = instruction?;
        let exec = if_stack.iter().all(|&b| b);

        match instruction {
            Instruction::PushValue(_, data) => {
                if data.len() > MAX_SCRIPT_ELEMENT_SIZE {
                    return Err(Error::PushSize);
                }
                if exec {
                    stack.push(data);
                }
            }
            Instruction::PushBytes(opcode_byte, data) => {
                if data.len() > MAX_SCRIPT_ELEMENT_SIZE {
                    return Err(Error::PushSize);
                }
                if exec {
                    if flags.minimaldata && !check_minimal_push(data, opcode_byte) {
                        return Err(Error::Minimaldata);
                    }
                    stack.push(data.to_vec());
                }
            }
            Instruction::Normal(opcode) => {
                log::trace!("dispatch {opcode:?} exec={exec} offset={}", iter.position());

                if opcode.is_always_disabled()
                    || (opcode.is_monolith_gated() && !flags.monolith_opcodes)
                {
                    return Err(Error::DisabledOpcode);
                }

                // OP_VERIF/OP_VERNOTIF are invalid wherever they appear,
                // including inside a branch that never runs — they sit
                // inside the OP_IF..OP_ENDIF range that always gets
                // inspected regardless of the conditional stack.
                if matches!(opcode, Opcode::OP_VERIF | Opcode::OP_VERNOTIF) {
                    return Err(Error::BadOpcode);
                }

                if opcode as u8 > Opcode::OP_16 as u8 {
                    op_count += 1;
                    if op_count > MAX_OPS_PER_SCRIPT {
                        return Err(Error::OpCount);
                    }
                }

                match opcode {
                    Opcode::OP_IF | Opcode::OP_NOTIF => {
                        let value = if exec {
                            let value = pop_bool(stack)?;
                            if opcode == Opcode::OP_NOTIF {
                                !value
                            } else {
                                value
                            }
                        } else {
                            false
                        };
                        if_stack.push(value);
                    }
                    Opcode::OP_ELSE => {
                        let top = if_stack.last_mut().ok_or(Error::UnbalancedConditional)?;
                        *top = !*top;
                    }
                    Opcode::OP_ENDIF => {
                        if_stack.pop().ok_or(Error::UnbalancedConditional)?;
                    }
                    _ if !exec => {}
                    _ => dispatch(
                        opcode,
                        stack,
                        &mut altstack,
                        flags,
                        checker,
                        script,
                        &mut last_code_separator,
                        iter.position(),
                        &mut op_count,
                    )?,
                }
            }
        }

        if stack.len() + altstack.len() > MAX_STACK_SIZE {
            return Err(Error::StackSize);
        }
    }

    if !if_stack.is_empty() {
        return Err(Error::UnbalancedConditional);
    }

    Ok(!stack.is_empty() && cast_to_bool(stack.last().unwrap()))
}

#[allow(clippy::too_many_arguments)]
fn dispatch(
    opcode: Opcode,
    stack: &mut Stack,
    altstack: &mut Stack,
    flags: &VerifyFlags,
    checker: &dyn SignatureChecker,
    script: &[u8],
    last_code_separator: &mut usize,
    position_after_opcode: usize,
    op_count: &mut usize,
) -> Result<()> {
    use Opcode::*;

    match opcode {
        OP_NOP => {}

        OP_TOALTSTACK => {
            let value = pop(stack)?;
            altstack.push(value);
        }
        OP_FROMALTSTACK => {
            let value = altstack.pop().ok_or(Error::InvalidAltstackOperation)?;
            stack.push(value);
        }
        OP_2DROP => {
            pop(stack)?;
            pop(stack)?;
        }
        OP_2DUP => {
            if stack.len() < 2 {
                return Err(Error::InvalidStackOperation);
            }
            let len = stack.len();
            stack.push(stack[len - 2].clone());
            stack.push(stack[len - 1].clone());
        }
        OP_3DUP => {
            if stack.len() < 3 {
                return Err(Error::InvalidStackOperation);
            }
            let len = stack.len();
            stack.push(stack[len - 3].clone());
            stack.push(stack[len - 2].clone());
            stack.push(stack[len - 1].clone());
        }
        OP_2OVER => {
            if stack.len() < 4 {
                return Err(Error::InvalidStackOperation);
            }
            let len = stack.len();
            stack.push(stack[len - 4].clone());
            stack.push(stack[len - 3].clone());
        }
        OP_2ROT => {
            if stack.len() < 6 {
                return Err(Error::InvalidStackOperation);
            }
            let len = stack.len();
            let pair: Vec<_> = stack.drain(len - 6..len - 4).collect();
            stack.extend(pair);
        }
        OP_2SWAP => {
            if stack.len() < 4 {
                return Err(Error::InvalidStackOperation);
            }
            let len = stack.len();
            stack.swap(len - 4, len - 2);
            stack.swap(len - 3, len - 1);
        }
        OP_IFDUP => {
            let top = stack.last().ok_or(Error::InvalidStackOperation)?.clone();
            if cast_to_bool(&top) {
                stack.push(top);
            }
        }
        OP_DEPTH => push_num(stack, stack.len() as i64),
        OP_DROP => {
            pop(stack)?;
        }
        OP_DUP => {
            let top = stack.last().ok_or(Error::InvalidStackOperation)?.clone();
            stack.push(top);
        }
        OP_NIP => {
            if stack.len() < 2 {
                return Err(Error::InvalidStackOperation);
            }
            let len = stack.len();
            stack.remove(len - 2);
        }
        OP_OVER => {
            if stack.len() < 2 {
                return Err(Error::InvalidStackOperation);
            }
            let len = stack.len();
            stack.push(stack[len - 2].clone());
        }
        OP_PICK | OP_ROLL => {
            let n = pop_num(stack, flags, 4)?.value();
            if n < 0 || n as usize >= stack.len() {
                return Err(Error::InvalidStackOperation);
            }
            let idx = stack.len() - 1 - n as usize;
            if opcode == OP_PICK {
                let value = stack[idx].clone();
                stack.push(value);
            } else {
                let value = stack.remove(idx);
                stack.push(value);
            }
        }
        OP_ROT => {
            if stack.len() < 3 {
                return Err(Error::InvalidStackOperation);
            }
            let len = stack.len();
            stack[len - 3..].rotate_left(1);
        }
        OP_SWAP => {
            if stack.len() < 2 {
                return Err(Error::InvalidStackOperation);
            }
            let len = stack.len();
            stack.swap(len - 2, len - 1);
        }
        OP_TUCK => {
            if stack.len() < 2 {
                return Err(Error::InvalidStackOperation);
            }
            let len = stack.len();
            let top = stack[len - 1].clone();
            stack.insert(len - 2, top);
        }

        OP_CAT => {
            let b = pop(stack)?;
            let mut a = pop(stack)?;
            if a.len() + b.len() > MAX_SCRIPT_ELEMENT_SIZE {
                return Err(Error::PushSize);
            }
            a.extend_from_slice(&b);
            stack.push(a);
        }
        OP_SPLIT => {
            let n = pop_num(stack, flags, 4)?.value();
            let data = pop(stack)?;
            if n < 0 || n as usize > data.len() {
                return Err(Error::UnknownError("OP_SPLIT position out of range"));
            }
            let (left, right) = data.split_at(n as usize);
            stack.push(left.to_vec());
            stack.push(right.to_vec());
        }
        OP_AND | OP_OR | OP_XOR => {
            let b = pop(stack)?;
            let a = pop(stack)?;
            if a.len() != b.len() {
                return Err(Error::UnknownError("operands to bitwise op must be equal length"));
            }
            let result = a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| match opcode {
                    OP_AND => x & y,
                    OP_OR => x | y,
                    _ => x ^ y,
                })
                .collect();
            stack.push(result);
        }
        OP_NUM2BIN => {
            let size = pop_num(stack, flags, 4)?.value();
            if !(0..=MAX_SCRIPT_ELEMENT_SIZE as i64).contains(&size) {
                return Err(Error::PushSize);
            }
            let size = size as usize;
            let data = pop(stack)?;
            let mut encoded = minimally_encode(data);
            if encoded.len() > size {
                return Err(Error::UnknownError("number does not fit in requested size"));
            }
            if encoded.len() < size {
                let sign_byte = encoded.last().copied().unwrap_or(0) & 0x80;
                if let Some(last) = encoded.last_mut() {
                    *last &= 0x7f;
                }
                encoded.resize(size - 1, 0);
                encoded.push(sign_byte);
            }
            stack.push(encoded);
        }
        OP_BIN2NUM => {
            let data = pop(stack)?;
            let encoded = minimally_encode(data);
            if encoded.len() > 4 {
                return Err(Error::UnknownError("script number overflow"));
            }
            stack.push(encoded);
        }
        OP_SIZE => {
            let top = stack.last().ok_or(Error::InvalidStackOperation)?;
            push_num(stack, top.len() as i64);
        }

        OP_EQUAL => {
            let b = pop(stack)?;
            let a = pop(stack)?;
            push_bool(stack, a == b);
        }
        OP_EQUALVERIFY => {
            let b = pop(stack)?;
            let a = pop(stack)?;
            if a != b {
                return Err(Error::EqualVerify);
            }
        }
        OP_VERIFY => {
            if !pop_bool(stack)? {
                return Err(Error::Verify);
            }
        }
        OP_RETURN => return Err(Error::ReturnOpcode),

        OP_1ADD => {
            let n = pop_num(stack, flags, 4)?.value();
            push_num(stack, n + 1);
        }
        OP_1SUB => {
            let n = pop_num(stack, flags, 4)?.value();
            push_num(stack, n - 1);
        }
        OP_NEGATE => {
            let n = pop_num(stack, flags, 4)?.value();
            push_num(stack, -n);
        }
        OP_ABS => {
            let n = pop_num(stack, flags, 4)?.value();
            push_num(stack, n.abs());
        }
        OP_NOT => {
            let n = pop_num(stack, flags, 4)?.value();
            push_bool(stack, n == 0);
        }
        OP_0NOTEQUAL => {
            let n = pop_num(stack, flags, 4)?.value();
            push_bool(stack, n != 0);
        }
        OP_ADD => {
            let b = pop_num(stack, flags, 4)?.value();
            let a = pop_num(stack, flags, 4)?.value();
            push_num(stack, a + b);
        }
        OP_SUB => {
            let b = pop_num(stack, flags, 4)?.value();
            let a = pop_num(stack, flags, 4)?.value();
            push_num(stack, a - b);
        }
        OP_DIV => {
            let b = pop_num(stack, flags, 4)?.value();
            let a = pop_num(stack, flags, 4)?.value();
            if b == 0 {
                return Err(Error::UnknownError("division by zero"));
            }
            push_num(stack, a / b);
        }
        OP_MOD => {
            let b = pop_num(stack, flags, 4)?.value();
            let a = pop_num(stack, flags, 4)?.value();
            if b == 0 {
                return Err(Error::UnknownError("division by zero"));
            }
            push_num(stack, a % b);
        }
        OP_BOOLAND => {
            let b = pop_num(stack, flags, 4)?.value();
            let a = pop_num(stack, flags, 4)?.value();
            push_bool(stack, a != 0 && b != 0);
        }
        OP_BOOLOR => {
            let b = pop_num(stack, flags, 4)?.value();
            let a = pop_num(stack, flags, 4)?.value();
            push_bool(stack, a != 0 || b != 0);
        }
        OP_NUMEQUAL => {
            let b = pop_num(stack, flags, 4)?.value();
            let a = pop_num(stack, flags, 4)?.value();
            push_bool(stack, a == b);
        }
        OP_NUMEQUALVERIFY => {
            let b = pop_num(stack, flags, 4)?.value();
            let a = pop_num(stack, flags, 4)?.value();
            if a != b {
                return Err(Error::NumEqualVerify);
            }
        }
        OP_NUMNOTEQUAL => {
            let b = pop_num(stack, flags, 4)?.value();
            let a = pop_num(stack, flags, 4)?.value();
            push_bool(stack, a != b);
        }
        OP_LESSTHAN => {
            let b = pop_num(stack, flags, 4)?.value();
            let a = pop_num(stack, flags, 4)?.value();
            push_bool(stack, a < b);
        }
        OP_GREATERTHAN => {
            let b = pop_num(stack, flags, 4)?.value();
            let a = pop_num(stack, flags, 4)?.value();
            push_bool(stack, a > b);
        }
        OP_LESSTHANOREQUAL => {
            let b = pop_num(stack, flags, 4)?.value();
            let a = pop_num(stack, flags, 4)?.value();
            push_bool(stack, a <= b);
        }
        OP_GREATERTHANOREQUAL => {
            let b = pop_num(stack, flags, 4)?.value();
            let a = pop_num(stack, flags, 4)?.value();
            push_bool(stack, a >= b);
        }
        OP_MIN => {
            let b = pop_num(stack, flags, 4)?.value();
            let a = pop_num(stack, flags, 4)?.value();
            push_num(stack, a.min(b));
        }
        OP_MAX => {
            let b = pop_num(stack, flags, 4)?.value();
            let a = pop_num(stack, flags, 4)?.value();
            push_num(stack, a.max(b));
        }
        OP_WITHIN => {
            let max = pop_num(stack, flags, 4)?.value();
            let min = pop_num(stack, flags, 4)?.value();
            let x = pop_num(stack, flags, 4)?.value();
            push_bool(stack, min <= x && x < max);
        }

        OP_RIPEMD160 => {
            let data = pop(stack)?;
            stack.push(crate::crypto::ripemd160(&data).to_vec());
        }
        OP_SHA1 => {
            let data = pop(stack)?;
            stack.push(crate::crypto::sha1(&data).to_vec());
        }
        OP_SHA256 => {
            let data = pop(stack)?;
            stack.push(crate::crypto::sha256(&data).to_vec());
        }
        OP_HASH160 => {
            let data = pop(stack)?;
            stack.push(crate::crypto::hash160(&data).to_vec());
        }
        OP_HASH256 => {
            let data = pop(stack)?;
            stack.push(crate::crypto::sha256d(&data).to_vec());
        }

        OP_CODESEPARATOR => {
            *last_code_separator = position_after_opcode;
        }

        OP_CHECKSIG | OP_CHECKSIGVERIFY => {
            let pubkey = pop(stack)?;
            let sig = pop(stack)?;
            let script_code = &script[*last_code_separator..];
            let ok = verify_signature(checker, &sig, &pubkey, script_code, flags)?;
            if opcode == OP_CHECKSIGVERIFY {
                if !ok {
                    return Err(Error::CheckSigVerify);
                }
            } else {
                push_bool(stack, ok);
            }
        }
        OP_CHECKMULTISIG | OP_CHECKMULTISIGVERIFY => {
            let key_count = pop_num(stack, flags, 4)?.value();
            if !(0..=MAX_PUBKEYS_PER_MULTISIG).contains(&key_count) {
                return Err(Error::UnknownError("pubkey count out of range"));
            }
            *op_count += key_count as usize;
            if *op_count > MAX_OPS_PER_SCRIPT {
                return Err(Error::OpCount);
            }
            let mut pubkeys = Vec::with_capacity(key_count as usize);
            for _ in 0..key_count {
                pubkeys.push(pop(stack)?);
            }

            let sig_count = pop_num(stack, flags, 4)?.value();
            if sig_count < 0 || sig_count > key_count {
                return Err(Error::UnknownError("signature count out of range"));
            }
            let mut sigs = Vec::with_capacity(sig_count as usize);
            for _ in 0..sig_count {
                sigs.push(pop(stack)?);
            }

            let dummy = pop(stack)?;
            if flags.nulldummy && !dummy.is_empty() {
                return Err(Error::NullDummy);
            }

            let mut script_code = script[*last_code_separator..].to_vec();
            for sig in &sigs {
                script_code = sighash::find_and_delete(&script_code, sig);
            }

            let mut sig_index = 0usize;
            let mut key_index = 0usize;
            while sig_index < sigs.len() && key_index < pubkeys.len() {
                let remaining_sigs = sigs.len() - sig_index;
                let remaining_keys = pubkeys.len() - key_index;
                if remaining_keys < remaining_sigs {
                    break;
                }

                // Signatures were popped top-first, i.e. in reverse of
                // the order they were pushed (which is the order
                // OP_CHECKMULTISIG must verify them in); same for keys.
                let sig = &sigs[sigs.len() - 1 - sig_index];
                let key = &pubkeys[pubkeys.len() - 1 - key_index];
                if verify_signature(checker, sig, key, &script_code, flags)? {
                    sig_index += 1;
                }
                key_index += 1;
            }

            let ok = sig_index == sigs.len();
            if opcode == OP_CHECKMULTISIGVERIFY {
                if !ok {
                    return Err(Error::CheckMultisigVerify);
                }
            } else {
                push_bool(stack, ok);
            }
        }

        OP_CHECKLOCKTIMEVERIFY => {
            if !flags.checklocktimeverify {
                if flags.discourage_upgradable_nops {
                    return Err(Error::DiscourageUpgradableNops);
                }
                return Ok(());
            }

            let top = stack.last().ok_or(Error::InvalidStackOperation)?;
            let lock_time = Num::from_slice(top, flags.minimaldata, 5)?;
            if lock_time.is_negative() {
                return Err(Error::NegativeLocktime);
            }
            if !checker.check_lock_time(lock_time.value()) {
                return Err(Error::UnsatisfiedLocktime);
            }
        }

        OP_NOP1 | OP_NOP3 | OP_NOP4 | OP_NOP5 | OP_NOP6 | OP_NOP7 | OP_NOP8 | OP_NOP9
        | OP_NOP10 => {
            if flags.discourage_upgradable_nops {
                return Err(Error::DiscourageUpgradableNops);
            }
        }

        _ => return Err(Error::BadOpcode),
    }

    Ok(())
}
