//! SIGHASH digest construction.
//!
//! `OP_CHECKSIG`/`OP_CHECKMULTISIG` need the 32-byte message that the
//! signature actually commits to. Two layouts exist: the legacy
//! Bitcoin Core preimage (serialize a modified copy of the whole
//! transaction) and the BIP-143/UAHF "preimage v2" used when the
//! `FORKID` bit is set on the sighash byte, which hashes a small fixed
//! set of precomputed component hashes instead of the whole tx.

use crate::crypto::sha256d;
use crate::error::{Error, Result};
use crate::serialize::Stream;
use crate::transaction::{Transaction, TransactionOutput};

pub const SIGHASH_ALL: u8 = 0x01;
pub const SIGHASH_NONE: u8 = 0x02;
pub const SIGHASH_SINGLE: u8 = 0x03;
pub const SIGHASH_ANYONECANPAY: u8 = 0x80;
pub const SIGHASH_FORKID: u8 = 0x40;

/// Decomposed view of a raw sighash byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SighashType {
    pub base: u8,
    pub anyone_can_pay: bool,
    pub fork_id: bool,
}

impl SighashType {
    pub fn from_byte(byte: u8) -> Self {
        SighashType {
            base: byte & 0x1f,
            anyone_can_pay: byte & SIGHASH_ANYONECANPAY != 0,
            fork_id: byte & SIGHASH_FORKID != 0,
        }
    }

    pub fn is_none(self) -> bool {
        self.base == SIGHASH_NONE
    }

    pub fn is_single(self) -> bool {
        self.base == SIGHASH_SINGLE
    }
}

/// The sentinel digest returned for a legacy SIGHASH_SINGLE whose
/// input index has no corresponding output.
const SIGHASH_SINGLE_SENTINEL: [u8; 32] = {
    let mut bytes = [0u8; 32];
    bytes[0] = 1;
    bytes
};

/// Remove every embedded occurrence of `signature`'s push-encoded form
/// from `script`, as `OP_CHECKSIG`/`OP_CHECKMULTISIG` must before
/// hashing the connected script (`FindAndDelete`).
pub fn find_and_delete(script: &[u8], signature: &[u8]) -> Vec<u8> {
    if signature.is_empty() {
        return script.to_vec();
    }

    let mut needle = Vec::with_capacity(signature.len() + 5);
    push_data(&mut needle, signature);

    let mut result = Vec::with_capacity(script.len());
    let mut i = 0;
    while i < script.len() {
        if i + needle.len() <= script.len() && script[i..i + needle.len()] == needle[..] {
            i += needle.len();
        } else {
            result.push(script[i]);
            i += 1;
        }
    }
    result
}

fn push_data(out: &mut Vec<u8>, data: &[u8]) {
    match data.len() {
        0..=0x4b => out.push(data.len() as u8),
        0x4c..=0xff => {
            out.push(0x4c);
            out.push(data.len() as u8);
        }
        0x100..=0xffff => {
            out.push(0x4d);
            out.extend_from_slice(&(data.len() as u16).to_le_bytes());
        }
        _ => {
            out.push(0x4e);
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        }
    }
    out.extend_from_slice(data);
}

/// Compute the 32-byte SIGHASH digest for input `index` of `tx`.
///
/// `script_code` is the connected script (from the last
/// `OP_CODESEPARATOR`, signature bytes already removed). `input_value`
/// is only used by the FORKID preimage. `raw_sighash` is the trailing
/// byte of the transaction signature, not yet decomposed.
pub fn signature_hash(
    tx: &Transaction,
    index: usize,
    script_code: &[u8],
    input_value: i64,
    raw_sighash: u8,
) -> Result<[u8; 32]> {
    if index >= tx.inputs.len() {
        return Err(Error::UnknownError("sighash input index out of range"));
    }

    let sighash_type = SighashType::from_byte(raw_sighash);

    if sighash_type.fork_id {
        Ok(forkid_signature_hash(tx, index, script_code, input_value, raw_sighash))
    } else {
        Ok(legacy_signature_hash(tx, index, script_code, raw_sighash))
    }
}

fn legacy_signature_hash(tx: &Transaction, index: usize, script_code: &[u8], raw_sighash: u8) -> [u8; 32] {
    let sighash_type = SighashType::from_byte(raw_sighash);

    if sighash_type.is_single() && index >= tx.outputs.len() {
        return SIGHASH_SINGLE_SENTINEL;
    }

    let mut working = tx.clone();

    for (i, input) in working.inputs.iter_mut().enumerate() {
        input.script_sig = if i == index { script_code.to_vec() } else { Vec::new() };
    }

    if sighash_type.is_none() {
        working.outputs.clear();
        for (i, input) in working.inputs.iter_mut().enumerate() {
            if i != index {
                input.sequence = 0;
            }
        }
    } else if sighash_type.is_single() {
        working.outputs.truncate(index + 1);
        for output in working.outputs.iter_mut().take(index) {
            *output = TransactionOutput {
                value: -1,
                script_pubkey: Vec::new(),
            };
        }
        for (i, input) in working.inputs.iter_mut().enumerate() {
            if i != index {
                input.sequence = 0;
            }
        }
    }

    if sighash_type.anyone_can_pay {
        let spender = working.inputs[index].clone();
        working.inputs = vec![spender];
    }

    let mut bytes = working.serialize();
    bytes.extend_from_slice(&(raw_sighash as u32).to_le_bytes());
    sha256d(&bytes)
}

fn forkid_signature_hash(
    tx: &Transaction,
    index: usize,
    script_code: &[u8],
    input_value: i64,
    raw_sighash: u8,
) -> [u8; 32] {
    let sighash_type = SighashType::from_byte(raw_sighash);

    let hash_prevouts = if !sighash_type.anyone_can_pay {
        hash_prevouts(tx)
    } else {
        [0u8; 32]
    };

    let hash_sequence = if !sighash_type.anyone_can_pay && !sighash_type.is_single() && !sighash_type.is_none() {
        hash_sequence(tx)
    } else {
        [0u8; 32]
    };

    let hash_outputs = if !sighash_type.is_single() && !sighash_type.is_none() {
        hash_outputs(tx)
    } else if sighash_type.is_single() && index < tx.outputs.len() {
        let mut stream = Stream::new();
        append_output(&mut stream, &tx.outputs[index]);
        sha256d(&stream.into_bytes())
    } else {
        [0u8; 32]
    };

    let input = &tx.inputs[index];

    let mut stream = Stream::new();
    stream.append_u32(tx.version);
    stream.append_bytes(&hash_prevouts);
    stream.append_bytes(&hash_sequence);
    stream.append_bytes(&input.previous_output.txid);
    stream.append_u32(input.previous_output.index);
    stream.append_compact_size(script_code.len() as u64);
    stream.append_bytes(script_code);
    stream.append_i64(input_value);
    stream.append_u32(input.sequence);
    stream.append_bytes(&hash_outputs);
    stream.append_u32(tx.lock_time);
    stream.append_u32(raw_sighash as u32);

    sha256d(&stream.into_bytes())
}

fn hash_prevouts(tx: &Transaction) -> [u8; 32] {
    let mut stream = Stream::new();
    for input in &tx.inputs {
        stream.append_bytes(&input.previous_output.txid);
        stream.append_u32(input.previous_output.index);
    }
    sha256d(&stream.into_bytes())
}

fn hash_sequence(tx: &Transaction) -> [u8; 32] {
    let mut stream = Stream::new();
    for input in &tx.inputs {
        stream.append_u32(input.sequence);
    }
    sha256d(&stream.into_bytes())
}

fn hash_outputs(tx: &Transaction) -> [u8; 32] {
    let mut stream = Stream::new();
    for output in &tx.outputs {
        append_output(&mut stream, output);
    }
    sha256d(&stream.into_bytes())
}

fn append_output(stream: &mut Stream, output: &TransactionOutput) {
    stream.append_i64(output.value);
    stream.append_compact_size(output.script_pubkey.len() as u64);
    stream.append_bytes(&output.script_pubkey);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{OutPoint, TransactionInput};

    fn sample_tx() -> Transaction {
        Transaction {
            version: 1,
            inputs: vec![TransactionInput {
                previous_output: OutPoint {
                    txid: [0x22; 32],
                    index: 0,
                },
                script_sig: Vec::new(),
                sequence: 0xffff_ffff,
            }],
            outputs: vec![TransactionOutput {
                value: 1000,
                script_pubkey: vec![0x76, 0xa9, 0x14],
            }],
            lock_time: 0,
        }
    }

    #[test]
    fn legacy_sighash_is_deterministic() {
        let tx = sample_tx();
        let script_code = vec![0x76, 0xa9];
        let a = signature_hash(&tx, 0, &script_code, 0, SIGHASH_ALL).unwrap();
        let b = signature_hash(&tx, 0, &script_code, 0, SIGHASH_ALL).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn forkid_and_legacy_digests_differ() {
        let tx = sample_tx();
        let script_code = vec![0x76, 0xa9];
        let legacy = signature_hash(&tx, 0, &script_code, 1000, SIGHASH_ALL).unwrap();
        let forkid = signature_hash(&tx, 0, &script_code, 1000, SIGHASH_ALL | SIGHASH_FORKID).unwrap();
        assert_ne!(legacy, forkid);
    }

    #[test]
    fn single_with_missing_output_returns_sentinel() {
        let mut tx = sample_tx();
        tx.inputs.push(TransactionInput {
            previous_output: OutPoint { txid: [1; 32], index: 1 },
            script_sig: Vec::new(),
            sequence: 0xffff_ffff,
        });
        let script_code = vec![0x76];
        // input index 1, but only one output exists.
        let digest = signature_hash(&tx, 1, &script_code, 0, SIGHASH_SINGLE).unwrap();
        assert_eq!(digest, SIGHASH_SINGLE_SENTINEL);
    }

    #[test]
    fn find_and_delete_removes_embedded_push() {
        const OP_DUP: u8 = 0x76;
        let sig = vec![0xaa; 10];
        let mut needle = Vec::new();
        push_data(&mut needle, &sig);
        let mut script = vec![OP_DUP];
        script.extend_from_slice(&needle);
        script.push(OP_DUP);
        let cleaned = find_and_delete(&script, &sig);
        assert_eq!(cleaned, vec![OP_DUP, OP_DUP]);
    }
}
