//! Owned transaction view.
//!
//! This is the "logically immutable transaction view" §3/§6 require
//! the verifier's caller to hand it. Segwit marker/flag/witness fields
//! are out of scope (§1 excludes "network serialization apart from
//! the transaction digest input needed by the signature opcodes") so
//! `serialize()` always emits the legacy layout.

use crate::serialize::{Reader, Stream};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutPoint {
    pub txid: [u8; 32],
    pub index: u32,
}

impl OutPoint {
    fn serialize(&self, stream: &mut Stream) {
        stream.append_bytes(&self.txid);
        stream.append_u32(self.index);
    }

    fn deserialize(reader: &mut Reader) -> io::Result<Self> {
        let txid: [u8; 32] = reader.read_bytes(32)?.try_into().unwrap();
        let index = reader.read_u32()?;
        Ok(OutPoint { txid, index })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionInput {
    pub previous_output: OutPoint,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

impl TransactionInput {
    fn serialize(&self, stream: &mut Stream) {
        self.previous_output.serialize(stream);
        stream.append_compact_size(self.script_sig.len() as u64);
        stream.append_bytes(&self.script_sig);
        stream.append_u32(self.sequence);
    }

    fn deserialize(reader: &mut Reader) -> io::Result<Self> {
        let previous_output = OutPoint::deserialize(reader)?;
        let len = reader.read_compact_size()? as usize;
        let script_sig = reader.read_bytes(len)?;
        let sequence = reader.read_u32()?;
        Ok(TransactionInput {
            previous_output,
            script_sig,
            sequence,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionOutput {
    pub value: i64,
    pub script_pubkey: Vec<u8>,
}

impl TransactionOutput {
    fn serialize(&self, stream: &mut Stream) {
        stream.append_i64(self.value);
        stream.append_compact_size(self.script_pubkey.len() as u64);
        stream.append_bytes(&self.script_pubkey);
    }

    fn deserialize(reader: &mut Reader) -> io::Result<Self> {
        let value = reader.read_i64()?;
        let len = reader.read_compact_size()? as usize;
        let script_pubkey = reader.read_bytes(len)?;
        Ok(TransactionOutput { value, script_pubkey })
    }
}

/// Separates block-height-based from unix-time-based locktimes/CLTV
/// operands.
pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;
pub const LOCKTIME_THRESHOLD_BIG: i64 = LOCKTIME_THRESHOLD as i64;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

impl Transaction {
    /// Legacy wire serialization (no witness marker/flag).
    pub fn serialize(&self) -> Vec<u8> {
        let mut stream = Stream::new();
        stream.append_u32(self.version);
        stream.append_compact_size(self.inputs.len() as u64);
        for input in &self.inputs {
            input.serialize(&mut stream);
        }
        stream.append_compact_size(self.outputs.len() as u64);
        for output in &self.outputs {
            output.serialize(&mut stream);
        }
        stream.append_u32(self.lock_time);
        stream.into_bytes()
    }

    pub fn deserialize(bytes: &[u8]) -> io::Result<Self> {
        let mut reader = Reader::new(bytes);
        let version = reader.read_u32()?;
        let input_count = reader.read_compact_size()? as usize;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            inputs.push(TransactionInput::deserialize(&mut reader)?);
        }
        let output_count = reader.read_compact_size()? as usize;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            outputs.push(TransactionOutput::deserialize(&mut reader)?);
        }
        let lock_time = reader.read_u32()?;
        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    /// Re-serialize and re-parse, producing an owned copy that cannot
    /// alias the caller's transaction. Used by the verifier (§4.5 step
    /// 1) so a pathological caller mutating its own `Transaction` after
    /// the call cannot be observed mid-evaluation.
    pub fn defensive_clone(&self) -> Self {
        Transaction::deserialize(&self.serialize())
            .expect("re-parsing our own serialization cannot fail")
    }
}
