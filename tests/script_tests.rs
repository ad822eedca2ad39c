//! Integration tests driving whole scriptSig/scriptPubKey pairs through
//! `correctly_spends`, in the style of Bitcoin Core's
//! `script_tests.json`-derived suites: hex-ish script construction in,
//! flags in, expected outcome out.

use script::error::Error;
use script::script::interpreter::TransactionSignatureChecker;
use script::script::{sighash, Opcode};
use script::transaction::{OutPoint, Transaction, TransactionInput, TransactionOutput};
use script::{correctly_spends, crypto, VerifyFlags};

fn push(data: &[u8]) -> Vec<u8> {
    assert!(data.len() <= 75, "test helper only covers direct pushes");
    let mut out = vec![data.len() as u8];
    out.extend_from_slice(data);
    out
}

fn sample_tx(lock_time: u32) -> Transaction {
    Transaction {
        version: 1,
        inputs: vec![TransactionInput {
            previous_output: OutPoint { txid: [0x11; 32], index: 0 },
            script_sig: Vec::new(),
            sequence: 0xffff_ffff,
        }],
        outputs: vec![TransactionOutput {
            value: 4_000,
            script_pubkey: vec![0x6a],
        }],
        lock_time,
    }
}

fn p2pkh_script(h160: &[u8; 20]) -> Vec<u8> {
    let mut script = vec![Opcode::OP_DUP as u8, Opcode::OP_HASH160 as u8, 0x14];
    script.extend_from_slice(h160);
    script.push(Opcode::OP_EQUALVERIFY as u8);
    script.push(Opcode::OP_CHECKSIG as u8);
    script
}

// Scenario 1: P2PKH valid spend.
#[test]
fn p2pkh_valid_spend() {
    let secp = secp256k1::Secp256k1::new();
    let secret_key = secp256k1::SecretKey::from_slice(&[0x01; 32]).unwrap();
    let pubkey = secp256k1::PublicKey::from_secret_key(&secp, &secret_key);
    let pubkey_bytes = pubkey.serialize();
    let h160 = crypto::hash160(&pubkey_bytes);

    let script_pubkey = p2pkh_script(&h160);
    let tx = sample_tx(0);

    let digest = sighash::signature_hash(&tx, 0, &script_pubkey, 0, sighash::SIGHASH_ALL).unwrap();
    let sig = secp.sign_ecdsa(&secp256k1::Message::from_digest(digest), &secret_key);
    let mut sig_bytes = sig.serialize_der().to_vec();
    sig_bytes.push(sighash::SIGHASH_ALL);

    let mut script_sig = push(&sig_bytes);
    script_sig.extend_from_slice(&push(&pubkey_bytes));

    let flags = VerifyFlags {
        p2sh: true,
        strictenc: true,
        dersig: true,
        ..VerifyFlags::none()
    };
    let checker = TransactionSignatureChecker::new(&tx, 0, 0);
    assert!(correctly_spends(&script_sig, &script_pubkey, &flags, &checker).is_ok());
}

// Scenario 2: same spend, signature produced by an unrelated key.
#[test]
fn p2pkh_signature_from_wrong_key_is_eval_false() {
    let secp = secp256k1::Secp256k1::new();
    let secret_key = secp256k1::SecretKey::from_slice(&[0x01; 32]).unwrap();
    let pubkey = secp256k1::PublicKey::from_secret_key(&secp, &secret_key);
    let pubkey_bytes = pubkey.serialize();
    let h160 = crypto::hash160(&pubkey_bytes);
    let wrong_key = secp256k1::SecretKey::from_slice(&[0x02; 32]).unwrap();

    let script_pubkey = p2pkh_script(&h160);
    let tx = sample_tx(0);

    let digest = sighash::signature_hash(&tx, 0, &script_pubkey, 0, sighash::SIGHASH_ALL).unwrap();
    let sig = secp.sign_ecdsa(&secp256k1::Message::from_digest(digest), &wrong_key);
    let mut sig_bytes = sig.serialize_der().to_vec();
    sig_bytes.push(sighash::SIGHASH_ALL);

    let mut script_sig = push(&sig_bytes);
    script_sig.extend_from_slice(&push(&pubkey_bytes));

    let flags = VerifyFlags {
        p2sh: true,
        strictenc: true,
        dersig: true,
        ..VerifyFlags::none()
    };
    let checker = TransactionSignatureChecker::new(&tx, 0, 0);
    assert_eq!(
        correctly_spends(&script_sig, &script_pubkey, &flags, &checker),
        Err(Error::EvalFalse)
    );
}

// Scenario 3: OP_RETURN immediately.
#[test]
fn op_return_aborts_evaluation() {
    let tx = sample_tx(0);
    let checker = TransactionSignatureChecker::new(&tx, 0, 0);
    let script_pubkey = [Opcode::OP_RETURN as u8];
    let script_sig: [u8; 0] = [];
    assert_eq!(
        correctly_spends(&script_sig, &script_pubkey, &VerifyFlags::none(), &checker),
        Err(Error::ReturnOpcode)
    );
}

// Scenario 4: unbalanced conditional.
#[test]
fn unbalanced_conditional_fails() {
    let tx = sample_tx(0);
    let checker = TransactionSignatureChecker::new(&tx, 0, 0);
    let script_sig = push(&[0x01]);
    let script_pubkey = [Opcode::OP_IF as u8];
    assert_eq!(
        correctly_spends(&script_sig, &script_pubkey, &VerifyFlags::none(), &checker),
        Err(Error::UnbalancedConditional)
    );
}

// Scenario 5: disabled opcode reached only inside a dead branch.
#[test]
fn disabled_opcode_in_dead_branch_fails() {
    let tx = sample_tx(0);
    let checker = TransactionSignatureChecker::new(&tx, 0, 0);
    let script_sig: [u8; 0] = [];
    let script_pubkey = [
        Opcode::OP_0 as u8,
        Opcode::OP_IF as u8,
        Opcode::OP_MUL as u8,
        Opcode::OP_ENDIF as u8,
    ];
    assert_eq!(
        correctly_spends(&script_sig, &script_pubkey, &VerifyFlags::none(), &checker),
        Err(Error::DisabledOpcode)
    );
}

// Scenario 6: P2SH happy path.
#[test]
fn p2sh_happy_path() {
    let tx = sample_tx(0);
    let checker = TransactionSignatureChecker::new(&tx, 0, 0);

    let redeem_script = vec![Opcode::OP_1 as u8];
    let hash = crypto::hash160(&redeem_script);

    let script_sig = push(&redeem_script);
    let mut script_pubkey = vec![Opcode::OP_HASH160 as u8, 0x14];
    script_pubkey.extend_from_slice(&hash);
    script_pubkey.push(Opcode::OP_EQUAL as u8);

    let flags = VerifyFlags::p2sh_only();
    assert!(correctly_spends(&script_sig, &script_pubkey, &flags, &checker).is_ok());
}

// Scenario 7: CLTV unsatisfied.
#[test]
fn cltv_unsatisfied_locktime() {
    let tx = sample_tx(100);
    let checker = TransactionSignatureChecker::new(&tx, 0, 0);

    let mut script_pubkey = push(&[0xf4, 0x01]); // 500, little-endian sign-magnitude
    script_pubkey.push(Opcode::OP_CHECKLOCKTIMEVERIFY as u8);
    script_pubkey.push(Opcode::OP_DROP as u8);

    let mut flags = VerifyFlags::none();
    flags.checklocktimeverify = true;

    let script_sig: [u8; 0] = [];
    assert_eq!(
        correctly_spends(&script_sig, &script_pubkey, &flags, &checker),
        Err(Error::UnsatisfiedLocktime)
    );
}

// A handful of additional Script test-vector-style cases.

#[test]
fn checkmultisig_2_of_3_with_correct_signatures() {
    let secp = secp256k1::Secp256k1::new();
    let keys: Vec<_> = (1u8..=3)
        .map(|i| secp256k1::SecretKey::from_slice(&[i; 32]).unwrap())
        .collect();
    let pubkeys: Vec<_> = keys
        .iter()
        .map(|k| secp256k1::PublicKey::from_secret_key(&secp, k).serialize())
        .collect();

    let mut script_pubkey = vec![Opcode::OP_2 as u8];
    for pk in &pubkeys {
        script_pubkey.extend_from_slice(&push(pk));
    }
    script_pubkey.push(Opcode::OP_3 as u8);
    script_pubkey.push(Opcode::OP_CHECKMULTISIG as u8);

    let tx = sample_tx(0);
    let digest = sighash::signature_hash(&tx, 0, &script_pubkey, 0, sighash::SIGHASH_ALL).unwrap();
    let message = secp256k1::Message::from_digest(digest);

    // Sign with keys 0 and 1, in pushed order (matching pubkey order).
    let mut script_sig = push(&[]); // multisig off-by-one dummy element
    for key in &keys[0..2] {
        let sig = secp.sign_ecdsa(&message, key);
        let mut sig_bytes = sig.serialize_der().to_vec();
        sig_bytes.push(sighash::SIGHASH_ALL);
        script_sig.extend_from_slice(&push(&sig_bytes));
    }

    let checker = TransactionSignatureChecker::new(&tx, 0, 0);
    let flags = VerifyFlags::none();
    assert!(correctly_spends(&script_sig, &script_pubkey, &flags, &checker).is_ok());
}

#[test]
fn script_exceeding_stack_limit_fails() {
    let tx = sample_tx(0);
    let checker = TransactionSignatureChecker::new(&tx, 0, 0);
    let mut script_pubkey = Vec::new();
    for _ in 0..1001 {
        script_pubkey.push(Opcode::OP_1 as u8);
    }
    assert_eq!(
        correctly_spends(&[], &script_pubkey, &VerifyFlags::none(), &checker),
        Err(Error::StackSize)
    );
}
