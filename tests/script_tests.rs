//! Tests for script parsing and signature operation counting

use ledger_wire::opcodes::*;
use ledger_wire::*;

const P2PKH: &str = "76a91489abcdefabbaabbaabbaabbaabbaabbaabbaabba88ac";

fn strict(hex_script: &str) -> Script {
    Script::factory_from_data(&hex::decode(hex_script).unwrap(), false, ParseMode::Strict)
}

#[test]
fn test_p2pkh_operations() {
    let script = strict(P2PKH);
    assert!(script.is_valid());
    assert!(!script.is_raw_data());

    let opcodes: Vec<Option<u8>> = script.operations().iter().map(Operation::opcode).collect();
    assert_eq!(
        opcodes,
        vec![Some(OP_DUP), Some(OP_HASH160), Some(0x14), Some(OP_EQUALVERIFY), Some(OP_CHECKSIG)]
    );
    assert_eq!(script.operations()[2].data().len(), 20);
    assert_eq!(script.sigops(false), 1);
    assert_eq!(
        script.to_string(),
        "dup hash160 [89abcdefabbaabbaabbaabbaabbaabbaabbaabba] equalverify checksig"
    );
}

#[test]
fn test_strict_roundtrip_prefixed() {
    let body = hex::decode(P2PKH).unwrap();
    let mut data = vec![body.len() as u8];
    data.extend_from_slice(&body);

    let script = Script::factory_from_data(&data, true, ParseMode::Strict);
    assert!(script.is_valid());
    assert_eq!(script.serialized_size(true), data.len());
    assert_eq!(script.to_data(true), data);
    assert_eq!(script.to_data(false), body);
}

#[test]
fn test_raw_and_strict_agree_on_bytes() {
    let body = hex::decode(P2PKH).unwrap();
    let raw = Script::factory_from_data(&body, false, ParseMode::RawData);
    let parsed = strict(P2PKH);
    assert_eq!(raw.to_data(false), parsed.to_data(false));
    // Different operation lists, so not equal
    assert_ne!(raw, parsed);
}

#[test]
fn test_multisig_sigops() {
    // 2-of-3: OP_2 <33> <33> <33> OP_3 OP_CHECKMULTISIG
    let key = Operation::push(vec![0x02; 33]);
    let script = Script::from_operations(vec![
        Operation::Code(OP_1 + 1),
        key.clone(),
        key.clone(),
        key,
        Operation::Code(OP_1 + 2),
        Operation::Code(OP_CHECKMULTISIG),
    ]);
    assert_eq!(script.sigops(true), 3);
    assert_eq!(script.sigops(false), 20);

    let reparsed = Script::factory_from_data(&script.to_data(false), false, ParseMode::Strict);
    assert!(reparsed.is_valid());
    assert_eq!(reparsed, script);
    assert_eq!(reparsed.sigops(true), 3);
}

#[test]
fn test_sigops_accumulate() {
    let script = strict("acadaeaf");
    assert_eq!(script.sigops(false), 1 + 1 + 20 + 20);
    assert_eq!(script.sigops(true), 1 + 1 + 20 + 20);
}

#[test]
fn test_truncated_push_invalid() {
    // Declares 5 bytes, delivers 2
    let script = strict("76050102");
    assert!(!script.is_valid());
    assert_eq!(script.operations(), &[Operation::Code(OP_DUP)]);
}

#[test]
fn test_large_push_encoding() {
    let op = Operation::push(vec![0xaa; 300]);
    assert_eq!(op.opcode(), Some(OP_PUSHDATA2));
    let script = Script::from_operations(vec![op]);
    let data = script.to_data(false);
    assert_eq!(&data[..3], &[OP_PUSHDATA2, 0x2c, 0x01]);
    assert_eq!(script.serialized_size(false), 303);
    assert_eq!(Script::factory_from_data(&data, false, ParseMode::Strict), script);
}

#[test]
fn test_prefixed_varint_body() {
    let body = vec![OP_NOP; 300];
    let mut data = vec![0xfd, 0x2c, 0x01];
    data.extend_from_slice(&body);

    let script = Script::factory_from_data(&data, true, ParseMode::Strict);
    assert!(script.is_valid());
    assert_eq!(script.operations().len(), 300);
    assert_eq!(script.serialized_size(true), 303);
}

#[test]
fn test_to_stream() -> anyhow::Result<()> {
    let script = strict(P2PKH);
    let mut sink = Vec::new();
    script.to_stream(&mut sink, true)?;
    assert_eq!(sink, script.to_data(true));
    Ok(())
}
