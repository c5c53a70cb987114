//! Script opcode constants
//!
//! Only structural parsing and sigop counting happen in this crate, so the
//! table is limited to the opcodes the parser and the mnemonic renderer need.

// ============================================================================
// PUSH DATA OPCODES (0x00 - 0x4e)
// ============================================================================

/// OP_0 / OP_FALSE - Push empty array
pub const OP_0: u8 = 0x00;

/// Largest direct push: opcode value is the data length (1-75 bytes)
pub const OP_PUSHBYTES_75: u8 = 0x4b;

/// OP_PUSHDATA1 - Next byte is the data length
pub const OP_PUSHDATA1: u8 = 0x4c;

/// OP_PUSHDATA2 - Next 2 bytes (little-endian) are the data length
pub const OP_PUSHDATA2: u8 = 0x4d;

/// OP_PUSHDATA4 - Next 4 bytes (little-endian) are the data length
pub const OP_PUSHDATA4: u8 = 0x4e;

// ============================================================================
// PUSH VALUE OPCODES (0x4f - 0x60)
// ============================================================================

pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_RESERVED: u8 = 0x50;

/// OP_1 / OP_TRUE
pub const OP_1: u8 = 0x51;

/// OP_16
pub const OP_16: u8 = 0x60;

/// Base value for OP_1 through OP_16 (OP_N = OP_N_BASE + N)
pub const OP_N_BASE: u8 = 0x50;

// ============================================================================
// CONTROL AND STACK
// ============================================================================

pub const OP_NOP: u8 = 0x61;
pub const OP_IF: u8 = 0x63;
pub const OP_NOTIF: u8 = 0x64;
pub const OP_ELSE: u8 = 0x67;
pub const OP_ENDIF: u8 = 0x68;
pub const OP_VERIFY: u8 = 0x69;
pub const OP_RETURN: u8 = 0x6a;
pub const OP_DROP: u8 = 0x75;
pub const OP_DUP: u8 = 0x76;
pub const OP_SWAP: u8 = 0x7c;
pub const OP_SIZE: u8 = 0x82;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;

// ============================================================================
// CRYPTO
// ============================================================================

pub const OP_RIPEMD160: u8 = 0xa6;
pub const OP_SHA1: u8 = 0xa7;
pub const OP_SHA256: u8 = 0xa8;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_HASH256: u8 = 0xaa;
pub const OP_CODESEPARATOR: u8 = 0xab;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKSIGVERIFY: u8 = 0xad;
pub const OP_CHECKMULTISIG: u8 = 0xae;
pub const OP_CHECKMULTISIGVERIFY: u8 = 0xaf;

// ============================================================================
// LOCKTIME
// ============================================================================

pub const OP_CHECKLOCKTIMEVERIFY: u8 = 0xb1;
pub const OP_CHECKSEQUENCEVERIFY: u8 = 0xb2;

/// True for OP_1 through OP_16
pub fn is_small_positive(opcode: u8) -> bool {
    (OP_1..=OP_16).contains(&opcode)
}

/// Mnemonic for the opcodes above; `None` for anything else.
pub fn opcode_name(opcode: u8) -> Option<&'static str> {
    let name = match opcode {
        OP_0 => "zero",
        OP_PUSHDATA1 => "pushdata1",
        OP_PUSHDATA2 => "pushdata2",
        OP_PUSHDATA4 => "pushdata4",
        OP_1NEGATE => "-1",
        OP_RESERVED => "reserved",
        OP_NOP => "nop",
        OP_IF => "if",
        OP_NOTIF => "notif",
        OP_ELSE => "else",
        OP_ENDIF => "endif",
        OP_VERIFY => "verify",
        OP_RETURN => "return",
        OP_DROP => "drop",
        OP_DUP => "dup",
        OP_SWAP => "swap",
        OP_SIZE => "size",
        OP_EQUAL => "equal",
        OP_EQUALVERIFY => "equalverify",
        OP_RIPEMD160 => "ripemd160",
        OP_SHA1 => "sha1",
        OP_SHA256 => "sha256",
        OP_HASH160 => "hash160",
        OP_HASH256 => "hash256",
        OP_CODESEPARATOR => "codeseparator",
        OP_CHECKSIG => "checksig",
        OP_CHECKSIGVERIFY => "checksigverify",
        OP_CHECKMULTISIG => "checkmultisig",
        OP_CHECKMULTISIGVERIFY => "checkmultisigverify",
        OP_CHECKLOCKTIMEVERIFY => "checklocktimeverify",
        OP_CHECKSEQUENCEVERIFY => "checksequenceverify",
        _ => return None,
    };
    Some(name)
}
