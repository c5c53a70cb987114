//! Script parsing and signature-operation accounting
//!
//! Scripts are parsed structurally only; nothing here executes them.
//!
//! Two layouts are supported, chosen by [`ParseMode`]:
//! - `Strict`: the body is decoded into a list of operations. A truncated
//!   push aborts parsing; operations decoded before it are kept but the
//!   script is marked invalid.
//! - `RawData`: the body is kept as one opaque operation. Used when the
//!   grammar that applies is unknown to the caller (e.g. an input script
//!   whose previous output has not been looked up).

use crate::codec::{varint_size, SliceReader, StreamReader, WireRead, Writer};
use crate::constants::MAX_PUBKEYS_PER_MULTISIG;
use crate::error::Result;
use crate::opcodes::*;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};

/// How a script body is interpreted when parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    #[default]
    Strict,
    RawData,
}

/// A single script operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Opcode without operand
    Code(u8),
    /// Data push: direct (0x01-0x4b) or OP_PUSHDATA1/2/4.
    ///
    /// An `opcode` that cannot carry `data.len()` is written as the minimal
    /// push instead, so the length on the wire always matches the data.
    Push { opcode: u8, data: Vec<u8> },
    /// Unparsed script body
    RawData(Vec<u8>),
}

impl Operation {
    /// Minimal push for `data`
    pub fn push(data: Vec<u8>) -> Self {
        match minimal_push_opcode(data.len()) {
            OP_0 => Operation::Code(OP_0),
            opcode => Operation::Push { opcode, data },
        }
    }

    /// The opcode byte; `None` for raw data
    pub fn opcode(&self) -> Option<u8> {
        match self {
            Operation::Code(opcode) | Operation::Push { opcode, .. } => Some(*opcode),
            Operation::RawData(_) => None,
        }
    }

    pub fn data(&self) -> &[u8] {
        match self {
            Operation::Code(_) => &[],
            Operation::Push { data, .. } | Operation::RawData(data) => data,
        }
    }

    /// N for OP_1 through OP_16
    pub fn small_int(&self) -> Option<u8> {
        match self {
            Operation::Code(opcode) if is_small_positive(*opcode) => Some(opcode - OP_N_BASE),
            _ => None,
        }
    }

    pub fn serialized_size(&self) -> usize {
        match self {
            Operation::Code(_) => 1,
            Operation::Push { opcode, data } => {
                1 + length_prefix_size(push_wire_opcode(*opcode, data.len())) + data.len()
            }
            Operation::RawData(data) => data.len(),
        }
    }

    pub fn to_writer<W: Write>(&self, writer: &mut Writer<W>) {
        match self {
            Operation::Code(opcode) => writer.write_u8(*opcode),
            Operation::Push { opcode, data } => {
                let opcode = push_wire_opcode(*opcode, data.len());
                writer.write_u8(opcode);
                match opcode {
                    OP_PUSHDATA1 => writer.write_u8(data.len() as u8),
                    OP_PUSHDATA2 => writer.write_u16_le(data.len() as u16),
                    OP_PUSHDATA4 => writer.write_u32_le(data.len() as u32),
                    _ => {}
                }
                writer.write_bytes(data);
            }
            Operation::RawData(data) => writer.write_bytes(data),
        }
    }

    /// Decode one operation; `None` if the push is truncated.
    fn from_reader<R: WireRead + ?Sized>(reader: &mut R) -> Option<Self> {
        let opcode = reader.read_u8();
        let len = match opcode {
            0x01..=OP_PUSHBYTES_75 => opcode as usize,
            OP_PUSHDATA1 => reader.read_u8() as usize,
            OP_PUSHDATA2 => reader.read_u16_le() as usize,
            OP_PUSHDATA4 => reader.read_u32_le() as usize,
            _ => return reader.is_valid().then_some(Operation::Code(opcode)),
        };
        let data = reader.read_bytes(len);
        reader
            .is_valid()
            .then_some(Operation::Push { opcode, data })
    }
}

fn minimal_push_opcode(len: usize) -> u8 {
    match len {
        0 => OP_0,
        len if len <= OP_PUSHBYTES_75 as usize => len as u8,
        len if len <= 0xff => OP_PUSHDATA1,
        len if len <= 0xffff => OP_PUSHDATA2,
        _ => OP_PUSHDATA4,
    }
}

/// The stored opcode when it can encode `len`, else the minimal one
fn push_wire_opcode(opcode: u8, len: usize) -> u8 {
    let fits = match opcode {
        0x01..=OP_PUSHBYTES_75 => opcode as usize == len,
        OP_PUSHDATA1 => len <= 0xff,
        OP_PUSHDATA2 => len <= 0xffff,
        OP_PUSHDATA4 => u32::try_from(len).is_ok(),
        _ => false,
    };
    if fits {
        opcode
    } else {
        minimal_push_opcode(len)
    }
}

fn length_prefix_size(opcode: u8) -> usize {
    match opcode {
        OP_PUSHDATA1 => 1,
        OP_PUSHDATA2 => 2,
        OP_PUSHDATA4 => 4,
        _ => 0,
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Code(opcode) => match (self.small_int(), opcode_name(*opcode)) {
                (Some(n), _) => write!(f, "{}", n),
                (None, Some(name)) => f.write_str(name),
                (None, None) => write!(f, "0x{:02x}", opcode),
            },
            Operation::Push { opcode, data } => {
                match length_prefix_size(push_wire_opcode(*opcode, data.len())) {
                    0 => write!(f, "[{}]", hex::encode(data)),
                    width => write!(f, "[{}.{}]", width, hex::encode(data)),
                }
            }
            Operation::RawData(data) => write!(f, "<{}>", hex::encode(data)),
        }
    }
}

/// Script: ordered operations plus the mode they were parsed with
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    operations: Vec<Operation>,
    mode: ParseMode,
    #[serde(skip, default = "crate::types::deserialized_valid")]
    valid: bool,
}

impl Script {
    /// Construct from decoded operations; no validation is performed.
    pub fn from_operations(operations: Vec<Operation>) -> Self {
        Self {
            operations,
            mode: ParseMode::Strict,
            valid: true,
        }
    }

    /// Wrap an unparsed body
    pub fn from_raw(body: Vec<u8>) -> Self {
        Self {
            operations: vec![Operation::RawData(body)],
            mode: ParseMode::RawData,
            valid: true,
        }
    }

    pub fn factory_from_data(data: &[u8], prefix: bool, mode: ParseMode) -> Self {
        let mut script = Self::default();
        script.from_data(data, prefix, mode);
        script
    }

    pub fn factory_from_reader<R: WireRead + ?Sized>(reader: &mut R, mode: ParseMode) -> Self {
        let mut script = Self::default();
        script.from_reader(reader, mode);
        script
    }

    /// Parse `data`. With `prefix`, the data starts with a varint body length;
    /// otherwise the whole of `data` is the body.
    pub fn from_data(&mut self, data: &[u8], prefix: bool, mode: ParseMode) -> bool {
        if prefix {
            return self.from_reader(&mut SliceReader::new(data), mode);
        }
        self.parse_body(data, mode)
    }

    /// Parse from a stream. Without `prefix` the stream is read to its end.
    pub fn from_stream<R: Read>(&mut self, mut stream: R, prefix: bool, mode: ParseMode) -> bool {
        if prefix {
            return self.from_reader(&mut StreamReader::new(stream), mode);
        }
        let mut body = Vec::new();
        if stream.read_to_end(&mut body).is_err() {
            self.reset();
            return false;
        }
        self.parse_body(&body, mode)
    }

    /// Parse a varint-prefixed script from a shared reader.
    ///
    /// A strict grammar failure leaves the reader valid (the declared length
    /// was consumed); only an under-read invalidates it.
    pub fn from_reader<R: WireRead + ?Sized>(&mut self, reader: &mut R, mode: ParseMode) -> bool {
        self.reset();
        let body = reader.read_var_bytes();
        if !reader.is_valid() {
            debug!("script: under-read at position {}", reader.position());
            return false;
        }
        self.parse_body(&body, mode)
    }

    fn parse_body(&mut self, body: &[u8], mode: ParseMode) -> bool {
        self.reset();
        self.mode = mode;

        if mode == ParseMode::RawData {
            self.operations.push(Operation::RawData(body.to_vec()));
            self.valid = true;
            return true;
        }

        let mut reader = SliceReader::new(body);
        while !reader.is_exhausted() {
            match Operation::from_reader(&mut reader) {
                Some(operation) => self.operations.push(operation),
                None => {
                    debug!(
                        "script: malformed operation after {} parsed operations",
                        self.operations.len()
                    );
                    return false;
                }
            }
        }

        self.valid = true;
        true
    }

    pub fn to_data(&self, prefix: bool) -> Vec<u8> {
        let mut writer = Writer::new(Vec::with_capacity(self.serialized_size(prefix)));
        self.to_writer(&mut writer, prefix);
        writer.into_inner()
    }

    pub fn to_stream<W: Write>(&self, stream: W, prefix: bool) -> Result<()> {
        let mut writer = Writer::new(stream);
        self.to_writer(&mut writer, prefix);
        writer.finish().map(|_| ())
    }

    pub fn to_writer<W: Write>(&self, writer: &mut Writer<W>, prefix: bool) {
        if prefix {
            writer.write_varint(self.body_size() as u64);
        }
        for operation in &self.operations {
            operation.to_writer(writer);
        }
    }

    fn body_size(&self) -> usize {
        self.operations.iter().map(Operation::serialized_size).sum()
    }

    pub fn serialized_size(&self, prefix: bool) -> usize {
        let body = self.body_size();
        if prefix {
            varint_size(body as u64) + body
        } else {
            body
        }
    }

    /// SigOpCount: 𝒮𝒞 × 𝔹 → ℕ
    ///
    /// - OP_CHECKSIG, OP_CHECKSIGVERIFY: 1
    /// - OP_CHECKMULTISIG(VERIFY): N when `accurate` and the previous
    ///   operation is OP_N (1-16), otherwise 20
    pub fn sigops(&self, accurate: bool) -> usize {
        let mut total = 0usize;
        let mut previous: Option<&Operation> = None;

        for operation in &self.operations {
            match operation.opcode() {
                Some(OP_CHECKSIG | OP_CHECKSIGVERIFY) => total += 1,
                Some(OP_CHECKMULTISIG | OP_CHECKMULTISIGVERIFY) => {
                    total += match (accurate, previous.and_then(Operation::small_int)) {
                        (true, Some(keys)) => keys as usize,
                        _ => MAX_PUBKEYS_PER_MULTISIG,
                    };
                }
                _ => {}
            }
            previous = Some(operation);
        }

        total
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn parse_mode(&self) -> ParseMode {
        self.mode
    }

    pub fn is_raw_data(&self) -> bool {
        self.mode == ParseMode::RawData
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl PartialEq for Script {
    fn eq(&self, other: &Self) -> bool {
        self.operations == other.operations
    }
}

impl Eq for Script {}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, operation) in self.operations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", operation)?;
        }
        Ok(())
    }
}
