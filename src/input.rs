//! Transaction input: previous output reference, script and sequence
//!
//! Wire layout:
//!
//! ```text
//! +------------------+------------------------+----------------+
//! | previous output  | script (varint + body) | sequence (LE)  |
//! | 36 bytes         | variable               | 4 bytes        |
//! +------------------+------------------------+----------------+
//! ```

use crate::codec::{SliceReader, StreamReader, WireRead, Writer};
use crate::constants::{MIN_INPUT_SIZE, SEQUENCE_FINAL, SEQUENCE_SIZE};
use crate::error::{Result, WireError};
use crate::point::OutputPoint;
use crate::script::{ParseMode, Script};
use log::debug;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Transaction Input: ℐ = 𝒪 × 𝕊 × ℕ32
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Input {
    previous_output: OutputPoint,
    script: Script,
    sequence: u32,
    #[serde(skip, default = "crate::types::deserialized_valid")]
    valid: bool,
}

impl Input {
    /// Construct from typed values; no validation is performed.
    pub fn new(previous_output: OutputPoint, script: Script, sequence: u32) -> Self {
        Self {
            previous_output,
            script,
            sequence,
            valid: true,
        }
    }

    pub fn factory_from_data(data: &[u8]) -> Self {
        let mut input = Self::default();
        input.from_data(data);
        input
    }

    pub fn factory_from_stream<R: Read>(stream: R) -> Self {
        let mut input = Self::default();
        input.from_stream(stream);
        input
    }

    pub fn factory_from_reader<R: WireRead + ?Sized>(reader: &mut R) -> Self {
        let mut input = Self::default();
        input.from_reader(reader);
        input
    }

    /// Parse, mapping an invalid result to [`WireError::Malformed`].
    pub fn decode(data: &[u8]) -> Result<Self> {
        let input = Self::factory_from_data(data);
        if input.is_valid() {
            Ok(input)
        } else {
            Err(WireError::Malformed("input"))
        }
    }

    pub fn from_data(&mut self, data: &[u8]) -> bool {
        self.from_reader(&mut SliceReader::new(data))
    }

    pub fn from_stream<R: Read>(&mut self, stream: R) -> bool {
        self.from_reader(&mut StreamReader::new(stream))
    }

    /// Parse point, script and sequence in order.
    ///
    /// The script is kept as raw data: its grammar depends on the type of
    /// the output being spent, which is not available here. Any failure
    /// resets the input; bytes already taken from `reader` stay consumed.
    pub fn from_reader<R: WireRead + ?Sized>(&mut self, reader: &mut R) -> bool {
        self.reset();
        let start = reader.position();

        let mut previous_output = OutputPoint::default();
        let mut script = Script::default();
        let parsed = previous_output.from_reader(reader)
            && script.from_reader(reader, ParseMode::RawData);
        let sequence = reader.read_u32_le();

        if !parsed || !reader.is_valid() {
            debug!(
                "input: parse failed at position {} (started at {}, minimum size {})",
                reader.position(),
                start,
                MIN_INPUT_SIZE
            );
            return false;
        }

        *self = Self::new(previous_output, script, sequence);
        true
    }

    pub fn to_data(&self) -> Vec<u8> {
        let mut writer = Writer::new(Vec::with_capacity(self.serialized_size()));
        self.to_writer(&mut writer);
        writer.into_inner()
    }

    pub fn to_stream<W: Write>(&self, stream: W) -> Result<()> {
        let mut writer = Writer::new(stream);
        self.to_writer(&mut writer);
        writer.finish().map(|_| ())
    }

    pub fn to_writer<W: Write>(&self, writer: &mut Writer<W>) {
        self.previous_output.to_writer(writer);
        self.script.to_writer(writer, true);
        writer.write_u32_le(self.sequence);
    }

    pub fn serialized_size(&self) -> usize {
        self.previous_output.serialized_size() + self.script.serialized_size(true) + SEQUENCE_SIZE
    }

    /// Signature operations in this input's script.
    ///
    /// Pay-to-script-hash redeem scripts are not expanded even when
    /// `bip16_active`: that needs the previous output's script, which an
    /// input alone does not carry.
    pub fn signature_operations(&self, bip16_active: bool) -> usize {
        self.script.sigops(bip16_active)
    }

    /// Sequence is at its maximum, so the input opts out of locktime/replacement
    pub fn is_final(&self) -> bool {
        self.sequence == SEQUENCE_FINAL
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn previous_output(&self) -> &OutputPoint {
        &self.previous_output
    }

    pub fn set_previous_output(&mut self, previous_output: OutputPoint) {
        self.previous_output = previous_output;
        self.valid = true;
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn set_script(&mut self, script: Script) {
        self.script = script;
        self.valid = true;
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn set_sequence(&mut self, sequence: u32) {
        self.sequence = sequence;
        self.valid = true;
    }
}

impl PartialEq for Input {
    fn eq(&self, other: &Self) -> bool {
        self.previous_output == other.previous_output
            && self.script == other.script
            && self.sequence == other.sequence
    }
}

impl Eq for Input {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcodes::{OP_CHECKSIG, OP_CHECKSIGVERIFY};
    use crate::script::Operation;
    use crate::types::NULL_HASH;

    #[test]
    fn test_default_is_invalid() {
        assert!(!Input::default().is_valid());
    }

    #[test]
    fn test_new_is_valid() {
        let point = OutputPoint::new(NULL_HASH, 5434);
        let script = Script::from_raw(vec![0xec, 0xe4]);
        let input = Input::new(point, script.clone(), 4568656);
        assert!(input.is_valid());
        assert_eq!(input.previous_output(), &point);
        assert_eq!(input.script(), &script);
        assert_eq!(input.sequence(), 4568656);
    }

    #[test]
    fn test_minimal_input() {
        let mut data = vec![0u8; 36];
        data.push(0x00);
        data.extend_from_slice(&SEQUENCE_FINAL.to_le_bytes());
        assert_eq!(data.len(), MIN_INPUT_SIZE);

        let input = Input::factory_from_data(&data);
        assert!(input.is_valid());
        assert!(input.is_final());
        assert_eq!(input.serialized_size(), MIN_INPUT_SIZE);
        assert_eq!(input.to_data(), data);
    }

    #[test]
    fn test_insufficient_data() {
        let mut input = Input::default();
        assert!(!input.from_data(&[0u8; 2]));
        assert!(!input.is_valid());
    }

    #[test]
    fn test_truncated_sequence_resets() {
        let mut data = vec![1u8; 36];
        data.push(0x00);
        data.extend_from_slice(&[0xff, 0xff]);

        let mut input = Input::new(OutputPoint::new([9; 32], 9), Script::default(), 9);
        assert!(!input.from_data(&data));
        assert!(!input.is_valid());
        assert_eq!(input, Input::default());
    }

    #[test]
    fn test_signature_operations_delegates() {
        let script = Script::from_operations(vec![
            Operation::Code(OP_CHECKSIG),
            Operation::Code(OP_CHECKSIGVERIFY),
        ]);
        let mut input = Input::default();
        input.set_script(script.clone());
        assert_eq!(input.signature_operations(false), script.sigops(false));
        assert_eq!(input.signature_operations(true), script.sigops(true));
        assert_eq!(input.signature_operations(true), 2);
    }

    #[test]
    fn test_setters() {
        let mut input = Input::default();
        input.set_sequence(1254);
        assert!(input.is_valid());
        assert_eq!(input.sequence(), 1254);
        assert!(!input.is_final());
    }

    #[test]
    fn test_serde_roundtrip_omits_validity() {
        let input = Input::new(
            OutputPoint::new([5; 32], 2),
            Script::from_raw(vec![0x51, 0x52]),
            SEQUENCE_FINAL,
        );
        let json = serde_json::to_string(&input).unwrap();
        assert!(!json.contains("valid"));

        let restored: Input = serde_json::from_str(&json).unwrap();
        assert!(restored.is_valid());
        assert!(restored.previous_output().is_valid());
        assert!(restored.script().is_raw_data());
        assert_eq!(restored, input);
        assert_eq!(restored.to_data(), input.to_data());
    }
}
