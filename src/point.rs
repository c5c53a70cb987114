//! Point: a reference to one output of a prior transaction
//!
//! Wire layout (36 bytes):
//!
//! ```text
//! +----------------+-----------------+
//! | hash (32)      | index (4, LE)   |
//! +----------------+-----------------+
//! ```

use crate::codec::{SliceReader, StreamReader, WireRead, Writer};
use crate::constants::{NULL_INDEX, POINT_SIZE};
use crate::error::{Result, WireError};
use crate::point_cursor::PointCursor;
use crate::types::{encode_hash, Hash, NULL_HASH};
use byteorder::{ByteOrder, LittleEndian};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hasher;
use std::io::{Read, Write};

/// Point: 𝒪 = ℍ × ℕ32
///
/// Equality, hashing and ordering consider only `hash` and `index`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Point {
    hash: Hash,
    index: u32,
    #[serde(skip, default = "crate::types::deserialized_valid")]
    valid: bool,
}

/// A point naming a specific prior output
pub type OutputPoint = Point;

impl Point {
    /// Construct from typed values; no validation is performed.
    pub fn new(hash: Hash, index: u32) -> Self {
        Self {
            hash,
            index,
            valid: true,
        }
    }

    /// The coinbase marker: null hash, index `0xffffffff`
    pub fn null() -> Self {
        Self::new(NULL_HASH, NULL_INDEX)
    }

    pub fn factory_from_data(data: &[u8]) -> Self {
        let mut point = Self::default();
        point.from_data(data);
        point
    }

    pub fn factory_from_stream<R: Read>(stream: R) -> Self {
        let mut point = Self::default();
        point.from_stream(stream);
        point
    }

    pub fn factory_from_reader<R: WireRead + ?Sized>(reader: &mut R) -> Self {
        let mut point = Self::default();
        point.from_reader(reader);
        point
    }

    /// Parse, mapping an invalid result to [`WireError::Malformed`].
    pub fn decode(data: &[u8]) -> Result<Self> {
        let point = Self::factory_from_data(data);
        if point.is_valid() {
            Ok(point)
        } else {
            Err(WireError::Malformed("point"))
        }
    }

    pub fn from_data(&mut self, data: &[u8]) -> bool {
        self.from_reader(&mut SliceReader::new(data))
    }

    pub fn from_stream<R: Read>(&mut self, stream: R) -> bool {
        self.from_reader(&mut StreamReader::new(stream))
    }

    /// Read 36 bytes. On failure the point is reset, so no partial state is visible.
    pub fn from_reader<R: WireRead + ?Sized>(&mut self, reader: &mut R) -> bool {
        self.reset();
        let hash = reader.read_hash();
        let index = reader.read_u32_le();

        if !reader.is_valid() {
            debug!("point: under-read at position {}", reader.position());
            return false;
        }

        *self = Self::new(hash, index);
        true
    }

    pub fn to_data(&self) -> Vec<u8> {
        let mut writer = Writer::new(Vec::with_capacity(POINT_SIZE));
        self.to_writer(&mut writer);
        writer.into_inner()
    }

    pub fn to_stream<W: Write>(&self, stream: W) -> Result<()> {
        let mut writer = Writer::new(stream);
        self.to_writer(&mut writer);
        writer.finish().map(|_| ())
    }

    pub fn to_writer<W: Write>(&self, writer: &mut Writer<W>) {
        writer.write_hash(&self.hash);
        writer.write_u32_le(self.index);
    }

    pub fn serialized_size(&self) -> usize {
        POINT_SIZE
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Null hash with the coinbase index
    pub fn is_null(&self) -> bool {
        self.hash == NULL_HASH && self.index == NULL_INDEX
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    pub fn set_hash(&mut self, hash: Hash) {
        self.hash = hash;
        self.valid = true;
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn set_index(&mut self, index: u32) {
        self.index = index;
        self.valid = true;
    }

    /// Cursor over the serialized bytes, positioned at the first byte
    pub fn cursor(&self) -> PointCursor {
        PointCursor::new(*self)
    }

    /// Cursor positioned at the end sentinel
    pub fn cursor_end(&self) -> PointCursor {
        PointCursor::end(*self)
    }

    /// Compact 64-bit key for hash tables.
    ///
    /// Not unique: points whose indexes agree in the low 15 bits and whose
    /// hashes agree in the upper 49 bits of bytes 12..20 share a key.
    pub fn checksum(&self) -> u64 {
        const MASK: u64 = 0xffff_ffff_ffff_8000;
        let tx = LittleEndian::read_u64(&self.hash[12..20]);
        (tx & MASK) | (u64::from(self.index) & !MASK)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.index == other.index
    }
}

impl Eq for Point {}

impl std::hash::Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(&self.hash, state);
        std::hash::Hash::hash(&self.index, state);
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.hash, self.index).cmp(&(other.hash, other.index))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", encode_hash(&self.hash), self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::decode_hash;
    use std::collections::HashSet;

    const RAW_POINT: &str =
        "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f00000015";

    #[test]
    fn test_default_is_invalid() {
        let point = Point::default();
        assert!(!point.is_valid());
        assert_eq!(point.hash(), &NULL_HASH);
        assert_eq!(point.index(), 0);
    }

    #[test]
    fn test_new_is_valid() {
        let point = Point::new([7; 32], 3);
        assert!(point.is_valid());
        assert_eq!(point.hash(), &[7; 32]);
        assert_eq!(point.index(), 3);
    }

    #[test]
    fn test_from_data_exact() {
        let data = hex::decode(RAW_POINT).unwrap();
        let point = Point::factory_from_data(&data);
        assert!(point.is_valid());
        assert_eq!(point.index(), 0x15000000);
        assert_eq!(point.hash()[..], data[..32]);
        assert_eq!(point.to_data(), data);
    }

    #[test]
    fn test_from_data_insufficient() {
        let mut point = Point::new([9; 32], 9);
        assert!(!point.from_data(&[0u8; 35]));
        assert!(!point.is_valid());
        // Prior contents are not observable after a failed parse.
        assert_eq!(point, Point::default());
    }

    #[test]
    fn test_decode_error() {
        assert!(matches!(Point::decode(&[1, 2]), Err(WireError::Malformed("point"))));
        assert!(Point::decode(&[0u8; 36]).is_ok());
    }

    #[test]
    fn test_serialized_size() {
        assert_eq!(Point::default().serialized_size(), 36);
        assert_eq!(Point::new([1; 32], 1).to_data().len(), 36);
    }

    #[test]
    fn test_setters_mark_valid() {
        let mut point = Point::default();
        point.set_index(5434);
        assert!(point.is_valid());
        assert_eq!(point.index(), 5434);

        let mut point = Point::default();
        point.set_hash([2; 32]);
        assert!(point.is_valid());
    }

    #[test]
    fn test_equality_ignores_validity() {
        let parsed = Point::factory_from_data(&[0u8; 36]);
        assert!(parsed.is_valid());
        assert_eq!(parsed, Point::default());
    }

    #[test]
    fn test_usable_as_set_key() {
        let mut set = HashSet::new();
        set.insert(Point::new([1; 32], 0));
        set.insert(Point::new([1; 32], 0));
        set.insert(Point::new([1; 32], 1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_null_point() {
        let null = Point::null();
        assert!(null.is_null());
        assert!(!Point::new(NULL_HASH, 0).is_null());
    }

    #[test]
    fn test_display_reverses_hash() {
        let hash = decode_hash("000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f")
            .unwrap();
        let point = Point::new(hash, 5434);
        assert_eq!(
            point.to_string(),
            "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f:5434"
        );
    }

    #[test]
    fn test_to_stream() {
        let point = Point::new([3; 32], 1);
        let mut sink = Vec::new();
        point.to_stream(&mut sink).unwrap();
        assert_eq!(sink, point.to_data());
    }

    #[test]
    fn test_checksum_layout() {
        let mut hash = NULL_HASH;
        hash[12..20].copy_from_slice(&0x0123_4567_89ab_cdefu64.to_le_bytes());
        // Bytes outside 12..20 do not contribute
        hash[0] = 0xff;
        hash[31] = 0xff;

        let point = Point::new(hash, 0x0001_2345);
        assert_eq!(point.checksum(), 0x0123_4567_89ab_8000 | 0x2345);
    }

    #[test]
    fn test_checksum_index_low_bits_only() {
        let a = Point::new([4; 32], 1);
        assert_eq!(a.checksum(), Point::new([4; 32], 1).checksum());
        assert_ne!(a.checksum(), Point::new([4; 32], 2).checksum());
        assert_eq!(a.checksum(), Point::new([4; 32], 1 + 0x8000).checksum());
        assert_eq!(Point::null().checksum() & 0x7fff, 0x7fff);
    }

    #[test]
    fn test_serde_roundtrip_omits_validity() {
        let point = Point::new([1; 32], 1);
        let json = serde_json::to_string(&point).unwrap();
        assert!(!json.contains("valid"));

        let restored: Point = serde_json::from_str(&json).unwrap();
        assert!(restored.is_valid());
        assert_eq!(restored, point);
    }
}
