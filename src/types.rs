//! Core types shared by the wire entities

use crate::constants::HASH_SIZE;
use sha2::{Digest, Sha256};

/// Hash type: 256-bit digest, stored in wire byte order
pub type Hash = [u8; HASH_SIZE];

/// The all-zero digest
pub const NULL_HASH: Hash = [0u8; HASH_SIZE];

/// Entities restored through serde are treated like explicitly constructed ones.
pub(crate) fn deserialized_valid() -> bool {
    true
}

/// Double SHA256, the digest used to identify transactions and blocks.
///
/// The wire layer treats digests as opaque 32-byte values; this helper exists
/// for callers that need to derive one.
pub fn sha256d(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut hash = NULL_HASH;
    hash.copy_from_slice(&second);
    hash
}

/// Render a digest the way explorers display it (byte-reversed hex).
///
/// Reversal is purely a display convention; the wire order is untouched.
pub fn encode_hash(hash: &Hash) -> String {
    let mut reversed = *hash;
    reversed.reverse();
    hex::encode(reversed)
}

/// Parse a display-order (byte-reversed) hex digest into wire order.
pub fn decode_hash(text: &str) -> Option<Hash> {
    let bytes = hex::decode(text).ok()?;
    if bytes.len() != HASH_SIZE {
        return None;
    }
    let mut hash = NULL_HASH;
    hash.copy_from_slice(&bytes);
    hash.reverse();
    Some(hash)
}
