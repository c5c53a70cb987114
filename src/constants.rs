//! Protocol constants for the wire layer

/// Size of a digest on the wire
pub const HASH_SIZE: usize = 32;

/// Size of a serialized point: digest + 4-byte index
pub const POINT_SIZE: usize = HASH_SIZE + 4;

/// Size of a serialized sequence number
pub const SEQUENCE_SIZE: usize = 4;

/// Smallest possible serialized input: point + empty-script varint + sequence
pub const MIN_INPUT_SIZE: usize = POINT_SIZE + 1 + SEQUENCE_SIZE;

/// Size of the IP field of a network address (IPv6, IPv4-mapped for IPv4)
pub const IP_SIZE: usize = 16;

/// Network address without timestamp: services + ip + port
pub const NETWORK_ADDRESS_SIZE: usize = 8 + IP_SIZE + 2;

/// Width of the optional network address timestamp
pub const NETWORK_ADDRESS_TIMESTAMP_SIZE: usize = 4;

/// Sequence number for final input
pub const SEQUENCE_FINAL: u32 = 0xffffffff;

/// Index used by the null point (coinbase marker)
pub const NULL_INDEX: u32 = 0xffffffff;

/// Conservative per-opcode sigop charge for multisig when the key count is unknown
pub const MAX_PUBKEYS_PER_MULTISIG: usize = 20;

/// Protocol version floor supported for the version handshake
pub const PROTOCOL_VERSION_MINIMUM: u32 = 31402;

/// First protocol version carrying the `relay` flag (BIP37)
pub const PROTOCOL_VERSION_BIP37: u32 = 70001;

/// Highest protocol version this layer knows about
pub const PROTOCOL_VERSION_MAXIMUM: u32 = 70002;

/// IPv4-mapped IPv6 prefix (::ffff:0:0/96)
pub const IPV4_MAPPED_PREFIX: [u8; 12] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff];

/// Service flag: full node serving the complete chain
pub const NODE_NETWORK: u64 = 1 << 0;

/// Service flag: node supports bloom-filtered connections (BIP111)
pub const NODE_BLOOM: u64 = 1 << 2;

/// Service flag: node serves witness data (BIP144)
pub const NODE_WITNESS: u64 = 1 << 3;

/// Service flag: node serves only recent blocks (BIP159)
pub const NODE_NETWORK_LIMITED: u64 = 1 << 10;
