//! # Ledger-Wire
//!
//! Wire-format entities of a bitcoin-style peer protocol: output points, a lazy
//! cursor over a point's bytes, scripts, transaction inputs, network addresses
//! and the `version` handshake payload.
//!
//! ## Design Principles
//!
//! 1. **Sticky Validity**: readers flip to invalid on the first under-read and
//!    stay there; entities report `is_valid()` instead of panicking
//! 2. **Reset on Failure**: a failed parse leaves the entity in its default state
//! 3. **Exact Round Trips**: anything parsed serializes back to the same bytes
//! 4. **Explicit Protocol Levels**: optional fields are gated by the level the
//!    caller passes in
//!
//! ## Usage
//!
//! ```rust
//! use ledger_wire::{Input, OutputPoint, Script, SEQUENCE_FINAL};
//!
//! let input = Input::new(OutputPoint::null(), Script::from_raw(vec![0x51]), SEQUENCE_FINAL);
//! let data = input.to_data();
//! assert_eq!(data.len(), input.serialized_size());
//!
//! let parsed = Input::decode(&data).unwrap();
//! assert_eq!(parsed, input);
//! ```

pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod input;
pub mod network;
pub mod opcodes;
pub mod point;
pub mod point_cursor;
pub mod script;
pub mod types;

// Re-export commonly used types
pub use codec::{SliceReader, StreamReader, WireRead, Writer};
pub use config::WireLimits;
pub use constants::*;
pub use error::WireError;
pub use input::Input;
pub use network::{NetworkAddress, ProtocolLevel, VersionMessage};
pub use point::{OutputPoint, Point};
pub use point_cursor::PointCursor;
pub use script::{Operation, ParseMode, Script};
pub use types::*;
