//! Network address and version handshake payloads
//!
//! `version` payload layout:
//!
//! ```text
//! u32      version
//! u64      services
//! u64      timestamp
//! net_addr addr_recv     (no timestamp)
//! net_addr addr_from     (no timestamp)
//! u64      nonce
//! var_str  user_agent
//! u32      start_height
//! bool     relay         (only at ProtocolLevel::Bip37 and above)
//! ```
//!
//! Whether `relay` is on the wire is decided by the level the caller passes
//! in, never by the `version` value stored in the message.

use crate::codec::{varint_size, SliceReader, StreamReader, WireRead, Writer};
use crate::constants::*;
use crate::error::{Result, WireError};
use log::debug;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::net::{IpAddr, Ipv6Addr, SocketAddr};

/// Negotiated protocol level gating optional fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProtocolLevel {
    Minimum,
    Bip37,
    Maximum,
}

impl ProtocolLevel {
    pub fn version(self) -> u32 {
        match self {
            ProtocolLevel::Minimum => PROTOCOL_VERSION_MINIMUM,
            ProtocolLevel::Bip37 => PROTOCOL_VERSION_BIP37,
            ProtocolLevel::Maximum => PROTOCOL_VERSION_MAXIMUM,
        }
    }

    /// Highest level not above `version`; `None` below the minimum.
    pub fn from_version(version: u32) -> Option<Self> {
        if version >= PROTOCOL_VERSION_MAXIMUM {
            Some(ProtocolLevel::Maximum)
        } else if version >= PROTOCOL_VERSION_BIP37 {
            Some(ProtocolLevel::Bip37)
        } else if version >= PROTOCOL_VERSION_MINIMUM {
            Some(ProtocolLevel::Minimum)
        } else {
            None
        }
    }

    /// The trailing `relay` byte is on the wire at this level
    pub fn includes_relay(self) -> bool {
        self >= ProtocolLevel::Bip37
    }
}

/// Peer endpoint descriptor.
///
/// The timestamp is only on the wire in peer-broadcast contexts; handshake
/// addresses omit it. Equality compares the endpoint (services, ip, port)
/// and ignores the timestamp, which does not survive a handshake round trip.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NetworkAddress {
    timestamp: u32,
    services: u64,
    ip: [u8; IP_SIZE],
    port: u16,
    #[serde(skip, default = "crate::types::deserialized_valid")]
    valid: bool,
}

impl NetworkAddress {
    /// Construct from typed values; no validation is performed.
    pub fn new(timestamp: u32, services: u64, ip: [u8; IP_SIZE], port: u16) -> Self {
        Self {
            timestamp,
            services,
            ip,
            port,
            valid: true,
        }
    }

    /// IPv4 endpoints are stored in IPv4-mapped IPv6 form.
    pub fn from_socket_addr(services: u64, addr: SocketAddr) -> Self {
        let ip = match addr.ip() {
            IpAddr::V4(v4) => v4.to_ipv6_mapped().octets(),
            IpAddr::V6(v6) => v6.octets(),
        };
        Self::new(0, services, ip, addr.port())
    }

    pub fn factory_from_data(data: &[u8], with_timestamp: bool) -> Self {
        let mut address = Self::default();
        address.from_data(data, with_timestamp);
        address
    }

    pub fn factory_from_reader<R: WireRead + ?Sized>(reader: &mut R, with_timestamp: bool) -> Self {
        let mut address = Self::default();
        address.from_reader(reader, with_timestamp);
        address
    }

    pub fn from_data(&mut self, data: &[u8], with_timestamp: bool) -> bool {
        self.from_reader(&mut SliceReader::new(data), with_timestamp)
    }

    pub fn from_stream<R: Read>(&mut self, stream: R, with_timestamp: bool) -> bool {
        self.from_reader(&mut StreamReader::new(stream), with_timestamp)
    }

    pub fn from_reader<R: WireRead + ?Sized>(&mut self, reader: &mut R, with_timestamp: bool) -> bool {
        self.reset();
        let timestamp = if with_timestamp { reader.read_u32_le() } else { 0 };
        let services = reader.read_u64_le();
        let ip = reader.read_array::<IP_SIZE>();
        let port = reader.read_u16_be();

        if !reader.is_valid() {
            debug!("network address: under-read at position {}", reader.position());
            return false;
        }

        *self = Self::new(timestamp, services, ip, port);
        true
    }

    pub fn to_data(&self, with_timestamp: bool) -> Vec<u8> {
        let mut writer = Writer::new(Vec::with_capacity(self.serialized_size(with_timestamp)));
        self.to_writer(&mut writer, with_timestamp);
        writer.into_inner()
    }

    pub fn to_writer<W: Write>(&self, writer: &mut Writer<W>, with_timestamp: bool) {
        if with_timestamp {
            writer.write_u32_le(self.timestamp);
        }
        writer.write_u64_le(self.services);
        writer.write_bytes(&self.ip);
        writer.write_u16_be(self.port);
    }

    pub fn serialized_size(&self, with_timestamp: bool) -> usize {
        if with_timestamp {
            NETWORK_ADDRESS_TIMESTAMP_SIZE + NETWORK_ADDRESS_SIZE
        } else {
            NETWORK_ADDRESS_SIZE
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_ipv4(&self) -> bool {
        self.ip[..12] == IPV4_MAPPED_PREFIX
    }

    /// The address with IPv4-mapped forms unwrapped
    pub fn ip_addr(&self) -> IpAddr {
        let v6 = Ipv6Addr::from(self.ip);
        match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => IpAddr::V6(v6),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip_addr(), self.port)
    }

    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: u32) {
        self.timestamp = timestamp;
        self.valid = true;
    }

    pub fn services(&self) -> u64 {
        self.services
    }

    pub fn set_services(&mut self, services: u64) {
        self.services = services;
        self.valid = true;
    }

    pub fn ip(&self) -> &[u8; IP_SIZE] {
        &self.ip
    }

    pub fn set_ip(&mut self, ip: [u8; IP_SIZE]) {
        self.ip = ip;
        self.valid = true;
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn set_port(&mut self, port: u16) {
        self.port = port;
        self.valid = true;
    }
}

impl PartialEq for NetworkAddress {
    fn eq(&self, other: &Self) -> bool {
        self.services == other.services && self.ip == other.ip && self.port == other.port
    }
}

impl Eq for NetworkAddress {}

/// Version message for the initial handshake.
///
/// Sender and receiver `services` are not cross-checked against the
/// message-level `services`; peers in the wild disagree on them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMessage {
    value: u32,
    services: u64,
    timestamp: u64,
    address_receiver: NetworkAddress,
    address_sender: NetworkAddress,
    nonce: u64,
    user_agent: String,
    start_height: u32,
    relay: bool,
}

impl VersionMessage {
    /// Command name in the message header
    pub const COMMAND: &'static str = "version";

    /// Construct from typed values; no validation is performed.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        value: u32,
        services: u64,
        timestamp: u64,
        address_receiver: NetworkAddress,
        address_sender: NetworkAddress,
        nonce: u64,
        user_agent: String,
        start_height: u32,
        relay: bool,
    ) -> Self {
        Self {
            value,
            services,
            timestamp,
            address_receiver,
            address_sender,
            nonce,
            user_agent,
            start_height,
            relay,
        }
    }

    pub fn factory_from_data(level: ProtocolLevel, data: &[u8]) -> Self {
        let mut message = Self::default();
        message.from_data(level, data);
        message
    }

    pub fn factory_from_stream<R: Read>(level: ProtocolLevel, stream: R) -> Self {
        let mut message = Self::default();
        message.from_stream(level, stream);
        message
    }

    pub fn factory_from_reader<R: WireRead + ?Sized>(level: ProtocolLevel, reader: &mut R) -> Self {
        let mut message = Self::default();
        message.from_reader(level, reader);
        message
    }

    /// Parse, mapping an invalid result to [`WireError::Malformed`].
    pub fn decode(level: ProtocolLevel, data: &[u8]) -> Result<Self> {
        let message = Self::factory_from_data(level, data);
        if message.is_valid() {
            Ok(message)
        } else {
            Err(WireError::Malformed("version"))
        }
    }

    pub fn from_data(&mut self, level: ProtocolLevel, data: &[u8]) -> bool {
        self.from_reader(level, &mut SliceReader::new(data))
    }

    pub fn from_stream<R: Read>(&mut self, level: ProtocolLevel, stream: R) -> bool {
        self.from_reader(level, &mut StreamReader::new(stream))
    }

    /// Parse fields in wire order. At `Bip37` and above the relay byte is
    /// required; below it `relay` reads as false without touching the reader.
    pub fn from_reader<R: WireRead + ?Sized>(&mut self, level: ProtocolLevel, reader: &mut R) -> bool {
        self.reset();
        let value = reader.read_u32_le();
        let services = reader.read_u64_le();
        let timestamp = reader.read_u64_le();
        let address_receiver = NetworkAddress::factory_from_reader(reader, false);
        let address_sender = NetworkAddress::factory_from_reader(reader, false);
        let nonce = reader.read_u64_le();
        let user_agent = reader.read_string();
        let start_height = reader.read_u32_le();
        let relay = level.includes_relay() && reader.read_u8() != 0;

        if !reader.is_valid() {
            debug!(
                "version: parse failed at position {} for level {:?}",
                reader.position(),
                level
            );
            return false;
        }

        *self = Self::new(
            value,
            services,
            timestamp,
            address_receiver,
            address_sender,
            nonce,
            user_agent,
            start_height,
            relay,
        );
        self.is_valid()
    }

    pub fn to_data(&self, level: ProtocolLevel) -> Vec<u8> {
        let mut writer = Writer::new(Vec::with_capacity(self.serialized_size(level)));
        self.to_writer(level, &mut writer);
        writer.into_inner()
    }

    pub fn to_stream<W: Write>(&self, level: ProtocolLevel, stream: W) -> Result<()> {
        let mut writer = Writer::new(stream);
        self.to_writer(level, &mut writer);
        writer.finish().map(|_| ())
    }

    pub fn to_writer<W: Write>(&self, level: ProtocolLevel, writer: &mut Writer<W>) {
        writer.write_u32_le(self.value);
        writer.write_u64_le(self.services);
        writer.write_u64_le(self.timestamp);
        self.address_receiver.to_writer(writer, false);
        self.address_sender.to_writer(writer, false);
        writer.write_u64_le(self.nonce);
        writer.write_string(&self.user_agent);
        writer.write_u32_le(self.start_height);
        if level.includes_relay() {
            writer.write_u8(u8::from(self.relay));
        }
    }

    pub fn serialized_size(&self, level: ProtocolLevel) -> usize {
        let agent = self.user_agent.len();
        4 + 8
            + 8
            + self.address_receiver.serialized_size(false)
            + self.address_sender.serialized_size(false)
            + 8
            + varint_size(agent as u64)
            + agent
            + 4
            + usize::from(level.includes_relay())
    }

    /// Both endpoint descriptors are valid
    pub fn is_valid(&self) -> bool {
        self.address_receiver.is_valid() && self.address_sender.is_valid()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Protocol version advertised by the sender
    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn set_value(&mut self, value: u32) {
        self.value = value;
    }

    pub fn services(&self) -> u64 {
        self.services
    }

    pub fn set_services(&mut self, services: u64) {
        self.services = services;
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    pub fn address_receiver(&self) -> &NetworkAddress {
        &self.address_receiver
    }

    pub fn set_address_receiver(&mut self, address: NetworkAddress) {
        self.address_receiver = address;
    }

    pub fn address_sender(&self) -> &NetworkAddress {
        &self.address_sender
    }

    pub fn set_address_sender(&mut self, address: NetworkAddress) {
        self.address_sender = address;
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn set_user_agent(&mut self, user_agent: String) {
        self.user_agent = user_agent;
    }

    pub fn start_height(&self) -> u32 {
        self.start_height
    }

    pub fn set_start_height(&mut self, start_height: u32) {
        self.start_height = start_height;
    }

    pub fn relay(&self) -> bool {
        self.relay
    }

    pub fn set_relay(&mut self, relay: bool) {
        self.relay = relay;
    }
}
