//! Conversion between IPv4 text and the numeric table key.
//!
//! The key is the address read as a big-endian `u32`, the same value the XDP
//! program assembles from the packet's source address bytes.

use crate::error::AddressError;
use std::net::{IpAddr, Ipv4Addr};

/// Encode a dotted-quad IPv4 address into its table key
pub fn encode(text: &str) -> Result<u32, AddressError> {
    match text.parse::<IpAddr>() {
        Ok(IpAddr::V4(ipv4)) => Ok(u32::from_be_bytes(ipv4.octets())),
        Ok(IpAddr::V6(_)) => Err(AddressError::NotIpv4(text.to_string())),
        Err(_) => Err(AddressError::InvalidAddress(text.to_string())),
    }
}

/// Decode a table key back into an address
pub fn decode(key: u32) -> Ipv4Addr {
    Ipv4Addr::from(key.to_be_bytes())
}
