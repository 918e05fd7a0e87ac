//! Types and logic shared between the XDP program and the control plane.
//!
//! Everything here is `no_std` and allocation-free so the kernel program can
//! link it directly. The control plane uses the same code for its own
//! lookups, which keeps the two sides in agreement about slot encoding and
//! the per-packet verdict.

#![cfg_attr(not(test), no_std)]

pub mod packet;

pub use packet::{inspect, source_ipv4, PacketBytes, Verdict};

/// Number of slots in the blocklist map
pub const MAX_BLOCKED_ADDRS: u32 = 1024;

/// Name of the blocklist array map inside the eBPF object
pub const BLOCKED_IPV4_MAP: &str = "BLOCKED_IPV4";

/// Name of the XDP program inside the eBPF object
pub const XDP_PROGRAM: &str = "xdp_block_ipv4";

/// Marker bit set in every occupied slot word.
///
/// The address sits in the low 32 bits, so marker and address are written
/// together by a single 64-bit store and a zero word is always "empty".
pub const OCCUPIED_BIT: u64 = 1 << 32;

/// Pack an IPv4 address (big-endian numeric form) into a slot word
#[inline(always)]
pub const fn encode_slot(addr: u32) -> u64 {
    OCCUPIED_BIT | addr as u64
}

/// Unpack a slot word, `None` for an empty slot
#[inline(always)]
pub const fn decode_slot(word: u64) -> Option<u32> {
    if word & OCCUPIED_BIT != 0 {
        Some(word as u32)
    } else {
        None
    }
}

/// Read access to the blocklist slots.
///
/// Implemented by the kernel map wrapper and by the userspace stores.
pub trait SlotSource {
    /// Number of slots backing this source
    fn capacity(&self) -> u32;

    /// Raw word stored at `index`, `None` if it cannot be read
    fn slot(&self, index: u32) -> Option<u64>;
}

/// Point query: is `candidate` stored in any occupied slot?
///
/// Occupied slots form a dense prefix, so the scan stops at the first empty
/// or unreadable slot. The iteration count never exceeds
/// [`MAX_BLOCKED_ADDRS`].
#[inline(always)]
pub fn table_contains<S: SlotSource + ?Sized>(slots: &S, candidate: u32) -> bool {
    let limit = slots.capacity().min(MAX_BLOCKED_ADDRS);

    let mut index = 0;
    while index < limit {
        let addr = match slots.slot(index).and_then(decode_slot) {
            Some(addr) => addr,
            None => return false,
        };
        if addr == candidate {
            return true;
        }
        index += 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    struct VecSlots(Vec<u64>);

    impl SlotSource for VecSlots {
        fn capacity(&self) -> u32 {
            self.0.len() as u32
        }

        fn slot(&self, index: u32) -> Option<u64> {
            self.0.get(index as usize).copied()
        }
    }

    #[test]
    fn test_slot_encoding_distinguishes_zero_address() {
        assert_eq!(decode_slot(0), None);
        assert_eq!(decode_slot(encode_slot(0)), Some(0));
        assert_eq!(decode_slot(encode_slot(0x0a00_0001)), Some(0x0a00_0001));
    }

    #[test]
    fn test_table_contains_finds_stored_addresses() {
        let slots = VecSlots(vec![encode_slot(1), encode_slot(2), 0, 0]);
        assert!(table_contains(&slots, 1));
        assert!(table_contains(&slots, 2));
        assert!(!table_contains(&slots, 3));
    }

    #[test]
    fn test_table_contains_empty_table_blocks_nothing() {
        let slots = VecSlots(vec![0; 8]);
        assert!(!table_contains(&slots, 0));
        assert!(!table_contains(&slots, u32::MAX));
    }

    #[test]
    fn test_table_contains_stops_at_first_empty_slot() {
        // Anything past a hole is never consulted
        let slots = VecSlots(vec![encode_slot(1), 0, encode_slot(7)]);
        assert!(!table_contains(&slots, 7));
    }

    #[test]
    fn test_table_contains_full_table() {
        let slots = VecSlots((0..MAX_BLOCKED_ADDRS).map(|a| encode_slot(a + 100)).collect());
        assert!(table_contains(&slots, 100));
        assert!(table_contains(&slots, MAX_BLOCKED_ADDRS + 99));
        assert!(!table_contains(&slots, 99));
    }
}
