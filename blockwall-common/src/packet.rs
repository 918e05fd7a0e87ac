//! Per-packet decision logic.
//!
//! The frame is expected to start at the Ethernet header (XDP context).
//! Every read is bounds-checked and anything the parser cannot classify
//! resolves to [`Verdict::Forward`].

use crate::{table_contains, SlotSource};

/// Ethernet II header length
pub const ETH_HDR_LEN: usize = 14;

/// EtherType for IPv4
pub const ETH_P_IPV4: u16 = 0x0800;

// EtherType offset within the Ethernet header
const ETH_TYPE_OFFSET: usize = 12;

// Minimum IPv4 header length (IHL = 5)
const IPV4_MIN_HDR_LEN: usize = 20;

// Source address offset within the IPv4 header
const IPV4_SRC_OFFSET: usize = 12;

/// Verdict for a single packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Forward,
    Drop,
}

/// Bounds-checked byte access to a packet
pub trait PacketBytes {
    /// Byte at `offset`, `None` when past the end of the packet
    fn byte(&self, offset: usize) -> Option<u8>;

    #[inline(always)]
    fn be_u16(&self, offset: usize) -> Option<u16> {
        let hi = self.byte(offset)?;
        let lo = self.byte(offset + 1)?;
        Some(((hi as u16) << 8) | lo as u16)
    }

    #[inline(always)]
    fn be_u32(&self, offset: usize) -> Option<u32> {
        let b0 = self.byte(offset)?;
        let b1 = self.byte(offset + 1)?;
        let b2 = self.byte(offset + 2)?;
        let b3 = self.byte(offset + 3)?;
        Some(((b0 as u32) << 24) | ((b1 as u32) << 16) | ((b2 as u32) << 8) | (b3 as u32))
    }
}

impl PacketBytes for [u8] {
    #[inline(always)]
    fn byte(&self, offset: usize) -> Option<u8> {
        self.get(offset).copied()
    }
}

/// Extract the IPv4 source address of an Ethernet frame.
///
/// Returns `None` for non-IPv4 frames, malformed IPv4 headers, and frames
/// too short to hold a minimal IPv4 header.
#[inline(always)]
pub fn source_ipv4<P: PacketBytes + ?Sized>(packet: &P) -> Option<u32> {
    if packet.be_u16(ETH_TYPE_OFFSET)? != ETH_P_IPV4 {
        return None;
    }

    let version_ihl = packet.byte(ETH_HDR_LEN)?;
    if version_ihl >> 4 != 4 || version_ihl & 0x0f < 5 {
        return None;
    }

    // Whole fixed header must be present
    packet.byte(ETH_HDR_LEN + IPV4_MIN_HDR_LEN - 1)?;

    packet.be_u32(ETH_HDR_LEN + IPV4_SRC_OFFSET)
}

/// Decide whether a frame is dropped or forwarded.
///
/// Drop only when the source address is positively found in the table.
#[inline(always)]
pub fn inspect<P, S>(packet: &P, slots: &S) -> Verdict
where
    P: PacketBytes + ?Sized,
    S: SlotSource + ?Sized,
{
    match source_ipv4(packet) {
        Some(src) if table_contains(slots, src) => Verdict::Drop,
        _ => Verdict::Forward,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode_slot;

    struct VecSlots(Vec<u64>);

    impl SlotSource for VecSlots {
        fn capacity(&self) -> u32 {
            self.0.len() as u32
        }

        fn slot(&self, index: u32) -> Option<u64> {
            self.0.get(index as usize).copied()
        }
    }

    fn table(addrs: &[[u8; 4]]) -> VecSlots {
        let mut slots: Vec<u64> = addrs
            .iter()
            .map(|a| encode_slot(u32::from_be_bytes(*a)))
            .collect();
        slots.resize(16, 0);
        VecSlots(slots)
    }

    fn ipv4_frame(src: [u8; 4]) -> Vec<u8> {
        let mut frame = vec![0u8; ETH_HDR_LEN + IPV4_MIN_HDR_LEN + 8];
        frame[0..6].copy_from_slice(&[0xff; 6]);
        frame[6..12].copy_from_slice(&[0x02, 0, 0, 0, 0, 1]);
        frame[12..14].copy_from_slice(&ETH_P_IPV4.to_be_bytes());
        let ip = &mut frame[ETH_HDR_LEN..];
        ip[0] = 0x45;
        ip[8] = 64;
        ip[9] = 17;
        ip[12..16].copy_from_slice(&src);
        ip[16..20].copy_from_slice(&[192, 168, 1, 1]);
        frame
    }

    #[test]
    fn test_blocked_source_is_dropped() {
        let slots = table(&[[10, 0, 0, 1], [10, 0, 0, 2]]);
        assert_eq!(inspect(&ipv4_frame([10, 0, 0, 2])[..], &slots), Verdict::Drop);
    }

    #[test]
    fn test_unlisted_source_is_forwarded() {
        let slots = table(&[[10, 0, 0, 1]]);
        assert_eq!(inspect(&ipv4_frame([10, 0, 0, 3])[..], &slots), Verdict::Forward);
    }

    #[test]
    fn test_destination_match_is_not_a_source_match() {
        let slots = table(&[[192, 168, 1, 1]]);
        assert_eq!(inspect(&ipv4_frame([10, 0, 0, 3])[..], &slots), Verdict::Forward);
    }

    #[test]
    fn test_non_ipv4_ethertype_is_forwarded() {
        let slots = table(&[[10, 0, 0, 1]]);
        let mut frame = ipv4_frame([10, 0, 0, 1]);
        // IPv6
        frame[12..14].copy_from_slice(&0x86ddu16.to_be_bytes());
        assert_eq!(inspect(&frame[..], &slots), Verdict::Forward);
        // ARP
        frame[12..14].copy_from_slice(&0x0806u16.to_be_bytes());
        assert_eq!(inspect(&frame[..], &slots), Verdict::Forward);
    }

    #[test]
    fn test_bad_version_or_ihl_is_forwarded() {
        let slots = table(&[[10, 0, 0, 1]]);
        let mut frame = ipv4_frame([10, 0, 0, 1]);
        frame[ETH_HDR_LEN] = 0x65;
        assert_eq!(inspect(&frame[..], &slots), Verdict::Forward);
        frame[ETH_HDR_LEN] = 0x44;
        assert_eq!(inspect(&frame[..], &slots), Verdict::Forward);
    }

    #[test]
    fn test_truncated_frames_are_forwarded() {
        let slots = table(&[[10, 0, 0, 1]]);
        let frame = ipv4_frame([10, 0, 0, 1]);
        for len in 0..ETH_HDR_LEN + IPV4_MIN_HDR_LEN {
            assert_eq!(
                inspect(&frame[..len], &slots),
                Verdict::Forward,
                "length {len}"
            );
        }
        assert_eq!(
            inspect(&frame[..ETH_HDR_LEN + IPV4_MIN_HDR_LEN], &slots),
            Verdict::Drop
        );
    }

    #[test]
    fn test_source_ipv4_is_big_endian() {
        let frame = ipv4_frame([192, 0, 2, 7]);
        assert_eq!(source_ipv4(&frame[..]), Some(0xc000_0207));
    }
}
