#![no_std]
#![no_main]

use aya_ebpf::{
    bindings::xdp_action,
    macros::{map, xdp},
    maps::Array,
    programs::XdpContext,
};
use blockwall_common::{inspect, PacketBytes, SlotSource, Verdict, MAX_BLOCKED_ADDRS};

/// Map storing blocked IPv4 source addresses
/// Key: u32 slot index (dense, starting at 0)
/// Value: u64 slot word (occupied bit | IPv4 address in big-endian numeric form)
#[map]
static BLOCKED_IPV4: Array<u64> = Array::with_max_entries(MAX_BLOCKED_ADDRS, 0);

/// Bounds-checked view over the XDP packet buffer
struct XdpPacket<'a> {
    ctx: &'a XdpContext,
}

impl PacketBytes for XdpPacket<'_> {
    #[inline(always)]
    fn byte(&self, offset: usize) -> Option<u8> {
        let start = self.ctx.data();
        let end = self.ctx.data_end();

        // The verifier needs this check before every dereference
        if start + offset + 1 > end {
            return None;
        }

        Some(unsafe { *((start + offset) as *const u8) })
    }
}

/// Read-only view over `BLOCKED_IPV4`
struct MapSlots;

impl SlotSource for MapSlots {
    #[inline(always)]
    fn capacity(&self) -> u32 {
        MAX_BLOCKED_ADDRS
    }

    #[inline(always)]
    fn slot(&self, index: u32) -> Option<u64> {
        // Single 64-bit load, never a torn address/marker pair
        BLOCKED_IPV4
            .get(index)
            .map(|word| unsafe { core::ptr::read_volatile(word) })
    }
}

/// XDP entry point for ingress packets
///
/// Returns:
/// - XDP_DROP if the IPv4 source address is in `BLOCKED_IPV4`
/// - XDP_PASS for everything else, including non-IPv4 and truncated frames (fail-open)
#[xdp]
pub fn xdp_block_ipv4(ctx: XdpContext) -> u32 {
    let packet = XdpPacket { ctx: &ctx };
    match inspect(&packet, &MapSlots) {
        Verdict::Drop => xdp_action::XDP_DROP,
        Verdict::Forward => xdp_action::XDP_PASS,
    }
}

#[cfg(not(test))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

#[link_section = "license"]
#[no_mangle]
static LICENSE: [u8; 13] = *b"Dual MIT/GPL\0";
