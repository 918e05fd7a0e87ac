//! aya-backed program loader and XDP attachment.
//!
//! # Requirements
//! - Root, or CAP_BPF and CAP_NET_ADMIN
//! - Linux kernel with XDP and bounded-loop support (5.3+)
//! - The `blockwall-ebpf` object built for `bpfel-unknown-none`

mod slots;
mod xdp;

use crate::error::{BlockwallError, Result};
use crate::loader::ProgramLoader;
use crate::table::BlockTable;
use aya::maps::Array;
use aya::Bpf;
use blockwall_common::BLOCKED_IPV4_MAP;
use tracing::{debug, info, warn};

pub use slots::MapSlots;
pub use xdp::XdpAttacher;

/// Embedded eBPF program bytecode (compiled at build time)
/// Note: The eBPF program must be built BEFORE building the release binary
#[cfg(not(debug_assertions))]
static EBPF_BYTES: &[u8] = aya::include_bytes_aligned!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/target/bpfel-unknown-none/release/blockwall-ebpf"
));

/// Path to eBPF program in debug mode
#[cfg(debug_assertions)]
fn ebpf_program_path() -> String {
    format!(
        "{}/target/bpfel-unknown-none/release/blockwall-ebpf",
        env!("CARGO_MANIFEST_DIR")
    )
}

/// A loaded eBPF object holding the XDP program
pub struct LoadedProgram {
    bpf: Bpf,
}

/// Loads the blockwall eBPF object into the kernel
#[derive(Debug, Default)]
pub struct AyaProgramLoader;

impl AyaProgramLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ProgramLoader for AyaProgramLoader {
    type Program = LoadedProgram;
    type Slots = MapSlots;

    fn load(&mut self) -> Result<LoadedProgram> {
        if let Err(e) = verify_capabilities() {
            warn!("Missing capabilities, loading will likely fail: {}", e);
        }

        let bpf = load_ebpf_object()?;
        info!("✓ Loaded eBPF object");
        Ok(LoadedProgram { bpf })
    }

    fn block_table(&mut self, program: &mut LoadedProgram) -> Result<BlockTable<MapSlots>> {
        let map = program.bpf.take_map(BLOCKED_IPV4_MAP).ok_or_else(|| {
            BlockwallError::ProgramLoad(format!("{} map not found in eBPF object", BLOCKED_IPV4_MAP))
        })?;

        let array: Array<_, u64> = Array::try_from(map).map_err(|e| {
            BlockwallError::Map(format!("Failed to convert {} to Array: {}", BLOCKED_IPV4_MAP, e))
        })?;

        debug!("{} map has {} slots", BLOCKED_IPV4_MAP, array.len());
        Ok(BlockTable::new(MapSlots::new(array)))
    }

    fn close(&mut self, program: LoadedProgram) {
        drop(program.bpf);
        info!("✓ Released eBPF object");
    }
}

/// Load eBPF object from embedded bytes or file
fn load_ebpf_object() -> Result<Bpf> {
    #[cfg(not(debug_assertions))]
    {
        info!("Loading embedded eBPF program");
        Bpf::load(EBPF_BYTES).map_err(|e| {
            BlockwallError::ProgramLoad(format!("Failed to load embedded eBPF program: {}", e))
        })
    }

    #[cfg(debug_assertions)]
    {
        let path = ebpf_program_path();
        if !std::path::Path::new(&path).exists() {
            return Err(BlockwallError::ProgramLoad(format!(
                "eBPF program not found at: {}",
                path
            )));
        }

        info!("Loading eBPF program from file (debug mode)");
        Bpf::load_file(&path).map_err(|e| {
            BlockwallError::ProgramLoad(format!("Failed to load eBPF program from file: {}", e))
        })
    }
}

/// Verify that we have CAP_BPF and CAP_NET_ADMIN
fn verify_capabilities() -> std::result::Result<(), String> {
    let euid = unsafe { libc::geteuid() };
    if euid == 0 {
        debug!("Running as root, capabilities available");
        return Ok(());
    }

    for cap in [caps::Capability::CAP_BPF, caps::Capability::CAP_NET_ADMIN] {
        match caps::has_cap(None, caps::CapSet::Effective, cap) {
            Ok(true) => debug!("{} available", cap),
            Ok(false) => return Err(format!("{} not available", cap)),
            Err(e) => return Err(format!("Failed to check {}: {}", cap, e)),
        }
    }

    Ok(())
}
