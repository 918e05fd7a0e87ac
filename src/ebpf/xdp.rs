use super::LoadedProgram;
use crate::attach::{Attachment, AttachmentManager, DetachLink};
use crate::cli::XdpMode;
use crate::error::{BlockwallError, Result};
use crate::interface::Interface;
use aya::programs::links::Link;
use aya::programs::xdp::XdpLink;
use aya::programs::{Xdp, XdpFlags};
use blockwall_common::XDP_PROGRAM;
use tracing::{debug, info};

/// Attaches the blocklist program at the XDP hook
pub struct XdpAttacher {
    flags: XdpFlags,
}

impl XdpAttacher {
    pub fn new(mode: XdpMode) -> Self {
        Self {
            flags: xdp_flags(mode),
        }
    }
}

impl AttachmentManager for XdpAttacher {
    type Program = LoadedProgram;
    type Link = XdpLink;

    fn attach(
        &mut self,
        program: &mut LoadedProgram,
        interface: &Interface,
    ) -> Result<Attachment<XdpLink>> {
        if !interface.is_present() {
            return Err(BlockwallError::InterfaceNotFound(interface.name.clone()));
        }

        let xdp: &mut Xdp = program
            .bpf
            .program_mut(XDP_PROGRAM)
            .ok_or_else(|| {
                BlockwallError::ProgramLoad(format!("{} program not found in eBPF object", XDP_PROGRAM))
            })?
            .try_into()
            .map_err(|e| BlockwallError::ProgramLoad(format!("Failed to convert to Xdp program: {}", e)))?;

        xdp.load().map_err(|e| {
            BlockwallError::ProgramLoad(format!("Failed to load XDP program into kernel: {}", e))
        })?;
        debug!("Loaded {} into kernel", XDP_PROGRAM);

        let link_id = xdp.attach(&interface.name, self.flags).map_err(|e| {
            BlockwallError::AttachRejected(format!(
                "Failed to attach XDP program to {}: {}",
                interface.name, e
            ))
        })?;

        let link = xdp.take_link(link_id).map_err(|e| {
            BlockwallError::AttachRejected(format!("Failed to take XDP link on {}: {}", interface.name, e))
        })?;

        info!("✓ Attached XDP program to {}", interface);
        Ok(Attachment::new(interface.clone(), link))
    }
}

impl DetachLink for XdpLink {
    fn detach(self) -> Result<()> {
        Link::detach(self).map_err(|e| BlockwallError::Detach(e.to_string()))
    }
}

fn xdp_flags(mode: XdpMode) -> XdpFlags {
    match mode {
        XdpMode::Auto => XdpFlags::default(),
        XdpMode::Skb => XdpFlags::SKB_MODE,
        XdpMode::Driver => XdpFlags::DRV_MODE,
        XdpMode::Hw => XdpFlags::HW_MODE,
    }
}
