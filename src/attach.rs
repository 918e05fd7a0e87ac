//! Attachment lifecycle: `Attached` until detached, then `Detached` for good.

use crate::error::Result;
use crate::interface::Interface;
use tracing::{debug, info, warn};

/// A live binding that can be undone once
pub trait DetachLink {
    fn detach(self) -> Result<()>;
}

/// Binds a loaded program to an interface's receive path
pub trait AttachmentManager {
    type Program;
    type Link: DetachLink;

    /// Resolve the target interface by name
    fn resolve(&self, name: &str) -> Result<Interface> {
        Interface::resolve(name)
    }

    /// Attach `program` to `interface`
    ///
    /// Fails with `InterfaceNotFound` if the device is gone and with
    /// `AttachRejected` if the kernel refuses the program.
    fn attach(
        &mut self,
        program: &mut Self::Program,
        interface: &Interface,
    ) -> Result<Attachment<Self::Link>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentState {
    Attached,
    Detached,
}

/// Handle for a program bound to an interface
///
/// Dropping an attached handle detaches it.
pub struct Attachment<L: DetachLink> {
    interface: Interface,
    link: Option<L>,
}

impl<L: DetachLink> Attachment<L> {
    pub fn new(interface: Interface, link: L) -> Self {
        Self {
            interface,
            link: Some(link),
        }
    }

    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    pub fn state(&self) -> AttachmentState {
        if self.link.is_some() {
            AttachmentState::Attached
        } else {
            AttachmentState::Detached
        }
    }

    /// Detach from the interface.
    ///
    /// Safe to call more than once. Failures (typically the interface having
    /// disappeared) are logged and swallowed so shutdown always completes.
    pub fn detach(&mut self) {
        let Some(link) = self.link.take() else {
            debug!("Attachment on {} already detached", self.interface);
            return;
        };

        match link.detach() {
            Ok(()) => info!("✓ Detached from {}", self.interface),
            Err(e) => warn!("Failed to detach from {} (ignored): {}", self.interface, e),
        }
    }
}

impl<L: DetachLink> Drop for Attachment<L> {
    fn drop(&mut self) {
        self.detach();
    }
}
