use crate::error::{BlockwallError, Result};
use std::ffi::CString;
use std::fmt;

/// Default interface when none is given on the command line
pub const DEFAULT_INTERFACE: &str = "eth0";

/// A network device resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub index: u32,
}

impl Interface {
    /// Resolve an interface name to its kernel index
    pub fn resolve(name: &str) -> Result<Self> {
        let index = if_index(name).ok_or_else(|| BlockwallError::InterfaceNotFound(name.to_string()))?;
        Ok(Self {
            name: name.to_string(),
            index,
        })
    }

    /// Check the device still exists under the same name
    pub fn is_present(&self) -> bool {
        if_index(&self.name).is_some()
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ifindex {})", self.name, self.index)
    }
}

/// Kernel index for `name`, `None` if no such device
fn if_index(name: &str) -> Option<u32> {
    if name.is_empty() || name.len() >= libc::IF_NAMESIZE {
        return None;
    }
    let c_name = CString::new(name).ok()?;
    let index = unsafe { libc::if_nametoindex(c_name.as_ptr()) };
    (index != 0).then_some(index)
}
