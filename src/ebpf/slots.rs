use crate::error::{BlockwallError, Result};
use crate::table::SlotStore;
use aya::maps::{Array, MapData};

/// Slot storage backed by the kernel `BLOCKED_IPV4` array map.
///
/// Each `store` is one `BPF_MAP_UPDATE_ELEM` on a single 8-byte element.
pub struct MapSlots {
    array: Array<MapData, u64>,
}

impl MapSlots {
    pub fn new(array: Array<MapData, u64>) -> Self {
        Self { array }
    }
}

impl SlotStore for MapSlots {
    fn capacity(&self) -> u32 {
        self.array.len()
    }

    fn store(&mut self, slot: u32, word: u64) -> Result<()> {
        self.array
            .set(slot, word, 0)
            .map_err(|e| BlockwallError::Map(format!("Failed to write slot {}: {}", slot, e)))
    }

    fn load(&self, slot: u32) -> Result<u64> {
        self.array
            .get(&slot, 0)
            .map_err(|e| BlockwallError::Map(format!("Failed to read slot {}: {}", slot, e)))
    }
}
