//! The blocklist table shared with the XDP program.
//!
//! Slots are assigned densely from 0, one per configured address that
//! encodes successfully. Each write is one 64-bit store of an occupied slot
//! word, so a concurrent reader sees either the old word or the new one.

use crate::codec;
use crate::error::{AddressError, BlockwallError, Result};
use blockwall_common::{encode_slot, decode_slot, table_contains, SlotSource, MAX_BLOCKED_ADDRS};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Word-addressed backing storage for the table
pub trait SlotStore {
    /// Number of slots the storage can hold
    fn capacity(&self) -> u32;

    /// Store one slot word
    fn store(&mut self, slot: u32, word: u64) -> Result<()>;

    /// Load one slot word
    fn load(&self, slot: u32) -> Result<u64>;
}

/// In-process slot storage
///
/// Used by `--check` and by tests in place of the kernel map.
pub struct MemorySlots {
    slots: Box<[AtomicU64]>,
}

impl MemorySlots {
    pub fn new(capacity: u32) -> Self {
        Self {
            slots: (0..capacity).map(|_| AtomicU64::new(0)).collect(),
        }
    }
}

impl Default for MemorySlots {
    fn default() -> Self {
        Self::new(MAX_BLOCKED_ADDRS)
    }
}

impl SlotStore for MemorySlots {
    fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    fn store(&mut self, slot: u32, word: u64) -> Result<()> {
        let cell = self
            .slots
            .get(slot as usize)
            .ok_or_else(|| BlockwallError::Map(format!("slot {} out of range", slot)))?;
        cell.store(word, Ordering::Release);
        Ok(())
    }

    fn load(&self, slot: u32) -> Result<u64> {
        self.slots
            .get(slot as usize)
            .map(|cell| cell.load(Ordering::Acquire))
            .ok_or_else(|| BlockwallError::Map(format!("slot {} out of range", slot)))
    }
}

/// Why a configured entry did not make it into the table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error(transparent)]
    Invalid(#[from] AddressError),

    #[error("table full (capacity {capacity})")]
    CapacityExceeded { capacity: u32 },

    #[error("failed to write slot {slot}: {message}")]
    StoreFailed { slot: u32, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    /// Raw text as it appeared in the configuration
    pub input: String,
    pub reason: RejectReason,
}

/// Outcome of a [`BlockTable::populate`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulationReport {
    pub attempted: usize,
    pub inserted: usize,
    pub rejected: Vec<RejectedEntry>,
}

impl PopulationReport {
    /// True when every configured entry was written
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

pub struct BlockTable<S> {
    slots: S,
}

impl<S: SlotStore> BlockTable<S> {
    pub fn new(slots: S) -> Self {
        Self { slots }
    }

    /// Usable slots, bounded by what the XDP program scans
    pub fn capacity(&self) -> u32 {
        self.slots.capacity().min(MAX_BLOCKED_ADDRS)
    }

    /// Write the configured addresses into the table.
    ///
    /// Invalid entries and entries beyond capacity are skipped and reported;
    /// they never abort the remaining writes.
    pub fn populate<I, T>(&mut self, addresses: I) -> PopulationReport
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let capacity = self.capacity();
        let mut report = PopulationReport::default();
        let mut next_slot: u32 = 0;

        for raw in addresses {
            let raw = raw.as_ref();
            report.attempted += 1;

            let reason = match codec::encode(raw) {
                Err(e) => RejectReason::from(e),
                Ok(_) if next_slot >= capacity => RejectReason::CapacityExceeded { capacity },
                Ok(key) => match self.slots.store(next_slot, encode_slot(key)) {
                    Ok(()) => {
                        debug!("slot {} <- {}", next_slot, raw);
                        next_slot += 1;
                        report.inserted += 1;
                        continue;
                    }
                    Err(e) => RejectReason::StoreFailed {
                        slot: next_slot,
                        message: e.to_string(),
                    },
                },
            };

            warn!("Skipping blocklist entry {:?}: {}", raw, reason);
            report.rejected.push(RejectedEntry {
                input: raw.to_string(),
                reason,
            });
        }

        info!(
            "✓ Populated {} of {} blocklist entries",
            report.inserted, report.attempted
        );
        report
    }

    /// True iff `candidate` is stored in the table
    pub fn lookup(&self, candidate: u32) -> bool {
        table_contains(self, candidate)
    }

    /// Occupied slots as `(slot, key)` pairs, in slot order
    pub fn entries(&self) -> Vec<(u32, u32)> {
        (0..self.capacity())
            .map_while(|slot| self.slot(slot).and_then(decode_slot).map(|key| (slot, key)))
            .collect()
    }
}

impl<S: SlotStore> SlotSource for BlockTable<S> {
    fn capacity(&self) -> u32 {
        BlockTable::capacity(self)
    }

    fn slot(&self, index: u32) -> Option<u64> {
        self.slots.load(index).ok()
    }
}
