use crate::error::Result;
use crate::table::{BlockTable, SlotStore};

/// Loads the inspection program and hands out its table storage
pub trait ProgramLoader {
    /// Opaque loaded program, passed to the attachment manager
    type Program;
    type Slots: SlotStore;

    fn load(&mut self) -> Result<Self::Program>;

    /// Take the program's blocklist table.
    ///
    /// The table must stay alive until the program is attached; the control
    /// plane keeps it until after detach.
    fn block_table(&mut self, program: &mut Self::Program) -> Result<BlockTable<Self::Slots>>;

    /// Release the program
    fn close(&mut self, program: Self::Program);
}
