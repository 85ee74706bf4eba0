use crate::error::AccessError;
use crate::fault::PageFaultHandler;
use crate::manager::MemoryCore;
use crate::process::{Footprint, ProcessMemoryContext};
use crate::translation::{read_word, write_word};
use kernel_alloc::SwapDevice;
use kernel_vmem::{FrameIndex, VirtualAddress};
use spin::Mutex;

/// A process's view of memory: word reads and writes through its own page
/// tables.
///
/// Dropping the `Cpu` tears down the process's address space.
pub struct Cpu<'m, S: SwapDevice> {
    core: &'m Mutex<MemoryCore<S>>,
    context: Option<ProcessMemoryContext>,
}

impl<'m, S: SwapDevice> Cpu<'m, S> {
    pub(crate) const fn new(core: &'m Mutex<MemoryCore<S>>, context: ProcessMemoryContext) -> Self {
        Self {
            core,
            context: Some(context),
        }
    }

    /// Frame of this process's page directory.
    #[must_use]
    pub fn root(&self) -> FrameIndex {
        self.context().root()
    }

    /// Read the 32-bit word at `address`, faulting it in if needed.
    ///
    /// # Errors
    /// See [`AccessError`].
    pub fn read_u32(&self, address: u32) -> Result<u32, AccessError> {
        let root = self.root();
        read_word(&mut *self.core.lock(), root, VirtualAddress::new(address))
    }

    /// Write the 32-bit word at `address`, faulting it in if needed.
    ///
    /// # Errors
    /// See [`AccessError`].
    pub fn write_u32(&self, address: u32, value: u32) -> Result<(), AccessError> {
        let root = self.root();
        write_word(&mut *self.core.lock(), root, VirtualAddress::new(address), value)
    }

    /// Pages currently held by this process.
    #[must_use]
    pub fn footprint(&self) -> Footprint {
        let core = self.core.lock();
        self.context().footprint(core.memory())
    }

    fn context(&self) -> &ProcessMemoryContext {
        match &self.context {
            Some(context) => context,
            None => unreachable!("context is only taken on drop"),
        }
    }
}

impl<S: SwapDevice> Drop for Cpu<'_, S> {
    fn drop(&mut self) {
        if let Some(context) = self.context.take() {
            self.core.lock().destroy_context(context);
        }
    }
}
