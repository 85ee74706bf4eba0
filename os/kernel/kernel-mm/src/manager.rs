use crate::cpu::Cpu;
use crate::error::FaultError;
use crate::fault::{PageFaultHandler, resolve};
use crate::process::{Footprint, ProcessMemoryContext};
use kernel_alloc::{AllocError, FrameSlotAllocator, SwapDevice};
use kernel_info::MemoryConfig;
use kernel_vmem::{Access, FrameIndex, PhysicalMemory, VirtualAddress};
use log::info;
use spin::Mutex;

/// The memory image and the allocator that manages it.
///
/// Everything the fault resolver and the translation walk need, in one
/// place so one lock can cover both.
pub struct MemoryCore<S> {
    memory: PhysicalMemory,
    frames: FrameSlotAllocator<S>,
}

impl<S: SwapDevice> MemoryCore<S> {
    /// Zeroed memory of `config.frames()` frames and a fresh allocator.
    #[must_use]
    pub fn new(config: &MemoryConfig, swap: S) -> Self {
        Self {
            memory: PhysicalMemory::new(config.frames()),
            frames: FrameSlotAllocator::new(config, swap),
        }
    }

    #[must_use]
    pub const fn frames(&self) -> &FrameSlotAllocator<S> {
        &self.frames
    }

    pub const fn frames_mut(&mut self) -> &mut FrameSlotAllocator<S> {
        &mut self.frames
    }

    /// Both halves at once, for callers that drive the allocator by hand.
    pub const fn split_mut(&mut self) -> (&mut PhysicalMemory, &mut FrameSlotAllocator<S>) {
        (&mut self.memory, &mut self.frames)
    }

    /// Allocate a directory frame and build a context on it.
    ///
    /// # Errors
    /// See [`ProcessMemoryContext::create`].
    pub fn create_context(&mut self) -> Result<ProcessMemoryContext, AllocError> {
        ProcessMemoryContext::create(&mut self.memory, &mut self.frames)
    }

    /// Tear down `context`, see [`ProcessMemoryContext::destroy`].
    pub fn destroy_context(&mut self, context: ProcessMemoryContext) -> Footprint {
        context.destroy(&self.memory, &mut self.frames)
    }

    #[must_use]
    pub fn into_swap(self) -> S {
        self.frames.into_swap()
    }
}

impl<S: SwapDevice> PageFaultHandler for MemoryCore<S> {
    fn memory(&self) -> &PhysicalMemory {
        &self.memory
    }

    fn memory_mut(&mut self) -> &mut PhysicalMemory {
        &mut self.memory
    }

    fn handle_page_fault(
        &mut self,
        root: FrameIndex,
        address: VirtualAddress,
        access: Access,
    ) -> Result<(), FaultError> {
        resolve(&mut self.memory, &mut self.frames, root, address, access)
    }
}

/// One simulation session: a memory image shared by any number of
/// processes.
///
/// Every access made through a [`Cpu`] holds the session lock for the whole
/// walk, including a fault and any swap I/O it causes, so processes may run
/// on different threads.
///
/// ```rust
/// use kernel_alloc::MemorySwap;
/// use kernel_info::MemoryConfig;
/// use kernel_mm::MemoryManager;
///
/// let config = MemoryConfig::new(16, 16).unwrap();
/// let manager = MemoryManager::new(&config, MemorySwap::new(config.swap_slots()));
/// let value = manager
///     .run(|cpu| {
///         cpu.write_u32(0x1000, 42)?;
///         cpu.read_u32(0x1000)
///     })
///     .unwrap();
/// assert_eq!(value, Ok(42));
/// manager.with_core(|core| assert_eq!(core.frames().free_frames(), 15));
/// ```
pub struct MemoryManager<S> {
    core: Mutex<MemoryCore<S>>,
}

impl<S: SwapDevice> MemoryManager<S> {
    #[must_use]
    pub fn new(config: &MemoryConfig, swap: S) -> Self {
        info!(
            "Memory session with {} frames and {} swap slots",
            config.frames(),
            config.swap_slots()
        );
        Self {
            core: Mutex::new(MemoryCore::new(config, swap)),
        }
    }

    /// Run `entry` as the initial process.
    ///
    /// The process's address space exists before `entry` is called and is
    /// torn down after it returns.
    ///
    /// # Errors
    /// If the initial address space cannot be created.
    pub fn run<R>(&self, entry: impl FnOnce(&Cpu<'_, S>) -> R) -> Result<R, AllocError> {
        let cpu = self.spawn()?;
        Ok(entry(&cpu))
    }

    /// Create another process sharing this session's memory.
    ///
    /// Its address space lives as long as the returned [`Cpu`].
    ///
    /// # Errors
    /// If no directory frame can be allocated or the registry is full.
    pub fn spawn(&self) -> Result<Cpu<'_, S>, AllocError> {
        let context = self.core.lock().create_context()?;
        Ok(Cpu::new(&self.core, context))
    }

    /// Run `f` with exclusive access to the memory image and allocator.
    pub fn with_core<R>(&self, f: impl FnOnce(&mut MemoryCore<S>) -> R) -> R {
        f(&mut self.core.lock())
    }

    /// End the session and hand back the swap device.
    #[must_use]
    pub fn into_swap(self) -> S {
        self.core.into_inner().into_swap()
    }
}
