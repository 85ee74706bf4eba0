use core::fmt;
use kernel_alloc::{AllocError, FrameSlotAllocator, SwapDevice};
use kernel_vmem::{EntryKind, FrameIndex, PhysicalMemory};
use log::debug;

/// Pages owned by one address space.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Footprint {
    /// Directory frames (1 for a live context).
    pub directory: u32,
    /// Second-level table frames.
    pub tables: u32,
    /// Resident data frames.
    pub resident: u32,
    /// Data pages held in swap slots.
    pub swapped: u32,
}

impl Footprint {
    /// Physical frames held, directory and tables included.
    #[must_use]
    pub const fn frames(&self) -> u32 {
        self.directory + self.tables + self.resident
    }

    /// Swap slots held.
    #[must_use]
    pub const fn slots(&self) -> u32 {
        self.swapped
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tables, {} resident, {} swapped",
            self.tables, self.resident, self.swapped
        )
    }
}

/// The page-table root of one process.
///
/// A context exclusively owns its directory frame and every table, data
/// frame and swap slot reachable from it. It has no `Drop` impl because
/// releasing those needs the allocator; hand it to
/// [`destroy`](Self::destroy) instead.
#[must_use = "a dropped context leaks its frames; call destroy"]
#[derive(Debug, PartialEq, Eq)]
pub struct ProcessMemoryContext {
    root: FrameIndex,
}

impl ProcessMemoryContext {
    /// Allocate a directory frame and build an empty context on it.
    ///
    /// # Errors
    /// Whatever [`FrameSlotAllocator::allocate_frame`] reports for a
    /// directory frame.
    pub fn create<S: SwapDevice>(
        memory: &mut PhysicalMemory,
        frames: &mut FrameSlotAllocator<S>,
    ) -> Result<Self, AllocError> {
        let root = frames.allocate_frame(memory, true)?;
        Ok(Self::from_root(memory, root))
    }

    /// Build a context on `root`, a frame obtained with
    /// `allocate_frame(.., true)`. Every directory entry is cleared.
    pub fn from_root(memory: &mut PhysicalMemory, root: FrameIndex) -> Self {
        memory.frame_mut(root).clear();
        debug!("Created address space with directory {root}");
        Self { root }
    }

    #[must_use]
    pub const fn root(&self) -> FrameIndex {
        self.root
    }

    /// Count the pages this context currently holds.
    #[must_use]
    pub fn footprint(&self, memory: &PhysicalMemory) -> Footprint {
        let mut footprint = Footprint {
            directory: 1,
            ..Footprint::default()
        };
        for table in Self::tables(memory, self.root) {
            footprint.tables += 1;
            for (_, pte) in memory.frame(table).mapped_entries() {
                match pte.kind() {
                    Some(EntryKind::Resident { .. }) => footprint.resident += 1,
                    Some(EntryKind::Swapped(_)) => footprint.swapped += 1,
                    None => {}
                }
            }
        }
        footprint
    }

    /// Release every data frame, swap slot and table reachable from the
    /// directory, then the directory itself. Returns what was released.
    pub fn destroy<S: SwapDevice>(
        self,
        memory: &PhysicalMemory,
        frames: &mut FrameSlotAllocator<S>,
    ) -> Footprint {
        let mut released = Footprint {
            directory: 1,
            ..Footprint::default()
        };

        for table in Self::tables(memory, self.root) {
            for (_, pte) in memory.frame(table).mapped_entries() {
                match pte.kind() {
                    Some(EntryKind::Resident { frame, .. }) => {
                        frames.free_frame(frame);
                        released.resident += 1;
                    }
                    Some(EntryKind::Swapped(slot)) => {
                        frames.free_slot(slot);
                        released.swapped += 1;
                    }
                    None => {}
                }
            }
            frames.free_frame(table);
            released.tables += 1;
        }

        frames.free_frame(self.root);
        debug!("Destroyed address space {}: released {released}", self.root);
        released
    }

    /// Frames of the tables linked from the directory at `root`.
    fn tables(memory: &PhysicalMemory, root: FrameIndex) -> impl Iterator<Item = FrameIndex> + '_ {
        memory
            .frame(root)
            .mapped_entries()
            .filter_map(|(_, pde)| pde.frame())
    }
}
