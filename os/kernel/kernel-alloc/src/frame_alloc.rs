use crate::free_list::IndexFreeList;
use crate::registry::DirectoryRegistry;
use crate::swap::SwapDevice;
use kernel_info::MemoryConfig;
use kernel_info::memory::RESERVED_FRAMES;
use kernel_vmem::{FrameIndex, PhysicalMemory, SlotIndex};
use log::{debug, trace, warn};

/// Failures reported by [`FrameSlotAllocator`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
    #[error("no free frame and no resident page to evict")]
    OutOfMemory,
    #[error("no free swap slot to evict into")]
    OutOfSwap,
    #[error("writing {frame} to swap {slot} failed")]
    SwapWrite { frame: FrameIndex, slot: SlotIndex },
    #[error("reading swap {slot} into {frame} failed")]
    SwapRead { frame: FrameIndex, slot: SlotIndex },
    #[error("page directory registry is full")]
    TooManyDirectories,
}

/// A resident data page chosen for eviction.
#[derive(Debug, Copy, Clone)]
struct Victim {
    table: FrameIndex,
    index: usize,
    frame: FrameIndex,
}

/// Tracks free frames, free swap slots and registered page directories, and
/// evicts resident pages to swap when frames run out.
///
/// The allocator does not own the memory image; every call that must look at
/// or change page tables takes it as an argument.
pub struct FrameSlotAllocator<S> {
    frames: IndexFreeList,
    slots: IndexFreeList,
    directories: DirectoryRegistry,
    swap: S,
}

impl<S: SwapDevice> FrameSlotAllocator<S> {
    /// Create an allocator for `config`, with every usable frame and every
    /// swap slot free. Frames below [`RESERVED_FRAMES`] are never handed out.
    pub fn new(config: &MemoryConfig, swap: S) -> Self {
        Self {
            frames: IndexFreeList::new(RESERVED_FRAMES, config.frames()),
            slots: IndexFreeList::new(0, config.swap_slots()),
            directories: DirectoryRegistry::new(),
            swap,
        }
    }

    /// Hand out a frame, evicting a resident data page if none is free.
    ///
    /// With `for_directory` the frame is also registered as a page-directory
    /// root, which makes its tables visible to the eviction scan.
    ///
    /// # Errors
    /// - [`AllocError::TooManyDirectories`] if `for_directory` and the
    ///   registry is full; no frame is taken in that case.
    /// - [`AllocError::OutOfMemory`] if no frame is free and nothing can be evicted.
    /// - [`AllocError::OutOfSwap`] / [`AllocError::SwapWrite`] if the eviction
    ///   could not store the victim; its entry is left unchanged.
    pub fn allocate_frame(
        &mut self,
        memory: &mut PhysicalMemory,
        for_directory: bool,
    ) -> Result<FrameIndex, AllocError> {
        if for_directory && !self.directories.has_room() {
            warn!("Cannot register another page directory");
            return Err(AllocError::TooManyDirectories);
        }

        let frame = match self.frames.pop() {
            Some(frame) => FrameIndex::new(frame),
            None => self.evict(memory)?,
        };

        if for_directory {
            let registered = self.directories.register(frame);
            debug_assert!(registered);
        }

        trace!("Allocated {frame} (directory: {for_directory})");
        Ok(frame)
    }

    /// Return `frame` to the free list, unregistering it if it was a root.
    ///
    /// # Panics
    /// If `frame` is reserved, out of range or already free.
    pub fn free_frame(&mut self, frame: FrameIndex) {
        assert!(
            frame.as_u32() >= RESERVED_FRAMES,
            "{frame} is reserved and cannot be freed"
        );
        if self.directories.release(frame) {
            trace!("Unregistered page directory {frame}");
        }
        self.frames.push(frame.as_u32());
    }

    /// Take a free swap slot.
    pub fn allocate_slot(&mut self) -> Option<SlotIndex> {
        self.slots.pop().map(SlotIndex::new)
    }

    /// Return `slot` to the free list.
    ///
    /// # Panics
    /// If `slot` is out of range or already free.
    pub fn free_slot(&mut self, slot: SlotIndex) {
        self.slots.push(slot.as_u32());
    }

    /// Load the content of `slot` into `frame`. The slot stays allocated.
    ///
    /// # Errors
    /// [`AllocError::SwapRead`] if the swap device reports a failure.
    pub fn swap_in(
        &mut self,
        memory: &mut PhysicalMemory,
        frame: FrameIndex,
        slot: SlotIndex,
    ) -> Result<(), AllocError> {
        if self.swap.read_page(slot, memory.frame_mut(frame)) {
            Ok(())
        } else {
            warn!("Reading {slot} into {frame} failed");
            Err(AllocError::SwapRead { frame, slot })
        }
    }

    /// Move the first resident data page in scan order to swap and return
    /// its frame.
    fn evict(&mut self, memory: &mut PhysicalMemory) -> Result<FrameIndex, AllocError> {
        let Some(victim) = self.find_victim(memory) else {
            warn!("Out of memory: no free frame and no page to evict");
            return Err(AllocError::OutOfMemory);
        };

        let Some(slot) = self.allocate_slot() else {
            warn!("Out of swap: cannot evict {}", victim.frame);
            return Err(AllocError::OutOfSwap);
        };

        if !self.swap.write_page(slot, memory.frame(victim.frame)) {
            self.free_slot(slot);
            warn!("Writing {} to {slot} failed", victim.frame);
            return Err(AllocError::SwapWrite {
                frame: victim.frame,
                slot,
            });
        }

        let entry = memory.entry(victim.table, victim.index);
        memory.set_entry(victim.table, victim.index, entry.swapped_out(slot));
        debug!(
            "Evicted {} (entry {} of table {}) to {slot}",
            victim.frame, victim.index, victim.table
        );
        Ok(victim.frame)
    }

    /// Scan registered directories in registry order, their present entries
    /// in index order and each table's present entries in index order.
    fn find_victim(&self, memory: &PhysicalMemory) -> Option<Victim> {
        self.directories.iter().find_map(|root| {
            memory
                .frame(root)
                .mapped_entries()
                .filter_map(|(_, pde)| pde.frame())
                .find_map(|table| {
                    memory
                        .frame(table)
                        .mapped_entries()
                        .find_map(|(index, pte)| {
                            pte.frame().map(|frame| Victim {
                                table,
                                index,
                                frame,
                            })
                        })
                })
        })
    }

    /// Number of frames currently free.
    #[must_use]
    pub const fn free_frames(&self) -> u32 {
        self.frames.free()
    }

    /// Number of swap slots currently free.
    #[must_use]
    pub const fn free_slots(&self) -> u32 {
        self.slots.free()
    }

    /// Number of frames the allocator manages, reserved frames excluded.
    #[must_use]
    pub const fn total_frames(&self) -> u32 {
        self.frames.capacity() - RESERVED_FRAMES
    }

    #[must_use]
    pub const fn total_slots(&self) -> u32 {
        self.slots.capacity()
    }

    /// `true` if `frame` is a registered page-directory root.
    #[must_use]
    pub fn is_directory(&self, frame: FrameIndex) -> bool {
        self.directories.contains(frame)
    }

    #[must_use]
    pub fn is_frame_free(&self, frame: FrameIndex) -> bool {
        self.frames.is_free(frame.as_u32())
    }

    #[must_use]
    pub fn is_slot_free(&self, slot: SlotIndex) -> bool {
        self.slots.is_free(slot.as_u32())
    }

    #[must_use]
    pub const fn directories(&self) -> &DirectoryRegistry {
        &self.directories
    }

    /// Free frames in the order they will be handed out.
    pub fn free_frame_list(&self) -> impl Iterator<Item = FrameIndex> + '_ {
        self.frames.iter().map(FrameIndex::new)
    }

    /// Free swap slots in the order they will be handed out.
    pub fn free_slot_list(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        self.slots.iter().map(SlotIndex::new)
    }

    #[must_use]
    pub const fn swap(&self) -> &S {
        &self.swap
    }

    pub const fn swap_mut(&mut self) -> &mut S {
        &mut self.swap
    }

    pub fn into_swap(self) -> S {
        self.swap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swap::{MemorySwap, SwapCallbacks};
    use kernel_vmem::{Frame, PageTableEntry};

    fn setup(frames: u32, slots: u32) -> (PhysicalMemory, FrameSlotAllocator<MemorySwap>) {
        let config = MemoryConfig::new(frames, slots).unwrap();
        (
            PhysicalMemory::new(config.frames()),
            FrameSlotAllocator::new(&config, MemorySwap::new(config.swap_slots())),
        )
    }

    /// Builds `root -> table` at directory entry 0 and maps `count` data
    /// pages at table entries `count - 1 ..= 0` (descending), tagging each
    /// data frame's first word with its own frame number.
    fn map_pages<S: SwapDevice>(
        memory: &mut PhysicalMemory,
        alloc: &mut FrameSlotAllocator<S>,
        count: usize,
    ) -> (FrameIndex, FrameIndex, Vec<FrameIndex>) {
        let root = alloc.allocate_frame(memory, true).unwrap();
        let table = alloc.allocate_frame(memory, false).unwrap();
        memory.set_entry(root, 0, PageTableEntry::resident(table, true));
        let mut data = Vec::new();
        for index in (0..count).rev() {
            let frame = alloc.allocate_frame(memory, false).unwrap();
            memory.frame_mut(frame).set_word(0, frame.as_u32());
            memory.set_entry(table, index, PageTableEntry::resident(frame, true));
            data.push(frame);
        }
        (root, table, data)
    }

    #[test]
    fn frames_are_handed_out_ascending_above_reserved() {
        let (mut memory, mut alloc) = setup(4, 0);
        assert_eq!(alloc.total_frames(), 3);
        let got: Vec<u32> = (0..3)
            .map(|_| alloc.allocate_frame(&mut memory, false).unwrap().as_u32())
            .collect();
        assert_eq!(got, [1, 2, 3]);
        assert_eq!(alloc.free_frames(), 0);
    }

    #[test]
    fn freed_frames_are_reused_lifo() {
        let (mut memory, mut alloc) = setup(4, 0);
        let a = alloc.allocate_frame(&mut memory, false).unwrap();
        let b = alloc.allocate_frame(&mut memory, false).unwrap();
        alloc.free_frame(a);
        alloc.free_frame(b);
        let order: Vec<_> = alloc.free_frame_list().collect();
        assert_eq!(order, [b, a, FrameIndex::new(3)]);
        assert_eq!(alloc.allocate_frame(&mut memory, false), Ok(b));
    }

    #[test]
    fn directory_frames_are_registered_and_released() {
        let (mut memory, mut alloc) = setup(4, 0);
        let root = alloc.allocate_frame(&mut memory, true).unwrap();
        assert!(alloc.is_directory(root));
        assert_eq!(alloc.directories().len(), 1);
        alloc.free_frame(root);
        assert!(!alloc.is_directory(root));
        assert!(alloc.directories().is_empty());
    }

    #[test]
    fn evicts_first_present_leaf_in_scan_order() {
        let (mut memory, mut alloc) = setup(5, 2);
        let (_, table, data) = map_pages(&mut memory, &mut alloc, 2);
        // data[0] sits at entry 1, data[1] at entry 0.
        assert_eq!(alloc.free_frames(), 0);

        let frame = alloc.allocate_frame(&mut memory, false).unwrap();
        assert_eq!(frame, data[1]);

        let evicted = memory.entry(table, 0);
        assert!(evicted.is_swapped() && !evicted.is_present());
        assert!(evicted.is_writable());
        let slot = evicted.slot().unwrap();
        assert_eq!(slot, SlotIndex::new(0));
        assert_eq!(alloc.swap().slot(slot).unwrap().word(0), data[1].as_u32());
        assert!(memory.entry(table, 1).is_present());
        assert_eq!(alloc.free_slots(), 1);
    }

    #[test]
    fn earlier_directory_is_scanned_first() {
        let (mut memory, mut alloc) = setup(8, 2);
        let (_, first_table, first) = map_pages(&mut memory, &mut alloc, 1);
        let (_, _, second) = map_pages(&mut memory, &mut alloc, 2);
        assert_eq!(alloc.free_frames(), 0);
        assert_ne!(first[0], second[0]);

        let frame = alloc.allocate_frame(&mut memory, false).unwrap();
        assert_eq!(frame, first[0]);
        assert!(memory.entry(first_table, 0).is_swapped());
    }

    #[test]
    fn table_and_directory_frames_are_never_evicted() {
        let (mut memory, mut alloc) = setup(3, 4);
        let root = alloc.allocate_frame(&mut memory, true).unwrap();
        let table = alloc.allocate_frame(&mut memory, false).unwrap();
        memory.set_entry(root, 0, PageTableEntry::resident(table, false));
        assert_eq!(
            alloc.allocate_frame(&mut memory, false),
            Err(AllocError::OutOfMemory)
        );
        assert_eq!(alloc.free_slots(), 4);
    }

    #[test]
    fn eviction_without_swap_space_fails() {
        let (mut memory, mut alloc) = setup(4, 0);
        let (_, table, _) = map_pages(&mut memory, &mut alloc, 1);
        assert_eq!(
            alloc.allocate_frame(&mut memory, false),
            Err(AllocError::OutOfSwap)
        );
        assert!(memory.entry(table, 0).is_present());
    }

    #[test]
    fn failed_swap_write_rolls_back() {
        let config = MemoryConfig::new(4, 2).unwrap();
        let mut memory = PhysicalMemory::new(config.frames());
        let swap = SwapCallbacks::new(|_, _: &mut Frame| true, |_, _: &Frame| false);
        let mut alloc = FrameSlotAllocator::new(&config, swap);
        let (_, table, data) = map_pages(&mut memory, &mut alloc, 1);

        assert_eq!(
            alloc.allocate_frame(&mut memory, false),
            Err(AllocError::SwapWrite {
                frame: data[0],
                slot: SlotIndex::new(0)
            })
        );
        assert_eq!(alloc.free_slots(), 2);
        assert_eq!(
            memory.entry(table, 0),
            PageTableEntry::resident(data[0], true)
        );
    }

    #[test]
    fn full_registry_is_rejected_before_taking_a_frame() {
        let (mut memory, mut alloc) = setup(100, 0);
        for _ in 0..kernel_info::memory::PROCESS_MAX {
            alloc.allocate_frame(&mut memory, true).unwrap();
        }
        let free = alloc.free_frames();
        assert_eq!(
            alloc.allocate_frame(&mut memory, true),
            Err(AllocError::TooManyDirectories)
        );
        assert_eq!(alloc.free_frames(), free);
        assert!(alloc.allocate_frame(&mut memory, false).is_ok());
    }

    #[test]
    fn swap_in_reads_slot_content() {
        let (mut memory, mut alloc) = setup(5, 1);
        let (_, _, data) = map_pages(&mut memory, &mut alloc, 2);
        let evicted_from = data[1];
        let frame = alloc.allocate_frame(&mut memory, false).unwrap();
        memory.frame_mut(frame).clear();

        let slot = SlotIndex::new(0);
        alloc.swap_in(&mut memory, frame, slot).unwrap();
        assert_eq!(memory.frame(frame).word(0), evicted_from.as_u32());
        assert!(!alloc.is_slot_free(slot));
        alloc.free_slot(slot);
        assert!(alloc.is_slot_free(slot));
    }

    #[test]
    fn failed_swap_in_is_reported() {
        let config = MemoryConfig::new(2, 1).unwrap();
        let mut memory = PhysicalMemory::new(config.frames());
        let swap = SwapCallbacks::new(|_, _: &mut Frame| false, |_, _: &Frame| true);
        let mut alloc = FrameSlotAllocator::new(&config, swap);
        let frame = alloc.allocate_frame(&mut memory, false).unwrap();
        let slot = alloc.allocate_slot().unwrap();
        assert_eq!(
            alloc.swap_in(&mut memory, frame, slot),
            Err(AllocError::SwapRead { frame, slot })
        );
    }

    #[test]
    #[should_panic(expected = "released while not in use")]
    fn double_frame_free_panics() {
        let (mut memory, mut alloc) = setup(3, 0);
        let frame = alloc.allocate_frame(&mut memory, false).unwrap();
        alloc.free_frame(frame);
        alloc.free_frame(frame);
    }

    #[test]
    #[should_panic(expected = "reserved")]
    fn freeing_the_null_frame_panics() {
        let (_, mut alloc) = setup(3, 0);
        alloc.free_frame(FrameIndex::new(0));
    }

    #[test]
    #[should_panic(expected = "released while not in use")]
    fn freeing_a_free_slot_panics() {
        let (_, mut alloc) = setup(3, 2);
        alloc.free_slot(SlotIndex::new(1));
    }
}
