//! # Page Fault Resolution
//!
//! A fault is resolved in two steps, each of which may allocate a frame:
//!
//! ```text
//!  directory[DIR] present? ── no ──► allocate + zero a table, link it
//!          │
//!  table[TABLE] present?   ── no ──► allocate a data frame
//!          │                           ├─ entry swapped: read slot, free slot
//!          │                           └─ otherwise:     zero-fill
//!  writable == is_write?   ── no ──► PermissionMismatch
//! ```
//!
//! Allocation may evict another resident data page. Directory and table
//! frames are never evicted, so the structure being built stays in place.

use crate::error::{FaultError, FramePurpose};
use kernel_alloc::{FrameSlotAllocator, SwapDevice};
use kernel_vmem::{Access, FrameIndex, PageTableEntry, PhysicalMemory, VirtualAddress};
use log::{debug, trace};

/// Something that can resolve page faults against a memory image.
///
/// The translation walk reads and writes the image through this trait and
/// calls [`handle_page_fault`](Self::handle_page_fault) once per miss.
pub trait PageFaultHandler {
    fn memory(&self) -> &PhysicalMemory;

    fn memory_mut(&mut self) -> &mut PhysicalMemory;

    /// Make `address` accessible for `access` in the address space rooted
    /// at `root`.
    ///
    /// # Errors
    /// See [`FaultError`].
    fn handle_page_fault(
        &mut self,
        root: FrameIndex,
        address: VirtualAddress,
        access: Access,
    ) -> Result<(), FaultError>;
}

/// Resolve a fault at `address` in the address space rooted at `root`.
///
/// On success the leaf entry for `address` is present and its writable bit
/// equals `access.is_write()`. Calling this for an address that is already
/// mapped with the same intent changes nothing.
///
/// # Errors
/// - [`FaultError::Allocation`] if a table or data frame could not be had.
/// - [`FaultError::SwapIn`] if the page could not be read back from swap; the
///   entry stays swapped out.
/// - [`FaultError::PermissionMismatch`] if the page is already present with
///   a writable bit that differs from the request.
pub fn resolve<S: SwapDevice>(
    memory: &mut PhysicalMemory,
    frames: &mut FrameSlotAllocator<S>,
    root: FrameIndex,
    address: VirtualAddress,
    access: Access,
) -> Result<(), FaultError> {
    trace!("Page fault at {address} ({access}) in directory {root}");
    let table = ensure_table(memory, frames, root, address, access)?;
    let index = address.table_index().as_usize();
    let entry = memory.entry(table, index);

    if entry.is_present() {
        let mapped = Access::from_write(entry.is_writable());
        if mapped != access {
            return Err(FaultError::PermissionMismatch {
                address,
                mapped,
                requested: access,
            });
        }
        return Ok(());
    }

    let frame = frames
        .allocate_frame(memory, false)
        .map_err(|source| FaultError::Allocation {
            address,
            purpose: FramePurpose::Data,
            source,
        })?;

    if let Some(slot) = entry.slot() {
        if frames.swap_in(memory, frame, slot).is_err() {
            frames.free_frame(frame);
            return Err(FaultError::SwapIn { address, slot });
        }
        frames.free_slot(slot);
        trace!("Restored {address} from {slot} into {frame}");
    } else {
        memory.frame_mut(frame).clear();
    }

    memory.set_entry(
        table,
        index,
        PageTableEntry::resident(frame, access.is_write()),
    );
    Ok(())
}

/// Return the table frame covering `address`, creating it if needed.
fn ensure_table<S: SwapDevice>(
    memory: &mut PhysicalMemory,
    frames: &mut FrameSlotAllocator<S>,
    root: FrameIndex,
    address: VirtualAddress,
    access: Access,
) -> Result<FrameIndex, FaultError> {
    let dir = address.dir_index().as_usize();
    let pde = memory.entry(root, dir);
    debug_assert!(!pde.is_swapped(), "page tables are never swapped out");

    if let Some(table) = pde.frame() {
        // A table first linked by a read must admit later writes.
        if access.is_write() && !pde.is_writable() {
            memory.set_entry(root, dir, pde.with_writable(true));
        }
        return Ok(table);
    }

    let table = frames
        .allocate_frame(memory, false)
        .map_err(|source| FaultError::Allocation {
            address,
            purpose: FramePurpose::Table,
            source,
        })?;
    memory.frame_mut(table).clear();
    memory.set_entry(root, dir, PageTableEntry::resident(table, access.is_write()));
    debug!("Linked page table {table} at directory entry {dir} of {root}");
    Ok(table)
}
