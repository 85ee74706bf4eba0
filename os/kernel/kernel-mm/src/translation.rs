//! # Address Translation
//!
//! Software version of the MMU walk. An access goes through only if both
//! the directory entry and the table entry are present, user-accessible and,
//! for writes, writable. A successful walk marks both entries referenced
//! (and dirty for writes).
//!
//! A failed walk raises exactly one page fault; if the entry still does not
//! admit the access afterwards, the access fails.

use crate::error::AccessError;
use crate::fault::PageFaultHandler;
use kernel_vmem::{Access, FrameIndex, PhysicalMemory, VirtualAddress};

/// Walk the tables rooted at `root` without faulting.
///
/// Returns the data frame backing `address` if the access is permitted, and
/// records the access in both entries. Nothing is changed on failure.
pub fn walk(
    memory: &mut PhysicalMemory,
    root: FrameIndex,
    address: VirtualAddress,
    access: Access,
) -> Option<FrameIndex> {
    let dir = address.dir_index().as_usize();
    let pde = memory.entry(root, dir);
    if !pde.permits(access) {
        return None;
    }
    let table = pde.frame()?;

    let index = address.table_index().as_usize();
    let pte = memory.entry(table, index);
    if !pte.permits(access) {
        return None;
    }
    let frame = pte.frame()?;

    memory.set_entry(root, dir, pde.accessed(access));
    memory.set_entry(table, index, pte.accessed(access));
    Some(frame)
}

/// Translate `address`, raising at most one page fault.
///
/// # Errors
/// - [`AccessError::Unaligned`] if `address` is not word aligned; no fault
///   is raised.
/// - [`AccessError::Fault`] if the fault handler failed.
/// - [`AccessError::Unresolved`] if the walk fails again after the handler
///   reported success.
pub fn translate<H: PageFaultHandler + ?Sized>(
    handler: &mut H,
    root: FrameIndex,
    address: VirtualAddress,
    access: Access,
) -> Result<FrameIndex, AccessError> {
    if !address.is_word_aligned() {
        return Err(AccessError::Unaligned(address));
    }
    if let Some(frame) = walk(handler.memory_mut(), root, address, access) {
        return Ok(frame);
    }
    handler.handle_page_fault(root, address, access)?;
    walk(handler.memory_mut(), root, address, access).ok_or(AccessError::Unresolved(address))
}

/// Read the word at `address`.
///
/// # Errors
/// See [`translate`].
pub fn read_word<H: PageFaultHandler + ?Sized>(
    handler: &mut H,
    root: FrameIndex,
    address: VirtualAddress,
) -> Result<u32, AccessError> {
    let frame = translate(handler, root, address, Access::Read)?;
    Ok(handler.memory().frame(frame).word(address.word_offset()))
}

/// Write `value` to the word at `address`.
///
/// # Errors
/// See [`translate`].
pub fn write_word<H: PageFaultHandler + ?Sized>(
    handler: &mut H,
    root: FrameIndex,
    address: VirtualAddress,
    value: u32,
) -> Result<(), AccessError> {
    let frame = translate(handler, root, address, Access::Write)?;
    handler
        .memory_mut()
        .frame_mut(frame)
        .set_word(address.word_offset(), value);
    Ok(())
}
