//! Backing store for evicted pages.

use alloc::vec;
use alloc::vec::Vec;
use kernel_vmem::{Frame, SlotIndex};

/// Whole-page transfers between a frame and a swap slot.
///
/// Both calls are synchronous. A `false` return reports an I/O failure,
/// which the allocator surfaces as a typed error.
pub trait SwapDevice {
    /// Copy slot `slot` into `frame`.
    fn read_page(&mut self, slot: SlotIndex, frame: &mut Frame) -> bool;

    /// Copy `frame` into slot `slot`.
    fn write_page(&mut self, slot: SlotIndex, frame: &Frame) -> bool;
}

impl<S: SwapDevice + ?Sized> SwapDevice for &mut S {
    fn read_page(&mut self, slot: SlotIndex, frame: &mut Frame) -> bool {
        (**self).read_page(slot, frame)
    }

    fn write_page(&mut self, slot: SlotIndex, frame: &Frame) -> bool {
        (**self).write_page(slot, frame)
    }
}

/// Swap space kept in memory, one frame per slot.
pub struct MemorySwap {
    slots: Vec<Frame>,
}

impl MemorySwap {
    #[must_use]
    pub fn new(slots: u32) -> Self {
        Self {
            slots: vec![Frame::zeroed(); slots as usize],
        }
    }

    /// Content of `slot`, if it exists.
    #[must_use]
    pub fn slot(&self, slot: SlotIndex) -> Option<&Frame> {
        self.slots.get(slot.as_usize())
    }
}

impl SwapDevice for MemorySwap {
    fn read_page(&mut self, slot: SlotIndex, frame: &mut Frame) -> bool {
        match self.slots.get(slot.as_usize()) {
            Some(stored) => {
                frame.clone_from(stored);
                true
            }
            None => false,
        }
    }

    fn write_page(&mut self, slot: SlotIndex, frame: &Frame) -> bool {
        match self.slots.get_mut(slot.as_usize()) {
            Some(stored) => {
                stored.clone_from(frame);
                true
            }
            None => false,
        }
    }
}

/// Adapts a pair of closures (read, write) into a [`SwapDevice`].
///
/// ```rust
/// # use kernel_alloc::{SwapCallbacks, SwapDevice};
/// # use kernel_vmem::{Frame, SlotIndex};
/// let mut swap = SwapCallbacks::new(|_, _: &mut Frame| false, |_, _: &Frame| true);
/// assert!(swap.write_page(SlotIndex::new(0), &Frame::zeroed()));
/// assert!(!swap.read_page(SlotIndex::new(0), &mut Frame::zeroed()));
/// ```
pub struct SwapCallbacks<R, W> {
    read: R,
    write: W,
}

impl<R, W> SwapCallbacks<R, W>
where
    R: FnMut(SlotIndex, &mut Frame) -> bool,
    W: FnMut(SlotIndex, &Frame) -> bool,
{
    pub const fn new(read: R, write: W) -> Self {
        Self { read, write }
    }
}

impl<R, W> SwapDevice for SwapCallbacks<R, W>
where
    R: FnMut(SlotIndex, &mut Frame) -> bool,
    W: FnMut(SlotIndex, &Frame) -> bool,
{
    fn read_page(&mut self, slot: SlotIndex, frame: &mut Frame) -> bool {
        (self.read)(slot, frame)
    }

    fn write_page(&mut self, slot: SlotIndex, frame: &Frame) -> bool {
        (self.write)(slot, frame)
    }
}
