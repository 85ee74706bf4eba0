//! # Physical Memory Image
//!
//! The simulated RAM: a boxed slice of 4 KiB [`Frame`]s. Page tables are
//! stored in frames like any other data, so the translation walk and the
//! fault resolver look at the same words.

use crate::addresses::FrameIndex;
use crate::info::{PAGE_DIR_ENTRIES, WORDS_PER_FRAME};
use crate::page_table::PageTableEntry;
use alloc::boxed::Box;
use alloc::vec;

/// One 4 KiB frame of physical memory, viewed as 1024 words.
#[repr(C, align(4096))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    words: [u32; WORDS_PER_FRAME],
}

impl Frame {
    /// A frame with every word zero (every entry unmapped).
    #[inline]
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            words: [0; WORDS_PER_FRAME],
        }
    }

    #[inline]
    #[must_use]
    pub const fn words(&self) -> &[u32; WORDS_PER_FRAME] {
        &self.words
    }

    #[inline]
    pub const fn words_mut(&mut self) -> &mut [u32; WORDS_PER_FRAME] {
        &mut self.words
    }

    #[inline]
    #[must_use]
    pub const fn word(&self, index: usize) -> u32 {
        self.words[index]
    }

    #[inline]
    pub const fn set_word(&mut self, index: usize, value: u32) {
        self.words[index] = value;
    }

    /// Overwrite every word with zero.
    #[inline]
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Read the table entry at `index` when this frame holds a table.
    #[inline]
    #[must_use]
    pub const fn entry(&self, index: usize) -> PageTableEntry {
        debug_assert!(index < PAGE_DIR_ENTRIES);
        PageTableEntry::from_raw(self.words[index])
    }

    /// Write the table entry at `index`.
    #[inline]
    pub const fn set_entry(&mut self, index: usize, entry: PageTableEntry) {
        debug_assert!(index < PAGE_DIR_ENTRIES);
        self.words[index] = entry.raw();
    }

    /// Iterate `(index, entry)` pairs in index order, skipping unmapped ones.
    pub fn mapped_entries(&self) -> impl Iterator<Item = (usize, PageTableEntry)> + '_ {
        self.words
            .iter()
            .enumerate()
            .map(|(i, &raw)| (i, PageTableEntry::from_raw(raw)))
            .filter(|(_, e)| !e.is_unmapped())
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// The whole physical memory of one session.
///
/// Indexing with a frame number outside `0..frame_count()` panics; the
/// allocator never hands such numbers out.
pub struct PhysicalMemory {
    frames: Box<[Frame]>,
    frame_count: u32,
}

impl PhysicalMemory {
    /// Allocate `frame_count` zeroed frames.
    #[must_use]
    pub fn new(frame_count: u32) -> Self {
        Self {
            frames: vec![Frame::zeroed(); frame_count as usize].into_boxed_slice(),
            frame_count,
        }
    }

    #[inline]
    #[must_use]
    pub const fn frame_count(&self) -> u32 {
        self.frame_count
    }

    #[inline]
    #[must_use]
    pub fn frame(&self, frame: FrameIndex) -> &Frame {
        &self.frames[frame.as_usize()]
    }

    #[inline]
    pub fn frame_mut(&mut self, frame: FrameIndex) -> &mut Frame {
        &mut self.frames[frame.as_usize()]
    }

    /// Read entry `index` of the table stored in `table`.
    #[inline]
    #[must_use]
    pub fn entry(&self, table: FrameIndex, index: usize) -> PageTableEntry {
        self.frame(table).entry(index)
    }

    /// Write entry `index` of the table stored in `table`.
    #[inline]
    pub fn set_entry(&mut self, table: FrameIndex, index: usize, entry: PageTableEntry) {
        self.frame_mut(table).set_entry(index, entry);
    }

    /// Zero every frame.
    pub fn clear(&mut self) {
        for f in &mut self.frames {
            f.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SlotIndex;

    #[test]
    fn new_memory_is_zeroed() {
        let mem = PhysicalMemory::new(4);
        assert_eq!(mem.frame_count(), 4);
        for i in 0..4 {
            assert!(mem.frame(FrameIndex::new(i)).words().iter().all(|&w| w == 0));
        }
    }

    #[test]
    fn entries_live_in_frame_words() {
        let mut mem = PhysicalMemory::new(4);
        let table = FrameIndex::new(2);
        let e = PageTableEntry::resident(FrameIndex::new(3), true);
        mem.set_entry(table, 5, e);
        assert_eq!(mem.entry(table, 5), e);
        assert_eq!(mem.frame(table).word(5), e.raw());
    }

    #[test]
    fn mapped_entries_skip_unmapped() {
        let mut f = Frame::zeroed();
        f.set_entry(3, PageTableEntry::resident(FrameIndex::new(1), false));
        f.set_entry(
            9,
            PageTableEntry::resident(FrameIndex::new(2), false).swapped_out(SlotIndex::new(4)),
        );
        let idx: Vec<usize> = f.mapped_entries().map(|(i, _)| i).collect();
        assert_eq!(idx, [3, 9]);
        f.clear();
        assert_eq!(f.mapped_entries().count(), 0);
    }
}
