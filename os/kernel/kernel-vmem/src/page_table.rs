//! # Typed Page Table Entries
//!
//! [`PageTableEntry`] is the only way the rest of the workspace builds or
//! changes entries. Its constructors cover the three legal states
//! (unmapped, resident, swapped out); a resident entry always has
//! `swapped = 0` and a swapped entry always has `present = 0`.
//!
//! The same type serves both levels: a directory entry's frame is a
//! second-level table, a table entry's frame is a data page.

use crate::addresses::{Access, FrameIndex, SlotIndex};
use crate::page_entry_bits::PageEntryBits;
use core::fmt;

/// Decoded state of a non-empty entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EntryKind {
    /// Resident; the frame holds the table or page.
    Resident { frame: FrameIndex, writable: bool },
    /// Evicted; the slot holds the page content.
    Swapped(SlotIndex),
}

/// A single directory or table entry.
#[doc(alias = "PTE")]
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct PageTableEntry(PageEntryBits);

impl PageTableEntry {
    /// Create a zero (unmapped) entry.
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self(PageEntryBits::new())
    }

    /// Create a present, user-accessible entry naming `frame`.
    #[inline]
    #[must_use]
    pub const fn resident(frame: FrameIndex, writable: bool) -> Self {
        Self(
            PageEntryBits::new()
                .with_present(true)
                .with_user(true)
                .with_writable(writable)
                .with_number(frame.as_u32()),
        )
    }

    /// Turn a resident entry into a swapped-out one naming `slot`.
    ///
    /// Permission bits are kept; `present`, `referenced` and `dirty` are cleared.
    ///
    /// ### Debug assertions
    /// - Asserts the entry is currently present.
    #[inline]
    #[must_use]
    pub const fn swapped_out(self, slot: SlotIndex) -> Self {
        debug_assert!(self.0.present(), "only resident entries can be swapped out");
        Self(
            self.0
                .with_present(false)
                .with_referenced(false)
                .with_dirty(false)
                .with_swapped(true)
                .with_number(slot.as_u32()),
        )
    }

    #[inline]
    #[must_use]
    pub const fn is_present(self) -> bool {
        self.0.present()
    }

    #[inline]
    #[must_use]
    pub const fn is_swapped(self) -> bool {
        self.0.swapped()
    }

    /// Neither present nor swapped.
    #[inline]
    #[must_use]
    pub const fn is_unmapped(self) -> bool {
        !self.is_present() && !self.is_swapped()
    }

    #[inline]
    #[must_use]
    pub const fn is_writable(self) -> bool {
        self.0.writable()
    }

    #[inline]
    #[must_use]
    pub const fn is_user(self) -> bool {
        self.0.user()
    }

    #[inline]
    #[must_use]
    pub const fn is_referenced(self) -> bool {
        self.0.referenced()
    }

    #[inline]
    #[must_use]
    pub const fn is_dirty(self) -> bool {
        self.0.dirty()
    }

    /// If present, the frame this entry names.
    #[inline]
    #[must_use]
    pub const fn frame(self) -> Option<FrameIndex> {
        if self.is_present() {
            Some(FrameIndex::new(self.0.number()))
        } else {
            None
        }
    }

    /// If swapped out, the slot holding the page.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> Option<SlotIndex> {
        if self.is_swapped() {
            Some(SlotIndex::new(self.0.number()))
        } else {
            None
        }
    }

    /// Decode the entry; `None` for unmapped entries.
    #[inline]
    #[must_use]
    pub const fn kind(self) -> Option<EntryKind> {
        debug_assert!(!(self.is_present() && self.is_swapped()));
        if self.is_present() {
            Some(EntryKind::Resident {
                frame: FrameIndex::new(self.0.number()),
                writable: self.is_writable(),
            })
        } else if self.is_swapped() {
            Some(EntryKind::Swapped(SlotIndex::new(self.0.number())))
        } else {
            None
        }
    }

    /// Same entry with the writable bit replaced.
    #[inline]
    #[must_use]
    pub const fn with_writable(self, writable: bool) -> Self {
        Self(self.0.with_writable(writable))
    }

    /// `true` if an access of kind `access` may go through this entry
    /// without faulting: present, user, and writable for writes.
    #[inline]
    #[must_use]
    pub const fn permits(self, access: Access) -> bool {
        self.is_present() && self.is_user() && (!access.is_write() || self.is_writable())
    }

    /// Record an access: sets `referenced`, and `dirty` for writes.
    #[inline]
    #[must_use]
    pub const fn accessed(self, access: Access) -> Self {
        let bits = self.0.with_referenced(true);
        if access.is_write() {
            Self(bits.with_dirty(true))
        } else {
            Self(bits)
        }
    }

    /// Return the raw 32-bit value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0.into_bits()
    }

    /// Construct from a raw 32-bit value read out of a table frame.
    ///
    /// ### Debug assertions
    /// - Asserts the value is not both present and swapped.
    #[inline]
    #[must_use]
    pub const fn from_raw(v: u32) -> Self {
        let bits = PageEntryBits::from_bits(v);
        debug_assert!(!(bits.present() && bits.swapped()), "corrupt entry");
        Self(bits)
    }
}

impl Default for PageTableEntry {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for PageTableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            None => f.write_str("Unmapped"),
            Some(EntryKind::Resident { frame, writable }) => f
                .debug_struct("Resident")
                .field("frame", &frame)
                .field("writable", &writable)
                .field("referenced", &self.is_referenced())
                .field("dirty", &self.is_dirty())
                .finish(),
            Some(EntryKind::Swapped(slot)) => f.debug_tuple("Swapped").field(&slot).finish(),
        }
    }
}
