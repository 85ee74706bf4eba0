use crate::info::{DIR_SHIFT, OFFSET_BITS, PAGE_DIR_ENTRIES, PAGE_SIZE, WORD_SIZE};
use core::fmt;

/// 32-bit virtual address inside one process's address space.
///
/// ### Examples
/// ```rust
/// # use kernel_vmem::VirtualAddress;
/// let va = VirtualAddress::new(19_230_400);
/// assert_eq!(va.dir_index().as_usize(), 4);
/// assert_eq!(va.table_index().as_usize(), 598);
/// assert_eq!(va.offset(), 0xEC0);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VirtualAddress(u32);

/// Index into a page directory (VA bits `[31:22]`).
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DirIndex(u16);

/// Index into a second-level page table (VA bits `[21:12]`).
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TableIndex(u16);

/// Number of one physical frame.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FrameIndex(u32);

/// Number of one swap slot.
///
/// Slots and frames are disjoint numbering spaces, both 0-based.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SlotIndex(u32);

/// Kind of memory access that triggered a walk or a fault.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Access {
    Read,
    Write,
}

impl VirtualAddress {
    #[inline]
    #[must_use]
    pub const fn new(v: u32) -> Self {
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Directory slot of this address.
    #[inline]
    #[must_use]
    pub const fn dir_index(self) -> DirIndex {
        DirIndex::from(self)
    }

    /// Table slot of this address.
    #[inline]
    #[must_use]
    pub const fn table_index(self) -> TableIndex {
        TableIndex::from(self)
    }

    /// Byte offset inside the page.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> usize {
        (self.0 as usize) & (PAGE_SIZE - 1)
    }

    /// Word offset inside the page (for aligned addresses).
    #[inline]
    #[must_use]
    pub const fn word_offset(self) -> usize {
        self.offset() / WORD_SIZE
    }

    /// `true` if the address can be used for a 32-bit access.
    #[inline]
    #[must_use]
    pub const fn is_word_aligned(self) -> bool {
        self.0.is_multiple_of(WORD_SIZE as u32)
    }

    /// The first address of the page containing this address.
    #[inline]
    #[must_use]
    pub const fn page_base(self) -> Self {
        Self(self.0 & !((PAGE_SIZE as u32) - 1))
    }
}

impl fmt::Debug for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VA({:#010x})", self.0)
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<u32> for VirtualAddress {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl DirIndex {
    /// Extract bits `[31:22]` of a virtual address.
    #[inline]
    #[must_use]
    pub const fn from(va: VirtualAddress) -> Self {
        Self::new((va.as_u32() >> DIR_SHIFT) as u16)
    }

    /// ### Debug assertions
    /// - Asserts `v < 1024` in debug builds.
    #[inline]
    #[must_use]
    pub const fn new(v: u16) -> Self {
        debug_assert!((v as usize) < PAGE_DIR_ENTRIES);
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl TableIndex {
    /// Extract bits `[21:12]` of a virtual address.
    #[inline]
    #[must_use]
    pub const fn from(va: VirtualAddress) -> Self {
        Self::new(((va.as_u32() >> OFFSET_BITS) as usize & (PAGE_DIR_ENTRIES - 1)) as u16)
    }

    /// ### Debug assertions
    /// - Asserts `v < 1024` in debug builds.
    #[inline]
    #[must_use]
    pub const fn new(v: u16) -> Self {
        debug_assert!((v as usize) < PAGE_DIR_ENTRIES);
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl FrameIndex {
    #[inline]
    #[must_use]
    pub const fn new(v: u32) -> Self {
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.0)
    }
}

impl fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame {}", self.0)
    }
}

impl SlotIndex {
    #[inline]
    #[must_use]
    pub const fn new(v: u32) -> Self {
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({})", self.0)
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {}", self.0)
    }
}

impl Access {
    #[inline]
    #[must_use]
    pub const fn from_write(write: bool) -> Self {
        if write { Self::Write } else { Self::Read }
    }

    #[inline]
    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
        })
    }
}
