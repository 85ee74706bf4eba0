use bitfield_struct::bitfield;

/// Raw 32-bit page table entry, shared by directory and table level.
///
/// ### Bit layout
///
/// | Bits  | Name         | Meaning |
/// |-------|--------------|---------|
/// | 0     | `present`    | Number field names a resident frame |
/// | 1     | `writable`   | Writes allowed |
/// | 2     | `user`       | Accessible to the process |
/// | 3     | `swapped`    | Number field names a swap slot |
/// | 4     | –            | Unused |
/// | 5     | `referenced` | Set by the translation walk on any access |
/// | 6     | `dirty`      | Set by the translation walk on writes |
/// | 7–11  | –            | Unused |
/// | 12–31 | `number`     | Frame number, or slot number when swapped |
///
/// The fields are crate-private; outside this crate entries are built and
/// inspected through [`PageTableEntry`](crate::PageTableEntry), which never
/// produces `present && swapped`.
///
/// ### Example
/// ```rust
/// # use kernel_vmem::PageEntryBits;
/// let e = PageEntryBits::from_bits(0x0000_5007);
/// assert_eq!(e.into_bits() >> 12, 5);
/// ```
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct PageEntryBits {
    /// Present (bit 0).
    pub(crate) present: bool,

    /// Writable (bit 1).
    pub(crate) writable: bool,

    /// User accessible (bit 2).
    pub(crate) user: bool,

    /// Swapped out (bit 3). Mutually exclusive with `present`.
    pub(crate) swapped: bool,

    #[bits(1)]
    _unused_4: u8,

    /// Referenced (bit 5).
    pub(crate) referenced: bool,

    /// Dirty (bit 6).
    pub(crate) dirty: bool,

    #[bits(5)]
    _unused_7_11: u8,

    /// Frame or slot number (bits 12..=31).
    #[bits(20)]
    pub(crate) number: u32,
}
