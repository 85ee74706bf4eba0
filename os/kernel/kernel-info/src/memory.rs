//! # Paging Geometry

/// Number of low address bits selecting a byte inside a page.
pub const OFFSET_BITS: u32 = 12;

/// Size of one frame / page / swap slot in bytes.
pub const PAGE_SIZE: usize = 1 << OFFSET_BITS;

/// Size of the unit the translation primitive reads and writes.
pub const WORD_SIZE: usize = size_of::<u32>();

/// Number of 32-bit words in one frame.
pub const WORDS_PER_FRAME: usize = PAGE_SIZE / WORD_SIZE;

/// Number of 32-bit page table entries in one table frame.
pub const PAGE_DIR_ENTRIES: usize = PAGE_SIZE / WORD_SIZE;

/// Number of address bits used by each table level.
pub const INDEX_BITS: u32 = PAGE_DIR_ENTRIES.trailing_zeros();

/// Shift of the directory index inside a virtual address.
pub const DIR_SHIFT: u32 = OFFSET_BITS + INDEX_BITS;

/// Width of the frame / slot number field of a page table entry.
pub const FRAME_NUMBER_BITS: u32 = 20;

/// Upper bound (exclusive) for frame numbers and for swap slot numbers.
pub const MAX_FRAMES: u32 = 1 << FRAME_NUMBER_BITS;

/// Upper bound (exclusive) for swap slot numbers.
pub const MAX_SWAP_SLOTS: u32 = 1 << FRAME_NUMBER_BITS;

/// Frames at the bottom of physical memory that are never handed out.
///
/// Frame `0` is the null frame: a zeroed entry never names a usable frame.
pub const RESERVED_FRAMES: u32 = 1;

/// Maximum number of page directories (processes) alive at the same time.
pub const PROCESS_MAX: usize = 64;

const _: () = {
    assert!(PAGE_SIZE.is_power_of_two());
    assert!(PAGE_DIR_ENTRIES.is_power_of_two());
    assert!(DIR_SHIFT + INDEX_BITS == 32);
    assert!(OFFSET_BITS + FRAME_NUMBER_BITS == 32);
    assert!(RESERVED_FRAMES < MAX_FRAMES);
};
