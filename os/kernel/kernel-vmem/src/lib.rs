//! # Two-Level Paging Structures
//!
//! Types for a software-walked, two-level page table living inside a
//! simulated physical memory image.
//!
//! ## What you get
//! - [`VirtualAddress`], [`FrameIndex`] and [`SlotIndex`] newtypes so virtual
//!   addresses, frame numbers and swap slot numbers cannot be mixed up.
//! - [`DirIndex`] / [`TableIndex`] for the two table levels.
//! - [`PageEntryBits`], the raw 32-bit entry layout, and [`PageTableEntry`],
//!   the typed view that keeps `present` and `swapped` mutually exclusive.
//! - [`Frame`] and [`PhysicalMemory`], the memory image the tables live in.
//!
//! ## Virtual Address → Physical Address Walk
//!
//! ```text
//! | 31‒22 | 21‒12 | 11‒0   |
//! |  DIR  | TABLE | Offset |
//! ```
//!
//! ```text
//!  root ─► directory[DIR] ─► table[TABLE] ─► data frame + Offset
//!           (PDE)              (PTE)
//! ```
//!
//! Both levels use the same entry layout. A directory entry names the frame of
//! a second-level table; a table entry names a data frame, or, while the page
//! is evicted, the swap slot holding its content.
//!
//! ### Entry states
//!
//! | present | swapped | meaning |
//! |:-------:|:-------:|:--------|
//! | 1 | 0 | resident, number field is a frame |
//! | 0 | 1 | evicted, number field is a swap slot |
//! | 0 | 0 | unmapped |
//! | 1 | 1 | never produced |

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod addresses;
mod page_entry_bits;
mod page_table;
mod physical_memory;

pub use crate::addresses::{Access, DirIndex, FrameIndex, SlotIndex, TableIndex, VirtualAddress};
pub use crate::page_entry_bits::PageEntryBits;
pub use crate::page_table::{EntryKind, PageTableEntry};
pub use crate::physical_memory::{Frame, PhysicalMemory};

/// Re-export constants as info module.
pub use kernel_info::memory as info;
