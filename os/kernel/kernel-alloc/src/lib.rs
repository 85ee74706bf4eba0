//! # Frame and Swap-Slot Allocation
//!
//! This crate owns every decision about which physical frames and which swap
//! slots are free, in use for data, or serving as a page-directory root.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              FrameSlotAllocator                     │
//! │    • allocate / free frames and swap slots          │
//! │    • eviction when no frame is free                 │
//! └──────┬──────────────────┬──────────────────┬────────┘
//!        │                  │                  │
//! ┌──────▼───────┐   ┌──────▼───────┐   ┌──────▼───────┐
//! │ IndexFreeList│   │  Directory   │   │  SwapDevice  │
//! │ (frames,     │   │  Registry    │   │ (read/write  │
//! │  slots)      │   │ (≤ 64 roots) │   │  whole pages)│
//! └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! ## Eviction
//!
//! When the frame free list is empty, the allocator looks for a victim in
//! structural order: registered directories in registry order, present
//! directory entries in index order, present table entries in index order.
//! The **first** resident data page found is written to a fresh swap slot,
//! its entry is switched to swapped-out, and its frame is handed out.
//! Directory and table frames are never victims.
//!
//! ## Concurrency
//!
//! Every operation takes `&mut self`. The allocator performs no locking of
//! its own; sharing one instance between processes requires an external
//! lock around each call (the memory manager's session lock).
//!
//! ## Usage
//! ```rust
//! use kernel_alloc::{FrameSlotAllocator, MemorySwap};
//! use kernel_info::MemoryConfig;
//! use kernel_vmem::PhysicalMemory;
//!
//! let config = MemoryConfig::new(8, 4).unwrap();
//! let mut memory = PhysicalMemory::new(config.frames());
//! let mut frames = FrameSlotAllocator::new(&config, MemorySwap::new(config.swap_slots()));
//!
//! let root = frames.allocate_frame(&mut memory, true).unwrap();
//! assert!(frames.is_directory(root));
//! frames.free_frame(root);
//! assert_eq!(frames.free_frames(), 7);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

extern crate alloc;

mod frame_alloc;
mod free_list;
mod registry;
mod swap;

pub use crate::frame_alloc::{AllocError, FrameSlotAllocator};
pub use crate::registry::DirectoryRegistry;
pub use crate::swap::{MemorySwap, SwapCallbacks, SwapDevice};
