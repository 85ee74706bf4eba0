//! # Demand-Paged Memory Management
//!
//! Page fault resolution, per-process address spaces and the word-access
//! primitive on top of [`kernel_alloc`] and [`kernel_vmem`].
//!
//! ## Control Flow
//!
//! ```text
//!  Cpu::read_u32 / write_u32
//!      │  (session lock held)
//!      ▼
//!  translate ── walk ok ───────────────────────► data word
//!      │ miss
//!      ▼
//!  PageFaultHandler::handle_page_fault ──► resolve
//!      │                                     ├─ FrameSlotAllocator::allocate_frame
//!      │                                     │     (may evict to swap)
//!      │                                     └─ swap_in / zero-fill
//!      ▼
//!  walk again ── ok ──► data word
//!            └─ miss ─► AccessError::Unresolved
//! ```
//!
//! ## Ownership
//!
//! A [`MemoryManager`] owns one [`MemoryCore`] (memory image + allocator)
//! behind a spin lock. Each [`Cpu`] borrows the manager and owns one
//! [`ProcessMemoryContext`]; dropping the `Cpu` returns every frame and
//! swap slot of that process.
//!
//! The lower-level pieces ([`resolve`], [`translate`], [`ProcessMemoryContext`])
//! take `&mut` references and do no locking of their own.

#![cfg_attr(not(any(test, doctest)), no_std)]

mod cpu;
mod error;
mod fault;
mod manager;
mod process;
mod translation;

pub use crate::cpu::Cpu;
pub use crate::error::{AccessError, FaultError, FramePurpose};
pub use crate::fault::{PageFaultHandler, resolve};
pub use crate::manager::{MemoryCore, MemoryManager};
pub use crate::process::{Footprint, ProcessMemoryContext};
pub use crate::translation::{read_word, translate, walk, write_word};
