//! # Memory Manager Configuration
//!
//! This crate is the single source of truth for the paging geometry shared by
//! the allocator, the page-table types and the fault resolver, and for the
//! runtime configuration of one memory-manager session.
//!
//! ## Geometry
//!
//! Virtual addresses are 32 bits wide and translated through two levels of
//! tables, each table occupying exactly one frame:
//!
//! ```text
//! | 31‒22     | 21‒12       | 11‒0   |
//! | directory | table       | offset |
//! ```
//!
//! ```text
//!  directory frame ──► table frame ──► data frame
//!   (1024 PTEs)        (1024 PTEs)      (4 KiB)
//! ```
//!
//! The constants live in [`memory`]. Frame and swap-slot numbers are stored in
//! the 20-bit number field of a page table entry, which bounds both pools.
//!
//! ## Runtime configuration
//!
//! A session is sized once, at startup, through [`MemoryConfig`]:
//!
//! ```rust
//! # use kernel_info::MemoryConfig;
//! let config = MemoryConfig::new(100, 1024).unwrap();
//! assert_eq!(config.usable_frames(), 99);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

mod config;
pub mod memory;

pub use config::{ConfigError, MemoryConfig};
