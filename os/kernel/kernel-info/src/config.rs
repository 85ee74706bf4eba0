use crate::memory::{MAX_FRAMES, MAX_SWAP_SLOTS, RESERVED_FRAMES};

/// Sizing of one memory-manager session.
///
/// Both counts are fixed for the lifetime of the session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MemoryConfig {
    frames: u32,
    swap_slots: u32,
}

/// Rejected [`MemoryConfig`] values.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("too few frames ({0}), at least one frame above the reserved ones is required")]
    TooFewFrames(u32),
    #[error("{0} frames exceed the 20-bit frame number space")]
    TooManyFrames(u32),
    #[error("{0} swap slots exceed the 20-bit slot number space")]
    TooManySwapSlots(u32),
}

impl MemoryConfig {
    /// Validate and build a configuration.
    ///
    /// # Errors
    /// The frame count must leave at least one frame above the reserved
    /// ones, and both counts must fit the 20-bit entry number field.
    pub const fn new(frames: u32, swap_slots: u32) -> Result<Self, ConfigError> {
        if frames <= RESERVED_FRAMES {
            return Err(ConfigError::TooFewFrames(frames));
        }
        if frames > MAX_FRAMES {
            return Err(ConfigError::TooManyFrames(frames));
        }
        if swap_slots > MAX_SWAP_SLOTS {
            return Err(ConfigError::TooManySwapSlots(swap_slots));
        }
        Ok(Self { frames, swap_slots })
    }

    /// Total number of physical frames, reserved ones included.
    #[must_use]
    pub const fn frames(&self) -> u32 {
        self.frames
    }

    /// Total number of swap slots.
    #[must_use]
    pub const fn swap_slots(&self) -> u32 {
        self.swap_slots
    }

    /// Frames the allocator may hand out.
    #[must_use]
    pub const fn usable_frames(&self) -> u32 {
        self.frames - RESERVED_FRAMES
    }
}
