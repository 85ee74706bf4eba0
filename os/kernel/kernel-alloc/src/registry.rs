use kernel_info::memory::PROCESS_MAX;
use kernel_vmem::FrameIndex;

/// Fixed-capacity table of the frames currently serving as page-directory
/// roots, one slot per possible process.
///
/// # Invariants
/// - A frame appears in at most one slot.
/// - Iteration follows slot order, which fixes the eviction scan order.
#[derive(Debug, Clone)]
pub struct DirectoryRegistry {
    roots: [Option<FrameIndex>; PROCESS_MAX],
}

impl DirectoryRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            roots: [None; PROCESS_MAX],
        }
    }

    /// `true` if another root can be registered.
    #[must_use]
    pub fn has_room(&self) -> bool {
        self.roots.iter().any(Option::is_none)
    }

    /// Store `frame` in the first empty slot. Returns `false` when full.
    pub fn register(&mut self, frame: FrameIndex) -> bool {
        debug_assert!(!self.contains(frame), "{frame} registered twice");
        match self.roots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(frame);
                true
            }
            None => false,
        }
    }

    /// Clear the slot holding `frame`. Returns `false` if it was not registered.
    pub fn release(&mut self, frame: FrameIndex) -> bool {
        match self.roots.iter_mut().find(|slot| **slot == Some(frame)) {
            Some(slot) => {
                *slot = None;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, frame: FrameIndex) -> bool {
        self.roots.contains(&Some(frame))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.iter().flatten().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered roots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = FrameIndex> + '_ {
        self.roots.iter().flatten().copied()
    }
}

impl Default for DirectoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}
