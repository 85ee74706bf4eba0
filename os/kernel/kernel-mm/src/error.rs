use core::fmt;
use kernel_alloc::AllocError;
use kernel_vmem::{Access, SlotIndex, VirtualAddress};

/// What a frame was being allocated for when a fault failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FramePurpose {
    /// A second-level page table.
    Table,
    /// The data page itself.
    Data,
}

impl fmt::Display for FramePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => f.write_str("page table"),
            Self::Data => f.write_str("data page"),
        }
    }
}

/// A page fault the resolver could not satisfy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FaultError {
    #[error("no frame for the {purpose} of {address}")]
    Allocation {
        address: VirtualAddress,
        purpose: FramePurpose,
        #[source]
        source: AllocError,
    },
    #[error("restoring {address} from swap {slot} failed")]
    SwapIn {
        address: VirtualAddress,
        slot: SlotIndex,
    },
    #[error("{requested} access to {address}, which is mapped for {mapped}")]
    PermissionMismatch {
        address: VirtualAddress,
        mapped: Access,
        requested: Access,
    },
}

impl FaultError {
    /// The faulting virtual address.
    #[must_use]
    pub const fn address(&self) -> VirtualAddress {
        match self {
            Self::Allocation { address, .. }
            | Self::SwapIn { address, .. }
            | Self::PermissionMismatch { address, .. } => *address,
        }
    }

    /// `true` if the fault failed for lack of frames or swap slots.
    #[must_use]
    pub const fn is_resource_exhaustion(&self) -> bool {
        matches!(
            self,
            Self::Allocation {
                source: AllocError::OutOfMemory
                    | AllocError::OutOfSwap
                    | AllocError::TooManyDirectories,
                ..
            }
        )
    }
}

/// A failed `read_u32` / `write_u32`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("{0} is not word aligned")]
    Unaligned(VirtualAddress),
    #[error("page fault: {0}")]
    Fault(#[from] FaultError),
    #[error("{0} still faults after the fault was resolved")]
    Unresolved(VirtualAddress),
}
