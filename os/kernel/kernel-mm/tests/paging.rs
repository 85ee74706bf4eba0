use kernel_alloc::{AllocError, MemorySwap, SwapCallbacks};
use kernel_info::MemoryConfig;
use kernel_mm::{AccessError, FaultError, Footprint, FramePurpose, MemoryManager};
use kernel_vmem::{Access, Frame, SlotIndex, VirtualAddress};

const PAGE: u32 = 4096;

fn manager(frames: u32, slots: u32) -> MemoryManager<MemorySwap> {
    let config = MemoryConfig::new(frames, slots).unwrap();
    MemoryManager::new(&config, MemorySwap::new(config.swap_slots()))
}

fn assert_all_free<S: kernel_alloc::SwapDevice>(manager: &MemoryManager<S>) {
    manager.with_core(|core| {
        let frames = core.frames();
        assert_eq!(frames.free_frames(), frames.total_frames());
        assert_eq!(frames.free_slots(), frames.total_slots());
        assert!(frames.directories().is_empty());
    });
}

#[test]
fn untouched_memory_reads_as_zero() {
    let mm = manager(16, 0);
    mm.run(|cpu| {
        assert_eq!(cpu.read_u32(0), Ok(0));
        assert_eq!(cpu.read_u32(0xFFFF_FFFC), Ok(0));
    })
    .unwrap();
    assert_all_free(&mm);
}

#[test]
fn written_words_read_back() {
    let mm = manager(16, 0);
    mm.run(|cpu| {
        for i in (0..2 * PAGE).step_by(4) {
            cpu.write_u32(i, i ^ 0x5A5A_5A5A).unwrap();
        }
        for i in (0..2 * PAGE).step_by(4) {
            assert_eq!(cpu.read_u32(i), Ok(i ^ 0x5A5A_5A5A));
        }
    })
    .unwrap();
}

#[test]
fn unaligned_access_is_rejected_without_a_fault() {
    let mm = manager(16, 0);
    mm.run(|cpu| {
        assert_eq!(
            cpu.write_u32(0x1001, 1),
            Err(AccessError::Unaligned(VirtualAddress::new(0x1001)))
        );
        assert_eq!(
            cpu.read_u32(0x1002),
            Err(AccessError::Unaligned(VirtualAddress::new(0x1002)))
        );
        assert_eq!(cpu.footprint().frames(), 1);
    })
    .unwrap();
}

#[test]
fn writing_a_read_faulted_page_is_a_permission_mismatch() {
    let mm = manager(16, 0);
    mm.run(|cpu| {
        assert_eq!(cpu.read_u32(0x3000), Ok(0));
        assert_eq!(
            cpu.write_u32(0x3000, 1),
            Err(AccessError::Fault(FaultError::PermissionMismatch {
                address: VirtualAddress::new(0x3000),
                mapped: Access::Read,
                requested: Access::Write,
            }))
        );
        // A written page stays readable.
        cpu.write_u32(0x4000, 9).unwrap();
        assert_eq!(cpu.read_u32(0x4000), Ok(9));
    })
    .unwrap();
}

#[test]
fn repeated_access_takes_no_new_frame() {
    let mm = manager(16, 0);
    mm.run(|cpu| {
        cpu.write_u32(0x2000, 1).unwrap();
        let before = mm.with_core(|core| core.frames().free_frames());
        cpu.write_u32(0x2000, 2).unwrap();
        cpu.write_u32(0x2FFC, 3).unwrap();
        assert_eq!(mm.with_core(|core| core.frames().free_frames()), before);
    })
    .unwrap();
}

#[test]
fn one_more_page_than_frames_evicts_exactly_one() {
    // 7 usable frames; directory and table leave N = 5 for data.
    let mm = manager(8, 4);
    mm.run(|cpu| {
        for page in 0..6 {
            cpu.write_u32(page * PAGE, 100 + page).unwrap();
        }
        assert_eq!(
            cpu.footprint(),
            Footprint {
                directory: 1,
                tables: 1,
                resident: 5,
                swapped: 1,
            }
        );

        // Page 0 was first in scan order; bring it back for writing.
        cpu.write_u32(4, 7).unwrap();
        assert_eq!(cpu.read_u32(0), Ok(100));
        assert_eq!(cpu.read_u32(4), Ok(7));
        assert_eq!(cpu.footprint().swapped, 1);

        for page in 1..6 {
            assert_eq!(cpu.read_u32(page * PAGE), Ok(100 + page));
        }
    })
    .unwrap();
    assert_all_free(&mm);
}

#[test]
fn exhausted_frames_and_swap_fail_the_fault() {
    // Directory, table and one data page use every frame.
    let mm = manager(4, 0);
    mm.run(|cpu| {
        cpu.write_u32(0, 1).unwrap();
        let err = cpu.write_u32(PAGE, 2).unwrap_err();
        assert_eq!(
            err,
            AccessError::Fault(FaultError::Allocation {
                address: VirtualAddress::new(PAGE),
                purpose: FramePurpose::Data,
                source: AllocError::OutOfSwap,
            })
        );
        // The resident page is untouched.
        assert_eq!(cpu.read_u32(0), Ok(1));
    })
    .unwrap();
    assert_all_free(&mm);
}

#[test]
fn failed_swap_read_keeps_the_page_swapped() {
    let config = MemoryConfig::new(4, 2).unwrap();
    let swap = SwapCallbacks::new(|_, _: &mut Frame| false, |_, _: &Frame| true);
    let mm = MemoryManager::new(&config, swap);
    mm.run(|cpu| {
        cpu.write_u32(0, 1).unwrap();
        cpu.write_u32(PAGE, 2).unwrap();
        assert_eq!(
            cpu.write_u32(0, 3),
            Err(AccessError::Fault(FaultError::SwapIn {
                address: VirtualAddress::new(0),
                slot: SlotIndex::new(0),
            }))
        );
        assert_eq!(cpu.footprint().swapped, 2);
    })
    .unwrap();
    assert_all_free(&mm);
}

#[test]
fn teardown_returns_everything_and_allows_reuse() {
    let mm = manager(32, 64);
    for round in 0..3 {
        let cpu = mm.spawn().unwrap();
        for page in 0..40 {
            cpu.write_u32(page * PAGE + 0x0040_0000, round).unwrap();
        }
        let held = cpu.footprint();
        assert_eq!(held.resident + held.swapped, 40);
        mm.with_core(|core| {
            let frames = core.frames();
            assert_eq!(frames.free_frames() + held.frames(), frames.total_frames());
            assert_eq!(frames.free_slots() + held.slots(), frames.total_slots());
        });
        drop(cpu);
        assert_all_free(&mm);
    }
}

#[test]
fn processes_have_separate_address_spaces() {
    let mm = manager(32, 0);
    let a = mm.spawn().unwrap();
    let b = mm.spawn().unwrap();
    assert_ne!(a.root(), b.root());
    a.write_u32(0x1000, 0xAAAA).unwrap();
    b.write_u32(0x1000, 0xBBBB).unwrap();
    assert_eq!(a.read_u32(0x1000), Ok(0xAAAA));
    assert_eq!(b.read_u32(0x1000), Ok(0xBBBB));
    drop(a);
    assert_eq!(b.read_u32(0x1000), Ok(0xBBBB));
    drop(b);
    assert_all_free(&mm);
}

#[test]
fn directory_registry_limits_live_processes() {
    let mm = manager(200, 0);
    let live: Vec<_> = (0..kernel_info::memory::PROCESS_MAX)
        .map(|_| mm.spawn().unwrap())
        .collect();
    assert!(matches!(mm.spawn(), Err(AllocError::TooManyDirectories)));
    drop(live);
    assert!(mm.spawn().is_ok());
}

#[test]
fn session_hands_back_its_swap_device() {
    let mm = manager(4, 2);
    mm.run(|cpu| {
        cpu.write_u32(0, 0xFEED).unwrap();
        cpu.write_u32(PAGE, 1).unwrap();
    })
    .unwrap();
    let swap = mm.into_swap();
    assert_eq!(swap.slot(SlotIndex::new(0)).unwrap().word(0), 0xFEED);
}
