//! Workloads run against a memory session.
//!
//! Each process touches two regions: the first 2000 bytes of its address
//! space and a 1,000,000-byte window starting at 19,230,400, one word at a
//! time.

use kernel_alloc::{AllocError, SwapDevice};
use kernel_mm::{AccessError, Cpu, MemoryManager};
use log::info;
use std::ops::Range;
use std::thread;

const LOW: Range<u32> = 0..2000;
const HIGH: Range<u32> = 19_230_400..20_230_400;
const LOW_SALT: u32 = 1_234_567;
const HIGH_SALT: u32 = 7_654_321;

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("access to {address:#010x} failed: {source}")]
    Access {
        address: u32,
        #[source]
        source: AccessError,
    },
    #[error("{address:#010x} holds {found:#010x}, expected {expected:#010x}")]
    Mismatch {
        address: u32,
        expected: u32,
        found: u32,
    },
    #[error("cannot start process: {0}")]
    Spawn(#[from] AllocError),
    #[error("a worker process panicked")]
    WorkerPanicked,
}

/// Which workload to run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Scenario {
    /// Read both regions, expecting zeroes.
    SeqRead,
    /// Write both regions, then read everything back.
    SeqWrite,
    /// One reader and two writers as concurrent processes.
    Parallel,
}

impl Scenario {
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "seq-read" => Some(Self::SeqRead),
            "seq-write" => Some(Self::SeqWrite),
            "parallel" => Some(Self::Parallel),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SeqRead => "seq-read",
            Self::SeqWrite => "seq-write",
            Self::Parallel => "parallel",
        }
    }

    /// Run as the initial process of `manager`.
    pub fn run<S: SwapDevice + Send>(self, manager: &MemoryManager<S>) -> Result<(), ScenarioError> {
        manager.run(|cpu| match self {
            Self::SeqRead => read_zeroes(cpu),
            Self::SeqWrite => write_and_verify(cpu),
            Self::Parallel => parallel(manager),
        })?
    }
}

fn words(range: Range<u32>) -> impl Iterator<Item = u32> {
    range.step_by(4)
}

fn read<S: SwapDevice>(cpu: &Cpu<'_, S>, address: u32) -> Result<u32, ScenarioError> {
    cpu.read_u32(address)
        .map_err(|source| ScenarioError::Access { address, source })
}

fn expect<S: SwapDevice>(cpu: &Cpu<'_, S>, address: u32, expected: u32) -> Result<(), ScenarioError> {
    let found = read(cpu, address)?;
    if found == expected {
        Ok(())
    } else {
        Err(ScenarioError::Mismatch {
            address,
            expected,
            found,
        })
    }
}

fn read_zeroes<S: SwapDevice>(cpu: &Cpu<'_, S>) -> Result<(), ScenarioError> {
    for address in words(LOW).chain(words(HIGH)) {
        expect(cpu, address, 0)?;
    }
    info!("Process {} read {} of zeroes", cpu.root(), cpu.footprint());
    Ok(())
}

fn write_and_verify<S: SwapDevice>(cpu: &Cpu<'_, S>) -> Result<(), ScenarioError> {
    let write = |address: u32, value: u32| {
        cpu.write_u32(address, value)
            .map_err(|source| ScenarioError::Access { address, source })
    };

    for address in words(LOW) {
        write(address, address + LOW_SALT)?;
    }
    for address in words(HIGH) {
        write(address, address + HIGH_SALT)?;
    }
    for address in words(LOW) {
        expect(cpu, address, address + LOW_SALT)?;
    }
    for address in words(HIGH) {
        expect(cpu, address, address + HIGH_SALT)?;
    }
    info!("Process {} verified, holding {}", cpu.root(), cpu.footprint());
    Ok(())
}

fn parallel<S: SwapDevice + Send>(manager: &MemoryManager<S>) -> Result<(), ScenarioError> {
    type Workload<D> = fn(&Cpu<'_, D>) -> Result<(), ScenarioError>;
    let workloads: [Workload<S>; 3] = [read_zeroes, write_and_verify, write_and_verify];

    thread::scope(|s| {
        let mut handles = Vec::with_capacity(workloads.len());
        for workload in workloads {
            let cpu = manager.spawn()?;
            handles.push(s.spawn(move || workload(&cpu)));
        }
        for handle in handles {
            handle
                .join()
                .unwrap_or(Err(ScenarioError::WorkerPanicked))?;
        }
        Ok(())
    })
}
