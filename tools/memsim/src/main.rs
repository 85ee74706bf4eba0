mod logger;
mod scenarios;
mod swap_file;

use crate::logger::StderrLogger;
use crate::scenarios::{Scenario, ScenarioError};
use crate::swap_file::FileSwap;
use kernel_alloc::{MemorySwap, SwapDevice};
use kernel_info::{ConfigError, MemoryConfig};
use kernel_mm::MemoryManager;
use log::{LevelFilter, SetLoggerError, info};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use std::{env, io};

const USAGE: &str = "\
usage: memsim [options] [scenario]

scenarios:
  seq-read     read two regions of a fresh address space, expecting zeroes
  seq-write    write two regions, then read them back
  parallel     one seq-read and two seq-write processes at once
  suite        the four sessions below (default)
                 seq-read  1024 frames, 1024 slots
                 seq-write 1024 frames, 1024 slots
                 seq-write  100 frames, 1024 slots
                 parallel   100 frames, 1024 slots

options:
  --frames N        physical frames, frame 0 included (default 1024)
  --slots N         swap slots (default 1024)
  --swap-file PATH  keep swap in PATH instead of in memory
  -v, -vv           debug / trace logging
  -h, --help        show this text";

const SUITE: [(Scenario, u32, u32); 4] = [
    (Scenario::SeqRead, 1024, 1024),
    (Scenario::SeqWrite, 1024, 1024),
    (Scenario::SeqWrite, 100, 1024),
    (Scenario::Parallel, 100, 1024),
];

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("invalid memory configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("swap file: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error("cannot install logger: {0}")]
    Logger(#[from] SetLoggerError),
    #[error("session ended with {frames} frames and {slots} swap slots still allocated")]
    Leak { frames: u32, slots: u32 },
}

struct Options {
    scenario: Option<Scenario>,
    frames: u32,
    slots: u32,
    swap_file: Option<PathBuf>,
    log_level: LevelFilter,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<Options>, CliError> {
    let mut options = Options {
        scenario: None,
        frames: 1024,
        slots: 1024,
        swap_file: None,
        log_level: LevelFilter::Info,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "-v" => options.log_level = LevelFilter::Debug,
            "-vv" => options.log_level = LevelFilter::Trace,
            "--frames" => options.frames = number(&arg, args.next())?,
            "--slots" => options.slots = number(&arg, args.next())?,
            "--swap-file" => {
                let path = args
                    .next()
                    .ok_or_else(|| CliError::Usage("--swap-file needs a path".into()))?;
                options.swap_file = Some(path.into());
            }
            "suite" => options.scenario = None,
            name => {
                options.scenario = Some(
                    Scenario::parse(name)
                        .ok_or_else(|| CliError::Usage(format!("unknown argument `{name}`")))?,
                );
            }
        }
    }
    Ok(Some(options))
}

fn number(flag: &str, value: Option<String>) -> Result<u32, CliError> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| CliError::Usage(format!("{flag} needs a non-negative number")))
}

fn run_session<S: SwapDevice + Send>(
    scenario: Scenario,
    config: &MemoryConfig,
    swap: S,
) -> Result<(), CliError> {
    let started = Instant::now();
    let manager = MemoryManager::new(config, swap);
    scenario.run(&manager)?;

    let (frames, slots) = manager.with_core(|core| {
        let frames = core.frames();
        (
            frames.total_frames() - frames.free_frames(),
            frames.total_slots() - frames.free_slots(),
        )
    });
    if frames != 0 || slots != 0 {
        return Err(CliError::Leak { frames, slots });
    }

    println!(
        "{:<9} {:>5} frames {:>5} slots  ok  ({:.2?})",
        scenario.name(),
        config.frames(),
        config.swap_slots(),
        started.elapsed()
    );
    Ok(())
}

fn run(options: &Options) -> Result<(), CliError> {
    let sessions = match options.scenario {
        Some(scenario) => vec![(scenario, options.frames, options.slots)],
        None => SUITE.to_vec(),
    };

    for (scenario, frames, slots) in sessions {
        let config = MemoryConfig::new(frames, slots)?;
        match &options.swap_file {
            Some(path) => {
                info!("Swapping to {}", path.display());
                run_session(scenario, &config, FileSwap::create(path)?)?;
            }
            None => run_session(scenario, &config, MemorySwap::new(config.swap_slots()))?,
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let options = match parse_args(env::args().skip(1)) {
        Ok(Some(options)) => options,
        Ok(None) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("memsim: {e}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = StderrLogger::init(options.log_level)
        .map_err(CliError::from)
        .and_then(|()| run(&options))
    {
        eprintln!("memsim: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Options>, CliError> {
        parse_args(args.iter().map(ToString::to_string))
    }

    #[test]
    fn defaults_run_the_suite() {
        let options = parse(&[]).unwrap().unwrap();
        assert_eq!(options.scenario, None);
        assert_eq!((options.frames, options.slots), (1024, 1024));
        assert_eq!(options.log_level, LevelFilter::Info);
    }

    #[test]
    fn flags_and_scenario() {
        let options = parse(&["--frames", "100", "-vv", "parallel", "--swap-file", "/tmp/x"])
            .unwrap()
            .unwrap();
        assert_eq!(options.scenario, Some(Scenario::Parallel));
        assert_eq!(options.frames, 100);
        assert_eq!(options.log_level, LevelFilter::Trace);
        assert_eq!(options.swap_file, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn bad_arguments_are_usage_errors() {
        assert!(matches!(parse(&["--slots"]), Err(CliError::Usage(_))));
        assert!(matches!(parse(&["--frames", "-3"]), Err(CliError::Usage(_))));
        assert!(matches!(parse(&["thrash"]), Err(CliError::Usage(_))));
        assert!(matches!(parse(&["--help"]), Ok(None)));
    }

    #[test]
    fn each_scenario_runs_in_a_small_session() {
        let config = MemoryConfig::new(64, 1024).unwrap();
        for scenario in [Scenario::SeqRead, Scenario::SeqWrite, Scenario::Parallel] {
            run_session(scenario, &config, MemorySwap::new(config.swap_slots())).unwrap();
        }
    }
}
