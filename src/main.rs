use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};

use chip8::instruction::disassemble;
use chip8::{Interpreter, TimerMode};

#[cfg(feature = "sdl")]
mod frontend;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The path of the rom to load
    #[arg(short, long, value_name = "FILE")]
    rom_path: PathBuf,

    /// Instructions executed per 60 Hz frame
    #[arg(long, default_value_t = 10)]
    cycles_per_frame: u32,

    /// When the delay and sound timers count down
    #[arg(long, value_enum, default_value_t = TimerCadence::Frame)]
    timer_mode: TimerCadence,

    /// Seed for the RND instruction, random if not given
    #[arg(long)]
    seed: Option<u64>,

    /// Run without a window and print the final screen
    #[arg(long)]
    headless: bool,

    /// Number of frames to run in headless mode
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Window pixels per Chip-8 pixel
    #[arg(long, default_value_t = 10)]
    scale: u32,

    /// Print the ROM as instructions and exit
    #[arg(long)]
    disassemble: bool,

    /// Increase log output, can be repeated
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TimerCadence {
    /// Once per executed instruction
    PerCycle,
    /// Once per 60 Hz frame
    Frame,
}

impl From<TimerCadence> for TimerMode {
    fn from(cadence: TimerCadence) -> Self {
        match cadence {
            TimerCadence::PerCycle => TimerMode::PerCycle,
            TimerCadence::Frame => TimerMode::External,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new().filter_level(level).parse_default_env().init();
}

/// Runs one 60 Hz frame worth of instructions, then ticks the timers if they run at frame rate.
/// Returns whether a tone should be sounding after the frame.
fn run_frame(interpreter: &mut Interpreter, cycles: u32) -> Result<bool> {
    for _ in 0..cycles {
        let cycle = interpreter
            .step()
            .with_context(|| format!("Execution stopped at {:#05X}", interpreter.registers().pc()))?;

        if cycle.tone {
            info!("Beep");
        }

        // Nothing changes until the frontend reports a key
        if cycle.waiting {
            break;
        }
    }

    if interpreter.timer_mode() == TimerMode::External && interpreter.tick_timers() {
        info!("Beep");
    }

    Ok(interpreter.sound_active())
}

fn run_headless(interpreter: &mut Interpreter, frames: u32, cycles_per_frame: u32) -> Result<()> {
    for _ in 0..frames {
        run_frame(interpreter, cycles_per_frame)?;
    }

    print!("{}", interpreter.display());

    Ok(())
}

fn print_disassembly(cli: &Cli) -> Result<()> {
    let bytes = std::fs::read(&cli.rom_path).with_context(|| format!("Could not read {:?}", cli.rom_path))?;

    for (address, instruction) in disassemble(&bytes) {
        println!("{:#05X}  {}", address, instruction);
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if cli.disassemble {
        return print_disassembly(&cli);
    }

    let mut interpreter = match cli.seed {
        Some(seed) => Interpreter::with_seed(seed),
        None => Interpreter::new(),
    }
    .with_timer_mode(cli.timer_mode.into());

    interpreter
        .load_rom_file(&cli.rom_path)
        .with_context(|| format!("Could not load {:?}", cli.rom_path))?;

    if cli.headless {
        return run_headless(&mut interpreter, cli.frames, cli.cycles_per_frame);
    }

    #[cfg(feature = "sdl")]
    return frontend::run(&mut interpreter, &cli);

    #[cfg(not(feature = "sdl"))]
    anyhow::bail!("Built without the `sdl` feature, only --headless is available");
}
