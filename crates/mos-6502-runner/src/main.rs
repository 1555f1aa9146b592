//! Headless 6502 image runner.
//!
//! Loads a raw memory image, points the CPU at it and runs until the
//! program traps (an instruction that leaves PC where it started), the CPU
//! locks up, or a success address is reached. Built for functional test
//! images such as Klaus Dormann's.

use std::fmt;
use std::path::PathBuf;
use std::process;

use emu_core::{Cpu, SimpleBus};
use log::{debug, info};
use mos_6502::{Config, Mos6502, Registers};

/// Largest image that fits the address space.
const MAX_IMAGE: usize = 0x10000;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum RunError {
    Io(PathBuf, std::io::Error),
    ImageTooLarge(usize),
    BadNumber(String),
    Usage(String),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "cannot read {}: {e}", path.display()),
            Self::ImageTooLarge(size) => {
                write!(f, "image is {size} bytes, larger than {MAX_IMAGE}")
            }
            Self::BadNumber(s) => write!(f, "bad number: {s}"),
            Self::Usage(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(_, e) => Some(e),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct CliArgs {
    image: PathBuf,
    load: u16,
    /// Start address; `None` runs the reset sequence through $FFFC.
    pc: Option<u16>,
    success: Option<u16>,
    max_cycles: u64,
    config: Config,
}

/// Parse `$1234`, `0x1234` or plain decimal.
fn parse_number(s: &str) -> Result<u64, RunError> {
    let parsed = if let Some(hex) = s.strip_prefix('$').or_else(|| s.strip_prefix("0x")) {
        u64::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    parsed.map_err(|_| RunError::BadNumber(s.to_string()))
}

fn parse_address(s: &str) -> Result<u16, RunError> {
    u16::try_from(parse_number(s)?).map_err(|_| RunError::BadNumber(s.to_string()))
}

fn parse_byte(s: &str) -> Result<u8, RunError> {
    u8::try_from(parse_number(s)?).map_err(|_| RunError::BadNumber(s.to_string()))
}

fn usage() {
    eprintln!("Usage: mos-6502-runner <image> [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --load <addr>        Load address [default: $0000]");
    eprintln!("  --pc <addr>          Start address [default: reset vector]");
    eprintln!("  --success <addr>     Trap address that counts as a pass");
    eprintln!("  --max-cycles <n>     Give up after n cycles [default: 1000000000]");
    eprintln!("  --magic <byte>       XAA/LXA constant [default: $EE]");
    eprintln!("  --no-irq             Ignore the IRQ line");
    eprintln!("  --no-nmi             Ignore the NMI line");
}

fn parse_args(args: &[String]) -> Result<CliArgs, RunError> {
    let mut image = None;
    let mut cli = CliArgs {
        image: PathBuf::new(),
        load: 0x0000,
        pc: None,
        success: None,
        max_cycles: 1_000_000_000,
        config: Config::default(),
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = || {
            iter.next()
                .ok_or_else(|| RunError::Usage(format!("{arg} needs a value")))
        };
        match arg.as_str() {
            "--load" => cli.load = parse_address(value()?)?,
            "--pc" => cli.pc = Some(parse_address(value()?)?),
            "--success" => cli.success = Some(parse_address(value()?)?),
            "--max-cycles" => cli.max_cycles = parse_number(value()?)?,
            "--magic" => cli.config = cli.config.with_magic(parse_byte(value()?)?),
            "--no-irq" => cli.config = cli.config.with_irq(false),
            "--no-nmi" => cli.config = cli.config.with_nmi(false),
            other if other.starts_with("--") => {
                return Err(RunError::Usage(format!("unknown argument: {other}")));
            }
            path => image = Some(PathBuf::from(path)),
        }
    }

    cli.image = image.ok_or_else(|| RunError::Usage("no image given".to_string()))?;
    Ok(cli)
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    /// PC reached the success address.
    Passed(u16),
    /// An instruction left PC where it started.
    Trapped(u16),
    /// A lock-up opcode halted the CPU.
    Jammed(u16),
    /// The cycle budget ran out.
    OutOfCycles(u16),
}

fn load_image(cli: &CliArgs) -> Result<SimpleBus, RunError> {
    let data = std::fs::read(&cli.image).map_err(|e| RunError::Io(cli.image.clone(), e))?;
    if data.len() > MAX_IMAGE {
        return Err(RunError::ImageTooLarge(data.len()));
    }
    let mut bus = SimpleBus::new();
    bus.load(cli.load, &data);
    info!(
        "loaded {} bytes at ${:04X} from {}",
        data.len(),
        cli.load,
        cli.image.display()
    );
    Ok(bus)
}

/// Run `cpu` until one of the stop conditions in [`Outcome`] holds.
fn run(cpu: &mut Mos6502, bus: &mut SimpleBus, success: Option<u16>, max_cycles: u64) -> Outcome {
    while !cpu.is_at_instruction_boundary() && !cpu.is_jammed() {
        cpu.tick(bus);
    }

    loop {
        let start = cpu.pc();
        if success == Some(start) {
            return Outcome::Passed(start);
        }
        if cpu.cycles() >= max_cycles {
            return Outcome::OutOfCycles(start);
        }

        cpu.step_instruction(bus);

        if cpu.is_jammed() {
            return Outcome::Jammed(cpu.pc());
        }
        if cpu.pc() == start {
            return if success == Some(start) {
                Outcome::Passed(start)
            } else {
                Outcome::Trapped(start)
            };
        }
    }
}

fn execute(cli: &CliArgs) -> Result<Outcome, RunError> {
    let mut bus = load_image(cli)?;
    let mut cpu = Mos6502::new(cli.config);
    if let Some(pc) = cli.pc {
        cpu.load_registers(Registers {
            pc,
            s: 0xFF,
            ..Registers::default()
        });
    }
    debug!("config {:?}", cli.config);

    let outcome = run(&mut cpu, &mut bus, cli.success, cli.max_cycles);
    info!("{outcome:?} after {} cycles", cpu.cycles());
    let regs = cpu.registers();
    eprintln!(
        "PC=${:04X} A=${:02X} X=${:02X} Y=${:02X} S=${:02X} P=${:02X} cycles={}",
        regs.pc,
        regs.a,
        regs.x,
        regs.y,
        regs.s,
        regs.p.bits(),
        cpu.cycles()
    );
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        usage();
        return;
    }

    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{e}");
            usage();
            process::exit(2);
        }
    };

    match execute(&cli) {
        Ok(Outcome::Passed(pc)) => println!("passed at ${pc:04X}"),
        Ok(Outcome::Trapped(pc)) if cli.success.is_none() => println!("trapped at ${pc:04X}"),
        Ok(outcome) => {
            println!("failed: {outcome:?}");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}
