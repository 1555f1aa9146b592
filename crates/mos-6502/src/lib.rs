//! Cycle-accurate NMOS 6502 CPU emulator.
//!
//! The 6502 executes one bus access per cycle. Each `tick()` advances
//! exactly one cycle, and every access real silicon makes (dummy reads,
//! the double write of read-modify-write instructions) reaches the bus.
//! All 256 opcodes are implemented, the undocumented ones included.
//!
//! ```
//! use emu_core::{Cpu, SimpleBus};
//! use mos_6502::{Config, Mos6502};
//!
//! let mut bus = SimpleBus::new();
//! bus.load(0xFFFC, &[0x00, 0x02]);
//! bus.load(0x0200, &[0xA9, 0x42]); // LDA #$42
//!
//! let mut cpu = Mos6502::new(Config::default());
//! for _ in 0..7 {
//!     cpu.tick(&mut bus); // power-on reset
//! }
//! cpu.step_instruction(&mut bus);
//! assert_eq!(cpu.a(), 0x42);
//! ```

mod addressing;
mod config;
mod cpu;
mod decode;
pub mod flags;
mod interrupt;
mod ops;
mod registers;

pub use addressing::{Access, AddrMode};
pub use config::{Config, DEFAULT_MAGIC};
pub use cpu::Mos6502;
pub use decode::decode;
pub use flags::Status;
pub use interrupt::{IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR};
pub use ops::Op;
pub use registers::{Registers, STACK_PAGE};
