//! Core traits and types for cycle-accurate emulation.
//!
//! A CPU advances one clock at a time and performs exactly one bus access
//! per clock. Everything that shares the bus sees every access, including
//! the ones the CPU throws away.

mod bus;
mod cpu;
mod observable;

pub use bus::{Bus, SimpleBus};
pub use cpu::Cpu;
pub use observable::{Observable, Value};
