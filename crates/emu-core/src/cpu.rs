//! CPU core trait.

use crate::Bus;

/// A CPU core.
///
/// CPUs execute instructions and access memory through a bus. The bus is
/// passed to every tick rather than owned, so it can be shared with the
/// other components (video chip, VIAs) that watch the same address lines.
///
/// CPUs expose their internal state for observation and debugging.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Advance the CPU by exactly one clock cycle.
    fn tick<B: Bus>(&mut self, bus: &mut B);

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if a hold request stalled the CPU this cycle.
    fn is_halted(&self) -> bool;

    /// Start the reset sequence. Takes effect on the next tick.
    fn reset(&mut self);
}
