//! 6502 CPU implementation.
//!
//! Cycle-accurate emulation where each `tick()` performs exactly one
//! bus access. The machine is a pair of continuations: the addressing mode
//! and T-state to run next, and the opcode function that the mode hands off
//! to on its last cycle.

use emu_core::{Bus, Cpu, Observable, Value};
use log::{debug, trace};

use crate::addressing::AddrMode;
use crate::decode::decode;
use crate::flags::{C, D, I, N, V, Z};
use crate::ops::Op;
use crate::{Config, Registers, Status};

/// What the next tick does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Next {
    /// Opcode fetch (SYNC high). With `poll` false, pending interrupts are
    /// not looked at on this fetch.
    Fetch { poll: bool },
    /// T-state of the current addressing mode.
    Cycle(u8),
    /// Locked by a JAM opcode until reset.
    Jammed,
}

/// The MOS 6502 CPU, NMOS variant.
///
/// Implements cycle-accurate execution where each `tick()` advances
/// exactly one CPU cycle. The 6502 performs one bus access per cycle,
/// and so does this core, including the reads real silicon throws away.
#[derive(Debug, Clone)]
pub struct Mos6502 {
    pub(crate) regs: Registers,
    pub(crate) config: Config,

    /// Continuation for the next tick.
    pub(crate) next: Next,
    /// Addressing mode of the instruction (or sequence) in flight.
    pub(crate) mode: AddrMode,
    /// Opcode function of the instruction in flight.
    pub(crate) op: Op,
    /// Raw opcode byte of the instruction in flight.
    pub(crate) opcode: u8,

    /// Effective address.
    pub(crate) ea: u16,
    /// Unindexed base address for the indexed modes and JMP indirect.
    pub(crate) base: u16,
    /// Zero-page pointer for the indirect modes.
    pub(crate) pointer: u8,
    /// Operand value, or branch offset.
    pub(crate) value: u8,
    /// Vector used by the running BRK/IRQ/NMI sequence.
    pub(crate) vector: u16,

    /// CLI ran last instruction: the next fetch ignores IRQ.
    pub(crate) cli_masking: bool,
    /// A taken branch stayed on its page: the next fetch does not poll.
    pub(crate) branch_taken_masking: bool,

    irq_line: bool,
    /// IRQ line as sampled at the end of the previous cycle.
    irq_pending: bool,
    nmi_line: bool,
    /// NMI edge latch.
    pub(crate) nmi_pending: bool,
    rdy_line: bool,
    halted: bool,

    /// Total cycles executed, held cycles included.
    total_cycles: u64,
}

impl Default for Mos6502 {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Mos6502 {
    /// Create a new 6502. The first seven ticks run the reset sequence.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            regs: Registers::default(),
            config,
            next: Next::Cycle(0),
            mode: AddrMode::Reset,
            op: Op::Nop,
            opcode: 0,
            ea: 0,
            base: 0,
            pointer: 0,
            value: 0,
            vector: 0,
            cli_masking: false,
            branch_taken_masking: false,
            irq_line: false,
            irq_pending: false,
            nmi_line: false,
            nmi_pending: false,
            rdy_line: false,
            halted: false,
            total_cycles: 0,
        }
    }

    /// Configuration the CPU was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Abandon whatever is in flight and start the reset sequence.
    ///
    /// The sequence itself runs over the next seven ticks.
    pub fn reset(&mut self) {
        debug!("reset requested at PC=${:04X}", self.regs.pc);
        self.mode = AddrMode::Reset;
        self.next = Next::Cycle(0);
        self.cli_masking = false;
        self.branch_taken_masking = false;
        self.nmi_pending = false;
        self.halted = false;
    }

    /// Pull the IRQ line low. It stays pending for as long as it is held.
    ///
    /// The line is sampled at the end of each tick, so it never affects the
    /// next tick: asserted just before an opcode fetch, the IRQ is taken one
    /// instruction later. An NMI edge latches at once and can be taken by
    /// that same fetch.
    pub fn assert_irq(&mut self) {
        self.irq_line = true;
    }

    /// Release the IRQ line.
    pub fn release_irq(&mut self) {
        self.irq_line = false;
    }

    /// Pull the NMI line low. Only the high-to-low edge latches an NMI.
    pub fn assert_nmi(&mut self) {
        if self.config.nmi && !self.nmi_line {
            self.nmi_pending = true;
        }
        self.nmi_line = true;
    }

    /// Release the NMI line. A latched NMI stays latched.
    pub fn release_nmi(&mut self) {
        self.nmi_line = false;
    }

    /// Pulse the SO pin, setting V.
    pub fn set_overflow(&mut self) {
        self.regs.p.set(V);
    }

    /// Drive the RDY (hold) line. Ignored unless enabled in [`Config`].
    pub fn set_rdy(&mut self, asserted: bool) {
        self.rdy_line = asserted;
    }

    /// True on the opcode fetch cycle (the SYNC pin).
    #[must_use]
    pub fn is_at_instruction_boundary(&self) -> bool {
        matches!(self.next, Next::Fetch { .. })
    }

    /// True while the I flag is set.
    #[must_use]
    pub fn is_interrupt_disabled(&self) -> bool {
        self.regs.p.is_set(I)
    }

    /// True once a JAM opcode has locked the CPU. Only reset recovers.
    #[must_use]
    pub fn is_jammed(&self) -> bool {
        self.next == Next::Jammed
    }

    /// Total cycles stepped since construction.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Accumulator.
    #[must_use]
    pub fn a(&self) -> u8 {
        self.regs.a
    }

    /// X index register.
    #[must_use]
    pub fn x(&self) -> u8 {
        self.regs.x
    }

    /// Y index register.
    #[must_use]
    pub fn y(&self) -> u8 {
        self.regs.y
    }

    /// Stack pointer, low byte of the stack page address.
    #[must_use]
    pub fn sp(&self) -> u8 {
        self.regs.s
    }

    /// Processor status.
    #[must_use]
    pub fn status(&self) -> Status {
        self.regs.p
    }

    /// Install a register set and park at an instruction boundary.
    ///
    /// Abandons any instruction in flight without touching the bus. Intended
    /// for debuggers and test harnesses.
    pub fn load_registers(&mut self, regs: Registers) {
        self.regs = regs;
        self.next = Next::Fetch { poll: true };
        self.cli_masking = false;
        self.branch_taken_masking = false;
        self.halted = false;
    }

    /// Tick until the next instruction boundary and return the cycle count.
    ///
    /// Stops early if the CPU jams or is held by RDY.
    pub fn step_instruction<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let mut cycles = 0;
        loop {
            self.execute_cycle(bus);
            cycles += 1;
            if self.is_at_instruction_boundary() || self.is_jammed() || self.halted {
                return cycles;
            }
        }
    }

    /// Execute one CPU cycle.
    fn execute_cycle<B: Bus>(&mut self, bus: &mut B) {
        self.total_cycles += 1;

        if self.config.rdy && self.rdy_line && !self.is_write_cycle() {
            if !self.halted {
                trace!("RDY hold at PC=${:04X}", self.regs.pc);
            }
            // The held read still reaches the bus; only its result is lost.
            let held = self.clone();
            self.dispatch(bus);
            *self = Self {
                halted: true,
                ..held
            };
            return;
        }
        if self.halted {
            trace!("RDY released at PC=${:04X}", self.regs.pc);
            self.halted = false;
        }

        self.dispatch(bus);
        self.irq_pending = self.config.irq && self.irq_line;
    }

    /// Perform the bus access of the cycle `next` describes.
    fn dispatch<B: Bus>(&mut self, bus: &mut B) {
        match self.next {
            Next::Fetch { poll } => self.fetch(bus, poll),
            Next::Cycle(t) => self.step_mode(bus, t),
            Next::Jammed => {
                let _ = bus.read(self.regs.pc);
            }
        }
    }

    fn is_write_cycle(&self) -> bool {
        match self.next {
            Next::Cycle(t) => self.mode.writes_on(t),
            _ => false,
        }
    }

    /// T0: poll for interrupts, then fetch and decode an opcode.
    fn fetch<B: Bus>(&mut self, bus: &mut B, poll: bool) {
        let poll = poll && !self.branch_taken_masking;
        let irq_masked = self.cli_masking || self.regs.p.is_set(I);
        self.branch_taken_masking = false;
        self.cli_masking = false;

        if poll {
            if self.nmi_pending {
                self.begin_interrupt(bus, AddrMode::Nmi);
                return;
            }
            if self.irq_pending && !irq_masked {
                self.begin_interrupt(bus, AddrMode::Irq);
                return;
            }
        }

        self.opcode = self.fetch_operand(bus);
        (self.mode, self.op) = decode(self.opcode);
        self.next = Next::Cycle(1);
    }
}

// ============================================================================
// Trait implementations
// ============================================================================

impl Cpu for Mos6502 {
    type Registers = Registers;

    fn tick<B: Bus>(&mut self, bus: &mut B) {
        self.execute_cycle(bus);
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Self::Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.halted
    }

    fn reset(&mut self) {
        Mos6502::reset(self);
    }
}

impl Observable for Mos6502 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "s" | "sp" => Some(self.regs.s.into()),
            "p" | "status" => Some(self.regs.p.bits().into()),
            "flags.c" => Some(self.regs.p.is_set(C).into()),
            "flags.z" => Some(self.regs.p.is_set(Z).into()),
            "flags.i" => Some(self.regs.p.is_set(I).into()),
            "flags.d" => Some(self.regs.p.is_set(D).into()),
            "flags.v" => Some(self.regs.p.is_set(V).into()),
            "flags.n" => Some(self.regs.p.is_set(N).into()),
            "sync" => Some(self.is_at_instruction_boundary().into()),
            "halted" => Some(self.halted.into()),
            "jammed" => Some(self.is_jammed().into()),
            "irq" => Some(self.irq_line.into()),
            "nmi" => Some(self.nmi_line.into()),
            "cycles" => Some(Value::U64(self.total_cycles)),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc", "a", "x", "y", "s", "p", "flags.c", "flags.z", "flags.i", "flags.d", "flags.v",
            "flags.n", "sync", "halted", "jammed", "irq", "nmi", "cycles",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::SimpleBus;

    /// CPU parked at `pc` with everything else zeroed.
    fn cpu_at(pc: u16) -> Mos6502 {
        let mut cpu = Mos6502::default();
        cpu.load_registers(Registers {
            pc,
            s: 0xFD,
            ..Registers::default()
        });
        cpu
    }

    #[test]
    fn test_lda_immediate() {
        let mut cpu = cpu_at(0x0000);
        let mut bus = SimpleBus::new();

        // LDA #$42
        bus.load(0x0000, &[0xA9, 0x42]);

        // Cycle 1: fetch opcode
        cpu.tick(&mut bus);
        assert!(!cpu.is_at_instruction_boundary());
        // Cycle 2: fetch operand, execute
        cpu.tick(&mut bus);

        assert_eq!(cpu.a(), 0x42);
        assert_eq!(cpu.pc(), 0x0002);
        assert!(cpu.is_at_instruction_boundary());
    }

    #[test]
    fn test_sta_zeropage() {
        let mut cpu = cpu_at(0x0000);
        let mut bus = SimpleBus::new();

        // LDA #$55; STA $10
        bus.load(0x0000, &[0xA9, 0x55, 0x85, 0x10]);

        assert_eq!(cpu.step_instruction(&mut bus), 2);
        assert_eq!(cpu.step_instruction(&mut bus), 3);
        assert_eq!(bus.peek(0x0010), 0x55);
    }

    #[test]
    fn test_jmp_absolute() {
        let mut cpu = cpu_at(0x0000);
        let mut bus = SimpleBus::new();

        // JMP $1234
        bus.load(0x0000, &[0x4C, 0x34, 0x12]);

        assert_eq!(cpu.step_instruction(&mut bus), 3);
        assert_eq!(cpu.pc(), 0x1234);
    }

    #[test]
    fn power_on_runs_reset_sequence() {
        let mut cpu = Mos6502::default();
        let mut bus = SimpleBus::new();
        bus.load(0xFFFC, &[0x00, 0x80]);

        assert!(!cpu.is_at_instruction_boundary());
        for _ in 0..7 {
            cpu.tick(&mut bus);
        }
        assert!(cpu.is_at_instruction_boundary());
        assert_eq!(cpu.pc(), 0x8000);
        assert_eq!(cpu.sp(), 0xFD);
        assert!(cpu.is_interrupt_disabled());
        assert_eq!(cpu.cycles(), 7);
    }

    #[test]
    fn registers_are_a_snapshot() {
        let cpu = cpu_at(0x0200);
        let mut regs = cpu.registers();
        regs.a = 0x99;
        regs.pc = 0x1234;
        assert_eq!(cpu.a(), 0x00);
        assert_eq!(cpu.pc(), 0x0200);
    }

    #[test]
    fn observable_paths_all_resolve() {
        let cpu = cpu_at(0x0200);
        for path in cpu.query_paths() {
            assert!(cpu.query(path).is_some(), "{path} did not resolve");
        }
        assert_eq!(cpu.query("pc"), Some(Value::U16(0x0200)));
        assert_eq!(cpu.query("sync"), Some(Value::Bool(true)));
        assert_eq!(cpu.query("bogus"), None);
    }

    #[test]
    fn set_overflow_pin_sets_v() {
        let mut cpu = cpu_at(0x0200);
        cpu.set_overflow();
        assert!(cpu.status().is_set(V));
    }

    #[test]
    fn nmi_latches_on_edge_only() {
        let mut cpu = cpu_at(0x0200);
        cpu.assert_nmi();
        assert!(cpu.nmi_pending);
        cpu.nmi_pending = false;
        // Still held: no new edge.
        cpu.assert_nmi();
        assert!(!cpu.nmi_pending);
        cpu.release_nmi();
        cpu.assert_nmi();
        assert!(cpu.nmi_pending);
    }

    #[test]
    fn irq_is_sampled_a_tick_later_than_nmi() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0xEA, 0xEA]);

        // IRQ asserted right before a fetch: the NOP still runs
        let mut cpu = cpu_at(0x0200);
        cpu.assert_irq();
        cpu.tick(&mut bus);
        assert_eq!(cpu.pc(), 0x0201);
        assert_eq!(cpu.mode, AddrMode::Implied);

        // NMI asserted at the same point replaces that fetch
        let mut cpu = cpu_at(0x0200);
        cpu.assert_nmi();
        cpu.tick(&mut bus);
        assert_eq!(cpu.pc(), 0x0200);
        assert_eq!(cpu.mode, AddrMode::Nmi);
    }

    #[test]
    fn nmi_disabled_by_config_is_inert() {
        let mut cpu = Mos6502::new(Config::default().with_nmi(false));
        cpu.assert_nmi();
        assert!(!cpu.nmi_pending);
    }
}
