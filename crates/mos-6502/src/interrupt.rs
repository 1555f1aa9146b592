//! BRK, IRQ, NMI and reset sequences.
//!
//! BRK, IRQ and NMI share one seven-cycle sequence. They differ in whether
//! PC steps over the BRK padding byte, in the B bit of the pushed status, and
//! in the vector. An NMI that arrives before the status push of a BRK or IRQ
//! takes over its vector fetch.

use emu_core::Bus;
use log::debug;

use crate::addressing::AddrMode;
use crate::cpu::Next;
use crate::flags::{self, I};
use crate::Mos6502;

/// NMI vector.
pub const NMI_VECTOR: u16 = 0xFFFA;
/// Reset vector.
pub const RESET_VECTOR: u16 = 0xFFFC;
/// IRQ and BRK vector.
pub const IRQ_VECTOR: u16 = 0xFFFE;

impl Mos6502 {
    /// Start a hardware interrupt in place of the opcode fetch.
    ///
    /// The fetch still reads PC but the byte is thrown away and PC is not
    /// advanced, so the interrupted instruction runs after RTI.
    pub(crate) fn begin_interrupt<B: Bus>(&mut self, bus: &mut B, mode: AddrMode) {
        let _ = bus.read(self.regs.pc);
        self.mode = mode;
        if mode == AddrMode::Nmi {
            self.nmi_pending = false;
            self.vector = NMI_VECTOR;
            debug!("NMI at ${:04X}", self.regs.pc);
        } else {
            self.vector = IRQ_VECTOR;
            debug!("IRQ at ${:04X}", self.regs.pc);
        }
        self.next = Next::Cycle(1);
    }

    /// T1 to T6 of the BRK/IRQ/NMI sequence.
    pub(crate) fn interrupt_cycle<B: Bus>(&mut self, bus: &mut B, t: u8) {
        match t {
            1 => {
                let _ = bus.read(self.regs.pc);
                if self.mode == AddrMode::Brk {
                    self.regs.pc = self.regs.pc.wrapping_add(1);
                    self.vector = IRQ_VECTOR;
                }
                self.advance(t);
            }
            2 => {
                let addr = self.regs.push();
                bus.write(addr, (self.regs.pc >> 8) as u8);
                self.advance(t);
            }
            3 => {
                let addr = self.regs.push();
                bus.write(addr, self.regs.pc as u8);
                self.advance(t);
            }
            4 => {
                let status = if self.mode == AddrMode::Brk {
                    self.regs.p.to_byte_brk()
                } else {
                    self.regs.p.to_byte_irq()
                };
                let addr = self.regs.push();
                bus.write(addr, status);
                if self.mode != AddrMode::Nmi && self.nmi_pending {
                    self.nmi_pending = false;
                    self.vector = NMI_VECTOR;
                    debug!("NMI hijacked {:?} sequence", self.mode);
                }
                self.advance(t);
            }
            5 => {
                self.ea = u16::from(bus.read(self.vector));
                self.regs.p.set(I);
                self.advance(t);
            }
            _ => {
                self.ea |= u16::from(bus.read(self.vector.wrapping_add(1))) << 8;
                self.regs.pc = self.ea;
                // The first handler instruction of an IRQ always runs.
                let poll = !(self.mode == AddrMode::Irq && self.vector == IRQ_VECTOR);
                self.next = Next::Fetch { poll };
            }
        }
    }

    /// T0 to T6 of the reset sequence.
    ///
    /// The three stack cycles are reads, so S ends three lower than it
    /// started and nothing is written.
    pub(crate) fn reset_cycle<B: Bus>(&mut self, bus: &mut B, t: u8) {
        match t {
            0 | 1 => {
                let _ = bus.read(self.regs.pc);
                self.advance(t);
            }
            2..=4 => {
                let _ = bus.read(self.regs.stack_addr());
                self.regs.s = self.regs.s.wrapping_sub(1);
                if t == 4 {
                    self.regs.p.clear(flags::B);
                }
                self.advance(t);
            }
            5 => {
                self.ea = u16::from(bus.read(RESET_VECTOR));
                self.advance(t);
            }
            _ => {
                self.ea |= u16::from(bus.read(RESET_VECTOR + 1)) << 8;
                self.regs.pc = self.ea;
                self.regs.p.set(I);
                self.next = Next::Fetch { poll: true };
                debug!("reset complete, PC=${:04X}", self.regs.pc);
            }
        }
    }
}
