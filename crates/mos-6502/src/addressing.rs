//! Addressing-mode cycle sequences.
//!
//! Each mode is a little state machine advanced one T-state per tick. T0 is
//! the opcode fetch, so a mode's first cycle is T1. The mode owns every bus
//! access up to the point where the operand is available; the opcode
//! function then runs in the same cycle as the final access.
//!
//! Read, write and read-modify-write forms of the memory modes share their
//! address cycles and differ only in the operand phase that follows.

use emu_core::Bus;

use crate::cpu::Next;
use crate::Mos6502;

/// How an instruction touches its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// One read of the effective address.
    Read,
    /// One write to the effective address.
    Write,
    /// Read, write back the unmodified value, write the result.
    Rmw,
}

/// Addressing mode, including the pseudo-modes for the stack instructions,
/// the interrupt sequences and reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    /// Accumulator or no operand: one dummy read of PC.
    Implied,
    /// JAM/KIL.
    Jam,
    Immediate,
    Relative,
    ZeroPage(Access),
    ZeroPageX(Access),
    ZeroPageY(Access),
    Absolute(Access),
    AbsoluteX(Access),
    AbsoluteY(Access),
    /// (zp,X)
    IndirectX(Access),
    /// (zp),Y
    IndirectY(Access),
    /// PHA, PHP.
    Push,
    /// PLA, PLP.
    Pull,
    Jsr,
    Rti,
    Rts,
    JumpAbsolute,
    /// JMP ($nnnn), with the page-wrap bug.
    JumpIndirect,
    Brk,
    /// Hardware IRQ sequence. Never produced by the decoder.
    Irq,
    /// Hardware NMI sequence. Never produced by the decoder.
    Nmi,
    /// Reset sequence, T0 to T6. Never produced by the decoder.
    Reset,
}

impl AddrMode {
    /// T-state of the first operand cycle for the memory modes.
    const fn operand_start(self) -> Option<u8> {
        match self {
            Self::ZeroPage(_) => Some(2),
            Self::ZeroPageX(_) | Self::ZeroPageY(_) | Self::Absolute(_) => Some(3),
            Self::AbsoluteX(_) | Self::AbsoluteY(_) => Some(4),
            Self::IndirectX(_) | Self::IndirectY(_) => Some(5),
            _ => None,
        }
    }

    const fn access(self) -> Option<Access> {
        match self {
            Self::ZeroPage(a)
            | Self::ZeroPageX(a)
            | Self::ZeroPageY(a)
            | Self::Absolute(a)
            | Self::AbsoluteX(a)
            | Self::AbsoluteY(a)
            | Self::IndirectX(a)
            | Self::IndirectY(a) => Some(a),
            _ => None,
        }
    }

    /// Whether T-state `t` of this mode is a bus write.
    ///
    /// RDY only stops the CPU on read cycles, so the stepper asks this before
    /// honouring a hold.
    #[must_use]
    pub const fn writes_on(self, t: u8) -> bool {
        match self {
            Self::Push => t == 2,
            Self::Jsr => t == 3 || t == 4,
            Self::Brk | Self::Irq | Self::Nmi => t >= 2 && t <= 4,
            _ => match (self.access(), self.operand_start()) {
                (Some(Access::Write), Some(start)) => t == start,
                (Some(Access::Rmw), Some(start)) => t == start + 1 || t == start + 2,
                _ => false,
            },
        }
    }
}

impl Mos6502 {
    /// Run T-state `t` of the current addressing mode.
    pub(crate) fn step_mode<B: Bus>(&mut self, bus: &mut B, t: u8) {
        match self.mode {
            AddrMode::Implied => {
                let _ = bus.read(self.regs.pc);
                self.value = self.regs.a;
                self.complete(bus);
            }
            AddrMode::Jam => {
                let _ = bus.read(self.regs.pc);
                self.complete(bus);
            }
            AddrMode::Immediate => {
                self.value = self.fetch_operand(bus);
                self.complete(bus);
            }
            AddrMode::Relative => self.relative(bus, t),
            AddrMode::ZeroPage(access) => {
                if t == 1 {
                    self.ea = u16::from(self.fetch_operand(bus));
                    self.advance(t);
                } else {
                    self.operand(bus, access, t, t - 2);
                }
            }
            AddrMode::ZeroPageX(access) => self.zero_page_indexed(bus, access, t, self.regs.x),
            AddrMode::ZeroPageY(access) => self.zero_page_indexed(bus, access, t, self.regs.y),
            AddrMode::Absolute(access) => match t {
                1 => {
                    self.ea = u16::from(self.fetch_operand(bus));
                    self.advance(t);
                }
                2 => {
                    self.ea |= u16::from(self.fetch_operand(bus)) << 8;
                    self.advance(t);
                }
                _ => self.operand(bus, access, t, t - 3),
            },
            AddrMode::AbsoluteX(access) => self.absolute_indexed(bus, access, t, self.regs.x),
            AddrMode::AbsoluteY(access) => self.absolute_indexed(bus, access, t, self.regs.y),
            AddrMode::IndirectX(access) => self.indirect_x(bus, access, t),
            AddrMode::IndirectY(access) => self.indirect_y(bus, access, t),
            AddrMode::Push => {
                if t == 1 {
                    let _ = bus.read(self.regs.pc);
                    self.advance(t);
                } else {
                    self.complete(bus);
                }
            }
            AddrMode::Pull => match t {
                1 => {
                    let _ = bus.read(self.regs.pc);
                    self.advance(t);
                }
                2 => {
                    let _ = bus.read(self.regs.stack_addr());
                    self.advance(t);
                }
                _ => self.complete(bus),
            },
            AddrMode::Jsr => self.jsr(bus, t),
            AddrMode::Rti => self.rti(bus, t),
            AddrMode::Rts => self.rts(bus, t),
            AddrMode::JumpAbsolute => {
                if t == 1 {
                    self.ea = u16::from(self.fetch_operand(bus));
                    self.advance(t);
                } else {
                    self.ea |= u16::from(bus.read(self.regs.pc)) << 8;
                    self.complete(bus);
                }
            }
            AddrMode::JumpIndirect => self.jump_indirect(bus, t),
            AddrMode::Brk | AddrMode::Irq | AddrMode::Nmi => self.interrupt_cycle(bus, t),
            AddrMode::Reset => self.reset_cycle(bus, t),
        }
    }

    pub(crate) fn advance(&mut self, t: u8) {
        self.next = Next::Cycle(t + 1);
    }

    /// Read the byte at PC and step past it.
    pub(crate) fn fetch_operand<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    /// Cycles that follow address resolution. `phase` 0 is the first of them.
    fn operand<B: Bus>(&mut self, bus: &mut B, access: Access, t: u8, phase: u8) {
        match (access, phase) {
            (Access::Read, _) => {
                self.value = bus.read(self.ea);
                self.complete(bus);
            }
            (Access::Write, _) => self.complete(bus),
            (Access::Rmw, 0) => {
                self.value = bus.read(self.ea);
                self.advance(t);
            }
            (Access::Rmw, 1) => {
                // The unmodified value goes back out before the result.
                bus.write(self.ea, self.value);
                self.advance(t);
            }
            (Access::Rmw, _) => self.complete(bus),
        }
    }

    fn zero_page_indexed<B: Bus>(&mut self, bus: &mut B, access: Access, t: u8, index: u8) {
        match t {
            1 => {
                self.ea = u16::from(self.fetch_operand(bus));
                self.advance(t);
            }
            2 => {
                // Unindexed pointer is read while the index is added.
                let _ = bus.read(self.ea);
                self.ea = u16::from((self.ea as u8).wrapping_add(index));
                self.advance(t);
            }
            _ => self.operand(bus, access, t, t - 3),
        }
    }

    fn absolute_indexed<B: Bus>(&mut self, bus: &mut B, access: Access, t: u8, index: u8) {
        match t {
            1 => {
                self.base = u16::from(self.fetch_operand(bus));
                self.advance(t);
            }
            2 => {
                self.base |= u16::from(self.fetch_operand(bus)) << 8;
                self.ea = self.base.wrapping_add(u16::from(index));
                self.advance(t);
            }
            3 => self.index_fixup(bus, access, t),
            _ => self.operand(bus, access, t, t - 4),
        }
    }

    /// The cycle where the high byte of an indexed address is fixed.
    ///
    /// Reads with no page crossing use it for the operand. Everything else
    /// spends it on a read of the address with the high byte not yet carried.
    fn index_fixup<B: Bus>(&mut self, bus: &mut B, access: Access, t: u8) {
        let crossed = (self.base ^ self.ea) & 0xFF00 != 0;
        if access == Access::Read && !crossed {
            self.operand(bus, access, t, 0);
        } else {
            let _ = bus.read((self.base & 0xFF00) | (self.ea & 0x00FF));
            self.advance(t);
        }
    }

    fn indirect_x<B: Bus>(&mut self, bus: &mut B, access: Access, t: u8) {
        match t {
            1 => {
                self.pointer = self.fetch_operand(bus);
                self.advance(t);
            }
            2 => {
                let _ = bus.read(u16::from(self.pointer));
                self.pointer = self.pointer.wrapping_add(self.regs.x);
                self.advance(t);
            }
            3 => {
                self.ea = u16::from(bus.read(u16::from(self.pointer)));
                self.advance(t);
            }
            4 => {
                let hi = bus.read(u16::from(self.pointer.wrapping_add(1)));
                self.ea |= u16::from(hi) << 8;
                self.advance(t);
            }
            _ => self.operand(bus, access, t, t - 5),
        }
    }

    fn indirect_y<B: Bus>(&mut self, bus: &mut B, access: Access, t: u8) {
        match t {
            1 => {
                self.pointer = self.fetch_operand(bus);
                self.advance(t);
            }
            2 => {
                self.base = u16::from(bus.read(u16::from(self.pointer)));
                self.advance(t);
            }
            3 => {
                let hi = bus.read(u16::from(self.pointer.wrapping_add(1)));
                self.base |= u16::from(hi) << 8;
                self.ea = self.base.wrapping_add(u16::from(self.regs.y));
                self.advance(t);
            }
            4 => self.index_fixup(bus, access, t),
            _ => self.operand(bus, access, t, t - 5),
        }
    }

    fn relative<B: Bus>(&mut self, bus: &mut B, t: u8) {
        match t {
            1 => {
                self.value = self.fetch_operand(bus);
                // The branch opcode decides whether there is a T2.
                self.execute(bus);
            }
            2 => {
                let _ = bus.read(self.regs.pc);
                let target = self
                    .regs
                    .pc
                    .wrapping_add_signed(i16::from(self.value as i8));
                if (target ^ self.regs.pc) & 0xFF00 == 0 {
                    self.regs.pc = target;
                    self.branch_taken_masking = true;
                    self.next = Next::Fetch { poll: true };
                } else {
                    self.ea = target;
                    self.regs.pc = (self.regs.pc & 0xFF00) | (target & 0x00FF);
                    self.advance(t);
                }
            }
            _ => {
                let _ = bus.read(self.regs.pc);
                self.regs.pc = self.ea;
                self.next = Next::Fetch { poll: true };
            }
        }
    }

    fn jsr<B: Bus>(&mut self, bus: &mut B, t: u8) {
        match t {
            1 => {
                self.ea = u16::from(self.fetch_operand(bus));
                self.advance(t);
            }
            2 => {
                let _ = bus.read(self.regs.stack_addr());
                self.advance(t);
            }
            3 => {
                let addr = self.regs.push();
                bus.write(addr, (self.regs.pc >> 8) as u8);
                self.advance(t);
            }
            4 => {
                let addr = self.regs.push();
                bus.write(addr, self.regs.pc as u8);
                self.advance(t);
            }
            _ => {
                self.ea |= u16::from(bus.read(self.regs.pc)) << 8;
                self.complete(bus);
            }
        }
    }

    fn rti<B: Bus>(&mut self, bus: &mut B, t: u8) {
        match t {
            1 => {
                let _ = bus.read(self.regs.pc);
                self.advance(t);
            }
            2 => {
                let _ = bus.read(self.regs.stack_addr());
                self.advance(t);
            }
            3 => {
                let addr = self.regs.pull();
                self.regs.p = crate::Status::from_byte(bus.read(addr));
                self.advance(t);
            }
            4 => {
                let addr = self.regs.pull();
                self.ea = u16::from(bus.read(addr));
                self.advance(t);
            }
            _ => {
                let addr = self.regs.pull();
                self.ea |= u16::from(bus.read(addr)) << 8;
                self.complete(bus);
            }
        }
    }

    fn rts<B: Bus>(&mut self, bus: &mut B, t: u8) {
        match t {
            1 => {
                let _ = bus.read(self.regs.pc);
                self.advance(t);
            }
            2 => {
                let _ = bus.read(self.regs.stack_addr());
                self.advance(t);
            }
            3 => {
                let addr = self.regs.pull();
                self.ea = u16::from(bus.read(addr));
                self.advance(t);
            }
            4 => {
                let addr = self.regs.pull();
                self.ea |= u16::from(bus.read(addr)) << 8;
                self.advance(t);
            }
            _ => {
                // Reads the last byte of the JSR, then steps past it.
                let _ = bus.read(self.ea);
                self.ea = self.ea.wrapping_add(1);
                self.complete(bus);
            }
        }
    }

    fn jump_indirect<B: Bus>(&mut self, bus: &mut B, t: u8) {
        match t {
            1 => {
                self.base = u16::from(self.fetch_operand(bus));
                self.advance(t);
            }
            2 => {
                self.base |= u16::from(self.fetch_operand(bus)) << 8;
                self.advance(t);
            }
            3 => {
                self.ea = u16::from(bus.read(self.base));
                self.advance(t);
            }
            _ => {
                // The high byte comes from the same page: ($10FF) reads $1000.
                let hi_addr = (self.base & 0xFF00) | (self.base.wrapping_add(1) & 0x00FF);
                self.ea |= u16::from(bus.read(hi_addr)) << 8;
                self.complete(bus);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_cycles_follow_the_operand_phase() {
        assert!(AddrMode::ZeroPage(Access::Write).writes_on(2));
        assert!(!AddrMode::ZeroPage(Access::Read).writes_on(2));
        assert!(!AddrMode::AbsoluteX(Access::Rmw).writes_on(4));
        assert!(AddrMode::AbsoluteX(Access::Rmw).writes_on(5));
        assert!(AddrMode::AbsoluteX(Access::Rmw).writes_on(6));
        assert!(AddrMode::IndirectY(Access::Write).writes_on(5));
        assert!(!AddrMode::IndirectY(Access::Write).writes_on(4));
    }

    #[test]
    fn stack_and_interrupt_writes() {
        assert!(AddrMode::Push.writes_on(2));
        assert!(!AddrMode::Pull.writes_on(2));
        assert!(AddrMode::Jsr.writes_on(3));
        assert!(!AddrMode::Jsr.writes_on(5));
        for t in 2..=4 {
            assert!(AddrMode::Brk.writes_on(t));
            assert!(AddrMode::Nmi.writes_on(t));
        }
        assert!(!AddrMode::Irq.writes_on(5));
        assert!(!AddrMode::Reset.writes_on(3));
    }
}
