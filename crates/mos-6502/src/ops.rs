//! Opcode functions.
//!
//! An opcode function runs in the final cycle of its addressing mode, with
//! the operand in `value` and the effective address in `ea`. Writes go
//! through `write_value`, which targets A for accumulator forms.

use emu_core::Bus;
use log::warn;

use crate::addressing::AddrMode;
use crate::cpu::Next;
use crate::flags::{C, D, I, N, V, Z};
use crate::Mos6502;

/// Operation part of a decoded opcode, including the undocumented NMOS ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Adc,
    /// AND then copy N into C (ANC/AAC).
    Anc,
    And,
    /// AND then ROR, with its own flag rules (ARR).
    Arr,
    Asl,
    /// AND then LSR (ALR/ASR).
    Asr,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    /// DEC then CMP (DCP/DCM).
    Dcp,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    /// INC then SBC (ISB/ISC/INS).
    Isb,
    /// Locks the CPU (KIL/HLT).
    Jam,
    Jmp,
    Jsr,
    /// M AND S into A, X and S (LAS/LAR).
    Las,
    /// LDA and LDX together.
    Lax,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    /// Unstable immediate LDA/TAX (LXA/ATX/OAL).
    Lxa,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    /// ROL then AND (RLA).
    Rla,
    Rol,
    Ror,
    /// ROR then ADC (RRA).
    Rra,
    Rti,
    Rts,
    /// Store A AND X (SAX/AXS).
    Sax,
    Sbc,
    /// (A AND X) - M into X, no borrow in (SBX/AXS/SAX immediate).
    Sbx,
    Sec,
    Sed,
    Sei,
    /// Store A AND X AND (H+1) (SHA/AHX/AXA).
    Sha,
    /// S = A AND X, store S AND (H+1) (SHS/TAS/XAS).
    Shs,
    /// Store X AND (H+1) (SHX/SXA/XAS).
    Shx,
    /// Store Y AND (H+1) (SHY/SYA/SAY).
    Shy,
    /// ASL then ORA (SLO/ASO).
    Slo,
    /// LSR then EOR (SRE/LSE).
    Sre,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    /// Unstable TXA then AND (XAA/ANE).
    Xaa,
}

impl Mos6502 {
    /// Finish the instruction: run the opcode function, then fetch.
    ///
    /// The continuation is reset before the opcode runs so that JAM can
    /// replace it.
    pub(crate) fn complete<B: Bus>(&mut self, bus: &mut B) {
        self.next = Next::Fetch { poll: true };
        self.execute(bus);
    }

    /// Run the opcode function for the current instruction.
    pub(crate) fn execute<B: Bus>(&mut self, bus: &mut B) {
        let v = self.value;
        match self.op {
            // Loads and stores
            Op::Lda => self.load_a(v),
            Op::Ldx => {
                self.regs.x = v;
                self.regs.p.establish_nz(u16::from(v));
            }
            Op::Ldy => {
                self.regs.y = v;
                self.regs.p.establish_nz(u16::from(v));
            }
            Op::Lax => {
                self.regs.x = v;
                self.load_a(v);
            }
            Op::Sta => self.write_value(bus, self.regs.a),
            Op::Stx => self.write_value(bus, self.regs.x),
            Op::Sty => self.write_value(bus, self.regs.y),
            Op::Sax => self.write_value(bus, self.regs.a & self.regs.x),

            // Transfers
            Op::Tax => {
                self.regs.x = self.regs.a;
                self.regs.p.establish_nz(u16::from(self.regs.x));
            }
            Op::Tay => {
                self.regs.y = self.regs.a;
                self.regs.p.establish_nz(u16::from(self.regs.y));
            }
            Op::Tsx => {
                self.regs.x = self.regs.s;
                self.regs.p.establish_nz(u16::from(self.regs.x));
            }
            Op::Txa => self.load_a(self.regs.x),
            Op::Tya => self.load_a(self.regs.y),
            Op::Txs => self.regs.s = self.regs.x,

            // Logic and arithmetic
            Op::And => self.load_a(self.regs.a & v),
            Op::Ora => self.load_a(self.regs.a | v),
            Op::Eor => self.load_a(self.regs.a ^ v),
            Op::Adc => self.adc(v),
            Op::Sbc => self.sbc(v),
            Op::Cmp => self.compare(self.regs.a, v),
            Op::Cpx => self.compare(self.regs.x, v),
            Op::Cpy => self.compare(self.regs.y, v),
            Op::Bit => {
                self.regs.p.set_if(Z, self.regs.a & v == 0);
                self.regs.p.set_if(N, v & 0x80 != 0);
                self.regs.p.set_if(V, v & 0x40 != 0);
            }

            // Shifts and memory increments
            Op::Asl => {
                let r = self.asl(v);
                self.write_value(bus, r);
            }
            Op::Lsr => {
                let r = self.lsr(v);
                self.write_value(bus, r);
            }
            Op::Rol => {
                let r = self.rol(v);
                self.write_value(bus, r);
            }
            Op::Ror => {
                let r = self.ror(v);
                self.write_value(bus, r);
            }
            Op::Inc => {
                let r = v.wrapping_add(1);
                self.regs.p.establish_nz(u16::from(r));
                self.write_value(bus, r);
            }
            Op::Dec => {
                let r = v.wrapping_sub(1);
                self.regs.p.establish_nz(u16::from(r));
                self.write_value(bus, r);
            }
            Op::Inx => {
                self.regs.x = self.regs.x.wrapping_add(1);
                self.regs.p.establish_nz(u16::from(self.regs.x));
            }
            Op::Iny => {
                self.regs.y = self.regs.y.wrapping_add(1);
                self.regs.p.establish_nz(u16::from(self.regs.y));
            }
            Op::Dex => {
                self.regs.x = self.regs.x.wrapping_sub(1);
                self.regs.p.establish_nz(u16::from(self.regs.x));
            }
            Op::Dey => {
                self.regs.y = self.regs.y.wrapping_sub(1);
                self.regs.p.establish_nz(u16::from(self.regs.y));
            }

            // Flags
            Op::Clc => self.regs.p.clear(C),
            Op::Sec => self.regs.p.set(C),
            Op::Cld => self.regs.p.clear(D),
            Op::Sed => self.regs.p.set(D),
            Op::Clv => self.regs.p.clear(V),
            Op::Sei => self.regs.p.set(I),
            Op::Cli => {
                // I clears now, but the next fetch still polls as if it were set.
                self.regs.p.clear(I);
                self.cli_masking = true;
            }

            // Branches
            Op::Bcc => self.branch(!self.regs.p.is_set(C)),
            Op::Bcs => self.branch(self.regs.p.is_set(C)),
            Op::Bne => self.branch(!self.regs.p.is_set(Z)),
            Op::Beq => self.branch(self.regs.p.is_set(Z)),
            Op::Bpl => self.branch(!self.regs.p.is_set(N)),
            Op::Bmi => self.branch(self.regs.p.is_set(N)),
            Op::Bvc => self.branch(!self.regs.p.is_set(V)),
            Op::Bvs => self.branch(self.regs.p.is_set(V)),

            // Stack
            Op::Pha => {
                let addr = self.regs.push();
                bus.write(addr, self.regs.a);
            }
            Op::Php => {
                let addr = self.regs.push();
                bus.write(addr, self.regs.p.to_byte_brk());
            }
            Op::Pla => {
                let addr = self.regs.pull();
                let value = bus.read(addr);
                self.load_a(value);
            }
            Op::Plp => {
                let addr = self.regs.pull();
                self.regs.p = crate::Status::from_byte(bus.read(addr));
            }

            // Control flow; the addressing mode has done the bus work.
            Op::Jmp | Op::Jsr | Op::Rti | Op::Rts => self.regs.pc = self.ea,
            Op::Brk | Op::Nop => {}
            Op::Jam => {
                // Park PC on the JAM opcode; every later cycle re-reads it.
                self.regs.pc = self.regs.pc.wrapping_sub(1);
                self.next = Next::Jammed;
                warn!(
                    "CPU jammed by opcode ${:02X} at ${:04X}",
                    self.opcode, self.regs.pc
                );
            }

            // Undocumented combinations
            Op::Slo => {
                let r = self.asl(v);
                self.write_value(bus, r);
                self.load_a(self.regs.a | r);
            }
            Op::Rla => {
                let r = self.rol(v);
                self.write_value(bus, r);
                self.load_a(self.regs.a & r);
            }
            Op::Sre => {
                let r = self.lsr(v);
                self.write_value(bus, r);
                self.load_a(self.regs.a ^ r);
            }
            Op::Rra => {
                let r = self.ror(v);
                self.write_value(bus, r);
                self.adc(r);
            }
            Op::Dcp => {
                let r = v.wrapping_sub(1);
                self.write_value(bus, r);
                self.compare(self.regs.a, r);
            }
            Op::Isb => {
                let r = v.wrapping_add(1);
                self.write_value(bus, r);
                self.sbc(r);
            }
            Op::Anc => {
                self.load_a(self.regs.a & v);
                self.regs.p.set_if(C, self.regs.a & 0x80 != 0);
            }
            Op::Asr => {
                self.regs.a &= v;
                self.regs.a = self.lsr(self.regs.a);
            }
            Op::Arr => self.arr(v),
            Op::Sbx => {
                let ax = self.regs.a & self.regs.x;
                self.regs.p.set_if(C, ax >= v);
                self.regs.x = ax.wrapping_sub(v);
                self.regs.p.establish_nz(u16::from(self.regs.x));
            }
            Op::Las => {
                let r = v & self.regs.s;
                self.regs.x = r;
                self.regs.s = r;
                self.load_a(r);
            }
            Op::Lxa => {
                let r = (self.regs.a | self.config.lxa_magic) & v;
                self.regs.x = r;
                self.load_a(r);
            }
            Op::Xaa => self.load_a((self.regs.a | self.config.xaa_magic) & self.regs.x & v),
            Op::Sha => self.store_high_and(bus, self.regs.a & self.regs.x),
            Op::Shx => self.store_high_and(bus, self.regs.x),
            Op::Shy => self.store_high_and(bus, self.regs.y),
            Op::Shs => {
                self.regs.s = self.regs.a & self.regs.x;
                self.store_high_and(bus, self.regs.s);
            }
        }
    }

    /// Store a result to the operand: A for accumulator forms, else memory.
    fn write_value<B: Bus>(&mut self, bus: &mut B, value: u8) {
        if self.mode == AddrMode::Implied {
            self.regs.a = value;
        } else {
            bus.write(self.ea, value);
        }
    }

    fn load_a(&mut self, value: u8) {
        self.regs.a = value;
        self.regs.p.establish_nz(u16::from(value));
    }

    fn branch(&mut self, taken: bool) {
        self.next = if taken {
            Next::Cycle(2)
        } else {
            Next::Fetch { poll: true }
        };
    }

    fn compare(&mut self, reg: u8, value: u8) {
        self.regs.p.set_if(C, reg >= value);
        self.regs.p.establish_nz(u16::from(reg.wrapping_sub(value)));
    }

    fn asl(&mut self, value: u8) -> u8 {
        let r = u16::from(value) << 1;
        self.regs.p.establish_c(r);
        self.regs.p.establish_nz(r);
        r as u8
    }

    fn lsr(&mut self, value: u8) -> u8 {
        self.regs.p.set_if(C, value & 0x01 != 0);
        let r = value >> 1;
        self.regs.p.establish_nz(u16::from(r));
        r
    }

    fn rol(&mut self, value: u8) -> u8 {
        let r = (u16::from(value) << 1) | u16::from(self.regs.p.carry());
        self.regs.p.establish_c(r);
        self.regs.p.establish_nz(r);
        r as u8
    }

    fn ror(&mut self, value: u8) -> u8 {
        let r = (value >> 1) | (self.regs.p.carry() << 7);
        self.regs.p.set_if(C, value & 0x01 != 0);
        self.regs.p.establish_nz(u16::from(r));
        r
    }

    fn adc(&mut self, value: u8) {
        if self.regs.p.is_set(D) {
            self.adc_decimal(value);
        } else {
            self.adc_binary(value);
        }
    }

    fn adc_binary(&mut self, value: u8) {
        let a = self.regs.a;
        let sum = u16::from(a) + u16::from(value) + u16::from(self.regs.p.carry());
        self.regs.p.establish_c(sum);
        self.regs.p.establish_v(sum, a, value);
        self.load_a(sum as u8);
    }

    /// NMOS decimal add. Z comes from the binary sum; N and V come from the
    /// intermediate result before the high nibble is adjusted.
    fn adc_decimal(&mut self, value: u8) {
        let a = self.regs.a;
        let carry = u16::from(self.regs.p.carry());

        let mut lo = u16::from(a & 0x0F) + u16::from(value & 0x0F) + carry;
        if lo >= 0x0A {
            lo = ((lo + 0x06) & 0x0F) + 0x10;
        }
        let mut r = u16::from(a & 0xF0) + u16::from(value & 0xF0) + lo;

        self.regs.p.establish_z(u16::from(a) + u16::from(value) + carry);
        self.regs.p.establish_n(r);
        self.regs.p.establish_v(r, a, value);

        if r >= 0xA0 {
            r += 0x60;
        }
        self.regs.p.establish_c(r);
        self.regs.a = r as u8;
    }

    fn sbc(&mut self, value: u8) {
        if self.regs.p.is_set(D) {
            self.sbc_decimal(value);
        } else {
            self.adc_binary(!value);
        }
    }

    /// NMOS decimal subtract. All flags match the binary subtraction.
    fn sbc_decimal(&mut self, value: u8) {
        let a = self.regs.a;
        let borrow = 1 - i16::from(self.regs.p.carry());

        self.adc_binary(!value);

        let mut lo = i16::from(a & 0x0F) - i16::from(value & 0x0F) - borrow;
        if lo < 0 {
            lo = ((lo - 0x06) & 0x0F) - 0x10;
        }
        let mut r = i16::from(a & 0xF0) - i16::from(value & 0xF0) + lo;
        if r < 0 {
            r -= 0x60;
        }
        self.regs.a = r as u8;
    }

    /// AND then ROR through carry. C and V come from bits 6 and 5 of the
    /// result in binary mode; decimal mode adds a nibble fix-up of its own.
    fn arr(&mut self, value: u8) {
        let t = self.regs.a & value;
        let carry_in = self.regs.p.carry();
        let mut r = (t >> 1) | (carry_in << 7);

        if self.regs.p.is_set(D) {
            self.regs.p.set_if(N, carry_in != 0);
            self.regs.p.set_if(Z, r == 0);
            self.regs.p.set_if(V, (r ^ t) & 0x40 != 0);
            if (t & 0x0F) + (t & 0x01) > 0x05 {
                r = (r & 0xF0) | (r.wrapping_add(0x06) & 0x0F);
            }
            let hi = t >> 4;
            if hi + (hi & 0x01) > 0x05 {
                self.regs.p.set(C);
                r = r.wrapping_add(0x60);
            } else {
                self.regs.p.clear(C);
            }
        } else {
            self.regs.p.establish_nz(u16::from(r));
            self.regs.p.set_if(C, r & 0x40 != 0);
            self.regs.p.set_if(V, ((r >> 6) ^ (r >> 5)) & 0x01 != 0);
        }
        self.regs.a = r;
    }

    /// The SH* stores: AND with the base high byte plus one. When indexing
    /// crossed a page the stored value also becomes the high address byte.
    fn store_high_and<B: Bus>(&mut self, bus: &mut B, reg: u8) {
        let hi = (self.base >> 8) as u8;
        let value = reg & hi.wrapping_add(1);
        if (self.base ^ self.ea) & 0xFF00 != 0 {
            self.ea = (u16::from(value) << 8) | (self.ea & 0x00FF);
        }
        bus.write(self.ea, value);
    }
}
