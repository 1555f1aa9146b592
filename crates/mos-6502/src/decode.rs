//! Opcode decode tables.
//!
//! Every one of the 256 opcodes maps to an addressing mode and an operation.
//! Undocumented opcodes are decoded like any other; the twelve JAM opcodes
//! lock the core.

use crate::addressing::{Access, AddrMode};
use crate::ops::Op;

use AddrMode as M;
use Op as O;

const R: Access = Access::Read;
const W: Access = Access::Write;
const RMW: Access = Access::Rmw;

#[rustfmt::skip]
static MODES: [AddrMode; 256] = [
    // $00-$0F
    M::Brk, M::IndirectX(R), M::Jam, M::IndirectX(RMW),
    M::ZeroPage(R), M::ZeroPage(R), M::ZeroPage(RMW), M::ZeroPage(RMW),
    M::Push, M::Immediate, M::Implied, M::Immediate,
    M::Absolute(R), M::Absolute(R), M::Absolute(RMW), M::Absolute(RMW),
    // $10-$1F
    M::Relative, M::IndirectY(R), M::Jam, M::IndirectY(RMW),
    M::ZeroPageX(R), M::ZeroPageX(R), M::ZeroPageX(RMW), M::ZeroPageX(RMW),
    M::Implied, M::AbsoluteY(R), M::Implied, M::AbsoluteY(RMW),
    M::AbsoluteX(R), M::AbsoluteX(R), M::AbsoluteX(RMW), M::AbsoluteX(RMW),
    // $20-$2F
    M::Jsr, M::IndirectX(R), M::Jam, M::IndirectX(RMW),
    M::ZeroPage(R), M::ZeroPage(R), M::ZeroPage(RMW), M::ZeroPage(RMW),
    M::Pull, M::Immediate, M::Implied, M::Immediate,
    M::Absolute(R), M::Absolute(R), M::Absolute(RMW), M::Absolute(RMW),
    // $30-$3F
    M::Relative, M::IndirectY(R), M::Jam, M::IndirectY(RMW),
    M::ZeroPageX(R), M::ZeroPageX(R), M::ZeroPageX(RMW), M::ZeroPageX(RMW),
    M::Implied, M::AbsoluteY(R), M::Implied, M::AbsoluteY(RMW),
    M::AbsoluteX(R), M::AbsoluteX(R), M::AbsoluteX(RMW), M::AbsoluteX(RMW),
    // $40-$4F
    M::Rti, M::IndirectX(R), M::Jam, M::IndirectX(RMW),
    M::ZeroPage(R), M::ZeroPage(R), M::ZeroPage(RMW), M::ZeroPage(RMW),
    M::Push, M::Immediate, M::Implied, M::Immediate,
    M::JumpAbsolute, M::Absolute(R), M::Absolute(RMW), M::Absolute(RMW),
    // $50-$5F
    M::Relative, M::IndirectY(R), M::Jam, M::IndirectY(RMW),
    M::ZeroPageX(R), M::ZeroPageX(R), M::ZeroPageX(RMW), M::ZeroPageX(RMW),
    M::Implied, M::AbsoluteY(R), M::Implied, M::AbsoluteY(RMW),
    M::AbsoluteX(R), M::AbsoluteX(R), M::AbsoluteX(RMW), M::AbsoluteX(RMW),
    // $60-$6F
    M::Rts, M::IndirectX(R), M::Jam, M::IndirectX(RMW),
    M::ZeroPage(R), M::ZeroPage(R), M::ZeroPage(RMW), M::ZeroPage(RMW),
    M::Pull, M::Immediate, M::Implied, M::Immediate,
    M::JumpIndirect, M::Absolute(R), M::Absolute(RMW), M::Absolute(RMW),
    // $70-$7F
    M::Relative, M::IndirectY(R), M::Jam, M::IndirectY(RMW),
    M::ZeroPageX(R), M::ZeroPageX(R), M::ZeroPageX(RMW), M::ZeroPageX(RMW),
    M::Implied, M::AbsoluteY(R), M::Implied, M::AbsoluteY(RMW),
    M::AbsoluteX(R), M::AbsoluteX(R), M::AbsoluteX(RMW), M::AbsoluteX(RMW),
    // $80-$8F
    M::Immediate, M::IndirectX(W), M::Immediate, M::IndirectX(W),
    M::ZeroPage(W), M::ZeroPage(W), M::ZeroPage(W), M::ZeroPage(W),
    M::Implied, M::Immediate, M::Implied, M::Immediate,
    M::Absolute(W), M::Absolute(W), M::Absolute(W), M::Absolute(W),
    // $90-$9F
    M::Relative, M::IndirectY(W), M::Jam, M::IndirectY(W),
    M::ZeroPageX(W), M::ZeroPageX(W), M::ZeroPageY(W), M::ZeroPageY(W),
    M::Implied, M::AbsoluteY(W), M::Implied, M::AbsoluteY(W),
    M::AbsoluteX(W), M::AbsoluteX(W), M::AbsoluteY(W), M::AbsoluteY(W),
    // $A0-$AF
    M::Immediate, M::IndirectX(R), M::Immediate, M::IndirectX(R),
    M::ZeroPage(R), M::ZeroPage(R), M::ZeroPage(R), M::ZeroPage(R),
    M::Implied, M::Immediate, M::Implied, M::Immediate,
    M::Absolute(R), M::Absolute(R), M::Absolute(R), M::Absolute(R),
    // $B0-$BF
    M::Relative, M::IndirectY(R), M::Jam, M::IndirectY(R),
    M::ZeroPageX(R), M::ZeroPageX(R), M::ZeroPageY(R), M::ZeroPageY(R),
    M::Implied, M::AbsoluteY(R), M::Implied, M::AbsoluteY(R),
    M::AbsoluteX(R), M::AbsoluteX(R), M::AbsoluteY(R), M::AbsoluteY(R),
    // $C0-$CF
    M::Immediate, M::IndirectX(R), M::Immediate, M::IndirectX(RMW),
    M::ZeroPage(R), M::ZeroPage(R), M::ZeroPage(RMW), M::ZeroPage(RMW),
    M::Implied, M::Immediate, M::Implied, M::Immediate,
    M::Absolute(R), M::Absolute(R), M::Absolute(RMW), M::Absolute(RMW),
    // $D0-$DF
    M::Relative, M::IndirectY(R), M::Jam, M::IndirectY(RMW),
    M::ZeroPageX(R), M::ZeroPageX(R), M::ZeroPageX(RMW), M::ZeroPageX(RMW),
    M::Implied, M::AbsoluteY(R), M::Implied, M::AbsoluteY(RMW),
    M::AbsoluteX(R), M::AbsoluteX(R), M::AbsoluteX(RMW), M::AbsoluteX(RMW),
    // $E0-$EF
    M::Immediate, M::IndirectX(R), M::Immediate, M::IndirectX(RMW),
    M::ZeroPage(R), M::ZeroPage(R), M::ZeroPage(RMW), M::ZeroPage(RMW),
    M::Implied, M::Immediate, M::Implied, M::Immediate,
    M::Absolute(R), M::Absolute(R), M::Absolute(RMW), M::Absolute(RMW),
    // $F0-$FF
    M::Relative, M::IndirectY(R), M::Jam, M::IndirectY(RMW),
    M::ZeroPageX(R), M::ZeroPageX(R), M::ZeroPageX(RMW), M::ZeroPageX(RMW),
    M::Implied, M::AbsoluteY(R), M::Implied, M::AbsoluteY(RMW),
    M::AbsoluteX(R), M::AbsoluteX(R), M::AbsoluteX(RMW), M::AbsoluteX(RMW),
];

#[rustfmt::skip]
static OPS: [Op; 256] = [
    // $00-$0F
    O::Brk, O::Ora, O::Jam, O::Slo, O::Nop, O::Ora, O::Asl, O::Slo,
    O::Php, O::Ora, O::Asl, O::Anc, O::Nop, O::Ora, O::Asl, O::Slo,
    // $10-$1F
    O::Bpl, O::Ora, O::Jam, O::Slo, O::Nop, O::Ora, O::Asl, O::Slo,
    O::Clc, O::Ora, O::Nop, O::Slo, O::Nop, O::Ora, O::Asl, O::Slo,
    // $20-$2F
    O::Jsr, O::And, O::Jam, O::Rla, O::Bit, O::And, O::Rol, O::Rla,
    O::Plp, O::And, O::Rol, O::Anc, O::Bit, O::And, O::Rol, O::Rla,
    // $30-$3F
    O::Bmi, O::And, O::Jam, O::Rla, O::Nop, O::And, O::Rol, O::Rla,
    O::Sec, O::And, O::Nop, O::Rla, O::Nop, O::And, O::Rol, O::Rla,
    // $40-$4F
    O::Rti, O::Eor, O::Jam, O::Sre, O::Nop, O::Eor, O::Lsr, O::Sre,
    O::Pha, O::Eor, O::Lsr, O::Asr, O::Jmp, O::Eor, O::Lsr, O::Sre,
    // $50-$5F
    O::Bvc, O::Eor, O::Jam, O::Sre, O::Nop, O::Eor, O::Lsr, O::Sre,
    O::Cli, O::Eor, O::Nop, O::Sre, O::Nop, O::Eor, O::Lsr, O::Sre,
    // $60-$6F
    O::Rts, O::Adc, O::Jam, O::Rra, O::Nop, O::Adc, O::Ror, O::Rra,
    O::Pla, O::Adc, O::Ror, O::Arr, O::Jmp, O::Adc, O::Ror, O::Rra,
    // $70-$7F
    O::Bvs, O::Adc, O::Jam, O::Rra, O::Nop, O::Adc, O::Ror, O::Rra,
    O::Sei, O::Adc, O::Nop, O::Rra, O::Nop, O::Adc, O::Ror, O::Rra,
    // $80-$8F
    O::Nop, O::Sta, O::Nop, O::Sax, O::Sty, O::Sta, O::Stx, O::Sax,
    O::Dey, O::Nop, O::Txa, O::Xaa, O::Sty, O::Sta, O::Stx, O::Sax,
    // $90-$9F
    O::Bcc, O::Sta, O::Jam, O::Sha, O::Sty, O::Sta, O::Stx, O::Sax,
    O::Tya, O::Sta, O::Txs, O::Shs, O::Shy, O::Sta, O::Shx, O::Sha,
    // $A0-$AF
    O::Ldy, O::Lda, O::Ldx, O::Lax, O::Ldy, O::Lda, O::Ldx, O::Lax,
    O::Tay, O::Lda, O::Tax, O::Lxa, O::Ldy, O::Lda, O::Ldx, O::Lax,
    // $B0-$BF
    O::Bcs, O::Lda, O::Jam, O::Lax, O::Ldy, O::Lda, O::Ldx, O::Lax,
    O::Clv, O::Lda, O::Tsx, O::Las, O::Ldy, O::Lda, O::Ldx, O::Lax,
    // $C0-$CF
    O::Cpy, O::Cmp, O::Nop, O::Dcp, O::Cpy, O::Cmp, O::Dec, O::Dcp,
    O::Iny, O::Cmp, O::Dex, O::Sbx, O::Cpy, O::Cmp, O::Dec, O::Dcp,
    // $D0-$DF
    O::Bne, O::Cmp, O::Jam, O::Dcp, O::Nop, O::Cmp, O::Dec, O::Dcp,
    O::Cld, O::Cmp, O::Nop, O::Dcp, O::Nop, O::Cmp, O::Dec, O::Dcp,
    // $E0-$EF
    O::Cpx, O::Sbc, O::Nop, O::Isb, O::Cpx, O::Sbc, O::Inc, O::Isb,
    O::Inx, O::Sbc, O::Nop, O::Sbc, O::Cpx, O::Sbc, O::Inc, O::Isb,
    // $F0-$FF
    O::Beq, O::Sbc, O::Jam, O::Isb, O::Nop, O::Sbc, O::Inc, O::Isb,
    O::Sed, O::Sbc, O::Nop, O::Isb, O::Nop, O::Sbc, O::Inc, O::Isb,
];

/// Look up the addressing mode and operation for an opcode.
#[must_use]
pub fn decode(opcode: u8) -> (AddrMode, Op) {
    (MODES[opcode as usize], OPS[opcode as usize])
}
