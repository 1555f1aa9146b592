//! 6502 processor status register (P).
//!
//! The status register contains flags that reflect the result of operations
//! and control CPU behavior.

/// Carry flag - set if operation resulted in carry/borrow.
pub const C: u8 = 0x01;

/// Zero flag - set if result is zero.
pub const Z: u8 = 0x02;

/// Interrupt disable - when set, IRQ interrupts are ignored.
pub const I: u8 = 0x04;

/// Decimal mode - enables BCD arithmetic for ADC/SBC (and ARR).
pub const D: u8 = 0x08;

/// Break flag - only meaningful in the copy of P pushed to the stack.
pub const B: u8 = 0x10;

/// Constant bit - always reads as 1.
pub const U: u8 = 0x20;

/// Overflow flag - set if signed arithmetic overflowed, or by the SO pin.
pub const V: u8 = 0x40;

/// Negative (sign) flag - set if result has bit 7 set.
pub const N: u8 = 0x80;

/// Processor status register.
///
/// The constant bit is forced on by every constructor and every write path,
/// so a `Status` never reads back with bit 5 clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status(u8);

impl Default for Status {
    fn default() -> Self {
        Self::new()
    }
}

impl Status {
    /// Create a status register with only the constant bit set.
    #[must_use]
    pub const fn new() -> Self {
        Self(U)
    }

    /// Create status from raw value, ensuring the constant bit is set.
    #[must_use]
    pub const fn from_byte(value: u8) -> Self {
        Self(value | U)
    }

    /// Raw register value.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Value pushed by BRK and PHP (break and constant both set).
    #[must_use]
    pub const fn to_byte_brk(self) -> u8 {
        self.0 | U | B
    }

    /// Value pushed by IRQ and NMI (constant set, break clear).
    #[must_use]
    pub const fn to_byte_irq(self) -> u8 {
        (self.0 | U) & !B
    }

    /// Check if a flag is set.
    #[must_use]
    pub const fn is_set(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    /// Set a flag.
    pub fn set(&mut self, flag: u8) {
        self.0 |= flag;
    }

    /// Clear a flag. The constant bit cannot be cleared.
    pub fn clear(&mut self, flag: u8) {
        self.0 &= !(flag & !U);
    }

    /// Set or clear a flag based on condition.
    pub fn set_if(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }

    /// Carry as 0 or 1, for arithmetic.
    #[must_use]
    pub const fn carry(self) -> u8 {
        self.0 & C
    }

    /// Z from the low byte of an ALU result.
    pub fn establish_z(&mut self, result: u16) {
        self.set_if(Z, result & 0x00FF == 0);
    }

    /// N from bit 7 of an ALU result.
    pub fn establish_n(&mut self, result: u16) {
        self.set_if(N, result & 0x0080 != 0);
    }

    /// Update N and Z flags based on a value.
    pub fn establish_nz(&mut self, result: u16) {
        self.establish_z(result);
        self.establish_n(result);
    }

    /// C from anything carried out of the low byte.
    pub fn establish_c(&mut self, result: u16) {
        self.set_if(C, result & 0xFF00 != 0);
    }

    /// V for an addition of `operand` to `a` producing `result`.
    pub fn establish_v(&mut self, result: u16, a: u8, operand: u8) {
        self.set_if(
            V,
            (result ^ u16::from(a)) & (result ^ u16::from(operand)) & 0x0080 != 0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_bit_survives_everything() {
        let mut p = Status::from_byte(0x00);
        assert!(p.is_set(U));
        p.clear(0xFF);
        assert_eq!(p.bits(), U);
        p.set_if(U, false);
        assert!(p.is_set(U));
    }

    #[test]
    fn pushed_forms_differ_only_in_break() {
        let p = Status::from_byte(N | C);
        assert_eq!(p.to_byte_brk(), N | U | B | C);
        assert_eq!(p.to_byte_irq(), N | U | C);
    }

    #[test]
    fn establish_helpers_use_low_byte_and_carry_out() {
        let mut p = Status::new();
        p.establish_nz(0x0100);
        assert!(p.is_set(Z));
        assert!(!p.is_set(N));

        p.establish_c(0x0100);
        assert!(p.is_set(C));
        p.establish_c(0x00FF);
        assert!(!p.is_set(C));

        // $50 + $50 = $A0 overflows into the sign bit.
        p.establish_v(0x00A0, 0x50, 0x50);
        assert!(p.is_set(V));
        p.establish_v(0x0060, 0x50, 0x10);
        assert!(!p.is_set(V));
    }
}
