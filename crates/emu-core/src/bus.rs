//! Memory and I/O bus interface.

use std::ops::RangeInclusive;

/// Memory and I/O bus interface.
///
/// Components access memory and peripherals through this trait. The bus
/// handles address decoding and routing to the appropriate device.
///
/// Every call is one bus cycle as seen by the other devices sharing the bus,
/// so implementations must complete synchronously and must not call back
/// into the component that is driving them.
pub trait Bus {
    /// Read a byte from the given address.
    ///
    /// When nothing is mapped at `address` the bus must return the last byte
    /// driven onto the data bus (floating bus), not a fixed value.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);
}

const PAGE_COUNT: usize = 256;

/// Flat 64KB RAM bus with optional holes.
///
/// Pages can be unmapped to model address ranges where no device answers.
/// Reads from an unmapped page return the last value seen on the data bus,
/// and writes to it only drive the data bus.
pub struct SimpleBus {
    ram: Box<[u8; 0x10000]>,
    /// One flag per 256-byte page.
    mapped: [bool; PAGE_COUNT],
    /// Last byte driven on the data bus.
    last_data: u8,
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleBus {
    /// Create a bus with all 64KB mapped and zeroed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; 0x10000]),
            mapped: [true; PAGE_COUNT],
            last_data: 0,
        }
    }

    /// Copy `data` into RAM starting at `address`, wrapping at $FFFF.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.ram[addr as usize] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Read RAM directly without touching the data bus.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.ram[address as usize]
    }

    /// Write RAM directly without touching the data bus.
    pub fn poke(&mut self, address: u16, value: u8) {
        self.ram[address as usize] = value;
    }

    /// Remove the pages covering `range` from the address map.
    pub fn unmap(&mut self, range: RangeInclusive<u16>) {
        self.set_mapped(range, false);
    }

    /// Restore the pages covering `range` to the address map.
    pub fn map(&mut self, range: RangeInclusive<u16>) {
        self.set_mapped(range, true);
    }

    /// Whether a device answers at `address`.
    #[must_use]
    pub fn is_mapped(&self, address: u16) -> bool {
        self.mapped[(address >> 8) as usize]
    }

    /// The last byte driven on the data bus.
    #[must_use]
    pub fn last_data(&self) -> u8 {
        self.last_data
    }

    fn set_mapped(&mut self, range: RangeInclusive<u16>, mapped: bool) {
        let first = (*range.start() >> 8) as usize;
        let last = (*range.end() >> 8) as usize;
        for page in first..=last {
            self.mapped[page] = mapped;
        }
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        if self.is_mapped(address) {
            self.last_data = self.ram[address as usize];
        }
        self.last_data
    }

    fn write(&mut self, address: u16, value: u8) {
        self.last_data = value;
        if self.is_mapped(address) {
            self.ram[address as usize] = value;
        }
    }
}
