//! Construction-time options for the core.

/// Value of the unstable XAA/LXA constant measured on 1541 drive boards.
///
/// Other chip populations are known to show $00, $FF and $EF, so the value
/// is configurable rather than fixed.
pub const DEFAULT_MAGIC: u8 = 0xEE;

/// Configuration for constructing a [`Mos6502`](crate::Mos6502).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Honour the IRQ line. Some boards leave it unconnected.
    pub irq: bool,
    /// Honour the NMI line. The 1541, for one, never drives it.
    pub nmi: bool,
    /// Honour the RDY (hold) line.
    pub rdy: bool,
    /// Constant ORed into A by XAA/ANE ($8B).
    pub xaa_magic: u8,
    /// Constant ORed into A by LXA ($AB).
    pub lxa_magic: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            irq: true,
            nmi: true,
            rdy: false,
            xaa_magic: DEFAULT_MAGIC,
            lxa_magic: DEFAULT_MAGIC,
        }
    }
}

impl Config {
    #[must_use]
    pub const fn with_irq(mut self, enabled: bool) -> Self {
        self.irq = enabled;
        self
    }

    #[must_use]
    pub const fn with_nmi(mut self, enabled: bool) -> Self {
        self.nmi = enabled;
        self
    }

    #[must_use]
    pub const fn with_rdy(mut self, enabled: bool) -> Self {
        self.rdy = enabled;
        self
    }

    /// Use the same unstable constant for both XAA and LXA.
    #[must_use]
    pub const fn with_magic(mut self, magic: u8) -> Self {
        self.xaa_magic = magic;
        self.lxa_magic = magic;
        self
    }
}
