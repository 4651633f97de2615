//! Interrupt request/enable registers and priority arbitration.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Interrupt flag register (IF).
pub const IF_ADDR: u16 = 0xFF0F;
/// Interrupt enable register (IE).
pub const IE_ADDR: u16 = 0xFFFF;

/// An interrupt source. The discriminant is its bit in IE/IF.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Interrupt {
    VBlank = 0,
    LcdStat = 1,
    Timer = 2,
    Serial = 3,
    Joypad = 4,
}

impl Interrupt {
    /// All sources, highest priority first.
    pub const PRIORITY: [Interrupt; 5] = [
        Interrupt::VBlank,
        Interrupt::LcdStat,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    #[inline]
    pub const fn mask(self) -> u8 {
        1 << self as u8
    }

    /// Handler address jumped to on dispatch.
    #[inline]
    pub const fn vector(self) -> u16 {
        0x0040 + 8 * self as u16
    }

    #[inline]
    pub const fn flag(self) -> InterruptFlags {
        InterruptFlags::from_bits_retain(self.mask())
    }
}

bitflags! {
    /// Bit set shared by IE and IF.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct InterruptFlags: u8 {
        const VBLANK = 1 << 0;
        const LCD_STAT = 1 << 1;
        const TIMER = 1 << 2;
        const SERIAL = 1 << 3;
        const JOYPAD = 1 << 4;
    }
}

impl Default for InterruptFlags {
    fn default() -> Self {
        InterruptFlags::empty()
    }
}

/// Pick the interrupt the CPU should enter, if any.
///
/// Pure function of the three inputs: with IME set, the lowest-numbered bit
/// present in both `ie` and `iflag` wins.
pub fn dispatch_target(ie: u8, iflag: u8, ime: bool) -> Option<Interrupt> {
    if !ime {
        return None;
    }
    let pending = ie & iflag & 0x1F;
    Interrupt::PRIORITY
        .into_iter()
        .find(|source| pending & source.mask() != 0)
}

/// IE and IF as seen on the bus.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interrupts {
    /// IE keeps all eight bits; only the low five select sources.
    pub enable: InterruptFlags,
    pub request: InterruptFlags,
}

impl Interrupts {
    /// Raise the request bit for `source`.
    #[inline]
    pub fn request(&mut self, source: Interrupt) {
        self.request |= source.flag();
    }

    pub fn read_if(&self) -> u8 {
        // Upper three bits are unused and read as 1.
        self.request.bits() | 0xE0
    }

    pub fn write_if(&mut self, value: u8) {
        self.request = InterruptFlags::from_bits_truncate(value);
    }

    pub fn read_ie(&self) -> u8 {
        self.enable.bits()
    }

    pub fn write_ie(&mut self, value: u8) {
        self.enable = InterruptFlags::from_bits_retain(value);
    }
}
