use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Flag bits in the F register.
    ///
    /// Only the upper nibble exists in hardware; bits 0-3 always read as 0.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Flags: u8 {
        /// Zero.
        const Z = 0b1000_0000;
        /// Subtract.
        const N = 0b0100_0000;
        /// Half carry (carry out of bit 3, or bit 11 for 16-bit adds).
        const H = 0b0010_0000;
        /// Carry.
        const C = 0b0001_0000;
    }
}

impl Default for Flags {
    fn default() -> Self {
        Flags::empty()
    }
}

/// Register file of the LR35902.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    pub a: u8,
    pub f: Flags,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    #[inline]
    pub fn af(&self) -> u16 {
        u16::from_be_bytes([self.a, self.f.bits()])
    }

    #[inline]
    pub fn set_af(&mut self, value: u16) {
        let [a, f] = value.to_be_bytes();
        self.a = a;
        // Lower 4 bits of F are always zero.
        self.f = Flags::from_bits_truncate(f);
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        [self.b, self.c] = value.to_be_bytes();
    }

    #[inline]
    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        [self.d, self.e] = value.to_be_bytes();
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        [self.h, self.l] = value.to_be_bytes();
    }
}

#[cfg(test)]
mod tests {
    use super::{Flags, Registers};

    #[test]
    fn af_masks_low_nibble() {
        let mut regs = Registers::default();
        regs.set_af(0x12FF);
        assert_eq!(regs.a, 0x12);
        assert_eq!(regs.f, Flags::all());
        assert_eq!(regs.af(), 0x12F0);
    }

    #[test]
    fn pairs_are_big_endian() {
        let mut regs = Registers::default();
        regs.set_hl(0xC0DE);
        assert_eq!((regs.h, regs.l), (0xC0, 0xDE));
        regs.set_bc(0x0102);
        regs.set_de(0x0304);
        assert_eq!(regs.bc(), 0x0102);
        assert_eq!(regs.de(), 0x0304);
    }
}
