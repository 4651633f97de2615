use serde::{Deserialize, Serialize};

use super::{Mapping, RamWindow};

/// MBC5: 9-bit ROM bank (bank 0 is selectable in the upper window) and
/// 4-bit RAM bank.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub(super) struct Mbc5 {
    ram_enable: bool,
    rom_low: u8,
    rom_high: u8,
    ram_bank: u8,
}

impl Default for Mbc5 {
    fn default() -> Self {
        Self {
            ram_enable: false,
            rom_low: 1,
            rom_high: 0,
            ram_bank: 0,
        }
    }
}

impl Mbc5 {
    pub(super) fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_enable = value & 0x0F == 0x0A,
            0x2000..=0x2FFF => self.rom_low = value,
            0x3000..=0x3FFF => self.rom_high = value & 0x01,
            0x4000..=0x5FFF => self.ram_bank = value & 0x0F,
            _ => {}
        }
    }

    pub(super) fn mapping(&self) -> Mapping {
        Mapping {
            rom0: 0,
            rom: ((self.rom_high as usize) << 8) | self.rom_low as usize,
            ram: RamWindow::Bank(self.ram_bank as usize),
            ram_enabled: self.ram_enable,
        }
    }
}
