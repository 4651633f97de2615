use serde::{Deserialize, Serialize};

use super::{Mapping, RamWindow};

/// MBC1: 5-bit low bank register, 2-bit high register and a banking mode.
///
/// In mode 1 the high register also banks `0000-3FFF` and cartridge RAM.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub(super) struct Mbc1 {
    ram_enable: bool,
    low: u8,
    high: u8,
    mode: u8,
}

impl Default for Mbc1 {
    fn default() -> Self {
        Self {
            ram_enable: false,
            low: 1,
            high: 0,
            mode: 0,
        }
    }
}

impl Mbc1 {
    pub(super) fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_enable = value & 0x0F == 0x0A,
            0x2000..=0x3FFF => {
                // Only the 5-bit value is tested for zero.
                self.low = (value & 0x1F).max(1);
            }
            0x4000..=0x5FFF => self.high = value & 0x03,
            0x6000..=0x7FFF => self.mode = value & 0x01,
            _ => {}
        }
    }

    pub(super) fn mapping(&self) -> Mapping {
        let high = self.high as usize;
        let mode1 = self.mode == 1;
        Mapping {
            rom0: if mode1 { high << 5 } else { 0 },
            rom: (high << 5) | self.low as usize,
            ram: RamWindow::Bank(if mode1 { high } else { 0 }),
            ram_enabled: self.ram_enable,
        }
    }
}
