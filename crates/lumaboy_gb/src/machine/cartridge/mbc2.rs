use serde::{Deserialize, Serialize};

use super::{Mapping, RamWindow};

/// MBC2: address bit 8 picks between RAM enable and the 4-bit ROM bank.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub(super) struct Mbc2 {
    ram_enable: bool,
    bank: u8,
}

impl Default for Mbc2 {
    fn default() -> Self {
        Self {
            ram_enable: false,
            bank: 1,
        }
    }
}

impl Mbc2 {
    pub(super) fn write(&mut self, addr: u16, value: u8) {
        if addr >= 0x4000 {
            return;
        }
        if addr & 0x0100 == 0 {
            self.ram_enable = value & 0x0F == 0x0A;
        } else {
            self.bank = (value & 0x0F).max(1);
        }
    }

    pub(super) fn mapping(&self) -> Mapping {
        Mapping {
            rom0: 0,
            rom: self.bank as usize,
            ram: RamWindow::Nibbles,
            ram_enabled: self.ram_enable,
        }
    }
}
