//! Cartridge ROM/RAM and the memory bank controllers.
//!
//! Every controller is a small register machine that turns writes into the
//! `0000-7FFF` control ranges into a [`Mapping`]. The cartridge then applies
//! that mapping, reducing bank numbers modulo the banks actually present, so
//! no bank-select value is ever rejected.

mod header;
mod mbc1;
mod mbc2;
mod mbc3;
mod mbc5;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use header::{CartridgeInfo, MbcKind};
#[cfg(test)]
pub(crate) use header::header_checksum_of;
use header::{RAM_BANK_SIZE, ROM_BANK_SIZE};
use mbc1::Mbc1;
use mbc2::Mbc2;
use mbc3::Mbc3;
use mbc5::Mbc5;

/// What the `A000-BFFF` window currently shows.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
enum RamWindow {
    None,
    Bank(usize),
    /// MBC2 built-in RAM, 4 bits per address.
    Nibbles,
    /// MBC3 RTC register 0x08-0x0C.
    Rtc(u8),
}

/// Banking state requested by a controller's registers.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct Mapping {
    rom0: usize,
    rom: usize,
    ram: RamWindow,
    ram_enabled: bool,
}

/// Controller variant, fixed when the cartridge is loaded.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
enum Mbc {
    RomOnly,
    Mbc1(Mbc1),
    Mbc2(Mbc2),
    Mbc3(Mbc3),
    Mbc5(Mbc5),
}

impl Mbc {
    fn for_kind(kind: MbcKind, has_rtc: bool) -> Self {
        match kind {
            MbcKind::RomOnly => Mbc::RomOnly,
            MbcKind::Mbc1 => Mbc::Mbc1(Mbc1::default()),
            MbcKind::Mbc2 => Mbc::Mbc2(Mbc2::default()),
            MbcKind::Mbc3 => Mbc::Mbc3(Mbc3::new(has_rtc)),
            MbcKind::Mbc5 => Mbc::Mbc5(Mbc5::default()),
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match self {
            Mbc::RomOnly => {}
            Mbc::Mbc1(m) => m.write(addr, value),
            Mbc::Mbc2(m) => m.write(addr, value),
            Mbc::Mbc3(m) => m.write(addr, value),
            Mbc::Mbc5(m) => m.write(addr, value),
        }
    }

    /// Check a restored controller against the header it must belong to.
    fn validate(&self, kind: MbcKind, has_rtc: bool) -> std::result::Result<(), String> {
        let expected = Mbc::for_kind(kind, has_rtc);
        if std::mem::discriminant(self) != std::mem::discriminant(&expected) {
            return Err(format!("controller state does not match {kind:?}"));
        }
        if let Mbc::Mbc3(m) = self {
            m.validate(has_rtc)?;
        }
        Ok(())
    }

    fn mapping(&self) -> Mapping {
        match self {
            Mbc::RomOnly => Mapping {
                rom0: 0,
                rom: 1,
                ram: RamWindow::Bank(0),
                ram_enabled: true,
            },
            Mbc::Mbc1(m) => m.mapping(),
            Mbc::Mbc2(m) => m.mapping(),
            Mbc::Mbc3(m) => m.mapping(),
            Mbc::Mbc5(m) => m.mapping(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Cartridge {
    /// The image is immutable and supplied again when a state is loaded.
    #[serde(skip)]
    rom: Vec<u8>,
    ram: Vec<u8>,
    info: CartridgeInfo,
    fingerprint: u64,
    mbc: Mbc,
    rom0_bank: usize,
    rom_bank: usize,
    ram_window: RamWindow,
    ram_enabled: bool,
}

impl Cartridge {
    pub(crate) fn load(rom: &[u8]) -> Result<(Cartridge, CartridgeInfo)> {
        let info = CartridgeInfo::parse(rom)?;
        let mbc = Mbc::for_kind(info.mbc, info.has_rtc);

        let mut cartridge = Cartridge {
            rom: rom.to_vec(),
            ram: vec![0; info.ram_size],
            fingerprint: fingerprint_of(rom),
            info: info.clone(),
            mbc,
            rom0_bank: 0,
            rom_bank: 1,
            ram_window: RamWindow::None,
            ram_enabled: false,
        };
        cartridge.apply(cartridge.mbc.mapping());

        log::info!(
            "GB cartridge loaded: '{}' type={:02X} ({:?}) rom_banks={} ram={} bytes battery={} rtc={}",
            info.title,
            info.cartridge_type,
            info.mbc,
            info.rom_banks,
            info.ram_size,
            info.has_battery,
            info.has_rtc
        );
        Ok((cartridge, info))
    }

    /// Put the controller back in its power-on state. RAM is kept.
    pub(crate) fn reset_mapper(&mut self) {
        self.mbc = Mbc::for_kind(self.info.mbc, self.info.has_rtc);
        let mapping = self.mbc.mapping();
        self.apply(mapping);
    }

    pub(crate) fn info(&self) -> &CartridgeInfo {
        &self.info
    }

    /// Identity of the inserted image, recorded in save states.
    pub(crate) fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Hand the ROM image of `other` (same cartridge) to a restored copy.
    pub(crate) fn take_rom_from(&mut self, other: &mut Cartridge) {
        self.rom = std::mem::take(&mut other.rom);
    }

    /// Move this cartridge out, leaving an image-less copy behind.
    pub(crate) fn detach(&mut self) -> Cartridge {
        let rom = std::mem::take(&mut self.rom);
        let mut cartridge = self.clone();
        cartridge.rom = rom;
        cartridge
    }

    /// Check a restored cartridge against the one currently inserted.
    pub(crate) fn validate_against(&self, current: &Cartridge) -> std::result::Result<(), String> {
        if self.info != current.info {
            return Err("cartridge header differs".to_string());
        }
        if self.ram.len() != current.ram.len() {
            return Err(format!(
                "cartridge RAM is {} bytes, expected {}",
                self.ram.len(),
                current.ram.len()
            ));
        }
        self.mbc.validate(self.info.mbc, self.info.has_rtc)?;
        let banks = (self.rom0_bank, self.rom_bank, self.ram_window, self.ram_enabled);
        if self.resolve(self.mbc.mapping()) != banks {
            return Err(format!(
                "bank selection {banks:?} does not follow the controller registers"
            ));
        }
        Ok(())
    }

    #[inline]
    fn rom_banks(&self) -> usize {
        self.info.rom_banks.max(1)
    }

    #[inline]
    fn ram_banks(&self) -> usize {
        self.ram.len().div_ceil(RAM_BANK_SIZE)
    }

    /// Reduce a controller mapping to banks that exist on this cartridge:
    /// `(rom0 bank, rom bank, RAM window, RAM enabled)`.
    fn resolve(&self, mapping: Mapping) -> (usize, usize, RamWindow, bool) {
        let ram = match mapping.ram {
            RamWindow::Bank(bank) => match self.ram_banks() {
                0 => RamWindow::None,
                count => RamWindow::Bank(bank % count),
            },
            window => window,
        };
        (
            mapping.rom0 % self.rom_banks(),
            mapping.rom % self.rom_banks(),
            ram,
            mapping.ram_enabled,
        )
    }

    fn apply(&mut self, mapping: Mapping) {
        (self.rom0_bank, self.rom_bank, self.ram_window, self.ram_enabled) = self.resolve(mapping);
    }

    /// Read from `0000-7FFF`.
    pub(crate) fn read_rom(&self, addr: u16) -> u8 {
        let bank = if addr < 0x4000 {
            self.rom0_bank
        } else {
            self.rom_bank
        };
        let index = bank * ROM_BANK_SIZE + (addr as usize & (ROM_BANK_SIZE - 1));
        self.rom.get(index).copied().unwrap_or(0xFF)
    }

    /// Write to `0000-7FFF`: controller registers.
    pub(crate) fn write_rom(&mut self, addr: u16, value: u8) {
        self.mbc.write(addr, value);
        let mapping = self.mbc.mapping();
        self.apply(mapping);
    }

    /// Read from `A000-BFFF`.
    pub(crate) fn read_ram(&self, addr: u16) -> u8 {
        if !self.ram_enabled {
            return 0xFF;
        }
        match self.ram_window {
            RamWindow::None => 0xFF,
            RamWindow::Bank(bank) => {
                if self.ram.is_empty() {
                    return 0xFF;
                }
                let index = bank * RAM_BANK_SIZE + (addr as usize & (RAM_BANK_SIZE - 1));
                // Carts with 2 KiB of RAM mirror it across the window.
                self.ram[index % self.ram.len()]
            }
            RamWindow::Nibbles => self.ram[addr as usize & 0x1FF] | 0xF0,
            RamWindow::Rtc(register) => match &self.mbc {
                Mbc::Mbc3(m) => m.read_rtc(register),
                _ => 0xFF,
            },
        }
    }

    /// Write to `A000-BFFF`.
    pub(crate) fn write_ram(&mut self, addr: u16, value: u8) {
        if !self.ram_enabled {
            return;
        }
        match self.ram_window {
            RamWindow::None => {}
            RamWindow::Bank(bank) => {
                if self.ram.is_empty() {
                    return;
                }
                let index = bank * RAM_BANK_SIZE + (addr as usize & (RAM_BANK_SIZE - 1));
                let len = self.ram.len();
                self.ram[index % len] = value;
            }
            RamWindow::Nibbles => self.ram[addr as usize & 0x1FF] = value & 0x0F,
            RamWindow::Rtc(register) => {
                if let Mbc::Mbc3(m) = &mut self.mbc {
                    m.write_rtc(register, value);
                }
            }
        }
    }

    /// Advance the cartridge clock (MBC3 RTC) by `cycles` single-speed
    /// T-cycles.
    pub(crate) fn tick(&mut self, cycles: u32) {
        if let Mbc::Mbc3(m) = &mut self.mbc {
            m.tick(cycles);
        }
    }

    /// Battery-backed RAM, if the cartridge has a battery.
    pub(crate) fn battery_ram(&self) -> Option<&[u8]> {
        (self.info.has_battery && !self.ram.is_empty()).then_some(self.ram.as_slice())
    }

    /// Restore RAM contents from a battery file.
    ///
    /// A file of a different size is copied as far as it overlaps.
    pub(crate) fn load_battery_ram(&mut self, bytes: &[u8]) {
        if bytes.len() != self.ram.len() {
            log::warn!(
                "GB cartridge: battery file is {} bytes, expected {}",
                bytes.len(),
                self.ram.len()
            );
        }
        let len = bytes.len().min(self.ram.len());
        self.ram[..len].copy_from_slice(&bytes[..len]);
    }
}

/// FNV-1a over the whole image.
fn fingerprint_of(rom: &[u8]) -> u64 {
    rom.iter().fold(0xCBF2_9CE4_8422_2325u64, |hash, &byte| {
        (hash ^ byte as u64).wrapping_mul(0x0000_0100_0000_01B3)
    })
}

#[cfg(test)]
mod tests {
    use super::RamWindow;
    use crate::machine::tests::{assert_tampered_state_rejected, TestRom, IDLE};

    #[test]
    fn state_with_banks_the_controller_cannot_select_is_rejected() {
        let rom = TestRom::new(IDLE).cart(0x03, 0x02, 0x02);
        assert_tampered_state_rejected(&rom, |gb| {
            gb.bus.cartridge.ram_window = RamWindow::Bank(3);
        });
        assert_tampered_state_rejected(&rom, |gb| gb.bus.cartridge.rom_bank = 200);
        assert_tampered_state_rejected(&rom, |gb| {
            gb.bus.cartridge.ram_window = RamWindow::Rtc(0x08);
        });
    }

    #[test]
    fn state_with_another_controller_is_rejected() {
        let rom = TestRom::new(IDLE).cart(0x03, 0x02, 0x02);
        assert_tampered_state_rejected(&rom, |gb| gb.bus.cartridge.mbc = super::Mbc::RomOnly);
        assert_tampered_state_rejected(&rom, |gb| gb.bus.cartridge.ram.truncate(16));
    }
}
