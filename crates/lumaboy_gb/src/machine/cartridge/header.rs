//! Cartridge header decoding (0x0100-0x014F).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Size of the header area every image must contain.
pub(crate) const HEADER_END: usize = 0x150;
pub(crate) const ROM_BANK_SIZE: usize = 0x4000;
pub(crate) const RAM_BANK_SIZE: usize = 0x2000;
/// MBC2's built-in RAM: 512 half-bytes.
pub(crate) const MBC2_RAM_SIZE: usize = 512;

/// Memory bank controller family named by the cartridge type byte.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum MbcKind {
    RomOnly,
    Mbc1,
    Mbc2,
    Mbc3,
    Mbc5,
}

/// Decoded header fields.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CartridgeInfo {
    pub title: String,
    /// Raw CGB flag (0x0143).
    pub cgb_flag: u8,
    /// Raw cartridge type (0x0147).
    pub cartridge_type: u8,
    pub mbc: MbcKind,
    pub rom_banks: usize,
    /// External RAM size in bytes (512 for MBC2's built-in RAM).
    pub ram_size: usize,
    pub has_battery: bool,
    pub has_rtc: bool,
    pub header_checksum: u8,
    pub header_checksum_ok: bool,
    pub global_checksum: u16,
}

impl CartridgeInfo {
    /// Parse and validate the header of `rom`.
    ///
    /// A bad header checksum is only logged; real hardware would refuse to
    /// boot, but plenty of homebrew images ship with a wrong value.
    pub fn parse(rom: &[u8]) -> Result<Self> {
        if rom.len() < HEADER_END {
            return Err(Error::invalid_header(format!(
                "image is {} bytes, shorter than the 0x150-byte header",
                rom.len()
            )));
        }

        let cartridge_type = rom[0x147];
        let (mbc, has_ram, has_battery, has_rtc) = match cartridge_type {
            0x00 => (MbcKind::RomOnly, false, false, false),
            0x08 => (MbcKind::RomOnly, true, false, false),
            0x09 => (MbcKind::RomOnly, true, true, false),
            0x01 => (MbcKind::Mbc1, false, false, false),
            0x02 => (MbcKind::Mbc1, true, false, false),
            0x03 => (MbcKind::Mbc1, true, true, false),
            0x05 => (MbcKind::Mbc2, true, false, false),
            0x06 => (MbcKind::Mbc2, true, true, false),
            0x0F => (MbcKind::Mbc3, false, true, true),
            0x10 => (MbcKind::Mbc3, true, true, true),
            0x11 => (MbcKind::Mbc3, false, false, false),
            0x12 => (MbcKind::Mbc3, true, false, false),
            0x13 => (MbcKind::Mbc3, true, true, false),
            0x19 | 0x1C => (MbcKind::Mbc5, false, false, false),
            0x1A | 0x1D => (MbcKind::Mbc5, true, false, false),
            0x1B | 0x1E => (MbcKind::Mbc5, true, true, false),
            code => return Err(Error::UnsupportedMbc { code }),
        };

        let rom_size_code = rom[0x148];
        let rom_banks = match rom_size_code {
            0x00..=0x08 => 2usize << rom_size_code,
            0x52 => 72,
            0x53 => 80,
            0x54 => 96,
            code => {
                return Err(Error::invalid_header(format!(
                    "unknown ROM size code {code:02X}"
                )))
            }
        };
        let declared = rom_banks * ROM_BANK_SIZE;
        if declared > rom.len() {
            return Err(Error::invalid_header(format!(
                "header declares {declared} bytes of ROM but the image has {}",
                rom.len()
            )));
        }

        let ram_size_code = rom[0x149];
        let declared_ram = match ram_size_code {
            0x00 => 0,
            0x01 => 0x800,
            0x02 => RAM_BANK_SIZE,
            0x03 => 4 * RAM_BANK_SIZE,
            0x04 => 16 * RAM_BANK_SIZE,
            0x05 => 8 * RAM_BANK_SIZE,
            code => {
                return Err(Error::invalid_header(format!(
                    "unknown RAM size code {code:02X}"
                )))
            }
        };
        let ram_size = match mbc {
            MbcKind::Mbc2 => MBC2_RAM_SIZE,
            _ if has_ram => declared_ram,
            _ => 0,
        };

        let header_checksum = rom[0x14D];
        let computed = header_checksum_of(rom);
        let header_checksum_ok = computed == header_checksum;

        let cgb_flag = rom[0x143];
        let info = Self {
            title: title_of(rom, cgb_flag),
            cgb_flag,
            cartridge_type,
            mbc,
            rom_banks,
            ram_size,
            has_battery,
            has_rtc,
            header_checksum,
            header_checksum_ok,
            global_checksum: u16::from_be_bytes([rom[0x14E], rom[0x14F]]),
        };

        if !header_checksum_ok {
            log::warn!(
                "GB cartridge '{}': header checksum mismatch (header {:02X}, computed {:02X})",
                info.title,
                header_checksum,
                computed
            );
        }
        Ok(info)
    }

    /// CGB-enhanced or CGB-only cartridge.
    pub fn supports_cgb(&self) -> bool {
        self.cgb_flag & 0x80 != 0
    }

    pub fn cgb_only(&self) -> bool {
        self.cgb_flag == 0xC0
    }
}

/// Checksum over 0x0134-0x014C as computed by the boot ROM.
pub(crate) fn header_checksum_of(rom: &[u8]) -> u8 {
    rom[0x134..=0x14C]
        .iter()
        .fold(0u8, |acc, &byte| acc.wrapping_sub(byte).wrapping_sub(1))
}

/// Title is up to 16 bytes; CGB cartridges reuse the last one as the flag.
fn title_of(rom: &[u8], cgb_flag: u8) -> String {
    let end = if cgb_flag & 0x80 != 0 { 0x143 } else { 0x144 };
    rom[0x134..end]
        .iter()
        .take_while(|&&b| b != 0)
        .filter(|b| b.is_ascii_graphic() || **b == b' ')
        .map(|&b| b as char)
        .collect::<String>()
        .trim_end()
        .to_string()
}
