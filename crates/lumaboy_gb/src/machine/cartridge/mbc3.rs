use serde::{Deserialize, Serialize};

use super::{Mapping, RamWindow};
use crate::CLOCK_HZ;

/// MBC3: 7-bit ROM bank, RAM banks 0-3 and an optional real-time clock.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub(super) struct Mbc3 {
    ram_enable: bool,
    rom_bank: u8,
    /// 0x00-0x03 selects a RAM bank, 0x08-0x0C an RTC register.
    select: u8,
    /// Last value written to the latch range.
    latch_last: u8,
    rtc: Option<Rtc>,
}

impl Mbc3 {
    pub(super) fn new(has_rtc: bool) -> Self {
        Self {
            ram_enable: false,
            rom_bank: 1,
            select: 0,
            latch_last: 0xFF,
            rtc: has_rtc.then(Rtc::default),
        }
    }

    pub(super) fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_enable = value & 0x0F == 0x0A,
            0x2000..=0x3FFF => self.rom_bank = (value & 0x7F).max(1),
            0x4000..=0x5FFF => self.select = value,
            0x6000..=0x7FFF => {
                if self.latch_last == 0x00 && value == 0x01 {
                    if let Some(rtc) = &mut self.rtc {
                        rtc.latch();
                    }
                }
                self.latch_last = value;
            }
            _ => {}
        }
    }

    pub(super) fn mapping(&self) -> Mapping {
        let ram = match self.select {
            0x00..=0x03 => RamWindow::Bank(self.select as usize),
            0x08..=0x0C if self.rtc.is_some() => RamWindow::Rtc(self.select),
            _ => RamWindow::None,
        };
        Mapping {
            rom0: 0,
            rom: self.rom_bank as usize,
            ram,
            ram_enabled: self.ram_enable,
        }
    }

    pub(super) fn read_rtc(&self, register: u8) -> u8 {
        self.rtc.as_ref().map_or(0xFF, |rtc| rtc.read(register))
    }

    pub(super) fn write_rtc(&mut self, register: u8, value: u8) {
        if let Some(rtc) = &mut self.rtc {
            rtc.write(register, value);
        }
    }

    pub(super) fn tick(&mut self, cycles: u32) {
        if let Some(rtc) = &mut self.rtc {
            rtc.tick(cycles);
        }
    }

    pub(super) fn validate(&self, has_rtc: bool) -> Result<(), String> {
        if self.rom_bank == 0 || self.rom_bank > 0x7F {
            return Err(format!("MBC3 ROM bank {:#04X}", self.rom_bank));
        }
        match &self.rtc {
            Some(rtc) if has_rtc => rtc.validate(),
            None if !has_rtc => Ok(()),
            _ => Err("MBC3 clock presence does not match the cartridge".to_string()),
        }
    }
}

/// Real-time clock counted in emulated cycles, so runs stay reproducible.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub(super) struct Rtc {
    seconds: u8,
    minutes: u8,
    hours: u8,
    /// 9-bit day counter.
    days: u16,
    halted: bool,
    day_carry: bool,
    /// Sub-second progress in T-cycles.
    cycles: u32,
    /// Registers 0x08-0x0C as captured by the last latch.
    latched: [u8; 5],
}

impl Rtc {
    fn registers(&self) -> [u8; 5] {
        let flags = ((self.days >> 8) as u8 & 0x01)
            | (u8::from(self.halted) << 6)
            | (u8::from(self.day_carry) << 7);
        [
            self.seconds,
            self.minutes,
            self.hours,
            self.days as u8,
            flags,
        ]
    }

    fn latch(&mut self) {
        self.latched = self.registers();
    }

    fn read(&self, register: u8) -> u8 {
        match register {
            0x08..=0x0C => self.latched[(register - 0x08) as usize],
            _ => 0xFF,
        }
    }

    /// Writes go to the live counters and are mirrored into the latch.
    fn write(&mut self, register: u8, value: u8) {
        match register {
            0x08 => {
                self.seconds = value & 0x3F;
                self.cycles = 0;
            }
            0x09 => self.minutes = value & 0x3F,
            0x0A => self.hours = value & 0x1F,
            0x0B => self.days = (self.days & 0x100) | value as u16,
            0x0C => {
                self.days = (self.days & 0xFF) | (((value & 0x01) as u16) << 8);
                self.halted = value & 0x40 != 0;
                self.day_carry = value & 0x80 != 0;
            }
            _ => return,
        }
        self.latched[(register - 0x08) as usize] = self.registers()[(register - 0x08) as usize];
    }

    fn validate(&self) -> Result<(), String> {
        if self.seconds > 0x3F || self.minutes > 0x3F || self.hours > 0x1F || self.days > 0x1FF {
            return Err(format!(
                "RTC time {}d {}:{}:{}",
                self.days, self.hours, self.minutes, self.seconds
            ));
        }
        if self.cycles >= CLOCK_HZ {
            return Err(format!("RTC sub-second counter {}", self.cycles));
        }
        Ok(())
    }

    fn tick(&mut self, cycles: u32) {
        if self.halted {
            return;
        }
        self.cycles += cycles;
        while self.cycles >= CLOCK_HZ {
            self.cycles -= CLOCK_HZ;
            self.advance_second();
        }
    }

    fn advance_second(&mut self) {
        self.seconds = (self.seconds + 1) & 0x3F;
        if self.seconds != 60 {
            return;
        }
        self.seconds = 0;
        self.minutes = (self.minutes + 1) & 0x3F;
        if self.minutes != 60 {
            return;
        }
        self.minutes = 0;
        self.hours = (self.hours + 1) & 0x1F;
        if self.hours != 24 {
            return;
        }
        self.hours = 0;
        self.days += 1;
        if self.days > 0x1FF {
            self.days = 0;
            self.day_carry = true;
        }
    }
}
