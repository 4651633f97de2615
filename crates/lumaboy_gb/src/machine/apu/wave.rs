use serde::{Deserialize, Serialize};

use super::channel::{run_timer, LengthCounter};

/// Programmable wave channel: 32 4-bit samples from wave RAM.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct Wave {
    pub(super) ram: [u8; 16],
    pub(super) length: LengthCounter,
    pub(super) enabled: bool,
    dac_enabled: bool,
    /// NR32 output level code (0 = mute, 1 = 100%, 2 = 50%, 3 = 25%).
    level: u8,
    position: u8,
    frequency: u16,
    timer: u32,
}

impl Wave {
    pub(super) fn new() -> Self {
        Self {
            ram: [0; 16],
            length: LengthCounter::new(256),
            enabled: false,
            dac_enabled: false,
            level: 0,
            position: 0,
            frequency: 0,
            timer: 0,
        }
    }

    fn period(&self) -> u32 {
        (2048 - self.frequency as u32) * 2
    }

    pub(super) fn write_dac(&mut self, value: u8) {
        self.dac_enabled = value & 0x80 != 0;
        if !self.dac_enabled {
            self.enabled = false;
        }
    }

    pub(super) fn write_level(&mut self, value: u8) {
        self.level = (value >> 5) & 0x03;
    }

    pub(super) fn write_frequency_low(&mut self, value: u8) {
        self.frequency = (self.frequency & 0x700) | value as u16;
    }

    pub(super) fn write_frequency_high(&mut self, value: u8) {
        self.frequency = (self.frequency & 0xFF) | ((value as u16 & 0x07) << 8);
        self.length.enabled = value & 0x40 != 0;
        if value & 0x80 != 0 {
            self.enabled = self.dac_enabled;
            self.length.trigger();
            self.timer = self.period();
            self.position = 0;
        }
    }

    pub(super) fn clock_length(&mut self) {
        if self.length.clock() {
            self.enabled = false;
        }
    }

    pub(super) fn advance(&mut self, cycles: u32) {
        if !self.enabled {
            return;
        }
        let period = self.period();
        let steps = run_timer(&mut self.timer, period, cycles);
        self.position = ((self.position as u32 + steps) & 31) as u8;
    }

    pub(super) fn output(&self) -> u8 {
        if !self.enabled || self.level == 0 {
            return 0;
        }
        let byte = self.ram[self.position as usize / 2];
        let sample = if self.position & 1 == 0 {
            byte >> 4
        } else {
            byte & 0x0F
        };
        sample >> (self.level - 1)
    }

    pub(super) fn dac_enabled(&self) -> bool {
        self.dac_enabled
    }

    pub(super) fn validate(&self) -> Result<(), String> {
        self.length.validate(256)?;
        if self.level > 3 || self.position > 31 {
            return Err(format!("wave level {} position {}", self.level, self.position));
        }
        if self.frequency > 0x7FF {
            return Err(format!("wave frequency {:#X}", self.frequency));
        }
        Ok(())
    }
}
