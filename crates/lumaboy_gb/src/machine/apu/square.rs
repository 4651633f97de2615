use serde::{Deserialize, Serialize};

use super::channel::{run_timer, Envelope, LengthCounter};

const DUTY_PATTERNS: [u8; 4] = [0b0000_0001, 0b1000_0001, 0b1000_0111, 0b0111_1110];

/// Frequency sweep unit of square channel 1 (NR10).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Sweep {
    register: u8,
    shadow: u16,
    timer: u8,
    enabled: bool,
}

impl Sweep {
    fn period(&self) -> u8 {
        (self.register >> 4) & 0x07
    }

    fn shift(&self) -> u8 {
        self.register & 0x07
    }

    fn reload_timer(&mut self) {
        self.timer = match self.period() {
            0 => 8,
            p => p,
        };
    }

    /// Next frequency, or `None` when it overflows 11 bits.
    fn next_frequency(&self) -> Option<u16> {
        let delta = self.shadow >> self.shift();
        let next = if self.register & 0x08 != 0 {
            self.shadow.wrapping_sub(delta)
        } else {
            self.shadow + delta
        };
        (next <= 0x7FF).then_some(next)
    }
}

/// Square wave channel. Channel 1 carries a sweep unit, channel 2 doesn't.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct Square {
    sweep: Option<Sweep>,
    pub(super) length: LengthCounter,
    pub(super) envelope: Envelope,
    pub(super) enabled: bool,
    duty: u8,
    duty_step: u8,
    frequency: u16,
    timer: u32,
}

impl Square {
    pub(super) fn new(with_sweep: bool) -> Self {
        Self {
            sweep: with_sweep.then(Sweep::default),
            length: LengthCounter::new(64),
            envelope: Envelope::default(),
            enabled: false,
            duty: 0,
            duty_step: 0,
            frequency: 0,
            timer: 0,
        }
    }

    fn period(&self) -> u32 {
        (2048 - self.frequency as u32) * 4
    }

    pub(super) fn write_sweep(&mut self, value: u8) {
        if let Some(sweep) = self.sweep.as_mut() {
            sweep.register = value;
        }
    }

    pub(super) fn write_duty_length(&mut self, value: u8) {
        self.duty = value >> 6;
        self.length.load(value);
    }

    pub(super) fn write_envelope(&mut self, value: u8) {
        self.envelope.write(value);
        if !self.envelope.dac_enabled() {
            self.enabled = false;
        }
    }

    pub(super) fn write_frequency_low(&mut self, value: u8) {
        self.frequency = (self.frequency & 0x700) | value as u16;
    }

    pub(super) fn write_frequency_high(&mut self, value: u8) {
        self.frequency = (self.frequency & 0xFF) | ((value as u16 & 0x07) << 8);
        self.length.enabled = value & 0x40 != 0;
        if value & 0x80 != 0 {
            self.trigger();
        }
    }

    fn trigger(&mut self) {
        self.enabled = self.envelope.dac_enabled();
        self.length.trigger();
        self.timer = self.period();
        self.envelope.trigger();

        let frequency = self.frequency;
        if let Some(sweep) = self.sweep.as_mut() {
            sweep.shadow = frequency;
            sweep.reload_timer();
            sweep.enabled = sweep.period() != 0 || sweep.shift() != 0;
            if sweep.shift() != 0 && sweep.next_frequency().is_none() {
                self.enabled = false;
            }
        }
    }

    pub(super) fn clock_length(&mut self) {
        if self.length.clock() {
            self.enabled = false;
        }
    }

    pub(super) fn clock_sweep(&mut self) {
        let Some(sweep) = self.sweep.as_mut() else {
            return;
        };
        sweep.timer = sweep.timer.saturating_sub(1);
        if sweep.timer > 0 {
            return;
        }
        sweep.reload_timer();
        if !sweep.enabled || sweep.period() == 0 {
            return;
        }
        match sweep.next_frequency() {
            Some(next) if sweep.shift() != 0 => {
                sweep.shadow = next;
                self.frequency = next;
                if sweep.next_frequency().is_none() {
                    self.enabled = false;
                }
            }
            Some(_) => {}
            None => self.enabled = false,
        }
    }

    pub(super) fn advance(&mut self, cycles: u32) {
        if !self.enabled {
            return;
        }
        let period = self.period();
        let steps = run_timer(&mut self.timer, period, cycles);
        self.duty_step = ((self.duty_step as u32 + steps) & 7) as u8;
    }

    /// Current digital output, 0-15.
    pub(super) fn output(&self) -> u8 {
        if !self.enabled {
            return 0;
        }
        let high = (DUTY_PATTERNS[self.duty as usize] >> (7 - self.duty_step)) & 1;
        high * self.envelope.volume
    }

    pub(super) fn dac_enabled(&self) -> bool {
        self.envelope.dac_enabled()
    }

    pub(super) fn validate(&self, with_sweep: bool) -> Result<(), String> {
        self.length.validate(64)?;
        self.envelope.validate()?;
        if self.sweep.is_some() != with_sweep {
            return Err("square channel sweep unit mismatch".to_string());
        }
        if self.sweep.as_ref().is_some_and(|sweep| sweep.shadow > 0x7FF) {
            return Err("sweep shadow frequency out of range".to_string());
        }
        if self.duty > 3 || self.duty_step > 7 {
            return Err(format!("square duty {} step {}", self.duty, self.duty_step));
        }
        if self.frequency > 0x7FF {
            return Err(format!("square frequency {:#X}", self.frequency));
        }
        Ok(())
    }
}
