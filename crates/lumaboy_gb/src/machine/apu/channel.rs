//! Pieces shared between channels: the length counter and the volume
//! envelope.

use serde::{Deserialize, Serialize};

/// Counts down on frame sequencer length steps and silences the channel
/// at zero when enabled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct LengthCounter {
    max: u16,
    counter: u16,
    pub(super) enabled: bool,
}

impl LengthCounter {
    pub(super) fn new(max: u16) -> Self {
        Self {
            max,
            counter: 0,
            enabled: false,
        }
    }

    /// Load from the register value written to NRx1.
    pub(super) fn load(&mut self, value: u8) {
        self.counter = self.max - (value as u16 & (self.max - 1));
    }

    pub(super) fn trigger(&mut self) {
        if self.counter == 0 {
            self.counter = self.max;
        }
    }

    pub(super) fn validate(&self, max: u16) -> Result<(), String> {
        if self.max != max || self.counter > max {
            return Err(format!(
                "length counter {}/{} (expected limit {max})",
                self.counter, self.max
            ));
        }
        Ok(())
    }

    /// Returns `true` when the counter expires on this clock.
    pub(super) fn clock(&mut self) -> bool {
        if !self.enabled || self.counter == 0 {
            return false;
        }
        self.counter -= 1;
        self.counter == 0
    }
}

/// Volume envelope (NRx2).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct Envelope {
    register: u8,
    pub(super) volume: u8,
    timer: u8,
}

impl Envelope {
    pub(super) fn write(&mut self, value: u8) {
        self.register = value;
    }

    /// The DAC is powered while any of the upper five bits are set.
    pub(super) fn dac_enabled(&self) -> bool {
        self.register & 0xF8 != 0
    }

    fn period(&self) -> u8 {
        self.register & 0x07
    }

    pub(super) fn validate(&self) -> Result<(), String> {
        if self.volume > 15 {
            return Err(format!("envelope volume {}", self.volume));
        }
        Ok(())
    }

    pub(super) fn trigger(&mut self) {
        self.volume = self.register >> 4;
        self.timer = self.period();
    }

    pub(super) fn clock(&mut self) {
        if self.period() == 0 {
            return;
        }
        self.timer = self.timer.saturating_sub(1);
        if self.timer > 0 {
            return;
        }
        self.timer = self.period();
        if self.register & 0x08 != 0 {
            if self.volume < 15 {
                self.volume += 1;
            }
        } else if self.volume > 0 {
            self.volume -= 1;
        }
    }
}

/// Advance a countdown timer of `period` cycles by `cycles`, returning
/// how many times it expired.
#[inline]
pub(super) fn run_timer(timer: &mut u32, period: u32, cycles: u32) -> u32 {
    if cycles < *timer {
        *timer -= cycles;
        return 0;
    }
    let over = cycles - *timer;
    *timer = period - over % period;
    1 + over / period
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::tests::{assert_tampered_state_rejected, TestRom, IDLE};

    #[test]
    fn load_maps_register_to_remaining_steps() {
        let mut length = LengthCounter::new(64);
        length.load(0);
        assert_eq!(length.counter, 64);
        length.load(63);
        assert_eq!(length.counter, 1);
        length.enabled = true;
        assert!(length.clock());
        assert!(!length.clock());
    }

    #[test]
    fn run_timer_counts_every_expiry_and_keeps_the_remainder() {
        let mut timer = 10;
        assert_eq!(run_timer(&mut timer, 16, 9), 0);
        assert_eq!(timer, 1);
        assert_eq!(run_timer(&mut timer, 16, 1), 1);
        assert_eq!(timer, 16);
        assert_eq!(run_timer(&mut timer, 16, 16 * 3 + 5), 3);
        assert_eq!(timer, 11);
    }

    #[test]
    fn state_with_zero_length_limit_is_rejected() {
        let rom = TestRom::new(IDLE);
        assert_tampered_state_rejected(&rom, |gb| gb.bus.apu.square2.length.max = 0);
        assert_tampered_state_rejected(&rom, |gb| gb.bus.apu.wave.length.max = 64);
        assert_tampered_state_rejected(&rom, |gb| gb.bus.apu.noise.length.counter = 65);
    }
}
