use serde::{Deserialize, Serialize};

use super::channel::{run_timer, Envelope, LengthCounter};

const DIVISORS: [u32; 8] = [8, 16, 32, 48, 64, 80, 96, 112];

/// Noise channel driven by a 15-bit (or 7-bit) LFSR.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct Noise {
    pub(super) length: LengthCounter,
    pub(super) envelope: Envelope,
    pub(super) enabled: bool,
    /// NR43.
    polynomial: u8,
    lfsr: u16,
    timer: u32,
}

impl Noise {
    pub(super) fn new() -> Self {
        Self {
            length: LengthCounter::new(64),
            envelope: Envelope::default(),
            enabled: false,
            polynomial: 0,
            lfsr: 0x7FFF,
            timer: 0,
        }
    }

    fn period(&self) -> u32 {
        DIVISORS[(self.polynomial & 0x07) as usize] << (self.polynomial >> 4)
    }

    pub(super) fn write_length(&mut self, value: u8) {
        self.length.load(value);
    }

    pub(super) fn write_envelope(&mut self, value: u8) {
        self.envelope.write(value);
        if !self.envelope.dac_enabled() {
            self.enabled = false;
        }
    }

    pub(super) fn write_polynomial(&mut self, value: u8) {
        self.polynomial = value;
    }

    pub(super) fn write_control(&mut self, value: u8) {
        self.length.enabled = value & 0x40 != 0;
        if value & 0x80 != 0 {
            self.enabled = self.envelope.dac_enabled();
            self.length.trigger();
            self.envelope.trigger();
            self.timer = self.period();
            self.lfsr = 0x7FFF;
        }
    }

    pub(super) fn clock_length(&mut self) {
        if self.length.clock() {
            self.enabled = false;
        }
    }

    fn step_lfsr(&mut self) {
        let bit = (self.lfsr ^ (self.lfsr >> 1)) & 1;
        self.lfsr = (self.lfsr >> 1) | (bit << 14);
        if self.polynomial & 0x08 != 0 {
            self.lfsr = (self.lfsr & !(1 << 6)) | (bit << 6);
        }
    }

    pub(super) fn advance(&mut self, cycles: u32) {
        // Clock shifts 14 and 15 stop the LFSR.
        if !self.enabled || self.polynomial >> 4 >= 14 {
            return;
        }
        let period = self.period();
        let steps = run_timer(&mut self.timer, period, cycles);
        for _ in 0..steps {
            self.step_lfsr();
        }
    }

    pub(super) fn output(&self) -> u8 {
        if !self.enabled || self.lfsr & 1 != 0 {
            return 0;
        }
        self.envelope.volume
    }

    pub(super) fn dac_enabled(&self) -> bool {
        self.envelope.dac_enabled()
    }

    pub(super) fn validate(&self) -> Result<(), String> {
        self.length.validate(64)?;
        self.envelope.validate()?;
        if self.lfsr > 0x7FFF {
            return Err(format!("noise LFSR {:#X}", self.lfsr));
        }
        Ok(())
    }
}
