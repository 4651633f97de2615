//! Audio processing unit.
//!
//! Four channels (two squares, wave, noise) advanced on the PPU dot clock,
//! a 512 Hz frame sequencer for length/sweep/envelope, and an NR50/NR51
//! mixer producing interleaved stereo `f32` at the host's sample rate.

mod channel;
mod noise;
mod square;
mod wave;

use serde::{Deserialize, Serialize};

use crate::CLOCK_HZ;
use noise::Noise;
use square::Square;
use wave::Wave;

/// 4 194 304 / 512.
const FRAME_SEQUENCER_PERIOD: u32 = 8192;
/// Frames (left/right pairs) the buffer holds: a quarter second.
const BUFFER_SECONDS_DIVISOR: u32 = 4;
/// Registers FF10-FF26.
const REGISTER_COUNT: usize = 0x17;

/// Bits that read back as 1 for FF10-FF26.
const READ_MASKS: [u8; REGISTER_COUNT] = [
    0x80, 0x3F, 0x00, 0xFF, 0xBF, // NR10-NR14
    0xFF, 0x3F, 0x00, 0xFF, 0xBF, // NR20-NR24
    0x7F, 0xFF, 0x9F, 0xFF, 0xBF, // NR30-NR34
    0xFF, 0xFF, 0x00, 0x00, 0xBF, // NR40-NR44
    0x00, 0x00, 0x70, // NR50-NR52
];

/// A sound channel, for muting from the host.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AudioChannel {
    Square1,
    Square2,
    Wave,
    Noise,
}

impl AudioChannel {
    pub const ALL: [AudioChannel; 4] = [
        AudioChannel::Square1,
        AudioChannel::Square2,
        AudioChannel::Wave,
        AudioChannel::Noise,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Host-side output settings. Not part of save states.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct AudioSettings {
    pub(crate) volume: f32,
    pub(crate) channels: [bool; 4],
    pub(crate) mono: bool,
    pub(crate) sample_rate: u32,
    /// Emulated speed; samples per emulated second shrink by this factor so
    /// the host still receives `sample_rate` per real second.
    pub(crate) clock_multiplier: f32,
}

impl AudioSettings {
    /// Samples produced per emulated second.
    fn emulated_rate(&self) -> u64 {
        let rate = (self.sample_rate as f32 / self.clock_multiplier).round() as u64;
        rate.clamp(1, CLOCK_HZ as u64)
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            channels: [true; 4],
            mono: false,
            sample_rate: 48_000,
            clock_multiplier: 1.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Apu {
    powered: bool,
    /// Last written values of FF10-FF26.
    registers: Vec<u8>,
    square1: Square,
    square2: Square,
    wave: Wave,
    noise: Noise,
    sequencer_step: u8,
    sequencer_cycles: u32,
    /// Accumulates `cycles * sample_rate`; a sample is due every CLOCK_HZ.
    sample_phase: u64,
    #[serde(skip)]
    settings: AudioSettings,
    #[serde(skip)]
    samples: Vec<f32>,
    #[serde(skip)]
    overflowed: bool,
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

impl Apu {
    pub(crate) fn new() -> Self {
        let mut apu = Self {
            powered: true,
            registers: vec![0; REGISTER_COUNT],
            square1: Square::new(true),
            square2: Square::new(false),
            wave: Wave::new(),
            noise: Noise::new(),
            sequencer_step: 0,
            sequencer_cycles: 0,
            sample_phase: 0,
            settings: AudioSettings::default(),
            samples: Vec::new(),
            overflowed: false,
        };
        // Post-boot register values.
        for (addr, value) in [
            (0xFF24, 0x77),
            (0xFF25, 0xF3),
            (0xFF10, 0x80),
            (0xFF11, 0xBF),
            (0xFF12, 0xF3),
            (0xFF14, 0xBF),
            (0xFF16, 0x3F),
            (0xFF19, 0xBF),
            (0xFF1A, 0x7F),
            (0xFF1B, 0xFF),
            (0xFF1C, 0x9F),
            (0xFF1E, 0xBF),
            (0xFF20, 0xFF),
            (0xFF23, 0xBF),
        ] {
            apu.write_register(addr, value);
        }
        // The boot ROM's chime has finished by the time the game starts.
        apu.square1.enabled = false;
        apu.wave.enabled = false;
        apu.noise.enabled = false;
        apu
    }

    // --- host settings ---

    pub(crate) fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    pub(crate) fn restore_settings(&mut self, settings: AudioSettings) {
        self.settings = settings;
    }

    pub(crate) fn set_volume(&mut self, volume: f32) {
        self.settings.volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
    }

    pub(crate) fn set_channel_enabled(&mut self, channel: AudioChannel, enabled: bool) {
        self.settings.channels[channel.index()] = enabled;
    }

    pub(crate) fn set_mono(&mut self, mono: bool) {
        self.settings.mono = mono;
    }

    /// `multiplier` is already clamped by the caller.
    pub(crate) fn set_clock_multiplier(&mut self, multiplier: f32) {
        self.settings.clock_multiplier = multiplier;
    }

    pub(crate) fn set_sample_rate(&mut self, sample_rate: u32) {
        self.settings.sample_rate = sample_rate.clamp(1, CLOCK_HZ);
        self.sample_phase = 0;
        self.samples.clear();
        self.overflowed = false;
    }

    /// Take every buffered sample (interleaved left/right).
    pub(crate) fn drain_samples(&mut self) -> Vec<f32> {
        self.overflowed = false;
        std::mem::take(&mut self.samples)
    }

    // --- registers ---

    pub(crate) fn read_register(&self, addr: u16) -> u8 {
        match addr {
            0xFF26 => {
                let status = u8::from(self.square1.enabled)
                    | u8::from(self.square2.enabled) << 1
                    | u8::from(self.wave.enabled) << 2
                    | u8::from(self.noise.enabled) << 3;
                READ_MASKS[REGISTER_COUNT - 1] | u8::from(self.powered) << 7 | status
            }
            0xFF10..=0xFF25 => {
                let index = (addr - 0xFF10) as usize;
                self.registers[index] | READ_MASKS[index]
            }
            0xFF30..=0xFF3F => self.wave.ram[(addr - 0xFF30) as usize],
            _ => 0xFF,
        }
    }

    pub(crate) fn write_register(&mut self, addr: u16, value: u8) {
        match addr {
            0xFF26 => self.write_power(value & 0x80 != 0),
            0xFF30..=0xFF3F => self.wave.ram[(addr - 0xFF30) as usize] = value,
            0xFF10..=0xFF25 if self.powered => {
                self.registers[(addr - 0xFF10) as usize] = value;
                self.write_channel_register(addr, value);
            }
            _ => {}
        }
    }

    fn write_channel_register(&mut self, addr: u16, value: u8) {
        match addr {
            0xFF10 => self.square1.write_sweep(value),
            0xFF11 => self.square1.write_duty_length(value),
            0xFF12 => self.square1.write_envelope(value),
            0xFF13 => self.square1.write_frequency_low(value),
            0xFF14 => self.square1.write_frequency_high(value),
            0xFF16 => self.square2.write_duty_length(value),
            0xFF17 => self.square2.write_envelope(value),
            0xFF18 => self.square2.write_frequency_low(value),
            0xFF19 => self.square2.write_frequency_high(value),
            0xFF1A => self.wave.write_dac(value),
            0xFF1B => self.wave.length.load(value),
            0xFF1C => self.wave.write_level(value),
            0xFF1D => self.wave.write_frequency_low(value),
            0xFF1E => self.wave.write_frequency_high(value),
            0xFF20 => self.noise.write_length(value),
            0xFF21 => self.noise.write_envelope(value),
            0xFF22 => self.noise.write_polynomial(value),
            0xFF23 => self.noise.write_control(value),
            _ => {}
        }
    }

    fn write_power(&mut self, on: bool) {
        if self.powered && !on {
            // Wave RAM survives power-off.
            let wave_ram = self.wave.ram;
            self.registers.fill(0);
            self.square1 = Square::new(true);
            self.square2 = Square::new(false);
            self.wave = Wave::new();
            self.wave.ram = wave_ram;
            self.noise = Noise::new();
            log::debug!("GB APU: powered off");
        } else if !self.powered && on {
            self.sequencer_step = 0;
            self.sequencer_cycles = 0;
        }
        self.powered = on;
    }

    // --- timing ---

    /// Advance by `cycles` dots.
    pub(crate) fn tick(&mut self, cycles: u32) {
        let rate = self.settings.emulated_rate();
        let mut remaining = cycles;
        while remaining > 0 {
            let until_sample = (CLOCK_HZ as u64)
                .saturating_sub(self.sample_phase)
                .div_ceil(rate)
                .max(1);
            let until_sequencer = FRAME_SEQUENCER_PERIOD - self.sequencer_cycles;
            let step = remaining
                .min(until_sequencer)
                .min(until_sample.min(u32::MAX as u64) as u32);

            if self.powered {
                self.square1.advance(step);
                self.square2.advance(step);
                self.wave.advance(step);
                self.noise.advance(step);

                self.sequencer_cycles += step;
                if self.sequencer_cycles == FRAME_SEQUENCER_PERIOD {
                    self.sequencer_cycles = 0;
                    self.clock_sequencer();
                }
            }

            self.sample_phase += step as u64 * rate;
            if self.sample_phase >= CLOCK_HZ as u64 {
                self.sample_phase -= CLOCK_HZ as u64;
                self.push_sample();
            }
            remaining -= step;
        }
    }

    fn clock_sequencer(&mut self) {
        let step = self.sequencer_step;
        if step % 2 == 0 {
            self.square1.clock_length();
            self.square2.clock_length();
            self.wave.clock_length();
            self.noise.clock_length();
        }
        if step == 2 || step == 6 {
            self.square1.clock_sweep();
        }
        if step == 7 {
            self.square1.envelope.clock();
            self.square2.envelope.clock();
            self.noise.envelope.clock();
        }
        self.sequencer_step = (step + 1) & 7;
    }

    /// Analog level of each channel in `-1.0..=1.0`; 0 with the DAC off or
    /// the channel muted by the host.
    fn channel_levels(&self) -> [f32; 4] {
        let raw = [
            (self.square1.output(), self.square1.dac_enabled()),
            (self.square2.output(), self.square2.dac_enabled()),
            (self.wave.output(), self.wave.dac_enabled()),
            (self.noise.output(), self.noise.dac_enabled()),
        ];
        let mut levels = [0.0; 4];
        for (i, (digital, dac)) in raw.into_iter().enumerate() {
            if dac && self.settings.channels[i] {
                levels[i] = digital as f32 / 7.5 - 1.0;
            }
        }
        levels
    }

    fn mix(&self) -> (f32, f32) {
        if !self.powered {
            return (0.0, 0.0);
        }
        let nr50 = self.registers[0x14];
        let nr51 = self.registers[0x15];
        let levels = self.channel_levels();

        let mut left = 0.0;
        let mut right = 0.0;
        for (i, level) in levels.into_iter().enumerate() {
            if nr51 & (0x10 << i) != 0 {
                left += level;
            }
            if nr51 & (0x01 << i) != 0 {
                right += level;
            }
        }
        let left_volume = ((nr50 >> 4) & 0x07) as f32 + 1.0;
        let right_volume = (nr50 & 0x07) as f32 + 1.0;
        let scale = self.settings.volume / 4.0 / 8.0;
        (left * left_volume * scale, right * right_volume * scale)
    }

    fn push_sample(&mut self) {
        let capacity = (self.settings.sample_rate / BUFFER_SECONDS_DIVISOR).max(1) as usize * 2;
        if self.samples.len() + 2 > capacity {
            if !self.overflowed {
                log::warn!("GB APU: sample buffer full, dropping audio until drained");
                self.overflowed = true;
            }
            return;
        }
        let (left, right) = self.mix();
        if self.settings.mono {
            let mid = (left + right) / 2.0;
            self.samples.extend_from_slice(&[mid, mid]);
        } else {
            self.samples.extend_from_slice(&[left, right]);
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.registers.len() != REGISTER_COUNT {
            return Err(format!("APU register file is {} bytes", self.registers.len()));
        }
        if self.sequencer_cycles >= FRAME_SEQUENCER_PERIOD
            || self.sample_phase >= CLOCK_HZ as u64
        {
            return Err("APU sequencer position out of range".to_string());
        }
        if self.sequencer_step > 7 {
            return Err(format!("frame sequencer step {}", self.sequencer_step));
        }
        self.square1.validate(true)?;
        self.square2.validate(false)?;
        self.wave.validate()?;
        self.noise.validate()?;
        Ok(())
    }
}
