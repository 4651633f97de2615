use crate::config::{clamp_clock_multiplier, DmgPalettes, EmulatorConfig, ModelPreference};
use crate::cpu::Cpu;
use crate::error::Result;

use super::apu::{AudioChannel, AudioSettings};
use super::cartridge::{Cartridge, CartridgeInfo};
use super::joypad::Buttons;
use super::ppu::FrameBufferView;
use super::{state, GameBoyBus, GameBoyModel};

/// Dots in one frame: 154 lines of 456 dots.
pub(crate) const DOTS_PER_FRAME: u32 = 70_224;

/// Host settings stored inside devices that a reset or state load rebuilds.
struct HostSettings {
    audio: AudioSettings,
    serial_log: bool,
}

/// One complete Game Boy or Game Boy Color.
///
/// The value owns every piece of machine state; several instances can run
/// side by side. Drive it with [`GameBoy::run_frame`] at about 59.7 Hz.
pub struct GameBoy {
    pub(crate) cpu: Cpu,
    pub(crate) bus: GameBoyBus,
    palettes: DmgPalettes,
    clock_multiplier: f32,
    /// Emulated frames owed by [`GameBoy::run_scaled_frame`].
    frame_credit: f32,
}

impl GameBoy {
    /// Insert `rom` and power on.
    pub fn new(rom: &[u8], config: &EmulatorConfig) -> Result<Self> {
        let (cartridge, info) = Cartridge::load(rom)?;
        let model = match config.model {
            ModelPreference::Auto if info.supports_cgb() => GameBoyModel::Cgb,
            ModelPreference::Auto | ModelPreference::Dmg => GameBoyModel::Dmg,
            ModelPreference::Cgb => GameBoyModel::Cgb,
        };
        let cgb_mode = model == GameBoyModel::Cgb && info.supports_cgb();
        if info.cgb_only() && model == GameBoyModel::Dmg {
            log::warn!("GB: '{}' requires a Game Boy Color", info.title);
        }

        let mut gb = Self {
            cpu: Cpu::new(model),
            bus: GameBoyBus::new(cartridge, model, cgb_mode),
            palettes: config.dmg_palettes.clone(),
            clock_multiplier: 1.0,
            frame_credit: 0.0,
        };
        gb.apply_palettes();
        gb.set_clock_multiplier(config.clock_multiplier);
        gb.bus.apu.set_sample_rate(config.sample_rate);
        gb.bus.apu.set_volume(config.volume);
        gb.bus.apu.set_mono(config.mono_audio);
        for (channel, enabled) in AudioChannel::ALL.into_iter().zip(config.channels) {
            gb.bus.apu.set_channel_enabled(channel, enabled);
        }
        gb.bus.serial.log_output = config.serial_log;
        log::info!("GB: powered on as {model:?} (CGB mode: {cgb_mode})");
        Ok(gb)
    }

    /// Run until the PPU finishes a frame and return it.
    ///
    /// With the LCD off no frame ever completes; after one frame's worth of
    /// dots a blank screen is returned instead.
    pub fn run_frame(&mut self) -> FrameBufferView<'_> {
        self.bus.take_dots();
        let mut dots = 0u32;
        loop {
            self.cpu.step(&mut self.bus);
            if self.bus.ppu.take_frame() {
                break;
            }
            dots += self.bus.take_dots();
            if dots >= DOTS_PER_FRAME {
                if !self.bus.ppu.lcd_on() {
                    self.bus.ppu.present_blank();
                    break;
                }
                // LCD switched on mid-frame: finish within two frames.
                if dots >= 2 * DOTS_PER_FRAME {
                    break;
                }
            }
        }
        self.bus.ppu.front_buffer()
    }

    /// Run one host frame at the clock multiplier.
    ///
    /// Whole emulated frames are run as the multiplier accumulates, so at
    /// 0.25 only every fourth call advances the machine and at 2.5 calls
    /// alternate between two and three frames. Returns the latest frame.
    pub fn run_scaled_frame(&mut self) -> FrameBufferView<'_> {
        self.frame_credit += self.clock_multiplier;
        while self.frame_credit >= 1.0 {
            self.frame_credit -= 1.0;
            self.run_frame();
        }
        self.bus.ppu.front_buffer()
    }

    /// Emulated speed relative to real hardware, clamped to
    /// [`crate::config::CLOCK_MULTIPLIER_RANGE`]. Audio is resampled so the
    /// host keeps receiving its configured sample rate.
    pub fn set_clock_multiplier(&mut self, multiplier: f32) {
        self.clock_multiplier = clamp_clock_multiplier(multiplier);
        self.bus.apu.set_clock_multiplier(self.clock_multiplier);
    }

    pub fn clock_multiplier(&self) -> f32 {
        self.clock_multiplier
    }

    /// The most recently completed frame.
    pub fn frame(&self) -> FrameBufferView<'_> {
        self.bus.ppu.front_buffer()
    }

    /// Power-cycle the machine. The cartridge and its RAM stay in place.
    pub fn reset(&mut self) {
        let settings = self.host_settings();
        let model = self.bus.model();
        let cgb_mode = self.bus.cgb_mode();
        let mut cartridge = self.bus.cartridge.detach();
        cartridge.reset_mapper();

        self.cpu = Cpu::new(model);
        self.bus = GameBoyBus::new(cartridge, model, cgb_mode);
        self.apply_host_settings(settings);
        log::info!("GB: reset");
    }

    /// Snapshot the whole machine.
    pub fn save_state(&self) -> Result<Vec<u8>> {
        let bytes = state::encode(&self.cpu, &self.bus)?;
        log::info!("GB: state saved ({} bytes)", bytes.len());
        Ok(bytes)
    }

    /// Restore a snapshot from [`GameBoy::save_state`].
    ///
    /// On error the running machine is left exactly as it was.
    pub fn load_state(&mut self, bytes: &[u8]) -> Result<()> {
        let (cpu, mut bus) = state::decode(bytes, &self.bus)?;
        let settings = self.host_settings();
        bus.cartridge.take_rom_from(&mut self.bus.cartridge);
        bus.serial.output = std::mem::take(&mut self.bus.serial.output);

        self.cpu = cpu;
        self.bus = bus;
        self.apply_host_settings(settings);
        log::info!("GB: state loaded");
        Ok(())
    }

    fn host_settings(&self) -> HostSettings {
        HostSettings {
            audio: self.bus.apu.settings().clone(),
            serial_log: self.bus.serial.log_output,
        }
    }

    fn apply_host_settings(&mut self, settings: HostSettings) {
        self.apply_palettes();
        self.bus.apu.restore_settings(settings.audio);
        self.bus.serial.log_output = settings.serial_log;
    }

    fn apply_palettes(&mut self) {
        self.bus.ppu.set_dmg_palettes(self.palettes.resolved());
    }

    /// Replace the set of held buttons.
    pub fn set_input(&mut self, buttons: Buttons) {
        if self.bus.joypad.set_input(buttons, &mut self.bus.interrupts) {
            self.cpu.wake();
        }
    }

    /// Buttons currently held.
    pub fn input(&self) -> Buttons {
        self.bus.joypad.pressed()
    }

    /// Drain the interleaved stereo sample buffer.
    pub fn audio_samples(&mut self) -> Vec<f32> {
        self.bus.apu.drain_samples()
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.bus.apu.set_volume(volume);
    }

    pub fn set_channel_enabled(&mut self, channel: AudioChannel, enabled: bool) {
        self.bus.apu.set_channel_enabled(channel, enabled);
    }

    pub fn set_mono_audio(&mut self, mono: bool) {
        self.bus.apu.set_mono(mono);
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.bus.apu.set_sample_rate(sample_rate);
    }

    pub fn sample_rate(&self) -> u32 {
        self.bus.apu.settings().sample_rate
    }

    /// Colours for DMG output. CGB-mode games use palette RAM instead.
    pub fn set_dmg_palettes(&mut self, palettes: DmgPalettes) {
        self.palettes = palettes;
        self.apply_palettes();
    }

    pub fn dmg_palettes(&self) -> &DmgPalettes {
        &self.palettes
    }

    pub fn cartridge_info(&self) -> &CartridgeInfo {
        self.bus.cartridge.info()
    }

    /// Battery-backed cartridge RAM, for writing a `.sav` file.
    pub fn cartridge_ram(&self) -> Option<&[u8]> {
        self.bus.cartridge.battery_ram()
    }

    pub fn load_cartridge_ram(&mut self, bytes: &[u8]) {
        self.bus.cartridge.load_battery_ram(bytes);
    }

    /// Every byte sent over the serial port so far.
    pub fn serial_output(&self) -> &[u8] {
        &self.bus.serial.output
    }

    pub fn model(&self) -> GameBoyModel {
        self.bus.model()
    }

    /// True when CGB features are active for the inserted cartridge.
    pub fn cgb_mode(&self) -> bool {
        self.bus.cgb_mode()
    }

    pub fn double_speed(&self) -> bool {
        self.bus.double_speed()
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }
}
