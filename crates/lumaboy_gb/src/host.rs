//! The embedder contract: initialize, load a ROM, then run frames.
//!
//! [`Host`] is what the WebAssembly export and other thin shells talk to.
//! It turns "no machine yet" into [`Error::NotInitialized`] instead of
//! making every caller juggle an `Option<GameBoy>`.

use lumaboy_common::Color;

use crate::config::{clamp_clock_multiplier, EmulatorConfig, PaletteLayer};
use crate::error::{Error, Result};
use crate::machine::{AudioChannel, Buttons, CartridgeInfo, FrameBufferView, GameBoy};

pub struct Host {
    config: EmulatorConfig,
    initialized: bool,
    machine: Option<GameBoy>,
}

impl Default for Host {
    fn default() -> Self {
        Self::new(EmulatorConfig::default())
    }
}

impl Host {
    pub fn new(config: EmulatorConfig) -> Self {
        Self {
            config,
            initialized: false,
            machine: None,
        }
    }

    /// Bring the core up. Any inserted cartridge is dropped.
    pub fn initialize(&mut self) {
        self.machine = None;
        self.initialized = true;
        log::info!("GB host: initialized");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Insert a cartridge and power on.
    ///
    /// A rejected image leaves any previously loaded machine running.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<CartridgeInfo> {
        self.ensure_initialized()?;
        let gb = GameBoy::new(rom, &self.config)?;
        let info = gb.cartridge_info().clone();
        self.machine = Some(gb);
        Ok(info)
    }

    /// Run one host frame; the clock multiplier decides how many emulated
    /// frames that is.
    pub fn run_frame(&mut self) -> Result<FrameBufferView<'_>> {
        Ok(self.machine_mut()?.run_scaled_frame())
    }

    /// Drain buffered audio. Empty until a cartridge is loaded.
    pub fn audio_samples(&mut self) -> Result<Vec<f32>> {
        self.ensure_initialized()?;
        Ok(self
            .machine
            .as_mut()
            .map(GameBoy::audio_samples)
            .unwrap_or_default())
    }

    pub fn save_state(&self) -> Result<Vec<u8>> {
        self.machine()?.save_state()
    }

    pub fn load_state(&mut self, bytes: &[u8]) -> Result<()> {
        self.machine_mut()?.load_state(bytes)
    }

    pub fn set_input(&mut self, buttons: Buttons) -> Result<()> {
        self.machine_mut()?.set_input(buttons);
        Ok(())
    }

    pub fn reset(&mut self) -> Result<()> {
        self.machine_mut()?.reset();
        Ok(())
    }

    /// Master volume; applies now and to later cartridges.
    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.ensure_initialized()?;
        self.config.volume = volume;
        if let Some(gb) = self.machine.as_mut() {
            gb.set_volume(volume);
        }
        Ok(())
    }

    /// Output sample rate; applies now and to later cartridges.
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<()> {
        self.ensure_initialized()?;
        self.config.sample_rate = sample_rate;
        if let Some(gb) = self.machine.as_mut() {
            gb.set_sample_rate(sample_rate);
        }
        Ok(())
    }

    pub fn set_channel_enabled(&mut self, channel: AudioChannel, enabled: bool) -> Result<()> {
        self.ensure_initialized()?;
        self.config.channels[channel as usize] = enabled;
        if let Some(gb) = self.machine.as_mut() {
            gb.set_channel_enabled(channel, enabled);
        }
        Ok(())
    }

    pub fn set_mono_audio(&mut self, mono: bool) -> Result<()> {
        self.ensure_initialized()?;
        self.config.mono_audio = mono;
        if let Some(gb) = self.machine.as_mut() {
            gb.set_mono_audio(mono);
        }
        Ok(())
    }

    /// Custom DMG shades for one layer, lightest first.
    pub fn set_custom_palette(&mut self, layer: PaletteLayer, palette: [Color; 4]) -> Result<()> {
        self.ensure_initialized()?;
        self.config.dmg_palettes.set_custom(layer, palette);
        self.push_palettes();
        Ok(())
    }

    /// Let OBJ0 and OBJ1 use their own custom palettes.
    pub fn use_individual_palettes(&mut self, individual: bool) -> Result<()> {
        self.ensure_initialized()?;
        self.config.dmg_palettes.individual = individual;
        self.push_palettes();
        Ok(())
    }

    /// Draw DMG games in the classic green shades, ignoring custom palettes.
    pub fn prefer_dmg_colors(&mut self, prefer: bool) -> Result<()> {
        self.ensure_initialized()?;
        self.config.dmg_palettes.prefer_dmg_colors = prefer;
        self.push_palettes();
        Ok(())
    }

    /// Emulated speed, clamped to `0.25..=4.0`.
    pub fn set_clock_multiplier(&mut self, multiplier: f32) -> Result<()> {
        self.ensure_initialized()?;
        self.config.clock_multiplier = clamp_clock_multiplier(multiplier);
        if let Some(gb) = self.machine.as_mut() {
            gb.set_clock_multiplier(multiplier);
        }
        Ok(())
    }

    fn push_palettes(&mut self) {
        if let Some(gb) = self.machine.as_mut() {
            gb.set_dmg_palettes(self.config.dmg_palettes.clone());
        }
    }

    pub fn machine(&self) -> Result<&GameBoy> {
        self.machine.as_ref().ok_or(Error::NotInitialized)
    }

    pub fn machine_mut(&mut self) -> Result<&mut GameBoy> {
        self.machine.as_mut().ok_or(Error::NotInitialized)
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }
}
