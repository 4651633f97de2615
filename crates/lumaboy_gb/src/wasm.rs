use js_sys::Uint8Array;
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use web_sys::{CanvasRenderingContext2d, ImageData};

use lumaboy_common::Color;

use crate::config::PaletteLayer;
use crate::host::Host;
use crate::{AudioChannel, Buttons, Error, SCREEN_HEIGHT, SCREEN_WIDTH};

fn js_error(err: Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Channels are numbered 1-4 from JavaScript, square 1 first.
fn audio_channel(number: u8) -> Option<AudioChannel> {
    AudioChannel::ALL.get(usize::from(number).checked_sub(1)?).copied()
}

/// Four RGB triples, lightest shade first.
fn palette_from_rgb(data: &[u8]) -> Option<[Color; 4]> {
    let rgb: &[u8; 12] = data.try_into().ok()?;
    Some(std::array::from_fn(|i| {
        Color::new_rgb(rgb[i * 3], rgb[i * 3 + 1], rgb[i * 3 + 2])
    }))
}

/// Browser handle for one emulator instance.
#[wasm_bindgen]
pub struct GbWasm {
    host: Host,
    rgba: Vec<u8>,
}

impl Default for GbWasm {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl GbWasm {
    #[wasm_bindgen(constructor)]
    pub fn new() -> GbWasm {
        GbWasm {
            host: Host::default(),
            rgba: vec![0xFF; SCREEN_WIDTH * SCREEN_HEIGHT * 4],
        }
    }

    pub fn initialize(&mut self) {
        self.host.initialize();
    }

    /// Returns the cartridge title.
    pub fn load_rom(&mut self, rom: Uint8Array) -> Result<String, JsValue> {
        let info = self.host.load_rom(&rom.to_vec()).map_err(js_error)?;
        Ok(info.title)
    }

    /// Run one frame and return it as RGBA bytes.
    pub fn run_frame(&mut self) -> Result<Vec<u8>, JsValue> {
        self.rgba = self.host.run_frame().map_err(js_error)?.to_rgba();
        Ok(self.rgba.clone())
    }

    /// Blit the last frame at an integer scale.
    pub fn draw(&self, ctx: &CanvasRenderingContext2d, scale: u32) -> Result<(), JsValue> {
        let scale = scale.max(1) as usize;
        let width = SCREEN_WIDTH * scale;
        let mut scaled = vec![0u8; width * SCREEN_HEIGHT * scale * 4];
        for (y, row) in scaled.chunks_exact_mut(width * 4).enumerate() {
            let src_row = (y / scale) * SCREEN_WIDTH;
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let src = (src_row + x / scale) * 4;
                px.copy_from_slice(&self.rgba[src..src + 4]);
            }
        }
        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(scaled.as_slice()),
            width as u32,
            (SCREEN_HEIGHT * scale) as u32,
        )?;
        ctx.put_image_data(&image, 0.0, 0.0)
    }

    /// Interleaved stereo samples produced since the last call.
    pub fn audio_samples(&mut self) -> Result<Vec<f32>, JsValue> {
        self.host.audio_samples().map_err(js_error)
    }

    pub fn sample_rate(&self) -> Result<u32, JsValue> {
        Ok(self.host.machine().map_err(js_error)?.sample_rate())
    }

    pub fn save_state(&self) -> Result<Vec<u8>, JsValue> {
        self.host.save_state().map_err(js_error)
    }

    pub fn load_state(&mut self, state: Uint8Array) -> Result<(), JsValue> {
        self.host.load_state(&state.to_vec()).map_err(js_error)
    }

    /// `mask` uses the `Buttons` bit layout: Right, Left, Up, Down, A, B,
    /// Select, Start from bit 0.
    pub fn set_input(&mut self, mask: u8) -> Result<(), JsValue> {
        self.host
            .set_input(Buttons::from_bits_truncate(mask))
            .map_err(js_error)
    }

    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.host.reset().map_err(js_error)
    }

    pub fn set_volume(&mut self, volume: f32) -> Result<(), JsValue> {
        self.host.set_volume(volume).map_err(js_error)
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), JsValue> {
        self.host.set_sample_rate(sample_rate).map_err(js_error)
    }

    /// `channel` is 1-4: square 1, square 2, wave, noise.
    pub fn set_channel_enabled(&mut self, channel: u8, enabled: bool) -> Result<(), JsValue> {
        let channel = audio_channel(channel)
            .ok_or_else(|| JsValue::from_str(&format!("no sound channel {channel}")))?;
        self.host
            .set_channel_enabled(channel, enabled)
            .map_err(js_error)
    }

    pub fn set_mono_audio(&mut self, mono: bool) -> Result<(), JsValue> {
        self.host.set_mono_audio(mono).map_err(js_error)
    }

    /// `index` 0 is the background, 1 OBJ0 and 2 OBJ1; `data` holds four
    /// RGB triples, lightest first.
    pub fn set_custom_palette(&mut self, index: u8, data: &[u8]) -> Result<(), JsValue> {
        let layer = PaletteLayer::from_index(index)
            .ok_or_else(|| JsValue::from_str(&format!("no palette slot {index}")))?;
        let palette = palette_from_rgb(data)
            .ok_or_else(|| JsValue::from_str("a palette is 12 bytes of RGB"))?;
        self.host
            .set_custom_palette(layer, palette)
            .map_err(js_error)
    }

    pub fn use_individual_palettes(&mut self, individual: bool) -> Result<(), JsValue> {
        self.host.use_individual_palettes(individual).map_err(js_error)
    }

    pub fn prefer_dmg_colors(&mut self, prefer: bool) -> Result<(), JsValue> {
        self.host.prefer_dmg_colors(prefer).map_err(js_error)
    }

    /// Emulated speed from 0.25 to 4.
    pub fn set_clock_multiplier(&mut self, multiplier: f32) -> Result<(), JsValue> {
        self.host.set_clock_multiplier(multiplier).map_err(js_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_numbers_start_at_one() {
        assert_eq!(audio_channel(0), None);
        assert_eq!(audio_channel(1), Some(AudioChannel::Square1));
        assert_eq!(audio_channel(4), Some(AudioChannel::Noise));
        assert_eq!(audio_channel(5), None);
    }

    #[test]
    fn palettes_are_twelve_rgb_bytes() {
        let data = [255, 255, 255, 170, 170, 170, 85, 85, 85, 0, 0, 1];
        let palette = palette_from_rgb(&data).unwrap();
        assert_eq!(palette[0], Color::WHITE);
        assert_eq!(palette[3], Color::new_rgb(0, 0, 1));
        assert_eq!(palette_from_rgb(&data[..9]), None);
    }

    #[test]
    fn settings_reach_the_machine() {
        let mut gb = GbWasm::new();
        gb.initialize();
        gb.host.load_rom(&vec![0; 0x8000]).unwrap();

        gb.set_channel_enabled(3, false).unwrap();
        gb.set_mono_audio(true).unwrap();
        gb.set_custom_palette(2, &[0; 12]).unwrap();
        gb.use_individual_palettes(true).unwrap();
        gb.prefer_dmg_colors(false).unwrap();
        gb.set_clock_multiplier(1.5).unwrap();

        let machine = gb.host.machine().unwrap();
        assert_eq!(machine.bus.apu.settings().channels, [true, true, false, true]);
        assert!(machine.bus.apu.settings().mono);
        assert_eq!(machine.dmg_palettes().resolved()[2], [Color::BLACK; 4]);
        assert_eq!(machine.clock_multiplier(), 1.5);
    }
}
