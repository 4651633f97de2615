use lumaboy_common::Color;
use typed_builder::TypedBuilder;

/// Which hardware to emulate for the inserted cartridge.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum ModelPreference {
    /// Follow the CGB flag in the cartridge header (0x0143).
    #[default]
    Auto,
    /// Always run as an original Game Boy, even for CGB-enhanced cartridges.
    Dmg,
    /// Run as a Game Boy Color. CGB-only features stay disabled for
    /// cartridges without the CGB flag.
    Cgb,
}

/// The four shades used for DMG output, lightest first.
///
/// These are the greenish tones of the classic handheld screen.
pub const DEFAULT_DMG_PALETTE: [Color; 4] = [
    Color::new_rgb(175, 203, 70),
    Color::new_rgb(121, 170, 109),
    Color::new_rgb(34, 111, 95),
    Color::new_rgb(8, 41, 85),
];

/// A DMG drawing layer with its own palette slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PaletteLayer {
    /// Background and window.
    Background = 0,
    Object0 = 1,
    Object1 = 2,
}

impl PaletteLayer {
    pub const ALL: [PaletteLayer; 3] = [
        PaletteLayer::Background,
        PaletteLayer::Object0,
        PaletteLayer::Object1,
    ];

    /// Slot number as used by embedders: 0 background, 1 OBJ0, 2 OBJ1.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

/// Colours for DMG output.
///
/// Each layer has a custom palette; by default the objects share the
/// background one. `prefer_dmg_colors` overrides all of them with
/// [`DEFAULT_DMG_PALETTE`].
#[derive(Clone, Debug, PartialEq)]
pub struct DmgPalettes {
    pub custom: [[Color; 4]; 3],
    /// Give OBJ0 and OBJ1 their own custom palettes.
    pub individual: bool,
    pub prefer_dmg_colors: bool,
}

impl Default for DmgPalettes {
    fn default() -> Self {
        Self::uniform(DEFAULT_DMG_PALETTE)
    }
}

impl DmgPalettes {
    /// Every layer drawn with `palette`.
    pub fn uniform(palette: [Color; 4]) -> Self {
        Self {
            custom: [palette; 3],
            individual: false,
            prefer_dmg_colors: false,
        }
    }

    pub fn set_custom(&mut self, layer: PaletteLayer, palette: [Color; 4]) {
        self.custom[layer as usize] = palette;
    }

    /// The shades each layer is drawn with, indexed by [`PaletteLayer`].
    pub fn resolved(&self) -> [[Color; 4]; 3] {
        if self.prefer_dmg_colors {
            [DEFAULT_DMG_PALETTE; 3]
        } else if self.individual {
            self.custom
        } else {
            [self.custom[0]; 3]
        }
    }
}

/// Emulated speed bounds for [`EmulatorConfig::clock_multiplier`].
pub const CLOCK_MULTIPLIER_RANGE: std::ops::RangeInclusive<f32> = 0.25..=4.0;

/// Clamp a requested speed into [`CLOCK_MULTIPLIER_RANGE`]; NaN means 1.
pub fn clamp_clock_multiplier(multiplier: f32) -> f32 {
    if multiplier.is_nan() {
        1.0
    } else {
        multiplier.clamp(*CLOCK_MULTIPLIER_RANGE.start(), *CLOCK_MULTIPLIER_RANGE.end())
    }
}

/// Construction-time settings for a [`crate::GameBoy`].
///
/// ```
/// use lumaboy_gb::{EmulatorConfig, ModelPreference};
///
/// let config = EmulatorConfig::builder()
///     .model(ModelPreference::Dmg)
///     .sample_rate(44_100)
///     .build();
/// assert_eq!(config.sample_rate, 44_100);
/// ```
#[derive(TypedBuilder, Clone, Debug, PartialEq)]
pub struct EmulatorConfig {
    #[builder(default)]
    pub model: ModelPreference,
    /// Output sample rate of the audio buffer, in Hz.
    #[builder(default = 48_000)]
    pub sample_rate: u32,
    /// Master output volume in `0.0..=1.0`.
    #[builder(default = 1.0)]
    pub volume: f32,
    /// Mix both output terminals into the same signal.
    #[builder(default = false)]
    pub mono_audio: bool,
    /// Per-channel output switches, square 1 first.
    #[builder(default = [true; 4])]
    pub channels: [bool; 4],
    #[builder(default)]
    pub dmg_palettes: DmgPalettes,
    /// Emulated speed relative to real hardware, see
    /// [`CLOCK_MULTIPLIER_RANGE`].
    #[builder(default = 1.0)]
    pub clock_multiplier: f32,
    /// Log every byte sent over the serial port at `info` level.
    #[builder(default = false)]
    pub serial_log: bool,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
