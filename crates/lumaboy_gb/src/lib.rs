//! Game Boy / Game Boy Color emulator core.
//!
//! [`GameBoy`] owns one complete machine and is driven one frame at a time
//! with [`GameBoy::run_frame`]. [`host::Host`] layers the initialize /
//! load / run contract used by embedders (the SDL2 frontend and the
//! WebAssembly export) on top of it.

pub mod app;
pub mod config;
pub mod cpu;
mod error;
pub mod host;
pub mod machine;
#[cfg(feature = "wasm")]
pub mod wasm;

pub use app::GameBoyApp;
pub use config::{DmgPalettes, EmulatorConfig, ModelPreference, PaletteLayer};
pub use error::{Error, Result};
pub use machine::{
    AudioChannel, Buttons, CartridgeInfo, FrameBufferView, GameBoy, GameBoyModel, Interrupt,
    MbcKind,
};

/// Logical screen width in pixels.
pub const SCREEN_WIDTH: usize = 160;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: usize = 144;
/// Default integer scaling factor for the SDL frontend.
pub const SCREEN_SCALE: u32 = 4;
/// Master clock in T-cycles per second (single speed).
pub const CLOCK_HZ: u32 = 4_194_304;
