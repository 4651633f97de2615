mod apu;
mod bus;
mod cartridge;
mod gameboy;
pub mod interrupts;
pub(crate) mod joypad;
mod ppu;
mod serial;
mod state;
mod timer;

use serde::{Deserialize, Serialize};

pub use apu::AudioChannel;
pub(crate) use bus::GameBoyBus;
pub use cartridge::{CartridgeInfo, MbcKind};
pub use gameboy::GameBoy;
pub use interrupts::Interrupt;
pub use joypad::Buttons;
pub use ppu::FrameBufferView;

/// Hardware being emulated.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default, Serialize, Deserialize)]
pub enum GameBoyModel {
    #[default]
    Dmg,
    Cgb,
}

#[cfg(test)]
mod tests;
