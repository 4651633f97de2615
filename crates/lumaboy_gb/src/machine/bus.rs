//! The system bus: address decoding plus the clock fan-out that runs every
//! peripheral for the cycles an instruction took.

mod dma;
mod read;
mod traits;
mod write;

use serde::{Deserialize, Serialize};

use super::apu::Apu;
use super::cartridge::Cartridge;
use super::interrupts::{InterruptFlags, Interrupts};
use super::joypad::Joypad;
use super::ppu::Ppu;
use super::serial::Serial;
use super::timer::Timer;
use super::GameBoyModel;
use dma::Hdma;

const WRAM_BANK_SIZE: usize = 0x1000;
const WRAM_BANKS: usize = 8;
pub(crate) const HRAM_SIZE: usize = 0x7F;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct GameBoyBus {
    pub(crate) cartridge: Cartridge,
    wram: Vec<u8>,
    /// SVBK; 0 selects bank 1.
    wram_bank: u8,
    hram: Vec<u8>,
    pub(crate) interrupts: Interrupts,
    pub(crate) timer: Timer,
    pub(crate) ppu: Ppu,
    pub(crate) apu: Apu,
    pub(crate) joypad: Joypad,
    pub(crate) serial: Serial,
    hdma: Hdma,
    /// Last value written to FF46.
    dma_source: u8,
    model: GameBoyModel,
    /// CGB hardware running a CGB-aware cartridge.
    cgb_mode: bool,
    double_speed: bool,
    /// KEY1 bit 0.
    speed_armed: bool,
    /// Odd CPU cycle left over in double-speed mode.
    half_cycle: bool,
    /// CPU cycles to idle after the current instruction (general HDMA).
    stall_cycles: u32,
    /// Dots elapsed since the scheduler last asked.
    #[serde(skip)]
    dots: u32,
}

impl GameBoyBus {
    pub(crate) fn new(cartridge: Cartridge, model: GameBoyModel, cgb_mode: bool) -> Self {
        let mut interrupts = Interrupts::default();
        // The boot ROM leaves V-blank requested.
        interrupts.request = InterruptFlags::VBLANK;
        Self {
            cartridge,
            wram: vec![0; WRAM_BANKS * WRAM_BANK_SIZE],
            wram_bank: 1,
            hram: vec![0; HRAM_SIZE],
            interrupts,
            timer: Timer::new(model),
            ppu: Ppu::new(cgb_mode),
            apu: Apu::new(),
            joypad: Joypad::default(),
            serial: Serial::default(),
            hdma: Hdma::default(),
            dma_source: 0xFF,
            model,
            cgb_mode,
            double_speed: false,
            speed_armed: false,
            half_cycle: false,
            stall_cycles: 0,
            dots: 0,
        }
    }

    pub(crate) fn model(&self) -> GameBoyModel {
        self.model
    }

    pub(crate) fn cgb_mode(&self) -> bool {
        self.cgb_mode
    }

    pub(crate) fn double_speed(&self) -> bool {
        self.double_speed
    }

    /// Dots elapsed since the previous call.
    pub(crate) fn take_dots(&mut self) -> u32 {
        std::mem::take(&mut self.dots)
    }

    /// Run every peripheral for `cycles` CPU cycles.
    ///
    /// Timer and serial follow the CPU clock. The PPU, APU and cartridge
    /// clock follow the dot clock, which is half the CPU clock in double
    /// speed.
    fn advance(&mut self, cycles: u32) {
        self.timer.tick(cycles, &mut self.interrupts);
        self.serial.tick(cycles, &mut self.interrupts);

        let dots = if self.double_speed {
            let total = cycles + u32::from(self.half_cycle);
            self.half_cycle = total & 1 != 0;
            total / 2
        } else {
            cycles
        };
        if dots == 0 {
            return;
        }
        self.dots += dots;

        let hblanks = self.ppu.tick(dots, &mut self.interrupts);
        self.apu.tick(dots);
        self.cartridge.tick(dots);
        for _ in 0..hblanks {
            self.hdma_hblank_block();
        }
    }

    #[inline]
    fn wram_index(&self, addr: u16) -> usize {
        let offset = addr as usize & (WRAM_BANK_SIZE - 1);
        if addr & 0x1000 == 0 {
            offset
        } else {
            let bank = self.wram_bank.max(1) as usize;
            bank * WRAM_BANK_SIZE + offset
        }
    }

    /// Check region sizes after a state load.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.wram.len() != WRAM_BANKS * WRAM_BANK_SIZE {
            return Err(format!("WRAM is {} bytes", self.wram.len()));
        }
        if self.hram.len() != HRAM_SIZE {
            return Err(format!("HRAM is {} bytes", self.hram.len()));
        }
        if self.wram_bank as usize >= WRAM_BANKS {
            return Err(format!("WRAM bank {} out of range", self.wram_bank));
        }
        if self.stall_cycles != 0 {
            return Err(format!("{} stall cycles pending", self.stall_cycles));
        }
        self.hdma.validate()?;
        self.ppu.validate()?;
        self.apu.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::machine::tests::{assert_tampered_state_rejected, TestRom, IDLE};

    #[test]
    fn echo_ram_follows_the_selected_wram_bank() {
        let mut gb = TestRom::new(IDLE).cgb().boot();
        let bus = &mut gb.bus;
        bus.write8_mmio(0xFF70, 1);
        bus.write8_mmio(0xD123, 0x11);
        bus.write8_mmio(0xFF70, 2);
        assert_eq!(bus.read8_mmio(0xFF70), 0xFA);
        bus.write8_mmio(0xF123, 0x5A);
        assert_eq!(bus.read8_mmio(0xD123), 0x5A);
        bus.write8_mmio(0xFF70, 1);
        assert_eq!(bus.read8_mmio(0xF123), 0x11);

        bus.write8_mmio(0xFEA0, 0x12);
        assert_eq!(bus.read8_mmio(0xFEA0), 0xFF);
    }

    #[test]
    fn state_with_out_of_range_wram_bank_is_rejected() {
        assert_tampered_state_rejected(&TestRom::new(IDLE).cgb(), |gb| gb.bus.wram_bank = 8);
    }

    #[test]
    fn state_with_pending_stall_is_rejected() {
        assert_tampered_state_rejected(&TestRom::new(IDLE).cgb(), |gb| {
            gb.bus.stall_cycles = u32::MAX;
        });
    }
}
