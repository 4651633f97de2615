use serde::{Deserialize, Serialize};

use super::GameBoyBus;
use crate::machine::ppu::OAM_SIZE;

const HDMA_BLOCK: u16 = 0x10;
/// Dots the CPU is held per 16-byte block.
const HDMA_BLOCK_DOTS: u32 = 32;

/// CGB VRAM DMA (FF51-FF55).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct Hdma {
    source: u16,
    dest: u16,
    /// Blocks left minus one, as FF55 reports it.
    length: u8,
    /// An H-blank transfer is in progress.
    active: bool,
}

impl Default for Hdma {
    fn default() -> Self {
        Self {
            source: 0,
            dest: 0,
            length: 0x7F,
            active: false,
        }
    }
}

impl Hdma {
    pub(super) fn read(&self, addr: u16) -> u8 {
        match addr {
            // Bit 7 clear while an H-blank transfer is running.
            0xFF55 => u8::from(!self.active) << 7 | self.length,
            _ => 0xFF,
        }
    }

    pub(super) fn validate(&self) -> Result<(), String> {
        if self.source & 0x000F != 0 || self.dest & !0x1FF0 != 0 || self.length > 0x7F {
            return Err(format!(
                "HDMA {:#06X} -> {:#06X} length {:#04X}",
                self.source, self.dest, self.length
            ));
        }
        Ok(())
    }
}

impl GameBoyBus {
    /// OAM DMA: copy XX00-XX9F into OAM.
    ///
    /// The copy completes at once; games wait out the transfer from HRAM
    /// either way.
    pub(super) fn oam_dma(&mut self, value: u8) {
        self.dma_source = value;
        let base = (value as u16) << 8;
        for i in 0..OAM_SIZE {
            let byte = self.dma_read(base.wrapping_add(i as u16));
            self.ppu.write_oam_direct(i, byte);
        }
    }

    /// Source read for DMA: not subject to PPU access blocking.
    fn dma_read(&self, addr: u16) -> u8 {
        match addr {
            0x8000..=0x9FFF => self.ppu.read_vram_direct(addr),
            // E000-FFFF sources alias WRAM.
            0xE000..=0xFFFF => self.wram[self.wram_index(addr - 0x2000)],
            _ => self.read8_mmio(addr),
        }
    }

    pub(super) fn write_hdma(&mut self, addr: u16, value: u8) {
        let hdma = &mut self.hdma;
        match addr {
            0xFF51 => hdma.source = (hdma.source & 0x00FF) | (value as u16) << 8,
            0xFF52 => hdma.source = (hdma.source & 0xFF00) | (value & 0xF0) as u16,
            0xFF53 => hdma.dest = (hdma.dest & 0x00FF) | ((value & 0x1F) as u16) << 8,
            0xFF54 => hdma.dest = (hdma.dest & 0xFF00) | (value & 0xF0) as u16,
            0xFF55 => self.start_hdma(value),
            _ => {}
        }
    }

    fn start_hdma(&mut self, value: u8) {
        let length = value & 0x7F;
        if self.hdma.active && value & 0x80 == 0 {
            // Cancel the running H-blank transfer.
            self.hdma.active = false;
            log::debug!("GB HDMA: H-blank transfer cancelled");
            return;
        }

        self.hdma.length = length;
        if value & 0x80 == 0 {
            let blocks = length as u32 + 1;
            for _ in 0..blocks {
                self.hdma_copy_block();
            }
            self.hdma.length = 0x7F;
            let dots = blocks * HDMA_BLOCK_DOTS;
            self.stall_cycles += if self.double_speed { dots * 2 } else { dots };
            log::debug!("GB HDMA: general transfer of {} bytes", blocks * 16);
        } else {
            self.hdma.active = true;
            // With the LCD off no H-blank arrives; one block goes at once.
            if !self.ppu.lcd_on() {
                self.hdma_hblank_block();
            }
        }
    }

    /// Move one block of a running H-blank transfer.
    pub(super) fn hdma_hblank_block(&mut self) {
        if !self.hdma.active {
            return;
        }
        self.hdma_copy_block();
        self.stall_cycles += if self.double_speed {
            HDMA_BLOCK_DOTS * 2
        } else {
            HDMA_BLOCK_DOTS
        };
        if self.hdma.length == 0 {
            self.hdma.length = 0x7F;
            self.hdma.active = false;
        } else {
            self.hdma.length -= 1;
        }
    }

    fn hdma_copy_block(&mut self) {
        for i in 0..HDMA_BLOCK {
            let byte = self.dma_read(self.hdma.source.wrapping_add(i));
            let dest = 0x8000 | (self.hdma.dest.wrapping_add(i) & 0x1FFF);
            self.ppu.write_vram_direct(dest, byte);
        }
        self.hdma.source = self.hdma.source.wrapping_add(HDMA_BLOCK);
        self.hdma.dest = self.hdma.dest.wrapping_add(HDMA_BLOCK) & 0x1FF0;
    }
}

#[cfg(test)]
mod tests {
    use crate::machine::tests::{assert_tampered_state_rejected, TestRom, IDLE};

    #[test]
    fn state_with_hdma_destination_outside_vram_is_rejected() {
        assert_tampered_state_rejected(&TestRom::new(IDLE).cgb(), |gb| {
            gb.bus.hdma.dest = 0xFFF8;
        });
    }

    #[test]
    fn state_with_oversized_hdma_length_is_rejected() {
        assert_tampered_state_rejected(&TestRom::new(IDLE).cgb(), |gb| {
            gb.bus.hdma.length = 0x80;
        });
    }
}
