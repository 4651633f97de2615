use super::GameBoyBus;

impl GameBoyBus {
    pub(super) fn write8_mmio(&mut self, addr: u16, value: u8) {
        match addr {
            // ROM area writes are MBC commands.
            0x0000..=0x7FFF => self.cartridge.write_rom(addr, value),
            0x8000..=0x9FFF => self.ppu.write_vram(addr, value),
            0xA000..=0xBFFF => self.cartridge.write_ram(addr, value),
            0xC000..=0xDFFF => {
                let index = self.wram_index(addr);
                self.wram[index] = value;
            }
            0xE000..=0xFDFF => {
                let index = self.wram_index(addr - 0x2000);
                self.wram[index] = value;
            }
            0xFE00..=0xFE9F => self.ppu.write_oam(addr, value),
            0xFEA0..=0xFEFF => {}
            0xFF00..=0xFF7F => self.write_io(addr, value),
            0xFF80..=0xFFFE => self.hram[(addr - 0xFF80) as usize] = value,
            0xFFFF => self.interrupts.write_ie(value),
        }
    }

    fn write_io(&mut self, addr: u16, value: u8) {
        match addr {
            0xFF00 => self.joypad.write(value),
            0xFF01 => self.serial.write_sb(value),
            0xFF02 => self.serial.write_sc(value),
            0xFF04 => self.timer.write_div(),
            0xFF05 => self.timer.write_tima(value),
            0xFF06 => self.timer.write_tma(value),
            0xFF07 => self.timer.write_tac(value),
            0xFF0F => self.interrupts.write_if(value),
            0xFF10..=0xFF3F => self.apu.write_register(addr, value),
            0xFF46 => self.oam_dma(value),
            0xFF40..=0xFF4B | 0xFF4F | 0xFF68..=0xFF6B => {
                self.ppu.write_register(addr, value, &mut self.interrupts)
            }
            0xFF4D if self.cgb_mode => self.speed_armed = value & 0x01 != 0,
            0xFF51..=0xFF55 if self.cgb_mode => self.write_hdma(addr, value),
            0xFF70 if self.cgb_mode => self.wram_bank = value & 0x07,
            _ => {}
        }
    }
}
