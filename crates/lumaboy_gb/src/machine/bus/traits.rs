use crate::cpu::Bus;

use super::GameBoyBus;

impl Bus for GameBoyBus {
    fn read8(&mut self, addr: u16) -> u8 {
        self.read8_mmio(addr)
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.write8_mmio(addr, value)
    }

    fn end_instruction(&mut self, cycles: u32) {
        self.advance(cycles);

        // General-purpose HDMA halts the CPU while the rest of the machine
        // keeps running.
        let stall = std::mem::take(&mut self.stall_cycles);
        if stall != 0 {
            self.advance(stall);
        }
    }

    fn speed_switch(&mut self) -> bool {
        if !self.cgb_mode || !self.speed_armed {
            return false;
        }
        self.speed_armed = false;
        self.double_speed = !self.double_speed;
        self.half_cycle = false;
        log::info!(
            "GB bus: switched to {} speed",
            if self.double_speed { "double" } else { "normal" }
        );
        true
    }
}
