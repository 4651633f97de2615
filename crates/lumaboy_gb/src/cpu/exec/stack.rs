use crate::cpu::{Bus, Cpu};

impl Cpu {
    /// PUSH uses BC DE HL AF (not SP) in the pair slot.
    pub(super) fn exec_push<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let value = match (opcode >> 4) & 0x03 {
            3 => self.regs.af(),
            index => self.read_r16(index),
        };
        self.push16(bus, value);
        16
    }

    pub(super) fn exec_pop<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let value = self.pop16(bus);
        match (opcode >> 4) & 0x03 {
            3 => self.regs.set_af(value),
            index => self.write_r16(index, value),
        }
        12
    }
}
