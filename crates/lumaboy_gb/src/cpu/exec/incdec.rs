use crate::cpu::{Bus, Cpu};

impl Cpu {
    pub(super) fn exec_inc_r8<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let reg = (opcode >> 3) & 0x07;
        let value = self.read_r8(bus, reg);
        let result = self.inc8(value);
        self.write_r8(bus, reg, result);
        if reg == 6 {
            12
        } else {
            4
        }
    }

    pub(super) fn exec_dec_r8<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let reg = (opcode >> 3) & 0x07;
        let value = self.read_r8(bus, reg);
        let result = self.dec8(value);
        self.write_r8(bus, reg, result);
        if reg == 6 {
            12
        } else {
            4
        }
    }

    /// 16-bit INC/DEC touch no flags.
    pub(super) fn exec_inc_r16(&mut self, opcode: u8) -> u32 {
        let index = opcode >> 4;
        let value = self.read_r16(index).wrapping_add(1);
        self.write_r16(index, value);
        8
    }

    pub(super) fn exec_dec_r16(&mut self, opcode: u8) -> u32 {
        let index = opcode >> 4;
        let value = self.read_r16(index).wrapping_sub(1);
        self.write_r16(index, value);
        8
    }
}
