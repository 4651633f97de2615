use super::{Bus, Cpu, Flags};

impl Cpu {
    /// Execute a CB-prefixed opcode. The 0xCB byte has already been fetched.
    pub(super) fn execute_cb<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let opcode = self.fetch8(bus);
        let reg = opcode & 0x07;
        let bit = (opcode >> 3) & 0x07;
        let on_hl = reg == 6;

        match opcode >> 6 {
            0 => {
                let value = self.read_r8(bus, reg);
                let result = self.shift(bit, value);
                self.write_r8(bus, reg, result);
            }
            1 => {
                // BIT b,r: C is preserved.
                let value = self.read_r8(bus, reg);
                self.set_flag(Flags::Z, value & (1 << bit) == 0);
                self.set_flag(Flags::N, false);
                self.set_flag(Flags::H, true);
                return if on_hl { 12 } else { 8 };
            }
            2 => {
                let value = self.read_r8(bus, reg) & !(1 << bit);
                self.write_r8(bus, reg, value);
            }
            _ => {
                let value = self.read_r8(bus, reg) | (1 << bit);
                self.write_r8(bus, reg, value);
            }
        }

        if on_hl {
            16
        } else {
            8
        }
    }
}
