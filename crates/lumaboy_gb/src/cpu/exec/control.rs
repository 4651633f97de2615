use crate::cpu::{Bus, Cpu};

impl Cpu {
    /// JR r8 / JR cc,r8. The offset is always fetched.
    pub(super) fn exec_jr<B: Bus>(&mut self, bus: &mut B, taken: bool) -> u32 {
        let offset = self.fetch8(bus) as i8;
        if taken {
            self.regs.pc = self.regs.pc.wrapping_add(offset as u16);
            12
        } else {
            8
        }
    }

    pub(super) fn exec_jp<B: Bus>(&mut self, bus: &mut B, taken: bool) -> u32 {
        let target = self.fetch16(bus);
        if taken {
            self.regs.pc = target;
            16
        } else {
            12
        }
    }

    pub(super) fn exec_jp_hl(&mut self) -> u32 {
        self.regs.pc = self.regs.hl();
        4
    }

    pub(super) fn exec_call<B: Bus>(&mut self, bus: &mut B, taken: bool) -> u32 {
        let target = self.fetch16(bus);
        if !taken {
            return 12;
        }
        let ret = self.regs.pc;
        self.push16(bus, ret);
        self.regs.pc = target;
        24
    }

    pub(super) fn exec_ret<B: Bus>(&mut self, bus: &mut B) -> u32 {
        self.regs.pc = self.pop16(bus);
        16
    }

    pub(super) fn exec_ret_cc<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        if self.condition(opcode) {
            self.regs.pc = self.pop16(bus);
            20
        } else {
            8
        }
    }

    /// RETI enables IME immediately, without the EI delay.
    pub(super) fn exec_reti<B: Bus>(&mut self, bus: &mut B) -> u32 {
        self.regs.pc = self.pop16(bus);
        self.ime = true;
        self.ei_delay = 0;
        16
    }

    pub(super) fn exec_rst<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let ret = self.regs.pc;
        self.push16(bus, ret);
        self.regs.pc = (opcode & 0x38) as u16;
        16
    }
}
