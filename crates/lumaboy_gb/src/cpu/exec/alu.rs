use crate::cpu::alu::AluOp;
use crate::cpu::{Bus, Cpu, Flags};

impl Cpu {
    pub(super) fn exec_alu_r8<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let src = opcode & 0x07;
        let value = self.read_r8(bus, src);
        self.alu(AluOp::from_opcode(opcode), value);
        if src == 6 {
            8
        } else {
            4
        }
    }

    pub(super) fn exec_alu_d8<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let value = self.fetch8(bus);
        self.alu(AluOp::from_opcode(opcode), value);
        8
    }

    pub(super) fn exec_add_hl_r16(&mut self, opcode: u8) -> u32 {
        let value = self.read_r16(opcode >> 4);
        self.add_hl(value);
        8
    }

    pub(super) fn exec_add_sp_r8<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let offset = self.fetch8(bus);
        self.regs.sp = self.sp_plus_offset(offset);
        16
    }

    /// RLCA / RRCA / RLA / RRA. Unlike their CB forms these always clear Z.
    pub(super) fn exec_rotate_a(&mut self, opcode: u8) -> u32 {
        let kind = (opcode >> 3) & 0x03;
        self.regs.a = self.shift(kind, self.regs.a);
        self.set_flag(Flags::Z, false);
        4
    }

    pub(super) fn exec_daa(&mut self) -> u32 {
        self.daa();
        4
    }

    pub(super) fn exec_cpl(&mut self) -> u32 {
        self.regs.a = !self.regs.a;
        self.set_flag(Flags::N, true);
        self.set_flag(Flags::H, true);
        4
    }

    pub(super) fn exec_scf(&mut self) -> u32 {
        self.set_flag(Flags::N, false);
        self.set_flag(Flags::H, false);
        self.set_flag(Flags::C, true);
        4
    }

    pub(super) fn exec_ccf(&mut self) -> u32 {
        let carry = self.flag(Flags::C);
        self.set_flag(Flags::N, false);
        self.set_flag(Flags::H, false);
        self.set_flag(Flags::C, !carry);
        4
    }
}
