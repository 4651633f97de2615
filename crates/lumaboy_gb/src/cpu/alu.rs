use super::{Cpu, Flags};

/// The eight accumulator operations encoded in bits 3-5 of 0x80-0xBF and
/// of the `xx d8` immediates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    #[inline]
    pub(super) fn from_opcode(opcode: u8) -> Self {
        match (opcode >> 3) & 0x07 {
            0 => AluOp::Add,
            1 => AluOp::Adc,
            2 => AluOp::Sub,
            3 => AluOp::Sbc,
            4 => AluOp::And,
            5 => AluOp::Xor,
            6 => AluOp::Or,
            _ => AluOp::Cp,
        }
    }
}

impl Cpu {
    pub(super) fn alu(&mut self, op: AluOp, value: u8) {
        match op {
            AluOp::Add => self.regs.a = self.add8(value, false),
            AluOp::Adc => self.regs.a = self.add8(value, true),
            AluOp::Sub => self.regs.a = self.sub8(value, false),
            AluOp::Sbc => self.regs.a = self.sub8(value, true),
            AluOp::And => {
                self.regs.a &= value;
                self.set_flags(self.regs.a == 0, false, true, false);
            }
            AluOp::Xor => {
                self.regs.a ^= value;
                self.set_flags(self.regs.a == 0, false, false, false);
            }
            AluOp::Or => {
                self.regs.a |= value;
                self.set_flags(self.regs.a == 0, false, false, false);
            }
            AluOp::Cp => {
                // Compare is a subtraction whose result is discarded.
                self.sub8(value, false);
            }
        }
    }

    fn add8(&mut self, value: u8, with_carry: bool) -> u8 {
        let a = self.regs.a;
        let carry = u8::from(with_carry && self.flag(Flags::C));
        let full = a as u16 + value as u16 + carry as u16;
        let result = full as u8;
        let half = (a & 0x0F) + (value & 0x0F) + carry > 0x0F;
        self.set_flags(result == 0, false, half, full > 0xFF);
        result
    }

    fn sub8(&mut self, value: u8, with_carry: bool) -> u8 {
        let a = self.regs.a;
        let carry = u8::from(with_carry && self.flag(Flags::C));
        let full = a as i16 - value as i16 - carry as i16;
        let result = full as u8;
        let half = ((a & 0x0F) as i16) - ((value & 0x0F) as i16) - (carry as i16) < 0;
        self.set_flags(result == 0, true, half, full < 0);
        result
    }

    /// INC r: C is preserved.
    pub(super) fn inc8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::N, false);
        self.set_flag(Flags::H, value & 0x0F == 0x0F);
        result
    }

    /// DEC r: C is preserved.
    pub(super) fn dec8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::N, true);
        self.set_flag(Flags::H, value & 0x0F == 0);
        result
    }

    /// ADD HL,rr: Z is preserved, H is the carry out of bit 11.
    pub(super) fn add_hl(&mut self, value: u16) {
        let hl = self.regs.hl();
        let (result, carry) = hl.overflowing_add(value);
        self.set_flag(Flags::N, false);
        self.set_flag(Flags::H, (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF);
        self.set_flag(Flags::C, carry);
        self.regs.set_hl(result);
    }

    /// SP plus a signed byte, as used by ADD SP,r8 and LD HL,SP+r8.
    ///
    /// H and C come from the unsigned low-byte addition; Z and N are cleared.
    pub(super) fn sp_plus_offset(&mut self, offset: u8) -> u16 {
        let sp = self.regs.sp;
        let low = sp & 0x00FF;
        let offset16 = offset as u16;
        let half = (low & 0x0F) + (offset16 & 0x0F) > 0x0F;
        let carry = low + offset16 > 0xFF;
        self.set_flags(false, false, half, carry);
        sp.wrapping_add(offset as i8 as u16)
    }

    /// Decimal-adjust A after a BCD add or subtract.
    pub(super) fn daa(&mut self) {
        let mut a = self.regs.a;
        let subtract = self.flag(Flags::N);
        let mut carry = self.flag(Flags::C);
        let half = self.flag(Flags::H);

        if subtract {
            if carry {
                a = a.wrapping_sub(0x60);
            }
            if half {
                a = a.wrapping_sub(0x06);
            }
        } else {
            if carry || a > 0x99 {
                a = a.wrapping_add(0x60);
                carry = true;
            }
            if half || (a & 0x0F) > 0x09 {
                a = a.wrapping_add(0x06);
            }
        }

        self.regs.a = a;
        self.set_flag(Flags::Z, a == 0);
        self.set_flag(Flags::H, false);
        self.set_flag(Flags::C, carry);
    }

    /// Shift/rotate group shared by the CB table and RLCA/RRCA/RLA/RRA.
    ///
    /// `kind` is bits 3-5 of the CB opcode: RLC RRC RL RR SLA SRA SWAP SRL.
    /// Sets Z from the result; callers for the accumulator forms clear it.
    pub(super) fn shift(&mut self, kind: u8, value: u8) -> u8 {
        let carry_in = u8::from(self.flag(Flags::C));
        let (result, carry_out) = match kind & 0x07 {
            0 => (value.rotate_left(1), value & 0x80 != 0),
            1 => (value.rotate_right(1), value & 0x01 != 0),
            2 => ((value << 1) | carry_in, value & 0x80 != 0),
            3 => ((value >> 1) | (carry_in << 7), value & 0x01 != 0),
            4 => (value << 1, value & 0x80 != 0),
            5 => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
            6 => (value.rotate_left(4), false),
            _ => (value >> 1, value & 0x01 != 0),
        };
        self.set_flags(result == 0, false, false, carry_out);
        result
    }
}
