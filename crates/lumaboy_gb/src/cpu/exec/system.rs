use crate::cpu::{Bus, Cpu};

impl Cpu {
    pub(super) fn exec_di(&mut self) -> u32 {
        self.ime = false;
        self.ei_delay = 0;
        4
    }

    /// EI: IME is set once the following instruction has run.
    pub(super) fn exec_ei(&mut self) -> u32 {
        if !self.ime && self.ei_delay == 0 {
            // Counted down once after EI itself, once after the next opcode.
            self.ei_delay = 2;
        }
        4
    }

    pub(super) fn exec_halt<B: Bus>(&mut self, bus: &mut B) -> u32 {
        if !self.ime && self.pending_interrupts(bus) != 0 {
            // HALT bug: no halt, and the next opcode byte is fetched twice.
            self.halt_bug = true;
        } else {
            self.halted = true;
        }
        4
    }

    /// STOP is two bytes long; the second byte is skipped.
    pub(super) fn exec_stop<B: Bus>(&mut self, bus: &mut B) -> u32 {
        self.regs.pc = self.regs.pc.wrapping_add(1);
        if !bus.speed_switch() {
            self.stopped = true;
        }
        4
    }

    pub(super) fn exec_illegal(&mut self, opcode: u8) -> u32 {
        if !self.locked {
            log::error!(
                "GB CPU locked: illegal opcode 0x{:02X} at PC=0x{:04X} (SP=0x{:04X} AF=0x{:04X})",
                opcode,
                self.regs.pc.wrapping_sub(1),
                self.regs.sp,
                self.regs.af()
            );
        }
        self.locked = true;
        4
    }
}
