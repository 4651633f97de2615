use crate::machine::joypad::P1_ADDR;

use super::{opcodes, Bus, Cpu};

/// Cycles reported while the CPU idles (HALT, STOP, locked).
const IDLE_CYCLES: u32 = 4;

impl Cpu {
    /// Execute one instruction (or interrupt entry, or idle slot) and return
    /// the number of T-cycles consumed.
    ///
    /// The bus is told about the instruction boundaries so it can advance
    /// its peripherals by exactly the returned amount.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        bus.begin_instruction();
        let cycles = self.step_inner(bus);
        bus.end_instruction(cycles);
        cycles
    }

    fn step_inner<B: Bus>(&mut self, bus: &mut B) -> u32 {
        if self.locked {
            return IDLE_CYCLES;
        }

        if self.stopped {
            // STOP ends when any selected P1 input line goes low.
            if bus.read8(P1_ADDR) & 0x0F == 0x0F {
                return IDLE_CYCLES;
            }
            self.stopped = false;
        }

        if self.halted {
            if self.pending_interrupts(bus) == 0 {
                return IDLE_CYCLES;
            }
            self.halted = false;
        }

        if let Some(cycles) = self.service_interrupt(bus) {
            return cycles;
        }

        if log::log_enabled!(log::Level::Trace) {
            let (text, _) = opcodes::disassemble(bus, self.regs.pc);
            log::trace!(
                "GB CPU {:04X}: {:<18} AF={:04X} BC={:04X} DE={:04X} HL={:04X} SP={:04X}",
                self.regs.pc,
                text,
                self.regs.af(),
                self.regs.bc(),
                self.regs.de(),
                self.regs.hl(),
                self.regs.sp
            );
        }

        let opcode = self.fetch8(bus);
        let cycles = self.execute(bus, opcode);
        self.tick_ei_delay();
        cycles
    }
}
