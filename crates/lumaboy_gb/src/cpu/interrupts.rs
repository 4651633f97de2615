use crate::machine::interrupts::{dispatch_target, IE_ADDR, IF_ADDR};

use super::{Bus, Cpu};

/// Cost of an interrupt entry (5 M-cycles).
const DISPATCH_CYCLES: u32 = 20;

impl Cpu {
    /// Interrupts that are both requested and enabled, regardless of IME.
    pub(super) fn pending_interrupts<B: Bus>(&self, bus: &mut B) -> u8 {
        bus.read8(IE_ADDR) & bus.read8(IF_ADDR) & 0x1F
    }

    /// Enter the highest-priority pending interrupt, if IME allows it.
    ///
    /// Returns the cycles spent on the dispatch.
    pub(super) fn service_interrupt<B: Bus>(&mut self, bus: &mut B) -> Option<u32> {
        let ie = bus.read8(IE_ADDR);
        let iflag = bus.read8(IF_ADDR);
        let source = dispatch_target(ie, iflag, self.ime)?;

        self.ime = false;
        self.ei_delay = 0;
        let return_pc = self.regs.pc;
        self.push16(bus, return_pc);

        // Re-read IF: the push may have landed on IF/IE.
        let iflag = bus.read8(IF_ADDR);
        bus.write8(IF_ADDR, iflag & !source.mask());
        self.regs.pc = source.vector();

        log::debug!(
            "GB CPU interrupt: {:?} vector=0x{:04X} from pc=0x{:04X} IE=0x{:02X} IF=0x{:02X}",
            source,
            self.regs.pc,
            return_pc,
            ie,
            iflag
        );
        Some(DISPATCH_CYCLES)
    }

    /// Count down a pending EI. IME becomes set after the instruction
    /// following EI has executed.
    #[inline]
    pub(super) fn tick_ei_delay(&mut self) {
        if self.ei_delay > 0 {
            self.ei_delay -= 1;
            if self.ei_delay == 0 {
                self.ime = true;
            }
        }
    }
}
