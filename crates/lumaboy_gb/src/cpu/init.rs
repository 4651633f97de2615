use crate::machine::GameBoyModel;

use super::{Cpu, Registers};

impl Default for Cpu {
    fn default() -> Self {
        Self::new(GameBoyModel::Dmg)
    }
}

impl Cpu {
    /// Create a CPU in the state the boot ROM of `model` leaves behind.
    pub fn new(model: GameBoyModel) -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            ime: false,
            halted: false,
            stopped: false,
            halt_bug: false,
            ei_delay: 0,
            locked: false,
        };
        cpu.apply_boot_state(model);
        cpu
    }

    /// Reset the CPU to its post-boot state.
    pub fn reset(&mut self, model: GameBoyModel) {
        *self = Self::new(model);
    }

    /// Register values observed right after the boot ROM jumps to 0x0100.
    ///
    /// IME is clear on entry; the cartridge enables interrupts itself.
    fn apply_boot_state(&mut self, model: GameBoyModel) {
        match model {
            GameBoyModel::Dmg => {
                self.regs.set_af(0x01B0);
                self.regs.set_bc(0x0013);
                self.regs.set_de(0x00D8);
                self.regs.set_hl(0x014D);
            }
            GameBoyModel::Cgb => {
                self.regs.set_af(0x1180);
                self.regs.set_bc(0x0000);
                self.regs.set_de(0xFF56);
                self.regs.set_hl(0x000D);
            }
        }
        debug_assert!(self.regs.f.bits() & 0x0F == 0);
        self.regs.sp = 0xFFFE;
        self.regs.pc = 0x0100;
        self.ime = false;
    }
}
