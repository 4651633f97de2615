mod alu;
mod bus;
mod cb;
mod exec;
mod helpers;
mod init;
mod interrupts;
pub mod opcodes;
mod regs;
mod step;


use serde::{Deserialize, Serialize};

pub use bus::Bus;
pub use regs::{Flags, Registers};

/// Sharp LR35902 core.
///
/// The CPU executes one instruction per [`Cpu::step`] and reports how many
/// T-cycles it consumed; everything else in the machine is advanced by the
/// bus through [`Bus::end_instruction`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpu {
    pub regs: Registers,
    /// Interrupt master enable.
    pub ime: bool,
    halted: bool,
    stopped: bool,
    /// Set when HALT is executed with IME=0 and an interrupt already
    /// pending: the next opcode byte is read twice.
    halt_bug: bool,
    /// Steps left until a pending EI sets IME (0 = nothing pending).
    ei_delay: u8,
    locked: bool,
}

impl Cpu {
    /// True once an illegal opcode has been executed.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Leave STOP mode after a joypad line went low.
    pub(crate) fn wake(&mut self) {
        self.stopped = false;
    }
}
