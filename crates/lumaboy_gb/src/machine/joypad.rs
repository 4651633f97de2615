use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::interrupts::{Interrupt, Interrupts};

/// Joypad register (P1/JOYP).
pub const P1_ADDR: u16 = 0xFF00;

bitflags! {
    /// Pressed-button mask handed in by the host.
    ///
    /// The low nibble is the d-pad and the high nibble the action buttons,
    /// in the same bit order P1 reports them.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Buttons: u8 {
        const RIGHT = 1 << 0;
        const LEFT = 1 << 1;
        const UP = 1 << 2;
        const DOWN = 1 << 3;
        const A = 1 << 4;
        const B = 1 << 5;
        const SELECT = 1 << 6;
        const START = 1 << 7;
    }
}

impl Default for Buttons {
    fn default() -> Self {
        Buttons::empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Joypad {
    /// P1 bits 4-5; a 0 bit selects the group.
    select: u8,
    pressed: Buttons,
}

impl Default for Joypad {
    fn default() -> Self {
        Self {
            select: 0x30,
            pressed: Buttons::empty(),
        }
    }
}

impl Joypad {
    pub(crate) fn read(&self) -> u8 {
        let mut lines = 0x0F;
        if self.select & 0x10 == 0 {
            lines &= !(self.pressed.bits() & 0x0F);
        }
        if self.select & 0x20 == 0 {
            lines &= !(self.pressed.bits() >> 4);
        }
        0xC0 | self.select | lines
    }

    pub(crate) fn write(&mut self, value: u8) {
        self.select = value & 0x30;
    }

    pub(crate) fn pressed(&self) -> Buttons {
        self.pressed
    }

    /// Replace the pressed set. Returns true if any button went down.
    pub(crate) fn set_input(&mut self, buttons: Buttons, irq: &mut Interrupts) -> bool {
        let newly_pressed = buttons.difference(self.pressed);
        self.pressed = buttons;
        if newly_pressed.is_empty() {
            return false;
        }
        irq.request(Interrupt::Joypad);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_selected_group_active_low() {
        let mut joypad = Joypad::default();
        let mut irq = Interrupts::default();
        joypad.set_input(Buttons::A | Buttons::LEFT, &mut irq);

        assert_eq!(joypad.read(), 0xFF);

        joypad.write(0x20);
        assert_eq!(joypad.read(), 0xE0 | 0x0D);

        joypad.write(0x10);
        assert_eq!(joypad.read(), 0xD0 | 0x0E);
    }

    #[test]
    fn only_new_presses_raise_interrupt() {
        let mut joypad = Joypad::default();
        let mut irq = Interrupts::default();
        assert!(joypad.set_input(Buttons::START, &mut irq));
        assert!(irq.request.contains(Interrupt::Joypad.flag()));

        irq.write_if(0);
        assert!(!joypad.set_input(Buttons::START, &mut irq));
        assert!(!joypad.set_input(Buttons::empty(), &mut irq));
        assert_eq!(irq.read_if(), 0xE0);
    }
}
