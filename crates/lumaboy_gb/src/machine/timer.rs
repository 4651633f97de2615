//! Divider and programmable timer.
//!
//! A 16-bit system counter advances once per T-cycle and DIV exposes its
//! upper byte. TIMA increments on the falling edge of the counter bit
//! selected by TAC (ANDed with the enable bit), so DIV writes and TAC
//! changes can produce the same extra increments hardware does.
mod io;

use serde::{Deserialize, Serialize};

use super::interrupts::{Interrupt, Interrupts};
use super::GameBoyModel;

/// Delay between TIMA overflowing and the TMA reload (one M-cycle).
const RELOAD_DELAY: u8 = 4;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Timer {
    /// System counter; DIV is bits 8-15.
    counter: u16,
    tima: u8,
    tma: u8,
    /// TAC, lower 3 bits.
    tac: u8,
    /// T-cycles until a pending overflow reloads TIMA (0 = none pending).
    reload_in: u8,
}

impl Timer {
    /// Timer state left behind by the boot ROM.
    pub(crate) fn new(model: GameBoyModel) -> Self {
        let counter = match model {
            GameBoyModel::Dmg => 0xABCC,
            GameBoyModel::Cgb => 0x1EA0,
        };
        Self {
            counter,
            tima: 0,
            tma: 0,
            tac: 0,
            reload_in: 0,
        }
    }

    /// Counter bit watched for the current TAC clock select.
    #[inline]
    fn selected_bit(&self) -> u16 {
        match self.tac & 0x03 {
            0 => 1 << 9,
            1 => 1 << 3,
            2 => 1 << 5,
            _ => 1 << 7,
        }
    }

    /// Timer input line: enable bit AND the selected counter bit.
    #[inline]
    fn input(&self) -> bool {
        self.tac & 0x04 != 0 && self.counter & self.selected_bit() != 0
    }

    #[inline]
    fn increment_tima(&mut self) {
        let (next, overflow) = self.tima.overflowing_add(1);
        self.tima = next;
        if overflow {
            // TIMA reads 0x00 until the reload lands.
            self.reload_in = RELOAD_DELAY;
        }
    }

    pub(crate) fn tick(&mut self, cycles: u32, irq: &mut Interrupts) {
        for _ in 0..cycles {
            self.tick_cycle(irq);
        }
    }

    #[inline]
    fn tick_cycle(&mut self, irq: &mut Interrupts) {
        if self.reload_in > 0 {
            self.reload_in -= 1;
            if self.reload_in == 0 {
                self.tima = self.tma;
                irq.request(Interrupt::Timer);
            }
        }

        let before = self.input();
        self.counter = self.counter.wrapping_add(1);
        if before && !self.input() {
            self.increment_tima();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_tac(tac: u8) -> Timer {
        let mut timer = Timer::new(GameBoyModel::Dmg);
        timer.counter = 0;
        timer.tac = tac;
        timer
    }

    #[test]
    fn div_counts_every_256_cycles() {
        let mut timer = with_tac(0);
        let mut irq = Interrupts::default();
        timer.tick(255, &mut irq);
        assert_eq!(timer.read_div(), 0);
        timer.tick(1, &mut irq);
        assert_eq!(timer.read_div(), 1);
    }

    #[test]
    fn tima_follows_selected_clock() {
        // TAC=0b101: 262144 Hz, one increment per 16 cycles.
        let mut fast = with_tac(0x05);
        let mut irq = Interrupts::default();
        fast.tick(16 * 10, &mut irq);
        assert_eq!(fast.read_tima(), 10);

        let mut slow = with_tac(0x04);
        slow.tick(1024 * 3, &mut irq);
        assert_eq!(slow.read_tima(), 3);
    }

    #[test]
    fn overflow_reloads_one_m_cycle_later() {
        let mut timer = with_tac(0x05);
        let mut irq = Interrupts::default();
        timer.tima = 0xFF;
        timer.tma = 0x42;

        timer.tick(16, &mut irq);
        assert_eq!(timer.read_tima(), 0x00);
        assert_eq!(irq.read_if() & 0x04, 0);

        timer.tick(4, &mut irq);
        assert_eq!(timer.read_tima(), 0x42);
        assert!(irq.request.contains(Interrupt::Timer.flag()));
    }

    #[test]
    fn tima_write_during_reload_window_cancels_it() {
        let mut timer = with_tac(0x05);
        let mut irq = Interrupts::default();
        timer.tima = 0xFF;
        timer.tma = 0x42;
        timer.tick(16, &mut irq);
        timer.write_tima(0x10);
        timer.tick(4, &mut irq);
        assert_eq!(timer.read_tima(), 0x10);
        assert_eq!(irq.read_if(), 0xE0);
    }

    #[test]
    fn div_write_resets_and_can_bump_tima() {
        let mut timer = with_tac(0x05);
        let mut irq = Interrupts::default();
        // Bit 3 set: a reset is a falling edge.
        timer.tick(8, &mut irq);
        assert_eq!(timer.read_tima(), 0);
        timer.write_div();
        assert_eq!(timer.read_div(), 0);
        assert_eq!(timer.read_tima(), 1);
    }

    #[test]
    fn disabled_timer_does_not_count() {
        let mut timer = with_tac(0x01);
        let mut irq = Interrupts::default();
        timer.tick(10_000, &mut irq);
        assert_eq!(timer.read_tima(), 0);
        assert_eq!(timer.read_tac(), 0xF9);
    }
}
