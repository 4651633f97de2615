use super::Timer;

impl Timer {
    pub(crate) fn read_div(&self) -> u8 {
        (self.counter >> 8) as u8
    }

    /// Any write clears the whole system counter.
    pub(crate) fn write_div(&mut self) {
        let before = self.input();
        self.counter = 0;
        if before {
            self.increment_tima();
        }
    }

    pub(crate) fn read_tima(&self) -> u8 {
        self.tima
    }

    /// Writing TIMA while a reload is pending cancels the reload.
    pub(crate) fn write_tima(&mut self, value: u8) {
        self.tima = value;
        self.reload_in = 0;
    }

    pub(crate) fn read_tma(&self) -> u8 {
        self.tma
    }

    pub(crate) fn write_tma(&mut self, value: u8) {
        self.tma = value;
    }

    pub(crate) fn read_tac(&self) -> u8 {
        self.tac | 0xF8
    }

    /// Changing TAC while the input line is high can produce a falling edge.
    pub(crate) fn write_tac(&mut self, value: u8) {
        let before = self.input();
        self.tac = value & 0x07;
        if before && !self.input() {
            self.increment_tima();
        }
    }
}
