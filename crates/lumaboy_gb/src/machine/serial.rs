use serde::{Deserialize, Serialize};

use super::interrupts::{Interrupt, Interrupts};

/// 8 bits at 8192 Hz.
const TRANSFER_CYCLES: u32 = 4096;
/// Output bytes kept before the oldest half is discarded.
const OUTPUT_LIMIT: usize = 0x1_0000;
/// Longest serial line logged as one message.
const LINE_LIMIT: usize = 256;

/// Serial port (SB/SC) with nothing plugged into the link cable.
///
/// An internally clocked transfer shifts in 0xFF, as an unconnected line
/// floats high. Bytes the game sends are kept in `output` so test ROMs that
/// print through the link port can be observed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(crate) struct Serial {
    sb: u8,
    sc: u8,
    /// T-cycles until the running transfer completes (0 = idle).
    remaining: u32,
    #[serde(skip)]
    pub(crate) output: Vec<u8>,
    #[serde(skip)]
    pub(crate) log_output: bool,
    #[serde(skip)]
    line: Vec<u8>,
}

impl Serial {
    pub(crate) fn read_sb(&self) -> u8 {
        self.sb
    }

    pub(crate) fn read_sc(&self) -> u8 {
        self.sc | 0x7E
    }

    pub(crate) fn write_sb(&mut self, value: u8) {
        self.sb = value;
    }

    pub(crate) fn write_sc(&mut self, value: u8) {
        self.sc = value & 0x81;
        if self.sc == 0x81 {
            self.capture(self.sb);
            self.remaining = TRANSFER_CYCLES;
        } else if self.sc & 0x80 == 0 {
            self.remaining = 0;
        }
    }

    pub(crate) fn tick(&mut self, cycles: u32, irq: &mut Interrupts) {
        if self.remaining == 0 {
            return;
        }
        self.remaining = self.remaining.saturating_sub(cycles);
        if self.remaining == 0 {
            self.sb = 0xFF;
            self.sc &= !0x80;
            irq.request(Interrupt::Serial);
        }
    }

    fn capture(&mut self, byte: u8) {
        if self.output.len() >= OUTPUT_LIMIT {
            self.output.drain(..OUTPUT_LIMIT / 2);
        }
        self.output.push(byte);

        if self.log_output {
            if byte == b'\n' {
                self.flush_line();
            } else {
                self.line.push(byte);
                if self.line.len() >= LINE_LIMIT {
                    self.flush_line();
                }
            }
        }
    }

    fn flush_line(&mut self) {
        log::info!("GB serial: {}", String::from_utf8_lossy(&self.line));
        self.line.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_completes_after_4096_cycles() {
        let mut serial = Serial::default();
        let mut irq = Interrupts::default();
        serial.write_sb(b'A');
        serial.write_sc(0x81);
        assert_eq!(serial.output, b"A");

        serial.tick(4092, &mut irq);
        assert_eq!(serial.read_sc(), 0xFF);
        assert_eq!(irq.read_if(), 0xE0);

        serial.tick(4, &mut irq);
        assert_eq!(serial.read_sb(), 0xFF);
        assert_eq!(serial.read_sc(), 0x7F);
        assert!(irq.request.contains(Interrupt::Serial.flag()));
    }

    #[test]
    fn external_clock_never_completes() {
        let mut serial = Serial::default();
        let mut irq = Interrupts::default();
        serial.write_sc(0x80);
        serial.tick(100_000, &mut irq);
        assert_eq!(serial.read_sc(), 0xFE);
        assert!(serial.output.is_empty());
    }

    #[test]
    fn logged_line_is_flushed_at_the_length_cap() {
        let mut serial = Serial {
            log_output: true,
            ..Serial::default()
        };
        for _ in 0..LINE_LIMIT * 3 + 10 {
            serial.write_sb(b'x');
            serial.write_sc(0x81);
            assert!(serial.line.len() < LINE_LIMIT);
        }
        assert_eq!(serial.line.len(), 10);

        serial.write_sb(b'\n');
        serial.write_sc(0x81);
        assert!(serial.line.is_empty());
        assert_eq!(serial.output.len(), LINE_LIMIT * 3 + 11);
    }
}
