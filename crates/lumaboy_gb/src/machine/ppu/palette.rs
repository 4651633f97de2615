use serde::{Deserialize, Serialize};

const PALETTE_RAM_SIZE: usize = 64;

/// CGB palette RAM (8 palettes of 4 RGB555 colours) behind an index
/// register with optional auto-increment (BCPS/BCPD, OCPS/OCPD).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct CgbPalette {
    data: Vec<u8>,
    index: u8,
    auto_increment: bool,
}

impl Default for CgbPalette {
    fn default() -> Self {
        Self {
            // All white.
            data: vec![0xFF; PALETTE_RAM_SIZE],
            index: 0,
            auto_increment: false,
        }
    }
}

impl CgbPalette {
    pub(super) fn read_spec(&self) -> u8 {
        0x40 | (u8::from(self.auto_increment) << 7) | self.index
    }

    pub(super) fn write_spec(&mut self, value: u8) {
        self.index = value & 0x3F;
        self.auto_increment = value & 0x80 != 0;
    }

    pub(super) fn read_data(&self) -> u8 {
        self.data[self.index as usize]
    }

    /// While `blocked` the write is dropped, but the index still advances.
    pub(super) fn write_data(&mut self, value: u8, blocked: bool) {
        if !blocked {
            self.data[self.index as usize] = value;
        }
        if self.auto_increment {
            self.index = (self.index + 1) & 0x3F;
        }
    }

    #[inline]
    pub(super) fn color(&self, palette: u8, color_id: u8) -> u16 {
        let i = (palette as usize & 0x07) * 8 + (color_id as usize & 0x03) * 2;
        u16::from_le_bytes([self.data[i], self.data[i + 1]]) & 0x7FFF
    }

    pub(super) fn validate(&self) -> Result<(), String> {
        if self.data.len() != PALETTE_RAM_SIZE {
            return Err(format!("palette RAM is {} bytes", self.data.len()));
        }
        if self.index as usize >= PALETTE_RAM_SIZE {
            return Err(format!("palette index {} out of range", self.index));
        }
        Ok(())
    }
}
