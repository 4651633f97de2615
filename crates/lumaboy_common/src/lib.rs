pub mod app;
pub mod key;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new_rgb(0, 0, 0);
    pub const WHITE: Color = Color::new_rgb(255, 255, 255);

    #[inline]
    pub const fn new_rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 0xff }
    }

    #[inline]
    pub const fn rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Pack into the 15-bit BGR layout used by Game Boy Color palette RAM.
    ///
    /// Each channel keeps its top five bits: `0bbbbbgggggrrrrr`.
    #[inline]
    pub const fn to_rgb555(&self) -> u16 {
        let r = (self.r >> 3) as u16;
        let g = (self.g >> 3) as u16;
        let b = (self.b >> 3) as u16;
        r | (g << 5) | (b << 10)
    }

    /// Expand a 15-bit palette RAM colour to 8 bits per channel.
    ///
    /// The low bits are filled from the high bits so that 0x1F maps to 0xFF.
    #[inline]
    pub const fn from_rgb555(value: u16) -> Color {
        let r = (value & 0x1F) as u8;
        let g = ((value >> 5) & 0x1F) as u8;
        let b = ((value >> 10) & 0x1F) as u8;
        Color::new_rgb((r << 3) | (r >> 2), (g << 3) | (g >> 2), (b << 3) | (b >> 2))
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn rgb555_keeps_full_intensity() {
        let white = Color::from_rgb555(Color::WHITE.to_rgb555());
        assert_eq!(white, Color::WHITE);
        assert_eq!(Color::from_rgb555(0), Color::BLACK);
    }

    #[test]
    fn rgb555_channel_order() {
        // Pure red lives in the low five bits.
        assert_eq!(Color::new_rgb(0xF8, 0, 0).to_rgb555(), 0x001F);
        assert_eq!(Color::new_rgb(0, 0, 0xF8).to_rgb555(), 0x7C00);
    }
}
