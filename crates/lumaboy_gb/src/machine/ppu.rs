//! Pixel processing unit.
//!
//! Each visible line walks OAM scan (mode 2, 80 dots), pixel transfer
//! (mode 3, 172 dots) and H-blank (mode 0, the rest of the 456-dot line).
//! Lines 144-153 are V-blank (mode 1). The whole line is rendered into the
//! back buffer when pixel transfer begins.

mod framebuffer;
mod palette;
mod render;

use serde::{Deserialize, Serialize};

use lumaboy_common::Color;

use super::interrupts::{Interrupt, Interrupts};
use crate::config::{PaletteLayer, DEFAULT_DMG_PALETTE};
pub use framebuffer::FrameBufferView;
use framebuffer::FrameBuffer;
use palette::CgbPalette;

pub(crate) const VRAM_BANK_SIZE: usize = 0x2000;
pub(crate) const OAM_SIZE: usize = 0xA0;

const DOTS_PER_LINE: u32 = 456;
const OAM_SCAN_END: u32 = 80;
const TRANSFER_END: u32 = OAM_SCAN_END + 172;
const VBLANK_START: u8 = 144;
const LINES_PER_FRAME: u8 = 154;

/// White in RGB555.
const CGB_WHITE: u16 = 0x7FFF;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub(crate) enum Mode {
    HBlank = 0,
    VBlank = 1,
    OamScan = 2,
    Transfer = 3,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Ppu {
    vram: Vec<u8>,
    oam: Vec<u8>,
    vram_bank: u8,

    lcdc: u8,
    /// STAT interrupt selects (bits 3-6).
    stat: u8,
    scy: u8,
    scx: u8,
    ly: u8,
    lyc: u8,
    bgp: u8,
    obp0: u8,
    obp1: u8,
    wy: u8,
    wx: u8,

    mode: Mode,
    /// Dot within the current line.
    dot: u32,
    /// Internal line counter of the window.
    window_line: u8,
    /// Set once LY has matched WY during the current frame.
    window_triggered: bool,
    /// Previous level of the ORed STAT interrupt sources.
    stat_line: bool,
    frame_ready: bool,

    cgb_mode: bool,
    bg_palette: CgbPalette,
    obj_palette: CgbPalette,

    frame: FrameBuffer,
    /// DMG shades in RGB555 per layer (background, OBJ0, OBJ1), lightest
    /// first. Host setting, not saved.
    #[serde(skip, default = "default_dmg_colors")]
    dmg_colors: [[u16; 4]; 3],
}

fn default_dmg_colors() -> [[u16; 4]; 3] {
    [DEFAULT_DMG_PALETTE.map(|c| c.to_rgb555()); 3]
}

impl Ppu {
    pub(crate) fn new(cgb_mode: bool) -> Self {
        Self {
            vram: vec![0; 2 * VRAM_BANK_SIZE],
            oam: vec![0; OAM_SIZE],
            vram_bank: 0,
            // Post-boot: LCD on, BG on, tile data at 0x8000.
            lcdc: 0x91,
            stat: 0,
            scy: 0,
            scx: 0,
            ly: 0,
            lyc: 0,
            bgp: 0xFC,
            obp0: 0xFF,
            obp1: 0xFF,
            wy: 0,
            wx: 0,
            mode: Mode::OamScan,
            dot: 0,
            window_line: 0,
            window_triggered: false,
            stat_line: false,
            frame_ready: false,
            cgb_mode,
            bg_palette: CgbPalette::default(),
            obj_palette: CgbPalette::default(),
            frame: FrameBuffer::default(),
            dmg_colors: default_dmg_colors(),
        }
    }

    #[inline]
    pub(crate) fn lcd_on(&self) -> bool {
        self.lcdc & 0x80 != 0
    }

    #[cfg(test)]
    pub(crate) fn mode(&self) -> Mode {
        self.mode
    }

    #[cfg(test)]
    pub(crate) fn ly(&self) -> u8 {
        self.ly
    }

    /// Shades for each [`PaletteLayer`], as resolved by the host settings.
    pub(crate) fn set_dmg_palettes(&mut self, palettes: [[Color; 4]; 3]) {
        self.dmg_colors = palettes.map(|palette| palette.map(|c| c.to_rgb555()));
    }

    /// Background shades in RGB555.
    pub(crate) fn dmg_colors(&self) -> [u16; 4] {
        self.dmg_colors[PaletteLayer::Background as usize]
    }

    #[cfg(test)]
    pub(crate) fn dmg_layer_colors(&self, layer: PaletteLayer) -> [u16; 4] {
        self.dmg_colors[layer as usize]
    }

    /// Advance by `dots` PPU clocks. Returns how many H-blank periods began.
    pub(crate) fn tick(&mut self, dots: u32, irq: &mut Interrupts) -> u32 {
        if !self.lcd_on() {
            return 0;
        }

        let mut hblanks = 0;
        let mut remaining = dots;
        while remaining > 0 {
            let boundary = match self.mode {
                Mode::OamScan => OAM_SCAN_END,
                Mode::Transfer => TRANSFER_END,
                Mode::HBlank | Mode::VBlank => DOTS_PER_LINE,
            };
            let step = remaining.min(boundary - self.dot);
            self.dot += step;
            remaining -= step;
            if self.dot < boundary {
                break;
            }

            match self.mode {
                Mode::OamScan => {
                    self.mode = Mode::Transfer;
                    self.render_line();
                }
                Mode::Transfer => {
                    self.mode = Mode::HBlank;
                    hblanks += 1;
                }
                Mode::HBlank | Mode::VBlank => {
                    self.dot = 0;
                    self.next_line(irq);
                }
            }
            self.update_stat_line(irq);
        }
        hblanks
    }

    fn next_line(&mut self, irq: &mut Interrupts) {
        self.ly += 1;
        if self.ly == VBLANK_START {
            self.mode = Mode::VBlank;
            self.frame_ready = true;
            irq.request(Interrupt::VBlank);
            log::debug!("GB PPU: V-blank, frame ready");
        } else if self.ly == LINES_PER_FRAME {
            self.ly = 0;
            self.window_line = 0;
            self.window_triggered = false;
            self.mode = Mode::OamScan;
        } else if self.ly < VBLANK_START {
            self.mode = Mode::OamScan;
        }
    }

    /// Recompute the STAT interrupt line and request LCD_STAT on its
    /// rising edge.
    fn update_stat_line(&mut self, irq: &mut Interrupts) {
        let lyc_match = self.stat & 0x40 != 0 && self.ly == self.lyc;
        let mode_match = match self.mode {
            Mode::HBlank => self.stat & 0x08 != 0,
            Mode::VBlank => self.stat & 0x10 != 0,
            Mode::OamScan => self.stat & 0x20 != 0,
            Mode::Transfer => false,
        };
        let line = self.lcd_on() && (lyc_match || mode_match);
        if line && !self.stat_line {
            irq.request(Interrupt::LcdStat);
        }
        self.stat_line = line;
    }

    /// Take the completed-frame signal, swapping buffers if set.
    pub(crate) fn take_frame(&mut self) -> bool {
        if !self.frame_ready {
            return false;
        }
        self.frame_ready = false;
        self.frame.swap();
        log::trace!("GB PPU: buffers swapped");
        true
    }

    /// Show a blank screen (LCD off).
    pub(crate) fn present_blank(&mut self) {
        let blank = if self.cgb_mode {
            CGB_WHITE
        } else {
            self.dmg_colors()[0]
        };
        self.frame.fill_front(blank);
    }

    pub(crate) fn front_buffer(&self) -> FrameBufferView<'_> {
        self.frame.front()
    }

    // --- CPU access ---

    #[inline]
    pub(crate) fn vram_blocked(&self) -> bool {
        self.lcd_on() && self.mode == Mode::Transfer
    }

    #[inline]
    pub(crate) fn oam_blocked(&self) -> bool {
        self.lcd_on() && matches!(self.mode, Mode::OamScan | Mode::Transfer)
    }

    #[inline]
    fn vram_index(&self, addr: u16) -> usize {
        self.vram_bank as usize * VRAM_BANK_SIZE + (addr as usize & (VRAM_BANK_SIZE - 1))
    }

    pub(crate) fn read_vram(&self, addr: u16) -> u8 {
        if self.vram_blocked() {
            return 0xFF;
        }
        self.vram[self.vram_index(addr)]
    }

    pub(crate) fn write_vram(&mut self, addr: u16, value: u8) {
        if self.vram_blocked() {
            return;
        }
        self.write_vram_direct(addr, value);
    }

    /// VRAM read for OAM DMA; never blocked.
    pub(crate) fn read_vram_direct(&self, addr: u16) -> u8 {
        self.vram[self.vram_index(addr)]
    }

    /// VRAM write from HDMA; never blocked.
    pub(crate) fn write_vram_direct(&mut self, addr: u16, value: u8) {
        let index = self.vram_index(addr);
        self.vram[index] = value;
    }

    pub(crate) fn read_oam(&self, addr: u16) -> u8 {
        if self.oam_blocked() {
            return 0xFF;
        }
        self.oam[(addr as usize - 0xFE00) % OAM_SIZE]
    }

    pub(crate) fn write_oam(&mut self, addr: u16, value: u8) {
        if self.oam_blocked() {
            return;
        }
        self.write_oam_direct((addr as usize - 0xFE00) % OAM_SIZE, value);
    }

    /// OAM write from OAM DMA; never blocked.
    pub(crate) fn write_oam_direct(&mut self, index: usize, value: u8) {
        self.oam[index % OAM_SIZE] = value;
    }

    pub(crate) fn read_register(&self, addr: u16) -> u8 {
        match addr {
            0xFF40 => self.lcdc,
            0xFF41 => {
                let mode = if self.lcd_on() { self.mode as u8 } else { 0 };
                let coincidence = u8::from(self.ly == self.lyc) << 2;
                0x80 | (self.stat & 0x78) | coincidence | mode
            }
            0xFF42 => self.scy,
            0xFF43 => self.scx,
            0xFF44 => self.ly,
            0xFF45 => self.lyc,
            0xFF47 => self.bgp,
            0xFF48 => self.obp0,
            0xFF49 => self.obp1,
            0xFF4A => self.wy,
            0xFF4B => self.wx,
            0xFF4F if self.cgb_mode => 0xFE | self.vram_bank,
            0xFF68 if self.cgb_mode => self.bg_palette.read_spec(),
            0xFF69 if self.cgb_mode => self.read_palette_data(false),
            0xFF6A if self.cgb_mode => self.obj_palette.read_spec(),
            0xFF6B if self.cgb_mode => self.read_palette_data(true),
            _ => 0xFF,
        }
    }

    pub(crate) fn write_register(&mut self, addr: u16, value: u8, irq: &mut Interrupts) {
        match addr {
            0xFF40 => self.write_lcdc(value),
            0xFF41 => self.stat = value & 0x78,
            0xFF42 => self.scy = value,
            0xFF43 => self.scx = value,
            // LY is read-only.
            0xFF44 => {}
            0xFF45 => self.lyc = value,
            0xFF47 => self.bgp = value,
            0xFF48 => self.obp0 = value,
            0xFF49 => self.obp1 = value,
            0xFF4A => self.wy = value,
            0xFF4B => self.wx = value,
            0xFF4F if self.cgb_mode => self.vram_bank = value & 0x01,
            0xFF68 if self.cgb_mode => self.bg_palette.write_spec(value),
            0xFF69 if self.cgb_mode => {
                let blocked = self.vram_blocked();
                self.bg_palette.write_data(value, blocked);
            }
            0xFF6A if self.cgb_mode => self.obj_palette.write_spec(value),
            0xFF6B if self.cgb_mode => {
                let blocked = self.vram_blocked();
                self.obj_palette.write_data(value, blocked);
            }
            _ => return,
        }
        self.update_stat_line(irq);
    }

    fn read_palette_data(&self, object: bool) -> u8 {
        if self.vram_blocked() {
            return 0xFF;
        }
        if object {
            self.obj_palette.read_data()
        } else {
            self.bg_palette.read_data()
        }
    }

    fn write_lcdc(&mut self, value: u8) {
        let was_on = self.lcd_on();
        self.lcdc = value;
        match (was_on, self.lcd_on()) {
            (true, false) => {
                self.ly = 0;
                self.dot = 0;
                self.mode = Mode::HBlank;
                self.window_line = 0;
                self.window_triggered = false;
                log::debug!("GB PPU: LCD off");
            }
            (false, true) => {
                self.ly = 0;
                self.dot = 0;
                self.mode = Mode::OamScan;
                log::debug!("GB PPU: LCD on");
            }
            _ => {}
        }
    }

    /// Check internal buffer sizes after a state load.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.vram.len() != 2 * VRAM_BANK_SIZE {
            return Err(format!("VRAM is {} bytes", self.vram.len()));
        }
        if self.oam.len() != OAM_SIZE {
            return Err(format!("OAM is {} bytes", self.oam.len()));
        }
        self.bg_palette.validate()?;
        self.obj_palette.validate()?;
        self.frame.validate()?;
        if self.vram_bank > 1 {
            return Err(format!("VRAM bank {} out of range", self.vram_bank));
        }
        if !self.position_matches_mode() {
            return Err(format!(
                "PPU position LY={} dot={} does not fit {:?}",
                self.ly, self.dot, self.mode
            ));
        }
        Ok(())
    }

    /// Whether LY and the dot counter are reachable in the current mode.
    fn position_matches_mode(&self) -> bool {
        if !self.lcd_on() {
            // Switching the LCD on restarts at line 0.
            return self.ly < LINES_PER_FRAME && self.dot < DOTS_PER_LINE;
        }
        let visible = self.ly < VBLANK_START;
        match self.mode {
            Mode::OamScan => visible && self.dot < OAM_SCAN_END,
            Mode::Transfer => visible && (OAM_SCAN_END..TRANSFER_END).contains(&self.dot),
            Mode::HBlank => visible && (TRANSFER_END..DOTS_PER_LINE).contains(&self.dot),
            Mode::VBlank => {
                (VBLANK_START..LINES_PER_FRAME).contains(&self.ly) && self.dot < DOTS_PER_LINE
            }
        }
    }
}

#[cfg(test)]
mod tests;
