use super::*;
use crate::machine::interrupts::InterruptFlags;

fn dmg_ppu() -> (Ppu, Interrupts) {
    (Ppu::new(false), Interrupts::default())
}

/// Fill tile 0 with colour 3 and point BGP at the identity mapping.
fn solid_tile_zero(ppu: &mut Ppu) {
    for i in 0..16 {
        ppu.vram[i] = 0xFF;
    }
    ppu.bgp = 0xE4;
}

#[test]
fn mode_sequence_on_a_visible_line() {
    let (mut ppu, mut irq) = dmg_ppu();
    assert_eq!(ppu.mode(), Mode::OamScan);

    assert_eq!(ppu.tick(79, &mut irq), 0);
    assert_eq!(ppu.mode(), Mode::OamScan);
    ppu.tick(1, &mut irq);
    assert_eq!(ppu.mode(), Mode::Transfer);

    assert_eq!(ppu.tick(172, &mut irq), 1);
    assert_eq!(ppu.mode(), Mode::HBlank);

    ppu.tick(204, &mut irq);
    assert_eq!(ppu.ly(), 1);
    assert_eq!(ppu.mode(), Mode::OamScan);
}

#[test]
fn vblank_at_line_144_marks_frame_ready() {
    let (mut ppu, mut irq) = dmg_ppu();
    assert!(!ppu.take_frame());

    let hblanks = ppu.tick(456 * 144, &mut irq);
    assert_eq!(hblanks, 144);
    assert_eq!(ppu.ly(), 144);
    assert_eq!(ppu.mode(), Mode::VBlank);
    assert!(irq.request.contains(InterruptFlags::VBLANK));

    assert!(ppu.take_frame());
    assert!(!ppu.take_frame());

    ppu.tick(456 * 10, &mut irq);
    assert_eq!(ppu.ly(), 0);
    assert_eq!(ppu.mode(), Mode::OamScan);
}

#[test]
fn vram_and_oam_blocking_follow_mode() {
    let (mut ppu, mut irq) = dmg_ppu();
    // Mode 2: OAM blocked, VRAM open.
    ppu.write_vram(0x8000, 0x12);
    assert_eq!(ppu.read_vram(0x8000), 0x12);
    ppu.write_oam(0xFE00, 0x34);
    assert_eq!(ppu.read_oam(0xFE00), 0xFF);

    ppu.tick(80, &mut irq);
    assert_eq!(ppu.read_vram(0x8000), 0xFF);
    ppu.write_vram(0x8000, 0x56);

    ppu.tick(172, &mut irq);
    assert_eq!(ppu.read_vram(0x8000), 0x12);
    ppu.write_oam(0xFE00, 0x34);
    assert_eq!(ppu.read_oam(0xFE00), 0x34);
}

#[test]
fn direct_writes_bypass_blocking() {
    let (mut ppu, mut irq) = dmg_ppu();
    ppu.tick(80, &mut irq);
    ppu.write_vram_direct(0x8001, 0xAB);
    ppu.write_oam_direct(3, 0xCD);
    ppu.tick(172, &mut irq);
    assert_eq!(ppu.read_vram(0x8001), 0xAB);
    assert_eq!(ppu.read_oam(0xFE03), 0xCD);
}

#[test]
fn lcd_off_resets_ly_and_unblocks_memory() {
    let (mut ppu, mut irq) = dmg_ppu();
    ppu.tick(456 * 5 + 100, &mut irq);
    assert_eq!(ppu.ly(), 5);

    ppu.write_register(0xFF40, 0x11, &mut irq);
    assert_eq!(ppu.ly(), 0);
    assert_eq!(ppu.read_register(0xFF41) & 0x03, 0);
    assert!(!ppu.vram_blocked());
    assert_eq!(ppu.tick(10_000, &mut irq), 0);
    assert_eq!(ppu.ly(), 0);
}

#[test]
fn lyc_match_raises_stat_once() {
    let (mut ppu, mut irq) = dmg_ppu();
    ppu.write_register(0xFF45, 2, &mut irq);
    ppu.write_register(0xFF41, 0x40, &mut irq);
    assert!(irq.request.is_empty());

    ppu.tick(456 * 2, &mut irq);
    assert!(irq.request.contains(InterruptFlags::LCD_STAT));
    assert_eq!(ppu.read_register(0xFF41) & 0x04, 0x04);

    irq.request = InterruptFlags::empty();
    ppu.tick(200, &mut irq);
    assert!(irq.request.is_empty());
}

#[test]
fn hblank_stat_select_fires_every_line() {
    let (mut ppu, mut irq) = dmg_ppu();
    ppu.write_register(0xFF41, 0x08, &mut irq);
    let mut count = 0;
    for _ in 0..3 {
        irq.request = InterruptFlags::empty();
        ppu.tick(456, &mut irq);
        if irq.request.contains(InterruptFlags::LCD_STAT) {
            count += 1;
        }
    }
    assert_eq!(count, 3);
}

#[test]
fn stat_read_sets_unused_bit() {
    let (ppu, _) = dmg_ppu();
    assert_eq!(ppu.read_register(0xFF41) & 0x80, 0x80);
    assert_eq!(ppu.read_register(0xFF41) & 0x03, Mode::OamScan as u8);
}

#[test]
fn background_uses_dmg_palette() {
    let (mut ppu, mut irq) = dmg_ppu();
    solid_tile_zero(&mut ppu);
    ppu.tick(456 * 144, &mut irq);
    assert!(ppu.take_frame());

    let view = ppu.front_buffer();
    assert_eq!(view.width(), 160);
    assert_eq!(view.height(), 144);
    let black = ppu.dmg_colors()[3];
    assert!(view.pixels().iter().all(|&p| p == black));
}

#[test]
fn background_disabled_on_dmg_draws_shade_zero() {
    let (mut ppu, mut irq) = dmg_ppu();
    solid_tile_zero(&mut ppu);
    ppu.write_register(0xFF40, 0x90, &mut irq);
    ppu.tick(456 * 144, &mut irq);
    ppu.take_frame();
    let white = ppu.dmg_colors()[0];
    assert_eq!(ppu.front_buffer().pixel(80, 70), white);
}

#[test]
fn signed_tile_addressing() {
    let (mut ppu, mut irq) = dmg_ppu();
    // Tile 0 in the 0x8800 block lives at 0x9000.
    for i in 0..16 {
        ppu.vram[0x1000 + i] = 0xFF;
    }
    ppu.bgp = 0xE4;
    ppu.write_register(0xFF40, 0x81, &mut irq);
    ppu.tick(456 * 144, &mut irq);
    ppu.take_frame();
    assert_eq!(ppu.front_buffer().pixel(0, 0), ppu.dmg_colors()[3]);
}

#[test]
fn window_covers_from_wx_minus_seven() {
    let (mut ppu, mut irq) = dmg_ppu();
    // Tile 1 solid; window map (0x9C00) points at it.
    for i in 16..32 {
        ppu.vram[i] = 0xFF;
    }
    for i in 0..0x400 {
        ppu.vram[0x1C00 + i] = 1;
    }
    ppu.bgp = 0xE4;
    ppu.wy = 10;
    ppu.wx = 57;
    ppu.write_register(0xFF40, 0xF1, &mut irq);
    ppu.tick(456 * 144, &mut irq);
    ppu.take_frame();

    let view = ppu.front_buffer();
    let colors = ppu.dmg_colors();
    assert_eq!(view.pixel(60, 9), colors[0]);
    assert_eq!(view.pixel(49, 20), colors[0]);
    assert_eq!(view.pixel(50, 20), colors[3]);
}

#[test]
fn sprites_draw_over_background() {
    let (mut ppu, mut irq) = dmg_ppu();
    for i in 32..48 {
        ppu.vram[i] = 0xFF;
    }
    // Sprite 0 at screen (8, 0) using tile 2.
    ppu.oam[0..4].copy_from_slice(&[16, 16, 2, 0]);
    ppu.obp0 = 0xE4;
    ppu.write_register(0xFF40, 0x93, &mut irq);
    ppu.tick(456 * 144, &mut irq);
    ppu.take_frame();

    let view = ppu.front_buffer();
    let colors = ppu.dmg_colors();
    assert_eq!(view.pixel(8, 0), colors[3]);
    assert_eq!(view.pixel(15, 7), colors[3]);
    assert_eq!(view.pixel(16, 0), colors[0]);
    assert_eq!(view.pixel(8, 8), colors[0]);
}

#[test]
fn objects_use_their_own_dmg_layer_palette() {
    let (mut ppu, mut irq) = dmg_ppu();
    let grey = [
        Color::WHITE,
        Color::new_rgb(170, 170, 170),
        Color::new_rgb(85, 85, 85),
        Color::BLACK,
    ];
    ppu.set_dmg_palettes([grey, grey, [Color::new_rgb(255, 0, 0); 4]]);
    for i in 32..48 {
        ppu.vram[i] = 0xFF;
    }
    // Tile 2 at screen x 8 through OBP0 and at x 32 through OBP1.
    ppu.oam[0..8].copy_from_slice(&[16, 16, 2, 0x00, 16, 40, 2, 0x10]);
    ppu.obp0 = 0xE4;
    ppu.obp1 = 0xE4;
    ppu.write_register(0xFF40, 0x93, &mut irq);
    ppu.tick(456 * 144, &mut irq);
    ppu.take_frame();

    let view = ppu.front_buffer();
    assert_eq!(view.pixel(8, 0), Color::BLACK.to_rgb555());
    assert_eq!(view.pixel(32, 0), ppu.dmg_layer_colors(PaletteLayer::Object1)[3]);
    assert_eq!(view.pixel(32, 0), 0x001F);
    assert_eq!(view.pixel(80, 70), Color::WHITE.to_rgb555());
}

#[test]
fn at_most_ten_sprites_per_line() {
    let (mut ppu, mut irq) = dmg_ppu();
    for i in 32..48 {
        ppu.vram[i] = 0xFF;
    }
    for n in 0..12 {
        let x = 8 + n as u8 * 8;
        ppu.oam[n * 4..n * 4 + 4].copy_from_slice(&[16, x, 2, 0]);
    }
    ppu.obp0 = 0xE4;
    ppu.write_register(0xFF40, 0x93, &mut irq);
    ppu.tick(456 * 144, &mut irq);
    ppu.take_frame();

    let view = ppu.front_buffer();
    let colors = ppu.dmg_colors();
    assert_eq!(view.pixel(9 * 8, 0), colors[3]);
    assert_eq!(view.pixel(10 * 8, 0), colors[0]);
}

#[test]
fn cgb_palette_auto_increment() {
    let mut ppu = Ppu::new(true);
    let mut irq = Interrupts::default();
    ppu.write_register(0xFF68, 0x80, &mut irq);
    ppu.write_register(0xFF69, 0x1F, &mut irq);
    ppu.write_register(0xFF69, 0x00, &mut irq);
    assert_eq!(ppu.read_register(0xFF68), 0xC2);

    ppu.write_register(0xFF68, 0x00, &mut irq);
    assert_eq!(ppu.read_register(0xFF69), 0x1F);
    assert_eq!(ppu.bg_palette.color(0, 0), 0x001F);
}

#[test]
fn cgb_registers_ignored_in_dmg_mode() {
    let (mut ppu, mut irq) = dmg_ppu();
    ppu.write_register(0xFF4F, 1, &mut irq);
    assert_eq!(ppu.read_register(0xFF4F), 0xFF);
    assert_eq!(ppu.read_register(0xFF68), 0xFF);
}

#[test]
fn cgb_vram_bank_select() {
    let mut ppu = Ppu::new(true);
    let mut irq = Interrupts::default();
    ppu.write_vram(0x8000, 0x11);
    ppu.write_register(0xFF4F, 1, &mut irq);
    assert_eq!(ppu.read_register(0xFF4F), 0xFF);
    ppu.write_vram(0x8000, 0x22);
    assert_eq!(ppu.read_vram(0x8000), 0x22);
    ppu.write_register(0xFF4F, 0, &mut irq);
    assert_eq!(ppu.read_register(0xFF4F), 0xFE);
    assert_eq!(ppu.read_vram(0x8000), 0x11);
}

#[test]
fn cgb_background_attributes_select_palette() {
    let mut ppu = Ppu::new(true);
    let mut irq = Interrupts::default();
    for i in 0..16 {
        ppu.vram[i] = 0xFF;
    }
    // Every map entry uses BG palette 2.
    for i in 0..0x400 {
        ppu.vram[VRAM_BANK_SIZE + 0x1800 + i] = 0x02;
    }
    // Palette 2, colour 3 = pure blue.
    ppu.write_register(0xFF68, 2 * 8 + 6, &mut irq);
    ppu.write_register(0xFF69, 0x00, &mut irq);
    ppu.write_register(0xFF68, 2 * 8 + 7, &mut irq);
    ppu.write_register(0xFF69, 0x7C, &mut irq);

    ppu.tick(456 * 144, &mut irq);
    ppu.take_frame();
    assert_eq!(ppu.front_buffer().pixel(3, 3), 0x7C00);
}

#[test]
fn blank_frame_on_lcd_off() {
    let (mut ppu, _) = dmg_ppu();
    ppu.present_blank();
    let white = ppu.dmg_colors()[0];
    assert!(ppu.front_buffer().pixels().iter().all(|&p| p == white));
}

#[test]
fn rgba_expansion() {
    let (mut ppu, _) = dmg_ppu();
    ppu.present_blank();
    let rgba = ppu.front_buffer().to_rgba();
    assert_eq!(rgba.len(), 160 * 144 * 4);
    assert_eq!(rgba[3], 0xFF);

    let mut rgb = vec![0; 160 * 144 * 3];
    ppu.front_buffer().write_rgb24(&mut rgb);
    assert_eq!(&rgb[..3], &rgba[..3]);
}

#[test]
fn validate_rejects_truncated_vram() {
    let (mut ppu, _) = dmg_ppu();
    assert!(ppu.validate().is_ok());
    ppu.vram.truncate(100);
    assert!(ppu.validate().is_err());
}

#[test]
fn state_with_out_of_range_vram_bank_is_rejected() {
    use crate::machine::tests::{assert_tampered_state_rejected, TestRom, IDLE};

    assert_tampered_state_rejected(&TestRom::new(IDLE).cgb(), |gb| gb.bus.ppu.vram_bank = 5);
}

#[test]
fn state_with_dot_outside_its_mode_is_rejected() {
    use crate::machine::tests::{assert_tampered_state_rejected, TestRom, IDLE};

    let rom = TestRom::new(IDLE);
    assert_tampered_state_rejected(&rom, |gb| {
        gb.bus.ppu.ly = 10;
        gb.bus.ppu.mode = Mode::OamScan;
        gb.bus.ppu.dot = 300;
    });
    assert_tampered_state_rejected(&rom, |gb| {
        gb.bus.ppu.ly = 10;
        gb.bus.ppu.mode = Mode::VBlank;
        gb.bus.ppu.dot = 0;
    });
    assert_tampered_state_rejected(&rom, |gb| {
        gb.bus.ppu.ly = 150;
        gb.bus.ppu.mode = Mode::HBlank;
        gb.bus.ppu.dot = 300;
    });
}

#[test]
fn every_reachable_position_validates() {
    let (mut ppu, mut irq) = dmg_ppu();
    for _ in 0..DOTS_PER_LINE * LINES_PER_FRAME as u32 {
        ppu.tick(1, &mut irq);
        assert!(ppu.validate().is_ok(), "LY={} dot={}", ppu.ly, ppu.dot);
    }
}
