use super::cartridge::Cartridge;
use super::interrupts::InterruptFlags;
use super::{Buttons, GameBoy, GameBoyModel};
use crate::config::{DmgPalettes, EmulatorConfig, ModelPreference, DEFAULT_DMG_PALETTE};
use crate::cpu::Bus;
use crate::error::Error;
use crate::{CLOCK_HZ, SCREEN_HEIGHT, SCREEN_WIDTH};
use lumaboy_common::Color;

const BANK: usize = 0x4000;

/// Synthetic cartridge image: a valid header, `JP 0150` at the entry
/// point, `program` at 0x0150, and every switchable bank filled with its
/// own bank number.
pub(super) struct TestRom {
    cart_type: u8,
    rom_code: u8,
    ram_code: u8,
    cgb_flag: u8,
    program: Vec<u8>,
    patches: Vec<(usize, Vec<u8>)>,
}

impl TestRom {
    pub(super) fn new(program: &[u8]) -> Self {
        Self {
            cart_type: 0x00,
            rom_code: 0x00,
            ram_code: 0x00,
            cgb_flag: 0x00,
            program: program.to_vec(),
            patches: Vec::new(),
        }
    }

    pub(super) fn cart(mut self, cart_type: u8, rom_code: u8, ram_code: u8) -> Self {
        self.cart_type = cart_type;
        self.rom_code = rom_code;
        self.ram_code = ram_code;
        self
    }

    pub(super) fn cgb(mut self) -> Self {
        self.cgb_flag = 0x80;
        self
    }

    pub(super) fn at(mut self, addr: usize, bytes: &[u8]) -> Self {
        self.patches.push((addr, bytes.to_vec()));
        self
    }

    pub(super) fn build(&self) -> Vec<u8> {
        let banks = 2usize << self.rom_code;
        let mut rom = vec![0u8; banks * BANK];
        for bank in 1..banks {
            rom[bank * BANK..(bank + 1) * BANK].fill(bank as u8);
        }
        rom[0x100..0x104].copy_from_slice(&[0x00, 0xC3, 0x50, 0x01]);
        rom[0x134..0x13C].copy_from_slice(b"LUMATEST");
        rom[0x143] = self.cgb_flag;
        rom[0x147] = self.cart_type;
        rom[0x148] = self.rom_code;
        rom[0x149] = self.ram_code;
        rom[0x150..0x150 + self.program.len()].copy_from_slice(&self.program);
        for (addr, bytes) in &self.patches {
            rom[*addr..*addr + bytes.len()].copy_from_slice(bytes);
        }
        fix_header_checksum(&mut rom);
        rom
    }

    pub(super) fn boot(&self) -> GameBoy {
        GameBoy::new(&self.build(), &EmulatorConfig::default()).unwrap()
    }
}

fn fix_header_checksum(rom: &mut [u8]) {
    rom[0x14D] = super::cartridge::header_checksum_of(rom);
}

/// `JR -2`: spin forever.
pub(super) const IDLE: &[u8] = &[0x18, 0xFE];

fn load(rom: &[u8]) -> Cartridge {
    Cartridge::load(rom).unwrap().0
}

// --- cartridge ---

#[test]
fn header_fields_are_decoded() {
    let rom = TestRom::new(IDLE).cart(0x03, 0x02, 0x02).build();
    let (_, info) = Cartridge::load(&rom).unwrap();
    assert_eq!(info.title, "LUMATEST");
    assert_eq!(info.rom_banks, 8);
    assert_eq!(info.ram_size, 0x2000);
    assert!(info.has_battery);
    assert!(info.header_checksum_ok);
    assert!(!info.supports_cgb());
}

#[test]
fn short_image_is_invalid() {
    let err = Cartridge::load(&[0u8; 0x100]).unwrap_err();
    assert!(matches!(err, Error::InvalidHeader { .. }));
}

#[test]
fn declared_size_beyond_image_is_invalid() {
    let mut rom = TestRom::new(IDLE).build();
    rom[0x148] = 0x03;
    fix_header_checksum(&mut rom);
    let err = Cartridge::load(&rom).unwrap_err();
    assert!(matches!(err, Error::InvalidHeader { .. }));
}

#[test]
fn unknown_size_codes_are_invalid() {
    let mut rom = TestRom::new(IDLE).build();
    rom[0x148] = 0x09;
    assert!(matches!(
        Cartridge::load(&rom).unwrap_err(),
        Error::InvalidHeader { .. }
    ));

    let mut rom = TestRom::new(IDLE).cart(0x03, 0x00, 0x00).build();
    rom[0x149] = 0x07;
    assert!(matches!(
        Cartridge::load(&rom).unwrap_err(),
        Error::InvalidHeader { .. }
    ));
}

#[test]
fn unsupported_cartridge_type() {
    let rom = TestRom::new(IDLE).cart(0x20, 0x00, 0x00).build();
    assert_eq!(
        Cartridge::load(&rom).unwrap_err(),
        Error::UnsupportedMbc { code: 0x20 }
    );
}

#[test]
fn bad_header_checksum_still_loads() {
    let mut rom = TestRom::new(IDLE).build();
    rom[0x14D] ^= 0xFF;
    let (_, info) = Cartridge::load(&rom).unwrap();
    assert!(!info.header_checksum_ok);
}

#[test]
fn mbc1_bank_numbers_wrap_to_bank_count() {
    let mut cart = load(&TestRom::new(IDLE).cart(0x01, 0x02, 0x00).build());
    assert_eq!(cart.read_rom(0x4000), 1);

    cart.write_rom(0x2000, 0x0A);
    assert_eq!(cart.read_rom(0x4000), 2);
    cart.write_rom(0x2000, 0x08);
    assert_eq!(cart.read_rom(0x4000), 0);
    cart.write_rom(0x2000, 0x00);
    assert_eq!(cart.read_rom(0x4000), 1);
}

#[test]
fn mbc1_mode_one_banks_the_low_window() {
    let mut cart = load(&TestRom::new(IDLE).cart(0x01, 0x05, 0x00).build());
    cart.write_rom(0x4000, 0x01);
    assert_eq!(cart.read_rom(0x0000), 0);
    assert_eq!(cart.read_rom(0x4000), 33);

    cart.write_rom(0x6000, 0x01);
    assert_eq!(cart.read_rom(0x0000), 32);
    assert_eq!(cart.read_rom(0x4000), 33);
}

#[test]
fn mbc1_ram_enable_and_banking() {
    let mut cart = load(&TestRom::new(IDLE).cart(0x03, 0x01, 0x03).build());
    assert_eq!(cart.read_ram(0xA000), 0xFF);
    cart.write_ram(0xA000, 0x11);

    cart.write_rom(0x0000, 0x0A);
    assert_eq!(cart.read_ram(0xA000), 0x00);
    cart.write_ram(0xA000, 0x11);

    cart.write_rom(0x6000, 0x01);
    cart.write_rom(0x4000, 0x02);
    assert_eq!(cart.read_ram(0xA000), 0x00);
    cart.write_ram(0xA000, 0x22);

    cart.write_rom(0x4000, 0x00);
    assert_eq!(cart.read_ram(0xA000), 0x11);

    cart.write_rom(0x0000, 0x00);
    assert_eq!(cart.read_ram(0xA000), 0xFF);
}

#[test]
fn mbc2_nibble_ram_and_bank_register() {
    let mut cart = load(&TestRom::new(IDLE).cart(0x06, 0x03, 0x00).build());
    cart.write_rom(0x2100, 0x03);
    assert_eq!(cart.read_rom(0x4000), 3);
    cart.write_rom(0x2100, 0x13);
    assert_eq!(cart.read_rom(0x4000), 3);
    cart.write_rom(0x2100, 0x00);
    assert_eq!(cart.read_rom(0x4000), 1);

    cart.write_rom(0x0000, 0x0A);
    cart.write_ram(0xA000, 0xAB);
    assert_eq!(cart.read_ram(0xA000), 0xFB);
    // 512 entries, mirrored across the window.
    assert_eq!(cart.read_ram(0xA200), 0xFB);
}

#[test]
fn mbc3_rom_bank_masking() {
    let mut cart = load(&TestRom::new(IDLE).cart(0x13, 0x02, 0x03).build());
    cart.write_rom(0x2000, 0x7F);
    assert_eq!(cart.read_rom(0x4000), 7);
    cart.write_rom(0x2000, 0x00);
    assert_eq!(cart.read_rom(0x4000), 1);
}

#[test]
fn mbc3_rtc_counts_emulated_seconds_and_latches() {
    let mut cart = load(&TestRom::new(IDLE).cart(0x10, 0x01, 0x03).build());
    cart.write_rom(0x0000, 0x0A);
    cart.write_rom(0x4000, 0x08);
    cart.tick(CLOCK_HZ * 61);
    assert_eq!(cart.read_ram(0xA000), 0);

    cart.write_rom(0x6000, 0x00);
    cart.write_rom(0x6000, 0x01);
    assert_eq!(cart.read_ram(0xA000), 1);
    cart.write_rom(0x4000, 0x09);
    assert_eq!(cart.read_ram(0xA000), 1);

    // The latch holds until the next 0 -> 1 sequence.
    cart.tick(CLOCK_HZ * 5);
    cart.write_rom(0x4000, 0x08);
    assert_eq!(cart.read_ram(0xA000), 1);
}

#[test]
fn mbc5_allows_bank_zero_and_ninth_bit() {
    let mut cart = load(&TestRom::new(IDLE).cart(0x19, 0x03, 0x00).build());
    cart.write_rom(0x2000, 0x00);
    assert_eq!(cart.read_rom(0x4000), 0);

    cart.write_rom(0x3000, 0x01);
    cart.write_rom(0x2000, 0x05);
    assert_eq!(cart.read_rom(0x4000), 5);
}

// --- whole machine ---

#[test]
fn model_follows_preference_and_header() {
    let dmg_rom = TestRom::new(IDLE).build();
    let cgb_rom = TestRom::new(IDLE).cgb().build();
    let config = |model| EmulatorConfig::builder().model(model).build();

    let gb = GameBoy::new(&cgb_rom, &config(ModelPreference::Auto)).unwrap();
    assert_eq!(gb.model(), GameBoyModel::Cgb);
    assert!(gb.cgb_mode());
    assert_eq!(gb.cpu().regs.a, 0x11);

    let gb = GameBoy::new(&cgb_rom, &config(ModelPreference::Dmg)).unwrap();
    assert_eq!(gb.model(), GameBoyModel::Dmg);
    assert_eq!(gb.cpu().regs.a, 0x01);

    let gb = GameBoy::new(&dmg_rom, &config(ModelPreference::Cgb)).unwrap();
    assert_eq!(gb.model(), GameBoyModel::Cgb);
    assert!(!gb.cgb_mode());
}

#[test]
fn many_frames_keep_screen_dimensions() {
    for rom in [TestRom::new(IDLE), TestRom::new(IDLE).cgb()] {
        let mut gb = rom.boot();
        for _ in 0..120 {
            let frame = gb.run_frame();
            assert_eq!(frame.width(), SCREEN_WIDTH);
            assert_eq!(frame.height(), SCREEN_HEIGHT);
            assert_eq!(frame.pixels().len(), SCREEN_WIDTH * SCREEN_HEIGHT);
        }
    }
}

#[test]
fn run_frame_returns_at_vblank() {
    let mut gb = TestRom::new(IDLE).boot();
    gb.run_frame();
    assert_eq!(gb.bus.ppu.ly(), 144);
    gb.run_frame();
    assert_eq!(gb.bus.ppu.ly(), 144);
}

#[test]
fn lcd_off_still_returns_a_blank_frame() {
    // LD A,$11; LDH ($40),A
    let mut gb = TestRom::new(&[0x3E, 0x11, 0xE0, 0x40, 0x18, 0xFE]).boot();
    let shade = gb.bus.ppu.dmg_colors()[0];
    let frame = gb.run_frame();
    assert!(frame.pixels().iter().all(|&p| p == shade));
    assert!(!gb.bus.ppu.lcd_on());
}

#[test]
fn simultaneous_interrupts_enter_vblank_first() {
    let mut gb = TestRom::new(IDLE).boot();
    gb.cpu.ime = true;
    gb.bus.write8(0xFFFF, 0x15);
    gb.bus.write8(0xFF0F, 0x15);
    let cycles = gb.cpu.step(&mut gb.bus);
    assert_eq!(cycles, 20);
    assert_eq!(gb.cpu.regs.pc, 0x0040);
    assert_eq!(gb.bus.read8(0xFF0F) & 0x1F, 0x14);
}

#[test]
fn timer_interrupt_runs_handler() {
    let program = [
        0x3E, 0x05, // LD A,$05
        0xE0, 0x07, // LDH ($07),A   TAC: on, 16 cycles
        0x3E, 0x04, // LD A,$04
        0xE0, 0xFF, // LDH ($FF),A   IE: timer
        0xFB, // EI
        0x76, // HALT
        0x18, 0xFD, // JR -3
    ];
    // Handler: INC C; RETI
    let mut gb = TestRom::new(&program).at(0x50, &[0x0C, 0xD9]).boot();
    let c = gb.cpu().regs.c;
    gb.run_frame();
    assert!(gb.cpu().regs.c > c + 10);
}

#[test]
fn serial_bytes_are_captured() {
    let program = [0x3E, b'H', 0xE0, 0x01, 0x3E, 0x81, 0xE0, 0x02, 0x18, 0xFE];
    let mut gb = TestRom::new(&program).boot();
    gb.run_frame();
    assert_eq!(gb.serial_output(), b"H");
    assert!(gb.bus.interrupts.request.contains(InterruptFlags::SERIAL));
}

#[test]
fn joypad_input_reaches_p1_and_requests_interrupt() {
    let mut gb = TestRom::new(IDLE).boot();
    gb.bus.interrupts.request = InterruptFlags::empty();
    gb.set_input(Buttons::A | Buttons::START);
    assert!(gb.bus.interrupts.request.contains(InterruptFlags::JOYPAD));
    assert_eq!(gb.input(), Buttons::A | Buttons::START);

    gb.bus.write8(0xFF00, 0x10);
    assert_eq!(gb.bus.read8(0xFF00), 0xD6);
    gb.bus.write8(0xFF00, 0x20);
    assert_eq!(gb.bus.read8(0xFF00), 0xEF);
}

#[test]
fn button_press_wakes_stop() {
    let mut gb = TestRom::new(&[0x10, 0x00, 0x18, 0xFE]).boot();
    gb.run_frame();
    assert!(gb.cpu().is_stopped());
    gb.set_input(Buttons::B);
    assert!(!gb.cpu().is_stopped());
}

#[test]
fn frames_produce_audio() {
    let mut gb = TestRom::new(IDLE).boot();
    gb.run_frame();
    let samples = gb.audio_samples();
    assert!(!samples.is_empty());
    assert_eq!(samples.len() % 2, 0);
    assert!(gb.audio_samples().is_empty());
}

#[test]
fn bus_open_areas_and_unused_bits() {
    let mut gb = TestRom::new(IDLE).boot();
    assert_eq!(gb.bus.read8(0xFEA0), 0xFF);
    assert_eq!(gb.bus.read8(0xFF03), 0xFF);
    gb.bus.write8(0xFF0F, 0x00);
    assert_eq!(gb.bus.read8(0xFF0F), 0xE0);
    // CGB-only registers are absent on DMG.
    assert_eq!(gb.bus.read8(0xFF4D), 0xFF);
    assert_eq!(gb.bus.read8(0xFF70), 0xFF);
}

#[test]
fn echo_ram_mirrors_wram() {
    let mut gb = TestRom::new(IDLE).boot();
    gb.bus.write8(0xC123, 0x5A);
    assert_eq!(gb.bus.read8(0xE123), 0x5A);
    gb.bus.write8(0xFDFF, 0xA5);
    assert_eq!(gb.bus.read8(0xDDFF), 0xA5);
}

#[test]
fn vram_is_blocked_during_pixel_transfer() {
    let mut gb = TestRom::new(IDLE).boot();
    gb.bus.write8(0x8000, 0x42);
    gb.bus.end_instruction(80);
    assert_eq!(gb.bus.read8(0x8000), 0xFF);
    gb.bus.write8(0x8000, 0x99);
    gb.bus.end_instruction(172);
    assert_eq!(gb.bus.read8(0x8000), 0x42);
}

#[test]
fn cgb_wram_banks() {
    let mut gb = TestRom::new(IDLE).cgb().boot();
    gb.bus.write8(0xFF70, 0x02);
    gb.bus.write8(0xD000, 0x22);
    gb.bus.write8(0xFF70, 0x03);
    assert_eq!(gb.bus.read8(0xD000), 0x00);
    gb.bus.write8(0xFF70, 0x00);
    assert_eq!(gb.bus.read8(0xFF70), 0xF8);
    gb.bus.write8(0xD000, 0x11);
    gb.bus.write8(0xFF70, 0x01);
    assert_eq!(gb.bus.read8(0xD000), 0x11);
    gb.bus.write8(0xFF70, 0x02);
    assert_eq!(gb.bus.read8(0xD000), 0x22);
}

#[test]
fn oam_dma_copies_a_page() {
    let mut gb = TestRom::new(IDLE).boot();
    gb.bus.write8(0xFF40, 0x00);
    for i in 0..0xA0u16 {
        gb.bus.write8(0xC100 + i, i as u8);
    }
    gb.bus.write8(0xFF46, 0xC1);
    assert_eq!(gb.bus.read8(0xFF46), 0xC1);
    for i in 0..0xA0u16 {
        assert_eq!(gb.bus.read8(0xFE00 + i), i as u8);
    }
}

#[test]
fn general_hdma_copies_blocks_to_vram() {
    let mut gb = TestRom::new(IDLE).cgb().boot();
    for i in 0..0x20u16 {
        gb.bus.write8(0xC000 + i, i as u8 + 1);
    }
    gb.bus.write8(0xFF51, 0xC0);
    gb.bus.write8(0xFF52, 0x00);
    gb.bus.write8(0xFF53, 0x00);
    gb.bus.write8(0xFF54, 0x10);
    gb.bus.write8(0xFF55, 0x01);
    for i in 0..0x20u16 {
        assert_eq!(gb.bus.ppu.read_vram_direct(0x8010 + i), i as u8 + 1);
    }
    assert_eq!(gb.bus.read8(0xFF55), 0xFF);
}

#[test]
fn hblank_hdma_moves_one_block_per_line() {
    let mut gb = TestRom::new(IDLE).cgb().boot();
    for i in 0..0x20u16 {
        gb.bus.write8(0xC000 + i, 0x77);
    }
    gb.bus.write8(0xFF51, 0xC0);
    gb.bus.write8(0xFF52, 0x00);
    gb.bus.write8(0xFF53, 0x00);
    gb.bus.write8(0xFF54, 0x00);
    gb.bus.write8(0xFF55, 0x81);
    assert_eq!(gb.bus.read8(0xFF55), 0x01);

    gb.bus.end_instruction(456);
    assert_eq!(gb.bus.read8(0xFF55), 0x00);
    assert_eq!(gb.bus.ppu.read_vram_direct(0x800F), 0x77);
    assert_eq!(gb.bus.ppu.read_vram_direct(0x8010), 0x00);

    gb.bus.end_instruction(456);
    assert_eq!(gb.bus.read8(0xFF55), 0xFF);
    assert_eq!(gb.bus.ppu.read_vram_direct(0x801F), 0x77);
}

#[test]
fn stop_with_key1_armed_switches_speed() {
    // LD A,$01; LDH ($4D),A; STOP
    let mut gb = TestRom::new(&[0x3E, 0x01, 0xE0, 0x4D, 0x10, 0x00, 0x18, 0xFE])
        .cgb()
        .boot();
    assert_eq!(gb.bus.read8(0xFF4D), 0x7E);
    gb.run_frame();
    assert!(gb.double_speed());
    assert!(!gb.cpu().is_stopped());
    assert_eq!(gb.bus.read8(0xFF4D), 0xFE);
    gb.run_frame();
}

#[test]
fn reset_keeps_cartridge_ram() {
    let program = [
        0x3E, 0x0A, 0xEA, 0x00, 0x00, // enable RAM
        0x3E, 0x42, 0xEA, 0x00, 0xA0, // ($A000) = $42
        0x18, 0xFE,
    ];
    let mut gb = TestRom::new(&program).cart(0x03, 0x00, 0x02).boot();
    gb.run_frame();
    assert_eq!(gb.cartridge_ram().unwrap()[0], 0x42);

    gb.reset();
    assert_eq!(gb.cpu().regs.pc, 0x0100);
    assert_eq!(gb.cartridge_ram().unwrap()[0], 0x42);
    // Mapper is back to power-on: RAM disabled.
    assert_eq!(gb.bus.read8(0xA000), 0xFF);
}

#[test]
fn battery_ram_round_trip() {
    let mut gb = TestRom::new(IDLE).cart(0x03, 0x00, 0x02).boot();
    gb.load_cartridge_ram(&vec![7; 0x2000]);
    assert!(gb.cartridge_ram().unwrap().iter().all(|&b| b == 7));

    let plain = TestRom::new(IDLE).cart(0x02, 0x00, 0x02).boot();
    assert!(plain.cartridge_ram().is_none());
}

// --- save states ---

/// INC A; LDH ($42),A; JR -5
const SCROLLER: &[u8] = &[0x3C, 0xE0, 0x42, 0x18, 0xFB];

#[test]
fn load_state_replays_identically() {
    let mut gb = TestRom::new(SCROLLER).boot();
    for _ in 0..3 {
        gb.run_frame();
    }
    let state = gb.save_state().unwrap();

    let expected: Vec<Vec<u16>> = (0..5).map(|_| gb.run_frame().pixels().to_vec()).collect();
    let after = gb.save_state().unwrap();

    gb.load_state(&state).unwrap();
    for frame in &expected {
        assert_eq!(gb.run_frame().pixels(), &frame[..]);
    }
    assert_eq!(gb.save_state().unwrap(), after);
}

#[test]
fn load_state_keeps_host_settings() {
    let mut gb = TestRom::new(SCROLLER).boot();
    let state = gb.save_state().unwrap();
    gb.set_sample_rate(22_050);
    gb.load_state(&state).unwrap();
    assert_eq!(gb.sample_rate(), 22_050);
}

#[test]
fn dmg_palettes_survive_state_load_and_reset() {
    let mut gb = TestRom::new(SCROLLER).boot();
    let state = gb.save_state().unwrap();
    let mut palettes = DmgPalettes::uniform([Color::WHITE, Color::WHITE, Color::BLACK, Color::BLACK]);
    gb.set_dmg_palettes(palettes.clone());

    gb.load_state(&state).unwrap();
    assert_eq!(gb.bus.ppu.dmg_colors(), [0x7FFF, 0x7FFF, 0, 0]);
    gb.reset();
    assert_eq!(gb.bus.ppu.dmg_colors(), [0x7FFF, 0x7FFF, 0, 0]);

    palettes.prefer_dmg_colors = true;
    gb.set_dmg_palettes(palettes);
    assert_eq!(gb.bus.ppu.dmg_colors(), DEFAULT_DMG_PALETTE.map(|c| c.to_rgb555()));
}

#[test]
fn scaled_frames_follow_the_clock_multiplier() {
    let rom = TestRom::new(SCROLLER);
    let started = |multiplier| {
        let mut gb = rom.boot();
        gb.set_clock_multiplier(multiplier);
        gb
    };

    let mut slow = started(0.25);
    let start = slow.save_state().unwrap();
    for _ in 0..3 {
        slow.run_scaled_frame();
    }
    assert_eq!(slow.save_state().unwrap(), start);
    slow.run_scaled_frame();
    let mut reference = started(0.25);
    reference.run_frame();
    assert_eq!(slow.save_state().unwrap(), reference.save_state().unwrap());

    let mut fast = started(2.5);
    fast.run_scaled_frame();
    fast.run_scaled_frame();
    let mut reference = started(2.5);
    for _ in 0..5 {
        reference.run_frame();
    }
    assert_eq!(fast.save_state().unwrap(), reference.save_state().unwrap());

    fast.set_clock_multiplier(100.0);
    assert_eq!(fast.clock_multiplier(), 4.0);
    fast.reset();
    assert_eq!(fast.clock_multiplier(), 4.0);
}

#[test]
fn corrupt_states_are_rejected_without_side_effects() {
    let mut gb = TestRom::new(SCROLLER).boot();
    gb.run_frame();
    let good = gb.save_state().unwrap();
    gb.run_frame();
    let before = gb.save_state().unwrap();

    let mut bad_magic = good.clone();
    bad_magic[0] ^= 0xFF;
    let mut bad_version = good.clone();
    bad_version[4] = 0x7F;
    let truncated = good[..good.len() - 1].to_vec();
    let mut trailing = good.clone();
    trailing.push(0);

    for bytes in [bad_magic, bad_version, truncated, trailing, vec![1, 2]] {
        let err = gb.load_state(&bytes).unwrap_err();
        assert!(matches!(err, Error::CorruptState { .. }), "{err:?}");
        assert_eq!(gb.save_state().unwrap(), before);
    }
}

/// Save a state from a machine altered by `tamper` and check that a fresh
/// machine on the same cartridge refuses it and keeps running.
pub(super) fn assert_tampered_state_rejected(rom: &TestRom, tamper: impl FnOnce(&mut GameBoy)) {
    let mut donor = rom.boot();
    donor.run_frame();
    tamper(&mut donor);
    let bytes = donor.save_state().unwrap();

    let mut gb = rom.boot();
    gb.run_frame();
    let before = gb.save_state().unwrap();
    let err = gb.load_state(&bytes).unwrap_err();
    assert!(matches!(err, Error::CorruptState { .. }), "{err:?}");
    assert_eq!(gb.save_state().unwrap(), before);
    gb.run_frame();
}

#[test]
fn state_from_another_cartridge_is_rejected() {
    let mut gb = TestRom::new(SCROLLER).boot();
    let other = TestRom::new(IDLE).boot();
    let err = gb.load_state(&other.save_state().unwrap()).unwrap_err();
    assert!(matches!(err, Error::CorruptState { .. }));
}
