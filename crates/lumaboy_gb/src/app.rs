use crate::{Buttons, GameBoy, SCREEN_HEIGHT, SCREEN_SCALE, SCREEN_WIDTH};
use lumaboy_common::app::App;
use lumaboy_common::key::Key;

/// SDL-facing wrapper around a running [`GameBoy`].
///
/// Implements the shared `App` trait so any frontend that can drive an
/// `App` (currently the SDL2 runner) can host the machine.
pub struct GameBoyApp {
    gb: GameBoy,
    buttons: Buttons,
    quick_save: Option<Vec<u8>>,
    frame_counter: u64,
    last_pc: u16,
    pc_stagnant_frames: u32,
    should_exit: bool,
}

impl GameBoyApp {
    pub fn new(gb: GameBoy) -> Self {
        let last_pc = gb.cpu().regs.pc;
        Self {
            gb,
            buttons: Buttons::empty(),
            quick_save: None,
            frame_counter: 0,
            last_pc,
            pc_stagnant_frames: 0,
            should_exit: false,
        }
    }

    /// Emulated speed relative to real hardware, from 0.25 to 4.
    pub fn with_speed(mut self, multiplier: f32) -> Self {
        self.gb.set_clock_multiplier(multiplier);
        self
    }

    pub fn gb(&self) -> &GameBoy {
        &self.gb
    }

    pub fn gb_mut(&mut self) -> &mut GameBoy {
        &mut self.gb
    }

    pub fn into_inner(self) -> GameBoy {
        self.gb
    }

    fn quick_save(&mut self) {
        match self.gb.save_state() {
            Ok(state) => {
                log::info!("GB: quick save ({} bytes)", state.len());
                self.quick_save = Some(state);
            }
            Err(err) => log::error!("GB: quick save failed: {err}"),
        }
    }

    fn quick_load(&mut self) {
        let Some(state) = self.quick_save.as_deref() else {
            log::warn!("GB: no quick save to load");
            return;
        };
        match self.gb.load_state(state) {
            Ok(()) => {
                log::info!("GB: quick save loaded");
                // Keys held now win over whatever was held at save time.
                self.gb.set_input(self.buttons);
            }
            Err(err) => log::error!("GB: quick load failed: {err}"),
        }
    }

    fn log_progress(&mut self) {
        let pc = self.gb.cpu().regs.pc;
        if pc == self.last_pc {
            self.pc_stagnant_frames = self.pc_stagnant_frames.saturating_add(1);
        } else {
            self.pc_stagnant_frames = 0;
            self.last_pc = pc;
        }

        if self.frame_counter % 600 == 0 {
            let cpu = self.gb.cpu();
            log::debug!(
                "GB: frame={} pc=0x{:04X} sp=0x{:04X} af=0x{:04X} halted={} double_speed={}",
                self.frame_counter,
                cpu.regs.pc,
                cpu.regs.sp,
                cpu.regs.af(),
                cpu.is_halted(),
                self.gb.double_speed(),
            );
        }

        if self.pc_stagnant_frames == 600 {
            let cpu = self.gb.cpu();
            log::warn!(
                "GB: PC unchanged for ~600 frames at 0x{:04X} (halted={} stopped={} locked={})",
                pc,
                cpu.is_halted(),
                cpu.is_stopped(),
                cpu.is_locked(),
            );
        }
    }
}

fn key_button(key: Key) -> Option<Buttons> {
    match key {
        Key::Up => Some(Buttons::UP),
        Key::Down => Some(Buttons::DOWN),
        Key::Left => Some(Buttons::LEFT),
        Key::Right => Some(Buttons::RIGHT),
        Key::Z => Some(Buttons::A),
        Key::X => Some(Buttons::B),
        Key::Backspace | Key::A => Some(Buttons::SELECT),
        Key::Enter | Key::S => Some(Buttons::START),
        _ => None,
    }
}

impl App for GameBoyApp {
    fn init(&mut self) {
        let info = self.gb.cartridge_info();
        log::info!(
            "GB: running '{}' ({:?}, {} ROM banks) as {:?}",
            info.title,
            info.mbc,
            info.rom_banks,
            self.gb.model()
        );
    }

    fn update(&mut self, screen_state: &mut [u8]) {
        self.gb.run_scaled_frame().write_rgb24(screen_state);
        self.frame_counter = self.frame_counter.wrapping_add(1);
        self.log_progress();
    }

    fn handle_key_event(&mut self, key: Key, is_pressed: bool) {
        log::trace!("GB key event: {:?} pressed={}", key, is_pressed);
        match key {
            Key::Escape if is_pressed => self.should_exit = true,
            Key::F5 if is_pressed => self.quick_save(),
            Key::F8 if is_pressed => self.quick_load(),
            _ => {
                if let Some(button) = key_button(key) {
                    self.buttons.set(button, is_pressed);
                    self.gb.set_input(self.buttons);
                }
            }
        }
    }

    fn audio_samples(&mut self) -> Vec<f32> {
        self.gb.audio_samples()
    }

    fn should_exit(&self) -> bool {
        self.should_exit
    }

    fn exit(&mut self) {
        log::info!("GB: exit after {} frames", self.frame_counter);
    }

    fn width(&self) -> u32 {
        SCREEN_WIDTH as u32
    }

    fn height(&self) -> u32 {
        SCREEN_HEIGHT as u32
    }

    fn scale(&self) -> u32 {
        SCREEN_SCALE
    }

    fn title(&self) -> String {
        let title = &self.gb.cartridge_info().title;
        if title.is_empty() {
            "LumaBoy".to_string()
        } else {
            format!("LumaBoy - {title}")
        }
    }

    fn sample_rate(&self) -> u32 {
        self.gb.sample_rate()
    }
}
