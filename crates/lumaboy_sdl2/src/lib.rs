use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use sdl2::audio::{AudioQueue, AudioSpecDesired};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use typed_builder::TypedBuilder;

pub use lumaboy_common::app::App;
use lumaboy_common::key::Key;
pub use sdl2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    RGB24,
}

#[derive(TypedBuilder)]
pub struct SdlInitInfo {
    pub width: u32,
    pub height: u32,
    pub scale: u32,
    pub title: String,
    #[builder(default = PixelFormat::RGB24)]
    pub pixel_format: PixelFormat,
    /// Host frame period; the Game Boy refreshes at ~59.73 Hz.
    #[builder(default = Duration::from_micros(16_742))]
    pub frame_time: Duration,
    /// Audio device rate in Hz. `None` runs without sound.
    #[builder(default, setter(strip_option))]
    pub sample_rate: Option<u32>,
}

pub struct SdlContext;

impl SdlContext {
    /// Drive `app` until it asks to exit or the window closes, then hand it
    /// back so the caller can persist whatever it needs to.
    pub fn run<A: App>(sdl_init_info: SdlInitInfo, mut app: A) -> Result<A> {
        let SdlInitInfo {
            width,
            height,
            scale,
            title,
            pixel_format,
            frame_time,
            sample_rate,
        } = sdl_init_info;
        let sdl_context = sdl2::init().map_err(|e| anyhow!(e))?;
        let video_subsystem = sdl_context.video().map_err(|e| anyhow!(e))?;
        let window = video_subsystem
            .window(&title, width * scale, height * scale)
            .position_centered()
            .build()?;
        let mut canvas = window.into_canvas().present_vsync().build()?;
        let creator = canvas.texture_creator();
        let mut texture =
            creator.create_texture_streaming(map_pixel_format(pixel_format), width, height)?;

        let audio = match sample_rate {
            Some(rate) => open_audio(&sdl_context, rate)
                .map_err(|err| log::warn!("SDL: audio disabled: {err}"))
                .ok(),
            None => None,
        };
        // Keep at most ~100 ms queued; beyond that new samples are dropped.
        let max_queued_bytes = sample_rate.map_or(0, |rate| rate / 10 * 2 * 4);

        let color_size = map_pixel_format_size(pixel_format);
        let mut screen_state = vec![0u8; (width * color_size * height) as usize];
        let mut event_pump = sdl_context.event_pump().map_err(|e| anyhow!(e))?;
        app.init();
        loop {
            let frame_start = Instant::now();
            if app.should_exit() {
                app.exit();
                break;
            }

            for event in event_pump.poll_iter() {
                match event {
                    Event::Quit { .. } => {
                        app.exit();
                        return Ok(app);
                    }
                    Event::KeyDown {
                        keycode: Some(keycode),
                        repeat: false,
                        ..
                    } => app.handle_key_event(map_keycode(keycode), true),
                    Event::KeyUp {
                        keycode: Some(keycode),
                        ..
                    } => app.handle_key_event(map_keycode(keycode), false),
                    _ => {}
                }
            }

            app.update(&mut screen_state);

            let samples = app.audio_samples();
            if let Some(queue) = audio.as_ref() {
                if queue.size() < max_queued_bytes {
                    queue.queue_audio(&samples).map_err(|e| anyhow!(e))?;
                } else {
                    log::trace!("SDL: audio queue full, dropped {} samples", samples.len());
                }
            }

            texture.update(None, &screen_state, (width * color_size) as usize)?;
            canvas.copy(&texture, None, None).map_err(|e| anyhow!(e))?;
            canvas.present();

            if let Some(rest) = frame_time.checked_sub(frame_start.elapsed()) {
                std::thread::sleep(rest);
            }
        }

        Ok(app)
    }
}

fn open_audio(sdl_context: &sdl2::Sdl, sample_rate: u32) -> Result<AudioQueue<f32>> {
    let audio_subsystem = sdl_context.audio().map_err(|e| anyhow!(e))?;
    let desired = AudioSpecDesired {
        freq: Some(i32::try_from(sample_rate)?),
        channels: Some(2),
        samples: Some(1024),
    };
    let queue = audio_subsystem
        .open_queue::<f32, _>(None, &desired)
        .map_err(|e| anyhow!(e))?;
    log::info!("SDL: audio {:?}", queue.spec());
    queue.resume();
    Ok(queue)
}

pub fn map_pixel_format(pixel_format: PixelFormat) -> PixelFormatEnum {
    match pixel_format {
        PixelFormat::RGB24 => PixelFormatEnum::RGB24,
    }
}

pub fn map_pixel_format_size(pixel_format: PixelFormat) -> u32 {
    match pixel_format {
        PixelFormat::RGB24 => 3,
    }
}

pub fn map_keycode(keycode: Keycode) -> Key {
    match keycode {
        Keycode::Up => Key::Up,
        Keycode::Down => Key::Down,
        Keycode::Left => Key::Left,
        Keycode::Right => Key::Right,
        Keycode::Z => Key::Z,
        Keycode::X => Key::X,
        Keycode::A => Key::A,
        Keycode::S => Key::S,
        Keycode::Return => Key::Enter,
        Keycode::Backspace => Key::Backspace,
        Keycode::Escape => Key::Escape,
        Keycode::F5 => Key::F5,
        Keycode::F8 => Key::F8,
        _ => Key::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keycodes_map_to_keys() {
        assert_eq!(map_keycode(Keycode::Return), Key::Enter);
        assert_eq!(map_keycode(Keycode::Left), Key::Left);
        assert_eq!(map_keycode(Keycode::Q), Key::None);
    }

    #[test]
    fn init_info_defaults() {
        let info = SdlInitInfo::builder()
            .width(160)
            .height(144)
            .scale(4)
            .title("LumaBoy".to_string())
            .build();
        assert_eq!(info.pixel_format, PixelFormat::RGB24);
        assert_eq!(info.sample_rate, None);
        assert_eq!(map_pixel_format_size(info.pixel_format), 3);
    }
}
