//! Run a ROM headless for a number of frames and write the last frame as a
//! binary PPM. Handy for eyeballing test ROM results without SDL.

use std::path::PathBuf;

use lumaboy_gb::{EmulatorConfig, GameBoy, SCREEN_HEIGHT, SCREEN_WIDTH};

const USAGE: &str = "Usage: gb_frame_dump <rom_path> <out.ppm> [frames]";

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(rom_path), Some(out_path)) = (args.next(), args.next()) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    let (rom_path, out_path) = (PathBuf::from(rom_path), PathBuf::from(out_path));
    let frames: u32 = match args.next().map(|arg| arg.parse()) {
        None => 120,
        Some(Ok(frames)) => frames,
        Some(Err(_)) => {
            eprintln!("Invalid frame count.\n{USAGE}");
            std::process::exit(2);
        }
    };

    let rom = std::fs::read(&rom_path).unwrap_or_else(|err| {
        eprintln!("Failed to read ROM '{}': {err}", rom_path.display());
        std::process::exit(1);
    });

    let mut gb = GameBoy::new(&rom, &EmulatorConfig::default()).unwrap_or_else(|err| {
        eprintln!("Failed to load ROM '{}': {err}", rom_path.display());
        std::process::exit(1);
    });

    for _ in 0..frames {
        gb.run_frame();
    }

    let mut pixels = vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT * 3];
    gb.frame().write_rgb24(&mut pixels);

    std::fs::write(&out_path, ppm(&pixels)).unwrap_or_else(|err| {
        eprintln!("Failed to write '{}': {err}", out_path.display());
        std::process::exit(1);
    });

    println!(
        "Wrote {}x{} frame after {} frames of '{}' to '{}'",
        SCREEN_WIDTH,
        SCREEN_HEIGHT,
        frames,
        gb.cartridge_info().title,
        out_path.display()
    );
}

/// Binary PPM (P6) image of an RGB24 screen.
fn ppm(pixels: &[u8]) -> Vec<u8> {
    let header = format!("P6\n{SCREEN_WIDTH} {SCREEN_HEIGHT}\n255\n");
    let mut ppm = Vec::with_capacity(header.len() + pixels.len());
    ppm.extend_from_slice(header.as_bytes());
    ppm.extend_from_slice(pixels);
    ppm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ppm_has_header_then_pixels() {
        let pixels = vec![0x7Fu8; SCREEN_WIDTH * SCREEN_HEIGHT * 3];
        let image = ppm(&pixels);
        let header = b"P6\n160 144\n255\n";
        assert_eq!(&image[..header.len()], header);
        assert_eq!(&image[header.len()..], &pixels[..]);
    }
}
