use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lumaboy_gb::config::CLOCK_MULTIPLIER_RANGE;
use lumaboy_gb::{EmulatorConfig, GameBoy, GameBoyApp, ModelPreference};
use lumaboy_sdl2::App;
use lumaboy_sdl2::{SdlContext, SdlInitInfo};

/// Launcher options parsed from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub rom_path: PathBuf,
    pub model: ModelPreference,
    /// Emulated speed relative to real hardware.
    pub speed: f32,
}

pub const USAGE: &str = "Usage: lumaboy <rom_path> [--dmg|--cgb] [--speed 0.25-4]";

impl Options {
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut rom_path = None;
        let mut model = ModelPreference::Auto;
        let mut speed = 1.0;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--dmg" => model = ModelPreference::Dmg,
                "--cgb" => model = ModelPreference::Cgb,
                "--speed" => {
                    let value = args.next().context("--speed needs a value")?;
                    speed = value
                        .parse()
                        .with_context(|| format!("invalid speed '{value}'"))?;
                    if !CLOCK_MULTIPLIER_RANGE.contains(&speed) {
                        anyhow::bail!("speed {speed} is outside 0.25-4");
                    }
                }
                flag if flag.starts_with("--") => anyhow::bail!("unknown option '{flag}'"),
                path => {
                    if rom_path.replace(PathBuf::from(path)).is_some() {
                        anyhow::bail!("more than one ROM path given");
                    }
                }
            }
        }
        Ok(Self {
            rom_path: rom_path.context("no ROM path given")?,
            model,
            speed,
        })
    }
}

/// Battery RAM lives next to the ROM with a `.sav` extension.
pub fn save_path(rom_path: &Path) -> PathBuf {
    rom_path.with_extension("sav")
}

pub fn run(options: &Options) -> Result<()> {
    log::info!("Playing ROM path: '{}'", options.rom_path.display());
    let rom = std::fs::read(&options.rom_path)
        .with_context(|| format!("failed to read ROM '{}'", options.rom_path.display()))?;

    let config = EmulatorConfig::builder().model(options.model).build();
    let mut gb = GameBoy::new(&rom, &config)?;

    let sav = save_path(&options.rom_path);
    if gb.cartridge_info().has_battery {
        match std::fs::read(&sav) {
            Ok(ram) => {
                log::info!("Loaded battery RAM from '{}'", sav.display());
                gb.load_cartridge_ram(&ram);
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => log::warn!("Could not read '{}': {err}", sav.display()),
        }
    }

    let app = GameBoyApp::new(gb).with_speed(options.speed);
    let init_info = SdlInitInfo::builder()
        .width(app.width())
        .height(app.height())
        .scale(app.scale())
        .title(app.title())
        .sample_rate(app.sample_rate())
        .build();
    let app = SdlContext::run(init_info, app)?;

    let gb = app.into_inner();
    if gb.cartridge_info().has_battery {
        if let Some(ram) = gb.cartridge_ram() {
            std::fs::write(&sav, ram)
                .with_context(|| format!("failed to write '{}'", sav.display()))?;
            log::info!("Saved battery RAM to '{}'", sav.display());
        }
    }
    Ok(())
}
