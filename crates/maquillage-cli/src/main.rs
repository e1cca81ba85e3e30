mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use maquillage_core::detector::{Detection, LandmarkDetector, StaticDetector};
use maquillage_core::presets::{self, Preset};
use maquillage_core::{regions, synthetic, MakeupPipeline, MakeupSettings, RenderOptions, RenderReport};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "maquillage", about = "Landmark-driven makeup compositing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply makeup to a photo using a landmark file
    Apply {
        /// Input image
        input: PathBuf,
        /// Landmark detection JSON for the input image
        #[arg(short, long)]
        landmarks: PathBuf,
        /// Output image
        #[arg(short, long)]
        output: PathBuf,
        /// Preset name (user presets shadow built-ins)
        #[arg(short, long)]
        preset: Option<String>,
        /// Full settings file (.toml or .json), applied before the preset
        #[arg(short, long)]
        settings: Option<PathBuf>,
        /// Draw landmarks and region outlines on top
        #[arg(long)]
        debug: bool,
        /// Print the render report as JSON
        #[arg(long)]
        report: bool,
    },
    /// Render a preset on the built-in synthetic face
    Demo {
        #[arg(short, long, default_value = "glam")]
        preset: String,
        #[arg(short, long)]
        output: PathBuf,
        /// Output size multiplier
        #[arg(long, default_value_t = 2)]
        scale: u32,
        #[arg(long)]
        debug: bool,
    },
    /// List available presets
    Presets,
    /// List landmark regions
    Regions,
    /// Print the merged settings as JSON
    Settings {
        #[arg(short, long)]
        preset: Option<String>,
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Apply {
            input,
            landmarks,
            output,
            preset,
            settings,
            debug,
            report,
        } => {
            let mut pipeline = build_pipeline(&config, preset.as_deref(), settings.as_deref())?;
            let image = image::open(&input)
                .with_context(|| format!("opening {}", input.display()))?
                .to_rgba8();

            let detection = Detection::from_json_file(&landmarks)?;
            let mut detector = StaticDetector::new(detection);
            let face = detector.detect(&image)?.map(|d| d.to_pixels());
            if face.is_none() {
                tracing::warn!("no face in landmark file, writing the input unchanged");
            }

            let (image, scale) = downscale(image, config.max_dimension);
            let options = RenderOptions {
                debug_overlay: debug || config.debug_overlay,
            };
            let (out, render_report) = pipeline.render(&image, face.as_ref(), scale, &options)?;
            out.save(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            print_report(&render_report, report)?;
            println!("Wrote {}", output.display());
        }
        Commands::Demo {
            preset,
            output,
            scale,
            debug,
        } => {
            let mut pipeline = build_pipeline(&config, Some(&preset), None)?;
            let scale = scale.clamp(1, 16);
            let base = RgbaImage::from_pixel(
                synthetic::WIDTH * scale,
                synthetic::HEIGHT * scale,
                Rgba([224, 182, 160, 255]),
            );
            let face = synthetic::symmetric_face();
            let options = RenderOptions {
                debug_overlay: debug || config.debug_overlay,
            };
            let (out, report) = pipeline.render(&base, Some(&face), scale as f32, &options)?;
            out.save(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            print_report(&report, false)?;
            println!("Wrote {}", output.display());
        }
        Commands::Presets => {
            let user = if config.preset_dir.is_dir() {
                presets::load_dir(&config.preset_dir)?
            } else {
                Vec::new()
            };
            for preset in presets::builtin_presets() {
                print_preset(preset, "builtin");
            }
            for preset in &user {
                print_preset(preset, "user");
            }
        }
        Commands::Regions => {
            for region in regions::regions() {
                let shape = if region.is_closed() { "closed" } else { "open" };
                println!("{:<22} {:>3} points  {shape}", region.name, region.outline().len());
            }
        }
        Commands::Settings { preset, settings } => {
            let pipeline = build_pipeline(&config, preset.as_deref(), settings.as_deref())?;
            println!("{}", serde_json::to_string_pretty(pipeline.settings())?);
        }
    }

    Ok(())
}

/// Settings file first, then the preset's updates on top.
fn build_pipeline(config: &Config, preset: Option<&str>, settings: Option<&Path>) -> Result<MakeupPipeline> {
    let base = match settings {
        Some(path) => config::load_settings(path)?,
        None => MakeupSettings::default(),
    };
    let mut pipeline = MakeupPipeline::with_settings(base);
    if let Some(name) = preset {
        let preset = presets::find_preset(name, Some(&config.preset_dir))?;
        pipeline.apply_preset(&preset);
    }
    if !pipeline.settings().any_enabled() {
        tracing::info!("no effects enabled");
    }
    Ok(pipeline)
}

/// Shrink oversized inputs so the longer side fits `max_dimension`.
///
/// Returns the image to draw on and the source-to-destination scale.
fn downscale(image: RgbaImage, max_dimension: u32) -> (RgbaImage, f32) {
    let (w, h) = image.dimensions();
    let longest = w.max(h);
    if longest <= max_dimension {
        return (image, 1.0);
    }
    let scale = max_dimension as f32 / longest as f32;
    let nw = ((w as f32 * scale).round() as u32).max(1);
    let nh = ((h as f32 * scale).round() as u32).max(1);
    tracing::warn!(from = ?(w, h), to = ?(nw, nh), "input downscaled");
    (imageops::resize(&image, nw, nh, FilterType::Triangle), scale)
}

fn print_report(report: &RenderReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    let names = |kinds: &[maquillage_core::EffectKind]| {
        kinds.iter().map(|k| k.name()).collect::<Vec<_>>().join(", ")
    };
    println!("applied: {}", names(&report.applied));
    for (kind, error) in &report.failed {
        eprintln!("failed: {kind}: {error}");
    }
    if !report.is_clean() {
        bail!("{} effect(s) failed", report.failed.len());
    }
    Ok(())
}

fn print_preset(preset: &Preset, origin: &str) {
    let effects: Vec<&str> = preset.effects().iter().map(|k| k.name()).collect();
    println!(
        "{:<12} {:<8} {}  [{}]",
        preset.name,
        origin,
        preset.description.as_deref().unwrap_or(""),
        effects.join(", ")
    );
}
