use std::fs;
use std::path::Path;
use std::thread;

use anyhow::{bail, Context, Result};
use loaderconfig::{LoaderConfig, SimulationSection};
use renderer::{
    effective_progress, percent, DocumentHost, FaviconLoader, LoaderOptions, MemoryDocument,
    RasterSurface, Shape,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::{LoaderArgs, RenderArgs, SimulateArgs};
use crate::paths::AppPaths;

type MemoryLoader = FaviconLoader<MemoryDocument, RasterSurface>;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Serialize)]
struct RenderReport {
    title: String,
    href: String,
    shape: Shape,
    progress: f64,
    max: f64,
    percent: f64,
}

pub fn render(args: RenderArgs) -> Result<()> {
    let config = load_config(&args.loader)?;
    let options = merged_options(&args.loader, &config);
    let mut loader = build_loader(&config.simulation, None, options)?;
    loader
        .set_progress(args.progress)
        .context("failed to apply progress")?;

    if let Some(path) = args.output.as_ref() {
        write_frame(&loader, path)?;
        tracing::info!(path = %path.display(), "wrote favicon frame");
    }

    let report = RenderReport {
        title: loader.host().title(),
        href: own_href(&loader),
        shape: loader.shape(),
        progress: loader.progress(),
        max: loader.max(),
        percent: percent(
            effective_progress(loader.progress(), loader.max()),
            loader.max(),
        ),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .context("failed to serialize render report")?;
        println!("{json}");
    } else {
        println!("title: {}", report.title);
        println!("href:  {}", report.href);
    }
    Ok(())
}

pub fn simulate(args: SimulateArgs) -> Result<()> {
    let config = load_config(&args.loader)?;
    let options = merged_options(&args.loader, &config);
    let step = args.step.unwrap_or(config.simulation.step);
    let interval = args.interval.unwrap_or(config.simulation.interval);

    if let Some(dir) = args.frames.as_ref() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create frame directory {}", dir.display()))?;
    }

    let mut loader = build_loader(&config.simulation, args.title.as_deref(), options)?;
    let max = loader.max();
    let frames = frame_count(max, step)?;
    tracing::info!(
        shape = %loader.shape(),
        max,
        step,
        frames,
        interval = ?interval,
        "starting simulation"
    );

    for frame in 0..frames {
        let progress = if frame + 1 == frames {
            max
        } else {
            (frame as f64 * step).min(max)
        };
        loader
            .set_progress(progress)
            .with_context(|| format!("failed to render frame {frame}"))?;
        let title = loader.host().title();
        tracing::debug!(frame, progress, title = %title, "rendered frame");
        println!("{frame:>4}  {title}");

        if let Some(dir) = args.frames.as_ref() {
            write_frame(&loader, &dir.join(format!("frame-{frame:04}.png")))?;
        }

        if frame + 1 < frames && !interval.is_zero() {
            thread::sleep(interval);
        }
    }

    loader.switch_loader(false);
    let restored = loader.host().icon_hrefs();
    tracing::info!(frames, restored = restored.len(), "simulation complete");
    if restored.is_empty() {
        println!("restored icons: (none)");
    } else {
        println!("restored icons: {}", restored.join(", "));
    }
    Ok(())
}

/// Most frames a single simulation may render.
const MAX_FRAMES: u64 = 100_000;

/// Frames needed to walk from 0 to `max` in `step` increments, including both
/// ends.
fn frame_count(max: f64, step: f64) -> Result<u64> {
    if !step.is_finite() || step <= 0.0 {
        bail!("step must be greater than zero (got {step})");
    }
    let steps = (max / step).ceil();
    if !steps.is_finite() || steps >= MAX_FRAMES as f64 {
        bail!("simulating max {max} in steps of {step} needs more than {MAX_FRAMES} frames");
    }
    Ok(steps as u64 + 1)
}

pub fn describe_paths() -> Result<()> {
    let paths = AppPaths::discover()?;
    let config_file = paths.config_file();
    println!("Configuration:");
    println!("  config dir:  {}", paths.config_dir().display());
    println!(
        "  config file: {} ({})",
        config_file.display(),
        if config_file.exists() {
            "present"
        } else {
            "missing"
        }
    );
    Ok(())
}

fn load_config(args: &LoaderArgs) -> Result<LoaderConfig> {
    if let Some(path) = args.config.as_ref() {
        return read_config(path);
    }

    match AppPaths::discover() {
        Ok(paths) => {
            let path = paths.config_file();
            if path.exists() {
                read_config(&path)
            } else {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                Ok(LoaderConfig::default())
            }
        }
        Err(err) => {
            tracing::debug!(%err, "config directory unavailable; using defaults");
            Ok(LoaderConfig::default())
        }
    }
}

fn read_config(path: &Path) -> Result<LoaderConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config = LoaderConfig::from_toml_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Command-line flags win over the config file.
fn merged_options(args: &LoaderArgs, config: &LoaderConfig) -> LoaderOptions {
    let mut options = config.loader.to_options();
    if let Some(shape) = args.shape {
        options.shape = shape;
    }
    if let Some(message) = args.message.as_ref() {
        options.message = Some(message.clone());
    }
    if let Some(max) = args.max {
        options.max = Some(max);
    }
    if let Some(palette) = args.palette.as_ref() {
        options.palette = Some(palette.0.clone());
    }
    options
}

fn simulated_document(simulation: &SimulationSection, title: Option<&str>) -> MemoryDocument {
    let title = title.unwrap_or(simulation.title.as_str());
    simulation
        .icons
        .iter()
        .fold(MemoryDocument::new(title), |doc, href| {
            doc.with_link("icon", href.as_str())
        })
}

fn build_loader(
    simulation: &SimulationSection,
    title: Option<&str>,
    options: LoaderOptions,
) -> Result<MemoryLoader> {
    let document = simulated_document(simulation, title);
    FaviconLoader::with_raster(document, options).context("failed to construct favicon loader")
}

fn own_href(loader: &MemoryLoader) -> String {
    loader
        .host()
        .href(*loader.own_link())
        .unwrap_or_default()
        .to_string()
}

fn write_frame(loader: &MemoryLoader, path: &Path) -> Result<()> {
    loader
        .surface()
        .write_png(path)
        .with_context(|| format!("failed to write frame to {}", path.display()))
}
