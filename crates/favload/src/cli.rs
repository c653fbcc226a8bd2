use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use renderer::{Color, Shape};

#[derive(Parser, Debug)]
#[command(
    name = "favload",
    author,
    version,
    about = "Favicon progress loader",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render one favicon frame and print the resulting title and data URL.
    Render(RenderArgs),
    /// Step a loader from 0 to max against a simulated document.
    Simulate(SimulateArgs),
    /// Print the resolved configuration directory and file.
    Where,
}

#[derive(Args, Debug, Clone, Default)]
pub struct LoaderArgs {
    /// Configuration file; defaults to `favload.toml` in the config directory.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Indicator geometry: `pie` or `donut`.
    #[arg(long, value_name = "SHAPE", value_parser = parse_shape)]
    pub shape: Option<Shape>,

    /// Title template; `{{percent}}`, `{{progress}}` and `{{max}}` are substituted.
    #[arg(long, value_name = "TEMPLATE")]
    pub message: Option<String>,

    /// Value that represents 100%.
    #[arg(long, value_name = "NUMBER")]
    pub max: Option<f64>,

    /// Comma-separated colors, e.g. `#c20000,#51c200`.
    #[arg(long, value_name = "COLORS", value_parser = parse_palette)]
    pub palette: Option<PaletteArg>,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub loader: LoaderArgs,

    /// Progress to render.
    #[arg(long, value_name = "NUMBER", default_value_t = 0.0, allow_negative_numbers = true)]
    pub progress: f64,

    /// Write the rendered favicon to this PNG path.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print a JSON report instead of plain text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub loader: LoaderArgs,

    /// Progress added per frame.
    #[arg(long, value_name = "NUMBER")]
    pub step: Option<f64>,

    /// Pause between frames (`250ms`, `1s`, or plain seconds).
    #[arg(long, value_name = "DURATION", value_parser = parse_interval)]
    pub interval: Option<Duration>,

    /// Write every frame as `frame-NNNN.png` into this directory.
    #[arg(long, value_name = "DIR")]
    pub frames: Option<PathBuf>,

    /// Title of the simulated page before the loader takes over.
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,
}

/// Palette given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteArg(pub Vec<Color>);

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_shape(value: &str) -> Result<Shape, String> {
    value.parse().map_err(|err: renderer::LoaderError| err.to_string())
}

pub fn parse_palette(value: &str) -> Result<PaletteArg, String> {
    let colors = split_palette(value)
        .into_iter()
        .map(|entry| {
            entry
                .parse::<Color>()
                .map_err(|err: renderer::LoaderError| err.to_string())
        })
        .collect::<Result<Vec<_>, _>>()?;
    if colors.is_empty() {
        return Err("palette must contain at least one color".to_string());
    }
    Ok(PaletteArg(colors))
}

pub fn parse_interval(value: &str) -> Result<Duration, String> {
    loaderconfig::parse_duration(value)
}

/// Splits on commas outside parentheses so `rgba(0, 0, 0, .5)` stays whole.
fn split_palette(value: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, ch) in value.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                entries.push(&value[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    entries.push(&value[start..]);
    entries
        .into_iter()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_palette_lists() {
        let palette = parse_palette("#c20000, rgba(0, 0, 0, .5),#51c200").unwrap();
        assert_eq!(
            palette.0,
            vec![
                Color::rgb(0xc2, 0, 0),
                Color::rgba(0, 0, 0, 128),
                Color::rgb(0x51, 0xc2, 0),
            ]
        );
        assert!(parse_palette("").is_err());
        assert!(parse_palette(" , ").is_err());
        assert!(parse_palette("#c20000,nope").is_err());
    }

    #[test]
    fn parses_shapes() {
        assert_eq!(parse_shape("donut").unwrap(), Shape::Donut);
        assert!(parse_shape("star").is_err());
    }

    #[test]
    fn render_flags_parse() {
        let cli = Cli::try_parse_from([
            "favload",
            "render",
            "--shape",
            "donut",
            "--progress",
            "42",
            "--palette",
            "#000,#fff",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Render(args) => {
                assert_eq!(args.loader.shape, Some(Shape::Donut));
                assert_eq!(args.progress, 42.0);
                assert_eq!(args.loader.palette.map(|p| p.0.len()), Some(2));
                assert!(args.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn simulate_interval_accepts_human_durations() {
        let cli = Cli::try_parse_from(["favload", "simulate", "--interval", "20ms"]).unwrap();
        match cli.command {
            Command::Simulate(args) => {
                assert_eq!(args.interval, Some(Duration::from_millis(20)));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
