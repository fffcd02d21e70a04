use anyhow::{anyhow, Result};
use std::env;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use glyphpad::classify::ClassifyClient;
use glyphpad::gui::{self, GlyphPadApp};

const DEFAULT_BACKEND_URL: &str = "http://localhost:5050";

#[derive(Debug, Clone)]
struct Options {
    backend_url: String,
    frame_width: u32,
    frame_height: u32,
    frame_margin: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            frame_width: gui::DEFAULT_FRAME_WIDTH,
            frame_height: gui::DEFAULT_FRAME_HEIGHT,
            frame_margin: gui::DEFAULT_FRAME_MARGIN,
        }
    }
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-b" | "--backend" if i + 1 < args.len() => {
                options.backend_url = args[i + 1].clone();
                i += 1;
            }
            "-f" | "--frame" if i + 1 < args.len() => {
                let (width, height) = parse_frame(&args[i + 1])?;
                options.frame_width = width;
                options.frame_height = height;
                i += 1;
            }
            "-m" | "--margin" if i + 1 < args.len() => {
                let margin = f64::from_str(&args[i + 1])
                    .map_err(|_| anyhow!("Invalid margin: {}", args[i + 1]))?;
                if margin <= 0.0 || margin >= 0.5 {
                    return Err(anyhow!("Margin must be in (0, 0.5), got {margin}"));
                }
                options.frame_margin = margin;
                i += 1;
            }
            other => return Err(anyhow!("Unknown argument: {other}")),
        }
        i += 1;
    }
    Ok(options)
}

fn parse_frame(arg: &str) -> Result<(u32, u32)> {
    let parts: Vec<&str> = arg.split('x').collect();
    if parts.len() != 2 {
        return Err(anyhow!("Invalid frame format: {arg}, expected WIDTHxHEIGHT"));
    }
    let width = u32::from_str(parts[0])?;
    let height = u32::from_str(parts[1])?;
    if width == 0 || height == 0 {
        return Err(anyhow!("Frame dimensions must be positive, got {arg}"));
    }
    Ok((width, height))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_options(&args)?;
    tracing::info!(
        backend = %options.backend_url,
        frame = %format!("{}x{}", options.frame_width, options.frame_height),
        margin = options.frame_margin,
        "starting"
    );

    let client = ClassifyClient::new(&options.backend_url)?;
    let app = GlyphPadApp::new(
        client,
        options.frame_width,
        options.frame_height,
        options.frame_margin,
    );
    gui::run_gui(app).map_err(|e| anyhow!("GUI error: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(args: &[&str]) -> Result<Options> {
        let owned: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        parse_options(&owned)
    }

    #[test]
    fn test_defaults_without_arguments() {
        let options = opts(&[]).unwrap();
        assert_eq!(options.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(options.frame_width, 300);
        assert_eq!(options.frame_height, 300);
        assert_eq!(options.frame_margin, 0.1);
    }

    #[test]
    fn test_parse_all_options() {
        let options = opts(&["-b", "http://10.0.0.2:5050", "-f", "400x320", "-m", "0.2"]).unwrap();
        assert_eq!(options.backend_url, "http://10.0.0.2:5050");
        assert_eq!(options.frame_width, 400);
        assert_eq!(options.frame_height, 320);
        assert_eq!(options.frame_margin, 0.2);
    }

    #[test]
    fn test_rejects_bad_frame_and_margin() {
        assert!(opts(&["-f", "400"]).is_err());
        assert!(opts(&["-f", "0x300"]).is_err());
        // Margin bounds are exclusive at both ends.
        assert!(opts(&["-m", "0"]).is_err());
        assert!(opts(&["-m", "0.5"]).is_err());
        assert!(opts(&["-m", "-0.1"]).is_err());
        assert!(opts(&["-m", "wide"]).is_err());
        assert!(opts(&["--mystery"]).is_err());
    }
}
