/// Command line front end: parses options, picks a driver and runs the pump
use anyhow::{bail, Context, Result};
use ledcube_core::{Config, FramePump, MemoryDriver};
use std::path::PathBuf;

pub mod preview;

pub use preview::TerminalPreview;

pub const USAGE: &str = "\
Usage: ledcube [options]

  -b <0-255>           brightness
  -w <n>               panel width in LEDs
  -h <n>               panel height in LEDs
  -s <ms>              minimum time between frames
  -c <n>               frames to show, 0 runs until Q is pressed
  -f <file.stl>        model to show instead of the cube
  --tile-width <n>     width of one physical tile
  --tile-height <n>    height of one physical tile
  --trust-normals      use the STL facet normals for culling
  --config <file.ron>  read defaults from a RON file
  --headless           render into memory instead of the terminal
  --help               show this message";

/// Everything the binary needs to run
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub config: Config,
    pub headless: bool,
}

fn value<'a>(flag: &str, args: &mut impl Iterator<Item = &'a String>) -> Result<&'a str> {
    args.next()
        .map(String::as_str)
        .with_context(|| format!("{} needs a value", flag))
}

fn number<'a, T>(flag: &str, args: &mut impl Iterator<Item = &'a String>) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = value(flag, args)?;
    raw.parse()
        .with_context(|| format!("invalid value {:?} for {}", raw, flag))
}

/// Parse command line arguments (without the program name).
///
/// A `--config` file is applied first wherever it appears, other flags
/// override it. Returns `None` when help was requested.
pub fn parse_args<I>(args: I) -> Result<Option<Options>>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();

    let mut config = match args.iter().position(|a| a == "--config") {
        Some(i) => {
            let path = args.get(i + 1).context("--config needs a value")?;
            Config::load(path).with_context(|| format!("reading config {}", path))?
        }
        None => Config::default(),
    };
    let mut headless = false;

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "-b" => config.brightness = number(flag, &mut iter)?,
            "-w" => config.width = number(flag, &mut iter)?,
            "-h" => config.height = number(flag, &mut iter)?,
            "-s" => config.sleep_ms = number(flag, &mut iter)?,
            "-c" => config.cycles = number(flag, &mut iter)?,
            "-f" => config.model = Some(PathBuf::from(value(flag, &mut iter)?)),
            "--tile-width" => config.tile_width = Some(number(flag, &mut iter)?),
            "--tile-height" => config.tile_height = Some(number(flag, &mut iter)?),
            "--trust-normals" => config.trust_normals = true,
            "--config" => {
                iter.next();
            }
            "--headless" => headless = true,
            "--help" => return Ok(None),
            other => bail!("unknown argument {:?}\n\n{}", other, USAGE),
        }
    }

    config.validate()?;
    Ok(Some(Options { config, headless }))
}

/// Build the pipeline from `options` and run it to completion
pub fn run(options: Options) -> Result<()> {
    let config = options.config;
    let layout = config.layout()?;
    let model = config.load_model().context("loading model")?;
    log::info!("model has {} triangles", model.len());
    let renderer = config.renderer(model)?;

    if options.headless {
        if config.cycles == 0 {
            bail!("headless runs need a cycle count (-c)");
        }
        let mut pump = FramePump::new(renderer, layout, MemoryDriver::new(layout.len()))?;
        pump.run(config.cycles, config.frame_interval())?;
        let frames = pump.frames();
        let driver = pump.into_driver();
        log::info!(
            "rendered {} frames into {} LEDs with {} driver renders",
            frames,
            driver.shown().len(),
            driver.renders()
        );
    } else {
        let preview = TerminalPreview::stdout(layout, config.brightness);
        let mut pump = FramePump::new(renderer, layout, preview)?;
        pump.run(config.cycles, config.frame_interval())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Options>> {
        parse_args(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn test_defaults() {
        let options = parse(&[]).unwrap().unwrap();
        assert_eq!(options.config, Config::default());
        assert!(!options.headless);
    }

    #[test]
    fn test_flags_override_defaults() {
        let options = parse(&[
            "-b", "90", "-w", "8", "-h", "16", "--tile-height", "8", "-s", "20", "-c", "3",
            "--headless",
        ])
        .unwrap()
        .unwrap();
        assert_eq!(options.config.brightness, 90);
        assert_eq!(options.config.width, 8);
        assert_eq!(options.config.layout().unwrap().tiles(), 2);
        assert_eq!(options.config.cycles, 3);
        assert!(options.headless);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(parse(&["-w"]).is_err());
        assert!(parse(&["-w", "wide"]).is_err());
        assert!(parse(&["-w", "0"]).is_err());
        assert!(parse(&["--frobnicate"]).is_err());
        assert!(parse(&["--tile-width", "16"]).is_err());
        assert_eq!(parse(&["--help"]).unwrap(), None);
    }

    #[test]
    fn test_headless_run() {
        let options = parse(&["-w", "8", "-h", "8", "-s", "0", "-c", "2", "--headless"])
            .unwrap()
            .unwrap();
        run(options).unwrap();
    }
}
