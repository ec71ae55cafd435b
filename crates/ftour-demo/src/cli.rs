#![forbid(unsafe_code)]

//! Command-line argument parsing for the tour demo.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `FTOUR_DEMO_*` prefix; explicit flags win.

use std::env;
use std::path::PathBuf;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
FrankenTour Demo: a guided tour of the city hall portal, played headless

USAGE:
    ftour-demo [OPTIONS]

OPTIONS:
    --script=PATH        Load the tour from a JSON step array instead of the built-in one
    --speed=F            Playback speed, 0.25 to 4 (default: 1)
    --mute               Start with narration muted
    --no-autostart       Start paused; playback begins after one second
    --viewport=WxH       Host viewport in pixels (default: 1280x800)
    --frames             Print the overlay every 500 ms, not only on step changes
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    FTOUR_DEMO_SCRIPT         Override --script
    FTOUR_DEMO_SPEED          Override --speed
    FTOUR_DEMO_MUTE           Set to 1 for --mute
    FTOUR_DEMO_NO_AUTOSTART   Set to 1 for --no-autostart
    FTOUR_DEMO_VIEWPORT       Override --viewport
    FTOUR_DEMO_FRAMES         Set to 1 for --frames
    FTOUR_*                   Tour timings, see ftour-runtime::config
    RUST_LOG                  Log filter (default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    /// Script file; `None` plays the built-in tour.
    pub script: Option<PathBuf>,
    pub speed: f64,
    pub mute: bool,
    pub autostart: bool,
    /// Viewport width and height in pixels.
    pub viewport: (f32, f32),
    /// Print every frame instead of step changes only.
    pub frames: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            script: None,
            speed: 1.0,
            mute: false,
            autostart: true,
            viewport: (1280.0, 800.0),
            frames: false,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

impl Opts {
    /// Parse the process arguments and environment, exiting on `--help`,
    /// `--version`, or a bad value.
    pub fn parse() -> Self {
        match Self::parse_from(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(Command::Run(opts)) => opts,
            Ok(Command::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Command::Version) => {
                println!("ftour-demo {VERSION}");
                process::exit(0);
            }
            Err(message) => {
                eprintln!("{message}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` with environment values read through `lookup`.
    pub fn parse_from(
        args: impl IntoIterator<Item = String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Command, String> {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = lookup("FTOUR_DEMO_SCRIPT") {
            opts.script = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("FTOUR_DEMO_SPEED")
            && let Ok(n) = val.parse()
        {
            opts.speed = n;
        }
        if lookup("FTOUR_DEMO_MUTE").is_some_and(|v| is_truthy(&v)) {
            opts.mute = true;
        }
        if lookup("FTOUR_DEMO_NO_AUTOSTART").is_some_and(|v| is_truthy(&v)) {
            opts.autostart = false;
        }
        if let Some(val) = lookup("FTOUR_DEMO_VIEWPORT")
            && let Some(size) = parse_viewport(&val)
        {
            opts.viewport = size;
        }
        if lookup("FTOUR_DEMO_FRAMES").is_some_and(|v| is_truthy(&v)) {
            opts.frames = true;
        }

        // Command-line args override env vars
        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                "--mute" => opts.mute = true,
                "--no-autostart" => opts.autostart = false,
                "--frames" => opts.frames = true,
                other => {
                    if let Some(val) = other.strip_prefix("--script=") {
                        opts.script = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--speed=") {
                        match val.parse::<f64>() {
                            Ok(n) if n.is_finite() && n > 0.0 => opts.speed = n,
                            _ => return Err(format!("Invalid --speed value: {val}")),
                        }
                    } else if let Some(val) = other.strip_prefix("--viewport=") {
                        match parse_viewport(val) {
                            Some(size) => opts.viewport = size,
                            None => return Err(format!("Invalid --viewport value: {val}")),
                        }
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }

        Ok(Command::Run(opts))
    }
}

/// Parse `WIDTHxHEIGHT`, both positive.
pub fn parse_viewport(value: &str) -> Option<(f32, f32)> {
    let (w, h) = value.split_once(['x', 'X'])?;
    let w: f32 = w.trim().parse().ok()?;
    let h: f32 = h.trim().parse().ok()?;
    (w > 0.0 && h > 0.0).then_some((w, h))
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
