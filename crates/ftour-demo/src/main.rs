#![forbid(unsafe_code)]

//! FrankenTour demo binary entry point.

use std::error::Error;
use std::process;
use std::time::Duration;

use ftour_core::geometry::Viewport;
use ftour_demo::cli;
use ftour_demo::host::portal_host;
use ftour_demo::render::{render_overlay, render_panel};
use ftour_runtime::{PositionBroadcaster, TourConfig, TourEvent, TrailConfig};
use ftour_script::ScriptTable;
use ftour_script::builtin::{PORTAL_ROUTES, municipal_tour};
use tracing_subscriber::EnvFilter;

/// Host frame interval.
const FRAME: Duration = Duration::from_millis(50);
/// Frame dump cadence with `--frames`.
const FRAME_DUMP: Duration = Duration::from_millis(500);
/// Paused start waits this long before pressing play.
const AUTOSTART_DELAY: Duration = Duration::from_secs(1);
const PANEL_WIDTH: usize = 72;

fn main() {
    let opts = cli::Opts::parse();
    init_logging();

    let script = match load_script(&opts) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("Failed to load tour: {e}");
            process::exit(1);
        }
    };

    let viewport = Viewport::new(opts.viewport.0, opts.viewport.1);
    let config = TourConfig::from_env().with_speed(opts.speed);
    let padding = config.spotlight_padding;
    // Generous bound so a broken script cannot spin forever.
    let limit = script
        .total_duration()
        .mul_f64(2.0 / config.speed)
        .saturating_add(Duration::from_secs(60));

    let mut wrapper = PositionBroadcaster::new(TrailConfig::from_env());
    wrapper.start_tour(script, portal_host(viewport), config, opts.autostart);
    if opts.mute
        && let Some(controller) = wrapper.controller_mut()
    {
        controller.toggle_mute();
    }

    let mut clock = Duration::ZERO;
    let mut next_dump = Duration::ZERO;
    let mut waiting_for_play = !opts.autostart;
    loop {
        let mut step_changed = false;
        for event in wrapper.drain_events() {
            tracing::debug!(?event, "tour event");
            step_changed |= matches!(
                event,
                TourEvent::Started { .. } | TourEvent::StepChanged { .. }
            );
        }
        if step_changed || (opts.frames && clock >= next_dump) {
            print_frame(&wrapper, viewport, padding, clock);
            next_dump = clock + FRAME_DUMP;
        }

        let Some(controller) = wrapper.controller() else {
            break;
        };
        if controller.is_finished() || !controller.is_active() {
            break;
        }
        if clock >= limit {
            tracing::warn!(clock_ms = clock.as_millis() as u64, "tour did not finish in time");
            break;
        }
        if waiting_for_play
            && clock >= AUTOSTART_DELAY
            && let Some(controller) = wrapper.controller_mut()
        {
            controller.play_pause();
            waiting_for_play = false;
        }

        wrapper.tick(FRAME);
        clock += FRAME;
    }

    print_frame(&wrapper, viewport, padding, clock);
    wrapper.close_tour();
    println!("tour closed after {:.1}s", clock.as_secs_f32());
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn load_script(opts: &cli::Opts) -> Result<ScriptTable, Box<dyn Error>> {
    let script = match &opts.script {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("{}: {e}", path.display()))?;
            ScriptTable::from_json(&json)?
        }
        None => municipal_tour(),
    };
    script.validate_routes(|route| PORTAL_ROUTES.contains(&route))?;
    Ok(script)
}

fn print_frame(wrapper: &PositionBroadcaster, viewport: Viewport, padding: f32, clock: Duration) {
    println!("t={:.2}s", clock.as_secs_f32());
    if let Some(panel) = wrapper.controller().and_then(|c| c.panel_state(3)) {
        for line in render_panel(&panel, PANEL_WIDTH) {
            println!("{line}");
        }
    }
    for line in render_overlay(wrapper, viewport, padding) {
        println!("  {line}");
    }
    println!();
}
