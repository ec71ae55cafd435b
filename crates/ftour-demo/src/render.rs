#![forbid(unsafe_code)]

//! Text rendering of the control panel and overlay state.
//!
//! Every panel line has exactly the requested display width (measured with
//! `unicode-width`, so accented titles and box glyphs line up).

use std::time::Duration;

use ftour_core::geometry::Viewport;
use ftour_runtime::{ControlPanelState, PointerStyle, PositionBroadcaster};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Narrowest panel that still fits its borders and a few glyphs.
pub const MIN_PANEL_WIDTH: usize = 12;

const ELLIPSIS: char = '…';

/// Truncate `text` to `width` display columns (with an ellipsis when cut)
/// and pad it with spaces to exactly `width`.
pub fn fit(text: &str, width: usize) -> String {
    let mut out = String::new();
    if text.width() <= width {
        out.push_str(text);
    } else if width > 0 {
        let mut used = 0;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0);
            if used + w > width - 1 {
                break;
            }
            out.push(ch);
            used += w;
        }
        out.push(ELLIPSIS);
    }
    let pad = width.saturating_sub(out.width());
    out.extend(std::iter::repeat_n(' ', pad));
    out
}

/// Horizontal bar `width` cells wide, filled to `percent`.
pub fn progress_bar(percent: f32, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f32).round() as usize;
    let filled = filled.min(width);
    let mut bar = "█".repeat(filled);
    bar.push_str(&"░".repeat(width - filled));
    bar
}

fn seconds(duration: Duration) -> String {
    format!("{:.1}s", duration.as_secs_f32())
}

/// Boxed control panel, `width` columns wide (at least [`MIN_PANEL_WIDTH`]).
pub fn render_panel(state: &ControlPanelState<'_>, width: usize) -> Vec<String> {
    let width = width.max(MIN_PANEL_WIDTH);
    let inner = width - 4;
    let row = |text: &str| format!("│ {} │", fit(text, inner));

    let status = if state.playing { "▶" } else { "‖" };
    let header = format!(
        "{status} {}/{}  [{}] {}",
        state.step_index + 1,
        state.step_count,
        state.icon,
        state.title
    );

    let pct = format!(" {:>3.0}%", state.progress);
    let bar_width = inner.saturating_sub(pct.width());
    let progress = format!("{}{pct}", progress_bar(state.progress, bar_width));

    let mut flags = format!(
        "{} left · tour {} · {:.2}x",
        seconds(state.remaining),
        seconds(state.tour_remaining),
        state.speed
    );
    if state.muted {
        flags.push_str(" · muted");
    }

    let strip = state
        .steps
        .iter()
        .map(|step| {
            if step.is_current {
                format!("[{}]", step.title)
            } else {
                step.title.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" | ");
    let strip = format!(
        "{} {strip} {}",
        if state.can_go_back { "‹" } else { " " },
        if state.can_go_forward { "›" } else { " " }
    );

    let rule = "─".repeat(width - 2);
    vec![
        format!("┌{rule}┐"),
        row(&header),
        row(&progress),
        row(&flags),
        row(&strip),
        row(state.narration),
        format!("└{rule}┘"),
    ]
}

/// One line per overlay element: spotlight, pointer, avatar, trail, ripple.
pub fn render_overlay(
    wrapper: &PositionBroadcaster,
    viewport: Viewport,
    padding: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let controller = wrapper.controller();

    match controller.and_then(|c| c.highlight()) {
        Some(spot) => match spot.frame(viewport, padding) {
            Some(frame) => lines.push(format!(
                "spotlight {} at ({:.0},{:.0}) {:.0}x{:.0}",
                spot.selector, frame.x, frame.y, frame.width, frame.height
            )),
            None => lines.push(format!("spotlight {} off-screen", spot.selector)),
        },
        None => lines.push("spotlight -".to_string()),
    }

    match controller.and_then(|c| c.pointer()) {
        Some(pointer) => {
            let verb = match pointer.style {
                PointerStyle::Point => "pointing",
                PointerStyle::Click => "clicking",
            };
            lines.push(format!(
                "pointer {verb} at ({:.0},{:.0})",
                pointer.at.x, pointer.at.y
            ));
        }
        None => lines.push("pointer -".to_string()),
    }

    let at = wrapper.avatar_placement(viewport);
    lines.push(format!(
        "avatar {:?} at ({:.0},{:.0}) heading {}",
        wrapper.mode(),
        at.x,
        at.y,
        wrapper.avatar_target()
    ));

    let newest = wrapper
        .trail()
        .last()
        .map_or(0.0, |point| wrapper.faded_opacity(point));
    lines.push(format!(
        "trail {} points (newest opacity {newest:.2})",
        wrapper.trail_len()
    ));

    match wrapper.ripple() {
        Some(ripple) => {
            let rings = ripple
                .rings(3)
                .iter()
                .map(|r| format!("{r:.2}"))
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(format!("ripple at {} rings {rings}", ripple.at));
        }
        None => lines.push("ripple -".to_string()),
    }
    lines
}
