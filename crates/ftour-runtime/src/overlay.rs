#![forbid(unsafe_code)]

//! Read-only overlay snapshots: spotlight, pointer glyph, control panel.
//!
//! Renderers receive these by reference and never mutate controller state.

use std::time::Duration;

use ftour_core::geometry::{Bounds, PixelPoint, Viewport};
use ftour_script::Selector;

/// The element currently framed by the spotlight.
#[derive(Debug, Clone, PartialEq)]
pub struct Spotlight {
    pub selector: Selector,
    pub bounds: Bounds,
}

impl Spotlight {
    /// Frame to draw: the element grown by `padding`, clipped to the viewport.
    /// `None` when the element is entirely off-screen.
    pub fn frame(&self, viewport: Viewport, padding: f32) -> Option<Bounds> {
        viewport.clip(&self.bounds.inflate(padding.max(0.0)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerStyle {
    /// Steady pointer from a `point` action.
    Point,
    /// Brief press animation from a simulated `click`.
    Click,
}

/// The transient pointer glyph, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub at: PixelPoint,
    pub style: PointerStyle,
}

/// One entry of the control panel's step strip.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelStep<'a> {
    pub index: usize,
    pub title: &'a str,
    pub icon: &'a str,
    pub is_current: bool,
}

/// Everything the on-screen control panel shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPanelState<'a> {
    pub step_index: usize,
    pub step_count: usize,
    pub title: &'a str,
    pub icon: &'a str,
    pub narration: &'a str,
    /// Current step progress, 0-100.
    pub progress: f32,
    pub playing: bool,
    pub muted: bool,
    pub speed: f64,
    /// Time left in the current step.
    pub remaining: Duration,
    /// Time left in the whole tour.
    pub tour_remaining: Duration,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    /// Window of neighbouring steps, starting one before the current step.
    pub steps: Vec<PanelStep<'a>>,
}
