#![forbid(unsafe_code)]

//! Tour timing and trail configuration.
//!
//! Defaults are tuned for a browser-like host. These fields can be overridden
//! from `FTOUR_*` environment variables:
//!
//! | Variable | Field | Unit |
//! |----------|-------|------|
//! | `FTOUR_ROUTE_SETTLE_MS` | [`TourConfig::route_settle`] | ms |
//! | `FTOUR_SETTLE_MS` | [`TourConfig::same_route_settle`] | ms |
//! | `FTOUR_TICK_MS` | [`TourConfig::progress_interval`] | ms |
//! | `FTOUR_POINTER_MS` | [`TourConfig::pointer_display`] | ms |
//! | `FTOUR_LOCALE` | [`TourConfig::locale`] | BCP 47 tag |
//! | `FTOUR_VOICE` | [`TourConfig::preferred_voice`] | name fragment |
//! | `FTOUR_SPEED` | [`TourConfig::speed`] | factor |
//! | `FTOUR_TRAIL_MIN_DISTANCE` | [`TrailConfig::min_distance`] | percent units |
//! | `FTOUR_TRAIL_POINT_DELAY_MS` | [`TrailConfig::point_delay`] | ms |
//! | `FTOUR_TRAIL_MAX_POINTS` | [`TrailConfig::max_points`] | count |
//! | `FTOUR_TRAIL_DECAY_MS` | [`TrailConfig::decay_interval`] | ms |
//! | `FTOUR_RIPPLE_MS` | [`TrailConfig::ripple_clear`] | ms |
//! | `FTOUR_SPRING_STIFFNESS` | [`TrailConfig::spring`] stiffness | N/m |
//! | `FTOUR_SPRING_DAMPING` | [`TrailConfig::spring`] damping | N·s/m |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use ftour_core::animation::SpringConfig;
use ftour_core::geometry::PercentPoint;

use crate::error::{TourError, TourResult};

pub(crate) const SPEED_MIN: f64 = 0.25;
pub(crate) const SPEED_MAX: f64 = 4.0;

/// Controller timings and narration preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct TourConfig {
    /// Wait after navigating to a different route before touching the page.
    pub route_settle: Duration,
    /// Wait when the step's route is already current.
    pub same_route_settle: Duration,
    /// Progress timer cadence.
    pub progress_interval: Duration,
    /// How long a `point` pointer stays visible.
    pub pointer_display: Duration,
    /// How long a simulated `click` pointer stays visible.
    pub click_display: Duration,
    /// Gap between clearing one highlight and showing the next.
    pub highlight_gap: Duration,
    /// Spotlight frame padding around the highlighted element, in pixels.
    pub spotlight_padding: f32,
    /// Narration language tag.
    pub locale: String,
    /// Preferred voice name fragment, matched case-insensitively.
    pub preferred_voice: Option<String>,
    /// Avatar resting coordinate outside of scripted moves.
    pub rest_position: PercentPoint,
    /// Playback speed factor, clamped to `[0.25, 4.0]`.
    pub speed: f64,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            route_settle: Duration::from_millis(800),
            same_route_settle: Duration::from_millis(200),
            progress_interval: Duration::from_millis(100),
            pointer_display: Duration::from_secs(2),
            click_display: Duration::from_millis(600),
            highlight_gap: Duration::from_millis(150),
            spotlight_padding: 8.0,
            locale: "fr-FR".into(),
            preferred_voice: Some("Google".into()),
            rest_position: PercentPoint::new(92.0, 88.0),
            speed: 1.0,
        }
    }
}

impl TourConfig {
    /// Defaults with environment overrides; unparsable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply(&|key| env::var(key).ok(), false).ok();
        config
    }

    /// Defaults with environment overrides; unparsable values are errors.
    pub fn try_from_env() -> TourResult<Self> {
        Self::try_from_lookup(|key| env::var(key).ok())
    }

    /// Like [`try_from_env`](Self::try_from_env) but reading from `lookup`.
    pub fn try_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> TourResult<Self> {
        let mut config = Self::default();
        config.apply(&lookup, true)?;
        Ok(config)
    }

    fn apply(&mut self, lookup: &dyn Fn(&str) -> Option<String>, strict: bool) -> TourResult<()> {
        if let Some(ms) = parse_var::<u64>(lookup, "FTOUR_ROUTE_SETTLE_MS", strict)? {
            self.route_settle = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(lookup, "FTOUR_SETTLE_MS", strict)? {
            self.same_route_settle = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(lookup, "FTOUR_TICK_MS", strict)? {
            // A zero cadence would spin forever inside one tick.
            self.progress_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(ms) = parse_var::<u64>(lookup, "FTOUR_POINTER_MS", strict)? {
            self.pointer_display = Duration::from_millis(ms);
        }
        if let Some(locale) = lookup("FTOUR_LOCALE").filter(|v| !v.trim().is_empty()) {
            self.locale = locale.trim().to_string();
        }
        if let Some(voice) = lookup("FTOUR_VOICE") {
            let voice = voice.trim();
            self.preferred_voice = (!voice.is_empty()).then(|| voice.to_string());
        }
        if let Some(speed) = parse_var::<f64>(lookup, "FTOUR_SPEED", strict)? {
            self.speed = normalize_speed(speed);
        }
        Ok(())
    }

    /// Builder: speed factor.
    #[must_use]
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = normalize_speed(speed);
        self
    }

    /// Builder: narration locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Builder: resting avatar coordinate.
    #[must_use]
    pub fn with_rest_position(mut self, rest: PercentPoint) -> Self {
        self.rest_position = rest;
        self
    }
}

/// Trail, ripple, and avatar-easing parameters for the position wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailConfig {
    /// Moves shorter than this (percent units) leave no trail.
    pub min_distance: f32,
    /// Stagger between consecutive trail points.
    pub point_delay: Duration,
    /// Trail buffer capacity; the oldest point is dropped first.
    pub max_points: usize,
    /// Cadence at which the oldest trail point decays.
    pub decay_interval: Duration,
    /// Ripple clears this long after the latest move.
    pub ripple_clear: Duration,
    /// Ripple ring expansion frequency, Hz.
    pub ripple_frequency: f32,
    /// Avatar easing.
    pub spring: SpringConfig,
    /// Corner anchor inset from the bottom-right edge when no tour runs, px.
    pub corner_inset: f32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            min_distance: 2.0,
            point_delay: Duration::from_millis(30),
            max_points: 24,
            decay_interval: Duration::from_millis(60),
            ripple_clear: Duration::from_millis(1200),
            ripple_frequency: 1.5,
            spring: SpringConfig::default(),
            corner_inset: 24.0,
        }
    }
}

impl TrailConfig {
    /// Defaults with environment overrides; unparsable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply(&|key| env::var(key).ok(), false).ok();
        config
    }

    /// Defaults with overrides from `lookup`; unparsable values are errors.
    pub fn try_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> TourResult<Self> {
        let mut config = Self::default();
        config.apply(&lookup, true)?;
        Ok(config)
    }

    fn apply(&mut self, lookup: &dyn Fn(&str) -> Option<String>, strict: bool) -> TourResult<()> {
        if let Some(distance) = parse_var::<f32>(lookup, "FTOUR_TRAIL_MIN_DISTANCE", strict)?
            && distance.is_finite()
        {
            self.min_distance = distance.max(0.0);
        }
        if let Some(ms) = parse_var::<u64>(lookup, "FTOUR_TRAIL_POINT_DELAY_MS", strict)? {
            self.point_delay = Duration::from_millis(ms);
        }
        if let Some(max) = parse_var::<usize>(lookup, "FTOUR_TRAIL_MAX_POINTS", strict)? {
            self.max_points = max;
        }
        if let Some(ms) = parse_var::<u64>(lookup, "FTOUR_TRAIL_DECAY_MS", strict)? {
            self.decay_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(lookup, "FTOUR_RIPPLE_MS", strict)? {
            self.ripple_clear = Duration::from_millis(ms);
        }
        if let Some(stiffness) = parse_var::<f32>(lookup, "FTOUR_SPRING_STIFFNESS", strict)?
            && stiffness.is_finite()
        {
            self.spring = self.spring.stiffness(stiffness);
        }
        if let Some(damping) = parse_var::<f32>(lookup, "FTOUR_SPRING_DAMPING", strict)?
            && damping.is_finite()
        {
            self.spring = self.spring.damping(damping);
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(
    lookup: &dyn Fn(&str) -> Option<String>,
    key: &'static str,
    strict: bool,
) -> TourResult<Option<T>> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse() {
        Ok(value) => Ok(Some(value)),
        Err(_) if strict => Err(TourError::InvalidConfig { key, value: raw }),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable tour setting");
            Ok(None)
        }
    }
}

pub(crate) fn normalize_speed(speed: f64) -> f64 {
    if speed.is_finite() && speed > 0.0 {
        speed.clamp(SPEED_MIN, SPEED_MAX)
    } else {
        1.0
    }
}
