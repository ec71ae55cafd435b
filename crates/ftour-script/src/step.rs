#![forbid(unsafe_code)]

//! Step and action definitions.
//!
//! Durations are written in seconds and delays in milliseconds, both in code
//! (`duration_secs`, `delay_ms`) and in the JSON form:
//!
//! ```json
//! {
//!   "id": "services",
//!   "route": "/services",
//!   "title": "Online services",
//!   "icon": "grid",
//!   "narration": "Every service is one click away.",
//!   "duration": 8,
//!   "actions": [
//!     { "type": "move", "position": { "x": 30, "y": 40 } },
//!     { "type": "highlight", "selector": "#services-grid", "delay": 1500 }
//!   ]
//! }
//! ```

use std::fmt;
use std::time::Duration;

use ftour_core::geometry::PercentPoint;
use serde::{Deserialize, Serialize};

/// The kind of visual effect an action produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Scroll,
    Click,
    Highlight,
    Point,
    Move,
}

impl ActionKind {
    /// Whether the action cannot do anything without a selector.
    pub fn requires_selector(self) -> bool {
        matches!(self, Self::Scroll | Self::Highlight | Self::Point)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Click => "click",
            Self::Highlight => "highlight",
            Self::Point => "point",
            Self::Move => "move",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query string naming a UI element or region.
///
/// The selector `"top"` (and the aliases `"body"`/`"html"`) is reserved:
/// scrolling to it scrolls the viewport back to the origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector(String);

impl Selector {
    pub fn new(query: impl Into<String>) -> Self {
        Self(query.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the scroll-to-origin sentinel.
    pub fn is_top(&self) -> bool {
        matches!(self.0.trim(), "top" | "body" | "html")
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Selector {
    fn from(query: &str) -> Self {
        Self::new(query)
    }
}

/// A move target as written in the script, in viewport-percentage units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn in_range(&self) -> bool {
        PercentPoint::in_range(self.x, self.y)
    }

    pub fn to_point(self) -> PercentPoint {
        PercentPoint::new(self.x, self.y)
    }
}

/// A single timed visual effect within a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<Selector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Offset from step activation.
    #[serde(default, with = "millis")]
    pub delay: Duration,
}

impl PresentationAction {
    fn bare(kind: ActionKind) -> Self {
        Self {
            kind,
            selector: None,
            position: None,
            delay: Duration::ZERO,
        }
    }

    pub fn scroll(selector: impl Into<Selector>) -> Self {
        Self {
            selector: Some(selector.into()),
            ..Self::bare(ActionKind::Scroll)
        }
    }

    pub fn scroll_top() -> Self {
        Self::scroll("top")
    }

    pub fn highlight(selector: impl Into<Selector>) -> Self {
        Self {
            selector: Some(selector.into()),
            ..Self::bare(ActionKind::Highlight)
        }
    }

    pub fn point(selector: impl Into<Selector>) -> Self {
        Self {
            selector: Some(selector.into()),
            ..Self::bare(ActionKind::Point)
        }
    }

    pub fn click(selector: impl Into<Selector>) -> Self {
        Self {
            selector: Some(selector.into()),
            ..Self::bare(ActionKind::Click)
        }
    }

    pub fn move_to(x: f32, y: f32) -> Self {
        Self {
            position: Some(Position { x, y }),
            ..Self::bare(ActionKind::Move)
        }
    }

    /// Builder: fire `ms` milliseconds after step activation.
    #[must_use]
    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }
}

/// One scripted unit of the tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationStep {
    pub id: String,
    pub route: String,
    pub title: String,
    #[serde(default)]
    pub icon: String,
    pub narration: String,
    /// How long the step stays current before auto-advance.
    #[serde(with = "seconds")]
    pub duration: Duration,
    #[serde(default)]
    pub actions: Vec<PresentationAction>,
}

impl PresentationStep {
    pub fn new(id: impl Into<String>, route: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            route: route.into(),
            title: title.into(),
            icon: String::new(),
            narration: String::new(),
            duration: Duration::from_secs(5),
            actions: Vec::new(),
        }
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    #[must_use]
    pub fn narration(mut self, text: impl Into<String>) -> Self {
        self.narration = text.into();
        self
    }

    #[must_use]
    pub fn duration_secs(mut self, secs: u64) -> Self {
        self.duration = Duration::from_secs(secs);
        self
    }

    #[must_use]
    pub fn action(mut self, action: PresentationAction) -> Self {
        self.actions.push(action);
        self
    }

    /// The first `move` action, which the controller runs without waiting
    /// for its delay.
    pub fn first_move(&self) -> Option<(usize, &PresentationAction)> {
        self.actions
            .iter()
            .enumerate()
            .find(|(_, action)| action.kind == ActionKind::Move)
    }

    /// Action indices ordered by delay; ties keep script order.
    pub fn actions_by_delay(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.actions.len()).collect();
        order.sort_by_key(|&i| self.actions[i].delay);
        order
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

mod seconds {
    use std::time::Duration;

    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        if value.subsec_nanos() == 0 {
            s.serialize_u64(value.as_secs())
        } else {
            s.serialize_f64(value.as_secs_f64())
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|_| D::Error::custom(format!("invalid duration: {secs} seconds")))
    }
}
