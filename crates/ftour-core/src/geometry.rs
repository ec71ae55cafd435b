#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Two coordinate spaces are in play:
//!
//! - **Percentage space** ([`PercentPoint`]): `x`/`y` in `[0, 100]`, relative to
//!   the viewport width/height. Script `move` actions and the avatar use it.
//! - **Pixel space** ([`Bounds`], [`PixelPoint`]): viewport pixels with the
//!   origin at the top-left. Element geometry from the host lives here.
//!
//! [`Viewport`] converts between the two.

use std::fmt;

/// Upper bound of percentage space on both axes.
pub const PERCENT_MAX: f32 = 100.0;

/// A point in viewport-percentage units.
///
/// Both coordinates are clamped to `[0, 100]` on construction; non-finite
/// inputs collapse to `0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PercentPoint {
    /// Horizontal position, percent of viewport width.
    pub x: f32,
    /// Vertical position, percent of viewport height.
    pub y: f32,
}

impl PercentPoint {
    /// Create a point, clamping both axes into range.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: clamp_percent(x),
            y: clamp_percent(y),
        }
    }

    /// Viewport centre.
    pub const CENTER: Self = Self { x: 50.0, y: 50.0 };

    /// Whether the raw pair lies inside percentage space without clamping.
    #[inline]
    pub fn in_range(x: f32, y: f32) -> bool {
        x.is_finite() && y.is_finite() && (0.0..=PERCENT_MAX).contains(&x) && (0.0..=PERCENT_MAX).contains(&y)
    }

    /// Euclidean distance to `other`, in percentage units.
    #[inline]
    pub fn distance(&self, other: &PercentPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]`.
    #[inline]
    pub fn lerp(&self, other: &PercentPoint, t: f32) -> PercentPoint {
        let t = t.clamp(0.0, 1.0);
        PercentPoint::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl fmt::Display for PercentPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}%, {:.1}%)", self.x, self.y)
    }
}

fn clamp_percent(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, PERCENT_MAX)
    } else {
        0.0
    }
}

/// A point in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

impl PixelPoint {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Bounding box of a UI element in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    /// Create a bounding box. Negative extents are clamped to zero.
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether the box has no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Centre point, the pointer target for `point` and `click` actions.
    #[inline]
    pub fn center(&self) -> PixelPoint {
        PixelPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether `point` lies inside the box.
    #[inline]
    pub fn contains(&self, point: PixelPoint) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Grow the box by `padding` on every side.
    pub fn inflate(&self, padding: f32) -> Bounds {
        Bounds::new(
            self.x - padding,
            self.y - padding,
            self.width + padding * 2.0,
            self.height + padding * 2.0,
        )
    }

    /// Intersection with `other`, or `None` when they do not overlap.
    pub fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return None;
        }
        Some(Bounds::new(x, y, right - x, bottom - y))
    }
}

/// Pixel size of the host viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

impl Viewport {
    /// Create a viewport; zero or negative sizes collapse to one pixel so the
    /// percentage conversions never divide by zero.
    #[inline]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: if width.is_finite() && width > 0.0 { width } else { 1.0 },
            height: if height.is_finite() && height > 0.0 { height } else { 1.0 },
        }
    }

    /// Full-viewport bounds.
    #[inline]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(0.0, 0.0, self.width, self.height)
    }

    /// Convert a percentage point to pixels.
    #[inline]
    pub fn to_pixels(&self, point: PercentPoint) -> PixelPoint {
        PixelPoint::new(
            point.x / PERCENT_MAX * self.width,
            point.y / PERCENT_MAX * self.height,
        )
    }

    /// Convert a pixel point to percentage space (clamped).
    #[inline]
    pub fn to_percent(&self, point: PixelPoint) -> PercentPoint {
        PercentPoint::new(
            point.x / self.width * PERCENT_MAX,
            point.y / self.height * PERCENT_MAX,
        )
    }

    /// Clip `bounds` to the viewport. Returns `None` when fully off-screen.
    pub fn clip(&self, bounds: &Bounds) -> Option<Bounds> {
        bounds.intersection(&self.bounds())
    }
}
