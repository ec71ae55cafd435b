//! Property-based invariant tests for percentage/pixel geometry.
//!
//! 1. `PercentPoint::new` always lands inside `[0, 100]²`.
//! 2. Distance is symmetric and zero on the diagonal.
//! 3. `lerp` stays on the segment: its distance to both ends sums to the
//!    segment length.
//! 4. Viewport conversions round-trip for in-range points.
//! 5. Clipped bounds always lie inside the viewport.

use ftour_core::geometry::{Bounds, PercentPoint, Viewport};
use proptest::prelude::*;

fn percent_strategy() -> impl Strategy<Value = PercentPoint> {
    (0.0f32..=100.0, 0.0f32..=100.0).prop_map(|(x, y)| PercentPoint::new(x, y))
}

fn viewport_strategy() -> impl Strategy<Value = Viewport> {
    (1.0f32..4000.0, 1.0f32..4000.0).prop_map(|(w, h)| Viewport::new(w, h))
}

proptest! {
    #[test]
    fn percent_point_always_in_range(x in any::<f32>(), y in any::<f32>()) {
        let p = PercentPoint::new(x, y);
        prop_assert!(PercentPoint::in_range(p.x, p.y), "{:?} escaped range", p);
    }

    #[test]
    fn distance_symmetric(a in percent_strategy(), b in percent_strategy()) {
        prop_assert!((a.distance(&b) - b.distance(&a)).abs() < 1e-4);
        prop_assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn lerp_stays_on_segment(a in percent_strategy(), b in percent_strategy(), t in 0.0f32..=1.0) {
        let p = a.lerp(&b, t);
        let total = a.distance(&b);
        let via = a.distance(&p) + p.distance(&b);
        prop_assert!((via - total).abs() < 1e-2, "lerp left the segment: {} vs {}", via, total);
    }

    #[test]
    fn viewport_round_trip(vp in viewport_strategy(), p in percent_strategy()) {
        let back = vp.to_percent(vp.to_pixels(p));
        prop_assert!((back.x - p.x).abs() < 1e-2);
        prop_assert!((back.y - p.y).abs() < 1e-2);
    }

    #[test]
    fn clip_inside_viewport(
        vp in viewport_strategy(),
        x in -500.0f32..5000.0,
        y in -500.0f32..5000.0,
        w in 0.0f32..2000.0,
        h in 0.0f32..2000.0,
    ) {
        if let Some(clipped) = vp.clip(&Bounds::new(x, y, w, h)) {
            prop_assert!(clipped.x >= 0.0 && clipped.y >= 0.0);
            prop_assert!(clipped.right() <= vp.width + 1e-3);
            prop_assert!(clipped.bottom() <= vp.height + 1e-3);
            prop_assert!(!clipped.is_empty());
        }
    }
}
