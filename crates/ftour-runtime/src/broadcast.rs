#![forbid(unsafe_code)]

//! Position broadcast wrapper: avatar easing, movement trail and ripple.
//!
//! [`PositionBroadcaster`] owns a [`PresentationController`] for the length
//! of a tour and is the only consumer of its position updates. The data flow
//! is one-directional: the controller writes a coordinate through a
//! [`TourEvent::PositionChanged`], the wrapper animates towards it, and
//! nothing is read back.
//!
//! Per move:
//!
//! - a ripple marks the destination and clears `ripple_clear` after the
//!   latest move;
//! - when the move is long enough, [`trail_steps`] points are interpolated
//!   along the segment and emitted `point_delay` apart;
//! - the avatar spring takes the new coordinate as its target.
//!
//! The trail buffer holds at most `max_points` entries (oldest dropped) and
//! loses its oldest point every `decay_interval` while non-empty. Points are
//! never modified once emitted; [`PositionBroadcaster::faded_opacity`] derives
//! the displayed fade from their age.
//!
//! Wrapper timers run on wall time, unaffected by the tour's playback speed.
//! [`PositionBroadcaster::tick`] advances the tour and the wrapper clock
//! together, stopping at every tour timer, so a move's trail starts at the
//! instant of the move whatever the frame length.

use std::collections::VecDeque;
use std::time::Duration;

use ftour_core::animation::stagger::stagger_offsets;
use ftour_core::animation::{Animation, Pulse, Spring2};
use ftour_core::geometry::{PercentPoint, PixelPoint, Viewport};
use ftour_script::ScriptTable;
use tracing::{debug, trace};

use crate::capability::Host;
use crate::config::{TourConfig, TrailConfig};
use crate::controller::PresentationController;
use crate::event::TourEvent;
use crate::timer::TimerQueue;

/// Fewest points a trail is drawn with once over the distance threshold.
const MIN_TRAIL_STEPS: usize = 5;
/// Percentage units covered per trail point on long moves.
const UNITS_PER_STEP: f32 = 2.0;
/// Shortest frame slice, so a tour timer rounding down cannot stall `tick`.
const MIN_SLICE: Duration = Duration::from_micros(1);
/// Opacity kept per elapsed decay interval when a point is drawn.
const DECAY_FADE: f32 = 0.85;

/// Number of trail points for a move of `distance` units.
///
/// Zero below `min_distance`; otherwise `max(5, floor(distance / 2))`.
pub fn trail_steps(distance: f32, min_distance: f32) -> usize {
    if !distance.is_finite() || distance < min_distance {
        return 0;
    }
    ((distance / UNITS_PER_STEP).floor() as usize).max(MIN_TRAIL_STEPS)
}

/// One marker of the movement trail. Immutable once emitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub id: u64,
    pub position: PercentPoint,
    /// Opacity at emission.
    pub opacity: f32,
    pub scale: f32,
    /// Wrapper clock at emission.
    pub emitted_at: Duration,
}

/// Expanding rings at the destination of the latest move.
#[derive(Debug, Clone, Copy)]
pub struct Ripple {
    pub at: PercentPoint,
    pulse: Pulse,
}

impl Ripple {
    fn new(at: PercentPoint, frequency: f32) -> Self {
        Self {
            at,
            pulse: Pulse::new(frequency),
        }
    }

    /// Radius fraction (`[0, 1)`) of each of `count` evenly spaced rings.
    pub fn rings(&self, count: usize) -> Vec<f32> {
        let cycle = self.pulse.cycle();
        (0..count)
            .map(|ring| (cycle + ring as f32 / count as f32).fract())
            .collect()
    }
}

/// How the avatar is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarMode {
    /// Percentage of the viewport, driven by the tour.
    Percent,
    /// Fixed bottom-right corner while no tour runs.
    Corner,
}

#[derive(Debug, Clone, PartialEq)]
enum WrapperTask {
    EmitTrailPoint { position: PercentPoint, weight: f32 },
    DecayTrail,
    ClearRipple(u64),
}

/// Owns the avatar, its trail and ripple, and the running tour.
#[derive(Debug)]
pub struct PositionBroadcaster {
    config: TrailConfig,
    controller: Option<PresentationController>,
    timers: TimerQueue<WrapperTask>,
    avatar: Spring2,
    last_target: PercentPoint,
    trail: VecDeque<TrailPoint>,
    next_point_id: u64,
    emitted: u64,
    ripple: Option<Ripple>,
    ripple_generation: u64,
    decay_scheduled: bool,
    events: Vec<TourEvent>,
}

impl PositionBroadcaster {
    pub fn new(config: TrailConfig) -> Self {
        let mut config = config;
        config.decay_interval = config.decay_interval.max(Duration::from_millis(1));
        let rest = TourConfig::default().rest_position;
        Self {
            avatar: Spring2::new(rest, config.spring),
            config,
            controller: None,
            timers: TimerQueue::new(),
            last_target: rest,
            trail: VecDeque::new(),
            next_point_id: 0,
            emitted: 0,
            ripple: None,
            ripple_generation: 0,
            decay_scheduled: false,
            events: Vec::new(),
        }
    }

    /// Create a controller for `script` and start it. A tour already running
    /// is closed first.
    pub fn start_tour(
        &mut self,
        script: ScriptTable,
        host: Host,
        tour_config: TourConfig,
        auto_start: bool,
    ) {
        self.close_tour();
        let mut controller = PresentationController::new(script, host, tour_config);
        let rest = controller.avatar();
        self.avatar.snap_to(rest);
        self.last_target = rest;
        controller.start(auto_start);
        self.controller = Some(controller);
        self.pump();
    }

    /// Close the running tour, if any, and process its final events.
    pub fn close_tour(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.close();
        }
        self.pump();
        self.controller = None;
    }

    /// Tear everything down: close the tour and drop every pending
    /// interpolation, decay and ripple timer. Also runs on drop.
    pub fn unmount(&mut self) {
        self.close_tour();
        let dropped = self.timers.cancel_all();
        self.trail.clear();
        self.ripple = None;
        self.decay_scheduled = false;
        if dropped > 0 {
            debug!(dropped, "wrapper unmounted with pending timers");
        }
    }

    /// Advance the tour and the wrapper by `dt`.
    ///
    /// The frame is cut at each pending tour timer so tour events reach the
    /// wrapper at the wall time they happen.
    pub fn tick(&mut self, dt: Duration) {
        let mut left = dt;
        loop {
            let slice = self
                .controller
                .as_ref()
                .and_then(PresentationController::next_timer_in)
                .map_or(left, |next| next.max(MIN_SLICE).min(left));
            self.advance(slice);
            left -= slice;
            if left.is_zero() {
                break;
            }
        }
    }

    fn advance(&mut self, dt: Duration) {
        if let Some(controller) = self.controller.as_mut() {
            controller.tick(dt);
        }

        let horizon = self.timers.now().saturating_add(dt);
        self.run_due(horizon);
        self.timers.advance_to(horizon);
        self.avatar.tick(dt);
        if let Some(ripple) = self.ripple.as_mut() {
            ripple.pulse.tick(dt);
        }

        // Tour events happened at the end of this slice.
        self.pump();
        self.run_due(horizon);
    }

    fn run_due(&mut self, horizon: Duration) {
        while let Some((_, task)) = self.timers.pop_due(horizon) {
            self.run(task);
        }
    }

    /// Receive a new avatar coordinate (percent of viewport).
    pub fn on_position_change(&mut self, x: f32, y: f32) {
        let target = PercentPoint::new(x, y);
        let from = self.last_target;
        self.last_target = target;
        self.avatar.set_target(target);
        self.start_ripple(target);

        let distance = from.distance(&target);
        let steps = trail_steps(distance, self.config.min_distance);
        trace!(%from, to = %target, distance, steps, "position change");
        if steps == 0 {
            return;
        }
        let offsets = stagger_offsets(steps, self.config.point_delay);
        for (index, offset) in offsets.into_iter().enumerate() {
            let weight = (index + 1) as f32 / steps as f32;
            self.timers.schedule(
                offset,
                WrapperTask::EmitTrailPoint {
                    position: from.lerp(&target, weight),
                    weight,
                },
            );
        }
    }

    pub fn controller(&self) -> Option<&PresentationController> {
        self.controller.as_ref()
    }

    /// Mutable access for playback controls. Events raised through it are
    /// processed on the next [`tick`](Self::tick).
    pub fn controller_mut(&mut self) -> Option<&mut PresentationController> {
        self.controller.as_mut()
    }

    pub fn config(&self) -> &TrailConfig {
        &self.config
    }

    pub fn mode(&self) -> AvatarMode {
        match &self.controller {
            Some(controller) if controller.is_active() => AvatarMode::Percent,
            _ => AvatarMode::Corner,
        }
    }

    /// Eased avatar coordinate.
    pub fn avatar_position(&self) -> PercentPoint {
        self.avatar.position()
    }

    pub fn avatar_target(&self) -> PercentPoint {
        self.avatar.target()
    }

    /// Where the avatar is drawn in `viewport`, according to [`mode`](Self::mode).
    pub fn avatar_placement(&self, viewport: Viewport) -> PixelPoint {
        match self.mode() {
            AvatarMode::Percent => viewport.to_pixels(self.avatar.position()),
            AvatarMode::Corner => PixelPoint::new(
                (viewport.width - self.config.corner_inset).max(0.0),
                (viewport.height - self.config.corner_inset).max(0.0),
            ),
        }
    }

    /// Trail points, oldest first.
    pub fn trail(&self) -> impl Iterator<Item = &TrailPoint> {
        self.trail.iter()
    }

    /// Opacity `point` is drawn with now: its emission opacity, faded by
    /// [`DECAY_FADE`] per decay interval of age.
    pub fn faded_opacity(&self, point: &TrailPoint) -> f32 {
        let age = self.timers.now().saturating_sub(point.emitted_at);
        let intervals = age.as_secs_f32() / self.config.decay_interval.as_secs_f32();
        point.opacity * DECAY_FADE.powf(intervals)
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    /// Trail points emitted since creation, including decayed ones.
    pub fn emitted_points(&self) -> u64 {
        self.emitted
    }

    pub fn ripple(&self) -> Option<&Ripple> {
        self.ripple.as_ref()
    }

    /// The "moving" flag: a ripple is showing.
    pub fn is_moving(&self) -> bool {
        self.ripple.is_some()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Take every tour event processed since the last drain.
    pub fn drain_events(&mut self) -> Vec<TourEvent> {
        std::mem::take(&mut self.events)
    }

    fn pump(&mut self) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        for event in controller.drain_events() {
            match &event {
                TourEvent::PositionChanged { position } => {
                    self.on_position_change(position.x, position.y);
                }
                TourEvent::AvatarRestored { position } => {
                    // Back to rest without a trail.
                    self.last_target = *position;
                    self.avatar.set_target(*position);
                }
                TourEvent::Closed => {
                    self.timers.cancel_all();
                    self.trail.clear();
                    self.ripple = None;
                    self.decay_scheduled = false;
                }
                _ => {}
            }
            self.events.push(event);
        }
    }

    fn start_ripple(&mut self, at: PercentPoint) {
        self.ripple_generation += 1;
        self.ripple = Some(Ripple::new(at, self.config.ripple_frequency));
        self.timers.schedule(
            self.config.ripple_clear,
            WrapperTask::ClearRipple(self.ripple_generation),
        );
    }

    fn run(&mut self, task: WrapperTask) {
        match task {
            WrapperTask::EmitTrailPoint { position, weight } => {
                let id = self.next_point_id;
                self.next_point_id += 1;
                self.emitted += 1;
                self.trail.push_back(TrailPoint {
                    id,
                    position,
                    opacity: weight,
                    scale: 0.5 + 0.5 * weight,
                    emitted_at: self.timers.now(),
                });
                while self.trail.len() > self.config.max_points {
                    self.trail.pop_front();
                }
                if !self.decay_scheduled && !self.trail.is_empty() {
                    self.decay_scheduled = true;
                    self.timers
                        .schedule(self.config.decay_interval, WrapperTask::DecayTrail);
                }
            }
            WrapperTask::DecayTrail => {
                self.trail.pop_front();
                if self.trail.is_empty() {
                    self.decay_scheduled = false;
                } else {
                    self.timers
                        .schedule(self.config.decay_interval, WrapperTask::DecayTrail);
                }
            }
            WrapperTask::ClearRipple(generation) => {
                if generation == self.ripple_generation {
                    self.ripple = None;
                }
            }
        }
    }
}

impl Default for PositionBroadcaster {
    fn default() -> Self {
        Self::new(TrailConfig::default())
    }
}

impl Drop for PositionBroadcaster {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Navigator, NullNarrator, RegionRegistry};
    use crate::error::CapabilityResult;

    struct StayPut;

    impl Navigator for StayPut {
        fn current_route(&self) -> String {
            "/".to_string()
        }

        fn navigate(&mut self, _route: &str) -> CapabilityResult<()> {
            Ok(())
        }
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn trail_steps_threshold_and_scaling() {
        assert_eq!(trail_steps(0.0, 2.0), 0);
        assert_eq!(trail_steps(1.99, 2.0), 0);
        assert_eq!(trail_steps(2.0, 2.0), 5);
        assert_eq!(trail_steps(5.0, 2.0), 5);
        assert_eq!(trail_steps(40.0, 2.0), 20);
        assert_eq!(trail_steps(f32::NAN, 2.0), 0);
    }

    #[test]
    fn short_move_leaves_no_trail_but_ripples() {
        let mut wrapper = PositionBroadcaster::default();
        wrapper.on_position_change(93.0, 88.0);
        wrapper.tick(Duration::from_secs(1));
        assert_eq!(wrapper.emitted_points(), 0);
        assert!(wrapper.is_moving());
    }

    #[test]
    fn long_move_emits_staggered_points() {
        let mut wrapper = PositionBroadcaster::default();
        wrapper.on_position_change(52.0, 88.0);
        wrapper.tick(ms(0));
        assert_eq!(wrapper.emitted_points(), 1);
        wrapper.tick(ms(30));
        assert_eq!(wrapper.emitted_points(), 2);
        wrapper.tick(Duration::from_secs(1));
        assert_eq!(wrapper.emitted_points(), 20);
    }

    #[test]
    fn trail_points_lie_on_the_segment() {
        let mut wrapper = PositionBroadcaster::default();
        wrapper.on_position_change(52.0, 88.0);
        wrapper.tick(ms(50));
        for point in wrapper.trail() {
            assert_eq!(point.position.y, 88.0);
            assert!((52.0..=92.0).contains(&point.position.x));
        }
    }

    #[test]
    fn trail_buffer_is_capped() {
        let mut wrapper = PositionBroadcaster::default();
        wrapper.on_position_change(0.0, 0.0);
        for _ in 0..500 {
            wrapper.tick(ms(10));
            assert!(wrapper.trail_len() <= wrapper.config().max_points);
        }
        assert_eq!(wrapper.trail_len(), 0, "trail decays away");
    }

    #[test]
    fn decay_removes_points_without_touching_survivors() {
        let mut wrapper = PositionBroadcaster::default();
        wrapper.on_position_change(52.0, 88.0);
        // Last of the 20 points goes out at 570 ms.
        wrapper.tick(ms(570));
        assert_eq!(wrapper.emitted_points(), 20);
        let before: Vec<TrailPoint> = wrapper.trail().copied().collect();
        assert!(before.len() > 2);
        let mut passes = 0;
        while wrapper.trail_len() > 1 {
            wrapper.tick(wrapper.config().decay_interval);
            passes += 1;
            let survivors: Vec<TrailPoint> = wrapper.trail().copied().collect();
            assert_eq!(survivors[..], before[before.len() - survivors.len()..]);
        }
        assert!(passes > 0);
    }

    #[test]
    fn displayed_fade_follows_age() {
        let mut wrapper = PositionBroadcaster::default();
        wrapper.on_position_change(52.0, 88.0);
        wrapper.tick(ms(0));
        let first = *wrapper.trail().next().expect("first point");
        assert_eq!(wrapper.faded_opacity(&first), first.opacity);
        wrapper.tick(wrapper.config().decay_interval / 2);
        let later = wrapper.faded_opacity(&first);
        assert!(later < first.opacity && later > first.opacity * DECAY_FADE);
    }

    #[test]
    fn trail_starts_when_the_move_happens_inside_a_long_frame() {
        let steps = vec![
            ftour_script::PresentationStep::new("far", "/", "Far")
                .duration_secs(5)
                .action(ftour_script::PresentationAction::move_to(0.0, 0.0)),
        ];
        let host = Host::new(
            StayPut,
            NullNarrator,
            RegionRegistry::new(Viewport::new(1000.0, 800.0)),
        );
        let mut wrapper = PositionBroadcaster::default();
        wrapper.start_tour(
            ScriptTable::new(steps).expect("valid"),
            host,
            TourConfig::default(),
            true,
        );
        // The move lands at the 200 ms settle, 50 ms before the frame ends:
        // points at 200 and 230 ms only.
        wrapper.tick(ms(250));
        assert_eq!(wrapper.emitted_points(), 2);
        let first = wrapper.trail().next().copied().expect("first point");
        assert_eq!(first.emitted_at, ms(200));
    }

    #[test]
    fn ripple_clears_after_latest_move() {
        let mut wrapper = PositionBroadcaster::default();
        wrapper.on_position_change(50.0, 50.0);
        wrapper.tick(ms(1000));
        wrapper.on_position_change(40.0, 40.0);
        wrapper.tick(ms(1000));
        assert!(wrapper.is_moving(), "second move extends the ripple");
        wrapper.tick(ms(200));
        assert!(!wrapper.is_moving());
    }

    #[test]
    fn ripple_rings_are_fractions() {
        let ripple = Ripple::new(PercentPoint::CENTER, 1.5);
        let rings = ripple.rings(3);
        assert_eq!(rings.len(), 3);
        assert!(rings.iter().all(|r| (0.0..1.0).contains(r)));
    }

    #[test]
    fn avatar_springs_to_target() {
        let mut wrapper = PositionBroadcaster::default();
        wrapper.on_position_change(10.0, 20.0);
        for _ in 0..300 {
            wrapper.tick(ms(16));
        }
        let at = wrapper.avatar_position();
        assert!((at.x - 10.0).abs() < 0.05 && (at.y - 20.0).abs() < 0.05);
    }

    #[test]
    fn corner_mode_without_tour() {
        let wrapper = PositionBroadcaster::default();
        assert_eq!(wrapper.mode(), AvatarMode::Corner);
        assert_eq!(
            wrapper.avatar_placement(Viewport::new(1000.0, 800.0)),
            PixelPoint::new(976.0, 776.0)
        );
    }

    #[test]
    fn unmount_cancels_pending_timers() {
        let mut wrapper = PositionBroadcaster::default();
        wrapper.on_position_change(0.0, 0.0);
        wrapper.tick(ms(100));
        assert!(wrapper.pending_timers() > 0);
        wrapper.unmount();
        assert_eq!(wrapper.pending_timers(), 0);
        let emitted = wrapper.emitted_points();
        wrapper.tick(Duration::from_secs(5));
        assert_eq!(wrapper.emitted_points(), emitted);
        assert_eq!(wrapper.trail_len(), 0);
    }
}
