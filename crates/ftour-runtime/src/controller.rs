#![forbid(unsafe_code)]

//! Presentation controller: playback state and step execution.
//!
//! One controller is one tour session. It owns the playback state (current
//! index, playing, muted, elapsed time), the overlay state (spotlight,
//! pointer, tracked avatar coordinate), and a single [`TimerQueue`] holding
//! every delayed task of the session.
//!
//! # Step activation
//!
//! 1. Navigate when the host's route differs from the step's, then wait the
//!    long settle delay; otherwise wait the short one.
//! 2. After settling: clear spotlight and pointer, run the step's first
//!    `move` at once, schedule every action at its delay, start narration.
//! 3. Tick progress every `progress_interval`; at the step's duration
//!    advance, or stop and restore the avatar on the last step.
//!
//! # Invariants
//!
//! 1. `step_index() < step_count()` at all times.
//! 2. Pause, next, previous, jump, close and auto-advance call
//!    [`TimerQueue::cancel_all`] and cancel narration before anything else,
//!    so no task of a previous step can fire into the next one.
//! 3. `progress()` is in `[0, 100]` and never divides by a zero duration.
//! 4. Capability failures are logged and absorbed; the duration timer alone
//!    drives the tour forward.
//!
//! # Failure Modes
//!
//! - Selector matches nothing: the action is skipped, overlays unchanged.
//! - Narrator unavailable: `warn!`, the step keeps its timing.
//! - Navigation refused: `warn!`, the step proceeds after the long settle
//!   and its selectors simply miss.

use std::time::Duration;

use ftour_core::geometry::{Bounds, PercentPoint, PixelPoint};
use ftour_script::{ActionKind, PresentationStep, ScriptTable, Selector};
use tracing::{debug, info, trace, warn};

use crate::capability::{Host, Utterance, select_voice};
use crate::config::{TourConfig, normalize_speed};
use crate::event::{TourAdvanceReason, TourEvent};
use crate::overlay::{ControlPanelState, PanelStep, Pointer, PointerStyle, Spotlight};
use crate::timer::{TimerQueue, scale_duration};

#[derive(Debug, Clone, PartialEq)]
enum Task {
    Settled,
    Action(usize),
    ProgressTick,
    /// Hide the pointer if it is still the one shown with this generation.
    HidePointer(u64),
    ApplyHighlight,
}

/// Where the current step is in its activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    /// Not activated yet (paused before start, or just moved while paused).
    Idle,
    /// Waiting for the page to settle.
    Settling,
    /// Actions scheduled, progress ticking.
    Running,
}

/// Drives a [`ScriptTable`] against a [`Host`].
#[derive(Debug)]
pub struct PresentationController {
    script: ScriptTable,
    config: TourConfig,
    host: Host,
    timers: TimerQueue<Task>,
    active: bool,
    playing: bool,
    finished: bool,
    muted: bool,
    index: usize,
    phase: StepPhase,
    step_started_at: Duration,
    elapsed: Duration,
    /// Per action of the current step: already fired by its timer.
    fired: Vec<bool>,
    avatar: PercentPoint,
    spotlight: Option<Spotlight>,
    /// Replacement spotlight waiting out the exit gap.
    pending_spotlight: Option<Spotlight>,
    pointer: Option<Pointer>,
    pointer_generation: u64,
    events: Vec<TourEvent>,
}

impl PresentationController {
    pub fn new(script: ScriptTable, host: Host, config: TourConfig) -> Self {
        let mut config = config;
        config.speed = normalize_speed(config.speed);
        config.progress_interval = config.progress_interval.max(Duration::from_millis(1));
        Self {
            avatar: config.rest_position,
            script,
            config,
            host,
            timers: TimerQueue::new(),
            active: false,
            playing: false,
            finished: false,
            muted: false,
            index: 0,
            phase: StepPhase::Idle,
            step_started_at: Duration::ZERO,
            elapsed: Duration::ZERO,
            fired: Vec::new(),
            spotlight: None,
            pending_spotlight: None,
            pointer: None,
            pointer_generation: 0,
            events: Vec::new(),
        }
    }

    // -- accessors ---------------------------------------------------------

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// The last step ran out; playing again restarts from the first step.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    pub fn step_index(&self) -> usize {
        self.index
    }

    pub fn step_count(&self) -> usize {
        self.script.step_count()
    }

    pub fn current_step(&self) -> Option<&PresentationStep> {
        self.script.get(self.index)
    }

    pub fn script(&self) -> &ScriptTable {
        &self.script
    }

    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut Host {
        &mut self.host
    }

    pub fn speed(&self) -> f64 {
        self.config.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.config.speed = normalize_speed(speed);
    }

    /// Step-local time since the page settled, as of the last progress tick.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Current step progress in percent.
    pub fn progress(&self) -> f32 {
        let Some(step) = self.current_step() else {
            return 0.0;
        };
        if self.finished {
            return 100.0;
        }
        progress_percent(self.elapsed, step.duration)
    }

    /// Time left in the current step.
    pub fn remaining(&self) -> Duration {
        self.current_step()
            .map(|step| step.duration.saturating_sub(self.elapsed))
            .unwrap_or_default()
    }

    pub fn total_duration(&self) -> Duration {
        self.script.total_duration()
    }

    pub fn highlight(&self) -> Option<&Spotlight> {
        self.spotlight.as_ref()
    }

    pub fn pointer(&self) -> Option<Pointer> {
        self.pointer
    }

    /// Last avatar coordinate written by a `move` (or the resting coordinate).
    pub fn avatar(&self) -> PercentPoint {
        self.avatar
    }

    /// Virtual time of the session clock (speed-scaled).
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Delayed tasks waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Wall time until the next delayed task fires, at the current speed.
    /// `None` when inactive or nothing is pending.
    pub fn next_timer_in(&self) -> Option<Duration> {
        if !self.active {
            return None;
        }
        let wait = self.timers.next_due()?.saturating_sub(self.timers.now());
        // Round up so ticking by the result always reaches the due time.
        let micros = (wait.as_micros() as f64 / self.config.speed).ceil();
        Some(Duration::from_micros(micros.clamp(0.0, u64::MAX as f64) as u64))
    }

    /// Take every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<TourEvent> {
        std::mem::take(&mut self.events)
    }

    // -- controls ----------------------------------------------------------

    /// Begin a session at the first step. With `auto_start` the first step
    /// activates immediately; otherwise the session waits for
    /// [`play_pause`](Self::play_pause).
    pub fn start(&mut self, auto_start: bool) {
        self.hard_cancel();
        self.clear_overlays();
        self.active = true;
        self.finished = false;
        self.playing = auto_start;
        self.index = 0;
        self.phase = StepPhase::Idle;
        self.reset_step_clock();
        info!(
            steps = self.script.step_count(),
            total_ms = self.script.total_duration().as_millis() as u64,
            auto_start,
            "tour started"
        );
        self.events.push(TourEvent::Started {
            step_count: self.script.step_count(),
        });
        if auto_start {
            self.events.push(TourEvent::PlaybackChanged { playing: true });
            self.activate_step();
        }
    }

    /// Toggle between playing and paused.
    ///
    /// Pausing cancels narration and every pending timer and freezes the
    /// elapsed time. Resuming continues from the frozen time: actions not yet
    /// fired are rescheduled with their remaining delay and narration starts
    /// over (unless muted). After the tour finished, playing restarts it.
    pub fn play_pause(&mut self) {
        if !self.active {
            return;
        }
        if self.playing {
            self.pause();
        } else {
            self.resume();
        }
    }

    /// Go to the following step. On the last step this stops playback and
    /// restores the avatar instead; the tour never wraps.
    pub fn next(&mut self) {
        if !self.active {
            return;
        }
        if self.index >= self.script.last_index() {
            if !self.finished {
                self.finish();
            }
            return;
        }
        self.change_step(self.index + 1, TourAdvanceReason::ManualNext);
    }

    /// Go to the preceding step. No-op on the first step.
    pub fn previous(&mut self) {
        if !self.active || self.index == 0 {
            return;
        }
        self.change_step(self.index - 1, TourAdvanceReason::ManualPrev);
    }

    /// Seek to `index` (clamped). No-op when already there.
    pub fn jump_to(&mut self, index: usize) {
        if !self.active {
            return;
        }
        let target = index.min(self.script.last_index());
        if target == self.index && !self.finished {
            return;
        }
        self.change_step(target, TourAdvanceReason::Jump);
    }

    /// Tear the session down: cancel everything, clear overlays, send the
    /// avatar back to rest, and emit [`TourEvent::Closed`].
    pub fn close(&mut self) {
        if !self.active {
            return;
        }
        self.hard_cancel();
        self.clear_overlays();
        self.restore_avatar();
        self.active = false;
        self.playing = false;
        self.finished = false;
        self.phase = StepPhase::Idle;
        self.reset_step_clock();
        info!(step = self.index, "tour closed");
        self.events.push(TourEvent::Closed);
    }

    /// Mute or unmute narration. Muting silences the current utterance;
    /// visual actions and timing are unaffected either way.
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        if self.muted {
            self.host.narrator.cancel();
        }
        debug!(muted = self.muted, "narration mute toggled");
        self.events.push(TourEvent::MuteChanged { muted: self.muted });
    }

    /// Advance the session clock by `dt` (scaled by the playback speed),
    /// firing every task that falls due, in order.
    pub fn tick(&mut self, dt: Duration) {
        if !self.active {
            return;
        }
        let horizon = self
            .timers
            .now()
            .saturating_add(scale_duration(dt, self.config.speed));
        while let Some((_, task)) = self.timers.pop_due(horizon) {
            self.run(task);
        }
        self.timers.advance_to(horizon);
    }

    /// Snapshot for the on-screen control panel with up to `max_steps`
    /// entries in its step strip.
    pub fn panel_state(&self, max_steps: usize) -> Option<ControlPanelState<'_>> {
        if !self.active {
            return None;
        }
        let step = self.current_step()?;
        let count = self.script.step_count();
        let window = max_steps.max(1);
        let start = self.index.saturating_sub(1);
        let end = (start + window).min(count);
        let steps = self.script.steps()[start..end]
            .iter()
            .enumerate()
            .map(|(offset, step)| PanelStep {
                index: start + offset,
                title: &step.title,
                icon: &step.icon,
                is_current: start + offset == self.index,
            })
            .collect();

        let done = if self.finished {
            self.script.total_duration()
        } else {
            self.script
                .offset_of(self.index)
                .saturating_add(self.elapsed.min(step.duration))
        };

        Some(ControlPanelState {
            step_index: self.index,
            step_count: count,
            title: &step.title,
            icon: &step.icon,
            narration: &step.narration,
            progress: self.progress(),
            playing: self.playing,
            muted: self.muted,
            speed: self.config.speed,
            remaining: if self.finished {
                Duration::ZERO
            } else {
                self.remaining()
            },
            tour_remaining: self.script.total_duration().saturating_sub(done),
            can_go_back: self.index > 0,
            can_go_forward: self.index < self.script.last_index(),
            steps,
        })
    }

    // -- transitions -------------------------------------------------------

    fn pause(&mut self) {
        if self.phase == StepPhase::Running {
            let duration = self.current_step().map(|s| s.duration).unwrap_or_default();
            self.elapsed = self
                .timers
                .now()
                .saturating_sub(self.step_started_at)
                .min(duration);
        }
        self.hard_cancel();
        // The gap timer is gone; show the replacement now so it survives.
        self.apply_pending_highlight();
        self.hide_pointer();
        self.playing = false;
        debug!(
            step = self.index,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "tour paused"
        );
        self.events.push(TourEvent::PlaybackChanged { playing: false });
    }

    fn resume(&mut self) {
        if self.finished {
            let from = self.index;
            self.finished = false;
            self.index = 0;
            self.phase = StepPhase::Idle;
            self.reset_step_clock();
            if from != 0 {
                self.events.push(TourEvent::StepChanged {
                    from,
                    to: 0,
                    reason: TourAdvanceReason::Jump,
                });
            }
        }
        self.playing = true;
        debug!(step = self.index, phase = ?self.phase, "tour resumed");
        self.events.push(TourEvent::PlaybackChanged { playing: true });
        match self.phase {
            StepPhase::Idle | StepPhase::Settling => self.activate_step(),
            StepPhase::Running => self.resume_running(),
        }
    }

    fn change_step(&mut self, to: usize, reason: TourAdvanceReason) {
        self.hard_cancel();
        self.clear_overlays();
        let from = self.index;
        self.index = to;
        self.finished = false;
        self.phase = StepPhase::Idle;
        self.reset_step_clock();
        debug!(from, to, ?reason, "step changed");
        self.events.push(TourEvent::StepChanged { from, to, reason });
        if self.playing {
            self.activate_step();
        }
    }

    fn finish(&mut self) {
        self.hard_cancel();
        self.clear_overlays();
        self.playing = false;
        self.finished = true;
        self.phase = StepPhase::Idle;
        self.elapsed = self.current_step().map(|s| s.duration).unwrap_or_default();
        self.restore_avatar();
        info!(last_step = self.index, "tour finished");
        self.events.push(TourEvent::PlaybackChanged { playing: false });
        self.events.push(TourEvent::Finished {
            last_step: self.index,
        });
    }

    /// The single cancellation point used at every transition boundary.
    fn hard_cancel(&mut self) {
        let dropped = self.timers.cancel_all();
        self.host.narrator.cancel();
        if dropped > 0 {
            trace!(dropped, step = self.index, "cancelled pending timers");
        }
    }

    fn reset_step_clock(&mut self) {
        self.elapsed = Duration::ZERO;
        self.step_started_at = self.timers.now();
        self.fired.clear();
    }

    fn clear_overlays(&mut self) {
        self.spotlight = None;
        self.pending_spotlight = None;
        self.hide_pointer();
    }

    fn hide_pointer(&mut self) {
        self.pointer = None;
        self.pointer_generation += 1;
    }

    fn restore_avatar(&mut self) {
        self.avatar = self.config.rest_position;
        self.events.push(TourEvent::AvatarRestored {
            position: self.avatar,
        });
    }

    // -- step execution ----------------------------------------------------

    fn activate_step(&mut self) {
        let Some(step) = self.script.get(self.index) else {
            return;
        };
        let route = step.route.clone();
        let action_count = step.actions.len();
        self.phase = StepPhase::Settling;
        self.reset_step_clock();
        self.fired = vec![false; action_count];

        let current = self.host.navigator.current_route();
        let settle = if current == route {
            self.config.same_route_settle
        } else {
            match self.host.navigator.navigate(&route) {
                Ok(()) => {
                    debug!(from = %current, to = %route, "navigated");
                    self.events.push(TourEvent::Navigated {
                        route: route.clone(),
                    });
                }
                Err(err) => warn!(route = %route, error = %err, "navigation failed; continuing"),
            }
            self.config.route_settle
        };
        debug!(
            step = self.index,
            route = %route,
            settle_ms = settle.as_millis() as u64,
            "activating step"
        );
        self.timers.schedule(settle, Task::Settled);
    }

    fn on_settled(&mut self) {
        let Some(step) = self.script.get(self.index) else {
            return;
        };
        let first_move = step.first_move().map(|(index, _)| index);
        let schedule: Vec<(usize, Duration)> = step
            .actions_by_delay()
            .into_iter()
            .map(|index| (index, step.actions[index].delay))
            .collect();

        self.phase = StepPhase::Running;
        self.step_started_at = self.timers.now();
        self.elapsed = Duration::ZERO;
        self.clear_overlays();

        // Position updates never wait behind their delay; the scheduled copy
        // below is a no-op unless another move intervened.
        if let Some(index) = first_move {
            self.execute_action(index);
        }
        for (index, delay) in schedule {
            self.timers.schedule(delay, Task::Action(index));
        }
        self.narrate();
        self.timers
            .schedule(self.config.progress_interval, Task::ProgressTick);
    }

    fn resume_running(&mut self) {
        let Some(step) = self.script.get(self.index) else {
            return;
        };
        let elapsed = self.elapsed;
        let schedule: Vec<(usize, Duration)> = step
            .actions_by_delay()
            .into_iter()
            .filter(|&index| !self.fired.get(index).copied().unwrap_or(false))
            .map(|index| (index, step.actions[index].delay.saturating_sub(elapsed)))
            .collect();

        self.step_started_at = self.timers.now().saturating_sub(elapsed);
        for (index, delay) in schedule {
            self.timers.schedule(delay, Task::Action(index));
        }
        self.narrate();
        self.timers
            .schedule(self.config.progress_interval, Task::ProgressTick);
    }

    fn on_progress_tick(&mut self) {
        let Some(duration) = self.current_step().map(|step| step.duration) else {
            return;
        };
        self.elapsed = self.timers.now().saturating_sub(self.step_started_at);
        if self.elapsed >= duration {
            self.elapsed = duration;
            self.complete_step();
        } else {
            self.timers
                .schedule(self.config.progress_interval, Task::ProgressTick);
        }
    }

    fn complete_step(&mut self) {
        if self.index < self.script.last_index() {
            self.change_step(self.index + 1, TourAdvanceReason::Auto);
        } else {
            self.finish();
        }
    }

    fn run(&mut self, task: Task) {
        match task {
            Task::Settled => self.on_settled(),
            Task::Action(index) => {
                if let Some(fired) = self.fired.get_mut(index) {
                    *fired = true;
                }
                self.execute_action(index);
            }
            Task::ProgressTick => self.on_progress_tick(),
            Task::HidePointer(generation) => {
                if generation == self.pointer_generation {
                    self.pointer = None;
                }
            }
            Task::ApplyHighlight => self.apply_pending_highlight(),
        }
    }

    fn execute_action(&mut self, index: usize) {
        let Some(action) = self
            .script
            .get(self.index)
            .and_then(|step| step.actions.get(index))
            .cloned()
        else {
            return;
        };
        trace!(step = self.index, action = index, kind = %action.kind, "running action");
        match action.kind {
            ActionKind::Scroll => self.scroll(action.selector.as_ref()),
            ActionKind::Move => {
                if let Some(position) = action.position {
                    self.move_avatar(position.to_point());
                }
            }
            ActionKind::Point => {
                if let Some(bounds) = self.resolve(action.selector.as_ref()) {
                    self.show_pointer(bounds.center(), PointerStyle::Point);
                }
            }
            ActionKind::Highlight => {
                if let Some(selector) = action.selector {
                    self.show_highlight(selector);
                }
            }
            ActionKind::Click => {
                if let Some(bounds) = self.resolve(action.selector.as_ref()) {
                    self.show_pointer(bounds.center(), PointerStyle::Click);
                }
            }
        }
    }

    /// First non-empty element matching `selector`. Misses and host errors
    /// both resolve to `None`.
    fn resolve(&self, selector: Option<&Selector>) -> Option<Bounds> {
        let selector = selector?;
        match self.host.surface.query(selector) {
            Ok(found) => {
                let hit = found.into_iter().find(|bounds| !bounds.is_empty());
                if hit.is_none() {
                    debug!(selector = %selector, "selector matched nothing");
                }
                hit
            }
            Err(err) => {
                warn!(selector = %selector, error = %err, "element query failed");
                None
            }
        }
    }

    fn scroll(&mut self, selector: Option<&Selector>) {
        let Some(selector) = selector else {
            return;
        };
        let result = if selector.is_top() {
            self.host.surface.scroll_to_origin()
        } else {
            match self.resolve(Some(selector)) {
                Some(bounds) => self.host.surface.scroll_into_view(bounds),
                None => return,
            }
        };
        if let Err(err) = result {
            warn!(selector = %selector, error = %err, "scroll failed");
        }
    }

    fn move_avatar(&mut self, position: PercentPoint) {
        if position == self.avatar {
            return;
        }
        self.avatar = position;
        debug!(%position, "avatar moved");
        self.events.push(TourEvent::PositionChanged { position });
    }

    fn show_pointer(&mut self, at: PixelPoint, style: PointerStyle) {
        let display = match style {
            PointerStyle::Point => self.config.pointer_display,
            PointerStyle::Click => self.config.click_display,
        };
        self.pointer_generation += 1;
        self.pointer = Some(Pointer { at, style });
        self.timers
            .schedule(display, Task::HidePointer(self.pointer_generation));
    }

    fn show_highlight(&mut self, selector: Selector) {
        let Some(bounds) = self.resolve(Some(&selector)) else {
            return;
        };
        let spotlight = Spotlight { selector, bounds };
        if self.pending_spotlight.is_some() {
            // Still inside an exit gap: the running timer shows the newest one.
            self.pending_spotlight = Some(spotlight);
        } else if self.spotlight.take().is_some() {
            // Let the previous frame play its exit before the new one shows.
            self.pending_spotlight = Some(spotlight);
            self.timers
                .schedule(self.config.highlight_gap, Task::ApplyHighlight);
        } else {
            debug!(selector = %spotlight.selector, "spotlight applied");
            self.spotlight = Some(spotlight);
        }
    }

    fn apply_pending_highlight(&mut self) {
        if let Some(spotlight) = self.pending_spotlight.take() {
            debug!(selector = %spotlight.selector, "spotlight applied");
            self.spotlight = Some(spotlight);
        }
    }

    fn narrate(&mut self) {
        if self.muted {
            return;
        }
        let Some(step) = self.script.get(self.index) else {
            return;
        };
        if step.narration.trim().is_empty() {
            return;
        }
        let voices = self.host.narrator.voices();
        let utterance = Utterance {
            text: step.narration.clone(),
            locale: self.config.locale.clone(),
            voice: select_voice(
                &voices,
                &self.config.locale,
                self.config.preferred_voice.as_deref(),
            ),
            rate: self.config.speed as f32,
        };
        if let Err(err) = self.host.narrator.speak(&utterance) {
            warn!(step = self.index, error = %err, "narration failed; step timing continues");
        }
    }
}

fn progress_percent(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 100.0;
    }
    let pct = elapsed.as_secs_f64() / duration.as_secs_f64() * 100.0;
    pct.clamp(0.0, 100.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Navigator, Narrator, NullNarrator, RegionRegistry};
    use crate::error::CapabilityResult;
    use ftour_core::geometry::Viewport;
    use ftour_script::{PresentationAction, PresentationStep};

    struct FixedRoute(String);

    impl Navigator for FixedRoute {
        fn current_route(&self) -> String {
            self.0.clone()
        }

        fn navigate(&mut self, route: &str) -> CapabilityResult<()> {
            self.0 = route.to_string();
            Ok(())
        }
    }

    struct Silent;

    impl Narrator for Silent {
        fn speak(&mut self, _utterance: &Utterance) -> CapabilityResult<()> {
            Ok(())
        }

        fn cancel(&mut self) {}
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn controller(steps: Vec<PresentationStep>) -> PresentationController {
        let mut regions = RegionRegistry::new(Viewport::new(1000.0, 800.0));
        regions.register("#a", Bounds::new(100.0, 100.0, 200.0, 100.0));
        regions.register("#b", Bounds::new(400.0, 300.0, 100.0, 100.0));
        let host = Host::new(FixedRoute("/".into()), Silent, regions);
        PresentationController::new(
            ScriptTable::new(steps).expect("valid script"),
            host,
            TourConfig::default(),
        )
    }

    fn three_steps() -> Vec<PresentationStep> {
        vec![
            PresentationStep::new("one", "/", "One").duration_secs(2),
            PresentationStep::new("two", "/", "Two").duration_secs(2),
            PresentationStep::new("three", "/", "Three").duration_secs(2),
        ]
    }

    #[test]
    fn progress_percent_guards_zero_duration() {
        assert_eq!(progress_percent(ms(10), Duration::ZERO), 100.0);
        assert_eq!(progress_percent(ms(500), ms(1000)), 50.0);
        assert_eq!(progress_percent(ms(5000), ms(1000)), 100.0);
    }

    #[test]
    fn start_without_autostart_waits() {
        let mut tour = controller(three_steps());
        tour.start(false);
        assert!(tour.is_active());
        assert!(!tour.is_playing());
        tour.tick(Duration::from_secs(10));
        assert_eq!(tour.step_index(), 0);
        assert_eq!(tour.pending_timers(), 0);
    }

    #[test]
    fn auto_advance_walks_every_step_then_stops() {
        let mut tour = controller(three_steps());
        tour.start(true);
        for _ in 0..100 {
            tour.tick(ms(100));
        }
        assert!(tour.is_finished());
        assert!(!tour.is_playing());
        assert_eq!(tour.step_index(), 2);
        assert_eq!(tour.progress(), 100.0);
        let events = tour.drain_events();
        assert!(events.contains(&TourEvent::Finished { last_step: 2 }));
    }

    #[test]
    fn first_move_runs_at_settle_not_at_its_delay() {
        let mut tour = controller(vec![
            PresentationStep::new("one", "/", "One")
                .duration_secs(5)
                .action(PresentationAction::move_to(10.0, 20.0).delay_ms(3000)),
        ]);
        tour.start(true);
        tour.tick(ms(200));
        assert_eq!(tour.avatar(), PercentPoint::new(10.0, 20.0));
        tour.drain_events();
        // The delayed duplicate is swallowed.
        tour.tick(ms(3000));
        assert!(
            !tour
                .drain_events()
                .iter()
                .any(|e| matches!(e, TourEvent::PositionChanged { .. }))
        );
    }

    #[test]
    fn replacing_highlight_waits_for_exit_gap() {
        let mut tour = controller(vec![
            PresentationStep::new("one", "/", "One")
                .duration_secs(5)
                .action(PresentationAction::highlight("#a"))
                .action(PresentationAction::highlight("#b").delay_ms(1000)),
        ]);
        tour.start(true);
        tour.tick(ms(200));
        assert_eq!(tour.highlight().map(|s| s.selector.as_str()), Some("#a"));
        tour.tick(ms(1000));
        assert!(tour.highlight().is_none(), "old frame cleared first");
        tour.tick(ms(150));
        assert_eq!(tour.highlight().map(|s| s.selector.as_str()), Some("#b"));
    }

    #[test]
    fn pause_inside_highlight_gap_keeps_replacement() {
        let mut tour = controller(vec![
            PresentationStep::new("one", "/", "One")
                .duration_secs(5)
                .action(PresentationAction::highlight("#a"))
                .action(PresentationAction::highlight("#b").delay_ms(1000)),
        ]);
        tour.start(true);
        tour.tick(ms(200));
        tour.tick(ms(1050));
        assert!(tour.highlight().is_none());
        tour.play_pause();
        assert_eq!(tour.highlight().map(|s| s.selector.as_str()), Some("#b"));
        tour.play_pause();
        tour.tick(ms(1000));
        assert_eq!(tour.highlight().map(|s| s.selector.as_str()), Some("#b"));
    }

    #[test]
    fn highlight_gap_does_not_leak_into_next_step() {
        let mut tour = controller(vec![
            PresentationStep::new("one", "/", "One")
                .duration_secs(5)
                .action(PresentationAction::highlight("#a"))
                .action(PresentationAction::highlight("#b").delay_ms(1000)),
            PresentationStep::new("two", "/", "Two").duration_secs(5),
        ]);
        tour.start(true);
        tour.tick(ms(1250));
        tour.next();
        tour.tick(ms(400));
        assert!(tour.highlight().is_none());
    }

    #[test]
    fn pause_during_settle_restarts_settle_on_resume() {
        let mut tour = controller(vec![
            PresentationStep::new("one", "/", "One")
                .duration_secs(5)
                .action(PresentationAction::move_to(10.0, 20.0)),
        ]);
        let rest = tour.avatar();
        tour.start(true);
        tour.tick(ms(150));
        assert_eq!(tour.phase(), StepPhase::Settling);
        tour.play_pause();
        tour.tick(Duration::from_secs(5));
        assert_eq!(tour.phase(), StepPhase::Settling);
        assert_eq!(tour.avatar(), rest);
        tour.play_pause();
        // A full settle again, not the 50 ms that were left.
        tour.tick(ms(100));
        assert_eq!(tour.phase(), StepPhase::Settling);
        assert_eq!(tour.avatar(), rest);
        tour.tick(ms(100));
        assert_eq!(tour.phase(), StepPhase::Running);
        assert_eq!(tour.avatar(), PercentPoint::new(10.0, 20.0));
        assert_eq!(tour.progress(), 0.0);
    }

    #[test]
    fn pause_hides_pointer_and_stale_hide_spares_the_next_one() {
        let mut tour = controller(vec![
            PresentationStep::new("one", "/", "One")
                .duration_secs(8)
                .action(PresentationAction::point("#a"))
                .action(PresentationAction::point("#b").delay_ms(1500)),
        ]);
        tour.start(true);
        tour.tick(ms(200));
        tour.tick(ms(1000));
        assert!(tour.pointer().is_some());
        tour.play_pause();
        assert!(tour.pointer().is_none());
        tour.play_pause();
        tour.tick(ms(400));
        assert!(tour.pointer().is_none());
        tour.tick(ms(100));
        let pointer = tour.pointer().expect("second pointer");
        assert_eq!(pointer.at, PixelPoint::new(450.0, 350.0));
        // The first pointer's hide would have fired here.
        tour.tick(ms(1000));
        assert!(tour.pointer().is_some());
        tour.tick(ms(1000));
        assert!(tour.pointer().is_none());
    }

    #[test]
    fn point_shows_pointer_at_centre_then_hides() {
        let mut tour = controller(vec![
            PresentationStep::new("one", "/", "One")
                .duration_secs(5)
                .action(PresentationAction::point("#a")),
        ]);
        tour.start(true);
        tour.tick(ms(200));
        let pointer = tour.pointer().expect("pointer visible");
        assert_eq!(pointer.at, PixelPoint::new(200.0, 150.0));
        assert_eq!(pointer.style, PointerStyle::Point);
        tour.tick(ms(1999));
        assert!(tour.pointer().is_some());
        tour.tick(ms(1));
        assert!(tour.pointer().is_none());
    }

    #[test]
    fn click_pointer_is_brief() {
        let mut tour = controller(vec![
            PresentationStep::new("one", "/", "One")
                .duration_secs(5)
                .action(PresentationAction::click("#b")),
        ]);
        tour.start(true);
        tour.tick(ms(200));
        assert_eq!(tour.pointer().map(|p| p.style), Some(PointerStyle::Click));
        tour.tick(ms(600));
        assert!(tour.pointer().is_none());
    }

    #[test]
    fn pause_freezes_progress_and_resume_continues() {
        let mut tour = controller(three_steps());
        tour.start(true);
        tour.tick(ms(200)); // settle
        tour.tick(ms(1000));
        assert_eq!(tour.progress(), 50.0);
        tour.play_pause();
        assert_eq!(tour.pending_timers(), 0);
        tour.tick(Duration::from_secs(30));
        assert_eq!(tour.progress(), 50.0);
        assert_eq!(tour.step_index(), 0);
        tour.play_pause();
        tour.tick(ms(500));
        assert_eq!(tour.progress(), 75.0);
        tour.tick(ms(500));
        assert_eq!(tour.step_index(), 1);
    }

    #[test]
    fn resume_replays_only_unfired_actions() {
        let mut tour = controller(vec![
            PresentationStep::new("one", "/", "One")
                .duration_secs(5)
                .action(PresentationAction::move_to(10.0, 10.0))
                .action(PresentationAction::move_to(60.0, 60.0).delay_ms(1000))
                .action(PresentationAction::move_to(90.0, 10.0).delay_ms(3000)),
        ]);
        tour.start(true);
        tour.tick(ms(200));
        tour.tick(ms(1500));
        assert_eq!(tour.avatar(), PercentPoint::new(60.0, 60.0));
        tour.play_pause();
        tour.play_pause();
        tour.drain_events();
        tour.tick(ms(1000));
        assert_eq!(tour.avatar(), PercentPoint::new(60.0, 60.0));
        tour.tick(ms(600));
        assert_eq!(tour.avatar(), PercentPoint::new(90.0, 10.0));
        let moves = tour
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, TourEvent::PositionChanged { .. }))
            .count();
        assert_eq!(moves, 1);
    }

    #[test]
    fn playing_after_finish_restarts() {
        let mut tour = controller(three_steps());
        tour.start(true);
        tour.jump_to(2);
        tour.next();
        assert!(tour.is_finished());
        tour.play_pause();
        assert!(tour.is_playing());
        assert_eq!(tour.step_index(), 0);
        assert!(!tour.is_finished());
    }

    #[test]
    fn jump_clamps_and_ignores_same_index() {
        let mut tour = controller(three_steps());
        tour.start(true);
        tour.drain_events();
        tour.jump_to(0);
        assert!(tour.drain_events().is_empty());
        tour.jump_to(99);
        assert_eq!(tour.step_index(), 2);
        assert_eq!(
            tour.drain_events().first(),
            Some(&TourEvent::StepChanged {
                from: 0,
                to: 2,
                reason: TourAdvanceReason::Jump
            })
        );
    }

    #[test]
    fn speed_scales_session_clock() {
        let mut tour = controller(three_steps());
        tour.set_speed(2.0);
        tour.start(true);
        tour.tick(ms(100)); // 200 ms of tour time: settled
        tour.tick(ms(500)); // 1 s of tour time
        assert_eq!(tour.progress(), 50.0);
        tour.set_speed(100.0);
        assert_eq!(tour.speed(), 4.0);
    }

    #[test]
    fn panel_state_window_and_remaining() {
        let mut tour = controller(three_steps());
        assert!(tour.panel_state(3).is_none());
        tour.start(true);
        tour.next();
        tour.tick(ms(200));
        tour.tick(ms(500));
        let panel = tour.panel_state(3).expect("panel");
        assert_eq!(panel.step_index, 1);
        assert_eq!(panel.steps.len(), 3);
        assert_eq!(panel.steps.iter().filter(|s| s.is_current).count(), 1);
        assert_eq!(panel.remaining, ms(1500));
        assert_eq!(panel.tour_remaining, ms(3500));
        assert!(panel.can_go_back && panel.can_go_forward);
    }

    #[test]
    fn unavailable_narrator_does_not_stall() {
        let host = Host::new(
            FixedRoute("/".into()),
            NullNarrator,
            RegionRegistry::new(Viewport::default()),
        );
        let script = ScriptTable::new(vec![
            PresentationStep::new("one", "/", "One")
                .narration("hello")
                .duration_secs(1),
        ])
        .expect("valid");
        let mut tour = PresentationController::new(script, host, TourConfig::default());
        tour.start(true);
        tour.tick(Duration::from_secs(2));
        assert!(tour.is_finished());
    }
}
