#![forbid(unsafe_code)]

//! Events emitted by the presentation controller.
//!
//! The controller queues events while it runs and the owner drains them with
//! [`PresentationController::drain_events`](crate::PresentationController::drain_events).
//! Nothing is delivered through callbacks, so the owner is free to hold the
//! controller mutably while reacting.

use ftour_core::geometry::PercentPoint;

/// Why the current step changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourAdvanceReason {
    /// The step's duration elapsed.
    Auto,
    ManualNext,
    ManualPrev,
    Jump,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TourEvent {
    /// A session began.
    Started { step_count: usize },
    StepChanged {
        from: usize,
        to: usize,
        reason: TourAdvanceReason,
    },
    /// The controller asked the host to change route.
    Navigated { route: String },
    /// A `move` action relocated the avatar.
    PositionChanged { position: PercentPoint },
    /// The avatar went back to its resting coordinate (tour end or close).
    AvatarRestored { position: PercentPoint },
    PlaybackChanged { playing: bool },
    MuteChanged { muted: bool },
    /// The last step ran out (or `next` was pressed on it).
    Finished { last_step: usize },
    /// The session was torn down.
    Closed,
}
