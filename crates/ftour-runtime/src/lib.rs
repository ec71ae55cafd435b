#![forbid(unsafe_code)]

//! FrankenTour Runtime
//!
//! Plays a [`ScriptTable`](ftour_script::ScriptTable) against a host
//! application: navigation, narration, spotlight, pointer and avatar moves,
//! all driven by a virtual clock the host advances with `tick(dt)`.
//!
//! # Key Components
//!
//! - [`PresentationController`] - step sequencing and playback controls
//! - [`PositionBroadcaster`] - avatar easing, movement trail, ripple
//! - [`TimerQueue`] - cancellable delayed tasks on a virtual clock
//! - [`Host`] - the [`Navigator`], [`Narrator`] and [`UiSurface`] capabilities
//! - [`TourConfig`] / [`TrailConfig`] - timings, with `FTOUR_*` overrides
//!
//! # How it fits in the system
//! `ftour-script` defines what a tour says and does; this crate decides when.
//! The host owns the event loop: it calls `tick` once per frame, drains
//! [`TourEvent`]s, and renders the overlay state the controller exposes.

pub mod broadcast;
pub mod capability;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod overlay;
pub mod timer;

pub use broadcast::{AvatarMode, PositionBroadcaster, Ripple, TrailPoint, trail_steps};
pub use capability::{
    Host, Navigator, Narrator, NullNarrator, RegionRegistry, UiSurface, Utterance, Voice,
    select_voice,
};
pub use config::{TourConfig, TrailConfig};
pub use controller::{PresentationController, StepPhase};
pub use error::{CapabilityError, CapabilityResult, TourError, TourResult};
pub use event::{TourAdvanceReason, TourEvent};
pub use overlay::{ControlPanelState, PanelStep, Pointer, PointerStyle, Spotlight};
pub use timer::{TimerId, TimerQueue, scale_duration};
