#![forbid(unsafe_code)]

//! Core: viewport geometry, animation primitives, and logging shims shared by
//! the script table, the presentation controller, and the position wrapper.

pub mod animation;
pub mod geometry;
pub mod logging;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
