#![forbid(unsafe_code)]

//! FrankenTour demo: the municipal portal tour played on a virtual clock
//! against an in-memory host, rendered as text.

pub mod cli;
pub mod host;
pub mod render;
