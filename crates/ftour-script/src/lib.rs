#![forbid(unsafe_code)]

//! Script table: the ordered, immutable list of tour steps.
//!
//! A [`ScriptTable`] is validated once at construction and never mutated;
//! the presentation controller only reads from it. Scripts are either built
//! in code ([`builtin::municipal_tour`]) or loaded from JSON
//! ([`ScriptTable::from_json`]).

pub mod builtin;
pub mod error;
pub mod step;
pub mod table;

pub use error::{ScriptError, ScriptResult};
pub use step::{ActionKind, Position, PresentationAction, PresentationStep, Selector};
pub use table::ScriptTable;
