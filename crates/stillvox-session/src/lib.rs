//! Session model and parser for Stillvox
//!
//! This crate turns a session description (a JSON list of statement records,
//! or the plain-text markup format with `<hold N seconds>` markers) into an
//! ordered sequence of typed segments: spoken narration and silent holds.
//! Parsing is pure and synchronous; playback order is the segment order.

pub mod error;
pub mod parser;
pub mod types;

pub use error::SessionError;
pub use parser::{parse_markup, parse_records, ParseOptions};
pub use types::{Segment, Session};
