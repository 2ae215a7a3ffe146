//! Result handling
//!
//! The cloud master returns the results of a run as a zip archive holding
//! `key=value` files with measurements, the tool log, its error stream and
//! any files the tool produced.

pub mod archive;
pub mod parser;

pub use archive::{ArchiveError, unpack};
pub use parser::{HIDDEN_PREFIX, ParseError};
