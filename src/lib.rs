//! data-sweep - removes scratch files from the data directories
//!
//! Each pattern is expanded against the filesystem and every match is
//! announced and deleted, in pattern order.

pub mod cleaner;
pub mod error;
pub mod pattern;

pub use cleaner::{run, CleanResult, Cleaner, DEFAULT_PATTERNS};
pub use error::{CleanError, Result};
pub use pattern::CleanPattern;
