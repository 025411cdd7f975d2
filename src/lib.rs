//! recon: a local bug tracker.
//!
//! Bugs and their timelines live in a single `SQLite` file under `.recon/`.
//! On top of the store sit dashboard counters, a CSV report export and the
//! `recon` command-line interface.

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod output;
pub mod storage;
pub mod util;
pub mod validation;

pub use error::{ReconError, Result, StructuredError};
