//! Shared utilities for `recon`.
//!
//! - Local time parsing and formatting

pub mod time;

pub use time::{format_display_timestamp, local_now, local_today, parse_local_timestamp};
