//! `SQLite` storage layer for `recon`.
//!
//! One [`SqliteStorage`] owns the connection; bug operations live in
//! [`sqlite`], timeline operations in [`timeline`].

pub mod schema;
pub mod sqlite;
pub mod timeline;

pub use sqlite::{BugUpdate, SqliteStorage};
pub use timeline::chronological;
