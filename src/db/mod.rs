//! SQLite activity journal.
//!
//! This module provides:
//! - Database initialization and migrations
//! - SQLite pragma configuration
//! - The `Repository` for journal reads and writes

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::{Activity, ActivityKind, NewActivity, Repository};
