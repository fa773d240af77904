//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: owner-scoped queries over users, pads and notes

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{Note, NoteOrder, Pad, User};
pub use schema::SQLITE_INIT;
pub use sqlite::{SqlitePool, Storage, connect};
