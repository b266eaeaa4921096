//! Book catalog service
//!
//! CRUD over `/livros` backed by a single SQLite table. The [`modules::books`]
//! module holds the schema, persistence, and handler layers; [`app`] wires
//! them into a running service.

pub mod app;
pub mod modules;

pub use app::{bootstrap, migrate, serve, App};
