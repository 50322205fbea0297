//! Persistence for the quiz: a small key-value port with JSON documents under
//! fixed keys, an in-memory backend for tests and a `SQLite` backend.

mod json;
pub mod repository;
pub mod sqlite;

pub use json::JsonRepository;
pub use repository::{Storage, StorageError, StorageKey};
