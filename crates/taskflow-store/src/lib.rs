//! # taskflow-store
//!
//! SQLite-backed persistence for TaskFlow (documents, task records, and the
//! notification feed).

pub mod store;

pub use store::{FeedNotifier, Store};
