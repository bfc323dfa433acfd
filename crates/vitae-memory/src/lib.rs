//! # vitae-memory
//!
//! SQLite-backed profile source and transcript store for Vitae.

pub mod store;

pub use store::Store;
