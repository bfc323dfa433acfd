//! # vitae-core
//!
//! Core types, traits, configuration, prompt composition, and error handling
//! for the Vitae portfolio agent.

pub mod config;
pub mod context;
pub mod error;
pub mod message;
pub mod prompt;
pub mod traits;
