//! # vitae-providers
//!
//! Completion providers and the ordered fallback chain that always answers.

pub mod chain;
pub mod huggingface;
mod http;
pub mod openrouter;
pub mod rules;

pub use chain::ProviderChain;
pub use rules::RuleBasedResponder;
