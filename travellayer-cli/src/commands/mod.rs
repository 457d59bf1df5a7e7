//! CLI command implementations.
//!
//! Each subcommand has its own module with its handler.
//!
//! # Command Modules
//!
//! - [`setup`] - Interactive API key acquisition and encrypted storage
//! - [`layers`] - One-shot layer fetch and summary
//! - [`state`] - Persisted session state inspection and cleanup

pub mod layers;
pub mod setup;
pub mod state;
