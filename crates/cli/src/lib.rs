//! Accrue CLI - Journal-backed command orchestrator
//!
//! This crate provides the `accrue` binary and command orchestration.

pub mod commands;
pub mod config;
pub mod context;

pub use config::AppConfig;
pub use context::{AppContext, CommitError};
