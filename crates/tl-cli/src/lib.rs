//! Time ledger CLI library.
//!
//! This crate provides the CLI interface for the time ledger.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, EntryAction, ManualAction};
pub use config::{Config, RunningPolicy};
