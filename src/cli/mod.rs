//! CLI module for the image-batch-converter library
//!
//! This module is only available when the "cli" feature is enabled.

mod config;
#[path = "main.rs"]
mod main_impl;
mod progress;

pub use config::CliConfigBuilder;
pub use main_impl::{main, Cli, CliLogFormat};
