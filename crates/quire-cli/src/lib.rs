//! Command-line front end for Quire.
//!
//! # Key Abstractions
//!
//! - [`QuireCli`]: loaded configuration plus command dispatch
//! - [`QuireConfig`]: TOML, environment, and defaults via `confyg`
//! - [`content_handlers`]: `check`, `show`, `render`, `build`, `list`

#![doc = include_str!("../README.md")]

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod content_handlers;

pub use app::QuireCli;
pub use cli::{BaseCommand, CliArgs, ConfigAction, ConfigCommand};
pub use config::QuireConfig;
