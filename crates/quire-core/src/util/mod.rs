//! Utility modules for file operations and path handling.
//!
//! # Modules
//!
//! - [`files`]: Async file discovery, reading and writing
//! - [`paths`]: Site root lookup and tilde expansion

pub mod files;
pub mod paths;
