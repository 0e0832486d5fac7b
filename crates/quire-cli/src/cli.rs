//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};

// ============================================================================
// CLI argument types
// ============================================================================

/// Check, inspect, and render blog posts with YAML front matter.
#[derive(Parser, Debug)]
#[command(name = "quire", author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "QUIRE_CONFIG", global = true)]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<BaseCommand>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum BaseCommand {
    /// Check front matter and code fences.
    Check {
        /// File or directory to check (defaults to the content path).
        path: Option<String>,

        /// Treat warnings as failures.
        #[arg(long)]
        strict: bool,
    },

    /// Show a post's metadata and block structure.
    Show {
        /// Post file.
        file: String,

        /// Print the parsed document as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Render a post body to an HTML fragment.
    Render {
        /// Post file.
        file: String,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Render every dated post into the output directory.
    Build {
        /// Output directory (defaults to the configured output path).
        #[arg(short, long)]
        output: Option<String>,

        /// Show what would be written without writing.
        #[arg(long)]
        dry_run: bool,
    },

    /// List posts oldest first.
    List,

    /// Print version information.
    Version,

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "render.tables").
        key: String,
    },

    /// Set a configuration value by dotted key.
    Set {
        /// Dotted key (e.g., "check.require_date").
        key: String,

        /// Value to set.
        value: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration as `QUIRE_*` environment assignments.
    Export,
}

// ============================================================================
// Tests
// ============================================================================
