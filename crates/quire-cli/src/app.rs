//! The `quire` application: logging setup and command dispatch.

use crate::cli::{BaseCommand, CliArgs};
use crate::config::QuireConfig;
use crate::content_handlers::{self, BuildOptions, CheckArgs};
use crate::config_handlers;
use quire_core::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ============================================================================
// QuireCli
// ============================================================================

/// CLI application bound to a loaded configuration.
pub struct QuireCli {
    name: String,
    config: Arc<QuireConfig>,
    version: String,
}

impl QuireCli {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let config = QuireConfig::load(args.config.as_deref())?;
        Ok(Self::new(name, config))
    }

    /// Create a new CLI application.
    pub fn new(name: impl Into<String>, config: QuireConfig) -> Self {
        Self {
            name: name.into(),
            config: Arc::new(config),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// The loaded configuration.
    pub fn config(&self) -> &QuireConfig {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity flags.
    /// Subscriber output goes to stderr so rendered HTML on stdout stays clean.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // Ignore error if a subscriber is already set (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run the CLI with the given arguments.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);
        let config = &*self.config;

        match args.command {
            Some(BaseCommand::Check { path, strict }) => {
                content_handlers::handle_check(config, &config.check, CheckArgs { path, strict })
                    .await
            }
            Some(BaseCommand::Show { file, json }) => {
                content_handlers::handle_show(&file, json).await
            }
            Some(BaseCommand::Render { file, output }) => {
                content_handlers::handle_render(&file, output.as_deref(), &config.render).await
            }
            Some(BaseCommand::Build { output, dry_run }) => {
                content_handlers::handle_build(
                    config,
                    &config.render,
                    BuildOptions { output, dry_run },
                )
                .await
            }
            Some(BaseCommand::List) => content_handlers::handle_list(config).await,
            Some(BaseCommand::Version) => {
                println!("{} {}", self.name, self.version);
                Ok(())
            }
            Some(BaseCommand::Config(config_cmd)) => {
                config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            None => {
                println!("{} {}: use --help for usage", self.name, self.version);
                Ok(())
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
