//! Command-line interface definition.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use hostpool_core::TracingOutputFormat;

/// hostpool - one scheduling API in front of many calendars
#[derive(Debug, Parser)]
#[command(name = "hostpool")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Log output format (pretty, compact or json)
    #[arg(long, global = true, env = "HOSTPOOL_LOG_FORMAT")]
    pub log_format: Option<TracingOutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        #[command(flatten)]
        config: ConfigArgs,

        /// Override `server.bind` from the config file
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Resolve every host's event type and report failures
    Check {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

/// Location of the configuration file.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Path to configuration file
    #[arg(long, short, env = "HOSTPOOL_CONFIG")]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_serve_with_overrides() {
        let cli = Cli::try_parse_from([
            "hostpool",
            "--log-format",
            "json",
            "serve",
            "--config",
            "/etc/hostpool.toml",
            "--bind",
            "0.0.0.0:9090",
        ])
        .unwrap();

        assert_eq!(cli.log_format, Some(TracingOutputFormat::Json));
        let Command::Serve { config, bind } = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(config.config, PathBuf::from("/etc/hostpool.toml"));
        assert_eq!(bind, Some(SocketAddr::from(([0, 0, 0, 0], 9090))));
    }

    #[test]
    fn parse_check_with_global_debug() {
        let cli = Cli::try_parse_from(["hostpool", "check", "-c", "pool.toml", "--debug"]).unwrap();
        assert!(cli.debug);
        assert!(matches!(cli.command, Command::Check { .. }));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let result = Cli::try_parse_from([
            "hostpool",
            "--log-format",
            "xml",
            "check",
            "--config",
            "pool.toml",
        ]);
        assert!(result.is_err());
    }
}
