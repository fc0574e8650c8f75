mod cmd;
mod ctx;
pub mod error;
mod signals;

use std::{
    fmt,
    io::{self, IsTerminal as _, Write as _},
    process::ExitCode,
};

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser};
use cmd::{Commands, Success};
use crossterm::style::Stylize as _;
use ctx::Ctx;
use error::{Error, Result};
use sahaay_config::{Config, KvAssignment};
use tracing::trace;

/// Sahaay, a multilingual health assistant.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten, next_help_heading = "Global Options")]
    globals: Globals,

    #[command(subcommand, next_help_heading = "Options")]
    command: Commands,
}

#[derive(Debug, clap::Args)]
pub struct Globals {
    /// Override a configuration value for the duration of the command.
    #[arg(short, long, value_name = "KEY=VALUE", global = true, action = ArgAction::Append)]
    config: Vec<KvAssignment>,

    /// Read configuration from this file instead of `sahaay.toml`.
    #[arg(long, value_name = "PATH", global = true)]
    config_file: Option<Utf8PathBuf>,

    /// Increase verbosity of logging.
    ///
    /// Can be specified multiple times to increase verbosity.
    ///
    /// Defaults to printing "error" messages. For each increase in verbosity,
    /// the log level is set to "warn", "info", "debug", and "trace"
    /// respectively.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress all output, including errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

impl fmt::Display for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entry(&"config", &self.globals.config)
            .entry(&"config_file", &self.globals.config_file)
            .entry(&"verbose", &self.globals.verbose)
            .entry(&"quiet", &self.globals.quiet)
            .finish()
    }
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    let is_tty = io::stdout().is_terminal();
    let quiet = cli.globals.quiet;

    configure_logging(cli.globals.verbose, quiet);
    trace!(command = cli.command.name(), arguments = %cli, "Starting CLI run.");

    let (code, output) = match run_inner(cli, is_tty).await {
        Ok(Success::Ok) => (0, None),
        Ok(Success::Message(message)) => (0, Some(message)),
        Err(error) => {
            let (code, message) = parse_error(error, is_tty);
            if !quiet && let Err(error) = writeln!(io::stderr().lock(), "{message}") {
                trace!(%error, "Failed to write error output.");
            }
            (code, None)
        }
    };

    if let Some(output) = output.filter(|_| !quiet)
        && let Err(error) = writeln!(io::stdout().lock(), "{output}")
    {
        trace!(%error, "Failed to write output.");
    }

    ExitCode::from(code)
}

async fn run_inner(cli: Cli, is_tty: bool) -> Result<Success> {
    let mut config = Config::load(cli.globals.config_file.as_deref(), &[])?;
    cli.command.apply_cli_config(&mut config)?;
    apply_cli_configs(&cli.globals.config, &mut config)?;

    let mut ctx = Ctx::new(config, is_tty);
    cli.command.run(&mut ctx).await
}

/// Exit code and the message to show for `error`.
fn parse_error(error: Error, is_tty: bool) -> (u8, String) {
    let (code, message) = match error {
        Error::Command(error) => (error.code, error.message),
        error => (1, error.to_string()),
    };

    if is_tty && code != cmd::FLAGGED {
        return (code, format!("{} {message}", "Error:".red().bold()));
    }

    (code, message)
}

fn apply_cli_configs(overrides: &[KvAssignment], config: &mut Config) -> Result<()> {
    trace!(overrides = ?overrides, "Applying CLI config overrides.");

    for kv in overrides {
        config.assign(kv)?;
    }

    Ok(())
}

fn configure_logging(verbose: u8, quiet: bool) {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::fmt;

    let mut level = match verbose {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        3 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    if quiet {
        level = LevelFilter::OFF;
    }

    let mut filter = vec!["off".to_owned()];
    for krate in [
        "cli",
        "client",
        "config",
        "conversation",
        "emergency",
        "relay",
        "storage",
        "stream",
        "wire",
    ] {
        filter.push(format!("sahaay_{krate}={level}"));
    }

    let format = fmt::format().with_target(false).compact();

    if level < LevelFilter::DEBUG {
        tracing_subscriber::fmt()
            .event_format(format)
            .without_time()
            .with_ansi(true)
            .with_target(false)
            .with_writer(io::stderr)
            .with_env_filter(filter.join(","))
            .init();
    } else {
        tracing_subscriber::fmt()
            .event_format(format)
            .with_ansi(true)
            .with_target(false)
            .with_writer(io::stderr)
            .with_env_filter(filter.join(","))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_overrides() {
        let cli = Cli::try_parse_from([
            "sahaay",
            "-c",
            "client.window=4",
            "check",
            "hello",
            "--config",
            "storage.root=/tmp/x",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.globals.verbose, 2);
        assert_eq!(cli.globals.config, vec![
            KvAssignment::new("client.window", "4"),
            KvAssignment::new("storage.root", "/tmp/x"),
        ]);
    }

    #[test]
    fn command_flags_override_config() {
        let cli = Cli::try_parse_from(["sahaay", "chat", "--language", "ta", "--session", "abc"])
            .unwrap();

        let mut config = Config::default();
        cli.command.apply_cli_config(&mut config).unwrap();

        assert_eq!(config.client.language, sahaay_wire::Language::Tamil);
        assert_eq!(config.client.session.as_deref(), Some("abc"));

        let cli = Cli::try_parse_from(["sahaay", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
        cli.command.apply_cli_config(&mut config).unwrap();
        assert_eq!(config.relay.bind, "0.0.0.0:9000");
    }

    #[test]
    fn rejects_malformed_overrides() {
        assert!(Cli::try_parse_from(["sahaay", "-c", "novalue", "check", "x"]).is_err());
    }

    #[test]
    fn command_errors_keep_their_exit_code() {
        let error = Error::Command(cmd::Error::new(cmd::FLAGGED, "Possible emergency"));
        assert_eq!(parse_error(error, false), (3, "Possible emergency".to_owned()));

        let error = Error::Io(io::Error::other("boom"));
        assert_eq!(parse_error(error, false), (1, "IO error: boom".to_owned()));
    }
}
