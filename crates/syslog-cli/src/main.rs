/// Syslog command-line tool: parse, validate and summarize newline-framed
/// RFC 5424 streams with the incremental parser.
///
/// # Command overview
///
/// ```text
/// syslog [OPTIONS] <COMMAND> [FILE]
///
/// Commands:
///   parse      Print every message as JSON or normalized text
///   validate   Report lines that are not valid RFC 5424
///   stats      Print counts, distributions and decoder statistics
///   help       Print help information
///
/// Global options:
///   --chunk-size <N>         Bytes per chunk handed to the parser [4096]
///   --log-level <LEVEL>      Diagnostics filter (RUST_LOG wins) [warn]
///   --on-malformed <ACTION>  fail | replace | ignore [fail]
///   --on-unmappable <ACTION> fail | replace | ignore [fail]
///   --max-token-len <N>      Longest header token, in bytes [1024]
///   --no-field-cache         Decode HOSTNAME/APP-NAME on every message
/// ```
///
/// `FILE` defaults to stdin; `-` means stdin too.
///
/// # Exit codes
///
/// | Code | Meaning                                            |
/// |------|----------------------------------------------------|
/// | 0    | Success                                            |
/// | 1    | Error (I/O failure, invalid input for `validate`)  |
///
/// Diagnostics go to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use syslog_parser::{ErrorAction, ParserConfig};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cmd_parse;
mod cmd_stats;
mod cmd_validate;
mod session;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Incremental RFC 5424 syslog parser.
#[derive(Parser)]
#[command(name = "syslog", version, about = "Incremental RFC 5424 syslog parser")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    options: GlobalOptions,
}

/// Options shared by every command.
///
/// ```text
/// ┌──────────────────┬─────────┬──────────────────────────────────────────┐
/// │ Flag             │ Default │ Effect                                   │
/// ├──────────────────┼─────────┼──────────────────────────────────────────┤
/// │ --chunk-size     │ 4096    │ read size; any value parses identically  │
/// │ --log-level      │ warn    │ tracing filter when RUST_LOG is unset    │
/// │ --on-malformed   │ fail    │ invalid UTF-8 policy                     │
/// │ --on-unmappable  │ fail    │ unmappable input policy                  │
/// │ --max-token-len  │ 1024    │ longer header tokens abort the run       │
/// │ --no-field-cache │ off     │ disable HOSTNAME/APP-NAME reuse          │
/// └──────────────────┴─────────┴──────────────────────────────────────────┘
/// ```
#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOptions {
    /// Bytes per chunk handed to the parser.
    #[arg(long, global = true, default_value_t = 4096)]
    pub chunk_size: usize,

    /// Diagnostics level or filter directive (e.g. `debug`,
    /// `syslog_parser=trace`).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// What to do with invalid UTF-8: `fail`, `replace` or `ignore`.
    #[arg(long, global = true, default_value_t = ErrorAction::Fail)]
    pub on_malformed: ErrorAction,

    /// What to do with unmappable input: `fail`, `replace` or `ignore`.
    #[arg(long, global = true, default_value_t = ErrorAction::Fail)]
    pub on_unmappable: ErrorAction,

    /// Longest HOSTNAME, APP-NAME, SD-ID or PARAM-NAME, in bytes.
    #[arg(long, global = true, default_value_t = 1024)]
    pub max_token_len: usize,

    /// Decode HOSTNAME and APP-NAME on every message instead of reusing
    /// the previous message's text.
    #[arg(long, global = true)]
    pub no_field_cache: bool,
}

impl GlobalOptions {
    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig::default()
            .with_on_malformed(self.on_malformed)
            .with_on_unmappable(self.on_unmappable)
            .with_max_token_len(self.max_token_len)
            .with_field_cache(!self.no_field_cache)
    }
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print every valid message as JSON lines or normalized text.
    Parse(ParseArgs),
    /// Report lines that are not valid RFC 5424.
    Validate(ValidateArgs),
    /// Print message counts, severity/facility distribution and decoder
    /// statistics.
    Stats(StatsArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `syslog parse`.
///
/// Lines that fail to parse are logged at `warn` and skipped.
///
/// ```text
/// ┌──────────┬───────────────────────────────────────────────────────────┐
/// │ Format   │ Output per message                                        │
/// ├──────────┼───────────────────────────────────────────────────────────┤
/// │ json     │ one object: pri, facility, severity, timestamp, host, ... │
/// │ text     │ normalized header, a space, then the MSG body             │
/// └──────────┴───────────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct ParseArgs {
    /// Input file (stdin when omitted or `-`).
    pub file: Option<PathBuf>,

    /// Output format: `json` or `text`.
    #[arg(long, default_value = "json")]
    pub format: String,
}

/// Arguments for `syslog validate`.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Input file (stdin when omitted or `-`).
    pub file: Option<PathBuf>,

    /// Stop at the first invalid line.
    #[arg(long)]
    pub fail_fast: bool,
}

/// Arguments for `syslog stats`.
#[derive(clap::Args)]
pub struct StatsArgs {
    /// Input file (stdin when omitted or `-`).
    pub file: Option<PathBuf>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.options.log_level) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }

    let result = match &cli.command {
        Commands::Parse(args) => cmd_parse::run(args, &cli.options).await,
        Commands::Validate(args) => cmd_validate::run(args, &cli.options).await,
        Commands::Stats(args) => cmd_stats::run(args, &cli.options).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

/// Install the stderr subscriber. `RUST_LOG` takes precedence over
/// `--log-level`.
fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .or_else(|_| EnvFilter::try_new("warn"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {e}"))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();

    Ok(())
}
