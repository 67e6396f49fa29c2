//! Avlink CLI - send control commands to an AV device and print its replies

use anyhow::Context;
use avlink_core::cli::{exit_code_table, format_output, format_response, CommandLines, LineError};
use avlink_core::core::codec::{
    bytes_to_text, create_codec, debug_dump, parse_escapes, to_ascii_mnemonics, to_decimal_codes,
    to_hex,
};
use avlink_core::{
    AppConfig, CliResult, CodecType, CommandClient, ConfigSource, DeviceEndpoint,
    OutgoingCommand, OutputFormat, TraceFlags,
};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Avlink CLI
#[derive(Parser, Debug)]
#[command(
    name = "avlink",
    version,
    about = "Command/response client for TCP-controlled AV devices",
    long_about = None
)]
struct Cli {
    /// Config file (overrides $config_file)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Device host (overrides config)
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Device port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Read inactivity timeout in ms (overrides config)
    #[arg(long)]
    receive_timeout: Option<u64>,

    /// Settle delay before reading in ms (overrides config)
    #[arg(long)]
    receive_wait: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Per-byte trace output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a command (configured name or literal payload) and print the reply
    Send {
        /// Command name from config, or a payload with \r \n \xHH escapes
        command: String,

        /// Number of identical sends
        #[arg(short = 'n', long, default_value = "1")]
        repeat: u32,

        /// Pause between sends in ms (defaults to config send_delay_ms)
        #[arg(short, long)]
        delay: Option<u64>,

        /// Name shown in traces
        #[arg(short, long)]
        label: Option<String>,

        /// Treat a silent device as success
        #[arg(long)]
        allow_empty: bool,
    },

    /// Send commands read line by line from stdin over one connection
    Batch {
        /// Number of identical sends per line
        #[arg(short = 'n', long, default_value = "1")]
        repeat: u32,
    },

    /// Connect and print whatever the device sends
    Listen,

    /// Check whether the device accepts connections
    Probe,

    /// List configured commands
    Commands,

    /// Show every trace rendering of a payload
    Encode {
        /// Payload with \r \n \xHH escapes
        text: String,
    },

    /// Convert a hex string back to text
    DecodeHex {
        /// Hex digits, two per character
        hex: String,
    },

    /// Print the exit code table
    ExitCodes,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let source = ConfigSource::resolve(cli.config.as_deref());
    let config = match AppConfig::load(&source) {
        Ok(config) => config,
        Err(e) => return report(&cli, &CliResult::config_error(e.to_string())),
    };

    let _guard = init_tracing(&cli, &config);
    tracing::debug!(config = %source, "configuration loaded");

    let result = match run(&cli, &config).await {
        Ok(result) => result,
        Err(e) => CliResult::error(avlink_core::ExitCodes::ERROR, format!("{e:#}")),
    };
    report(&cli, &result)
}

fn report(cli: &Cli, result: &CliResult) -> ExitCode {
    match result {
        CliResult::Error(_, msg) => eprintln!("Error: {msg}"),
        CliResult::Success(Some(msg)) if !cli.quiet => eprintln!("{msg}"),
        CliResult::Success(_) => {}
    }
    result.to_exit_code()
}

/// Install the subscriber; the guard must live until exit to flush output
fn init_tracing(cli: &Cli, config: &AppConfig) -> WorkerGuard {
    let level = if cli.quiet {
        "error"
    } else if cli.verbose || config.debug {
        "debug"
    } else if config.info {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .init();

    guard
}

fn endpoint(cli: &Cli, config: &AppConfig) -> DeviceEndpoint {
    let mut endpoint = config.device.clone();
    if let Some(host) = &cli.host {
        endpoint.host.clone_from(host);
    }
    if let Some(port) = cli.port {
        endpoint.port = port;
    }
    if let Some(ms) = cli.receive_timeout {
        endpoint.receive_timeout_ms = ms;
    }
    if let Some(ms) = cli.receive_wait {
        endpoint.receive_wait_ms = ms;
    }
    endpoint
}

fn client(cli: &Cli, config: &AppConfig) -> CommandClient {
    let trace = TraceFlags {
        debug: config.debug || cli.verbose,
        info: config.info,
    };
    CommandClient::new(endpoint(cli, config)).with_trace(trace)
}

/// Payload and trace label for a configured name or a literal payload
fn resolve_payload(
    config: &AppConfig,
    command: &str,
) -> Result<(Bytes, Option<String>), CliResult> {
    match config.resolve_command(command) {
        Some(Ok(payload)) => Ok((payload, Some(command.to_string()))),
        Some(Err(e)) => Err(CliResult::config_error(e.to_string())),
        None => parse_escapes(command)
            .map(|payload| (payload, None))
            .map_err(|e| CliResult::invalid_args(e.to_string())),
    }
}

fn build_command(
    payload: Bytes,
    label: Option<String>,
    repeat: u32,
    delay: Option<u64>,
) -> OutgoingCommand {
    let mut command = OutgoingCommand::new(payload).repeat(repeat);
    if let Some(ms) = delay {
        command = command.delay_ms(ms);
    }
    if let Some(label) = label {
        command = command.label(label);
    }
    command
}

async fn run(cli: &Cli, config: &AppConfig) -> anyhow::Result<CliResult> {
    match &cli.command {
        Commands::Send {
            command,
            repeat,
            delay,
            label,
            allow_empty,
        } => {
            let (payload, configured_label) = match resolve_payload(config, command) {
                Ok(resolved) => resolved,
                Err(result) => return Ok(result),
            };
            let label = label.clone().or(configured_label);
            let outgoing = build_command(payload, label, *repeat, *delay);

            let mut client = client(cli, config);
            let response = client.send(&outgoing).await;
            client.disconnect().await;

            if !response.is_empty() || cli.format == OutputFormat::Json {
                println!("{}", format_response(&response, cli.format));
            }
            Ok(CliResult::from_response(&response, !allow_empty))
        }

        Commands::Batch { repeat } => {
            let mut lines = CommandLines::stdin();
            let mut client = client(cli, config);
            let mut result = CliResult::success();

            loop {
                let line = match lines.next_command().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e @ LineError::InvalidUtf8 { .. }) => {
                        tracing::warn!(error = %e, "skipping batch line");
                        result = CliResult::invalid_args(e.to_string());
                        continue;
                    }
                    Err(e) => {
                        client.disconnect().await;
                        return Err(e).context("reading commands from stdin");
                    }
                };

                let (payload, label) = match resolve_payload(config, &line) {
                    Ok(resolved) => resolved,
                    Err(failure) => {
                        result = failure;
                        continue;
                    }
                };
                let response = client
                    .send(&build_command(payload, label, *repeat, None))
                    .await;
                println!("{}", format_response(&response, cli.format));

                let outcome = CliResult::from_response(&response, false);
                if !outcome.is_success() {
                    result = outcome;
                }
            }

            client.disconnect().await;
            Ok(result)
        }

        Commands::Listen => {
            let mut client = client(cli, config);
            if let Err(e) = client.connection_mut().ensure_connected().await {
                return Ok(CliResult::connection_failed(e.to_string()));
            }
            let response = client.receive().await;
            client.disconnect().await;

            println!("{}", format_response(&response, cli.format));
            Ok(CliResult::from_response(&response, false))
        }

        Commands::Probe => {
            let mut client = client(cli, config);
            let target = client.connection().connection_info();
            if client.connection_mut().probe().await {
                Ok(CliResult::success_with_message(format!("{target} is reachable")))
            } else {
                Ok(CliResult::connection_failed(format!("{target} is unreachable")))
            }
        }

        Commands::Commands => {
            if config.commands.is_empty() && !cli.quiet {
                eprintln!("No commands configured.");
            }
            let mut result = CliResult::success();
            for (name, payload) in config.resolved_commands() {
                match payload {
                    Ok(payload) => {
                        println!("{name} = {}", format_output(&payload, OutputFormat::Text));
                    }
                    Err(e) => result = CliResult::config_error(e.to_string()),
                }
            }
            Ok(result)
        }

        Commands::Encode { text } => {
            let payload = match parse_escapes(text) {
                Ok(payload) => bytes_to_text(&payload),
                Err(e) => return Ok(CliResult::invalid_args(e.to_string())),
            };
            println!("hex:      {}", to_hex(&payload));
            println!("decimal:  {}", to_decimal_codes(&payload));
            println!("mnemonic: {}", to_ascii_mnemonics(&payload, true));
            println!("{}", debug_dump(&payload));
            Ok(CliResult::success())
        }

        Commands::DecodeHex { hex } => match create_codec(CodecType::Hex).decode(hex) {
            Ok(payload) => {
                println!("{}", format_output(&payload, cli.format));
                Ok(CliResult::success())
            }
            Err(e) => Ok(CliResult::invalid_args(e.to_string())),
        },

        Commands::ExitCodes => {
            println!("{}", exit_code_table());
            Ok(CliResult::success())
        }
    }
}
