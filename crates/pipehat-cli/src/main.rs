//! Pipehat CLI
//!
//! Command-line interface for querying, masking, updating, and sending
//! HL7 v2 message files.

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use pipehat_core::{Result, init_tracing};
use tracing::error;

#[derive(Parser)]
#[command(name = "pipehat")]
#[command(about = "Pipehat: HL7 v2 query, masking, and MLLP send toolkit")]
#[command(version = pipehat_core::VERSION)]
#[command(
    long_about = "Pipehat works on HL7 v2 message files: it resolves position addresses\n\
like PID-3[1].1.2, masks or updates the items they point at, applies a fixed\n\
de-identification policy, and sends messages to MLLP listeners.\n\
\n\
Examples:\n  \
pipehat query PID-5.1 inbox/*.hl7          # Read patient surnames\n  \
pipehat mask PID-5 --write inbox/*.hl7     # Mask patient names in place\n  \
pipehat deidentify inbox/ --out-dir safe/  # Write de-identified copies\n  \
pipehat send inbox/*.hl7 --host lab --port 2575 --delay 100"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the values an address resolves to in each message file
    Query {
        /// Item address, e.g. PID-3[1].1.2
        address: String,

        /// Files, directories, or glob patterns to read
        #[arg(required = true)]
        paths: Vec<String>,

        /// Only process messages matching ADDRESS=VALUE
        #[arg(long)]
        filter: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,
    },

    /// Assign a value to every item an address resolves to
    Set {
        /// Item address, e.g. PV1-2
        address: String,

        /// Replacement value (re-split with the item's own delimiters)
        value: String,

        #[command(flatten)]
        target: EditArgs,
    },

    /// Mask the text of every item an address resolves to
    Mask {
        /// Item address, e.g. PID-5
        address: String,

        /// Mask character
        #[arg(long, default_value_t = '*')]
        mask_char: char,

        #[command(flatten)]
        target: EditArgs,
    },

    /// Apply the fixed de-identification policy (PID, NK1, IN1, IN2)
    Deidentify {
        /// Mask character
        #[arg(long, default_value_t = '*')]
        mask_char: char,

        #[command(flatten)]
        target: EditArgs,
    },

    /// Send message files to an MLLP listener and report acknowledgments
    Send {
        /// Files, directories, or glob patterns to send
        #[arg(required = true)]
        paths: Vec<String>,

        /// Destination host name or IP address
        #[arg(long, env = "PIPEHAT_HOST")]
        host: String,

        /// Destination port
        #[arg(long, env = "PIPEHAT_PORT")]
        port: u16,

        /// Negotiate TLS after connecting
        #[arg(long)]
        tls: bool,

        /// Skip server certificate validation (testing endpoints only)
        #[arg(long, requires = "tls")]
        insecure: bool,

        /// Milliseconds to pause between sends
        #[arg(long)]
        delay: Option<u64>,

        /// Seconds to wait for connect and acknowledgment
        #[arg(long, default_value_t = 30)]
        timeout: u64,

        /// Only send messages matching ADDRESS=VALUE
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show version information
    #[command(alias = "ver")]
    Version,
}

/// Arguments shared by the mutating subcommands.
#[derive(clap::Args)]
struct EditArgs {
    /// Files, directories, or glob patterns to process
    #[arg(required = true)]
    paths: Vec<String>,

    /// Only process messages matching ADDRESS=VALUE
    #[arg(long)]
    filter: Option<String>,

    /// Rewrite matching files in place
    #[arg(long, conflicts_with = "out_dir")]
    write: bool,

    /// Write transformed copies into this directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Output format for the change report
    #[arg(short, long, default_value = "human")]
    format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON for programmatic consumption
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize colored output
    if !cli.no_color && std::env::var("NO_COLOR").is_err() {
        colored::control::set_override(true);
    } else {
        colored::control::set_override(false);
    }

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "pipehat=error",
        1 => "pipehat=warn",
        2 => "pipehat=info",
        3 => "pipehat=debug",
        _ => "pipehat=trace",
    };
    unsafe {
        std::env::set_var("RUST_LOG", log_level);
    }
    init_tracing();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime");

    match runtime.block_on(run_command(cli)) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failures) => {
            error!("{failures} file(s) failed");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("pipehat failed: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Dispatch to a command; returns the number of files that failed.
async fn run_command(cli: Cli) -> Result<usize> {
    let use_colors = !cli.no_color;
    match cli.command {
        Commands::Query {
            address,
            paths,
            filter,
            format,
        } => commands::query::query_command(&address, &paths, filter.as_deref(), format, use_colors),

        Commands::Set {
            address,
            value,
            target,
        } => commands::edit::edit_command(
            commands::edit::EditOp::Set { address, value },
            target,
            use_colors,
        ),

        Commands::Mask {
            address,
            mask_char,
            target,
        } => commands::edit::edit_command(
            commands::edit::EditOp::Mask {
                address,
                mask: mask_char,
            },
            target,
            use_colors,
        ),

        Commands::Deidentify { mask_char, target } => commands::edit::edit_command(
            commands::edit::EditOp::Deidentify { mask: mask_char },
            target,
            use_colors,
        ),

        Commands::Send {
            paths,
            host,
            port,
            tls,
            insecure,
            delay,
            timeout,
            filter,
        } => {
            commands::send::send_command(
                &paths,
                host,
                port,
                tls,
                insecure,
                delay,
                timeout,
                filter.as_deref(),
            )
            .await
        }

        Commands::Version => {
            println!("pipehat {}", pipehat_core::VERSION);
            Ok(0)
        }
    }
}
