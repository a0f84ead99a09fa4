use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use glob::glob;
use mds_stream_core::{
    AnalysisOptions, Framing, PacketSummary, Report, StreamError, decode_packet, validate_sequence,
};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("MDS_STREAM_BUILD_COMMIT"),
    " ",
    env!("MDS_STREAM_BUILD_DATE"),
    ")"
);

const INPUT_EXTENSIONS: [&str; 3] = ["hex", "txt", "log"];

#[derive(Parser, Debug)]
#[command(name = "mds-stream")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decoder and offline analyzer for MDS diagnostic stream packets.",
    long_about = None,
    after_help = "Examples:\n  mds-stream decode 0501020304\n  mds-stream validate 31 0\n  mds-stream analyse capture.hex -o report.json"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a single stream packet given as hex and print it as JSON.
    Decode {
        /// Packet bytes as hex (header byte first)
        packet: String,

        /// Input starts with the HID report id (0x06)
        #[arg(long)]
        report_id: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Check that CURRENT is the next sequence number after PREVIOUS.
    Validate {
        /// Previous sequence number (masked to 5 bits)
        previous: u8,
        /// Current sequence number (masked to 5 bits)
        current: u8,
    },
    /// Analyse a hex dump capture and generate a versioned JSON report.
    #[command(alias = "analyze")]
    #[command(
        after_help = "Examples:\n  mds-stream analyse capture.hex -o report.json\n  mds-stream analyze hidraw.log --report-id --stdout --pretty"
    )]
    Analyse {
        /// Path to a .hex, .txt or .log capture (one packet per line)
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if violations are present
        #[arg(long)]
        strict: bool,

        /// List violations after analysis
        #[arg(long)]
        list_violations: bool,

        /// Capture lines start with the HID report id
        #[arg(long)]
        report_id: bool,
    },
}

struct AnalyseArgs {
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    quiet: bool,
    strict: bool,
    list_violations: bool,
    framing: Framing,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Decode {
            packet,
            report_id,
            pretty,
        } => cmd_decode(&packet, framing_for(report_id), pretty),
        Commands::Validate { previous, current } => {
            return cmd_validate(previous, current);
        }
        Commands::Analyse {
            input,
            report,
            stdout,
            pretty,
            compact: _,
            quiet,
            strict,
            list_violations,
            report_id,
        } => cmd_analyse(AnalyseArgs {
            input,
            report,
            stdout,
            pretty,
            quiet,
            strict,
            list_violations,
            framing: framing_for(report_id),
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            if let Some(hint) = err.hint() {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
}

fn framing_for(report_id: bool) -> Framing {
    if report_id {
        Framing::HidReport
    } else {
        Framing::Raw
    }
}

/// Failure of a subcommand, printed as `error:` and an optional `hint:` line.
#[derive(Debug)]
enum CliError {
    /// Bad input or flags the user can correct.
    Usage { message: String, hint: String },
    /// Packet rejected by the stream decoder.
    Packet(StreamError),
    /// `--strict` run whose report carries violations; holds their ids.
    Violations(Vec<String>),
    Internal(anyhow::Error),
}

impl CliError {
    fn usage(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::Usage {
            message: message.into(),
            hint: hint.into(),
        }
    }

    fn hint(&self) -> Option<&str> {
        match self {
            CliError::Usage { hint, .. } => Some(hint.as_str()),
            CliError::Packet(StreamError::InvalidArgument) => {
                Some("pass at least the header byte")
            }
            CliError::Packet(StreamError::TooShort { .. }) => {
                Some("a stream report is the id 0x06 followed by the header byte")
            }
            CliError::Packet(StreamError::PayloadTooLarge { .. }) => {
                Some("a stream packet carries at most 63 payload bytes after the header")
            }
            CliError::Violations(_) => Some("use --list-violations to inspect"),
            CliError::Internal(_) => None,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Usage { message, .. } => f.write_str(message),
            CliError::Packet(err) => write!(f, "{err} (status {})", err.code()),
            CliError::Violations(ids) => {
                write!(f, "stream violations detected: {}", ids.join(", "))
            }
            CliError::Internal(err) => write!(f, "{err:#}"),
        }
    }
}

impl From<StreamError> for CliError {
    fn from(err: StreamError) -> Self {
        CliError::Packet(err)
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::Internal(err)
    }
}

fn cmd_decode(packet: &str, framing: Framing, pretty: bool) -> Result<(), CliError> {
    let digits: String = packet.split_whitespace().collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(&digits);
    let bytes = hex::decode(digits).map_err(|err| {
        CliError::usage(
            format!("invalid hex packet '{packet}'"),
            format!("hex error: {err}"),
        )
    })?;

    let decoded = decode_packet(framing, &bytes)?.ok_or_else(|| {
        CliError::usage(
            "not a stream data report",
            "stream data uses report id 0x06; drop --report-id for raw packets",
        )
    })?;
    println!("{}", to_json(&PacketSummary::from(&decoded), pretty)?);
    Ok(())
}

fn cmd_validate(previous: u8, current: u8) -> ExitCode {
    if validate_sequence(previous, current) {
        println!("valid");
        ExitCode::SUCCESS
    } else {
        println!("invalid");
        ExitCode::from(1)
    }
}

fn cmd_analyse(args: AnalyseArgs) -> Result<(), CliError> {
    let input = resolve_input_path(&args.input)?;
    check_capture_file(&input)?;
    let input_abs = fs::canonicalize(&input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;

    let report_path = match (args.stdout, args.report) {
        (true, _) => None,
        (false, Some(path)) => {
            ensure_distinct_output(&path, &input_abs)?;
            Some(path)
        }
        (false, None) => {
            return Err(CliError::usage(
                "missing output path",
                "use -o/--report or --stdout",
            ));
        }
    };

    let options = AnalysisOptions {
        framing: args.framing,
    };
    debug!(input = %input.display(), framing = ?options.framing, "analysing capture");
    let report = mds_stream_core::analyze_capture_file(&input, &options)
        .context("capture analysis failed")?;
    let json = to_json(&report, args.pretty)?;

    match report_path {
        None => print!("{json}"),
        Some(path) => {
            write_report(&path, &json)?;
            if !args.quiet {
                eprintln!("OK: report written -> {}", path.display());
            }
        }
    }

    if args.list_violations && !args.quiet {
        print_violations(&report);
    }
    if args.strict && !report.violations.is_empty() {
        let ids = report.violations.iter().map(|v| v.id.clone()).collect();
        return Err(CliError::Violations(ids));
    }
    Ok(())
}

fn write_report(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    fs::write(path, json).with_context(|| format!("Failed to write report: {}", path.display()))
}

fn ensure_distinct_output(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let Some(file_name) = report_path.file_name() else {
        return Err(CliError::usage(
            format!("invalid report path: {}", report_path.display()),
            "name a .json file",
        ));
    };
    let parent = match report_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // A missing parent directory is created later, so it cannot alias the input.
    let Ok(report_dir) = fs::canonicalize(parent) else {
        return Ok(());
    };
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::usage(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            "write the report next to the capture under another name",
        ));
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    Ok(json.context("JSON serialization failed")?)
}

fn print_violations(report: &Report) {
    eprintln!("Violations:");
    for violation in &report.violations {
        eprintln!(
            "  {} {} x{}: {}",
            violation.severity, violation.id, violation.count, violation.message
        );
        if !violation.examples.is_empty() {
            eprintln!("    at {}", violation.examples.join(", "));
        }
    }
}

fn is_capture_file(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| INPUT_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

fn check_capture_file(input: &Path) -> Result<(), CliError> {
    if !input.is_file() {
        let problem = if input.exists() {
            "input is not a file"
        } else {
            "input file not found"
        };
        return Err(CliError::usage(
            format!("{problem}: {}", input.display()),
            "pass a .hex, .txt or .log capture with one packet per line",
        ));
    }
    if !is_capture_file(input) {
        return Err(CliError::usage(
            format!("unsupported input format '{}'", input.display()),
            "expected a .hex, .txt or .log capture",
        ));
    }
    Ok(())
}

/// Resolves a glob INPUT to the single capture it names. Matches without a
/// capture extension are ignored, so `dir/*` picks the one `.hex` next to
/// reports or notes.
fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !pattern.contains(['*', '?', '[']) {
        return Ok(input.to_path_buf());
    }

    let entries = glob(&pattern).map_err(|err| {
        CliError::usage(
            format!("invalid input pattern '{pattern}'"),
            format!("pattern error: {}", err.msg),
        )
    })?;
    let mut captures: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|path| path.is_file() && is_capture_file(path))
        .collect();

    match captures.len() {
        0 => Err(CliError::usage(
            format!("no capture files match pattern '{pattern}'"),
            "captures end in .hex, .txt or .log; quote the pattern to keep the shell from expanding it",
        )),
        1 => Ok(captures.remove(0)),
        n => {
            let listed: Vec<String> = captures.iter().map(|p| p.display().to_string()).collect();
            Err(CliError::usage(
                format!(
                    "multiple files match pattern '{pattern}' ({n} captures): {}",
                    listed.join(", ")
                ),
                "pass a single capture file, or run once per file",
            ))
        }
    }
}
