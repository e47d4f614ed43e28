//! Binary entry point for the nbtstats CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Convert tag files to a mirrored JSON tree (and copy existing JSON)
//! nbtstats extract --source Backups/Season1/data/lootr --output Output
//!
//! # Count identifier occurrences across extracted trees
//! nbtstats count --root Output/Backups/Season1/data/lootr \
//!     --key-path data.actualOpeners --out Sorted/global/lootrCount.json
//!
//! # Convert between identifier forms
//! nbtstats resolve AtlasV1224 --to ints
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use nbtstats_core::error::NbtStatsError;
use nbtstats_core::extract::{run_extract, ExtractOptions};
use nbtstats_core::ident::{IdentValue, NameTable};
use nbtstats_core::stats::{count_occurrences, write_report};
use nbtstats_core::writer::OutputFormat;

// ============================================================================
// CLI Structure
// ============================================================================

/// Extract tagged save data into mirrored JSON/YAML trees and aggregate
/// identifier occurrence counts.
#[derive(Parser, Debug)]
#[command(name = "nbtstats", version, about = "Save-data extraction and stats")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Project root that relative paths are resolved against
    /// (default: current directory).
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Structured output format for converted files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Pretty-printed JSON (default).
    #[default]
    Json,
    /// Block-style YAML.
    Yaml,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Yaml => OutputFormat::Yaml,
        }
    }
}

/// Summary style for the extract report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum ReportStyle {
    /// One-line human summary (default).
    #[default]
    Text,
    /// Full JSON report including per-file failures.
    Json,
}

/// Target form for identifier conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ResolveTarget {
    /// Canonical lowercase hyphenated string.
    Uuid,
    /// Known name, or a descriptive no-match string.
    Name,
    /// Four signed big-endian 32-bit words.
    Ints,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Convert tag files under the sources into a mirrored structured tree,
    /// copying already-structured files alongside.
    Extract {
        /// Source paths (files or directories); repeatable.
        #[arg(long = "source", required = true)]
        sources: Vec<PathBuf>,
        /// Output base directory.
        #[arg(long, default_value = "Output")]
        output: PathBuf,
        /// Output format for converted files.
        #[arg(long, value_enum, default_value = "json")]
        format: Format,
        /// Report style printed to stdout.
        #[arg(long, value_enum, default_value = "text")]
        report: ReportStyle,
    },
    /// Count identifier occurrences across extracted JSON trees and write a
    /// name-to-count report.
    Count {
        /// Directory of extracted JSON trees.
        #[arg(long)]
        root: PathBuf,
        /// Dot-separated key path selecting the subtree to scan.
        #[arg(long)]
        key_path: String,
        /// Report destination.
        #[arg(long)]
        out: PathBuf,
    },
    /// Convert an identifier between its name, string, and int-array forms.
    Resolve {
        /// A known name, an identifier string, or four comma-separated
        /// integers.
        value: String,
        /// Target form.
        #[arg(long, value_enum)]
        to: ResolveTarget,
    },
}

// ============================================================================
// Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.code().code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), NbtStatsError> {
    match cli.command {
        Command::Extract {
            sources,
            output,
            format,
            report,
        } => execute_extract(&cli.global, sources, output, format, report),
        Command::Count {
            root,
            key_path,
            out,
        } => execute_count(&cli.global, root, &key_path, out),
        Command::Resolve { value, to } => execute_resolve(&value, to),
    }
}

// ============================================================================
// Command Executors
// ============================================================================

fn execute_extract(
    global: &GlobalArgs,
    sources: Vec<PathBuf>,
    output: PathBuf,
    format: Format,
    report_style: ReportStyle,
) -> Result<(), NbtStatsError> {
    let project_root = resolve_project_root(global)?;
    let opts = ExtractOptions {
        sources: sources
            .into_iter()
            .map(|source| absolutize(source, &project_root))
            .collect(),
        output_root: absolutize(output, &project_root),
        project_root,
        format: format.into(),
    };

    let report = run_extract(&opts);
    match report_style {
        ReportStyle::Text => {
            println!(
                "processed {} file(s) ({} converted, {} copied, {} failed); output under: {}",
                report.processed(),
                report.converted,
                report.copied,
                report.failures.len(),
                opts.output_root.display(),
            );
        }
        ReportStyle::Json => {
            let rendered = serde_json::to_string_pretty(&report)
                .map_err(|err| NbtStatsError::internal(err.to_string()))?;
            println!("{rendered}");
        }
    }
    Ok(())
}

fn execute_count(
    global: &GlobalArgs,
    root: PathBuf,
    key_path: &str,
    out: PathBuf,
) -> Result<(), NbtStatsError> {
    let keys: Vec<&str> = key_path.split('.').filter(|key| !key.is_empty()).collect();
    if keys.is_empty() {
        return Err(NbtStatsError::invalid_args(
            "--key-path must name at least one key",
        ));
    }

    let project_root = resolve_project_root(global)?;
    let root = absolutize(root, &project_root);
    let out = absolutize(out, &project_root);

    let table = NameTable::builtin();
    let counts = count_occurrences(&root, &keys, &table);
    write_report(&counts, &out)?;
    println!("wrote {} name(s) to: {}", counts.len(), out.display());
    Ok(())
}

fn execute_resolve(value: &str, target: ResolveTarget) -> Result<(), NbtStatsError> {
    let table = NameTable::builtin();
    let input = parse_ident_value(value)?;
    match target {
        ResolveTarget::Uuid => println!("{}", table.canonical_string(&input)?),
        ResolveTarget::Name => println!("{}", table.display_name(&input)?),
        ResolveTarget::Ints => {
            let words = table.to_int_array(&input)?;
            let rendered = serde_json::to_string(&words)
                .map_err(|err| NbtStatsError::internal(err.to_string()))?;
            println!("{rendered}");
        }
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, NbtStatsError> {
    let root = match &global.project_root {
        Some(root) => root.clone(),
        None => env::current_dir()
            .map_err(|err| NbtStatsError::internal(format!("cannot determine cwd: {err}")))?,
    };
    root.canonicalize().map_err(|err| {
        NbtStatsError::invalid_args(format!(
            "project root {} is not accessible: {err}",
            root.display()
        ))
    })
}

fn absolutize(path: PathBuf, project_root: &Path) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        project_root.join(path)
    }
}

/// Parse the resolve argument: comma-separated integers are the int-array
/// form, anything else is a name or identifier string.
fn parse_ident_value(raw: &str) -> Result<IdentValue, NbtStatsError> {
    if raw.contains(',') {
        let words = raw
            .split(',')
            .map(|part| part.trim().parse::<i32>())
            .collect::<Result<Vec<i32>, _>>()
            .map_err(|err| {
                NbtStatsError::invalid_args(format!("invalid integer in '{raw}': {err}"))
            })?;
        Ok(IdentValue::Ints(words))
    } else {
        Ok(IdentValue::text(raw))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod argument_parsing {
        use super::*;

        #[test]
        fn extract_requires_a_source() {
            let result = Cli::try_parse_from(["nbtstats", "extract"]);
            assert!(result.is_err());
        }

        #[test]
        fn extract_defaults() {
            let cli = Cli::try_parse_from(["nbtstats", "extract", "--source", "Backups"]).unwrap();
            match cli.command {
                Command::Extract {
                    sources,
                    output,
                    format,
                    report,
                } => {
                    assert_eq!(sources, vec![PathBuf::from("Backups")]);
                    assert_eq!(output, PathBuf::from("Output"));
                    assert_eq!(format, Format::Json);
                    assert_eq!(report, ReportStyle::Text);
                }
                _ => panic!("expected extract command"),
            }
        }

        #[test]
        fn extract_accepts_repeated_sources_and_yaml() {
            let cli = Cli::try_parse_from([
                "nbtstats", "extract", "--source", "a", "--source", "b", "--format", "yaml",
            ])
            .unwrap();
            match cli.command {
                Command::Extract {
                    sources, format, ..
                } => {
                    assert_eq!(sources.len(), 2);
                    assert_eq!(format, Format::Yaml);
                }
                _ => panic!("expected extract command"),
            }
        }

        #[test]
        fn resolve_parses_target() {
            let cli =
                Cli::try_parse_from(["nbtstats", "resolve", "AtlasV1224", "--to", "ints"]).unwrap();
            match cli.command {
                Command::Resolve { value, to } => {
                    assert_eq!(value, "AtlasV1224");
                    assert_eq!(to, ResolveTarget::Ints);
                }
                _ => panic!("expected resolve command"),
            }
        }
    }

    mod ident_value_parsing {
        use super::*;

        #[test]
        fn comma_separated_input_is_int_array() {
            let value = parse_ident_value("1, -2,3 ,4").unwrap();
            assert_eq!(value, IdentValue::Ints(vec![1, -2, 3, 4]));
        }

        #[test]
        fn plain_text_is_text() {
            let value = parse_ident_value("AtlasV1224").unwrap();
            assert_eq!(value, IdentValue::text("AtlasV1224"));
        }

        #[test]
        fn non_integer_entries_are_invalid_arguments() {
            let err = parse_ident_value("1,2,x,4").unwrap_err();
            assert!(matches!(err, NbtStatsError::InvalidArguments { .. }));
        }
    }

    mod key_path_splitting {
        #[test]
        fn dotted_path_splits_and_drops_empties() {
            let keys: Vec<&str> = "data.actualOpeners"
                .split('.')
                .filter(|key| !key.is_empty())
                .collect();
            assert_eq!(keys, vec!["data", "actualOpeners"]);
        }
    }
}
