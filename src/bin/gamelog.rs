//! Gamelog parser CLI
//!
//! A command-line interface for parsing, validating, and analyzing gamelogs.
//!
//! ## Commands
//!
//! - `info` - Display quick log metadata
//! - `parse` - Parse a log with output format options
//! - `validate` - Validate a log (exit codes for scripting)
//! - `streams` - Group combat into per-weapon damage streams
//! - `batch` - Process multiple logs from a directory
//!
//! Diagnostics go to stderr and are filtered with `RUST_LOG`.

use clap::{Parser, Subcommand, ValueEnum};
use gamelog_parser::timestamp::format_timestamp;
use gamelog_parser::{extract_streams, Category, DamageStream, Log, LogEntry, ParserError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Gamelog parser
#[derive(Parser)]
#[command(name = "gamelog")]
#[command(about = "Game client combat log parser", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display log information
    Info {
        /// Path to the gamelog
        file: PathBuf,
    },
    /// Parse a gamelog
    Parse {
        /// Path to the gamelog
        file: PathBuf,
        /// Output format: json, pretty
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
        /// Include all entries in output
        #[arg(long)]
        entries: bool,
        /// Include combat entries in output
        #[arg(long)]
        combat: bool,
        /// Show parsing statistics
        #[arg(long)]
        stats: bool,
    },
    /// Validate a gamelog
    Validate {
        /// Path to the gamelog
        file: PathBuf,
        /// Verbose error reporting
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show damage streams
    Streams {
        /// Path to the gamelog
        file: PathBuf,
        /// Output format: json, pretty
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
    /// Parse multiple gamelogs
    Batch {
        /// Directory containing gamelogs
        directory: PathBuf,
        /// Output directory for JSON files
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
        /// Generate summary report
        #[arg(long)]
        summary: bool,
        /// Continue on errors
        #[arg(long)]
        continue_on_error: bool,
    },
}

/// Output format options
#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

// ============================================================================
// Serializable Output Structures
// ============================================================================

#[derive(Serialize)]
struct ParseOutput {
    header: HeaderInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    entries: Option<Vec<LogEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    combat: Option<Vec<LogEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    statistics: Option<Statistics>,
}

#[derive(Serialize)]
struct HeaderInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    listener: Option<String>,
    start_time: String,
    dialect: String,
    total_entries: usize,
}

#[derive(Serialize, Default)]
struct Statistics {
    entries_by_category: BTreeMap<String, usize>,
    combat_entries: usize,
    hits: usize,
    misses: usize,
    damage_dealt: f64,
    damage_received: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_entry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_entry: Option<String>,
}

#[derive(Serialize)]
struct BatchSummary {
    total_files: usize,
    successful: usize,
    failed: usize,
    total_entries: usize,
    total_combat_entries: usize,
    dialect_distribution: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<BatchFailure>,
}

#[derive(Serialize)]
struct BatchFailure {
    file: String,
    error: String,
}

// ============================================================================
// Validation Result Structure
// ============================================================================

struct ValidationResult {
    header_valid: bool,
    entries_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn is_valid(&self) -> bool {
        self.header_valid && self.entries_valid
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&directives))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { file } => cmd_info(&file),
        Commands::Parse {
            file,
            output,
            entries,
            combat,
            stats,
        } => cmd_parse(&file, &output, entries, combat, stats),
        Commands::Validate { file, verbose } => cmd_validate(&file, verbose),
        Commands::Streams { file, output } => cmd_streams(&file, &output),
        Commands::Batch {
            directory,
            output,
            format,
            summary,
            continue_on_error,
        } => cmd_batch(&directory, output.as_deref(), &format, summary, continue_on_error),
    }
}

/// Builds the log filter from `RUST_LOG`-style directives, `warn` when empty.
fn env_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(directives)
}

fn load(file: &Path) -> Option<Log> {
    match Log::parse_file(file) {
        Ok(log) => Some(log),
        Err(e) => {
            eprintln!("Error: {e}");
            None
        }
    }
}

// ============================================================================
// Info Command Implementation
// ============================================================================

fn cmd_info(file: &Path) -> ExitCode {
    let Some(log) = load(file) else {
        return ExitCode::FAILURE;
    };

    println!("=== Gamelog Information ===\n");

    println!("File: {}", file.display());
    println!("  Listener: {}", log.listener().unwrap_or("(none)"));
    println!("  Session Started: {}", format_timestamp(&log.start_time()));
    println!("  Combat Dialect: {:?}", log.dialect());

    println!();

    println!("Entries: {}", log.num_entries());
    for (category, count) in log.category_counts() {
        println!("  {category}: {count}");
    }

    ExitCode::SUCCESS
}

// ============================================================================
// Parse Command Implementation
// ============================================================================

fn cmd_parse(
    file: &Path,
    output: &OutputFormat,
    include_entries: bool,
    include_combat: bool,
    include_stats: bool,
) -> ExitCode {
    let Some(log) = load(file) else {
        return ExitCode::FAILURE;
    };

    let output_data = build_output(&log, include_entries, include_combat, include_stats);

    match output {
        OutputFormat::Json => print_json(&output_data),
        OutputFormat::Pretty => print_pretty(&output_data),
    }

    ExitCode::SUCCESS
}

fn build_output(
    log: &Log,
    include_entries: bool,
    include_combat: bool,
    include_stats: bool,
) -> ParseOutput {
    let header = HeaderInfo {
        listener: log.listener().map(str::to_string),
        start_time: format_timestamp(&log.start_time()),
        dialect: format!("{:?}", log.dialect()),
        total_entries: log.num_entries(),
    };

    let entries = include_entries.then(|| log.entries().to_vec());
    let combat = include_combat.then(|| {
        log.entries()
            .iter()
            .filter(|e| e.is_combat())
            .cloned()
            .collect()
    });
    let statistics = include_stats.then(|| collect_statistics(log));

    ParseOutput {
        header,
        entries,
        combat,
        statistics,
    }
}

fn collect_statistics(log: &Log) -> Statistics {
    let mut stats = Statistics {
        entries_by_category: log
            .category_counts()
            .into_iter()
            .map(|(category, count)| (category.to_string(), count))
            .collect(),
        first_entry: log.entries().first().map(|e| format_timestamp(&e.timestamp())),
        last_entry: log.entries().last().map(|e| format_timestamp(&e.timestamp())),
        ..Statistics::default()
    };

    for hit in log.combat_entries() {
        stats.combat_entries += 1;
        if hit.is_miss() {
            stats.misses += 1;
        } else {
            stats.hits += 1;
        }
        if hit.is_outgoing() {
            stats.damage_dealt += hit.damage;
        } else {
            stats.damage_received += hit.damage;
        }
    }

    stats
}

fn print_json<T: Serialize>(output: &T) {
    match serde_json::to_string_pretty(output) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error serializing to JSON: {e}"),
    }
}

fn print_pretty(output: &ParseOutput) {
    let header = &output.header;
    println!("=== Header ===");
    if let Some(listener) = &header.listener {
        println!("Listener: {listener}");
    }
    println!("Session Started: {}", header.start_time);
    println!("Dialect: {}", header.dialect);
    println!("Entries: {}", header.total_entries);
    println!();

    if let Some(stats) = &output.statistics {
        println!("=== Statistics ===");
        for (category, count) in &stats.entries_by_category {
            println!("  {category}: {count}");
        }
        println!("Combat Entries: {}", stats.combat_entries);
        println!("  Hits: {}", stats.hits);
        println!("  Misses: {}", stats.misses);
        println!("Damage Dealt: {:.1}", stats.damage_dealt);
        println!("Damage Received: {:.1}", stats.damage_received);
        if let (Some(first), Some(last)) = (&stats.first_entry, &stats.last_entry) {
            println!("Span: {first} - {last}");
        }
        println!();
    }

    if let Some(combat) = &output.combat {
        println!("=== Combat ({}) ===", combat.len());
        print_entries(combat);
        println!();
    }

    if let Some(entries) = &output.entries {
        println!("=== Entries ({}) ===", entries.len());
        print_entries(entries);
    }
}

fn print_entries(entries: &[LogEntry]) {
    // Only show the first 50 entries in pretty mode
    let display_count = std::cmp::min(entries.len(), 50);
    for entry in &entries[..display_count] {
        let time = format_timestamp(&entry.timestamp());
        match entry.as_combat() {
            Some(hit) => println!(
                "  [{time}] {} -> {} ({}): {}",
                hit.attacker,
                hit.target,
                if hit.weapon.is_empty() { "-" } else { &hit.weapon },
                hit.damage
            ),
            None => println!("  [{time}] ({}) {}", entry.category(), entry.text()),
        }
    }
    if entries.len() > 50 {
        println!("  ... and {} more entries", entries.len() - 50);
    }
}

// ============================================================================
// Validate Command Implementation
// ============================================================================

fn cmd_validate(file: &Path, verbose: bool) -> ExitCode {
    let result = validate_log(file);

    if verbose {
        print_validation_details(&result, file);
    } else {
        print_validation_summary(&result, file);
    }

    if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn validate_log(file: &Path) -> ValidationResult {
    let mut result = ValidationResult {
        header_valid: false,
        entries_valid: false,
        errors: Vec::new(),
        warnings: Vec::new(),
    };

    let log = match Log::parse_file(file) {
        Ok(log) => log,
        Err(e) => {
            match failing_line(&e) {
                Some(line_number) => {
                    result.header_valid = true;
                    result.errors.push(format!(
                        "Entry parsing failed at line {line_number}: {}",
                        e.root()
                    ));
                }
                None if matches!(e.root(), ParserError::IoError(_)) => {
                    result.errors.push(format!("Failed to read file: {}", e.root()));
                }
                None => {
                    result.errors.push(format!("Header parsing failed: {}", e.root()));
                }
            }
            return result;
        }
    };

    result.header_valid = true;
    result.entries_valid = true;

    if log.listener().is_none() {
        result.warnings.push("No listener named in header".to_string());
    }
    if log.num_entries() == 0 {
        result.warnings.push("No entries found in log".to_string());
    }
    let combat = log.category_counts().get(&Category::Combat).copied().unwrap_or(0);
    if combat > 0 && !log.dialect().is_known() {
        result
            .warnings
            .push("Combat entries present but no dialect detected".to_string());
    }

    result
}

/// Returns the body line an error was raised on. Header and open failures
/// have none.
fn failing_line(err: &ParserError) -> Option<usize> {
    match err {
        ParserError::AtLine { line_number, .. } => Some(*line_number),
        ParserError::InFile { source, .. } => failing_line(source),
        _ => None,
    }
}

fn print_validation_summary(result: &ValidationResult, file: &Path) {
    let status = if result.is_valid() { "VALID" } else { "INVALID" };
    println!("{}: {status}", file.display());
}

fn print_validation_details(result: &ValidationResult, file: &Path) {
    println!("Validating: {}\n", file.display());

    println!("Checks:");
    println!("  Header parsing:    {}", status_icon(result.header_valid));
    println!("  Entry parsing:     {}", status_icon(result.entries_valid));

    if !result.errors.is_empty() {
        println!("\nErrors:");
        for error in &result.errors {
            println!("  - {error}");
        }
    }

    if !result.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &result.warnings {
            println!("  - {warning}");
        }
    }

    println!(
        "\nResult: {}",
        if result.is_valid() { "VALID" } else { "INVALID" }
    );
}

fn status_icon(valid: bool) -> &'static str {
    if valid {
        "[OK]"
    } else {
        "[FAIL]"
    }
}

// ============================================================================
// Streams Command Implementation
// ============================================================================

fn cmd_streams(file: &Path, output: &OutputFormat) -> ExitCode {
    let Some(log) = load(file) else {
        return ExitCode::FAILURE;
    };

    let streams = extract_streams(&log);
    match output {
        OutputFormat::Json => print_json(&streams),
        OutputFormat::Pretty => print_streams(&streams),
    }

    ExitCode::SUCCESS
}

fn print_streams(streams: &[DamageStream]) {
    println!("=== Damage Streams ({}) ===", streams.len());
    for stream in streams {
        let direction = if stream.is_outgoing() { "OUT" } else { "IN " };
        println!(
            "\n[{direction}] {} -> {} with {}",
            stream.attacker, stream.target, stream.weapon
        );
        println!("  Ticker: {}", stream.ticker);
        println!("  Ships: {}", stream.enemy_ships);
        println!("  Samples: {}", stream.damage.len());
        println!("  Total Damage: {:.1}", stream.total_damage);
        if let (Some(start), Some(end)) = (&stream.start_time, &stream.end_time) {
            println!(
                "  Span: {} - {}",
                format_timestamp(start),
                format_timestamp(end)
            );
        }
    }
}

// ============================================================================
// Batch Command Implementation
// ============================================================================

fn cmd_batch(
    directory: &Path,
    output_dir: Option<&Path>,
    format: &OutputFormat,
    summary: bool,
    continue_on_error: bool,
) -> ExitCode {
    let logs = find_logs(directory);

    if logs.is_empty() {
        eprintln!("No .txt files found in {}", directory.display());
        return ExitCode::FAILURE;
    }

    info!(count = logs.len(), "found gamelogs");

    if let Some(dir) = output_dir {
        if !dir.exists() {
            if let Err(e) = std::fs::create_dir_all(dir) {
                eprintln!("Failed to create output directory: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let mut results: Vec<(PathBuf, ParseOutput)> = Vec::new();
    let mut failures: Vec<BatchFailure> = Vec::new();

    for log in &logs {
        eprint!(
            "Processing {}... ",
            log.file_name().unwrap_or_default().to_string_lossy()
        );

        match process_log(log, output_dir, format) {
            Ok(output) => {
                eprintln!("OK");
                results.push((log.clone(), output));
            }
            Err(e) => {
                eprintln!("ERROR: {e}");
                failures.push(BatchFailure {
                    file: log.display().to_string(),
                    error: e,
                });
                if !continue_on_error {
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    eprintln!(
        "\nProcessed: {} success, {} errors",
        results.len(),
        failures.len()
    );

    if summary {
        generate_summary(&results, failures, output_dir);
    }

    ExitCode::SUCCESS
}

fn find_logs(directory: &Path) -> Vec<PathBuf> {
    let mut logs = Vec::new();

    if let Ok(entries) = std::fs::read_dir(directory) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "txt") {
                logs.push(path);
            }
        }
    }

    logs.sort();
    logs
}

fn process_log(
    path: &Path,
    output_dir: Option<&Path>,
    format: &OutputFormat,
) -> Result<ParseOutput, String> {
    let log = Log::parse_file(path).map_err(|e| e.to_string())?;

    let output = build_output(&log, false, false, true);

    if let Some(dir) = output_dir {
        let output_file = dir
            .join(path.file_stem().unwrap_or_default())
            .with_extension("json");

        // Batch output is always JSON; pretty only changes indentation.
        let content = match format {
            OutputFormat::Json => serde_json::to_string(&output),
            OutputFormat::Pretty => serde_json::to_string_pretty(&output),
        }
        .map_err(|e| e.to_string())?;

        std::fs::write(&output_file, content).map_err(|e| e.to_string())?;
    }

    Ok(output)
}

fn generate_summary(
    results: &[(PathBuf, ParseOutput)],
    failures: Vec<BatchFailure>,
    output_dir: Option<&Path>,
) {
    let mut dialect_distribution: BTreeMap<String, usize> = BTreeMap::new();
    for (_, output) in results {
        *dialect_distribution
            .entry(output.header.dialect.clone())
            .or_insert(0) += 1;
    }

    let summary = BatchSummary {
        total_files: results.len() + failures.len(),
        successful: results.len(),
        failed: failures.len(),
        total_entries: results.iter().map(|(_, o)| o.header.total_entries).sum(),
        total_combat_entries: results
            .iter()
            .filter_map(|(_, o)| o.statistics.as_ref())
            .map(|s| s.combat_entries)
            .sum(),
        dialect_distribution,
        failures,
    };

    println!("\n=== Batch Summary ===");
    println!("Files processed: {}", summary.total_files);
    println!("Successful: {}", summary.successful);
    println!("Failed: {}", summary.failed);
    println!("Total entries: {}", summary.total_entries);
    println!("Combat entries: {}", summary.total_combat_entries);

    println!("\nDialect distribution:");
    for (dialect, count) in &summary.dialect_distribution {
        println!("  {dialect}: {count}");
    }

    if !summary.failures.is_empty() {
        println!("\nFailures:");
        for failure in &summary.failures {
            println!("  {}: {}", failure.file, failure.error);
        }
    }

    if let Some(dir) = output_dir {
        let summary_file = dir.join("summary.json");
        if let Ok(json) = serde_json::to_string_pretty(&summary) {
            if std::fs::write(&summary_file, json).is_ok() {
                println!("\nSummary written to: {}", summary_file.display());
            }
        }
    }
}
