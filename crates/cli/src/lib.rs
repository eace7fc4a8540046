use anyhow::{bail, Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use report_tagger::{
    index_documents, report_local_failures, tag_reports, AlternateNames, ReportInput,
    ReportOutput, ReportPreface, Tag, Tagger, TaggerConfig, Vocabulary,
};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

mod flags;

use flags::OutputFormat;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "report-tagger")]
#[command(about = "Structural line tagger for flattened audit reports", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Tagger configuration (TOML); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every line with its tag
    Tag(ReportArgs),

    /// Print assembled records
    Records(ReportArgs),

    /// Print flat index documents, one JSON object per line
    Documents(DocumentsArgs),

    /// Tag every report in a directory in parallel
    Batch(BatchArgs),
}

#[derive(Args)]
struct VocabularyArgs {
    /// Alternate office names (YAML)
    #[arg(long)]
    aliases: Option<PathBuf>,
}

#[derive(Args)]
struct ReportArgs {
    /// Flattened report text, one paragraph per line
    report: PathBuf,

    #[command(flatten)]
    vocabulary: VocabularyArgs,

    /// Scraped report preface (JSON)
    #[arg(long)]
    preface: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Args)]
struct DocumentsArgs {
    #[command(flatten)]
    report: ReportArgs,

    /// Report id stamped on every document (default: preface id, then file stem)
    #[arg(long)]
    report_id: Option<String>,
}

#[derive(Args)]
struct BatchArgs {
    /// Directory holding `<name>.txt` reports and optional `<name>.json` prefaces
    dir: PathBuf,

    #[command(flatten)]
    vocabulary: VocabularyArgs,
}

#[derive(Serialize)]
struct TaggedLine<'a> {
    line: usize,
    tag: Tag,
    text: &'a str,
}

#[derive(Serialize)]
struct BatchLine<'a> {
    id: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    documents: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    untagged: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> BatchLine<'a> {
    fn ok(output: &'a ReportOutput) -> Self {
        Self {
            id: &output.id,
            status: "ok",
            records: Some(output.records.len()),
            documents: Some(output.documents.len()),
            untagged: Some(output.untagged),
            error: None,
        }
    }

    fn failed(id: &'a str, error: String) -> Self {
        Self {
            id,
            status: "error",
            records: None,
            documents: None,
            untagged: None,
            error: Some(error),
        }
    }
}

pub fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let tagger = Tagger::new(load_config(cli.config.as_deref())?)
        .context("Invalid tagger configuration")?;

    match cli.command {
        Commands::Tag(args) => run_tag(&tagger, &args)?,
        Commands::Records(args) => run_records(&tagger, &args)?,
        Commands::Documents(args) => run_documents(&tagger, &args)?,
        Commands::Batch(args) => run_batch(&tagger, &args)?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<TaggerConfig> {
    let Some(path) = path else {
        return Ok(TaggerConfig::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: TaggerConfig = toml::from_str(&source)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    log::debug!("Loaded tagger config from {}", path.display());
    Ok(config)
}

fn load_alternates(args: &VocabularyArgs) -> Result<AlternateNames> {
    match &args.aliases {
        Some(path) => AlternateNames::from_path(path)
            .with_context(|| format!("Failed to load alternate names {}", path.display())),
        None => Ok(AlternateNames::default()),
    }
}

fn load_preface(path: Option<&Path>) -> Result<ReportPreface> {
    match path {
        Some(path) => ReportPreface::from_path(path)
            .with_context(|| format!("Failed to load preface {}", path.display())),
        None => Ok(ReportPreface::default()),
    }
}

fn read_report(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read report {}", path.display()))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

struct LoadedReport {
    text: String,
    preface: ReportPreface,
    vocabulary: Vocabulary,
}

fn load_report(args: &ReportArgs) -> Result<LoadedReport> {
    let alternates = load_alternates(&args.vocabulary)?;
    let preface = load_preface(args.preface.as_deref())?;
    let text = read_report(&args.report)?;
    let vocabulary = Vocabulary::resolve(&alternates, &preface);
    Ok(LoadedReport {
        text,
        preface,
        vocabulary,
    })
}

fn run_tag(tagger: &Tagger, args: &ReportArgs) -> Result<()> {
    let loaded = load_report(args)?;
    let report = tagger
        .tag_text(&loaded.text, &loaded.vocabulary)
        .with_context(|| format!("Failed to tag {}", args.report.display()))?;

    let lines: Vec<TaggedLine<'_>> = report
        .lines
        .iter()
        .enumerate()
        .map(|(line, entry)| TaggedLine {
            line,
            tag: entry.tag(),
            text: entry.text(),
        })
        .collect();

    log::info!(
        "Tagged {} lines, {} untagged",
        report.lines.len(),
        report.untagged_count()
    );
    print_stdout(&args.format.render(&lines)?)
}

fn run_records(tagger: &Tagger, args: &ReportArgs) -> Result<()> {
    let loaded = load_report(args)?;
    let records = tagger
        .process_text(&loaded.text, &loaded.vocabulary)
        .with_context(|| format!("Failed to process {}", args.report.display()))?;
    print_stdout(&args.format.render(&records)?)
}

fn run_documents(tagger: &Tagger, args: &DocumentsArgs) -> Result<()> {
    let loaded = load_report(&args.report)?;
    let report_id = args
        .report_id
        .clone()
        .or_else(|| loaded.preface.id.clone())
        .unwrap_or_else(|| file_stem(&args.report.report));

    let records = tagger
        .process_text(&loaded.text, &loaded.vocabulary)
        .with_context(|| format!("Failed to process {}", args.report.report.display()))?;

    for document in index_documents(&report_id, &records) {
        print_stdout(&serde_json::to_string(&document)?)?;
    }
    Ok(())
}

/// `<name>.txt` reports directly inside `dir`, sorted by name
fn collect_reports(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut reports = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to scan {}", dir.display()))?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            reports.push(path.to_path_buf());
        }
    }
    Ok(reports)
}

fn run_batch(tagger: &Tagger, args: &BatchArgs) -> Result<()> {
    let alternates = load_alternates(&args.vocabulary)?;

    let mut inputs = Vec::new();
    for path in collect_reports(&args.dir)? {
        let preface_path = path.with_extension("json");
        let preface = load_preface(preface_path.is_file().then_some(preface_path.as_path()))?;
        inputs.push(ReportInput::new(read_report(&path)?, preface, &file_stem(&path)));
    }
    log::info!("Tagging {} reports from {}", inputs.len(), args.dir.display());

    let results = tag_reports(tagger, &alternates, &inputs);
    let mut failed = 0;
    for (input, result) in inputs.iter().zip(&results) {
        let line = match result {
            Ok(output) => BatchLine::ok(output),
            Err(err) => {
                failed += 1;
                BatchLine::failed(&input.id, err.to_string())
            }
        };
        print_stdout(&serde_json::to_string(&line)?)?;
    }

    if failed > 0 {
        bail!(
            "{failed} of {} reports failed ({} report-specific)",
            results.len(),
            report_local_failures(&results)
        );
    }
    Ok(())
}
