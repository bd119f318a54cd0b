//! Parse command - extract transactions from a single statement.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use rust_decimal::Decimal;
use tracing::{debug, info};

use stmt_core::pdf::{PdfExtractor, PdfProcessor};
use stmt_core::statement::{ExtractionOutcome, ExtractionReport};
use stmt_core::tabular::{RowRejection, TabularLoader};
use stmt_core::{
    CanonicalTransaction, Diagnostic, FixedClock, RawLine, StatementExtractor, StatementParser,
    StmtConfig, Strategy,
};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Statement file (.pdf, .csv or .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print why lines or rows were dropped
    #[arg(long)]
    report: bool,

    /// Date used for years missing from statement dates (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text table
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Kind of statement input, by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Csv,
    Text,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "pdf" => Some(SourceKind::Pdf),
            "csv" => Some(SourceKind::Csv),
            "txt" | "text" => Some(SourceKind::Text),
            _ => None,
        }
    }
}

/// What happened to the input besides the transactions themselves.
#[derive(Debug)]
pub enum ParseDetails {
    Statement {
        report: ExtractionReport,
        strategy: Option<Strategy>,
        diagnostic: Option<Diagnostic>,
    },
    Tabular {
        dropped: Vec<RowRejection>,
    },
}

/// Transactions recovered from one file.
#[derive(Debug)]
pub struct ParsedStatement {
    pub transactions: Vec<CanonicalTransaction>,
    pub details: ParseDetails,
}

impl ParsedStatement {
    fn from_outcome(outcome: ExtractionOutcome) -> Self {
        let strategy = outcome.strategy();
        Self {
            transactions: outcome.transactions,
            details: ParseDetails::Statement {
                report: outcome.report,
                strategy,
                diagnostic: outcome.diagnostic,
            },
        }
    }

    pub fn strategy_label(&self) -> String {
        match &self.details {
            ParseDetails::Statement { strategy: Some(s), .. } => s.to_string(),
            ParseDetails::Statement { report, .. } if !report.resolved_by.is_empty() => {
                "per_page".to_string()
            }
            ParseDetails::Statement { .. } => "none".to_string(),
            ParseDetails::Tabular { .. } => "tabular".to_string(),
        }
    }
}

/// Read and extract one statement file.
pub fn parse_file(
    path: &Path,
    config: &StmtConfig,
    today: Option<NaiveDate>,
) -> anyhow::Result<ParsedStatement> {
    let kind = SourceKind::from_path(path).ok_or_else(|| {
        anyhow::anyhow!(
            "Unsupported file format: {} (expected .pdf, .csv or .txt)",
            path.display()
        )
    })?;

    info!("Processing file: {}", path.display());

    match kind {
        SourceKind::Pdf => {
            let data = fs::read(path)?;
            let extractor = PdfExtractor::from_bytes(&data)?;
            debug!("PDF has {} pages", extractor.page_count());

            let lines = extractor.extract_lines(&config.pdf)?;
            Ok(ParsedStatement::from_outcome(extract_lines(&lines, config, today)))
        }
        SourceKind::Csv => {
            let loader = TabularLoader::with_config(config.tabular.clone());
            let outcome = loader.load_csv(File::open(path)?)?;
            Ok(ParsedStatement {
                transactions: outcome.transactions,
                details: ParseDetails::Tabular {
                    dropped: outcome.dropped,
                },
            })
        }
        SourceKind::Text => {
            let text = fs::read_to_string(path)?;
            let pages: Vec<&str> = text.split('\x0c').collect();
            let lines = RawLine::from_pages(&pages);
            Ok(ParsedStatement::from_outcome(extract_lines(&lines, config, today)))
        }
    }
}

fn extract_lines(
    lines: &[RawLine],
    config: &StmtConfig,
    today: Option<NaiveDate>,
) -> ExtractionOutcome {
    match today {
        Some(date) => StatementParser::with_clock(&config.extraction, FixedClock(date)).extract_lines(lines),
        None => StatementParser::with_config(&config.extraction).extract_lines(lines),
    }
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let parsed = parse_file(&args.input, &config, args.today)?;
    let output = format_transactions(&parsed.transactions, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    eprintln!(
        "{} {} transactions found",
        style("ℹ").blue(),
        parsed.transactions.len()
    );
    if parsed.transactions.is_empty() {
        print_guidance(&parsed);
    }

    if args.report {
        eprint!("{}", format_report(&parsed));
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn print_guidance(parsed: &ParsedStatement) {
    if let ParseDetails::Statement {
        diagnostic: Some(diagnostic),
        ..
    } = &parsed.details
    {
        eprintln!("{} {}", style("!").yellow(), diagnostic.message());
    }
    eprintln!("  Supported inputs:");
    eprintln!("  - PDF statements with a text layer");
    eprintln!("  - CSV files with date, amount and description columns (type optional)");
    eprintln!("  - Plain text, one transaction per line or date line followed by details");
}

/// Human-readable account of dropped lines or rows.
pub fn format_report(parsed: &ParsedStatement) -> String {
    let mut out = String::new();

    match &parsed.details {
        ParseDetails::Statement { report, .. } => {
            out.push_str("Strategies:\n");
            for attempt in &report.attempts {
                let page = attempt
                    .page
                    .map(|p| format!(" (page {})", p))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "  {}{}: {} accepted, {} rejected\n",
                    attempt.strategy,
                    page,
                    attempt.accepted,
                    attempt.rejected()
                ));
            }
            out.push_str(&format!("Accepted lines: {}\n", report.total_accepted()));

            let counts = report.rejection_counts();
            if !counts.is_empty() {
                out.push_str("Rejections:\n");
                for (reason, count) in counts {
                    out.push_str(&format!("  {:<24}{}\n", reason, count));
                }
            }
            if report.inferred_years > 0 {
                out.push_str(&format!("Dates missing a year: {}\n", report.inferred_years));
            }
            if report.date_fallbacks > 0 {
                out.push_str(&format!(
                    "Unparseable dates replaced by today: {}\n",
                    report.date_fallbacks
                ));
            }
        }
        ParseDetails::Tabular { dropped } => {
            out.push_str(&format!("Dropped rows: {}\n", dropped.len()));
            for rejection in dropped {
                out.push_str(&format!("  row {}: {:?}\n", rejection.row, rejection.problem));
            }
        }
    }

    out
}

pub fn format_transactions(
    transactions: &[CanonicalTransaction],
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(transactions)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Csv => format_csv(transactions),
        OutputFormat::Text => Ok(format_text(transactions)),
    }
}

fn format_csv(transactions: &[CanonicalTransaction]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["id", "date", "amount", "description", "type"])?;
    for tx in transactions {
        wtr.write_record([
            &tx.id.to_string(),
            &tx.date.to_string(),
            &tx.amount.to_string(),
            &tx.description,
            tx.transaction_type.as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(transactions: &[CanonicalTransaction]) -> String {
    let mut output = String::new();

    for tx in transactions {
        output.push_str(&format!(
            "{:>4}  {}  {:>12}  {:<6}  {}\n",
            tx.id,
            tx.date,
            tx.amount.to_string(),
            tx.transaction_type.as_str(),
            tx.description
        ));
    }

    let (debits, credits): (Vec<&CanonicalTransaction>, Vec<&CanonicalTransaction>) =
        transactions.iter().partition(|t| t.is_debit());
    output.push('\n');
    output.push_str(&format!("Debits:  {:>4}  {:>12}\n", debits.len(), total(&debits).to_string()));
    output.push_str(&format!("Credits: {:>4}  {:>12}\n", credits.len(), total(&credits).to_string()));

    output
}

fn total(transactions: &[&CanonicalTransaction]) -> Decimal {
    transactions.iter().map(|t| t.amount).sum()
}
