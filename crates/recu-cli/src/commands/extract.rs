//! Extract command - read the financial fields of a single receipt.

use std::fmt::Display;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, ValueEnum};
use console::style;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use recu_core::models::config::OutputConfig;
use recu_core::{ReceiptFields, ReceiptParser, TotalAmountExtractor};

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input text file with one OCR line per line, or `-` for stdin
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: from the configuration)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Log scoring details and list the total candidates
    #[arg(long)]
    pub debug: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// Format given on the command line, else the configured default.
    pub fn resolve(flag: Option<Self>, output: &OutputConfig) -> anyhow::Result<Self> {
        match flag {
            Some(format) => Ok(format),
            None => Self::from_str(&output.format, true).map_err(|_| {
                anyhow::anyhow!("Unknown output format in configuration: {}", output.format)
            }),
        }
    }

    /// File extension for files written in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let format = OutputFormat::resolve(args.format, &config.output)?;

    let text = if args.input == "-" {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        text
    } else {
        let path = PathBuf::from(&args.input);
        if !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }
        info!("Processing file: {}", path.display());
        tokio::fs::read_to_string(&path).await?
    };

    let parser = ReceiptParser::from_config(&config.extraction)?.with_debug(args.debug);
    let fields = parser.parse_text(&text);

    if args.debug {
        let lines: Vec<&str> = text.lines().collect();
        let candidates = TotalAmountExtractor::from_config(&config.extraction).candidates(&lines);

        eprintln!("{}", style("Total candidates:").blue());
        for candidate in candidates.iter().take(10) {
            eprintln!(
                "  {:>10}  score {:>3}  line {:>3}  {}",
                candidate.value, candidate.score, candidate.line_index, candidate.context
            );
        }
    }

    let output = format_fields(&fields, format, config.output.pretty)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    if fields.needs_review() {
        eprintln!(
            "{} Receipt needs review (status: {})",
            style("!").yellow(),
            fields.status
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Render extracted fields, always ending with a newline.
pub fn format_fields(
    fields: &ReceiptFields,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(fields)? + "\n"),
        OutputFormat::Json => Ok(serde_json::to_string(fields)? + "\n"),
        OutputFormat::Csv => format_csv(fields),
        OutputFormat::Text => Ok(format_text(fields)),
    }
}

fn format_csv(fields: &ReceiptFields) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "merchant",
        "date",
        "amount",
        "vat",
        "net_amount",
        "currency",
        "category",
        "status",
    ])?;

    wtr.write_record([
        fields.merchant.clone().unwrap_or_default(),
        optional(fields.date),
        optional(fields.amount),
        optional(fields.vat),
        optional(fields.net_amount()),
        fields.currency.clone(),
        fields.category.to_string(),
        fields.status.to_string(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(fields: &ReceiptFields) -> String {
    let currency = fields.currency.as_str();
    let mut output = String::new();

    output.push_str(&format!("Merchant: {}\n", or_dash(fields.merchant.as_deref())));
    output.push_str(&format!("Date:     {}\n", or_dash(fields.date)));
    output.push('\n');

    output.push_str(&format!("Total:    {}\n", money(fields.amount, currency)));
    output.push_str(&format!("VAT:      {}\n", money(fields.vat, currency)));
    output.push_str(&format!("Net:      {}\n", money(fields.net_amount(), currency)));
    output.push('\n');

    output.push_str(&format!("Category: {}\n", fields.category));
    output.push_str(&format!("Status:   {}\n", fields.status));

    output
}

fn money<T: Display>(value: Option<T>, currency: &str) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{} {}", v, currency))
}

fn or_dash<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
