//! Parse command - extract fields from a single text file.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use nakl_core::{ExtractionRecord, FieldHint, WaybillExtractor};

use super::{build_parser, input, load_config};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input file: .txt, .md, .json or .html OCR output (`-` reads stdin)
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Attach debug information to the record
    #[arg(long)]
    debug: bool,

    /// JSON file with detector field hints
    #[arg(long)]
    hints: Option<PathBuf>,

    /// Show the coverage score after the output
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.debug {
        config.debug_mode = true;
    }
    let parser = build_parser(config)?;

    let text = read_input(&args.input)?;
    info!("Parsing {} ({} bytes)", args.input, text.len());

    let hints: Vec<FieldHint> = match &args.hints {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Vec::new(),
    };

    let record = parser.parse_with_hints(&text, &hints);
    let output = format_record(&record, args.format, args.pretty)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        println!(
            "{} Field coverage: {:.1}%{}",
            style("ℹ").blue(),
            record.confidence_score * 100.0,
            if parser.is_confident(&record) { "" } else { " (below threshold)" }
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn read_input(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    input::read_text(Path::new(source))
}

pub fn format_record(
    record: &ExtractionRecord,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Json => Ok(serde_json::to_string(record)?),
        OutputFormat::Csv => format_csv(std::slice::from_ref(record)),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

pub const CSV_HEADER: [&str; 15] = [
    "document_type",
    "number",
    "date",
    "supplier_name",
    "supplier_inn",
    "supplier_kpp",
    "buyer_name",
    "buyer_inn",
    "buyer_kpp",
    "shipper",
    "consignee",
    "total_without_vat",
    "vat",
    "total_with_vat",
    "confidence_score",
];

pub fn csv_row(record: &ExtractionRecord) -> Vec<String> {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let amounts = &record.amounts;

    vec![
        record.document_type.to_string(),
        text(&record.number),
        text(&record.date),
        text(&record.supplier.name),
        text(&record.supplier.inn),
        text(&record.supplier.kpp),
        text(&record.buyer.name),
        text(&record.buyer.inn),
        text(&record.buyer.kpp),
        text(&record.shipper),
        text(&record.consignee),
        amounts.total_without_vat.map(|a| a.to_string()).unwrap_or_default(),
        amounts.vat.map(|a| a.to_string()).unwrap_or_default(),
        amounts.total_with_vat.map(|a| a.to_string()).unwrap_or_default(),
        format!("{:.2}", record.confidence_score),
    ]
}

pub fn format_csv(records: &[ExtractionRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(CSV_HEADER)?;
    for record in records {
        wtr.write_record(csv_row(record))?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &ExtractionRecord) -> String {
    let dash = "—".to_string();
    let show = |v: &Option<String>| v.clone().unwrap_or_else(|| dash.clone());

    let mut output = String::new();

    if let Some(error) = &record.error {
        output.push_str(&format!("Error: {}\n", error));
    }

    output.push_str(&format!("Document: {}\n", record.document_type));
    output.push_str(&format!("Number: {}\n", show(&record.number)));
    output.push_str(&format!("Date: {}\n", show(&record.date)));
    output.push('\n');

    for (title, party) in [("Supplier", &record.supplier), ("Buyer", &record.buyer)] {
        output.push_str(&format!("{}:\n", title));
        output.push_str(&format!("  {}\n", show(&party.name)));
        if let Some(inn) = &party.inn {
            output.push_str(&format!("  ИНН: {}\n", inn));
        }
        if let Some(kpp) = &party.kpp {
            output.push_str(&format!("  КПП: {}\n", kpp));
        }
    }

    output.push_str(&format!("Shipper: {}\n", show(&record.shipper)));
    output.push_str(&format!("Consignee: {}\n", show(&record.consignee)));
    output.push('\n');

    let amounts = &record.amounts;
    for (title, value) in [
        ("Without VAT", amounts.total_without_vat),
        ("VAT", amounts.vat),
        ("With VAT", amounts.total_with_vat),
    ] {
        let value = value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| dash.clone());
        output.push_str(&format!("{}: {}\n", title, value));
    }

    output.push_str(&format!("Coverage: {:.2}\n", record.confidence_score));
    output
}
