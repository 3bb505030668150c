use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{LevelFilter, warn};
use std::path::PathBuf;
use std::time::Duration;

use excel_html::display::{DEFAULT_TARGET, Selector, Sink};
use excel_html::fetch::{AsyncFetcher, DEFAULT_TIMEOUT_SECS, Fetcher, Source};
use excel_html::html;
use excel_html::json_export;
use excel_html::loader::{self, DATA_URL, DEFAULT_SHEET, Loaded};

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum Format {
    Html,
    Json,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Workbook URL or file path
    #[arg(env = "EXCEL_HTML_SOURCE", default_value = DATA_URL)]
    source: String,

    /// Name of the sheet to render
    #[arg(long, short = 's', default_value = DEFAULT_SHEET)]
    sheet: String,

    /// Fetch the workbook with the asynchronous loader
    #[arg(long = "async", short = 'a')]
    use_async: bool,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Host HTML page whose target element receives the table
    #[arg(long, short = 'p')]
    page: Option<PathBuf>,

    /// Id selector of the target element inside the page
    #[arg(long, short = 't', default_value = DEFAULT_TARGET)]
    target: String,

    /// Write the result to a file instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// With --format json, export every sheet keyed by sheet name
    #[arg(long)]
    all_sheets: bool,

    /// Print the sheet names of the workbook and exit
    #[arg(long)]
    list_sheets: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let source = Source::parse(&cli.source);
    let timeout = Duration::from_secs(cli.timeout);

    // Build the sink before fetching so a bad selector fails fast
    let sink = match &cli.page {
        Some(page) => Sink::Page {
            page: page.clone(),
            selector: Selector::parse(&cli.target)?,
            output: cli.output.clone(),
        },
        None => match &cli.output {
            Some(path) => Sink::File(path.clone()),
            None => Sink::Stdout,
        },
    };

    let loaded = if cli.use_async {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;

        runtime.block_on(async {
            let fetcher = AsyncFetcher::with_timeout(timeout)?;
            loader::async_load(&fetcher, &source, Some(&cli.sheet)).await
        })?
    } else {
        let fetcher = Fetcher::with_timeout(timeout)?;
        loader::sync_load(&fetcher, &source, Some(&cli.sheet))?
    };

    let Some(Loaded { workbook, sheet }) = loaded else {
        eprintln!("Excel-html error: no workbook received from {}", source);
        std::process::exit(1);
    };

    if cli.list_sheets {
        for name in workbook.sheet_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    if sheet.is_none() {
        warn!(
            "Sheet {:?} not found in {} (available: {})",
            cli.sheet,
            source,
            workbook.sheet_names().join(", ")
        );
    }

    let rendered = match cli.format {
        Format::Html => html::to_html_table(sheet.as_ref()),
        Format::Json if cli.all_sheets => {
            json_export::serialize_to_json(&json_export::workbook_to_json(&workbook))?
        }
        Format::Json => {
            let records = sheet
                .as_ref()
                .map(json_export::sheet_to_records)
                .unwrap_or_default();
            json_export::serialize_to_json(&records)?
        }
    };

    sink.write(&rendered)
}
