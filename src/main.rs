use anyhow::{bail, Context, Result};
use callboard::{ChartClick, FilterState, IngestConfig, RawUploadPayload, Session};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "callboard")]
#[command(about = "Summarise a hotel service-call spreadsheet")]
struct Args {
    /// Spreadsheet to ingest (xlsx, xls, ods or csv)
    file: PathBuf,

    /// Earliest accepted year (default from CALLBOARD_YEAR_FLOOR or 2024)
    #[arg(long)]
    year_floor: Option<i32>,

    /// Restrict to these service categories; repeat for several ("All" disables)
    #[arg(short, long = "category")]
    categories: Vec<String>,

    /// Category chart click: a label or a click-event JSON object
    #[arg(long)]
    category_click: Option<String>,

    /// Sub-category chart click: a label or a click-event JSON object
    #[arg(long)]
    sub_category_click: Option<String>,

    /// Print the full result as JSON instead of a text summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = IngestConfig::from_env();
    if let Some(floor) = args.year_floor {
        config.year_floor = floor;
    }

    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let filename = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.file.display().to_string());
    info!("Loaded {} ({} bytes)", filename, bytes.len());

    let mut session = Session::new(config);
    let upload = session.upload(Some(RawUploadPayload::from_bytes(filename, &bytes)));
    if !upload.accepted {
        bail!("{}", upload.status);
    }

    let category_click = args.category_click.as_deref().map(parse_click).transpose()?;
    let sub_category_click = args.sub_category_click.as_deref().map(parse_click).transpose()?;
    let categories = if args.categories.is_empty() {
        None
    } else {
        Some(args.categories)
    };
    let filter = FilterState::from_events(categories, category_click.as_ref(), sub_category_click.as_ref());
    let result = session.refresh(&filter);

    if args.json {
        let out = serde_json::json!({
            "upload": upload,
            "filter": filter,
            "kpis": result.kpi_labels(),
            "result": result,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let kpis = result.kpi_labels();
    println!("{}", upload.status);
    println!("{}", upload.date_range);
    println!();
    println!("Total calls:            {}", kpis.total_calls);
    println!("Service categories:     {}", kpis.service_categories);
    println!("Unique issues:          {}", kpis.sub_categories);
    println!("Average calls per day:  {}", kpis.avg_calls_per_day);

    println!("\nCalls over time:");
    for point in &result.calls_over_time {
        println!("  {}  {}", point.date.format("%Y-%m-%d"), point.count);
    }

    println!("\nService categories:");
    for entry in &result.category_breakdown {
        println!("  {:<30} {}", entry.label, entry.count);
    }

    println!("\nSub-service categories:");
    for entry in &result.sub_category_breakdown {
        println!("  {:<30} {}", entry.label, entry.count);
    }

    println!("\nResolutions:");
    if let Some(message) = result.no_data_message() {
        println!("  {}", message);
    }
    for resolution in &result.resolutions {
        println!("  - {}", resolution);
    }

    Ok(())
}

/// Accept either a bare label or a chart click event as JSON.
fn parse_click(raw: &str) -> Result<ChartClick> {
    if raw.trim_start().starts_with('{') {
        ChartClick::from_json(raw).context("Invalid click event JSON")
    } else {
        Ok(ChartClick::for_label(raw))
    }
}
