//! fos-scan - one-shot feature scan of an HTML file
//!
//! Usage: fos-scan <file.html> [--config <monitor.toml>]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fos_cosmetic::{DomMonitor, MonitorConfig, MonitorUpdate};
use fos_dom::{Document, NodeId};
use fos_html::HtmlParser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Scan an HTML file and print the ids, classes and links it contains
#[derive(Debug, PartialEq, Eq, Parser)]
#[command(name = "fos-scan", version, about, long_about = None)]
struct Args {
    /// HTML file to scan
    input: PathBuf,

    /// Monitor configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// JSON report printed on stdout
#[derive(Debug, Default, Serialize)]
struct ScanReport {
    url: String,
    /// Tag names of every reported element, in emission order
    elements: Vec<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    hrefs: Vec<String>,
}

impl ScanReport {
    fn new(document: &Document, updates: Vec<MonitorUpdate<NodeId>>) -> Self {
        let mut report = ScanReport {
            url: document.url().to_string(),
            ..Default::default()
        };
        for update in updates {
            match update {
                MonitorUpdate::Elements { elements } => report.elements.extend(
                    elements
                        .into_iter()
                        .filter_map(|id| document.tree().tag_name(id))
                        .map(str::to_string),
                ),
                MonitorUpdate::Features { classes, hrefs, ids } => {
                    report.classes.extend(classes);
                    report.hrefs.extend(hrefs);
                    report.ids.extend(ids);
                }
            }
        }
        report
    }
}

fn scan(args: &Args) -> Result<ScanReport> {
    let config = match &args.config {
        Some(path) => MonitorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MonitorConfig::default(),
    };

    let document = HtmlParser::new()
        .parse_file(&args.input)
        .with_context(|| format!("parsing {}", args.input.display()))?;

    let mut updates = Vec::new();
    let mut monitor = DomMonitor::with_config(config, |update| updates.push(update));
    monitor.query_all(&document);
    tracing::info!(known = monitor.known().len(), "scan complete");
    drop(monitor);

    Ok(ScanReport::new(&document, updates))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let report = scan(&args)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
