use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use feedreply_annotator::{Annotator, AnnotatorConfig};
use feedreply_locator::{ContentExtractor, LocatorCatalog};
use feedreply_store::MemoryStore;
use serde::Serialize;

use super::output::{print, HumanReadable, OutputFormat};
use super::page::{load_page, PageArgs};

#[derive(Args, Clone, Debug)]
pub struct ScanArgs {
    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Debug, Serialize)]
struct UnitSummary {
    index: usize,
    node: u64,
    text: String,
}

#[derive(Debug, Serialize)]
struct ScanOutput {
    platform: &'static str,
    in_scope: bool,
    candidates: usize,
    filtered: usize,
    units: Vec<UnitSummary>,
}

impl HumanReadable for ScanOutput {
    fn human(&self) -> String {
        if !self.in_scope {
            return format!("{}: nothing to annotate on this page", self.platform);
        }
        let mut out = format!(
            "{}: {} of {} candidate units annotated ({} filtered)",
            self.platform,
            self.units.len(),
            self.candidates,
            self.filtered
        );
        for unit in &self.units {
            out.push_str(&format!("\n  [{}] {}  {}", unit.index, unit.node, unit.text));
        }
        out
    }
}

pub async fn cmd_scan(args: ScanArgs, config: AnnotatorConfig, format: OutputFormat) -> Result<()> {
    let doc = load_page(&args.page).await?;
    let catalog = Arc::new(LocatorCatalog::with_overrides(&config.locators)?);
    let extractor = ContentExtractor::new(catalog);

    // Scanning never reads preferences.
    let engine = Annotator::new(doc.clone(), MemoryStore::new().shared(), config)?;
    let report = engine.scan_now();
    let platform = engine.platform();

    let units = report
        .annotated
        .iter()
        .enumerate()
        .map(|(index, unit)| UnitSummary {
            index,
            node: unit.0,
            text: extractor.extract(&*doc, Some(*unit), platform),
        })
        .collect();

    print(
        format,
        &ScanOutput {
            platform: platform.name(),
            in_scope: report.in_scope,
            candidates: report.candidates,
            filtered: report.filtered,
            units,
        },
    )
}
