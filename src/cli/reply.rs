use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use feedreply_annotator::{Annotator, AnnotatorConfig, EngineEvent};
use feedreply_core_types::ControlState;
use feedreply_locator::{resolve_input, LocatorCatalog};
use feedreply_page_dom::{HostDocument, NodeId};
use feedreply_store::{FileStore, PreferenceStore};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio::time::timeout;
use tracing::debug;

use super::output::{print, HumanReadable, OutputFormat};
use super::page::{load_page, PageArgs};

#[derive(Args, Clone, Debug)]
pub struct ReplyArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Index of the annotated unit to reply to, as listed by `scan`
    #[arg(long, default_value_t = 0)]
    pub unit: usize,

    /// Preference store (JSON). Defaults to the user config directory.
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Give up waiting for the cycle after this many seconds
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,
}

#[derive(Debug, Default, Serialize)]
struct ReplyOutput {
    unit: u64,
    state: String,
    status: String,
    reply: Option<String>,
    method: Option<&'static str>,
    usage: Option<String>,
    input_text: Option<String>,
}

impl HumanReadable for ReplyOutput {
    fn human(&self) -> String {
        let mut out = format!("[{}] {}", self.state, self.status);
        if let Some(reply) = &self.reply {
            out.push_str(&format!("\nreply: {reply}"));
        }
        if let Some(method) = self.method {
            out.push_str(&format!("\nwritten via: {method}"));
        }
        if let Some(usage) = &self.usage {
            out.push_str(&format!("\nusage: {usage}"));
        }
        if let Some(text) = &self.input_text {
            out.push_str(&format!("\ninput now reads: {text}"));
        }
        out
    }
}

pub fn default_store_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir().context("Failed to get config directory")?;
    path.push("feedreply");
    path.push("store.json");
    Ok(path)
}

pub async fn cmd_reply(
    args: ReplyArgs,
    config: AnnotatorConfig,
    format: OutputFormat,
) -> Result<()> {
    let doc = load_page(&args.page).await?;
    let store_path = match args.store.clone() {
        Some(path) => path,
        None => default_store_path()?,
    };
    debug!(store = %store_path.display(), "using preference store");
    let store: Arc<dyn PreferenceStore> = Arc::new(FileStore::new(store_path));
    let catalog = LocatorCatalog::with_overrides(&config.locators)?;

    let engine = Annotator::new(doc.clone(), store, config)?;
    let report = engine.scan_now();
    let unit = *report.annotated.get(args.unit).with_context(|| {
        format!(
            "unit {} not found: the scan annotated {} unit(s)",
            args.unit,
            report.annotated.len()
        )
    })?;
    let controller = engine
        .controller_for(unit)
        .ok_or_else(|| anyhow!("no control attached to unit {unit}"))?;

    let mut events = engine.subscribe();
    if !controller.activate() {
        bail!("control for unit {unit} is busy");
    }
    let mut output = timeout(
        Duration::from_secs(args.timeout_secs),
        settle(&mut events, unit),
    )
    .await
    .context("Timed out waiting for the reply cycle")??;
    engine.shutdown();

    output.input_text = catalog
        .for_platform(engine.platform())
        .and_then(|set| resolve_input(&*doc, Some(unit), set))
        .map(|surface| doc.text_content(surface));

    for notice in doc.notices() {
        eprintln!("notice: {notice}");
    }
    print(format, &output)?;
    if output.state == ControlState::Error.name() {
        bail!("reply failed: {}", output.status);
    }
    Ok(())
}

/// Collects engine events for `unit` until its cycle reaches a final state.
async fn settle(events: &mut Receiver<EngineEvent>, unit: NodeId) -> Result<ReplyOutput> {
    let mut output = ReplyOutput {
        unit: unit.0,
        ..ReplyOutput::default()
    };
    loop {
        match events.recv().await {
            Ok(EngineEvent::Injected {
                unit: seen,
                reply,
                method,
                usage,
                ..
            }) if seen == unit => {
                output.reply = Some(reply);
                output.method = Some(method.name());
                output.usage = usage.map(|usage| usage.to_string());
            }
            Ok(EngineEvent::ControlState {
                unit: seen,
                state,
                status,
                ..
            }) if seen == unit => {
                if matches!(state, ControlState::Success | ControlState::Error) {
                    output.state = state.name().to_string();
                    output.status = status;
                    return Ok(output);
                }
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => debug!(skipped, "engine events lagged"),
            Err(RecvError::Closed) => bail!("engine stopped before the cycle finished"),
        }
    }
}
