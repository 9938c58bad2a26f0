use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use feedreply_page_dom::MemoryDocument;
use tokio::fs;

/// Where a saved page came from and how it was displayed.
#[derive(Args, Clone, Debug)]
pub struct PageArgs {
    /// Address the snapshot was taken at
    #[arg(long)]
    pub url: String,

    /// Saved HTML of the page
    #[arg(long, value_name = "FILE")]
    pub html: PathBuf,

    /// Viewport height in pixels, for the detail-view check
    #[arg(long)]
    pub viewport_height: Option<f64>,
}

pub async fn load_page(args: &PageArgs) -> Result<Arc<MemoryDocument>> {
    let html = read_html(&args.html).await?;
    let doc = MemoryDocument::from_html(&args.url, &html);
    if let Some(height) = args.viewport_height {
        doc.set_viewport_height(height);
    }
    Ok(Arc::new(doc))
}

async fn read_html(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}
