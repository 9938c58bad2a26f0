use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    feedreply_cli::cli::app::run().await
}
