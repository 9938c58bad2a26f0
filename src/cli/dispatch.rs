use anyhow::Result;
use feedreply_annotator::AnnotatorConfig;

use super::detect::cmd_detect;
use super::env::CliArgs;
use super::reply::cmd_reply;
use super::scan::cmd_scan;
use crate::cli::commands::Commands;

pub async fn dispatch(cli: &CliArgs, config: AnnotatorConfig) -> Result<()> {
    match cli.command.clone() {
        Commands::Detect(args) => cmd_detect(args, cli.output),
        Commands::Scan(args) => cmd_scan(args, config, cli.output).await,
        Commands::Reply(args) => cmd_reply(args, config, cli.output).await,
    }
}
