use clap::Subcommand;

use super::detect::DetectArgs;
use super::reply::ReplyArgs;
use super::scan::ScanArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Classify a page address
    Detect(DetectArgs),

    /// Scan a saved page and list the units that receive a control
    Scan(ScanArgs),

    /// Scan a saved page, activate one control and report the outcome
    Reply(ReplyArgs),
}
