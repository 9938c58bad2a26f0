use anyhow::Result;
use clap::Args;
use feedreply_core_types::detect_platform;
use serde::Serialize;

use super::output::{print, HumanReadable, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct DetectArgs {
    /// Page address to classify
    pub url: String,
}

#[derive(Debug, Serialize)]
struct Detection {
    url: String,
    platform: &'static str,
    supported: bool,
}

impl HumanReadable for Detection {
    fn human(&self) -> String {
        if self.supported {
            format!("{} -> {}", self.url, self.platform)
        } else {
            format!("{} -> {} (no controls will be added)", self.url, self.platform)
        }
    }
}

pub fn cmd_detect(args: DetectArgs, format: OutputFormat) -> Result<()> {
    let platform = detect_platform(&args.url);
    print(
        format,
        &Detection {
            url: args.url,
            platform: platform.name(),
            supported: platform.is_known(),
        },
    )
}
