use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Plain-text rendering for human output.
pub trait HumanReadable {
    fn human(&self) -> String;
}

pub fn print<T: Serialize + HumanReadable>(format: OutputFormat, value: &T) -> Result<()> {
    match format {
        OutputFormat::Human => println!("{}", value.human()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
