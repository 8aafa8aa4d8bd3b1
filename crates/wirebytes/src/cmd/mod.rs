use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod input;
pub mod inspect;
pub mod version;
pub mod wrap;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a DER tree or a run of length-prefixed records.
    Inspect(InspectArgs),
    /// Wrap a payload in a length prefix or DER element.
    Wrap(WrapArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Inspect(args) => inspect::run(args, format),
        Command::Wrap(args) => wrap::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where input bytes come from. Defaults to raw bytes on stdin.
#[derive(Args, Debug, Default)]
pub struct InputArgs {
    /// Hex-encoded input (whitespace and ':' separators allowed).
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub hex: Option<String>,
    /// Literal string input.
    #[arg(long, conflicts_with_all = ["hex", "file"])]
    pub data: Option<String>,
    /// Read input from file.
    #[arg(long, conflicts_with_all = ["hex", "data"])]
    pub file: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum InspectMode {
    /// DER tag-length-value elements, descending into constructed ones.
    #[default]
    Der,
    /// Consecutive records behind a fixed-width length prefix.
    Prefixed,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// How to interpret the input.
    #[arg(long, value_enum, default_value_t = InspectMode::Der)]
    pub mode: InspectMode,
    /// Prefix width in bytes for `--mode prefixed` (1-4).
    #[arg(long, default_value = "2")]
    pub width: usize,
    /// Maximum DER nesting depth to descend into.
    #[arg(long, default_value = "32")]
    pub max_depth: usize,
}

#[derive(Args, Debug)]
pub struct WrapArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Fixed big-endian length prefix width in bytes (1-4).
    #[arg(long, conflicts_with = "tag", required_unless_present = "tag")]
    pub width: Option<usize>,
    /// DER tag byte (e.g. 0x30 or 48).
    #[arg(long, value_parser = parse_tag)]
    pub tag: Option<u8>,
    /// Cap on the encoded output length in bytes.
    #[arg(long)]
    pub max_len: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn parse_tag(input: &str) -> Result<u8, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|err| format!("invalid tag {input:?}: {err}"))
}
