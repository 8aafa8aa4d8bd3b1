use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

const PREVIEW_BYTES: usize = 16;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Hex,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One parsed field, DER element or length-prefixed record.
#[derive(Debug, Clone, Serialize)]
pub struct FieldReport {
    pub depth: usize,
    pub offset: usize,
    /// DER tag, absent for fixed-width records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<u8>,
    pub kind: &'static str,
    pub header_len: usize,
    pub len: usize,
    #[serde(skip)]
    pub value: Vec<u8>,
}

#[derive(Serialize)]
struct InspectOutput<'a> {
    schema_id: &'a str,
    mode: &'a str,
    input_len: usize,
    fields: Vec<FieldJson<'a>>,
}

#[derive(Serialize)]
struct FieldJson<'a> {
    #[serde(flatten)]
    field: &'a FieldReport,
    value_hex: String,
}

pub fn print_fields(mode: &str, input_len: usize, fields: &[FieldReport], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = InspectOutput {
                schema_id: "https://schemas.3leaps.dev/wirebytes/cli/v1/inspect.schema.json",
                mode,
                input_len,
                fields: fields
                    .iter()
                    .map(|field| FieldJson {
                        field,
                        value_hex: hex::encode(&field.value),
                    })
                    .collect(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["OFFSET", "DEPTH", "TAG", "KIND", "LEN", "VALUE"]);
            for field in fields {
                table.add_row(vec![
                    field.offset.to_string(),
                    field.depth.to_string(),
                    field.tag.map(|t| format!("0x{t:02x}")).unwrap_or_default(),
                    field.kind.to_string(),
                    field.len.to_string(),
                    preview(&field.value),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for field in fields {
                let indent = "  ".repeat(field.depth);
                match field.tag {
                    Some(tag) => println!(
                        "{indent}{} (0x{tag:02x}) @{} len={} {}",
                        field.kind,
                        field.offset,
                        field.len,
                        preview(&field.value)
                    ),
                    None => println!(
                        "{indent}record @{} len={} {}",
                        field.offset,
                        field.len,
                        preview(&field.value)
                    ),
                }
            }
        }
        OutputFormat::Hex => {
            for field in fields.iter().filter(|f| f.depth == 0) {
                println!("{}", hex::encode(&field.value));
            }
        }
        OutputFormat::Raw => {
            for field in fields.iter().filter(|f| f.depth == 0) {
                print_raw(&field.value);
            }
        }
    }
}

#[derive(Serialize)]
struct WrapOutput<'a> {
    schema_id: &'a str,
    len: usize,
    hex: String,
}

pub fn print_encoded(data: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = WrapOutput {
                schema_id: "https://schemas.3leaps.dev/wirebytes/cli/v1/wrap.schema.json",
                len: data.len(),
                hex: hex::encode(data),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["LEN", "HEX"])
                .add_row(vec![data.len().to_string(), hex::encode(data)]);
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Hex => println!("{}", hex::encode(data)),
        OutputFormat::Raw => print_raw(data),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn preview(value: &[u8]) -> String {
    if value.len() <= PREVIEW_BYTES {
        return hex::encode(value);
    }
    format!("{}.. ({} bytes)", hex::encode(&value[..PREVIEW_BYTES]), value.len())
}
