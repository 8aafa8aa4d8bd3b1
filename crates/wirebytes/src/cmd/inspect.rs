use tracing::{debug, warn};
use wirebytes_cursor::{der, ByteCursor, PrefixWidth};

use crate::cmd::{input, InspectArgs, InspectMode};
use crate::exit::{cursor_error, CliResult, SUCCESS};
use crate::output::{print_fields, FieldReport, OutputFormat};

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let data = input::resolve(&args.input)?;

    let (mode, fields) = match args.mode {
        InspectMode::Der => ("der", der_fields(&data, args.max_depth)?),
        InspectMode::Prefixed => ("prefixed", prefixed_fields(&data, args.width)?),
    };
    debug!(mode, input_len = data.len(), fields = fields.len(), "inspected input");

    print_fields(mode, data.len(), &fields, format);
    Ok(SUCCESS)
}

pub fn der_fields(data: &[u8], max_depth: usize) -> CliResult<Vec<FieldReport>> {
    let mut fields = Vec::new();
    walk_der(ByteCursor::new(data), 0, 0, max_depth, &mut fields)?;
    Ok(fields)
}

fn walk_der(
    mut cursor: ByteCursor<'_>,
    base: usize,
    depth: usize,
    max_depth: usize,
    out: &mut Vec<FieldReport>,
) -> CliResult<()> {
    let start = cursor.remaining_len();
    while !cursor.is_empty() {
        let offset = base + (start - cursor.remaining_len());
        let (tag, element, header_len) = cursor
            .read_any_asn1_element()
            .map_err(|err| cursor_error(&format!("invalid DER at offset {offset}"), err))?;
        let value = &element.as_bytes()[header_len..];

        out.push(FieldReport {
            depth,
            offset,
            tag: Some(tag),
            kind: der::tag_name(tag),
            header_len,
            len: value.len(),
            value: value.to_vec(),
        });

        if der::is_constructed(tag) {
            if depth + 1 >= max_depth {
                warn!(offset, depth, "not descending past max depth");
                continue;
            }
            walk_der(
                ByteCursor::new(value),
                offset + header_len,
                depth + 1,
                max_depth,
                out,
            )?;
        }
    }
    Ok(())
}

pub fn prefixed_fields(data: &[u8], width: usize) -> CliResult<Vec<FieldReport>> {
    let width = PrefixWidth::try_from(width).map_err(|err| cursor_error("--width", err))?;
    let mut cursor = ByteCursor::new(data);
    let mut fields = Vec::new();

    while !cursor.is_empty() {
        let offset = data.len() - cursor.remaining_len();
        let record = cursor
            .read_prefixed(width)
            .map_err(|err| cursor_error(&format!("invalid record at offset {offset}"), err))?;
        fields.push(FieldReport {
            depth: 0,
            offset,
            tag: None,
            kind: "record",
            header_len: width.bytes(),
            len: record.remaining_len(),
            value: record.as_bytes().to_vec(),
        });
    }
    Ok(fields)
}
