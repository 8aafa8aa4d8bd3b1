use std::fs;
use std::io::Read;

use crate::cmd::InputArgs;
use crate::exit::{io_error, CliError, CliResult, USAGE};

/// Collect input bytes from whichever source the arguments name.
pub fn resolve(args: &InputArgs) -> CliResult<Vec<u8>> {
    if let Some(text) = &args.hex {
        return decode_hex(text);
    }
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }

    let mut buf = Vec::new();
    std::io::stdin()
        .read_to_end(&mut buf)
        .map_err(|err| io_error("failed reading stdin", err))?;
    Ok(buf)
}

pub fn decode_hex(text: &str) -> CliResult<Vec<u8>> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    let cleaned = cleaned.strip_prefix("0x").unwrap_or(cleaned.as_str());
    hex::decode(cleaned)
        .map_err(|err| CliError::new(USAGE, format!("--hex is not valid hex: {err}")))
}
