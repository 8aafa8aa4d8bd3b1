use bytes::Bytes;
use tracing::debug;
use wirebytes_builder::{BuilderConfig, ByteBuilder};

use crate::cmd::{input, WrapArgs};
use crate::exit::{builder_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_encoded, OutputFormat};

/// How the payload is framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    Prefix(usize),
    Der(u8),
}

pub fn run(args: WrapArgs, format: OutputFormat) -> CliResult<i32> {
    let framing = match (args.width, args.tag) {
        (Some(width), None) => Framing::Prefix(width),
        (None, Some(tag)) => Framing::Der(tag),
        _ => return Err(CliError::new(USAGE, "exactly one of --width or --tag is required")),
    };
    let payload = input::resolve(&args.input)?;

    let config = BuilderConfig {
        initial_capacity: payload.len() + 8,
        max_len: args.max_len,
    };
    let encoded = wrap(&payload, framing, config)?;
    debug!(?framing, payload_len = payload.len(), len = encoded.len(), "wrapped payload");

    print_encoded(&encoded, format);
    Ok(SUCCESS)
}

pub fn wrap(payload: &[u8], framing: Framing, config: BuilderConfig) -> CliResult<Bytes> {
    let mut builder = ByteBuilder::with_config(config);
    let mut field = match framing {
        Framing::Prefix(width) => builder.begin_length_prefixed(width),
        Framing::Der(tag) => builder.begin_asn1(tag),
    }
    .map_err(|err| builder_error("cannot open field", err))?;

    field
        .add_bytes(payload)
        .map_err(|err| builder_error("cannot write payload", err))?;
    field
        .flush()
        .map_err(|err| builder_error("cannot close field", err))?;

    builder
        .finish()
        .map_err(|err| builder_error("cannot finish output", err))
}
