use std::io;

use anyhow::Context;
use wtadat::{
    encode::{csv, json, EncodeFrame},
    DataSource,
};

use crate::{infer_encoding, output_from_args, Args, Encoding};

/// Encodes the query result or, in metadata mode, the headers of `source` to the
/// output selected by `args`.
pub fn encode_source(source: &DataSource, args: &Args) -> anyhow::Result<()> {
    let (encoding, should_compress, delimiter) = infer_encoding(args)?;
    let writer = output_from_args(args)?;
    let writer: Box<dyn io::Write> = if should_compress {
        Box::new(
            zstd::stream::Encoder::new(writer, 0)
                .context("Unable to create Zstd encoder")?
                .auto_finish(),
        )
    } else {
        writer
    };
    let encode_res = if args.should_output_metadata {
        json::Encoder::new(writer, args.should_pretty_print).encode_metadata(source)
    } else {
        let frame = args.query().execute(source)?;
        match encoding {
            Encoding::Csv => encode_frame(
                csv::Encoder::builder(writer)
                    .delimiter(delimiter)
                    .write_header(args.write_header)
                    .use_raw_codes(args.use_raw_codes)
                    .build(),
                &frame,
            ),
            Encoding::Json => encode_frame(
                json::Encoder::builder(writer)
                    .should_pretty_print(args.should_pretty_print)
                    .use_raw_codes(args.use_raw_codes)
                    .build(),
                &frame,
            ),
        }
    };
    match encode_res {
        // Handle broken pipe as a non-error.
        Err(wtadat::Error::Io { source, .. }) if source.kind() == io::ErrorKind::BrokenPipe => {
            Ok(())
        }
        res => Ok(res?),
    }
}

fn encode_frame(mut encoder: impl EncodeFrame, frame: &wtadat::Frame) -> wtadat::Result<()> {
    encoder.encode_frame(frame)?;
    encoder.flush()
}
