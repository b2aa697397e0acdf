use std::{
    fs::File,
    io::{self, BufWriter},
    path::PathBuf,
};

use anyhow::{anyhow, Context};
use clap::{ArgAction, Parser, ValueEnum};
use time::{format_description::FormatItem, macros::format_description, UtcOffset};
use wtadat::{ClassCode, DecodeOptions, Query};

pub mod encode;

/// How the output of the `wtadat` command will be encoded.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputEncoding {
    /// `wtadat` will infer based on the extension of the specified output file
    Infer,
    Csv,
    Tsv,
    Json,
}

/// A text encoding supported by the `wtadat` command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    /// Comma-separated or, with a tab delimiter, tab-separated values.
    Csv,
    /// Newline-delimited JSON.
    Json,
}

const UTC_OFFSET_FORMAT: &[FormatItem<'static>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");

#[derive(Debug, Parser)]
#[clap(version, about)]
#[cfg_attr(test, derive(Default))]
pub struct Args {
    #[clap(
        help = "A WTA finance data file, optionally Zstd-compressed, to convert to another encoding. Pass '-' to read from standard input",
        value_name = "FILE"
    )]
    pub input: PathBuf,
    #[clap(
        short,
        long,
        help = "Saves the result to FILE. If no path is specified, the output will be written to standard output",
        value_name = "FILE"
    )]
    pub output: Option<PathBuf>,
    #[clap(
        short = 'J',
        long,
        action = ArgAction::SetTrue,
        default_value = "false",
        group = "output_encoding",
        help = "Output the result as NDJSON (newline-delimited JSON)"
    )]
    pub json: bool,
    #[clap(
        short = 'C',
        long,
        action = ArgAction::SetTrue,
        default_value = "false",
        group = "output_encoding",
        help = "Output the result as CSV"
    )]
    pub csv: bool,
    #[clap(
        short = 'T',
        long,
        action = ArgAction::SetTrue,
        default_value = "false",
        group = "output_encoding",
        help = "Output the result as tab-separated values (TSV)"
    )]
    pub tsv: bool,
    #[clap(short, long, action = ArgAction::SetTrue, default_value = "false", help = "Zstd compress the output")]
    pub zstd: bool,
    #[clap(
        short,
        long,
        action = ArgAction::SetTrue,
        default_value = "false",
        help = "Allow overwriting of existing files, such as the output file"
    )]
    pub force: bool,
    #[clap(
        short = 'm',
        long = "metadata",
        visible_alias = "header",
        action = ArgAction::SetTrue,
        default_value = "false",
        conflicts_with_all = ["csv", "tsv"],
        help = "Output the file header and class headers instead of the rows. Always encoded as JSON"
    )]
    pub should_output_metadata: bool,
    #[clap(
        short = 'p',
        long = "pretty",
        action = ArgAction::SetTrue,
        default_value = "false",
        conflicts_with_all = ["csv", "tsv"],
        help = "Make the JSON output easier to read with indentation"
    )]
    pub should_pretty_print: bool,
    #[clap(
        short = 'c',
        long = "class",
        value_name = "CLASS_CODE",
        help = "Only output rows of the class with this code, such as 1007 for daily quotes. Required when the file contains more than one class"
    )]
    pub class_code: Option<ClassCode>,
    #[clap(
        short = 's',
        long,
        value_name = "DATE",
        help = "Only output rows at or after DATE, in 'YYYY-MM-DD' or 'YYYY-MM-DD HH:MM:SS' form"
    )]
    pub start: Option<String>,
    #[clap(
        short = 'e',
        long,
        value_name = "DATE",
        help = "Only output rows at or before DATE, in 'YYYY-MM-DD' or 'YYYY-MM-DD HH:MM:SS' form"
    )]
    pub end: Option<String>,
    #[clap(
        long,
        value_name = "FIELD_CODES",
        value_delimiter = ',',
        help = "Only output these fields, in this order. A comma-separated list of field codes"
    )]
    pub fields: Vec<i64>,
    #[clap(
        long = "raw-codes",
        action = ArgAction::SetTrue,
        default_value = "false",
        help = "Label columns with their field codes instead of their display names"
    )]
    pub use_raw_codes: bool,
    #[clap(
        long = "omit-header",
        action = ArgAction::SetFalse,
        default_value = "true",
        conflicts_with_all = ["json", "should_output_metadata"],
        help = "Skip encoding the header. Only valid when encoding CSV or TSV."
    )]
    pub write_header: bool,
    #[clap(
        long = "utc-offset",
        value_name = "OFFSET",
        value_parser = parse_utc_offset,
        help = "Interpret timestamps and dates at this UTC offset, such as +08:00. Defaults to the local offset"
    )]
    pub utc_offset: Option<UtcOffset>,
    #[clap(
        short,
        long,
        action = ArgAction::Count,
        help = "Log more details to standard error. Pass twice for more"
    )]
    pub verbose: u8,
}

impl Args {
    /// Consolidates the several output flag booleans into a single enum.
    pub fn output_encoding(&self) -> OutputEncoding {
        if self.json || self.should_output_metadata {
            OutputEncoding::Json
        } else if self.csv {
            OutputEncoding::Csv
        } else if self.tsv {
            OutputEncoding::Tsv
        } else {
            OutputEncoding::Infer
        }
    }

    /// Builds the query described by the filter arguments.
    pub fn query(&self) -> Query {
        let mut query = Query::new();
        if let Some(start) = &self.start {
            query = query.start(start.as_str());
        }
        if let Some(end) = &self.end {
            query = query.end(end.as_str());
        }
        if let Some(class_code) = self.class_code {
            query = query.class_code(class_code);
        }
        if !self.fields.is_empty() {
            query = query.fields(self.fields.iter().copied());
        }
        query
    }

    /// Returns the decode options for the UTC offset argument, falling back to the
    /// local offset.
    pub fn decode_options(&self) -> DecodeOptions {
        match self.utc_offset {
            Some(utc_offset) => DecodeOptions::default().with_utc_offset(utc_offset),
            None => DecodeOptions::local().unwrap_or_else(|e| {
                tracing::warn!("{e}, falling back to UTC");
                DecodeOptions::default()
            }),
        }
    }

    /// Returns the log filter directive for the verbosity argument.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

fn parse_utc_offset(s: &str) -> anyhow::Result<UtcOffset> {
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Ok(UtcOffset::UTC);
    }
    UtcOffset::parse(s, UTC_OFFSET_FORMAT)
        .with_context(|| format!("'{s}' is not a UTC offset in '+HH:MM' form"))
}

/// Infer the [`Encoding`], whether to Zstd-compress, and delimiter (CSV/TSV) from
/// `args` if they aren't already explicitly set.
pub fn infer_encoding(args: &Args) -> anyhow::Result<(Encoding, bool, u8)> {
    match args.output_encoding() {
        OutputEncoding::Csv => Ok((Encoding::Csv, args.zstd, b',')),
        OutputEncoding::Tsv => Ok((Encoding::Csv, args.zstd, b'\t')),
        OutputEncoding::Json => Ok((Encoding::Json, args.zstd, 0)),
        OutputEncoding::Infer => {
            if let Some(output) = args.output.as_ref().map(|o| o.to_string_lossy()) {
                if output.ends_with(".csv.zst") {
                    Ok((Encoding::Csv, true, b','))
                } else if output.ends_with(".csv") {
                    Ok((Encoding::Csv, args.zstd, b','))
                } else if output.ends_with(".tsv.zst") || output.ends_with(".xls.zst") {
                    Ok((Encoding::Csv, true, b'\t'))
                } else if output.ends_with(".tsv") || output.ends_with(".xls") {
                    Ok((Encoding::Csv, args.zstd, b'\t'))
                } else if output.ends_with(".json.zst") {
                    Ok((Encoding::Json, true, 0))
                } else if output.ends_with(".json") {
                    Ok((Encoding::Json, args.zstd, 0))
                } else {
                    Err(anyhow!(
                        "Unable to infer output encoding from output path '{output}'",
                    ))
                }
            } else {
                Err(anyhow!(
                    "Unable to infer output encoding when no output was specified"
                ))
            }
        }
    }
}

/// Returns a writeable object where the `wtadat` output will be directed.
pub fn output_from_args(args: &Args) -> anyhow::Result<Box<dyn io::Write>> {
    if let Some(output) = &args.output {
        let output_file = open_output_file(output, args.force)?;
        Ok(Box::new(BufWriter::new(output_file)))
    } else {
        Ok(Box::new(io::stdout().lock()))
    }
}

fn open_output_file(path: &PathBuf, force: bool) -> anyhow::Result<File> {
    let mut options = File::options();
    options.write(true).truncate(true);
    if force {
        options.create(true);
    } else if path.exists() {
        return Err(anyhow!(
            "Output file exists. Pass --force flag to overwrite the existing file."
        ));
    } else {
        options.create_new(true);
    }
    options
        .open(path)
        .with_context(|| format!("Unable to open output file '{}'", path.display()))
}
