use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wtadat::DataSource;
use wtadat_cli::{encode::encode_source, Args};

const STDIN_SENTINEL: &str = "-";

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level())),
        )
        .with_writer(io::stderr)
        .init();
    let options = args.decode_options();
    let source = if args.input.as_os_str() == STDIN_SENTINEL {
        DataSource::from_reader(io::stdin().lock(), options)?
    } else {
        DataSource::read_file(&args.input, options)?
    };
    encode_source(&source, &args)
}
