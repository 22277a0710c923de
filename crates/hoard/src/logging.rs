//! Log output that shares the terminal with progress bars.

use std::io::{self, Write};

use anyhow::anyhow;
use indicatif::MultiProgress;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

const QUIET_DEPENDENCIES: &str = "hyper=warn,hyper_util=warn,h2=warn,rustls=warn,aws_config=warn,aws_smithy_runtime=warn";

/// Writes each log line to stderr, hiding the bars while it does.
#[derive(Clone)]
struct BarsWriter {
    bars: Option<MultiProgress>,
}

impl Write for BarsWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.bars {
            Some(bars) => bars.suspend(|| io::stderr().write(buf)),
            None => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> { io::stderr().flush() }
}

impl<'a> MakeWriter<'a> for BarsWriter {
    type Writer = BarsWriter;

    fn make_writer(&'a self) -> Self::Writer { self.clone() }
}

fn level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// `-v` takes precedence over `RUST_LOG`, which takes precedence over `info`.
fn filter(verbose: u8) -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(filter) if verbose == 0 => filter,
        _ => EnvFilter::new(format!("{},{QUIET_DEPENDENCIES}", level(verbose))),
    }
}

pub fn init(verbose: u8, bars: Option<MultiProgress>) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(BarsWriter { bars })
        .with_target(verbose > 1)
        .try_init()
        .map_err(|err| anyhow!("initialising logging: {err}"))
}
