use anyhow::Context;
use clap::ArgMatches;

use super::LogLevel;

/// Initialize logging from command line arguments
pub fn init_log(m: &ArgMatches) -> anyhow::Result<()> {
    let level = m
        .get_one::<LogLevel>("loglevel")
        .copied()
        .expect("Missing default log level");
    let ts = m
        .get_one::<stderrlog::Timestamp>("timestamp")
        .copied()
        .unwrap_or(stderrlog::Timestamp::Off);

    stderrlog::new()
        .quiet(level.is_none())
        .verbosity(level.get_level())
        .timestamp(ts)
        .init()
        .with_context(|| "Could not initialize logging")
}
