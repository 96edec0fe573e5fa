use std::{
    ffi::OsString,
    io::{self, Write},
    path::PathBuf,
};

use colored::Colorize;
use log::Level;

use crate::{
    config::{display_value, Config, LOG_STRING},
    context::RunContext,
    error::{ResolveError, Result},
};

/// Which output stream of the engine a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Where the workflow engine's logging goes
pub trait LogSink {
    fn is_verbose(&self) -> bool;

    /// Handler invocation string recorded in the configuration
    fn log_string(&self) -> String;

    /// Extra arguments for the engine
    fn engine_args(&self) -> Vec<OsString>;

    /// Called once with the final configuration before the engine starts
    fn show_config(&self, cfg: &Config);

    /// If true the engine output is captured and passed to [`LogSink::handle_line`]
    fn captures_output(&self) -> bool;

    fn handle_line(&self, stream: Stream, line: &str);
}

// Engine bookkeeping lines only shown at debug level
const ENGINE_NOISE: [&str; 7] = [
    "building dag",
    "using shell",
    "provided cores",
    "rules claiming more threads",
    "select jobs to execute",
    "job stats",
    "job ",
];

/// Everything from the engine goes straight to the terminal
#[derive(Debug, Default)]
pub struct VerboseSink;

/// Engine output is intercepted and passed through our own log
#[derive(Debug, Default)]
pub struct QuietSink {
    handler: Option<PathBuf>,
}

/// Write the configuration sorted by key, keys in green
pub fn write_config<W: Write>(cfg: &Config, mut w: W) -> io::Result<()> {
    writeln!(w, "\n**** CONFIG ****")?;
    for (k, v) in cfg.sorted() {
        writeln!(w, "{} {}", k.green(), display_value(v))?;
    }
    Ok(())
}

impl LogSink for VerboseSink {
    fn is_verbose(&self) -> bool {
        true
    }

    fn log_string(&self) -> String {
        String::new()
    }

    fn engine_args(&self) -> Vec<OsString> {
        vec!["--printshellcmds".into()]
    }

    fn show_config(&self, cfg: &Config) {
        if let Err(e) = write_config(cfg, io::stdout().lock()) {
            warn!("Could not print configuration: {}", e)
        }
    }

    fn captures_output(&self) -> bool {
        false
    }

    fn handle_line(&self, _stream: Stream, line: &str) {
        println!("{}", line)
    }
}

impl QuietSink {
    pub fn new(handler: Option<PathBuf>) -> Self {
        Self { handler }
    }

    /// Level at which an engine output line is logged
    pub fn classify(line: &str) -> Level {
        let l = line.trim().to_lowercase();
        if l.contains("error") || l.contains("exception") {
            Level::Error
        } else if l.contains("warning") {
            Level::Warn
        } else if l.is_empty()
            || l.chars().all(|c| c == '-' || c.is_whitespace())
            || (ENGINE_NOISE.iter().any(|p| l.starts_with(p)) && !l.contains("steps"))
        {
            Level::Debug
        } else {
            Level::Info
        }
    }
}

impl LogSink for QuietSink {
    fn is_verbose(&self) -> bool {
        false
    }

    fn log_string(&self) -> String {
        match &self.handler {
            Some(h) => format!("--quiet --log-handler-script {} ", h.display()),
            None => "--quiet ".to_string(),
        }
    }

    fn engine_args(&self) -> Vec<OsString> {
        let mut v: Vec<OsString> = vec!["--quiet".into()];
        if let Some(h) = &self.handler {
            v.push("--log-handler-script".into());
            v.push(h.into());
        }
        v
    }

    fn show_config(&self, cfg: &Config) {
        for (k, v) in cfg.sorted() {
            debug!("config: {} = {}", k, display_value(v))
        }
    }

    fn captures_output(&self) -> bool {
        true
    }

    fn handle_line(&self, stream: Stream, line: &str) {
        let line = line.trim_end();
        if line.trim().is_empty() {
            return;
        }
        match Self::classify(line) {
            Level::Error => error!("{}", line),
            Level::Warn => warn!("{}", line),
            Level::Info => info!("{}", line),
            _ => debug!("[{:?}] {}", stream, line),
        }
    }
}

/// Pick verbose or quiet mode and record the log handler string
pub fn select_sink(mut cfg: Config, ctx: &RunContext) -> Result<(Config, Box<dyn LogSink>)> {
    let sink: Box<dyn LogSink> = if cfg.verbose()? {
        Box::new(VerboseSink)
    } else {
        let h = ctx.log_handler();
        let handler = if h.is_file() {
            let h = h.canonicalize().map_err(|e| {
                ResolveError::io(format!("Could not resolve {}", h.display()), e)
            })?;
            Some(h)
        } else {
            debug!("No log handler script at {}", h.display());
            None
        };
        Box::new(QuietSink::new(handler))
    };
    debug!("Verbose output: {}", sink.is_verbose());
    cfg.set(LOG_STRING, sink.log_string());
    Ok((cfg, sink))
}
