use std::{
    env,
    ffi::OsString,
    fs,
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
    thread,
};

use anyhow::Context;
use crossbeam_channel::{unbounded, Sender};

use crate::{
    config::Config,
    resolve::Resolved,
    sink::{LogSink, Stream},
};

/// Environment variable to override the snakemake executable
pub const SNAKEMAKE_ENV_BIN: &str = "PEACLOCK_SNAKEMAKE";
pub const DEFAULT_SNAKEMAKE_BIN: &str = "snakemake";

/// Everything the engine needs for one run
pub struct Invocation<'a> {
    pub snakefile: &'a Path,
    pub config: &'a Config,
    pub workdir: &'a Path,
    pub threads: usize,
    pub dry_run: bool,
}

pub trait WorkflowEngine {
    /// Run the workflow, returning true if the engine reported success
    fn run(&self, inv: &Invocation, sink: &dyn LogSink) -> anyhow::Result<bool>;
}

pub struct Snakemake {
    executable: OsString,
}

impl Snakemake {
    pub fn new<S: Into<OsString>>(executable: S) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(env::var_os(SNAKEMAKE_ENV_BIN).unwrap_or_else(|| DEFAULT_SNAKEMAKE_BIN.into()))
    }

    /// Build the engine command line.  All steps are forced to re-run and
    /// directory locking is disabled.
    pub fn command(&self, inv: &Invocation, configfile: &Path, sink: &dyn LogSink) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.arg("--snakefile")
            .arg(inv.snakefile)
            .arg("--directory")
            .arg(inv.workdir)
            .arg("--cores")
            .arg(inv.threads.to_string())
            .arg("--configfile")
            .arg(configfile)
            .args(["--forceall", "--rerun-incomplete", "--nolock"]);
        if inv.dry_run {
            cmd.arg("--dryrun");
        }
        cmd.args(sink.engine_args());
        cmd
    }
}

/// Write the configuration as JSON to `<outdir>/<prefix>_config.json`
pub fn write_engine_config(cfg: &Config) -> anyhow::Result<PathBuf> {
    let outdir = cfg
        .outdir()?
        .ok_or_else(|| anyhow!("Output directory not set"))?;
    let prefix = cfg.output_prefix()?.unwrap_or("peaclock");
    let fname = outdir.join(format!("{}_config.json", prefix));
    let mut wrt = fs::File::create(&fname)
        .with_context(|| format!("Could not open output file {}", fname.display()))?;
    serde_json::to_writer_pretty(&mut wrt, cfg)
        .with_context(|| "Could not write out JSON config file")?;
    debug!("Wrote {} config entries to {}", cfg.len(), fname.display());
    Ok(fname)
}

fn forward_lines<R: Read>(rdr: R, stream: Stream, tx: Sender<(Stream, String)>) {
    let mut rdr = BufReader::new(rdr);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match rdr.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf).trim_end().to_string();
                if tx.send((stream, line)).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!("Error reading engine {:?}: {}", stream, e);
                break;
            }
        }
    }
}

/// Run with stdout and stderr captured, passing each line to the sink
fn run_captured(mut cmd: Command, sink: &dyn LogSink) -> anyhow::Result<ExitStatus> {
    let mut child = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Could not start {:?}", cmd.get_program()))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("Could not capture engine stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("Could not capture engine stderr"))?;

    thread::scope(|scope| {
        let (tx, rx) = unbounded();
        let tx1 = tx.clone();
        scope.spawn(move || forward_lines(stdout, Stream::Stdout, tx1));
        scope.spawn(move || forward_lines(stderr, Stream::Stderr, tx));
        while let Ok((stream, line)) = rx.recv() {
            sink.handle_line(stream, &line)
        }
    });
    child.wait().with_context(|| "Error waiting for workflow engine")
}

impl WorkflowEngine for Snakemake {
    fn run(&self, inv: &Invocation, sink: &dyn LogSink) -> anyhow::Result<bool> {
        let configfile = write_engine_config(inv.config)?;
        let mut cmd = self.command(inv, &configfile, sink);
        debug!("Running {:?}", cmd);
        let status = if sink.captures_output() {
            run_captured(cmd, sink)?
        } else {
            cmd.status()
                .with_context(|| format!("Could not start {:?}", cmd.get_program()))?
        };
        debug!("Workflow engine finished with {}", status);
        Ok(status.success())
    }
}

/// Hand the resolved configuration to the engine and translate the result
/// into a process exit code
pub fn invoke<E: WorkflowEngine + ?Sized>(engine: &E, resolved: &Resolved) -> i32 {
    let sink = resolved.sink();
    sink.show_config(resolved.config());
    debug!("Demultiplexing: {:?}", resolved.policy());
    let inv = Invocation {
        snakefile: resolved.snakefile(),
        config: resolved.config(),
        workdir: resolved.workdir().path(),
        threads: resolved.threads(),
        dry_run: resolved.dry_run(),
    };
    match engine.run(&inv, sink) {
        Ok(true) => 0,
        Ok(false) => {
            error!("Workflow engine reported failure");
            1
        }
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use super::*;
    use crate::{
        config::*,
        sink::{QuietSink, VerboseSink},
    };

    fn engine_config(dir: &Path) -> Config {
        let mut cfg = get_defaults();
        cfg.set_path(OUTDIR, dir);
        cfg.set(OUTPUT_PREFIX, "run1");
        cfg.set(THREADS, 4);
        cfg
    }

    #[test]
    fn config_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = engine_config(dir.path());
        let p = write_engine_config(&cfg).unwrap();
        assert_eq!(p, dir.path().join("run1_config.json"));
        let v: serde_json::Value = serde_json::from_reader(fs::File::open(&p).unwrap()).unwrap();
        assert_eq!(v["threads"], 4);
        assert_eq!(v["barcode_kit"], "native");
        assert!(v["species"].is_null());
        assert_eq!(v.as_object().unwrap().len(), cfg.len());
    }

    #[test]
    fn command_line() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = engine_config(dir.path());
        let inv = Invocation {
            snakefile: Path::new("/pkg/Snakefile"),
            config: &cfg,
            workdir: Path::new("/tmp/work"),
            threads: 4,
            dry_run: true,
        };
        let cmd = Snakemake::new("snakemake").command(&inv, Path::new("/out/c.json"), &VerboseSink);
        let args: Vec<_> = cmd.get_args().collect();
        let expected: Vec<&OsStr> = [
            "--snakefile",
            "/pkg/Snakefile",
            "--directory",
            "/tmp/work",
            "--cores",
            "4",
            "--configfile",
            "/out/c.json",
            "--forceall",
            "--rerun-incomplete",
            "--nolock",
            "--dryrun",
            "--printshellcmds",
        ]
        .iter()
        .map(OsStr::new)
        .collect();
        assert_eq!(args, expected);

        let inv = Invocation { dry_run: false, ..inv };
        let cmd = Snakemake::new("snakemake").command(&inv, Path::new("/out/c.json"), &QuietSink::new(None));
        let args: Vec<_> = cmd.get_args().collect();
        assert!(!args.contains(&OsStr::new("--dryrun")));
        assert_eq!(args.last(), Some(&OsStr::new("--quiet")));
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = engine_config(dir.path());
        let inv = Invocation {
            snakefile: Path::new("Snakefile"),
            config: &cfg,
            workdir: dir.path(),
            threads: 1,
            dry_run: false,
        };
        // Neither of these look at their arguments
        assert!(Snakemake::new("true").run(&inv, &QuietSink::new(None)).unwrap());
        assert!(!Snakemake::new("false").run(&inv, &QuietSink::new(None)).unwrap());
        assert!(Snakemake::new("true").run(&inv, &VerboseSink).unwrap());
        assert!(Snakemake::new(dir.path().join("no_such_engine"))
            .run(&inv, &QuietSink::new(None))
            .is_err());
    }
}
