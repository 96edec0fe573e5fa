//! Resolution of the run configuration.
//!
//! Each stage takes the configuration built so far and returns the updated
//! value, so precedence is decided purely by stage order: defaults, then the
//! config file, then the command line, then values derived from the
//! filesystem for whatever is still unset.  The first error ends the run.
use std::path::{Path, PathBuf};

mod demux;
mod input;
mod paths;
mod threads;

pub use demux::DemuxPolicy;
pub use paths::Workdir;

use crate::{
    cli::CliArgs,
    config::{get_defaults, look_for_config, parse_yaml_file, Config},
    context::RunContext,
    error::{ResolveError, Result},
    sink::{select_sink, LogSink},
};

/// Fully resolved run, ready to hand to the workflow engine
pub struct Resolved {
    config: Config,
    workdir: Workdir,
    threads: usize,
    dry_run: bool,
    snakefile: PathBuf,
    policy: DemuxPolicy,
    sink: Box<dyn LogSink>,
}

impl Resolved {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn workdir(&self) -> &Workdir {
        &self.workdir
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn snakefile(&self) -> &Path {
        &self.snakefile
    }

    pub fn policy(&self) -> &DemuxPolicy {
        &self.policy
    }

    pub fn sink(&self) -> &dyn LogSink {
        self.sink.as_ref()
    }
}

pub fn resolve(args: &CliArgs, ctx: &RunContext) -> Result<Resolved> {
    let cfg = get_defaults();

    // If a config file is found, add everything in it to the config
    let cfg = match look_for_config(args.configfile(), ctx.cwd())? {
        Some(p) => {
            info!("Reading config file {}", p.display());
            parse_yaml_file(&p, cfg)?
        }
        None => cfg,
    };

    let cfg = args.apply_to(cfg);

    // Species first so that an unknown species fails before anything is created
    let cfg = paths::get_package_data(cfg, ctx)?;
    let cfg = paths::get_read_length_filter(cfg)?;
    let cfg = paths::get_outdir(cfg, ctx)?;
    let (cfg, workdir) = paths::get_temp_dir(cfg, ctx)?;

    let cfg = input::look_for_basecalled_reads(cfg, ctx)?;
    let (cfg, samples) = input::look_for_barcodes_csv(cfg, ctx)?;
    let (cfg, policy) = demux::select_policy(cfg, ctx, samples.as_deref())?;

    let (cfg, threads) = threads::coerce_threads(cfg)?;
    let (config, sink) = select_sink(cfg, ctx)?;
    if config.report()? {
        info!("Age estimate report will be generated");
    }

    let snakefile = ctx.snakefile();
    if !snakefile.is_file() {
        return Err(ResolveError::WorkflowNotFound(snakefile));
    }

    Ok(Resolved {
        dry_run: config.dry_run()?,
        config,
        workdir,
        threads,
        snakefile,
        policy,
        sink,
    })
}
