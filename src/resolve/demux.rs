use std::{
    env,
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
};

use lazy_static::lazy_static;
use regex::Regex;

use super::input::BarcodeSample;
use crate::{
    config::*,
    context::RunContext,
    error::{ResolveError, Result},
};

pub const GUPPY_BARCODER: &str = "guppy_barcoder";
pub const BARCODE_KITS: [&str; 4] = ["native", "rapid", "pcr", "all"];

const READ_SUFFIXES: [&str; 4] = [".fastq", ".fq", ".fastq.gz", ".fq.gz"];

lazy_static! {
    // Guppy names demultiplexed output folders barcode01, barcode02, ...
    static ref RE_BARCODE_DIR: Regex = Regex::new(r"(?i)^barcode[0-9]+$").unwrap();
}

/// How the reads get split into samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemuxPolicy {
    /// Run guppy_barcoder on the read directory
    Demultiplex { guppy: PathBuf },
    /// Reads are already split into these barcode folders
    PreSplit { barcodes: Vec<String> },
}

fn is_read_file(name: &OsStr) -> bool {
    name.to_str()
        .map(|s| {
            let s = s.to_lowercase();
            READ_SUFFIXES.iter().any(|x| s.ends_with(x))
        })
        .unwrap_or(false)
}

fn has_read_files(dir: &Path) -> io::Result<bool> {
    for e in fs::read_dir(dir)? {
        let e = e?;
        if e.path().is_file() && is_read_file(&e.file_name()) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Names of the pre-split barcode folders in the read directory.
///
/// A folder counts if it is named `barcode<digits>` and holds at least one
/// FASTQ file.  `unclassified` and any other folders are ignored.
pub fn detect_barcode_folders(read_path: &Path) -> Result<Vec<String>> {
    let io_err = |e| ResolveError::io(format!("Could not read directory {}", read_path.display()), e);
    let mut v = Vec::new();
    for e in fs::read_dir(read_path).map_err(io_err)? {
        let e = e.map_err(io_err)?;
        let path = e.path();
        let Some(name) = e.file_name().to_str().map(|s| s.to_owned()) else {
            continue;
        };
        if path.is_dir() && RE_BARCODE_DIR.is_match(&name) {
            if has_read_files(&path).map_err(io_err)? {
                v.push(name)
            } else {
                debug!("Barcode folder {} has no reads", path.display())
            }
        }
    }
    v.sort();
    Ok(v)
}

#[cfg(unix)]
fn is_executable(p: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(p)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(p: &Path) -> bool {
    p.is_file()
}

/// First match for an executable on the search path
pub fn find_on_path(name: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
    search_path.and_then(|sp| {
        env::split_paths(sp)
            .filter(|d| !d.as_os_str().is_empty())
            .map(|d| d.join(name))
            .find(|p| is_executable(p))
    })
}

/// Explicit guppy_barcoder path if given, otherwise search PATH
pub fn find_guppy(explicit: Option<PathBuf>, ctx: &RunContext) -> Result<PathBuf> {
    match explicit {
        Some(p) => {
            let p = ctx.resolve(p);
            if p.is_file() {
                Ok(p)
            } else {
                Err(ResolveError::GuppyNotFound {
                    searched: format!("at {}", p.display()),
                })
            }
        }
        None => find_on_path(GUPPY_BARCODER, ctx.search_path().map(|s| s.as_os_str())).ok_or_else(
            || ResolveError::GuppyNotFound {
                searched: "on PATH (use --path-to-guppy)".to_string(),
            },
        ),
    }
}

/// The decision table: demultiplex flag against detected barcode folders
pub fn decide<F>(
    demultiplex: bool,
    barcodes: Vec<String>,
    read_path: &Path,
    guppy: F,
) -> Result<DemuxPolicy>
where
    F: FnOnce() -> Result<PathBuf>,
{
    match (demultiplex, barcodes.is_empty()) {
        (true, _) => guppy().map(|guppy| DemuxPolicy::Demultiplex { guppy }),
        (false, false) => Ok(DemuxPolicy::PreSplit { barcodes }),
        (false, true) => Err(ResolveError::AmbiguousInput(read_path.to_owned())),
    }
}

/// Choose the demultiplexing policy and record it in the configuration
pub fn select_policy(
    mut cfg: Config,
    ctx: &RunContext,
    samples: Option<&[BarcodeSample]>,
) -> Result<(Config, DemuxPolicy)> {
    let kit = cfg.barcode_kit()?.to_lowercase();
    if !BARCODE_KITS.contains(&kit.as_str()) {
        return Err(ResolveError::InvalidBarcodeKit(kit));
    }
    cfg.set(BARCODE_KIT, kit);

    let read_path = cfg.read_path()?.ok_or(ResolveError::MissingReadPath)?;
    let demultiplex = cfg.demultiplex()?;
    let barcodes = if demultiplex {
        Vec::new()
    } else {
        detect_barcode_folders(&read_path)?
    };

    let guppy = cfg.path_to_guppy()?;
    let policy = decide(demultiplex, barcodes, &read_path, || find_guppy(guppy, ctx))?;

    match &policy {
        DemuxPolicy::Demultiplex { guppy } => {
            info!("Reads will be demultiplexed using {}", guppy.display());
            cfg.set(RUN_DEMULTIPLEX, true);
            cfg.set_path(PATH_TO_GUPPY, guppy);
        }
        DemuxPolicy::PreSplit { barcodes } => {
            info!("Found {} demultiplexed barcode folders", barcodes.len());
            if let Some(samples) = samples {
                for s in samples
                    .iter()
                    .filter(|s| !barcodes.iter().any(|b| b.eq_ignore_ascii_case(&s.barcode)))
                {
                    warn!(
                        "No reads found for barcode {} (sample {})",
                        s.barcode, s.sample
                    )
                }
            }
            cfg.set(RUN_DEMULTIPLEX, false);
        }
    }
    Ok((cfg, policy))
}
