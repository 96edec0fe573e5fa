use std::path::{Path, PathBuf};

use clap::ArgMatches;

use crate::config::*;

/// Options given explicitly on the command line.
///
/// Only values that were actually supplied are stored, so that the config
/// file and derived values are not masked by CLI defaults.
#[derive(Debug, Default, Clone)]
pub struct CliArgs {
    read_path: Option<PathBuf>,
    configfile: Option<PathBuf>,
    barcodes_csv: Option<PathBuf>,
    barcode_kit: Option<String>,
    demultiplex: bool,
    path_to_guppy: Option<PathBuf>,
    species: Option<String>,
    report: bool,
    output_prefix: Option<String>,
    outdir: Option<PathBuf>,
    tempdir: Option<PathBuf>,
    no_temp: bool,
    dry_run: bool,
    threads: Option<String>,
    verbose: bool,
}

impl CliArgs {
    pub fn from_matches(m: &ArgMatches) -> Self {
        let path = |id: &str| m.get_one::<PathBuf>(id).cloned();
        let string = |id: &str| m.get_one::<String>(id).cloned();

        Self {
            read_path: path("read_path"),
            configfile: path("configfile"),
            barcodes_csv: path("barcodes_csv"),
            barcode_kit: string("barcode_kit").map(|s| s.to_lowercase()),
            demultiplex: m.get_flag("demultiplex"),
            path_to_guppy: path("path_to_guppy"),
            species: string("species"),
            report: m.get_flag("report"),
            output_prefix: string("output_prefix"),
            outdir: path("outdir"),
            tempdir: path("tempdir"),
            no_temp: m.get_flag("no_temp"),
            dry_run: m.get_flag("dry_run"),
            threads: string("threads"),
            verbose: m.get_flag("verbose"),
        }
    }

    pub fn configfile(&self) -> Option<&Path> {
        self.configfile.as_deref()
    }

    /// Write the explicitly supplied values into the configuration.
    ///
    /// Flags only ever switch things on: an absent flag leaves whatever the
    /// config file said.
    pub fn apply_to(&self, mut cfg: Config) -> Config {
        let paths = [
            (READ_PATH, &self.read_path),
            (BARCODES_CSV, &self.barcodes_csv),
            (PATH_TO_GUPPY, &self.path_to_guppy),
            (OUTDIR, &self.outdir),
            (TEMPDIR, &self.tempdir),
        ];
        for (key, p) in paths {
            if let Some(p) = p {
                cfg.set_path(key, p)
            }
        }

        let strings = [
            (BARCODE_KIT, &self.barcode_kit),
            (SPECIES, &self.species),
            (OUTPUT_PREFIX, &self.output_prefix),
            (THREADS, &self.threads),
        ];
        for (key, s) in strings {
            if let Some(s) = s {
                cfg.set(key, s.as_str())
            }
        }

        let flags = [
            (DEMULTIPLEX, self.demultiplex),
            (REPORT, self.report),
            (NO_TEMP, self.no_temp),
            (DRY_RUN, self.dry_run),
            (VERBOSE, self.verbose),
        ];
        for (key, f) in flags {
            if f {
                cfg.set(key, true)
            }
        }
        cfg
    }
}
