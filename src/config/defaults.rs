use serde_yaml::Value;

use super::*;

pub const DEFAULT_BARCODE_KIT: &str = "native";
pub const DEFAULT_THREADS: usize = 1;

/// Baseline configuration: every recognized key with its built-in default
pub fn get_defaults() -> Config {
    let mut cfg = Config::default();

    // Species and reference data (filled in from the package data)
    cfg.set(SPECIES, Value::Null);
    cfg.set(SPECIES_DATA, Value::Null);
    cfg.set(REFERENCE_FILE, Value::Null);
    cfg.set(MIN_LENGTH, Value::Null);
    cfg.set(MAX_LENGTH, Value::Null);

    // Input
    cfg.set(READ_PATH, Value::Null);
    cfg.set(BARCODES_CSV, Value::Null);
    cfg.set(BARCODE_KIT, DEFAULT_BARCODE_KIT);

    // Demultiplexing
    cfg.set(DEMULTIPLEX, false);
    cfg.set(PATH_TO_GUPPY, Value::Null);
    cfg.set(RUN_DEMULTIPLEX, false);

    // Output
    cfg.set(REPORT, false);
    cfg.set(OUTPUT_PREFIX, Value::Null);
    cfg.set(OUTDIR, Value::Null);
    cfg.set(TEMPDIR, Value::Null);
    cfg.set(NO_TEMP, false);

    // Operation
    cfg.set(DRY_RUN, false);
    cfg.set(THREADS, DEFAULT_THREADS);
    cfg.set(VERBOSE, false);
    cfg.set(LOG_STRING, "");

    cfg
}
