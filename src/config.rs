use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::Value;

mod defaults;
mod file;
mod getters;

pub use defaults::get_defaults;
pub use file::{look_for_config, parse_yaml_file};

// Recognized configuration keys
pub const SPECIES: &str = "species";
pub const SPECIES_DATA: &str = "species_data";
pub const REFERENCE_FILE: &str = "reference_file";
pub const MIN_LENGTH: &str = "min_length";
pub const MAX_LENGTH: &str = "max_length";
pub const READ_PATH: &str = "read_path";
pub const BARCODES_CSV: &str = "barcodes_csv";
pub const BARCODE_KIT: &str = "barcode_kit";
pub const DEMULTIPLEX: &str = "demultiplex";
pub const PATH_TO_GUPPY: &str = "path_to_guppy";
pub const RUN_DEMULTIPLEX: &str = "run_demultiplex";
pub const REPORT: &str = "report";
pub const OUTPUT_PREFIX: &str = "output_prefix";
pub const OUTDIR: &str = "outdir";
pub const TEMPDIR: &str = "tempdir";
pub const NO_TEMP: &str = "no_temp";
pub const DRY_RUN: &str = "dry_run";
pub const THREADS: &str = "threads";
pub const VERBOSE: &str = "verbose";
pub const LOG_STRING: &str = "log_string";

/// Run configuration handed to the workflow engine.
///
/// Keys are kept in insertion order (defaults first, then any pass-through
/// keys from the config file).  Values are YAML scalars; typed access goes
/// through the getters, which report a type mismatch as an error rather
/// than silently falling back.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Config {
    map: IndexMap<String, Value>,
}

/// Config file keys are matched case-insensitively with '-' and '_' equivalent
pub fn normalize_key(k: &str) -> String {
    k.trim().to_lowercase().replace('-', "_")
}

/// Render a value the way it is shown to the user
pub fn display_value(v: &Value) -> String {
    match v {
        Value::Null => "None".to_string(),
        Value::Bool(b) => format!("{}", b),
        Value::Number(n) => format!("{}", n),
        Value::String(s) => s.clone(),
        v => serde_yaml::to_string(v)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| format!("{:?}", v)),
    }
}

impl Config {
    pub fn set<V: Into<Value>>(&mut self, key: &str, v: V) {
        self.map.insert(normalize_key(key), v.into());
    }

    pub fn set_path<P: AsRef<Path>>(&mut self, key: &str, p: P) {
        self.set(key, p.as_ref().to_string_lossy().into_owned())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Entries sorted by key
    pub fn sorted(&self) -> Vec<(&str, &Value)> {
        let mut v: Vec<_> = self.map.iter().map(|(k, v)| (k.as_str(), v)).collect();
        v.sort_unstable_by(|a, b| a.0.cmp(b.0));
        v
    }
}
