use std::path::PathBuf;

use serde_yaml::Value;

use super::{defaults::DEFAULT_BARCODE_KIT, *};
use crate::error::{ResolveError, Result};

fn invalid(key: &str, expected: &'static str) -> ResolveError {
    ResolveError::InvalidValue {
        key: key.to_owned(),
        expected,
    }
}

impl Config {
    /// String value; missing keys and nulls are None
    pub fn str_value(&self, key: &str) -> Result<Option<&str>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(invalid(key, "a string")),
        }
    }

    pub fn path_value(&self, key: &str) -> Result<Option<PathBuf>> {
        self.str_value(key)
            .map_err(|_| invalid(key, "a path"))
            .map(|s| s.filter(|s| !s.is_empty()).map(PathBuf::from))
    }

    /// Boolean flag; missing keys and nulls are false
    pub fn bool_value(&self, key: &str) -> Result<bool> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(invalid(key, "true or false")),
        }
    }

    #[cfg(test)]
    pub fn usize_value(&self, key: &str) -> Result<Option<usize>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|x| usize::try_from(x).ok())
                .map(Some)
                .ok_or_else(|| invalid(key, "a non-negative integer")),
            Some(_) => Err(invalid(key, "a non-negative integer")),
        }
    }

    pub fn species(&self) -> Result<Option<&str>> {
        self.str_value(SPECIES)
    }

    pub fn reference_file(&self) -> Result<Option<PathBuf>> {
        self.path_value(REFERENCE_FILE)
    }

    #[cfg(test)]
    pub fn min_length(&self) -> Result<Option<usize>> {
        self.usize_value(MIN_LENGTH)
    }

    #[cfg(test)]
    pub fn max_length(&self) -> Result<Option<usize>> {
        self.usize_value(MAX_LENGTH)
    }

    pub fn read_path(&self) -> Result<Option<PathBuf>> {
        self.path_value(READ_PATH)
    }

    pub fn barcodes_csv(&self) -> Result<Option<PathBuf>> {
        self.path_value(BARCODES_CSV)
    }

    pub fn barcode_kit(&self) -> Result<&str> {
        self.str_value(BARCODE_KIT)
            .map(|s| s.unwrap_or(DEFAULT_BARCODE_KIT))
    }

    pub fn demultiplex(&self) -> Result<bool> {
        self.bool_value(DEMULTIPLEX)
    }

    pub fn path_to_guppy(&self) -> Result<Option<PathBuf>> {
        self.path_value(PATH_TO_GUPPY)
    }

    #[cfg(test)]
    pub fn run_demultiplex(&self) -> Result<bool> {
        self.bool_value(RUN_DEMULTIPLEX)
    }

    pub fn report(&self) -> Result<bool> {
        self.bool_value(REPORT)
    }

    pub fn output_prefix(&self) -> Result<Option<&str>> {
        self.str_value(OUTPUT_PREFIX)
            .map(|s| s.filter(|s| !s.is_empty()))
    }

    pub fn outdir(&self) -> Result<Option<PathBuf>> {
        self.path_value(OUTDIR)
    }

    pub fn tempdir(&self) -> Result<Option<PathBuf>> {
        self.path_value(TEMPDIR)
    }

    pub fn no_temp(&self) -> Result<bool> {
        self.bool_value(NO_TEMP)
    }

    pub fn dry_run(&self) -> Result<bool> {
        self.bool_value(DRY_RUN)
    }

    pub fn verbose(&self) -> Result<bool> {
        self.bool_value(VERBOSE)
    }
}
