use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{Local, NaiveDate};

/// Environment variable giving the location of the package data
pub const DATA_DIR_ENV: &str = "PEACLOCK_DATA_DIR";

pub const SNAKEFILE: &str = "Snakefile";
pub const LOG_HANDLER: &str = "log_handler.py";
pub const SPECIES_DIR: &str = "data";

/// Per-invocation values that are not part of the configuration
#[derive(Debug, Clone)]
pub struct RunContext {
    cwd: PathBuf,
    // Directory with the Snakefile, log handler and species data
    package_dir: PathBuf,
    // Executable search path (contents of $PATH)
    search_path: Option<OsString>,
    date: NaiveDate,
}

impl RunContext {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(cwd: P, package_dir: Q) -> Self {
        Self {
            cwd: cwd.as_ref().to_owned(),
            package_dir: package_dir.as_ref().to_owned(),
            search_path: None,
            date: Local::now().date_naive(),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let cwd = env::current_dir().with_context(|| "Could not get current directory")?;
        let package_dir = match env::var_os(DATA_DIR_ENV) {
            Some(d) => PathBuf::from(d),
            None => default_package_dir()?,
        };
        debug!("Package data directory: {}", package_dir.display());
        Ok(Self::new(cwd, package_dir).with_search_path(env::var_os("PATH")))
    }

    pub fn with_search_path(mut self, path: Option<OsString>) -> Self {
        self.search_path = path;
        self
    }

    #[cfg(test)]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn search_path(&self) -> Option<&OsString> {
        self.search_path.as_ref()
    }

    /// Date in the form used for default output directory names
    pub fn date_stamp(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Relative paths are taken relative to the working directory
    pub fn resolve<P: AsRef<Path>>(&self, p: P) -> PathBuf {
        self.cwd.join(p)
    }

    pub fn snakefile(&self) -> PathBuf {
        self.package_dir.join(SNAKEFILE)
    }

    pub fn log_handler(&self) -> PathBuf {
        self.package_dir.join(LOG_HANDLER)
    }

    pub fn species_root(&self) -> PathBuf {
        self.package_dir.join(SPECIES_DIR)
    }
}

// <prefix>/bin/peaclock -> <prefix>/share/peaclock
fn default_package_dir() -> anyhow::Result<PathBuf> {
    let exe = env::current_exe().with_context(|| "Could not determine executable path")?;
    exe.parent()
        .and_then(|p| p.parent())
        .map(|p| p.join("share").join("peaclock"))
        .ok_or_else(|| {
            anyhow!(
                "Could not locate package data from executable path {}; set {}",
                exe.display(),
                DATA_DIR_ENV
            )
        })
}
