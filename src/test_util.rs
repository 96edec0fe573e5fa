use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use tempfile::TempDir;

use crate::context::RunContext;

/// Working directory plus an installed package data directory with a single
/// species (mouse, references of 300 and 350 bp)
pub struct Fixture {
    _root: TempDir,
    pub cwd: PathBuf,
    pub package: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let base = root.path().canonicalize().unwrap();
        let cwd = base.join("work");
        let package = base.join("package");
        let species = package.join("data").join("mouse");
        fs::create_dir_all(&cwd).unwrap();
        fs::create_dir_all(&species).unwrap();
        fs::write(package.join("Snakefile"), "rule all:\n    input: []\n").unwrap();
        fs::write(package.join("log_handler.py"), "def log_handler(msg):\n    pass\n").unwrap();
        fs::write(
            species.join("reference.fasta"),
            format!(">amp1\n{}\n{}\n>amp2\n{}\n", "A".repeat(150), "C".repeat(150), "G".repeat(350)),
        )
        .unwrap();
        Self {
            _root: root,
            cwd,
            package,
        }
    }

    pub fn ctx(&self) -> RunContext {
        RunContext::new(&self.cwd, &self.package)
            .with_date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
    }

    /// Write a file relative to the working directory
    pub fn write<P: AsRef<Path>>(&self, rel: P, contents: &str) -> PathBuf {
        let p = self.cwd.join(rel);
        if let Some(d) = p.parent() {
            fs::create_dir_all(d).unwrap();
        }
        fs::write(&p, contents).unwrap();
        p
    }

    /// Shell script with the execute bit set, relative to the working directory
    pub fn write_executable<P: AsRef<Path>>(&self, rel: P) -> PathBuf {
        let p = self.write(rel, "#!/bin/sh\n");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&p, fs::Permissions::from_mode(0o755)).unwrap();
        }
        p
    }

    /// Read directory with one FASTQ in each of the named subfolders
    pub fn add_reads(&self, name: &str, folders: &[&str]) -> PathBuf {
        let reads = self.cwd.join(name);
        fs::create_dir_all(&reads).unwrap();
        for f in folders {
            self.write(reads.join(f).join("reads_0.fastq"), "@r1\nACGT\n+\nIIII\n");
        }
        reads
    }
}
