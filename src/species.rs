use std::{
    fs,
    io::{self, BufRead},
    path::{Path, PathBuf},
};

use bio::io::fasta;

use crate::error::{ResolveError, Result};

/// Reference sequences for a species, found in `<species dir>/reference.fasta`
pub const REFERENCE_FASTA: &str = "reference.fasta";

/// Slack added to the longest reference to allow for adapters and barcodes
pub const MAX_LENGTH_SLACK: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesData {
    name: String,
    dir: PathBuf,
}

impl SpeciesData {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn reference(&self) -> PathBuf {
        self.dir.join(REFERENCE_FASTA)
    }
}

/// Sorted list of species with a data directory under `root`
pub fn available_species(root: &Path) -> Vec<String> {
    let mut v: Vec<_> = match fs::read_dir(root) {
        Ok(rd) => rd
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(|s| s.to_owned()))
            .collect(),
        Err(e) => {
            warn!("Could not read species data directory {}: {}", root.display(), e);
            Vec::new()
        }
    };
    v.sort();
    v
}

/// Find the data directory for the requested species (case insensitive)
pub fn find_species(root: &Path, requested: Option<&str>) -> Result<SpeciesData> {
    let available = available_species(root);
    let list = || {
        if available.is_empty() {
            "none".to_string()
        } else {
            available.join(", ")
        }
    };

    let requested = requested
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ResolveError::MissingSpecies { available: list() })?;

    available
        .iter()
        .find(|s| s.eq_ignore_ascii_case(requested))
        .map(|name| SpeciesData {
            name: name.clone(),
            dir: root.join(name),
        })
        .ok_or_else(|| ResolveError::UnknownSpecies {
            species: requested.to_owned(),
            available: list(),
        })
}

/// Sequence lengths of the records in a FASTA file
pub fn record_lengths<B: BufRead>(rdr: fasta::Reader<B>) -> io::Result<Vec<usize>> {
    rdr.records().map(|r| r.map(|rec| rec.seq().len())).collect()
}

/// Read length filter bounds (min, max) derived from a species reference
pub fn read_length_filter(species: &str, path: &Path) -> Result<(usize, usize)> {
    let sp_err = |reason: String| ResolveError::SpeciesData {
        species: species.to_owned(),
        reason,
    };
    let rdr = fasta::Reader::from_file(path)
        .map_err(|e| sp_err(format!("could not open {}: {:#}", path.display(), e)))?;
    let lengths = record_lengths(rdr)
        .map_err(|e| sp_err(format!("error reading {}: {}", path.display(), e)))?;

    let mut it = lengths.iter().copied().filter(|l| *l > 0);
    let first = it
        .next()
        .ok_or_else(|| sp_err(format!("no sequences in {}", path.display())))?;
    let (min, max) = it.fold((first, first), |(a, b), l| (a.min(l), b.max(l)));
    debug!(
        "Reference lengths for {}: {} records, min {} max {}",
        species,
        lengths.len(),
        min,
        max
    );
    Ok((min, max + MAX_LENGTH_SLACK))
}
