//! Fatal errors raised while resolving the run configuration.
//!
//! None of these are retried: the first one ends the invocation with a
//! user-facing message and exit status -1.
use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Config file {} not found", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Could not parse config file {}: {reason}", .path.display())]
    ConfigParse { path: PathBuf, reason: String },

    #[error("Species {species:?} not found in package data. Available species: {available}")]
    UnknownSpecies { species: String, available: String },

    #[error("No species specified (use -s/--species). Available species: {available}")]
    MissingSpecies { available: String },

    #[error("Reference data for species {species} is not usable: {reason}")]
    SpeciesData { species: String, reason: String },

    #[error("No read path specified (use -i/--read-path)")]
    MissingReadPath,

    #[error("Read directory {} not found", .0.display())]
    ReadPathNotFound(PathBuf),

    #[error("Barcodes CSV {}: {reason}", .path.display())]
    BarcodeCsv { path: PathBuf, reason: String },

    #[error("guppy_barcoder not found {searched}")]
    GuppyNotFound { searched: String },

    #[error("No barcode subfolders with reads found in {} and --demultiplex not set. Either run with --demultiplex or provide demultiplexed reads", .0.display())]
    AmbiguousInput(PathBuf),

    #[error("Please specify an integer for variable `threads` (got {0:?})")]
    InvalidThreadCount(String),

    #[error("Invalid barcode kit {0:?}. Options: native, rapid, pcr, all")]
    InvalidBarcodeKit(String),

    #[error("Invalid value for config key `{key}`: expected {expected}")]
    InvalidValue { key: String, expected: &'static str },

    #[error("Workflow definition {} not found", .0.display())]
    WorkflowNotFound(PathBuf),

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl ResolveError {
    pub fn io<S: Into<String>>(context: S, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
