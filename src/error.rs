//src/error.rs

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlexError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed BLAST hit on line {line}: {reason}")]
    MalformedHit { line: usize, reason: String },

    #[error("malformed table {path} on line {line}: {reason}")]
    MalformedTable {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("malformed taxonomy dump {path} on line {line}: {reason}")]
    MalformedTaxonomy {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("taxonomy cycle detected while walking the lineage of taxon {tax_id}")]
    TaxonomyCycle { tax_id: String },

    #[error("taxon {tax_id} has parent {parent}, which is missing from the nodes dump")]
    DanglingParent { tax_id: String, parent: String },

    #[error("lineage of taxon {tax_id} exceeds {depth} ancestors")]
    LineageTooDeep { tax_id: String, depth: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AlexError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AlexError::Io {
            path: path.into(),
            source,
        }
    }
}
