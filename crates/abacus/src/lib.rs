pub mod annotation;
pub mod combined;
pub mod decoy;
pub mod evidence;
pub mod fasta;
pub mod fdr;
pub mod identification;
pub mod merge;
pub mod tmt;

use std::path::{Path, PathBuf};

/// FDR threshold applied to the pooled identification result
pub const COMBINED_FDR: f64 = 0.01;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("cannot open annotation file {}: {source}", path.display())]
    Annotation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("experiments `{}` and `{}` share the name `{name}`", first.display(), second.display())]
    DuplicateExperiment {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("unsupported number of labels: {0}")]
    UnsupportedPlex(String),
}

pub type Result<T> = std::result::Result<T, Error>;

pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.into(),
        source,
    })
}

pub fn read_json<P, T>(path: P) -> Result<T>
where
    P: AsRef<Path>,
    T: for<'de> serde::Deserialize<'de>,
{
    let path = path.as_ref();
    let contents = read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|source| Error::Json {
        path: path.into(),
        source,
    })
}

/// Read a FASTA database from disk, keeping decoy records (flagged)
pub fn read_fasta<P: AsRef<Path>>(path: P, decoy_tag: &str) -> Result<fasta::Fasta> {
    let contents = read_to_string(path)?;
    Ok(fasta::Fasta::parse(&contents, decoy_tag))
}
