//! Sample label annotations
//!
//! An experiment directory may hold any number of files whose name contains
//! `annotation`. Each line maps an isobaric channel to a sample label:
//!
//! ```text
//! 126 control_1
//! 127N treated_1
//! ```

use crate::{Error, Result};
use fnv::FnvHashMap;
use std::path::Path;

/// Sample labels keyed by `"<experiment> <channel>"`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SampleLabels {
    inner: FnvHashMap<String, String>,
}

impl SampleLabels {
    pub fn key(experiment: &str, channel: &str) -> String {
        format!("{} {}", experiment, channel)
    }

    pub fn insert(&mut self, experiment: &str, channel: &str, label: &str) {
        self.inner
            .insert(Self::key(experiment, channel), label.to_string());
    }

    pub fn get(&self, experiment: &str, channel: &str) -> Option<&str> {
        self.inner
            .get(&Self::key(experiment, channel))
            .map(String::as_str)
    }

    pub fn extend(&mut self, other: SampleLabels) {
        self.inner.extend(other.inner);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Parse the contents of one annotation file. Lines with fewer than two
    /// fields are skipped with a warning.
    pub fn parse(experiment: &str, contents: &str) -> SampleLabels {
        let mut labels = SampleLabels::default();
        for (ix, line) in contents.lines().enumerate() {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some(channel), Some(label)) => labels.insert(experiment, channel, label),
                (None, _) => {}
                (Some(_), None) => {
                    log::warn!(
                        "{}: skipping annotation line {} without a label",
                        experiment,
                        ix + 1
                    )
                }
            }
        }
        labels
    }

    /// Collect the labels of every annotation file in `dir`
    pub fn load(dir: &Path, experiment: &str) -> Result<SampleLabels> {
        let entries = std::fs::read_dir(dir).map_err(|source| Error::Io {
            path: dir.into(),
            source,
        })?;

        let mut files = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains("annotation"))
            .map(|entry| entry.path())
            .collect::<Vec<_>>();
        files.sort();

        let mut labels = SampleLabels::default();
        for path in files {
            let bytes = std::fs::read(&path).map_err(|source| Error::Annotation {
                path: path.clone(),
                source,
            })?;
            // Labels are free text, and not always UTF-8
            let parsed = Self::parse(experiment, &String::from_utf8_lossy(&bytes));
            if parsed.is_empty() {
                log::warn!("the annotation file {} looks to be empty", path.display());
            }
            labels.extend(parsed);
        }
        Ok(labels)
    }
}
