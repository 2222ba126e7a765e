//! Per-experiment evidence
//!
//! Each experiment directory holds the evidence computed when that
//! experiment was processed on its own (`evidence.json`), plus optional
//! sample label annotations.

use crate::annotation::SampleLabels;
use crate::decoy;
use crate::tmt::Labels;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub const EVIDENCE_FILE: &str = "evidence.json";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProteinEvidence {
    pub original_header: String,
    pub part_header: String,
    pub protein_id: String,

    pub total_spc: u32,
    pub unique_spc: u32,
    pub razor_spc: u32,

    pub total_intensity: f64,
    pub unique_intensity: f64,
    pub razor_intensity: f64,

    pub total_labels: Option<Labels>,
    pub unique_labels: Option<Labels>,
    pub razor_labels: Option<Labels>,

    pub total_peptides: BTreeSet<String>,
    pub unique_peptides: BTreeSet<String>,
    pub razor_peptides: BTreeSet<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModificationKind {
    /// Modification assigned to a residue or terminus
    Assigned,
    /// Unexplained mass shift
    Observed,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Modification {
    pub mass_diff: f64,
    pub kind: ModificationKind,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeptideEvidence {
    pub sequence: String,
    pub protein: String,
    pub protein_id: String,
    pub protein_description: String,
    pub gene_name: String,
    pub spc: u32,
    pub intensity: f64,
    pub probability: f64,
    pub charge_states: BTreeSet<u8>,
    pub modifications: Vec<Modification>,
}

impl PeptideEvidence {
    /// Masses of the assigned modifications, formatted with 6 decimals
    pub fn assigned_mass_shifts(&self) -> impl Iterator<Item = String> + '_ {
        self.modifications
            .iter()
            .filter(|m| m.kind == ModificationKind::Assigned)
            .map(|m| format!("{:.6}", m.mass_diff))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IonEvidence {
    pub sequence: String,
    pub charge: u8,
    pub spc: u32,
    pub intensity: f64,
    pub probability: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Evidence {
    pub proteins: Vec<ProteinEvidence>,
    pub peptides: Vec<PeptideEvidence>,
    pub ions: Vec<IonEvidence>,
}

impl Evidence {
    /// Restore the evidence stored in an experiment directory
    pub fn restore(dir: &Path) -> Result<Evidence> {
        let path = dir.join(EVIDENCE_FILE);
        if !path.exists() {
            return Err(Error::MissingInput(format!(
                "cannot find {}",
                path.display()
            )));
        }
        crate::read_json(path)
    }
}

/// Display name of an experiment: the base name of its directory
pub fn experiment_name(path: &Path) -> String {
    path.components()
        .next_back()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Order experiment directories by display name, rejecting name collisions
pub fn sort_experiments(paths: &[PathBuf]) -> Result<Vec<(String, PathBuf)>> {
    if paths.is_empty() {
        return Err(Error::MissingInput("no experiments supplied".into()));
    }
    let mut named = paths
        .iter()
        .map(|p| (experiment_name(p), p.clone()))
        .collect::<Vec<_>>();
    named.sort_by(|a, b| a.0.cmp(&b.0));

    for pair in named.windows(2) {
        if pair[0].0 == pair[1].0 {
            return Err(Error::DuplicateExperiment {
                name: pair[0].0.clone(),
                first: pair[0].1.clone(),
                second: pair[1].1.clone(),
            });
        }
    }
    Ok(named)
}

/// One experiment's evidence, ready to be merged into the combined reports
#[derive(Clone, Debug, Default)]
pub struct Experiment {
    pub name: String,
    pub path: PathBuf,
    pub evidence: Evidence,
    pub labels: SampleLabels,
}

impl Experiment {
    pub fn load(path: &Path, decoy_tag: &str) -> Result<Experiment> {
        let name = experiment_name(path);
        let evidence = Evidence::restore(path)?;
        let labels = SampleLabels::load(path, &name)?;

        let decoys = evidence
            .proteins
            .iter()
            .filter(|p| decoy::is_decoy_header(&p.original_header, decoy_tag))
            .count();
        log::info!(
            "{}: {} proteins ({} decoys), {} peptides, {} ions, {} sample labels",
            name,
            evidence.proteins.len(),
            decoys,
            evidence.peptides.len(),
            evidence.ions.len(),
            labels.len()
        );

        Ok(Experiment {
            name,
            path: path.into(),
            evidence,
            labels,
        })
    }
}
