//! Pooled identification results
//!
//! The pooled (combined) search over every experiment is the source of the
//! canonical protein and peptide identities. Protein level results are
//! organized into groups of proteins, each protein listing the peptide ions
//! supporting it; peptide level results are a flat list of PSMs.

use crate::decoy;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PeptideIonHit {
    pub sequence: String,
    pub charge: u8,
    pub probability: f64,
    /// Other proteins this ion also maps to
    #[serde(default)]
    pub parent_proteins: Vec<String>,
    #[serde(skip)]
    pub is_unique: bool,
    #[serde(skip)]
    pub is_razor: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProteinHit {
    pub protein_name: String,
    #[serde(default)]
    pub protein_id: String,
    #[serde(default)]
    pub group_sibling_id: String,
    #[serde(default)]
    pub length: u32,
    #[serde(default)]
    pub percent_coverage: f32,
    pub probability: f64,
    #[serde(default)]
    pub indistinguishable_proteins: Vec<String>,
    #[serde(default)]
    pub peptide_ions: Vec<PeptideIonHit>,
    /// Highest probability of a qualifying peptide ion, set while filtering
    #[serde(skip)]
    pub top_peptide_probability: f64,
    /// Assigned by [`ProteinInference::flatten`]
    #[serde(skip)]
    pub group_number: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProteinGroup {
    pub group_number: u32,
    pub proteins: Vec<ProteinHit>,
}

/// Protein level result of the pooled search
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProteinInference {
    pub groups: Vec<ProteinGroup>,
    #[serde(skip)]
    pub decoy_tag: String,
}

impl ProteinInference {
    pub fn load<P: AsRef<Path>>(path: P, decoy_tag: &str) -> crate::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(crate::Error::MissingInput(format!(
                "cannot find {}",
                path.display()
            )));
        }
        let mut inference: ProteinInference = crate::read_json(path)?;
        inference.decoy_tag = decoy_tag.into();
        Ok(inference)
    }

    pub fn proteins(&self) -> impl Iterator<Item = &ProteinHit> {
        self.groups.iter().flat_map(|g| g.proteins.iter())
    }

    /// An ion is unique when no protein other than the one listing it
    /// claims it
    pub fn mark_unique_peptides(&mut self) {
        for group in self.groups.iter_mut() {
            for protein in group.proteins.iter_mut() {
                let name = protein.protein_name.as_str();
                for ion in protein.peptide_ions.iter_mut() {
                    ion.is_unique = ion.parent_proteins.iter().all(|p| p == name);
                }
            }
        }
    }

    /// Replace decoy protein names with an indistinguishable target, when
    /// the group has one
    pub fn promote_protein_ids(&mut self) {
        let tag = self.decoy_tag.clone();
        for protein in self.groups.iter_mut().flat_map(|g| g.proteins.iter_mut()) {
            if !decoy::is_decoy_name(&protein.protein_name, &tag) {
                continue;
            }
            let target = protein
                .indistinguishable_proteins
                .iter()
                .position(|p| !decoy::is_decoy_name(p, &tag));
            if let Some(ix) = target {
                log::trace!(
                    "promoting {} over {}",
                    protein.indistinguishable_proteins[ix],
                    protein.protein_name
                );
                std::mem::swap(
                    &mut protein.protein_name,
                    &mut protein.indistinguishable_proteins[ix],
                );
            }
        }
    }

    /// Flatten groups into a protein list, stamping each protein with its
    /// group number
    pub fn flatten(self) -> Vec<ProteinHit> {
        self.groups
            .into_iter()
            .flat_map(|group| {
                let number = group.group_number;
                group.proteins.into_iter().map(move |mut protein| {
                    protein.group_number = number;
                    protein
                })
            })
            .collect()
    }
}

/// A single peptide-spectrum match from the pooled search
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Psm {
    #[serde(default)]
    pub spectrum: String,
    pub peptide: String,
    pub protein: String,
    pub probability: f64,
    #[serde(default)]
    pub charge: u8,
}

pub fn load_psms<P: AsRef<Path>>(path: P) -> crate::Result<Vec<Psm>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(crate::Error::MissingInput(format!(
            "cannot find {}",
            path.display()
        )));
    }
    crate::read_json(path)
}
