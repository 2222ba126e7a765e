//! Canonical protein and peptide identities of the combined reports
//!
//! Canonical entities are built once from the FDR-filtered pooled
//! identification result, stripped of decoys. Per-experiment maps start out
//! empty and are populated by [`crate::merge`], keyed by experiment name.

use crate::decoy;
use crate::fasta::{Fasta, Record};
use crate::identification::{ProteinHit, Psm};
use crate::tmt::Labels;
use fnv::{FnvHashMap, FnvHashSet};
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CombinedProtein {
    pub protein_name: String,
    pub protein_id: String,
    pub entry_name: String,
    pub gene_names: String,
    pub organism: String,
    pub description: String,
    pub protein_existence: String,

    pub length: u32,
    pub coverage: f32,
    pub group_number: u32,
    pub sibling_id: String,
    pub indistinguishable_proteins: Vec<String>,
    pub peptide_ions: usize,
    pub protein_probability: f64,
    pub top_peptide_probability: f64,

    pub total_spc: FnvHashMap<String, u32>,
    pub unique_spc: FnvHashMap<String, u32>,
    pub razor_spc: FnvHashMap<String, u32>,

    pub total_intensity: FnvHashMap<String, f64>,
    pub unique_intensity: FnvHashMap<String, f64>,
    pub razor_intensity: FnvHashMap<String, f64>,

    pub total_labels: FnvHashMap<String, Labels>,
    pub unique_labels: FnvHashMap<String, Labels>,
    pub razor_labels: FnvHashMap<String, Labels>,

    pub total_peptides: FnvHashMap<String, BTreeSet<String>>,
    pub unique_peptides: FnvHashMap<String, BTreeSet<String>>,
    pub razor_peptides: FnvHashMap<String, BTreeSet<String>>,
}

impl From<ProteinHit> for CombinedProtein {
    fn from(hit: ProteinHit) -> Self {
        CombinedProtein {
            protein_name: hit.protein_name,
            protein_id: hit.protein_id,
            length: hit.length,
            coverage: hit.percent_coverage,
            group_number: hit.group_number,
            sibling_id: hit.group_sibling_id,
            indistinguishable_proteins: hit.indistinguishable_proteins,
            peptide_ions: hit.peptide_ions.len(),
            protein_probability: hit.probability,
            top_peptide_probability: hit.top_peptide_probability,
            ..Default::default()
        }
    }
}

impl CombinedProtein {
    /// A database header identifies this protein when it contains the
    /// protein name, starts with the protein ID and is not a decoy
    pub fn matches_header(&self, header: &str, decoy_tag: &str) -> bool {
        header.contains(&self.protein_name)
            && header.starts_with(&self.protein_id)
            && !decoy::is_decoy_header(header, decoy_tag)
    }

    fn assign_record(&mut self, record: &Record) {
        self.protein_name = record.part_header.clone();
        self.protein_id = record.id.clone();
        self.entry_name = record.entry_name.clone();
        self.gene_names = record.gene_names.clone();
        self.organism = record.organism.clone();
        self.description = record.description.clone();
        self.protein_existence = record.protein_existence.clone();
    }

    /// Was any spectral count evidence found in any experiment?
    pub fn has_spectral_counts(&self) -> bool {
        !self.total_spc.is_empty()
    }

    /// Razor, unique and total spectral counts summed over all experiments
    pub fn summed_spectral_counts(&self) -> (u32, u32, u32) {
        (
            self.razor_spc.values().sum(),
            self.unique_spc.values().sum(),
            self.total_spc.values().sum(),
        )
    }

    /// Number of distinct peptide sequences observed in any experiment
    pub fn combined_total_peptides(&self) -> usize {
        self.total_peptides
            .values()
            .flatten()
            .collect::<FnvHashSet<_>>()
            .len()
    }

    fn identity(&self) -> &str {
        match self.protein_id.is_empty() {
            true => &self.protein_name,
            false => &self.protein_id,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CombinedPeptide {
    pub sequence: String,
    pub protein: String,
    pub protein_id: String,
    pub protein_description: String,
    pub gene: String,

    pub charge_states: BTreeSet<u8>,
    pub assigned_mass_shifts: BTreeSet<String>,
    pub best_psm_probability: f64,

    pub spc: FnvHashMap<String, u32>,
    pub intensity: FnvHashMap<String, f64>,
}

/// Build the canonical protein list from FDR-filtered pooled proteins,
/// resolving each identity against the reference database
pub fn resolve_proteins(
    proteins: Vec<ProteinHit>,
    database: &Fasta,
    decoy_tag: &str,
) -> Vec<CombinedProtein> {
    let mut list = proteins
        .into_iter()
        .filter(|hit| !decoy::is_decoy_name(&hit.protein_name, decoy_tag))
        .map(CombinedProtein::from)
        .collect::<Vec<_>>();

    let mut unmatched = 0;
    for protein in list.iter_mut() {
        let record = database
            .records
            .iter()
            .find(|record| protein.matches_header(&record.original_header, decoy_tag));
        match record {
            Some(record) => protein.assign_record(record),
            None => {
                unmatched += 1;
                log::warn!("{} has no match in the database", protein.protein_name);
            }
        }
    }
    if unmatched > 0 {
        log::warn!("{} proteins could not be resolved against the database", unmatched);
    }

    // Two pooled entries can resolve to the same database record
    let mut seen = FnvHashSet::default();
    list.retain(|protein| {
        let fresh = seen.insert(protein.identity().to_string());
        if !fresh {
            log::warn!(
                "dropping duplicate protein {} (group {})",
                protein.identity(),
                protein.group_number
            );
        }
        fresh
    });

    log::info!("{} canonical proteins", list.len());
    list
}

/// Build the canonical peptide list from FDR-filtered pooled PSMs
pub fn resolve_peptides(psms: Vec<Psm>, decoy_tag: &str) -> Vec<CombinedPeptide> {
    let mut seen = FnvHashSet::default();
    let list = psms
        .into_iter()
        .filter(|psm| !decoy::is_decoy_name(&psm.protein, decoy_tag))
        .filter(|psm| seen.insert(psm.peptide.clone()))
        .map(|psm| CombinedPeptide {
            sequence: psm.peptide,
            protein: psm.protein,
            ..Default::default()
        })
        .collect::<Vec<_>>();

    log::info!("{} canonical peptides", list.len());
    list
}

#[cfg(test)]
mod test {
    use super::*;

    const FASTA: &str = r#"
>rev_sp|P02769|ALBU_BOVIN Serum albumin OS=Bos taurus OX=9913 GN=ALB PE=1 SV=4
AAAA
>sp|P02769|ALBU_BOVIN Serum albumin OS=Bos taurus OX=9913 GN=ALB PE=1 SV=4
MKWVTFISLLLLFSSAYSRGVFRR
>sp|P02769-2|ALBU_BOVIN Serum albumin isoform OS=Bos taurus OX=9913 GN=ALB PE=1 SV=4
MKWVTF
>sp|Q99536|VAT1_HUMAN Synaptic vesicle membrane protein VAT-1 homolog OS=Homo sapiens OX=9606 GN=VAT1 PE=1 SV=2
MSDEREVAEAATGEDASSPPPKTEAASDPQHPAASEGAAAAAASPPLLRCLVLTGFGGYD
"#;

    fn hit(name: &str, group: u32) -> ProteinHit {
        ProteinHit {
            protein_name: name.into(),
            group_number: group,
            probability: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn first_target_record_wins() {
        let db = Fasta::parse(FASTA, "rev_");
        let list = resolve_proteins(vec![hit("sp|P02769|ALBU_BOVIN", 1)], &db, "rev_");
        assert_eq!(list.len(), 1);
        let albu = &list[0];
        assert_eq!(albu.protein_name, "sp|P02769|ALBU_BOVIN");
        assert_eq!(albu.protein_id, "P02769");
        assert_eq!(albu.entry_name, "ALBU_BOVIN");
        assert_eq!(albu.description, "Serum albumin");
        assert_eq!(albu.gene_names, "ALB");
        assert_eq!(albu.organism, "Bos taurus");
    }

    #[test]
    fn decoys_are_discarded() {
        let db = Fasta::parse(FASTA, "rev_");
        let list = resolve_proteins(
            vec![hit("rev_sp|P02769|ALBU_BOVIN", 1), hit("sp|Q99536|VAT1_HUMAN", 2)],
            &db,
            "rev_",
        );
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].protein_id, "Q99536");
    }

    #[test]
    fn protein_id_prefix_is_required() {
        let db = Fasta::parse(FASTA, "rev_");
        let mut protein = hit("ALBU_BOVIN", 1);
        protein.protein_id = "tr|".into();
        let list = resolve_proteins(vec![protein], &db, "rev_");
        assert_eq!(list[0].protein_name, "ALBU_BOVIN");
        assert_eq!(list[0].entry_name, "");
    }

    #[test]
    fn duplicate_identities_collapse() {
        let db = Fasta::parse(FASTA, "rev_");
        // Both names resolve to the first albumin record
        let list = resolve_proteins(
            vec![hit("sp|P02769|ALBU_BOVIN", 1), hit("ALBU_BOVIN", 2)],
            &db,
            "rev_",
        );
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].group_number, 1);
    }

    #[test]
    fn canonical_peptides() {
        let psm = |peptide: &str, protein: &str| Psm {
            peptide: peptide.into(),
            protein: protein.into(),
            probability: 0.99,
            ..Default::default()
        };
        let list = resolve_peptides(
            vec![
                psm("PEPTIDE", "sp|P1|A"),
                psm("DECOY", "rev_sp|P1|A"),
                psm("PEPTIDE", "sp|P2|B"),
            ],
            "rev_",
        );
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].sequence, "PEPTIDE");
        assert_eq!(list[0].protein, "sp|P1|A");
    }
}
