//! Merge per-experiment evidence into the canonical entities
//!
//! Experiments are merged one at a time. Every merge only ever adds entries
//! keyed by the experiment's own name, and never replaces an entry that is
//! already present, so merging experiment *i* cannot disturb what earlier
//! experiments contributed.
//!
//! Two different joins are used at the protein level, and both are kept:
//! spectral counts, intensities and label intensities join on exact protein
//! ID equality, while peptide membership joins on the protein name (the
//! evidence part header).

use crate::combined::{CombinedPeptide, CombinedProtein};
use crate::decoy;
use crate::evidence::{Experiment, PeptideEvidence, ProteinEvidence};
use fnv::FnvHashMap;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Canonical entities that found evidence in the experiment
    pub matched: usize,
    /// Canonical entities without evidence in the experiment
    pub unmatched: usize,
}

/// First target evidence item for every protein ID, in stored order
fn index_by_id<'a>(
    proteins: &'a [ProteinEvidence],
    decoy_tag: Option<&str>,
) -> FnvHashMap<&'a str, &'a ProteinEvidence> {
    let mut index = FnvHashMap::default();
    for protein in proteins {
        if let Some(tag) = decoy_tag {
            if decoy::is_decoy_header(&protein.original_header, tag) {
                continue;
            }
        }
        index.entry(protein.protein_id.as_str()).or_insert(protein);
    }
    index
}

/// Copy spectral counts, and label intensities when `labels` is set, from
/// the first target protein in the experiment whose ID equals the canonical
/// protein ID
pub fn merge_spectral_counts(
    proteins: &mut [CombinedProtein],
    experiment: &Experiment,
    decoy_tag: &str,
    labels: bool,
) -> MergeSummary {
    let index = index_by_id(&experiment.evidence.proteins, Some(decoy_tag));
    let name = &experiment.name;
    let mut summary = MergeSummary::default();

    for protein in proteins.iter_mut() {
        let evidence = match index.get(protein.protein_id.as_str()) {
            Some(evidence) => evidence,
            None => {
                summary.unmatched += 1;
                continue;
            }
        };
        summary.matched += 1;

        protein
            .unique_spc
            .entry(name.clone())
            .or_insert(evidence.unique_spc);
        protein
            .total_spc
            .entry(name.clone())
            .or_insert(evidence.total_spc);
        protein
            .razor_spc
            .entry(name.clone())
            .or_insert(evidence.razor_spc);

        if labels {
            for (target, source) in [
                (&mut protein.total_labels, &evidence.total_labels),
                (&mut protein.unique_labels, &evidence.unique_labels),
                (&mut protein.razor_labels, &evidence.razor_labels),
            ] {
                if let Some(source) = source {
                    target.entry(name.clone()).or_insert_with(|| source.clone());
                }
            }
        }
    }
    summary
}

/// Copy intensities from the first protein in the experiment whose ID
/// equals the canonical protein ID
pub fn merge_intensities(proteins: &mut [CombinedProtein], experiment: &Experiment) -> MergeSummary {
    let index = index_by_id(&experiment.evidence.proteins, None);
    let name = &experiment.name;
    let mut summary = MergeSummary::default();

    for protein in proteins.iter_mut() {
        match index.get(protein.protein_id.as_str()) {
            Some(evidence) => {
                summary.matched += 1;
                protein
                    .total_intensity
                    .entry(name.clone())
                    .or_insert(evidence.total_intensity);
                protein
                    .unique_intensity
                    .entry(name.clone())
                    .or_insert(evidence.unique_intensity);
                protein
                    .razor_intensity
                    .entry(name.clone())
                    .or_insert(evidence.razor_intensity);
            }
            None => summary.unmatched += 1,
        }
    }
    summary
}

/// Union the total/unique/razor peptide sets of every target protein in the
/// experiment whose part header equals the canonical protein name
pub fn merge_peptide_membership(
    proteins: &mut [CombinedProtein],
    experiment: &Experiment,
    decoy_tag: &str,
) -> MergeSummary {
    let mut index: FnvHashMap<&str, Vec<&ProteinEvidence>> = FnvHashMap::default();
    for evidence in &experiment.evidence.proteins {
        if !decoy::is_decoy_header(&evidence.original_header, decoy_tag) {
            index
                .entry(evidence.part_header.as_str())
                .or_default()
                .push(evidence);
        }
    }

    let name = &experiment.name;
    let mut summary = MergeSummary::default();

    for protein in proteins.iter_mut() {
        let matches = match index.get(protein.protein_name.as_str()) {
            Some(matches) => matches,
            None => {
                summary.unmatched += 1;
                continue;
            }
        };
        summary.matched += 1;

        if protein.total_peptides.contains_key(name) {
            continue;
        }
        let total = protein.total_peptides.entry(name.clone()).or_default();
        let unique = protein.unique_peptides.entry(name.clone()).or_default();
        let razor = protein.razor_peptides.entry(name.clone()).or_default();
        for evidence in matches {
            total.extend(evidence.total_peptides.iter().cloned());
            unique.extend(evidence.unique_peptides.iter().cloned());
            razor.extend(evidence.razor_peptides.iter().cloned());
        }
    }
    summary
}

/// Merge every protein-level metric of one experiment
pub fn merge_protein_experiment(
    proteins: &mut [CombinedProtein],
    experiment: &Experiment,
    decoy_tag: &str,
    labels: bool,
) {
    let spc = merge_spectral_counts(proteins, experiment, decoy_tag, labels);
    let membership = merge_peptide_membership(proteins, experiment, decoy_tag);
    merge_intensities(proteins, experiment);

    log::info!(
        "{}: spectral counts for {} proteins, peptides for {} proteins",
        experiment.name,
        spc.matched,
        membership.matched
    );
    if spc.unmatched > 0 {
        log::debug!(
            "{}: {} proteins without evidence",
            experiment.name,
            spc.unmatched
        );
    }
}

/// Merge one experiment's peptide evidence, joined on exact sequence
pub fn merge_peptides(peptides: &mut [CombinedPeptide], experiment: &Experiment) -> MergeSummary {
    let mut index: FnvHashMap<&str, Vec<&PeptideEvidence>> = FnvHashMap::default();
    for evidence in &experiment.evidence.peptides {
        index
            .entry(evidence.sequence.as_str())
            .or_default()
            .push(evidence);
    }

    let name = &experiment.name;
    let mut summary = MergeSummary::default();

    for peptide in peptides.iter_mut() {
        let matches = match index.get(peptide.sequence.as_str()) {
            Some(matches) => matches,
            None => {
                summary.unmatched += 1;
                continue;
            }
        };
        summary.matched += 1;

        let first = matches[0];
        peptide.spc.entry(name.clone()).or_insert(first.spc);
        peptide
            .intensity
            .entry(name.clone())
            .or_insert(first.intensity);

        // Protein identity comes from the first experiment observing the
        // peptide
        if peptide.protein_id.is_empty() {
            peptide.protein = first.protein.clone();
            peptide.protein_id = first.protein_id.clone();
            peptide.protein_description = first.protein_description.clone();
            peptide.gene = first.gene_name.clone();
        }

        for evidence in matches {
            peptide
                .assigned_mass_shifts
                .extend(evidence.assigned_mass_shifts());
            peptide
                .charge_states
                .extend(evidence.charge_states.iter().copied());
            if evidence.probability > peptide.best_psm_probability {
                peptide.best_psm_probability = evidence.probability;
            }
        }
    }

    log::info!(
        "{}: evidence for {} of {} peptides",
        name,
        summary.matched,
        peptides.len()
    );
    summary
}
