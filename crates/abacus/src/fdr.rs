//! False discovery rate control for the pooled identification result
//!
//! Probabilities assigned by the upstream validation tools are used as
//! scores. Optional picked-protein competition (Savitski et al.,
//! https://pubmed.ncbi.nlm.nih.gov/25987413/) and razor peptide assignment
//! run before the q-value filter.

use crate::decoy;
use crate::identification::{ProteinHit, ProteinInference, Psm};
use fnv::FnvHashMap;

/// Assign q-values to a list of target/decoy labels
///
/// # Invariants
/// * `decoys` must be ordered by descending score (e.g. best hit is first)
pub fn q_values(decoys: &[bool]) -> Vec<f64> {
    let mut decoy = 0usize;
    let mut target = 0usize;

    let mut q = decoys
        .iter()
        .map(|&is_decoy| {
            match is_decoy {
                true => decoy += 1,
                false => target += 1,
            }
            match target {
                0 => 1.0,
                _ => (decoy as f64 / target as f64).min(1.0),
            }
        })
        .collect::<Vec<f64>>();

    // Q-value is the minimum q-value at any given score threshold
    let mut q_min = 1.0f64;
    for q in q.iter_mut().rev() {
        q_min = q_min.min(*q);
        *q = q_min;
    }
    q
}

#[derive(Copy, Clone, Debug)]
struct Competition {
    forward: f64,
    reverse: f64,
}

impl Default for Competition {
    fn default() -> Self {
        Self {
            forward: f64::MIN,
            reverse: f64::MIN,
        }
    }
}

impl Competition {
    fn is_decoy(&self) -> bool {
        self.reverse >= self.forward
    }
}

/// Picked-protein competition: whenever both a target protein and its decoy
/// were identified, only the better scoring of the two is kept. Ties are
/// awarded to the decoy.
pub fn picked_fdr(inference: &mut ProteinInference) -> usize {
    let tag = inference.decoy_tag.clone();
    let mut map: FnvHashMap<String, Competition> = FnvHashMap::default();

    for protein in inference.proteins() {
        match decoy::target_name(&protein.protein_name, &tag) {
            Some(target) => {
                let entry = map.entry(target.to_string()).or_default();
                entry.reverse = entry.reverse.max(protein.probability);
            }
            None => {
                let entry = map.entry(protein.protein_name.clone()).or_default();
                entry.forward = entry.forward.max(protein.probability);
            }
        }
    }

    let mut removed = 0;
    for group in inference.groups.iter_mut() {
        group.proteins.retain(|protein| {
            let (key, decoy) = match decoy::target_name(&protein.protein_name, &tag) {
                Some(target) => (target, true),
                None => (protein.protein_name.as_str(), false),
            };
            // Unpaired entries have MIN on the other side and always win
            let keep = map.get(key).map(|c| c.is_decoy() == decoy).unwrap_or(true);
            if !keep {
                removed += 1;
            }
            keep
        });
    }
    inference.groups.retain(|g| !g.proteins.is_empty());

    log::trace!("picked FDR removed {} proteins", removed);
    removed
}

/// Assign every shared peptide ion to a single protein: the one with the
/// highest probability, then the most ions, then the smallest name. Unique
/// ions are always razor ions of the protein listing them.
pub fn razor_filter(inference: &mut ProteinInference) {
    // sequence -> (probability, ion count, protein name) of the current winner
    let mut winners: FnvHashMap<String, (f64, usize, String)> = FnvHashMap::default();

    for protein in inference.proteins() {
        let candidate = (
            protein.probability,
            protein.peptide_ions.len(),
            &protein.protein_name,
        );
        for ion in &protein.peptide_ions {
            match winners.get_mut(&ion.sequence) {
                Some(best) => {
                    let better = candidate.0 > best.0
                        || (candidate.0 == best.0 && candidate.1 > best.1)
                        || (candidate.0 == best.0
                            && candidate.1 == best.1
                            && candidate.2.as_str() < best.2.as_str());
                    if better {
                        *best = (candidate.0, candidate.1, candidate.2.clone());
                    }
                }
                None => {
                    winners.insert(
                        ion.sequence.clone(),
                        (candidate.0, candidate.1, candidate.2.clone()),
                    );
                }
            }
        }
    }

    for protein in inference
        .groups
        .iter_mut()
        .flat_map(|g| g.proteins.iter_mut())
    {
        let name = protein.protein_name.as_str();
        for ion in protein.peptide_ions.iter_mut() {
            ion.is_razor = ion.is_unique
                || winners
                    .get(&ion.sequence)
                    .map(|(_, _, winner)| winner == name)
                    .unwrap_or(false);
        }
    }
}

/// Filter proteins to the requested FDR. Decoys that pass are kept, it is up
/// to the caller to discard them.
pub fn protein_fdr_filter(
    inference: ProteinInference,
    fdr: f64,
    peptide_probability: f64,
    protein_probability: f64,
    razor: bool,
) -> Vec<ProteinHit> {
    let tag = inference.decoy_tag.clone();

    let mut proteins = inference
        .flatten()
        .into_iter()
        .filter_map(|mut protein| {
            let top = protein
                .peptide_ions
                .iter()
                .filter(|ion| ion.probability >= peptide_probability)
                .filter(|ion| !razor || ion.is_razor)
                .map(|ion| ion.probability)
                .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.max(p))));
            top.map(|top| {
                protein.top_peptide_probability = top;
                protein
            })
        })
        .collect::<Vec<_>>();

    proteins.sort_by(|a, b| {
        b.probability
            .total_cmp(&a.probability)
            .then_with(|| b.top_peptide_probability.total_cmp(&a.top_peptide_probability))
    });

    let decoys = proteins
        .iter()
        .map(|p| decoy::is_decoy_name(&p.protein_name, &tag))
        .collect::<Vec<_>>();
    let q = q_values(&decoys);

    let passing = proteins
        .into_iter()
        .zip(q)
        .filter(|(protein, q)| *q <= fdr && protein.probability >= protein_probability)
        .map(|(protein, _)| protein)
        .collect::<Vec<_>>();

    log::info!(
        "discovered {} target proteins at {}% FDR",
        passing
            .iter()
            .filter(|p| !decoy::is_decoy_name(&p.protein_name, &tag))
            .count(),
        fdr * 100.0
    );
    passing
}

/// Keep the best PSM for every peptide sequence. Ties keep the first seen.
pub fn unique_peptides(psms: Vec<Psm>) -> Vec<Psm> {
    let mut index: FnvHashMap<String, usize> = FnvHashMap::default();
    let mut unique: Vec<Psm> = Vec::new();
    for psm in psms {
        match index.get(&psm.peptide) {
            Some(&ix) => {
                if psm.probability > unique[ix].probability {
                    unique[ix] = psm;
                }
            }
            None => {
                index.insert(psm.peptide.clone(), unique.len());
                unique.push(psm);
            }
        }
    }
    unique
}

/// Filter peptides to the requested FDR, returning them ordered by
/// descending probability
pub fn peptide_fdr_filter(mut psms: Vec<Psm>, fdr: f64, decoy_tag: &str) -> Vec<Psm> {
    psms.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    let decoys = psms
        .iter()
        .map(|psm| decoy::is_decoy_name(&psm.protein, decoy_tag))
        .collect::<Vec<_>>();
    let q = q_values(&decoys);

    let passing = psms
        .into_iter()
        .zip(q)
        .filter(|(_, q)| *q <= fdr)
        .map(|(psm, _)| psm)
        .collect::<Vec<_>>();

    log::info!(
        "discovered {} target peptides at {}% FDR",
        passing
            .iter()
            .filter(|p| !decoy::is_decoy_name(&p.protein, decoy_tag))
            .count(),
        fdr * 100.0
    );
    passing
}
