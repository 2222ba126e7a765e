//! Canonical identities and cross-experiment merging

use abacus_core::combined::{resolve_peptides, resolve_proteins, CombinedProtein};
use abacus_core::evidence::{Evidence, Experiment, ProteinEvidence};
use abacus_core::fasta::Fasta;
use abacus_core::fdr;
use abacus_core::identification::{PeptideIonHit, ProteinGroup, ProteinHit, ProteinInference, Psm};
use abacus_core::merge;
use fnv::FnvHashSet;
use quickcheck_macros::quickcheck;

const FASTA: &str = r#"
>rev_sp|Q99536|VAT1_HUMAN Synaptic vesicle membrane protein VAT-1 homolog OS=Homo sapiens OX=9606 GN=VAT1 PE=1 SV=2
DYGGFGTLVLCRLLPPSAAAAAAGESAAPHQPDSAAETKPPPSSADEGTAAEAVERESM
>sp|Q99536|VAT1_HUMAN Synaptic vesicle membrane protein VAT-1 homolog OS=Homo sapiens OX=9606 GN=VAT1 PE=1 SV=2
MSDEREVAEAATGEDASSPPPKTEAASDPQHPAASEGAAAAAASPPLLRCLVLTGFGGYD
>sp|P02769|ALBU_BOVIN Serum albumin OS=Bos taurus OX=9913 GN=ALB PE=1 SV=4
MKWVTFISLLLLFSSAYSRGVFRR
"#;

const TAG: &str = "rev_";

fn inference(hits: &[(bool, String, u8)]) -> ProteinInference {
    let groups = hits
        .iter()
        .enumerate()
        .map(|(ix, (decoy, name, score))| {
            let protein_name = match decoy {
                true => format!("{}{}", TAG, name),
                false => name.clone(),
            };
            ProteinGroup {
                group_number: ix as u32 + 1,
                proteins: vec![ProteinHit {
                    protein_name,
                    probability: *score as f64 / 255.0,
                    peptide_ions: vec![PeptideIonHit {
                        sequence: format!("PEPTIDE{}", ix),
                        charge: 2,
                        probability: 1.0,
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
            }
        })
        .collect();
    ProteinInference {
        groups,
        decoy_tag: TAG.into(),
    }
}

#[quickcheck]
fn canonical_proteins_exclude_decoys(hits: Vec<(bool, String, u8)>, picked: bool) -> bool {
    let mut inf = inference(&hits);
    inf.mark_unique_peptides();
    inf.promote_protein_ids();
    if picked {
        fdr::picked_fdr(&mut inf);
    }
    let passing = fdr::protein_fdr_filter(inf, 1.0, 0.0, 0.0, false);
    let database = Fasta::parse(FASTA, TAG);
    let canonical = resolve_proteins(passing, &database, TAG);

    let mut ids = FnvHashSet::default();
    canonical.iter().all(|p| {
        !p.protein_name.starts_with(TAG)
            && !p.protein_id.starts_with(TAG)
            && (p.protein_id.is_empty() || ids.insert(p.protein_id.clone()))
    })
}

#[quickcheck]
fn canonical_peptides_exclude_decoys(psms: Vec<(bool, String, u8)>) -> bool {
    let psms = psms
        .into_iter()
        .map(|(decoy, peptide, score)| Psm {
            protein: match decoy {
                true => format!("{}sp|P1|A", TAG),
                false => "sp|P1|A".into(),
            },
            peptide,
            probability: score as f64 / 255.0,
            ..Default::default()
        })
        .collect::<Vec<_>>();
    let passing = fdr::peptide_fdr_filter(fdr::unique_peptides(psms), 1.0, TAG);
    let canonical = resolve_peptides(passing, TAG);

    let mut sequences = FnvHashSet::default();
    canonical
        .iter()
        .all(|p| !p.protein.starts_with(TAG) && sequences.insert(p.sequence.clone()))
}

fn experiment(name: &str, unique: u32, razor: u32) -> Experiment {
    let peptides = (0..razor)
        .map(|ix| format!("{}PEPTIDE{}", name, ix))
        .collect();
    Experiment {
        name: name.into(),
        evidence: Evidence {
            proteins: vec![ProteinEvidence {
                original_header: "sp|P02769|ALBU_BOVIN Serum albumin".into(),
                part_header: "sp|P02769|ALBU_BOVIN".into(),
                protein_id: "P02769".into(),
                unique_spc: unique,
                razor_spc: razor,
                total_spc: razor + 1,
                razor_intensity: 1e5 * razor as f64,
                total_peptides: peptides,
                ..Default::default()
            }],
            ..Default::default()
        },
        ..Default::default()
    }
}

fn canonical() -> Vec<CombinedProtein> {
    let database = Fasta::parse(FASTA, TAG);
    let hit = ProteinHit {
        protein_name: "sp|P02769|ALBU_BOVIN".into(),
        probability: 1.0,
        ..Default::default()
    };
    resolve_proteins(vec![hit], &database, TAG)
}

#[test]
fn two_experiment_round_trip() {
    let a = experiment("A", 3, 5);
    let b = experiment("B", 0, 2);

    let mut proteins = canonical();
    for exp in [&a, &b] {
        merge::merge_protein_experiment(&mut proteins, exp, TAG, false);
    }

    let albu = &proteins[0];
    assert_eq!(albu.protein_id, "P02769");
    assert_eq!(albu.razor_spc["A"], 5);
    assert_eq!(albu.razor_spc["B"], 2);
    assert_eq!(albu.summed_spectral_counts(), (7, 3, 9));
    assert_eq!(albu.combined_total_peptides(), 7);
}

#[test]
fn merge_order_does_not_matter() {
    let a = experiment("A", 3, 5);
    let b = experiment("B", 0, 2);

    let mut forward = canonical();
    for exp in [&a, &b] {
        merge::merge_protein_experiment(&mut forward, exp, TAG, true);
    }
    let mut reverse = canonical();
    for exp in [&b, &a] {
        merge::merge_protein_experiment(&mut reverse, exp, TAG, true);
    }
    assert_eq!(forward, reverse);
}
