use crate::Runner;
use abacus_core::annotation::SampleLabels;
use abacus_core::combined::{CombinedPeptide, CombinedProtein};
use abacus_core::tmt::{Isobaric, Labels};
use anyhow::Context;
use csv::ByteRecord;
use fnv::FnvHashMap;
use itertools::Itertools;
use std::fs::File;
use std::path::{Path, PathBuf};

const PROTEIN_REPORT: &str = "combined_protein.tsv";
const PEPTIDE_REPORT: &str = "combined_peptide.tsv";
const REPRINT_SPC: &str = "reprint.spc.tsv";
const REPRINT_INT: &str = "reprint.int.tsv";

/// Condition label of an experiment in the Reprint reports
///
/// `GENE_cond_rep1` is labelled `GENE_cond`, `GENE_rep1` is labelled `GENE`,
/// and any name mentioning control is labelled `CONTROL`. Names that follow
/// neither pattern are used as is.
pub fn reprint_label(name: &str) -> String {
    if name.to_uppercase().contains("CONTROL") {
        return "CONTROL".into();
    }
    let parts = name.split('_').collect::<Vec<_>>();
    match parts.len() {
        3 => format!("{}_{}", parts[0], parts[1]),
        2 => parts[0].to_string(),
        _ => name.to_string(),
    }
}

fn create_writer(path: &Path) -> anyhow::Result<csv::Writer<File>> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_path(path)
        .with_context(|| format!("Failed to create `{}`", path.display()))
}

/// A single row that fails to write is reported, and the report continues
fn write_row(wtr: &mut csv::Writer<File>, record: &ByteRecord, path: &Path) {
    if let Err(e) = wtr.write_byte_record(record) {
        log::error!("failed to write a row to `{}`: {}", path.display(), e);
    }
}

fn flush(wtr: &mut csv::Writer<File>, path: &Path) {
    if let Err(e) = wtr.flush() {
        log::error!("failed to flush `{}`: {}", path.display(), e);
    }
}

fn push_int<I: itoa::Integer>(record: &mut ByteRecord, value: I) {
    record.push_field(itoa::Buffer::new().format(value).as_bytes());
}

fn get_count(map: &FnvHashMap<String, u32>, name: &str) -> u32 {
    map.get(name).copied().unwrap_or_default()
}

fn get_intensity(map: &FnvHashMap<String, f64>, name: &str) -> f64 {
    map.get(name).copied().unwrap_or_default()
}

impl Runner {
    /// Isobaric channels of the label columns, if they are written
    fn channels(&self) -> Option<Isobaric> {
        if !self.parameters.labels {
            return None;
        }
        match self.parameters.plex.parse::<Isobaric>() {
            Ok(isobaric) => Some(isobaric),
            Err(e) => {
                log::error!("{}, label columns are omitted", e);
                None
            }
        }
    }

    pub fn protein_headers(
        &self,
        names: &[String],
        channels: Option<Isobaric>,
        labels: &SampleLabels,
    ) -> ByteRecord {
        let mut headers = ByteRecord::from(vec![
            "Protein",
            "Protein ID",
            "Entry Name",
            "Gene",
            "Protein Length",
            "Organism",
            "Protein Existence",
            "Description",
            "Protein Probability",
            "Top Peptide Probability",
            "Combined Total Peptides",
            "Combined Spectral Count",
            "Combined Unique Spectral Count",
            "Combined Total Spectral Count",
        ]);

        let mut per_experiment = |suffixes: &[&str]| {
            for suffix in suffixes {
                for name in names {
                    headers.push_field(format!("{} {}", name, suffix).as_bytes());
                }
            }
        };
        match self.parameters.full {
            true => {
                per_experiment(&["Spectral Count", "Unique Spectral Count", "Total Spectral Count"]);
                per_experiment(&["Intensity", "Unique Intensity", "Total Intensity"]);
            }
            false => per_experiment(&["Spectral Count", "Intensity"]),
        }

        if let Some(isobaric) = channels {
            for name in names {
                for channel in isobaric.headers() {
                    match labels.get(name, channel) {
                        Some(label) => headers.push_field(label.as_bytes()),
                        None => headers.push_field(format!("{} {}", name, channel).as_bytes()),
                    }
                }
            }
        }

        headers.push_field(b"Indistinguishable Proteins");
        headers
    }

    pub fn serialize_protein(
        &self,
        protein: &CombinedProtein,
        names: &[String],
        channels: Option<Isobaric>,
    ) -> ByteRecord {
        let mut record = ByteRecord::new();
        record.push_field(protein.protein_name.as_bytes());
        record.push_field(protein.protein_id.as_bytes());
        record.push_field(protein.entry_name.as_bytes());
        record.push_field(protein.gene_names.as_bytes());
        push_int(&mut record, protein.length);
        record.push_field(protein.organism.as_bytes());
        record.push_field(protein.protein_existence.as_bytes());
        record.push_field(protein.description.as_bytes());
        record.push_field(format!("{:.4}", protein.protein_probability).as_bytes());
        record.push_field(format!("{:.4}", protein.top_peptide_probability).as_bytes());
        push_int(&mut record, protein.combined_total_peptides());

        let (razor, unique, total) = protein.summed_spectral_counts();
        push_int(&mut record, razor);
        push_int(&mut record, unique);
        push_int(&mut record, total);

        let full = self.parameters.full;
        let counts = match full {
            true => vec![&protein.razor_spc, &protein.unique_spc, &protein.total_spc],
            false => vec![&protein.razor_spc],
        };
        for map in counts {
            for name in names {
                push_int(&mut record, get_count(map, name));
            }
        }

        let intensities = match full {
            true => vec![
                &protein.razor_intensity,
                &protein.unique_intensity,
                &protein.total_intensity,
            ],
            false => vec![&protein.razor_intensity],
        };
        for map in intensities {
            for name in names {
                record.push_field(format!("{:6.0}", get_intensity(map, name)).as_bytes());
            }
        }

        if let Some(isobaric) = channels {
            let labels = match self.parameters.unique_only {
                true => &protein.unique_labels,
                false => &protein.razor_labels,
            };
            let empty = Labels::default();
            for name in names {
                let quant = labels.get(name).unwrap_or(&empty);
                for channel in 0..isobaric.channels() {
                    record.push_field(format!("{:.4}", quant.intensity(channel)).as_bytes());
                }
            }
        }

        record.push_field(protein.indistinguishable_proteins.join(", ").as_bytes());
        record
    }

    /// Write the combined protein report. Proteins without spectral counts
    /// in any experiment are left out.
    pub fn write_combined_proteins(
        &self,
        proteins: &[CombinedProtein],
        names: &[String],
        labels: &SampleLabels,
    ) -> anyhow::Result<PathBuf> {
        let path = self.make_path(PROTEIN_REPORT);
        let mut wtr = create_writer(&path)?;

        let channels = self.channels();
        let headers = self.protein_headers(names, channels, labels);
        write_row(&mut wtr, &headers, &path);

        let mut written = 0;
        for protein in proteins.iter().filter(|p| p.has_spectral_counts()) {
            let record = self.serialize_protein(protein, names, channels);
            write_row(&mut wtr, &record, &path);
            written += 1;
        }
        flush(&mut wtr, &path);

        log::info!("wrote {} proteins to {}", written, path.display());
        Ok(path)
    }

    pub fn serialize_peptide(&self, peptide: &CombinedPeptide, names: &[String]) -> ByteRecord {
        let mut record = ByteRecord::new();
        record.push_field(peptide.sequence.as_bytes());
        record.push_field(peptide.charge_states.iter().join(",").as_bytes());
        record.push_field(format!("{:.6}", peptide.best_psm_probability).as_bytes());
        record.push_field(peptide.assigned_mass_shifts.iter().join(",").as_bytes());
        record.push_field(peptide.gene.as_bytes());
        record.push_field(peptide.protein.as_bytes());
        record.push_field(peptide.protein_id.as_bytes());
        record.push_field(peptide.protein_description.as_bytes());
        for name in names {
            push_int(&mut record, get_count(&peptide.spc, name));
            record.push_field(format!("{:.4}", get_intensity(&peptide.intensity, name)).as_bytes());
        }
        record
    }

    pub fn write_combined_peptides(
        &self,
        peptides: &[CombinedPeptide],
        names: &[String],
    ) -> anyhow::Result<PathBuf> {
        let path = self.make_path(PEPTIDE_REPORT);
        let mut wtr = create_writer(&path)?;

        let mut headers = ByteRecord::from(vec![
            "Sequence",
            "Charge States",
            "Probability",
            "Assigned Modifications",
            "Gene",
            "Protein",
            "Protein ID",
            "Protein Description",
        ]);
        for name in names {
            headers.push_field(format!("{} Spectral Count", name).as_bytes());
            headers.push_field(format!("{} Intensity", name).as_bytes());
        }
        write_row(&mut wtr, &headers, &path);

        for peptide in peptides {
            write_row(&mut wtr, &self.serialize_peptide(peptide, names), &path);
        }
        flush(&mut wtr, &path);

        log::info!("wrote {} peptides to {}", peptides.len(), path.display());
        Ok(path)
    }

    /// Reprint reports carry two header rows: experiment names, then the
    /// condition label of each experiment
    fn reprint_headers(
        wtr: &mut csv::Writer<File>,
        path: &Path,
        fixed: &[&str],
        names: &[String],
        suffix: &str,
    ) {
        let mut headers = ByteRecord::from(fixed.to_vec());
        let mut conditions = ByteRecord::from(vec!["na"; fixed.len()]);
        for name in names {
            headers.push_field(format!("{}_{}", name, suffix).as_bytes());
            conditions.push_field(reprint_label(name).as_bytes());
        }
        write_row(wtr, &headers, path);
        write_row(wtr, &conditions, path);
    }

    pub fn write_reprint_spc(
        &self,
        proteins: &[CombinedProtein],
        names: &[String],
    ) -> anyhow::Result<PathBuf> {
        let path = self.make_path(REPRINT_SPC);
        let mut wtr = create_writer(&path)?;
        Self::reprint_headers(&mut wtr, &path, &["PROTID", "GENEID", "PROTLEN"], names, "SPC");

        for protein in proteins {
            let mut record = ByteRecord::new();
            record.push_field(protein.protein_id.as_bytes());
            record.push_field(protein.gene_names.as_bytes());
            push_int(&mut record, protein.length);
            for name in names {
                push_int(&mut record, get_count(&protein.razor_spc, name));
            }
            write_row(&mut wtr, &record, &path);
        }
        flush(&mut wtr, &path);
        Ok(path)
    }

    pub fn write_reprint_int(
        &self,
        proteins: &[CombinedProtein],
        names: &[String],
    ) -> anyhow::Result<PathBuf> {
        let path = self.make_path(REPRINT_INT);
        let mut wtr = create_writer(&path)?;
        Self::reprint_headers(&mut wtr, &path, &["PROTID", "GENEID"], names, "INT");

        for protein in proteins {
            let mut record = ByteRecord::new();
            record.push_field(protein.protein_id.as_bytes());
            record.push_field(protein.gene_names.as_bytes());
            for name in names {
                let intensity = get_intensity(&protein.razor_intensity, name);
                record.push_field(format!("{:.6}", intensity).as_bytes());
            }
            write_row(&mut wtr, &record, &path);
        }
        flush(&mut wtr, &path);
        Ok(path)
    }
}
