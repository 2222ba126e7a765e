use super::input::Settings;
use abacus_core::annotation::SampleLabels;
use abacus_core::combined::{self, CombinedPeptide, CombinedProtein};
use abacus_core::evidence::{self, Experiment};
use abacus_core::identification::{self, ProteinInference};
use abacus_core::{fdr, merge, COMBINED_FDR};
use anyhow::Context;
use log::info;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub struct Runner {
    pub parameters: Settings,
    start: Instant,
}

/// Experiments in report column order, with the sample labels of all of them
pub struct Experiments {
    pub list: Vec<Experiment>,
    pub labels: SampleLabels,
}

impl Experiments {
    pub fn names(&self) -> Vec<String> {
        self.list.iter().map(|e| e.name.clone()).collect()
    }
}

impl Runner {
    pub fn new(parameters: Settings) -> anyhow::Result<Self> {
        for dir in [&parameters.work_directory, &parameters.output_directory] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory `{}`", dir.display()))?;
        }
        Ok(Runner {
            parameters,
            start: Instant::now(),
        })
    }

    // Create a path for `file_name` in the work directory
    pub(crate) fn make_path<S: AsRef<Path>>(&self, file_name: S) -> PathBuf {
        self.parameters.work_directory.join(file_name)
    }

    // Where a file in the work directory is duplicated to, if anywhere
    fn output_copy(&self, path: &Path) -> Option<PathBuf> {
        let same = self.parameters.output_directory == self.parameters.work_directory;
        match (same, path.file_name()) {
            (false, Some(name)) => Some(self.parameters.output_directory.join(name)),
            _ => None,
        }
    }

    /// Duplicate a finished report into the output directory
    pub(crate) fn publish(&mut self, path: PathBuf) -> anyhow::Result<()> {
        if let Some(copy) = self.output_copy(&path) {
            std::fs::copy(&path, &copy).with_context(|| {
                format!("Failed to copy `{}` to `{}`", path.display(), copy.display())
            })?;
            self.parameters.output_paths.push(copy.display().to_string());
        }
        self.parameters.output_paths.push(path.display().to_string());
        Ok(())
    }

    /// Load every experiment, one at a time, in sorted name order
    pub fn load_experiments(&self) -> anyhow::Result<Experiments> {
        let sorted = evidence::sort_experiments(&self.parameters.experiments)?;

        let mut list = Vec::with_capacity(sorted.len());
        let mut labels = SampleLabels::default();
        for (name, path) in sorted {
            let experiment = Experiment::load(&path, &self.parameters.decoy_tag)
                .with_context(|| format!("Failed to load experiment `{}`", name))?;
            labels.extend(experiment.labels.clone());
            list.push(experiment);
        }
        Ok(Experiments { list, labels })
    }

    /// Build the canonical protein list from the pooled protein identification
    pub fn protein_identities(&self) -> anyhow::Result<Vec<CombinedProtein>> {
        let params = &self.parameters;
        let fasta = params
            .fasta
            .as_ref()
            .context("`fasta` must be provided for the protein report")?;
        let database = abacus_core::read_fasta(fasta, &params.decoy_tag)
            .with_context(|| format!("Failed to read database from `{}`", fasta.display()))?;
        info!(
            "restored {} database records ({} targets)",
            database.records.len(),
            database.targets().count()
        );

        info!("processing combined file");
        let mut inference = ProteinInference::load(&params.combined_protein, &params.decoy_tag)?;

        inference.mark_unique_peptides();
        inference.promote_protein_ids();
        if params.picked {
            info!("applying picked FDR");
            fdr::picked_fdr(&mut inference);
        }
        if params.razor {
            info!("assigning razor peptides");
            fdr::razor_filter(&mut inference);
        }

        let proteins = fdr::protein_fdr_filter(
            inference,
            COMBINED_FDR,
            params.peptide_probability,
            params.protein_probability,
            params.razor,
        );
        Ok(combined::resolve_proteins(
            proteins,
            &database,
            &params.decoy_tag,
        ))
    }

    /// Build the canonical peptide list from the pooled PSMs
    pub fn peptide_identities(&self) -> anyhow::Result<Vec<CombinedPeptide>> {
        info!("processing combined file");
        let psms = identification::load_psms(&self.parameters.combined_peptide)?;
        let psms = fdr::peptide_fdr_filter(
            fdr::unique_peptides(psms),
            COMBINED_FDR,
            &self.parameters.decoy_tag,
        );
        Ok(combined::resolve_peptides(psms, &self.parameters.decoy_tag))
    }

    pub fn protein_level(
        &self,
        mut proteins: Vec<CombinedProtein>,
        experiments: &Experiments,
    ) -> Vec<CombinedProtein> {
        info!("processing spectral counts");
        for experiment in &experiments.list {
            merge::merge_protein_experiment(
                &mut proteins,
                experiment,
                &self.parameters.decoy_tag,
                self.parameters.labels,
            );
        }
        proteins.sort_by_key(|p| p.group_number);
        proteins
    }

    pub fn peptide_level(
        &self,
        mut peptides: Vec<CombinedPeptide>,
        experiments: &Experiments,
    ) -> Vec<CombinedPeptide> {
        info!("processing peptide evidence");
        for experiment in &experiments.list {
            merge::merge_peptides(&mut peptides, experiment);
        }
        peptides.sort_by(|a, b| a.sequence.cmp(&b.sequence));
        peptides
    }

    pub fn run(mut self) -> anyhow::Result<Settings> {
        // Every input is checked before anything is written
        evidence::sort_experiments(&self.parameters.experiments)?;
        let proteins = match self.parameters.protein {
            true => Some(self.protein_identities()?),
            false => None,
        };
        let peptides = match self.parameters.peptide {
            true => Some(self.peptide_identities()?),
            false => None,
        };

        info!("restoring experiment results");
        let experiments = self.load_experiments()?;
        let names = experiments.names();

        if let Some(proteins) = proteins {
            let proteins = self.protein_level(proteins, &experiments);
            let path = self.write_combined_proteins(&proteins, &names, &experiments.labels)?;
            self.publish(path)?;

            if self.parameters.reprint {
                let path = self.write_reprint_spc(&proteins, &names)?;
                self.publish(path)?;
                let path = self.write_reprint_int(&proteins, &names)?;
                self.publish(path)?;
            }
        }

        if let Some(peptides) = peptides {
            let peptides = self.peptide_level(peptides, &experiments);
            let path = self.write_combined_peptides(&peptides, &names)?;
            self.publish(path)?;
        }

        // The summary lists itself, so its paths are recorded before writing
        let path = self.make_path("abacus.json");
        let copy = self.output_copy(&path);
        if let Some(copy) = &copy {
            self.parameters.output_paths.push(copy.display().to_string());
        }
        self.parameters
            .output_paths
            .push(path.display().to_string());
        println!("{}", serde_json::to_string_pretty(&self.parameters)?);

        let bytes = serde_json::to_vec_pretty(&self.parameters)?;
        for target in std::iter::once(&path).chain(copy.as_ref()) {
            std::fs::write(target, &bytes)
                .with_context(|| format!("Failed to write `{}`", target.display()))?;
        }

        let run_time = (Instant::now() - self.start).as_secs();
        info!("finished in {}s", run_time);
        Ok(self.parameters)
    }
}
