use anyhow::{ensure, Context};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Serialize, Clone, Debug)]
/// Actual run parameters - may include overrides or default values not set by user
pub struct Settings {
    pub version: String,
    pub decoy_tag: String,
    pub plex: String,
    pub protein_probability: f64,
    pub peptide_probability: f64,

    pub protein: bool,
    pub peptide: bool,
    pub razor: bool,
    pub picked: bool,
    pub unique_only: bool,
    pub labels: bool,
    pub reprint: bool,
    pub full: bool,

    pub fasta: Option<PathBuf>,
    pub combined_protein: PathBuf,
    pub combined_peptide: PathBuf,
    pub experiments: Vec<PathBuf>,
    pub work_directory: PathBuf,
    pub output_directory: PathBuf,
    pub output_paths: Vec<String>,
}

#[derive(Deserialize, Default, Debug)]
/// Input parameters deserialized from JSON file
pub struct Input {
    decoy_tag: Option<String>,
    plex: Option<String>,
    protein_probability: Option<f64>,
    peptide_probability: Option<f64>,

    protein: Option<bool>,
    peptide: Option<bool>,
    razor: Option<bool>,
    picked: Option<bool>,
    unique_only: Option<bool>,
    labels: Option<bool>,
    reprint: Option<bool>,
    full: Option<bool>,

    fasta: Option<String>,
    combined_protein: Option<String>,
    combined_peptide: Option<String>,
    experiments: Option<Vec<String>>,
    work_directory: Option<String>,
    output_directory: Option<String>,
}

/// Boolean command line switches, paired with the setting they turn on
const TOGGLES: [&str; 8] = [
    "protein",
    "peptide",
    "razor",
    "picked",
    "uniqueonly",
    "labels",
    "reprint",
    "full",
];

impl Input {
    pub fn from_arguments(matches: ArgMatches) -> anyhow::Result<Self> {
        let path = matches
            .get_one::<String>("parameters")
            .context("missing parameter file")?;
        let mut input = Input::load(path)
            .with_context(|| format!("Failed to read parameters from `{path}`"))?;

        // Handle JSON configuration overrides
        if let Some(output_directory) = matches.get_one::<String>("output_directory") {
            log::trace!("overriding `output_directory` parameter.");
            input.output_directory = Some(output_directory.into());
        }
        if let Some(fasta) = matches.get_one::<String>("fasta") {
            log::trace!("overriding `fasta` parameter.");
            input.fasta = Some(fasta.into());
        }
        if let Some(experiments) = matches.get_many::<String>("experiments") {
            log::trace!("overriding `experiments` parameter.");
            input.experiments = Some(experiments.into_iter().map(|p| p.into()).collect());
        }
        if let Some(tag) = matches.get_one::<String>("tag") {
            log::trace!("overriding `decoy_tag` parameter.");
            input.decoy_tag = Some(tag.into());
        }
        if let Some(plex) = matches.get_one::<String>("plex") {
            log::trace!("overriding `plex` parameter.");
            input.plex = Some(plex.into());
        }
        if let Some(probability) = matches.get_one::<f64>("prtProb").copied() {
            log::trace!("overriding `protein_probability` parameter.");
            input.protein_probability = Some(probability);
        }
        if let Some(probability) = matches.get_one::<f64>("pepProb").copied() {
            log::trace!("overriding `peptide_probability` parameter.");
            input.peptide_probability = Some(probability);
        }

        // Switches can only turn a toggle on
        for toggle in TOGGLES {
            if matches.get_flag(toggle) {
                log::trace!("overriding `{}` parameter.", toggle);
                input.set_toggle(toggle);
            }
        }

        ensure!(
            input.experiments.as_ref().map_or(false, |e| !e.is_empty()),
            "`experiments` must be set. For more information try '--help'"
        );
        ensure!(
            !input.protein.unwrap_or(false) || input.fasta.is_some(),
            "`fasta` must be set for the protein report. For more information try '--help'"
        );

        Ok(input)
    }

    fn set_toggle(&mut self, toggle: &str) {
        let field = match toggle {
            "protein" => &mut self.protein,
            "peptide" => &mut self.peptide,
            "razor" => &mut self.razor,
            "picked" => &mut self.picked,
            "uniqueonly" => &mut self.unique_only,
            "labels" => &mut self.labels,
            "reprint" => &mut self.reprint,
            "full" => &mut self.full,
            _ => return,
        };
        *field = Some(true);
    }

    pub fn load<S: AsRef<Path>>(path: S) -> anyhow::Result<Self> {
        abacus_core::read_json(path).map_err(anyhow::Error::from)
    }

    fn check_probability(name: &str, value: f64) {
        if !(0.0..=1.0).contains(&value) {
            log::warn!("`{}` is outside of [0, 1]: {}", name, value);
        }
    }

    /// Resolve the parameters, relative paths are taken from the directory
    /// the program was invoked in
    pub fn build(self) -> anyhow::Result<Settings> {
        let base = std::env::current_dir()?;
        self.build_in(&base)
    }

    pub fn build_in(self, base: &Path) -> anyhow::Result<Settings> {
        let resolve = |path: &str| base.join(path);

        let experiments = self
            .experiments
            .context("`experiments` must be provided")?
            .iter()
            .map(|p| resolve(p))
            .collect::<Vec<_>>();
        ensure!(!experiments.is_empty(), "`experiments` must not be empty");

        let protein = self.protein.unwrap_or(false);
        let peptide = self.peptide.unwrap_or(false);
        if !protein && !peptide {
            log::warn!("neither the protein nor the peptide report was requested");
        }

        let fasta = self.fasta.as_deref().map(resolve);
        ensure!(
            !protein || fasta.is_some(),
            "`fasta` must be provided for the protein report"
        );

        let protein_probability = self.protein_probability.unwrap_or(0.9);
        let peptide_probability = self.peptide_probability.unwrap_or(0.5);
        Self::check_probability("protein_probability", protein_probability);
        Self::check_probability("peptide_probability", peptide_probability);

        let decoy_tag = self.decoy_tag.unwrap_or_else(|| "rev_".into());
        ensure!(!decoy_tag.is_empty(), "`decoy_tag` must not be empty");

        let output_directory = match self.output_directory {
            Some(path) => resolve(&path),
            None => base.to_path_buf(),
        };
        let work_directory = match self.work_directory {
            Some(path) => resolve(&path),
            None => output_directory.clone(),
        };

        Ok(Settings {
            version: clap::crate_version!().into(),
            decoy_tag,
            plex: self.plex.unwrap_or_else(|| "10".into()),
            protein_probability,
            peptide_probability,
            protein,
            peptide,
            razor: self.razor.unwrap_or(false),
            picked: self.picked.unwrap_or(false),
            unique_only: self.unique_only.unwrap_or(false),
            labels: self.labels.unwrap_or(false),
            reprint: self.reprint.unwrap_or(false),
            full: self.full.unwrap_or(false),
            fasta,
            combined_protein: resolve(
                self.combined_protein
                    .as_deref()
                    .unwrap_or("combined.prot.json"),
            ),
            combined_peptide: resolve(
                self.combined_peptide
                    .as_deref()
                    .unwrap_or("combined.pep.json"),
            ),
            experiments,
            work_directory,
            output_directory,
            output_paths: Vec::new(),
        })
    }
}
