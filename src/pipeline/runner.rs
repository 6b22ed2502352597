//! Pipeline runner chaining import, screening, post-hoc testing and averaging.

use crate::data::{ConditionTable, IntensityMatrix};
use crate::error::{RapError, Result};
use crate::filter::Species;
use crate::import::{import_rap, ImportConfig};
use crate::reference::{Recovery, ReferenceSets};
use crate::summarize::average_replicates;
use crate::test::{screen_anova, test_tukey_export, AnovaScreen, Threshold};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

fn default_posthoc_alpha() -> f64 {
    0.05
}

/// Configuration of a full RAP-MS analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RapConfig {
    /// Name of the analysis.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Tab-separated protein group table.
    pub input: PathBuf,
    /// Column selection and contaminant filtering.
    pub import: ImportConfig,
    /// ANOVA screening cutoff (`0.05` by default, or `disabled`).
    #[serde(default)]
    pub anova_threshold: Threshold,
    /// Pairwise significance level for Tukey HSD.
    #[serde(default = "default_posthoc_alpha")]
    pub posthoc_alpha: f64,
    /// Where to write post-hoc scores (`.xlsx` or TSV).
    pub posthoc_output: PathBuf,
    /// Where to write replicate means of screened proteins, if anywhere.
    #[serde(default)]
    pub averages_output: Option<PathBuf>,
    /// Gene Ontology splicing CSV (`Symbol` column) for the reference sets.
    #[serde(default)]
    pub go_splice: Option<PathBuf>,
}

impl RapConfig {
    /// Create a config with default thresholds.
    pub fn new(name: &str, input: &Path, import: ImportConfig, posthoc_output: &Path) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            input: input.to_path_buf(),
            import,
            anova_threshold: Threshold::default(),
            posthoc_alpha: default_posthoc_alpha(),
            posthoc_output: posthoc_output.to_path_buf(),
            averages_output: None,
            go_splice: None,
        }
    }

    /// Set the ANOVA screening cutoff.
    pub fn anova_threshold(mut self, threshold: Threshold) -> Self {
        self.anova_threshold = threshold;
        self
    }

    /// Set the Tukey HSD significance level.
    pub fn posthoc_alpha(mut self, alpha: f64) -> Self {
        self.posthoc_alpha = alpha;
        self
    }

    /// Also write replicate means of the screened proteins.
    pub fn averages_output(mut self, path: &Path) -> Self {
        self.averages_output = Some(path.to_path_buf());
        self
    }

    /// Add the Gene Ontology splicing list to the reference sets.
    pub fn go_splice(mut self, path: &Path) -> Self {
        self.go_splice = Some(path.to_path_buf());
        self
    }

    /// A template configuration for a mouse snRNA experiment.
    pub fn example() -> Self {
        let import = ImportConfig::new(
            "LFQ intensity",
            &["7SK", "U1", "U2", "U6", "U7"],
            3,
            Species::Mouse,
        );
        let mut config = Self::new(
            "snrna_rapms",
            Path::new("proteinGroups.txt"),
            import,
            Path::new("tukey_scores.xlsx"),
        )
        .averages_output(Path::new("replicate_means.tsv"));
        config.description = Some("RAP-MS of mouse snRNAs".to_string());
        config
    }

    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(RapError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(RapError::from)
    }

    /// Load from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }
}

/// Everything produced by a run.
#[derive(Debug, Clone)]
pub struct RapOutput {
    /// Name of the run.
    pub name: String,
    /// Imported, background-filtered intensities.
    pub imported: IntensityMatrix,
    /// ANOVA-screened proteins.
    pub screen: AnovaScreen,
    /// Tukey HSD scores (genes × conditions).
    pub posthoc: ConditionTable,
    /// Replicate means of the screened proteins.
    pub averages: ConditionTable,
    /// Recovery of known interactors among credited proteins.
    pub recovery: Vec<Recovery>,
}

impl RapOutput {
    /// Counts per stage.
    pub fn summary(&self) -> RunSummary {
        let credited = self
            .posthoc
            .conditions
            .iter()
            .map(|c| ConditionCount {
                condition: c.clone(),
                n_credited: self.posthoc.nonzero_genes(c).len(),
            })
            .collect();
        RunSummary {
            name: self.name.clone(),
            n_imported: self.imported.n_proteins(),
            n_screened: self.screen.len(),
            credited,
            recovery: self.recovery.clone(),
        }
    }
}

/// Number of proteins credited to one condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionCount {
    /// Condition name.
    pub condition: String,
    /// Proteins with a nonzero post-hoc score for the condition.
    pub n_credited: usize,
}

/// Summary statistics for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Name of the run.
    pub name: String,
    /// Proteins left after contaminant and zero-signal filtering.
    pub n_imported: usize,
    /// Proteins passing the ANOVA screen.
    pub n_screened: usize,
    /// Credited proteins per condition.
    pub credited: Vec<ConditionCount>,
    /// Recovery of known interactors per target.
    pub recovery: Vec<Recovery>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RAP-MS run '{}'", self.name)?;
        writeln!(f, "  Proteins after filtering: {}", self.n_imported)?;
        writeln!(f, "  Proteins passing ANOVA:   {}", self.n_screened)?;
        writeln!(f, "  Credited by Tukey HSD:")?;
        for c in &self.credited {
            writeln!(f, "    {:<10} {}", c.condition, c.n_credited)?;
        }
        if !self.recovery.is_empty() {
            writeln!(f, "  Known interactors recovered:")?;
            for r in &self.recovery {
                writeln!(
                    f,
                    "    {:<10} {}/{} ({:.1}%)",
                    r.target,
                    r.recovered.len(),
                    r.n_known,
                    r.fraction() * 100.0
                )?;
            }
        }
        Ok(())
    }
}

fn stage<T>(name: &str, result: Result<T>) -> Result<T> {
    result.map_err(|e| RapError::Pipeline(format!("{} failed: {}", name, e)))
}

/// Run the full analysis described by `config`.
///
/// Import → ANOVA screen → Tukey HSD (written to `posthoc_output`) →
/// replicate means of the screened proteins, followed by recovery of known
/// interactors per condition.
pub fn run_rap(config: &RapConfig) -> Result<RapOutput> {
    info!("Running RAP-MS analysis '{}'", config.name);

    let mut references = ReferenceSets::builtin(config.import.species);
    if let Some(go) = &config.go_splice {
        references = stage("Loading GO splicing list", references.with_go_splice(go))?;
    }

    let imported = stage("Import", import_rap(&config.input, &config.import))?;
    let screen = stage(
        "ANOVA screen",
        screen_anova(&imported, config.import.replicates, config.anova_threshold),
    )?;
    let posthoc = stage(
        "Tukey HSD",
        test_tukey_export(&screen, config.posthoc_alpha, &config.posthoc_output),
    )?;
    let averages = stage(
        "Replicate averaging",
        average_replicates(&screen.matrix, config.import.replicates),
    )?;
    if let Some(path) = &config.averages_output {
        info!("Writing replicate means to {:?}", path);
        stage("Writing averages", averages.write(path))?;
    }

    let recovery = references.recovery(&posthoc);

    Ok(RapOutput {
        name: config.name.clone(),
        imported,
        screen,
        posthoc,
        averages,
        recovery,
    })
}
