//! Removal of common contaminants and non-specific background proteins.

use crate::data::IntensityMatrix;
use crate::error::{RapError, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tag marking annotated contaminants in the protein identifier field.
pub const CONTAMINANT_TAG: &str = "CON";

/// Background gene-name fragments using mouse capitalization.
const MOUSE_BACKGROUND: [&str; 7] = ["Krt", "Dsp", "Act", "TUB", "Tub", "Lyz", "Jup"];

/// Organism, which decides the gene-name case convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    /// Mouse gene symbols (e.g. `Krt18`).
    #[default]
    Mouse,
    /// Human gene symbols, all upper case (e.g. `KRT18`).
    Human,
}

impl Species {
    /// Apply this species' capitalization to a mouse-style gene symbol.
    pub fn gene_case(&self, symbol: &str) -> String {
        match self {
            Species::Mouse => symbol.to_string(),
            Species::Human => symbol.to_uppercase(),
        }
    }

    /// Background gene-name fragments for this species.
    pub fn background(&self) -> Vec<String> {
        MOUSE_BACKGROUND.iter().map(|s| self.gene_case(s)).collect()
    }

    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Species::Mouse => "mouse",
            Species::Human => "human",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = RapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mouse" => Ok(Species::Mouse),
            "human" => Ok(Species::Human),
            other => Err(RapError::InvalidParameter(format!(
                "Unknown species '{}' (expected 'mouse' or 'human')",
                other
            ))),
        }
    }
}

/// Check a single protein against the contaminant rules.
///
/// A protein is background if its identifier carries the contaminant tag,
/// its gene name is missing, or its gene name contains any background
/// fragment. Matching is case-sensitive substring matching.
pub fn is_contaminant(protein_id: Option<&str>, gene_name: &str, background: &[String]) -> bool {
    if protein_id.is_some_and(|id| id.contains(CONTAMINANT_TAG)) {
        return true;
    }
    if gene_name.trim().is_empty() {
        return true;
    }
    background.iter().any(|frag| gene_name.contains(frag.as_str()))
}

/// Remove contaminants and background proteins.
///
/// Rows are never reordered. The identifier rule only applies while protein
/// identifiers are attached to the matrix.
///
/// # Arguments
/// * `matrix` - Intensities with gene names (and usually protein identifiers)
/// * `species` - Selects the background fragment capitalization
///
/// # Returns
/// A new IntensityMatrix without contaminant rows.
pub fn filter_contaminants(matrix: &IntensityMatrix, species: Species) -> Result<IntensityMatrix> {
    let background = species.background();
    let protein_ids = matrix.protein_ids();

    let keep_indices: Vec<usize> = (0..matrix.n_proteins())
        .filter(|&row| {
            let id = protein_ids.map(|ids| ids[row].as_str());
            let gene = &matrix.gene_names()[row];
            let drop = is_contaminant(id, gene, &background);
            if drop {
                debug!("Removing background protein '{}'", gene);
            }
            !drop
        })
        .collect();

    info!(
        "Contaminant filter ({}): kept {} of {} proteins",
        species,
        keep_indices.len(),
        matrix.n_proteins()
    );

    matrix.subset_proteins(&keep_indices)
}
