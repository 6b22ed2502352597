//! Import of RAP-MS protein group tables.

use crate::data::{parse_intensity, IntensityMatrix, SampleLayout};
use crate::error::{RapError, Result};
use crate::filter::{filter_contaminants, filter_zero_sum, Species};
use log::{debug, info};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

fn default_protein_id_column() -> String {
    "Protein IDs".to_string()
}

fn default_gene_name_column() -> String {
    "Gene names".to_string()
}

/// Which columns to import from a protein group table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Measurement prefix of the sample columns (e.g. `LFQ intensity`).
    pub feature: String,
    /// RNA targets / conditions, in output column order.
    pub conditions: Vec<String>,
    /// Replicates per condition.
    pub replicates: usize,
    /// Species, selecting the background gene-name convention.
    #[serde(default)]
    pub species: Species,
    /// Header of the protein identifier column.
    #[serde(default = "default_protein_id_column")]
    pub protein_id_column: String,
    /// Header of the gene name column.
    #[serde(default = "default_gene_name_column")]
    pub gene_name_column: String,
}

impl ImportConfig {
    /// Create a config with the default MaxQuant column headers.
    pub fn new(feature: &str, conditions: &[&str], replicates: usize, species: Species) -> Self {
        Self {
            feature: feature.to_string(),
            conditions: conditions.iter().map(|s| s.to_string()).collect(),
            replicates,
            species,
            protein_id_column: default_protein_id_column(),
            gene_name_column: default_gene_name_column(),
        }
    }

    /// Expected sample column names, condition-major.
    pub fn sample_columns(&self) -> Vec<String> {
        let feature = (!self.feature.is_empty()).then_some(self.feature.as_str());
        SampleLayout::expected(feature, &self.conditions, self.replicates)
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.replicates == 0 {
            return Err(RapError::InvalidParameter(
                "Replicate count must be positive".to_string(),
            ));
        }
        if self.conditions.is_empty() {
            return Err(RapError::InvalidParameter(
                "At least one condition is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Import a tab-separated RAP-MS table and remove background.
///
/// Only the protein identifier, gene name and the expected
/// `feature condition_replicate` columns are read. Contaminants are removed,
/// the identifier column is dropped, and proteins left without any signal
/// in the selected samples are removed.
///
/// # Errors
/// Fails with `MissingColumn` if any expected column is absent, and with
/// `Io`/`Csv` errors if the file cannot be read.
pub fn import_rap<P: AsRef<Path>>(path: P, config: &ImportConfig) -> Result<IntensityMatrix> {
    config.validate()?;
    let path = path.as_ref();
    info!("Importing RAP-MS data from {:?}", path);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)?;

    let header = reader.headers()?.clone();
    let index: HashMap<&str, usize> = header.iter().enumerate().map(|(i, h)| (h, i)).collect();
    let lookup = |name: &str| {
        index
            .get(name)
            .copied()
            .ok_or_else(|| RapError::MissingColumn(name.to_string()))
    };

    let id_col = lookup(config.protein_id_column.as_str())?;
    let gene_col = lookup(config.gene_name_column.as_str())?;
    let sample_ids = config.sample_columns();
    let sample_cols = sample_ids
        .iter()
        .map(|s| lookup(s.as_str()))
        .collect::<Result<Vec<usize>>>()?;
    debug!("Selected {} sample columns", sample_cols.len());

    let mut protein_ids = Vec::new();
    let mut gene_names = Vec::new();
    let mut values = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        protein_ids.push(record.get(id_col).unwrap_or_default().to_string());
        gene_names.push(record.get(gene_col).unwrap_or_default().trim().to_string());
        for (&col, sample_id) in sample_cols.iter().zip(&sample_ids) {
            values.push(parse_intensity(record.get(col).unwrap_or_default(), row_idx, sample_id)?);
        }
    }
    info!("Read {} protein groups", gene_names.len());

    let data = DMatrix::from_row_slice(gene_names.len(), sample_ids.len(), &values);
    let raw = IntensityMatrix::new(data, gene_names, sample_ids)?.with_protein_ids(protein_ids)?;

    let filtered = filter_contaminants(&raw, config.species)?.without_protein_ids();
    filter_zero_sum(&filtered)
}
