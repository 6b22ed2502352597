//! Per-gene, per-condition result tables.

use crate::error::{RapError, Result};
use nalgebra::DMatrix;
use rust_xlsxwriter::Workbook;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A table with one row per gene and one column per condition.
///
/// Produced by the post-hoc tester (scores) and the replicate averager (means).
#[derive(Debug, Clone)]
pub struct ConditionTable {
    /// What the cell values mean (e.g. `tukey_score`, `mean_intensity`).
    pub value_name: String,
    /// Gene names (row keys).
    pub gene_names: Vec<String>,
    /// Condition names (column keys).
    pub conditions: Vec<String>,
    /// Values (genes × conditions).
    pub values: DMatrix<f64>,
}

impl ConditionTable {
    /// Create a new table, checking dimensions.
    pub fn new(
        value_name: &str,
        gene_names: Vec<String>,
        conditions: Vec<String>,
        values: DMatrix<f64>,
    ) -> Result<Self> {
        if values.nrows() != gene_names.len() {
            return Err(RapError::DimensionMismatch {
                expected: values.nrows(),
                actual: gene_names.len(),
            });
        }
        if values.ncols() != conditions.len() {
            return Err(RapError::DimensionMismatch {
                expected: values.ncols(),
                actual: conditions.len(),
            });
        }
        Ok(Self {
            value_name: value_name.to_string(),
            gene_names,
            conditions,
            values,
        })
    }

    /// Number of genes.
    pub fn n_genes(&self) -> usize {
        self.gene_names.len()
    }

    /// Number of conditions.
    pub fn n_conditions(&self) -> usize {
        self.conditions.len()
    }

    /// Value for a gene row and condition column.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[(row, col)]
    }

    /// Column index of a condition.
    pub fn condition_index(&self, condition: &str) -> Option<usize> {
        self.conditions.iter().position(|c| c == condition)
    }

    /// Value for a named gene and condition (first matching gene row).
    pub fn value(&self, gene: &str, condition: &str) -> Option<f64> {
        let row = self.gene_names.iter().position(|g| g == gene)?;
        let col = self.condition_index(condition)?;
        Some(self.get(row, col))
    }

    /// All values of one condition column.
    pub fn column(&self, condition: &str) -> Option<Vec<f64>> {
        let col = self.condition_index(condition)?;
        Some(self.values.column(col).iter().copied().collect())
    }

    /// Genes with a nonzero, non-NaN value in the given condition.
    pub fn nonzero_genes(&self, condition: &str) -> Vec<&str> {
        let Some(col) = self.condition_index(condition) else {
            return Vec::new();
        };
        self.gene_names
            .iter()
            .enumerate()
            .filter(|(row, _)| {
                let v = self.get(*row, col);
                v != 0.0 && !v.is_nan()
            })
            .map(|(_, g)| g.as_str())
            .collect()
    }

    /// Write the table to a TSV file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        write!(writer, "gene_name")?;
        for condition in &self.conditions {
            write!(writer, "\t{}", condition)?;
        }
        writeln!(writer)?;

        for (row, gene) in self.gene_names.iter().enumerate() {
            write!(writer, "{}", gene)?;
            for col in 0..self.n_conditions() {
                write!(writer, "\t{}", self.get(row, col))?;
            }
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Write the table to an Excel workbook.
    ///
    /// Non-finite values are written as text since workbooks cannot store them.
    pub fn to_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.value_name)?;

        worksheet.write_string(0, 0, "Gene names")?;
        for (col, condition) in self.conditions.iter().enumerate() {
            worksheet.write_string(0, xlsx_col(col + 1)?, condition)?;
        }

        for (row, gene) in self.gene_names.iter().enumerate() {
            let xrow = xlsx_row(row + 1)?;
            worksheet.write_string(xrow, 0, gene)?;
            for col in 0..self.n_conditions() {
                let value = self.get(row, col);
                let xcol = xlsx_col(col + 1)?;
                if value.is_finite() {
                    worksheet.write_number(xrow, xcol, value)?;
                } else {
                    worksheet.write_string(xrow, xcol, value.to_string())?;
                }
            }
        }

        workbook.save(path.as_ref())?;
        Ok(())
    }

    /// Write the table, choosing the format from the file extension.
    ///
    /// `.xlsx` produces a workbook; any other extension produces TSV.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let is_xlsx = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
        if is_xlsx {
            self.to_xlsx(path)
        } else {
            self.to_tsv(path)
        }
    }
}

fn xlsx_row(row: usize) -> Result<u32> {
    u32::try_from(row)
        .map_err(|_| RapError::InvalidParameter(format!("Row {} exceeds workbook limits", row)))
}

fn xlsx_col(col: usize) -> Result<u16> {
    u16::try_from(col)
        .map_err(|_| RapError::InvalidParameter(format!("Column {} exceeds workbook limits", col)))
}
