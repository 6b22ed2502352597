//! Typed condition → replicate grouping of sample columns.
//!
//! Sample columns follow the naming convention `feature condition_replicate`
//! (e.g. `LFQ intensity XIST_2`). The feature prefix is optional. Instead of
//! re-splitting column names at every stage, the convention is parsed once
//! into a [`SampleLayout`] that maps each condition to the column indices of
//! its replicates, in replicate order.

use crate::error::{RapError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn sample_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:(?P<feature>.*) )?(?P<condition>[^ ]+)_(?P<replicate>\d+)$")
            .expect("sample name pattern is valid")
    })
}

/// A parsed sample column name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleName {
    /// Measurement prefix (e.g. `LFQ intensity`), if present.
    pub feature: Option<String>,
    /// RNA bait / condition name.
    pub condition: String,
    /// 1-based replicate index.
    pub replicate: usize,
}

impl SampleName {
    /// Build a sample name from its parts.
    pub fn new(feature: Option<&str>, condition: &str, replicate: usize) -> Self {
        Self {
            feature: feature.map(String::from),
            condition: condition.to_string(),
            replicate,
        }
    }

    /// The `condition_replicate` part of the name, without any feature prefix.
    pub fn short(&self) -> String {
        format!("{}_{}", self.condition, self.replicate)
    }
}

impl FromStr for SampleName {
    type Err = RapError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = sample_name_regex()
            .captures(s)
            .ok_or_else(|| RapError::InvalidSampleName(s.to_string()))?;
        let replicate: usize = caps["replicate"]
            .parse()
            .map_err(|_| RapError::InvalidSampleName(s.to_string()))?;
        if replicate == 0 {
            return Err(RapError::InvalidSampleName(s.to_string()));
        }
        Ok(Self {
            feature: caps.name("feature").map(|m| m.as_str().to_string()),
            condition: caps["condition"].to_string(),
            replicate,
        })
    }
}

impl fmt::Display for SampleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.feature {
            Some(feature) => write!(f, "{} {}", feature, self.short()),
            None => write!(f, "{}", self.short()),
        }
    }
}

/// One condition and the column indices of its replicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionGroup {
    /// Condition name.
    pub name: String,
    /// Column index of replicate 1..N, in order.
    pub columns: Vec<usize>,
}

/// Mapping of conditions to replicate columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleLayout {
    groups: Vec<ConditionGroup>,
    replicates: usize,
}

impl SampleLayout {
    /// Expected column names for the given conditions, condition-major.
    pub fn expected(feature: Option<&str>, conditions: &[String], replicates: usize) -> Vec<SampleName> {
        conditions
            .iter()
            .flat_map(|condition| {
                (1..=replicates).map(move |rep| SampleName::new(feature, condition, rep))
            })
            .collect()
    }

    /// Build a layout for explicitly named conditions.
    ///
    /// Every `feature condition_r` column for r in 1..=replicates must be present
    /// in `sample_ids`; the first missing one is reported.
    pub fn resolve(
        sample_ids: &[String],
        feature: Option<&str>,
        conditions: &[String],
        replicates: usize,
    ) -> Result<Self> {
        validate_replicates(replicates)?;
        if conditions.is_empty() {
            return Err(RapError::InvalidParameter(
                "At least one condition is required".to_string(),
            ));
        }

        let index: HashMap<&str, usize> = sample_ids
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_str(), i))
            .collect();

        let groups = conditions
            .iter()
            .map(|condition| {
                let columns = (1..=replicates)
                    .map(|rep| {
                        let name = SampleName::new(feature, condition, rep).to_string();
                        index
                            .get(name.as_str())
                            .copied()
                            .ok_or(RapError::MissingColumn(name))
                    })
                    .collect::<Result<Vec<usize>>>()?;
                Ok(ConditionGroup {
                    name: condition.clone(),
                    columns,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { groups, replicates })
    }

    /// Infer the layout from the column names themselves.
    ///
    /// Any feature prefix is ignored. Conditions are the distinct, sorted
    /// condition parts of the column names; each condition's replicate columns
    /// are then looked up by exact name, so column order does not matter.
    pub fn infer(sample_ids: &[String], replicates: usize) -> Result<Self> {
        validate_replicates(replicates)?;

        let parsed = sample_ids
            .iter()
            .map(|s| s.parse::<SampleName>())
            .collect::<Result<Vec<_>>>()?;

        let conditions: BTreeSet<&str> = parsed.iter().map(|s| s.condition.as_str()).collect();
        if conditions.is_empty() {
            return Err(RapError::EmptyData("No sample columns".to_string()));
        }

        let index: HashMap<String, usize> = parsed
            .iter()
            .enumerate()
            .map(|(i, s)| (s.short(), i))
            .collect();

        let groups = conditions
            .into_iter()
            .map(|condition| {
                let columns = (1..=replicates)
                    .map(|rep| {
                        let name = format!("{}_{}", condition, rep);
                        index
                            .get(&name)
                            .copied()
                            .ok_or(RapError::MissingColumn(name))
                    })
                    .collect::<Result<Vec<usize>>>()?;
                Ok(ConditionGroup {
                    name: condition.to_string(),
                    columns,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { groups, replicates })
    }

    /// Condition groups in layout order.
    pub fn groups(&self) -> &[ConditionGroup] {
        &self.groups
    }

    /// Condition names in layout order.
    pub fn conditions(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.name.clone()).collect()
    }

    /// Number of conditions.
    pub fn n_conditions(&self) -> usize {
        self.groups.len()
    }

    /// Replicates per condition.
    pub fn replicates(&self) -> usize {
        self.replicates
    }

    /// Split one row of values into per-condition replicate vectors.
    pub fn group_values(&self, row: &[f64]) -> Vec<Vec<f64>> {
        self.groups
            .iter()
            .map(|g| g.columns.iter().map(|&c| row[c]).collect())
            .collect()
    }
}

fn validate_replicates(replicates: usize) -> Result<()> {
    if replicates == 0 {
        return Err(RapError::InvalidParameter(
            "Replicate count must be positive".to_string(),
        ));
    }
    Ok(())
}
