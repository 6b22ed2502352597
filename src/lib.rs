//! RAP-MS Analysis Library
//!
//! This library provides composable primitives for analysing RNA affinity
//! purification mass spectrometry (RAP-MS) proteomics data: which proteins
//! are specifically enriched by which RNA bait.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (IntensityMatrix, SampleLayout, ConditionTable)
//! - **filter**: Contaminant and background removal, zero-signal filtering
//! - **import**: Loading of tab-separated protein group tables
//! - **test**: One-way ANOVA screening and Tukey HSD post-hoc scoring
//! - **summarize**: Replicate averaging
//! - **reference**: Literature interactor sets per RNA target
//! - **pipeline**: Configuration and execution of the full analysis
//!
//! # Example
//!
//! ```no_run
//! use rapms::prelude::*;
//!
//! let config = ImportConfig::new("LFQ intensity", &["U1", "U2", "U6"], 3, Species::Mouse);
//! let data = import_rap("proteinGroups.txt", &config).unwrap();
//!
//! let screen = screen_anova(&data, 3, Threshold::Alpha(0.05)).unwrap();
//! let scores = test_tukey_export(&screen, 0.05, "tukey_scores.xlsx").unwrap();
//! let means = average_replicates(&screen.matrix, 3).unwrap();
//! ```

pub mod data;
pub mod error;
pub mod filter;
pub mod import;
pub mod pipeline;
pub mod reference;
pub mod summarize;
pub mod test;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::data::{ConditionGroup, ConditionTable, IntensityMatrix, SampleLayout, SampleName};
    pub use crate::error::{RapError, Result};
    pub use crate::filter::{filter_contaminants, filter_zero_sum, is_contaminant, Species};
    pub use crate::import::{import_rap, ImportConfig};
    pub use crate::pipeline::{run_rap, RapConfig, RapOutput, RunSummary};
    pub use crate::reference::{Recovery, ReferenceSet, ReferenceSets, GO_SPLICE_TARGET};
    pub use crate::summarize::average_replicates;
    pub use crate::test::{
        one_way_anova, screen_anova, studentized_range_cdf, studentized_range_sf, test_tukey,
        test_tukey_export, tukey_hsd, AnovaResult, AnovaScreen, Threshold, TukeyHsd,
    };
}
