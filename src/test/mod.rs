//! Statistical hypothesis testing across RNA-bait conditions.

pub mod anova;

pub use anova::{one_way_anova, screen_anova, AnovaResult, AnovaScreen, Threshold, P_VALUE_COLUMN};
pub use studentized_range::{studentized_range_cdf, studentized_range_sf};
pub use tukey::{test_tukey, test_tukey_export, tukey_hsd, TukeyHsd};
