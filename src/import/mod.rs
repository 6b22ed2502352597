//! Importers for RAP-MS quantification tables.

pub mod rap;

pub use rap::{import_rap, ImportConfig};
