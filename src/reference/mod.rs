//! Curated reference interactor sets per RNA target.
//!
//! Literature-known protein partners of the RNA baits profiled by RAP-MS,
//! plus an optional Gene Ontology splicing gene list. A [`ReferenceSets`]
//! value is built once and passed explicitly to whatever consumes it.

use crate::data::ConditionTable;
use crate::error::{RapError, Result};
use crate::filter::Species;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Target name of the Gene Ontology splicing set.
pub const GO_SPLICE_TARGET: &str = "GO Splice";

/// Built-in interactor lists (mouse capitalization).
const BUILTIN: &[(&str, &str, &[&str])] = &[
    (
        "XIST",
        "McHugh et al., Nature 2015",
        &["Spen", "Rbm15", "Myef2", "Celf1", "Hnrnpc", "Lbr", "Hnrnpu", "Raly", "Hnrnpm", "Ptbp1"],
    ),
    (
        "7SL",
        "Luirink and Sinning, BBA-MCR 2004",
        &["Srp9", "Srp14", "Srp19", "Srp68", "Srp72", "Srp54", "Srpr"],
    ),
    (
        "RMRP",
        "Jarrous, Trends in Genetics 2017",
        &[
            "Pop1", "Pop4", "Rpp38", "Rpp29", "Rpp21", "Rpp40", "Rpp14", "Pop5", "Rpp30", "Rpp25",
            "Rpp20",
        ],
    ),
    (
        "U7",
        "Schumperli and Pillai, CMLS 2004",
        &["Lsm10", "Lsm11", "Snrpf", "Snrpb", "Snrpd3", "Snrpg", "Snrpe", "Zfp100", "Slbp"],
    ),
    (
        "7SK",
        "Brogie and Price, NAR 2017; Barrandon et al., MCB 2007",
        &["Hexim1", "Mepce", "Larp7", "Hnrnpq", "Hnrnpr", "Hnrnpa1", "Hnrnpa2", "Cdk9", "Cyct1"],
    ),
    (
        "U2",
        "Zhang et al., Nature 2020; Scofield and Lynch, MBE 2008",
        &[
            "Snrpa1", "Snrpb2", "Sf3a3", "Sf3b3", "Sf3b2", "Sf3b1", "Prp5", "Sf3b6", "Sf3b5",
            "Tat-sf1", "Sf3b4", "Sf3a2", "Sf3a1", "Snrpb", "Snrpd1", "Snrpd2", "Snrpd3", "Snrpg",
            "Snrpe", "Snrpf",
        ],
    ),
    (
        "U6",
        "Montemayor et al., Nature Communications 2018",
        &[
            "Lsm8", "Lsm2", "Lsm3", "Lsm6", "Lsm5", "Lsm7", "Lsm4", "Prp24", "Pat1", "Prpf8",
            "Prpf3", "Prpf6", "Prpf4", "Rbm22",
        ],
    ),
    (
        "U1",
        "Kondo et al., eLife 2015",
        &[
            "Snrpc", "Snrpa", "Snrnp70", "Snrpb", "Snrpd1", "Snrpd2", "Snrpd3", "Snrpg", "Snrpe",
            "Snrpf",
        ],
    ),
];

/// Known interactors of one RNA target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSet {
    /// RNA target name, matching condition names.
    pub target: String,
    /// Literature source.
    pub source: String,
    /// Gene symbols in the species' capitalization.
    pub genes: Vec<String>,
}

impl ReferenceSet {
    /// Whether a (possibly `;`-joined) gene name field names a member.
    pub fn contains(&self, gene_field: &str) -> bool {
        gene_field
            .split(';')
            .map(str::trim)
            .any(|g| self.genes.iter().any(|known| known == g))
    }
}

/// Known interactors recovered for one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recovery {
    /// RNA target.
    pub target: String,
    /// Size of the reference set.
    pub n_known: usize,
    /// Gene names of the table rows that matched the set with a nonzero value.
    pub recovered: Vec<String>,
}

impl Recovery {
    /// Recovered fraction of the reference set.
    pub fn fraction(&self) -> f64 {
        if self.n_known == 0 {
            0.0
        } else {
            self.recovered.len() as f64 / self.n_known as f64
        }
    }
}

/// Immutable collection of reference sets for one species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceSets {
    species: Species,
    sets: Vec<ReferenceSet>,
}

#[derive(Debug, Deserialize)]
struct GoRecord {
    #[serde(rename = "Symbol")]
    symbol: String,
}

impl ReferenceSets {
    /// The built-in literature sets in the species' capitalization.
    pub fn builtin(species: Species) -> Self {
        let sets = BUILTIN
            .iter()
            .map(|(target, source, genes)| {
                let mut cased: Vec<String> = Vec::with_capacity(genes.len());
                for g in genes.iter().map(|g| species.gene_case(g)) {
                    if !cased.contains(&g) {
                        cased.push(g);
                    }
                }
                ReferenceSet {
                    target: target.to_string(),
                    source: source.to_string(),
                    genes: cased,
                }
            })
            .collect();
        Self { species, sets }
    }

    /// Add the Gene Ontology splicing set from a CSV with a `Symbol` column.
    pub fn with_go_splice<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        if !reader.headers()?.iter().any(|h| h == "Symbol") {
            return Err(RapError::MissingColumn("Symbol".to_string()));
        }

        let mut genes = Vec::new();
        for record in reader.deserialize() {
            let record: GoRecord = record?;
            let symbol = self.species.gene_case(record.symbol.trim());
            if !symbol.is_empty() && !genes.contains(&symbol) {
                genes.push(symbol);
            }
        }

        self.sets.retain(|s| s.target != GO_SPLICE_TARGET);
        self.sets.push(ReferenceSet {
            target: GO_SPLICE_TARGET.to_string(),
            source: format!("Gene Ontology splicing terms ({})", path.as_ref().display()),
            genes,
        });
        Ok(self)
    }

    /// Species of the gene symbols.
    pub fn species(&self) -> Species {
        self.species
    }

    /// Target names in order.
    pub fn targets(&self) -> Vec<&str> {
        self.sets.iter().map(|s| s.target.as_str()).collect()
    }

    /// Reference set for a target.
    pub fn get(&self, target: &str) -> Option<&ReferenceSet> {
        self.sets.iter().find(|s| s.target == target)
    }

    /// Known interactors of `target` with a nonzero value in the table's
    /// column of the same name.
    pub fn recovered(&self, table: &ConditionTable, target: &str) -> Option<Recovery> {
        let set = self.get(target)?;
        table.condition_index(target)?;
        let recovered = table
            .nonzero_genes(target)
            .into_iter()
            .filter(|g| set.contains(g))
            .map(String::from)
            .collect();
        Some(Recovery {
            target: target.to_string(),
            n_known: set.genes.len(),
            recovered,
        })
    }

    /// Recovery for every target that is also a table condition.
    pub fn recovery(&self, table: &ConditionTable) -> Vec<Recovery> {
        self.sets
            .iter()
            .filter_map(|s| self.recovered(table, &s.target))
            .collect()
    }
}
