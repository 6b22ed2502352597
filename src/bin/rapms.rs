//! rapms - RAP-MS analysis CLI
//!
//! Command-line interface for contaminant filtering, ANOVA screening,
//! Tukey HSD scoring and replicate averaging of RAP-MS data.
//!
//! Stages chain through files: `import` → `screen` → `tukey` / `average`.

use clap::{Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};
use rapms::data::IntensityMatrix;
use rapms::error::Result;
use rapms::filter::Species;
use rapms::import::{import_rap, ImportConfig};
use rapms::pipeline::{run_rap, RapConfig};
use rapms::summarize::average_replicates;
use rapms::test::{screen_anova, test_tukey_export, AnovaScreen, Threshold};
use std::path::PathBuf;

/// CLI-friendly species enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSpecies {
    /// Mouse gene symbols (Krt18)
    Mouse,
    /// Human gene symbols (KRT18)
    Human,
}

impl From<CliSpecies> for Species {
    fn from(species: CliSpecies) -> Self {
        match species {
            CliSpecies::Mouse => Species::Mouse,
            CliSpecies::Human => Species::Human,
        }
    }
}

/// RAP-MS proteomics analysis
#[derive(Parser)]
#[command(name = "rapms")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis from a YAML configuration file
    Run {
        /// Path to analysis configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Summary format: text, json, or yaml
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Import a protein group table and remove background
    Import {
        /// Tab-separated protein group table
        #[arg(short, long)]
        input: PathBuf,

        /// Sample column prefix (e.g. "LFQ intensity")
        #[arg(short, long)]
        feature: String,

        /// Conditions / RNA targets, comma separated
        #[arg(short = 'c', long, value_delimiter = ',', required = true)]
        conditions: Vec<String>,

        /// Replicates per condition
        #[arg(short, long)]
        replicates: usize,

        /// Species gene naming convention
        #[arg(short, long, value_enum, default_value = "mouse")]
        species: CliSpecies,

        /// Output path for the filtered table (TSV)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Screen an imported table with one-way ANOVA
    Screen {
        /// Imported table (TSV, as written by `import`)
        #[arg(short, long)]
        input: PathBuf,

        /// Replicates per condition
        #[arg(short, long)]
        replicates: usize,

        /// P-value cutoff (default: 0.05)
        #[arg(long, default_value = "0.05")]
        alpha: f64,

        /// Keep all proteins, only attach p-values
        #[arg(long)]
        no_filter: bool,

        /// Output path for screened table with p-values (TSV)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Score screened proteins per condition with Tukey HSD
    Tukey {
        /// Screened table with p-values (TSV, as written by `screen`)
        #[arg(short, long)]
        input: PathBuf,

        /// Replicates per condition
        #[arg(short, long)]
        replicates: usize,

        /// Pairwise significance level (default: 0.05)
        #[arg(long, default_value = "0.05")]
        alpha: f64,

        /// Output path (.xlsx or TSV)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Average replicate columns per condition
    Average {
        /// Table with condition_replicate columns (TSV, e.g. from `import` or `screen`)
        #[arg(short, long)]
        input: PathBuf,

        /// Replicates per condition
        #[arg(short, long)]
        replicates: usize,

        /// Output path (.xlsx or TSV)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write an example configuration file
    Example {
        /// Output path for the YAML configuration
        #[arg(short, long, default_value = "rapms.yaml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .parse_default_env()
        .init();

    let result = match cli.command {
        Commands::Run { config, format } => cmd_run(&config, &format),

        Commands::Import {
            input,
            feature,
            conditions,
            replicates,
            species,
            output,
        } => cmd_import(&input, &feature, conditions, replicates, species.into(), &output),

        Commands::Screen {
            input,
            replicates,
            alpha,
            no_filter,
            output,
        } => {
            let threshold = if no_filter {
                Threshold::Disabled
            } else {
                Threshold::Alpha(alpha)
            };
            cmd_screen(&input, replicates, threshold, &output)
        }

        Commands::Tukey {
            input,
            replicates,
            alpha,
            output,
        } => cmd_tukey(&input, replicates, alpha, &output),

        Commands::Average {
            input,
            replicates,
            output,
        } => cmd_average(&input, replicates, &output),

        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Run the full analysis from configuration
fn cmd_run(config_path: &PathBuf, format: &str) -> Result<()> {
    info!("Loading configuration from {:?}", config_path);
    let config = RapConfig::from_file(config_path)?;

    let output = run_rap(&config)?;
    let summary = output.summary();

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        "yaml" => println!("{}", serde_yaml::to_string(&summary)?),
        _ => print!("{}", summary),
    }
    Ok(())
}

/// Import and filter a protein group table
fn cmd_import(
    input: &PathBuf,
    feature: &str,
    conditions: Vec<String>,
    replicates: usize,
    species: Species,
    output: &PathBuf,
) -> Result<()> {
    let config = ImportConfig {
        conditions,
        ..ImportConfig::new(feature, &[], replicates, species)
    };
    let data = import_rap(input, &config)?;

    info!("Writing {} proteins to {:?}", data.n_proteins(), output);
    data.to_tsv(output)
}

/// Screen an imported table
fn cmd_screen(input: &PathBuf, replicates: usize, threshold: Threshold, output: &PathBuf) -> Result<()> {
    let data = IntensityMatrix::from_tsv(input)?;
    let screen = screen_anova(&data, replicates, threshold)?;

    info!("Writing {} proteins to {:?}", screen.len(), output);
    screen.to_tsv(output)
}

/// Tukey HSD scoring of a screened table
fn cmd_tukey(input: &PathBuf, replicates: usize, alpha: f64, output: &PathBuf) -> Result<()> {
    let screen = AnovaScreen::from_tsv(input, replicates)?;
    let scores = test_tukey_export(&screen, alpha, output)?;

    info!("Wrote scores for {} proteins to {:?}", scores.n_genes(), output);
    Ok(())
}

/// Average replicates
fn cmd_average(input: &PathBuf, replicates: usize, output: &PathBuf) -> Result<()> {
    let data = IntensityMatrix::from_tsv(input)?;
    let averages = average_replicates(&data, replicates)?;

    info!("Writing means for {} proteins to {:?}", averages.n_genes(), output);
    averages.write(output)
}

/// Write an example configuration
fn cmd_example(output: &PathBuf) -> Result<()> {
    let yaml = RapConfig::example().to_yaml()?;
    std::fs::write(output, yaml)?;
    eprintln!("Example configuration written to {:?}", output);
    Ok(())
}
