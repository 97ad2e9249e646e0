//! trialscan - COVID-19 trial registration pipeline
//!
//! `scan` reports the registry identifiers in a document, `screen` finds
//! candidate result publications in PubMed and CORD-19, `clean` prepares
//! the ICTRP export for analysis.

mod config;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::Config;
use trialscan_cleaning::{
    apply_cross_registrations, apply_intervention_lookup, apply_sponsor_lookup, clean_rows,
    is_included, read_additional_trials, read_cross_registrations, read_ictrp, write_trials,
    InterventionTable, LookupTable, Reconciliation, TrialRecord,
};
use trialscan_identifiers::catalogue;
use trialscan_screening::{
    read_pubmed_archive, scan_directory, screen, write_combined, write_search_records,
    MetadataIndex, SearchRecord, Source,
};

#[derive(Parser)]
#[command(name = "trialscan")]
#[command(about = "Find and clean COVID-19 clinical trial registrations", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./trialscan.toml, then ~/.trialscan/trialscan.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the registry hits of a text file (or stdin) as JSON
    Scan {
        file: Option<PathBuf>,

        /// Print every hit with its registry and position
        #[arg(long)]
        locate: bool,
    },
    /// Screen PubMed and CORD-19 documents for trial registrations
    Screen {
        /// PubMed archive CSV
        #[arg(long)]
        pubmed: Option<PathBuf>,

        /// CORD-19 metadata.csv (required with --cord-pdf or --cord-pmc)
        #[arg(long)]
        metadata: Option<PathBuf>,

        /// Directory of CORD-19 PDF parses
        #[arg(long)]
        cord_pdf: Option<PathBuf>,

        /// Directory of CORD-19 PMC parses
        #[arg(long)]
        cord_pmc: Option<PathBuf>,

        /// Also write the uncombined search records
        #[arg(long)]
        records: Option<PathBuf>,

        #[arg(short, long)]
        out: PathBuf,
    },
    /// Clean an ICTRP export
    Clean {
        #[arg(long)]
        ictrp: PathBuf,

        /// Cross-registration sheet
        #[arg(long)]
        cross: Option<PathBuf>,

        /// Preferred registry entries of cross-registered trials missing
        /// from the export
        #[arg(long, requires = "cross")]
        additions: Option<PathBuf>,

        /// Sponsor normalisation sheet
        #[arg(long)]
        sponsors: Option<PathBuf>,

        /// Intervention category sheet
        #[arg(long)]
        interventions: Option<PathBuf>,

        /// Also write the trials meeting the inclusion criteria
        #[arg(long)]
        included: Option<PathBuf>,

        #[arg(short, long)]
        out: PathBuf,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan { file, locate } => {
            run_scan(file.as_deref(), locate)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Screen {
            pubmed,
            metadata,
            cord_pdf,
            cord_pmc,
            records,
            out,
        } => {
            let cord_dirs = [(cord_pdf, Source::CordPdf), (cord_pmc, Source::CordPmc)];
            let scans_cord = cord_dirs.iter().any(|(dir, _)| dir.is_some());
            if scans_cord && metadata.is_none() {
                return Err("--metadata is required to scan CORD-19 documents".into());
            }
            let index = metadata.as_deref().map(MetadataIndex::from_csv).transpose()?;

            let mut all = Vec::new();
            if let Some(path) = pubmed {
                let articles = read_pubmed_archive(&path)?;
                all.extend(articles.iter().map(SearchRecord::from_pubmed));
            }

            if let Some(index) = &index {
                for (dir, source) in cord_dirs {
                    if let Some(dir) = dir {
                        all.extend(scan_directory(&dir, source, index, config.cord_since)?);
                    }
                }
            }

            if let Some(path) = records {
                write_search_records(&path, &all)?;
            }
            let combined = screen(&all, index.as_ref());
            write_combined(&out, &combined)?;
            tracing::info!("{} publications written to {}", combined.len(), out.display());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Clean {
            ictrp,
            cross,
            additions,
            sponsors,
            interventions,
            included,
            out,
        } => run_clean(
            &config,
            &CleanInputs {
                ictrp: &ictrp,
                cross: cross.as_deref(),
                additions: additions.as_deref(),
                sponsors: sponsors.as_deref(),
                interventions: interventions.as_deref(),
            },
            included.as_deref(),
            &out,
        ),
    }
}

fn run_scan(file: Option<&Path>, locate: bool) -> Result<(), Box<dyn std::error::Error>> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let output = if locate {
        serde_json::to_string_pretty(&catalogue().locate(&text))?
    } else {
        serde_json::to_string_pretty(&catalogue().scan(Some(text.as_str())))?
    };
    println!("{output}");
    Ok(())
}

/// Input sheets of one cleaning run
struct CleanInputs<'a> {
    ictrp: &'a Path,
    cross: Option<&'a Path>,
    additions: Option<&'a Path>,
    sponsors: Option<&'a Path>,
    interventions: Option<&'a Path>,
}

/// Write the report of missing keys. Returns whether the lookup converged.
fn report_unresolved<T>(
    config: &Config,
    result: &Reconciliation<T>,
    sheet: &Path,
    report: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    if result.is_converged() {
        return Ok(true);
    }
    let report = config.report_path(report);
    result.write_unresolved(&report)?;
    tracing::warn!("Update {} from {} and rerun", sheet.display(), report.display());
    Ok(false)
}

fn run_clean(
    config: &Config,
    inputs: &CleanInputs<'_>,
    included: Option<&Path>,
    out: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut records = clean_rows(read_ictrp(inputs.ictrp)?)?;

    if let Some(path) = inputs.cross {
        let cross_registrations = read_cross_registrations(path)?;
        let additions = match inputs.additions {
            Some(path) => read_additional_trials(path)?,
            None => Vec::new(),
        };
        records = apply_cross_registrations(records, additions, &cross_registrations);
    }
    tracing::info!("The final dataset is {} trials", records.len());

    let mut converged = true;
    if let Some(sheet) = inputs.sponsors {
        let lookup = &config.sponsor_lookup;
        let table = LookupTable::from_csv(sheet, &lookup.key, &lookup.value)?;
        let result = apply_sponsor_lookup(&mut records, &table);
        converged &= report_unresolved(config, &result, sheet, &lookup.report)?;
    }
    if let Some(sheet) = inputs.interventions {
        let lookup = &config.intervention_lookup;
        let table = InterventionTable::from_csv(sheet, &lookup.key)?;
        let result = apply_intervention_lookup(&mut records, &table);
        converged &= report_unresolved(config, &result, sheet, &lookup.report)?;
    }

    write_trials(out, &records)?;

    if let Some(path) = included {
        let kept: Vec<TrialRecord> = records
            .into_iter()
            .filter(|r| is_included(r, config.inclusion_cutoff))
            .collect();
        write_trials(path, &kept)?;
    }

    if converged {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
