use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use alex_rs::assign_taxonomy;
use alex_rs::config::{CandidateKind, ClusterSource, PipelineConfig, TaxonomySource};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Candidates {
    /// BLAST field 3 holds NCBI taxon ids (staxids)
    Taxid,
    /// BLAST field 4 holds species names (sscinames)
    Species,
}

#[derive(Parser, Debug)]
#[command(name = "alex-rs")]
#[command(about = "Most recent common ancestor of co-best BLAST hits per OTU/ASV")]
#[command(version)]
struct Cli {
    /// BLAST tabular output (plain or .gz)
    #[arg(long)]
    blast: PathBuf,

    /// OTU/ASV table; every listed cluster gets a report row
    #[arg(long, conflicts_with = "sequences")]
    table: Option<PathBuf>,

    /// FASTA file of cluster sequences, alternative to --table
    #[arg(long)]
    sequences: Option<PathBuf>,

    /// NCBI names.dmp
    #[arg(long, requires = "nodes", required_unless_present = "lineages")]
    names: Option<PathBuf>,

    /// NCBI nodes.dmp
    #[arg(long, requires = "names")]
    nodes: Option<PathBuf>,

    /// Curated taxid -> lineage table, alternative to --names/--nodes
    #[arg(long, conflicts_with_all = ["names", "nodes"])]
    lineages: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Candidates::Taxid)]
    candidates: Candidates,

    /// Comma-separated canonical ranks, broadest first
    #[arg(long, value_delimiter = ',')]
    ranks: Option<Vec<String>>,

    /// Cut query/sequence ids at this character
    #[arg(long, default_value_t = ';')]
    id_delimiter: char,

    /// Keep query/sequence ids whole
    #[arg(long)]
    keep_full_ids: bool,

    /// Report file to write
    #[arg(short, long)]
    output: PathBuf,

    /// More log output (repeat for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn to_config(&self) -> PipelineConfig {
        let clusters = match (&self.table, &self.sequences) {
            (Some(path), _) => Some(ClusterSource::Table(path.clone())),
            (None, Some(path)) => Some(ClusterSource::Sequences(path.clone())),
            (None, None) => None,
        };
        let taxonomy = match (&self.lineages, &self.names, &self.nodes) {
            (Some(path), _, _) => TaxonomySource::Table { path: path.clone() },
            (None, Some(names), Some(nodes)) => TaxonomySource::Tree {
                names: names.clone(),
                nodes: nodes.clone(),
            },
            // clap enforces one of the two sources
            _ => PipelineConfig::default().taxonomy,
        };

        PipelineConfig {
            blast_path: self.blast.clone(),
            clusters,
            taxonomy,
            candidate_kind: match self.candidates {
                Candidates::Taxid => CandidateKind::TaxonId,
                Candidates::Species => CandidateKind::SpeciesName,
            },
            ranks: self.ranks.clone(),
            id_delimiter: (!self.keep_full_ids).then_some(self.id_delimiter),
        }
    }
}

fn spinner(color: &str, message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let template = format!("{{spinner:.{color}}} {{msg}}");
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template(&template)
    {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // 1. Resolve lineages and compute the MRCA per cluster
    let config = cli.to_config();
    let spinner_run = spinner("green", "Computing most recent common ancestors...");
    let results = match assign_taxonomy(&config) {
        Ok(results) => results,
        Err(err) => {
            spinner_run.abandon_with_message("Failed.");
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    spinner_run.finish_with_message(format!("Assigned {} clusters.", results.rows.len()));

    // 2. Write the report
    let spinner_write = spinner("yellow", "Writing report...");
    if let Err(err) = results.write_report(&cli.output) {
        spinner_write.abandon_with_message("Failed.");
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }
    spinner_write.finish_with_message(format!("Report written to {}.", cli.output.display()));

    ExitCode::SUCCESS
}
