//src/config.rs

use std::path::PathBuf;

use ahash::AHashSet;

use crate::error::AlexError;
use crate::types::{TABLE_RANKS, TREE_RANKS};

/// What the candidate column of a BLAST hit holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CandidateKind {
    /// NCBI taxon identifier (`staxids`, field 2).
    #[default]
    TaxonId,
    /// Scientific species name (`sscinames`, field 3).
    SpeciesName,
}

impl CandidateKind {
    pub fn hit_field(self) -> usize {
        match self {
            CandidateKind::TaxonId => 2,
            CandidateKind::SpeciesName => 3,
        }
    }
}

/// Where the full list of clusters comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterSource {
    /// OTU/ASV table: header discarded, cluster id in column 0.
    Table(PathBuf),
    /// FASTA-like sequence list: `>` records, id terminated at the delimiter.
    Sequences(PathBuf),
}

/// Which resolver strategy to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxonomySource {
    /// NCBI `names.dmp` and `nodes.dmp`.
    Tree { names: PathBuf, nodes: PathBuf },
    /// Curated taxon id -> lineage table.
    Table { path: PathBuf },
}

impl TaxonomySource {
    pub fn default_ranks(&self) -> Vec<String> {
        let ranks: &[&str] = match self {
            TaxonomySource::Tree { .. } => &TREE_RANKS,
            TaxonomySource::Table { .. } => &TABLE_RANKS,
        };
        ranks.iter().map(|r| r.to_string()).collect()
    }
}

/// Settings for one `assign_taxonomy` run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub blast_path: PathBuf,
    pub clusters: Option<ClusterSource>,
    pub taxonomy: TaxonomySource,
    pub candidate_kind: CandidateKind,
    /// Overrides the strategy's default canonical ranks.
    pub ranks: Option<Vec<String>>,
    /// Cuts query and sequence ids at this character (`;size=` suffixes).
    pub id_delimiter: Option<char>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blast_path: PathBuf::from("blast.tsv"),
            clusters: None,
            taxonomy: TaxonomySource::Tree {
                names: PathBuf::from("names.dmp"),
                nodes: PathBuf::from("nodes.dmp"),
            },
            candidate_kind: CandidateKind::TaxonId,
            ranks: None,
            id_delimiter: Some(';'),
        }
    }
}

impl PipelineConfig {
    /// Canonical ranks in effect for this run.
    pub fn canonical_ranks(&self) -> Vec<String> {
        self.ranks
            .clone()
            .unwrap_or_else(|| self.taxonomy.default_ranks())
    }

    pub fn validate(&self) -> Result<(), AlexError> {
        let ranks = self.canonical_ranks();
        if ranks.is_empty() {
            return Err(AlexError::InvalidConfig(
                "at least one canonical rank is required".to_string(),
            ));
        }
        let mut seen = AHashSet::with_capacity(ranks.len());
        for rank in &ranks {
            if rank.trim().is_empty() {
                return Err(AlexError::InvalidConfig("empty rank name".to_string()));
            }
            if !seen.insert(rank.as_str()) {
                return Err(AlexError::InvalidConfig(format!("duplicate rank `{rank}`")));
            }
        }
        if matches!(self.taxonomy, TaxonomySource::Table { .. })
            && self.candidate_kind == CandidateKind::SpeciesName
        {
            return Err(AlexError::InvalidConfig(
                "species-name candidates need the names/nodes taxonomy".to_string(),
            ));
        }
        Ok(())
    }
}
