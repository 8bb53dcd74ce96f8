//src/types.rs

use indexmap::{IndexMap, IndexSet};

/// Placeholder used for any rank, metric or name that cannot be determined.
pub const UNKNOWN: &str = "NA";

/// Candidate value BLAST uses for a subject without taxonomic information.
pub const NULL_TAXON: &str = "N/A";

/// Whole-line marker for queries the upstream search left unassigned.
pub const SKIP_SENTINEL: &str = "not assigned";

/// Canonical ranks used with the NCBI taxonomy dump.
pub const TREE_RANKS: [&str; 7] = [
    "superkingdom",
    "phylum",
    "class",
    "order",
    "family",
    "genus",
    "species",
];

/// Canonical ranks used with a curated lineage table.
pub const TABLE_RANKS: [&str; 7] = [
    "kingdom", "phylum", "class", "order", "family", "genus", "species",
];

/// One alignment-hit line, reduced to the fields the fold needs.
#[derive(Debug, Clone, PartialEq)]
pub struct HitRecord {
    pub query_id: String,
    pub candidate: String,
    pub identity: f64,
    pub coverage: u32,
}

/// Best-scoring candidates for one query.
///
/// `identity`/`coverage` are `None` for clusters back-filled from the
/// cluster universe without any hit.
#[derive(Debug, Clone, PartialEq)]
pub struct BestHit {
    pub identity: Option<f64>,
    pub coverage: Option<u32>,
    pub candidates: Vec<String>,
}

impl BestHit {
    pub fn seed(record: HitRecord) -> Self {
        Self {
            identity: Some(record.identity),
            coverage: Some(record.coverage),
            candidates: vec![record.candidate],
        }
    }

    /// Entry for a cluster with no hit at all.
    pub fn unassigned() -> Self {
        Self {
            identity: None,
            coverage: None,
            candidates: vec![UNKNOWN.to_string()],
        }
    }
}

/// `query_id -> BestHit`, in first-seen order.
pub type BestHitSet = IndexMap<String, BestHit>;

/// Every cluster that must appear in the report, in declaration order.
pub type ClusterUniverse = IndexSet<String>;

/// One step of a walked lineage, as found in the nodes/names dumps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRank {
    pub rank: String,
    pub tax_id: String,
    pub name: String,
}

/// A lineage with exactly one value per canonical rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalLineage(pub Vec<String>);

impl CanonicalLineage {
    /// All-unknown lineage of `len` ranks.
    pub fn unknown(len: usize) -> Self {
        Self(vec![UNKNOWN.to_string(); len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    /// The most specific (last) rank, if known.
    pub fn species(&self) -> Option<&str> {
        self.0
            .last()
            .map(String::as_str)
            .filter(|value| *value != UNKNOWN)
    }

    pub fn is_all_unknown(&self) -> bool {
        self.0.iter().all(|value| value == UNKNOWN)
    }
}

/// What a resolver knows about one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTaxon {
    pub lineage: CanonicalLineage,
    /// Name shown when the species rank is unknown.
    pub fallback_name: Option<String>,
}

impl ResolvedTaxon {
    /// Species value if known, else the fallback name, else `NA`.
    pub fn display_name(&self) -> String {
        self.lineage
            .species()
            .or(self.fallback_name.as_deref())
            .unwrap_or(UNKNOWN)
            .to_string()
    }
}

/// Consensus lineage for one cluster plus the taxa that fed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsensusResult {
    pub lineage: CanonicalLineage,
    pub contributing_taxa: Vec<String>,
}

/// A structured representation of one row of the MRCA report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub cluster_id: String,
    pub lineage: CanonicalLineage,
    pub identity: Option<f64>,
    pub coverage: Option<u32>,
    pub contributing_taxa: Vec<String>,
}
