//src/resolver.rs

use crate::config::{PipelineConfig, TaxonomySource};
use crate::error::AlexError;
use crate::lineage_table::LineageTable;
use crate::taxdb::TaxonomyTree;
use crate::types::{CanonicalLineage, ResolvedTaxon};

/// Turns a BLAST candidate into a lineage over a fixed set of canonical ranks.
pub trait TaxonomyResolver {
    /// Canonical ranks, broadest first. Every returned lineage has this length.
    fn ranks(&self) -> &[String];

    /// `Ok(None)` when the candidate is unknown to the taxonomy; `Err` only
    /// when the reference data itself is corrupt.
    fn lookup(&self, candidate: &str) -> Result<Option<ResolvedTaxon>, AlexError>;

    /// Like `lookup`, but unknown candidates become an all-`NA` lineage.
    fn resolve(&self, candidate: &str) -> Result<CanonicalLineage, AlexError> {
        Ok(self
            .lookup(candidate)?
            .map(|taxon| taxon.lineage)
            .unwrap_or_else(|| CanonicalLineage::unknown(self.ranks().len())))
    }
}

/// The resolver strategy picked for a run.
#[derive(Debug, Clone)]
pub enum Resolver {
    Tree(TaxonomyTree),
    Table(LineageTable),
}

impl Resolver {
    pub fn load(config: &PipelineConfig) -> Result<Self, AlexError> {
        let ranks = config.canonical_ranks();
        match &config.taxonomy {
            TaxonomySource::Tree { names, nodes } => Ok(Resolver::Tree(
                TaxonomyTree::from_dumps(names, nodes, ranks, config.candidate_kind)?,
            )),
            TaxonomySource::Table { path } => {
                Ok(Resolver::Table(LineageTable::from_file(path, ranks)?))
            }
        }
    }

    fn inner(&self) -> &dyn TaxonomyResolver {
        match self {
            Resolver::Tree(tree) => tree,
            Resolver::Table(table) => table,
        }
    }
}

impl TaxonomyResolver for Resolver {
    fn ranks(&self) -> &[String] {
        self.inner().ranks()
    }

    fn lookup(&self, candidate: &str) -> Result<Option<ResolvedTaxon>, AlexError> {
        self.inner().lookup(candidate)
    }
}
