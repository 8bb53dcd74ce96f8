// src/lib.rs
pub mod blast;
pub mod clusters;
pub mod config;
pub mod error;
pub mod lineage_table;
pub mod mrca;
pub mod ranks;
pub mod reader;
pub mod report;
pub mod resolver;
pub mod taxdb;
pub mod types;

use std::path::Path;

use ahash::AHashMap;

use crate::blast::read_best_hits;
use crate::clusters::{backfill, read_cluster_universe};
use crate::config::PipelineConfig;
use crate::error::AlexError;
use crate::mrca::consensus;
use crate::report::{render_report, write_report};
use crate::resolver::{Resolver, TaxonomyResolver};
use crate::types::{BestHit, BestHitSet, ClusterUniverse, ReportRow, ResolvedTaxon, UNKNOWN};

/// Result of one MRCA run: the canonical ranks plus one row per cluster.
/// Report text is generated on demand.
#[derive(Debug, Clone)]
pub struct MrcaResults {
    pub ranks: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl MrcaResults {
    /// Generate the tab-separated report text
    pub fn get_report(&self) -> String {
        render_report(&self.ranks, &self.rows)
    }

    pub fn write_report<P: AsRef<Path>>(&self, path: P) -> Result<(), AlexError> {
        write_report(path, &self.ranks, &self.rows)
    }
}

/// Report order: the cluster universe first, then any hit query it does
/// not declare. Without a universe, first-seen hit order.
fn report_order<'a>(
    best_hits: &'a BestHitSet,
    universe: Option<&'a ClusterUniverse>,
) -> Vec<&'a String> {
    let Some(universe) = universe else {
        return best_hits.keys().collect();
    };

    let mut order: Vec<&String> = universe.iter().collect();
    let extra: Vec<&String> = best_hits
        .keys()
        .filter(|id| !universe.contains(*id))
        .collect();
    if !extra.is_empty() {
        log::warn!(
            "{} BLAST queries are not in the cluster list and are reported last",
            extra.len()
        );
    }
    order.extend(extra);
    order
}

/// Resolve every cluster's candidates and build its report row.
///
/// Each distinct candidate is looked up once. Unknown candidates are
/// logged and treated as unplaced; corrupt taxonomy data aborts the run.
pub fn compute_rows(
    best_hits: &BestHitSet,
    universe: Option<&ClusterUniverse>,
    resolver: &dyn TaxonomyResolver,
) -> Result<Vec<ReportRow>, AlexError> {
    let n_ranks = resolver.ranks().len();
    let mut cache: AHashMap<String, Option<ResolvedTaxon>> = AHashMap::new();
    let mut rows = Vec::new();
    let unassigned = BestHit::unassigned();

    for cluster_id in report_order(best_hits, universe) {
        let best = best_hits.get(cluster_id).unwrap_or(&unassigned);

        let mut resolved = Vec::with_capacity(best.candidates.len());
        for candidate in &best.candidates {
            let taxon = match cache.get(candidate) {
                Some(taxon) => taxon.clone(),
                None => {
                    let taxon = resolver.lookup(candidate)?;
                    match &taxon {
                        Some(taxon) => log::debug!(
                            "{} -> {} ({})",
                            candidate,
                            taxon.display_name(),
                            taxon.lineage.values().join(";")
                        ),
                        None if candidate != UNKNOWN => {
                            log::warn!("Could not resolve candidate `{}`", candidate)
                        }
                        None => {}
                    }
                    cache.insert(candidate.clone(), taxon.clone());
                    taxon
                }
            };
            resolved.push(taxon);
        }

        let result = consensus(&resolved, n_ranks);
        rows.push(ReportRow {
            cluster_id: cluster_id.clone(),
            lineage: result.lineage,
            identity: best.identity,
            coverage: best.coverage,
            contributing_taxa: result.contributing_taxa,
        });
    }

    log::info!(
        "Resolved {} distinct candidates for {} clusters",
        cache.len(),
        rows.len()
    );
    Ok(rows)
}

/// Run the whole pipeline described by `config`:
///  1) read BLAST hits into a best-hit set
///  2) read the cluster list (if any) and back-fill clusters without hits
///  3) load the taxonomy resolver
///  4) compute the MRCA of every cluster
pub fn assign_taxonomy(config: &PipelineConfig) -> Result<MrcaResults, AlexError> {
    config.validate()?;

    let mut best_hits = read_best_hits(
        &config.blast_path,
        config.candidate_kind,
        config.id_delimiter,
    )?;

    let universe = match &config.clusters {
        Some(source) => {
            let universe = read_cluster_universe(source, config.id_delimiter)?;
            backfill(&mut best_hits, &universe);
            Some(universe)
        }
        None => None,
    };

    let resolver = Resolver::load(config)?;
    let rows = compute_rows(&best_hits, universe.as_ref(), &resolver)?;

    Ok(MrcaResults {
        ranks: resolver.ranks().to_vec(),
        rows,
    })
}
