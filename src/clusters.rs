//src/clusters.rs

use std::path::Path;

use crate::config::ClusterSource;
use crate::error::AlexError;
use crate::reader::for_each_line;
use crate::types::{BestHit, BestHitSet, ClusterUniverse};

/// Read cluster ids from an OTU/ASV table.
/// The first line is a header; the id is the first tab-separated column.
pub fn read_cluster_table<P: AsRef<Path>>(path: P) -> Result<ClusterUniverse, AlexError> {
    let path = path.as_ref();
    let mut universe = ClusterUniverse::new();

    for_each_line(path, |line_no, line| {
        if line_no == 1 || line.trim().is_empty() {
            return Ok(());
        }
        let id = line.split('\t').next().unwrap_or_default().trim();
        if id.is_empty() {
            return Err(AlexError::MalformedTable {
                path: path.to_path_buf(),
                line: line_no,
                reason: "missing cluster id in column 0".to_string(),
            });
        }
        universe.insert(id.to_string());
        Ok(())
    })?;

    log::info!("Read {} clusters from table {}", universe.len(), path.display());
    Ok(universe)
}

/// Read sequence ids from `>` header lines of a FASTA-like file.
/// Ids end at `delimiter` (if any) or the first whitespace.
pub fn read_sequence_ids<P: AsRef<Path>>(
    path: P,
    delimiter: Option<char>,
) -> Result<ClusterUniverse, AlexError> {
    let path = path.as_ref();
    let mut universe = ClusterUniverse::new();

    for_each_line(path, |line_no, line| {
        let Some(header) = line.strip_prefix('>') else {
            return Ok(());
        };
        let header = match delimiter {
            Some(delim) => header.split(delim).next().unwrap_or(header),
            None => header,
        };
        let id = header.split_whitespace().next().unwrap_or_default();
        if id.is_empty() {
            return Err(AlexError::MalformedTable {
                path: path.to_path_buf(),
                line: line_no,
                reason: "empty sequence id".to_string(),
            });
        }
        universe.insert(id.to_string());
        Ok(())
    })?;

    log::info!("Read {} sequence ids from {}", universe.len(), path.display());
    Ok(universe)
}

pub fn read_cluster_universe(
    source: &ClusterSource,
    delimiter: Option<char>,
) -> Result<ClusterUniverse, AlexError> {
    match source {
        ClusterSource::Table(path) => read_cluster_table(path),
        ClusterSource::Sequences(path) => read_sequence_ids(path, delimiter),
    }
}

/// Give every cluster without a hit an unassigned `BestHit`.
/// Returns how many entries were added.
pub fn backfill(best_hits: &mut BestHitSet, universe: &ClusterUniverse) -> usize {
    let mut added = 0;
    for id in universe {
        if !best_hits.contains_key(id) {
            best_hits.insert(id.clone(), BestHit::unassigned());
            added += 1;
        }
    }
    if added > 0 {
        log::info!("{} clusters had no BLAST hit", added);
    }
    added
}
