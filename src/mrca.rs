//src/mrca.rs

use crate::types::{CanonicalLineage, ConsensusResult, ResolvedTaxon, UNKNOWN};

/// Narrow `consensus` in place: every rank where `other` disagrees becomes `NA`.
///
/// A rank that is already `NA` stays `NA`, whatever `other` holds there.
pub fn narrow(consensus: &mut CanonicalLineage, other: &CanonicalLineage) {
    for (slot, value) in consensus.0.iter_mut().zip(other.values()) {
        if *slot != *value {
            *slot = UNKNOWN.to_string();
        }
    }
}

/// Most recent common ancestor of the co-best candidates of one cluster.
///
/// `candidates` holds one entry per candidate, in candidate order; `None`
/// marks a candidate the resolver could not place. Unplaced candidates are
/// left out of the merge but still listed as `NA` in the contributing taxa.
/// The result always has `n_ranks` values.
pub fn consensus(candidates: &[Option<ResolvedTaxon>], n_ranks: usize) -> ConsensusResult {
    let contributing_taxa = candidates
        .iter()
        .map(|taxon| match taxon {
            Some(taxon) => taxon.display_name(),
            None => UNKNOWN.to_string(),
        })
        .collect();

    let mut resolved = candidates.iter().flatten();
    let lineage = match resolved.next() {
        Some(first) => {
            let mut current = first.lineage.clone();
            for taxon in resolved {
                narrow(&mut current, &taxon.lineage);
            }
            current
        }
        None => CanonicalLineage::unknown(n_ranks),
    };

    ConsensusResult {
        lineage,
        contributing_taxa,
    }
}
