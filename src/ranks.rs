//src/ranks.rs

use crate::types::{CanonicalLineage, RawRank, UNKNOWN};

/// Project a walked lineage onto the canonical ranks.
///
/// For each canonical rank, the first entry of `raw` (in walk order) with
/// that rank supplies the value; ranks with no entry become `NA`.
pub fn project_lineage<S: AsRef<str>>(ranks: &[S], raw: &[RawRank]) -> CanonicalLineage {
    let values = ranks
        .iter()
        .map(|rank| {
            raw.iter()
                .find(|step| step.rank == rank.as_ref())
                .map(|step| step.name.clone())
                .unwrap_or_else(|| UNKNOWN.to_string())
        })
        .collect();
    CanonicalLineage(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TREE_RANKS;

    fn step(rank: &str, name: &str) -> RawRank {
        RawRank {
            rank: rank.to_string(),
            tax_id: String::new(),
            name: name.to_string(),
        }
    }

    #[test]
    fn fills_missing_ranks_with_unknown() {
        // leaf-to-root order, as produced by the tree walk
        let raw = vec![
            step("species", "Felis_catus"),
            step("genus", "Felis"),
            step("subfamily", "Felinae"),
            step("order", "Carnivora"),
            step("class", "Mammalia"),
            step("no rank", "cellular_organisms"),
        ];
        let lineage = project_lineage(&TREE_RANKS, &raw);
        assert_eq!(
            lineage.values(),
            &["NA", "NA", "Mammalia", "Carnivora", "NA", "Felis", "Felis_catus"]
        );
    }

    #[test]
    fn first_duplicate_rank_wins() {
        let raw = vec![step("clade", "A"), step("genus", "Felis"), step("genus", "Other")];
        let lineage = project_lineage(&["genus"], &raw);
        assert_eq!(lineage.values(), &["Felis"]);
    }

    #[test]
    fn projection_is_idempotent() {
        let raw = vec![
            step("genus", "Felis"),
            step("family", "Felidae"),
            step("phylum", "Chordata"),
        ];
        let once = project_lineage(&TREE_RANKS, &raw);
        let canonical: Vec<RawRank> = TREE_RANKS
            .iter()
            .zip(once.values())
            .map(|(rank, value)| step(rank, value))
            .collect();
        let twice = project_lineage(&TREE_RANKS, &canonical);
        assert_eq!(once, twice);
        assert_eq!(once.len(), TREE_RANKS.len());
    }

    #[test]
    fn empty_lineage_is_all_unknown() {
        let lineage = project_lineage(&TREE_RANKS, &[]);
        assert!(lineage.is_all_unknown());
        assert_eq!(lineage.len(), 7);
    }
}
