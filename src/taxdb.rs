//src/taxdb.rs

use std::path::Path;

use ahash::{AHashMap, AHashSet};

use crate::config::CandidateKind;
use crate::error::AlexError;
use crate::ranks::project_lineage;
use crate::reader::for_each_line;
use crate::resolver::TaxonomyResolver;
use crate::types::{RawRank, ResolvedTaxon, UNKNOWN};

/// Field separator of the NCBI `*.dmp` files.
pub const DMP_SEPARATOR: &str = "\t|\t";

/// Name class marking the canonical name of a taxon in `names.dmp`.
pub const SCIENTIFIC_NAME: &str = "scientific name";

/// Upper bound on walked ancestors; real lineages are far shorter.
pub const MAX_LINEAGE_DEPTH: usize = 1024;

/// `rank` and `parent` of one taxon from `nodes.dmp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxNode {
    pub rank: String,
    pub parent: String,
}

pub type NodeMap = AHashMap<String, TaxNode>;
pub type NameMap = AHashMap<String, String>;

/// Split a `*.dmp` line into its fields, dropping the trailing `\t|`.
fn dmp_fields(line: &str) -> Vec<&str> {
    let line = line.strip_suffix("\t|").unwrap_or(line);
    line.split(DMP_SEPARATOR).collect()
}

/// Parses `names.dmp`:
/// ```text
/// <taxid>\t|\t<name>\t|\t<unique name>\t|\t<name class>\t|
/// ```
/// Only `scientific name` rows are kept; spaces in names become `_`.
/// Returns:
/// - a `NameMap` mapping taxid -> scientific name
/// - a `NameMap` mapping scientific name -> taxid
pub fn parse_names<P: AsRef<Path>>(path: P) -> Result<(NameMap, NameMap), AlexError> {
    let path = path.as_ref();
    let mut id_to_name = NameMap::new();
    let mut name_to_id = NameMap::new();

    for_each_line(path, |line_no, line| {
        if line.is_empty() {
            return Ok(());
        }
        let fields = dmp_fields(line);
        if fields.len() < 4 {
            return Err(AlexError::MalformedTaxonomy {
                path: path.to_path_buf(),
                line: line_no,
                reason: format!("expected 4 fields, found {}", fields.len()),
            });
        }
        if fields[3] != SCIENTIFIC_NAME {
            return Ok(());
        }

        let tax_id = fields[0].trim().to_string();
        let name = fields[1].trim().replace(' ', "_");
        name_to_id.insert(name.clone(), tax_id.clone());
        id_to_name.insert(tax_id, name);
        Ok(())
    })?;

    Ok((id_to_name, name_to_id))
}

/// Parses `nodes.dmp`:
/// ```text
/// <taxid>\t|\t<parent taxid>\t|\t<rank>\t|\t...
/// ```
pub fn parse_nodes<P: AsRef<Path>>(path: P) -> Result<NodeMap, AlexError> {
    let path = path.as_ref();
    let mut nodes = NodeMap::new();

    for_each_line(path, |line_no, line| {
        if line.is_empty() {
            return Ok(());
        }
        let fields = dmp_fields(line);
        if fields.len() < 3 {
            return Err(AlexError::MalformedTaxonomy {
                path: path.to_path_buf(),
                line: line_no,
                reason: format!("expected at least 3 fields, found {}", fields.len()),
            });
        }
        nodes.insert(
            fields[0].trim().to_string(),
            TaxNode {
                parent: fields[1].trim().to_string(),
                rank: fields[2].trim().to_string(),
            },
        );
        Ok(())
    })?;

    Ok(nodes)
}

/// Taxonomy tree built from the NCBI names/nodes dumps.
#[derive(Debug, Clone)]
pub struct TaxonomyTree {
    nodes: NodeMap,
    names: NameMap,
    name_to_id: NameMap,
    ranks: Vec<String>,
    candidate_kind: CandidateKind,
}

impl TaxonomyTree {
    pub fn new(
        nodes: NodeMap,
        names: NameMap,
        name_to_id: NameMap,
        ranks: Vec<String>,
        candidate_kind: CandidateKind,
    ) -> Self {
        Self {
            nodes,
            names,
            name_to_id,
            ranks,
            candidate_kind,
        }
    }

    pub fn from_dumps<P: AsRef<Path>, Q: AsRef<Path>>(
        names_path: P,
        nodes_path: Q,
        ranks: Vec<String>,
        candidate_kind: CandidateKind,
    ) -> Result<Self, AlexError> {
        let (names, name_to_id) = parse_names(&names_path)?;
        let nodes = parse_nodes(&nodes_path)?;

        log::info!(
            "Loaded taxonomy with {} nodes and {} scientific names",
            nodes.len(),
            names.len()
        );

        Ok(Self::new(nodes, names, name_to_id, ranks, candidate_kind))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn scientific_name(&self, tax_id: &str) -> Option<&str> {
        self.names.get(tax_id).map(String::as_str)
    }

    /// Taxon id for a species name; spaces and underscores are interchangeable.
    pub fn taxid_for_name(&self, name: &str) -> Option<&str> {
        self.name_to_id
            .get(&name.trim().replace(' ', "_"))
            .map(String::as_str)
    }

    /// Walk from `tax_id` to the root, leaf first.
    ///
    /// The root (the self-parented node) is not part of the result, so the
    /// walk from the root itself is empty. Returns `None` if `tax_id` is not in the nodes dump. A parent that is
    /// missing, a revisited node or a walk longer than `MAX_LINEAGE_DEPTH`
    /// means the dump is corrupt and is reported as an error.
    pub fn walk(&self, tax_id: &str) -> Result<Option<Vec<RawRank>>, AlexError> {
        if !self.nodes.contains_key(tax_id) {
            return Ok(None);
        }

        let mut lineage = Vec::new();
        let mut visited = AHashSet::new();
        let mut current = tax_id;
        let mut child = tax_id;

        loop {
            let Some(node) = self.nodes.get(current) else {
                return Err(AlexError::DanglingParent {
                    tax_id: child.to_string(),
                    parent: current.to_string(),
                });
            };
            if node.parent == current {
                break;
            }
            if !visited.insert(current) {
                return Err(AlexError::TaxonomyCycle {
                    tax_id: tax_id.to_string(),
                });
            }
            if lineage.len() >= MAX_LINEAGE_DEPTH {
                return Err(AlexError::LineageTooDeep {
                    tax_id: tax_id.to_string(),
                    depth: MAX_LINEAGE_DEPTH,
                });
            }

            let name = match self.names.get(current) {
                Some(name) => name.clone(),
                None => {
                    log::warn!("Taxon {} has no scientific name", current);
                    UNKNOWN.to_string()
                }
            };
            lineage.push(RawRank {
                rank: node.rank.clone(),
                tax_id: current.to_string(),
                name,
            });

            child = current;
            current = node.parent.as_str();
        }

        Ok(Some(lineage))
    }
}

impl TaxonomyResolver for TaxonomyTree {
    fn ranks(&self) -> &[String] {
        &self.ranks
    }

    fn lookup(&self, candidate: &str) -> Result<Option<ResolvedTaxon>, AlexError> {
        let tax_id = match self.candidate_kind {
            CandidateKind::TaxonId => Some(candidate.trim()),
            CandidateKind::SpeciesName => self.taxid_for_name(candidate),
        };
        let Some(tax_id) = tax_id else {
            return Ok(None);
        };

        let Some(raw) = self.walk(tax_id)? else {
            return Ok(None);
        };
        // a hit on the root itself places nothing
        if raw.is_empty() {
            log::debug!("Candidate `{}` is the taxonomy root", candidate);
            return Ok(None);
        }

        log::debug!("Candidate `{}` walked {} ancestors", candidate, raw.len());
        Ok(Some(ResolvedTaxon {
            lineage: project_lineage(&self.ranks, &raw),
            fallback_name: self.scientific_name(tax_id).map(str::to_string),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TREE_RANKS;

    const NAMES: &str = "\
1\t|\troot\t|\t\t|\tscientific name\t|
2759\t|\tEukaryota\t|\t\t|\tscientific name\t|
7711\t|\tChordata\t|\t\t|\tscientific name\t|
40674\t|\tMammalia\t|\t\t|\tscientific name\t|
33554\t|\tCarnivora\t|\t\t|\tscientific name\t|
9681\t|\tFelidae\t|\t\t|\tscientific name\t|
9682\t|\tFelis\t|\t\t|\tscientific name\t|
9685\t|\tFelis catus\t|\t\t|\tscientific name\t|
9685\t|\tdomestic cat\t|\t\t|\tgenbank common name\t|
";

    const NODES: &str = "\
1\t|\t1\t|\tno rank\t|\t\t|
2759\t|\t1\t|\tsuperkingdom\t|\t\t|
7711\t|\t2759\t|\tphylum\t|\t\t|
40674\t|\t7711\t|\tclass\t|\t\t|
33554\t|\t40674\t|\torder\t|\t\t|
9681\t|\t33554\t|\tfamily\t|\t\t|
9682\t|\t9681\t|\tgenus\t|\t\t|
9685\t|\t9682\t|\tspecies\t|\t\t|
";

    fn ranks() -> Vec<String> {
        TREE_RANKS.iter().map(|r| r.to_string()).collect()
    }

    fn tree(kind: CandidateKind) -> TaxonomyTree {
        let dir = tempfile::tempdir().unwrap();
        let names = dir.path().join("names.dmp");
        let nodes = dir.path().join("nodes.dmp");
        std::fs::write(&names, NAMES).unwrap();
        std::fs::write(&nodes, NODES).unwrap();
        TaxonomyTree::from_dumps(&names, &nodes, ranks(), kind).unwrap()
    }

    fn node(rank: &str, parent: &str) -> TaxNode {
        TaxNode {
            rank: rank.to_string(),
            parent: parent.to_string(),
        }
    }

    #[test]
    fn keeps_only_scientific_names() {
        let tree = tree(CandidateKind::TaxonId);
        assert_eq!(tree.scientific_name("9685"), Some("Felis_catus"));
        assert_eq!(tree.taxid_for_name("Felis catus"), Some("9685"));
        assert_eq!(tree.taxid_for_name("domestic cat"), None);
        assert_eq!(tree.node_count(), 8);
    }

    #[test]
    fn walk_stops_at_self_parented_root() {
        let tree = tree(CandidateKind::TaxonId);
        let raw = tree.walk("9685").unwrap().unwrap();
        let ids: Vec<&str> = raw.iter().map(|r| r.tax_id.as_str()).collect();
        assert_eq!(ids, vec!["9685", "9682", "9681", "33554", "40674", "7711", "2759"]);
        assert_eq!(raw[0].rank, "species");
        assert_eq!(tree.walk("424242").unwrap(), None);
    }

    #[test]
    fn resolves_ids_and_species_names() {
        let expected = vec![
            "Eukaryota",
            "Chordata",
            "Mammalia",
            "Carnivora",
            "Felidae",
            "Felis",
            "Felis_catus",
        ];

        let by_id = tree(CandidateKind::TaxonId);
        assert_eq!(by_id.resolve("9685").unwrap().values(), expected.as_slice());

        let by_name = tree(CandidateKind::SpeciesName);
        let taxon = by_name.lookup("Felis catus").unwrap().unwrap();
        assert_eq!(taxon.lineage.values(), expected.as_slice());
        assert_eq!(taxon.display_name(), "Felis_catus");
    }

    #[test]
    fn unknown_candidates_resolve_to_all_unknown() {
        let tree = tree(CandidateKind::TaxonId);
        assert_eq!(tree.lookup("NA").unwrap(), None);
        assert!(tree.resolve("NA").unwrap().is_all_unknown());
        assert_eq!(tree.resolve("NA").unwrap().len(), 7);
    }

    #[test]
    fn genus_level_hit_falls_back_to_own_name() {
        let tree = tree(CandidateKind::TaxonId);
        let taxon = tree.lookup("9682").unwrap().unwrap();
        assert_eq!(taxon.lineage.species(), None);
        assert_eq!(taxon.display_name(), "Felis");
    }

    #[test]
    fn root_hit_places_nothing() {
        let tree = tree(CandidateKind::TaxonId);
        assert_eq!(tree.walk("1").unwrap(), Some(Vec::new()));
        assert_eq!(tree.lookup("1").unwrap(), None);
        assert!(tree.resolve("1").unwrap().is_all_unknown());
    }

    #[test]
    fn overlong_walk_is_a_hard_failure() {
        let top = MAX_LINEAGE_DEPTH + 100;
        let mut nodes = NodeMap::new();
        for id in 0..top {
            nodes.insert(id.to_string(), node("no rank", &(id + 1).to_string()));
        }
        nodes.insert(top.to_string(), node("no rank", &top.to_string()));
        let tree = TaxonomyTree::new(
            nodes,
            NameMap::new(),
            NameMap::new(),
            ranks(),
            CandidateKind::TaxonId,
        );

        assert!(matches!(
            tree.walk("0"),
            Err(AlexError::LineageTooDeep { depth: 1024, .. })
        ));
        // a short walk in the same tree is fine
        let near_top = (top - 3).to_string();
        assert_eq!(tree.walk(&near_top).unwrap().map(|raw| raw.len()), Some(3));
    }

    #[test]
    fn cycles_are_hard_failures() {
        let mut nodes = NodeMap::new();
        nodes.insert("1".to_string(), node("no rank", "1"));
        nodes.insert("10".to_string(), node("genus", "11"));
        nodes.insert("11".to_string(), node("family", "10"));
        let tree = TaxonomyTree::new(
            nodes,
            NameMap::new(),
            NameMap::new(),
            ranks(),
            CandidateKind::TaxonId,
        );
        assert!(matches!(
            tree.walk("10"),
            Err(AlexError::TaxonomyCycle { .. })
        ));
    }

    #[test]
    fn dangling_parents_are_hard_failures() {
        let mut nodes = NodeMap::new();
        nodes.insert("10".to_string(), node("genus", "99"));
        let tree = TaxonomyTree::new(
            nodes,
            NameMap::new(),
            NameMap::new(),
            ranks(),
            CandidateKind::TaxonId,
        );
        match tree.lookup("10") {
            Err(AlexError::DanglingParent { tax_id, parent }) => {
                assert_eq!(tax_id, "10");
                assert_eq!(parent, "99");
            }
            other => panic!("expected dangling parent, got {:?}", other),
        }
    }

    #[test]
    fn malformed_nodes_line_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let nodes = dir.path().join("nodes.dmp");
        std::fs::write(&nodes, "1\t|\t1\t|\tno rank\t|\n2\t1\n").unwrap();
        assert!(matches!(
            parse_nodes(&nodes),
            Err(AlexError::MalformedTaxonomy { line: 2, .. })
        ));
    }
}
