//src/lineage_table.rs

use std::path::Path;

use ahash::AHashMap;

use crate::error::AlexError;
use crate::reader::for_each_line;
use crate::resolver::TaxonomyResolver;
use crate::types::{CanonicalLineage, ResolvedTaxon, UNKNOWN};

const TAXID_COLUMN: usize = 0;
const COMMON_NAME_COLUMN: usize = 1;
/// Column of the first canonical rank; the others follow in rank order.
const FIRST_RANK_COLUMN: usize = 2;

/// One row of the curated table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub lineage: CanonicalLineage,
    pub common_name: Option<String>,
}

/// Curated `taxon id -> lineage` table. Lookups need no tree walk.
#[derive(Debug, Clone)]
pub struct LineageTable {
    entries: AHashMap<String, TableEntry>,
    ranks: Vec<String>,
}

fn value_or_unknown(field: &str) -> String {
    let field = field.trim();
    if field.is_empty() {
        UNKNOWN.to_string()
    } else {
        field.to_string()
    }
}

impl LineageTable {
    /// Load a tab-separated table:
    /// ```text
    /// <taxid>\t<common name>\t<kingdom>\t<phylum>\t...\t<species>
    /// ```
    /// Lines starting with `#` are headers/comments. Empty cells become `NA`.
    pub fn from_file<P: AsRef<Path>>(path: P, ranks: Vec<String>) -> Result<Self, AlexError> {
        let path = path.as_ref();
        let mut entries = AHashMap::new();
        let needed = FIRST_RANK_COLUMN + ranks.len();

        for_each_line(path, |line_no, line| {
            if line.trim().is_empty() || line.starts_with('#') {
                return Ok(());
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < needed {
                return Err(AlexError::MalformedTable {
                    path: path.to_path_buf(),
                    line: line_no,
                    reason: format!("expected {needed} columns, found {}", fields.len()),
                });
            }

            let tax_id = fields[TAXID_COLUMN].trim();
            if tax_id.is_empty() {
                return Err(AlexError::MalformedTable {
                    path: path.to_path_buf(),
                    line: line_no,
                    reason: "empty taxon id".to_string(),
                });
            }

            let lineage = fields[FIRST_RANK_COLUMN..needed]
                .iter()
                .map(|f| value_or_unknown(f))
                .collect();
            let common_name = Some(value_or_unknown(fields[COMMON_NAME_COLUMN]))
                .filter(|name| name != UNKNOWN);

            entries.insert(
                tax_id.to_string(),
                TableEntry {
                    lineage: CanonicalLineage(lineage),
                    common_name,
                },
            );
            Ok(())
        })?;

        log::info!(
            "Loaded {} curated lineages from {}",
            entries.len(),
            path.display()
        );
        Ok(Self { entries, ranks })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, tax_id: &str) -> Option<&TableEntry> {
        self.entries.get(tax_id.trim())
    }
}

impl TaxonomyResolver for LineageTable {
    fn ranks(&self) -> &[String] {
        &self.ranks
    }

    fn lookup(&self, candidate: &str) -> Result<Option<ResolvedTaxon>, AlexError> {
        Ok(self.get(candidate).map(|entry| ResolvedTaxon {
            lineage: entry.lineage.clone(),
            fallback_name: entry.common_name.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TABLE_RANKS;

    fn ranks() -> Vec<String> {
        TABLE_RANKS.iter().map(|r| r.to_string()).collect()
    }

    fn write_table(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineages.tsv");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_rows_and_resolves_directly() {
        let (_dir, path) = write_table(
            "#taxid\tcommon\tkingdom\tphylum\tclass\torder\tfamily\tgenus\tspecies\n\
             9685\tdomestic cat\tAnimalia\tChordata\tMammalia\tCarnivora\tFelidae\tFelis\tFelis_catus\n\
             8030\tAtlantic salmon\tAnimalia\tChordata\tActinopteri\tSalmoniformes\tSalmonidae\tSalmo\t\n",
        );
        let table = LineageTable::from_file(&path, ranks()).unwrap();
        assert_eq!(table.len(), 2);

        let cat = table.lookup("9685").unwrap().unwrap();
        assert_eq!(cat.lineage.values()[6], "Felis_catus");
        assert_eq!(cat.display_name(), "Felis_catus");

        let salmon = table.lookup("8030").unwrap().unwrap();
        assert_eq!(salmon.lineage.values()[6], UNKNOWN);
        assert_eq!(salmon.display_name(), "Atlantic salmon");
    }

    #[test]
    fn missing_taxon_is_all_unknown() {
        let (_dir, path) = write_table("1\t\tA\tB\tC\tD\tE\tF\tG\n");
        let table = LineageTable::from_file(&path, ranks()).unwrap();
        assert_eq!(table.lookup("2").unwrap(), None);
        assert!(table.resolve("2").unwrap().is_all_unknown());
        assert_eq!(table.lookup("1").unwrap().unwrap().fallback_name, None);
    }

    #[test]
    fn short_rows_are_rejected() {
        let (_dir, path) = write_table("1\tcat\tAnimalia\tChordata\n");
        assert!(matches!(
            LineageTable::from_file(&path, ranks()),
            Err(AlexError::MalformedTable { line: 1, .. })
        ));
    }
}
