//src/blast.rs

use std::path::Path;

use crate::config::CandidateKind;
use crate::error::AlexError;
use crate::reader::for_each_line;
use crate::types::{BestHit, BestHitSet, HitRecord, NULL_TAXON, SKIP_SENTINEL};

const QUERY_FIELD: usize = 0;
const IDENTITY_FIELD: usize = 5;
const COVERAGE_FIELD: usize = 7;
/// A hit line needs at least this many tab-separated fields.
pub const MIN_HIT_FIELDS: usize = COVERAGE_FIELD + 1;

/// Parse one tab-separated BLAST line into a `HitRecord`.
///
/// Fields: query id (0), taxon id (2) or species name (3), percent
/// identity (5), query coverage (7). If `query_delimiter` is set, the
/// query id is cut at its first occurrence (`Zotu1;size=10` -> `Zotu1`).
pub fn parse_hit_line(
    line: &str,
    line_no: usize,
    kind: CandidateKind,
    query_delimiter: Option<char>,
) -> Result<HitRecord, AlexError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < MIN_HIT_FIELDS {
        return Err(AlexError::MalformedHit {
            line: line_no,
            reason: format!(
                "expected at least {MIN_HIT_FIELDS} tab-separated fields, found {}",
                fields.len()
            ),
        });
    }

    let raw_query = fields[QUERY_FIELD];
    let query_id = match query_delimiter {
        Some(delim) => raw_query.split(delim).next().unwrap_or(raw_query),
        None => raw_query,
    };
    if query_id.is_empty() {
        return Err(AlexError::MalformedHit {
            line: line_no,
            reason: "empty query id".to_string(),
        });
    }

    let identity_str = fields[IDENTITY_FIELD].trim();
    let identity: f64 = identity_str
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AlexError::MalformedHit {
            line: line_no,
            reason: format!("percent identity `{identity_str}` is not a number"),
        })?;

    let coverage_str = fields[COVERAGE_FIELD].trim();
    let coverage: u32 = coverage_str.parse().map_err(|_| AlexError::MalformedHit {
        line: line_no,
        reason: format!("query coverage `{coverage_str}` is not an integer"),
    })?;

    Ok(HitRecord {
        query_id: query_id.to_string(),
        candidate: fields[kind.hit_field()].trim().to_string(),
        identity,
        coverage,
    })
}

/// Fold one hit into the best-hit set.
///
/// Branch order matters:
///   1. unseen query => seed
///   2. identity and coverage both tie => add the candidate (unless already
///      present or the null taxon)
///   3. one metric improves while the other ties, or both improve => replace
///   4. anything else => drop
pub fn fold_hit(best_hits: &mut BestHitSet, record: HitRecord) {
    let Some(best) = best_hits.get_mut(&record.query_id) else {
        let query_id = record.query_id.clone();
        best_hits.insert(query_id, BestHit::seed(record));
        return;
    };

    // every entry seen while streaming was seeded from a hit
    debug_assert!(best.identity.is_some() && best.coverage.is_some());
    let best_identity = best.identity.unwrap_or(f64::NEG_INFINITY);
    let best_coverage = best.coverage.unwrap_or(0);

    let identity_ties = record.identity == best_identity;
    let coverage_ties = record.coverage == best_coverage;
    let identity_better = record.identity > best_identity;
    let coverage_better = record.coverage > best_coverage;

    if identity_ties && coverage_ties {
        if record.candidate != NULL_TAXON && !best.candidates.contains(&record.candidate) {
            log::debug!(
                "{}: co-best candidate {} at {}/{}",
                record.query_id,
                record.candidate,
                record.identity,
                record.coverage
            );
            best.candidates.push(record.candidate);
        }
    } else if (identity_ties && coverage_better)
        || (identity_better && coverage_ties)
        || (identity_better && coverage_better)
    {
        log::debug!(
            "{}: {} replaces {} candidate(s) at {}/{}",
            record.query_id,
            record.candidate,
            best.candidates.len(),
            record.identity,
            record.coverage
        );
        *best = BestHit::seed(record);
    }
}

/// Stream a BLAST tabular file into a `BestHitSet` in a single pass.
///
/// `not assigned` lines and blank lines are skipped; any other line
/// that does not parse aborts the run.
pub fn read_best_hits<P: AsRef<Path>>(
    path: P,
    kind: CandidateKind,
    query_delimiter: Option<char>,
) -> Result<BestHitSet, AlexError> {
    let mut best_hits = BestHitSet::new();
    let mut n_hits = 0usize;

    for_each_line(&path, |line_no, line| {
        if line.is_empty() || line.trim() == SKIP_SENTINEL {
            return Ok(());
        }
        let record = parse_hit_line(line, line_no, kind, query_delimiter)?;
        n_hits += 1;
        fold_hit(&mut best_hits, record);
        Ok(())
    })?;

    log::info!(
        "Read {} BLAST hits for {} queries from {}",
        n_hits,
        best_hits.len(),
        path.as_ref().display()
    );
    Ok(best_hits)
}
