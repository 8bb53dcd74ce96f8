//src/report.rs

use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::AlexError;
use crate::types::{ReportRow, UNKNOWN};

/// Header line (without newline) for the given canonical ranks.
pub fn report_header<S: AsRef<str>>(ranks: &[S]) -> String {
    let ranks: Vec<&str> = ranks.iter().map(|r| r.as_ref()).collect();
    format!(
        "#OTU ID\t{}\tpident\tqcov\tmatching species IDs",
        ranks.join("\t")
    )
}

/// Percent identity with at least one decimal (`98.0`, `97.531`), or `NA`.
pub fn format_identity(identity: Option<f64>) -> String {
    identity
        .map(|v| format!("{:?}", v))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn format_coverage(coverage: Option<u32>) -> String {
    coverage
        .map(|v| v.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// One tab-separated report line (without newline).
pub fn format_row(row: &ReportRow) -> String {
    let mut line = String::new();
    line.push_str(&row.cluster_id);
    for value in row.lineage.values() {
        line.push('\t');
        line.push_str(value);
    }
    let _ = write!(
        line,
        "\t{}\t{}\t{}",
        format_identity(row.identity),
        format_coverage(row.coverage),
        row.contributing_taxa.join(", ")
    );
    line
}

/// Render header and rows as one string.
pub fn render_report<S: AsRef<str>>(ranks: &[S], rows: &[ReportRow]) -> String {
    let mut output = String::new();
    output.push_str(&report_header(ranks));
    output.push('\n');
    for row in rows {
        output.push_str(&format_row(row));
        output.push('\n');
    }
    output
}

/// Write the report to `path`, one line per row.
pub fn write_report<P: AsRef<Path>, S: AsRef<str>>(
    path: P,
    ranks: &[S],
    rows: &[ReportRow],
) -> Result<(), AlexError> {
    let path = path.as_ref();
    let to_err = |source: std::io::Error| AlexError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(to_err)?;
    let mut out = BufWriter::new(file);
    writeln!(out, "{}", report_header(ranks)).map_err(to_err)?;
    for row in rows {
        writeln!(out, "{}", format_row(row)).map_err(to_err)?;
    }
    out.flush().map_err(to_err)?;

    log::info!("Wrote {} report rows to {}", rows.len(), path.display());
    Ok(())
}
