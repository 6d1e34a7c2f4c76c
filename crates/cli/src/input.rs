//! Cost-matrix files: JSON (`null` = forbidden) or header-less CSV
//! (`INF`, `inf`, `-` or an empty cell = forbidden).
//!
//! Diagonal cells are ignored and always treated as forbidden, so matrices
//! exported with a zero diagonal load as-is.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use tsp_bnb::{Cost, CostMatrix};

/// Load a matrix, picking the format from the file extension.
pub fn read_matrix(path: &Path) -> Result<CostMatrix> {
    let rows = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => read_json_rows(path)?,
        Some("csv") => read_csv_rows(path)?,
        other => bail!(
            "unsupported matrix format {:?} for {} (expected .json or .csv)",
            other,
            path.display()
        ),
    };
    let matrix = CostMatrix::from_rows(forbid_diagonal(rows))
        .with_context(|| format!("validating {}", path.display()))?;
    Ok(matrix)
}

/// Write a matrix as JSON rows with `null` for forbidden cells.
pub fn write_json_matrix(path: &Path, matrix: &CostMatrix) -> Result<()> {
    let rows: Vec<Vec<Option<u64>>> = matrix
        .to_rows()
        .into_iter()
        .map(|row| row.into_iter().map(Cost::finite).collect())
        .collect();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    fs::write(path, serde_json::to_vec(&rows)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn forbid_diagonal(mut rows: Vec<Vec<Cost>>) -> Vec<Vec<Cost>> {
    for (i, row) in rows.iter_mut().enumerate() {
        if let Some(cell) = row.get_mut(i) {
            *cell = Cost::Forbidden;
        }
    }
    rows
}

fn read_json_rows(path: &Path) -> Result<Vec<Vec<Cost>>> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let rows: Vec<Vec<Option<u64>>> = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing {} as JSON rows", path.display()))?;
    Ok(rows
        .into_iter()
        .map(|row| row.into_iter().map(Cost::from).collect())
        .collect())
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<Cost>>> {
    // Schema inference off: every column comes back as strings.
    let df = LazyCsvReader::new(path)
        .with_has_header(false)
        .with_infer_schema_length(Some(0))
        .finish()
        .with_context(|| format!("opening {}", path.display()))?
        .collect()
        .with_context(|| format!("reading {}", path.display()))?;
    let mut rows: Vec<Vec<Cost>> = vec![Vec::with_capacity(df.width()); df.height()];
    for column in df.get_columns() {
        for (r, cell) in column.str()?.into_iter().enumerate() {
            rows[r].push(parse_cell(cell)?);
        }
    }
    Ok(rows)
}

fn parse_cell(cell: Option<&str>) -> Result<Cost> {
    match cell.map(str::trim) {
        None | Some("") | Some("-") => Ok(Cost::Forbidden),
        Some(s) if s.eq_ignore_ascii_case("inf") => Ok(Cost::Forbidden),
        Some(s) => s
            .parse::<u64>()
            .map(Cost::Finite)
            .with_context(|| format!("invalid cost cell {s:?}")),
    }
}
