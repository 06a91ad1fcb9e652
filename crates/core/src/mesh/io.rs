//! Loading cell datasets from disk
//!
//! The format is chosen from the file extension:
//! - `.vtk`: legacy VTK ASCII unstructured grid
//! - `.json`: serde representation of [`CellDataSet`]

use crate::error::FieldLoadError;
use crate::mesh::{vtk, CellDataSet};
use std::fs;
use std::path::Path;
use tracing::info;

/// Read a dataset, dispatching on the file extension
///
/// # Errors
/// Returns error if the file cannot be read, its extension is not a supported
/// format, or its contents fail to parse
pub fn read_dataset<P: AsRef<Path>>(path: P) -> Result<CellDataSet, FieldLoadError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let parse: fn(&str) -> Result<CellDataSet, FieldLoadError> = match extension.as_str() {
        "vtk" => vtk::parse,
        "json" => parse_json,
        _ => {
            return Err(FieldLoadError::UnsupportedFormat(format!(
                "unknown dataset extension '{extension}' ({})",
                path.display()
            )))
        }
    };

    let contents = fs::read_to_string(path).map_err(|source| FieldLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = parse(&contents)?;

    info!(
        "Loaded dataset {}: {} points, {} cells, {} cell arrays",
        path.display(),
        dataset.points.len(),
        dataset.cells.len(),
        dataset.cell_arrays.len()
    );
    Ok(dataset)
}

/// Write a dataset as JSON
///
/// # Errors
/// Returns error if the dataset cannot be serialized or the file cannot be written
pub fn write_dataset_json<P: AsRef<Path>>(
    dataset: &CellDataSet,
    path: P,
) -> Result<(), FieldLoadError> {
    let path = path.as_ref();
    let contents = serde_json::to_string(dataset)
        .map_err(|e| FieldLoadError::Parse(format!("failed to serialize dataset: {e}")))?;
    fs::write(path, contents).map_err(|source| FieldLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_json(text: &str) -> Result<CellDataSet, FieldLoadError> {
    serde_json::from_str(text).map_err(|e| FieldLoadError::Parse(e.to_string()))
}
