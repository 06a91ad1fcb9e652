//! Errors raised while loading velocity fields

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that can occur while loading a cell dataset or building a field from it
///
/// A field is never returned in a partially constructed state: every load
/// path either yields a complete field or one of these errors.
#[derive(Debug)]
pub enum FieldLoadError {
    /// Failed to read the source file
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// Failed to parse file contents
    Parse(String),
    /// File format or dataset kind is not supported
    UnsupportedFormat(String),
    /// Mesh topology is inconsistent (bad node index, wrong node count, unknown cell type)
    InvalidMesh(String),
    /// A required per-cell array is absent
    MissingArray(String),
    /// A per-cell array does not have one value per cell
    ArrayLength {
        /// Array name
        name: String,
        /// Number of cells in the mesh
        expected: usize,
        /// Number of values found
        actual: usize,
    },
    /// The mesh contains no cells
    EmptyMesh,
}

impl fmt::Display for FieldLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldLoadError::Io { path, source } => {
                write!(f, "Failed to read {}: {source}", path.display())
            }
            FieldLoadError::Parse(msg) => write!(f, "Failed to parse: {msg}"),
            FieldLoadError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {msg}"),
            FieldLoadError::InvalidMesh(msg) => write!(f, "Invalid mesh: {msg}"),
            FieldLoadError::MissingArray(name) => {
                write!(f, "Required cell array '{name}' is missing")
            }
            FieldLoadError::ArrayLength {
                name,
                expected,
                actual,
            } => write!(
                f,
                "Cell array '{name}' has {actual} values, expected {expected}"
            ),
            FieldLoadError::EmptyMesh => write!(f, "Mesh contains no cells"),
        }
    }
}

impl std::error::Error for FieldLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FieldLoadError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_messages() {
        let err = FieldLoadError::MissingArray("X_VELOCITY".to_string());
        assert_eq!(err.to_string(), "Required cell array 'X_VELOCITY' is missing");

        let err = FieldLoadError::ArrayLength {
            name: "Y_VELOCITY".to_string(),
            expected: 8,
            actual: 7,
        };
        assert_eq!(
            err.to_string(),
            "Cell array 'Y_VELOCITY' has 7 values, expected 8"
        );
    }

    #[test]
    fn test_io_source() {
        let err = FieldLoadError::Io {
            path: PathBuf::from("missing.vtk"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Failed to read missing.vtk"));
        assert!(FieldLoadError::EmptyMesh.source().is_none());
    }
}
