//! Legacy VTK ASCII unstructured grid reader
//!
//! Supports the subset solver exports use for cell-centred results:
//!
//! ```text
//! # vtk DataFile Version 3.0
//! any title
//! ASCII
//! DATASET UNSTRUCTURED_GRID
//! POINTS n float
//! CELLS n size          (or OFFSETS / CONNECTIVITY blocks in 5.x files)
//! CELL_TYPES n
//! CELL_DATA n
//! SCALARS X_VELOCITY double 1
//! LOOKUP_TABLE default
//! ...
//! ```
//!
//! `VECTORS name` cell attributes are split into `X_name`, `Y_name` and
//! `Z_name` arrays. Point attributes are parsed and discarded.

use crate::core_types::Vec3;
use crate::error::FieldLoadError;
use crate::mesh::{Cell, CellDataSet, CellKind};
use std::iter::Peekable;
use std::str::SplitWhitespace;

/// Parse a legacy VTK ASCII file held in memory
pub(crate) fn parse(text: &str) -> Result<CellDataSet, FieldLoadError> {
    let mut lines = text.lines();

    let version = lines.next().unwrap_or_default();
    if !version.trim_start().starts_with("# vtk DataFile") {
        return Err(FieldLoadError::Parse(
            "missing '# vtk DataFile' header".to_string(),
        ));
    }
    let _title = lines.next();
    let encoding = lines.next().unwrap_or_default().trim();
    if encoding.eq_ignore_ascii_case("BINARY") {
        return Err(FieldLoadError::UnsupportedFormat(
            "binary legacy VTK files are not supported".to_string(),
        ));
    }
    if !encoding.eq_ignore_ascii_case("ASCII") {
        return Err(FieldLoadError::Parse(format!(
            "expected ASCII or BINARY, found '{encoding}'"
        )));
    }

    // the header is line based, the body is a plain token stream
    let body_start = text
        .match_indices('\n')
        .nth(2)
        .map_or(text.len(), |(i, _)| i + 1);
    let mut tokens = Tokens::new(&text[body_start..]);

    tokens.expect("DATASET")?;
    let kind = tokens.word("dataset type")?;
    if !kind.eq_ignore_ascii_case("UNSTRUCTURED_GRID") {
        return Err(FieldLoadError::UnsupportedFormat(format!(
            "dataset type {kind}, only UNSTRUCTURED_GRID is supported"
        )));
    }

    let mut dataset = CellDataSet::default();
    let mut connectivity: Vec<Vec<u32>> = Vec::new();
    let mut cell_types: Vec<u32> = Vec::new();

    while let Some(keyword) = tokens.next_token() {
        match keyword.to_ascii_uppercase().as_str() {
            "POINTS" => {
                let n = tokens.usize("point count")?;
                let _data_type = tokens.word("point data type")?;
                // n is untrusted; grow as values arrive
                for _ in 0..n {
                    let x = tokens.f64("point coordinate")?;
                    let y = tokens.f64("point coordinate")?;
                    let z = tokens.f64("point coordinate")?;
                    dataset
                        .points
                        .push(Vec3::new(x as f32, y as f32, z as f32));
                }
            }
            "CELLS" => connectivity = read_cells(&mut tokens)?,
            "CELL_TYPES" => {
                let n = tokens.usize("cell type count")?;
                cell_types = (0..n)
                    .map(|_| tokens.u32("cell type"))
                    .collect::<Result<_, _>>()?;
            }
            "CELL_DATA" => {
                let n = tokens.usize("cell data count")?;
                for (name, values) in read_attributes(&mut tokens, n)? {
                    dataset.insert_cell_array(name, values);
                }
            }
            "POINT_DATA" => {
                let n = tokens.usize("point data count")?;
                read_attributes(&mut tokens, n)?;
            }
            "METADATA" => skip_metadata(&mut tokens),
            other => {
                return Err(FieldLoadError::Parse(format!(
                    "unexpected keyword '{other}'"
                )))
            }
        }
    }

    if connectivity.len() != cell_types.len() {
        return Err(FieldLoadError::Parse(format!(
            "{} cells but {} cell types",
            connectivity.len(),
            cell_types.len()
        )));
    }

    dataset.cells = connectivity
        .into_iter()
        .zip(cell_types)
        .enumerate()
        .map(|(i, (nodes, type_id))| {
            CellKind::from_vtk_id(type_id)
                .map(|kind| Cell::new(kind, nodes))
                .ok_or_else(|| {
                    FieldLoadError::InvalidMesh(format!(
                        "cell {i} has unsupported VTK cell type {type_id}"
                    ))
                })
        })
        .collect::<Result<_, _>>()?;

    Ok(dataset)
}

/// Read a `CELLS` block in either the classic or the 5.x offsets layout
fn read_cells(tokens: &mut Tokens<'_>) -> Result<Vec<Vec<u32>>, FieldLoadError> {
    let n = tokens.usize("cell count")?;
    let size = tokens.usize("cell list size")?;

    if tokens.peek_is("OFFSETS") {
        // 5.x: n is the number of offsets, one more than the number of cells
        tokens.expect("OFFSETS")?;
        let _offset_type = tokens.word("offset type")?;
        let offsets = (0..n)
            .map(|_| tokens.usize("cell offset"))
            .collect::<Result<Vec<_>, _>>()?;
        tokens.expect("CONNECTIVITY")?;
        let _conn_type = tokens.word("connectivity type")?;
        let conn = (0..size)
            .map(|_| tokens.u32("cell node"))
            .collect::<Result<Vec<_>, _>>()?;

        return offsets
            .windows(2)
            .map(|w| {
                conn.get(w[0]..w[1]).map(<[u32]>::to_vec).ok_or_else(|| {
                    FieldLoadError::Parse(format!("cell offsets {}..{} out of range", w[0], w[1]))
                })
            })
            .collect();
    }

    let mut cells = Vec::new();
    let mut consumed = 0usize;
    for _ in 0..n {
        let count = tokens.usize("cell node count")?;
        let nodes = (0..count)
            .map(|_| tokens.u32("cell node"))
            .collect::<Result<Vec<_>, _>>()?;
        consumed = consumed.saturating_add(count).saturating_add(1);
        cells.push(nodes);
    }
    if consumed != size {
        return Err(FieldLoadError::Parse(format!(
            "CELLS declares {size} entries but {consumed} were read"
        )));
    }
    Ok(cells)
}

/// Read attribute blocks following `CELL_DATA n` / `POINT_DATA n`
///
/// Stops (without consuming) at the next section keyword.
fn read_attributes(
    tokens: &mut Tokens<'_>,
    n: usize,
) -> Result<Vec<(String, Vec<f64>)>, FieldLoadError> {
    let mut arrays = Vec::new();

    loop {
        let Some(keyword) = tokens.peek() else { break };
        match keyword.to_ascii_uppercase().as_str() {
            "SCALARS" => {
                tokens.next_token();
                let name = tokens.word("scalar name")?.to_string();
                let _data_type = tokens.word("scalar data type")?;
                let mut components = 1;
                if let Some(next) = tokens.peek() {
                    if let Ok(c) = next.parse::<usize>() {
                        components = c;
                        tokens.next_token();
                    }
                }
                if tokens.peek_is("LOOKUP_TABLE") {
                    tokens.next_token();
                    let _table = tokens.word("lookup table name")?;
                }
                let count = value_count(n, components, "SCALARS")?;
                let values = tokens.f64_vec(count, "scalar value")?;
                if components == 1 {
                    arrays.push((name, values));
                }
            }
            "VECTORS" | "NORMALS" => {
                let is_vectors = keyword.eq_ignore_ascii_case("VECTORS");
                tokens.next_token();
                let name = tokens.word("vector name")?.to_string();
                let _data_type = tokens.word("vector data type")?;
                let count = value_count(n, 3, "VECTORS")?;
                let values = tokens.f64_vec(count, "vector value")?;
                if is_vectors {
                    for (axis, prefix) in ["X", "Y", "Z"].iter().enumerate() {
                        let component = values.iter().skip(axis).step_by(3).copied().collect();
                        arrays.push((format!("{prefix}_{name}"), component));
                    }
                }
            }
            "FIELD" => {
                tokens.next_token();
                let _field_name = tokens.word("field name")?;
                let array_count = tokens.usize("field array count")?;
                for _ in 0..array_count {
                    let name = tokens.word("field array name")?.to_string();
                    let components = tokens.usize("field array components")?;
                    let tuples = tokens.usize("field array tuples")?;
                    let _data_type = tokens.word("field array data type")?;
                    let count = value_count(tuples, components, &name)?;
                    let values = tokens.f64_vec(count, "field value")?;
                    if components == 1 {
                        arrays.push((name, values));
                    }
                }
            }
            "LOOKUP_TABLE" => {
                tokens.next_token();
                let _name = tokens.word("lookup table name")?;
                let size = tokens.usize("lookup table size")?;
                let count = value_count(size, 4, "LOOKUP_TABLE")?;
                tokens.f64_vec(count, "lookup table entry")?;
            }
            "METADATA" => {
                tokens.next_token();
                skip_metadata(tokens);
            }
            _ => break,
        }
    }

    Ok(arrays)
}

/// Number of values in a block of `tuples` tuples of `components` each
fn value_count(tuples: usize, components: usize, block: &str) -> Result<usize, FieldLoadError> {
    tuples.checked_mul(components).ok_or_else(|| {
        FieldLoadError::Parse(format!(
            "{block} declares {tuples} x {components} values, which overflows"
        ))
    })
}

/// Skip a `METADATA` block, stopping at the next known section keyword
fn skip_metadata(tokens: &mut Tokens<'_>) {
    const SECTIONS: [&str; 7] = [
        "POINTS",
        "CELLS",
        "CELL_TYPES",
        "CELL_DATA",
        "POINT_DATA",
        "SCALARS",
        "FIELD",
    ];
    while let Some(t) = tokens.peek() {
        if SECTIONS.iter().any(|s| t.eq_ignore_ascii_case(s)) {
            break;
        }
        tokens.next_token();
    }
}

/// Whitespace token stream with typed accessors
struct Tokens<'a> {
    inner: Peekable<SplitWhitespace<'a>>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace().peekable(),
        }
    }

    fn next_token(&mut self) -> Option<&'a str> {
        self.inner.next()
    }

    fn peek(&mut self) -> Option<&'a str> {
        self.inner.peek().copied()
    }

    fn peek_is(&mut self, keyword: &str) -> bool {
        self.peek().is_some_and(|t| t.eq_ignore_ascii_case(keyword))
    }

    fn word(&mut self, what: &str) -> Result<&'a str, FieldLoadError> {
        self.next_token()
            .ok_or_else(|| FieldLoadError::Parse(format!("unexpected end of file reading {what}")))
    }

    fn expect(&mut self, keyword: &str) -> Result<(), FieldLoadError> {
        let t = self.word(keyword)?;
        if t.eq_ignore_ascii_case(keyword) {
            Ok(())
        } else {
            Err(FieldLoadError::Parse(format!(
                "expected '{keyword}', found '{t}'"
            )))
        }
    }

    fn parsed<T: std::str::FromStr>(&mut self, what: &str) -> Result<T, FieldLoadError> {
        let t = self.word(what)?;
        t.parse()
            .map_err(|_| FieldLoadError::Parse(format!("invalid {what} '{t}'")))
    }

    fn usize(&mut self, what: &str) -> Result<usize, FieldLoadError> {
        self.parsed(what)
    }

    fn u32(&mut self, what: &str) -> Result<u32, FieldLoadError> {
        self.parsed(what)
    }

    fn f64(&mut self, what: &str) -> Result<f64, FieldLoadError> {
        self.parsed(what)
    }

    fn f64_vec(&mut self, count: usize, what: &str) -> Result<Vec<f64>, FieldLoadError> {
        (0..count).map(|_| self.f64(what)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TETS: &str = "# vtk DataFile Version 3.0
two tets
ASCII
DATASET UNSTRUCTURED_GRID
POINTS 5 float
0 0 0  1 0 0  0 1 0  0 0 1  1 1 1
CELLS 2 10
4 0 1 2 3
4 1 2 3 4
CELL_TYPES 2
10
10
CELL_DATA 2
SCALARS X_VELOCITY double 1
LOOKUP_TABLE default
1.5 -2
FIELD FieldData 2
Y_VELOCITY 1 2 double
3 4
GRADIENT 3 2 double
0 0 0 0 0 0
VECTORS W float
1 2 3 4 5 6
POINT_DATA 5
SCALARS pressure float
LOOKUP_TABLE default
0 0 0 0 0
";

    #[test]
    fn test_parse_classic_layout() {
        let ds = parse(TWO_TETS).unwrap();
        assert_eq!(ds.points.len(), 5);
        assert_eq!(ds.cells.len(), 2);
        assert_eq!(ds.cells[1].nodes, vec![1, 2, 3, 4]);
        assert_eq!(ds.cells[0].kind, CellKind::Tetra);

        assert_eq!(ds.cell_array("X_VELOCITY"), Some(&[1.5, -2.0][..]));
        assert_eq!(ds.cell_array("Y_VELOCITY"), Some(&[3.0, 4.0][..]));
        assert_eq!(ds.cell_array("X_W"), Some(&[1.0, 4.0][..]));
        assert_eq!(ds.cell_array("Z_W"), Some(&[3.0, 6.0][..]));
        assert!(ds.cell_array("GRADIENT").is_none());
        assert!(ds.cell_array("pressure").is_none());
    }

    #[test]
    fn test_parse_offsets_layout() {
        let text = "# vtk DataFile Version 5.1
offsets
ASCII
DATASET UNSTRUCTURED_GRID
POINTS 4 double
0 0 0 1 0 0 0 1 0 0 0 1
CELLS 2 4
OFFSETS vtktypeint64
0 4
CONNECTIVITY vtktypeint64
0 1 2 3
CELL_TYPES 1
10
";
        let ds = parse(text).unwrap();
        assert_eq!(ds.cells.len(), 1);
        assert_eq!(ds.cells[0].nodes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_rejects_binary_and_other_datasets() {
        let binary = "# vtk DataFile Version 3.0\nx\nBINARY\nDATASET UNSTRUCTURED_GRID\n";
        assert!(matches!(
            parse(binary),
            Err(FieldLoadError::UnsupportedFormat(_))
        ));

        let poly = "# vtk DataFile Version 3.0\nx\nASCII\nDATASET POLYDATA\n";
        assert!(matches!(
            parse(poly),
            Err(FieldLoadError::UnsupportedFormat(_))
        ));

        assert!(matches!(
            parse("not a vtk file"),
            Err(FieldLoadError::Parse(_))
        ));
    }

    #[test]
    fn test_unsupported_cell_type() {
        let text = "# vtk DataFile Version 3.0
tri
ASCII
DATASET UNSTRUCTURED_GRID
POINTS 3 float
0 0 0 1 0 0 0 1 0
CELLS 1 4
3 0 1 2
CELL_TYPES 1
5
";
        assert!(matches!(parse(text), Err(FieldLoadError::InvalidMesh(_))));
    }

    #[test]
    fn test_huge_counts_are_errors() {
        let header = "# vtk DataFile Version 3.0\nhuge\nASCII\nDATASET UNSTRUCTURED_GRID\n";
        let max = usize::MAX;
        for body in [
            format!("POINTS {max} float\n0 0 0\n"),
            format!("CELLS {max} {max}\n4 0 1 2 3\n"),
            format!("CELLS {max} 4\nOFFSETS vtktypeint64\n0 4\n"),
            format!("CELL_TYPES {max}\n10\n"),
            format!("CELL_DATA {max}\nSCALARS X_VELOCITY double 1\n1 2\n"),
        ] {
            let err = parse(&format!("{header}{body}")).unwrap_err();
            assert!(matches!(err, FieldLoadError::Parse(_)), "{body}: {err}");
        }
    }

    #[test]
    fn test_overflowing_value_counts_are_errors() {
        let header = "# vtk DataFile Version 3.0\nhuge\nASCII\nDATASET UNSTRUCTURED_GRID\n";
        let max = usize::MAX;
        for body in [
            format!("CELL_DATA {max}\nSCALARS X_VELOCITY double 3\n1 2\n"),
            format!("CELL_DATA {max}\nVECTORS V float\n1 2 3\n"),
            format!("CELL_DATA 2\nFIELD F 1\nA 2 {max} double\n1 2\n"),
            format!("POINT_DATA 2\nLOOKUP_TABLE t {max}\n0 0 0 0\n"),
        ] {
            let err = parse(&format!("{header}{body}")).unwrap_err();
            assert!(err.to_string().contains("overflows"), "{body}: {err}");
        }
    }

    #[test]
    fn test_truncated_file() {
        let text = "# vtk DataFile Version 3.0
cut
ASCII
DATASET UNSTRUCTURED_GRID
POINTS 2 float
0 0 0 1
";
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("point coordinate"));
    }
}
