//! Typed column-store catalog.
//!
//! A catalog is an ordered set of equally long, typed columns plus the name of
//! the file it came from. Row order is significant: reference identifiers are
//! assigned in the order rows were loaded and nothing here reorders them.

use crate::error::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use skymatch_core::SkyPosition;

pub const RA_COLUMN: &str = "RA";
pub const DEC_COLUMN: &str = "Dec";
pub const DATA_NUM_COLUMN: &str = "DataNum";
pub const SOURCE_FILE_COLUMN: &str = "SourceFile";
pub const NUM_SOURCES_COLUMN: &str = "NumSources";

/// `DataNum` of a row with no counterpart in the reference catalog
pub const UNMATCHED: i64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    /// Kind able to hold values of both kinds: equal kinds are kept, mixed
    /// numeric kinds widen to Float, text never mixes with numbers.
    pub fn unify(self, other: ColumnKind) -> Option<ColumnKind> {
        if self == other {
            Some(self)
        } else if self.is_numeric() && other.is_numeric() {
            Some(ColumnKind::Float)
        } else {
            None
        }
    }

    fn label(self) -> &'static str {
        match self {
            ColumnKind::Integer => "int",
            ColumnKind::Float => "float",
            ColumnKind::Text => "str",
        }
    }
}

/// Column name and declared type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub kind: ColumnKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Integer(Vec<i64>),
    Float(Vec<f64>),
    Text(Vec<String>),
}

impl Column {
    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Integer(_) => ColumnKind::Integer,
            Column::Float(_) => ColumnKind::Float,
            Column::Text(_) => ColumnKind::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Integer(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric values widened to f64; `None` for text columns
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            Column::Integer(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Column::Float(v) => Some(v.clone()),
            Column::Text(_) => None,
        }
    }

    /// Convert to `kind` where no value is lost.
    ///
    /// An empty column becomes an empty column of `kind` and an integer column
    /// widens to float. Any other conversion returns the column unchanged.
    pub fn cast(self, kind: ColumnKind) -> Column {
        match (self, kind) {
            (column, kind) if column.kind() == kind => column,
            (column, ColumnKind::Integer) if column.is_empty() => Column::Integer(Vec::new()),
            (column, ColumnKind::Float) if column.is_empty() => Column::Float(Vec::new()),
            (column, ColumnKind::Text) if column.is_empty() => Column::Text(Vec::new()),
            (Column::Integer(v), ColumnKind::Float) => Column::Float(v.into_iter().map(|x| x as f64).collect()),
            (column, _) => column,
        }
    }

    /// Cell rendered for serialization. NaN becomes an empty cell.
    pub fn cell(&self, row: usize) -> String {
        match self {
            Column::Integer(v) => v[row].to_string(),
            Column::Float(v) if v[row].is_nan() => String::new(),
            Column::Float(v) => format!("{:?}", v[row]),
            Column::Text(v) => v[row].clone(),
        }
    }

    fn append(&mut self, other: &Column) {
        if other.is_empty() {
            return;
        }
        match (self, other) {
            (Column::Integer(a), Column::Integer(b)) => a.extend_from_slice(b),
            (Column::Float(a), Column::Float(b)) => a.extend_from_slice(b),
            (Column::Float(a), Column::Integer(b)) => a.extend(b.iter().map(|&x| x as f64)),
            (Column::Text(a), Column::Text(b)) => a.extend(b.iter().cloned()),
            _ => unreachable!("column kinds checked before append"),
        }
    }
}

/// In-memory table of detected sources from one exposure
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    source_file: String,
    fields: Vec<Field>,
    columns: Vec<Column>,
    rows: usize,
}

impl Catalog {
    /// Catalog with no columns and no rows
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            fields: Vec::new(),
            columns: Vec::new(),
            rows: 0,
        }
    }

    /// Build from named columns. All columns must have the same length and
    /// names must be unique.
    pub fn from_columns(
        source_file: impl Into<String>,
        columns: Vec<(String, Column)>,
    ) -> CatalogResult<Self> {
        let mut catalog = Self::new(source_file);
        if let Some((_, first)) = columns.first() {
            catalog.rows = first.len();
        }
        for (name, column) in columns {
            if catalog.column_index(&name).is_some() {
                return Err(CatalogError::DuplicateColumn(name));
            }
            catalog.push_column(name, column)?;
        }
        Ok(catalog)
    }

    /// Same table under a different source name
    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = source_file.into();
        self
    }

    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Ordered column schema
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn columns(&self) -> impl Iterator<Item = (&Field, &Column)> {
        self.fields.iter().zip(self.columns.iter())
    }

    /// Schema rendered as `name:type, ...` for diagnostics
    pub fn schema_string(&self) -> String {
        self.fields
            .iter()
            .map(|f| format!("{}:{}", f.name, f.kind.label()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    pub fn require_column(&self, name: &str) -> CatalogResult<&Column> {
        self.column(name).ok_or_else(|| CatalogError::MissingColumn {
            catalog: self.source_file.clone(),
            column: name.to_string(),
        })
    }

    /// Numeric column widened to f64
    pub fn float_values(&self, name: &str) -> CatalogResult<Vec<f64>> {
        self.require_column(name)?
            .to_f64()
            .ok_or_else(|| self.non_numeric(name))
    }

    /// Integer column values
    pub fn integer_values(&self, name: &str) -> CatalogResult<&[i64]> {
        match self.require_column(name)? {
            Column::Integer(v) => Ok(v),
            _ => Err(self.non_numeric(name)),
        }
    }

    /// Validated RA/Dec of every row
    pub fn positions(&self) -> CatalogResult<Vec<SkyPosition>> {
        let ra = self.float_values(RA_COLUMN)?;
        let dec = self.float_values(DEC_COLUMN)?;

        ra.into_iter()
            .zip(dec)
            .enumerate()
            .map(|(row, (ra, dec))| {
                let pos = SkyPosition::new(ra, dec);
                if pos.is_valid() {
                    Ok(pos)
                } else {
                    Err(CatalogError::InvalidCoordinate {
                        catalog: self.source_file.clone(),
                        row,
                        ra,
                        dec,
                    })
                }
            })
            .collect()
    }

    /// Replace the named column in place, or append it if absent
    pub fn set_column(&mut self, name: &str, column: Column) -> CatalogResult<()> {
        if self.fields.is_empty() {
            self.rows = column.len();
        }
        if column.len() != self.rows {
            return Err(CatalogError::LengthMismatch {
                column: name.to_string(),
                expected: self.rows,
                found: column.len(),
            });
        }

        match self.column_index(name) {
            Some(i) => {
                self.fields[i].kind = column.kind();
                self.columns[i] = column;
            }
            None => self.push_column(name.to_string(), column)?,
        }
        Ok(())
    }

    /// Fail unless `other` has the same column names in the same order with
    /// compatible kinds (see [`Catalog::merged_kinds`]).
    pub fn check_schema(&self, other: &Catalog) -> CatalogResult<()> {
        self.merged_kinds(other).map(|_| ())
    }

    /// Column kinds of this catalog stacked on `other`.
    ///
    /// Columns of a catalog without rows carry no type information and take
    /// the other side's kind. Integer and Float widen to Float. Differing
    /// names, order, or text against numbers is a `SchemaMismatch`.
    pub fn merged_kinds(&self, other: &Catalog) -> CatalogResult<Vec<ColumnKind>> {
        let same_names = self.fields.len() == other.fields.len()
            && self.fields.iter().zip(&other.fields).all(|(a, b)| a.name == b.name);
        if !same_names {
            return Err(self.schema_mismatch(other));
        }

        self.fields
            .iter()
            .zip(&other.fields)
            .map(|(a, b)| {
                if other.is_empty() {
                    Some(a.kind)
                } else if self.is_empty() {
                    Some(b.kind)
                } else {
                    a.kind.unify(b.kind)
                }
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| self.schema_mismatch(other))
    }

    /// Append all rows of `other`, widening columns where the kinds differ
    pub fn extend_rows(&mut self, other: &Catalog) -> CatalogResult<()> {
        let kinds = self.merged_kinds(other)?;
        for (i, kind) in kinds.into_iter().enumerate() {
            if self.fields[i].kind != kind {
                let column = std::mem::replace(&mut self.columns[i], Column::Integer(Vec::new()));
                self.columns[i] = column.cast(kind);
                self.fields[i].kind = kind;
            }
            self.columns[i].append(&other.columns[i]);
        }
        self.rows += other.rows;
        Ok(())
    }

    fn push_column(&mut self, name: String, column: Column) -> CatalogResult<()> {
        if column.len() != self.rows {
            return Err(CatalogError::LengthMismatch {
                column: name,
                expected: self.rows,
                found: column.len(),
            });
        }
        self.fields.push(Field {
            name,
            kind: column.kind(),
        });
        self.columns.push(column);
        Ok(())
    }

    fn schema_mismatch(&self, other: &Catalog) -> CatalogError {
        CatalogError::SchemaMismatch {
            expected_source: self.source_file.clone(),
            expected: self.schema_string(),
            found_source: other.source_file.clone(),
            found: other.schema_string(),
        }
    }

    fn non_numeric(&self, name: &str) -> CatalogError {
        CatalogError::NonNumericColumn {
            catalog: self.source_file.clone(),
            column: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::from_columns(
            "a.csv",
            vec![
                ("RA".to_string(), Column::Float(vec![10.0, 10.1])),
                ("Dec".to_string(), Column::Float(vec![20.0, 20.1])),
                ("Flux".to_string(), Column::Integer(vec![100, 200])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_columns_rejects_ragged_columns() {
        let err = Catalog::from_columns(
            "bad.csv",
            vec![
                ("RA".to_string(), Column::Float(vec![1.0, 2.0])),
                ("Dec".to_string(), Column::Float(vec![1.0])),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::LengthMismatch { .. }));
    }

    #[test]
    fn test_from_columns_rejects_duplicate_names() {
        let err = Catalog::from_columns(
            "bad.csv",
            vec![
                ("RA".to_string(), Column::Float(vec![1.0])),
                ("RA".to_string(), Column::Float(vec![1.0])),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateColumn(name) if name == "RA"));
    }

    #[test]
    fn test_set_column_replaces_in_place() {
        let mut cat = sample();
        cat.set_column("DataNum", Column::Integer(vec![0, 0])).unwrap();
        cat.set_column("Flux", Column::Float(vec![1.5, 2.5])).unwrap();
        cat.set_column("DataNum", Column::Integer(vec![7, 8])).unwrap();

        let names: Vec<_> = cat.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["RA", "Dec", "Flux", "DataNum"]);
        assert_eq!(cat.integer_values("DataNum").unwrap(), &[7, 8]);
        assert_eq!(cat.fields()[2].kind, ColumnKind::Float);
    }

    #[test]
    fn test_set_column_checks_length() {
        let mut cat = sample();
        let err = cat.set_column("DataNum", Column::Integer(vec![1])).unwrap_err();
        assert!(matches!(err, CatalogError::LengthMismatch { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_positions_require_ra_and_dec() {
        let cat = Catalog::from_columns(
            "nodec.csv",
            vec![("RA".to_string(), Column::Float(vec![1.0]))],
        )
        .unwrap();
        let err = cat.positions().unwrap_err();
        assert!(matches!(err, CatalogError::MissingColumn { column, .. } if column == "Dec"));
    }

    #[test]
    fn test_positions_reject_invalid_declination() {
        let cat = Catalog::from_columns(
            "pole.csv",
            vec![
                ("RA".to_string(), Column::Float(vec![1.0, 2.0])),
                ("Dec".to_string(), Column::Float(vec![0.0, 95.0])),
            ],
        )
        .unwrap();
        let err = cat.positions().unwrap_err();
        assert!(matches!(err, CatalogError::InvalidCoordinate { row: 1, .. }));
    }

    #[test]
    fn test_extend_rows_requires_identical_schema() {
        let mut a = sample();
        let b = sample().with_source_file("b.csv");
        a.extend_rows(&b).unwrap();
        assert_eq!(a.len(), 4);

        let reordered = Catalog::from_columns(
            "c.csv",
            vec![
                ("Dec".to_string(), Column::Float(vec![20.0])),
                ("RA".to_string(), Column::Float(vec![10.0])),
                ("Flux".to_string(), Column::Integer(vec![100])),
            ],
        )
        .unwrap();
        let err = a.extend_rows(&reordered).unwrap_err();
        assert!(matches!(err, CatalogError::SchemaMismatch { .. }));
        assert_eq!(a.len(), 4);
    }

    fn flags(name: &str, column: Column) -> Catalog {
        let n = column.len();
        Catalog::from_columns(
            name,
            vec![
                ("RA".to_string(), Column::Float(vec![10.0; n])),
                ("Dec".to_string(), Column::Float(vec![20.0; n])),
                ("Flags".to_string(), column),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_kind_unification() {
        assert_eq!(ColumnKind::Integer.unify(ColumnKind::Integer), Some(ColumnKind::Integer));
        assert_eq!(ColumnKind::Integer.unify(ColumnKind::Float), Some(ColumnKind::Float));
        assert_eq!(ColumnKind::Float.unify(ColumnKind::Integer), Some(ColumnKind::Float));
        assert_eq!(ColumnKind::Text.unify(ColumnKind::Float), None);
    }

    #[test]
    fn test_integer_rows_widen_when_stacked_on_floats() {
        let mut a = flags("a.csv", Column::Integer(vec![100, 200]));
        a.extend_rows(&flags("b.csv", Column::Float(vec![100.5]))).unwrap();
        assert_eq!(a.fields()[2].kind, ColumnKind::Float);
        assert_eq!(a.float_values("Flags").unwrap(), vec![100.0, 200.0, 100.5]);

        let mut b = flags("b.csv", Column::Float(vec![100.5]));
        b.extend_rows(&flags("a.csv", Column::Integer(vec![100]))).unwrap();
        assert_eq!(b.column("Flags"), Some(&Column::Float(vec![100.5, 100.0])));
    }

    #[test]
    fn test_empty_catalog_takes_the_other_kind() {
        let mut empty = flags("empty.csv", Column::Float(Vec::new()));
        empty.extend_rows(&flags("a.csv", Column::Integer(vec![0, 4]))).unwrap();
        assert_eq!(empty.column("Flags"), Some(&Column::Integer(vec![0, 4])));

        let mut a = flags("a.csv", Column::Text(vec!["x".to_string()]));
        a.extend_rows(&flags("empty.csv", Column::Float(Vec::new()))).unwrap();
        assert_eq!(a.fields()[2].kind, ColumnKind::Text);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_text_against_numbers_is_a_mismatch() {
        let a = flags("a.csv", Column::Text(vec!["x".to_string()]));
        let b = flags("b.csv", Column::Float(vec![1.0]));
        let err = a.check_schema(&b).unwrap_err();
        assert!(matches!(err, CatalogError::SchemaMismatch { found_source, .. } if found_source == "b.csv"));
    }

    #[test]
    fn test_cast_only_converts_without_loss() {
        assert_eq!(Column::Integer(vec![1]).cast(ColumnKind::Float), Column::Float(vec![1.0]));
        assert_eq!(Column::Float(Vec::new()).cast(ColumnKind::Text), Column::Text(Vec::new()));
        assert_eq!(Column::Float(vec![1.5]).cast(ColumnKind::Integer), Column::Float(vec![1.5]));
    }

    #[test]
    fn test_float_cells_keep_their_type_when_written() {
        let col = Column::Float(vec![10.0, f64::NAN, 0.25]);
        assert_eq!(col.cell(0), "10.0");
        assert_eq!(col.cell(1), "");
        assert_eq!(col.cell(2), "0.25");
    }
}
