//! CSV catalog reading and writing

use crate::catalog::{
    Catalog, Column, ColumnKind, DATA_NUM_COLUMN, DEC_COLUMN, NUM_SOURCES_COLUMN, RA_COLUMN, SOURCE_FILE_COLUMN,
};
use crate::error::CatalogResult;
use std::io::{Read, Write};
use std::path::Path;

/// Load a source catalog from a CSV file with a header row.
///
/// Column types are inferred per column; `RA` and `Dec` are required and
/// always stored as floats. A file without rows infers Float for every column
/// it does not declare.
pub fn read_catalog(path: &Path) -> CatalogResult<Catalog> {
    let catalog = read_table(path)?;
    require_coordinates(&catalog)?;
    Ok(catalog)
}

/// Load a source catalog from any CSV source
pub fn read_catalog_from<R: Read>(source_file: impl Into<String>, reader: R) -> CatalogResult<Catalog> {
    let catalog = read_table_from(source_file, reader)?;
    require_coordinates(&catalog)?;
    Ok(catalog)
}

/// Load any CSV table (merged or averaged output) without requiring coordinates
pub fn read_table(path: &Path) -> CatalogResult<Catalog> {
    tracing::debug!("Reading {:?}", path);
    let file = std::fs::File::open(path)?;
    read_table_from(file_name(path), file)
}

pub fn read_table_from<R: Read>(source_file: impl Into<String>, reader: R) -> CatalogResult<Catalog> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for record in reader.records() {
        let record = record?;
        for (column, value) in cells.iter_mut().zip(record.iter()) {
            column.push(value.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| {
            let column = infer_column(values);
            let column = match declared_kind(&name) {
                Some(kind) => column.cast(kind),
                None => column,
            };
            (name, column)
        })
        .collect();

    Catalog::from_columns(source_file, columns)
}

/// Kind of the columns this crate writes itself
fn declared_kind(name: &str) -> Option<ColumnKind> {
    match name {
        RA_COLUMN | DEC_COLUMN => Some(ColumnKind::Float),
        DATA_NUM_COLUMN | NUM_SOURCES_COLUMN => Some(ColumnKind::Integer),
        SOURCE_FILE_COLUMN => Some(ColumnKind::Text),
        _ => None,
    }
}

fn require_coordinates(catalog: &Catalog) -> CatalogResult<()> {
    catalog.require_column(RA_COLUMN)?;
    catalog.require_column(DEC_COLUMN)?;
    Ok(())
}

/// Write a catalog as CSV, preserving column order and names
pub fn write_catalog(catalog: &Catalog, path: &Path) -> CatalogResult<()> {
    tracing::debug!("Writing {} rows to {:?}", catalog.len(), path);
    let file = std::fs::File::create(path)?;
    write_catalog_to(catalog, file)
}

pub fn write_catalog_to<W: Write>(catalog: &Catalog, writer: W) -> CatalogResult<()> {
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record(catalog.fields().iter().map(|f| f.name.as_str()))?;
    let columns: Vec<&Column> = catalog.columns().map(|(_, c)| c).collect();
    for row in 0..catalog.len() {
        writer.write_record(columns.iter().map(|c| c.cell(row)))?;
    }

    writer.flush()?;
    Ok(())
}

/// File name without its directory, used as the `SourceFile` stamp
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn infer_column(values: Vec<String>) -> Column {
    if !values.is_empty() && values.iter().all(|v| v.parse::<i64>().is_ok()) {
        return Column::Integer(values.iter().filter_map(|v| v.parse().ok()).collect());
    }

    let floats: Option<Vec<f64>> = values
        .iter()
        .map(|v| if v.is_empty() { Some(f64::NAN) } else { v.parse().ok() })
        .collect();

    match floats {
        Some(floats) => Column::Float(floats),
        None => Column::Text(values),
    }
}
