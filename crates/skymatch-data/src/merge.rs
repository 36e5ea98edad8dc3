//! Row-wise concatenation of stamped catalogs

use crate::catalog::Catalog;
use crate::error::CatalogResult;

/// Reference rows first, then each other catalog's rows in order.
///
/// Every input must share the reference's ordered column names. Integer
/// columns meeting Float columns are widened and catalogs without rows adopt
/// the kinds of the rest. On a mismatch nothing is returned.
pub fn merge_catalogs(reference: Catalog, others: &[Catalog]) -> CatalogResult<Catalog> {
    for other in others {
        reference.check_schema(other)?;
    }

    let mut merged = reference;
    for other in others {
        merged.extend_rows(other)?;
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Column;
    use crate::error::CatalogError;

    fn catalog(name: &str, rows: usize, with_mag: bool) -> Catalog {
        let mut columns = vec![
            ("RA".to_string(), Column::Float(vec![1.0; rows])),
            ("Dec".to_string(), Column::Float(vec![2.0; rows])),
            ("SourceFile".to_string(), Column::Text(vec![name.to_string(); rows])),
        ];
        if with_mag {
            columns.push(("Mag".to_string(), Column::Float(vec![12.0; rows])));
        }
        Catalog::from_columns(name, columns).unwrap()
    }

    #[test]
    fn test_merged_length_is_sum_of_inputs() {
        let others = vec![catalog("b", 2, false), catalog("c", 0, false), catalog("d", 4, false)];
        let merged = merge_catalogs(catalog("a", 3, false), &others).unwrap();
        assert_eq!(merged.len(), 9);

        let sources = match merged.column("SourceFile").unwrap() {
            Column::Text(v) => v.clone(),
            _ => unreachable!(),
        };
        assert_eq!(sources, ["a", "a", "a", "b", "b", "d", "d", "d", "d"]);
    }

    #[test]
    fn test_empty_reference_adopts_kinds_of_later_catalogs() {
        let flagged = |name: &str, flags: Column| {
            let n = flags.len();
            Catalog::from_columns(
                name,
                vec![
                    ("RA".to_string(), Column::Float(vec![1.0; n])),
                    ("Flags".to_string(), flags),
                ],
            )
            .unwrap()
        };
        let others = vec![flagged("b", Column::Integer(vec![0, 4])), flagged("c", Column::Float(vec![2.5]))];
        let merged = merge_catalogs(flagged("a", Column::Float(Vec::new())), &others).unwrap();
        assert_eq!(merged.column("Flags"), Some(&Column::Float(vec![0.0, 4.0, 2.5])));

        let others = vec![flagged("b", Column::Integer(vec![1])), flagged("c", Column::Text(vec!["x".to_string()]))];
        let err = merge_catalogs(flagged("a", Column::Float(Vec::new())), &others).unwrap_err();
        assert!(matches!(err, CatalogError::SchemaMismatch { found_source, .. } if found_source == "c"));
    }

    #[test]
    fn test_schema_mismatch_aborts_merge() {
        let others = vec![catalog("b", 2, false), catalog("c", 2, true)];
        let err = merge_catalogs(catalog("a", 3, false), &others).unwrap_err();
        match err {
            CatalogError::SchemaMismatch { found_source, .. } => assert_eq!(found_source, "c"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
