//! Parameterized builders: holes become placeholder markers and bound
//! parameters.

use tracing::debug;

use super::{BatchStatement, Part, PlaceholderStyle, Statement, batch_rows, require_single, resolve};
use crate::codec::CodecRegistry;
use crate::cursor::{Params, Position};
use crate::error::{Error, Result};
use crate::template::Template;

/// SQL text with `arity()` markers per hole, and the total parameter count.
fn sql_text(parts: &[Part<'_>], style: PlaceholderStyle) -> (String, usize) {
    let mut sql = String::new();
    let mut index = 0;
    for part in parts {
        match part {
            Part::Sql(text) => sql.push_str(text),
            Part::Hole(hole) => {
                for i in 0..hole.arity() {
                    if i > 0 {
                        sql.push_str(", ");
                    }
                    index += 1;
                    style.write(&mut sql, index);
                }
            }
        }
    }
    (sql, index)
}

/// Bind every hole for batch row `row`.
fn bind_row(parts: &[Part<'_>], row: usize, total: usize) -> Result<Params> {
    let mut params = Params::with_capacity(total);
    let mut pos = Position::start();
    for part in parts {
        let Part::Hole(hole) = part else { continue };
        let before = pos.get();
        hole.bind(row, &mut params, &mut pos)?;
        let advanced = pos.get() - before;
        if advanced != hole.arity() {
            return Err(Error::ArityMismatch {
                expected: hole.arity(),
                actual: advanced,
            });
        }
    }
    params.finish(total)
}

/// Render a template without batch holes as one parameterized statement.
pub fn parameterized(
    template: &Template,
    registry: &CodecRegistry,
    style: PlaceholderStyle,
) -> Result<Statement> {
    require_single(template)?;
    let parts = resolve(template, registry)?;
    let (sql, total) = sql_text(&parts, style);
    let params = bind_row(&parts, 0, total)?;
    debug!(sql = %sql, params = params.len(), "rendered parameterized statement");
    Ok(Statement { sql, params })
}

/// Render a template as one SQL text plus one parameter list per batch row.
///
/// Batch holes contribute their row's value; scalar holes repeat their value
/// on every row. A template without batch holes yields exactly one row.
pub fn parameterized_batch(
    template: &Template,
    registry: &CodecRegistry,
    style: PlaceholderStyle,
) -> Result<BatchStatement> {
    let rows = batch_rows(template)?;
    let parts = resolve(template, registry)?;
    let (sql, total) = sql_text(&parts, style);
    let rows = (0..rows)
        .map(|row| bind_row(&parts, row, total))
        .collect::<Result<Vec<_>>>()?;
    debug!(sql = %sql, params = total, rows = rows.len(), "rendered parameterized batch");
    Ok(BatchStatement { sql, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{BoundWriteCodec, WriteCodec, BoundWrite, TupleCodec};
    use crate::cursor::ParamSink;
    use crate::value::SqlValue;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn registry() -> CodecRegistry {
        CodecRegistry::builder()
            .with_defaults()
            .register::<(i64, String), _>(TupleCodec::new())
            .build()
    }

    #[test]
    fn test_scalar_holes() {
        let t = Template::sql("select * from t where a = ")
            .hole(1i64)
            .literal(" and b = ")
            .hole("x".to_string());
        let stmt = parameterized(&t, &registry(), PlaceholderStyle::Question).unwrap();
        assert_eq!(stmt.sql, "select * from t where a = ? and b = ?");
        assert_eq!(
            stmt.params.as_slice(),
            &[SqlValue::Integer(1), SqlValue::from("x")]
        );
    }

    #[test]
    fn test_multi_column_hole_gets_arity_markers() {
        let t = Template::sql("insert into t (id, name) values (")
            .hole((7i64, "n".to_string()))
            .literal(") returning ")
            .hole(None::<i64>);
        let stmt = parameterized(&t, &registry(), PlaceholderStyle::Numbered).unwrap();
        assert_eq!(stmt.sql, "insert into t (id, name) values ($1, $2) returning $3");
        assert_eq!(stmt.params.len(), 3);
        assert_eq!(stmt.params.as_slice()[2], SqlValue::Null);
    }

    #[test]
    fn test_no_holes() {
        let t = Template::sql("delete from t");
        let stmt = parameterized(&t, &registry(), PlaceholderStyle::Question).unwrap();
        assert_eq!(stmt.sql, "delete from t");
        assert!(stmt.params.is_empty());

        let batch = parameterized_batch(&t, &registry(), PlaceholderStyle::Question).unwrap();
        assert_eq!(batch.rows, vec![Params::new()]);
    }

    #[test]
    fn test_batch_zips_columns_and_broadcasts_scalars() {
        let t = Template::sql("insert into t values (")
            .batch_hole([1i64, 2])
            .unwrap()
            .literal(", ")
            .hole("const".to_string())
            .literal(", ")
            .batch_hole(["a".to_string(), "b".to_string()])
            .unwrap()
            .literal(")");
        let batch = parameterized_batch(&t, &registry(), PlaceholderStyle::Question).unwrap();
        assert_eq!(batch.sql, "insert into t values (?, ?, ?)");
        assert_eq!(
            batch.rows,
            vec![
                Params::from(vec![
                    SqlValue::Integer(1),
                    SqlValue::from("const"),
                    SqlValue::from("a")
                ]),
                Params::from(vec![
                    SqlValue::Integer(2),
                    SqlValue::from("const"),
                    SqlValue::from("b")
                ]),
            ]
        );
    }

    #[test]
    fn test_empty_batch_yields_no_rows() {
        let t = Template::sql("insert into t values (")
            .batch_hole(Vec::<i64>::new())
            .unwrap()
            .literal(")");
        let batch = parameterized_batch(&t, &registry(), PlaceholderStyle::Question).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_single_builder_rejects_batch() {
        let t = Template::new().batch_hole([1i64]).unwrap();
        assert!(matches!(
            parameterized(&t, &registry(), PlaceholderStyle::Question),
            Err(Error::BatchHoles)
        ));
    }

    #[test]
    fn test_concat_mismatch_caught_by_builder() {
        let t = Template::new().batch_hole([1i64, 2]).unwrap()
            + Template::new().batch_hole([1i64]).unwrap();
        assert!(matches!(
            parameterized_batch(&t, &registry(), PlaceholderStyle::Question),
            Err(Error::BatchSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_unregistered_type_fails() {
        let t = Template::sql("x = ").hole(3u64);
        assert!(matches!(
            parameterized(&t, &registry(), PlaceholderStyle::Question),
            Err(Error::NoCodec { .. })
        ));
    }

    /// Declares two columns but binds one.
    struct Short;

    impl BoundWriteCodec<i64> for Short {
        fn arity(&self) -> usize {
            2
        }

        fn bind(&self, sink: &mut dyn ParamSink, pos: &mut Position, value: &i64) -> Result<()> {
            sink.set(pos.next(), SqlValue::Integer(*value))
        }

        fn render_literal(&self, value: &i64) -> Result<Vec<String>> {
            Ok(vec![value.to_string()])
        }
    }

    impl WriteCodec<i64> for Short {
        fn resolve(&self, _registry: &CodecRegistry) -> Result<BoundWrite<i64>> {
            Ok(Arc::new(Short))
        }
    }

    #[test]
    fn test_arity_violation_surfaces() {
        let t = Template::sql("x = ").hole_with(1i64, Short);
        assert!(matches!(
            parameterized(&t, &registry(), PlaceholderStyle::Question),
            Err(Error::ArityMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }
}
