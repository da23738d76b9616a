//! Literal-inlined builders: hole values are rendered straight into the SQL
//! text. Used where a backend cannot take parameters for a statement.

use tracing::debug;

use super::{Part, batch_rows, render_hole, require_single, resolve};
use crate::codec::CodecRegistry;
use crate::error::Result;
use crate::template::{ResolvedHole, Template};

/// Shared SQL text with one insertion point per hole.
///
/// `text` holds only the literal spans; `slots` records, in order, the byte
/// offset in `text` where each hole's rendering goes.
struct Skeleton<'p> {
    text: String,
    slots: Vec<(usize, &'p dyn ResolvedHole)>,
}

impl<'p> Skeleton<'p> {
    fn new(parts: &'p [Part<'_>]) -> Self {
        let mut text = String::new();
        let mut slots = Vec::new();
        for part in parts {
            match part {
                Part::Sql(sql) => text.push_str(sql),
                Part::Hole(hole) => slots.push((text.len(), &**hole as &dyn ResolvedHole)),
            }
        }
        Self { text, slots }
    }

    /// Fill every slot with the hole's literal for batch row `row`.
    fn fill(&self, row: usize) -> Result<String> {
        let mut sql = String::with_capacity(self.text.len() + self.slots.len() * 8);
        let mut copied = 0;
        for &(offset, hole) in &self.slots {
            sql.push_str(&self.text[copied..offset]);
            copied = offset;
            sql.push_str(&render_hole(hole, row)?.join(", "));
        }
        sql.push_str(&self.text[copied..]);
        Ok(sql)
    }
}

/// Render a template without batch holes as a single SQL string.
pub fn literal(template: &Template, registry: &CodecRegistry) -> Result<String> {
    require_single(template)?;
    let parts = resolve(template, registry)?;
    let sql = Skeleton::new(&parts).fill(0)?;
    debug!(sql = %sql, "rendered literal statement");
    Ok(sql)
}

/// Render one fully inlined SQL string per batch row from a shared skeleton.
///
/// A template without batch holes yields exactly one string.
pub fn literal_batch(template: &Template, registry: &CodecRegistry) -> Result<Vec<String>> {
    let rows = batch_rows(template)?;
    let parts = resolve(template, registry)?;
    let skeleton = Skeleton::new(&parts);
    let statements = (0..rows)
        .map(|row| skeleton.fill(row))
        .collect::<Result<Vec<_>>>()?;
    debug!(
        skeleton = %skeleton.text,
        rows = statements.len(),
        "rendered literal batch"
    );
    Ok(statements)
}
