//! Statement builders: {parameterized, literal} x {single, batch}.
//!
//! Every builder resolves each hole's codec against the registry once, then
//! walks the spans. Literal spans are copied through; holes become either
//! `arity()` placeholder markers plus bound parameters, or `arity()` inline
//! SQL literals.

mod literal;
mod parameterized;

pub use literal::{literal, literal_batch};
pub use parameterized::{parameterized, parameterized_batch};

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::codec::CodecRegistry;
use crate::cursor::Params;
use crate::error::{Error, Result};
use crate::template::{ResolvedHole, Span, Template};

/// Parameter marker syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `?` (SQLite, MySQL, JDBC-style drivers)
    #[default]
    Question,
    /// `$1`, `$2`, ... (PostgreSQL; SQLite accepts `?NNN` and `$NNN` too)
    Numbered,
}

impl PlaceholderStyle {
    /// Append the marker for 1-based parameter `index`.
    pub fn write(self, sql: &mut String, index: usize) {
        match self {
            PlaceholderStyle::Question => sql.push('?'),
            PlaceholderStyle::Numbered => {
                let _ = write!(sql, "${}", index);
            }
        }
    }
}

/// A parameterized statement ready for one execution.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    pub sql: String,
    pub params: Params,
}

/// One parameterized SQL text with one parameter list per batch row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchStatement {
    pub sql: String,
    pub rows: Vec<Params>,
}

impl BatchStatement {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A template span with its hole codec resolved.
pub(crate) enum Part<'t> {
    Sql(&'t str),
    Hole(Box<dyn ResolvedHole + 't>),
}

pub(crate) fn resolve<'t>(template: &'t Template, registry: &CodecRegistry) -> Result<Vec<Part<'t>>> {
    template
        .spans()
        .iter()
        .map(|span| match span {
            Span::Literal(text) => Ok(Part::Sql(text.as_str())),
            Span::Hole(hole) => hole.resolve(registry).map(Part::Hole),
        })
        .collect()
}

/// Rows to render: the agreed batch size, or a single row when the template
/// has no batch holes.
pub(crate) fn batch_rows(template: &Template) -> Result<usize> {
    Ok(template.checked_batch_size()?.unwrap_or(1))
}

/// Single builders refuse batch holes.
pub(crate) fn require_single(template: &Template) -> Result<()> {
    match template.checked_batch_size()? {
        Some(_) => Err(Error::BatchHoles),
        None => Ok(()),
    }
}

/// Render one hole for `row`, checking the fragment count against its arity.
pub(crate) fn render_hole(hole: &dyn ResolvedHole, row: usize) -> Result<Vec<String>> {
    let fragments = hole.render(row)?;
    if fragments.len() != hole.arity() {
        return Err(Error::ArityMismatch {
            expected: hole.arity(),
            actual: fragments.len(),
        });
    }
    Ok(fragments)
}
