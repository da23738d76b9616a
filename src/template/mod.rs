//! SQL templates: literal text interleaved with typed holes.
//!
//! A template says nothing about how holes are rendered; that is decided by
//! the builders in [`crate::render`].
//!
//! # Example
//! ```no_run
//! use sqlweave::Template;
//!
//! let t = Template::new()
//!     .literal("select name from person where id = ")
//!     .hole(42i64)
//!     .literal(" and status")
//!     .in_values(["active", "pending"]);
//! ```

mod hole;

pub(crate) use hole::{Hole, ResolvedHole};

use std::fmt;
use std::ops::{Add, AddAssign};
use std::sync::Arc;

use hole::{BatchHole, NullHole, ScalarHole};

use crate::codec::{WriteCodec, by_type};
use crate::error::{Error, Result};

/// Value types accepted by holes.
pub trait HoleValue: fmt::Debug + Send + Sync + 'static {}

impl<T: fmt::Debug + Send + Sync + 'static> HoleValue for T {}

#[derive(Clone)]
pub(crate) enum Span {
    Literal(String),
    Hole(Arc<dyn Hole>),
}

/// Ordered, append-only sequence of literal and hole spans.
#[derive(Clone, Default)]
pub struct Template {
    spans: Vec<Span>,
    /// Fixed by the first batch hole.
    batch_size: Option<usize>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// Template holding only `sql`.
    pub fn sql(sql: impl AsRef<str>) -> Self {
        Self::new().literal(sql)
    }

    // ==================== Literals ====================

    /// Append literal SQL text. Consecutive literals are merged.
    pub fn literal(mut self, text: impl AsRef<str>) -> Self {
        self.push_literal(text.as_ref());
        self
    }

    fn push_literal(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(Span::Literal(last)) => last.push_str(text),
            _ => self.spans.push(Span::Literal(text.to_string())),
        }
    }

    // ==================== Scalar holes ====================

    /// Append a value whose codec is looked up by type at render time.
    pub fn hole<T: HoleValue>(self, value: T) -> Self {
        self.hole_with(value, by_type::<T>())
    }

    /// Append a value rendered with an explicit codec.
    pub fn hole_with<T, C>(mut self, value: T, codec: C) -> Self
    where
        T: HoleValue,
        C: WriteCodec<T> + 'static,
    {
        self.spans
            .push(Span::Hole(Arc::new(ScalarHole::new(value, Arc::new(codec)))));
        self
    }

    /// Append a possibly absent value. `None` becomes a single NULL.
    pub fn hole_opt<T: HoleValue>(self, value: Option<T>) -> Self {
        match value {
            Some(v) => self.hole(v),
            None => self.null(),
        }
    }

    /// Append a NULL hole.
    pub fn null(mut self) -> Self {
        self.spans.push(Span::Hole(Arc::new(NullHole)));
        self
    }

    // ==================== Batch holes ====================

    /// Append one column of batch values, codec looked up by type.
    ///
    /// Fails with `BatchSizeMismatch` if an earlier batch hole fixed a
    /// different row count.
    pub fn batch_hole<T, I>(self, values: I) -> Result<Self>
    where
        T: HoleValue,
        I: IntoIterator<Item = T>,
    {
        self.batch_hole_with(values, by_type::<T>())
    }

    /// Append one column of batch values rendered with an explicit codec.
    pub fn batch_hole_with<T, I, C>(mut self, values: I, codec: C) -> Result<Self>
    where
        T: HoleValue,
        I: IntoIterator<Item = T>,
        C: WriteCodec<T> + 'static,
    {
        let values: Vec<T> = values.into_iter().collect();
        match self.batch_size {
            Some(expected) if expected != values.len() => {
                return Err(Error::BatchSizeMismatch {
                    expected,
                    actual: values.len(),
                });
            }
            Some(_) => {}
            None => self.batch_size = Some(values.len()),
        }
        self.spans
            .push(Span::Hole(Arc::new(BatchHole::new(values, Arc::new(codec)))));
        Ok(self)
    }

    // ==================== Composition ====================

    /// Append another template's spans.
    ///
    /// The batch size of `other` is not merged; builders re-check every batch
    /// hole when rendering.
    pub fn concat(mut self, other: Template) -> Self {
        self.append(other);
        self
    }

    fn append(&mut self, other: Template) {
        for span in other.spans {
            match span {
                Span::Literal(text) => self.push_literal(&text),
                hole => self.spans.push(hole),
            }
        }
    }

    /// ` in (v1, v2, ...)` over `values`.
    ///
    /// An empty list renders as ` in (select null where 1 = 0)`, which
    /// matches nothing.
    pub fn in_values<T, I>(self, values: I) -> Self
    where
        T: HoleValue,
        I: IntoIterator<Item = T>,
    {
        self.membership(" in (", values)
    }

    /// ` not in (v1, v2, ...)` over `values`. An empty list matches every row.
    pub fn not_in_values<T, I>(self, values: I) -> Self
    where
        T: HoleValue,
        I: IntoIterator<Item = T>,
    {
        self.membership(" not in (", values)
    }

    fn membership<T, I>(mut self, open: &str, values: I) -> Self
    where
        T: HoleValue,
        I: IntoIterator<Item = T>,
    {
        self.push_literal(open);
        let mut empty = true;
        for value in values {
            if !empty {
                self.push_literal(", ");
            }
            self = self.hole(value);
            empty = false;
        }
        if empty {
            self.push_literal(EMPTY_LIST);
        }
        self.push_literal(")");
        self
    }

    // ==================== Inspection ====================

    /// Row count fixed by this template's own batch holes.
    pub fn batch_size(&self) -> Option<usize> {
        self.batch_size
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Number of holes (scalar, batch and null).
    pub fn hole_count(&self) -> usize {
        self.spans
            .iter()
            .filter(|s| matches!(s, Span::Hole(_)))
            .count()
    }

    pub(crate) fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Row count agreed on by every batch hole, including those appended by
    /// `concat`.
    pub(crate) fn checked_batch_size(&self) -> Result<Option<usize>> {
        let mut size = None;
        for span in &self.spans {
            let Span::Hole(hole) = span else { continue };
            let Some(len) = hole.batch_len() else { continue };
            match size {
                None => size = Some(len),
                Some(expected) if expected != len => {
                    return Err(Error::BatchSizeMismatch {
                        expected,
                        actual: len,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(size)
    }
}

/// Subquery standing in for an empty value list.
const EMPTY_LIST: &str = "select null where 1 = 0";

impl From<&str> for Template {
    fn from(sql: &str) -> Self {
        Template::sql(sql)
    }
}

impl From<String> for Template {
    fn from(sql: String) -> Self {
        Template::sql(sql)
    }
}

impl Add for Template {
    type Output = Template;

    fn add(self, rhs: Template) -> Template {
        self.concat(rhs)
    }
}

impl AddAssign for Template {
    fn add_assign(&mut self, rhs: Template) {
        self.append(rhs);
    }
}

/// Debug form: holes print as `[value]`. Not for execution.
impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for span in &self.spans {
            match span {
                Span::Literal(text) => f.write_str(text)?,
                Span::Hole(hole) => write!(f, "[{:?}]", hole)?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("sql", &self.to_string())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}
