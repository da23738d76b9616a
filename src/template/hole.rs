//! Typed holes and their registry-resolved form.

use std::fmt;
use std::sync::Arc;

use crate::codec::{BoundWrite, CodecRegistry, NullCodec, WriteCodec};
use crate::cursor::{ParamSink, Position};
use crate::error::{Error, Result};

/// A value slot in a template. `Debug` renders the value for diagnostics.
pub(crate) trait Hole: fmt::Debug + Send + Sync {
    /// Row count for batch holes, `None` for scalar holes.
    fn batch_len(&self) -> Option<usize>;

    /// Resolve the hole's codec against `registry`.
    fn resolve<'h>(&'h self, registry: &CodecRegistry) -> Result<Box<dyn ResolvedHole + 'h>>;
}

/// A hole with a bound codec, ready to bind or render any batch row.
///
/// Scalar holes ignore `row` and repeat their value for every row.
pub(crate) trait ResolvedHole {
    fn arity(&self) -> usize;

    fn bind(&self, row: usize, sink: &mut dyn ParamSink, pos: &mut Position) -> Result<()>;

    fn render(&self, row: usize) -> Result<Vec<String>>;
}

enum Values<'h, T> {
    Scalar(&'h T),
    Batch(&'h [T]),
}

impl<T> Values<'_, T> {
    fn at(&self, row: usize) -> Result<&T> {
        match self {
            Values::Scalar(value) => Ok(value),
            Values::Batch(values) => values.get(row).ok_or(Error::BatchSizeMismatch {
                expected: row + 1,
                actual: values.len(),
            }),
        }
    }
}

struct BoundHole<'h, T> {
    codec: BoundWrite<T>,
    values: Values<'h, T>,
}

impl<T: 'static> ResolvedHole for BoundHole<'_, T> {
    fn arity(&self) -> usize {
        self.codec.arity()
    }

    fn bind(&self, row: usize, sink: &mut dyn ParamSink, pos: &mut Position) -> Result<()> {
        self.codec.bind(sink, pos, self.values.at(row)?)
    }

    fn render(&self, row: usize) -> Result<Vec<String>> {
        self.codec.render_literal(self.values.at(row)?)
    }
}

// ==================== Scalar ====================

pub(crate) struct ScalarHole<T> {
    value: T,
    codec: Arc<dyn WriteCodec<T>>,
}

impl<T> ScalarHole<T> {
    pub(crate) fn new(value: T, codec: Arc<dyn WriteCodec<T>>) -> Self {
        Self { value, codec }
    }
}

impl<T: fmt::Debug> fmt::Debug for ScalarHole<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.value)
    }
}

impl<T> Hole for ScalarHole<T>
where
    T: fmt::Debug + Send + Sync + 'static,
{
    fn batch_len(&self) -> Option<usize> {
        None
    }

    fn resolve<'h>(&'h self, registry: &CodecRegistry) -> Result<Box<dyn ResolvedHole + 'h>> {
        Ok(Box::new(BoundHole {
            codec: self.codec.resolve(registry)?,
            values: Values::Scalar(&self.value),
        }))
    }
}

// ==================== Batch ====================

pub(crate) struct BatchHole<T> {
    values: Vec<T>,
    codec: Arc<dyn WriteCodec<T>>,
}

impl<T> BatchHole<T> {
    pub(crate) fn new(values: Vec<T>, codec: Arc<dyn WriteCodec<T>>) -> Self {
        Self { values, codec }
    }
}

impl<T: fmt::Debug> fmt::Debug for BatchHole<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:?}", value)?;
        }
        Ok(())
    }
}

impl<T> Hole for BatchHole<T>
where
    T: fmt::Debug + Send + Sync + 'static,
{
    fn batch_len(&self) -> Option<usize> {
        Some(self.values.len())
    }

    fn resolve<'h>(&'h self, registry: &CodecRegistry) -> Result<Box<dyn ResolvedHole + 'h>> {
        Ok(Box::new(BoundHole {
            codec: self.codec.resolve(registry)?,
            values: Values::Batch(&self.values),
        }))
    }
}

// ==================== Null ====================

/// Stand-in for an absent value: one column, always NULL.
pub(crate) struct NullHole;

impl fmt::Debug for NullHole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NULL")
    }
}

impl Hole for NullHole {
    fn batch_len(&self) -> Option<usize> {
        None
    }

    fn resolve<'h>(&'h self, _registry: &CodecRegistry) -> Result<Box<dyn ResolvedHole + 'h>> {
        let codec: BoundWrite<()> = Arc::new(NullCodec);
        Ok(Box::new(BoundHole {
            codec,
            values: Values::Scalar(&()),
        }))
    }
}
