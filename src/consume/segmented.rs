//! Windowed group reader.
//!
//! Decodes a cursor sorted by key into `key -> value`, where each value is
//! decoded by an inner strategy from the contiguous run of rows sharing that
//! key. Rows are never buffered; the inner strategy sees only its run, with
//! the key columns hidden.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::Consume;
use crate::codec::{CodecRegistry, ReadCodec, by_type};
use crate::cursor::{ContiguousCursor, Cursor, OffsetCursor, PeekingCursor, Position, Row};
use crate::error::{Error, Result};

type Combiner<V> = Arc<dyn Fn(V, V) -> Result<V> + Send + Sync>;

/// `segmented_map(key, inner)`: one inner decode per run of equal keys.
pub struct SegmentedMap<K, C: Consume> {
    key: Arc<dyn ReadCodec<K>>,
    inner: C,
    combine: Option<Combiner<C::Output>>,
}

pub fn segmented_map<K, KC, C>(key: KC, inner: C) -> SegmentedMap<K, C>
where
    K: Ord + fmt::Debug,
    KC: ReadCodec<K> + 'static,
    C: Consume,
{
    SegmentedMap {
        key: Arc::new(key),
        inner,
        combine: None,
    }
}

impl<K: Ord + fmt::Debug + 'static, C: Consume> SegmentedMap<K, C> {
    /// Group by a key whose codec is looked up by type.
    pub fn by_key_type(inner: C) -> Self {
        segmented_map(by_type::<K>(), inner)
    }

    /// Merge the values of a key that shows up in two separate runs.
    ///
    /// Without a combiner such a key fails with `DuplicateKey`.
    pub fn combine_with<F>(mut self, f: F) -> Self
    where
        F: Fn(C::Output, C::Output) -> Result<C::Output> + Send + Sync + 'static,
    {
        self.combine = Some(Arc::new(f));
        self
    }
}

impl<K, C> Consume for SegmentedMap<K, C>
where
    K: Ord + fmt::Debug,
    C: Consume,
{
    type Output = BTreeMap<K, C::Output>;

    fn consume(
        &self,
        registry: &CodecRegistry,
        cursor: &mut dyn Cursor,
    ) -> Result<BTreeMap<K, C::Output>> {
        let key_codec = (*self.key).resolve(registry)?;
        let key_arity = key_codec.arity();
        let mut out = BTreeMap::new();

        if !cursor.advance()? {
            return Ok(out);
        }

        loop {
            // The outer cursor sits on the first row of the next run.
            let key = key_codec.get(&*cursor, &mut Position::start())?;

            let (value, rows, exhausted) = {
                let peek = PeekingCursor::new(&mut *cursor);
                let mut run = ContiguousCursor::new(peek, |row: &dyn Row| {
                    Ok(key_codec.get(row, &mut Position::start())? == key)
                });
                let value = self
                    .inner
                    .consume(registry, &mut OffsetCursor::new(&mut run, key_arity))?;
                // Skip whatever the inner strategy left unread.
                run.drain()?;
                (value, run.admitted(), run.is_exhausted())
            };
            trace!(key = ?key, rows, exhausted, "decoded run");

            let value = match out.remove(&key) {
                None => value,
                Some(previous) => match &self.combine {
                    Some(combine) => combine(previous, value)?,
                    None => return Err(Error::DuplicateKey(format!("{:?}", key))),
                },
            };
            out.insert(key, value);

            if exhausted {
                break;
            }
        }
        Ok(out)
    }
}
