//! Result consumption strategies: how an executed statement's cursor turns
//! into a final value.
//!
//! A strategy holds unbound codecs and resolves them against the registry
//! each time it consumes a cursor. Every row is decoded with a fresh
//! [`Position`].

mod matrix;
mod segmented;

pub use matrix::{
    LabelledMap, LabelledMatrix, Matrix, TypedColumn, TypedValue, labelled_map, labelled_matrix,
    matrix,
};
pub use segmented::{SegmentedMap, segmented_map};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::codec::{CodecRegistry, ReadCodec, by_type};
use crate::cursor::{Cursor, Position};
use crate::error::{Error, Result};

/// Turns a cursor into a value.
pub trait Consume {
    type Output;

    fn consume(&self, registry: &CodecRegistry, cursor: &mut dyn Cursor) -> Result<Self::Output>;
}

impl<C: Consume + ?Sized> Consume for &C {
    type Output = C::Output;

    fn consume(&self, registry: &CodecRegistry, cursor: &mut dyn Cursor) -> Result<Self::Output> {
        (**self).consume(registry, cursor)
    }
}

fn shared<T, C: ReadCodec<T> + 'static>(codec: C) -> Arc<dyn ReadCodec<T>> {
    Arc::new(codec)
}

// ==================== First row ====================

/// Decode the first row; `NotFound` when there is none.
pub struct First<T> {
    codec: Arc<dyn ReadCodec<T>>,
}

pub fn first<T, C: ReadCodec<T> + 'static>(codec: C) -> First<T> {
    First {
        codec: shared(codec),
    }
}

pub fn first_of<T: 'static>() -> First<T> {
    first(by_type::<T>())
}

impl<T> Consume for First<T> {
    type Output = T;

    fn consume(&self, registry: &CodecRegistry, cursor: &mut dyn Cursor) -> Result<T> {
        let codec = (*self.codec).resolve(registry)?;
        if !cursor.advance()? {
            return Err(Error::NotFound);
        }
        codec.get(&*cursor, &mut Position::start())
    }
}

/// Decode the first row, or `None` when there is none.
pub struct FirstOrNone<T> {
    codec: Arc<dyn ReadCodec<T>>,
}

pub fn first_or_none<T, C: ReadCodec<T> + 'static>(codec: C) -> FirstOrNone<T> {
    FirstOrNone {
        codec: shared(codec),
    }
}

pub fn first_or_none_of<T: 'static>() -> FirstOrNone<T> {
    first_or_none(by_type::<T>())
}

impl<T> Consume for FirstOrNone<T> {
    type Output = Option<T>;

    fn consume(&self, registry: &CodecRegistry, cursor: &mut dyn Cursor) -> Result<Option<T>> {
        let codec = (*self.codec).resolve(registry)?;
        if !cursor.advance()? {
            return Ok(None);
        }
        codec.get(&*cursor, &mut Position::start()).map(Some)
    }
}

// ==================== Collections ====================

/// One value per row, in cursor order.
pub struct List<T> {
    codec: Arc<dyn ReadCodec<T>>,
}

pub fn list<T, C: ReadCodec<T> + 'static>(codec: C) -> List<T> {
    List {
        codec: shared(codec),
    }
}

pub fn list_of<T: 'static>() -> List<T> {
    list(by_type::<T>())
}

impl<T> Consume for List<T> {
    type Output = Vec<T>;

    fn consume(&self, registry: &CodecRegistry, cursor: &mut dyn Cursor) -> Result<Vec<T>> {
        let codec = (*self.codec).resolve(registry)?;
        let mut out = Vec::new();
        while cursor.advance()? {
            out.push(codec.get(&*cursor, &mut Position::start())?);
        }
        Ok(out)
    }
}

/// One value per row, deduplicated and ordered.
pub struct Set<T> {
    codec: Arc<dyn ReadCodec<T>>,
}

pub fn set<T: Ord, C: ReadCodec<T> + 'static>(codec: C) -> Set<T> {
    Set {
        codec: shared(codec),
    }
}

pub fn set_of<T: Ord + 'static>() -> Set<T> {
    set(by_type::<T>())
}

impl<T: Ord> Consume for Set<T> {
    type Output = BTreeSet<T>;

    fn consume(&self, registry: &CodecRegistry, cursor: &mut dyn Cursor) -> Result<BTreeSet<T>> {
        let codec = (*self.codec).resolve(registry)?;
        let mut out = BTreeSet::new();
        while cursor.advance()? {
            out.insert(codec.get(&*cursor, &mut Position::start())?);
        }
        Ok(out)
    }
}

// ==================== Maps ====================

/// Key then value from each row. A repeated key fails with `DuplicateKey`.
pub struct AsMap<K, V> {
    key: Arc<dyn ReadCodec<K>>,
    value: Arc<dyn ReadCodec<V>>,
}

pub fn as_map<K, V, KC, VC>(key: KC, value: VC) -> AsMap<K, V>
where
    K: Ord + fmt::Debug,
    KC: ReadCodec<K> + 'static,
    VC: ReadCodec<V> + 'static,
{
    AsMap {
        key: shared(key),
        value: shared(value),
    }
}

pub fn as_map_of<K: Ord + fmt::Debug + 'static, V: 'static>() -> AsMap<K, V> {
    as_map(by_type::<K>(), by_type::<V>())
}

impl<K: Ord + fmt::Debug, V> Consume for AsMap<K, V> {
    type Output = BTreeMap<K, V>;

    fn consume(&self, registry: &CodecRegistry, cursor: &mut dyn Cursor) -> Result<BTreeMap<K, V>> {
        let key_codec = (*self.key).resolve(registry)?;
        let value_codec = (*self.value).resolve(registry)?;
        let mut out = BTreeMap::new();
        while cursor.advance()? {
            let mut pos = Position::start();
            let key = key_codec.get(&*cursor, &mut pos)?;
            let value = value_codec.get(&*cursor, &mut pos)?;
            if out.contains_key(&key) {
                return Err(Error::DuplicateKey(format!("{:?}", key)));
            }
            out.insert(key, value);
        }
        Ok(out)
    }
}

/// Key then value from each row, values for equal keys collected in order.
pub struct AsMultimap<K, V> {
    key: Arc<dyn ReadCodec<K>>,
    value: Arc<dyn ReadCodec<V>>,
}

pub fn as_multimap<K, V, KC, VC>(key: KC, value: VC) -> AsMultimap<K, V>
where
    K: Ord,
    KC: ReadCodec<K> + 'static,
    VC: ReadCodec<V> + 'static,
{
    AsMultimap {
        key: shared(key),
        value: shared(value),
    }
}

pub fn as_multimap_of<K: Ord + 'static, V: 'static>() -> AsMultimap<K, V> {
    as_multimap(by_type::<K>(), by_type::<V>())
}

impl<K: Ord, V> Consume for AsMultimap<K, V> {
    type Output = BTreeMap<K, Vec<V>>;

    fn consume(
        &self,
        registry: &CodecRegistry,
        cursor: &mut dyn Cursor,
    ) -> Result<BTreeMap<K, Vec<V>>> {
        let key_codec = (*self.key).resolve(registry)?;
        let value_codec = (*self.value).resolve(registry)?;
        let mut out: BTreeMap<K, Vec<V>> = BTreeMap::new();
        while cursor.advance()? {
            let mut pos = Position::start();
            let key = key_codec.get(&*cursor, &mut pos)?;
            let value = value_codec.get(&*cursor, &mut pos)?;
            out.entry(key).or_default().push(value);
        }
        Ok(out)
    }
}
