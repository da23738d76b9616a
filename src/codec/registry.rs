//! Type-indexed codec registry.
//!
//! Built once with [`CodecRegistryBuilder`], then frozen. Lookups match the
//! exact `TypeId`; there is no fallback to related types.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use super::{
    BlobCodec, BoolCodec, BoundRead, BoundWrite, DateCodec, DateTimeCodec, F32Codec, F64Codec,
    FixedOffsetCodec, I16Codec, I32Codec, I64Codec, JsonCodec, NullableCodec, ReadCodec,
    StaticStrCodec, TextCodec, TimeCodec, U32Codec, UtcCodec, UuidCodec, WriteCodec,
};
use crate::error::{CodecSide, Error, Result};

/// One registered codec, type-erased. `codec` holds an
/// `Arc<dyn ReadCodec<T>>` or `Arc<dyn WriteCodec<T>>` for the keyed `T`.
struct Entry {
    type_name: &'static str,
    codec: Box<dyn Any + Send + Sync>,
}

impl Entry {
    fn new<T: 'static, C: Any + Send + Sync>(codec: C) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            codec: Box::new(codec),
        }
    }
}

fn no_codec<T>(side: CodecSide) -> Error {
    Error::NoCodec {
        side,
        type_name: std::any::type_name::<T>(),
    }
}

/// Immutable mapping from type to read and/or write codec.
pub struct CodecRegistry {
    readers: HashMap<TypeId, Entry>,
    writers: HashMap<TypeId, Entry>,
}

impl CodecRegistry {
    pub fn builder() -> CodecRegistryBuilder {
        CodecRegistryBuilder::default()
    }

    /// Registry with no codecs at all.
    pub fn empty() -> Self {
        CodecRegistryBuilder::default().build()
    }

    /// Unbound read codec registered for `T`.
    pub fn read_codec<T: 'static>(&self) -> Result<Arc<dyn ReadCodec<T>>> {
        self.readers
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.codec.downcast_ref::<Arc<dyn ReadCodec<T>>>())
            .cloned()
            .ok_or_else(|| no_codec::<T>(CodecSide::Read))
    }

    /// Unbound write codec registered for `T`.
    pub fn write_codec<T: 'static>(&self) -> Result<Arc<dyn WriteCodec<T>>> {
        self.writers
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.codec.downcast_ref::<Arc<dyn WriteCodec<T>>>())
            .cloned()
            .ok_or_else(|| no_codec::<T>(CodecSide::Write))
    }

    /// Read codec for `T`, resolved against this registry.
    pub fn get_read<T: 'static>(&self) -> Result<BoundRead<T>> {
        self.read_codec::<T>()?.resolve(self)
    }

    /// Write codec for `T`, resolved against this registry.
    pub fn get_write<T: 'static>(&self) -> Result<BoundWrite<T>> {
        self.write_codec::<T>()?.resolve(self)
    }

    pub fn has_read<T: 'static>(&self) -> bool {
        self.readers.contains_key(&TypeId::of::<T>())
    }

    pub fn has_write<T: 'static>(&self) -> bool {
        self.writers.contains_key(&TypeId::of::<T>())
    }
}

impl Default for CodecRegistry {
    /// Registry holding the built-in codecs.
    fn default() -> Self {
        Self::builder().with_defaults().build()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut readers: Vec<_> = self.readers.values().map(|e| e.type_name).collect();
        let mut writers: Vec<_> = self.writers.values().map(|e| e.type_name).collect();
        readers.sort_unstable();
        writers.sort_unstable();
        f.debug_struct("CodecRegistry")
            .field("readers", &readers)
            .field("writers", &writers)
            .finish()
    }
}

/// Builder for [`CodecRegistry`]. A later registration for the same type
/// replaces the earlier one.
#[derive(Default)]
pub struct CodecRegistryBuilder {
    readers: HashMap<TypeId, Entry>,
    writers: HashMap<TypeId, Entry>,
}

impl CodecRegistryBuilder {
    /// Register a codec for both reading and writing `T`.
    pub fn register<T, C>(mut self, codec: C) -> Self
    where
        T: 'static,
        C: ReadCodec<T> + WriteCodec<T> + 'static,
    {
        let shared = Arc::new(codec);
        let read: Arc<dyn ReadCodec<T>> = Arc::clone(&shared) as Arc<dyn ReadCodec<T>>;
        let write: Arc<dyn WriteCodec<T>> = shared;
        self.readers.insert(TypeId::of::<T>(), Entry::new::<T, _>(read));
        self.writers
            .insert(TypeId::of::<T>(), Entry::new::<T, _>(write));
        self
    }

    pub fn register_read<T, C>(mut self, codec: C) -> Self
    where
        T: 'static,
        C: ReadCodec<T> + 'static,
    {
        let read: Arc<dyn ReadCodec<T>> = Arc::new(codec);
        self.readers.insert(TypeId::of::<T>(), Entry::new::<T, _>(read));
        self
    }

    pub fn register_write<T, C>(mut self, codec: C) -> Self
    where
        T: 'static,
        C: WriteCodec<T> + 'static,
    {
        let write: Arc<dyn WriteCodec<T>> = Arc::new(codec);
        self.writers
            .insert(TypeId::of::<T>(), Entry::new::<T, _>(write));
        self
    }

    /// Register `Option<T>` over whatever is registered for `T` when the
    /// registry is resolved.
    pub fn register_nullable<T: 'static>(self) -> Self {
        self.register::<Option<T>, _>(NullableCodec::<T>::new())
    }

    /// Register the built-in codecs and their `Option<T>` forms.
    pub fn with_defaults(self) -> Self {
        self.register::<bool, _>(BoolCodec)
            .register::<i16, _>(I16Codec)
            .register::<i32, _>(I32Codec)
            .register::<i64, _>(I64Codec)
            .register::<u32, _>(U32Codec)
            .register::<f32, _>(F32Codec)
            .register::<f64, _>(F64Codec)
            .register::<String, _>(TextCodec)
            .register::<Vec<u8>, _>(BlobCodec)
            .register_write::<&'static str, _>(StaticStrCodec)
            .register::<NaiveDate, _>(DateCodec)
            .register::<NaiveTime, _>(TimeCodec)
            .register::<NaiveDateTime, _>(DateTimeCodec)
            .register::<DateTime<Utc>, _>(UtcCodec)
            .register::<DateTime<FixedOffset>, _>(FixedOffsetCodec)
            .register::<Uuid, _>(UuidCodec)
            .register::<serde_json::Value, _>(JsonCodec)
            .register_nullable::<bool>()
            .register_nullable::<i16>()
            .register_nullable::<i32>()
            .register_nullable::<i64>()
            .register_nullable::<u32>()
            .register_nullable::<f32>()
            .register_nullable::<f64>()
            .register_nullable::<String>()
            .register_nullable::<Vec<u8>>()
            .register_nullable::<NaiveDate>()
            .register_nullable::<NaiveTime>()
            .register_nullable::<NaiveDateTime>()
            .register_nullable::<DateTime<Utc>>()
            .register_nullable::<DateTime<FixedOffset>>()
            .register_nullable::<Uuid>()
            .register_nullable::<serde_json::Value>()
    }

    pub fn build(self) -> CodecRegistry {
        CodecRegistry {
            readers: self.readers,
            writers: self.writers,
        }
    }
}
