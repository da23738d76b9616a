//! sqlweave: typed SQL templates.
//!
//! Build SQL as literal text interleaved with typed holes, render it against a
//! codec registry as parameterized or literal SQL, and decode result cursors
//! with composable consumption strategies, including streaming group-by-key.
//!
//! # Example
//! ```no_run
//! use sqlweave::prelude::*;
//!
//! fn example() -> sqlweave::Result<()> {
//!     let mut conn = SqliteConnection::open_in_memory()?;
//!     conn.execute_batch("create table person (id integer, name text)")?;
//!
//!     let registry = CodecRegistry::default();
//!     let config = ExecutorConfig::default();
//!     let mut session = Session::new(&mut conn, &registry, &config);
//!
//!     let insert = Template::sql("insert into person values (")
//!         .batch_hole([1i64, 2])?
//!         .literal(", ")
//!         .batch_hole(["Al".to_string(), "Bea".to_string()])?
//!         .literal(")");
//!     session.update_batch(&insert)?;
//!
//!     let names: Vec<String> = session.query_list(
//!         &Template::sql("select name from person where id").in_values([1i64, 2]),
//!     )?;
//!     assert_eq!(names.len(), 2);
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod consume;
pub mod cursor;
pub mod error;
pub mod exec;
pub mod render;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod template;
pub mod value;

pub use codec::CodecRegistry;
pub use config::ExecutorConfig;
pub use error::{Error, Result};
pub use template::Template;
pub use value::SqlValue;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::codec::{
        CodecRegistry, CodecRegistryBuilder, NullableCodec, ReadCodec, ReadCodecExt, SqlEnum,
        TupleCodec, WriteCodec, WriteCodecExt, by_type,
    };
    pub use crate::config::{ExecutorConfig, Rendering};
    pub use crate::consume::{
        Consume, as_map, as_map_of, as_multimap, first, first_of, first_or_none, labelled_map,
        labelled_matrix, list, list_of, matrix, segmented_map, set, set_of,
    };
    pub use crate::cursor::{Cursor, Row};
    pub use crate::error::{Error, Result};
    pub use crate::exec::{Connection, Executor, Session, SingleConnection, run_in_transaction};
    pub use crate::render::{PlaceholderStyle, literal, literal_batch, parameterized, parameterized_batch};
    #[cfg(feature = "sqlite")]
    pub use crate::sqlite::SqliteConnection;
    pub use crate::template::Template;
    pub use crate::value::SqlValue;
}
