//! Snapshot stream contract plus filesystem and in-memory backends.

mod fs_stream;
mod mem_stream;

pub use fs_stream::{FsSnapshotReader, FsSnapshotWriter};
pub use mem_stream::{MemSnapshotReader, MemSnapshotWriter};

use snapmig_schema::Entity;
use std::{io, path::PathBuf};

pub type StreamResult<T> = Result<T, StreamError>;

/// Ordered source of snapshot entities. Any `Err` invalidates the remainder
/// of that snapshot's migration.
pub trait SnapshotSource {
    fn has_next(&mut self) -> StreamResult<bool>;
    fn read_entity(&mut self) -> StreamResult<Entity>;
}

/// Ordered sink of snapshot entities.
pub trait SnapshotSink {
    fn write_entity(&mut self, entity: &Entity) -> StreamResult<()>;
}

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("entity decode error: {0}")]
    Decode(#[source] serde_cbor::Error),
    #[error("entity encode error: {0}")]
    Encode(#[source] serde_cbor::Error),
    #[error("failed to move migrated snapshot into place at {path:?}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("snapshot stream is exhausted")]
    Exhausted,
}

pub(crate) fn io_error(path: impl Into<PathBuf>, err: io::Error) -> StreamError {
    StreamError::Io {
        path: path.into(),
        source: err,
    }
}
