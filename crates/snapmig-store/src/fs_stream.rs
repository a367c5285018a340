use crate::{SnapshotSink, SnapshotSource, StreamError, StreamResult, io_error};
use serde::Deserialize;
use snapmig_schema::Entity;
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

/// Reads a snapshot file as a sequence of CBOR-encoded entities.
#[derive(Debug)]
pub struct FsSnapshotReader {
    path: PathBuf,
    reader: BufReader<File>,
}

impl FsSnapshotReader {
    pub fn open(path: impl Into<PathBuf>) -> StreamResult<Self> {
        let path = path.into();
        let file = File::open(&path).map_err(|e| io_error(&path, e))?;
        Ok(Self {
            path,
            reader: BufReader::new(file),
        })
    }
}

impl SnapshotSource for FsSnapshotReader {
    fn has_next(&mut self) -> StreamResult<bool> {
        let buffered = self.reader.fill_buf().map_err(|e| io_error(&self.path, e))?;
        Ok(!buffered.is_empty())
    }

    fn read_entity(&mut self) -> StreamResult<Entity> {
        let mut deserializer = serde_cbor::Deserializer::from_reader(&mut self.reader);
        Entity::deserialize(&mut deserializer).map_err(StreamError::Decode)
    }
}

/// Writes a snapshot as a sequence of CBOR-encoded entities. Output is
/// staged in a temporary file next to the target path; the target is only
/// replaced by [`FsSnapshotWriter::finalize`]. A writer dropped without
/// finalizing removes its staging file and leaves the target untouched.
#[derive(Debug)]
pub struct FsSnapshotWriter {
    target: PathBuf,
    staged: BufWriter<NamedTempFile>,
}

impl FsSnapshotWriter {
    pub fn create(target: impl Into<PathBuf>) -> StreamResult<Self> {
        let target = target.into();
        let dir = target.parent().filter(|p| !p.as_os_str().is_empty());
        let dir = dir.unwrap_or(Path::new("."));
        let staged = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
        Ok(Self {
            target,
            staged: BufWriter::new(staged),
        })
    }

    /// Atomically move the staged snapshot into place. Failure here is a
    /// whole-snapshot failure even when every entity was written cleanly.
    pub fn finalize(self) -> StreamResult<()> {
        let target = self.target;
        let staged = self
            .staged
            .into_inner()
            .map_err(|e| io_error(&target, e.into_error()))?;
        staged
            .as_file()
            .sync_all()
            .map_err(|e| io_error(&target, e))?;
        staged.persist(&target).map_err(|e| StreamError::Persist {
            path: target.clone(),
            source: e.error,
        })?;
        Ok(())
    }
}

impl SnapshotSink for FsSnapshotWriter {
    fn write_entity(&mut self, entity: &Entity) -> StreamResult<()> {
        serde_cbor::to_writer(&mut self.staged, entity).map_err(StreamError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapmig_schema::{ComponentData, ComponentId, EntityId, FieldId, FieldValue, PrimitiveValue};
    use tempfile::TempDir;

    fn entity(id: i64) -> Entity {
        let mut component = ComponentData::empty(ComponentId(10));
        component.fields.insert(
            FieldId(1),
            FieldValue::Primitive(PrimitiveValue::Int64(id * 100)),
        );
        Entity {
            id: EntityId(id),
            components: vec![component],
        }
    }

    #[test]
    fn round_trip() {
        let dir = TempDir::new().expect("tmp");
        let path = dir.path().join("world.snapshot");

        let mut writer = FsSnapshotWriter::create(&path).expect("create");
        writer.write_entity(&entity(1)).expect("write");
        writer.write_entity(&entity(2)).expect("write");
        writer.finalize().expect("finalize");

        let mut reader = FsSnapshotReader::open(&path).expect("open");
        let mut read = Vec::new();
        while reader.has_next().expect("has_next") {
            read.push(reader.read_entity().expect("read"));
        }
        assert_eq!(read, vec![entity(1), entity(2)]);
    }

    #[test]
    fn unfinalized_writer_leaves_no_target() {
        let dir = TempDir::new().expect("tmp");
        let path = dir.path().join("world.snapshot");

        {
            let mut writer = FsSnapshotWriter::create(&path).expect("create");
            writer.write_entity(&entity(1)).expect("write");
            // Dropped without finalize: simulates a failed migration.
        }

        assert!(!path.exists());
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read_dir")
            .collect::<Result<_, _>>()
            .expect("entries");
        assert!(leftovers.is_empty(), "staging file must be cleaned up");
    }

    #[test]
    fn finalize_replaces_existing_target() {
        let dir = TempDir::new().expect("tmp");
        let path = dir.path().join("world.snapshot");
        std::fs::write(&path, b"stale").expect("seed");

        let mut writer = FsSnapshotWriter::create(&path).expect("create");
        writer.write_entity(&entity(7)).expect("write");
        writer.finalize().expect("finalize");

        let mut reader = FsSnapshotReader::open(&path).expect("open");
        assert!(reader.has_next().expect("has_next"));
        assert_eq!(reader.read_entity().expect("read"), entity(7));
        assert!(!reader.has_next().expect("has_next"));
    }

    #[test]
    fn empty_snapshot_reads_as_exhausted() {
        let dir = TempDir::new().expect("tmp");
        let path = dir.path().join("empty.snapshot");
        let writer = FsSnapshotWriter::create(&path).expect("create");
        writer.finalize().expect("finalize");

        let mut reader = FsSnapshotReader::open(&path).expect("open");
        assert!(!reader.has_next().expect("has_next"));
    }
}
