use crate::{SnapshotSink, SnapshotSource, StreamError, StreamResult};
use snapmig_schema::Entity;
use std::collections::VecDeque;

/// In-memory entity source for tests and embedding.
#[derive(Debug, Default)]
pub struct MemSnapshotReader {
    entities: VecDeque<Entity>,
}

impl MemSnapshotReader {
    pub fn new(entities: impl IntoIterator<Item = Entity>) -> Self {
        Self {
            entities: entities.into_iter().collect(),
        }
    }
}

impl SnapshotSource for MemSnapshotReader {
    fn has_next(&mut self) -> StreamResult<bool> {
        Ok(!self.entities.is_empty())
    }

    fn read_entity(&mut self) -> StreamResult<Entity> {
        self.entities.pop_front().ok_or(StreamError::Exhausted)
    }
}

/// In-memory entity sink for tests and embedding.
#[derive(Debug, Default)]
pub struct MemSnapshotWriter {
    entities: Vec<Entity>,
}

impl MemSnapshotWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }
}

impl SnapshotSink for MemSnapshotWriter {
    fn write_entity(&mut self, entity: &Entity) -> StreamResult<()> {
        self.entities.push(entity.clone());
        Ok(())
    }
}
