use serde::Serialize;
use snapmig_schema::{ComponentId, EntityId};
use std::collections::BTreeMap;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntity {
    pub class: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFieldUpdate {
    pub component_id: ComponentId,
    pub field_name: String,
    pub reason: String,
}

/// Per-snapshot accumulator for migration outcomes. Created at run start,
/// mutated throughout, finalized exactly once into a [`MigrationReport`].
#[derive(Debug)]
pub struct MigrationRecord {
    snapshot_name: String,
    start: Instant,
    migrated: u64,
    skipped_entities: BTreeMap<EntityId, SkippedEntity>,
    skipped_component_fields: BTreeMap<EntityId, Vec<SkippedFieldUpdate>>,
}

impl MigrationRecord {
    pub fn new(snapshot_name: impl Into<String>) -> Self {
        Self {
            snapshot_name: snapshot_name.into(),
            start: Instant::now(),
            migrated: 0,
            skipped_entities: BTreeMap::new(),
            skipped_component_fields: BTreeMap::new(),
        }
    }

    pub fn record_migrated_entity(&mut self) {
        self.migrated += 1;
    }

    pub fn record_skipped_entity(
        &mut self,
        entity: EntityId,
        class: impl Into<String>,
        reason: impl Into<String>,
    ) {
        self.skipped_entities.insert(
            entity,
            SkippedEntity {
                class: class.into(),
                reason: reason.into(),
            },
        );
    }

    pub fn record_skipped_component_field_update(
        &mut self,
        entity: EntityId,
        component_id: ComponentId,
        field_name: impl Into<String>,
        reason: impl Into<String>,
    ) {
        self.skipped_component_fields
            .entry(entity)
            .or_default()
            .push(SkippedFieldUpdate {
                component_id,
                field_name: field_name.into(),
                reason: reason.into(),
            });
    }

    /// Compute derived counts and percentages. Zero encountered entities
    /// yields 0% on both sides rather than a division by zero.
    pub fn finalize(self) -> MigrationReport {
        let elapsed_seconds = self.start.elapsed().as_secs_f64();
        let skipped = self.skipped_entities.len() as u64;
        let encountered = self.migrated + skipped;
        let (percent_migrated, percent_skipped) = if encountered > 0 {
            (
                100.0 * self.migrated as f64 / encountered as f64,
                100.0 * skipped as f64 / encountered as f64,
            )
        } else {
            (0.0, 0.0)
        };
        MigrationReport {
            snapshot_name: self.snapshot_name,
            elapsed_seconds,
            encountered,
            migrated: self.migrated,
            percent_migrated,
            skipped,
            percent_skipped,
            skipped_entities: self.skipped_entities,
            skipped_component_fields: self.skipped_component_fields,
        }
    }
}

/// Read-only outcome of one snapshot migration, consumed by report sinks.
/// The maps are keyed by entity id, so iteration is already id-sorted.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub snapshot_name: String,
    pub elapsed_seconds: f64,
    pub encountered: u64,
    pub migrated: u64,
    pub percent_migrated: f64,
    pub skipped: u64,
    pub percent_skipped: f64,
    pub skipped_entities: BTreeMap<EntityId, SkippedEntity>,
    pub skipped_component_fields: BTreeMap<EntityId, Vec<SkippedFieldUpdate>>,
}
