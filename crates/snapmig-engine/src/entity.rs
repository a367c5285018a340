use crate::field;
use crate::filter::ClassFilter;
use crate::synthesis::{BaselineSynthesizer, ClassRegistry};
use crate::telemetry::MigrationRecord;
use snapmig_schema::{
    ComponentData, ComponentId, Entity, FieldValue, PrimitiveValue, SchemaCatalog,
    corresponding_component_id, well_known,
};
use snapmig_store::{SnapshotSink, SnapshotSource, StreamError};
use std::collections::BTreeMap;

pub const FILTERED_REASON: &str = "class does not match any pattern in the allow-list";
pub const CLASS_NOT_FOUND_REASON: &str =
    "could not locate class; expected if the class has been deleted";
pub const NOT_PERSISTENT_REASON: &str = "class is marked not persistent";
pub const SYNTHESIS_FAILED_REASON: &str = "failed to synthesize baseline components";
pub const COMPONENT_UPDATE_FAILED_REASON: &str =
    "encountered a problem while updating at least one component";
pub const METADATA_UNREADABLE_REASON: &str = "class identity metadata is missing a class path";

const UNKNOWN_CLASS: &str = "<unknown>";

#[derive(Debug, Clone, PartialEq, Eq)]
struct EntityIdentity {
    class_path: String,
    startup_object: bool,
}

fn decode_identity(meta: &ComponentData) -> Option<EntityIdentity> {
    let class_path = match meta.fields.get(&well_known::CLASS_PATH_FIELD_ID) {
        Some(FieldValue::Primitive(PrimitiveValue::String(path))) => path.clone(),
        _ => return None,
    };
    let startup_object = matches!(
        meta.fields.get(&well_known::STARTUP_OBJECT_FIELD_ID),
        Some(FieldValue::Primitive(PrimitiveValue::Bool(true)))
    );
    Some(EntityIdentity {
        class_path,
        startup_object,
    })
}

/// Migrates entities of one snapshot across two schema bundle versions.
/// Catalogs are passed in explicitly so the engine stays reentrant; nothing
/// here outlives a single entity's migration.
pub struct SnapshotMigrator<'a> {
    old_catalog: &'a SchemaCatalog,
    new_catalog: &'a SchemaCatalog,
    filter: &'a ClassFilter,
    registry: &'a dyn ClassRegistry,
    synthesizer: &'a mut dyn BaselineSynthesizer,
}

impl<'a> SnapshotMigrator<'a> {
    pub fn new(
        old_catalog: &'a SchemaCatalog,
        new_catalog: &'a SchemaCatalog,
        filter: &'a ClassFilter,
        registry: &'a dyn ClassRegistry,
        synthesizer: &'a mut dyn BaselineSynthesizer,
    ) -> Self {
        Self {
            old_catalog,
            new_catalog,
            filter,
            registry,
            synthesizer,
        }
    }

    /// Drive one snapshot from source to sink. Entity-level failures are
    /// recorded and the stream continues; a stream error aborts the whole
    /// snapshot and surfaces to the caller.
    pub fn migrate_snapshot<S, W>(
        &mut self,
        source: &mut S,
        sink: &mut W,
        record: &mut MigrationRecord,
    ) -> Result<(), StreamError>
    where
        S: SnapshotSource + ?Sized,
        W: SnapshotSink + ?Sized,
    {
        while source.has_next()? {
            let entity = source.read_entity()?;
            if let Some(migrated) = self.migrate_entity(&entity, record) {
                sink.write_entity(&migrated)?;
                record.record_migrated_entity();
            }
        }
        Ok(())
    }

    /// Per-entity state machine. Returns the merged entity to write, or
    /// `None` when the entity was skipped (with the reason recorded).
    pub fn migrate_entity(&mut self, entity: &Entity, record: &mut MigrationRecord) -> Option<Entity> {
        let Some(meta) = entity.component(well_known::CLASS_IDENTITY_COMPONENT_ID) else {
            // Infrastructure entity: carries no class identity, copied
            // verbatim and accepted unconditionally.
            return Some(entity.clone());
        };

        let Some(identity) = decode_identity(meta) else {
            record.record_skipped_entity(entity.id, UNKNOWN_CLASS, METADATA_UNREADABLE_REASON);
            return None;
        };
        let class_path = identity.class_path.as_str();

        if !self.filter.admits(class_path) {
            record.record_skipped_entity(entity.id, class_path, FILTERED_REASON);
            return None;
        }

        let Some(class) = self.registry.resolve(class_path) else {
            record.record_skipped_entity(entity.id, class_path, CLASS_NOT_FOUND_REASON);
            return None;
        };

        if !class.persistent {
            record.record_skipped_entity(entity.id, class_path, NOT_PERSISTENT_REASON);
            return None;
        }

        let mut baseline = match self
            .synthesizer
            .synthesize(class_path, identity.startup_object)
        {
            Ok(baseline) => baseline,
            Err(err) => {
                log::warn!(
                    "failed to synthesize baseline for entity {} ({}): {}",
                    entity.id,
                    class_path,
                    err
                );
                record.record_skipped_entity(entity.id, class_path, SYNTHESIS_FAILED_REASON);
                return None;
            }
        };

        // Old components whose type survived into the new bundle, indexed by
        // old id. Components of removed types are dropped silently.
        let mut old_by_id: BTreeMap<ComponentId, &ComponentData> = BTreeMap::new();
        for component in &entity.components {
            let Some(new_id) = corresponding_component_id(
                self.old_catalog,
                self.new_catalog,
                component.component_id,
            ) else {
                continue;
            };
            // Tombstone and sublevel markers never appear on a freshly
            // synthesized baseline; seed them empty so the merge below can
            // fill in their old fields.
            if new_id == well_known::TOMBSTONE_COMPONENT_ID
                || self.registry.is_sublevel_component(new_id)
            {
                baseline
                    .entry(new_id)
                    .or_insert_with(|| ComponentData::empty(new_id));
            }
            old_by_id.insert(component.component_id, component);
        }

        for (new_id, data) in baseline.iter_mut() {
            let Some(old_id) =
                corresponding_component_id(self.new_catalog, self.old_catalog, *new_id)
            else {
                continue;
            };
            let Some(old_data) = old_by_id.get(&old_id).copied() else {
                continue;
            };
            let (Some(old_def), Some(new_def)) = (
                self.old_catalog.definition(old_id),
                self.new_catalog.definition(*new_id),
            ) else {
                continue;
            };

            let Some(update) =
                field::component_migration(entity.id, old_def, new_def, old_data, record)
            else {
                continue;
            };
            if let Err(err) = update.apply_to(data) {
                log::error!(
                    "failed to carry data forward onto component {} of entity {}: {}",
                    new_def.name,
                    entity.id,
                    err
                );
                record.record_skipped_entity(entity.id, class_path, COMPONENT_UPDATE_FAILED_REASON);
                return None;
            }
        }

        Some(Entity {
            id: entity.id,
            components: baseline.into_values().collect(),
        })
    }
}
