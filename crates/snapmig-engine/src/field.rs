use crate::telemetry::MigrationRecord;
use snapmig_schema::{
    COMPONENT_INTEREST_TYPE, ComponentData, ComponentDefinition, ComponentUpdate, EntityId,
    FieldDefinition, FieldLayout, FieldType, FieldValue, PrimitiveKind, REQUIREMENT_SET_TYPE,
};

pub const TYPE_MISMATCH_REASON: &str = "type mismatch between old and new field definitions";

/// Build the update that carries one old component's data onto its new-schema
/// correspondent. Only fields that exist in both definitions with an equal
/// type descriptor migrate; a present-but-retyped field records a skip, an
/// absent one is silently new. Returns `None` when the update would carry no
/// write and no clear, so callers never apply a no-op update.
pub fn component_migration(
    entity: EntityId,
    old_def: &ComponentDefinition,
    new_def: &ComponentDefinition,
    old_data: &ComponentData,
    record: &mut MigrationRecord,
) -> Option<ComponentUpdate> {
    let mut update = ComponentUpdate::new(new_def.id);
    let mut wrote = false;

    for field in &new_def.fields {
        let old_field = match old_def.field(&field.name) {
            Some(old_field) => old_field,
            // The field did not exist in the old schema: nothing to carry.
            None => continue,
        };
        if !old_field.is_same_type_as(field) {
            record.record_skipped_component_field_update(
                entity,
                new_def.id,
                field.name.as_str(),
                TYPE_MISMATCH_REASON,
            );
            continue;
        }

        let migrated = migrate_matching_field(field, old_field, old_data, &mut update);

        // A collection that migrated nothing must still be represented as
        // explicitly empty; omitting the write would read as "untouched".
        if !field.layout.is_singular() && !migrated {
            update.cleared.insert(field.id);
        }
        wrote |= migrated || !field.layout.is_singular();
    }

    if wrote { Some(update) } else { None }
}

/// Copy one field's values from the old component onto the update, re-keyed
/// to the new field id. Returns whether at least one value was copied.
fn migrate_matching_field(
    new_field: &FieldDefinition,
    old_field: &FieldDefinition,
    old_data: &ComponentData,
    update: &mut ComponentUpdate,
) -> bool {
    let Some(value) = old_data.fields.get(&old_field.id) else {
        return false;
    };

    if let FieldLayout::Map {
        key,
        value: map_value,
    } = &new_field.layout
        && !is_supported_map_shape(key, map_value)
    {
        // Known limitation: only the write-ACL and interest maps carry
        // forward; any other map shape stays behind without error.
        return false;
    }

    if !value_matches_layout(value, &new_field.layout) {
        return false;
    }
    if value.value_count() == 0 {
        return false;
    }

    update.writes.insert(new_field.id, value.clone());
    true
}

/// The two hardcoded map semantics with migration support, both keyed by an
/// unsigned 32-bit id.
fn is_supported_map_shape(key: &FieldType, value: &FieldType) -> bool {
    matches!(key, FieldType::Primitive(PrimitiveKind::Uint32))
        && matches!(
            value,
            FieldType::Object(name)
                if name == REQUIREMENT_SET_TYPE || name == COMPONENT_INTEREST_TYPE
        )
}

/// Reading a stored value through a layout it does not satisfy yields no
/// values, the same as an absent field.
fn value_matches_layout(value: &FieldValue, layout: &FieldLayout) -> bool {
    match layout {
        FieldLayout::Singular(FieldType::Primitive(kind)) => {
            matches!(value, FieldValue::Primitive(scalar) if scalar.kind() == *kind)
        }
        FieldLayout::Singular(FieldType::Object(_)) => matches!(value, FieldValue::Object(_)),
        FieldLayout::List(FieldType::Primitive(kind)) => {
            matches!(value, FieldValue::PrimitiveList(scalars)
                if scalars.iter().all(|scalar| scalar.kind() == *kind))
        }
        FieldLayout::List(FieldType::Object(_)) => matches!(value, FieldValue::ObjectList(_)),
        FieldLayout::Map {
            key: FieldType::Primitive(kind),
            ..
        } => {
            matches!(value, FieldValue::Map(entries)
                if entries.iter().all(|entry| entry.key.kind() == *kind))
        }
        FieldLayout::Map { .. } => matches!(value, FieldValue::Map(_)),
    }
}
