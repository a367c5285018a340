use crate::bundle::PrimitiveKind;
use crate::{ComponentId, EntityId, FieldId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Field-id-keyed value tree of one component or nested object instance.
pub type FieldTree = BTreeMap<FieldId, FieldValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveValue {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    EntityId(EntityId),
}

impl PrimitiveValue {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            PrimitiveValue::Bool(_) => PrimitiveKind::Bool,
            PrimitiveValue::Int32(_) => PrimitiveKind::Int32,
            PrimitiveValue::Int64(_) => PrimitiveKind::Int64,
            PrimitiveValue::Uint32(_) => PrimitiveKind::Uint32,
            PrimitiveValue::Uint64(_) => PrimitiveKind::Uint64,
            PrimitiveValue::Float(_) => PrimitiveKind::Float,
            PrimitiveValue::Double(_) => PrimitiveKind::Double,
            PrimitiveValue::String(_) => PrimitiveKind::String,
            PrimitiveValue::Bytes(_) => PrimitiveKind::Bytes,
            PrimitiveValue::EntityId(_) => PrimitiveKind::EntityId,
        }
    }
}

/// One field's stored value. Object values are recursively field-id-keyed
/// trees, so the migrator can copy nested structures without knowing the
/// snapshot container's physical encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Primitive(PrimitiveValue),
    PrimitiveList(Vec<PrimitiveValue>),
    Object(FieldTree),
    ObjectList(Vec<FieldTree>),
    Map(Vec<MapEntry>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    pub key: PrimitiveValue,
    pub value: FieldTree,
}

impl FieldValue {
    /// Number of stored values; an empty collection carries zero.
    pub fn value_count(&self) -> usize {
        match self {
            FieldValue::Primitive(_) | FieldValue::Object(_) => 1,
            FieldValue::PrimitiveList(values) => values.len(),
            FieldValue::ObjectList(values) => values.len(),
            FieldValue::Map(entries) => entries.len(),
        }
    }

    pub fn shape_name(&self) -> &'static str {
        match self {
            FieldValue::Primitive(_) => "primitive",
            FieldValue::PrimitiveList(_) => "primitive list",
            FieldValue::Object(_) => "object",
            FieldValue::ObjectList(_) => "object list",
            FieldValue::Map(_) => "map",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentData {
    pub component_id: ComponentId,
    #[serde(default)]
    pub fields: FieldTree,
}

impl ComponentData {
    pub fn empty(component_id: ComponentId) -> Self {
        Self {
            component_id,
            fields: FieldTree::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub components: Vec<ComponentData>,
}

impl Entity {
    pub fn component(&self, id: ComponentId) -> Option<&ComponentData> {
        self.components
            .iter()
            .find(|component| component.component_id == id)
    }
}

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("update for component {update} cannot apply to component {target}")]
    ComponentMismatch {
        update: ComponentId,
        target: ComponentId,
    },
    #[error("field {field} holds a {existing} value but the update writes a {incoming} value")]
    ValueShapeMismatch {
        field: FieldId,
        existing: &'static str,
        incoming: &'static str,
    },
    #[error("field {field} holds a {existing:?} scalar but the update writes a {incoming:?} scalar")]
    ScalarKindMismatch {
        field: FieldId,
        existing: PrimitiveKind,
        incoming: PrimitiveKind,
    },
}

/// Set of written field values plus explicitly-cleared field ids for one
/// component. A clear is distinct from an untouched field: an empty
/// collection must be represented, not omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentUpdate {
    pub component_id: ComponentId,
    pub writes: BTreeMap<FieldId, FieldValue>,
    pub cleared: BTreeSet<FieldId>,
}

impl ComponentUpdate {
    pub fn new(component_id: ComponentId) -> Self {
        Self {
            component_id,
            writes: BTreeMap::new(),
            cleared: BTreeSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.cleared.is_empty()
    }

    /// Apply clears then writes onto a component's field tree. A write whose
    /// value shape disagrees with the value already stored under that field
    /// id is a data-level failure.
    pub fn apply_to(&self, target: &mut ComponentData) -> Result<(), ApplyError> {
        if self.component_id != target.component_id {
            return Err(ApplyError::ComponentMismatch {
                update: self.component_id,
                target: target.component_id,
            });
        }
        for field in &self.cleared {
            target.fields.remove(field);
        }
        for (field, value) in &self.writes {
            if let Some(existing) = target.fields.get(field) {
                if std::mem::discriminant(existing) != std::mem::discriminant(value) {
                    return Err(ApplyError::ValueShapeMismatch {
                        field: *field,
                        existing: existing.shape_name(),
                        incoming: value.shape_name(),
                    });
                }
                if let (FieldValue::Primitive(old), FieldValue::Primitive(new)) = (existing, value)
                    && old.kind() != new.kind()
                {
                    return Err(ApplyError::ScalarKindMismatch {
                        field: *field,
                        existing: old.kind(),
                        incoming: new.kind(),
                    });
                }
            }
            target.fields.insert(*field, value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_value(v: i32) -> FieldValue {
        FieldValue::Primitive(PrimitiveValue::Int32(v))
    }

    #[test]
    fn apply_clears_then_writes() {
        let mut data = ComponentData::empty(ComponentId(7));
        data.fields.insert(FieldId(1), int_value(5));
        data.fields
            .insert(FieldId(2), FieldValue::PrimitiveList(vec![]));

        let mut update = ComponentUpdate::new(ComponentId(7));
        update.writes.insert(FieldId(1), int_value(9));
        update.cleared.insert(FieldId(2));
        update.apply_to(&mut data).expect("apply");

        assert_eq!(data.fields.get(&FieldId(1)), Some(&int_value(9)));
        assert!(!data.fields.contains_key(&FieldId(2)));
    }

    #[test]
    fn apply_rejects_component_mismatch() {
        let mut data = ComponentData::empty(ComponentId(7));
        let update = ComponentUpdate::new(ComponentId(8));
        let err = update.apply_to(&mut data).expect_err("must reject");
        assert!(matches!(err, ApplyError::ComponentMismatch { .. }));
    }

    #[test]
    fn apply_rejects_incompatible_write() {
        let mut data = ComponentData::empty(ComponentId(7));
        data.fields.insert(FieldId(1), int_value(5));

        let mut update = ComponentUpdate::new(ComponentId(7));
        update.writes.insert(
            FieldId(1),
            FieldValue::Primitive(PrimitiveValue::String("five".into())),
        );
        let err = update.apply_to(&mut data).expect_err("must reject");
        assert!(matches!(err, ApplyError::ScalarKindMismatch { .. }));

        let mut update = ComponentUpdate::new(ComponentId(7));
        update
            .writes
            .insert(FieldId(1), FieldValue::PrimitiveList(vec![]));
        let err = update.apply_to(&mut data).expect_err("must reject");
        assert!(matches!(err, ApplyError::ValueShapeMismatch { .. }));
    }

    #[test]
    fn value_counts_distinguish_empty_collections() {
        assert_eq!(int_value(1).value_count(), 1);
        assert_eq!(FieldValue::PrimitiveList(vec![]).value_count(), 0);
        assert_eq!(FieldValue::Map(vec![]).value_count(), 0);
    }
}
