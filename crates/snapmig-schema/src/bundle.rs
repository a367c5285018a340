use crate::{ComponentId, FieldId};
use serde::{Deserialize, Serialize};

/// Resolved type name of the access-control requirement-set object. Map
/// fields valued with it are the write-ACL maps the migrator knows how to
/// carry forward.
pub const REQUIREMENT_SET_TYPE: &str = "improbable.WorkerRequirementSet";

/// Resolved type name of the component-interest descriptor object, the other
/// map value shape with hardcoded migration support.
pub const COMPONENT_INTEREST_TYPE: &str = "improbable.ComponentInterest";

/// One compiled schema bundle, as loaded from its JSON description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaBundleDoc {
    pub components: Vec<ComponentDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    pub id: ComponentId,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub id: FieldId,
    pub name: String,
    #[serde(flatten)]
    pub layout: FieldLayout,
}

/// Field type descriptor: scalar kind plus cardinality. Two fields correspond
/// across bundle versions only when their layouts compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldLayout {
    Singular(FieldType),
    List(FieldType),
    Map { key: FieldType, value: FieldType },
}

impl FieldLayout {
    pub fn is_singular(&self) -> bool {
        matches!(self, FieldLayout::Singular(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, FieldLayout::Map { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Primitive(PrimitiveKind),
    /// Object type, referenced by its fully resolved name.
    Object(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float,
    Double,
    String,
    Bytes,
    EntityId,
}
