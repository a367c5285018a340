use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an entity within one snapshot.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub i64);

/// Identifier of a component type within one compiled schema bundle. Numeric
/// ids are reassigned per compilation; only names are stable across versions.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentId(pub u32);

/// Identifier of a field within one component definition.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldId(pub u32);

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Component and field ids every snapshot generation agrees on.
pub mod well_known {
    use super::{ComponentId, FieldId};

    /// Carries an entity's class path and startup flag. Entities without it
    /// are infrastructure entities and migrate verbatim.
    pub const CLASS_IDENTITY_COMPONENT_ID: ComponentId = ComponentId(9949);

    /// Marks a deleted-but-retained entity. Never part of a freshly
    /// synthesized baseline; must survive migration when present.
    pub const TOMBSTONE_COMPONENT_ID: ComponentId = ComponentId(9983);

    /// Fields of the class identity component.
    pub const CLASS_PATH_FIELD_ID: FieldId = FieldId(1);
    pub const STARTUP_OBJECT_FIELD_ID: FieldId = FieldId(2);
}
