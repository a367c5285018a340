//! Schema bundle model, version catalogs, and the entity/component data model
//! shared by the snapshot migration engine and its stream backends.

pub mod bundle;
pub mod catalog;
mod ids;
pub mod value;

pub use bundle::{
    COMPONENT_INTEREST_TYPE, ComponentDescriptor, FieldDescriptor, FieldLayout, FieldType,
    PrimitiveKind, REQUIREMENT_SET_TYPE, SchemaBundleDoc,
};
pub use catalog::{
    CatalogError, ComponentDefinition, FieldDefinition, SchemaCatalog, corresponding_component_id,
    load_catalog_from_bytes, load_catalog_from_path,
};
pub use ids::{ComponentId, EntityId, FieldId, well_known};
pub use value::{
    ApplyError, ComponentData, ComponentUpdate, Entity, FieldTree, FieldValue, MapEntry,
    PrimitiveValue,
};
