use crate::bundle::{FieldLayout, SchemaBundleDoc};
use crate::{ComponentId, FieldId};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("schema bundle decode error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate component id {id}")]
    DuplicateComponentId { id: ComponentId },
    #[error("component name '{name}' is declared by components {first} and {second}")]
    DuplicateComponentName {
        name: String,
        first: ComponentId,
        second: ComponentId,
    },
    #[error("component '{component}' declares field id {id} more than once")]
    DuplicateFieldId { component: String, id: FieldId },
}

#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub id: FieldId,
    pub name: String,
    pub layout: FieldLayout,
}

impl FieldDefinition {
    pub fn is_same_type_as(&self, other: &FieldDefinition) -> bool {
        self.layout == other.layout
    }
}

#[derive(Debug, Clone)]
pub struct ComponentDefinition {
    pub id: ComponentId,
    pub name: String,
    pub fields: Vec<FieldDefinition>,
}

impl ComponentDefinition {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_by_id(&self, id: FieldId) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.id == id)
    }
}

/// Component definitions of one compiled bundle version, indexed by id and by
/// name. Built once per run and held immutable for its duration.
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    components: IndexMap<ComponentId, ComponentDefinition>,
    names: IndexMap<String, ComponentId>,
}

impl SchemaCatalog {
    pub fn from_bundle(doc: SchemaBundleDoc) -> Result<Self, CatalogError> {
        let mut components = IndexMap::new();
        let mut names = IndexMap::new();

        for descriptor in doc.components {
            if let Some(first) = names.get(&descriptor.name) {
                return Err(CatalogError::DuplicateComponentName {
                    name: descriptor.name,
                    first: *first,
                    second: descriptor.id,
                });
            }

            let mut fields = Vec::with_capacity(descriptor.fields.len());
            for field in descriptor.fields {
                if fields.iter().any(|f: &FieldDefinition| f.id == field.id) {
                    return Err(CatalogError::DuplicateFieldId {
                        component: descriptor.name,
                        id: field.id,
                    });
                }
                fields.push(FieldDefinition {
                    id: field.id,
                    name: field.name,
                    layout: field.layout,
                });
            }

            let definition = ComponentDefinition {
                id: descriptor.id,
                name: descriptor.name.clone(),
                fields,
            };
            if components.insert(descriptor.id, definition).is_some() {
                return Err(CatalogError::DuplicateComponentId { id: descriptor.id });
            }
            names.insert(descriptor.name, descriptor.id);
        }

        Ok(Self { components, names })
    }

    pub fn definition(&self, id: ComponentId) -> Option<&ComponentDefinition> {
        self.components.get(&id)
    }

    pub fn definition_by_name(&self, name: &str) -> Option<&ComponentDefinition> {
        self.components.get(&self.names.get(name).copied()?)
    }

    pub fn component_id_by_name(&self, name: &str) -> Option<ComponentId> {
        self.names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

pub fn load_catalog_from_path(path: impl AsRef<Path>) -> Result<SchemaCatalog, CatalogError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_catalog_from_bytes(&bytes)
}

pub fn load_catalog_from_bytes(bytes: &[u8]) -> Result<SchemaCatalog, CatalogError> {
    let doc: SchemaBundleDoc = serde_json::from_slice(bytes)?;
    SchemaCatalog::from_bundle(doc)
}

/// Resolve a component id across bundle versions by name. Numeric ids are
/// reassigned per compilation, so correspondence is purely name-based.
/// Returns `None` when the target bundle has no same-named component, which
/// is the expected outcome for removed component types.
pub fn corresponding_component_id(
    from: &SchemaCatalog,
    to: &SchemaCatalog,
    id: ComponentId,
) -> Option<ComponentId> {
    let definition = from.definition(id)?;
    to.component_id_by_name(&definition.name)
}
