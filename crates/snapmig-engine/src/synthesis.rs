use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use snapmig_schema::{ComponentData, ComponentId};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Canonical new-schema component set a freshly instantiated object of one
/// class would carry; the migration target shape for one entity.
pub type Baseline = BTreeMap<ComponentId, ComponentData>;

#[derive(Debug, Error)]
#[error("{message}")]
pub struct SynthesisError {
    message: String,
}

impl SynthesisError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassInfo {
    /// Classes excluded from persistence skip migration entirely.
    pub persistent: bool,
}

/// Resolves class paths recorded in old snapshots against the current
/// codebase. Resolution failure is expected when a class has been deleted.
pub trait ClassRegistry {
    fn resolve(&self, class_path: &str) -> Option<ClassInfo>;

    /// Whether a new-bundle component id is a sublevel membership marker.
    /// Such markers are never part of a synthesized baseline but must
    /// survive migration when present on the old entity.
    fn is_sublevel_component(&self, id: ComponentId) -> bool;
}

/// Derives the baseline component set for a class. Production backs this
/// with a live simulation host, which is why it takes `&mut self`; tests and
/// the bundled CLI use a static fixture table instead.
pub trait BaselineSynthesizer {
    fn synthesize(
        &mut self,
        class_path: &str,
        startup_object: bool,
    ) -> Result<Baseline, SynthesisError>;
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassFixture {
    #[serde(default = "default_true")]
    pub persistent: bool,
    #[serde(default)]
    pub baseline: Vec<ComponentData>,
}

/// Serde-loadable class table backing both [`ClassRegistry`] and
/// [`BaselineSynthesizer`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassTable {
    #[serde(default)]
    pub sublevel_components: BTreeSet<ComponentId>,
    #[serde(default)]
    pub classes: IndexMap<String, ClassFixture>,
}

impl ClassTable {
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

impl ClassRegistry for ClassTable {
    fn resolve(&self, class_path: &str) -> Option<ClassInfo> {
        self.classes.get(class_path).map(|fixture| ClassInfo {
            persistent: fixture.persistent,
        })
    }

    fn is_sublevel_component(&self, id: ComponentId) -> bool {
        self.sublevel_components.contains(&id)
    }
}

/// Fixture-backed synthesizer reading baselines from a [`ClassTable`].
#[derive(Debug)]
pub struct FixtureSynthesizer<'a> {
    table: &'a ClassTable,
}

impl<'a> FixtureSynthesizer<'a> {
    pub fn new(table: &'a ClassTable) -> Self {
        Self { table }
    }
}

impl BaselineSynthesizer for FixtureSynthesizer<'_> {
    fn synthesize(
        &mut self,
        class_path: &str,
        _startup_object: bool,
    ) -> Result<Baseline, SynthesisError> {
        let fixture = self.table.classes.get(class_path).ok_or_else(|| {
            SynthesisError::new(format!("no baseline fixture for class '{class_path}'"))
        })?;
        Ok(fixture
            .baseline
            .iter()
            .map(|component| (component.component_id, component.clone()))
            .collect())
    }
}
