//! Schema-evolution-aware snapshot migration engine: field-level carry rules,
//! the per-entity coordinator, telemetry, and report sinks.

pub mod entity;
pub mod field;
pub mod filter;
pub mod report;
pub mod synthesis;
pub mod telemetry;

pub use entity::SnapshotMigrator;
pub use filter::ClassFilter;
pub use report::{JsonReportSink, LogReportSink, ReportError, ReportSink};
pub use synthesis::{
    Baseline, BaselineSynthesizer, ClassFixture, ClassInfo, ClassRegistry, ClassTable,
    FixtureSynthesizer, SynthesisError,
};
pub use telemetry::{MigrationRecord, MigrationReport, SkippedEntity, SkippedFieldUpdate};
