use crate::telemetry::MigrationReport;
use serde::Serialize;
use snapmig_schema::{ComponentId, EntityId};
use std::{
    fs::{self, OpenOptions},
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("report encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_error(path: impl Into<PathBuf>, err: io::Error) -> ReportError {
    ReportError::Io {
        path: path.into(),
        source: err,
    }
}

/// Consumes a finalized, read-only migration report.
pub trait ReportSink {
    fn write_report(&mut self, report: &MigrationReport) -> Result<(), ReportError>;
}

/// Fixed-width summary block on the log.
#[derive(Debug, Default)]
pub struct LogReportSink;

impl ReportSink for LogReportSink {
    fn write_report(&mut self, report: &MigrationReport) -> Result<(), ReportError> {
        log::info!(
            "-- migration report for {} (elapsed time: {:.2} seconds) --",
            report.snapshot_name,
            report.elapsed_seconds
        );
        log::info!("{:<25}: {:>6}", "# encountered", report.encountered);
        log::info!(
            "{:<25}: {:>6} ({:>5.2}% of encountered)",
            "# successfully migrated",
            report.migrated,
            report.percent_migrated
        );
        log::info!(
            "{:<25}: {:>6} ({:>5.2}% of encountered)",
            "# skipped",
            report.skipped,
            report.percent_skipped
        );
        log::info!("-- end of migration report --");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct JsonReport<'a> {
    snapshot_name: &'a str,
    elapsed_time: f64,
    num_encountered_entities: u64,
    num_migrated_entities: u64,
    percent_migrated_entities: f64,
    num_skipped_entities: u64,
    percent_skipped_entities: f64,
    skipped_entities: Vec<SkippedEntityDoc<'a>>,
    skipped_component_field_updates: Vec<SkippedFieldGroupDoc<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SkippedEntityDoc<'a> {
    entity_id: EntityId,
    class: &'a str,
    skip_reason: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SkippedFieldGroupDoc<'a> {
    entity_id: EntityId,
    num_skipped_component_fields: usize,
    skipped_component_fields: Vec<SkippedFieldDoc<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SkippedFieldDoc<'a> {
    component_id: ComponentId,
    field_name: &'a str,
    skip_reason: &'a str,
}

impl<'a> JsonReport<'a> {
    fn from_report(report: &'a MigrationReport) -> Self {
        // The report maps are keyed by entity id, so both listings come out
        // id-sorted without an extra sort.
        let skipped_entities = report
            .skipped_entities
            .iter()
            .map(|(entity_id, skip)| SkippedEntityDoc {
                entity_id: *entity_id,
                class: &skip.class,
                skip_reason: &skip.reason,
            })
            .collect();
        let skipped_component_field_updates = report
            .skipped_component_fields
            .iter()
            .map(|(entity_id, skips)| SkippedFieldGroupDoc {
                entity_id: *entity_id,
                num_skipped_component_fields: skips.len(),
                skipped_component_fields: skips
                    .iter()
                    .map(|skip| SkippedFieldDoc {
                        component_id: skip.component_id,
                        field_name: &skip.field_name,
                        skip_reason: &skip.reason,
                    })
                    .collect(),
            })
            .collect();

        Self {
            snapshot_name: &report.snapshot_name,
            elapsed_time: report.elapsed_seconds,
            num_encountered_entities: report.encountered,
            num_migrated_entities: report.migrated,
            percent_migrated_entities: report.percent_migrated,
            num_skipped_entities: report.skipped,
            percent_skipped_entities: report.percent_skipped,
            skipped_entities,
            skipped_component_field_updates,
        }
    }
}

/// Appends one condensed JSON document per snapshot to a target file. The
/// file is truncated when the sink is created, not per report.
#[derive(Debug)]
pub struct JsonReportSink {
    path: PathBuf,
}

impl JsonReportSink {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let path = path.into();
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(io_error(path, err)),
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for JsonReportSink {
    fn write_report(&mut self, report: &MigrationReport) -> Result<(), ReportError> {
        let mut line = serde_json::to_string(&JsonReport::from_report(report))?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| io_error(&self.path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| io_error(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::MigrationRecord;

    #[test]
    fn json_report_shape() {
        let mut record = MigrationRecord::new("alpha.snapshot");
        record.record_migrated_entity();
        record.record_skipped_entity(EntityId(12), "game.Ghost", "reason a");
        record.record_skipped_entity(EntityId(4), "game.Husk", "reason b");
        record.record_skipped_component_field_update(
            EntityId(7),
            ComponentId(42),
            "score",
            "type mismatch between old and new field definitions",
        );
        let report = record.finalize();

        let value =
            serde_json::to_value(JsonReport::from_report(&report)).expect("serialize");
        assert_eq!(value["SnapshotName"], "alpha.snapshot");
        assert_eq!(value["NumEncounteredEntities"], 3);
        assert_eq!(value["NumMigratedEntities"], 1);
        assert_eq!(value["NumSkippedEntities"], 2);

        // Skipped entity listing is sorted by entity id.
        let skipped = value["SkippedEntities"].as_array().expect("array");
        assert_eq!(skipped[0]["EntityId"], 4);
        assert_eq!(skipped[1]["EntityId"], 12);
        assert_eq!(skipped[1]["SkipReason"], "reason a");

        let field_groups = value["SkippedComponentFieldUpdates"]
            .as_array()
            .expect("array");
        assert_eq!(field_groups[0]["EntityId"], 7);
        assert_eq!(field_groups[0]["NumSkippedComponentFields"], 1);
        assert_eq!(
            field_groups[0]["SkippedComponentFields"][0]["ComponentId"],
            42
        );
        assert_eq!(field_groups[0]["SkippedComponentFields"][0]["FieldName"], "score");
    }

    #[test]
    fn json_sink_appends_one_line_per_snapshot() {
        let dir = tempfile::TempDir::new().expect("tmp");
        let path = dir.path().join("report.json");
        std::fs::write(&path, "stale contents\n").expect("seed");

        let mut sink = JsonReportSink::create(&path).expect("create");
        sink.write_report(&MigrationRecord::new("one").finalize())
            .expect("write");
        sink.write_report(&MigrationRecord::new("two").finalize())
            .expect("write");

        let contents = std::fs::read_to_string(&path).expect("read");
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2, "stale file must be replaced");
        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("json");
        assert_eq!(first["SnapshotName"], "one");
    }
}
