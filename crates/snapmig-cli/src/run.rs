use crate::Cli;
use crate::config::{Snapshot, discover_snapshots, parse_patterns};
use anyhow::{Context, Result};
use snapmig_engine::{
    ClassFilter, ClassTable, FixtureSynthesizer, JsonReportSink, LogReportSink, MigrationRecord,
    ReportSink, SnapshotMigrator,
};
use snapmig_schema::{SchemaCatalog, load_catalog_from_path};
use snapmig_store::{FsSnapshotReader, FsSnapshotWriter, StreamError};

pub fn run(cli: &Cli) -> Result<()> {
    let old_catalog = load_catalog_from_path(&cli.old_bundle)
        .with_context(|| format!("failed to load old schema bundle {:?}", cli.old_bundle))?;
    let new_catalog = load_catalog_from_path(&cli.new_bundle)
        .with_context(|| format!("failed to load new schema bundle {:?}", cli.new_bundle))?;

    let patterns = std::fs::read_to_string(&cli.allowlist)
        .with_context(|| format!("failed to read allow-list {:?}", cli.allowlist))?;
    let filter = ClassFilter::from_patterns(parse_patterns(&patterns))
        .context("invalid allow-list pattern")?;

    let classes = std::fs::read(&cli.classes)
        .with_context(|| format!("failed to read class table {:?}", cli.classes))?;
    let table = ClassTable::from_json_slice(&classes)
        .with_context(|| format!("failed to parse class table {:?}", cli.classes))?;

    std::fs::create_dir_all(&cli.target_dir)
        .with_context(|| format!("failed to create target directory {:?}", cli.target_dir))?;
    let snapshots = discover_snapshots(&cli.artifacts_dir, &cli.target_dir)?;
    if snapshots.is_empty() {
        log::warn!("no snapshots found under {:?}", cli.artifacts_dir);
    }

    let mut sinks: Vec<Box<dyn ReportSink>> = vec![Box::new(LogReportSink)];
    if let Some(path) = &cli.json_report {
        sinks.push(Box::new(JsonReportSink::create(path)?));
    }

    for snapshot in &snapshots {
        log::info!("migrating {}", snapshot.name);
        let mut record = MigrationRecord::new(snapshot.name.as_str());
        if let Err(err) = migrate_snapshot_file(
            &old_catalog,
            &new_catalog,
            &filter,
            &table,
            snapshot,
            &mut record,
        ) {
            // A failed snapshot aborts only itself; the run moves on.
            log::warn!("failed to migrate {}: {}", snapshot.name, err);
        }

        let report = record.finalize();
        for sink in sinks.iter_mut() {
            if let Err(err) = sink.write_report(&report) {
                log::warn!("failed to report on {}: {}", report.snapshot_name, err);
            }
        }
    }

    Ok(())
}

fn migrate_snapshot_file(
    old_catalog: &SchemaCatalog,
    new_catalog: &SchemaCatalog,
    filter: &ClassFilter,
    table: &ClassTable,
    snapshot: &Snapshot,
    record: &mut MigrationRecord,
) -> Result<(), StreamError> {
    let mut source = FsSnapshotReader::open(&snapshot.source_path)?;
    let mut sink = FsSnapshotWriter::create(&snapshot.target_path)?;
    let mut synthesizer = FixtureSynthesizer::new(table);
    let mut migrator =
        SnapshotMigrator::new(old_catalog, new_catalog, filter, table, &mut synthesizer);
    migrator.migrate_snapshot(&mut source, &mut sink, record)?;
    // Only a fully consumed stream may replace the target path.
    sink.finalize()
}
