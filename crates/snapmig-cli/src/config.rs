use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// One discovered snapshot: its file name plus resolved source and target
/// paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub name: String,
    pub source_path: PathBuf,
    pub target_path: PathBuf,
}

/// Allow-list files carry one pattern per line; blank lines and '#' comments
/// are ignored.
pub fn parse_patterns(contents: &str) -> Vec<&str> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

/// Find every *.snapshot file in the artifacts directory, name-sorted so runs
/// are deterministic.
pub fn discover_snapshots(artifacts_dir: &Path, target_dir: &Path) -> Result<Vec<Snapshot>> {
    let entries = std::fs::read_dir(artifacts_dir)
        .with_context(|| format!("failed to scan artifacts directory {artifacts_dir:?}"))?;

    let mut snapshots = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed to scan artifacts directory {artifacts_dir:?}"))?;
        let source_path = entry.path();
        if source_path.extension().is_none_or(|ext| ext != "snapshot") {
            continue;
        }
        let Some(name) = source_path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        snapshots.push(Snapshot {
            name: name.to_string(),
            source_path: source_path.clone(),
            target_path: target_dir.join(name),
        });
    }
    snapshots.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(snapshots)
}
