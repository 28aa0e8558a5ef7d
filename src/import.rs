//! Import orchestration: discover a world's export files, reconcile its
//! metadata, resolve the world row, then ingest each kind in a fixed order.
//!
//! Each file is committed in its own transaction. A failure stops the run
//! but does not undo kinds that were already committed.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

use crate::error::Result;
use crate::metadata::{self, DimensionResolver, MapMetadata};
use crate::parser::read_feature_collection;
use crate::schema::FeatureKind;
use crate::ui::{Phase, Ui};
use crate::writer::WorldStore;

/// Export file extensions, in order of preference
pub const EXTENSIONS: &[&str] = &["geojson", "json"];

/// SRID declared for geometry when a file has no `crs` member
pub const DEFAULT_SRID: i64 = 0;

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Kinds to import; ingestion still follows `FeatureKind::ALL` order
    pub kinds: Vec<FeatureKind>,
    pub default_srid: i64,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            kinds: FeatureKind::ALL.to_vec(),
            default_srid: DEFAULT_SRID,
        }
    }
}

/// Export files found for a world, in ingestion order
#[derive(Debug, Clone, Default)]
pub struct WorldFiles {
    pub files: Vec<(FeatureKind, PathBuf)>,
}

impl WorldFiles {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|(_, p)| p.clone()).collect()
    }
}

/// Outcome of an import run
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub world: String,
    /// `None` when no export files were found and nothing was written
    pub world_id: Option<String>,
    pub metadata: Option<MapMetadata>,
    pub rows: Vec<(FeatureKind, u64)>,
    pub elapsed: Duration,
}

impl ImportReport {
    pub fn total(&self) -> u64 {
        self.rows.iter().map(|(_, n)| n).sum()
    }

    /// Rows written for a kind; zero when its file was absent
    pub fn rows_for(&self, kind: FeatureKind) -> u64 {
        self.rows
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

/// Candidate file names for one kind of a world
pub fn file_candidates(world: &str, kind: FeatureKind) -> Vec<String> {
    EXTENSIONS
        .iter()
        .map(|ext| format!("{}_{}.{}", world, kind.name(), ext))
        .collect()
}

/// Look for `{world}_{kind}.geojson` (or `.json`) in `search_dir`
pub fn discover_world_files(
    world: &str,
    search_dir: &Path,
    kinds: &[FeatureKind],
    ui: &mut impl Ui,
) -> WorldFiles {
    let mut found = WorldFiles::default();

    for kind in FeatureKind::ALL.into_iter().filter(|k| kinds.contains(k)) {
        let hit = file_candidates(world, kind)
            .into_iter()
            .map(|name| search_dir.join(name))
            .find(|path| path.is_file());

        match hit {
            Some(path) => {
                ui.kind_found(kind, &path);
                found.files.push((kind, path));
            }
            None => ui.kind_missing(kind, &search_dir.join(&file_candidates(world, kind)[0])),
        }
    }

    found
}

/// Discover the world's files and reconcile its metadata without touching
/// the store. Returns `None` when no files exist.
pub fn reconcile_world(
    world: &str,
    search_dir: &Path,
    kinds: &[FeatureKind],
    resolver: &DimensionResolver,
    ui: &mut impl Ui,
) -> Result<Option<(WorldFiles, MapMetadata)>> {
    ui.set_phase(Phase::Discovering);
    let files = discover_world_files(world, search_dir, kinds, ui);
    if files.is_empty() {
        ui.warn(format!("No export files found for world '{}'", world));
        return Ok(None);
    }

    ui.set_phase(Phase::Reconciling);
    let metadata = metadata::reconcile(world, &files.paths(), resolver)?;
    ui.metadata_ready(&metadata);

    Ok(Some((files, metadata)))
}

/// Import every available export file of `world` from `search_dir`
pub fn import_world(
    store: &mut WorldStore,
    world: &str,
    search_dir: &Path,
    options: &ImportOptions,
    resolver: &DimensionResolver,
    ui: &mut impl Ui,
) -> Result<ImportReport> {
    let start = Instant::now();
    info!(world, dir = %search_dir.display(), "starting import");

    let mut report = ImportReport {
        world: world.to_string(),
        world_id: None,
        metadata: None,
        rows: Vec::new(),
        elapsed: Duration::ZERO,
    };

    let Some((files, metadata)) = reconcile_world(world, search_dir, &options.kinds, resolver, ui)?
    else {
        report.elapsed = start.elapsed();
        return Ok(report);
    };

    ui.set_phase(Phase::ResolvingWorld);
    let handle = store.resolve_world(&metadata)?;
    ui.world_resolved(&handle);
    report.world_id = Some(handle.id.clone());
    report.metadata = Some(metadata);

    ui.set_phase(Phase::Ingesting);
    for (kind, path) in &files.files {
        let result = match read_feature_collection(path) {
            Ok(collection) => {
                ui.file_started(*kind, path, collection.features.len());
                store.ingest_collection(
                    *kind,
                    path,
                    &collection,
                    &handle,
                    options.default_srid,
                    &mut *ui,
                )
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(rows) => {
                ui.file_finished(*kind, rows);
                report.rows.push((*kind, rows));
            }
            Err(e) => {
                ui.file_failed(*kind, &e);
                return Err(e);
            }
        }
    }

    ui.set_phase(Phase::Complete);
    report.elapsed = start.elapsed();
    info!(
        world,
        world_id = %handle.id,
        total = report.total(),
        "import finished"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::SilentUi;
    use std::fs;

    #[test]
    fn test_file_candidates() {
        assert_eq!(
            file_candidates("Ald", FeatureKind::Burgs),
            vec!["Ald_burgs.geojson", "Ald_burgs.json"]
        );
    }

    #[test]
    fn test_discovery_keeps_kind_order_and_prefers_geojson() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Ald_markers.geojson", "Ald_cells.json", "Ald_cells.geojson", "Other_burgs.geojson"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }

        let found = discover_world_files(
            "Ald",
            dir.path(),
            &[FeatureKind::Markers, FeatureKind::Cells, FeatureKind::Burgs],
            &mut SilentUi::new(),
        );
        let names: Vec<_> = found
            .files
            .iter()
            .map(|(k, p)| (*k, p.file_name().unwrap().to_string_lossy().into_owned()))
            .collect();
        assert_eq!(
            names,
            vec![
                (FeatureKind::Cells, "Ald_cells.geojson".to_string()),
                (FeatureKind::Markers, "Ald_markers.geojson".to_string()),
            ]
        );
    }

    #[test]
    fn test_report_counts() {
        let report = ImportReport {
            world: "Ald".into(),
            world_id: Some("x".into()),
            metadata: None,
            rows: vec![(FeatureKind::Cells, 3), (FeatureKind::Rivers, 2)],
            elapsed: Duration::ZERO,
        };
        assert_eq!(report.total(), 5);
        assert_eq!(report.rows_for(FeatureKind::Rivers), 2);
        assert_eq!(report.rows_for(FeatureKind::Burgs), 0);
    }
}
