//! Canonical map metadata: scale, canvas size and world bounds.

pub mod drawing;
pub mod scale;

pub use drawing::*;
pub use scale::*;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{ImportError, Result};

/// World extent in map units, with (0,0) at the top-left of the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub width_pixels: u32,
    pub height_pixels: u32,
    pub meters_per_pixel: f64,
}

impl Bounds {
    pub fn from_canvas(dims: Dimensions, meters_per_pixel: f64) -> Self {
        Self {
            north: 0.0,
            south: -(dims.height as f64) * meters_per_pixel,
            east: dims.width as f64 * meters_per_pixel,
            west: 0.0,
            width_pixels: dims.width,
            height_pixels: dims.height,
            meters_per_pixel,
        }
    }
}

/// Reconciled metadata for one world, also written as `{world}_mapinfo.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMetadata {
    pub world: String,
    pub generated_at: String,
    pub source_svg: PathBuf,
    pub width_pixels: u32,
    pub height_pixels: u32,
    pub meters_per_pixel: f64,
    pub bounds: Bounds,
}

impl MapMetadata {
    pub fn artifact_path(&self) -> PathBuf {
        artifact_path(&self.world, &self.source_svg)
    }
}

fn artifact_path(world: &str, drawing: &Path) -> PathBuf {
    drawing.with_file_name(format!("{world}_mapinfo.json"))
}

/// Derive the canonical metadata for a world from its export files and
/// drawing, then persist it next to the drawing.
pub fn reconcile(
    world: &str,
    files: &[PathBuf],
    resolver: &DimensionResolver,
) -> Result<MapMetadata> {
    let meters_per_pixel = extract_scale(files)?.ok_or_else(|| ImportError::MissingScale {
        world: world.to_string(),
        searched: files.to_vec(),
    })?;

    let drawing = find_drawing(world, files)?;
    let dims = resolver.resolve(&drawing)?;
    let source_svg = fs::canonicalize(&drawing).unwrap_or(drawing);

    let metadata = MapMetadata {
        world: world.to_string(),
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        source_svg,
        width_pixels: dims.width,
        height_pixels: dims.height,
        meters_per_pixel,
        bounds: Bounds::from_canvas(dims, meters_per_pixel),
    };

    info!(
        world,
        width = dims.width,
        height = dims.height,
        meters_per_pixel,
        "using canonical map metadata"
    );

    write_artifact(&metadata)?;
    Ok(metadata)
}

/// Overwrite the metadata artifact; the new file replaces the old one whole
pub fn write_artifact(metadata: &MapMetadata) -> Result<PathBuf> {
    let path = metadata.artifact_path();
    let persist_err = |source| ImportError::MetadataPersist {
        path: path.clone(),
        source,
    };

    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| persist_err(std::io::Error::new(std::io::ErrorKind::Other, e)))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(persist_err)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(persist_err)?;
    if let Err(e) = fs::rename(&tmp, &path) {
        let _ = fs::remove_file(&tmp);
        return Err(persist_err(e));
    }

    info!(path = %path.display(), "saved map metadata");
    Ok(path)
}
