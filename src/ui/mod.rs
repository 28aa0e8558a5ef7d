//! Progress reporting for an import run.
//!
//! The orchestrator and the store report through [`Ui`]. [`UiApp`] draws a
//! terminal dashboard, [`LogUi`] turns events into `tracing` records and
//! [`SilentUi`] drops them.

mod app;
mod board;
mod components;

pub use app::UiApp;
pub use board::{Board, KindState};

use std::path::Path;

use crate::error::ImportError;
use crate::metadata::MapMetadata;
use crate::schema::FeatureKind;
use crate::writer::WorldHandle;

/// Stages of an import run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Discovering,
    Reconciling,
    ResolvingWorld,
    Ingesting,
    Complete,
    Failed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Discovering => write!(f, "Discovering export files"),
            Phase::Reconciling => write!(f, "Reconciling map metadata"),
            Phase::ResolvingWorld => write!(f, "Resolving world"),
            Phase::Ingesting => write!(f, "Ingesting features"),
            Phase::Complete => write!(f, "Complete"),
            Phase::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Level {
    Info,
    Warn,
}

/// Receiver of import events.
///
/// Only `set_phase` and `log` are required; the other events fall back to a
/// log line.
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn log(&mut self, level: Level, message: impl Into<String>);

    fn info(&mut self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.log(Level::Warn, message);
    }

    fn kind_found(&mut self, kind: FeatureKind, path: &Path) {
        self.info(format!("Found {} file: {}", kind, path.display()));
    }

    fn kind_missing(&mut self, kind: FeatureKind, expected: &Path) {
        self.warn(format!("Missing {} file: {}", kind, expected.display()));
    }

    fn metadata_ready(&mut self, metadata: &MapMetadata) {
        self.info(format!(
            "Map is {}x{} px at {} m/px, written to {}",
            metadata.width_pixels,
            metadata.height_pixels,
            metadata.meters_per_pixel,
            metadata.artifact_path().display()
        ));
    }

    fn world_resolved(&mut self, world: &WorldHandle) {
        self.info(format!("World '{}' is {}", world.name, world.id));
    }

    fn file_started(&mut self, _kind: FeatureKind, _path: &Path, _features: usize) {}

    fn rows_written(&mut self, _kind: FeatureKind, _written: u64, _total: u64) {}

    fn file_finished(&mut self, kind: FeatureKind, rows: u64) {
        self.info(format!("Imported {} {} features", rows, kind));
    }

    fn file_failed(&mut self, kind: FeatureKind, error: &ImportError) {
        self.warn(format!("Failed to import {}: {}", kind, error));
    }
}

/// Reporter that emits `tracing` events, for non-interactive runs
#[derive(Default)]
pub struct LogUi;

impl Ui for LogUi {
    fn set_phase(&mut self, phase: Phase) {
        tracing::debug!(%phase, "phase");
    }

    fn log(&mut self, level: Level, message: impl Into<String>) {
        match level {
            Level::Info => tracing::info!("{}", message.into()),
            Level::Warn => tracing::warn!("{}", message.into()),
        }
    }

    fn world_resolved(&mut self, world: &WorldHandle) {
        tracing::info!(world = %world.name, world_id = %world.id, "world resolved");
    }

    fn file_started(&mut self, kind: FeatureKind, path: &Path, features: usize) {
        tracing::debug!(%kind, file = %path.display(), features, "file started");
    }

    fn rows_written(&mut self, kind: FeatureKind, written: u64, total: u64) {
        tracing::debug!(%kind, written, total, "rows written");
    }
}

/// Silent reporter for tests and library use
#[derive(Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn log(&mut self, _level: Level, _message: impl Into<String>) {}
}
