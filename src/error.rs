use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by an import run.
///
/// `InputRead` and `InputParse` are both input-read failures: the file could
/// not be opened, or it was not a feature collection.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path:?}: {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?} as a feature collection: {source}")]
    InputParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "no valid metadata.scale.length_per_pixel found for world '{world}' (searched {} files)",
        .searched.len()
    )]
    MissingScale { world: String, searched: Vec<PathBuf> },

    #[error("unable to locate a drawing for world '{world}' (searched {searched:?})")]
    MissingDrawing { world: String, searched: Vec<PathBuf> },

    #[error("unable to determine dimensions of {drawing:?}: {reason}")]
    UnresolvableDimensions { drawing: PathBuf, reason: String },

    #[error("failed to write metadata artifact {path:?}: {source}")]
    MetadataPersist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("feature #{index} in {path:?} (world '{world}') has no numeric id")]
    MissingLocalId {
        world: String,
        path: PathBuf,
        index: usize,
    },

    #[error("store error while {context}: {source}")]
    Store {
        context: String,
        #[source]
        source: rusqlite::Error,
    },
}

pub type Result<T, E = ImportError> = std::result::Result<T, E>;

/// Attach a description of the operation to a store failure.
pub(crate) trait StoreContext<T> {
    fn store_context(self, context: impl FnOnce() -> String) -> Result<T>;
}

impl<T> StoreContext<T> for rusqlite::Result<T> {
    fn store_context(self, context: impl FnOnce() -> String) -> Result<T> {
        self.map_err(|source| ImportError::Store {
            context: context(),
            source,
        })
    }
}
