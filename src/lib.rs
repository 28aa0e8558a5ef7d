pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod import;
pub mod metadata;
pub mod parser;
pub mod schema;
pub mod ui;
pub mod writer;

pub use cli::{Cli, Commands};
pub use error::ImportError;
pub use import::{import_world, ImportOptions, ImportReport};
pub use schema::FeatureKind;
pub use ui::{LogUi, Phase, SilentUi, Ui, UiApp};
pub use writer::WorldStore;
