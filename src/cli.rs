use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "afmg-world-import")]
#[command(version, about = "Import Azgaar's Fantasy Map Generator GeoJSON exports into SQLite")]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import all export files of a world (looks for {world}_{kind}.geojson)
    Import {
        /// World name
        #[arg(short, long)]
        world: String,

        /// Directory to search for export files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// SQLite database path
        #[arg(long, env = "AFMG_DATABASE")]
        database: Option<PathBuf>,

        /// Only import these kinds (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        include: Option<Vec<String>>,

        /// Skip these kinds (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,

        /// SRID for geometry in files without a crs member
        #[arg(long, default_value_t = crate::import::DEFAULT_SRID)]
        srid: i64,

        /// Show a terminal dashboard instead of log lines
        #[arg(long)]
        tui: bool,
    },

    /// Reconcile map metadata and write {world}_mapinfo.json without importing
    Metadata {
        /// World name
        #[arg(short, long)]
        world: String,

        /// Directory to search for export files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// List worlds stored in the database
    ListWorlds {
        /// SQLite database path
        #[arg(long, env = "AFMG_DATABASE")]
        database: Option<PathBuf>,
    },

    /// List the feature kinds and their file names
    ListKinds,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
