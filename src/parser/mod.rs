pub mod geojson;
pub mod record;

pub use geojson::*;
pub use record::*;
