pub mod schema_gen;
pub mod sqlite;
pub mod world;

pub use sqlite::WorldStore;
pub use world::{WorldHandle, WorldRecord};
