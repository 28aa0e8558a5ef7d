use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::info;
use uuid::Uuid;

use crate::error::{Result, StoreContext};
use crate::metadata::MapMetadata;

/// The stored world every feature row of a run is keyed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldHandle {
    pub id: String,
    pub name: String,
}

/// A row of the world registry
#[derive(Debug, Clone, PartialEq)]
pub struct WorldRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub width_pixels: u32,
    pub height_pixels: u32,
    pub meters_per_pixel: f64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

fn description(name: &str) -> String {
    format!("Imported world map: {name}")
}

/// Create the world named in `metadata`, or refresh its description, bounds,
/// dimensions and scale in place. The id of an existing world never changes.
pub fn resolve_world(conn: &mut Connection, metadata: &MapMetadata) -> Result<WorldHandle> {
    let name = metadata.world.as_str();
    let context = || format!("resolving world '{name}'");

    let bounds = serde_json::to_string(&metadata.bounds)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
        .store_context(context)?;
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let b = &metadata.bounds;

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .store_context(context)?;

    let existing: Option<String> = tx
        .query_row("SELECT id FROM worlds WHERE name = ?1", [name], |row| row.get(0))
        .optional()
        .store_context(context)?;

    let id = match existing {
        Some(id) => {
            tx.execute(
                "UPDATE worlds SET description = ?2, bounds = ?3, north = ?4, south = ?5,
                    east = ?6, west = ?7, width_pixels = ?8, height_pixels = ?9,
                    meters_per_pixel = ?10, updated_at = ?11
                 WHERE id = ?1",
                params![
                    id,
                    description(name),
                    bounds,
                    b.north,
                    b.south,
                    b.east,
                    b.west,
                    metadata.width_pixels,
                    metadata.height_pixels,
                    metadata.meters_per_pixel,
                    now,
                ],
            )
            .store_context(context)?;
            info!(world = name, id = %id, "updated existing world");
            id
        }
        None => {
            let id = Uuid::new_v4().to_string();
            tx.execute(
                "INSERT INTO worlds (id, name, description, bounds, north, south, east, west,
                    width_pixels, height_pixels, meters_per_pixel, is_active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 1, ?12, ?12)",
                params![
                    id,
                    name,
                    description(name),
                    bounds,
                    b.north,
                    b.south,
                    b.east,
                    b.west,
                    metadata.width_pixels,
                    metadata.height_pixels,
                    metadata.meters_per_pixel,
                    now,
                ],
            )
            .store_context(context)?;
            info!(world = name, id = %id, "created new world");
            id
        }
    };

    tx.commit().store_context(context)?;

    Ok(WorldHandle {
        id,
        name: name.to_string(),
    })
}

const WORLD_COLUMNS: &str = "id, name, description, north, south, east, west, width_pixels, \
     height_pixels, meters_per_pixel, is_active, created_at, updated_at";

fn world_from_row(row: &rusqlite::Row) -> rusqlite::Result<WorldRecord> {
    Ok(WorldRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        north: row.get(3)?,
        south: row.get(4)?,
        east: row.get(5)?,
        west: row.get(6)?,
        width_pixels: row.get(7)?,
        height_pixels: row.get(8)?,
        meters_per_pixel: row.get(9)?,
        is_active: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

/// Look up a world by name
pub fn find_world(conn: &Connection, name: &str) -> Result<Option<WorldRecord>> {
    conn.query_row(
        &format!("SELECT {WORLD_COLUMNS} FROM worlds WHERE name = ?1"),
        [name],
        world_from_row,
    )
    .optional()
    .store_context(|| format!("looking up world '{name}'"))
}

/// All stored worlds ordered by name
pub fn list_worlds(conn: &Connection) -> Result<Vec<WorldRecord>> {
    let context = || "listing worlds".to_string();
    let mut stmt = conn
        .prepare(&format!("SELECT {WORLD_COLUMNS} FROM worlds ORDER BY name"))
        .store_context(context)?;
    let rows = stmt
        .query_map([], world_from_row)
        .store_context(context)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .store_context(context)?;
    Ok(rows)
}
