use rusqlite::{Connection, TransactionBehavior};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::schema_gen::{
    generate_create_table, generate_indexes, generate_upsert, generate_worlds_table,
};
use super::world::{self, WorldHandle, WorldRecord};
use crate::error::{ImportError, Result, StoreContext};
use crate::metadata::MapMetadata;
use crate::parser::{parse_record, promote_to_multi, FeatureCollection};
use crate::schema::{FeatureKind, GeometryMode};
use crate::ui::Ui;

const PROGRESS_INTERVAL: usize = 1000;
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection to the world store. Schema is applied on open; the connection
/// is released when the store is closed or dropped.
pub struct WorldStore {
    conn: Connection,
}

impl WorldStore {
    /// Open (or create) the store at `db_path`
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .store_context(|| format!("opening database {:?}", db_path))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().store_context(|| "opening in-memory database".into())?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)
            .store_context(|| "setting busy timeout".into())?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .store_context(|| "configuring connection".into())?;

        let store = Self { conn };
        store.create_tables()?;
        Ok(store)
    }

    /// Create the world table and all feature tables if missing
    fn create_tables(&self) -> Result<()> {
        self.conn
            .execute(&generate_worlds_table(), [])
            .store_context(|| "creating table worlds".into())?;

        for kind in FeatureKind::ALL {
            let schema = kind.schema();
            self.conn
                .execute(&generate_create_table(schema), [])
                .store_context(|| format!("creating table {}", schema.name))?;

            for index_sql in generate_indexes(schema) {
                self.conn
                    .execute(&index_sql, [])
                    .store_context(|| format!("creating index for {}", schema.name))?;
            }
        }
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create or update the world described by `metadata`
    pub fn resolve_world(&mut self, metadata: &MapMetadata) -> Result<WorldHandle> {
        world::resolve_world(&mut self.conn, metadata)
    }

    pub fn find_world(&self, name: &str) -> Result<Option<WorldRecord>> {
        world::find_world(&self.conn, name)
    }

    pub fn list_worlds(&self) -> Result<Vec<WorldRecord>> {
        world::list_worlds(&self.conn)
    }

    /// Upsert every feature of one export file inside a single transaction.
    ///
    /// Rows are keyed by (world, local id); a feature without an id aborts
    /// the file and nothing from it is committed. Returns the number of
    /// features written, updates included.
    pub fn ingest_collection(
        &mut self,
        kind: FeatureKind,
        source: &Path,
        collection: &FeatureCollection,
        world: &WorldHandle,
        default_srid: i64,
        ui: &mut impl Ui,
    ) -> Result<u64> {
        let schema = kind.schema();
        let srid = collection.declared_srid().unwrap_or(default_srid);
        let total = collection.features.len();
        let context = |index: usize| {
            move || format!("writing {} feature #{} from {:?}", kind, index, source)
        };

        info!(
            world = %world.name,
            %kind,
            file = %source.display(),
            features = total,
            srid,
            "ingesting features"
        );

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .store_context(|| format!("starting transaction for {:?}", source))?;
        let mut count: u64 = 0;

        {
            let sql = generate_upsert(schema);
            let mut stmt = tx
                .prepare_cached(&sql)
                .store_context(|| format!("preparing upsert for {}", schema.name))?;

            for (index, feature) in collection.features.iter().enumerate() {
                let row = parse_record(feature.properties(), schema).map_err(|_| {
                    ImportError::MissingLocalId {
                        world: world.name.clone(),
                        path: source.to_path_buf(),
                        index,
                    }
                })?;

                let geometry = feature
                    .geometry
                    .as_ref()
                    .filter(|g| !g.is_null())
                    .map(|g| match schema.geometry {
                        GeometryMode::Multi => promote_to_multi(g).to_string(),
                        GeometryMode::AsIs => g.to_string(),
                    });

                let bind = |stmt: &mut rusqlite::Statement| -> rusqlite::Result<()> {
                    stmt.raw_bind_parameter(1, Uuid::new_v4().to_string())?;
                    stmt.raw_bind_parameter(2, world.id.as_str())?;
                    stmt.raw_bind_parameter(3, row.local_id)?;
                    for (offset, col) in schema.columns.iter().enumerate() {
                        let value = row
                            .values
                            .get(col.name)
                            .cloned()
                            .unwrap_or(crate::parser::SqlValue::Null);
                        value.bind_to(4 + offset, stmt)?;
                    }
                    let geom_idx = 4 + schema.columns.len();
                    stmt.raw_bind_parameter(geom_idx, geometry.as_deref())?;
                    stmt.raw_bind_parameter(geom_idx + 1, srid)?;
                    Ok(())
                };

                bind(&mut *stmt).store_context(context(index))?;
                stmt.raw_execute().store_context(context(index))?;
                debug!(%kind, local_id = row.local_id, "upserted feature");

                count += 1;
                if (index + 1) % PROGRESS_INTERVAL == 0 {
                    ui.rows_written(kind, count, total as u64);
                }
            }
        }

        tx.commit()
            .store_context(|| format!("committing {:?}", source))?;
        ui.rows_written(kind, count, total as u64);

        Ok(count)
    }

    /// Number of rows of `kind` stored for a world
    pub fn count_rows(&self, kind: FeatureKind, world_id: &str) -> Result<u64> {
        let table = kind.schema().name;
        let count: i64 = self
            .conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {table} WHERE world_id = ?1"),
                [world_id],
                |row| row.get(0),
            )
            .store_context(|| format!("counting {table}"))?;
        Ok(count as u64)
    }

    /// Release the connection after letting SQLite refresh its statistics
    pub fn close(self) -> Result<()> {
        self.conn
            .execute_batch("PRAGMA optimize;")
            .store_context(|| "optimizing database".into())?;
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .store_context(|| "closing database".into())
    }
}
