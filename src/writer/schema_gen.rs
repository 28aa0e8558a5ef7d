use crate::schema::TableSchema;

/// CREATE TABLE for the world registry
pub fn generate_worlds_table() -> String {
    "CREATE TABLE IF NOT EXISTS worlds (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL UNIQUE,
    description TEXT,
    bounds TEXT NOT NULL,
    north REAL NOT NULL,
    south REAL NOT NULL,
    east REAL NOT NULL,
    west REAL NOT NULL,
    width_pixels INTEGER NOT NULL,
    height_pixels INTEGER NOT NULL,
    meters_per_pixel REAL NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)"
    .to_string()
}

/// Generate CREATE TABLE SQL for a feature table
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n", schema.name);
    let mut columns = vec![
        "    id TEXT PRIMARY KEY NOT NULL".to_string(),
        "    world_id TEXT NOT NULL".to_string(),
        format!("    {} INTEGER NOT NULL", schema.local_id),
    ];

    for col in schema.columns {
        let null_constraint = if !col.nullable() { " NOT NULL" } else { "" };
        columns.push(format!(
            "    \"{}\" {}{}",
            col.name,
            col.col_type.sql_type(),
            null_constraint
        ));
    }

    columns.push("    geom TEXT".to_string());
    columns.push("    geom_srid INTEGER NOT NULL".to_string());
    columns.push("    FOREIGN KEY (world_id) REFERENCES worlds(id)".to_string());

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate the unique (world, local id) index that upserts conflict on
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    vec![format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_{}_world_{} ON {}(world_id, {})",
        schema.name, schema.local_id, schema.name, schema.local_id
    )]
}

/// INSERT ... ON CONFLICT DO UPDATE overwriting every non-key column
pub fn generate_upsert(schema: &TableSchema) -> String {
    let columns: Vec<String> = schema
        .column_names()
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect();
    let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
    let updates: Vec<String> = columns[3..]
        .iter()
        .map(|c| format!("{c} = excluded.{c}"))
        .collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT(world_id, {}) DO UPDATE SET {}",
        schema.name,
        columns.join(", "),
        placeholders.join(", "),
        schema.local_id,
        updates.join(", ")
    )
}
