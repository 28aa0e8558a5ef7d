/// Column data type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    /// Stored as 0/1
    Boolean,
    /// JSON blob stored as text
    Json,
}

impl ColumnType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer | ColumnType::Boolean => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text | ColumnType::Json => "TEXT",
        }
    }
}

/// What a column receives when the property is absent or cannot be coerced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fallback {
    /// 0, 0.0 or false for numeric and boolean columns; NULL for text and JSON
    ZeroValue,
    Null,
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub fallback: Fallback,
    /// Override property name (default: the column name)
    pub json_field: Option<&'static str>,
}

impl Column {
    /// Column that falls back to the zero value of its type
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            fallback: Fallback::ZeroValue,
            json_field: None,
        }
    }

    /// Column that falls back to NULL
    pub const fn optional(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            fallback: Fallback::Null,
            json_field: None,
        }
    }

    /// Set the property name (for when it differs from the column name)
    pub const fn json(self, field: &'static str) -> Self {
        Self {
            json_field: Some(field),
            ..self
        }
    }

    pub fn property(&self) -> &'static str {
        self.json_field.unwrap_or(self.name)
    }

    /// Whether the stored value can be NULL
    pub fn nullable(&self) -> bool {
        match self.fallback {
            Fallback::Null => true,
            Fallback::ZeroValue => matches!(self.col_type, ColumnType::Text | ColumnType::Json),
        }
    }
}

/// How feature geometry is normalized before storage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryMode {
    AsIs,
    /// Promote single geometries to their Multi* form
    Multi,
}

/// Feature table definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    /// Column holding the exporter's feature id, read from the `id` property
    pub local_id: &'static str,
    pub columns: &'static [Column],
    pub geometry: GeometryMode,
}

impl TableSchema {
    /// All columns in insertion order: keys, attributes, then the geometry pair
    pub fn column_names(&self) -> Vec<&'static str> {
        let mut names = vec!["id", "world_id", self.local_id];
        names.extend(self.columns.iter().map(|c| c.name));
        names.push("geom");
        names.push("geom_srid");
        names
    }
}
