//! Table definitions for the five feature kinds of an AFMG export

use std::fmt;

use super::types::*;

pub static CELLS: TableSchema = TableSchema {
    name: "cells",
    local_id: "cell_id",
    columns: &[
        Column::new("biome", ColumnType::Integer),
        Column::optional("type", ColumnType::Text),
        Column::new("population", ColumnType::Integer),
        Column::new("state", ColumnType::Integer),
        Column::new("culture", ColumnType::Integer),
        Column::new("religion", ColumnType::Integer),
        Column::new("height", ColumnType::Integer),
    ],
    geometry: GeometryMode::Multi,
};

pub static BURGS: TableSchema = TableSchema {
    name: "burgs",
    local_id: "burg_id",
    columns: &[
        Column::optional("name", ColumnType::Text),
        Column::optional("state", ColumnType::Text),
        Column::optional("statefull", ColumnType::Text).json("stateFull"),
        Column::optional("province", ColumnType::Text),
        Column::optional("provincefull", ColumnType::Text).json("provinceFull"),
        Column::optional("culture", ColumnType::Text),
        Column::optional("religion", ColumnType::Text),
        Column::new("population", ColumnType::Integer),
        Column::new("populationraw", ColumnType::Real).json("populationRaw"),
        Column::new("elevation", ColumnType::Integer),
        Column::optional("temperature", ColumnType::Text),
        Column::optional("temperaturelikeness", ColumnType::Text).json("temperatureLikeness"),
        Column::new("capital", ColumnType::Boolean),
        Column::new("port", ColumnType::Boolean),
        Column::new("citadel", ColumnType::Boolean),
        Column::new("walls", ColumnType::Boolean),
        Column::new("plaza", ColumnType::Boolean),
        Column::new("temple", ColumnType::Boolean),
        Column::new("shanty", ColumnType::Boolean),
        Column::new("xworld", ColumnType::Integer).json("xWorld"),
        Column::new("yworld", ColumnType::Integer).json("yWorld"),
        Column::new("xpixel", ColumnType::Real).json("xPixel"),
        Column::new("ypixel", ColumnType::Real).json("yPixel"),
        Column::new("cell", ColumnType::Integer),
        Column::optional("emblem", ColumnType::Json),
    ],
    geometry: GeometryMode::AsIs,
};

pub static ROUTES: TableSchema = TableSchema {
    name: "routes",
    local_id: "route_id",
    columns: &[
        Column::optional("name", ColumnType::Text),
        Column::optional("type", ColumnType::Text),
        Column::new("feature", ColumnType::Integer),
    ],
    geometry: GeometryMode::Multi,
};

pub static RIVERS: TableSchema = TableSchema {
    name: "rivers",
    local_id: "river_id",
    columns: &[
        Column::optional("name", ColumnType::Text),
        Column::optional("type", ColumnType::Text),
        Column::optional("discharge", ColumnType::Real),
        Column::optional("length", ColumnType::Real),
        Column::optional("width", ColumnType::Real),
    ],
    geometry: GeometryMode::Multi,
};

pub static MARKERS: TableSchema = TableSchema {
    name: "markers",
    local_id: "marker_id",
    columns: &[
        Column::optional("type", ColumnType::Text),
        Column::optional("icon", ColumnType::Text),
        Column::optional("x_px", ColumnType::Real),
        Column::optional("y_px", ColumnType::Real),
        Column::optional("note", ColumnType::Text),
    ],
    geometry: GeometryMode::AsIs,
};

/// A feature category exported per world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureKind {
    Cells,
    Burgs,
    Routes,
    Rivers,
    Markers,
}

impl FeatureKind {
    /// Ingestion order
    pub const ALL: [FeatureKind; 5] = [
        FeatureKind::Cells,
        FeatureKind::Burgs,
        FeatureKind::Routes,
        FeatureKind::Rivers,
        FeatureKind::Markers,
    ];

    /// Name used in export file names (`{world}_{name}.geojson`)
    pub fn name(self) -> &'static str {
        match self {
            FeatureKind::Cells => "cells",
            FeatureKind::Burgs => "burgs",
            FeatureKind::Routes => "routes",
            FeatureKind::Rivers => "rivers",
            FeatureKind::Markers => "markers",
        }
    }

    pub fn schema(self) -> &'static TableSchema {
        match self {
            FeatureKind::Cells => &CELLS,
            FeatureKind::Burgs => &BURGS,
            FeatureKind::Routes => &ROUTES,
            FeatureKind::Rivers => &RIVERS,
            FeatureKind::Markers => &MARKERS,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "cells" => Some(FeatureKind::Cells),
            "burgs" | "settlements" => Some(FeatureKind::Burgs),
            "routes" => Some(FeatureKind::Routes),
            "rivers" => Some(FeatureKind::Rivers),
            "markers" => Some(FeatureKind::Markers),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in FeatureKind::ALL {
            assert_eq!(FeatureKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(FeatureKind::from_name("Settlements"), Some(FeatureKind::Burgs));
        assert_eq!(FeatureKind::from_name("roads"), None);
    }

    #[test]
    fn test_column_names_put_keys_first() {
        let names = CELLS.column_names();
        assert_eq!(&names[..3], &["id", "world_id", "cell_id"]);
        assert_eq!(names.last(), Some(&"geom_srid"));
    }
}
