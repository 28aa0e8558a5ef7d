use once_cell::sync::Lazy;
use regex::bytes::{Captures, Regex};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

use crate::error::{ImportError, Result};

/// A GeoJSON feature collection as written by the map exporter
#[derive(Debug, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default)]
    pub collection_type: Option<String>,
    #[serde(default)]
    pub features: Vec<Feature>,
    /// Exporter metadata block (`{scale: {length_per_pixel}}`)
    #[serde(default)]
    pub metadata: Option<Value>,
    /// Legacy GeoJSON `crs` member
    #[serde(default)]
    pub crs: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Option<Value>,
    #[serde(default)]
    pub geometry: Option<Value>,
}

impl Feature {
    /// Property bag of the feature; anything other than an object counts as empty
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.properties.as_ref().and_then(Value::as_object)
    }
}

impl FeatureCollection {
    /// SRID named by the `crs` member, if any
    pub fn declared_srid(&self) -> Option<i64> {
        let name = self
            .crs
            .as_ref()?
            .get("properties")?
            .get("name")?
            .as_str()?;
        srid_from_crs_name(name)
    }
}

/// Read and parse a feature collection file
pub fn read_feature_collection(path: &Path) -> Result<FeatureCollection> {
    read_json(path)
}

/// Escaped backslash, surrogate pair, or a lone surrogate escape. Escaped
/// backslashes are matched first so `\\ud800` is left as literal text.
static SURROGATE_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\\\\|\\u[dD][89abAB][0-9a-fA-F]{2}\\u[dD][c-fC-F][0-9a-fA-F]{2}|\\u[dD][89a-fA-F][0-9a-fA-F]{2}",
    )
    .expect("valid regex")
});

/// Drop unpaired UTF-16 surrogate escapes, which serde_json refuses but the
/// map exporter writes when it cuts an emoji in half.
pub fn strip_lone_surrogates(bytes: &[u8]) -> Cow<'_, [u8]> {
    SURROGATE_ESCAPE.replace_all(bytes, |caps: &Captures| match caps[0].len() {
        6 => Vec::new(),
        _ => caps[0].to_vec(),
    })
}

/// Read a JSON document, reporting failures against `path`
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).map_err(|source| ImportError::InputRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_slice(&strip_lone_surrogates(&bytes)).map_err(|source| {
        ImportError::InputParse {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Parse `EPSG:4326`, `urn:ogc:def:crs:EPSG::3857` or `urn:ogc:def:crs:OGC:1.3:CRS84`
fn srid_from_crs_name(name: &str) -> Option<i64> {
    if name.ends_with("CRS84") {
        return Some(4326);
    }
    if !name.to_ascii_uppercase().contains("EPSG") {
        return None;
    }
    name.rsplit(':').next()?.trim().parse().ok()
}

/// Promote Point/LineString/Polygon to the corresponding Multi* geometry
pub fn promote_to_multi(geometry: &Value) -> Value {
    let multi_type = match geometry.get("type").and_then(Value::as_str) {
        Some("Point") => "MultiPoint",
        Some("LineString") => "MultiLineString",
        Some("Polygon") => "MultiPolygon",
        _ => return geometry.clone(),
    };

    match geometry.get("coordinates") {
        Some(coordinates) => json!({
            "type": multi_type,
            "coordinates": [coordinates],
        }),
        None => geometry.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promote_polygon() {
        let polygon = json!({"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]});
        let multi = promote_to_multi(&polygon);
        assert_eq!(multi["type"], "MultiPolygon");
        assert_eq!(multi["coordinates"][0], polygon["coordinates"]);
    }

    #[test]
    fn test_promote_leaves_multi_alone() {
        let line = json!({"type": "MultiLineString", "coordinates": [[[0, 0], [1, 1]]]});
        assert_eq!(promote_to_multi(&line), line);
    }

    #[test]
    fn test_srid_from_crs_name() {
        assert_eq!(srid_from_crs_name("EPSG:4326"), Some(4326));
        assert_eq!(srid_from_crs_name("urn:ogc:def:crs:EPSG::3857"), Some(3857));
        assert_eq!(srid_from_crs_name("urn:ogc:def:crs:OGC:1.3:CRS84"), Some(4326));
        assert_eq!(srid_from_crs_name("local"), None);
    }

    #[test]
    fn test_lone_surrogates_are_dropped() {
        let raw = br#"{"name":"Ald\ud83cford","pair":"\ud83c\udff0","path":"C:\\ud800"}"#;
        let value: Value = serde_json::from_slice(&strip_lone_surrogates(raw)).unwrap();
        assert_eq!(value["name"], "Aldford");
        assert_eq!(value["pair"], "\u{1F3F0}");
        assert_eq!(value["path"], "C:\\ud800");
    }

    #[test]
    fn test_trailing_low_surrogate_is_dropped() {
        let raw = br#"["a\udc00b"]"#;
        let value: Value = serde_json::from_slice(&strip_lone_surrogates(raw)).unwrap();
        assert_eq!(value[0], "ab");
    }

    #[test]
    fn test_non_object_properties_are_empty() {
        let collection: FeatureCollection = serde_json::from_str(
            r#"{"type":"FeatureCollection","features":[{"properties":null},{"properties":[1]}]}"#,
        )
        .unwrap();
        assert!(collection.features.iter().all(|f| f.properties().is_none()));
    }
}
