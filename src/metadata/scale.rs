use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::Result;
use crate::parser::read_json;

/// Only the metadata block of an export; features are skipped
#[derive(Debug, Deserialize)]
struct MetadataEnvelope {
    #[serde(default)]
    metadata: Option<Value>,
}

/// Scan every file in order and return the first valid length-per-pixel scale.
///
/// All files are parsed even after a scale is found, so an unreadable or
/// unparseable export fails the run before anything is written. Invalid
/// scale values are skipped with a warning.
pub fn extract_scale(files: &[PathBuf]) -> Result<Option<f64>> {
    let mut found = None;

    for path in files {
        let envelope: MetadataEnvelope = read_json(path)?;
        if found.is_some() {
            continue;
        }

        let Some(raw) = envelope
            .metadata
            .as_ref()
            .and_then(|m| m.get("scale"))
            .and_then(|s| {
                ["length_per_pixel", "meters_per_pixel"]
                    .into_iter()
                    .find_map(|key| s.get(key).filter(|v| !v.is_null()))
            })
        else {
            debug!(file = %path.display(), "no scale in metadata block");
            continue;
        };

        match parse_scale(raw) {
            Some(scale) => {
                debug!(file = %path.display(), scale, "found scale");
                found = Some(scale);
            }
            None => warn!(file = %path.display(), value = %raw, "ignoring invalid scale"),
        }
    }
    Ok(found)
}

fn parse_scale(value: &Value) -> Option<f64> {
    let scale = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (scale.is_finite() && scale > 0.0).then_some(scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImportError;
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_parse_scale() {
        assert_eq!(parse_scale(&json!(2.5)), Some(2.5));
        assert_eq!(parse_scale(&json!("0.75")), Some(0.75));
        assert_eq!(parse_scale(&json!("wide")), None);
        assert_eq!(parse_scale(&json!(0)), None);
        assert_eq!(parse_scale(&json!(-1.0)), None);
        assert_eq!(parse_scale(&json!(null)), None);
    }

    #[test]
    fn test_first_valid_scale_wins() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.geojson");
        let b = dir.path().join("b.geojson");
        let c = dir.path().join("c.geojson");
        fs::write(&a, r#"{"features":[],"metadata":{"scale":{"length_per_pixel":"n/a"}}}"#).unwrap();
        fs::write(&b, r#"{"features":[],"metadata":{"scale":{"meters_per_pixel":3}}}"#).unwrap();
        fs::write(&c, r#"{"features":[],"metadata":{"scale":{"length_per_pixel":9}}}"#).unwrap();

        assert_eq!(extract_scale(&[a.clone(), b, c]).unwrap(), Some(3.0));
        assert_eq!(extract_scale(&[a]).unwrap(), None);
    }

    #[test]
    fn test_null_scale_defers_to_alias() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.geojson");
        fs::write(
            &a,
            r#"{"metadata":{"scale":{"length_per_pixel":null,"meters_per_pixel":"1.5"}}}"#,
        )
        .unwrap();
        assert_eq!(extract_scale(&[a]).unwrap(), Some(1.5));
    }

    #[test]
    fn test_unparseable_file_is_fatal_even_after_scale_found() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.geojson");
        let bad = dir.path().join("bad.geojson");
        fs::write(&good, r#"{"metadata":{"scale":{"length_per_pixel":1}}}"#).unwrap();
        fs::write(&bad, "{not json").unwrap();
        assert!(matches!(
            extract_scale(&[good, bad]),
            Err(ImportError::InputParse { .. })
        ));
    }
}
