use crate::schema::FeatureKind;
use anyhow::{anyhow, bail, Result};

/// Resolves which feature kinds to import based on include/exclude filters
pub fn resolve_kinds(
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
) -> Result<Vec<FeatureKind>> {
    match (include, exclude) {
        (Some(_), Some(_)) => {
            bail!("Cannot use both --include and --exclude at the same time");
        }
        (Some(include_list), None) => {
            let wanted = parse_kinds(&include_list)?;
            Ok(FeatureKind::ALL
                .into_iter()
                .filter(|k| wanted.contains(k))
                .collect())
        }
        (None, Some(exclude_list)) => {
            let unwanted = parse_kinds(&exclude_list)?;
            let kinds: Vec<_> = FeatureKind::ALL
                .into_iter()
                .filter(|k| !unwanted.contains(k))
                .collect();
            if kinds.is_empty() {
                bail!("Every feature kind is excluded");
            }
            Ok(kinds)
        }
        (None, None) => Ok(FeatureKind::ALL.to_vec()),
    }
}

fn parse_kinds(names: &[String]) -> Result<Vec<FeatureKind>> {
    names
        .iter()
        .map(|name| {
            FeatureKind::from_name(name).ok_or_else(|| {
                anyhow!(
                    "Unknown feature kind: {} (expected one of cells, burgs, routes, rivers, markers)",
                    name
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Option<Vec<String>> {
        Some(list.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_default_is_all_kinds() {
        assert_eq!(resolve_kinds(None, None).unwrap(), FeatureKind::ALL.to_vec());
    }

    #[test]
    fn test_include_keeps_ingestion_order() {
        let kinds = resolve_kinds(names(&["markers", "settlements"]), None).unwrap();
        assert_eq!(kinds, vec![FeatureKind::Burgs, FeatureKind::Markers]);
    }

    #[test]
    fn test_exclude() {
        let kinds = resolve_kinds(None, names(&["cells", "rivers"])).unwrap();
        assert_eq!(
            kinds,
            vec![FeatureKind::Burgs, FeatureKind::Routes, FeatureKind::Markers]
        );
    }

    #[test]
    fn test_rejects_unknown_and_conflicting_filters() {
        assert!(resolve_kinds(names(&["roads"]), None).is_err());
        assert!(resolve_kinds(names(&["cells"]), names(&["burgs"])).is_err());
        assert!(resolve_kinds(None, names(&["cells", "burgs", "routes", "rivers", "markers"])).is_err());
    }
}
