use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

const DATABASE_FILE: &str = "worlds.sqlite";

/// Where the store database lives
pub struct DatabaseLocation {
    path: PathBuf,
}

impl DatabaseLocation {
    /// Use `custom` when given, else `<data dir>/afmg-world-import/worlds.sqlite`
    pub fn new(custom: Option<PathBuf>) -> Result<Self> {
        let path = match custom {
            Some(path) => path,
            None => {
                let proj_dirs = ProjectDirs::from("", "", "afmg-world-import")
                    .context("Could not determine data directory")?;
                proj_dirs.data_dir().join(DATABASE_FILE)
            }
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory {:?}", parent))?;
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_location_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("store.sqlite");
        let location = DatabaseLocation::new(Some(db.clone())).unwrap();
        assert_eq!(location.path(), db.as_path());
        assert!(db.parent().unwrap().is_dir());
    }
}
