//! JSON persistence helpers for ~/.hustle/ save files and explicit paths.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::error::GameError;

/// Get the ~/.hustle/ directory path, creating it if needed.
pub fn hustle_dir() -> Result<PathBuf, GameError> {
    let home_dir = dirs::home_dir().ok_or(GameError::NoHomeDir)?;
    let dir = home_dir.join(".hustle");
    fs::create_dir_all(&dir).map_err(|e| GameError::io(&dir, e))?;
    Ok(dir)
}

/// Get the full path for a save file in ~/.hustle/.
pub fn save_path(filename: &str) -> Result<PathBuf, GameError> {
    Ok(hustle_dir()?.join(filename))
}

/// Load a JSON file from ~/.hustle/, returning `T::default()` if missing or invalid.
pub fn load_json_or_default<T: Default + DeserializeOwned>(filename: &str) -> T {
    match save_path(filename).and_then(load_json_from) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(filename, error = %e, "Falling back to default");
            T::default()
        }
    }
}

/// Save a value as pretty-printed JSON to ~/.hustle/.
pub fn save_json<T: Serialize>(filename: &str, data: &T) -> Result<(), GameError> {
    save_json_to(save_path(filename)?, data)
}

/// Save a value as pretty-printed JSON at `path`, creating parent directories.
pub fn save_json_to<T: Serialize>(path: impl AsRef<Path>, data: &T) -> Result<(), GameError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| GameError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(data)?;
    fs::write(path, json).map_err(|e| GameError::io(path, e))?;
    tracing::debug!(path = %path.display(), "Saved");
    Ok(())
}

pub fn load_json_from<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, GameError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| GameError::io(path, e))?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("hustle-persistence-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_save_path_format() {
        let path = save_path("test.json").expect("save_path should succeed");
        assert!(path.to_string_lossy().ends_with(".hustle/test.json"));
    }

    #[test]
    fn test_load_missing_returns_default() {
        let val: Vec<String> = load_json_or_default("nonexistent_test_file_12345.json");
        assert!(val.is_empty());
    }

    #[test]
    fn test_path_round_trip_creates_parents() {
        let path = scratch("nested/dir/data.json");
        let data = vec!["hello".to_string(), "world".to_string()];
        save_json_to(&path, &data).expect("save should succeed");

        let loaded: Vec<String> = load_json_from(&path).expect("load should succeed");
        assert_eq!(loaded, data);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_errors_are_typed() {
        let missing = load_json_from::<Vec<u32>>(scratch("missing.json")).unwrap_err();
        assert!(matches!(missing, GameError::Io { .. }));

        let path = scratch("garbage.json");
        save_json_to(&path, &"not a list").expect("save");
        let bad = load_json_from::<Vec<u32>>(&path).unwrap_err();
        assert!(matches!(bad, GameError::Json(_)));
        fs::remove_file(&path).ok();
    }
}
