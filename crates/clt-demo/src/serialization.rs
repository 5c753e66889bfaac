use dice::Distribution;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ------------------------------------------------------------------
// Serialization structures
// ------------------------------------------------------------------

/// What a saved file holds: the six face weights and the dice count.
/// The weights are checked to sum to 100 while parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableState {
    pub faces: Distribution,
    pub dice: u32,
}

// ------------------------------------------------------------------
// File I/O operations
// ------------------------------------------------------------------

pub fn save_to_file(
    state: &SerializableState,
    path: &Path,
) -> Result<(), String> {
    let json = serde_json::to_string_pretty(&state)
        .map_err(|e| format!("Failed to serialize state: {}", e))?;

    std::fs::write(path, json)
        .map_err(|e| format!("Failed to write file: {}", e))?;

    Ok(())
}

pub fn load_from_file(path: &Path) -> Result<SerializableState, String> {
    let json_str = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read file: {}", e))?;

    let state: SerializableState = serde_json::from_str(&json_str)
        .map_err(|e| format!("Failed to parse JSON: {}", e))?;

    if state.dice < 1 {
        return Err(format!(
            "Invalid dice count {}: at least one die is needed",
            state.dice
        ));
    }

    Ok(state)
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn write_json(dir: &tempfile::TempDir, json: &str) -> std::path::PathBuf {
        let path = dir.path().join("state.json");
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let state = SerializableState {
            faces: dice::presets::VALLEY,
            dice: 12,
        };

        save_to_file(&state, &path).unwrap();
        assert_eq!(load_from_file(&path).unwrap(), state);

        let json = std::fs::read_to_string(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(raw["faces"], serde_json::json!([40, 8, 2, 3, 9, 38]));
        assert_eq!(raw["dice"], 12);
    }

    #[test]
    fn test_load_rejects_bad_sum() {
        let dir = tempfile::tempdir().unwrap();
        let path =
            write_json(&dir, r#"{ "faces": [10, 10, 10, 10, 10, 10], "dice": 2 }"#);
        let err = load_from_file(&path).unwrap_err();
        assert!(err.contains("sums to 60"), "{err}");
    }

    #[test]
    fn test_load_rejects_zero_dice() {
        let dir = tempfile::tempdir().unwrap();
        let path =
            write_json(&dir, r#"{ "faces": [50, 0, 0, 0, 0, 50], "dice": 0 }"#);
        assert!(load_from_file(&path).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.starts_with("Failed to read file"));
    }
}
