use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Naming conventions the planner assumes about the encoded tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlannerConfig {
    /// Column holding the logical id of each resource row.
    pub id_column: String,
    /// Field within a Reference struct that holds the `Type/id` string.
    pub reference_field: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            id_column: "id".to_string(),
            reference_field: "reference".to_string(),
        }
    }
}

impl PlannerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let config = PlannerConfig::from_json(r#"{ "idColumn": "resource_id" }"#).unwrap();
        assert_eq!(config.id_column, "resource_id");
        assert_eq!(config.reference_field, "reference");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "referenceField": "ref", "outerLateralViews": false }}"#).unwrap();

        let config = PlannerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.reference_field, "ref");
        assert_eq!(config.id_column, "id");
    }

    #[test]
    fn test_load_from_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        match PlannerConfig::load_from_file(&path) {
            Err(SchemaError::Io { path: reported, .. }) => assert!(reported.ends_with("absent.json")),
            other => panic!("expected io error, got {:?}", other),
        }
    }
}
