use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Configuration shared by model building and document mapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Identity field read as the document key. Never written into a body.
    pub key_field: String,
    /// Shadow field that holds a raw stored document on the entry side.
    /// Never written into a body.
    pub raw_document_field: String,
    /// Collection used by document roots without an explicit collection.
    /// When unset, the type's short name is used.
    pub default_collection: Option<String>,
    /// Deepest allowed chain of embedded documents below a root.
    pub max_nesting_depth: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            key_field: "id".into(),
            raw_document_field: "__jObject".into(),
            default_collection: None,
            max_nesting_depth: 32,
        }
    }
}

impl MapperConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> ModelResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ModelError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ModelResult<String> {
        toml::to_string(self).map_err(|e| ModelError::InvalidConfig(e.to_string()))
    }

    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> ModelResult<()> {
        if self.key_field.is_empty() {
            return Err(ModelError::InvalidConfig("key_field must not be empty".into()));
        }
        if self.key_field == self.raw_document_field {
            return Err(ModelError::InvalidConfig(
                "key_field and raw_document_field must differ".into(),
            ));
        }
        if self.max_nesting_depth == 0 {
            return Err(ModelError::InvalidConfig(
                "max_nesting_depth must be at least 1".into(),
            ));
        }
        if matches!(&self.default_collection, Some(name) if name.is_empty()) {
            return Err(ModelError::InvalidConfig(
                "default_collection must not be empty".into(),
            ));
        }
        Ok(())
    }
}
