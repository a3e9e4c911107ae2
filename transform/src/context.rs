//! Pass context: per-pass configuration keyed by pass name.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;
use snafu::ResultExt;

use crate::error::{ConfigSnafu, PassError};

/// Configuration handed to every pass of a pipeline run.
///
/// Entries are JSON values keyed by pass (`"tir.UnrollLoop"`); each pass
/// decodes its own entry into a typed configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassContext {
    config: BTreeMap<String, Value>,
}

impl PassContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    /// Parse a JSON object mapping keys to configuration values.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self { config: serde_json::from_str(json)? })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    /// Decode the entry under `key`, or `None` if there is none.
    pub fn config<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PassError> {
        self.config
            .get(key)
            .map(|value| T::deserialize(value).context(ConfigSnafu { key }))
            .transpose()
    }
}
