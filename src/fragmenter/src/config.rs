use crate::hosts::{FixedHost, HostResolver, LocalHost};
use common::FragmenterError;
use std::fs;

/// Fragmenter settings, typically read from a JSON file.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct FragmenterConfig {
    /// Address reported as replica. Probed from the local host when unset.
    pub host_address: Option<String>,
    /// Upper bound on the fragments of one request.
    pub max_fragments: Option<usize>,
}

impl FragmenterConfig {
    /// Reads a config from a JSON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the JSON file.
    pub fn from_json_file(path: &str) -> Result<Self, FragmenterError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, FragmenterError> {
        serde_json::from_str(contents).map_err(|e| {
            FragmenterError::UserDataError(format!("Invalid fragmenter config: {}", e))
        })
    }

    /// Resolver matching this config.
    pub fn host_resolver(&self) -> Box<dyn HostResolver> {
        match &self.host_address {
            Some(address) => Box::new(FixedHost::new(address)),
            None => Box::new(LocalHost::new()),
        }
    }
}
