use crate::FragmenterError;
use std::collections::HashMap;

/// Prefix the engine puts in front of every parameter it forwards.
pub const PARAM_PREFIX: &str = "X-GP-";
/// Parameter naming the table or data source.
pub const DATA_DIR_PARAM: &str = "X-GP-DATA-DIR";

/// Request descriptor handed to the fragmenter by the engine.
///
/// Holds the raw parameter map (keys upper-cased) and, when a worker re-enters, the
/// metadata of the fragment it is reading.
#[derive(Debug, Clone, PartialEq)]
pub struct InputData {
    /// Parameters with upper-cased keys.
    params: HashMap<String, String>,
    /// Data source, taken from `X-GP-DATA-DIR`.
    data_source: String,
    /// Metadata of the fragment being read, if any.
    fragment_metadata: Option<Vec<u8>>,
}

impl InputData {
    /// Build a descriptor from the engine's parameters.
    ///
    /// # Arguments
    ///
    /// * `params` - Raw parameters. Keys are matched case-insensitively.
    pub fn new(params: HashMap<String, String>) -> Result<Self, FragmenterError> {
        let params: HashMap<String, String> = params
            .into_iter()
            .map(|(k, v)| (k.to_uppercase(), v))
            .collect();
        let data_source = params.get(DATA_DIR_PARAM).cloned().ok_or_else(|| {
            FragmenterError::UserDataError(format!(
                "Internal server error. Property \"{}\" has no value in current request",
                DATA_DIR_PARAM
            ))
        })?;
        Ok(Self {
            params,
            data_source,
            fragment_metadata: None,
        })
    }

    /// Attach the metadata of the fragment a worker is reading.
    pub fn with_fragment_metadata(mut self, metadata: Vec<u8>) -> Self {
        self.fragment_metadata = Some(metadata);
        self
    }

    /// Looks up a user property such as `PARTITION_BY`.
    ///
    /// # Arguments
    ///
    /// * `name` - Property name without the `X-GP-` prefix, any case.
    pub fn user_property(&self, name: &str) -> Option<&str> {
        let key = format!("{}{}", PARAM_PREFIX, name.to_uppercase());
        self.params.get(&key).map(|v| v.as_str())
    }

    /// The table or data source the request is about.
    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    pub fn fragment_metadata(&self) -> Option<&[u8]> {
        self.fragment_metadata.as_deref()
    }
}
