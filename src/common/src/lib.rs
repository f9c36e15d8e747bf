#[macro_use]
extern crate serde;

use std::error::Error;
use std::fmt;
use std::io;
pub mod byte_util;
pub mod fragment;
pub mod input_data;
pub mod testutil;

pub use fragment::{Fragment, FragmentsStats};
pub use input_data::InputData;

/// Custom error type.
#[derive(Debug, Clone, PartialEq)]
pub enum FragmenterError {
    /// Malformed or inconsistent partition properties. Reported to the client verbatim.
    UserDataError(String),
    /// Fragment metadata with an unexpected length for the partition type.
    MalformedMetadata(String),
    /// The local host address could not be resolved.
    HostResolutionError(String),
    /// Operations the JDBC fragmenter does not provide.
    Unsupported(String),
    /// IO Errors.
    IOError(String),
    /// Fragment (de)serialization errors.
    SerializationError(String),
}

impl FragmenterError {
    /// HTTP status a hosting request layer should answer with.
    ///
    /// Only user input problems are client errors; everything else is a server fault.
    pub fn http_status(&self) -> u16 {
        match self {
            FragmenterError::UserDataError(_) => 400,
            _ => 500,
        }
    }
}

impl fmt::Display for FragmenterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                FragmenterError::UserDataError(s) => s.to_string(),
                FragmenterError::MalformedMetadata(s) => format!("Malformed Metadata: {}", s),
                FragmenterError::HostResolutionError(s) => {
                    format!("Host Resolution Error: {}", s)
                }
                FragmenterError::Unsupported(s) => s.to_string(),
                FragmenterError::IOError(s) => s.to_string(),
                FragmenterError::SerializationError(s) => format!("Serialization Error: {}", s),
            }
        )
    }
}

// Implement std::convert::From for FragmenterError; from io::Error
impl From<io::Error> for FragmenterError {
    fn from(error: io::Error) -> Self {
        FragmenterError::IOError(error.to_string())
    }
}

impl From<serde_cbor::Error> for FragmenterError {
    fn from(error: serde_cbor::Error) -> Self {
        FragmenterError::SerializationError(error.to_string())
    }
}

impl Error for FragmenterError {}
