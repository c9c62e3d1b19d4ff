//! Storage layer for remote files
//!
//! The [`StorageGateway`] trait is the seam between the interaction
//! controller and the cloud account; [`GoogleDriveGateway`] is the
//! production implementation.

mod google_drive;

pub use google_drive::{sanitize_file_name, GoogleDriveGateway};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum GatewayError {
    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// Credentials rejected or token exchange failed
    #[error("Authentication error: {0}")]
    Auth(String),
    /// The remote id does not resolve to a file
    #[error("File not found: {0}")]
    NotFound(String),
    /// Non-success response from the storage API
    #[error("Storage API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or error description
        message: String,
    },
    /// Transfer ended before all announced bytes arrived
    #[error("Transfer truncated: expected {expected} bytes, received {received}")]
    Truncated {
        /// Bytes announced by the server
        expected: u64,
        /// Bytes actually written
        received: u64,
    },
    /// Local filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration error (missing credentials, etc.)
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A remote file as listed by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Opaque remote identifier
    pub id: String,
    /// Display name
    pub name: String,
}

impl FileEntry {
    /// Create a new entry
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Interface for storage providers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// List all files of the account, empty when there are none
    async fn list_files(&self) -> Result<Vec<FileEntry>, GatewayError>;
    /// Download a file into `destination_dir` and return the local path
    async fn download_file(
        &self,
        file_id: &str,
        destination_dir: &Path,
    ) -> Result<PathBuf, GatewayError>;
}
