//! Salesforce API client

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::{ApiError, Result};

#[cfg(test)]
pub mod mock;
pub mod models;
pub mod salesforce;
pub mod session;

#[cfg(test)]
pub use mock::MockSalesforceClient;
pub use models::FileRecord;
pub use salesforce::SalesforceClient;
pub use session::Session;

/// Body of a downloaded file, delivered chunk by chunk
pub type ByteStream = BoxStream<'static, std::result::Result<Bytes, ApiError>>;

/// Operations the exporter needs from an authenticated Salesforce session
#[async_trait]
pub trait SalesforceApi: Send + Sync {
    /// Run a SOQL query against `ContentVersion` and return the typed rows.
    ///
    /// Only the first page of results is returned.
    async fn query_files(&self, soql: &str) -> Result<Vec<FileRecord>>;

    /// Open the raw `VersionData` body of one content version.
    ///
    /// The status line has already been checked when this returns `Ok`; errors
    /// while reading the body surface as items of the stream.
    async fn open_version_data(&self, id: &str) -> std::result::Result<ByteStream, ApiError>;
}
