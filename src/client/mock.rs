//! Mock Salesforce client for testing
//!
//! Serves canned query rows and file bodies without touching the network.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::Mutex;

use super::{ByteStream, FileRecord, SalesforceApi};
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// # Example
/// ```ignore
/// let mock = MockSalesforceClient::new()
///     .with_file(record("X1", "TestFile1", "pdf"), b"%PDF-1.4")
///     .with_failing_download("X2");
/// ```
#[derive(Default)]
pub struct MockSalesforceClient {
    /// Records returned from query_files, in order
    records: Vec<FileRecord>,
    /// File bodies keyed by record ID
    contents: HashMap<String, Vec<u8>>,
    /// IDs whose download fails with a server error
    failing: HashSet<String>,
    /// IDs whose body stream breaks after the first chunk
    truncated: HashSet<String>,
    /// Error to return from query_files (consumed on first use)
    query_error: Arc<Mutex<Option<ApiError>>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub query_files: usize,
    pub open_version_data: usize,
    /// IDs requested from open_version_data, in call order
    pub downloaded_ids: Vec<String>,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.query_files + self.open_version_data
    }
}

impl MockSalesforceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record and the body served for it
    pub fn with_file(mut self, record: FileRecord, body: &[u8]) -> Self {
        self.contents.insert(record.id.clone(), body.to_vec());
        self.records.push(record);
        self
    }

    /// Make the download of `id` fail with a server error
    pub fn with_failing_download(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    /// Make the body stream of `id` fail after its first chunk
    pub fn with_truncated_download(mut self, id: &str) -> Self {
        self.truncated.insert(id.to_string());
        self
    }

    /// Make query_files fail
    pub fn with_query_error(self, error: ApiError) -> Self {
        *self.query_error.try_lock().expect("fresh mock") = Some(error);
        self
    }

    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }
}

/// Build a minimal record for tests
pub fn record(id: &str, title: &str, extension: &str) -> FileRecord {
    FileRecord {
        id: id.to_string(),
        title: title.to_string(),
        file_extension: extension.to_string(),
        content_document_id: None,
        checksum: None,
        version_data: None,
        first_published_location_id: None,
        created_date: None,
    }
}

#[async_trait]
impl SalesforceApi for MockSalesforceClient {
    async fn query_files(&self, _soql: &str) -> Result<Vec<FileRecord>> {
        self.call_count.lock().await.query_files += 1;

        if let Some(err) = self.query_error.lock().await.take() {
            return Err(err.into());
        }
        Ok(self.records.clone())
    }

    async fn open_version_data(&self, id: &str) -> std::result::Result<ByteStream, ApiError> {
        {
            let mut counts = self.call_count.lock().await;
            counts.open_version_data += 1;
            counts.downloaded_ids.push(id.to_string());
        }

        if self.failing.contains(id) {
            return Err(ApiError::ServerError(format!("HTTP 500 for {}", id)));
        }

        let body = self
            .contents
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("ContentVersion {}", id)))?;

        let mut chunks: Vec<std::result::Result<Bytes, ApiError>> = body
            .chunks(4)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        if self.truncated.contains(id) {
            chunks.truncate(1);
            chunks.push(Err(ApiError::Network("connection reset".to_string())));
        }

        Ok(futures::stream::iter(chunks).boxed())
    }
}
