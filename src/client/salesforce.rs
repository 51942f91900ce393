//! Salesforce REST client implementation

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::Deserialize;

use super::models::{QueryResponse, parse_records};
use super::{ByteStream, FileRecord, SalesforceApi, Session};
use crate::error::{ApiError, Result};

/// Connection establishment limit, independent of the read timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client shared by login, query and downloads.
///
/// `read_timeout` bounds the gap between reads, not the whole transfer, so a
/// large file keeps downloading as long as bytes keep arriving.
pub fn build_http_client(read_timeout: Duration) -> Result<HttpClient> {
    let http = HttpClient::builder()
        .user_agent(concat!("sfexport/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(read_timeout)
        .build()
        .map_err(|e| ApiError::Network(e.to_string()))?;
    Ok(http)
}

/// Salesforce REST client bound to one session
pub struct SalesforceClient {
    http: HttpClient,
    session: Session,
}

/// One entry of the error array the REST API returns
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestError {
    message: String,
    #[serde(default)]
    error_code: Option<String>,
}

impl SalesforceClient {
    pub fn new(http: HttpClient, session: Session) -> Self {
        Self { http, session }
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> std::result::Result<Response, ApiError> {
        let url = self.session.url(path)?;
        log::debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .query(query)
            .header("Authorization", self.session.authorization())
            .send()
            .await
            .map_err(ApiError::from)?;

        check_status(response).await
    }
}

/// Map a non-success status to an [`ApiError`], passing successful responses through
async fn check_status(response: Response) -> std::result::Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = describe_error_body(status, &body);

    Err(match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(detail),
        StatusCode::FORBIDDEN => ApiError::Forbidden(detail),
        StatusCode::NOT_FOUND => ApiError::NotFound(detail),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ApiError::BadRequest(detail),
        status if status.is_server_error() => ApiError::ServerError(detail),
        _ => ApiError::InvalidResponse(detail),
    })
}

/// Render the REST error payload (`[{"message": ..., "errorCode": ...}]`) if there is one
fn describe_error_body(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<Vec<RestError>>(body) {
        Ok(errors) if !errors.is_empty() => errors
            .iter()
            .map(|e| match &e.error_code {
                Some(code) => format!("{}: {}", code, e.message),
                None => e.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        _ if body.trim().is_empty() => format!("HTTP {}", status),
        _ => format!("HTTP {}: {}", status, body.trim()),
    }
}

#[async_trait]
impl SalesforceApi for SalesforceClient {
    async fn query_files(&self, soql: &str) -> Result<Vec<FileRecord>> {
        let response = self.get("query/", &[("q", soql)]).await?;
        let page: QueryResponse = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse query response: {}", e))
        })?;

        if !page.done {
            log::warn!(
                "Query matched {} records but only the first {} were returned; the rest are not fetched{}",
                page.total_size,
                page.records.len(),
                page.next_records_url
                    .as_deref()
                    .map(|url| format!(" (next page: {})", url))
                    .unwrap_or_default()
            );
        }

        Ok(parse_records(page.records))
    }

    async fn open_version_data(&self, id: &str) -> std::result::Result<ByteStream, ApiError> {
        let path = format!("sobjects/ContentVersion/{}/VersionData", id);
        let response = self.get(&path, &[]).await?;

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(ApiError::from))
            .boxed())
    }
}
