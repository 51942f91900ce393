//! Export command implementation

use std::path::Path;

use colored::Colorize;

use crate::client::salesforce::build_http_client;
use crate::client::session::LoginRequest;
use crate::client::{FileRecord, SalesforceApi, SalesforceClient, Session};
use crate::config::Config;
use crate::download::{local_path, save_stream};
use crate::error::{DownloadError, Result};
use crate::output::table::format_file_table;

/// Metadata query for the exported files. The title prefix is fixed.
pub const FILE_QUERY: &str = "SELECT Id, Title, Checksum, FileExtension, ContentDocumentId, \
     VersionData, FirstPublishedLocationId, CreatedDate \
     FROM ContentVersion WHERE Title LIKE 'TestFile%'";

/// Run the export: log in, query, then download each match
pub async fn run(config: &Config) -> Result<()> {
    let (username, password) = config.credentials()?;

    println!(
        "Attempting to connect to Salesforce as {}...",
        username.bold()
    );
    let http = build_http_client(config.timeout)?;
    let session = Session::login(
        &http,
        LoginRequest {
            login_host: &config.login_host(),
            api_version: &config.api_version,
            username,
            password,
            security_token: &config.security_token,
        },
    )
    .await?;
    println!("{}", "✓ Successfully connected to Salesforce!".green());

    let client = SalesforceClient::new(http, session);
    export_files(&client, config).await
}

/// Query matching files and download them into the configured directory.
///
/// A failed file is reported and skipped; only directory creation and the
/// query itself abort.
pub async fn export_files<C: SalesforceApi + ?Sized>(client: &C, config: &Config) -> Result<()> {
    let dir = config.download_dir.as_path();
    if !config.dry_run {
        ensure_download_dir(dir).await?;
    }

    println!("Executing SOQL query: {}", FILE_QUERY.dimmed());
    let records = client.query_files(FILE_QUERY).await?;
    println!("Found {} '{}' files.", records.len(), config.file_type);

    if records.is_empty() {
        println!(
            "{} No '{}' files found matching the criteria.",
            "○".dimmed(),
            config.file_type
        );
        return Ok(());
    }

    if config.dry_run {
        println!("{}", format_file_table(&records, dir));
        return Ok(());
    }

    for record in &records {
        let file_name = record.file_name();
        match download_record(client, record, dir).await {
            Ok(()) => println!("{} Successfully downloaded: {}", "✓".green(), file_name),
            Err(err) if err.is_local() => {
                println!("{} Error saving file {}: {}", "✗".red(), file_name, err)
            }
            Err(err) => println!("{} Error downloading {}: {}", "✗".red(), record.title, err),
        }
    }

    Ok(())
}

async fn ensure_download_dir(dir: &Path) -> Result<()> {
    if !tokio::fs::try_exists(dir).await? {
        tokio::fs::create_dir_all(dir).await?;
        println!("Created download directory: {}", dir.display().to_string().cyan());
    }
    Ok(())
}

async fn download_record<C: SalesforceApi + ?Sized>(
    client: &C,
    record: &FileRecord,
    dir: &Path,
) -> std::result::Result<(), DownloadError> {
    let path = local_path(dir, record)?;
    println!(
        "Downloading '{}' (ID: {}) to {}...",
        record.title,
        record.id,
        path.display()
    );

    log::debug!(
        "{}: document {:?}, published to {:?}, content at {:?}",
        record.id,
        record.content_document_id,
        record.first_published_location_id,
        record.version_data
    );

    let body = client.open_version_data(&record.id).await?;
    save_stream(body, &path, record.checksum.as_deref()).await?;
    Ok(())
}
