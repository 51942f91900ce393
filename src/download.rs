//! Writing downloaded file bodies to disk

use std::path::{Path, PathBuf, is_separator};

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::client::{ByteStream, FileRecord};
use crate::error::DownloadError;

/// Write buffer size
pub const CHUNK_SIZE: usize = 8192;

/// Target path for a record: `{dir}/{title}.{extension}`.
///
/// The name must stay inside `dir`, so titles or extensions containing a path
/// separator (or NUL) are refused. Existing files are overwritten.
pub fn local_path(dir: &Path, record: &FileRecord) -> Result<PathBuf, DownloadError> {
    let name = record.file_name();
    if name.chars().any(|c| is_separator(c) || c == '\0') {
        return Err(DownloadError::InvalidFileName(name));
    }
    Ok(dir.join(name))
}

/// Stream a body into `path`, truncating any existing file.
///
/// When `expected_md5` is given the digest of the written bytes is compared
/// against it and a mismatch is logged; the file is kept either way.
/// Returns the number of bytes written.
pub async fn save_stream(
    mut body: ByteStream,
    path: &Path,
    expected_md5: Option<&str>,
) -> Result<u64, DownloadError> {
    let io_err = |source: std::io::Error| DownloadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).await.map_err(io_err)?;
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut digest = md5::Context::new();
    let mut written: u64 = 0;

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        digest.consume(&chunk);
        writer.write_all(&chunk).await.map_err(io_err)?;
        written += chunk.len() as u64;
    }
    writer.flush().await.map_err(io_err)?;

    if let Some(expected) = expected_md5 {
        let actual = format!("{:x}", digest.compute());
        if !actual.eq_ignore_ascii_case(expected) {
            log::warn!(
                "Checksum mismatch for {}: expected {}, got {}",
                path.display(),
                expected,
                actual
            );
        }
    }

    log::debug!("Wrote {} bytes to {}", written, path.display());
    Ok(written)
}
