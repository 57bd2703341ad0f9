use crate::state::NewMedia;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::warn;
use uuid::Uuid;

/// 500 MB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// Upload rejection reasons
#[derive(Debug)]
pub enum UploadError {
    MissingFile,
    UnsupportedMediaType(String),
    TooLarge { limit: u64 },
    Io(std::io::Error),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::MissingFile => write!(f, "No video file provided"),
            UploadError::UnsupportedMediaType(ct) => {
                write!(f, "Only video files are allowed (got '{}')", ct)
            }
            UploadError::TooLarge { limit } => {
                write!(f, "Video exceeds the upload limit of {} bytes", limit)
            }
            UploadError::Io(e) => write!(f, "upload storage error: {}", e),
        }
    }
}

impl std::error::Error for UploadError {}

impl From<std::io::Error> for UploadError {
    fn from(e: std::io::Error) -> Self {
        UploadError::Io(e)
    }
}

/// Accept only `video/*` content types
pub fn validate_content_type(content_type: Option<&str>) -> Result<String, UploadError> {
    match content_type {
        Some(ct) if ct.to_ascii_lowercase().starts_with("video/") => Ok(ct.to_string()),
        Some(ct) => Err(UploadError::UnsupportedMediaType(ct.to_string())),
        None => Err(UploadError::UnsupportedMediaType(String::new())),
    }
}

/// Uploaded bytes on disk, stored under opaque generated file names
#[derive(Clone, Debug)]
pub struct MediaStorage {
    dir: PathBuf,
    max_bytes: u64,
}

impl MediaStorage {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate the content type and open a new file for the upload.
    ///
    /// Nothing touches the disk when the content type is rejected.
    pub async fn begin(
        &self,
        original_name: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<PendingUpload, UploadError> {
        let mime_type = validate_content_type(content_type)?;

        fs::create_dir_all(&self.dir).await?;

        let filename = Uuid::new_v4().simple().to_string();
        let path = self.dir.join(&filename);
        let file = File::create(&path).await?;

        Ok(PendingUpload {
            file,
            path,
            filename,
            original_name: original_name
                .filter(|n| !n.is_empty())
                .unwrap_or("upload")
                .to_string(),
            mime_type,
            written: 0,
            limit: self.max_bytes,
        })
    }

    /// Resolve a stored file name. Names containing path components are refused.
    pub fn path_for(&self, filename: &str) -> Option<PathBuf> {
        let is_plain = !filename.is_empty()
            && Path::new(filename).file_name().and_then(|n| n.to_str()) == Some(filename);
        is_plain.then(|| self.dir.join(filename))
    }
}

/// An upload being written to disk
pub struct PendingUpload {
    file: File,
    path: PathBuf,
    filename: String,
    original_name: String,
    mime_type: String,
    written: u64,
    limit: u64,
}

impl PendingUpload {
    /// Append a chunk, refusing to grow past the size limit
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), UploadError> {
        let next = self.written + chunk.len() as u64;
        if next > self.limit {
            return Err(UploadError::TooLarge { limit: self.limit });
        }
        self.file.write_all(chunk).await?;
        self.written = next;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush to disk and describe the stored file. A failed flush discards the file.
    pub async fn finish(mut self) -> Result<NewMedia, UploadError> {
        if let Err(e) = self.file.flush().await {
            self.abort().await;
            return Err(e.into());
        }
        Ok(NewMedia {
            filename: self.filename,
            original_name: self.original_name,
            size: self.written,
            mime_type: self.mime_type,
        })
    }

    /// Discard the partially written file
    pub async fn abort(self) {
        drop(self.file);
        if let Err(e) = fs::remove_file(&self.path).await {
            warn!(error = %e, path = %self.path.display(), "Failed to remove partial upload");
        }
    }
}

/// Inclusive byte range of a stored file
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value
    pub fn content_range(&self, total_size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, total_size)
    }
}

/// Parse a single `Range: bytes=...` header against a file of `total_size` bytes.
///
/// Accepts `start-end`, `start-` and `-suffix`. An end beyond the file is clamped.
/// Returns None for anything unsatisfiable or malformed.
pub fn parse_range_header(header: &str, total_size: u64) -> Option<ByteRange> {
    let spec = header.trim().strip_prefix("bytes=")?;
    if total_size == 0 || spec.contains(',') {
        return None;
    }
    let last = total_size - 1;

    let (start, end) = spec.split_once('-')?;
    let (start, end) = (start.trim(), end.trim());

    if start.is_empty() {
        // bytes=-500 means the last 500 bytes
        let suffix: u64 = end.parse().ok()?;
        if suffix == 0 {
            return None;
        }
        return Some(ByteRange {
            start: total_size.saturating_sub(suffix),
            end: last,
        });
    }

    let start: u64 = start.parse().ok()?;
    let end = if end.is_empty() {
        last
    } else {
        end.parse::<u64>().ok()?.min(last)
    };

    if start > end {
        return None;
    }

    Some(ByteRange { start, end })
}
