use crate::api::ApiError;
use crate::media::{parse_range_header, MediaAnalyzer, MediaStorage, UploadError};
use crate::state::{MediaRecord, StateStore};
use axum::{
    body::{Body, Bytes},
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use futures::Stream;
use std::io::SeekFrom;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{info, warn};

/// Multipart field carrying the video
const VIDEO_FIELD: &str = "video";

/// Read size when streaming stored videos
const STREAM_CHUNK_BYTES: u64 = 64 * 1024;

/// Room for multipart boundaries and part headers on top of the file limit
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Shared state for the videos API
pub struct VideosAppState {
    pub store: Arc<StateStore>,
    pub storage: MediaStorage,
    pub analyzer: Arc<MediaAnalyzer>,
}

/// Create videos API router
pub fn create_videos_router(state: VideosAppState) -> Router {
    let body_limit = state
        .storage
        .max_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES)
        .try_into()
        .unwrap_or(usize::MAX);

    Router::new()
        .route(
            "/api/videos/upload",
            post(upload_video).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/videos", get(list_videos))
        .route("/api/videos/:id", get(get_video))
        .route("/api/videos/:id/stream", get(stream_video))
        .with_state(Arc::new(state))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::SizeLimitExceeded(err.body_text())
    } else {
        ApiError::Validation(err.body_text())
    }
}

/// POST /api/videos/upload - Multipart upload, field `video`.
///
/// The content type is checked before anything is written. The record is created only
/// once the file is fully on disk, then analysis starts in the background.
async fn upload_video(
    State(state): State<Arc<VideosAppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MediaRecord>, ApiError> {
    let mut multipart = multipart?;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let mut upload = state
            .storage
            .begin(field.file_name(), field.content_type())
            .await?;

        loop {
            let chunk = match field.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    upload.abort().await;
                    return Err(multipart_error(e));
                }
            };
            if let Err(e) = upload.write_chunk(&chunk).await {
                upload.abort().await;
                return Err(e.into());
            }
        }

        let new_media = upload.finish().await?;
        let record = state.store.create_media(new_media);

        info!(
            media_id = %record.id,
            original_name = %record.original_name,
            size = record.size,
            mime_type = %record.mime_type,
            "Video uploaded"
        );

        state.analyzer.spawn(record.id.clone());

        return Ok(Json(record));
    }

    Err(UploadError::MissingFile.into())
}

/// GET /api/videos - Newest upload first
async fn list_videos(State(state): State<Arc<VideosAppState>>) -> Json<Vec<MediaRecord>> {
    Json(state.store.list_media())
}

/// GET /api/videos/:id
async fn get_video(
    State(state): State<Arc<VideosAppState>>,
    Path(id): Path<String>,
) -> Result<Json<MediaRecord>, ApiError> {
    state
        .store
        .get_media(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))
}

/// GET /api/videos/:id/stream - Stored bytes, honouring a single `Range` request.
///
/// - `200 OK` full file
/// - `206 Partial Content` for `bytes=a-b`, `bytes=a-` and `bytes=-n`
/// - `416 Range Not Satisfiable` for anything else
async fn stream_video(
    State(state): State<Arc<VideosAppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let record = state
        .store
        .get_media(&id)
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;

    let path = state
        .storage
        .path_for(&record.filename)
        .ok_or_else(|| ApiError::NotFound("Video file not found".to_string()))?;

    let mut file = File::open(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ApiError::NotFound("Video file not found".to_string()),
        _ => ApiError::Internal(format!("open {}: {}", path.display(), e)),
    })?;
    let total_size = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(format!("stat {}: {}", path.display(), e)))?
        .len();

    let range = match headers.get(header::RANGE) {
        Some(value) => {
            let raw = value.to_str().map_err(|_| ApiError::RangeNotSatisfiable)?;
            let range = parse_range_header(raw, total_size).ok_or_else(|| {
                warn!(media_id = %id, range = %raw, size = total_size, "Invalid range header");
                ApiError::RangeNotSatisfiable
            })?;
            Some(range)
        }
        None => None,
    };

    let builder = Response::builder()
        .header(header::CONTENT_TYPE, &record.mime_type)
        .header(header::ACCEPT_RANGES, "bytes");

    let (builder, start, length) = match range {
        Some(range) => (
            builder
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_RANGE, range.content_range(total_size)),
            range.start,
            range.len(),
        ),
        None => (builder.status(StatusCode::OK), 0, total_size),
    };

    if start > 0 {
        file.seek(SeekFrom::Start(start))
            .await
            .map_err(|e| ApiError::Internal(format!("seek {}: {}", path.display(), e)))?;
    }

    builder
        .header(header::CONTENT_LENGTH, length)
        .body(Body::from_stream(read_chunks(file, length)))
        .map_err(|e| ApiError::Internal(format!("build stream response: {}", e)))
}

/// Stream `remaining` bytes from the current file position
fn read_chunks(file: File, remaining: u64) -> impl Stream<Item = std::io::Result<Bytes>> {
    futures::stream::unfold((file, remaining), |(mut file, remaining)| async move {
        if remaining == 0 {
            return None;
        }

        let mut buf = vec![0u8; remaining.min(STREAM_CHUNK_BYTES) as usize];
        match file.read(&mut buf).await {
            Ok(0) => None,
            Ok(n) => {
                buf.truncate(n);
                Some((Ok(Bytes::from(buf)), (file, remaining - n as u64)))
            }
            Err(e) => Some((Err(e), (file, 0))),
        }
    })
}
