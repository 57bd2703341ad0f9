//! Video uploads and the simulated heatmap analysis attached to them.

mod analyzer;
mod heatmap;
mod storage;

pub use analyzer::MediaAnalyzer;
pub use heatmap::{
    generate_regions, DensityTier, HeatmapData, HeatmapPalette, HeatmapRegion, REGION_COUNT,
};
pub use storage::{
    parse_range_header, validate_content_type, ByteRange, MediaStorage, PendingUpload,
    UploadError, DEFAULT_MAX_UPLOAD_BYTES,
};
