use crate::media::heatmap::{generate_regions, HeatmapData};
use crate::state::{MediaUpdate, StateStore};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Simulated heatmap pipeline for uploaded videos.
///
/// Each analysis sleeps for a fixed delay, then attaches random density regions to the
/// media record. Runs to completion once started; there is no cancellation.
pub struct MediaAnalyzer {
    store: Arc<StateStore>,
    delay: Duration,
    rng: Mutex<StdRng>,
}

impl MediaAnalyzer {
    pub fn new(store: Arc<StateStore>, delay: Duration) -> Self {
        Self {
            store,
            delay,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic region generation for tests
    pub fn with_seed(store: Arc<StateStore>, delay: Duration, seed: u64) -> Self {
        Self {
            store,
            delay,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Run the analysis for `media_id` and persist the result.
    ///
    /// If the record disappeared meanwhile the store update is a no-op; the generated
    /// heatmap is still returned.
    pub async fn analyze(&self, media_id: &str) -> HeatmapData {
        let started = Instant::now();

        tokio::time::sleep(self.delay).await;

        let regions = {
            let mut rng = self.rng.lock().expect("analyzer rng lock poisoned");
            generate_regions(&mut *rng)
        };

        let heatmap = HeatmapData {
            regions,
            processing_time: started.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
        };

        let update = MediaUpdate {
            is_processed: Some(true),
            processed_at: Some(Utc::now()),
            heatmap_data: Some(heatmap.clone()),
        };

        match self.store.update_media(media_id, update) {
            Some(_) => info!(
                media_id = %media_id,
                regions = heatmap.regions.len(),
                processing_ms = heatmap.processing_time,
                "Heatmap analysis complete"
            ),
            None => debug!(media_id = %media_id, "Media record gone before analysis finished"),
        }

        heatmap
    }

    /// Start the analysis in the background; the caller does not wait for it
    pub fn spawn(self: &Arc<Self>, media_id: String) -> JoinHandle<()> {
        let analyzer = Arc::clone(self);
        tokio::spawn(async move {
            analyzer.analyze(&media_id).await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::NewMedia;

    fn upload(store: &StateStore) -> String {
        store
            .create_media(NewMedia {
                filename: "stored".to_string(),
                original_name: "gate-cam.mp4".to_string(),
                size: 1024,
                mime_type: "video/mp4".to_string(),
            })
            .id
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyze_marks_record_processed() {
        let store = Arc::new(StateStore::new());
        let id = upload(&store);
        let analyzer = MediaAnalyzer::with_seed(store.clone(), Duration::from_secs(2), 1);

        let heatmap = analyzer.analyze(&id).await;

        let record = store.get_media(&id).unwrap();
        assert!(record.is_processed);
        assert!(record.processed_at.is_some());
        assert_eq!(record.heatmap_data, Some(heatmap.clone()));
        assert_eq!(heatmap.regions.len(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyze_missing_record_is_noop() {
        let store = Arc::new(StateStore::new());
        let analyzer = MediaAnalyzer::with_seed(store.clone(), Duration::from_millis(10), 1);

        let heatmap = analyzer.analyze("does-not-exist").await;

        assert_eq!(heatmap.regions.len(), 8);
        assert!(store.list_media().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_does_not_block_caller() {
        let store = Arc::new(StateStore::new());
        let id = upload(&store);
        let analyzer = Arc::new(MediaAnalyzer::with_seed(
            store.clone(),
            Duration::from_secs(2),
            3,
        ));

        let handle = analyzer.spawn(id.clone());
        assert!(!store.get_media(&id).unwrap().is_processed);

        handle.await.unwrap();
        assert!(store.get_media(&id).unwrap().is_processed);
    }
}
