use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of density regions produced per analysed video
pub const REGION_COUNT: usize = 8;

/// Crowd density band of a heatmap region
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityTier {
    Low,
    Medium,
    High,
}

impl DensityTier {
    /// Low below 0.3, medium below 0.7, high otherwise
    pub fn from_density(density: f64) -> Self {
        if density < 0.3 {
            DensityTier::Low
        } else if density < 0.7 {
            DensityTier::Medium
        } else {
            DensityTier::High
        }
    }

    pub fn color(&self) -> &'static str {
        let palette = HeatmapPalette::default();
        match self {
            DensityTier::Low => palette.low,
            DensityTier::Medium => palette.medium,
            DensityTier::High => palette.high,
        }
    }
}

/// Colours used to render density tiers
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeatmapPalette {
    pub low: &'static str,
    pub medium: &'static str,
    pub high: &'static str,
}

impl Default for HeatmapPalette {
    fn default() -> Self {
        Self {
            low: "#10b981",
            medium: "#f59e0b",
            high: "#ef4444",
        }
    }
}

/// Rectangular zone of the frame, positions and sizes in percent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeatmapRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// 0.0..1.0
    pub density: f64,
    pub tier: DensityTier,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapData {
    pub regions: Vec<HeatmapRegion>,
    /// Wall time spent "processing", in milliseconds
    pub processing_time: u64,
    pub timestamp: DateTime<Utc>,
}

/// Generate the simulated density regions for one frame
pub fn generate_regions<R: Rng + ?Sized>(rng: &mut R) -> Vec<HeatmapRegion> {
    (0..REGION_COUNT)
        .map(|_| {
            let density: f64 = rng.gen();
            let tier = DensityTier::from_density(density);

            HeatmapRegion {
                x: rng.gen::<f64>() * 80.0,
                y: rng.gen::<f64>() * 80.0,
                width: 10.0 + rng.gen::<f64>() * 15.0,
                height: 10.0 + rng.gen::<f64>() * 15.0,
                density,
                tier,
                color: tier.color().to_string(),
            }
        })
        .collect()
}
