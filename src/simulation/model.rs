use crate::state::occupancy_ratio;
use rand::Rng;

/// Probability of a sudden influx on any given gate update
pub const SURGE_PROBABILITY: f64 = 0.1;

/// Propose the change in people count for one gate over one tick.
///
/// A bounded random walk with three biases: negative feedback above 90% of capacity,
/// positive feedback below 20%, and occasional surges. Evening (18-22h) and late
/// morning (10-12h) add a small inflow.
pub fn propose_delta<R: Rng + ?Sized>(
    current_count: u32,
    capacity: u32,
    local_hour: u32,
    rng: &mut R,
) -> i64 {
    let ratio = occupancy_ratio(current_count, capacity);
    let mut delta: f64 = rng.gen_range(-30.0..=30.0);

    if ratio > 0.9 {
        delta *= 0.3;
        delta -= rng.gen_range(0.0..=20.0);
    } else if ratio < 0.2 {
        delta *= 0.5;
        delta += rng.gen_range(0.0..=40.0);
    } else if ratio > 0.7 {
        delta *= 0.6;
    }

    match local_hour {
        18..=22 => delta += rng.gen_range(0.0..15.0),
        10..=12 => delta += rng.gen_range(0.0..10.0),
        _ => {}
    }

    if rng.gen_bool(SURGE_PROBABILITY) {
        delta += rng.gen_range(0.0..50.0);
    }

    delta.round() as i64
}

/// Apply a delta, clamping at zero
pub fn apply_delta(current_count: u32, delta: i64) -> u32 {
    (i64::from(current_count) + delta).clamp(0, i64::from(u32::MAX)) as u32
}
