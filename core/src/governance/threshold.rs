use crate::config::ThresholdConfig;

/// Adaptive confidence threshold a candidate memory's confidence must clear
/// to be eligible for auto-promotion (§4.5).
///
/// Below `cold_start_floor` total observations, a fixed `cold_start_default`
/// is used since there isn't enough history to trust a computed rate.
/// Otherwise the threshold tightens as the success rate climbs:
/// `clamp(0.8 − 0.4 × success_rate, min_threshold, max_threshold)`.
#[must_use]
pub fn compute_threshold(config: &ThresholdConfig, total_records: u64, success_rate: f64) -> f64 {
    if total_records < config.cold_start_floor {
        return config.cold_start_default;
    }
    let raw = 0.8 - 0.4 * success_rate;
    raw.clamp(config.min_threshold, config.max_threshold)
}
