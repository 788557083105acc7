use serde::{Deserialize, Serialize};

/// Weights used when a new observation is folded into an existing score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BlendWeights {
    pub previous: f64,
    pub incoming: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            previous: 0.3,
            incoming: 0.7,
        }
    }
}

/// Rounds half away from zero and clamps into the 0..=100 score range.
pub fn round_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// `round(previous*w.previous + incoming*w.incoming)`, or `round(incoming)`
/// when there is no previous score.
pub fn blend(previous: Option<u8>, incoming: f64, weights: &BlendWeights) -> u8 {
    match previous {
        Some(old) => round_score(old as f64 * weights.previous + incoming * weights.incoming),
        None => round_score(incoming),
    }
}

/// Arithmetic mean, `None` for an empty input.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator,
    I::Item: Into<f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v.into(), count + 1));
    (count > 0).then(|| sum / count as f64)
}
