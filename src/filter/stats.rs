use serde::Serialize;

use crate::model::RetrievedCandidate;
use crate::util::{mean, round3};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreDistribution {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub count: usize,
}

/// Summary of the scores in a batch. The median is the upper middle value
/// for even counts.
pub fn score_distribution(candidates: &[RetrievedCandidate]) -> ScoreDistribution {
    let mut scores = candidates
        .iter()
        .map(RetrievedCandidate::effective_score)
        .collect::<Vec<f64>>();

    if scores.is_empty() {
        return ScoreDistribution {
            min: 0.0,
            max: 0.0,
            mean: 0.0,
            median: 0.0,
            count: 0,
        };
    }

    scores.sort_by(f64::total_cmp);
    let count = scores.len();

    ScoreDistribution {
        min: round3(scores[0]),
        max: round3(scores[count - 1]),
        mean: round3(mean(&scores)),
        median: round3(scores[count / 2]),
        count,
    }
}

pub fn validate_threshold(threshold: f64) -> bool {
    threshold.is_finite() && (0.0..=1.0).contains(&threshold)
}
