mod config;
mod stats;

use serde::Serialize;
use tracing::{info, warn};

use crate::model::RetrievedCandidate;
use crate::util::{mean, round3};

pub use self::config::{
    ConfigWarning, DEFAULT_FALLBACK_THRESHOLD, DEFAULT_MAX_RESULTS, DEFAULT_MIN_RESULTS,
    DEFAULT_SIMILARITY_THRESHOLD, FilterConfig,
};
pub use self::stats::{ScoreDistribution, score_distribution, validate_threshold};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQualityIssue {
    MissingScore,
    NonFiniteScore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQualityWarning {
    pub index: usize,
    pub issue: DataQualityIssue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterMetadata {
    pub original_count: usize,
    pub filtered_count: usize,
    pub threshold_used: f64,
    pub fallback_used: bool,
    pub avg_score_before: f64,
    pub avg_score_after: f64,
    pub filtered_out: usize,
    pub scores: Vec<f64>,
    pub data_quality_warnings: Vec<DataQualityWarning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterResult {
    pub candidates: Vec<RetrievedCandidate>,
    pub metadata: FilterMetadata,
}

#[derive(Debug, Clone)]
pub struct RetrievalFilter {
    config: FilterConfig,
}

impl Default for RetrievalFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

impl RetrievalFilter {
    pub fn new(config: FilterConfig) -> Self {
        let (config, warnings) = config.resolve();
        for warning in &warnings {
            warn!(warning = %warning, "filter configuration adjusted");
        }

        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn filter(&self, candidates: &[RetrievedCandidate]) -> FilterResult {
        let config = &self.config;

        if candidates.is_empty() {
            warn!("no candidates to filter");
            return FilterResult {
                candidates: Vec::new(),
                metadata: FilterMetadata {
                    original_count: 0,
                    filtered_count: 0,
                    threshold_used: 0.0,
                    fallback_used: false,
                    avg_score_before: 0.0,
                    avg_score_after: 0.0,
                    filtered_out: 0,
                    scores: Vec::new(),
                    data_quality_warnings: Vec::new(),
                },
            };
        }

        let mut data_quality_warnings = Vec::new();
        let scored = candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| {
                (index, checked_score(index, candidate, &mut data_quality_warnings))
            })
            .collect::<Vec<(usize, f64)>>();

        let mut threshold = config.similarity_threshold;
        let mut fallback_used = false;
        let mut kept = select_above(&scored, threshold);

        if kept.len() < config.min_results && config.similarity_threshold > config.fallback_threshold
        {
            info!(
                kept = kept.len(),
                min_results = config.min_results,
                fallback_threshold = config.fallback_threshold,
                "too few results above primary threshold, falling back"
            );
            threshold = config.fallback_threshold;
            fallback_used = true;
            kept = select_above(&scored, threshold);

            if kept.len() < config.min_results {
                warn!(
                    kept = kept.len(),
                    min_results = config.min_results,
                    "fallback threshold still below minimum result count"
                );
            }
        }

        // stable: equal scores keep the engine's ranking
        kept.sort_by(|left, right| right.1.total_cmp(&left.1));
        kept.truncate(config.max_results);

        let all_scores = scored.iter().map(|(_, score)| *score).collect::<Vec<f64>>();
        let kept_scores = kept.iter().map(|(_, score)| *score).collect::<Vec<f64>>();
        let metadata = FilterMetadata {
            original_count: candidates.len(),
            filtered_count: kept.len(),
            threshold_used: threshold,
            fallback_used,
            avg_score_before: round3(mean(&all_scores)),
            avg_score_after: round3(mean(&kept_scores)),
            filtered_out: candidates.len() - kept.len(),
            scores: kept_scores.iter().copied().map(round3).collect(),
            data_quality_warnings,
        };

        info!(
            original_count = metadata.original_count,
            filtered_count = metadata.filtered_count,
            threshold_used = metadata.threshold_used,
            fallback_used = metadata.fallback_used,
            avg_score_after = metadata.avg_score_after,
            "retrieval filtered"
        );

        FilterResult {
            candidates: kept
                .iter()
                .map(|(index, _)| candidates[*index].clone())
                .collect(),
            metadata,
        }
    }
}

fn checked_score(
    index: usize,
    candidate: &RetrievedCandidate,
    warnings: &mut Vec<DataQualityWarning>,
) -> f64 {
    let issue = match candidate.score {
        Some(score) if score.is_finite() => return score,
        Some(_) => DataQualityIssue::NonFiniteScore,
        None => DataQualityIssue::MissingScore,
    };

    warn!(index, issue = ?issue, "candidate score unusable, treating as 0.0");
    warnings.push(DataQualityWarning { index, issue });
    0.0
}

fn select_above(scored: &[(usize, f64)], threshold: f64) -> Vec<(usize, f64)> {
    scored
        .iter()
        .filter(|(_, score)| *score >= threshold)
        .copied()
        .collect()
}
