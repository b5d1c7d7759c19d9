use std::fmt;

use serde::Serialize;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;
pub const DEFAULT_FALLBACK_THRESHOLD: f64 = 0.5;
pub const DEFAULT_MIN_RESULTS: usize = 3;
pub const DEFAULT_MAX_RESULTS: usize = 8;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct FilterConfig {
    pub similarity_threshold: f64,
    pub fallback_threshold: f64,
    pub min_results: usize,
    pub max_results: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            fallback_threshold: DEFAULT_FALLBACK_THRESHOLD,
            min_results: DEFAULT_MIN_RESULTS,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigWarning {
    NonFiniteThreshold {
        name: &'static str,
        applied: f64,
    },
    ThresholdClamped {
        name: &'static str,
        requested: f64,
        applied: f64,
    },
    FallbackAbovePrimary {
        fallback: f64,
        primary: f64,
    },
    ZeroMaxResults,
    MaxBelowMin {
        min_results: usize,
        max_results: usize,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteThreshold { name, applied } => {
                write!(f, "{name} is not a finite number, using {applied}")
            }
            Self::ThresholdClamped {
                name,
                requested,
                applied,
            } => write!(f, "{name} {requested} is outside [0, 1], clamped to {applied}"),
            Self::FallbackAbovePrimary { fallback, primary } => write!(
                f,
                "fallback threshold {fallback} exceeds similarity threshold {primary}, clamped to {primary}"
            ),
            Self::ZeroMaxResults => write!(f, "max results of 0 raised to 1"),
            Self::MaxBelowMin {
                min_results,
                max_results,
            } => write!(
                f,
                "max results {max_results} is below min results {min_results}, max results caps output"
            ),
        }
    }
}

impl FilterConfig {
    pub fn resolve(self) -> (Self, Vec<ConfigWarning>) {
        let mut warnings = Vec::new();

        let similarity_threshold = resolve_threshold(
            "similarity_threshold",
            self.similarity_threshold,
            DEFAULT_SIMILARITY_THRESHOLD,
            &mut warnings,
        );
        let mut fallback_threshold = resolve_threshold(
            "fallback_threshold",
            self.fallback_threshold,
            DEFAULT_FALLBACK_THRESHOLD,
            &mut warnings,
        );
        if fallback_threshold > similarity_threshold {
            warnings.push(ConfigWarning::FallbackAbovePrimary {
                fallback: fallback_threshold,
                primary: similarity_threshold,
            });
            fallback_threshold = similarity_threshold;
        }

        let mut max_results = self.max_results;
        if max_results == 0 {
            warnings.push(ConfigWarning::ZeroMaxResults);
            max_results = 1;
        }
        if max_results < self.min_results {
            warnings.push(ConfigWarning::MaxBelowMin {
                min_results: self.min_results,
                max_results,
            });
        }

        let resolved = Self {
            similarity_threshold,
            fallback_threshold,
            min_results: self.min_results,
            max_results,
        };
        (resolved, warnings)
    }
}

fn resolve_threshold(
    name: &'static str,
    requested: f64,
    default: f64,
    warnings: &mut Vec<ConfigWarning>,
) -> f64 {
    if !requested.is_finite() {
        warnings.push(ConfigWarning::NonFiniteThreshold {
            name,
            applied: default,
        });
        return default;
    }

    let applied = requested.clamp(0.0, 1.0);
    if applied != requested {
        warnings.push(ConfigWarning::ThresholdClamped {
            name,
            requested,
            applied,
        });
    }
    applied
}
