use regex::Regex;
use serde::Serialize;
use tracing::warn;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    HowTo,
    Comparison,
    Troubleshooting,
    BestPractices,
    Definition,
}

impl IntentCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HowTo => "how_to",
            Self::Comparison => "comparison",
            Self::Troubleshooting => "troubleshooting",
            Self::BestPractices => "best_practices",
            Self::Definition => "definition",
        }
    }
}

/// Evaluated top to bottom; the first category with a matching pattern wins.
const INTENT_TABLE: &[(IntentCategory, &[&str], &str)] = &[
    (
        IntentCategory::HowTo,
        &[
            r"\bhow to\b",
            r"\bhow do i\b",
            r"\bhow can i\b",
            r"\bcreate\b",
            r"\bset up\b",
            r"\bconfigure\b",
            r"\bbuild\b",
        ],
        "step-by-step guide tutorial",
    ),
    (
        IntentCategory::Comparison,
        &[
            r"\bdifference between\b",
            r"\bvs\b",
            r"\bversus\b",
            r"\bcompare\b",
            r"\bcontrast\b",
        ],
        "comparison explanation",
    ),
    (
        IntentCategory::Troubleshooting,
        &[
            r"\berror\b",
            r"\bnot working\b",
            r"\bfailed\b",
            r"\bissue\b",
            r"\bproblem\b",
            r"\bfix\b",
            r"\bresolve\b",
        ],
        "troubleshooting fix",
    ),
    (
        IntentCategory::BestPractices,
        &[
            r"\bbest practice\b",
            r"\brecommendation\b",
            r"\bguideline\b",
            r"\btip\b",
            r"\boptimize\b",
        ],
        "recommendations guidelines",
    ),
    (
        IntentCategory::Definition,
        &[r"\bwhat is\b", r"\bdefine\b", r"\bmeaning\b", r"\bexplain\b"],
        "definition explanation",
    ),
];

#[derive(Debug, Clone)]
pub struct IntentRule {
    category: IntentCategory,
    patterns: Vec<(&'static str, Regex)>,
    enhancement: &'static str,
}

impl IntentRule {
    pub fn category(&self) -> IntentCategory {
        self.category
    }

    pub fn enhancement(&self) -> &'static str {
        self.enhancement
    }

    pub fn matching_pattern(&self, query: &str) -> Option<&'static str> {
        self.patterns
            .iter()
            .find(|(_, pattern)| pattern.is_match(query))
            .map(|(source, _)| *source)
    }
}

pub(super) fn default_intent_rules() -> Vec<IntentRule> {
    INTENT_TABLE
        .iter()
        .map(|(category, sources, enhancement)| {
            let patterns = sources
                .iter()
                .filter_map(|source| match Regex::new(&format!("(?i){source}")) {
                    Ok(pattern) => Some((*source, pattern)),
                    Err(err) => {
                        warn!(
                            category = category.as_str(),
                            pattern = source,
                            error = %err,
                            "skipping intent pattern that failed to compile"
                        );
                        None
                    }
                })
                .collect();

            IntentRule {
                category: *category,
                patterns,
                enhancement,
            }
        })
        .collect()
}
