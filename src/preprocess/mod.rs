mod abbreviations;
mod intent;
mod quotes;
#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, warn};

pub use self::abbreviations::AbbreviationRule;
pub use self::intent::{IntentCategory, IntentRule};

use self::abbreviations::{DEFAULT_ABBREVIATIONS, sort_rules};
use self::intent::default_intent_rules;
use self::quotes::{contains, overlaps, quoted_spans};

pub const DEFAULT_MAX_QUERY_LENGTH: usize = 1000;
const MIN_QUERY_LENGTH: usize = 3;
const CONTEXT_OVERLAP_RATIO: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryChange {
    /// `position` is the byte offset of the replacement in the enhanced query.
    Abbreviation {
        original: String,
        replacement: String,
        position: usize,
    },
    Context {
        category: IntentCategory,
        enhancement: String,
        pattern: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum QueryRejection {
    Empty,
    TooLong { length: usize, max_length: usize },
}

impl fmt::Display for QueryRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "query is empty"),
            Self::TooLong { length, max_length } => {
                write!(f, "query is {length} characters, limit is {max_length}")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryTransformation {
    pub original: String,
    pub enhanced: String,
    pub changes: Vec<QueryChange>,
    pub abbreviation_expansions: usize,
    pub contextual_enhancements: usize,
    pub was_modified: bool,
    pub rejection: Option<QueryRejection>,
}

impl QueryTransformation {
    fn unchanged(query: &str, rejection: Option<QueryRejection>) -> Self {
        Self {
            original: query.to_string(),
            enhanced: query.to_string(),
            changes: Vec::new(),
            abbreviation_expansions: 0,
            contextual_enhancements: 0,
            was_modified: false,
            rejection,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryValidation {
    pub valid: bool,
    pub error: Option<String>,
    pub potential_abbreviations: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct QueryPreprocessor {
    rules: Vec<AbbreviationRule>,
    intents: Vec<IntentRule>,
    max_query_length: usize,
}

impl Default for QueryPreprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_QUERY_LENGTH)
    }
}

impl QueryPreprocessor {
    pub fn new(max_query_length: usize) -> Self {
        let mut rules = DEFAULT_ABBREVIATIONS
            .iter()
            .filter_map(
                |(abbreviation, expansion)| match AbbreviationRule::compile(abbreviation, expansion) {
                    Ok(rule) => Some(rule),
                    Err(err) => {
                        warn!(abbreviation, error = %err, "skipping abbreviation rule");
                        None
                    }
                },
            )
            .collect::<Vec<AbbreviationRule>>();
        sort_rules(&mut rules);

        Self {
            rules,
            intents: default_intent_rules(),
            max_query_length,
        }
    }

    pub fn add_custom_abbreviation(&mut self, abbreviation: &str, expansion: &str) -> Result<()> {
        let rule = AbbreviationRule::compile(abbreviation, expansion)?;
        self.rules
            .retain(|existing| existing.abbreviation() != rule.abbreviation());
        info!(
            abbreviation = rule.abbreviation(),
            expansion = rule.expansion(),
            "added custom abbreviation"
        );
        self.rules.push(rule);
        sort_rules(&mut self.rules);
        Ok(())
    }

    pub fn abbreviations(&self) -> Vec<(&str, &str)> {
        self.rules
            .iter()
            .map(|rule| (rule.abbreviation(), rule.expansion()))
            .collect()
    }

    pub fn intents(&self) -> &[IntentRule] {
        &self.intents
    }

    pub fn preprocess(&self, query: &str) -> (String, QueryTransformation) {
        if let Some(rejection) = self.reject(query) {
            warn!(reason = %rejection, "query left unmodified");
            let transformation = QueryTransformation::unchanged(query, Some(rejection));
            return (query.to_string(), transformation);
        }

        let trimmed = query.trim();
        let (expanded, mut changes) = self.expand_abbreviations(trimmed);
        let enhanced = match self.add_context(&expanded) {
            Some((enhanced, change)) => {
                changes.push(change);
                enhanced
            }
            None => expanded,
        };

        let abbreviation_expansions = changes
            .iter()
            .filter(|change| matches!(change, QueryChange::Abbreviation { .. }))
            .count();
        let transformation = QueryTransformation {
            original: query.to_string(),
            enhanced: enhanced.clone(),
            abbreviation_expansions,
            contextual_enhancements: changes.len() - abbreviation_expansions,
            was_modified: !changes.is_empty(),
            changes,
            rejection: None,
        };

        if transformation.was_modified {
            info!(
                original = %trimmed,
                enhanced = %enhanced,
                abbreviation_expansions = transformation.abbreviation_expansions,
                contextual_enhancements = transformation.contextual_enhancements,
                "query preprocessed"
            );
        }

        (enhanced, transformation)
    }

    pub fn validate(&self, query: &str) -> QueryValidation {
        let trimmed = query.trim();
        let invalid = |error: &str, suggestion: &str| QueryValidation {
            valid: false,
            error: Some(error.to_string()),
            potential_abbreviations: Vec::new(),
            suggestions: vec![suggestion.to_string()],
        };

        if trimmed.is_empty() {
            return invalid(
                "empty query",
                "Ask a question about Adobe Analytics, Customer Journey Analytics, or Adobe Experience Platform",
            );
        }
        if trimmed.chars().count() < MIN_QUERY_LENGTH {
            return invalid("query too short", "Provide a more detailed question");
        }
        if query.chars().count() > self.max_query_length {
            return invalid("query too long", "Provide a more concise question");
        }

        let quoted = quoted_spans(trimmed);
        let potential_abbreviations = self
            .rules
            .iter()
            .filter(|rule| {
                rule.matches(trimmed)
                    .any(|span| !quoted.iter().any(|quote| overlaps(quote, &span)))
            })
            .map(|rule| rule.abbreviation().to_string())
            .collect();

        QueryValidation {
            valid: true,
            error: None,
            potential_abbreviations,
            suggestions: Vec::new(),
        }
    }

    fn reject(&self, query: &str) -> Option<QueryRejection> {
        if query.trim().is_empty() {
            return Some(QueryRejection::Empty);
        }

        let length = query.chars().count();
        if length > self.max_query_length {
            return Some(QueryRejection::TooLong {
                length,
                max_length: self.max_query_length,
            });
        }

        None
    }

    fn expand_abbreviations(&self, query: &str) -> (String, Vec<QueryChange>) {
        let quoted = quoted_spans(query);
        let existing_expansions = self
            .rules
            .iter()
            .flat_map(|rule| rule.expansion_spans(query))
            .collect::<Vec<Range<usize>>>();

        let mut claimed = Vec::<(Range<usize>, &AbbreviationRule)>::new();
        let mut planned = HashSet::<String>::new();

        for rule in &self.rules {
            for span in rule.matches(query) {
                if quoted.iter().any(|quote| overlaps(quote, &span))
                    || existing_expansions
                        .iter()
                        .any(|expansion| contains(expansion, &span))
                    || claimed.iter().any(|(taken, _)| overlaps(taken, &span))
                {
                    continue;
                }

                let expansion_key = rule.expansion().to_lowercase();
                let elsewhere = format!("{} {}", &query[..span.start], &query[span.end..]);
                if planned.contains(&expansion_key)
                    || elsewhere.to_lowercase().contains(&expansion_key)
                {
                    debug!(
                        abbreviation = rule.abbreviation(),
                        "expansion already present, skipping"
                    );
                    continue;
                }

                planned.insert(expansion_key);
                claimed.push((span, rule));
            }
        }

        claimed.sort_by_key(|(span, _)| span.start);

        let mut expanded = String::with_capacity(query.len());
        let mut changes = Vec::with_capacity(claimed.len());
        let mut cursor = 0;
        for (span, rule) in claimed {
            expanded.push_str(&query[cursor..span.start]);
            changes.push(QueryChange::Abbreviation {
                original: query[span.clone()].to_string(),
                replacement: rule.expansion().to_string(),
                position: expanded.len(),
            });
            expanded.push_str(rule.expansion());
            cursor = span.end;
        }
        expanded.push_str(&query[cursor..]);

        (expanded, changes)
    }

    fn add_context(&self, query: &str) -> Option<(String, QueryChange)> {
        let (rule, pattern) = self
            .intents
            .iter()
            .find_map(|rule| rule.matching_pattern(query).map(|pattern| (rule, pattern)))?;

        if token_overlap(rule.enhancement(), query) >= CONTEXT_OVERLAP_RATIO {
            debug!(
                category = rule.category().as_str(),
                "intent phrase already covered by query"
            );
            return None;
        }

        let change = QueryChange::Context {
            category: rule.category(),
            enhancement: rule.enhancement().to_string(),
            pattern: pattern.to_string(),
        };
        Some((format!("{query} {}", rule.enhancement()), change))
    }
}

fn token_overlap(phrase: &str, query: &str) -> f64 {
    let query_tokens = query
        .split_whitespace()
        .map(normalize_token)
        .collect::<HashSet<String>>();
    let phrase_tokens = phrase
        .split_whitespace()
        .map(normalize_token)
        .collect::<Vec<String>>();

    if phrase_tokens.is_empty() {
        return 1.0;
    }

    let present = phrase_tokens
        .iter()
        .filter(|token| query_tokens.contains(*token))
        .count();
    present as f64 / phrase_tokens.len() as f64
}

fn normalize_token(token: &str) -> String {
    token
        .trim_matches(|character: char| !character.is_alphanumeric() && character != '-')
        .to_lowercase()
}
