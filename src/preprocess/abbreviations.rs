use std::ops::Range;

use anyhow::{Context, Result, bail};
use regex::Regex;

pub(super) const DEFAULT_ABBREVIATIONS: &[(&str, &str)] = &[
    // products
    ("cja", "Customer Journey Analytics"),
    ("aa", "Adobe Analytics"),
    ("aep", "Adobe Experience Platform"),
    ("aam", "Adobe Audience Manager"),
    ("at", "Adobe Target"),
    ("acp", "Adobe Campaign"),
    ("aem", "Adobe Experience Manager"),
    // analytics components
    ("evar", "eVar conversion variable"),
    ("prop", "prop traffic variable"),
    ("calc metric", "calculated metric"),
    ("calc", "calculated"),
    ("seg", "segment"),
    ("dim", "dimension"),
    ("met", "metric"),
    ("event", "success event"),
    ("conversion", "conversion event"),
    // tracking
    ("s.t()", "s.t() page view tracking"),
    ("s.tl()", "s.tl() link tracking"),
    ("visitor id", "visitor ID"),
    ("hit", "hit data"),
    ("visit", "visit data"),
    ("page view", "page view"),
    ("bounce rate", "bounce rate"),
    ("session", "session data"),
    // data sources
    ("rs", "report suite"),
    ("dv", "data view"),
    ("ds", "data source"),
    ("conn", "connection"),
    ("schema", "XDM schema"),
    ("profile", "profile data"),
    ("identity", "identity namespace"),
    // workspace
    ("freeform", "Freeform Table"),
    ("cohort", "Cohort Analysis"),
    ("flow", "Flow Analysis"),
    ("fallout", "Fallout Analysis"),
    ("pathing", "Pathing Analysis"),
    ("attribution", "Attribution IQ"),
    ("anomaly", "Anomaly Detection"),
    ("calendar", "Calendar Events"),
    ("alert", "Intelligent Alerts"),
    // general
    ("api", "API"),
    ("sdk", "SDK"),
    ("ui", "user interface"),
    ("ux", "user experience"),
    ("etl", "ETL"),
    ("rtcdp", "Real-time Customer Data Platform"),
    ("cdp", "Customer Data Platform"),
    ("dmp", "Data Management Platform"),
    ("crm", "CRM"),
    ("cms", "Content Management System"),
];

#[derive(Debug, Clone)]
pub struct AbbreviationRule {
    abbreviation: String,
    expansion: String,
    pattern: Regex,
    expansion_pattern: Regex,
}

impl AbbreviationRule {
    pub fn compile(abbreviation: &str, expansion: &str) -> Result<Self> {
        let abbreviation = abbreviation.trim().to_lowercase();
        let expansion = expansion.trim().to_string();

        if abbreviation.is_empty() {
            bail!("abbreviation must not be empty");
        }
        if expansion.is_empty() {
            bail!("expansion for '{abbreviation}' must not be empty");
        }

        let pattern = word_pattern(&abbreviation)
            .with_context(|| format!("failed to compile pattern for '{abbreviation}'"))?;
        let expansion_pattern = word_pattern(&expansion)
            .with_context(|| format!("failed to compile pattern for '{expansion}'"))?;

        Ok(Self {
            abbreviation,
            expansion,
            pattern,
            expansion_pattern,
        })
    }

    pub fn abbreviation(&self) -> &str {
        &self.abbreviation
    }

    pub fn expansion(&self) -> &str {
        &self.expansion
    }

    pub(super) fn matches(&self, text: &str) -> impl Iterator<Item = Range<usize>> {
        self.pattern.find_iter(text).map(|found| found.range())
    }

    pub(super) fn expansion_spans(&self, text: &str) -> impl Iterator<Item = Range<usize>> {
        self.expansion_pattern.find_iter(text).map(|found| found.range())
    }
}

pub(super) fn sort_rules(rules: &mut [AbbreviationRule]) {
    rules.sort_by(|left, right| {
        right
            .abbreviation
            .chars()
            .count()
            .cmp(&left.abbreviation.chars().count())
            .then_with(|| left.abbreviation.cmp(&right.abbreviation))
    });
}

/// Case-insensitive literal match that only anchors on word boundaries where
/// the literal itself begins or ends with a word character, so `s.t()` still
/// matches at the end of a sentence.
fn word_pattern(literal: &str) -> Result<Regex, regex::Error> {
    let mut pattern = String::from("(?i)");
    if literal.chars().next().is_some_and(is_word_char) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(literal));
    if literal.chars().next_back().is_some_and(is_word_char) {
        pattern.push_str(r"\b");
    }
    Regex::new(&pattern)
}

fn is_word_char(character: char) -> bool {
    character.is_alphanumeric() || character == '_'
}
