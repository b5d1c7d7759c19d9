mod path;
mod render;
mod routes;
mod title;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::model::RetrievedCandidate;
use crate::registry::MetadataRegistry;

pub use self::path::{DocumentPath, normalize_path};
pub use self::render::{dedupe_by_primary_url, inline_markers, render_markdown};
pub use self::routes::{DEFAULT_DOCS_URL, DEFAULT_SOURCE_URL, match_route};
pub use self::title::{DEFAULT_TITLE, heading_from_content, humanize_file_stem};

use self::routes::source_url_for;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitationEntry {
    pub title: String,
    pub primary_url: String,
    pub secondary_url: String,
    pub relevance_score: f64,
    pub normalized_path: String,
    pub product: Option<String>,
    pub description: Option<String>,
}

impl CitationEntry {
    pub fn relevance_percent(&self) -> u32 {
        (self.relevance_score.clamp(0.0, 1.0) * 100.0).round() as u32
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationTier {
    FromRegistry,
    FromPattern,
    Fallback,
}

impl CitationTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FromRegistry => "registry",
            Self::FromPattern => "pattern",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tier", content = "citation", rename_all = "snake_case")]
pub enum CitationResolution {
    FromRegistry(CitationEntry),
    FromPattern(CitationEntry),
    Fallback(CitationEntry),
}

impl CitationResolution {
    pub fn tier(&self) -> CitationTier {
        match self {
            Self::FromRegistry(_) => CitationTier::FromRegistry,
            Self::FromPattern(_) => CitationTier::FromPattern,
            Self::Fallback(_) => CitationTier::Fallback,
        }
    }

    pub fn entry(&self) -> &CitationEntry {
        match self {
            Self::FromRegistry(entry) | Self::FromPattern(entry) | Self::Fallback(entry) => entry,
        }
    }

    pub fn is_low_confidence(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

#[derive(Debug, Clone)]
pub struct CitationMapper {
    registry: Arc<MetadataRegistry>,
}

impl Default for CitationMapper {
    fn default() -> Self {
        Self::new(Arc::new(MetadataRegistry::empty()))
    }
}

impl CitationMapper {
    pub fn new(registry: Arc<MetadataRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &MetadataRegistry {
        &self.registry
    }

    pub fn map_all(&self, candidates: &[RetrievedCandidate]) -> Vec<CitationResolution> {
        candidates
            .iter()
            .map(|candidate| self.map(candidate))
            .collect()
    }

    pub fn map(&self, candidate: &RetrievedCandidate) -> CitationResolution {
        let relevance_score = candidate.effective_score();
        let path = candidate
            .location
            .as_deref()
            .and_then(normalize_path)
            .or_else(|| candidate.source_path.as_deref().and_then(normalize_path));

        let Some(path) = path else {
            warn!(
                text_len = candidate.text.len(),
                "candidate has no usable source path, citing generic documentation"
            );
            return CitationResolution::Fallback(CitationEntry {
                title: resolve_title(candidate, None),
                primary_url: DEFAULT_DOCS_URL.to_string(),
                secondary_url: DEFAULT_SOURCE_URL.to_string(),
                relevance_score,
                normalized_path: String::new(),
                product: None,
                description: None,
            });
        };

        if let Some(entry) = self.registry.get(path.normalized()) {
            debug!(path = %path.normalized(), "citation resolved from registry");
            let secondary_url = entry
                .backup_url
                .as_deref()
                .filter(|url| is_absolute_url(url))
                .map(ToOwned::to_owned)
                .unwrap_or_else(|| source_url_for(&path));

            return CitationResolution::FromRegistry(CitationEntry {
                title: entry.title.clone(),
                primary_url: entry.canonical_url.clone(),
                secondary_url,
                relevance_score,
                normalized_path: path.normalized().to_string(),
                product: entry.product.clone(),
                description: Some(entry.description.clone()).filter(|value| !value.is_empty()),
            });
        }

        let title = resolve_title(candidate, Some(&path));
        let secondary_url = source_url_for(&path);

        match match_route(path.normalized()) {
            Some(matched) => {
                let primary_url = matched.docs_url();
                debug!(
                    path = %path.normalized(),
                    product = matched.route.product,
                    url = %primary_url,
                    "citation resolved from url template"
                );
                CitationResolution::FromPattern(CitationEntry {
                    title,
                    primary_url,
                    secondary_url,
                    relevance_score,
                    normalized_path: path.normalized().to_string(),
                    product: Some(matched.route.product.to_string()),
                    description: None,
                })
            }
            None => {
                warn!(
                    path = %path.normalized(),
                    "unrecognized path prefix, citing generic documentation"
                );
                CitationResolution::Fallback(CitationEntry {
                    title,
                    primary_url: DEFAULT_DOCS_URL.to_string(),
                    secondary_url,
                    relevance_score,
                    normalized_path: path.normalized().to_string(),
                    product: None,
                    description: None,
                })
            }
        }
    }
}

fn resolve_title(candidate: &RetrievedCandidate, path: Option<&DocumentPath>) -> String {
    candidate
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(ToOwned::to_owned)
        .or_else(|| heading_from_content(&candidate.text))
        .or_else(|| path.and_then(|path| humanize_file_stem(path.file_stem())))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

pub fn is_absolute_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}
