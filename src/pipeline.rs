use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::citation::{CitationMapper, CitationResolution};
use crate::filter::{FilterResult, RetrievalFilter};
use crate::preprocess::{QueryPreprocessor, QueryTransformation};
use crate::search::SearchBackend;

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub transformation: QueryTransformation,
    pub filter: FilterResult,
    pub citations: Vec<CitationResolution>,
}

impl PipelineOutput {
    pub fn context_passages(&self) -> Vec<&str> {
        self.filter
            .candidates
            .iter()
            .map(|candidate| candidate.text.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    preprocessor: QueryPreprocessor,
    filter: RetrievalFilter,
    mapper: CitationMapper,
}

impl Pipeline {
    pub fn new(
        preprocessor: QueryPreprocessor,
        filter: RetrievalFilter,
        mapper: CitationMapper,
    ) -> Self {
        Self {
            preprocessor,
            filter,
            mapper,
        }
    }

    pub fn search_limit(&self) -> usize {
        self.filter.config().max_results.saturating_mul(2)
    }

    pub fn run(&self, query: &str, backend: &dyn SearchBackend) -> Result<PipelineOutput> {
        let (enhanced, transformation) = self.preprocessor.preprocess(query);

        let candidates = match &transformation.rejection {
            Some(rejection) => {
                warn!(reason = %rejection, "query rejected, skipping search");
                Vec::new()
            }
            None => backend
                .search(&enhanced, self.search_limit())
                .context("search backend failed")?,
        };

        let filter = self.filter.filter(&candidates);
        let citations = self.mapper.map_all(&filter.candidates);

        info!(
            was_modified = transformation.was_modified,
            retrieved = candidates.len(),
            filtered_count = filter.metadata.filtered_count,
            fallback_used = filter.metadata.fallback_used,
            citations = citations.len(),
            "pipeline finished"
        );

        Ok(PipelineOutput {
            transformation,
            filter,
            citations,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io::Write;
    use std::sync::Arc;

    use anyhow::bail;
    use serde_json::json;

    use super::*;
    use crate::citation::CitationTier;
    use crate::filter::FilterConfig;
    use crate::model::RetrievedCandidate;
    use crate::registry::{MetadataRegistry, RegistryEntry};
    use crate::search::CandidateFile;

    struct RecordingBackend {
        results: Vec<RetrievedCandidate>,
        calls: RefCell<Vec<(String, usize)>>,
    }

    impl RecordingBackend {
        fn new(scores: &[f64]) -> Self {
            let results = scores
                .iter()
                .enumerate()
                .map(|(index, score)| {
                    RetrievedCandidate::new(
                        format!("passage {index}"),
                        *score,
                        format!("s3://kb/adobe-docs/customer-journey-analytics/help/cja-main/doc-{index}.md"),
                    )
                })
                .collect();
            Self {
                results,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl SearchBackend for RecordingBackend {
        fn search(&self, query: &str, limit_hint: usize) -> Result<Vec<RetrievedCandidate>> {
            self.calls
                .borrow_mut()
                .push((query.to_string(), limit_hint));
            Ok(self.results.clone())
        }
    }

    struct FailingBackend;

    impl SearchBackend for FailingBackend {
        fn search(&self, _query: &str, _limit_hint: usize) -> Result<Vec<RetrievedCandidate>> {
            bail!("connection refused")
        }
    }

    #[test]
    fn run_searches_with_enhanced_query_and_doubled_hint() {
        let backend = RecordingBackend::new(&[0.92, 0.78, 0.65, 0.62, 0.58, 0.51]);
        let pipeline = Pipeline::default();

        let output = pipeline
            .run("how to create cja segment", &backend)
            .expect("pipeline should run");

        let calls = backend.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.contains("Customer Journey Analytics"));
        assert_eq!(calls[0].1, 16);

        assert_eq!(output.filter.metadata.filtered_count, 4);
        assert_eq!(output.citations.len(), 4);
        assert!(
            output
                .citations
                .iter()
                .all(|citation| citation.tier() == CitationTier::FromPattern)
        );
        assert_eq!(
            output.context_passages(),
            vec!["passage 0", "passage 1", "passage 2", "passage 3"]
        );
    }

    #[test]
    fn rejected_query_skips_search() {
        let backend = RecordingBackend::new(&[0.9]);

        let output = Pipeline::default()
            .run("   ", &backend)
            .expect("pipeline should run");

        assert!(backend.calls.borrow().is_empty());
        assert!(output.transformation.rejection.is_some());
        assert!(output.filter.candidates.is_empty());
        assert!(output.citations.is_empty());
    }

    #[test]
    fn backend_failure_is_reported_with_context() {
        let err = Pipeline::default()
            .run("segment builder", &FailingBackend)
            .expect_err("search failure should propagate");

        assert_eq!(err.to_string(), "search backend failed");
        assert!(err.chain().any(|cause| cause.to_string() == "connection refused"));
    }

    #[test]
    fn search_limit_follows_max_results() {
        let pipeline = Pipeline::new(
            QueryPreprocessor::default(),
            RetrievalFilter::new(FilterConfig {
                max_results: 5,
                ..FilterConfig::default()
            }),
            CitationMapper::default(),
        );

        assert_eq!(pipeline.search_limit(), 10);
    }

    #[test]
    fn run_over_candidate_file_uses_registry() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let body = json!({
            "retrievalResults": [
                {
                    "content": {"text": "# Data views\nConfigure components."},
                    "location": {"s3Location": {"uri": "s3://kb/adobe-docs/customer-journey-analytics/help/cja-main/data-views/data-views.md"}},
                    "score": 0.71
                },
                {
                    "content": {"text": "Unrelated."},
                    "location": {"s3Location": {"uri": "s3://kb/aep/help/home.md"}},
                    "score": "0.2"
                }
            ]
        });
        write!(file, "{body}").expect("write candidates");

        let registry = MetadataRegistry::from_entries([(
            "adobe-docs/customer-journey-analytics/help/cja-main/data-views/data-views.md",
            RegistryEntry {
                title: "Data views overview".to_string(),
                description: String::new(),
                product: Some("Customer Journey Analytics".to_string()),
                doc_type: None,
                role: None,
                level: None,
                canonical_url: "https://experienceleague.adobe.com/en/docs/analytics-platform/using/cja-dataviews/data-views".to_string(),
                backup_url: None,
                last_modified: None,
            },
        )]);
        let pipeline = Pipeline::new(
            QueryPreprocessor::default(),
            RetrievalFilter::default(),
            CitationMapper::new(Arc::new(registry)),
        );

        let output = pipeline
            .run("what is a data view", &CandidateFile::new(file.path()))
            .expect("pipeline should run");

        assert_eq!(output.filter.candidates.len(), 1);
        assert_eq!(output.citations.len(), 1);
        assert_eq!(output.citations[0].tier(), CitationTier::FromRegistry);
        assert_eq!(output.citations[0].entry().title, "Data views overview");
    }
}
