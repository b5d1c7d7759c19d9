pub mod ask;
pub mod check;
pub mod cite;
pub mod enhance;
pub mod filter;
pub mod registry;

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::cli::{FilterOptions, PreprocessOptions, RegistryOptions};
use crate::filter::{FilterConfig, validate_threshold};
use crate::preprocess::QueryPreprocessor;
use crate::registry::MetadataRegistry;

fn build_preprocessor(options: &PreprocessOptions) -> QueryPreprocessor {
    let mut preprocessor = QueryPreprocessor::new(options.max_query_length);
    for (abbreviation, expansion) in &options.abbreviations {
        if let Err(err) = preprocessor.add_custom_abbreviation(abbreviation, expansion) {
            warn!(
                abbreviation = %abbreviation,
                expansion = %expansion,
                error = %err,
                "ignoring custom abbreviation"
            );
        }
    }
    preprocessor
}

fn load_registry(options: &RegistryOptions) -> Result<Arc<MetadataRegistry>> {
    let registry = match &options.registry_path {
        Some(path) => MetadataRegistry::load(path)?,
        None => {
            info!("no metadata registry configured, citations use url templates only");
            MetadataRegistry::empty()
        }
    };
    Ok(Arc::new(registry))
}

fn filter_config(options: &FilterOptions) -> FilterConfig {
    let config = options.config();
    for (name, value) in [
        ("similarity_threshold", config.similarity_threshold),
        ("fallback_threshold", config.fallback_threshold),
    ] {
        if !validate_threshold(value) {
            warn!(name, value, "threshold outside [0, 1]");
        }
    }
    config
}
