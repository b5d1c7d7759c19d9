use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::filter::{
    DEFAULT_FALLBACK_THRESHOLD, DEFAULT_MAX_RESULTS, DEFAULT_MIN_RESULTS,
    DEFAULT_SIMILARITY_THRESHOLD, FilterConfig,
};
use crate::preprocess::DEFAULT_MAX_QUERY_LENGTH;

#[derive(Parser, Debug)]
#[command(
    name = "docrag",
    version,
    about = "Query rewriting, retrieval filtering and citation mapping for documentation search"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Expand abbreviations and add intent context to a query.
    Enhance(EnhanceArgs),
    /// Report whether a query would be accepted, with suggestions.
    Check(CheckArgs),
    /// Apply similarity thresholds to a ranked candidate file.
    Filter(FilterArgs),
    /// Map every candidate in a file to a citation.
    Cite(CiteArgs),
    /// Run preprocess, search, filter and cite for one query.
    Ask(AskArgs),
    /// Load a metadata registry artifact and report its statistics.
    Registry(RegistryArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PreprocessOptions {
    #[arg(long, env = "MAX_QUERY_LENGTH", default_value_t = DEFAULT_MAX_QUERY_LENGTH)]
    pub max_query_length: usize,

    /// Extra abbreviation as KEY=EXPANSION; repeatable.
    #[arg(long = "abbreviation", value_name = "KEY=EXPANSION", value_parser = parse_abbreviation)]
    pub abbreviations: Vec<(String, String)>,
}

#[derive(Args, Debug, Clone)]
pub struct FilterOptions {
    #[arg(long, env = "SIMILARITY_THRESHOLD", default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
    pub similarity_threshold: f64,

    #[arg(long, env = "FALLBACK_THRESHOLD", default_value_t = DEFAULT_FALLBACK_THRESHOLD)]
    pub fallback_threshold: f64,

    #[arg(long, env = "MIN_RETRIEVAL_RESULTS", default_value_t = DEFAULT_MIN_RESULTS)]
    pub min_results: usize,

    #[arg(long, env = "MAX_RETRIEVAL_RESULTS", default_value_t = DEFAULT_MAX_RESULTS)]
    pub max_results: usize,
}

impl FilterOptions {
    pub fn config(&self) -> FilterConfig {
        FilterConfig {
            similarity_threshold: self.similarity_threshold,
            fallback_threshold: self.fallback_threshold,
            min_results: self.min_results,
            max_results: self.max_results,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RegistryOptions {
    #[arg(long, env = "METADATA_REGISTRY_PATH")]
    pub registry_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct EnhanceArgs {
    #[arg(long)]
    pub query: String,

    #[command(flatten)]
    pub preprocess: PreprocessOptions,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[arg(long)]
    pub query: String,

    #[command(flatten)]
    pub preprocess: PreprocessOptions,

    /// Also print the abbreviation table and intent categories in the
    /// order they are tried.
    #[arg(long, default_value_t = false)]
    pub list_rules: bool,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    #[arg(long)]
    pub candidates_path: PathBuf,

    #[command(flatten)]
    pub filter: FilterOptions,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CiteArgs {
    #[arg(long)]
    pub candidates_path: PathBuf,

    #[command(flatten)]
    pub registry: RegistryOptions,

    #[arg(long, default_value_t = false)]
    pub dedupe_citations: bool,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    #[arg(long)]
    pub query: String,

    #[arg(long)]
    pub candidates_path: PathBuf,

    #[command(flatten)]
    pub preprocess: PreprocessOptions,

    #[command(flatten)]
    pub filter: FilterOptions,

    #[command(flatten)]
    pub registry: RegistryOptions,

    #[arg(long, default_value_t = false)]
    pub dedupe_citations: bool,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RegistryArgs {
    #[arg(long, env = "METADATA_REGISTRY_PATH")]
    pub registry_path: PathBuf,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

fn parse_abbreviation(raw: &str) -> Result<(String, String), String> {
    let (abbreviation, expansion) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=EXPANSION, got '{raw}'"))?;
    let abbreviation = abbreviation.trim();
    let expansion = expansion.trim();
    if abbreviation.is_empty() || expansion.is_empty() {
        return Err(format!("abbreviation and expansion must be non-empty: '{raw}'"));
    }

    Ok((abbreviation.to_string(), expansion.to_string()))
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parse_abbreviation_splits_on_first_equals() {
        assert_eq!(
            parse_abbreviation(" rt = real-time = live "),
            Ok(("rt".to_string(), "real-time = live".to_string()))
        );
        assert!(parse_abbreviation("rt").is_err());
        assert!(parse_abbreviation("=real-time").is_err());
        assert!(parse_abbreviation("rt=  ").is_err());
    }

    #[test]
    fn ask_accepts_repeated_abbreviations_and_filter_flags() {
        let cli = Cli::try_parse_from([
            "docrag",
            "ask",
            "--query",
            "rt cja report",
            "--candidates-path",
            "results.json",
            "--abbreviation",
            "rt=real-time",
            "--abbreviation",
            "kb=knowledge base",
            "--similarity-threshold",
            "0.7",
            "--max-results",
            "4",
            "--dedupe-citations",
        ])
        .expect("arguments should parse");

        let Commands::Ask(args) = cli.command else {
            panic!("expected ask command");
        };
        assert_eq!(args.preprocess.abbreviations.len(), 2);
        assert_eq!(args.preprocess.abbreviations[1].1, "knowledge base");
        let config = args.filter.config();
        assert_eq!(config.similarity_threshold, 0.7);
        assert_eq!(config.max_results, 4);
        assert!(args.dedupe_citations);
        assert!(!args.json);
    }
}
