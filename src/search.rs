use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use crate::model::{RetrievedCandidate, candidates_from_value};
use crate::util::read_json_file;

pub trait SearchBackend {
    fn search(&self, query: &str, limit_hint: usize) -> Result<Vec<RetrievedCandidate>>;
}

#[derive(Debug, Clone)]
pub struct CandidateFile {
    path: PathBuf,
}

impl CandidateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Vec<RetrievedCandidate>> {
        let value = read_json_file(&self.path)?;
        candidates_from_value(&value)
            .with_context(|| format!("invalid candidate file: {}", self.path.display()))
    }
}

impl SearchBackend for CandidateFile {
    fn search(&self, query: &str, limit_hint: usize) -> Result<Vec<RetrievedCandidate>> {
        let mut candidates = self.load()?;
        debug!(
            path = %self.path.display(),
            query_len = query.len(),
            available = candidates.len(),
            limit_hint,
            "replaying candidate file"
        );
        candidates.truncate(limit_hint);
        Ok(candidates)
    }
}
