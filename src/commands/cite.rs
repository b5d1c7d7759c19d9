use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::citation::{
    CitationMapper, CitationResolution, CitationTier, dedupe_by_primary_url, render_markdown,
};
use crate::cli::CiteArgs;
use crate::search::CandidateFile;
use crate::util::write_json_stdout;

use super::load_registry;

#[derive(Debug, Serialize)]
struct CiteReport {
    candidates: usize,
    registry_documents: usize,
    citations: Vec<CitationResolution>,
}

pub fn run(args: CiteArgs) -> Result<()> {
    let candidates = CandidateFile::new(&args.candidates_path).load()?;
    let mapper = CitationMapper::new(load_registry(&args.registry)?);

    let mut citations = mapper.map_all(&candidates);
    if args.dedupe_citations {
        citations = dedupe_by_primary_url(citations);
    }

    let count_tier = |tier: CitationTier| {
        citations
            .iter()
            .filter(|citation| citation.tier() == tier)
            .count()
    };
    info!(
        candidates = candidates.len(),
        citations = citations.len(),
        from_registry = count_tier(CitationTier::FromRegistry),
        from_pattern = count_tier(CitationTier::FromPattern),
        fallback = count_tier(CitationTier::Fallback),
        "candidates cited"
    );

    let report = CiteReport {
        candidates: candidates.len(),
        registry_documents: mapper.registry().len(),
        citations,
    };

    if args.json {
        return write_json_stdout(&report);
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    for (rank, citation) in report.citations.iter().enumerate() {
        writeln!(
            output,
            "{}.\t{}\t{}",
            rank + 1,
            citation.tier().as_str(),
            citation.entry().normalized_path
        )?;
    }
    write!(output, "{}", render_markdown(&report.citations))?;
    output.flush()?;
    Ok(())
}
