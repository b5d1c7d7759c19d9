use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::cli::FilterArgs;
use crate::filter::{FilterResult, RetrievalFilter, ScoreDistribution, score_distribution};
use crate::search::CandidateFile;
use crate::util::write_json_stdout;

use super::filter_config;

#[derive(Debug, Serialize)]
struct FilterReport {
    distribution_before: ScoreDistribution,
    distribution_after: ScoreDistribution,
    #[serde(flatten)]
    result: FilterResult,
}

pub fn run(args: FilterArgs) -> Result<()> {
    let candidates = CandidateFile::new(&args.candidates_path).load()?;
    let filter = RetrievalFilter::new(filter_config(&args.filter));
    let result = filter.filter(&candidates);

    info!(
        path = %args.candidates_path.display(),
        data_quality_warnings = result.metadata.data_quality_warnings.len(),
        "candidate file filtered"
    );

    let report = FilterReport {
        distribution_before: score_distribution(&candidates),
        distribution_after: score_distribution(&result.candidates),
        result,
    };

    if args.json {
        return write_json_stdout(&report);
    }
    write_text(&report)
}

fn write_text(report: &FilterReport) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    let metadata = &report.result.metadata;

    writeln!(
        output,
        "Kept {} of {} (threshold={} fallback_used={} filtered_out={})",
        metadata.filtered_count,
        metadata.original_count,
        metadata.threshold_used,
        metadata.fallback_used,
        metadata.filtered_out,
    )?;
    writeln!(
        output,
        "Average score: before={:.3} after={:.3}",
        metadata.avg_score_before, metadata.avg_score_after
    )?;
    let before = &report.distribution_before;
    writeln!(
        output,
        "Distribution: min={:.3} max={:.3} mean={:.3} median={:.3} count={}",
        before.min, before.max, before.mean, before.median, before.count
    )?;

    for (rank, candidate) in report.result.candidates.iter().enumerate() {
        writeln!(
            output,
            "{}.\tscore={:.3}\t{}",
            rank + 1,
            candidate.effective_score(),
            candidate
                .location
                .as_deref()
                .or(candidate.source_path.as_deref())
                .unwrap_or("(no location)")
        )?;
    }

    output.flush()?;
    Ok(())
}
