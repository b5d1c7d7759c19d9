use std::io::{self, Write};

use anyhow::Result;

use crate::citation::{CitationMapper, dedupe_by_primary_url, inline_markers, render_markdown};
use crate::cli::AskArgs;
use crate::filter::RetrievalFilter;
use crate::pipeline::{Pipeline, PipelineOutput};
use crate::search::CandidateFile;
use crate::util::write_json_stdout;

use super::{build_preprocessor, filter_config, load_registry};

pub fn run(args: AskArgs) -> Result<()> {
    let pipeline = Pipeline::new(
        build_preprocessor(&args.preprocess),
        RetrievalFilter::new(filter_config(&args.filter)),
        CitationMapper::new(load_registry(&args.registry)?),
    );
    let backend = CandidateFile::new(&args.candidates_path);

    let mut output = pipeline.run(&args.query, &backend)?;
    if args.dedupe_citations {
        output.citations = dedupe_by_primary_url(output.citations);
    }

    if args.json {
        return write_json_stdout(&output);
    }
    write_text(&output)
}

fn write_text(output: &PipelineOutput) -> Result<()> {
    let mut writer = io::BufWriter::new(io::stdout().lock());
    let metadata = &output.filter.metadata;

    writeln!(writer, "Query: {}", output.transformation.original)?;
    writeln!(writer, "Enhanced: {}", output.transformation.enhanced)?;
    if let Some(rejection) = &output.transformation.rejection {
        writeln!(writer, "Rejected: {rejection}")?;
    }
    writeln!(
        writer,
        "Retrieval: kept={} of {} threshold={} fallback_used={}",
        metadata.filtered_count,
        metadata.original_count,
        metadata.threshold_used,
        metadata.fallback_used,
    )?;

    for (rank, passage) in output.context_passages().iter().enumerate() {
        writeln!(writer)?;
        writeln!(writer, "[{}] {}", rank + 1, passage.trim())?;
    }

    if !output.citations.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Markers: {}", inline_markers(output.citations.len()))?;
        write!(writer, "{}", render_markdown(&output.citations))?;
    }

    writer.flush()?;
    Ok(())
}
