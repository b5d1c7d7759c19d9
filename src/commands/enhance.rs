use std::io::{self, Write};

use anyhow::Result;
use tracing::info;

use crate::cli::EnhanceArgs;
use crate::preprocess::{QueryChange, QueryTransformation};
use crate::util::write_json_stdout;

use super::build_preprocessor;

pub fn run(args: EnhanceArgs) -> Result<()> {
    let preprocessor = build_preprocessor(&args.preprocess);
    let (_, transformation) = preprocessor.preprocess(&args.query);

    info!(
        was_modified = transformation.was_modified,
        abbreviation_expansions = transformation.abbreviation_expansions,
        contextual_enhancements = transformation.contextual_enhancements,
        "query enhanced"
    );

    if args.json {
        return write_json_stdout(&transformation);
    }
    write_text(&transformation)
}

fn write_text(transformation: &QueryTransformation) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "Original: {}", transformation.original)?;
    writeln!(output, "Enhanced: {}", transformation.enhanced)?;
    if let Some(rejection) = &transformation.rejection {
        writeln!(output, "Rejected: {rejection}")?;
    }
    writeln!(output, "Changes: {}", transformation.changes.len())?;

    for change in &transformation.changes {
        match change {
            QueryChange::Abbreviation {
                original,
                replacement,
                position,
            } => writeln!(output, "\tabbreviation\t{original} -> {replacement}\tat {position}")?,
            QueryChange::Context {
                category,
                enhancement,
                pattern,
            } => writeln!(
                output,
                "\tcontext\t{}\t+ \"{enhancement}\"\tmatched {pattern}",
                category.as_str()
            )?,
        }
    }

    output.flush()?;
    Ok(())
}
