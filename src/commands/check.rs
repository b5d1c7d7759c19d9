use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::CheckArgs;
use crate::preprocess::{IntentCategory, QueryPreprocessor, QueryValidation};
use crate::util::write_json_stdout;

use super::build_preprocessor;

#[derive(Debug, Serialize)]
struct AbbreviationRow<'a> {
    abbreviation: &'a str,
    expansion: &'a str,
}

#[derive(Debug, Serialize)]
struct IntentRow<'a> {
    category: IntentCategory,
    enhancement: &'a str,
}

#[derive(Debug, Serialize)]
struct RuleListing<'a> {
    abbreviations: Vec<AbbreviationRow<'a>>,
    intents: Vec<IntentRow<'a>>,
}

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    #[serde(flatten)]
    validation: QueryValidation,
    #[serde(skip_serializing_if = "Option::is_none")]
    rules: Option<RuleListing<'a>>,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let preprocessor = build_preprocessor(&args.preprocess);
    let validation = preprocessor.validate(&args.query);

    if validation.valid {
        info!(
            potential_abbreviations = validation.potential_abbreviations.len(),
            "query accepted"
        );
    } else {
        warn!(
            error = %validation.error.as_deref().unwrap_or_default(),
            "query would be rejected"
        );
    }

    let report = CheckReport {
        validation,
        rules: args.list_rules.then(|| rule_listing(&preprocessor)),
    };

    if args.json {
        return write_json_stdout(&report);
    }
    write_text(&report)
}

fn rule_listing(preprocessor: &QueryPreprocessor) -> RuleListing<'_> {
    RuleListing {
        abbreviations: preprocessor
            .abbreviations()
            .into_iter()
            .map(|(abbreviation, expansion)| AbbreviationRow {
                abbreviation,
                expansion,
            })
            .collect(),
        intents: preprocessor
            .intents()
            .iter()
            .map(|rule| IntentRow {
                category: rule.category(),
                enhancement: rule.enhancement(),
            })
            .collect(),
    }
}

fn write_text(report: &CheckReport<'_>) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    let validation = &report.validation;

    writeln!(output, "Valid: {}", validation.valid)?;
    if let Some(error) = &validation.error {
        writeln!(output, "Error: {error}")?;
    }
    if !validation.potential_abbreviations.is_empty() {
        writeln!(
            output,
            "Abbreviations: {}",
            validation.potential_abbreviations.join(", ")
        )?;
    }
    for suggestion in &validation.suggestions {
        writeln!(output, "Suggestion: {suggestion}")?;
    }

    if let Some(rules) = &report.rules {
        writeln!(output, "Known abbreviations: {}", rules.abbreviations.len())?;
        for row in &rules.abbreviations {
            writeln!(output, "\t{}\t{}", row.abbreviation, row.expansion)?;
        }
        writeln!(output, "Intent order:")?;
        for (rank, row) in rules.intents.iter().enumerate() {
            writeln!(
                output,
                "\t{}. {}\t+ \"{}\"",
                rank + 1,
                row.category.as_str(),
                row.enhancement
            )?;
        }
    }

    output.flush()?;
    Ok(())
}
