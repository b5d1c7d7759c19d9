use std::collections::HashSet;

use super::CitationResolution;

pub fn dedupe_by_primary_url(citations: Vec<CitationResolution>) -> Vec<CitationResolution> {
    let mut seen = HashSet::<String>::new();
    citations
        .into_iter()
        .filter(|citation| seen.insert(citation.entry().primary_url.clone()))
        .collect()
}

pub fn inline_markers(count: usize) -> String {
    (1..=count)
        .map(|number| format!("[{number}]"))
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn render_markdown(citations: &[CitationResolution]) -> String {
    let mut out = String::new();
    if citations.is_empty() {
        return out;
    }

    out.push_str("**Sources:**\n");
    for (index, citation) in citations.iter().enumerate() {
        let entry = citation.entry();
        out.push_str(&format!(
            "{}. [{}]({}) ({}% relevant)",
            index + 1,
            escape_link_text(&entry.title),
            link_destination(&entry.primary_url),
            entry.relevance_percent()
        ));
        if citation.is_low_confidence() {
            out.push_str(" *(unverified link)*");
        }
        if entry.secondary_url != entry.primary_url {
            out.push_str(&format!(
                " · [source]({})",
                link_destination(&entry.secondary_url)
            ));
        }
        out.push('\n');
    }
    out
}

fn escape_link_text(title: &str) -> String {
    title.replace('[', "\\[").replace(']', "\\]")
}

// Parentheses are legal in a URL path but end a markdown link destination.
fn link_destination(url: &str) -> String {
    url.replace('(', "%28").replace(')', "%29")
}
