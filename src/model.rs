use anyhow::{Result, bail};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedCandidate {
    pub text: String,
    pub score: Option<f64>,
    pub location: Option<String>,
    pub source_path: Option<String>,
    pub title: Option<String>,
}

impl RetrievedCandidate {
    pub fn new(text: impl Into<String>, score: f64, location: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            score: Some(score),
            location: Some(location.into()),
            source_path: None,
            title: None,
        }
    }

    pub fn effective_score(&self) -> f64 {
        self.score.filter(|score| score.is_finite()).unwrap_or(0.0)
    }
}

const LOCATION_POINTERS: [&str; 5] = [
    "/location/s3Location/uri",
    "/location",
    "/uri",
    "/metadata/x-amz-bedrock-kb-source-uri",
    "/source",
];

pub fn candidate_from_value(value: &Value) -> RetrievedCandidate {
    let text = non_empty_str(value, "/content/text")
        .or_else(|| non_empty_str(value, "/content"))
        .or_else(|| non_empty_str(value, "/text"))
        .unwrap_or_default();

    let location = LOCATION_POINTERS
        .iter()
        .find_map(|pointer| non_empty_str(value, pointer));

    RetrievedCandidate {
        text,
        score: value.get("score").and_then(parse_score),
        location,
        source_path: non_empty_str(value, "/source_path")
            .or_else(|| non_empty_str(value, "/metadata/source_path")),
        title: non_empty_str(value, "/title").or_else(|| non_empty_str(value, "/metadata/title")),
    }
}

pub fn candidates_from_value(value: &Value) -> Result<Vec<RetrievedCandidate>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(object) => match ["retrievalResults", "results", "candidates"]
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_array))
        {
            Some(items) => items,
            None => bail!("candidate document has no results array"),
        },
        _ => bail!("candidate document must be a json array or object"),
    };

    Ok(items.iter().map(candidate_from_value).collect())
}

fn parse_score(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn non_empty_str(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn candidate_from_bedrock_result_reads_nested_location() {
        let value = json!({
            "content": {"text": "Segments let you isolate visitors."},
            "score": 0.82,
            "location": {"s3Location": {"uri": "s3://bucket/aep/segmentation/home.md"}}
        });

        let candidate = candidate_from_value(&value);
        assert_eq!(candidate.text, "Segments let you isolate visitors.");
        assert_eq!(candidate.score, Some(0.82));
        assert_eq!(
            candidate.location.as_deref(),
            Some("s3://bucket/aep/segmentation/home.md")
        );
        assert!(candidate.title.is_none());
    }

    #[test]
    fn candidate_from_value_falls_back_through_location_fields() {
        let value = json!({
            "text": "body",
            "score": "0.4",
            "metadata": {
                "x-amz-bedrock-kb-source-uri": "s3://bucket/adobe-docs/adobe-analytics/help/home.md",
                "title": "Analytics home"
            }
        });

        let candidate = candidate_from_value(&value);
        assert_eq!(candidate.score, Some(0.4));
        assert_eq!(
            candidate.location.as_deref(),
            Some("s3://bucket/adobe-docs/adobe-analytics/help/home.md")
        );
        assert_eq!(candidate.title.as_deref(), Some("Analytics home"));
    }

    #[test]
    fn unparsable_score_is_left_missing() {
        let candidate = candidate_from_value(&json!({"text": "x", "score": "high"}));
        assert_eq!(candidate.score, None);
        assert_eq!(candidate.effective_score(), 0.0);
        assert!(candidate.location.is_none());
    }

    #[test]
    fn candidates_from_search_response_envelope() {
        let value = json!({
            "retrievalResults": [
                {"text": "a", "score": 0.9, "uri": "s3://bucket/aep/a.md"},
                {"text": "b", "score": 0.7, "source_path": "aep/b.md"}
            ]
        });

        let candidates = candidates_from_value(&value).expect("envelope should parse");
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].source_path.as_deref(), Some("aep/b.md"));
    }

    #[test]
    fn candidates_from_scalar_is_rejected() {
        assert!(candidates_from_value(&json!(42)).is_err());
        assert!(candidates_from_value(&json!({"other": []})).is_err());
    }
}
