use std::borrow::Cow;

const MAX_EXTENSION_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPath {
    normalized: String,
    extension: Option<String>,
}

impl DocumentPath {
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    pub fn file_stem(&self) -> &str {
        self.normalized
            .rsplit('/')
            .next()
            .unwrap_or(&self.normalized)
    }
}

pub fn normalize_path(raw: &str) -> Option<DocumentPath> {
    let trimmed = raw.trim();
    let without_scheme = match trimmed.split_once("://") {
        Some((scheme, rest)) if is_scheme(scheme) => rest.split_once('/')?.1,
        _ => trimmed,
    };

    let without_query = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let decoded = urlencoding::decode(without_query).unwrap_or(Cow::Borrowed(without_query));

    let mut segments = decoded
        .split(['/', '\\'])
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .map(ToOwned::to_owned)
        .collect::<Vec<String>>();

    let last = segments.pop()?;
    let (stem, extension) = split_extension(&last);
    let extension = extension.map(ToOwned::to_owned);
    segments.push(stem.to_string());

    Some(DocumentPath {
        normalized: segments.join("/"),
        extension,
    })
}

fn is_scheme(value: &str) -> bool {
    value
        .chars()
        .next()
        .is_some_and(|character| character.is_ascii_alphabetic())
        && value
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || matches!(character, '+' | '-' | '.'))
}

/// Only a short alphanumeric suffix starting with a letter counts, so
/// version-like names such as `release-2.1` keep their dot.
fn split_extension(segment: &str) -> (&str, Option<&str>) {
    match segment.rsplit_once('.') {
        Some((stem, extension))
            if stem.chars().any(|character| character != '.')
                && extension.len() <= MAX_EXTENSION_LEN
                && extension
                    .chars()
                    .next()
                    .is_some_and(|character| character.is_ascii_alphabetic())
                && extension
                    .chars()
                    .all(|character| character.is_ascii_alphanumeric()) =>
        {
            (stem, Some(extension))
        }
        _ => (segment, None),
    }
}
