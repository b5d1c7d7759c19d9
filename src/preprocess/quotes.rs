use std::ops::Range;

/// Byte ranges of balanced quoted spans, quote characters included.
///
/// Straight and curly double quotes pair freely. A straight single quote only
/// opens at the start of a word and only closes when not followed by a
/// letter or digit, so apostrophes in "don't" or "user's" never open a span.
/// An opening quote with no partner is treated as ordinary text.
pub(super) fn quoted_spans(text: &str) -> Vec<Range<usize>> {
    let characters = text.char_indices().collect::<Vec<(usize, char)>>();
    let mut spans = Vec::new();
    let mut open: Option<(char, usize)> = None;

    for (position, &(offset, character)) in characters.iter().enumerate() {
        let previous = position
            .checked_sub(1)
            .map(|index| characters[index].1);
        let next = characters.get(position + 1).map(|(_, value)| *value);

        match open {
            Some((closing, start)) if character == closing => {
                if closing == '\'' && next.is_some_and(char::is_alphanumeric) {
                    continue;
                }
                spans.push(start..offset + character.len_utf8());
                open = None;
            }
            Some(_) => {}
            None => {
                open = match character {
                    '"' => Some(('"', offset)),
                    '\u{201C}' => Some(('\u{201D}', offset)),
                    '\u{2018}' => Some(('\u{2019}', offset)),
                    '\'' if previous.is_none_or(|value| value.is_whitespace() || value == '(') => {
                        Some(('\'', offset))
                    }
                    _ => None,
                };
            }
        }
    }

    spans
}

pub(super) fn overlaps(left: &Range<usize>, right: &Range<usize>) -> bool {
    left.start < right.end && right.start < left.end
}

pub(super) fn contains(outer: &Range<usize>, inner: &Range<usize>) -> bool {
    outer.start <= inner.start && inner.end <= outer.end
}
