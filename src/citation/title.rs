pub const DEFAULT_TITLE: &str = "Adobe Documentation";

const ACRONYMS: &[(&str, &str)] = &[
    ("Aa", "AA"),
    ("Aep", "AEP"),
    ("Api", "API"),
    ("Apis", "APIs"),
    ("Cdp", "CDP"),
    ("Cja", "CJA"),
    ("Evar", "eVar"),
    ("Faq", "FAQ"),
    ("Id", "ID"),
    ("Ids", "IDs"),
    ("Rtcdp", "RTCDP"),
    ("Sdk", "SDK"),
    ("Ui", "UI"),
    ("Url", "URL"),
    ("Xdm", "XDM"),
];

pub fn heading_from_content(content: &str) -> Option<String> {
    let mut lines = content.lines();
    let mut in_front_matter = content
        .lines()
        .next()
        .is_some_and(|first| first.trim_end() == "---");
    if in_front_matter {
        lines.next();
    }

    for line in lines {
        if in_front_matter {
            if line.trim_end() == "---" {
                in_front_matter = false;
            }
            continue;
        }

        let Some(rest) = line.strip_prefix('#') else {
            continue;
        };
        if !rest.starts_with(char::is_whitespace) {
            continue;
        }

        let heading = rest.trim();
        if !heading.is_empty() {
            return Some(heading.to_string());
        }
    }

    None
}

pub fn humanize_file_stem(stem: &str) -> Option<String> {
    let words = stem
        .split(|character: char| matches!(character, '-' | '_') || character.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(title_case_word)
        .collect::<Vec<String>>();

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn title_case_word(word: &str) -> String {
    let mut characters = word.chars();
    let cased = match characters.next() {
        Some(first) => first
            .to_uppercase()
            .chain(characters.flat_map(char::to_lowercase))
            .collect::<String>(),
        None => String::new(),
    };

    ACRONYMS
        .iter()
        .find(|(plain, _)| *plain == cased)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(cased)
}
