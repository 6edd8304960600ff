//! Full-name parsing for the name-splitting classifier.

use super::transforms::title_case_name;

/// Honorifics dropped from the front of a name.
const TITLES: &[&str] = &[
    "mr", "mrs", "ms", "miss", "mx", "dr", "prof", "sir", "dame", "rev", "fr", "hon",
];

/// Generational and professional suffixes dropped from the end of a name.
const SUFFIXES: &[&str] = &[
    "jr", "sr", "ii", "iii", "iv", "phd", "md", "esq", "dds", "cpa", "mba", "jd",
];

/// Lowercase particles that belong to the family name ("van", "de", ...).
const PARTICLES: &[&str] = &[
    "van", "von", "de", "da", "das", "dos", "del", "della", "der", "den", "di", "du", "la",
    "le", "st", "bin", "ibn", "al", "ter", "ten",
];

/// First and last components of a person's full name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedName {
    pub first: String,
    pub last: String,
}

/// Parse a full name into title-cased first and last components.
///
/// Unparseable or empty input yields empty components.
pub fn parse_full_name(value: &str) -> ParsedName {
    let value = value.trim();
    if value.is_empty() {
        return ParsedName::default();
    }

    // "Last, First Middle" unless the part after the comma is only a suffix
    if let Some((left, right)) = value.split_once(',') {
        let right_tokens: Vec<&str> = right.split_whitespace().collect();
        // "Last," with nothing after the comma
        if right_tokens.is_empty() {
            let last_tokens = strip_affixes(left.split_whitespace().collect());
            return ParsedName {
                first: String::new(),
                last: title_case_name(&last_tokens.join(" ")),
            };
        }
        let suffix_only = right_tokens.iter().all(|t| is_in(t, SUFFIXES));
        if !suffix_only {
            let last_tokens = strip_affixes(left.split_whitespace().collect());
            let first_tokens = strip_affixes(right_tokens);
            return ParsedName {
                first: first_tokens.first().map(|t| title_case_name(t)).unwrap_or_default(),
                last: title_case_name(&last_tokens.join(" ")),
            };
        }
        return parse_ordered(left);
    }

    parse_ordered(value)
}

/// Parse "First Middle Last" ordering.
fn parse_ordered(value: &str) -> ParsedName {
    let tokens = strip_affixes(value.split_whitespace().collect());

    match tokens.len() {
        0 => ParsedName::default(),
        1 => ParsedName {
            first: title_case_name(tokens[0]),
            last: String::new(),
        },
        len => {
            let mut start = len - 1;
            while start > 1 && is_in(tokens[start - 1], PARTICLES) {
                start -= 1;
            }
            ParsedName {
                first: title_case_name(tokens[0]),
                last: title_case_name(&tokens[start..].join(" ")),
            }
        }
    }
}

fn strip_affixes(mut tokens: Vec<&str>) -> Vec<&str> {
    while tokens.len() > 1 && is_in(tokens[0], TITLES) {
        tokens.remove(0);
    }
    while tokens.len() > 1 && tokens.last().is_some_and(|t| is_in(t, SUFFIXES)) {
        tokens.pop();
    }
    tokens
}

fn is_in(token: &str, list: &[&str]) -> bool {
    let cleaned: String = token
        .chars()
        .filter(|c| *c != '.' && *c != ',')
        .collect::<String>()
        .to_lowercase();
    list.contains(&cleaned.as_str())
}
