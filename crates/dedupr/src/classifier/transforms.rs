//! Value normalizers shared by the classifier variants.
//!
//! Every function here is total and idempotent: bad input falls back to the
//! trimmed original instead of failing, and normalizing an already
//! normalized value returns it unchanged.

use once_cell::sync::Lazy;
use phonenumber::country;
use phonenumber::Mode;
use regex::Regex;
use url::Url;

/// Characters a value may contain to be handed to the phone parser.
static PHONE_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9+()\-./\s]*(?:(?:ext\.?|x|#)\s*[0-9]+)?$").expect("valid phone regex")
});

/// Legal entity suffixes, compared after removing dots and lowercasing.
const LEGAL_SUFFIXES: &[&str] = &[
    "inc",
    "incorporated",
    "llc",
    "llp",
    "lp",
    "ltd",
    "limited",
    "corp",
    "corporation",
    "co",
    "company",
    "plc",
    "gmbh",
    "ag",
    "sa",
    "sas",
    "sarl",
    "srl",
    "spa",
    "bv",
    "nv",
    "oy",
    "ab",
    "as",
    "pty",
    "pte",
    "kk",
];

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Title-case a name: first letter of each alphabetic run upper, rest lower.
///
/// Characters whose case mapping expands into several characters (such as
/// `ß`) are kept as they are so the result stays stable on re-application.
pub fn title_case_name(value: &str) -> String {
    let collapsed = collapse_whitespace(value);
    let mut out = String::with_capacity(collapsed.len());
    let mut prev_alpha = false;

    for c in collapsed.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                push_single_mapping(&mut out, c, c.to_lowercase());
            } else {
                push_single_mapping(&mut out, c, c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }

    out
}

fn push_single_mapping(out: &mut String, original: char, mut mapped: impl Iterator<Item = char>) {
    match (mapped.next(), mapped.next()) {
        (Some(single), None) => out.push(single),
        _ => out.push(original),
    }
}

/// Lowercase and trim an email address.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Format a phone number as E.164, or return the trimmed input.
pub fn normalize_phone(value: &str, default_region: country::Id) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty()
        || trimmed.len() > 40
        || !trimmed.chars().any(|c| c.is_ascii_digit())
        || !PHONE_CHARS.is_match(trimmed)
    {
        return trimmed.to_string();
    }

    match phonenumber::parse(Some(default_region), trimmed) {
        Ok(number) if phonenumber::is_valid(&number) => {
            number.format().mode(Mode::E164).to_string()
        }
        _ => trimmed.to_string(),
    }
}

/// Ensure an `https://` scheme, drop fragments and trailing path slashes.
///
/// Only web URLs are normalized; anything else is returned trimmed.
pub fn normalize_url(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    // A scheme only counts before the first path or query separator
    let has_scheme = trimmed
        .find("://")
        .is_some_and(|idx| !trimmed[..idx].contains(['/', '?']));
    let candidate = if has_scheme {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let mut url = match Url::parse(&candidate) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => url,
        _ => return trimmed.to_string(),
    };
    url.set_fragment(None);

    let serialized = url.to_string();
    let (base, query) = match serialized.find('?') {
        Some(idx) => serialized.split_at(idx),
        None => (serialized.as_str(), ""),
    };
    format!("{}{}", base.trim_end_matches('/'), query)
}

/// Strip trailing legal-entity suffixes (Inc, LLC, Ltd, ...) from a company name.
///
/// A name made only of a suffix (e.g. "Limited") is kept as is.
pub fn normalize_company_name(value: &str) -> String {
    let mut name = trim_trailing_separators(&collapse_whitespace(value)).to_string();

    loop {
        let Some((rest, last)) = name.rsplit_once(' ') else {
            break;
        };
        let token: String = last
            .chars()
            .filter(|c| *c != '.' && *c != ',')
            .collect::<String>()
            .to_lowercase();
        let rest = trim_trailing_separators(rest);
        if rest.is_empty() || !LEGAL_SUFFIXES.contains(&token.as_str()) {
            break;
        }
        name = rest.to_string();
    }

    name
}

fn trim_trailing_separators(value: &str) -> &str {
    value.trim_end_matches(|c: char| c == ',' || c.is_whitespace())
}

/// Normalize a social profile reference.
///
/// Profile URLs go through [`normalize_url`]; bare handles lose their
/// leading `@` and are lowercased.
pub fn normalize_social(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.contains('/') || trimmed.contains("://") {
        return normalize_url(trimmed);
    }
    trimmed
        .trim_start_matches(|c: char| c == '@' || c.is_whitespace())
        .to_lowercase()
}

/// Tidy free-text job titles.
pub fn normalize_role(value: &str) -> String {
    collapse_whitespace(value)
}
