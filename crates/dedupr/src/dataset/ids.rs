//! Column and row identifier generation.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Longest label stem kept before the random suffix.
const MAX_STEM_LEN: usize = 27;

/// Length of the random suffix appended to column ids.
const SUFFIX_LEN: usize = 4;

static UNDERSCORE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").expect("valid regex"));

// `_l` / `_r` endings collide with the left/right pair columns a matcher builds.
static PAIR_SIDE_ENDING: Lazy<Regex> = Lazy::new(|| Regex::new(r"_[lr]$").expect("valid regex"));

/// Generate a readable column id from a label, e.g. `"E-mail Address"` →
/// `e_mail_address_qzkf`.
pub fn generate_column_id(label: &str) -> String {
    format!("{}_{}", column_id_stem(label), random_suffix())
}

/// Generate a column id that is not already taken.
pub fn generate_unique_column_id(label: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let stem = column_id_stem(label);
    loop {
        let candidate = format!("{}_{}", stem, random_suffix());
        if !is_taken(&candidate) {
            return candidate;
        }
    }
}

/// Generate an opaque row id.
pub fn generate_row_id() -> String {
    format!("{:016x}", fastrand::u64(..))
}

fn column_id_stem(label: &str) -> String {
    let folded: String = label
        .nfkd()
        .filter(char::is_ascii)
        .collect::<String>()
        .to_ascii_lowercase();

    let mut stem: String = folded
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if !stem.starts_with(|c: char| c.is_ascii_alphabetic()) {
        stem = format!("col_{}", stem);
    }

    let stem = UNDERSCORE_RUNS.replace_all(&stem, "_");
    let stem: String = stem.trim_matches('_').chars().take(MAX_STEM_LEN).collect();
    let stem = PAIR_SIDE_ENDING.replace(stem.trim_end_matches('_'), "");
    stem.trim_end_matches('_').to_string()
}

fn random_suffix() -> String {
    (0..SUFFIX_LEN).map(|_| fastrand::lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stem_of(id: &str) -> &str {
        id.rsplit_once('_').map(|(stem, _)| stem).unwrap()
    }

    #[test]
    fn test_basic_label() {
        let id = generate_column_id("E-mail Address");
        assert_eq!(stem_of(&id), "e_mail_address");
        assert_eq!(id.len(), "e_mail_address".len() + 1 + SUFFIX_LEN);
    }

    #[test]
    fn test_ascii_folding() {
        assert_eq!(column_id_stem("Prénom Müller"), "prenom_muller");
    }

    #[test]
    fn test_non_letter_start_gets_prefix() {
        assert_eq!(column_id_stem("2nd phone"), "col_2nd_phone");
        assert_eq!(column_id_stem(""), "col");
        assert_eq!(column_id_stem("!!!"), "col");
    }

    #[test]
    fn test_length_cap_and_side_suffix() {
        let stem = column_id_stem("a very long column label that keeps on going");
        assert!(stem.len() <= MAX_STEM_LEN);
        assert!(!stem.ends_with('_'));
        assert_eq!(column_id_stem("name_l"), "name");
        assert_eq!(column_id_stem("Name R"), "name");
    }

    #[test]
    fn test_unique_id_avoids_taken() {
        let first = generate_column_id("Email");
        let second = generate_unique_column_id("Email", |id| id == first);
        assert_ne!(first, second);
        assert!(second.starts_with("email_"));
    }
}
