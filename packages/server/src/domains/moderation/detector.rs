use lazy_static::lazy_static;
use regex::Regex;

/// A detected contact-info token with its location
#[derive(Debug, Clone)]
pub struct ContactMatch {
    pub value: String,
    pub start: usize,
    pub end: usize,
}

lazy_static! {
    // Local phone numbers: leading-zero digit runs in the fixed local shapes,
    // with optional internal whitespace/dash/dot grouping.
    // Covers "01012345678", "010-1234-5678", "010 1234 5678", "02 123 4567".
    static ref PHONE_GROUPED_REGEX: Regex = Regex::new(
        r"\b0\d{1,2}[-.\s]?\d{3,4}[-.\s]?\d{4}\b"
    ).unwrap();

    // Bare fixed-length digit runs (9-11 digits, leading zero), no grouping.
    static ref PHONE_RUN_REGEX: Regex = Regex::new(
        r"\b0\d{8,10}\b"
    ).unwrap();
}

/// Default profanity/abuse word list. Extended (never replaced) via config.
pub const DEFAULT_BANNED_WORDS: &[&str] = &[
    "fuck", "shit", "bitch", "bastard", "asshole", "moron", "idiot", "scammer",
];

/// Find phone-shaped contact-info tokens in text.
///
/// Overlapping hits from the two patterns are not deduplicated: callers only
/// care whether the list is empty, because one hit redacts the whole body.
pub fn find_contact_info(text: &str) -> Vec<ContactMatch> {
    let mut matches = Vec::new();

    for regex in [&*PHONE_GROUPED_REGEX, &*PHONE_RUN_REGEX] {
        for mat in regex.find_iter(text) {
            matches.push(ContactMatch {
                value: mat.as_str().to_string(),
                start: mat.start(),
                end: mat.end(),
            });
        }
    }

    matches
}

/// Build a word-boundary, case-insensitive matcher for a banned-word list.
///
/// Returns `None` for an empty list (nothing to match).
pub fn build_word_regex(words: &[String]) -> Option<Regex> {
    if words.is_empty() {
        return None;
    }

    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");

    // Escaped fixed words cannot produce an invalid pattern.
    Some(Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).expect("escaped word alternation"))
}

/// Byte spans of banned words in text.
pub fn find_banned_words(text: &str, word_regex: &Regex) -> Vec<(usize, usize)> {
    word_regex
        .find_iter(text)
        .map(|mat| (mat.start(), mat.end()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_plain_digit_run() {
        let found = find_contact_info("call me at 01012345678 tonight");
        assert!(!found.is_empty());
        assert_eq!(found[0].value, "01012345678");
    }

    #[test]
    fn detects_grouped_numbers() {
        assert!(!find_contact_info("010-1234-5678").is_empty());
        assert!(!find_contact_info("010 1234 5678").is_empty());
        assert!(!find_contact_info("02.123.4567").is_empty());
    }

    #[test]
    fn ignores_ordinary_numbers() {
        assert!(find_contact_info("the price is 600 for 5 days").is_empty());
        assert!(find_contact_info("room 101").is_empty());
        assert!(find_contact_info("order #123456").is_empty());
    }

    #[test]
    fn word_matching_is_boundary_safe() {
        let re = build_word_regex(&["scammer".to_string()]).unwrap();
        assert_eq!(find_banned_words("you scammer!", &re).len(), 1);
        // "scammers" has no boundary after "scammer"... the trailing "s" makes
        // \b fail only between letters, so the plural is NOT matched.
        assert!(find_banned_words("scammers unite", &re).is_empty());
        assert!(find_banned_words("unscrambled", &re).is_empty());
    }

    #[test]
    fn word_matching_is_case_insensitive() {
        let re = build_word_regex(&["idiot".to_string()]).unwrap();
        assert_eq!(find_banned_words("IDIOT. Idiot. idiot.", &re).len(), 3);
    }

    #[test]
    fn empty_word_list_builds_no_regex() {
        assert!(build_word_regex(&[]).is_none());
    }
}
