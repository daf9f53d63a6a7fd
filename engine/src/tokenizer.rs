use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"[A-Za-z0-9_]+").expect("valid regex");
}

/// Tokenize one line of text into lowercase terms.
///
/// The line is lowercased first, then split on runs of anything outside
/// `[A-Za-z0-9_]`. Empty tokens are never returned.
pub fn tokenize(line: &str) -> Vec<String> {
    let lowered = line.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lowercase a query term so it compares equal to stored tokens.
pub fn normalize_term(term: &str) -> String {
    term.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Cat, dog! DOG?");
        assert_eq!(t, vec!["cat", "dog", "dog"]);
    }

    #[test]
    fn keeps_digits_and_underscores() {
        let t = tokenize("snake_case v2 -- 42");
        assert_eq!(t, vec!["snake_case", "v2", "42"]);
    }

    #[test]
    fn leading_separators_yield_no_empty_token() {
        assert_eq!(tokenize("  ...hello"), vec!["hello"]);
        assert!(tokenize("").is_empty());
        assert!(tokenize("!?-- ").is_empty());
    }

    #[test]
    fn non_ascii_letters_split_words() {
        assert_eq!(tokenize("Café au lait"), vec!["caf", "au", "lait"]);
    }

    #[test]
    fn normalize_does_not_strip_punctuation() {
        assert_eq!(normalize_term("Dog"), "dog");
        assert_eq!(normalize_term("Dog!"), "dog!");
    }
}
