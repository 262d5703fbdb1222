//! Numeric token extraction for ratings and review counts.
//!
//! Values are taken from the first number in a text fragment; anything that
//! does not parse is `None`, never zero.

use std::sync::LazyLock;

use regex::Regex;

static NUMERIC_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("valid numeric token regex"));

/// Integer with optional thousands groups: `"1 234"`, `"1,234"`, `"1\u{a0}234"`.
static COUNT_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,3}(?:[ \u{a0},]\d{3})+\b|\d+").expect("valid count token regex")
});

/// First decimal number in `text`. A comma decimal separator is accepted.
#[must_use]
pub fn first_numeric_token(text: &str) -> Option<f64> {
    let token = NUMERIC_TOKEN_RE.find(text)?.as_str().replace(',', ".");
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Rating from text such as `"4.6"`, `"Рейтинг: 4,6 / 5"` or `"4.6 out of 5"`.
#[must_use]
pub fn parse_rating(text: &str) -> Option<f64> {
    first_numeric_token(text).filter(|v| *v >= 0.0)
}

/// Review count from text such as `"128 reviews"` or `"1 204 отзыва"`.
#[must_use]
pub fn parse_count(text: &str) -> Option<u32> {
    let token = COUNT_TOKEN_RE.find(text)?.as_str();
    let digits: String = token.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_numeric_token_takes_the_first_number() {
        assert_eq!(first_numeric_token("4.6 out of 5"), Some(4.6));
        assert_eq!(first_numeric_token("Рейтинг: 4,6 / 5"), Some(4.6));
        assert_eq!(first_numeric_token("score 7"), Some(7.0));
    }

    #[test]
    fn missing_number_is_none_not_zero() {
        assert_eq!(first_numeric_token("no rating yet"), None);
        assert_eq!(parse_rating(""), None);
        assert_eq!(parse_count("reviews"), None);
    }

    #[test]
    fn parse_count_reads_grouped_thousands() {
        assert_eq!(parse_count("1 204 отзыва"), Some(1204));
        assert_eq!(parse_count("1,204 reviews"), Some(1204));
        assert_eq!(parse_count("1\u{a0}204"), Some(1204));
    }

    #[test]
    fn parse_count_plain_integer() {
        assert_eq!(parse_count("(128)"), Some(128));
        assert_eq!(parse_count("12 reviews, 3 photos"), Some(12));
    }

    #[test]
    fn parse_count_overflow_is_none() {
        assert_eq!(parse_count("99999999999"), None);
    }
}
