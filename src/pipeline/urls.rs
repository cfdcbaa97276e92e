//! URL cleaning and chronological ordering.
//!
//! Call-log URLs carry their meeting date as an 8-digit `YYYYMMDD` token
//! (`standup_20240103.txt`). Sorting on that token puts the most recent call
//! last, which is what the synthesis prompt relies on for recency weighting.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static DATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{8}").expect("date token pattern is valid"));

const QUOTES: [char; 2] = ['"', '\''];

/// Strip surrounding whitespace and quote characters.
///
/// Trimming repeats until nothing changes, so `" 'a' "` and `'a'` both clean
/// to `a` and cleaning a clean URL is a no-op.
pub fn clean_url(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || QUOTES.contains(&c))
}

/// Date encoded in the first 8-digit run of `url`.
///
/// `None` when there is no such run or it is not a real calendar date
/// (`20241399`); those URLs are ordered as the earliest possible date.
pub fn date_token(url: &str) -> Option<NaiveDate> {
    let token = DATE_TOKEN.find(url)?;
    NaiveDate::parse_from_str(token.as_str(), "%Y%m%d").ok()
}

/// Clean every URL and order them oldest first.
///
/// The sort is stable: URLs with the same date, and undated URLs, keep
/// their submitted order. Undated URLs come before every dated one.
pub fn normalize_urls<S: AsRef<str>>(urls: &[S]) -> Vec<String> {
    let mut keyed: Vec<(Option<NaiveDate>, String)> = urls
        .iter()
        .map(|u| {
            let cleaned = clean_url(u.as_ref());
            (date_token(cleaned), cleaned.to_string())
        })
        .collect();

    keyed.sort_by_key(|(date, _)| *date);

    keyed.into_iter().map(|(_, url)| url).collect()
}
