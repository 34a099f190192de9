//! Parsing of the free-text search box.
//!
//! Accepted shape, over the whole input:
//!
//! ```text
//! name [' '] ['(' postcode ')']
//! ```
//!
//! `name` is a run of letters or underscores and `postcode` is 2 to 5 ASCII
//! digits. `Lyon`, `Lyon (69001)` and `Lyon(69001)` match; `Lyon69`,
//! `Saint-Étienne` and `Lyon (6)` do not.

use crate::model::SearchInput;

const POSTCODE_DIGITS: std::ops::RangeInclusive<usize> = 2..=5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchParse {
    Match(SearchInput),
    NoMatch,
}

fn is_name_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

pub fn parse(text: &str) -> SearchParse {
    match tokenize(text) {
        Some((city_name, post_code)) => SearchParse::Match(SearchInput {
            city_name: city_name.to_string(),
            post_code: post_code.map(str::to_string),
        }),
        None => SearchParse::NoMatch,
    }
}

fn tokenize(text: &str) -> Option<(&str, Option<&str>)> {
    let name_end = text.find(|c: char| !is_name_char(c)).unwrap_or(text.len());
    if name_end == 0 {
        return None;
    }
    let (name, rest) = text.split_at(name_end);
    let rest = rest.strip_prefix(' ').unwrap_or(rest);

    if rest.is_empty() {
        return Some((name, None));
    }

    let digits = rest.strip_prefix('(')?.strip_suffix(')')?;
    if POSTCODE_DIGITS.contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some((name, Some(digits)))
    } else {
        None
    }
}
