//! Query-string model and the history-aware parameter synchronizer
//!
//! The query string is handled as raw `key=value` tokens joined by `&`. No
//! percent-encoding or decoding happens here; callers encode values before
//! writing them.

mod sync;

pub use sync::{CommitOutcome, NavigationIntent, QueryStateSync};

use std::fmt;

/// One `&`-separated piece of a query string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryToken {
    /// A token with exactly one `=`
    Param { key: String, value: String },
    /// Anything else; preserved verbatim, never matched by name
    Opaque(String),
}

impl QueryToken {
    fn parse(raw: &str) -> Self {
        let mut parts = raw.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) => QueryToken::Param {
                key: key.to_string(),
                value: value.to_string(),
            },
            _ => QueryToken::Opaque(raw.to_string()),
        }
    }

    /// Key of a well-formed token
    pub fn key(&self) -> Option<&str> {
        match self {
            QueryToken::Param { key, .. } => Some(key),
            QueryToken::Opaque(_) => None,
        }
    }

    fn matches(&self, name: &str) -> bool {
        self.key() == Some(name)
    }
}

impl fmt::Display for QueryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryToken::Param { key, value } => write!(f, "{key}={value}"),
            QueryToken::Opaque(raw) => f.write_str(raw),
        }
    }
}

fn raw_tokens(search: &str) -> impl Iterator<Item = &str> {
    search
        .split('&')
        .map(|token| token.strip_prefix('?').unwrap_or(token))
}

/// Split `search` into tokens, dropping empty ones
///
/// A leading `?` is stripped from any token that carries one.
pub fn parse_query(search: &str) -> Vec<QueryToken> {
    raw_tokens(search)
        .filter(|token| !token.is_empty())
        .map(QueryToken::parse)
        .collect()
}

/// Join tokens back into a query string without a leading `?`
pub fn join_query(tokens: &[QueryToken]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("&")
}

/// Value of the first well-formed token named `name`
pub fn get_parameter<'a>(search: &'a str, name: &str) -> Option<&'a str> {
    raw_tokens(search).find_map(|token| {
        let mut parts = token.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) if key == name => Some(value),
            _ => None,
        }
    })
}

/// Rebuild `search` with `name` set to `value`, or removed when `value` is `None`
///
/// The first matching token keeps its position; later tokens with the same
/// key are dropped so at most one remains. With no match, the new token is
/// appended. The result has no leading `?`.
pub fn rewrite_query(search: &str, name: &str, value: Option<&str>) -> String {
    let mut replaced = false;
    let mut tokens = Vec::new();

    for token in parse_query(search) {
        if !token.matches(name) {
            tokens.push(token);
            continue;
        }
        if replaced {
            continue;
        }
        replaced = true;
        if let Some(value) = value {
            tokens.push(QueryToken::Param {
                key: name.to_string(),
                value: value.to_string(),
            });
        }
    }

    if !replaced {
        if let Some(value) = value {
            tokens.push(QueryToken::Param {
                key: name.to_string(),
                value: value.to_string(),
            });
        }
    }

    join_query(&tokens)
}
