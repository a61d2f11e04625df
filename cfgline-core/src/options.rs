//! Option-grammar tokenizer for trailing free-form argument lists.
//!
//! Many router directives end in an open-ended option tail, for example
//! `dhcp scope 1 192.168.1.2-192.168.1.100/24 gateway 192.168.1.1 dns 8.8.8.8
//! 8.8.4.4 expire 12:00`. An [`OptionGrammar`] describes which keywords are
//! recognized and how many tokens each one consumes; [`OptionGrammar::tokenize`]
//! folds the tail left-to-right into an [`OptionSet`].
//!
//! Unknown tokens are handled according to the grammar's [`Strictness`]:
//! lenient grammars skip them (firmware revisions emit flags older models do
//! not), strict grammars fail with the offending token.

use serde::Serialize;
use thiserror::Error;

/// How many following tokens a keyword consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// The keyword stands alone.
    Flag,
    /// The keyword consumes exactly one value token.
    One,
    /// The keyword consumes every following token up to the next recognized
    /// keyword or end of input.
    Greedy,
}

/// Unknown-token policy for a grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Skip unrecognized tokens silently.
    #[default]
    Lenient,
    /// Fail on the first unrecognized token.
    Strict,
}

/// Errors produced while folding an option tail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// A strict grammar met a token it does not recognize.
    #[error("unrecognized option token '{0}'")]
    UnknownToken(String),
    /// A keyword that requires a value appeared at end of input or directly
    /// before another keyword.
    #[error("option '{0}' requires a value")]
    MissingValue(String),
}

/// Parsed value for one recognized keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OptionValue {
    /// The keyword was present with no value.
    Flag,
    /// Exactly one value token.
    One(String),
    /// One or more value tokens (greedy keywords).
    Many(Vec<String>),
}

/// Keyword table plus unknown-token policy for one configuration domain.
#[derive(Debug, Clone)]
pub struct OptionGrammar {
    keywords: Vec<(&'static str, Arity)>,
    strictness: Strictness,
}

impl OptionGrammar {
    pub fn new(strictness: Strictness) -> Self {
        Self {
            keywords: Vec::new(),
            strictness,
        }
    }

    /// Register a stand-alone flag keyword.
    pub fn flag(mut self, keyword: &'static str) -> Self {
        self.keywords.push((keyword, Arity::Flag));
        self
    }

    /// Register a keyword that takes exactly one value token.
    pub fn one(mut self, keyword: &'static str) -> Self {
        self.keywords.push((keyword, Arity::One));
        self
    }

    /// Register a keyword that consumes tokens until the next keyword.
    pub fn greedy(mut self, keyword: &'static str) -> Self {
        self.keywords.push((keyword, Arity::Greedy));
        self
    }

    /// True when the token is one of the grammar's keywords.
    pub fn is_keyword(&self, token: &str) -> bool {
        self.arity_of(token).is_some()
    }

    fn arity_of(&self, token: &str) -> Option<Arity> {
        self.keywords
            .iter()
            .find(|(keyword, _)| *keyword == token)
            .map(|(_, arity)| *arity)
    }

    /// Fold a whitespace-separated option tail into an [`OptionSet`].
    pub fn tokenize(&self, tail: &str) -> Result<OptionSet, TokenizeError> {
        let tokens: Vec<&str> = tail.split_whitespace().collect();
        let mut set = OptionSet::default();

        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i];
            match self.arity_of(token) {
                Some(Arity::Flag) => {
                    set.entries.push((token.to_string(), OptionValue::Flag));
                    i += 1;
                }
                Some(Arity::One) => {
                    let value = tokens
                        .get(i + 1)
                        .filter(|next| !self.is_keyword(next))
                        .ok_or_else(|| TokenizeError::MissingValue(token.to_string()))?;
                    set.entries
                        .push((token.to_string(), OptionValue::One(value.to_string())));
                    i += 2;
                }
                Some(Arity::Greedy) => {
                    let mut values = Vec::new();
                    let mut j = i + 1;
                    while j < tokens.len() && !self.is_keyword(tokens[j]) {
                        values.push(tokens[j].to_string());
                        j += 1;
                    }
                    if values.is_empty() {
                        return Err(TokenizeError::MissingValue(token.to_string()));
                    }
                    set.entries
                        .push((token.to_string(), OptionValue::Many(values)));
                    i = j;
                }
                None => match self.strictness {
                    Strictness::Lenient => i += 1,
                    Strictness::Strict => {
                        return Err(TokenizeError::UnknownToken(token.to_string()))
                    }
                },
            }
        }

        Ok(set)
    }
}

/// Recognized keywords and their values, in appearance order.
///
/// Absence of a keyword means "not specified" -- distinct from any explicit
/// value, because devices do not echo defaults in their configuration dump.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OptionSet {
    entries: Vec<(String, OptionValue)>,
}

impl OptionSet {
    /// Value of the last occurrence of the keyword, if present.
    pub fn get(&self, keyword: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .rev()
            .find(|(key, _)| key == keyword)
            .map(|(_, value)| value)
    }

    /// Single-token value of the keyword, if present with [`Arity::One`].
    pub fn one(&self, keyword: &str) -> Option<&str> {
        match self.get(keyword)? {
            OptionValue::One(value) => Some(value),
            _ => None,
        }
    }

    /// Token list of the keyword, if present with [`Arity::Greedy`].
    pub fn many(&self, keyword: &str) -> Option<&[String]> {
        match self.get(keyword)? {
            OptionValue::Many(values) => Some(values),
            _ => None,
        }
    }

    /// True when the flag keyword was present.
    pub fn flag(&self, keyword: &str) -> bool {
        matches!(self.get(keyword), Some(OptionValue::Flag))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate recognized keywords in appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }
}
