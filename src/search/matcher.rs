use crate::config::SearchConfig;
use crate::error::{CtxGrepError, Result};
use regex::{Regex, RegexBuilder};

/// Decides whether a single line contains the search pattern.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Plain substring search. With `ignore_case` the needle is stored lower-cased;
    /// `pattern` keeps the text as given.
    Literal {
        pattern: String,
        needle: String,
        ignore_case: bool,
    },
    Regex(Regex),
}

impl Matcher {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        if config.regex {
            Self::regex(&config.pattern, config.ignore_case)
        } else {
            Ok(Self::literal(&config.pattern, config.ignore_case))
        }
    }

    pub fn literal(pattern: &str, ignore_case: bool) -> Self {
        let needle = if ignore_case {
            pattern.to_lowercase()
        } else {
            pattern.to_string()
        };

        Matcher::Literal {
            pattern: pattern.to_string(),
            needle,
            ignore_case,
        }
    }

    pub fn regex(pattern: &str, ignore_case: bool) -> Result<Self> {
        RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()
            .map(Matcher::Regex)
            .map_err(|source| CtxGrepError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn is_match(&self, line: &str) -> bool {
        match self {
            Matcher::Literal {
                needle,
                ignore_case: false,
                ..
            } => line.contains(needle.as_str()),
            Matcher::Literal {
                needle,
                ignore_case: true,
                ..
            } => line.to_lowercase().contains(needle.as_str()),
            Matcher::Regex(regex) => regex.is_match(line),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Matcher::Literal {
                pattern,
                ignore_case,
                ..
            } => {
                if *ignore_case {
                    format!("text '{}' (ignoring case)", pattern)
                } else {
                    format!("text '{}'", pattern)
                }
            }
            Matcher::Regex(regex) => format!("regex /{}/", regex.as_str()),
        }
    }
}
