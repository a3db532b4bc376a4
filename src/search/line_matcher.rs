use crate::config::{DecodeMode, SearchConfig};
use crate::error::Result;
use crate::scanner::SkipReason;
use crate::search::matcher::Matcher;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// One matched line with the lines around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub file_path: String,
    /// 1-based number of the matched line.
    pub line_number: usize,
    /// 1-based number of `context[0]`.
    pub first_context_line: usize,
    pub context: Vec<String>,
}

impl MatchRecord {
    pub fn matched_line(&self) -> &str {
        &self.context[self.line_number - self.first_context_line]
    }

    pub fn last_context_line(&self) -> usize {
        self.first_context_line + self.context.len() - 1
    }
}

pub struct LineMatcher {
    matcher: Matcher,
    context: usize,
    decode: DecodeMode,
}

impl LineMatcher {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        Ok(Self {
            matcher: Matcher::new(config)?,
            context: config.context,
            decode: config.decode,
        })
    }

    pub fn from_matcher(matcher: Matcher, context: usize) -> Self {
        Self {
            matcher,
            context,
            decode: DecodeMode::Strict,
        }
    }

    pub fn with_decode_mode(mut self, decode: DecodeMode) -> Self {
        self.decode = decode;
        self
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn context(&self) -> usize {
        self.context
    }

    /// Reads `path` and returns one record per matching line. Files that
    /// cannot be read or decoded come back as a [`SkipReason`].
    pub fn search_file(
        &self,
        path: &Path,
        display_path: &str,
    ) -> std::result::Result<Vec<MatchRecord>, SkipReason> {
        let contents = read_text(path, self.decode)?;
        let lines = split_lines(&contents);
        Ok(self.find_in_lines(display_path, &lines))
    }

    pub fn find_in_lines(&self, display_path: &str, lines: &[&str]) -> Vec<MatchRecord> {
        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| self.matcher.is_match(line))
            .map(|(index, _)| {
                let start = index.saturating_sub(self.context);
                let end = index.saturating_add(self.context).min(lines.len() - 1);

                MatchRecord {
                    file_path: display_path.to_string(),
                    line_number: index + 1,
                    first_context_line: start + 1,
                    context: lines[start..=end].iter().map(|l| l.to_string()).collect(),
                }
            })
            .collect()
    }
}

/// Splits on `\n`, `\r\n` and a lone `\r`. A terminator at the very end
/// does not start another line.
fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }

    lines
}

fn read_text(path: &Path, decode: DecodeMode) -> std::result::Result<String, SkipReason> {
    let bytes = fs::read(path).map_err(|e| SkipReason::Unreadable {
        message: e.to_string(),
    })?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => match decode {
            DecodeMode::Strict => Err(SkipReason::Undecodable),
            DecodeMode::Lossy => Ok(String::from_utf8_lossy(err.as_bytes()).into_owned()),
        },
    }
}
