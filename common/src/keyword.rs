//! Anchor extraction.
//!
//! An anchor is the short fragment of an expected (or forbidden) output that a
//! scenario matches against the rendered page. It is derived from the runs of
//! target-script characters in the sample text.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Runs shorter than this are considered too generic to match on their own.
pub const MIN_STANDALONE_RUN: usize = 4;

/// A contiguous Unicode block identifying the writing system of rendered output.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetScript {
    pub first: char,
    pub last: char,
}

impl TargetScript {
    pub const SINHALA: TargetScript = TargetScript {
        first: '\u{0D80}',
        last: '\u{0DFF}',
    };

    pub fn contains(&self, c: char) -> bool {
        (self.first..=self.last).contains(&c)
    }

    /// Whether `text` holds at least one character of this script.
    pub fn is_present_in(&self, text: &str) -> bool {
        text.chars().any(|c| self.contains(c))
    }

    /// Maximal runs of script characters in `text`, left to right.
    pub fn runs<'a>(&self, text: &'a str) -> Runs<'a> {
        Runs {
            script: *self,
            rest: text,
        }
    }
}

impl Default for TargetScript {
    fn default() -> Self {
        TargetScript::SINHALA
    }
}

pub struct Runs<'a> {
    script: TargetScript,
    rest: &'a str,
}

impl<'a> Iterator for Runs<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let start = self.rest.find(|c| self.script.contains(c))?;
        let tail = &self.rest[start..];
        let len = tail
            .find(|c| !self.script.contains(c))
            .unwrap_or(tail.len());
        let (run, rest) = tail.split_at(len);
        self.rest = rest;
        Some(run)
    }
}

/// Derives the anchor for `sample` in the Sinhala script.
pub fn extract_anchor(sample: &str) -> String {
    extract_anchor_in(TargetScript::SINHALA, sample)
}

/// Derives the anchor for `sample`: the first script run, joined with the second
/// one when the first is shorter than [`MIN_STANDALONE_RUN`] characters.
/// Returns an empty string when the sample holds no script characters.
pub fn extract_anchor_in(script: TargetScript, sample: &str) -> String {
    let mut runs = script.runs(sample);
    let first = match runs.next() {
        Some(run) => run,
        None => return String::new(),
    };

    if first.chars().count() < MIN_STANDALONE_RUN {
        if let Some(second) = runs.next() {
            return format!("{} {}", first, second);
        }
    }
    first.to_string()
}

/// The matching key of a scenario. Never empty and never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnchorSubstring(String);

impl AnchorSubstring {
    /// Returns `None` for blank input, which can never be a meaningful anchor.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(AnchorSubstring(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_in(&self, haystack: &str) -> bool {
        haystack.contains(&self.0)
    }
}

impl AsRef<str> for AnchorSubstring {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for AnchorSubstring {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
