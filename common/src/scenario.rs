use crate::keyword::{extract_anchor, AnchorSubstring};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario {id} has no anchor: its sample holds no target-script text and the fallback is blank")]
    EmptyAnchor { id: String },

    #[error("scenario id {id} is used more than once")]
    DuplicateId { id: String },

    #[error("scenario table is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("failed to read scenario table: {0}")]
    Io(#[from] std::io::Error),
}

/// What the rendered output must (or must never) show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    Expected(String),
    Forbidden(String),
}

impl Expectation {
    pub fn sample(&self) -> &str {
        match self {
            Expectation::Expected(text) | Expectation::Forbidden(text) => text,
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Expectation::Expected(_))
    }
}

/// How text is committed into the input field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InputDiscipline {
    /// The whole text is set in one operation.
    Atomic,
    /// One keystroke at a time, `delay_ms` apart.
    Incremental { delay_ms: u64 },
}

impl Default for InputDiscipline {
    fn default() -> Self {
        InputDiscipline::Atomic
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioCase {
    pub id: String,
    pub label: String,
    pub input: String,
    pub expectation: Expectation,
    pub fallback_anchor: String,
    #[serde(default)]
    pub discipline: InputDiscipline,
    /// Clear the field, type the same text again and repeat the assertion.
    #[serde(default)]
    pub reenter: bool,
}

impl ScenarioCase {
    pub fn expecting(id: &str, label: &str, input: &str, expected: &str, fallback: &str) -> Self {
        ScenarioCase {
            id: id.to_string(),
            label: label.to_string(),
            input: input.to_string(),
            expectation: Expectation::Expected(expected.to_string()),
            fallback_anchor: fallback.to_string(),
            discipline: InputDiscipline::Atomic,
            reenter: false,
        }
    }

    pub fn forbidding(id: &str, label: &str, input: &str, forbidden: &str, fallback: &str) -> Self {
        ScenarioCase {
            expectation: Expectation::Forbidden(forbidden.to_string()),
            ..ScenarioCase::expecting(id, label, input, "", fallback)
        }
    }

    pub fn typed(mut self, delay_ms: u64) -> Self {
        self.discipline = InputDiscipline::Incremental { delay_ms };
        self
    }

    pub fn reentered(mut self) -> Self {
        self.reenter = true;
        self
    }

    /// The derived anchor of the sample, or the explicit fallback when the sample
    /// holds no target-script text.
    pub fn anchor(&self) -> Result<AnchorSubstring, ScenarioError> {
        AnchorSubstring::new(extract_anchor(self.expectation.sample()))
            .or_else(|| AnchorSubstring::new(self.fallback_anchor.as_str()))
            .ok_or_else(|| ScenarioError::EmptyAnchor {
                id: self.id.clone(),
            })
    }
}

/// A case together with its anchor, computed once when the table is loaded.
#[derive(Debug, Clone)]
pub struct PreparedCase {
    pub case: ScenarioCase,
    pub anchor: AnchorSubstring,
}

#[derive(Debug, Clone, Default)]
pub struct ScenarioTable {
    cases: Vec<PreparedCase>,
}

impl ScenarioTable {
    pub fn new(cases: Vec<ScenarioCase>) -> Result<Self, ScenarioError> {
        let mut seen = HashSet::new();
        let mut prepared = Vec::with_capacity(cases.len());
        for case in cases {
            if !seen.insert(case.id.clone()) {
                return Err(ScenarioError::DuplicateId { id: case.id });
            }
            let anchor = case.anchor()?;
            prepared.push(PreparedCase { case, anchor });
        }
        Ok(ScenarioTable { cases: prepared })
    }

    pub fn builtin() -> Result<Self, ScenarioError> {
        ScenarioTable::new(crate::cases::builtin_cases())
    }

    pub fn from_json_str(json: &str) -> Result<Self, ScenarioError> {
        ScenarioTable::new(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        ScenarioTable::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn cases(&self) -> &[PreparedCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
