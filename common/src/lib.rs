pub mod cases;
pub mod keyword;
pub mod scenario;
pub mod singlish;

use serde::{Deserialize, Serialize};

pub use keyword::{extract_anchor, AnchorSubstring, TargetScript};
pub use scenario::{
    Expectation, InputDiscipline, PreparedCase, ScenarioCase, ScenarioError, ScenarioTable,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct TransliterateRequest {
    pub text: String,
    pub language: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransliterateResponse {
    pub output: String,
}
