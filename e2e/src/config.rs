//! Harness configuration.
//!
//! Every value has a default; `HarnessConfig::from_env` overrides them from
//! `TRANSLIT_*` environment variables.

use serde::{Deserialize, Serialize};
use std::{
    env,
    fmt::{Display, Formatter},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};
use thiserror::Error;
use translit_common::TargetScript;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/";
pub const DEFAULT_LANGUAGE: &str = "Sinhala";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Bounds applied to every suspension point, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    /// Individual element waits (visibility, clicks, option lists).
    pub element_ms: u64,
    /// The polling window of an output assertion.
    pub output_ms: u64,
    /// Ceiling for a whole scenario.
    pub scenario_ms: u64,
    /// Delay between two output samples.
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            element_ms: 15_000,
            output_ms: 25_000,
            scenario_ms: 60_000,
            poll_interval_ms: 250,
        }
    }
}

impl Timeouts {
    pub fn element(&self) -> Duration {
        Duration::from_millis(self.element_ms)
    }

    pub fn output(&self) -> Duration {
        Duration::from_millis(self.output_ms)
    }

    pub fn scenario(&self) -> Duration {
        Duration::from_millis(self.scenario_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Copy, Clone, Debug, PartialOrd, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserType {
    pub const ALL: [BrowserType; 3] = [
        BrowserType::Chromium,
        BrowserType::Firefox,
        BrowserType::Webkit,
    ];
}

impl Display for BrowserType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                BrowserType::Chromium => "Chromium",
                BrowserType::Firefox => "Firefox",
                BrowserType::Webkit => "Webkit",
            }
        )
    }
}

impl FromStr for BrowserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(BrowserType::Chromium),
            "firefox" => Ok(BrowserType::Firefox),
            "webkit" => Ok(BrowserType::Webkit),
            other => Err(format!("unknown browser {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Page loaded at the start of every scenario.
    pub base_url: String,
    /// Label of the language option to select.
    pub target_language: String,
    /// Writing system the rendered output is detected by.
    pub script: TargetScript,
    pub timeouts: Timeouts,
    pub browsers: Vec<BrowserType>,
    pub headless: bool,
    /// JSON scenario table; the built-in table is used when unset.
    pub scenarios: Option<PathBuf>,
    /// Start the local fixture site before running.
    pub spawn_fixture: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            target_language: DEFAULT_LANGUAGE.to_string(),
            script: TargetScript::SINHALA,
            timeouts: Timeouts::default(),
            browsers: BrowserType::ALL.to_vec(),
            headless: true,
            scenarios: None,
            spawn_fixture: true,
        }
    }
}

impl HarnessConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        HarnessConfig::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, starting from the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = HarnessConfig::default();

        if let Some(url) = lookup("TRANSLIT_BASE_URL") {
            config.base_url = url;
        }
        if let Some(language) = lookup("TRANSLIT_LANGUAGE") {
            config.target_language = language;
        }
        if let Some(ms) = parsed(&lookup, "TRANSLIT_ELEMENT_TIMEOUT_MS")? {
            config.timeouts.element_ms = ms;
        }
        if let Some(ms) = parsed(&lookup, "TRANSLIT_OUTPUT_TIMEOUT_MS")? {
            config.timeouts.output_ms = ms;
        }
        if let Some(ms) = parsed(&lookup, "TRANSLIT_SCENARIO_TIMEOUT_MS")? {
            config.timeouts.scenario_ms = ms;
        }
        if let Some(ms) = parsed::<u64>(&lookup, "TRANSLIT_POLL_INTERVAL_MS")? {
            if ms == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "TRANSLIT_POLL_INTERVAL_MS",
                    value: ms.to_string(),
                    reason: "must be positive".to_string(),
                });
            }
            config.timeouts.poll_interval_ms = ms;
        }
        if let Some(list) = lookup("TRANSLIT_BROWSERS") {
            config.browsers = list
                .split(',')
                .filter(|name| !name.trim().is_empty())
                .map(|name| {
                    name.parse().map_err(|reason| ConfigError::InvalidValue {
                        key: "TRANSLIT_BROWSERS",
                        value: list.clone(),
                        reason,
                    })
                })
                .collect::<Result<_, _>>()?;
        }
        if let Some(headless) = parsed(&lookup, "TRANSLIT_HEADLESS")? {
            config.headless = headless;
        }
        if let Some(path) = lookup("TRANSLIT_SCENARIOS") {
            config.scenarios = Some(PathBuf::from(path));
        }
        if let Some(spawn) = parsed(&lookup, "TRANSLIT_SPAWN_FIXTURE")? {
            config.spawn_fixture = spawn;
        }

        Ok(config)
    }
}

fn parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|err: T::Err| ConfigError::InvalidValue {
                key,
                reason: err.to_string(),
                value,
            }),
    }
}
