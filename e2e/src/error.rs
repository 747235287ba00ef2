use crate::polling::Predicate;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a [`Surface`](crate::surface::Surface) implementation.
#[derive(Debug, Clone, Error)]
pub enum SurfaceError {
    #[error("timed out after {}ms waiting for {what}", .timeout.as_millis())]
    Timeout { what: String, timeout: Duration },

    /// The page refused the requested action, e.g. an unknown option label.
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Interaction(String),
}

impl SurfaceError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SurfaceError::Timeout { .. })
    }
}

/// Why a scenario failed.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("{what} did not become visible within {}ms", .timeout.as_millis())]
    ResolutionTimeout { what: String, timeout: Duration },

    #[error(
        "expected output to {predicate} {anchor:?}: {reason} after {samples} sample(s); last observed {last_observed:?}"
    )]
    Assertion {
        predicate: Predicate,
        anchor: String,
        reason: &'static str,
        samples: usize,
        last_observed: String,
    },

    #[error("{step} failed: {source}")]
    Interaction {
        step: &'static str,
        #[source]
        source: SurfaceError,
    },

    /// The output left by a previous entry was still shown after the input was
    /// cleared.
    #[error("output still showed {last_observed:?} {}ms after clearing the input", .timeout.as_millis())]
    StaleOutput {
        timeout: Duration,
        last_observed: String,
    },

    #[error("scenario did not finish within {}ms", .0.as_millis())]
    ScenarioTimeout(Duration),
}

impl HarnessError {
    /// Maps a failed required step: timeouts become resolution timeouts, anything
    /// else an interaction failure.
    pub fn required(step: &'static str, err: SurfaceError) -> Self {
        match err {
            SurfaceError::Timeout { timeout, .. } => HarnessError::ResolutionTimeout {
                what: step.to_string(),
                timeout,
            },
            source => HarnessError::Interaction { step, source },
        }
    }
}
