//! Bounded polling over an eventually-consistent output.
//!
//! A positive assertion ends on the first sample containing the anchor. A
//! negative assertion cannot end early on success: absence is only accepted once
//! the whole window has been observed without the anchor showing up.

use crate::{error::HarnessError, output::OutputSource};
use std::{
    fmt::{Display, Formatter},
    time::Duration,
};
use tokio::time::{sleep, Instant};
use tracing::debug;
use translit_common::{AnchorSubstring, Expectation};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Predicate {
    Contains,
    NotContains,
}

impl Predicate {
    pub fn for_expectation(expectation: &Expectation) -> Self {
        if expectation.is_positive() {
            Predicate::Contains
        } else {
            Predicate::NotContains
        }
    }

    pub fn holds(&self, anchor: &AnchorSubstring, sample: &str) -> bool {
        match self {
            Predicate::Contains => anchor.is_in(sample),
            Predicate::NotContains => !anchor.is_in(sample),
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::Contains => write!(f, "contain"),
            Predicate::NotContains => write!(f, "never contain"),
        }
    }
}

/// Terminal state of a polling run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PollState {
    /// A sample contained the anchor.
    Succeeded,
    /// The window elapsed without the anchor showing up.
    TimedOut,
    /// Every sample of the window lacked the anchor.
    Held,
    /// A sample contained a forbidden anchor.
    Violated,
}

impl PollState {
    pub fn is_success(&self) -> bool {
        matches!(self, PollState::Succeeded | PollState::Held)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub state: PollState,
    pub samples: usize,
    pub elapsed: Duration,
    pub last_observed: String,
}

#[derive(Debug, Clone)]
pub struct PollingAssertion {
    anchor: AnchorSubstring,
    predicate: Predicate,
    window: Duration,
    interval: Duration,
    sample_bound: Duration,
}

impl PollingAssertion {
    pub fn new(anchor: AnchorSubstring, predicate: Predicate) -> Self {
        PollingAssertion {
            anchor,
            predicate,
            window: Duration::from_secs(25),
            interval: Duration::from_millis(250),
            sample_bound: Duration::from_secs(15),
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Longest a single sample may wait for output to appear.
    pub fn with_sample_bound(mut self, bound: Duration) -> Self {
        self.sample_bound = bound;
        self
    }

    pub fn anchor(&self) -> &AnchorSubstring {
        &self.anchor
    }

    pub fn predicate(&self) -> Predicate {
        self.predicate
    }

    /// Samples `source` until the assertion reaches a terminal state.
    pub async fn run<O: OutputSource + ?Sized>(&self, source: &O) -> PollReport {
        let started = Instant::now();
        let deadline = started + self.window;
        let mut samples = 0;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let sample = source.snapshot(self.sample_bound.min(remaining)).await;
            samples += 1;
            let holds = self.predicate.holds(&self.anchor, &sample);
            debug!(samples = samples, holds = holds, sample = sample.as_str(), "output sample");

            let finished = match (self.predicate, holds) {
                (Predicate::Contains, true) => Some(PollState::Succeeded),
                (Predicate::NotContains, false) => Some(PollState::Violated),
                _ if Instant::now() >= deadline => Some(match self.predicate {
                    Predicate::Contains => PollState::TimedOut,
                    Predicate::NotContains => PollState::Held,
                }),
                _ => None,
            };

            if let Some(state) = finished {
                return PollReport {
                    state,
                    samples,
                    elapsed: started.elapsed(),
                    last_observed: sample,
                };
            }

            let pause = self
                .interval
                .min(deadline.saturating_duration_since(Instant::now()));
            sleep(pause).await;
        }
    }

    /// Like [`run`](Self::run), turning the failing terminal states into errors.
    pub async fn verify<O: OutputSource + ?Sized>(
        &self,
        source: &O,
    ) -> Result<PollReport, HarnessError> {
        let report = self.run(source).await;
        let reason = match report.state {
            PollState::Succeeded | PollState::Held => return Ok(report),
            PollState::TimedOut => "deadline elapsed",
            PollState::Violated => "forbidden anchor observed",
        };
        Err(HarnessError::Assertion {
            predicate: self.predicate,
            anchor: self.anchor.as_str().to_string(),
            reason,
            samples: report.samples,
            last_observed: report.last_observed,
        })
    }
}

/// Samples `source` until it no longer shows `previous`, either because it was
/// cleared or because a different render landed. Each sample waits at most
/// `interval`, so a region that is already empty is noticed quickly.
pub async fn wait_for_change<O: OutputSource + ?Sized>(
    source: &O,
    previous: &str,
    window: Duration,
    interval: Duration,
) -> PollReport {
    let started = Instant::now();
    let deadline = started + window;
    let mut samples = 0;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let sample = source.snapshot(interval.min(remaining)).await;
        samples += 1;
        let changed = sample.is_empty() || sample != previous;
        debug!(samples = samples, changed = changed, sample = sample.as_str(), "settle sample");

        if changed || Instant::now() >= deadline {
            return PollReport {
                state: if changed {
                    PollState::Succeeded
                } else {
                    PollState::TimedOut
                },
                samples,
                elapsed: started.elapsed(),
                last_observed: sample,
            };
        }

        sleep(interval.min(deadline.saturating_duration_since(Instant::now()))).await;
    }
}
