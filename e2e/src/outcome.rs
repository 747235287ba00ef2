//! Per-scenario results and the error types the runner aggregates them with.

use crate::{config::BrowserType, error::HarnessError, scenario::ScenarioReport};
use futures::FutureExt;
use std::{
    any::Any,
    error::Error,
    fmt::{Debug, Display, Formatter},
    future::Future,
    panic::AssertUnwindSafe,
};

pub struct ScenarioResult {
    pub scenario_id: String,
    pub browser_type: BrowserType,
    pub result: anyhow::Result<ScenarioReport>,
}

impl ScenarioResult {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl Display for ScenarioResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.result {
            Ok(_) => write!(f, "{} in {}...\t[OK]", self.scenario_id, self.browser_type),
            Err(err) => write!(
                f,
                "{} in {}...\t[FAILED]\n{:#}",
                self.scenario_id, self.browser_type, err
            ),
        }
    }
}

/// Prints the summary of a run and returns the process exit code.
pub fn summarize(results: &[ScenarioResult]) -> i32 {
    println!("\nSummary:");
    for result in results {
        println!("{}", result);
    }

    let successes = results.iter().filter(|result| result.is_ok()).count();
    if successes == results.len() {
        println!("{} scenarios passed", successes);
        0
    } else {
        println!("{} failures", results.len() - successes);
        1
    }
}

/// Runs a scenario future, turning a panic inside it into an error.
pub async fn catch_panics<F, T>(future: F) -> anyhow::Result<T>
where
    F: Future<Output = Result<T, HarnessError>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result.map_err(Into::into),
        Err(panic) => Err(CaughtPanic::new(panic).into()),
    }
}

pub struct ErrorList<C> {
    vec: Vec<(C, anyhow::Error)>,
}

impl<C> ErrorList<C> {
    pub fn new<E: Into<anyhow::Error>>(context: C, error: E) -> Self {
        ErrorList {
            vec: vec![(context, error.into())],
        }
    }

    pub fn push<E: Into<anyhow::Error>>(&mut self, context: C, error: E) {
        self.vec.push((context, error.into()));
    }

    /// Adds to `list`, creating it on the first error.
    pub fn record<E: Into<anyhow::Error>>(list: &mut Option<Self>, context: C, error: E) {
        match list {
            Some(errors) => errors.push(context, error),
            None => *list = Some(ErrorList::new(context, error)),
        }
    }
}

impl<C: Display> Debug for ErrorList<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ErrorList:")?;
        for (context, error) in &self.vec {
            writeln!(f, "\t- {}: {:#?}", context, error)?;
        }
        Ok(())
    }
}

impl<C: Display> Display for ErrorList<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ErrorList:")?;
        for (context, error) in &self.vec {
            writeln!(f, "\t- {}: {}", context, error)?;
        }
        Ok(())
    }
}

impl<C: Display> Error for ErrorList<C> {}

pub struct FailedToInitialize(pub BrowserType);

impl Display for FailedToInitialize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to initialize {}", self.0)
    }
}

pub struct FailedToOpenPage {
    pub scenario_id: String,
    pub browser_type: BrowserType,
}

impl Display for FailedToOpenPage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Failed to open page in {} for {}",
            self.browser_type, self.scenario_id
        )
    }
}

pub struct CaughtPanic(Option<Box<str>>);

impl CaughtPanic {
    fn new(err: Box<dyn Any + Send + 'static>) -> Self {
        match err.downcast::<String>() {
            Ok(str) => CaughtPanic(Some(str.into_boxed_str())),
            Err(err) => match err.downcast::<&str>() {
                Ok(str) => CaughtPanic(Some(str.to_string().into_boxed_str())),
                Err(_) => CaughtPanic(None),
            },
        }
    }
}

impl Debug for CaughtPanic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for CaughtPanic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(str_err) => write!(f, "{}", str_err),
            None => write!(f, "Unknown error"),
        }
    }
}

impl Error for CaughtPanic {}
