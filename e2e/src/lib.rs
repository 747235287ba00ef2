//! Verification harness for Singlish-to-Sinhala transliteration web UIs.
//!
//! A scenario loads the page, switches it to the target language, enters the
//! input and polls the rendered output for an anchor substring. Pages are driven
//! through the [`surface::Surface`] trait; with the `browser` feature it is
//! implemented for Playwright pages and [`runner`] runs whole scenario tables.

pub mod config;
pub mod error;
pub mod fixture;
pub mod input;
pub mod locator;
pub mod logging;
pub mod outcome;
pub mod output;
pub mod polling;
pub mod scenario;
pub mod surface;

#[cfg(feature = "browser")]
pub mod playwright_ext;
#[cfg(feature = "browser")]
pub mod runner;

#[cfg(test)]
mod fake_page;

pub use config::{BrowserType, HarnessConfig, Timeouts};
pub use error::{HarnessError, SurfaceError};
pub use scenario::{run_scenario, ScenarioReport};
