//! Control resolution across the UI shapes the target ships with.
//!
//! The language switcher is either a native `<select>` or a composite
//! `combobox`/`option` widget. Strategies are tried in a fixed order and the
//! first one that matches wins; finding nothing is not an error, the page is then
//! assumed to already be in the requested language.

use crate::{
    config::Timeouts,
    error::{HarnessError, SurfaceError},
    surface::{
        ControlHandle, ElementRef, SelectBy, Surface, SurfaceResult, BUTTONS, COMBOBOXES,
        NATIVE_SELECTS, OPTIONS, TEXT_FIELDS,
    },
};
use std::{
    fmt::{Display, Formatter},
    time::Duration,
};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Accessible-name pattern of the optional submission control, lowercase.
pub const SUBMIT_PATTERN: &str = "translate";

const LOOKUP_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Strategy {
    NativeSelect,
    Combobox,
}

/// Resolution order for the language switcher.
pub const STRATEGY_CHAIN: [Strategy; 2] = [Strategy::NativeSelect, Strategy::Combobox];

/// The shape of the language switcher found on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageControl {
    Native(ElementRef),
    Composite(ElementRef),
}

/// Outcome of an interaction with a control the page may legitimately lack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionalControl {
    Used,
    Absent,
    Failed(String),
}

impl Display for OptionalControl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionalControl::Used => write!(f, "used"),
            OptionalControl::Absent => write!(f, "absent"),
            OptionalControl::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}

pub struct LocatorResolver<'a, S: ?Sized> {
    surface: &'a S,
    timeouts: Timeouts,
}

impl<'a, S: Surface + ?Sized> LocatorResolver<'a, S> {
    pub fn new(surface: &'a S, timeouts: Timeouts) -> Self {
        LocatorResolver { surface, timeouts }
    }

    pub async fn find_language_control(
        &self,
        label: &str,
    ) -> SurfaceResult<Option<LanguageControl>> {
        for strategy in STRATEGY_CHAIN {
            if let Some(control) = self.try_strategy(strategy, label).await? {
                debug!(?strategy, ?control, "language control resolved");
                return Ok(Some(control));
            }
            debug!(?strategy, "strategy found no language control");
        }
        Ok(None)
    }

    async fn try_strategy(
        &self,
        strategy: Strategy,
        label: &str,
    ) -> SurfaceResult<Option<LanguageControl>> {
        match strategy {
            Strategy::NativeSelect => {
                let selects = self.surface.resolve(NATIVE_SELECTS).await?;
                for select in selects.iter() {
                    let labels = self.surface.option_labels(&select).await?;
                    if labels.iter().any(|option| option == label) {
                        return Ok(Some(LanguageControl::Native(select)));
                    }
                }
                Ok(None)
            }
            Strategy::Combobox => Ok(self
                .surface
                .resolve(COMBOBOXES)
                .await?
                .first()
                .map(LanguageControl::Composite)),
        }
    }

    /// Switches the page to `label`. Never fails: a missing switcher means the
    /// page is taken to be in the right language already, a broken one is logged.
    pub async fn select_language(&self, label: &str) -> OptionalControl {
        let control = match self.find_language_control(label).await {
            Ok(Some(control)) => control,
            Ok(None) => {
                info!(language = label, "no language switcher, keeping the page default");
                return OptionalControl::Absent;
            }
            Err(err) => {
                warn!(language = label, %err, "language switcher lookup failed");
                return OptionalControl::Failed(err.to_string());
            }
        };

        match self.apply(&control, label).await {
            Ok(()) => {
                info!(language = label, ?control, "language selected");
                OptionalControl::Used
            }
            Err(err) => {
                warn!(language = label, ?control, %err, "language switcher present but unusable");
                OptionalControl::Failed(err.to_string())
            }
        }
    }

    async fn apply(&self, control: &LanguageControl, label: &str) -> SurfaceResult<()> {
        let timeout = self.timeouts.element();
        match control {
            LanguageControl::Native(select) => {
                self.surface.wait_visible(select, timeout).await?;
                let by_label = self
                    .surface
                    .select_option(select, SelectBy::Label(label.to_string()), timeout)
                    .await;
                match by_label {
                    Ok(()) => Ok(()),
                    Err(err) => {
                        debug!(%err, "selection by label refused, retrying by value");
                        self.surface
                            .select_option(select, SelectBy::Value(label.to_lowercase()), timeout)
                            .await
                    }
                }
            }
            LanguageControl::Composite(combobox) => {
                self.surface.click(combobox, timeout).await?;
                let option = self.wait_for_named(OPTIONS, label, timeout).await?;
                self.surface.click(&option, timeout).await
            }
        }
    }

    /// Waits for an element of `selector` whose accessible name is exactly `name`.
    async fn wait_for_named(
        &self,
        selector: &str,
        name: &str,
        timeout: Duration,
    ) -> SurfaceResult<ElementRef> {
        let deadline = Instant::now() + timeout;
        loop {
            let names = self.surface.accessible_names(selector).await?;
            if let Some(index) = names.iter().position(|candidate| candidate == name) {
                return Ok(ElementRef::new(selector, index));
            }
            if Instant::now() >= deadline {
                return Err(SurfaceError::Timeout {
                    what: format!("{} named {:?}", selector, name),
                    timeout,
                });
            }
            sleep(LOOKUP_INTERVAL).await;
        }
    }

    pub async fn text_fields(&self) -> SurfaceResult<ControlHandle> {
        self.surface.resolve(TEXT_FIELDS).await
    }

    /// The first text field on the page, once visible.
    pub async fn input_field(&self) -> Result<ElementRef, HarnessError> {
        const STEP: &str = "primary input field";
        let timeout = self.timeouts.element();
        let deadline = Instant::now() + timeout;

        let field = loop {
            let fields = self
                .text_fields()
                .await
                .map_err(|err| HarnessError::required(STEP, err))?;
            if let Some(first) = fields.first() {
                break first;
            }
            if Instant::now() >= deadline {
                return Err(HarnessError::ResolutionTimeout {
                    what: STEP.to_string(),
                    timeout,
                });
            }
            sleep(LOOKUP_INTERVAL).await;
        };

        self.surface
            .wait_visible(&field, deadline.saturating_duration_since(Instant::now()))
            .await
            .map_err(|err| match err {
                SurfaceError::Timeout { .. } => HarnessError::ResolutionTimeout {
                    what: STEP.to_string(),
                    timeout,
                },
                other => HarnessError::required(STEP, other),
            })?;
        Ok(field)
    }

    /// The first button-like element whose accessible name mentions "translate".
    pub async fn submit_control(&self) -> SurfaceResult<Option<ElementRef>> {
        let names = self.surface.accessible_names(BUTTONS).await?;
        Ok(names
            .iter()
            .position(|name| name.to_lowercase().contains(SUBMIT_PATTERN))
            .map(|index| ElementRef::new(BUTTONS, index)))
    }
}
