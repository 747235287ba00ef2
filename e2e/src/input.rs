use crate::{
    config::Timeouts,
    error::HarnessError,
    locator::{LocatorResolver, OptionalControl},
    surface::{ElementRef, Surface},
};
use std::time::Duration;
use tracing::{debug, info, warn};
use translit_common::InputDiscipline;

/// What happened to the optional controls while input was committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveReport {
    pub language: OptionalControl,
    pub submit: OptionalControl,
}

pub struct InputDriver<'a, S: ?Sized> {
    surface: &'a S,
    resolver: LocatorResolver<'a, S>,
    timeouts: Timeouts,
}

impl<'a, S: Surface + ?Sized> InputDriver<'a, S> {
    pub fn new(surface: &'a S, timeouts: Timeouts) -> Self {
        InputDriver {
            surface,
            resolver: LocatorResolver::new(surface, timeouts),
            timeouts,
        }
    }

    /// Selects `language`, replaces the content of the primary input with `text`
    /// and presses the submission control when the page shows one.
    pub async fn drive(
        &self,
        language: &str,
        text: &str,
        discipline: InputDiscipline,
    ) -> Result<DriveReport, HarnessError> {
        let language = self.resolver.select_language(language).await;
        let field = self.resolver.input_field().await?;
        self.write(&field, text, discipline).await?;
        let submit = self.submit().await;
        Ok(DriveReport { language, submit })
    }

    /// Clicks and clears `field`, then writes `text` under `discipline`.
    pub async fn write(
        &self,
        field: &ElementRef,
        text: &str,
        discipline: InputDiscipline,
    ) -> Result<(), HarnessError> {
        self.clear(field).await?;
        self.enter(field, text, discipline).await
    }

    pub async fn clear(&self, field: &ElementRef) -> Result<(), HarnessError> {
        self.surface
            .click(field, self.timeouts.element())
            .await
            .map_err(|err| HarnessError::required("focusing the input field", err))?;
        self.surface
            .clear(field)
            .await
            .map_err(|err| HarnessError::required("clearing the input field", err))
    }

    /// Writes `text` into an already focused and cleared `field`.
    pub async fn enter(
        &self,
        field: &ElementRef,
        text: &str,
        discipline: InputDiscipline,
    ) -> Result<(), HarnessError> {
        let written = match discipline {
            InputDiscipline::Atomic => {
                debug!(text = text, "filling input");
                self.surface.fill(field, text).await
            }
            InputDiscipline::Incremental { delay_ms } => {
                debug!(text = text, delay_ms = delay_ms, "typing input");
                self.surface
                    .type_text(field, text, Duration::from_millis(delay_ms))
                    .await
            }
        };
        written.map_err(|err| HarnessError::required("writing the input field", err))
    }

    /// Presses the submission control if there is a visible one. Failures are
    /// reported, never propagated: auto-translating pages may hide or disable it.
    pub async fn submit(&self) -> OptionalControl {
        let button = match self.resolver.submit_control().await {
            Ok(Some(button)) => button,
            Ok(None) => return OptionalControl::Absent,
            Err(err) => {
                warn!(%err, "submit control lookup failed");
                return OptionalControl::Failed(err.to_string());
            }
        };

        match self.surface.is_visible(&button).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("submit control hidden, skipping");
                return OptionalControl::Absent;
            }
            Err(err) => return OptionalControl::Failed(err.to_string()),
        }

        match self.surface.is_enabled(&button).await {
            Ok(true) => {}
            Ok(false) => {
                warn!("submit control disabled, not clicking");
                return OptionalControl::Failed("submit control is disabled".to_string());
            }
            Err(err) => return OptionalControl::Failed(err.to_string()),
        }

        match self.surface.click(&button, self.timeouts.element()).await {
            Ok(()) => {
                info!("submit control clicked");
                OptionalControl::Used
            }
            Err(err) => {
                warn!(%err, "submit control click ignored");
                OptionalControl::Failed(err.to_string())
            }
        }
    }
}
