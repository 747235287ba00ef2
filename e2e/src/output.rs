use crate::{
    locator::LocatorResolver,
    surface::Surface,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use translit_common::TargetScript;

/// Anything that can produce a snapshot of the rendered output.
#[async_trait]
pub trait OutputSource: Send + Sync {
    /// Current output, or an empty string when none is identifiable within
    /// `bound`.
    async fn snapshot(&self, bound: Duration) -> String;
}

/// Reads rendered output from whichever region the page uses: a second text
/// field mirroring the result, or any visible element holding script text.
pub struct OutputReader<'a, S: ?Sized> {
    surface: &'a S,
    resolver: LocatorResolver<'a, S>,
    script: TargetScript,
}

impl<'a, S: Surface + ?Sized> OutputReader<'a, S> {
    pub fn new(surface: &'a S, resolver: LocatorResolver<'a, S>, script: TargetScript) -> Self {
        OutputReader {
            surface,
            resolver,
            script,
        }
    }

    async fn mirrored(&self) -> Option<String> {
        let fields = self.resolver.text_fields().await.ok()?;
        let mirror = fields.nth(1)?;
        match self.surface.input_value(&mirror).await {
            Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
            Ok(_) => None,
            Err(err) => {
                debug!(%err, "output mirror unreadable");
                None
            }
        }
    }

    async fn rendered(&self, bound: Duration) -> Option<String> {
        match self.surface.wait_for_script_text(self.script, bound).await {
            Ok(text) => text.map(|text| text.trim().to_string()),
            Err(err) => {
                debug!(%err, "no rendered output");
                None
            }
        }
    }
}

#[async_trait]
impl<'a, S: Surface + ?Sized> OutputSource for OutputReader<'a, S> {
    async fn snapshot(&self, bound: Duration) -> String {
        if let Some(value) = self.mirrored().await {
            return value;
        }
        self.rendered(bound).await.unwrap_or_default()
    }
}
