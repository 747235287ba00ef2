//! [`Surface`] over a live Playwright page.
//!
//! Elements are addressed as the n-th match of a CSS selector list. Before an
//! action the addressed element is pinned with a marker attribute so Playwright
//! can target exactly that one, whatever the driver's selector engine supports.
//! `Page` has inherent methods named like some `Surface` ones, so calls between
//! them go through the trait path.

use crate::{
    error::SurfaceError,
    surface::{ElementRef, SelectBy, Surface, SurfaceResult},
};
use async_trait::async_trait;
use playwright::api::Page;
use serde::{de::DeserializeOwned, Serialize};
use std::{fmt::Display, time::Duration};
use tokio::time::{sleep, Instant};
use translit_common::TargetScript;

const PIN_ATTRIBUTE: &str = "data-translit-pin";
const PINNED: &str = r#"[data-translit-pin="target"]"#;
const POLL: Duration = Duration::from_millis(100);

const COUNT_JS: &str = r#"(selector) => document.querySelectorAll(selector).length"#;

const PIN_JS: &str = r#"([selector, index, attribute]) => {
    document.querySelectorAll(`[${attribute}]`).forEach((el) => el.removeAttribute(attribute));
    const el = document.querySelectorAll(selector)[index];
    if (!el) return false;
    el.setAttribute(attribute, "target");
    return true;
}"#;

const VISIBLE_JS: &str = r#"([selector, index]) => {
    const el = document.querySelectorAll(selector)[index];
    if (!el) return false;
    const style = window.getComputedStyle(el);
    if (style.visibility === "hidden" || style.display === "none") return false;
    return !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length);
}"#;

const ENABLED_JS: &str = r#"([selector, index]) => {
    const el = document.querySelectorAll(selector)[index];
    return !!el && !el.disabled && el.getAttribute("aria-disabled") !== "true";
}"#;

const OPTION_LABELS_JS: &str = r#"([selector, index]) => {
    const el = document.querySelectorAll(selector)[index];
    return el && el.options ? Array.from(el.options, (o) => o.label || o.text) : [];
}"#;

const NAMES_JS: &str = r#"(selector) => Array.from(document.querySelectorAll(selector), (el) =>
    (el.getAttribute("aria-label") || el.innerText || el.value || el.textContent || "").trim())"#;

const VALUE_JS: &str = r#"([selector, index]) => {
    const el = document.querySelectorAll(selector)[index];
    return el && "value" in el ? el.value : null;
}"#;

const SCRIPT_TEXT_JS: &str = r#"([first, last]) => {
    const inScript = (text) => Array.from(text).some((c) => {
        const code = c.codePointAt(0);
        return code >= first && code <= last;
    });
    const walker = document.createTreeWalker(document.body, NodeFilter.SHOW_TEXT);
    for (let node = walker.nextNode(); node; node = walker.nextNode()) {
        const el = node.parentElement;
        if (!el || !inScript(node.textContent)) continue;
        if (["TEXTAREA", "INPUT", "SCRIPT", "STYLE", "OPTION"].includes(el.tagName)) continue;
        if (!(el.offsetWidth || el.offsetHeight || el.getClientRects().length)) continue;
        return el.innerText;
    }
    return null;
}"#;

fn interaction<E: Display>(err: E) -> SurfaceError {
    SurfaceError::Interaction(err.to_string())
}

fn millis(timeout: Duration) -> f64 {
    timeout.as_millis() as f64
}

/// Runs a page function and decodes its result.
#[async_trait]
trait PageEvalExt {
    async fn query<A, T>(&self, script: &str, arg: A) -> SurfaceResult<T>
    where
        A: Serialize + Send,
        T: DeserializeOwned + Send;
}

#[async_trait]
impl PageEvalExt for Page {
    async fn query<A, T>(&self, script: &str, arg: A) -> SurfaceResult<T>
    where
        A: Serialize + Send,
        T: DeserializeOwned + Send,
    {
        self.evaluate::<A, T>(script, arg).await.map_err(interaction)
    }
}

async fn pin(page: &Page, element: &ElementRef) -> SurfaceResult<&'static str> {
    let found: bool = page
        .query(PIN_JS, (element.selector.as_str(), element.index, PIN_ATTRIBUTE))
        .await?;
    if found {
        Ok(PINNED)
    } else {
        Err(SurfaceError::Interaction(format!(
            "no element at {:?}",
            element
        )))
    }
}

#[async_trait]
impl Surface for Page {
    async fn goto(&self, url: &str) -> SurfaceResult<()> {
        self.goto_builder(url)
            .goto()
            .await
            .map(|_| ())
            .map_err(interaction)
    }

    async fn count(&self, selector: &str) -> SurfaceResult<usize> {
        self.query(COUNT_JS, selector).await
    }

    async fn option_labels(&self, select: &ElementRef) -> SurfaceResult<Vec<String>> {
        self.query(OPTION_LABELS_JS, (select.selector.as_str(), select.index))
            .await
    }

    async fn accessible_names(&self, selector: &str) -> SurfaceResult<Vec<String>> {
        self.query(NAMES_JS, selector).await
    }

    async fn is_visible(&self, element: &ElementRef) -> SurfaceResult<bool> {
        self.query(VISIBLE_JS, (element.selector.as_str(), element.index))
            .await
    }

    async fn is_enabled(&self, element: &ElementRef) -> SurfaceResult<bool> {
        self.query(ENABLED_JS, (element.selector.as_str(), element.index))
            .await
    }

    async fn wait_visible(&self, element: &ElementRef, timeout: Duration) -> SurfaceResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Surface::is_visible(self, element).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(SurfaceError::Timeout {
                    what: format!("{} #{}", element.selector, element.index),
                    timeout,
                });
            }
            sleep(POLL.min(deadline.saturating_duration_since(Instant::now()))).await;
        }
    }

    async fn click(&self, element: &ElementRef, timeout: Duration) -> SurfaceResult<()> {
        Surface::wait_visible(self, element, timeout).await?;
        let target = pin(self, element).await?;
        self.click_builder(target)
            .timeout(millis(timeout))
            .click()
            .await
            .map_err(interaction)
    }

    async fn select_option(
        &self,
        select: &ElementRef,
        by: SelectBy,
        timeout: Duration,
    ) -> SurfaceResult<()> {
        let target = pin(self, select).await?;
        let builder = self.select_option_builder(target).timeout(millis(timeout));
        let builder = match &by {
            SelectBy::Label(label) => builder.add_label(label.clone()),
            SelectBy::Value(value) => builder.add_value(value.clone()),
        };
        let selected = builder.select_option().await.map_err(interaction)?;
        if selected.is_empty() {
            return Err(SurfaceError::Rejected(format!("no option matching {:?}", by)));
        }
        Ok(())
    }

    async fn clear(&self, field: &ElementRef) -> SurfaceResult<()> {
        Surface::fill(self, field, "").await
    }

    async fn fill(&self, field: &ElementRef, text: &str) -> SurfaceResult<()> {
        let target = pin(self, field).await?;
        self.fill_builder(target, text)
            .fill()
            .await
            .map_err(interaction)
    }

    async fn type_text(
        &self,
        field: &ElementRef,
        text: &str,
        delay: Duration,
    ) -> SurfaceResult<()> {
        let target = pin(self, field).await?;
        self.type_builder(target, text)
            .delay(millis(delay))
            .r#type()
            .await
            .map_err(interaction)
    }

    async fn input_value(&self, field: &ElementRef) -> SurfaceResult<String> {
        let value: Option<String> = self
            .query(VALUE_JS, (field.selector.as_str(), field.index))
            .await?;
        value.ok_or_else(|| SurfaceError::Interaction(format!("{:?} holds no value", field)))
    }

    async fn wait_for_script_text(
        &self,
        script: TargetScript,
        timeout: Duration,
    ) -> SurfaceResult<Option<String>> {
        let range = (u32::from(script.first), u32::from(script.last));
        let deadline = Instant::now() + timeout;
        loop {
            let found: Option<String> = self.query(SCRIPT_TEXT_JS, range).await?;
            if let Some(text) = found {
                return Ok(Some(text.trim().to_string()));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            sleep(POLL.min(deadline.saturating_duration_since(Instant::now()))).await;
        }
    }
}
