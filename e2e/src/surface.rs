//! The seam between the harness and a live page.

use crate::error::SurfaceError;
use async_trait::async_trait;
use std::time::Duration;
use translit_common::TargetScript;

pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Every text-entry field, in document order.
pub const TEXT_FIELDS: &str = r#"textarea, input[type="text"], input:not([type])"#;
pub const NATIVE_SELECTS: &str = "select";
pub const COMBOBOXES: &str = r#"[role="combobox"]"#;
pub const OPTIONS: &str = r#"[role="option"]"#;
pub const BUTTONS: &str = r#"button, [role="button"], input[type="submit"], input[type="button"]"#;

/// One element: the `index`-th match of `selector`, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef {
    pub selector: String,
    pub index: usize,
}

impl ElementRef {
    pub fn new(selector: impl Into<String>, index: usize) -> Self {
        ElementRef {
            selector: selector.into(),
            index,
        }
    }
}

/// All elements a resolution strategy matched at the time it looked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlHandle {
    selector: String,
    count: usize,
}

impl ControlHandle {
    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn nth(&self, index: usize) -> Option<ElementRef> {
        (index < self.count).then(|| ElementRef::new(self.selector.as_str(), index))
    }

    pub fn first(&self) -> Option<ElementRef> {
        self.nth(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = ElementRef> + '_ {
        (0..self.count).map(move |index| ElementRef::new(self.selector.as_str(), index))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectBy {
    Label(String),
    Value(String),
}

#[async_trait]
pub trait Surface: Send + Sync {
    async fn goto(&self, url: &str) -> SurfaceResult<()>;

    async fn count(&self, selector: &str) -> SurfaceResult<usize>;

    async fn resolve(&self, selector: &str) -> SurfaceResult<ControlHandle> {
        Ok(ControlHandle {
            selector: selector.to_string(),
            count: self.count(selector).await?,
        })
    }

    /// Visible labels of the options of a native select.
    async fn option_labels(&self, select: &ElementRef) -> SurfaceResult<Vec<String>>;

    /// Accessible name of every element matching `selector`, in document order.
    async fn accessible_names(&self, selector: &str) -> SurfaceResult<Vec<String>>;

    async fn is_visible(&self, element: &ElementRef) -> SurfaceResult<bool>;

    /// False for `disabled` or `aria-disabled="true"` controls.
    async fn is_enabled(&self, element: &ElementRef) -> SurfaceResult<bool>;

    async fn wait_visible(&self, element: &ElementRef, timeout: Duration) -> SurfaceResult<()>;

    async fn click(&self, element: &ElementRef, timeout: Duration) -> SurfaceResult<()>;

    async fn select_option(
        &self,
        select: &ElementRef,
        by: SelectBy,
        timeout: Duration,
    ) -> SurfaceResult<()>;

    async fn clear(&self, field: &ElementRef) -> SurfaceResult<()>;

    async fn fill(&self, field: &ElementRef, text: &str) -> SurfaceResult<()>;

    /// Presses one key per character, `delay` apart.
    async fn type_text(&self, field: &ElementRef, text: &str, delay: Duration)
        -> SurfaceResult<()>;

    async fn input_value(&self, field: &ElementRef) -> SurfaceResult<String>;

    /// Text of the first visible element holding `script` characters, or `None`
    /// when nothing shows up within `timeout`.
    async fn wait_for_script_text(
        &self,
        script: TargetScript,
        timeout: Duration,
    ) -> SurfaceResult<Option<String>>;
}
