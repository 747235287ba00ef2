//! In-memory page used by the unit tests.
//!
//! It reproduces the three UI shapes the harness has to cope with and renders
//! output asynchronously on the tokio clock, so tests run with paused time.

use crate::{
    error::SurfaceError,
    surface::{
        ElementRef, SelectBy, Surface, SurfaceResult, BUTTONS, COMBOBOXES, NATIVE_SELECTS,
        OPTIONS, TEXT_FIELDS,
    },
};
use async_trait::async_trait;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::time::{sleep, Instant};
use translit_common::{singlish::transliterate, TargetScript};

type Renderer = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

#[derive(Debug, Clone)]
enum Switcher {
    None,
    Native {
        options: Vec<(String, String)>,
        visible: bool,
        reject_labels: bool,
    },
    Composite {
        names: Vec<String>,
        open: bool,
    },
}

#[derive(Debug, Clone)]
struct Field {
    value: String,
    visible: bool,
}

#[derive(Debug, Clone)]
struct Button {
    name: String,
    visible: bool,
    enabled: bool,
}

struct State {
    language: String,
    switcher: Switcher,
    fields: Vec<Field>,
    mirror: bool,
    button: Option<Button>,
    rendered: String,
    ready_at: Option<Instant>,
    /// Keep showing the last landed output until the next render lands.
    sticky: bool,
    shown: String,
    keystrokes: usize,
    calls: Vec<String>,
}

pub struct FakePage {
    state: Mutex<State>,
    render: Renderer,
    render_delay: Duration,
}

fn languages() -> Vec<(String, String)> {
    vec![
        ("English".to_string(), "english".to_string()),
        ("Sinhala".to_string(), "sinhala".to_string()),
    ]
}

impl FakePage {
    fn with_switcher(switcher: Switcher, language: &str) -> Self {
        FakePage {
            state: Mutex::new(State {
                language: language.to_string(),
                switcher,
                fields: vec![Field {
                    value: String::new(),
                    visible: true,
                }],
                mirror: false,
                button: None,
                rendered: String::new(),
                ready_at: None,
                sticky: false,
                shown: String::new(),
                keystrokes: 0,
                calls: Vec::new(),
            }),
            render: Arc::new(|text: &str, language: &str| {
                if language == "Sinhala" {
                    transliterate(text)
                } else {
                    text.to_string()
                }
            }),
            render_delay: Duration::from_millis(800),
        }
    }

    /// A native `<select>` currently set to English.
    pub fn native() -> Self {
        FakePage::with_switcher(
            Switcher::Native {
                options: languages(),
                visible: true,
                reject_labels: false,
            },
            "English",
        )
    }

    /// A composite combobox currently set to English.
    pub fn composite() -> Self {
        FakePage::with_switcher(
            Switcher::Composite {
                names: languages().into_iter().map(|(label, _)| label).collect(),
                open: false,
            },
            "English",
        )
    }

    /// No language switcher; the page already renders Sinhala.
    pub fn plain() -> Self {
        FakePage::with_switcher(Switcher::None, "Sinhala")
    }

    /// Output is mirrored into a second text field.
    pub fn with_mirror(self) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.mirror = true;
            state.fields.push(Field {
                value: String::new(),
                visible: true,
            });
        }
        self
    }

    pub fn with_button(self, name: &str, enabled: bool) -> Self {
        self.state.lock().unwrap().button = Some(Button {
            name: name.to_string(),
            visible: true,
            enabled,
        });
        self
    }

    pub fn with_hidden_button(self, name: &str) -> Self {
        self.state.lock().unwrap().button = Some(Button {
            name: name.to_string(),
            visible: false,
            enabled: true,
        });
        self
    }

    pub fn with_hidden_input(self) -> Self {
        self.state.lock().unwrap().fields[0].visible = false;
        self
    }

    pub fn with_hidden_select(self) -> Self {
        if let Switcher::Native { visible, .. } = &mut self.state.lock().unwrap().switcher {
            *visible = false;
        }
        self
    }

    /// Label selection is refused; only option values work.
    pub fn rejecting_labels(self) -> Self {
        if let Switcher::Native { reject_labels, .. } = &mut self.state.lock().unwrap().switcher {
            *reject_labels = true;
        }
        self
    }

    /// Output behaves like a debounced page: clearing or editing the input
    /// leaves the previous output on screen until the next render lands, empty
    /// input included.
    pub fn with_sticky_output(self) -> Self {
        self.state.lock().unwrap().sticky = true;
        self
    }

    pub fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    pub fn with_renderer(
        mut self,
        render: impl Fn(&str, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.render = Arc::new(render);
        self
    }

    pub fn language(&self) -> String {
        self.state.lock().unwrap().language.clone()
    }

    pub fn input_text(&self) -> String {
        self.state.lock().unwrap().fields[0].value.clone()
    }

    pub fn keystrokes(&self) -> usize {
        self.state.lock().unwrap().keystrokes
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn rerender(&self, state: &mut State) {
        let input = state.fields[0].value.clone();
        if state.sticky {
            if let Some(landed) = FakePage::visible_output(state) {
                state.shown = landed;
            }
            state.rendered = (self.render)(&input, &state.language);
            state.ready_at = Some(Instant::now() + self.render_delay);
        } else if input.trim().is_empty() {
            state.rendered.clear();
            state.ready_at = None;
        } else {
            state.rendered = (self.render)(&input, &state.language);
            state.ready_at = Some(Instant::now() + self.render_delay);
        }
    }

    fn visible_output(state: &State) -> Option<String> {
        match state.ready_at {
            Some(at) if Instant::now() >= at => Some(state.rendered.clone()),
            _ if state.sticky && !state.shown.is_empty() => Some(state.shown.clone()),
            _ => None,
        }
    }

    fn field(state: &State, element: &ElementRef) -> SurfaceResult<usize> {
        if element.selector != TEXT_FIELDS || element.index >= state.fields.len() {
            return Err(SurfaceError::Interaction(format!(
                "no text field at {:?}",
                element
            )));
        }
        Ok(element.index)
    }

    fn visible_now(&self, element: &ElementRef) -> SurfaceResult<bool> {
        let state = self.state.lock().unwrap();
        let visible = match element.selector.as_str() {
            TEXT_FIELDS => state.fields[FakePage::field(&state, element)?].visible,
            NATIVE_SELECTS => matches!(state.switcher, Switcher::Native { visible: true, .. }),
            COMBOBOXES => matches!(state.switcher, Switcher::Composite { .. }),
            OPTIONS => matches!(state.switcher, Switcher::Composite { open: true, .. }),
            BUTTONS => state.button.as_ref().map_or(false, |button| button.visible),
            other => {
                return Err(SurfaceError::Interaction(format!(
                    "unknown selector {}",
                    other
                )))
            }
        };
        Ok(visible)
    }
}

#[async_trait]
impl Surface for FakePage {
    async fn goto(&self, url: &str) -> SurfaceResult<()> {
        self.record(format!("goto {}", url));
        Ok(())
    }

    async fn count(&self, selector: &str) -> SurfaceResult<usize> {
        let state = self.state.lock().unwrap();
        let count = match (selector, &state.switcher) {
            (TEXT_FIELDS, _) => state.fields.len(),
            (NATIVE_SELECTS, Switcher::Native { .. }) => 1,
            (COMBOBOXES, Switcher::Composite { .. }) => 1,
            (OPTIONS, Switcher::Composite { names, open: true }) => names.len(),
            (BUTTONS, _) => usize::from(state.button.is_some()),
            _ => 0,
        };
        Ok(count)
    }

    async fn option_labels(&self, select: &ElementRef) -> SurfaceResult<Vec<String>> {
        match &self.state.lock().unwrap().switcher {
            Switcher::Native { options, .. } if select.selector == NATIVE_SELECTS => {
                Ok(options.iter().map(|(label, _)| label.clone()).collect())
            }
            _ => Err(SurfaceError::Interaction("not a native select".to_string())),
        }
    }

    async fn accessible_names(&self, selector: &str) -> SurfaceResult<Vec<String>> {
        let state = self.state.lock().unwrap();
        let names = match (selector, &state.switcher) {
            (OPTIONS, Switcher::Composite { names, open: true }) => names.clone(),
            (COMBOBOXES, Switcher::Composite { .. }) => vec!["Language".to_string()],
            (BUTTONS, _) => state.button.iter().map(|b| b.name.clone()).collect(),
            (TEXT_FIELDS, _) => vec![String::new(); state.fields.len()],
            _ => Vec::new(),
        };
        Ok(names)
    }

    async fn is_visible(&self, element: &ElementRef) -> SurfaceResult<bool> {
        self.visible_now(element)
    }

    async fn is_enabled(&self, element: &ElementRef) -> SurfaceResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(match element.selector.as_str() {
            BUTTONS => state.button.as_ref().map_or(false, |button| button.enabled),
            _ => true,
        })
    }

    async fn wait_visible(&self, element: &ElementRef, timeout: Duration) -> SurfaceResult<()> {
        if self.visible_now(element)? {
            return Ok(());
        }
        sleep(timeout).await;
        Err(SurfaceError::Timeout {
            what: element.selector.clone(),
            timeout,
        })
    }

    async fn click(&self, element: &ElementRef, timeout: Duration) -> SurfaceResult<()> {
        self.record(format!("click {}#{}", element.selector, element.index));
        if !self.visible_now(element)? {
            sleep(timeout).await;
            return Err(SurfaceError::Timeout {
                what: element.selector.clone(),
                timeout,
            });
        }

        let mut state = self.state.lock().unwrap();
        match element.selector.as_str() {
            COMBOBOXES => {
                if let Switcher::Composite { open, .. } = &mut state.switcher {
                    *open = true;
                }
            }
            OPTIONS => {
                let chosen = match &mut state.switcher {
                    Switcher::Composite { names, open } => {
                        *open = false;
                        names.get(element.index).cloned()
                    }
                    _ => None,
                };
                if let Some(language) = chosen {
                    state.language = language;
                    self.rerender(&mut state);
                }
            }
            BUTTONS => {
                if !state.button.as_ref().map_or(false, |button| button.enabled) {
                    return Err(SurfaceError::Interaction(
                        "element is not enabled".to_string(),
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn select_option(
        &self,
        select: &ElementRef,
        by: SelectBy,
        _timeout: Duration,
    ) -> SurfaceResult<()> {
        self.record(format!("select {:?}", by));
        let mut state = self.state.lock().unwrap();
        let chosen = match (&state.switcher, &by) {
            (Switcher::Native { reject_labels: true, .. }, SelectBy::Label(_)) => None,
            (Switcher::Native { options, .. }, SelectBy::Label(label)) => options
                .iter()
                .find(|(l, _)| l == label)
                .map(|(l, _)| l.clone()),
            (Switcher::Native { options, .. }, SelectBy::Value(value)) => options
                .iter()
                .find(|(_, v)| v == value)
                .map(|(l, _)| l.clone()),
            _ => None,
        };
        match chosen {
            Some(language) if select.selector == NATIVE_SELECTS => {
                state.language = language;
                self.rerender(&mut state);
                Ok(())
            }
            _ => Err(SurfaceError::Rejected(format!("no option matching {:?}", by))),
        }
    }

    async fn clear(&self, field: &ElementRef) -> SurfaceResult<()> {
        self.record("clear".to_string());
        let mut state = self.state.lock().unwrap();
        let index = FakePage::field(&state, field)?;
        state.fields[index].value.clear();
        self.rerender(&mut state);
        Ok(())
    }

    async fn fill(&self, field: &ElementRef, text: &str) -> SurfaceResult<()> {
        self.record(format!("fill {}", text));
        let mut state = self.state.lock().unwrap();
        let index = FakePage::field(&state, field)?;
        state.fields[index].value = text.to_string();
        self.rerender(&mut state);
        Ok(())
    }

    async fn type_text(
        &self,
        field: &ElementRef,
        text: &str,
        delay: Duration,
    ) -> SurfaceResult<()> {
        self.record(format!("type {}", text));
        for c in text.chars() {
            sleep(delay).await;
            let mut state = self.state.lock().unwrap();
            let index = FakePage::field(&state, field)?;
            state.fields[index].value.push(c);
            state.keystrokes += 1;
            self.rerender(&mut state);
        }
        Ok(())
    }

    async fn input_value(&self, field: &ElementRef) -> SurfaceResult<String> {
        let state = self.state.lock().unwrap();
        let index = FakePage::field(&state, field)?;
        if index == 1 && state.mirror {
            return Ok(FakePage::visible_output(&state).unwrap_or_default());
        }
        Ok(state.fields[index].value.clone())
    }

    async fn wait_for_script_text(
        &self,
        script: TargetScript,
        timeout: Duration,
    ) -> SurfaceResult<Option<String>> {
        let deadline = Instant::now() + timeout;
        loop {
            {
                let state = self.state.lock().unwrap();
                if !state.mirror {
                    if let Some(text) = FakePage::visible_output(&state) {
                        if script.is_present_in(&text) {
                            return Ok(Some(text.trim().to_string()));
                        }
                    }
                }
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            sleep(Duration::from_millis(50).min(deadline.saturating_duration_since(Instant::now())))
                .await;
        }
    }
}
