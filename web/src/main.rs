//! Fixture site reproducing the UI shapes a transliteration page comes in.
//!
//! Output is rendered asynchronously: input is debounced, sent to
//! `/api/transliterate` and shown after an artificial delay, so the harness has
//! to poll for it the way it would on a real site.

#[macro_use]
extern crate rocket;

use rocket::{response::content::RawHtml, serde::json::Json};
use translit_common::{singlish::transliterate, TransliterateRequest, TransliterateResponse};

const CLIENT_JS: &str = r#"
const DEBOUNCE_MS = 300;
const RENDER_DELAY_MS = 600;

async function transliterate(text, language) {
    const response = await fetch("/api/transliterate", {
        method: "POST",
        headers: { "Content-Type": "application/json" },
        body: JSON.stringify({ text, language }),
    });
    const body = await response.json();
    return body.output;
}

function scheduler(read, render) {
    let timer = null;
    let generation = 0;
    return (immediate) => {
        clearTimeout(timer);
        timer = setTimeout(async () => {
            const current = ++generation;
            const [text, language] = read();
            const output = text.trim() ? await transliterate(text, language) : "";
            setTimeout(() => {
                if (current === generation) render(output);
            }, RENDER_DELAY_MS);
        }, immediate ? 0 : DEBOUNCE_MS);
    };
}
"#;

const NATIVE_BODY: &str = r#"
<label for="language">Language</label>
<select id="language">
    <option value="english">English</option>
    <option value="sinhala">Sinhala</option>
</select>
<textarea id="input" placeholder="Type Singlish"></textarea>
<textarea id="output" readonly></textarea>
<button id="translate" type="button">Translate</button>
"#;

const NATIVE_JS: &str = r#"
const input = document.getElementById("input");
const output = document.getElementById("output");
const language = document.getElementById("language");
const refresh = scheduler(
    () => [input.value, language.options[language.selectedIndex].text],
    (text) => { output.value = text; },
);
input.addEventListener("input", () => refresh(false));
language.addEventListener("change", () => refresh(false));
document.getElementById("translate").addEventListener("click", () => refresh(true));
"#;

const COMPOSITE_BODY: &str = r#"
<div id="language" role="combobox" aria-label="Language" aria-expanded="false"
     aria-controls="languages" tabindex="0">English</div>
<ul id="languages" role="listbox" hidden>
    <li role="option">English</li>
    <li role="option">Sinhala</li>
</ul>
<textarea id="input" placeholder="Type Singlish"></textarea>
<div id="output" aria-live="polite"></div>
"#;

const COMPOSITE_JS: &str = r#"
const input = document.getElementById("input");
const output = document.getElementById("output");
const combobox = document.getElementById("language");
const listbox = document.getElementById("languages");
let language = "English";
const refresh = scheduler(
    () => [input.value, language],
    (text) => { output.textContent = text; },
);
function setOpen(open) {
    listbox.hidden = !open;
    combobox.setAttribute("aria-expanded", String(open));
}
combobox.addEventListener("click", () => setOpen(listbox.hidden));
listbox.querySelectorAll('[role="option"]').forEach((option) => {
    option.addEventListener("click", () => {
        language = option.textContent.trim();
        combobox.textContent = language;
        setOpen(false);
        refresh(false);
    });
});
input.addEventListener("input", () => refresh(false));
"#;

const PLAIN_BODY: &str = r#"
<textarea id="input" placeholder="Type Singlish"></textarea>
<button id="translate" type="button" disabled>Translate</button>
<p id="output"></p>
"#;

const PLAIN_JS: &str = r#"
const input = document.getElementById("input");
const output = document.getElementById("output");
const refresh = scheduler(
    () => [input.value, "Sinhala"],
    (text) => { output.textContent = text; },
);
input.addEventListener("input", () => refresh(false));
"#;

fn page(title: &str, body: &str, script: &str) -> RawHtml<String> {
    RawHtml(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>{}<script>{}{}</script>\n</body>\n</html>\n",
        title, body, CLIENT_JS, script
    ))
}

#[get("/")]
fn index() -> RawHtml<String> {
    page("Singlish", NATIVE_BODY, NATIVE_JS)
}

#[get("/composite")]
fn composite() -> RawHtml<String> {
    page("Singlish (composite)", COMPOSITE_BODY, COMPOSITE_JS)
}

#[get("/plain")]
fn plain() -> RawHtml<String> {
    page("Singlish (plain)", PLAIN_BODY, PLAIN_JS)
}

/// Sinhala requests go through the transliterator; anything else is echoed.
#[post("/api/transliterate", data = "<payload>")]
fn post_transliterate(payload: Json<TransliterateRequest>) -> Json<TransliterateResponse> {
    let payload = payload.into_inner();
    let output = if payload.language.eq_ignore_ascii_case("sinhala") {
        transliterate(&payload.text)
    } else {
        payload.text
    };
    Json(TransliterateResponse { output })
}

#[launch]
fn rocket() -> _ {
    rocket::build().mount("/", routes![index, composite, plain, post_transliterate])
}
