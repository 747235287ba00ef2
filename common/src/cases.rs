use crate::scenario::ScenarioCase;

/// Keystroke delay used by the typing-cadence scenarios.
pub const TYPING_DELAY_MS: u64 = 40;

pub fn builtin_cases() -> Vec<ScenarioCase> {
    let mut cases = positive_cases();
    cases.extend(negative_cases());
    cases.extend(ui_cases());
    cases
}

fn positive_cases() -> Vec<ScenarioCase> {
    vec![
        ScenarioCase::expecting(
            "Pos_0001",
            "Simple future-tense sentence",
            "mama heta enavaa",
            "මම හෙට එනවා",
            "මම හෙට",
        ),
        ScenarioCase::expecting(
            "Pos_0002",
            "Going home",
            "mama gedhara yanavaa",
            "මම ගෙදර යනවා",
            "මම ගෙදර",
        ),
        ScenarioCase::expecting(
            "Pos_0003",
            "Interrogative with long vowel ending",
            "oyaa kohedha yannee",
            "ඔයා කොහෙද යන්නේ",
            "ඔයා",
        ),
        ScenarioCase::expecting(
            "Pos_0004",
            "Word-final consonant",
            "mata bath oonee",
            "මට බත් ඕනේ",
            "මට",
        ),
        ScenarioCase::expecting(
            "Pos_0005",
            "Consonant cluster inside a word",
            "api iskoolee yanavaa",
            "අපි ඉස්කෝලේ යනවා",
            "අපි",
        ),
        ScenarioCase::expecting(
            "Pos_0006",
            "Greeting",
            "suba dhavasak",
            "සුබ දවසක්",
            "සුබ",
        ),
        ScenarioCase::expecting(
            "Pos_0007",
            "Long polite request",
            "karunaakaralaa mata udhav karanna",
            "කරුනාකරලා මට උදව් කරන්න",
            "කරුනාකරලා",
        ),
        ScenarioCase::expecting(
            "Pos_0008",
            "Descriptive sentence",
            "lankaava lassana ratak",
            "ලන්කාව ලස්සන රටක්",
            "ලන්කාව",
        ),
        ScenarioCase::expecting(
            "Pos_0009",
            "Amount with digits",
            "mata rupiyal 500k oonee",
            "මට රුපියල් 500ක් ඕනේ",
            "රුපියල්",
        ),
        ScenarioCase::expecting(
            "Pos_0010",
            "Question mark is preserved",
            "oyaata kohomadha?",
            "ඔයාට කොහොමද?",
            "ඔයාට",
        ),
    ]
}

fn negative_cases() -> Vec<ScenarioCase> {
    vec![
        ScenarioCase::forbidding(
            "Neg_0001",
            "Mixed casing changes the letters",
            "MaMa GeDhArA YaNaVaA",
            "මම ගෙදර යනවා",
            "මම ගෙදර",
        ),
        ScenarioCase::forbidding(
            "Neg_0002",
            "Missing space joins the words",
            "mamaheta enavaa",
            "මම හෙට එනවා",
            "මම හෙට",
        ),
        // The forbidden phrase is unrelated to the input; kept as authored.
        ScenarioCase::forbidding(
            "Neg_0003",
            "Currency and units",
            "rupiyal 100k dhenna",
            "ඔයාට කොහොමද",
            "ඔයාට",
        ),
        ScenarioCase::forbidding(
            "Neg_0004",
            "Latin letters do not survive",
            "hello",
            "Hello",
            "Hello",
        ),
        ScenarioCase::forbidding(
            "Neg_0005",
            "Capitalised word in a sentence",
            "mama HETA enavaa",
            "මම හෙට එනවා",
            "මම හෙට",
        ),
        ScenarioCase::forbidding(
            "Neg_0006",
            "Missing subject",
            "pansal",
            "මම පන්සල්",
            "මම පන්සල්",
        ),
    ]
}

fn ui_cases() -> Vec<ScenarioCase> {
    vec![
        ScenarioCase::expecting(
            "UI_0001",
            "Typing with irregular spacing converges",
            "mama        pansal yanavaa",
            "මම පන්සල් යනවා",
            "මම පන්සල්",
        )
        .typed(TYPING_DELAY_MS),
        ScenarioCase::expecting(
            "UI_0002",
            "Clearing and retyping gives the same output",
            "mama heta enavaa",
            "මම හෙට එනවා",
            "මම හෙට",
        )
        .typed(TYPING_DELAY_MS)
        .reentered(),
    ]
}
