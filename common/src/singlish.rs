//! Reference Singlish to Sinhala transliterator served by the fixture site.
//!
//! Letters follow the common phonetic keyboard scheme: lowercase consonants map
//! to the plain letter, a handful of uppercase consonants map to their aspirated
//! or retroflex counterparts, and any other uppercase letter folds to lowercase.
//! A consonant that is not followed by a vowel receives the virama.

const VIRAMA: &str = "\u{0DCA}";

const UPPER_SIGNIFICANT: &[char] = &['A', 'B', 'C', 'D', 'G', 'K', 'L', 'M', 'N', 'P', 'S', 'T'];

// Longest keys first within each table.
const CONSONANTS: &[(&str, &str)] = &[
    ("Th", "ථ"),
    ("Dh", "ධ"),
    ("Ch", "ඡ"),
    ("Sh", "ෂ"),
    ("th", "ත"),
    ("dh", "ද"),
    ("ch", "ච"),
    ("sh", "ශ"),
    ("K", "ඛ"),
    ("G", "ඝ"),
    ("C", "ඡ"),
    ("T", "ඨ"),
    ("D", "ඪ"),
    ("N", "ණ"),
    ("P", "ඵ"),
    ("B", "භ"),
    ("M", "ඹ"),
    ("L", "ළ"),
    ("S", "ෂ"),
    ("k", "ක"),
    ("g", "ග"),
    ("c", "ච"),
    ("j", "ජ"),
    ("t", "ට"),
    ("d", "ඩ"),
    ("n", "න"),
    ("p", "ප"),
    ("b", "බ"),
    ("m", "ම"),
    ("y", "ය"),
    ("r", "ර"),
    ("l", "ල"),
    ("v", "ව"),
    ("w", "ව"),
    ("s", "ස"),
    ("h", "හ"),
    ("f", "ෆ"),
];

// (key, independent letter, dependent sign)
const VOWELS: &[(&str, &str, &str)] = &[
    ("aa", "ආ", "\u{0DCF}"),
    ("ae", "ඇ", "\u{0DD0}"),
    ("ii", "ඊ", "\u{0DD3}"),
    ("uu", "ඌ", "\u{0DD6}"),
    ("ee", "ඒ", "\u{0DDA}"),
    ("oo", "ඕ", "\u{0DDD}"),
    ("ai", "ඓ", "\u{0DDB}"),
    ("au", "ඖ", "\u{0DDE}"),
    ("a", "අ", ""),
    ("A", "ඇ", "\u{0DD0}"),
    ("i", "ඉ", "\u{0DD2}"),
    ("u", "උ", "\u{0DD4}"),
    ("e", "එ", "\u{0DD9}"),
    ("o", "ඔ", "\u{0DDC}"),
];

/// Transliterates `text` word by word. Words are split on any whitespace and
/// rejoined with single spaces.
pub fn transliterate(text: &str) -> String {
    text.split_whitespace()
        .map(transliterate_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn transliterate_word(word: &str) -> String {
    let folded: String = word
        .chars()
        .map(|c| {
            if c.is_ascii_uppercase() && !UPPER_SIGNIFICANT.contains(&c) {
                c.to_ascii_lowercase()
            } else {
                c
            }
        })
        .collect();

    let mut out = String::with_capacity(folded.len() * 3);
    let mut rest = folded.as_str();
    while let Some(c) = rest.chars().next() {
        if let Some((key, letter)) = longest(CONSONANTS, rest, |&(k, _)| k) {
            out.push_str(letter);
            rest = &rest[key.len()..];
            match longest(VOWELS, rest, |&(k, _, _)| k) {
                Some((key, _, sign)) => {
                    out.push_str(sign);
                    rest = &rest[key.len()..];
                }
                None => out.push_str(VIRAMA),
            }
        } else if let Some((key, letter, _)) = longest(VOWELS, rest, |&(k, _, _)| k) {
            out.push_str(letter);
            rest = &rest[key.len()..];
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    out
}

fn longest<'t, T>(table: &'t [T], input: &str, key: impl Fn(&T) -> &str) -> Option<&'t T> {
    table.iter().find(|entry| input.starts_with(key(entry)))
}
