// Dialect-aware transliteration of Portuguese text into a phoneme stream.
//
// Pipeline:
// 1. Lowercase the text.
// 2. Collapse the digraphs ("rr", "ch", "lh", "nh", "ss"), then nasalize a
//    vowel followed by a coda m/n, then apply the consonant rules: "qu" and
//    "gu", soft c/g, silent h, strong initial r, intervocalic s.
// 3. Apply the rules of the selected `Dialect`: word-final vowel reduction,
//    ti/di palatalization, and the dialect's realization of final s, r and l.
// 4. Scan left to right: a vowel pair found in the diphthong table becomes
//    vowel + glide, any other known character becomes one phoneme,
//    whitespace becomes a word-boundary marker and punctuation a pause
//    marker. Letters and digits with no Portuguese phoneme are kept as-is
//    with the `Other` class; remaining symbols are dropped.
//
// Substituted sounds are written back into the string as single IPA
// characters (ʃ, ʎ, ɲ, ʁ, ʧ, ʤ, ...), so every phoneme is exactly one char
// and the final scan needs no multi-character lookups besides diphthongs.
//
// All rule sets are compiled once per process and shared read-only.

use crate::phonotactics::is_diphthong;
use crate::types::{ArticulationClass, Dialect, Phoneme};
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// A regex substitution applied to the whole lowercased text.
struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    fn new(pattern: &str, replacement: &'static str) -> Self {
        Rule {
            pattern: Regex::new(pattern).expect("invalid regex pattern"),
            replacement,
        }
    }

    fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement)
            .into_owned()
    }
}

const FRONT_VOWELS: &str = "eiéêíẽĩ";

/// Spelling normalization and digraphs, applied before nasalization.
fn digraph_rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            // Foreign letters first so later rules see native spelling.
            Rule::new("w", "u"),
            Rule::new("y", "i"),
            Rule::new("rr", "ʁ"),
            Rule::new("ch", "ʃ"),
            Rule::new("lh", "ʎ"),
            Rule::new("nh", "ɲ"),
            Rule::new("ss", "s"),
        ]
    })
}

/// Consonant spelling rules, applied after nasalization.
fn consonant_rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            Rule::new(&format!("q[uü]([{FRONT_VOWELS}])"), "k$1"),
            Rule::new("q[uü]", "kw"),
            // IPA ɡ (U+0261) so the soft-g rule below leaves it alone.
            Rule::new(&format!("g[uü]([{FRONT_VOWELS}])"), "ɡ$1"),
            Rule::new("ç", "s"),
            Rule::new(&format!("c([{FRONT_VOWELS}])"), "s$1"),
            Rule::new("c", "k"),
            Rule::new(&format!("g([{FRONT_VOWELS}])"), "ʒ$1"),
            Rule::new("j", "ʒ"),
            Rule::new("h", ""),
            Rule::new(r"\br", "ʁ"),
            Rule::new("([nls])r", "${1}ʁ"),
            Rule::new("x", "ʃ"),
            Rule::new(
                "([aeiouáéíóúâêôãõ])s([aeiouáéíóúâêôãõ])",
                "${1}z${2}",
            ),
        ]
    })
}

fn dialect_rules(dialect: Dialect) -> &'static [Rule] {
    static RULES: OnceLock<[Vec<Rule>; 4]> = OnceLock::new();
    let all = RULES.get_or_init(|| {
        // Not after a nasal vowel: "mão" and "põe" keep their diphthongs.
        let raise_final_o = || Rule::new(r"(^|[^ãõ])o\b", "${1}u");
        let reduce_final_vowels = || vec![Rule::new(r"(^|[^ãõ])e\b", "${1}i"), raise_final_o()];
        let palatalize = || {
            vec![
                Rule::new("t([ií])", "ʧ$1"),
                Rule::new("d([ií])", "ʤ$1"),
            ]
        };
        let vocalize_l = || Rule::new(r"l\b", "w");

        let mut paulista = reduce_final_vowels();
        paulista.extend(palatalize());
        paulista.push(Rule::new(r"r\b", "ɹ"));
        paulista.push(vocalize_l());

        let mut carioca = reduce_final_vowels();
        carioca.extend(palatalize());
        carioca.push(Rule::new(r"s\b", "ʃ"));
        carioca.push(Rule::new("s([ptkfbdgɡmnlvʁ])", "ʃ$1"));
        carioca.push(Rule::new(r"r\b", "χ"));
        carioca.push(vocalize_l());

        let mut nordestino = reduce_final_vowels();
        nordestino.push(Rule::new(r"r\b", "h"));
        nordestino.push(vocalize_l());

        let gaucho = vec![raise_final_o(), Rule::new(r"r\b", "ɾ")];

        [paulista, carioca, nordestino, gaucho]
    });
    let idx = match dialect {
        Dialect::Paulista => 0,
        Dialect::Carioca => 1,
        Dialect::Nordestino => 2,
        Dialect::Gaucho => 3,
    };
    &all[idx]
}

/// Vowel followed by m/n before a consonant or the end of the text becomes
/// a nasal vowel; the nasal consonant is absorbed.
fn nasalize_vowels(text: &str) -> String {
    static NASAL: OnceLock<Regex> = OnceLock::new();
    let re = NASAL.get_or_init(|| {
        Regex::new("([aeiouâêô])[mn]([^aeiouáéíóúâêôãõ]|$)").expect("invalid regex pattern")
    });
    re.replace_all(text, |caps: &Captures| {
        let nasal = match &caps[1] {
            "a" | "â" => 'ã',
            "e" | "ê" => 'ẽ',
            "i" => 'ĩ',
            "o" | "ô" => 'õ',
            _ => 'ũ',
        };
        format!("{nasal}{}", &caps[2])
    })
    .into_owned()
}

/// Rewrite `text` into the single-char phonemic spelling used by the scan.
/// Exposed for diagnostics; `to_phonemes` is the normal entry point.
pub fn transliterate(text: &str, dialect: Dialect) -> String {
    let mut out = text.to_lowercase();
    for rule in digraph_rules() {
        out = rule.apply(&out);
    }
    // After "nh" has collapsed to ɲ, so only real m/n codas nasalize.
    out = nasalize_vowels(&out);
    for rule in consonant_rules().iter().chain(dialect_rules(dialect)) {
        out = rule.apply(&out);
    }
    out
}

fn phoneme(symbol: char, class: ArticulationClass) -> Phoneme {
    let is_nasal = matches!(class, ArticulationClass::NasalVowel | ArticulationClass::Nasal);
    Phoneme {
        symbol,
        class,
        is_nasal,
    }
}

/// Map one transliterated character to its phoneme.
fn lookup(c: char) -> Option<Phoneme> {
    use ArticulationClass::*;
    let (symbol, class) = match c {
        'a' | 'á' | 'à' => ('a', Vowel),
        'â' => ('ɐ', Vowel),
        'e' | 'ê' => ('e', Vowel),
        'é' => ('ɛ', Vowel),
        'i' | 'í' => ('i', Vowel),
        'o' | 'ô' => ('o', Vowel),
        'ó' => ('ɔ', Vowel),
        'u' | 'ú' => ('u', Vowel),
        'ã' | 'ẽ' | 'ĩ' | 'õ' | 'ũ' => (c, NasalVowel),
        'ü' => ('w', Glide),
        'p' | 't' | 'k' | 'b' | 'd' => (c, Plosive),
        'g' | 'ɡ' => ('g', Plosive),
        'f' | 'v' | 's' | 'z' | 'ʃ' | 'ʒ' | 'h' | 'χ' => (c, Fricative),
        'ʧ' | 'ʤ' => (c, Affricate),
        'm' | 'n' | 'ɲ' => (c, Nasal),
        'l' | 'ʎ' => (c, Lateral),
        'r' | 'ʁ' | 'ɹ' | 'ɾ' => (c, Rhotic),
        'j' | 'w' => (c, Glide),
        _ => return None,
    };
    Some(phoneme(symbol, class))
}

fn glide_for(second: char) -> char {
    match second {
        'u' | 'o' | 'ô' => 'w',
        _ => 'j',
    }
}

/// Punctuation that becomes a pause marker.
pub fn is_pause_char(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '…' | '¿' | '¡' | '«' | '»' | '—' | '–')
}

/// Transliterate `text` into an ordered phoneme stream for `dialect`.
///
/// Runs of whitespace collapse into one word-boundary marker, runs of
/// punctuation into one pause marker. Leading and trailing word boundaries
/// are dropped.
pub fn to_phonemes(text: &str, dialect: Dialect) -> Vec<Phoneme> {
    let spelled: Vec<char> = transliterate(text, dialect).chars().collect();
    let mut out: Vec<Phoneme> = Vec::with_capacity(spelled.len());

    let mut i = 0;
    while i < spelled.len() {
        let c = spelled[i];
        if c.is_whitespace() {
            let last_is_marker = out.last().is_none_or(Phoneme::is_marker);
            if !last_is_marker {
                out.push(Phoneme::boundary());
            }
            i += 1;
            continue;
        }
        if is_pause_char(c) {
            if out.last().map(|p| p.class) != Some(ArticulationClass::Pause) {
                if out.last().map(|p| p.class) == Some(ArticulationClass::WordBoundary) {
                    out.pop();
                }
                out.push(Phoneme::pause());
            }
            i += 1;
            continue;
        }
        let next = spelled.get(i + 1).copied();
        match (lookup(c), next) {
            (Some(vowel), Some(next)) if is_diphthong(c, next) => {
                let mut glide = phoneme(glide_for(next), ArticulationClass::Glide);
                glide.is_nasal = vowel.is_nasal;
                out.push(vowel);
                out.push(glide);
                i += 2;
            }
            (Some(p), _) => {
                out.push(p);
                i += 1;
            }
            (None, _) if c.is_alphanumeric() => {
                out.push(phoneme(c, ArticulationClass::Other));
                i += 1;
            }
            (None, _) => i += 1,
        }
    }

    if out.last().map(|p| p.class) == Some(ArticulationClass::WordBoundary) {
        out.pop();
    }
    out
}

/// The phoneme symbols of `text` as a string, for logging and tests.
pub fn phoneme_string(phonemes: &[Phoneme]) -> String {
    phonemes.iter().map(|p| p.symbol).collect()
}
