// Cantiga linguistic layer.
//
// Turns Portuguese text into annotated linguistic units that the music crate
// maps onto note events. No audio or pitch concepts live here.
//
// Architecture:
// - `types.rs`: Core types — `WordCategory`, `Emphasis`, `WordAnalysis`,
//   `StressResult`, `Dialect`, `Phoneme`
// - `classifier.rs`: Word classifier (closed-class lexicons, suffix regexes,
//   contextual and length-based fallbacks)
// - `phonotactics.rs`: Diphthong, onset-cluster, accent and suffix tables
// - `syllables.rs`: Syllabification and stress detection
// - `phonetics.rs`: Dialect-aware transliteration into a phoneme stream
// - `lib.rs` (this file): `Lexicon` struct — loads and queries the JSON
//   closed-class word lists
//
// The lexicon is loaded from `data/portuguese_lexicon.json` via
// `Lexicon::from_json()`. `default_lexicon()` embeds that file with
// `include_str!` and parses it once per process; every analyzer shares the
// same read-only instance.
//
// Determinism constraint: every function in this crate is a pure function of
// its inputs and the static tables. There is no RNG and no mutable global.

pub mod classifier;
pub mod phonetics;
pub mod phonotactics;
pub mod syllables;
pub mod types;

// Re-export key types at crate root for convenience.
pub use types::{
    ArticulationClass, Dialect, Emphasis, Phoneme, StressPattern, StressResult, WordAnalysis,
    WordCategory,
};

use std::collections::BTreeSet;
use std::sync::OnceLock;

/// The top-level JSON structure for the lexicon file.
#[derive(Debug, serde::Deserialize)]
struct LexiconFile {
    articles: Vec<String>,
    prepositions: Vec<String>,
    pronouns: Vec<String>,
    conjunctions: Vec<String>,
    interjections: Vec<String>,
    #[serde(default)]
    strong_monosyllables: Vec<String>,
    #[serde(default)]
    imperatives: Vec<String>,
    #[serde(default)]
    question_words: Vec<String>,
}

/// Closed-class word lists, keyed by lowercase form.
///
/// `BTreeSet` rather than `HashSet` so that iteration (used by tests and
/// diagnostics) is ordered and reproducible.
#[derive(Debug, Clone)]
pub struct Lexicon {
    articles: BTreeSet<String>,
    prepositions: BTreeSet<String>,
    pronouns: BTreeSet<String>,
    conjunctions: BTreeSet<String>,
    interjections: BTreeSet<String>,
    strong_monosyllables: BTreeSet<String>,
    imperatives: BTreeSet<String>,
    question_words: BTreeSet<String>,
}

fn to_set(words: Vec<String>) -> BTreeSet<String> {
    words.into_iter().map(|w| w.trim().to_lowercase()).collect()
}

impl Lexicon {
    /// Parse a lexicon from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: LexiconFile = serde_json::from_str(json)?;
        Ok(Lexicon {
            articles: to_set(file.articles),
            prepositions: to_set(file.prepositions),
            pronouns: to_set(file.pronouns),
            conjunctions: to_set(file.conjunctions),
            interjections: to_set(file.interjections),
            strong_monosyllables: to_set(file.strong_monosyllables),
            imperatives: to_set(file.imperatives),
            question_words: to_set(file.question_words),
        })
    }

    /// Exact-match lookup in the closed-class lists. Checked in priority
    /// order: articles, prepositions, pronouns, conjunctions, interjections.
    /// `word` must already be lowercase.
    pub fn closed_class(&self, word: &str) -> Option<WordCategory> {
        let tables = [
            (&self.articles, WordCategory::Article),
            (&self.prepositions, WordCategory::Preposition),
            (&self.pronouns, WordCategory::Pronoun),
            (&self.conjunctions, WordCategory::Conjunction),
            (&self.interjections, WordCategory::Interjection),
        ];
        tables
            .iter()
            .find(|(set, _)| set.contains(word))
            .map(|(_, cat)| *cat)
    }

    pub fn is_article(&self, word: &str) -> bool {
        self.articles.contains(word)
    }

    pub fn is_preposition(&self, word: &str) -> bool {
        self.prepositions.contains(word)
    }

    /// Semantically heavy monosyllables ("sol", "mar", "paz", ...).
    pub fn is_strong_monosyllable(&self, word: &str) -> bool {
        self.strong_monosyllables.contains(word)
    }

    pub fn is_imperative(&self, word: &str) -> bool {
        self.imperatives.contains(word)
    }

    pub fn is_question_word(&self, word: &str) -> bool {
        self.question_words.contains(word)
    }

    pub fn question_words(&self) -> impl Iterator<Item = &str> {
        self.question_words.iter().map(String::as_str)
    }
}

/// The embedded default lexicon, parsed on first use and shared afterwards.
///
/// Panics if the embedded JSON is malformed (should never happen in a
/// released build).
pub fn default_lexicon() -> &'static Lexicon {
    static LEXICON: OnceLock<Lexicon> = OnceLock::new();
    LEXICON.get_or_init(|| {
        let json = include_str!("../../data/portuguese_lexicon.json");
        Lexicon::from_json(json).expect("embedded portuguese_lexicon.json is malformed")
    })
}
