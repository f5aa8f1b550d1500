// Core linguistic types: word categories, emphasis levels, stress results,
// dialects, and phonemes.
//
// These types are shared by every analyzer in this crate and consumed by the
// music crate, which turns them into note-event parameters. They carry no
// musical data themselves (no pitches, no durations) so that the linguistic
// layer stays independent of how it is rendered.
//
// The type hierarchy is:
// - `WordCategory` — grammatical category of a token, with its fixed
//   weight / octave shift / emphasis table
// - `Emphasis` — six-point emphasis scale (very weak → extreme)
// - `WordAnalysis` — one classified whitespace token with its span in the text
// - `StressPattern` / `StressResult` — syllable breakdown + stress position
// - `Dialect` — regional variant selecting the transliteration rules
// - `ArticulationClass` / `Phoneme` — one unit of the phoneme stream
//
// Determinism constraint: nothing here may depend on hashing order or any
// process-global mutable state. All tables are `match` arms or `const`s.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grammatical category assigned by the word classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordCategory {
    Article,
    Preposition,
    Pronoun,
    Conjunction,
    Interjection,
    Adverb,
    Verb,
    Adjective,
    Noun,
    /// Token with no letters at all. Excluded from musical weighting.
    Punctuation,
}

impl WordCategory {
    pub const ALL: [WordCategory; 10] = [
        WordCategory::Article,
        WordCategory::Preposition,
        WordCategory::Pronoun,
        WordCategory::Conjunction,
        WordCategory::Interjection,
        WordCategory::Adverb,
        WordCategory::Verb,
        WordCategory::Adjective,
        WordCategory::Noun,
        WordCategory::Punctuation,
    ];

    /// Musical weight in [0.2, 1.0]. Content words weigh more than
    /// function words.
    pub fn weight(self) -> f32 {
        match self {
            WordCategory::Noun => 1.0,
            WordCategory::Interjection => 1.0,
            WordCategory::Verb => 0.9,
            WordCategory::Adjective => 0.7,
            WordCategory::Adverb => 0.6,
            WordCategory::Pronoun => 0.5,
            WordCategory::Conjunction => 0.3,
            WordCategory::Preposition => 0.3,
            WordCategory::Article => 0.2,
            WordCategory::Punctuation => 0.2,
        }
    }

    /// Octave shift in [-2, +2] applied by the musical-grammar stage.
    pub fn octave_shift(self) -> i8 {
        match self {
            WordCategory::Interjection => 2,
            WordCategory::Verb | WordCategory::Adjective => 1,
            WordCategory::Noun | WordCategory::Adverb | WordCategory::Pronoun => 0,
            WordCategory::Preposition | WordCategory::Conjunction => -1,
            WordCategory::Article => -2,
            WordCategory::Punctuation => 0,
        }
    }

    pub fn emphasis(self) -> Emphasis {
        match self {
            WordCategory::Interjection => Emphasis::Extreme,
            WordCategory::Verb => Emphasis::VeryStrong,
            WordCategory::Noun => Emphasis::Strong,
            WordCategory::Adjective | WordCategory::Adverb => Emphasis::Medium,
            WordCategory::Pronoun | WordCategory::Conjunction => Emphasis::Weak,
            WordCategory::Article | WordCategory::Preposition | WordCategory::Punctuation => {
                Emphasis::VeryWeak
            }
        }
    }

    /// Whether this category takes part in musical weighting at all.
    pub fn is_musical(self) -> bool {
        self != WordCategory::Punctuation
    }

    /// Content words (verbs and nouns) get extra prosodic stress.
    pub fn is_content(self) -> bool {
        matches!(self, WordCategory::Verb | WordCategory::Noun)
    }

    pub fn name(self) -> &'static str {
        match self {
            WordCategory::Article => "article",
            WordCategory::Preposition => "preposition",
            WordCategory::Pronoun => "pronoun",
            WordCategory::Conjunction => "conjunction",
            WordCategory::Interjection => "interjection",
            WordCategory::Adverb => "adverb",
            WordCategory::Verb => "verb",
            WordCategory::Adjective => "adjective",
            WordCategory::Noun => "noun",
            WordCategory::Punctuation => "punctuation",
        }
    }
}

impl fmt::Display for WordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Six-point emphasis scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    VeryWeak,
    Weak,
    Medium,
    Strong,
    VeryStrong,
    Extreme,
}

impl Emphasis {
    /// Velocity multiplier for this emphasis level.
    pub fn velocity_factor(self) -> f32 {
        match self {
            Emphasis::VeryWeak => 0.6,
            Emphasis::Weak => 0.75,
            Emphasis::Medium => 0.9,
            Emphasis::Strong => 1.0,
            Emphasis::VeryStrong => 1.1,
            Emphasis::Extreme => 1.25,
        }
    }
}

/// One classified whitespace-delimited token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordAnalysis {
    /// The token exactly as it appeared in the text.
    pub word: String,
    /// Lowercase letters only.
    pub cleaned_form: String,
    pub category: WordCategory,
    pub weight: f32,
    pub octave_shift: i8,
    pub emphasis: Emphasis,
    /// Character index of the token's first char in the input (inclusive).
    pub start: usize,
    /// Character index one past the token's last char (exclusive).
    pub end: usize,
}

/// Where the primary stress of a word falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressPattern {
    /// Stress on the last syllable.
    Oxytone,
    /// Stress on the second-to-last syllable.
    Paroxytone,
    /// Stress on the third-to-last syllable.
    Proparoxytone,
    Monosyllable,
}

impl StressPattern {
    /// Stressed syllable index for a word of `count` syllables, clamped to
    /// a valid index.
    pub fn stressed_index(self, count: usize) -> usize {
        let from_end = match self {
            StressPattern::Oxytone | StressPattern::Monosyllable => 1,
            StressPattern::Paroxytone => 2,
            StressPattern::Proparoxytone => 3,
        };
        count.saturating_sub(from_end)
    }

    /// Classify a stressed index back into a pattern.
    pub fn from_index(index: usize, count: usize) -> Self {
        if count <= 1 {
            return StressPattern::Monosyllable;
        }
        match count - 1 - index.min(count - 1) {
            0 => StressPattern::Oxytone,
            1 => StressPattern::Paroxytone,
            _ => StressPattern::Proparoxytone,
        }
    }
}

/// Syllable breakdown and stress position of one word. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressResult {
    pub syllables: Vec<String>,
    /// Always `< syllables.len()` (a word with no syllables is stored as a
    /// single empty syllable).
    pub stressed_syllable_index: usize,
    pub pattern: StressPattern,
    /// How sure the detector is, in [0, 1]. 1.0 only for graphic accents.
    pub confidence: f32,
}

impl StressResult {
    pub fn is_stressed(&self, syllable: usize) -> bool {
        syllable == self.stressed_syllable_index
    }
}

/// Regional variant of Brazilian Portuguese used for transliteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// São Paulo: palatalized ti/di, retroflex final r.
    #[default]
    Paulista,
    /// Rio de Janeiro: palatalized ti/di, hissing final s, guttural r.
    Carioca,
    /// Northeast: no ti/di palatalization, aspirated final r.
    Nordestino,
    /// Rio Grande do Sul: no palatalization, final l kept, tapped r.
    Gaucho,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [
        Dialect::Paulista,
        Dialect::Carioca,
        Dialect::Nordestino,
        Dialect::Gaucho,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Paulista => "paulista",
            Dialect::Carioca => "carioca",
            Dialect::Nordestino => "nordestino",
            Dialect::Gaucho => "gaucho",
        }
    }

    /// Parse a dialect name, falling back to the default on anything
    /// unrecognized.
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!(dialect = name, "unknown dialect, using paulista");
            Dialect::default()
        })
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paulista" | "sp" | "sao_paulo" => Ok(Dialect::Paulista),
            "carioca" | "rj" | "rio" => Ok(Dialect::Carioca),
            "nordestino" | "ne" | "nordeste" => Ok(Dialect::Nordestino),
            "gaucho" | "gaúcho" | "rs" | "sulista" => Ok(Dialect::Gaucho),
            other => Err(format!("unknown dialect '{other}'")),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a phoneme is articulated. Word boundaries and pauses live in the
/// same stream as ordinary phonemes and are distinguished here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticulationClass {
    Vowel,
    NasalVowel,
    /// Semivowel closing a diphthong (j, w).
    Glide,
    Plosive,
    Fricative,
    Affricate,
    Nasal,
    Lateral,
    Rhotic,
    /// A letter or digit with no Portuguese sound, kept as written.
    Other,
    WordBoundary,
    Pause,
}

impl ArticulationClass {
    pub fn is_vowel(self) -> bool {
        matches!(self, ArticulationClass::Vowel | ArticulationClass::NasalVowel)
    }

    /// Word boundaries and pauses are silent markers, not sounds.
    pub fn is_marker(self) -> bool {
        matches!(
            self,
            ArticulationClass::WordBoundary | ArticulationClass::Pause
        )
    }
}

/// One unit of the phoneme stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phoneme {
    pub symbol: char,
    pub class: ArticulationClass,
    pub is_nasal: bool,
}

impl Phoneme {
    /// Symbol used for word-boundary markers.
    pub const BOUNDARY_SYMBOL: char = ' ';
    /// Symbol used for pause markers.
    pub const PAUSE_SYMBOL: char = '|';

    pub fn boundary() -> Self {
        Phoneme {
            symbol: Self::BOUNDARY_SYMBOL,
            class: ArticulationClass::WordBoundary,
            is_nasal: false,
        }
    }

    pub fn pause() -> Self {
        Phoneme {
            symbol: Self::PAUSE_SYMBOL,
            class: ArticulationClass::Pause,
            is_nasal: false,
        }
    }

    pub fn is_marker(&self) -> bool {
        self.class.is_marker()
    }
}

/// Plain and accented Portuguese vowels.
pub fn is_vowel_char(c: char) -> bool {
    matches!(
        c,
        'a' | 'e'
            | 'i'
            | 'o'
            | 'u'
            | 'á'
            | 'à'
            | 'â'
            | 'ã'
            | 'é'
            | 'ê'
            | 'í'
            | 'ó'
            | 'ô'
            | 'õ'
            | 'ú'
            | 'ü'
            | 'A'
            | 'E'
            | 'I'
            | 'O'
            | 'U'
            | 'Á'
            | 'À'
            | 'Â'
            | 'Ã'
            | 'É'
            | 'Ê'
            | 'Í'
            | 'Ó'
            | 'Ô'
            | 'Õ'
            | 'Ú'
    )
}
