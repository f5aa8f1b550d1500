// Mood inference, sentence typing and chord-progression selection.
//
// Three independent analyses of the whole input text:
//
// 1. Mood. Whitespace tokens are cleaned (lowercase letters only) and
//    matched against the seven keyword lists in `data/mood_lexicon.json`.
//    A token counts once per mood when it equals a keyword, or when one
//    contains the other and the shorter of the two has at least three
//    letters, so inflected forms ("felizes", "tristes") still match while
//    one- and two-letter tokens never do. The dominant mood is the
//    arg-max (ties go to the mood listed first); confidence is
//    `min(1, score / (word_count / 10))`. No match at all gives `Neutral`
//    with confidence 0.
//
// 2. Sentence type. Punctuation decides first: a trailing "?" makes a
//    question (WH when the text opens with a question word, else yes/no),
//    a trailing "!" an exclamation. Otherwise a leading imperative verb
//    makes a command, and anything else is a statement.
//
// 3. Progression. Each mood maps to one of six fixed progressions; a
//    WH-question always gets the suspended progression and an exclamation
//    always gets the dramatic one, whatever the mood. Degrees resolve to
//    chord names in the configured key, and the bass line plays each chord
//    root in octave 2 as a whole note.
//
// `apply_harmony` spreads the progression evenly over an event sequence and
// scales note velocity by chord tension and mood.

use crate::error::AnalysisError;
use crate::note::{HarmonicContext, NoteDuration, NoteEvent, Pitch};
use crate::scale::MusicalKey;
use cantiga_lang::classifier::clean_word;
use cantiga_lang::{Lexicon, default_lexicon};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Shorter side of a substring match must be at least this long.
const MIN_PARTIAL_MATCH: usize = 3;
const BASS_OCTAVE: i8 = 2;
const BASS_VELOCITY: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Romantic,
    Energetic,
    Calm,
    Mysterious,
    Spiritual,
    Neutral,
}

impl Mood {
    pub fn name(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Romantic => "romantic",
            Mood::Energetic => "energetic",
            Mood::Calm => "calm",
            Mood::Mysterious => "mysterious",
            Mood::Spiritual => "spiritual",
            Mood::Neutral => "neutral",
        }
    }

    /// Final velocity scaling applied after chord tension.
    pub fn velocity_multiplier(self) -> f32 {
        match self {
            Mood::Energetic => 1.2,
            Mood::Calm => 0.8,
            Mood::Mysterious => 0.9,
            Mood::Romantic => 1.1,
            _ => 1.0,
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Deserialize)]
struct MoodLexiconFile {
    moods: Vec<MoodEntry>,
}

#[derive(Debug, Deserialize)]
struct MoodEntry {
    mood: Mood,
    keywords: Vec<String>,
}

/// Keyword lists per mood, in the order they appear in the source file.
#[derive(Debug, Clone)]
pub struct MoodLexicon {
    moods: Vec<(Mood, Vec<String>)>,
}

impl MoodLexicon {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: MoodLexiconFile = serde_json::from_str(json)?;
        let moods = file
            .moods
            .into_iter()
            .map(|e| {
                let keywords = e.keywords.iter().map(|k| clean_word(k)).collect();
                (e.mood, keywords)
            })
            .collect();
        Ok(MoodLexicon { moods })
    }

    /// Number of tokens of `words` matching each mood, in lexicon order.
    fn scores(&self, words: &[String]) -> Vec<MoodScore> {
        self.moods
            .iter()
            .map(|(mood, keywords)| MoodScore {
                mood: *mood,
                score: words
                    .iter()
                    .filter(|w| keywords.iter().any(|k| keyword_matches(w, k)))
                    .count() as u32,
            })
            .collect()
    }
}

/// The embedded mood lexicon, parsed once.
pub fn default_mood_lexicon() -> &'static MoodLexicon {
    static LEXICON: OnceLock<MoodLexicon> = OnceLock::new();
    LEXICON.get_or_init(|| {
        let json = include_str!("../../data/mood_lexicon.json");
        MoodLexicon::from_json(json).expect("embedded mood_lexicon.json is malformed")
    })
}

fn keyword_matches(word: &str, keyword: &str) -> bool {
    if word == keyword {
        return true;
    }
    let shorter = word.chars().count().min(keyword.chars().count());
    shorter >= MIN_PARTIAL_MATCH && (word.contains(keyword) || keyword.contains(word))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodScore {
    pub mood: Mood,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodAnalysis {
    pub dominant_mood: Mood,
    pub confidence: f32,
    pub scores: Vec<MoodScore>,
}

fn cleaned_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(clean_word)
        .filter(|w| !w.is_empty())
        .collect()
}

/// Score `text` against a mood lexicon.
pub fn analyze_mood_with(text: &str, lexicon: &MoodLexicon) -> MoodAnalysis {
    let words = cleaned_words(text);
    let scores = lexicon.scores(&words);

    // First maximum wins ties.
    let best = scores
        .iter()
        .fold(None::<MoodScore>, |best, s| match best {
            Some(b) if b.score >= s.score => Some(b),
            _ => Some(*s),
        })
        .filter(|b| b.score > 0);

    match best {
        Some(b) => MoodAnalysis {
            dominant_mood: b.mood,
            confidence: (b.score as f32 * 10.0 / words.len() as f32).min(1.0),
            scores,
        },
        None => MoodAnalysis {
            dominant_mood: Mood::Neutral,
            confidence: 0.0,
            scores,
        },
    }
}

pub fn analyze_mood(text: &str) -> MoodAnalysis {
    analyze_mood_with(text, default_mood_lexicon())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Wh,
    YesNo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentenceType {
    Question(QuestionKind),
    Exclamation,
    Command,
    Statement,
}

/// Case-insensitive "text opens with a question word" pattern, built from
/// the lexicon's question words (longest first) plus "por que".
fn wh_regex(lexicon: &Lexicon) -> Regex {
    let mut words: Vec<&str> = lexicon.question_words().collect();
    words.push("por que");
    words.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));
    let alternatives: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    let pattern = format!(r"(?i)^\W*(?:{})\b", alternatives.join("|"));
    Regex::new(&pattern).expect("invalid regex pattern")
}

fn default_wh_regex() -> &'static Regex {
    static WH: OnceLock<Regex> = OnceLock::new();
    WH.get_or_init(|| wh_regex(default_lexicon()))
}

fn classify_sentence(text: &str, lexicon: &Lexicon, wh: &Regex) -> SentenceType {
    let trimmed = text.trim_end();
    let closing: String = trimmed
        .chars()
        .rev()
        .take_while(|c| !c.is_alphanumeric() && !c.is_whitespace())
        .collect();

    if closing.contains('?') {
        return SentenceType::Question(if wh.is_match(trimmed) {
            QuestionKind::Wh
        } else {
            QuestionKind::YesNo
        });
    }
    if closing.contains('!') {
        return SentenceType::Exclamation;
    }

    let first = trimmed.split_whitespace().next().map(clean_word);
    match first {
        Some(w) if lexicon.is_imperative(&w) => SentenceType::Command,
        _ => SentenceType::Statement,
    }
}

/// Question / exclamation / command / statement, punctuation first.
pub fn detect_sentence_type(text: &str) -> SentenceType {
    classify_sentence(text, default_lexicon(), default_wh_regex())
}

/// A named chord progression with one tension value per degree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progression {
    pub id: &'static str,
    pub degrees: &'static [&'static str],
    pub tension: &'static [f32],
    pub mood_label: &'static str,
}

pub const POP: Progression = Progression {
    id: "pop",
    degrees: &["I", "V", "vi", "IV"],
    tension: &[0.0, 0.6, 0.4, 0.3],
    mood_label: "uplifting",
};

pub const MELANCHOLIC: Progression = Progression {
    id: "melancholic",
    degrees: &["vi", "IV", "I", "V"],
    tension: &[0.4, 0.3, 0.1, 0.7],
    mood_label: "melancholic",
};

pub const ROMANTIC: Progression = Progression {
    id: "romantic",
    degrees: &["I", "vi", "ii", "V"],
    tension: &[0.0, 0.4, 0.5, 0.8],
    mood_label: "tender",
};

pub const PLAGAL: Progression = Progression {
    id: "plagal",
    degrees: &["I", "IV", "I", "V"],
    tension: &[0.0, 0.3, 0.0, 0.5],
    mood_label: "serene",
};

pub const SUSPENDED: Progression = Progression {
    id: "suspended",
    degrees: &["ii", "V", "IV", "V"],
    tension: &[0.5, 0.8, 0.6, 0.9],
    mood_label: "unresolved",
};

pub const DRAMATIC: Progression = Progression {
    id: "dramatic",
    degrees: &["vi", "ii", "V", "I"],
    tension: &[0.5, 0.6, 0.9, 0.2],
    mood_label: "dramatic",
};

pub const PROGRESSIONS: [&Progression; 6] =
    [&POP, &MELANCHOLIC, &ROMANTIC, &PLAGAL, &SUSPENDED, &DRAMATIC];

/// Progression for a mood, with WH-questions and exclamations overriding.
pub fn progression_for(mood: Mood, sentence: SentenceType) -> &'static Progression {
    match sentence {
        SentenceType::Question(QuestionKind::Wh) => return &SUSPENDED,
        SentenceType::Exclamation => return &DRAMATIC,
        _ => {}
    }
    match mood {
        Mood::Happy | Mood::Neutral => &POP,
        Mood::Sad => &MELANCHOLIC,
        Mood::Romantic => &ROMANTIC,
        Mood::Calm | Mood::Spiritual => &PLAGAL,
        Mood::Mysterious => &SUSPENDED,
        Mood::Energetic => &DRAMATIC,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BassNote {
    pub pitch: Pitch,
    pub duration: NoteDuration,
    pub velocity: f32,
}

/// Harmony chosen for one input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonicPlan {
    pub progression_id: String,
    pub roman_degrees: Vec<String>,
    pub chords: Vec<String>,
    pub tension_curve: Vec<f32>,
    pub mood_label: String,
    pub mood: MoodAnalysis,
    pub sentence_type: SentenceType,
    pub key: MusicalKey,
    pub bass_line: Vec<BassNote>,
}

impl HarmonicPlan {
    /// Resolve `progression` in `key`.
    pub fn build(
        progression: &Progression,
        key: MusicalKey,
        mood: MoodAnalysis,
        sentence_type: SentenceType,
    ) -> Result<Self, AnalysisError> {
        let mut chords = Vec::with_capacity(progression.degrees.len());
        let mut bass_line = Vec::with_capacity(progression.degrees.len());
        for degree in progression.degrees {
            let chord = key.chord(degree)?;
            bass_line.push(BassNote {
                pitch: Pitch::from_parts(chord.root_pitch_class, BASS_OCTAVE),
                duration: NoteDuration::Whole,
                velocity: BASS_VELOCITY,
            });
            chords.push(chord.name);
        }
        Ok(HarmonicPlan {
            progression_id: progression.id.to_string(),
            roman_degrees: progression.degrees.iter().map(|d| d.to_string()).collect(),
            chords,
            tension_curve: progression.tension.to_vec(),
            mood_label: progression.mood_label.to_string(),
            mood,
            sentence_type,
            key,
            bass_line,
        })
    }

    /// Index of the chord under event `index` of a `len`-event sequence.
    pub fn chord_index(&self, index: usize, len: usize) -> usize {
        if self.chords.is_empty() || len == 0 {
            return 0;
        }
        (index * self.chords.len() / len).min(self.chords.len() - 1)
    }
}

/// Mood and sentence type of `text`, then the matching progression in `key`.
pub fn select_progression(text: &str, key: MusicalKey) -> Result<HarmonicPlan, AnalysisError> {
    let mood = analyze_mood(text);
    let sentence_type = detect_sentence_type(text);
    let progression = progression_for(mood.dominant_mood, sentence_type);
    HarmonicPlan::build(progression, key, mood, sentence_type)
}

/// `velocity * (0.7 + 0.3 * tension)`, then the mood multiplier.
pub fn harmonic_velocity(velocity: f32, tension: f32, mood: Mood) -> f32 {
    velocity * (0.7 + tension * 0.3) * mood.velocity_multiplier()
}

/// Attach the chord under each event and shape note velocity by tension.
pub fn apply_harmony(events: &[NoteEvent], plan: &HarmonicPlan) -> Vec<NoteEvent> {
    let len = events.len();
    events
        .iter()
        .enumerate()
        .map(|(i, event)| {
            let mut event = event.clone();
            if plan.chords.is_empty() {
                return event;
            }
            let c = plan.chord_index(i, len);
            let tension = plan.tension_curve.get(c).copied().unwrap_or(0.0);
            event.harmonic_context = Some(HarmonicContext {
                chord: plan.chords[c].clone(),
                roman_degree: plan.roman_degrees[c].clone(),
                tension,
            });
            if !event.is_silent() {
                event.velocity =
                    harmonic_velocity(event.velocity, tension, plan.mood.dominant_mood)
                        .clamp(0.0, 1.0);
            }
            event
        })
        .collect()
}
