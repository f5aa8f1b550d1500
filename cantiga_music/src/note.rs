// Pitch, duration and note-event primitives.
//
// Every stage of the pipeline reads and writes `NoteEvent`s. A pitch is a
// MIDI note number (C4 = 60) printed in scientific notation; register
// changes go through `Pitch::transpose` / `Pitch::apply_octave_shift`, which
// clamp into octaves 1..=7 so no stage can push a note out of a singable or
// playable range.
//
// Durations use one canonical ladder for the whole crate:
// 32nd -> 16th -> 8th -> quarter -> half -> whole. `lengthen` saturates at
// half and `shorten` at 32nd, so repeated emphasis never produces a whole
// note; whole notes only appear where a stage asks for one explicitly (the
// bass line).
//
// Silence invariant: an event's `pitch` is `None` exactly when its `kind` is
// a silent kind (rest, pause, word boundary). The constructors enforce it and
// the stages only ever transpose an existing pitch.

use crate::error::AnalysisError;
use cantiga_lang::{ArticulationClass, WordCategory, types::is_vowel_char};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const MIN_OCTAVE: i8 = 1;
pub const MAX_OCTAVE: i8 = 7;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A concrete pitch as a MIDI note number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pitch(u8);

impl Pitch {
    /// Lowest pitch any transposition can reach (C1).
    pub const MIN: Pitch = Pitch(((MIN_OCTAVE + 1) * 12) as u8);
    /// Highest pitch any transposition can reach (B7).
    pub const MAX: Pitch = Pitch(((MAX_OCTAVE + 1) * 12 + 11) as u8);

    pub fn from_midi(midi: u8) -> Self {
        Pitch(midi.min(127))
    }

    /// Pitch class (0 = C) in the given octave, clamped to the register.
    pub fn from_parts(pitch_class: u8, octave: i8) -> Self {
        let octave = octave.clamp(MIN_OCTAVE, MAX_OCTAVE);
        Pitch(((octave as i32 + 1) * 12 + (pitch_class % 12) as i32) as u8)
    }

    pub fn midi(self) -> u8 {
        self.0
    }

    pub fn pitch_class(self) -> u8 {
        self.0 % 12
    }

    pub fn octave(self) -> i8 {
        (self.0 / 12) as i8 - 1
    }

    /// Move by `semitones`, clamped to C1..=B7.
    pub fn transpose(self, semitones: i32) -> Self {
        let midi = (self.0 as i32 + semitones).clamp(Self::MIN.0 as i32, Self::MAX.0 as i32);
        Pitch(midi as u8)
    }

    /// Move by whole octaves, keeping the pitch class. The resulting octave
    /// is clamped to 1..=7.
    pub fn apply_octave_shift(self, shift: i8) -> Self {
        let octave = self.octave().saturating_add(shift);
        Pitch::from_parts(self.pitch_class(), octave)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", NOTE_NAMES[self.pitch_class() as usize], self.octave())
    }
}

impl FromStr for Pitch {
    type Err = AnalysisError;

    /// Parse scientific pitch notation: a letter, an optional `#` or `b`,
    /// then a (possibly negative) octave number. "C4", "F#3", "Bb2".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AnalysisError::InvalidPitch(s.to_string());
        let mut chars = s.trim().chars().peekable();

        let base: i32 = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('C') => 0,
            Some('D') => 2,
            Some('E') => 4,
            Some('F') => 5,
            Some('G') => 7,
            Some('A') => 9,
            Some('B') => 11,
            _ => return Err(invalid()),
        };
        let accidental = match chars.peek() {
            Some(&'#') => 1,
            Some(&'b') => -1,
            _ => 0,
        };
        if accidental != 0 {
            chars.next();
        }

        let octave: i32 = chars.collect::<String>().parse().map_err(|_| invalid())?;
        let midi = (octave + 1) * 12 + base + accidental;
        if (0..=127).contains(&midi) {
            Ok(Pitch(midi as u8))
        } else {
            Err(invalid())
        }
    }
}

impl Serialize for Pitch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pitch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Shift a named pitch by whole octaves: `apply_octave_shift("C4", 1)` is
/// `"C5"`. The result never leaves octaves 1..=7.
pub fn apply_octave_shift(pitch: &str, shift: i8) -> Result<String, AnalysisError> {
    let pitch: Pitch = pitch.parse()?;
    Ok(pitch.apply_octave_shift(shift).to_string())
}

/// Symbolic note length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NoteDuration {
    #[serde(rename = "32n")]
    ThirtySecond,
    #[serde(rename = "16n")]
    Sixteenth,
    #[serde(rename = "8n")]
    Eighth,
    #[serde(rename = "4n")]
    Quarter,
    #[serde(rename = "2n")]
    Half,
    #[serde(rename = "1n")]
    Whole,
}

impl NoteDuration {
    pub const LADDER: [NoteDuration; 6] = [
        NoteDuration::ThirtySecond,
        NoteDuration::Sixteenth,
        NoteDuration::Eighth,
        NoteDuration::Quarter,
        NoteDuration::Half,
        NoteDuration::Whole,
    ];

    /// Length in quarter-note beats.
    pub fn beats(self) -> f64 {
        match self {
            NoteDuration::ThirtySecond => 0.125,
            NoteDuration::Sixteenth => 0.25,
            NoteDuration::Eighth => 0.5,
            NoteDuration::Quarter => 1.0,
            NoteDuration::Half => 2.0,
            NoteDuration::Whole => 4.0,
        }
    }

    /// One step up the ladder, saturating at half. A whole note stays whole.
    pub fn lengthen(self) -> Self {
        match self {
            NoteDuration::ThirtySecond => NoteDuration::Sixteenth,
            NoteDuration::Sixteenth => NoteDuration::Eighth,
            NoteDuration::Eighth => NoteDuration::Quarter,
            NoteDuration::Quarter | NoteDuration::Half => NoteDuration::Half,
            NoteDuration::Whole => NoteDuration::Whole,
        }
    }

    /// One step down the ladder, saturating at 32nd.
    pub fn shorten(self) -> Self {
        match self {
            NoteDuration::ThirtySecond | NoteDuration::Sixteenth => NoteDuration::ThirtySecond,
            NoteDuration::Eighth => NoteDuration::Sixteenth,
            NoteDuration::Quarter => NoteDuration::Eighth,
            NoteDuration::Half => NoteDuration::Quarter,
            NoteDuration::Whole => NoteDuration::Half,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            NoteDuration::ThirtySecond => "32n",
            NoteDuration::Sixteenth => "16n",
            NoteDuration::Eighth => "8n",
            NoteDuration::Quarter => "4n",
            NoteDuration::Half => "2n",
            NoteDuration::Whole => "1n",
        }
    }
}

impl fmt::Display for NoteDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// What an event stands for in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Note,
    Rest,
    Pause,
    WordBoundary,
}

impl EventKind {
    pub fn is_silent(self) -> bool {
        !matches!(self, EventKind::Note)
    }
}

/// Chord under an event, from the harmonic plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonicContext {
    pub chord: String,
    pub roman_degree: String,
    pub tension: f32,
}

/// Contour adjustment recorded by the prosodic stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProsodicInfo {
    /// Interpolated contour offset, in [-1, 1] (times 12 = semitones).
    pub pitch_adjustment: f32,
    pub stress_multiplier: f32,
}

/// Articulation hints carried over from a phoneme's musical profile.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhonemeEffects {
    /// Nasal resonance, 0..1.
    pub nasal: f32,
    /// Trill amount, 0..1.
    pub trill: f32,
    /// Smooth (legato) articulation.
    pub flow: bool,
}

/// One step of the output sequence. Order in the sequence is playback order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Source grapheme or phoneme symbol.
    pub character: Option<String>,
    pub pitch: Option<Pitch>,
    pub kind: EventKind,
    pub duration: NoteDuration,
    /// Loudness in [0, 1].
    pub velocity: f32,
    pub word_type: Option<WordCategory>,
    pub stressed: Option<bool>,
    pub stress_level: Option<f32>,
    pub harmonic_context: Option<HarmonicContext>,
    pub prosodic: Option<ProsodicInfo>,
    pub effects: Option<PhonemeEffects>,
    /// Set when the event came from a phoneme rather than a letter.
    pub articulation: Option<ArticulationClass>,
    /// Index of the word (whitespace token) this event belongs to.
    pub word_index: Option<usize>,
    /// Character span `[start, end)` in the input text, for highlighting.
    pub span: Option<(usize, usize)>,
}

impl NoteEvent {
    pub fn note(
        character: Option<String>,
        pitch: Pitch,
        duration: NoteDuration,
        velocity: f32,
    ) -> Self {
        NoteEvent {
            character,
            pitch: Some(pitch),
            kind: EventKind::Note,
            duration,
            velocity: velocity.clamp(0.0, 1.0),
            ..NoteEvent::empty(duration)
        }
    }

    /// A pitchless event. `kind` should be a silent kind; `EventKind::Note`
    /// is downgraded to `Rest` since there is no pitch to sound.
    pub fn silence(kind: EventKind, character: Option<String>, duration: NoteDuration) -> Self {
        let kind = if kind.is_silent() { kind } else { EventKind::Rest };
        NoteEvent {
            character,
            kind,
            ..NoteEvent::empty(duration)
        }
    }

    fn empty(duration: NoteDuration) -> Self {
        NoteEvent {
            character: None,
            pitch: None,
            kind: EventKind::Rest,
            duration,
            velocity: 0.0,
            word_type: None,
            stressed: None,
            stress_level: None,
            harmonic_context: None,
            prosodic: None,
            effects: None,
            articulation: None,
            word_index: None,
            span: None,
        }
    }

    pub fn is_silent(&self) -> bool {
        self.kind.is_silent()
    }

    /// True for vowel phonemes, or for letter events whose character is a
    /// vowel.
    pub fn is_vowel(&self) -> bool {
        match self.articulation {
            Some(class) => class.is_vowel(),
            None => self
                .character
                .as_deref()
                .and_then(|c| c.chars().next())
                .is_some_and(is_vowel_char),
        }
    }
}
