// Musical profiles for phonemes.
//
// The second half of phoneme mapping: `cantiga_lang::phonetics` turns text
// into a phoneme stream, this module turns each phoneme into a base pitch,
// duration, energy and articulation effects. The table groups sounds by
// articulation class:
// - oral vowels carry the melody (eighth notes, high energy, legato), laid
//   out from dark to bright: u o ɔ a ɐ ɛ e i
// - nasal vowels sit a step off their oral pair, longer and softer, with
//   full nasal resonance
// - plosives are short and strong, fricatives short and soft
// - nasals and laterals are legato eighths
// - rhotics differ by trill amount (ʁ full, ɾ and r partial, ɹ none)
//
// Word-boundary and pause markers get no pitch and a sixteenth / quarter
// duration. Letters and digits kept raw (`ArticulationClass::Other`) and any
// symbol with no table entry borrow their pitch from the configured
// character scale.

use crate::note::NoteDuration::{Eighth, Quarter, Sixteenth};
use crate::note::{NoteDuration, PhonemeEffects, Pitch};
use crate::scale::{LETTER_BASE_OCTAVE, ScaleKind};
use cantiga_lang::phonetics::to_phonemes;
use cantiga_lang::{ArticulationClass, Dialect, Phoneme};
use serde::{Deserialize, Serialize};

const STRESS_BOOST: f32 = 1.3;
const SYLLABLE_START_BOOST: f32 = 1.1;
const FALLBACK_ENERGY: f32 = 0.7;

struct ProfileEntry {
    symbol: char,
    /// MIDI note number.
    midi: u8,
    duration: NoteDuration,
    energy: f32,
    nasal: f32,
    trill: f32,
    flow: bool,
}

const fn entry(
    symbol: char,
    midi: u8,
    duration: NoteDuration,
    energy: f32,
    nasal: f32,
    trill: f32,
    flow: bool,
) -> ProfileEntry {
    ProfileEntry {
        symbol,
        midi,
        duration,
        energy,
        nasal,
        trill,
        flow,
    }
}

#[rustfmt::skip]
const PROFILES: &[ProfileEntry] = &[
    // Oral vowels: C4 D4 E4 G4 F4 A4 B4 C5
    entry('u', 60, Eighth, 0.85, 0.0, 0.0, true),
    entry('o', 62, Eighth, 0.9, 0.0, 0.0, true),
    entry('ɔ', 64, Eighth, 0.9, 0.0, 0.0, true),
    entry('a', 67, Eighth, 1.0, 0.0, 0.0, true),
    entry('ɐ', 65, Eighth, 0.85, 0.0, 0.0, true),
    entry('ɛ', 69, Eighth, 0.95, 0.0, 0.0, true),
    entry('e', 71, Eighth, 0.9, 0.0, 0.0, true),
    entry('i', 72, Eighth, 0.85, 0.0, 0.0, true),
    // Nasal vowels
    entry('ũ', 59, Quarter, 0.75, 1.0, 0.0, true),
    entry('õ', 61, Quarter, 0.75, 1.0, 0.0, true),
    entry('ã', 66, Quarter, 0.8, 1.0, 0.0, true),
    entry('ẽ', 70, Quarter, 0.75, 1.0, 0.0, true),
    entry('ĩ', 73, Quarter, 0.75, 1.0, 0.0, true),
    // Glides
    entry('j', 74, Sixteenth, 0.6, 0.0, 0.0, true),
    entry('w', 57, Sixteenth, 0.6, 0.0, 0.0, true),
    // Plosives
    entry('p', 52, Sixteenth, 0.8, 0.0, 0.0, false),
    entry('b', 53, Sixteenth, 0.75, 0.0, 0.0, false),
    entry('t', 55, Sixteenth, 0.8, 0.0, 0.0, false),
    entry('d', 57, Sixteenth, 0.75, 0.0, 0.0, false),
    entry('k', 59, Sixteenth, 0.8, 0.0, 0.0, false),
    entry('g', 48, Sixteenth, 0.75, 0.0, 0.0, false),
    // Fricatives
    entry('f', 53, Sixteenth, 0.5, 0.0, 0.0, false),
    entry('v', 55, Sixteenth, 0.5, 0.0, 0.0, true),
    entry('s', 69, Sixteenth, 0.45, 0.0, 0.0, false),
    entry('z', 67, Sixteenth, 0.5, 0.0, 0.0, true),
    entry('ʃ', 71, Sixteenth, 0.45, 0.0, 0.0, false),
    entry('ʒ', 69, Sixteenth, 0.5, 0.0, 0.0, true),
    entry('h', 52, Sixteenth, 0.4, 0.0, 0.0, false),
    entry('χ', 50, Sixteenth, 0.45, 0.0, 0.2, false),
    // Affricates
    entry('ʧ', 72, Sixteenth, 0.7, 0.0, 0.0, false),
    entry('ʤ', 71, Sixteenth, 0.7, 0.0, 0.0, false),
    // Nasals
    entry('m', 60, Eighth, 0.6, 1.0, 0.0, true),
    entry('n', 62, Eighth, 0.6, 1.0, 0.0, true),
    entry('ɲ', 64, Eighth, 0.6, 1.0, 0.0, true),
    // Laterals
    entry('l', 64, Eighth, 0.6, 0.0, 0.0, true),
    entry('ʎ', 65, Eighth, 0.6, 0.0, 0.0, true),
    // Rhotics
    entry('r', 62, Sixteenth, 0.6, 0.0, 0.3, true),
    entry('ʁ', 57, Eighth, 0.7, 0.0, 1.0, false),
    entry('ɹ', 60, Sixteenth, 0.55, 0.0, 0.0, true),
    entry('ɾ', 64, Sixteenth, 0.6, 0.0, 0.4, true),
];

/// A phoneme together with its base musical parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhonemeUnit {
    pub symbol: char,
    pub articulation_class: ArticulationClass,
    pub is_nasal: bool,
    /// `None` for word-boundary and pause markers.
    pub base_pitch: Option<Pitch>,
    pub base_duration: NoteDuration,
    /// Velocity before stress and syllable boosts.
    pub base_energy: f32,
    pub effects: PhonemeEffects,
}

impl PhonemeUnit {
    pub fn new(phoneme: &Phoneme, scale: ScaleKind) -> Self {
        let (base_pitch, base_duration, base_energy, effects) = base(phoneme, scale);
        PhonemeUnit {
            symbol: phoneme.symbol,
            articulation_class: phoneme.class,
            is_nasal: phoneme.is_nasal,
            base_pitch,
            base_duration,
            base_energy,
            effects,
        }
    }

    pub fn is_marker(&self) -> bool {
        self.articulation_class.is_marker()
    }
}

/// Position of a phoneme inside its word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProfileContext {
    /// Inside the word's primary-stressed syllable.
    pub stressed: bool,
    /// First phoneme of a syllable.
    pub syllable_start: bool,
}

/// Musical rendering of one phoneme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MusicalProfile {
    pub pitch: Option<Pitch>,
    pub duration: NoteDuration,
    pub velocity: f32,
    pub effects: PhonemeEffects,
}

fn lookup(symbol: char) -> Option<&'static ProfileEntry> {
    PROFILES.iter().find(|e| e.symbol == symbol)
}

/// Base pitch and duration of a phoneme before any context is applied.
fn base(phoneme: &Phoneme, scale: ScaleKind) -> (Option<Pitch>, NoteDuration, f32, PhonemeEffects) {
    match phoneme.class {
        ArticulationClass::WordBoundary => {
            return (None, Sixteenth, 0.0, PhonemeEffects::default());
        }
        ArticulationClass::Pause => return (None, Quarter, 0.0, PhonemeEffects::default()),
        _ => {}
    }
    let entry = match phoneme.class {
        ArticulationClass::Other => None,
        _ => lookup(phoneme.symbol),
    };
    match entry {
        Some(e) => (
            Some(Pitch::from_midi(e.midi)),
            e.duration,
            e.energy,
            PhonemeEffects {
                nasal: e.nasal,
                trill: e.trill,
                flow: e.flow,
            },
        ),
        None => {
            let pitch = scale
                .pitch_for_char(phoneme.symbol)
                .unwrap_or_else(|| scale.degree_to_pitch(0, LETTER_BASE_OCTAVE));
            let effects = PhonemeEffects {
                nasal: if phoneme.is_nasal { 1.0 } else { 0.0 },
                ..PhonemeEffects::default()
            };
            (Some(pitch), Eighth, FALLBACK_ENERGY, effects)
        }
    }
}

/// Map a phoneme to pitch, duration, velocity and effects. Stress boosts
/// velocity by 1.3 and lengthens one ladder step; a syllable start adds a
/// 1.1 boost. Markers ignore the context.
pub fn to_musical_profile(unit: &PhonemeUnit, context: ProfileContext) -> MusicalProfile {
    let pitch = unit.base_pitch;
    let mut duration = unit.base_duration;
    let mut velocity = unit.base_energy;
    if pitch.is_some() {
        if context.stressed {
            velocity *= STRESS_BOOST;
            duration = duration.lengthen();
        }
        if context.syllable_start {
            velocity *= SYLLABLE_START_BOOST;
        }
    }
    MusicalProfile {
        pitch,
        duration,
        velocity: velocity.clamp(0.0, 1.0),
        effects: unit.effects,
    }
}

/// Transliterate `text` and attach base musical parameters to each phoneme.
pub fn phoneme_units(text: &str, dialect: Dialect, scale: ScaleKind) -> Vec<PhonemeUnit> {
    to_phonemes(text, dialect)
        .iter()
        .map(|p| PhonemeUnit::new(p, scale))
        .collect()
}
