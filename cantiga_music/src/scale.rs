// Scale and key tables.
//
// Two lookups live here:
// - `ScaleKind` maps characters to pitches for the direct character-mapping
//   path (the Basic mode and the orchestrator's fallback) and for phonemes
//   with no entry in the phoneme profile table. Letters walk the scale over
//   two octaves starting at C4, digits start at C3.
// - `MusicalKey` resolves roman-numeral chord degrees to chord names for
//   the harmonic plan. Chord quality comes from the triad the key's own
//   scale builds on that degree, so "vi" in C is "Am" and "VI" in Am is "F";
//   the numeral's case is accepted either way.
//
// Both tables are fixed at compile time. Unknown names fall back to the
// default (Major, C) with a warning, matching the fail-closed rule for
// configuration values.

use crate::error::AnalysisError;
use crate::note::Pitch;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Octave where letter mapping starts.
pub const LETTER_BASE_OCTAVE: i8 = 4;
/// Octave where digit mapping starts.
pub const DIGIT_BASE_OCTAVE: i8 = 3;

/// Character-to-pitch scale used by the direct mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    #[default]
    Major,
    Minor,
    Pentatonic,
    Blues,
    Dorian,
    Chromatic,
}

impl ScaleKind {
    pub const ALL: [ScaleKind; 6] = [
        ScaleKind::Major,
        ScaleKind::Minor,
        ScaleKind::Pentatonic,
        ScaleKind::Blues,
        ScaleKind::Dorian,
        ScaleKind::Chromatic,
    ];

    /// Semitone offsets from the tonic for one octave of the scale.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleKind::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleKind::Minor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleKind::Pentatonic => &[0, 2, 4, 7, 9],
            ScaleKind::Blues => &[0, 3, 5, 6, 7, 10],
            ScaleKind::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleKind::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScaleKind::Major => "major",
            ScaleKind::Minor => "minor",
            ScaleKind::Pentatonic => "pentatonic",
            ScaleKind::Blues => "blues",
            ScaleKind::Dorian => "dorian",
            ScaleKind::Chromatic => "chromatic",
        }
    }

    /// Parse a scale name; unknown names log a warning and give `Major`.
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!(scale = name, "unknown scale, using major");
            ScaleKind::default()
        })
    }

    /// Pitch of scale degree `degree` (0-based, may exceed one octave) above
    /// C in `base_octave`.
    pub fn degree_to_pitch(self, degree: usize, base_octave: i8) -> Pitch {
        let intervals = self.intervals();
        let octave = base_octave + (degree / intervals.len()) as i8;
        Pitch::from_parts(intervals[degree % intervals.len()], octave)
    }

    /// Base pitch for a character, or `None` for characters that are not
    /// letters or digits. Letters are folded to their unaccented form and
    /// cycle over two octaves of the scale.
    pub fn pitch_for_char(self, c: char) -> Option<Pitch> {
        let span = self.intervals().len() * 2;
        if let Some(letter) = fold_letter(c) {
            let index = (letter as u8 - b'a') as usize;
            return Some(self.degree_to_pitch(index % span, LETTER_BASE_OCTAVE));
        }
        c.to_digit(10)
            .map(|d| self.degree_to_pitch(d as usize % span, DIGIT_BASE_OCTAVE))
    }
}

impl FromStr for ScaleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "major" | "maior" => Ok(ScaleKind::Major),
            "minor" | "menor" => Ok(ScaleKind::Minor),
            "pentatonic" | "pentatônica" | "pentatonica" => Ok(ScaleKind::Pentatonic),
            "blues" => Ok(ScaleKind::Blues),
            "dorian" | "dórico" | "dorico" => Ok(ScaleKind::Dorian),
            "chromatic" | "cromática" | "cromatica" => Ok(ScaleKind::Chromatic),
            _ => Err(format!("unknown scale: {s}")),
        }
    }
}

impl fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lowercase ASCII base letter of `c`, with Portuguese accents folded.
pub fn fold_letter(c: char) -> Option<char> {
    let lower = c.to_lowercase().next()?;
    let folded = match lower {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    };
    folded.is_ascii_lowercase().then_some(folded)
}

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Key signature for chord resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MusicalKey {
    #[default]
    C,
    G,
    D,
    A,
    F,
    Am,
    Em,
}

/// Triad quality on a scale degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
}

/// A roman-numeral degree resolved in a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    pub root_pitch_class: u8,
    pub quality: ChordQuality,
    pub name: String,
}

impl MusicalKey {
    pub const ALL: [MusicalKey; 7] = [
        MusicalKey::C,
        MusicalKey::G,
        MusicalKey::D,
        MusicalKey::A,
        MusicalKey::F,
        MusicalKey::Am,
        MusicalKey::Em,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MusicalKey::C => "C",
            MusicalKey::G => "G",
            MusicalKey::D => "D",
            MusicalKey::A => "A",
            MusicalKey::F => "F",
            MusicalKey::Am => "Am",
            MusicalKey::Em => "Em",
        }
    }

    pub fn tonic_pitch_class(self) -> u8 {
        match self {
            MusicalKey::C => 0,
            MusicalKey::G => 7,
            MusicalKey::D => 2,
            MusicalKey::A | MusicalKey::Am => 9,
            MusicalKey::F => 5,
            MusicalKey::Em => 4,
        }
    }

    pub fn is_minor(self) -> bool {
        matches!(self, MusicalKey::Am | MusicalKey::Em)
    }

    fn scale(self) -> ScaleKind {
        if self.is_minor() {
            ScaleKind::Minor
        } else {
            ScaleKind::Major
        }
    }

    fn note_name(self, pitch_class: u8) -> &'static str {
        let names = if self == MusicalKey::F {
            &FLAT_NAMES
        } else {
            &SHARP_NAMES
        };
        names[(pitch_class % 12) as usize]
    }

    /// Parse a key name; unknown names log a warning and give C.
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!(key = name, "unknown musical key, using C");
            MusicalKey::default()
        })
    }

    /// Resolve a roman numeral ("I", "vi", "vii°") to a chord in this key.
    pub fn chord(self, roman: &str) -> Result<Chord, AnalysisError> {
        let unknown = || AnalysisError::UnknownDegree {
            degree: roman.to_string(),
            key: self.name().to_string(),
        };
        let numeral = roman.trim().trim_end_matches(['°', 'o']);
        let degree = match numeral.to_ascii_uppercase().as_str() {
            "I" => 0,
            "II" => 1,
            "III" => 2,
            "IV" => 3,
            "V" => 4,
            "VI" => 5,
            "VII" => 6,
            _ => return Err(unknown()),
        };

        let intervals = self.scale().intervals();
        let step = |n: usize| intervals[(degree + n) % 7] + if degree + n >= 7 { 12 } else { 0 };
        let root = step(0);
        let third = step(2) - root;
        let fifth = step(4) - root;
        let quality = match (third, fifth) {
            (3, 6) => ChordQuality::Diminished,
            (3, _) => ChordQuality::Minor,
            _ => ChordQuality::Major,
        };

        let root_pitch_class = (self.tonic_pitch_class() + root) % 12;
        let suffix = match quality {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Diminished => "dim",
        };
        Ok(Chord {
            root_pitch_class,
            quality,
            name: format!("{}{suffix}", self.note_name(root_pitch_class)),
        })
    }

    /// Chord name for a roman numeral: "I" -> "C", "vi" -> "Am" in C.
    pub fn resolve_degree(self, roman: &str) -> Result<String, AnalysisError> {
        self.chord(roman).map(|c| c.name)
    }
}

impl FromStr for MusicalKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "C" | "c" => Ok(MusicalKey::C),
            "G" | "g" => Ok(MusicalKey::G),
            "D" | "d" => Ok(MusicalKey::D),
            "A" | "a" => Ok(MusicalKey::A),
            "F" | "f" => Ok(MusicalKey::F),
            "Am" | "am" | "AM" => Ok(MusicalKey::Am),
            "Em" | "em" | "EM" => Ok(MusicalKey::Em),
            _ => Err(format!("unknown key: {s}")),
        }
    }
}

impl fmt::Display for MusicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_letters() {
        let s = ScaleKind::Major;
        assert_eq!(s.pitch_for_char('a').unwrap().to_string(), "C4");
        assert_eq!(s.pitch_for_char('b').unwrap().to_string(), "D4");
        assert_eq!(s.pitch_for_char('h').unwrap().to_string(), "C5");
        // 14 degrees over two octaves, then wrap.
        assert_eq!(s.pitch_for_char('o').unwrap().to_string(), "C4");
    }

    #[test]
    fn test_accents_fold_to_base_letter() {
        let s = ScaleKind::Minor;
        assert_eq!(s.pitch_for_char('á'), s.pitch_for_char('a'));
        assert_eq!(s.pitch_for_char('Ç'), s.pitch_for_char('c'));
        assert_eq!(s.pitch_for_char('õ'), s.pitch_for_char('o'));
    }

    #[test]
    fn test_digits_start_lower() {
        let s = ScaleKind::Major;
        assert_eq!(s.pitch_for_char('0').unwrap().to_string(), "C3");
        assert_eq!(s.pitch_for_char('7').unwrap().to_string(), "C4");
    }

    #[test]
    fn test_non_letters_have_no_pitch() {
        for c in [' ', ',', '?', '☃', '\n'] {
            assert_eq!(ScaleKind::Major.pitch_for_char(c), None, "{c:?}");
        }
    }

    #[test]
    fn test_every_scale_stays_in_register() {
        for scale in ScaleKind::ALL {
            for c in ('a'..='z').chain('0'..='9') {
                let p = scale.pitch_for_char(c).unwrap();
                assert!((3..=6).contains(&p.octave()), "{scale} {c} -> {p}");
            }
        }
    }

    #[test]
    fn test_scale_names() {
        assert_eq!("Pentatonic".parse::<ScaleKind>().unwrap(), ScaleKind::Pentatonic);
        assert_eq!("menor".parse::<ScaleKind>().unwrap(), ScaleKind::Minor);
        assert_eq!(ScaleKind::from_name_or_default("lydian"), ScaleKind::Major);
    }

    #[test]
    fn test_resolve_degree_in_c() {
        let key = MusicalKey::C;
        assert_eq!(key.resolve_degree("I").unwrap(), "C");
        assert_eq!(key.resolve_degree("ii").unwrap(), "Dm");
        assert_eq!(key.resolve_degree("IV").unwrap(), "F");
        assert_eq!(key.resolve_degree("V").unwrap(), "G");
        assert_eq!(key.resolve_degree("vi").unwrap(), "Am");
        assert_eq!(key.resolve_degree("vii°").unwrap(), "Bdim");
    }

    #[test]
    fn test_resolve_degree_other_keys() {
        assert_eq!(MusicalKey::G.resolve_degree("V").unwrap(), "D");
        assert_eq!(MusicalKey::D.resolve_degree("vii°").unwrap(), "C#dim");
        assert_eq!(MusicalKey::F.resolve_degree("IV").unwrap(), "Bb");
        assert_eq!(MusicalKey::Am.resolve_degree("i").unwrap(), "Am");
        assert_eq!(MusicalKey::Am.resolve_degree("VI").unwrap(), "F");
        assert_eq!(MusicalKey::Em.resolve_degree("ii°").unwrap(), "F#dim");
    }

    #[test]
    fn test_unknown_degree_is_an_error() {
        let err = MusicalKey::C.resolve_degree("VIII").unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownDegree { .. }));
    }

    #[test]
    fn test_key_names() {
        for key in MusicalKey::ALL {
            assert_eq!(key.name().parse::<MusicalKey>().unwrap(), key);
        }
        assert_eq!(MusicalKey::from_name_or_default("H#"), MusicalKey::C);
    }
}
