// Pipeline configuration.
//
// `PipelineConfig` is the whole configuration surface of the orchestrator:
// character scale, dialect, analysis mode, musical key and playback tempo.
// It is built from names (CLI flags, the `process_text` entry point) or
// from a JSON file. Unknown names never raise: each one logs a warning and
// falls back to its default (major scale, Paulista dialect, Complete mode,
// key of C). Only malformed JSON is an error.
//
// The analysis mode expands to an `EngineSet`, the capability object the
// orchestrator consults to decide which stages run.

use crate::scale::{MusicalKey, ScaleKind};
use cantiga_lang::Dialect;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_TEMPO_BPM: u16 = 120;
pub const MIN_TEMPO_BPM: u16 = 20;
pub const MAX_TEMPO_BPM: u16 = 300;

/// `bpm` if it lies in `MIN_TEMPO_BPM..=MAX_TEMPO_BPM`, otherwise the
/// default with a warning.
pub fn tempo_or_default(bpm: u16) -> u16 {
    if (MIN_TEMPO_BPM..=MAX_TEMPO_BPM).contains(&bpm) {
        bpm
    } else {
        warn!(
            "tempo of {bpm} BPM outside {MIN_TEMPO_BPM}..={MAX_TEMPO_BPM}, using {DEFAULT_TEMPO_BPM}"
        );
        DEFAULT_TEMPO_BPM
    }
}

/// One analysis engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    Grammar,
    MusicalGrammar,
    Harmonic,
    Phonetic,
    Stress,
    Prosodic,
}

/// Named analysis presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Basic,
    Grammatical,
    Harmonic,
    Phonetic,
    Prosodic,
    #[default]
    Complete,
}

impl AnalysisMode {
    pub const ALL: [AnalysisMode; 6] = [
        AnalysisMode::Basic,
        AnalysisMode::Grammatical,
        AnalysisMode::Harmonic,
        AnalysisMode::Phonetic,
        AnalysisMode::Prosodic,
        AnalysisMode::Complete,
    ];

    /// The engines this mode turns on.
    pub fn engines(self) -> &'static [Engine] {
        use Engine::*;
        match self {
            AnalysisMode::Basic => &[],
            AnalysisMode::Grammatical => &[Grammar, MusicalGrammar],
            AnalysisMode::Harmonic => &[Grammar, Harmonic],
            AnalysisMode::Phonetic => &[Phonetic, Stress],
            AnalysisMode::Prosodic => &[Grammar, Stress, Prosodic],
            AnalysisMode::Complete => &[Grammar, MusicalGrammar, Harmonic, Phonetic, Stress, Prosodic],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AnalysisMode::Basic => "basic",
            AnalysisMode::Grammatical => "grammatical",
            AnalysisMode::Harmonic => "harmonic",
            AnalysisMode::Phonetic => "phonetic",
            AnalysisMode::Prosodic => "prosodic",
            AnalysisMode::Complete => "complete",
        }
    }

    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!(mode = name, "unknown analysis mode, using complete");
            AnalysisMode::default()
        })
    }
}

impl FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        AnalysisMode::ALL
            .into_iter()
            .find(|m| m.name() == lower)
            .ok_or_else(|| format!("unknown analysis mode: {s}"))
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which engines are active for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineSet {
    pub grammar: bool,
    pub musical_grammar: bool,
    pub harmonic: bool,
    pub phonetic: bool,
    pub stress: bool,
    pub prosodic: bool,
}

impl EngineSet {
    pub fn for_mode(mode: AnalysisMode) -> Self {
        let mut set = EngineSet::default();
        for engine in mode.engines() {
            match engine {
                Engine::Grammar => set.grammar = true,
                Engine::MusicalGrammar => set.musical_grammar = true,
                Engine::Harmonic => set.harmonic = true,
                Engine::Phonetic => set.phonetic = true,
                Engine::Stress => set.stress = true,
                Engine::Prosodic => set.prosodic = true,
            }
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        *self == EngineSet::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub scale: ScaleKind,
    pub dialect: Dialect,
    pub mode: AnalysisMode,
    pub key: MusicalKey,
    pub tempo_bpm: u16,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            scale: ScaleKind::default(),
            dialect: Dialect::default(),
            mode: AnalysisMode::default(),
            key: MusicalKey::default(),
            tempo_bpm: DEFAULT_TEMPO_BPM,
        }
    }
}

/// On-disk shape: every field optional, values as free-form names so an
/// unknown name falls back instead of failing the parse.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PipelineConfigFile {
    scale: Option<String>,
    dialect: Option<String>,
    mode: Option<String>,
    key: Option<String>,
    tempo_bpm: Option<u16>,
}

impl PipelineConfig {
    /// Build from names; unknown names fall back to defaults with a warning.
    pub fn from_names(scale: &str, dialect: &str, mode: &str, key: &str) -> Self {
        PipelineConfig {
            scale: ScaleKind::from_name_or_default(scale),
            dialect: Dialect::from_name_or_default(dialect),
            mode: AnalysisMode::from_name_or_default(mode),
            key: MusicalKey::from_name_or_default(key),
            tempo_bpm: DEFAULT_TEMPO_BPM,
        }
    }

    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: PipelineConfigFile = serde_json::from_str(json)?;
        let defaults = PipelineConfig::default();
        Ok(PipelineConfig {
            scale: file
                .scale
                .map_or(defaults.scale, |s| ScaleKind::from_name_or_default(&s)),
            dialect: file
                .dialect
                .map_or(defaults.dialect, |s| Dialect::from_name_or_default(&s)),
            mode: file
                .mode
                .map_or(defaults.mode, |s| AnalysisMode::from_name_or_default(&s)),
            key: file
                .key
                .map_or(defaults.key, |s| MusicalKey::from_name_or_default(&s)),
            tempo_bpm: file.tempo_bpm.map_or(defaults.tempo_bpm, tempo_or_default),
        })
    }

    pub fn engines(&self) -> EngineSet {
        EngineSet::for_mode(self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_engines() {
        assert!(EngineSet::for_mode(AnalysisMode::Basic).is_empty());

        let g = EngineSet::for_mode(AnalysisMode::Grammatical);
        assert!(g.grammar && g.musical_grammar);
        assert!(!g.harmonic && !g.phonetic && !g.stress && !g.prosodic);

        let p = EngineSet::for_mode(AnalysisMode::Prosodic);
        assert!(p.grammar && p.stress && p.prosodic);
        assert!(!p.phonetic);

        let c = EngineSet::for_mode(AnalysisMode::Complete);
        assert_eq!(
            c,
            EngineSet {
                grammar: true,
                musical_grammar: true,
                harmonic: true,
                phonetic: true,
                stress: true,
                prosodic: true,
            }
        );
    }

    #[test]
    fn test_mode_names_round_trip() {
        for mode in AnalysisMode::ALL {
            assert_eq!(mode.name().parse::<AnalysisMode>().unwrap(), mode);
        }
        assert_eq!("HARMONIC".parse::<AnalysisMode>().unwrap(), AnalysisMode::Harmonic);
    }

    #[test]
    fn test_from_names_fails_closed() {
        let config = PipelineConfig::from_names("kazoo", "martian", "turbo", "H");
        assert_eq!(config, PipelineConfig::default());

        let config = PipelineConfig::from_names("blues", "carioca", "phonetic", "Em");
        assert_eq!(config.scale, ScaleKind::Blues);
        assert_eq!(config.dialect, Dialect::Carioca);
        assert_eq!(config.mode, AnalysisMode::Phonetic);
        assert_eq!(config.key, MusicalKey::Em);
    }

    #[test]
    fn test_from_json() {
        let config = PipelineConfig::from_json(
            r#"{"scale": "pentatonic", "key": "G", "tempo_bpm": 90}"#,
        )
        .unwrap();
        assert_eq!(config.scale, ScaleKind::Pentatonic);
        assert_eq!(config.key, MusicalKey::G);
        assert_eq!(config.tempo_bpm, 90);
        assert_eq!(config.mode, AnalysisMode::Complete);
        assert_eq!(config.dialect, Dialect::Paulista);
    }

    #[test]
    fn test_from_json_unknown_values_fall_back() {
        let config =
            PipelineConfig::from_json(r#"{"dialect": "lisboeta", "tempo_bpm": 0}"#).unwrap();
        assert_eq!(config.dialect, Dialect::Paulista);
        assert_eq!(config.tempo_bpm, DEFAULT_TEMPO_BPM);
    }

    #[test]
    fn test_tempo_range() {
        assert_eq!(tempo_or_default(MIN_TEMPO_BPM), MIN_TEMPO_BPM);
        assert_eq!(tempo_or_default(MAX_TEMPO_BPM), MAX_TEMPO_BPM);
        for bpm in [1, 2, 3, 19, 301, 1000, u16::MAX] {
            assert_eq!(tempo_or_default(bpm), DEFAULT_TEMPO_BPM, "{bpm} BPM");
        }
        let config = PipelineConfig::from_json(r#"{"tempo_bpm": 2}"#).unwrap();
        assert_eq!(config.tempo_bpm, DEFAULT_TEMPO_BPM);
        let config = PipelineConfig::from_json(r#"{"tempo_bpm": 1000}"#).unwrap();
        assert_eq!(config.tempo_bpm, DEFAULT_TEMPO_BPM);
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(PipelineConfig::from_json("{not json").is_err());
        assert!(PipelineConfig::from_json(r#"{"tempo_bpm": "fast"}"#).is_err());
    }
}
