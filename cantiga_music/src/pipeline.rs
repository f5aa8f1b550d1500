// Analysis orchestrator.
//
// Runs the active engines over one input text as a state machine:
//
//   Idle -> Classifying -> Stressing -> Phoneticizing -> Harmonizing
//        -> Contouring -> Done
//
// A state is entered only when the configured `EngineSet` turns its engine
// on; the others are skipped. Every stage takes the previous stage's
// sequence (or the direct character mapping, for the first stage) and
// returns a new one:
//
// - Classifying tags each letter event with its word's category. The
//   grammar engine scales velocity by category weight and emphasis; the
//   musical-grammar engine applies the category's octave shift and
//   shortens function words / lengthens interjections.
// - Stressing finds each word's syllables and stress, then scales letter
//   velocity by `0.7 + 0.6 * level` and lengthens the primary syllable.
// - Phoneticizing replaces each word's letter events with one event per
//   phoneme (dialect-aware), carrying the grammar and stress annotations
//   over. Whitespace events between words are kept.
// - Harmonizing picks the progression for the text and spreads it over the
//   sequence.
// - Contouring applies the sentence intonation.
//
// Failure handling: a stage error (or a stage returning nothing for
// non-empty input) is logged, the sequence is replaced by the direct
// character mapping, and the machine goes straight to Done. Later stages
// are not retried. Empty input produces an empty sequence.

use crate::config::{AnalysisMode, EngineSet, PipelineConfig};
use crate::error::AnalysisError;
use crate::harmony::{BassNote, HarmonicPlan, SentenceType, apply_harmony, detect_sentence_type, select_progression};
use crate::note::{EventKind, NoteEvent};
use crate::phoneme_profile::{PhonemeUnit, ProfileContext, phoneme_units, to_musical_profile};
use crate::prosody::{IntonationKind, apply_contour};
use crate::scale::{MusicalKey, ScaleKind};
use crate::text_mapping::map_characters;
use cantiga_lang::classifier::analyze_text;
use cantiga_lang::syllables::{detect_stress, stress_levels, syllabify, syllable_of_letter};
use cantiga_lang::{ArticulationClass, Dialect, StressResult, WordAnalysis, WordCategory};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisState {
    Idle,
    Classifying,
    Stressing,
    Phoneticizing,
    Harmonizing,
    Contouring,
    Done,
}

impl AnalysisState {
    const STAGES: [AnalysisState; 5] = [
        AnalysisState::Classifying,
        AnalysisState::Stressing,
        AnalysisState::Phoneticizing,
        AnalysisState::Harmonizing,
        AnalysisState::Contouring,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AnalysisState::Idle => "idle",
            AnalysisState::Classifying => "classifying",
            AnalysisState::Stressing => "stressing",
            AnalysisState::Phoneticizing => "phoneticizing",
            AnalysisState::Harmonizing => "harmonizing",
            AnalysisState::Contouring => "contouring",
            AnalysisState::Done => "done",
        }
    }

    fn is_active(self, engines: &EngineSet) -> bool {
        match self {
            AnalysisState::Classifying => engines.grammar || engines.musical_grammar,
            AnalysisState::Stressing => engines.stress,
            AnalysisState::Phoneticizing => engines.phonetic,
            AnalysisState::Harmonizing => engines.harmonic,
            AnalysisState::Contouring => engines.prosodic,
            AnalysisState::Idle | AnalysisState::Done => false,
        }
    }

    /// The next active stage after this one, or `Done`.
    pub fn next(self, engines: &EngineSet) -> AnalysisState {
        let from = match self {
            AnalysisState::Idle => 0,
            AnalysisState::Done => return AnalysisState::Done,
            stage => Self::STAGES
                .iter()
                .position(|s| *s == stage)
                .map_or(Self::STAGES.len(), |i| i + 1),
        };
        Self::STAGES[from..]
            .iter()
            .copied()
            .find(|s| s.is_active(engines))
            .unwrap_or(AnalysisState::Done)
    }
}

/// Result of analyzing one text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Performance {
    pub events: Vec<NoteEvent>,
    pub bass_line: Vec<BassNote>,
    pub plan: Option<HarmonicPlan>,
    pub sentence_type: SentenceType,
    /// States visited, from `Idle` to `Done`.
    pub states: Vec<AnalysisState>,
    /// True when a stage failed and `events` is the character mapping.
    pub fallback: bool,
    pub tempo_bpm: u16,
}

/// Per-run working state shared between stages.
struct RunContext<'t> {
    text: &'t str,
    config: PipelineConfig,
    engines: EngineSet,
    words: Vec<WordAnalysis>,
    stresses: Vec<StressResult>,
    classified: bool,
    plan: Option<HarmonicPlan>,
    sentence_type: SentenceType,
}

impl<'t> RunContext<'t> {
    fn new(text: &'t str, config: PipelineConfig, engines: EngineSet) -> Self {
        RunContext {
            text,
            config,
            engines,
            words: analyze_text(text),
            stresses: Vec::new(),
            classified: false,
            plan: None,
            sentence_type: detect_sentence_type(text),
        }
    }

    fn word(&self, index: usize, stage: &'static str) -> Result<&WordAnalysis, AnalysisError> {
        self.words
            .get(index)
            .ok_or(AnalysisError::Misaligned { stage })
    }
}

/// Runs the configured engines over texts. Cheap to construct; holds no
/// per-text state, so one orchestrator can serve any number of calls.
#[derive(Debug, Clone, Copy)]
pub struct Orchestrator {
    config: PipelineConfig,
    engines: EngineSet,
}

impl Orchestrator {
    pub fn new(config: PipelineConfig) -> Self {
        Orchestrator {
            config,
            engines: config.engines(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn engines(&self) -> &EngineSet {
        &self.engines
    }

    /// The final event sequence for `text`.
    pub fn process_text(&self, text: &str) -> Vec<NoteEvent> {
        self.analyze(text).events
    }

    /// Full analysis of `text`: events, harmony, and how the run went.
    pub fn analyze(&self, text: &str) -> Performance {
        self.run(text, run_stage)
    }

    fn run<F>(&self, text: &str, mut stage: F) -> Performance
    where
        F: FnMut(AnalysisState, &mut RunContext<'_>, &[NoteEvent]) -> Result<Vec<NoteEvent>, AnalysisError>,
    {
        let mut ctx = RunContext::new(text, self.config, self.engines);
        let mut states = vec![AnalysisState::Idle];
        let mut events = map_characters(text, self.config.scale);
        let mut fallback = false;

        let mut state = if text.is_empty() {
            AnalysisState::Done
        } else {
            AnalysisState::Idle.next(&self.engines)
        };
        while state != AnalysisState::Done {
            states.push(state);
            debug!(stage = state.name(), events = events.len(), "entering stage");

            let result = stage(state, &mut ctx, &events).and_then(|out| {
                if out.is_empty() && !events.is_empty() {
                    Err(AnalysisError::EmptyStageOutput { stage: state.name() })
                } else {
                    Ok(out)
                }
            });
            match result {
                Ok(out) => events = out,
                Err(err) => {
                    warn!(stage = state.name(), error = %err, "stage failed, falling back to character mapping");
                    events = map_characters(text, self.config.scale);
                    ctx.plan = None;
                    fallback = true;
                    break;
                }
            }
            state = state.next(&self.engines);
        }
        states.push(AnalysisState::Done);

        debug!(
            mode = self.config.mode.name(),
            events = events.len(),
            fallback,
            "analysis complete"
        );
        let bass_line = ctx
            .plan
            .as_ref()
            .map(|p| p.bass_line.clone())
            .unwrap_or_default();
        Performance {
            events,
            bass_line,
            plan: ctx.plan,
            sentence_type: ctx.sentence_type,
            states,
            fallback,
            tempo_bpm: self.config.tempo_bpm,
        }
    }
}

fn run_stage(
    state: AnalysisState,
    ctx: &mut RunContext<'_>,
    events: &[NoteEvent],
) -> Result<Vec<NoteEvent>, AnalysisError> {
    match state {
        AnalysisState::Classifying => classify_stage(ctx, events),
        AnalysisState::Stressing => stress_stage(ctx, events),
        AnalysisState::Phoneticizing => phonetic_stage(ctx, events),
        AnalysisState::Harmonizing => {
            let plan = select_progression(ctx.text, ctx.config.key)?;
            let out = apply_harmony(events, &plan);
            ctx.plan = Some(plan);
            Ok(out)
        }
        AnalysisState::Contouring => {
            let kind = IntonationKind::for_sentence(ctx.text, ctx.sentence_type);
            Ok(apply_contour(events, kind))
        }
        AnalysisState::Idle | AnalysisState::Done => Ok(events.to_vec()),
    }
}

/// Tag `event` with its word's category and apply the active grammar
/// adjustments.
fn apply_word_category(event: &mut NoteEvent, word: &WordAnalysis, engines: &EngineSet) {
    event.word_type = Some(word.category);
    if event.is_silent() || !word.category.is_musical() {
        return;
    }
    if engines.grammar {
        let factor = (0.5 + 0.5 * word.weight) * word.emphasis.velocity_factor();
        event.velocity = (event.velocity * factor).clamp(0.0, 1.0);
    }
    if engines.musical_grammar {
        event.pitch = event.pitch.map(|p| p.apply_octave_shift(word.octave_shift));
        event.duration = match word.category {
            WordCategory::Article | WordCategory::Preposition | WordCategory::Conjunction => {
                event.duration.shorten()
            }
            WordCategory::Interjection => event.duration.lengthen(),
            _ => event.duration,
        };
    }
}

fn classify_stage(ctx: &mut RunContext<'_>, events: &[NoteEvent]) -> Result<Vec<NoteEvent>, AnalysisError> {
    let out = events
        .iter()
        .map(|event| -> Result<NoteEvent, AnalysisError> {
            let mut event = event.clone();
            if let Some(w) = event.word_index {
                let word = ctx.word(w, "classifying")?;
                apply_word_category(&mut event, word, &ctx.engines);
            }
            Ok(event)
        })
        .collect::<Result<Vec<_>, AnalysisError>>()?;
    ctx.classified = true;
    Ok(out)
}

/// Velocity factor for a syllable stress level: 1.3 at primary stress.
fn stress_velocity_factor(level: f32) -> f32 {
    0.7 + 0.6 * level
}

fn stress_stage(ctx: &mut RunContext<'_>, events: &[NoteEvent]) -> Result<Vec<NoteEvent>, AnalysisError> {
    ctx.stresses = ctx
        .words
        .iter()
        .map(|w| detect_stress(&w.cleaned_form))
        .collect();
    let levels: Vec<Vec<f32>> = ctx.stresses.iter().map(stress_levels).collect();
    // Letters seen so far in each word, in cleaned (lowercased) form.
    let mut letters_seen = vec![0usize; ctx.words.len()];

    let mut out = Vec::with_capacity(events.len());
    for event in events {
        let mut event = event.clone();
        let letter = event
            .character
            .as_deref()
            .and_then(|c| c.chars().next())
            .filter(|c| c.is_alphabetic());
        if let (Some(w), Some(letter)) = (event.word_index, letter) {
            let (Some(stress), Some(word_levels), Some(seen)) =
                (ctx.stresses.get(w), levels.get(w), letters_seen.get_mut(w))
            else {
                return Err(AnalysisError::Misaligned { stage: "stressing" });
            };
            let syllable = syllable_of_letter(&stress.syllables, *seen);
            *seen += letter.to_lowercase().count();
            let Some(&level) = word_levels.get(syllable) else {
                return Err(AnalysisError::Misaligned { stage: "stressing" });
            };
            let primary = stress.is_stressed(syllable);
            event.stressed = Some(primary);
            event.stress_level = Some(level);
            if !event.is_silent() {
                event.velocity = (event.velocity * stress_velocity_factor(level)).clamp(0.0, 1.0);
                if primary {
                    event.duration = event.duration.lengthen();
                }
            }
        }
        out.push(event);
    }
    Ok(out)
}

/// Syllable index for each phoneme of a word: a vowel opens the next
/// syllable, consonants belong to the following vowel's syllable, and
/// trailing consonants to the last one. Clamped to `syllable_count`.
fn phoneme_syllables(units: &[PhonemeUnit], syllable_count: usize) -> Vec<usize> {
    let last = syllable_count.saturating_sub(1);
    let total = units.iter().filter(|u| u.articulation_class.is_vowel()).count();
    let mut seen = 0;
    units
        .iter()
        .map(|u| {
            let index = if u.articulation_class.is_vowel() {
                seen += 1;
                seen - 1
            } else if seen < total {
                seen
            } else {
                seen.saturating_sub(1)
            };
            index.min(last)
        })
        .collect()
}

fn phonetic_stage(ctx: &RunContext<'_>, events: &[NoteEvent]) -> Result<Vec<NoteEvent>, AnalysisError> {
    let mut out = Vec::with_capacity(events.len());
    let mut expanded: Option<usize> = None;
    for event in events {
        match event.word_index {
            None => out.push(event.clone()),
            Some(w) if expanded == Some(w) => {}
            Some(w) => {
                out.extend(phonemes_for_word(ctx, w)?);
                expanded = Some(w);
            }
        }
    }
    Ok(out)
}

fn phonemes_for_word(ctx: &RunContext<'_>, w: usize) -> Result<Vec<NoteEvent>, AnalysisError> {
    let word = ctx.word(w, "phoneticizing")?;
    let units = phoneme_units(&word.word, ctx.config.dialect, ctx.config.scale);
    let stress = if ctx.engines.stress {
        Some(
            ctx.stresses
                .get(w)
                .ok_or(AnalysisError::Misaligned { stage: "phoneticizing" })?,
        )
    } else {
        None
    };
    let syllable_count = match stress {
        Some(s) => s.syllables.len(),
        None => syllabify(&word.cleaned_form).len(),
    };
    let levels = stress.map(stress_levels).unwrap_or_default();
    let syllables = phoneme_syllables(&units, syllable_count);

    let mut out = Vec::with_capacity(units.len());
    let mut previous_syllable = None;
    for (unit, syllable) in units.iter().zip(syllables) {
        let stressed = stress.is_some_and(|s| s.is_stressed(syllable));
        let context = if unit.is_marker() {
            ProfileContext::default()
        } else {
            let start = previous_syllable != Some(syllable);
            previous_syllable = Some(syllable);
            ProfileContext {
                stressed,
                syllable_start: start,
            }
        };
        let profile = to_musical_profile(unit, context);
        let character = Some(unit.symbol.to_string());

        let mut event = match profile.pitch {
            Some(pitch) => {
                let mut e = NoteEvent::note(character, pitch, profile.duration, profile.velocity);
                e.effects = Some(profile.effects);
                if stress.is_some() {
                    e.stressed = Some(stressed);
                    e.stress_level = levels.get(syllable).copied();
                }
                e
            }
            None => {
                let kind = if unit.articulation_class == ArticulationClass::Pause {
                    EventKind::Pause
                } else {
                    EventKind::WordBoundary
                };
                NoteEvent::silence(kind, character, profile.duration)
            }
        };
        event.articulation = Some(unit.articulation_class);
        event.word_index = Some(w);
        event.span = Some((word.start, word.end));
        if ctx.classified {
            apply_word_category(&mut event, word, &ctx.engines);
        }
        out.push(event);
    }
    Ok(out)
}

/// Analyze `text` with configuration given by name. Unknown names fall back
/// to their defaults; this never fails.
pub fn process_text(text: &str, scale: &str, dialect: &str, mode: &str, key: &str) -> Vec<NoteEvent> {
    Orchestrator::new(PipelineConfig::from_names(scale, dialect, mode, key)).process_text(text)
}

/// Typed variant of `process_text`.
pub fn process_text_with(
    text: &str,
    scale: ScaleKind,
    dialect: Dialect,
    mode: AnalysisMode,
    key: MusicalKey,
) -> Vec<NoteEvent> {
    let config = PipelineConfig {
        scale,
        dialect,
        mode,
        key,
        ..PipelineConfig::default()
    };
    Orchestrator::new(config).process_text(text)
}
