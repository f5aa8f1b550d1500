// Cantiga Music
//
// Turns Brazilian Portuguese text into a sequence of note events by merging
// several independent analyses of the text: word classes, syllable stress,
// dialect-aware phonetics, mood-driven harmony and sentence intonation.
// Linguistic analysis lives in `cantiga_lang`; this crate maps it onto
// pitches, durations and velocities.
//
// Architecture:
// - note.rs: Pitch, duration ladder and the NoteEvent every stage emits
// - scale.rs: Character scales and musical keys (roman-numeral chords)
// - text_mapping.rs: Direct character-to-note mapping (also the fallback)
// - phoneme_profile.rs: Phoneme → pitch/duration/energy/effects table
// - harmony.rs: Mood lexicon, sentence type, progression choice, bass line
// - prosody.rs: Five-point intonation contours per sentence type
// - config.rs: Pipeline configuration and analysis-mode presets
// - pipeline.rs: The orchestrator state machine tying the stages together
// - midi.rs: MIDI file output from performances
// - player.rs: Playback scheduling and the Player boundary
// - error.rs: Stage and player error types
//
// Analysis is deterministic: the same text and configuration always give the
// same events. Stage failures never escape; see pipeline.rs.

pub mod config;
pub mod error;
pub mod harmony;
pub mod midi;
pub mod note;
pub mod phoneme_profile;
pub mod pipeline;
pub mod player;
pub mod prosody;
pub mod scale;
pub mod text_mapping;

pub use config::{AnalysisMode, PipelineConfig};
pub use note::{EventKind, NoteDuration, NoteEvent, Pitch};
pub use pipeline::{Orchestrator, Performance, process_text};
