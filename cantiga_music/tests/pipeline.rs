// End-to-end tests of the analysis pipeline through the public API.

use cantiga_lang::{Dialect, WordCategory};
use cantiga_lang::classifier::classify;
use cantiga_music::config::{AnalysisMode, PipelineConfig};
use cantiga_music::harmony::{Mood, QuestionKind, SentenceType, analyze_mood, detect_sentence_type};
use cantiga_music::midi::write_midi;
use cantiga_music::note::{EventKind, NoteEvent, apply_octave_shift};
use cantiga_music::pipeline::{AnalysisState, Orchestrator, process_text};
use cantiga_music::player::schedule;
use cantiga_music::scale::{MusicalKey, ScaleKind};

const SAMPLES: [&str; 6] = [
    "Olá, mundo!",
    "Como você está?",
    "Você está bem?",
    "Estou muito feliz hoje!",
    "O amor é lindo, mas a saudade dói...",
    "Corra agora",
];

fn orchestrator(mode: AnalysisMode, dialect: Dialect) -> Orchestrator {
    Orchestrator::new(PipelineConfig {
        mode,
        dialect,
        ..PipelineConfig::default()
    })
}

fn assert_silence_invariant(events: &[NoteEvent], context: &str) {
    for (i, e) in events.iter().enumerate() {
        assert_eq!(
            e.pitch.is_none(),
            e.kind != EventKind::Note,
            "{context}: event {i} breaks the silence invariant: {e:?}"
        );
        assert!((0.0..=1.0).contains(&e.velocity), "{context}: velocity out of range at {i}");
    }
}

#[test]
fn test_every_mode_is_deterministic() {
    for mode in AnalysisMode::ALL {
        let orch = orchestrator(mode, Dialect::Paulista);
        for text in SAMPLES {
            let a = orch.analyze(text);
            let b = orch.analyze(text);
            assert_eq!(a, b, "mode {mode} differs between runs on {text:?}");
        }
    }
}

#[test]
fn test_silence_invariant_across_modes_and_dialects() {
    let dialects = [Dialect::Paulista, Dialect::Carioca, Dialect::Nordestino, Dialect::Gaucho];
    for mode in AnalysisMode::ALL {
        for dialect in dialects {
            let orch = orchestrator(mode, dialect);
            for text in SAMPLES {
                let perf = orch.analyze(text);
                assert!(!perf.fallback, "{mode}/{dialect:?} fell back on {text:?}");
                assert!(!perf.events.is_empty());
                assert_silence_invariant(&perf.events, &format!("{mode}/{dialect:?}/{text}"));
            }
        }
    }
}

#[test]
fn test_pathological_input_never_fails() {
    let inputs = [
        "?!?!...",
        "☃☃☃ 🎵🎶",
        "   \t\n  ",
        "123 456",
        "ççççç ãããã",
        "---",
        "a",
        "Ω≈ç√∫",
    ];
    for text in inputs {
        for mode in AnalysisMode::ALL {
            let events = orchestrator(mode, Dialect::Paulista).process_text(text);
            assert!(!events.is_empty(), "{mode} returned nothing for {text:?}");
            assert_silence_invariant(&events, text);
        }
    }
}

#[test]
fn test_empty_input_is_empty() {
    for mode in AnalysisMode::ALL {
        let perf = orchestrator(mode, Dialect::Paulista).analyze("");
        assert!(perf.events.is_empty());
        assert!(!perf.fallback);
        assert_eq!(perf.states, vec![AnalysisState::Idle, AnalysisState::Done]);
    }
}

#[test]
fn test_complete_mode_runs_every_stage() {
    let perf = orchestrator(AnalysisMode::Complete, Dialect::Paulista).analyze("Que noite linda!");
    assert_eq!(
        perf.states,
        vec![
            AnalysisState::Idle,
            AnalysisState::Classifying,
            AnalysisState::Stressing,
            AnalysisState::Phoneticizing,
            AnalysisState::Harmonizing,
            AnalysisState::Contouring,
            AnalysisState::Done,
        ]
    );
    let plan = perf.plan.expect("harmonic plan");
    assert_eq!(plan.progression_id, "dramatic", "exclamations pick the dramatic progression");
    assert_eq!(perf.bass_line.len(), plan.roman_degrees.len());

    let notes: Vec<&NoteEvent> = perf.events.iter().filter(|e| !e.is_silent()).collect();
    assert!(notes.iter().all(|e| e.harmonic_context.is_some()));
    assert!(notes.iter().all(|e| e.prosodic.is_some()));
    assert!(notes.iter().all(|e| e.word_type.is_some()));
    assert!(notes.iter().any(|e| e.stressed == Some(true)));
}

#[test]
fn test_spans_point_into_the_text() {
    let text = "Bom dia, Brasil";
    let perf = orchestrator(AnalysisMode::Complete, Dialect::Carioca).analyze(text);
    let len = text.chars().count();
    for e in &perf.events {
        if let Some((start, end)) = e.span {
            assert!(start < end && end <= len, "bad span {start}..{end}");
        }
    }
}

#[test]
fn test_process_text_with_names() {
    let events = process_text("Oi", "pentatonic", "nordestino", "basic", "G");
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0].pitch,
        ScaleKind::Pentatonic.pitch_for_char('o'),
        "basic mode is the direct character mapping"
    );

    let fallback = process_text("Oi", "unknown", "unknown", "unknown", "unknown");
    let default = orchestrator(AnalysisMode::Complete, Dialect::Paulista).process_text("Oi");
    assert_eq!(fallback, default, "unknown names fall back to the defaults");
}

#[test]
fn test_sentence_type_examples() {
    assert_eq!(
        detect_sentence_type("Como você está?"),
        SentenceType::Question(QuestionKind::Wh)
    );
    assert_eq!(
        detect_sentence_type("Você está bem?"),
        SentenceType::Question(QuestionKind::YesNo)
    );
    assert_eq!(detect_sentence_type("Que alegria!"), SentenceType::Exclamation);
}

#[test]
fn test_classifier_examples() {
    assert_eq!(classify("o", None, None), WordCategory::Article);
    assert_eq!(classify("correr", None, None), WordCategory::Verb);
    assert_eq!(classify("rapidamente", None, None), WordCategory::Adverb);
}

#[test]
fn test_mood_example() {
    let mood = analyze_mood("Estou muito feliz hoje!");
    assert_eq!(mood.dominant_mood, Mood::Happy);
    assert!(mood.confidence > 0.0);
}

#[test]
fn test_octave_shift_examples() {
    assert_eq!(apply_octave_shift("C4", 1).unwrap(), "C5");
    assert_eq!(apply_octave_shift("C1", -1).unwrap(), "C1");
    assert_eq!(apply_octave_shift("B7", 2).unwrap(), "B7");
    assert!(apply_octave_shift("H4", 1).is_err());
}

#[test]
fn test_keys_change_harmony_only() {
    let text = "Que noite linda!";
    let c = Orchestrator::new(PipelineConfig::default()).analyze(text);
    let g = Orchestrator::new(PipelineConfig {
        key: MusicalKey::G,
        ..PipelineConfig::default()
    })
    .analyze(text);
    assert_eq!(c.events.len(), g.events.len());
    assert_ne!(
        c.plan.map(|p| p.chords),
        g.plan.map(|p| p.chords),
        "different keys resolve to different chords"
    );
}

#[test]
fn test_schedule_and_midi_output() {
    let perf = Orchestrator::new(PipelineConfig::default()).analyze("A vida é bela.");
    let sched = schedule(&perf.events, perf.tempo_bpm);
    assert_eq!(sched.len(), perf.events.len());
    assert!(sched.iter().all(|s| s.duration_seconds > 0.0));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vida.mid");
    write_midi(&perf, &path).unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}

#[test]
fn test_performance_serializes() {
    let perf = Orchestrator::new(PipelineConfig::default()).analyze("Olá!");
    let json = serde_json::to_value(&perf).unwrap();
    assert!(json["events"].is_array());
    assert_eq!(json["states"][0], "idle");
    let first = &json["events"][0];
    assert!(first["duration"].as_str().is_some_and(|d| d.ends_with('n')));
}
