// Prosodic contour: sentence-level pitch and stress shaping.
//
// Each sentence type has a static five-point contour (start, prehead, head,
// nucleus, tail) of pitch offsets plus a stress amplification. Event `i` of
// an `n`-event sequence sits at p = i / (n - 1) and takes the offset
// linearly interpolated inside its segment:
//
//   [0, 0.1]    start   -> prehead
//   (0.1, 0.4]  prehead -> head
//   (0.4, 0.7]  head    -> nucleus
//   (0.7, 1.0]  nucleus -> tail
//
// The offset becomes `round(offset * 12)` semitones of transposition
// (clamped to the playable register by `Pitch::transpose`). The per-event
// stress multiplier is the pattern amplification, times 1.3 for stressed
// events, 1.1 for vowels and 1.2 for verbs and nouns, capped at 2.0. It
// scales note velocity (clamped to [0.1, 1]) and steps the duration one
// ladder rung: down below 0.8, up above 1.3.
//
// The engine is functional: `apply_contour` returns a new sequence.

use crate::harmony::{QuestionKind, SentenceType};
use crate::note::{NoteEvent, ProsodicInfo};
use serde::{Deserialize, Serialize};

const MAX_STRESS_MULTIPLIER: f32 = 2.0;
const MIN_VELOCITY: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntonationKind {
    Declarative,
    YesNoQuestion,
    WhQuestion,
    Exclamative,
    Command,
    /// Unfinished statement (trailing comma, colon, ellipsis).
    Continuation,
}

impl IntonationKind {
    /// Contour for a sentence of type `sentence` whose text is `text`.
    /// Statements that stop on a non-final mark rise as a continuation.
    pub fn for_sentence(text: &str, sentence: SentenceType) -> Self {
        match sentence {
            SentenceType::Question(QuestionKind::Wh) => IntonationKind::WhQuestion,
            SentenceType::Question(QuestionKind::YesNo) => IntonationKind::YesNoQuestion,
            SentenceType::Exclamation => IntonationKind::Exclamative,
            SentenceType::Command => IntonationKind::Command,
            SentenceType::Statement => {
                let unfinished = text
                    .trim_end()
                    .chars()
                    .last()
                    .is_some_and(|c| matches!(c, ',' | ';' | ':' | '…'))
                    || text.trim_end().ends_with("...");
                if unfinished {
                    IntonationKind::Continuation
                } else {
                    IntonationKind::Declarative
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContourPoints {
    pub start: f32,
    pub prehead: f32,
    pub head: f32,
    pub nucleus: f32,
    pub tail: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntonationPattern {
    pub kind: IntonationKind,
    pub contour: ContourPoints,
    pub stress_amplification: f32,
}

const fn pattern_of(
    kind: IntonationKind,
    [start, prehead, head, nucleus, tail]: [f32; 5],
    stress_amplification: f32,
) -> IntonationPattern {
    IntonationPattern {
        kind,
        contour: ContourPoints {
            start,
            prehead,
            head,
            nucleus,
            tail,
        },
        stress_amplification,
    }
}

const DECLARATIVE: IntonationPattern =
    pattern_of(IntonationKind::Declarative, [0.0, 0.1, 0.2, -0.3, -0.6], 1.0);
const YES_NO: IntonationPattern =
    pattern_of(IntonationKind::YesNoQuestion, [0.0, 0.0, 0.1, 0.3, 0.9], 1.1);
const WH: IntonationPattern =
    pattern_of(IntonationKind::WhQuestion, [0.2, 0.4, 0.3, 0.1, -0.4], 1.15);
const EXCLAMATIVE: IntonationPattern =
    pattern_of(IntonationKind::Exclamative, [0.3, 0.6, 0.8, 1.0, 0.2], 1.3);
const COMMAND: IntonationPattern =
    pattern_of(IntonationKind::Command, [0.2, 0.5, 0.3, -0.2, -0.8], 1.25);
const CONTINUATION: IntonationPattern =
    pattern_of(IntonationKind::Continuation, [0.0, 0.1, 0.2, 0.2, 0.3], 1.0);

pub fn pattern(kind: IntonationKind) -> &'static IntonationPattern {
    match kind {
        IntonationKind::Declarative => &DECLARATIVE,
        IntonationKind::YesNoQuestion => &YES_NO,
        IntonationKind::WhQuestion => &WH,
        IntonationKind::Exclamative => &EXCLAMATIVE,
        IntonationKind::Command => &COMMAND,
        IntonationKind::Continuation => &CONTINUATION,
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Contour offset at relative position `p` in [0, 1].
pub fn contour_offset(pattern: &IntonationPattern, p: f32) -> f32 {
    let c = &pattern.contour;
    let p = p.clamp(0.0, 1.0);
    if p <= 0.1 {
        lerp(c.start, c.prehead, p / 0.1)
    } else if p <= 0.4 {
        lerp(c.prehead, c.head, (p - 0.1) / 0.3)
    } else if p <= 0.7 {
        lerp(c.head, c.nucleus, (p - 0.4) / 0.3)
    } else {
        lerp(c.nucleus, c.tail, (p - 0.7) / 0.3)
    }
}

/// Per-event stress multiplier under `pattern`.
pub fn stress_multiplier(pattern: &IntonationPattern, event: &NoteEvent) -> f32 {
    let mut m = pattern.stress_amplification;
    if event.stressed == Some(true) {
        m *= 1.3;
    }
    if event.is_vowel() {
        m *= 1.1;
    }
    if event.word_type.is_some_and(|w| w.is_content()) {
        m *= 1.2;
    }
    m.min(MAX_STRESS_MULTIPLIER)
}

/// Shape `events` with the contour for `kind`.
pub fn apply_contour(events: &[NoteEvent], kind: IntonationKind) -> Vec<NoteEvent> {
    let pattern = pattern(kind);
    let last = events.len().saturating_sub(1);
    events
        .iter()
        .enumerate()
        .map(|(i, event)| {
            let p = if last == 0 { 0.0 } else { i as f32 / last as f32 };
            let offset = contour_offset(pattern, p);
            let multiplier = stress_multiplier(pattern, event);

            let mut event = event.clone();
            event.prosodic = Some(ProsodicInfo {
                pitch_adjustment: offset.clamp(-1.0, 1.0),
                stress_multiplier: multiplier,
            });
            if let Some(pitch) = event.pitch {
                event.pitch = Some(pitch.transpose((offset * 12.0).round() as i32));
                event.velocity = (event.velocity * multiplier).clamp(MIN_VELOCITY, 1.0);
                if multiplier < 0.8 {
                    event.duration = event.duration.shorten();
                } else if multiplier > 1.3 {
                    event.duration = event.duration.lengthen();
                }
            }
            event
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::{NoteDuration, Pitch};
    use crate::scale::ScaleKind;
    use crate::text_mapping::map_characters;
    use cantiga_lang::WordCategory;

    fn consonant(midi: u8) -> NoteEvent {
        NoteEvent::note(Some("t".into()), Pitch::from_midi(midi), NoteDuration::Eighth, 0.5)
    }

    #[test]
    fn test_control_points_are_hit() {
        let p = pattern(IntonationKind::Declarative);
        assert!((contour_offset(p, 0.0) - 0.0).abs() < 1e-6);
        assert!((contour_offset(p, 0.1) - 0.1).abs() < 1e-6);
        assert!((contour_offset(p, 0.4) - 0.2).abs() < 1e-6);
        assert!((contour_offset(p, 0.7) - -0.3).abs() < 1e-6);
        assert!((contour_offset(p, 1.0) - -0.6).abs() < 1e-6);
    }

    #[test]
    fn test_interpolation_inside_segment() {
        let p = pattern(IntonationKind::YesNoQuestion);
        // Halfway through the tail: 0.3 -> 0.9.
        assert!((contour_offset(p, 0.85) - 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_question_rises_statement_falls() {
        let events: Vec<NoteEvent> = (0..11).map(|_| consonant(60)).collect();
        let q = apply_contour(&events, IntonationKind::YesNoQuestion);
        let s = apply_contour(&events, IntonationKind::Declarative);
        assert!(q.last().unwrap().pitch > events[0].pitch);
        assert!(s.last().unwrap().pitch < events[0].pitch);
        // -0.6 * 12 = -7.2 -> -7 semitones.
        assert_eq!(s.last().unwrap().pitch.unwrap().to_string(), "F3");
    }

    #[test]
    fn test_single_event_uses_start_point() {
        let out = apply_contour(&[consonant(60)], IntonationKind::Exclamative);
        // start = 0.3 -> 4 semitones.
        assert_eq!(out[0].pitch.unwrap().to_string(), "E4");
    }

    #[test]
    fn test_stress_multiplier_factors() {
        let p = pattern(IntonationKind::Declarative);
        let mut e = consonant(60);
        assert!((stress_multiplier(p, &e) - 1.0).abs() < 1e-6);
        e.stressed = Some(true);
        e.word_type = Some(WordCategory::Verb);
        assert!((stress_multiplier(p, &e) - 1.56).abs() < 1e-5);
        e.character = Some("a".into());
        let capped = stress_multiplier(pattern(IntonationKind::Exclamative), &e);
        assert_eq!(capped, 2.0);
    }

    #[test]
    fn test_velocity_and_duration() {
        let mut e = consonant(60);
        e.stressed = Some(true);
        e.word_type = Some(WordCategory::Noun);
        e.velocity = 0.9;
        let out = apply_contour(&[e], IntonationKind::Declarative);
        assert_eq!(out[0].velocity, 1.0);
        assert_eq!(out[0].duration, NoteDuration::Quarter);

        let mut quiet = consonant(60);
        quiet.velocity = 0.01;
        let out = apply_contour(&[quiet], IntonationKind::Declarative);
        assert_eq!(out[0].velocity, MIN_VELOCITY);
        assert_eq!(out[0].duration, NoteDuration::Eighth);
    }

    #[test]
    fn test_silence_is_preserved() {
        let events = map_characters("sim, não!", ScaleKind::Major);
        let out = apply_contour(&events, IntonationKind::Exclamative);
        assert_eq!(out.len(), events.len());
        for (before, after) in events.iter().zip(&out) {
            assert_eq!(before.pitch.is_none(), after.pitch.is_none());
            assert!(after.prosodic.is_some());
            if before.is_silent() {
                assert_eq!(before.velocity, after.velocity);
            }
        }
    }

    #[test]
    fn test_intonation_for_sentence() {
        assert_eq!(
            IntonationKind::for_sentence("Eu fui, ", SentenceType::Statement),
            IntonationKind::Continuation
        );
        assert_eq!(
            IntonationKind::for_sentence("E então...", SentenceType::Statement),
            IntonationKind::Continuation
        );
        assert_eq!(
            IntonationKind::for_sentence("Eu fui.", SentenceType::Statement),
            IntonationKind::Declarative
        );
        assert_eq!(
            IntonationKind::for_sentence("Onde?", SentenceType::Question(QuestionKind::Wh)),
            IntonationKind::WhQuestion
        );
    }
}
