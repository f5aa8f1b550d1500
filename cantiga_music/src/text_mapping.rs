// Direct character-to-note mapping.
//
// The lowest-fidelity rendering of a text, and the starting sequence every
// analysis stage refines: one event per input character, in order, so that
// sequence position equals character position until the phonetic stage
// regroups a word into phonemes.
//
// - letters and digits: a note from the configured `ScaleKind`, eighth
//   note, base velocity 0.7
// - whitespace: a word-boundary rest (sixteenth)
// - punctuation: a pause (quarter)
// - anything else (emoji, symbols): a plain rest (sixteenth)
//
// Each event records its character span and, for characters inside a
// whitespace-delimited token, the token's index. Token indices line up with
// the `WordAnalysis` list from `cantiga_lang::classifier::analyze_text`
// since both split on `char::is_whitespace`.
//
// This is also the orchestrator's fallback output, so it must never fail.

use crate::note::{EventKind, NoteDuration, NoteEvent};
use crate::scale::ScaleKind;
use cantiga_lang::phonetics::is_pause_char;

/// Velocity of an unanalyzed note.
pub const BASE_VELOCITY: f32 = 0.7;

/// The event for one character, without word or span information.
pub fn event_for_char(c: char, scale: ScaleKind) -> NoteEvent {
    let character = Some(c.to_string());
    if let Some(pitch) = scale.pitch_for_char(c) {
        return NoteEvent::note(character, pitch, NoteDuration::Eighth, BASE_VELOCITY);
    }
    if c.is_whitespace() {
        NoteEvent::silence(EventKind::WordBoundary, character, NoteDuration::Sixteenth)
    } else if is_pause_char(c) {
        NoteEvent::silence(EventKind::Pause, character, NoteDuration::Quarter)
    } else {
        NoteEvent::silence(EventKind::Rest, character, NoteDuration::Sixteenth)
    }
}

/// Map every character of `text` to an event.
pub fn map_characters(text: &str, scale: ScaleKind) -> Vec<NoteEvent> {
    let mut events = Vec::with_capacity(text.len());
    let mut word_index: Option<usize> = None;
    let mut in_word = false;

    for (i, c) in text.chars().enumerate() {
        let mut event = event_for_char(c, scale);
        event.span = Some((i, i + 1));
        if c.is_whitespace() {
            in_word = false;
        } else {
            if !in_word {
                word_index = Some(word_index.map_or(0, |w| w + 1));
                in_word = true;
            }
            event.word_index = word_index;
        }
        events.push(event);
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_event_per_character() {
        let text = "Olá, mundo!";
        let events = map_characters(text, ScaleKind::Major);
        assert_eq!(events.len(), text.chars().count());
        for (i, e) in events.iter().enumerate() {
            assert_eq!(e.span, Some((i, i + 1)));
        }
    }

    #[test]
    fn test_event_kinds() {
        let events = map_characters("a b,☃", ScaleKind::Major);
        let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Note,
                EventKind::WordBoundary,
                EventKind::Note,
                EventKind::Pause,
                EventKind::Rest,
            ]
        );
        assert_eq!(events[0].velocity, BASE_VELOCITY);
        assert_eq!(events[3].duration, NoteDuration::Quarter);
    }

    #[test]
    fn test_silence_invariant() {
        for e in map_characters("Ei, você! 42 ♪♪ ...", ScaleKind::Blues) {
            assert_eq!(e.pitch.is_none(), e.is_silent(), "{e:?}");
        }
    }

    #[test]
    fn test_word_indices() {
        let events = map_characters("  o  gato. ", ScaleKind::Major);
        let indices: Vec<Option<usize>> = events.iter().map(|e| e.word_index).collect();
        assert_eq!(
            indices,
            vec![
                None,
                None,
                Some(0),
                None,
                None,
                Some(1),
                Some(1),
                Some(1),
                Some(1),
                Some(1),
                None,
            ]
        );
    }

    #[test]
    fn test_empty_text() {
        assert!(map_characters("", ScaleKind::Major).is_empty());
    }
}
