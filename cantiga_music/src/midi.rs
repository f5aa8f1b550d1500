// MIDI output from analyzed performances.
//
// Converts a `Performance` into a Standard MIDI File (SMF) for playback.
// Track 0 carries the tempo; track 1 is the melody, one note per pitched
// event in sequence order, with silent events advancing time; track 2 is
// the bass line when the harmonic stage ran. Each bass note lasts as long as
// the melody events under its chord, split the way `apply_harmony` splits
// them; a chord with no events under it is not sounded. Durations map to
// ticks via `NoteDuration::beats` at 480 ticks per quarter.
//
// Uses the `midly` crate for MIDI writing. Output is SMF Format 1 (multi-track).

use crate::error::PlayerError;
use crate::harmony::{BassNote, HarmonicPlan};
use crate::note::NoteDuration;
use crate::pipeline::Performance;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

const MELODY_CHANNEL: u8 = 0;
const BASS_CHANNEL: u8 = 1;
/// Acoustic grand piano.
const MELODY_PROGRAM: u8 = 0;
/// Acoustic bass.
const BASS_PROGRAM: u8 = 32;

/// Length of `duration` in ticks.
pub fn duration_ticks(duration: NoteDuration) -> u32 {
    (duration.beats() * f64::from(TICKS_PER_QUARTER)).round() as u32
}

/// Microseconds per quarter note, capped at the 24-bit tempo field.
pub fn tempo_microseconds(bpm: u16) -> u32 {
    (60_000_000 / u32::from(bpm.max(1))).min(0xFF_FFFF)
}

/// MIDI velocity for a normalized velocity in [0, 1].
pub fn midi_velocity(velocity: f32) -> u8 {
    (velocity.clamp(0.0, 1.0) * 127.0).round() as u8
}

/// Convert a performance to MIDI and write it to a file.
pub fn write_midi(performance: &Performance, path: &Path) -> Result<(), PlayerError> {
    let smf = performance_to_smf(performance);
    let mut buf = Vec::new();
    smf.write(&mut buf)
        .map_err(|e| PlayerError::Midi(e.to_string()))?;
    std::fs::write(path, &buf)?;
    Ok(())
}

/// One note or rest to lay down on a track.
struct Span {
    key: Option<u8>,
    ticks: u32,
    velocity: u8,
}

fn push_meta(track: &mut Track<'static>, message: MetaMessage<'static>) {
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(message),
    });
}

/// Build a track from consecutive spans. Rests accumulate into the delta of
/// the next note-on.
fn voice_track(name: &'static str, channel: u8, program: u8, spans: &[Span]) -> Track<'static> {
    let channel = u4::new(channel);
    let mut track: Track<'static> = Vec::new();
    push_meta(&mut track, MetaMessage::TrackName(name.as_bytes()));
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Midi {
            channel,
            message: MidiMessage::ProgramChange {
                program: u7::new(program),
            },
        },
    });

    let mut pending_rest: u32 = 0;
    for span in spans {
        let Some(key) = span.key else {
            pending_rest += span.ticks;
            continue;
        };
        track.push(TrackEvent {
            delta: u28::new(pending_rest),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key: u7::new(key),
                    vel: u7::new(span.velocity.max(1)),
                },
            },
        });
        track.push(TrackEvent {
            delta: u28::new(span.ticks),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key: u7::new(key),
                    vel: u7::new(0),
                },
            },
        });
        pending_rest = 0;
    }
    track.push(TrackEvent {
        delta: u28::new(pending_rest),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    track
}

/// One span per sounded chord, as long as the melody under it. Without a
/// plan or a melody the bass notes keep their own durations.
fn bass_spans(bass_line: &[BassNote], plan: Option<&HarmonicPlan>, melody: &[Span]) -> Vec<Span> {
    let own = |b: &BassNote| Span {
        key: Some(b.pitch.midi()),
        ticks: duration_ticks(b.duration),
        velocity: midi_velocity(b.velocity),
    };
    let Some(plan) = plan.filter(|_| !melody.is_empty()) else {
        return bass_line.iter().map(own).collect();
    };
    let mut ticks = vec![0u32; bass_line.len()];
    for (i, span) in melody.iter().enumerate() {
        if let Some(t) = ticks.get_mut(plan.chord_index(i, melody.len())) {
            *t += span.ticks;
        }
    }
    bass_line
        .iter()
        .zip(ticks)
        .filter(|(_, t)| *t > 0)
        .map(|(b, t)| Span { ticks: t, ..own(b) })
        .collect()
}

/// Convert a performance to an in-memory SMF.
pub fn performance_to_smf(performance: &Performance) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    // Track 0: tempo track
    let mut tempo_track: Track<'static> = Vec::new();
    let tempo = tempo_microseconds(performance.tempo_bpm);
    push_meta(&mut tempo_track, MetaMessage::Tempo(u24::new(tempo)));
    push_meta(&mut tempo_track, MetaMessage::EndOfTrack);
    smf.tracks.push(tempo_track);

    let melody: Vec<Span> = performance
        .events
        .iter()
        .map(|e| Span {
            key: e.pitch.map(|p| p.midi()),
            ticks: duration_ticks(e.duration),
            velocity: midi_velocity(e.velocity),
        })
        .collect();
    smf.tracks
        .push(voice_track("Melody", MELODY_CHANNEL, MELODY_PROGRAM, &melody));

    if !performance.bass_line.is_empty() {
        let bass = bass_spans(&performance.bass_line, performance.plan.as_ref(), &melody);
        smf.tracks
            .push(voice_track("Bass", BASS_CHANNEL, BASS_PROGRAM, &bass));
    }

    smf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnalysisMode, PipelineConfig};
    use crate::pipeline::Orchestrator;

    fn analyze(text: &str, mode: AnalysisMode) -> Performance {
        Orchestrator::new(PipelineConfig {
            mode,
            ..PipelineConfig::default()
        })
        .analyze(text)
    }

    fn note_ons(track: &Track<'_>) -> usize {
        track
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    TrackEventKind::Midi {
                        message: MidiMessage::NoteOn { .. },
                        ..
                    }
                )
            })
            .count()
    }

    #[test]
    fn test_duration_ticks() {
        assert_eq!(duration_ticks(NoteDuration::Quarter), 480);
        assert_eq!(duration_ticks(NoteDuration::ThirtySecond), 60);
        assert_eq!(duration_ticks(NoteDuration::Whole), 1920);
    }

    #[test]
    fn test_midi_velocity() {
        assert_eq!(midi_velocity(0.0), 0);
        assert_eq!(midi_velocity(1.0), 127);
        assert_eq!(midi_velocity(0.5), 64);
        assert_eq!(midi_velocity(3.0), 127);
    }

    #[test]
    fn test_basic_performance_tracks() {
        let perf = analyze("ab c", AnalysisMode::Basic);
        let smf = performance_to_smf(&perf);
        // Tempo + melody, no bass without harmony.
        assert_eq!(smf.tracks.len(), 2);
        assert_eq!(note_ons(&smf.tracks[1]), 3);
    }

    #[test]
    fn test_rest_delays_next_note() {
        let perf = analyze("a b", AnalysisMode::Basic);
        let smf = performance_to_smf(&perf);
        let deltas: Vec<u32> = smf.tracks[1]
            .iter()
            .filter(|e| matches!(e.kind, TrackEventKind::Midi { message: MidiMessage::NoteOn { .. }, .. }))
            .map(|e| e.delta.as_int())
            .collect();
        // The space is a sixteenth-note boundary.
        assert_eq!(deltas, vec![0, 120]);
    }

    #[test]
    fn test_harmonic_performance_has_bass() {
        let perf = analyze("o mar azul", AnalysisMode::Harmonic);
        let smf = performance_to_smf(&perf);
        assert_eq!(smf.tracks.len(), 3);
        assert_eq!(note_ons(&smf.tracks[2]), perf.bass_line.len());
    }

    fn total_ticks(track: &Track<'_>) -> u32 {
        track.iter().map(|e| e.delta.as_int()).sum()
    }

    fn tempo_of(smf: &Smf<'_>) -> Option<u32> {
        smf.tracks[0].iter().find_map(|e| match e.kind {
            TrackEventKind::Meta(MetaMessage::Tempo(t)) => Some(t.as_int()),
            _ => None,
        })
    }

    #[test]
    fn test_tempo_microseconds() {
        assert_eq!(tempo_microseconds(120), 500_000);
        assert_eq!(tempo_microseconds(60), 1_000_000);
        for slow in [0, 1, 2, 3] {
            assert_eq!(tempo_microseconds(slow), 0xFF_FFFF, "{slow} BPM");
        }

        let mut perf = analyze("ab", AnalysisMode::Basic);
        perf.tempo_bpm = 2;
        assert_eq!(tempo_of(&performance_to_smf(&perf)), Some(0xFF_FFFF));
    }

    #[test]
    fn test_bass_follows_chord_spans() {
        let perf = analyze("Que noite linda!", AnalysisMode::Complete);
        let plan = perf.plan.clone().unwrap();
        let smf = performance_to_smf(&perf);
        assert_eq!(total_ticks(&smf.tracks[2]), total_ticks(&smf.tracks[1]));

        // Ticks of the melody events under the first chord.
        let len = perf.events.len();
        let first: u32 = perf
            .events
            .iter()
            .enumerate()
            .filter(|(i, _)| plan.chord_index(*i, len) == 0)
            .map(|(_, e)| duration_ticks(e.duration))
            .sum();
        let first_off = smf.tracks[2]
            .iter()
            .find(|e| matches!(e.kind, TrackEventKind::Midi { message: MidiMessage::NoteOff { .. }, .. }))
            .map(|e| e.delta.as_int());
        assert_eq!(first_off, Some(first));
    }

    #[test]
    fn test_short_melody_skips_empty_chords() {
        let perf = analyze("ab", AnalysisMode::Harmonic);
        let plan = perf.plan.clone().unwrap();
        assert!(plan.chords.len() > 2);
        let smf = performance_to_smf(&perf);
        assert_eq!(note_ons(&smf.tracks[2]), 2);
        assert_eq!(total_ticks(&smf.tracks[2]), total_ticks(&smf.tracks[1]));
    }

    #[test]
    fn test_write_midi_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mid");
        let perf = analyze("Olá, mundo!", AnalysisMode::Complete);
        write_midi(&perf, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"MThd");
        let parsed = Smf::parse(&bytes).unwrap();
        assert_eq!(parsed.tracks.len(), 3);
    }
}
