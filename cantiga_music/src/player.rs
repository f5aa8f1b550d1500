// Playback boundary.
//
// The pipeline produces a `Performance`; what happens to it next is up to a
// `Player`. This crate ships one implementation, `MidiFilePlayer`, which
// renders to a Standard MIDI File. Real-time audio backends live outside
// the crate and only need `schedule` to turn the symbolic durations into
// wall-clock offsets.

use crate::error::PlayerError;
use crate::midi::write_midi;
use crate::note::{NoteDuration, NoteEvent};
use crate::pipeline::Performance;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Seconds taken by `duration` at `tempo_bpm` quarter notes per minute.
pub fn duration_seconds(duration: NoteDuration, tempo_bpm: u16) -> f64 {
    duration.beats() * 60.0 / f64::from(tempo_bpm.max(1))
}

/// Wall-clock placement of one event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScheduledEvent {
    /// Position of the event in the performance.
    pub index: usize,
    pub start_seconds: f64,
    pub duration_seconds: f64,
}

/// Lay `events` end to end at `tempo_bpm`. Silent events take time too.
pub fn schedule(events: &[NoteEvent], tempo_bpm: u16) -> Vec<ScheduledEvent> {
    let mut clock = 0.0;
    events
        .iter()
        .enumerate()
        .map(|(index, event)| {
            let duration = duration_seconds(event.duration, tempo_bpm);
            let scheduled = ScheduledEvent {
                index,
                start_seconds: clock,
                duration_seconds: duration,
            };
            clock += duration;
            scheduled
        })
        .collect()
}

/// Total length of `events` in seconds.
pub fn total_seconds(events: &[NoteEvent], tempo_bpm: u16) -> f64 {
    events
        .iter()
        .map(|e| duration_seconds(e.duration, tempo_bpm))
        .sum()
}

pub trait Player {
    fn play(&mut self, performance: &Performance) -> Result<(), PlayerError>;
}

/// Writes each performance to a MIDI file at `path`, overwriting it.
#[derive(Debug, Clone)]
pub struct MidiFilePlayer {
    pub path: PathBuf,
}

impl MidiFilePlayer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MidiFilePlayer { path: path.into() }
    }
}

impl Player for MidiFilePlayer {
    fn play(&mut self, performance: &Performance) -> Result<(), PlayerError> {
        write_midi(performance, &self.path)?;
        info!(
            path = %self.path.display(),
            events = performance.events.len(),
            seconds = total_seconds(&performance.events, performance.tempo_bpm),
            "wrote MIDI file"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::ScaleKind;
    use crate::text_mapping::map_characters;

    #[test]
    fn test_duration_seconds() {
        assert_eq!(duration_seconds(NoteDuration::Quarter, 120), 0.5);
        assert_eq!(duration_seconds(NoteDuration::Whole, 60), 4.0);
    }

    #[test]
    fn test_schedule_is_contiguous() {
        let events = map_characters("oi, tu", ScaleKind::Major);
        let sched = schedule(&events, 120);
        assert_eq!(sched.len(), events.len());
        assert_eq!(sched[0].start_seconds, 0.0);
        for pair in sched.windows(2) {
            let end = pair[0].start_seconds + pair[0].duration_seconds;
            assert!((pair[1].start_seconds - end).abs() < 1e-9);
        }
        // o i , ' ' t u -> 0.5+0.5+1+0.25+0.5+0.5 = 3.25 beats = 1.625 s.
        assert!((total_seconds(&events, 120) - 1.625).abs() < 1e-9);
    }

    #[test]
    fn test_midi_file_player() {
        let dir = tempfile::tempdir().unwrap();
        let mut player = MidiFilePlayer::new(dir.path().join("take.mid"));
        let perf = crate::pipeline::Orchestrator::new(Default::default()).analyze("Bom dia!");
        player.play(&perf).unwrap();
        assert!(player.path.exists());
    }

    #[test]
    fn test_midi_file_player_reports_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut player = MidiFilePlayer::new(dir.path().join("missing").join("take.mid"));
        let perf = crate::pipeline::Orchestrator::new(Default::default()).analyze("Bom dia!");
        assert!(matches!(player.play(&perf), Err(PlayerError::Io(_))));
    }
}
