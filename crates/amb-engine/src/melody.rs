//! Melody resolver.
//!
//! Picks one note per melody sub-tick from either the current chord's
//! member table (chordal mode) or the full diatonic table (scalar mode),
//! indexed by the smoothed wander value. Destutter suppresses a repeated
//! identical note while the harmony step is unchanged, holding the prior
//! note instead of retriggering it.

use amb_theory::Scale;

use crate::noise::Wander;
use crate::transport::Pulse;

/// Melody voice state.
#[derive(Debug)]
pub struct MelodyVoice {
    pub enabled: bool,
    pub staccato: bool,
    /// Choose from chord members (true) or the full scale (false).
    pub chordal: bool,
    pub destutter: bool,
    pub volume: f32,
    pub target_octave: i32,
    pub range_width: f32,
    /// Notes per whole note: 8 = eighth notes.
    pub divisor: u8,
    pub wander: Wander,
    pub last_note: i16,
    pub last_step: i8,
    /// Index of the last note inside its candidate table (arp anchor).
    pub last_note_index: usize,
    pub last_stutter_step: i8,
    pub stutter_detected: bool,
    /// Melody notes counted so far this bar.
    pub notes_this_bar: u32,
    pub gate: Pulse,
}

impl MelodyVoice {
    pub fn new() -> Self {
        let mut wander = Wander::new(100.0);
        wander.set_range(3, 1.0);
        Self {
            enabled: true,
            staccato: false,
            chordal: true,
            destutter: true,
            volume: 10.0,
            target_octave: 3,
            range_width: 1.0,
            divisor: 8,
            wander,
            last_note: 0,
            last_step: -1,
            last_note_index: 0,
            last_stutter_step: -1,
            stutter_detected: false,
            notes_this_bar: 0,
            gate: Pulse::default(),
        }
    }

    pub fn clear_bar(&mut self) {
        self.notes_this_bar = 0;
    }

    pub fn gate_duration(&self, beats_per_second: f32, divisor: u8) -> f32 {
        let factor = if self.staccato { 0.5 } else { 0.95 };
        factor * 4.0 / (beats_per_second * divisor.max(1) as f32)
    }
}

impl Default for MelodyVoice {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a melody resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MelodyResolution {
    pub note: i16,
    /// Destutter suppressed the retrigger; the prior note holds.
    pub suppressed: bool,
}

/// Resolve one melody note against the just-resolved harmony step.
pub fn resolve(
    voice: &mut MelodyVoice,
    chord_table: &[i16],
    scale: &Scale,
    harmony_step: i8,
    elapsed: f32,
) -> MelodyResolution {
    voice.notes_this_bar += 1;
    voice.wander.update(elapsed);

    let step = harmony_step.max(0);
    voice.last_step = step;

    let (note, index) = if voice.chordal || chord_table.is_empty() {
        let index = voice.wander.index_into(chord_table.len());
        let note = chord_table.get(index).copied().unwrap_or(voice.last_note);
        (note, index)
    } else {
        let index = voice.wander.index_into(scale.len());
        (scale.note_at(index), index)
    };

    let stutter = voice.destutter
        && note == voice.last_note
        && voice.last_stutter_step == step;
    voice.last_stutter_step = step;
    voice.stutter_detected = stutter;

    if !stutter {
        voice.last_note = note;
        voice.last_note_index = index;
    }

    MelodyResolution {
        note,
        suppressed: stutter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amb_theory::Mode;

    fn c_major_scale() -> Scale {
        Scale::build(0, Mode::Ionian)
    }

    fn pinned_voice(note_avg: f32) -> MelodyVoice {
        let mut v = MelodyVoice::new();
        v.wander.alpha = 0.0; // freeze the average
        v.wander.note_avg = note_avg;
        v.wander.range_bottom = note_avg;
        v.wander.range_top = note_avg;
        v
    }

    static CHORD: &[i16] = &[36, 40, 43, 48, 52, 55, 60, 64, 67];

    #[test]
    fn chordal_mode_indexes_the_chord_table() {
        let mut v = pinned_voice(0.5);
        let res = resolve(&mut v, CHORD, &c_major_scale(), 0, 0.0);
        assert!(!res.suppressed);
        assert_eq!(res.note, CHORD[4]);
        assert_eq!(v.last_note_index, 4);
    }

    #[test]
    fn scalar_mode_indexes_the_scale() {
        let mut v = pinned_voice(0.0);
        v.chordal = false;
        let scale = c_major_scale();
        let res = resolve(&mut v, CHORD, &scale, 0, 0.0);
        assert_eq!(res.note, scale.notes()[0]);
    }

    #[test]
    fn destutter_suppresses_identical_note_at_same_step() {
        let mut v = pinned_voice(0.5);
        let scale = c_major_scale();
        let first = resolve(&mut v, CHORD, &scale, 2, 0.0);
        assert!(!first.suppressed);
        let second = resolve(&mut v, CHORD, &scale, 2, 0.0);
        assert!(second.suppressed);
        assert_eq!(second.note, first.note);
        // Every further repeat stays suppressed while the step holds.
        let third = resolve(&mut v, CHORD, &scale, 2, 0.0);
        assert!(third.suppressed);
    }

    #[test]
    fn harmony_step_change_retriggers_despite_equal_note() {
        let mut v = pinned_voice(0.5);
        let scale = c_major_scale();
        resolve(&mut v, CHORD, &scale, 1, 0.0);
        let after_change = resolve(&mut v, CHORD, &scale, 2, 0.0);
        assert!(!after_change.suppressed);
    }

    #[test]
    fn destutter_off_always_retriggers() {
        let mut v = pinned_voice(0.5);
        v.destutter = false;
        let scale = c_major_scale();
        resolve(&mut v, CHORD, &scale, 0, 0.0);
        let second = resolve(&mut v, CHORD, &scale, 0, 0.0);
        assert!(!second.suppressed);
    }

    #[test]
    fn empty_chord_table_holds_the_prior_note() {
        let mut v = pinned_voice(0.5);
        v.last_note = 57;
        let res = resolve(&mut v, &[], &c_major_scale(), 0, 0.0);
        assert_eq!(res.note, 57);
    }

    #[test]
    fn bar_clear_resets_the_note_count() {
        let mut v = pinned_voice(0.5);
        resolve(&mut v, CHORD, &c_major_scale(), 0, 0.0);
        assert_eq!(v.notes_this_bar, 1);
        v.clear_bar();
        assert_eq!(v.notes_this_bar, 0);
    }
}
