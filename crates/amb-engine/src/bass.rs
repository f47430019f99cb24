//! Bass resolver.
//!
//! Doubles the current chord root at the configured target octave, with an
//! optional upper-octave doubling, syncopation (drop the bar's 2nd beat),
//! shuffle (drop every position where `position mod 3 == 2`), and an
//! amplitude-only accent on the bar's first bass note.

use arrayvec::ArrayVec;

use crate::transport::Pulse;

/// Bass voice state.
#[derive(Debug)]
pub struct BassVoice {
    pub enabled: bool,
    pub staccato: bool,
    pub accent: bool,
    pub syncopate: bool,
    pub shuffle: bool,
    /// Emit a second note one octave up, in sync.
    pub octave_doubling: bool,
    pub volume: f32,
    pub target_octave: i32,
    /// Bass notes per whole note: 4 = quarter notes.
    pub divisor: u8,
    /// Bass positions counted so far this bar (including dropped ones).
    pub notes_this_bar: u32,
    /// Whether the last emitted note carries the accent.
    pub note_accented: bool,
    pub last_notes: ArrayVec<i16, 2>,
    pub gate: Pulse,
}

impl BassVoice {
    pub fn new() -> Self {
        Self {
            enabled: true,
            staccato: false,
            accent: false,
            syncopate: false,
            shuffle: false,
            octave_doubling: false,
            volume: 10.0,
            target_octave: 2,
            divisor: 4,
            notes_this_bar: 0,
            note_accented: false,
            last_notes: ArrayVec::new(),
            gate: Pulse::default(),
        }
    }

    pub fn clear_bar(&mut self) {
        self.notes_this_bar = 0;
    }

    pub fn gate_duration(
        &self,
        beats_per_second: f32,
        signature_top: u8,
        step_scale: f32,
    ) -> f32 {
        let factor = if self.staccato { 0.5 } else { 0.95 };
        factor * step_scale * signature_top as f32
            / (beats_per_second * self.divisor.max(1) as f32)
    }

    /// Output level, attenuating unaccented notes when accent mode is on.
    pub fn output_volume(&self) -> f32 {
        if self.accent && !self.note_accented {
            0.8 * self.volume
        } else {
            self.volume
        }
    }
}

impl Default for BassVoice {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve one bass position; None when the rhythm rules drop it.
pub fn resolve(voice: &mut BassVoice, chord_root_pitch_class: u8) -> Option<ArrayVec<i16, 2>> {
    voice.notes_this_bar += 1;

    if voice.syncopate && voice.notes_this_bar == 2 {
        return None;
    }
    if voice.shuffle && voice.notes_this_bar % 3 == 2 {
        return None;
    }

    voice.note_accented = voice.accent && voice.notes_this_bar == 1;

    let root = chord_root_pitch_class as i16 + 12 * voice.target_octave as i16;
    let mut notes = ArrayVec::new();
    notes.push(root);
    if voice.octave_doubling {
        notes.push(root + 12);
    }
    voice.last_notes = notes.clone();
    Some(notes)
}
