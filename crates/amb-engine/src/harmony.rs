//! Harmony progression selector and chord resolver.
//!
//! Consumes bar-boundary events and chooses the next harmony step per the
//! active preset's behavior, then maps the step through the degree
//! semicircle to a chord root and quality. The smoothed wander value picks
//! the chord's starting position inside the per-step chord-tone table,
//! producing inversions.

use amb_theory::{
    select_step as markov_select, ChordType, CircleOfFifths, HarmonyPreset,
    ProgressionBehavior, SeventhStyle, MAX_PRESET_STEPS,
};
use arrayvec::ArrayVec;

use crate::noise::Wander;
use crate::rng::Rng;
use crate::transport::Pulse;

/// Capacity of one step's chord-tone table (4 members across 9 octaves).
pub const MAX_CHORD_TABLE_NOTES: usize = 40;

/// Outcome of a harmony resolution.
#[derive(Clone, Debug)]
pub struct ChordResolution {
    pub step: u8,
    pub degree: u8,
    pub station: usize,
    pub chord_type: ChordType,
    /// Chord member notes, low to high, already in the target register.
    pub notes: ArrayVec<i16, 4>,
    /// Bars to push the bar counter forward (random-coming-home shaping).
    pub advance_bars: u32,
}

/// Per-step chord-tone tables, rebuilt when root/mode/preset/7ths change.
#[derive(Clone, Debug, Default)]
pub struct StepChordTables {
    tables: [ArrayVec<i16, MAX_CHORD_TABLE_NOTES>; MAX_PRESET_STEPS],
}

impl StepChordTables {
    pub fn rebuild(
        &mut self,
        circle: &CircleOfFifths,
        preset: &HarmonyPreset,
        step_count: u8,
        seventh_style: SeventhStyle,
    ) {
        for (step, table) in self.tables.iter_mut().enumerate() {
            table.clear();
            let degree = preset.degree_at(step, step_count);
            let station = circle.station(circle.station_for_degree(degree));
            let chord = station.triad.promote(degree, seventh_style);
            for octave in 1..10i16 {
                let base = station.pitch_class as i16 + octave * 12;
                for interval in chord.intervals() {
                    let note = base + interval;
                    if note < 108 && table.remaining_capacity() > 0 {
                        table.push(note);
                    }
                }
            }
        }
    }

    pub fn for_step(&self, step: u8) -> &[i16] {
        &self.tables[step as usize % MAX_PRESET_STEPS]
    }
}

/// Harmony voice state.
#[derive(Debug)]
pub struct HarmonyVoice {
    pub enabled: bool,
    pub staccato: bool,
    pub seventh_style: SeventhStyle,
    pub volume: f32,
    pub target_octave: i32,
    pub range_width: f32,
    /// Chords per whole note: 1 = one chord per bar.
    pub divisor: u8,
    pub wander: Wander,
    pub preset_index: usize,
    /// Effective step count, always within the preset's bounds.
    pub step_count: u8,
    /// Previously selected step; -1 = undefined (Markov prior).
    pub last_step: i8,
    pub last_station: usize,
    pub last_chord_type: ChordType,
    pub last_notes: ArrayVec<i16, 4>,
    pub gate: Pulse,
}

impl HarmonyVoice {
    pub fn new() -> Self {
        Self {
            enabled: true,
            staccato: false,
            seventh_style: SeventhStyle::None,
            volume: 10.0,
            target_octave: 2,
            range_width: 1.0,
            divisor: 1,
            wander: Wander::new(0.0),
            preset_index: 0,
            step_count: 0,
            last_step: -1,
            last_station: 0,
            last_chord_type: ChordType::Major,
            last_notes: ArrayVec::new(),
            gate: Pulse::default(),
        }
    }

    /// Forget progression history (reset event).
    pub fn clear_history(&mut self) {
        self.last_step = -1;
        self.last_notes.clear();
    }

    /// Gate length in seconds for the current settings.
    pub fn gate_duration(&self, beats_per_second: f32, step_scale: f32) -> f32 {
        let factor = if self.staccato { 0.5 } else { 0.95 };
        factor * step_scale * 4.0 / (beats_per_second * self.divisor.max(1) as f32)
    }
}

impl Default for HarmonyVoice {
    fn default() -> Self {
        Self::new()
    }
}

/// Choose the next step index for a preset behavior.
///
/// `chord_in_bar` is the bar-relative chord index: later chords within one
/// bar reuse the bar's first selection. Returns the step and how many bars
/// to push the bar counter forward (non-zero only for random-coming-home).
pub fn select_step(
    behavior: ProgressionBehavior,
    bar_count: u32,
    chord_in_bar: u32,
    step_count: u8,
    last_step: i8,
    rng: &mut Rng,
) -> (u8, u32) {
    let count = step_count.max(1) as u32;
    let reuse = last_step.max(0) as u8 % count as u8;
    match behavior {
        ProgressionBehavior::Fixed => ((bar_count % count) as u8, 0),
        ProgressionBehavior::UniformRandom => {
            if chord_in_bar == 0 {
                (rng.below(count) as u8, 0)
            } else {
                (reuse, 0)
            }
        }
        ProgressionBehavior::RandomComingHome => {
            if chord_in_bar != 0 {
                return (reuse, 0);
            }
            let step = (bar_count % count) as u8;
            if step == 0 {
                // Back home: draw the next cycle's effective length and move
                // the bar counter so the next return-to-tonic lands after it.
                let cycle_len = 1 + rng.below(count);
                (step, count - cycle_len)
            } else {
                (step, 0)
            }
        }
        ProgressionBehavior::Markov(style) => {
            if chord_in_bar == 0 {
                (markov_select(style, last_step, rng.uniform()), 0)
            } else {
                (reuse, 0)
            }
        }
    }
}

/// Resolve one harmony event: pick the step, map it to a chord, and choose
/// concrete member notes via the smoothed wander value.
#[allow(clippy::too_many_arguments)]
pub fn resolve(
    voice: &mut HarmonyVoice,
    tables: &StepChordTables,
    circle: &CircleOfFifths,
    preset: &HarmonyPreset,
    bar_count: u32,
    chord_in_bar: u32,
    elapsed: f32,
    rng: &mut Rng,
) -> ChordResolution {
    let (step, advance_bars) = select_step(
        preset.behavior,
        bar_count,
        chord_in_bar,
        voice.step_count,
        voice.last_step,
        rng,
    );

    let degree = preset.degree_at(step as usize, voice.step_count);
    let station = circle.station_for_degree(degree);
    let chord_type = circle.station(station).triad.promote(degree, voice.seventh_style);

    voice.wander.update(elapsed);

    let table = tables.for_step(step);
    let members = chord_type.member_count().min(table.len().max(1));
    // The wander index sets the inversion; clamp so the chord fits.
    let start = voice
        .wander
        .index_into(table.len())
        .min(table.len().saturating_sub(members));

    let mut notes = ArrayVec::new();
    for j in 0..members {
        if let Some(&note) = table.get(start + j) {
            // Drop one octave to land the target register.
            notes.push(note - 12);
        }
    }

    voice.last_step = step as i8;
    voice.last_station = station;
    voice.last_chord_type = chord_type;
    voice.last_notes = notes.clone();

    ChordResolution {
        step,
        degree,
        station,
        chord_type,
        notes,
        advance_bars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amb_theory::{preset, MarkovStyle, Mode};

    fn fixed_preset() -> &'static HarmonyPreset {
        preset(0) // I IV V, Fixed
    }

    fn setup(preset: &HarmonyPreset) -> (HarmonyVoice, StepChordTables, CircleOfFifths) {
        let circle = CircleOfFifths::build(0, Mode::Ionian);
        let mut voice = HarmonyVoice::new();
        voice.step_count = preset.step_count();
        let mut tables = StepChordTables::default();
        tables.rebuild(&circle, preset, voice.step_count, voice.seventh_style);
        (voice, tables, circle)
    }

    #[test]
    fn fixed_step_is_bar_count_mod_step_count() {
        let mut rng = Rng::new(1);
        for bar in 0..64u32 {
            let (step, adv) =
                select_step(ProgressionBehavior::Fixed, bar, 0, 3, -1, &mut rng);
            assert_eq!(step as u32, bar % 3);
            assert!(step < 3);
            assert_eq!(adv, 0);
        }
    }

    #[test]
    fn uniform_random_reuses_within_a_bar() {
        let mut rng = Rng::new(9);
        let (first, _) =
            select_step(ProgressionBehavior::UniformRandom, 5, 0, 7, -1, &mut rng);
        for chord in 1..4 {
            let (again, _) = select_step(
                ProgressionBehavior::UniformRandom,
                5,
                chord,
                7,
                first as i8,
                &mut rng,
            );
            assert_eq!(again, first);
        }
    }

    #[test]
    fn markov_undefined_prior_returns_step_zero() {
        for seed in 0..32 {
            let mut rng = Rng::new(seed);
            let (step, _) = select_step(
                ProgressionBehavior::Markov(MarkovStyle::BachI),
                3,
                0,
                7,
                -1,
                &mut rng,
            );
            assert_eq!(step, 0);
        }
    }

    #[test]
    fn markov_steps_stay_in_range() {
        let mut rng = Rng::new(1234);
        let mut last = -1i8;
        for bar in 0..500u32 {
            let (step, _) = select_step(
                ProgressionBehavior::Markov(MarkovStyle::Beethoven),
                bar,
                0,
                7,
                last,
                &mut rng,
            );
            assert!(step < 7);
            last = step as i8;
        }
    }

    #[test]
    fn coming_home_advance_keeps_cycles_in_bounds() {
        let mut rng = Rng::new(77);
        let count = 8u8;
        for _ in 0..200 {
            let (step, adv) = select_step(
                ProgressionBehavior::RandomComingHome,
                0,
                0,
                count,
                0,
                &mut rng,
            );
            assert_eq!(step, 0);
            // advance in [0, count-1] means cycle length in [1, count].
            assert!(adv < count as u32);
        }
    }

    #[test]
    fn coming_home_off_home_behaves_like_fixed() {
        let mut rng = Rng::new(77);
        let (step, adv) = select_step(
            ProgressionBehavior::RandomComingHome,
            10,
            0,
            8,
            1,
            &mut rng,
        );
        assert_eq!(step, 2);
        assert_eq!(adv, 0);
    }

    #[test]
    fn resolve_first_bar_of_fixed_is_the_tonic_major() {
        let p = fixed_preset();
        let (mut voice, tables, circle) = setup(p);
        let mut rng = Rng::new(5);
        let res = resolve(&mut voice, &tables, &circle, p, 0, 0, 0.0, &mut rng);
        assert_eq!(res.step, 0);
        assert_eq!(res.degree, 1);
        assert_eq!(res.chord_type, ChordType::Major);
        assert_eq!(res.notes.len(), 3);
        // All notes are chord tones of C major.
        for n in &res.notes {
            assert!(matches!(n.rem_euclid(12), 0 | 4 | 7), "note {}", n);
        }
        assert_eq!(voice.last_step, 0);
    }

    #[test]
    fn sevenths_add_a_fourth_member_on_the_dominant() {
        let p = fixed_preset();
        let (mut voice, mut tables, circle) = setup(p);
        voice.seventh_style = SeventhStyle::All;
        tables.rebuild(&circle, p, voice.step_count, voice.seventh_style);
        let mut rng = Rng::new(5);
        // Bar 2 of I IV V is the V step.
        let res = resolve(&mut voice, &tables, &circle, p, 2, 0, 0.0, &mut rng);
        assert_eq!(res.degree, 5);
        assert_eq!(res.chord_type, ChordType::Dominant7);
        assert_eq!(res.notes.len(), 4);
    }

    #[test]
    fn high_wander_still_fits_the_chord_in_the_table() {
        let p = fixed_preset();
        let (mut voice, tables, circle) = setup(p);
        voice.wander.range_top = 1.0;
        voice.wander.range_bottom = 1.0;
        voice.wander.note_avg = 1.0;
        voice.wander.alpha = 0.0;
        let mut rng = Rng::new(5);
        let res = resolve(&mut voice, &tables, &circle, p, 0, 0, 0.0, &mut rng);
        assert_eq!(res.notes.len(), 3);
        // Strictly ascending members even at the table's top end.
        assert!(res.notes[0] < res.notes[1] && res.notes[1] < res.notes[2]);
    }

    #[test]
    fn step_tables_are_ascending_chord_tones() {
        let p = fixed_preset();
        let (_, tables, _) = setup(p);
        for step in 0..p.step_count() {
            let table = tables.for_step(step);
            assert!(!table.is_empty());
            for pair in table.windows(2) {
                assert!(pair[0] < pair[1]);
            }
        }
    }

    #[test]
    fn gate_duration_halves_for_staccato() {
        let mut voice = HarmonyVoice::new();
        let legato = voice.gate_duration(2.0, 1.0);
        voice.staccato = true;
        let staccato = voice.gate_duration(2.0, 1.0);
        assert!(staccato < legato);
        assert!((staccato - 0.5 * 4.0 / 2.0).abs() < 1e-6);
    }
}
