//! External control dispatch.
//!
//! Every external control is a `ControlId` mapped to a small typed setter
//! in one table, so each control can be unit-tested in isolation. Values
//! arrive as raw floats; out-of-range values are clamped to the nearest
//! valid bound, never rejected.

use amb_theory::{Mode, SeventhStyle};

use crate::engine::Engine;

/// Identifier for one external control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlId {
    Run,
    Reset,
    Tempo,
    TimeSigTop,
    TimeSigBottom,
    RootKey,
    Mode,

    HarmonyEnable,
    HarmonyVolume,
    HarmonySteps,
    HarmonyTargetOctave,
    HarmonyAlpha,
    HarmonyRange,
    HarmonyDivisor,
    HarmonyPreset,
    HarmonyStaccato,
    HarmonyAll7ths,
    HarmonyV7ths,
    HarmonyFbmOctaves,
    HarmonyFbmPeriod,

    MelodyEnable,
    MelodyVolume,
    MelodyDestutter,
    MelodyDivisor,
    MelodyTargetOctave,
    MelodyAlpha,
    MelodyRange,
    MelodyChordal,
    MelodyScalar,
    MelodyStaccato,
    MelodyFbmOctaves,
    MelodyFbmPeriod,

    ArpEnable,
    ArpCount,
    ArpDivisor,
    ArpDecay,
    ArpPattern,
    ArpChordal,
    ArpScalar,
    ArpFbmOctaves,
    ArpFbmPeriod,

    BassEnable,
    BassVolume,
    BassTargetOctave,
    BassDivisor,
    BassAccent,
    BassSyncopate,
    BassShuffle,
    BassOctaves,
    BassStaccato,
}

type Apply = fn(&mut Engine, f32);

/// Decode an enable-style value: negative leaves the stored flag alone.
fn flag(value: f32) -> Option<bool> {
    if value < 0.0 {
        None
    } else {
        Some(value > 0.5)
    }
}

/// Round to the nearest power of two within [min, max].
fn pow2_divisor(value: f32, min: u8, max: u8) -> u8 {
    let mut best = min;
    let mut best_dist = f32::MAX;
    let mut candidate = 1u8;
    while candidate <= max {
        if candidate >= min {
            let dist = (value - candidate as f32).abs();
            if dist < best_dist {
                best_dist = dist;
                best = candidate;
            }
        }
        if candidate > 64 {
            break;
        }
        candidate = candidate.saturating_mul(2);
    }
    best
}

/// The control table: id to typed setter.
pub static CONTROLS: &[(ControlId, Apply)] = &[
    (ControlId::Run, |e, v| {
        if let Some(b) = flag(v) {
            e.set_running(b);
        }
    }),
    (ControlId::Reset, |e, v| {
        if v > 0.5 {
            e.reset();
        }
    }),
    (ControlId::Tempo, |e, v| {
        e.transport.tempo = v.clamp(10.0, 300.0);
    }),
    (ControlId::TimeSigTop, |e, v| {
        let bottom = e.transport.signature.bottom;
        e.set_signature(libm::roundf(v).clamp(2.0, 15.0) as u8, bottom);
    }),
    (ControlId::TimeSigBottom, |e, v| {
        let top = e.transport.signature.top;
        e.set_signature(top, libm::roundf(v).clamp(2.0, 16.0) as u8);
    }),
    (ControlId::RootKey, |e, v| {
        e.set_root_key(libm::roundf(v).clamp(0.0, 11.0) as u8);
    }),
    (ControlId::Mode, |e, v| {
        e.set_mode(Mode::from_index(libm::roundf(v) as i32));
    }),
    // ── Harmony ─────────────────────────────────────────────────────
    (ControlId::HarmonyEnable, |e, v| {
        if let Some(b) = flag(v) {
            e.set_harmony_enabled(b);
        }
    }),
    (ControlId::HarmonyVolume, |e, v| {
        e.harmony.volume = v.clamp(0.0, 10.0);
    }),
    (ControlId::HarmonySteps, |e, v| {
        e.set_harmony_steps(libm::roundf(v) as i32);
    }),
    (ControlId::HarmonyTargetOctave, |e, v| {
        e.harmony.target_octave = libm::roundf(v).clamp(1.0, 6.0) as i32;
        let width = e.harmony.range_width;
        e.harmony.wander.set_range(e.harmony.target_octave, width);
    }),
    (ControlId::HarmonyAlpha, |e, v| {
        e.harmony.wander.alpha = v.clamp(0.0, 1.0);
    }),
    (ControlId::HarmonyRange, |e, v| {
        e.harmony.range_width = v.clamp(0.0, 3.0);
        let width = e.harmony.range_width;
        e.harmony.wander.set_range(e.harmony.target_octave, width);
    }),
    (ControlId::HarmonyDivisor, |e, v| {
        e.harmony.divisor = pow2_divisor(v, 1, 8);
    }),
    (ControlId::HarmonyPreset, |e, v| {
        e.set_preset(libm::roundf(v).max(0.0) as usize);
    }),
    (ControlId::HarmonyStaccato, |e, v| {
        if let Some(b) = flag(v) {
            e.harmony.staccato = b;
        }
    }),
    (ControlId::HarmonyAll7ths, |e, v| {
        if let Some(b) = flag(v) {
            e.harmony.seventh_style = if b {
                SeventhStyle::All
            } else if e.harmony.seventh_style == SeventhStyle::All {
                SeventhStyle::None
            } else {
                e.harmony.seventh_style
            };
            e.mark_theory_dirty();
        }
    }),
    (ControlId::HarmonyV7ths, |e, v| {
        if let Some(b) = flag(v) {
            e.harmony.seventh_style = if b {
                SeventhStyle::DominantOnly
            } else if e.harmony.seventh_style == SeventhStyle::DominantOnly {
                SeventhStyle::None
            } else {
                e.harmony.seventh_style
            };
            e.mark_theory_dirty();
        }
    }),
    (ControlId::HarmonyFbmOctaves, |e, v| {
        e.harmony.wander.octaves = libm::roundf(v).clamp(1.0, 6.0) as u32;
    }),
    (ControlId::HarmonyFbmPeriod, |e, v| {
        e.harmony.wander.period = v.clamp(1.0, 100.0);
    }),
    // ── Melody ──────────────────────────────────────────────────────
    (ControlId::MelodyEnable, |e, v| {
        if let Some(b) = flag(v) {
            e.melody.enabled = b;
        }
    }),
    (ControlId::MelodyVolume, |e, v| {
        e.melody.volume = v.clamp(0.0, 10.0);
    }),
    (ControlId::MelodyDestutter, |e, v| {
        if let Some(b) = flag(v) {
            e.melody.destutter = b;
        }
    }),
    (ControlId::MelodyDivisor, |e, v| {
        e.melody.divisor = pow2_divisor(v, 1, 32);
    }),
    (ControlId::MelodyTargetOctave, |e, v| {
        e.melody.target_octave = libm::roundf(v).clamp(1.0, 6.0) as i32;
        let width = e.melody.range_width;
        e.melody.wander.set_range(e.melody.target_octave, width);
    }),
    (ControlId::MelodyAlpha, |e, v| {
        e.melody.wander.alpha = v.clamp(0.0, 1.0);
    }),
    (ControlId::MelodyRange, |e, v| {
        e.melody.range_width = v.clamp(0.0, 3.0);
        let width = e.melody.range_width;
        e.melody.wander.set_range(e.melody.target_octave, width);
    }),
    (ControlId::MelodyChordal, |e, v| {
        if let Some(b) = flag(v) {
            e.melody.chordal = b;
        }
    }),
    (ControlId::MelodyScalar, |e, v| {
        if let Some(b) = flag(v) {
            e.melody.chordal = !b;
        }
    }),
    (ControlId::MelodyStaccato, |e, v| {
        if let Some(b) = flag(v) {
            e.melody.staccato = b;
        }
    }),
    (ControlId::MelodyFbmOctaves, |e, v| {
        e.melody.wander.octaves = libm::roundf(v).clamp(1.0, 6.0) as u32;
    }),
    (ControlId::MelodyFbmPeriod, |e, v| {
        e.melody.wander.period = v.clamp(1.0, 100.0);
    }),
    // ── Arp ─────────────────────────────────────────────────────────
    (ControlId::ArpEnable, |e, v| {
        if let Some(b) = flag(v) {
            e.arp.enabled = b;
        }
    }),
    (ControlId::ArpCount, |e, v| {
        e.arp.count = libm::roundf(v).clamp(0.0, 31.0) as u8;
    }),
    (ControlId::ArpDivisor, |e, v| {
        e.arp.divisor = pow2_divisor(v, 1, 32);
    }),
    (ControlId::ArpDecay, |e, v| {
        e.arp.decay = v.clamp(0.0, 0.95);
    }),
    (ControlId::ArpPattern, |e, v| {
        e.arp.pattern = libm::roundf(v).clamp(-3.0, 3.0) as i8;
    }),
    (ControlId::ArpChordal, |e, v| {
        if let Some(b) = flag(v) {
            e.arp.chordal = b;
        }
    }),
    (ControlId::ArpScalar, |e, v| {
        if let Some(b) = flag(v) {
            e.arp.chordal = !b;
        }
    }),
    (ControlId::ArpFbmOctaves, |e, v| {
        e.arp.wander.octaves = libm::roundf(v).clamp(1.0, 6.0) as u32;
    }),
    (ControlId::ArpFbmPeriod, |e, v| {
        e.arp.wander.period = v.clamp(1.0, 100.0);
    }),
    // ── Bass ────────────────────────────────────────────────────────
    (ControlId::BassEnable, |e, v| {
        if let Some(b) = flag(v) {
            e.bass.enabled = b;
        }
    }),
    (ControlId::BassVolume, |e, v| {
        e.bass.volume = v.clamp(0.0, 10.0);
    }),
    (ControlId::BassTargetOctave, |e, v| {
        e.bass.target_octave = libm::roundf(v).clamp(0.0, 3.0) as i32;
    }),
    (ControlId::BassDivisor, |e, v| {
        e.bass.divisor = pow2_divisor(v, 1, 8);
    }),
    (ControlId::BassAccent, |e, v| {
        if let Some(b) = flag(v) {
            e.bass.accent = b;
        }
    }),
    (ControlId::BassSyncopate, |e, v| {
        if let Some(b) = flag(v) {
            e.bass.syncopate = b;
        }
    }),
    (ControlId::BassShuffle, |e, v| {
        if let Some(b) = flag(v) {
            e.bass.shuffle = b;
        }
    }),
    (ControlId::BassOctaves, |e, v| {
        if let Some(b) = flag(v) {
            e.bass.octave_doubling = b;
        }
    }),
    (ControlId::BassStaccato, |e, v| {
        if let Some(b) = flag(v) {
            e.bass.staccato = b;
        }
    }),
];

/// Apply one control value through the table.
pub fn apply(engine: &mut Engine, id: ControlId, value: f32) {
    if let Some((_, setter)) = CONTROLS.iter().find(|(control, _)| *control == id) {
        setter(engine, value);
    }
}
