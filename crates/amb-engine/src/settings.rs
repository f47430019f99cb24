//! Persisted-flag hand-off.
//!
//! Only the per-voice boolean flags are persisted, as flat key/value pairs
//! owned by an external collaborator. Everything else (step counts, derived
//! tables) is recomputed from scratch on load. Unknown keys are ignored and
//! missing keys keep their compiled-in defaults, so a corrupt store can
//! never abort a load.

use crate::engine::Engine;

/// One persisted flag.
pub type FlagPair = (&'static str, bool);

/// Number of persisted flags.
pub const FLAG_COUNT: usize = 17;

/// Snapshot the persistable flags.
pub fn export_flags(engine: &Engine) -> [FlagPair; FLAG_COUNT] {
    use amb_theory::SeventhStyle;
    [
        ("running", engine.is_running()),
        ("harmony.enabled", engine.harmony.enabled),
        ("harmony.staccato", engine.harmony.staccato),
        (
            "harmony.all_sevenths",
            engine.harmony.seventh_style == SeventhStyle::All,
        ),
        (
            "harmony.dominant_sevenths",
            engine.harmony.seventh_style == SeventhStyle::DominantOnly,
        ),
        ("melody.enabled", engine.melody.enabled),
        ("melody.destutter", engine.melody.destutter),
        ("melody.staccato", engine.melody.staccato),
        ("melody.chordal", engine.melody.chordal),
        ("arp.enabled", engine.arp.enabled),
        ("arp.chordal", engine.arp.chordal),
        ("bass.enabled", engine.bass.enabled),
        ("bass.staccato", engine.bass.staccato),
        ("bass.syncopate", engine.bass.syncopate),
        ("bass.accent", engine.bass.accent),
        ("bass.shuffle", engine.bass.shuffle),
        ("bass.octaves", engine.bass.octave_doubling),
    ]
}

/// Re-apply persisted flags. Unknown keys are skipped; anything absent
/// keeps its current (default) value.
pub fn apply_flags(engine: &mut Engine, pairs: &[(&str, bool)]) {
    use amb_theory::SeventhStyle;
    for (key, value) in pairs {
        match *key {
            "running" => engine.set_running(*value),
            "harmony.enabled" => engine.set_harmony_enabled(*value),
            "harmony.staccato" => engine.harmony.staccato = *value,
            "harmony.all_sevenths" => {
                if *value {
                    engine.harmony.seventh_style = SeventhStyle::All;
                } else if engine.harmony.seventh_style == SeventhStyle::All {
                    engine.harmony.seventh_style = SeventhStyle::None;
                }
            }
            "harmony.dominant_sevenths" => {
                if *value {
                    engine.harmony.seventh_style = SeventhStyle::DominantOnly;
                } else if engine.harmony.seventh_style == SeventhStyle::DominantOnly {
                    engine.harmony.seventh_style = SeventhStyle::None;
                }
            }
            "melody.enabled" => engine.melody.enabled = *value,
            "melody.destutter" => engine.melody.destutter = *value,
            "melody.staccato" => engine.melody.staccato = *value,
            "melody.chordal" => engine.melody.chordal = *value,
            "arp.enabled" => engine.arp.enabled = *value,
            "arp.chordal" => engine.arp.chordal = *value,
            "bass.enabled" => engine.bass.enabled = *value,
            "bass.staccato" => engine.bass.staccato = *value,
            "bass.syncopate" => engine.bass.syncopate = *value,
            "bass.accent" => engine.bass.accent = *value,
            "bass.shuffle" => engine.bass.shuffle = *value,
            "bass.octaves" => engine.bass.octave_doubling = *value,
            _ => log::debug!("ignoring unknown persisted flag {}", key),
        }
    }
    // Seventh changes alter the chord tables.
    engine.mark_theory_dirty();
}
