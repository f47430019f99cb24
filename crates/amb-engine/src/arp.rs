//! Arpeggio resolver.
//!
//! On each arp sub-tick, offsets from the melody note's resolved index by
//! an integer pattern code, decaying in volume until the configured note
//! count is reached. Chordal mode walks the current chord's member table;
//! scalar mode re-locates the melody note in the diatonic table with a
//! nearest-or-exact binary search before offsetting.

use amb_theory::Scale;

use crate::melody::MelodyVoice;
use crate::noise::Wander;

/// Most arp notes emitted per melody note.
pub const MAX_ARP_NOTES: usize = 32;

/// Arp voice state.
#[derive(Debug)]
pub struct ArpVoice {
    pub enabled: bool,
    pub chordal: bool,
    /// Notes to emit after each melody note.
    pub count: u8,
    /// Pattern code: 0 echo, +-1 step up/down, +-2 alternating, other
    /// values step by that multiple.
    pub pattern: i8,
    /// Per-note volume decay in [0, 1).
    pub decay: f32,
    /// Arp sub-ticks per whole note.
    pub divisor: u8,
    /// Notes emitted since the last melody note.
    pub note_count: u8,
    /// Noise state exported for collaborators (arp has no wander range).
    pub wander: Wander,
}

impl ArpVoice {
    pub fn new() -> Self {
        Self {
            enabled: false,
            chordal: true,
            count: 3,
            pattern: 1,
            decay: 0.2,
            divisor: 16,
            note_count: 0,
            wander: Wander::new(200.0),
        }
    }

    /// A melody note restarts the arpeggio.
    pub fn restart(&mut self) {
        self.note_count = 0;
    }
}

impl Default for ArpVoice {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of an arp resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArpResolution {
    pub note: i16,
    /// Multiplier applied to the melody volume.
    pub volume_factor: f32,
}

/// Index offset from the melody note for the arp's n-th note.
pub fn pattern_offset(pattern: i8, note_count: u8, count: u8) -> i32 {
    let n = note_count as i32;
    let c = count as i32;
    let mut offset = match pattern {
        -1..=1 => n * pattern as i32,
        2 => {
            if n <= c / 2 {
                n
            } else {
                c - n - 1
            }
        }
        -2 => {
            if n <= c / 2 {
                -n
            } else {
                -c + n - 1
            }
        }
        other => n * other as i32,
    };
    if pattern != 0 {
        // Sit above the melody note rather than repeating it.
        offset += 1;
    }
    offset
}

/// Nearest-or-exact binary search over a monotonically increasing table.
///
/// Returns the index of `target` when present; otherwise the search
/// converges on a valid neighboring partition index (within one slot of
/// the insertion point) rather than failing.
pub fn nearest_index(table: &[i16], target: i16) -> usize {
    if table.is_empty() {
        return 0;
    }
    let mut start = 0usize;
    let mut end = table.len() - 1;
    let mut partition = 0usize;
    for _ in 0..8 {
        partition = (start + end) / 2;
        if target > table[partition] {
            start = partition;
        } else if target < table[partition] {
            end = partition;
        } else {
            break;
        }
    }
    partition
}

/// Resolve one arp note, or None when the pattern has run out.
pub fn resolve(
    voice: &mut ArpVoice,
    melody: &MelodyVoice,
    chord_table: &[i16],
    scale: &Scale,
) -> Option<ArpResolution> {
    if voice.note_count >= voice.count.min(MAX_ARP_NOTES as u8) {
        return None;
    }

    let offset = pattern_offset(voice.pattern, voice.note_count, voice.count);
    voice.note_count += 1;
    let volume_factor = libm::powf(1.0 - voice.decay, voice.note_count as f32);

    let note = if voice.chordal {
        if chord_table.is_empty() {
            return None;
        }
        let index = (melody.last_note_index as i32 + offset)
            .rem_euclid(chord_table.len() as i32) as usize;
        chord_table[index]
    } else {
        let anchor = nearest_index(scale.notes(), melody.last_note);
        let index = (anchor as i32 + offset).clamp(0, scale.len() as i32 - 1) as usize;
        scale.note_at(index)
    };

    Some(ArpResolution {
        note,
        volume_factor,
    })
}
