//! Harmony progression presets.
//!
//! A preset is an ordered list of scale-degree steps plus a behavior tag
//! telling the selector how to walk them. Presets are read-only once
//! selected; only the effective step count can change at run time, and only
//! within the preset's declared bounds.

use crate::markov::MarkovStyle;

/// Maximum steps in a progression.
pub const MAX_PRESET_STEPS: usize = 16;

/// How the harmony selector walks a preset's steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProgressionBehavior {
    /// step = bar_count mod step_count.
    #[default]
    Fixed,
    /// A fresh uniform step at each bar's first chord.
    UniformRandom,
    /// Fixed walk, but each return to the tonic randomizes the next
    /// cycle's effective length.
    RandomComingHome,
    /// Next step drawn from a style transition matrix over the prior step.
    Markov(MarkovStyle),
}

/// One read-only progression preset.
#[derive(Clone, Copy, Debug)]
pub struct HarmonyPreset {
    pub name: &'static str,
    /// Scale degrees (1-7), in playing order.
    pub steps: &'static [u8],
    pub min_steps: u8,
    pub max_steps: u8,
    pub behavior: ProgressionBehavior,
}

impl HarmonyPreset {
    pub fn step_count(&self) -> u8 {
        self.steps.len() as u8
    }

    /// Degree (1-7) at a step index, wrapped into the effective count.
    pub fn degree_at(&self, step: usize, effective_steps: u8) -> u8 {
        let count = (effective_steps as usize).clamp(1, self.steps.len().max(1));
        self.steps[step % count].clamp(1, 7)
    }

    /// Validate a live step-count change. Out-of-bounds requests are
    /// rejected so the caller retains its prior value.
    pub fn accept_step_count(&self, requested: i32) -> Option<u8> {
        if requested >= self.min_steps as i32 && requested <= self.max_steps as i32 {
            Some(requested as u8)
        } else {
            None
        }
    }
}

static ALL_SEVEN: &[u8] = &[1, 2, 3, 4, 5, 6, 7];

static PRESETS: &[HarmonyPreset] = &[
    HarmonyPreset {
        name: "I IV V",
        steps: &[1, 4, 5],
        min_steps: 1,
        max_steps: 3,
        behavior: ProgressionBehavior::Fixed,
    },
    HarmonyPreset {
        name: "I IV V V",
        steps: &[1, 4, 5, 5],
        min_steps: 1,
        max_steps: 4,
        behavior: ProgressionBehavior::Fixed,
    },
    HarmonyPreset {
        name: "12-bar blues",
        steps: &[1, 1, 1, 1, 4, 4, 1, 1, 5, 4, 1, 5],
        min_steps: 1,
        max_steps: 12,
        behavior: ProgressionBehavior::Fixed,
    },
    HarmonyPreset {
        name: "Pachelbel canon",
        steps: &[1, 5, 6, 3, 4, 1, 4, 5],
        min_steps: 1,
        max_steps: 8,
        behavior: ProgressionBehavior::Fixed,
    },
    HarmonyPreset {
        name: "50s doo-wop",
        steps: &[1, 6, 4, 5],
        min_steps: 1,
        max_steps: 4,
        behavior: ProgressionBehavior::Fixed,
    },
    HarmonyPreset {
        name: "Andalusian cadence",
        steps: &[1, 7, 6, 5],
        min_steps: 1,
        max_steps: 4,
        behavior: ProgressionBehavior::Fixed,
    },
    HarmonyPreset {
        name: "Circle of fifths descent",
        steps: &[1, 4, 7, 3, 6, 2, 5, 1],
        min_steps: 1,
        max_steps: 8,
        behavior: ProgressionBehavior::Fixed,
    },
    HarmonyPreset {
        name: "ii V I",
        steps: &[2, 5, 1],
        min_steps: 1,
        max_steps: 3,
        behavior: ProgressionBehavior::Fixed,
    },
    HarmonyPreset {
        name: "Random order",
        steps: ALL_SEVEN,
        min_steps: 1,
        max_steps: 7,
        behavior: ProgressionBehavior::UniformRandom,
    },
    HarmonyPreset {
        name: "Random coming home",
        steps: &[1, 4, 7, 3, 6, 2, 5, 1],
        min_steps: 2,
        max_steps: 8,
        behavior: ProgressionBehavior::RandomComingHome,
    },
    HarmonyPreset {
        name: "Markov Bach I",
        steps: ALL_SEVEN,
        min_steps: 7,
        max_steps: 7,
        behavior: ProgressionBehavior::Markov(MarkovStyle::BachI),
    },
    HarmonyPreset {
        name: "Markov Bach II",
        steps: ALL_SEVEN,
        min_steps: 7,
        max_steps: 7,
        behavior: ProgressionBehavior::Markov(MarkovStyle::BachII),
    },
    HarmonyPreset {
        name: "Markov Mozart I",
        steps: ALL_SEVEN,
        min_steps: 7,
        max_steps: 7,
        behavior: ProgressionBehavior::Markov(MarkovStyle::MozartI),
    },
    HarmonyPreset {
        name: "Markov Mozart II",
        steps: ALL_SEVEN,
        min_steps: 7,
        max_steps: 7,
        behavior: ProgressionBehavior::Markov(MarkovStyle::MozartII),
    },
    HarmonyPreset {
        name: "Markov Palestrina",
        steps: ALL_SEVEN,
        min_steps: 7,
        max_steps: 7,
        behavior: ProgressionBehavior::Markov(MarkovStyle::Palestrina),
    },
    HarmonyPreset {
        name: "Markov Beethoven",
        steps: ALL_SEVEN,
        min_steps: 7,
        max_steps: 7,
        behavior: ProgressionBehavior::Markov(MarkovStyle::Beethoven),
    },
    HarmonyPreset {
        name: "Markov traditional",
        steps: ALL_SEVEN,
        min_steps: 7,
        max_steps: 7,
        behavior: ProgressionBehavior::Markov(MarkovStyle::Traditional),
    },
    HarmonyPreset {
        name: "Markov folk cadence",
        steps: ALL_SEVEN,
        min_steps: 7,
        max_steps: 7,
        behavior: ProgressionBehavior::Markov(MarkovStyle::FolkCadence),
    },
];

/// Preset by index, clamped to the library size.
pub fn preset(index: usize) -> &'static HarmonyPreset {
    &PRESETS[index.min(PRESETS.len() - 1)]
}

pub fn preset_count() -> usize {
    PRESETS.len()
}
