//! Music-theory tables and types for the ambler generative engine.
//!
//! This crate holds the read-only "theory registry": pitch classes, modes
//! and scales, chord qualities, the circle-of-fifths layout, harmony
//! progression presets, and the Markov transition tables. Everything here
//! is either a `const` table or derived data rebuilt on key/mode changes;
//! nothing in this crate mutates at tick rate.
//!
//! Designed to be `no_std` compatible.

#![cfg_attr(not(feature = "std"), no_std)]

mod chord;
mod circle;
mod markov;
mod note;
mod progression;
mod scale;

pub use chord::{ChordType, SeventhStyle};
pub use circle::{CircleOfFifths, Station, DEGREE_COUNT};
pub use markov::{select_step, MarkovStyle};
pub use note::{note_name, Part, PlayedNote, PITCH_CLASSES};
pub use progression::{
    preset, preset_count, HarmonyPreset, ProgressionBehavior, MAX_PRESET_STEPS,
};
pub use scale::{Mode, Scale, MAX_SCALE_NOTES};
