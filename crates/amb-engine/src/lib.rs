//! Real-time generative decision core for ambler.
//!
//! One `Engine` instance owns the transport divider, the per-voice
//! smoothed-noise wander states, the four note resolvers, and the bar-scoped
//! note log. Exactly one `process()` call per audio sample; all state
//! mutation happens on that call, with bounded constant-time work and no
//! allocation in the tick path.

#![cfg_attr(not(feature = "std"), no_std)]

mod arp;
mod bass;
mod control;
mod engine;
mod event_log;
mod harmony;
mod melody;
mod noise;
mod rng;
mod settings;
mod transport;

pub use arp::{ArpVoice, MAX_ARP_NOTES};
pub use bass::BassVoice;
pub use control::{apply as apply_control, ControlId, CONTROLS};
pub use engine::{Engine, ExternalInputs, Outputs, CONTROL_POLL_INTERVAL};
pub use event_log::{NoteLog, NOTE_LOG_CAPACITY};
pub use harmony::{HarmonyVoice, MAX_CHORD_TABLE_NOTES};
pub use melody::MelodyVoice;
pub use noise::{fbm, fbm01, Wander};
pub use rng::Rng;
pub use settings::{apply_flags, export_flags, FlagPair, FLAG_COUNT};
pub use transport::{
    Boundaries, EdgeDetector, PhaseClock, Pulse, PulseStates, StepRate, TimeSignature, Transport,
};
