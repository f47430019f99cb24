//! Transport divider: tempo to hierarchical rhythmic boundaries.
//!
//! A free-running phase oscillator (or an edge-triggered external clock)
//! produces one tick per 32nd note. Nested counters derive 16th, 8th,
//! quarter, half, and bar boundaries from those ticks, and minimal-width
//! retrigger pulses are exported for outside collaborators.

/// Retrigger pulse width in seconds.
pub const TRIGGER_LENGTH: f32 = 1e-4;

/// Time signature as top/bottom integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeSignature {
    pub top: u8,
    pub bottom: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self { top: 4, bottom: 4 }
    }
}

impl TimeSignature {
    /// 32nd-note ticks per bar.
    pub fn bar_tick_limit(self) -> u16 {
        let limit = 32 * self.top as u16 / self.bottom.max(1) as u16;
        limit.max(1)
    }
}

/// Free-running square oscillator driving the internal clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct PhaseClock {
    phase: f32,
    freq: f32,
}

impl PhaseClock {
    pub fn set_freq(&mut self, freq: f32) {
        self.freq = freq;
    }

    pub fn step(&mut self, dt: f32) {
        let delta = (self.freq * dt).min(0.5);
        self.phase += delta;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Square output in {-1, 1}.
    pub fn sqr(&self) -> f32 {
        if self.phase < 0.5 {
            1.0
        } else {
            -1.0
        }
    }
}

/// Schmitt-style rising-edge detector: fires once when the input reaches
/// the high threshold, and re-arms only after it falls back to the low
/// threshold — exactly one tick per external clock cycle.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeDetector {
    high: bool,
}

impl EdgeDetector {
    pub fn process(&mut self, value: f32) -> bool {
        if self.high {
            if value <= 0.1 {
                self.high = false;
            }
            false
        } else if value >= 1.0 {
            self.high = true;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.high = false;
    }
}

/// A one-shot gate/trigger window measured in seconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pulse {
    remaining: f32,
}

impl Pulse {
    pub fn trigger(&mut self, duration: f32) {
        self.remaining = duration.max(0.0);
    }

    /// Cancel the pulse immediately.
    pub fn reset(&mut self) {
        self.remaining = 0.0;
    }

    /// Advance by `dt`; returns whether the pulse is (still) active.
    pub fn process(&mut self, dt: f32) -> bool {
        let active = self.remaining > 0.0;
        self.remaining = (self.remaining - dt).max(0.0);
        active
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }
}

/// Which derived clock output an external step controller is wired to.
/// When set, the matching pulses fire at the end of their interval rather
/// than the start, and gate lengths shorten to fit the drive rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepRate {
    Bar,
    Beat,
    BeatX2,
    BeatX4,
    BeatX8,
}

impl StepRate {
    /// Gate-length scale relative to a bar-driven step.
    pub fn duration_scale(self) -> f32 {
        match self {
            StepRate::Bar => 1.0,
            StepRate::Beat => 0.25,
            StepRate::BeatX2 => 0.125,
            StepRate::BeatX4 => 0.0625,
            StepRate::BeatX8 => 0.03125,
        }
    }
}

/// Subdivision boundaries crossed by one 32nd tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Boundaries {
    pub bar: bool,
    pub half: bool,
    pub quarter: bool,
    pub eighth: bool,
    pub sixteenth: bool,
    /// 32nd tick index within the bar at which the boundaries occurred.
    pub bar_tick: u16,
}

/// Pulse levels exported each sample.
#[derive(Clone, Copy, Debug, Default)]
pub struct PulseStates {
    pub tick: bool,
    pub bar: bool,
    pub beat: bool,
    pub beat_x2: bool,
    pub beat_x4: bool,
    pub beat_x8: bool,
}

// 32nd ticks per 16th/8th/quarter/half note.
const SIXTEENTH_LIMIT: u8 = 2;
const EIGHTH_LIMIT: u8 = 4;
const QUARTER_LIMIT: u8 = 8;
const HALF_LIMIT: u8 = 16;

/// The transport divider.
#[derive(Debug)]
pub struct Transport {
    pub tempo: f32,
    pub signature: TimeSignature,
    /// Set when an external step controller consumes the derived pulses.
    pub step_drive: Option<StepRate>,

    clock: PhaseClock,
    internal_edge: EdgeDetector,
    external_edge: EdgeDetector,

    sixteenth_count: u8,
    eighth_count: u8,
    quarter_count: u8,
    half_count: u8,
    bar_tick: u16,
    bar_tick_limit: u16,
    bar_count: u32,

    tick_pulse: Pulse,
    bar_pulse: Pulse,
    beat_pulse: Pulse,
    beat_x2_pulse: Pulse,
    beat_x4_pulse: Pulse,
    beat_x8_pulse: Pulse,
}

impl Transport {
    pub fn new(tempo: f32, signature: TimeSignature) -> Self {
        let mut t = Self {
            tempo,
            signature,
            step_drive: None,
            clock: PhaseClock::default(),
            internal_edge: EdgeDetector::default(),
            external_edge: EdgeDetector::default(),
            sixteenth_count: 0,
            eighth_count: 0,
            quarter_count: 0,
            half_count: 0,
            bar_tick: 0,
            bar_tick_limit: signature.bar_tick_limit(),
            bar_count: 0,
            tick_pulse: Pulse::default(),
            bar_pulse: Pulse::default(),
            beat_pulse: Pulse::default(),
            beat_x2_pulse: Pulse::default(),
            beat_x4_pulse: Pulse::default(),
            beat_x8_pulse: Pulse::default(),
        };
        t.refresh();
        t
    }

    /// Beats per second at the current tempo.
    pub fn frequency(&self) -> f32 {
        self.tempo / 60.0
    }

    /// Recompute oscillator frequency and bar limit from tempo/signature.
    /// Called on run-resume and whenever either changes.
    pub fn refresh(&mut self) {
        self.clock
            .set_freq(self.frequency() * 32.0 / self.signature.bottom.max(1) as f32);
        self.bar_tick_limit = self.signature.bar_tick_limit();
    }

    /// Number of completed bars since reset.
    pub fn bar_count(&self) -> u32 {
        self.bar_count
    }

    /// Push the bar counter forward (random-coming-home cycle shaping).
    pub fn advance_bars(&mut self, bars: u32) {
        self.bar_count = self.bar_count.wrapping_add(bars);
    }

    /// Current 32nd tick within the bar.
    pub fn bar_tick(&self) -> u16 {
        self.bar_tick
    }

    /// Zero all counters, reset the oscillator phase, and cancel every
    /// in-flight pulse. Idempotent: a second reset changes nothing.
    pub fn reset(&mut self) {
        self.zero_counters();
        self.bar_count = 0;
        self.clock.reset();
        self.internal_edge.reset();
        self.external_edge.reset();
        self.tick_pulse.reset();
        self.bar_pulse.reset();
        self.beat_pulse.reset();
        self.beat_x2_pulse.reset();
        self.beat_x4_pulse.reset();
        self.beat_x8_pulse.reset();
    }

    /// Run-stop: counters go back to the bar start but the bar count (and
    /// with it harmony step state) is preserved for resume.
    pub fn stop(&mut self) {
        self.zero_counters();
    }

    fn zero_counters(&mut self) {
        self.sixteenth_count = 0;
        self.eighth_count = 0;
        self.quarter_count = 0;
        self.half_count = 0;
        self.bar_tick = 0;
    }

    /// Advance by one sample. Returns the boundaries crossed if this sample
    /// produced a 32nd tick. With `external` connected, ticks come from its
    /// rising edges only; the internal oscillator still free-runs so a
    /// disconnect resumes cleanly.
    pub fn tick(&mut self, dt: f32, external: Option<f32>) -> Option<Boundaries> {
        self.refresh();
        self.clock.step(dt);

        let ticked = match external {
            Some(v) => self.external_edge.process(v),
            None => self.internal_edge.process(self.clock.sqr()),
        };
        if !ticked {
            return None;
        }

        let end_phased = self.step_drive.is_some();
        let bounds = Boundaries {
            bar: self.bar_tick == 0,
            half: self.half_count == 0,
            quarter: self.quarter_count == 0,
            eighth: self.eighth_count == 0,
            sixteenth: self.sixteenth_count == 0,
            bar_tick: self.bar_tick,
        };

        self.tick_pulse.trigger(TRIGGER_LENGTH);
        if bounds.bar {
            self.bar_pulse.trigger(TRIGGER_LENGTH);
        }
        // Derived pulses fire at interval start normally, or at interval end
        // when an external step controller consumes them, so the controller's
        // next step lines up with our next interval.
        let phase_hit = |count_is_zero: bool, count_is_last: bool| -> bool {
            if end_phased {
                count_is_last
            } else {
                count_is_zero
            }
        };
        if phase_hit(bounds.quarter, self.quarter_count == QUARTER_LIMIT - 1) {
            self.beat_pulse.trigger(TRIGGER_LENGTH);
        }
        if phase_hit(bounds.eighth, self.eighth_count == EIGHTH_LIMIT - 1) {
            self.beat_x2_pulse.trigger(TRIGGER_LENGTH);
        }
        if phase_hit(bounds.sixteenth, self.sixteenth_count == SIXTEENTH_LIMIT - 1) {
            self.beat_x4_pulse.trigger(TRIGGER_LENGTH);
        }
        if phase_hit(bounds.half, self.half_count == HALF_LIMIT - 1) {
            self.beat_x8_pulse.trigger(TRIGGER_LENGTH);
        }

        self.sixteenth_count = (self.sixteenth_count + 1) % SIXTEENTH_LIMIT;
        self.eighth_count = (self.eighth_count + 1) % EIGHTH_LIMIT;
        self.quarter_count = (self.quarter_count + 1) % QUARTER_LIMIT;
        self.half_count = (self.half_count + 1) % HALF_LIMIT;
        self.bar_tick += 1;
        if self.bar_tick >= self.bar_tick_limit {
            self.bar_tick = 0;
            self.bar_count = self.bar_count.wrapping_add(1);
        }

        Some(bounds)
    }

    /// Advance the retrigger pulses by one sample and report their levels.
    pub fn pulse_states(&mut self, dt: f32) -> PulseStates {
        PulseStates {
            tick: self.tick_pulse.process(dt),
            bar: self.bar_pulse.process(dt),
            beat: self.beat_pulse.process(dt),
            beat_x2: self.beat_x2_pulse.process(dt),
            beat_x4: self.beat_x4_pulse.process(dt),
            beat_x8: self.beat_x8_pulse.process(dt),
        }
    }
}
