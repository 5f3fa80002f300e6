//! Audible alarm for critical conditions.
//!
//! The buzzer plays a fixed cyclic pattern of `(duration_ms, frequency_hz)`
//! phases while a critical set is on screen; a frequency of `0` is a silent
//! gap. The sequencer caches the last frequency it applied so the PWM divider
//! is only reprogrammed on change.

use crate::config::ALARM_SEQUENCE;
use crate::hal::ToneOutput;
use crate::time::Millis;

/// Alarm pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlarmConfig {
    /// `(duration_ms, frequency_hz)` phases, played in a loop.
    pub sequence: &'static [(u32, u32)],
}

impl AlarmConfig {
    pub const DEFAULT: Self = Self {
        sequence: &ALARM_SEQUENCE,
    };
}

impl Default for AlarmConfig {
    fn default() -> Self { Self::DEFAULT }
}

/// Phase cursor over the alarm pattern.
#[derive(Clone, Debug)]
pub struct AlarmSequencer {
    config: AlarmConfig,
    active: bool,
    phase: usize,
    phase_started: Millis,
    applied_hz: Option<u32>,
}

impl AlarmSequencer {
    pub const fn new(config: AlarmConfig) -> Self {
        Self {
            config,
            active: false,
            phase: 0,
            phase_started: Millis(0),
            applied_hz: None,
        }
    }

    #[inline]
    pub const fn is_active(&self) -> bool { self.active }

    #[inline]
    pub const fn phase(&self) -> usize { self.phase }

    fn phase_tone(&self) -> Option<(u32, u32)> { self.config.sequence.get(self.phase).copied() }

    fn apply<T: ToneOutput>(
        &mut self,
        tone: &mut T,
        hz: u32,
    ) {
        if hz > 0 {
            if self.applied_hz != Some(hz) {
                tone.set_frequency(hz);
                self.applied_hz = Some(hz);
            }
            tone.set_enabled(true);
        } else {
            tone.set_enabled(false);
        }
    }

    /// Drive the buzzer for one tick.
    ///
    /// `enabled` is true exactly while the displayed set is critical.
    pub fn update<T: ToneOutput>(
        &mut self,
        enabled: bool,
        now: Millis,
        tone: &mut T,
    ) {
        if !enabled {
            if self.active {
                self.force_silence(tone);
            }
            return;
        }

        if !self.active {
            info!("Alarm on");
            self.active = true;
            self.phase = 0;
            self.phase_started = now;
            if let Some((_, hz)) = self.phase_tone() {
                self.apply(tone, hz);
            }
            return;
        }

        let Some((duration_ms, hz)) = self.phase_tone() else {
            return;
        };

        if now.since(self.phase_started) >= duration_ms {
            self.phase = (self.phase + 1) % self.config.sequence.len();
            self.phase_started = now;
            if let Some((_, next_hz)) = self.phase_tone() {
                self.apply(tone, next_hz);
            }
        } else if hz > 0 {
            // Re-assert in case something else silenced the output.
            self.apply(tone, hz);
        }
    }

    /// Silence the buzzer and rewind the pattern.
    ///
    /// The next enabled [`update`](Self::update) starts again from phase 0.
    pub fn force_silence<T: ToneOutput>(
        &mut self,
        tone: &mut T,
    ) {
        if self.active {
            info!("Alarm off");
        }
        self.active = false;
        self.phase = 0;
        tone.set_enabled(false);
    }

    /// Start a confirmation beep at `hz`.
    ///
    /// The caller ends it with [`force_silence`](Self::force_silence) after the
    /// beep duration.
    pub fn chirp<T: ToneOutput>(
        &mut self,
        tone: &mut T,
        hz: u32,
    ) {
        self.active = false;
        self.phase = 0;
        self.apply(tone, hz);
    }
}

impl Default for AlarmSequencer {
    fn default() -> Self { Self::new(AlarmConfig::DEFAULT) }
}
