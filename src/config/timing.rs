//! Tick cadence, display cycling, alarm pattern and persistence timing.

/// Nominal tick period of the orchestration loop (ms).
pub const UPDATE_INTERVAL_MS: u32 = 1_000;

/// Injector or VSS edges within this window mean "active" (ms).
pub const ACTIVITY_WINDOW_MS: u32 = 1_000;

/// Grace period after engine start before low oil pressure is reported (ms).
pub const OIL_CHECK_DELAY_MS: u32 = 4_000;

/// Time each icon of a multi-condition set stays on screen (ms).
pub const ERROR_DISPLAY_CYCLE_MS: u32 = 2_000;

/// LOW FUEL icon phase of the advisory blink (ms).
pub const LOW_FUEL_DISPLAY_DURATION_MS: u32 = 3_000;

/// Main screen phase of the advisory blink (ms).
pub const LOW_FUEL_MAIN_SCREEN_DURATION_MS: u32 = 10_000;

/// Blink toggle interval for the main screen indicators (ms).
pub const BLINK_INTERVAL_MS: u32 = 500;

/// Interval between routine counter saves (ms).
pub const PERSISTENT_SAVE_INTERVAL_MS: u32 = 60_000;

/// Pause after a failed tick before the loop resumes (ms).
pub const LOOP_ERROR_COOLDOWN_MS: u64 = 5_000;

/// Startup OK screen duration (ms).
pub const STARTUP_OK_SCREEN_DURATION_MS: u64 = 1_500;

/// Startup screen duration when a critical condition is present at boot (ms).
pub const STARTUP_ERROR_SCREEN_DURATION_MS: u64 = 3_000;

/// Reset confirmation chirp: frequency (Hz) and length (ms).
pub const RESET_CHIRP_HZ: u32 = 2_000;
pub const RESET_CHIRP_MS: u64 = 100;

/// Main loop poll period: alarm phases and the reset button are serviced at
/// this rate between ticks (ms).
pub const LOOP_POLL_MS: u64 = 20;

/// Critical alarm pattern: `(duration_ms, frequency_hz)`, 0 Hz = silence.
pub const ALARM_SEQUENCE: [(u32, u32); 4] = [(200, 2_400), (100, 0), (200, 2_400), (700, 0)];

const _: () = assert!(UPDATE_INTERVAL_MS > 0);
const _: () = assert!(ALARM_SEQUENCE.len() > 0);
const _: () = assert!(LOOP_POLL_MS < UPDATE_INTERVAL_MS as u64);
const _: () = assert!(PERSISTENT_SAVE_INTERVAL_MS >= UPDATE_INTERVAL_MS);
