//! Crate-local logging macros.
//!
//! On the RP2350 target these forward to `defmt` (the firmware binary links
//! `defmt-rtt` as the global logger). On the host, where tests run without a
//! defmt logger, they expand to nothing but still type-check their arguments.
//!
//! The module is declared with `#[macro_use]` first in `lib.rs`, so the macros
//! are in textual scope for every other module:
//!
//! ```ignore
//! info!("Trip reset");
//! warn!("Save failed, file errors: {}", count);
//! ```

#![allow(unused_macros)]

#[cfg(target_arch = "arm")]
macro_rules! info {
    ($($arg:tt)*) => {
        ::defmt::info!($($arg)*)
    };
}

#[cfg(target_arch = "arm")]
macro_rules! warn {
    ($($arg:tt)*) => {
        ::defmt::warn!($($arg)*)
    };
}

#[cfg(target_arch = "arm")]
macro_rules! error {
    ($($arg:tt)*) => {
        ::defmt::error!($($arg)*)
    };
}

#[cfg(target_arch = "arm")]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::defmt::debug!($($arg)*)
    };
}

// Host stubs: evaluate nothing, keep the call sites compiling.
#[cfg(not(target_arch = "arm"))]
macro_rules! info {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        $(let _ = &($arg);)*
    }};
}

#[cfg(not(target_arch = "arm"))]
macro_rules! warn {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        $(let _ = &($arg);)*
    }};
}

#[cfg(not(target_arch = "arm"))]
macro_rules! error {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        $(let _ = &($arg);)*
    }};
}

#[cfg(not(target_arch = "arm"))]
macro_rules! debug {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        $(let _ = &($arg);)*
    }};
}
