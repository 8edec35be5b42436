//! Logging facade shared by the strata crates
//!
//! Logging is off unless enabled through the STRATA_LOG environment variable:
//! - STRATA_LOG=off (default) - no logs
//! - STRATA_LOG=error | warn - problems only
//! - STRATA_LOG=info - dataset discovery summaries
//! - STRATA_LOG=debug - per-path partition parsing and pruning decisions

use std::sync::Once;

// Re-export emit so the macros resolve from any crate
pub use emit;

/// Environment variable consulted by [`init_diagnostics`]
pub const LOG_ENV: &str = "STRATA_LOG";

static INIT: Once = Once::new();

/// Map a level name to an emit level; `None` means logging is disabled.
///
/// Unknown names fall back to info so a typo still produces output.
#[must_use]
pub fn parse_level(name: &str) -> Option<emit::Level> {
    match name.trim().to_ascii_lowercase().as_str() {
        "off" | "" => None,
        "error" => Some(emit::Level::Error),
        "warn" => Some(emit::Level::Warn),
        "debug" => Some(emit::Level::Debug),
        _ => Some(emit::Level::Info),
    }
}

/// Initialize diagnostics from the STRATA_LOG environment variable
///
/// Safe to call more than once; only the first call has an effect.
pub fn init_diagnostics() {
    let name = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());
    init_with_level(parse_level(&name));
}

/// Initialize diagnostics with an explicit level, ignoring the environment
///
/// Only the first call to either initializer has an effect.
pub fn init_with_level(level: Option<emit::Level>) {
    INIT.call_once(|| {
        let Some(level) = level else {
            return;
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        // The runtime must outlive every emitting thread.
        std::mem::forget(rt);
    });
}

/// Log dataset-level operations (sources built, schemas inferred)
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log per-path details (segments parsed, fragments pruned)
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log recoverable oddities (unsupported files skipped, conflicting bindings)
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures that abort an operation
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

pub use init_diagnostics as init;
