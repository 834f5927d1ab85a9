//! Timing of plugin invocations.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Default threshold above which a plugin call is reported as slow.
pub const DEFAULT_SLOW_PLUGIN: Duration = Duration::from_millis(50);

/// Runs one plugin call and warns if it took longer than `threshold`.
///
/// The call is never interrupted; a stuck plugin stalls the caller.
pub(crate) fn invoke<T>(id: &str, operation: &str, threshold: Duration, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();

    if elapsed > threshold {
        warn!(
            plugin = %id,
            operation,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow plugin call"
        );
    } else {
        debug!(plugin = %id, operation, elapsed_us = elapsed.as_micros() as u64, "plugin call");
    }

    result
}
