//! Time utilities for the simulation and the server

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Room countdown tick period
pub const COUNTDOWN_TICK: Duration = Duration::from_millis(1000);

/// Delay between a lethal hit and the victim's respawn
pub const RESPAWN_DELAY: Duration = Duration::from_millis(3000);

/// Lifetime of an uncollected item
pub const ITEM_EXPIRY: Duration = Duration::from_millis(5000);

/// Upper bound on the renderer's frame delta. A stalled tab or debugger
/// pause must not produce a single huge physics step.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Clamp a frame delta to the stability bound
pub fn clamp_frame_delta(dt: f32) -> f32 {
    dt.clamp(0.0, MAX_FRAME_DELTA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_delta_is_clamped() {
        assert_eq!(clamp_frame_delta(0.016), 0.016);
        assert_eq!(clamp_frame_delta(2.5), MAX_FRAME_DELTA);
        assert_eq!(clamp_frame_delta(-0.1), 0.0);
    }
}
