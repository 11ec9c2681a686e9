//! # Tick-Rate Constants
//!
//! The host drives a fixed 20 Hz cooperative tick loop. Every suspicion
//! window, decay interval and decoy timer in the engine is expressed in
//! ticks; these helpers convert from the wall-clock values operators write
//! in config files.

/// Game ticks per second.
pub const TICKS_PER_SECOND: u32 = 20;

/// Converts whole seconds into ticks.
#[must_use]
pub const fn ticks_from_secs(seconds: u32) -> u32 {
    seconds * TICKS_PER_SECOND
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_conversion() {
        assert_eq!(ticks_from_secs(1), 20);
        assert_eq!(ticks_from_secs(60), 1200);
        assert_eq!(ticks_from_secs(90), 1800);
    }
}
