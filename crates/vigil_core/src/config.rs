//! # Detection Tuning Tables
//!
//! Every threshold, grace window and probability the heuristics use lives
//! here so operators can retune without a rebuild. The `Default` impls
//! reproduce the battle-tested production values; changing them shifts the
//! false-positive/catch-rate tradeoff, so defaults are the reference point.

use crate::error::{ConfigError, ConfigResult};
use serde::Deserialize;
use vigil_shared::Vec3;

/// Complete tuning surface of the detection engine.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Permission nodes consulted by the dispatcher.
    pub permissions: PermissionNodes,
    /// Flight-detection tuning.
    pub fly: FlyConfig,
    /// Attack-reach tuning.
    pub reach: ReachConfig,
    /// Automated-combat tuning.
    pub kill_aura: KillAuraConfig,
    /// Decoy-actor tuning.
    pub decoy: DecoyConfig,
}

impl DetectionConfig {
    /// Checks cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        self.fly.validate()?;
        self.reach.validate()?;
        self.kill_aura.validate()?;
        self.decoy.validate()
    }
}

/// Permission nodes the dispatcher checks against the host.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PermissionNodes {
    /// Players holding this node receive enforcement alerts.
    pub staff: String,
    /// Players holding this node are exempt from flight detection.
    pub fly_exempt: String,
}

impl Default for PermissionNodes {
    fn default() -> Self {
        Self {
            staff: "vigil.staff".to_string(),
            fly_exempt: "vigil.fly".to_string(),
        }
    }
}

/// Tuning for the flight heuristic.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FlyConfig {
    /// Seconds after taking damage during which scoring is suppressed
    /// (knockback produces legitimate vertical motion).
    pub damage_grace_secs: f64,
    /// Seconds after a jump during which upward motion is a normal arc.
    pub jump_grace_secs: f64,
    /// Minimum upward delta per movement update that counts as rising.
    pub min_rise: f64,
    /// Airborne-tick count after which any non-falling motion is suspect.
    pub sustained_air_ticks: u32,
    /// Rise band: delta at or above this adds `rise_fast_points`.
    pub rise_fast: f64,
    /// Points for the fast rise band.
    pub rise_fast_points: i32,
    /// Rise band: delta at or above this adds `rise_steady_points`.
    pub rise_steady: f64,
    /// Points for the steady rise band.
    pub rise_steady_points: i32,
    /// Rise band: delta at or above this adds `rise_slow_points`.
    pub rise_slow: f64,
    /// Points for the slow rise band.
    pub rise_slow_points: i32,
    /// Enforcement threshold for Android clients (easiest platform to mod,
    /// so the strictest).
    pub threshold_android: i32,
    /// Enforcement threshold for iOS and Windows 10 clients.
    pub threshold_ios_win10: i32,
    /// Enforcement threshold for every other device class.
    pub threshold_default: i32,
}

impl Default for FlyConfig {
    fn default() -> Self {
        Self {
            damage_grace_secs: 5.0,
            jump_grace_secs: 2.0,
            min_rise: 0.05,
            sustained_air_ticks: 100,
            rise_fast: 0.6,
            rise_fast_points: 4,
            rise_steady: 0.45,
            rise_steady_points: 2,
            rise_slow: 0.38,
            rise_slow_points: 1,
            threshold_android: 24,
            threshold_ios_win10: 32,
            threshold_default: 48,
        }
    }
}

impl FlyConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.threshold_android <= 0 || self.threshold_ios_win10 <= 0 || self.threshold_default <= 0
        {
            return Err(ConfigError::Invalid(
                "fly thresholds must be positive".to_string(),
            ));
        }
        if !(self.rise_slow < self.rise_steady && self.rise_steady < self.rise_fast) {
            return Err(ConfigError::Invalid(
                "fly rise bands must be strictly increasing".to_string(),
            ));
        }
        if self.min_rise <= 0.0 {
            return Err(ConfigError::Invalid(
                "fly.min_rise must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tuning for the attack-reach heuristic.
///
/// Tiers are evaluated in order; the first match scores. A hit matching no
/// tier decays the counter by one instead.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ReachConfig {
    /// Close tier: minimum hit distance.
    pub close_distance: f64,
    /// Close tier: maximum ping for the distance to be trustworthy.
    pub close_max_ping_ms: u32,
    /// Close tier: points added.
    pub close_points: i32,
    /// Mid tier: minimum hit distance.
    pub mid_distance: f64,
    /// Mid tier: maximum ping.
    pub mid_max_ping_ms: u32,
    /// Mid tier: points added.
    pub mid_points: i32,
    /// Far tier: minimum hit distance (no ping gate, nothing legitimate
    /// reaches this far).
    pub far_distance: f64,
    /// Far tier: points added.
    pub far_points: i32,
    /// Enforcement threshold.
    pub threshold: i32,
}

impl Default for ReachConfig {
    fn default() -> Self {
        Self {
            close_distance: 6.5,
            close_max_ping_ms: 200,
            close_points: 1,
            mid_distance: 8.0,
            mid_max_ping_ms: 600,
            mid_points: 2,
            far_distance: 12.0,
            far_points: 4,
            threshold: 14,
        }
    }
}

impl ReachConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !(self.close_distance < self.mid_distance && self.mid_distance < self.far_distance) {
            return Err(ConfigError::Invalid(
                "reach tier distances must be strictly increasing".to_string(),
            ));
        }
        if self.threshold <= 0 {
            return Err(ConfigError::Invalid(
                "reach.threshold must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tuning for the automated-combat heuristic.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct KillAuraConfig {
    /// Enforcement threshold on accumulated decoy hits.
    pub threshold: i32,
    /// Seconds between periodic trigger decrements.
    pub decay_interval_secs: u32,
    /// Amount removed per decay firing.
    pub decay_amount: i32,
    /// Whether decay stops at zero. The production plugin let the counter go
    /// negative (a long-clean player banks goodwill); `true` clamps instead.
    pub clamp_decay_at_zero: bool,
}

impl Default for KillAuraConfig {
    fn default() -> Self {
        Self {
            threshold: 12,
            decay_interval_secs: 60,
            decay_amount: 1,
            clamp_decay_at_zero: false,
        }
    }
}

impl KillAuraConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.threshold <= 0 {
            return Err(ConfigError::Invalid(
                "kill_aura.threshold must be positive".to_string(),
            ));
        }
        if self.decay_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "kill_aura.decay_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tuning for decoy actors and their visibility state machine.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DecoyConfig {
    /// Whether sessions spawn decoys at all.
    pub enabled: bool,
    /// Fixed offsets from the target's position, one decoy per entry.
    pub offsets: Vec<Vec3>,
    /// Render scale of the decoy actor.
    pub scale: f64,
    /// Invisible ticks before the first reveal roll.
    pub initial_invisible_ticks: u32,
    /// Invisible ticks after a visible window expires.
    pub visible_cooldown_ticks: u32,
    /// Upper edge (inclusive) of the low-suspicion band.
    pub low_band_max_triggers: i32,
    /// Lower edge (inclusive) of the high-suspicion band.
    pub high_band_min_triggers: i32,
    /// Reveal chance (percent) in the low band.
    pub low_reveal_percent: u8,
    /// Reveal chance (percent) in the medium band.
    pub medium_reveal_percent: u8,
    /// Reveal chance (percent) in the high band.
    pub high_reveal_percent: u8,
    /// Reveal duration grows by this many ticks per accumulated trigger.
    pub reveal_ticks_per_trigger: u32,
    /// Base reveal duration (ticks) in the low band.
    pub low_reveal_base_ticks: u32,
    /// Base reveal duration (ticks) in the medium band.
    pub medium_reveal_base_ticks: u32,
    /// Base reveal duration (ticks) in the high band.
    pub high_reveal_base_ticks: u32,
    /// Invisible wait (ticks) after a failed roll in the low band.
    pub low_retry_ticks: u32,
    /// Invisible wait (ticks) after a failed roll in the medium band.
    pub medium_retry_ticks: u32,
    /// Invisible wait (ticks) after a failed roll in the high band.
    pub high_retry_ticks: u32,
    /// Ticks added to the next reveal window when a hidden decoy is hit.
    pub hit_reveal_extension_ticks: u32,
    /// Ticks cut from the upcoming cooldown when a visible decoy is hit.
    pub hit_cooldown_cut_ticks: u32,
}

impl Default for DecoyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // One decoy above the player's head, one at leg height.
            offsets: vec![Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, -1.0, 0.0)],
            scale: 0.2,
            initial_invisible_ticks: 900,
            visible_cooldown_ticks: 1800,
            low_band_max_triggers: 3,
            high_band_min_triggers: 7,
            low_reveal_percent: 15,
            medium_reveal_percent: 40,
            high_reveal_percent: 80,
            reveal_ticks_per_trigger: 20,
            low_reveal_base_ticks: 20,
            medium_reveal_base_ticks: 40,
            high_reveal_base_ticks: 80,
            low_retry_ticks: 800,
            medium_retry_ticks: 800,
            high_retry_ticks: 200,
            hit_reveal_extension_ticks: 20,
            hit_cooldown_cut_ticks: 40,
        }
    }
}

impl DecoyConfig {
    fn validate(&self) -> ConfigResult<()> {
        for pct in [
            self.low_reveal_percent,
            self.medium_reveal_percent,
            self.high_reveal_percent,
        ] {
            if pct > 100 {
                return Err(ConfigError::Invalid(
                    "decoy reveal percentages must be at most 100".to_string(),
                ));
            }
        }
        if self.low_band_max_triggers >= self.high_band_min_triggers {
            return Err(ConfigError::Invalid(
                "decoy.low_band_max_triggers must be below high_band_min_triggers".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(DetectionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_values_match_production() {
        let cfg = DetectionConfig::default();
        assert_eq!(cfg.kill_aura.threshold, 12);
        assert_eq!(cfg.reach.threshold, 14);
        assert_eq!(cfg.fly.threshold_android, 24);
        assert_eq!(cfg.fly.threshold_ios_win10, 32);
        assert_eq!(cfg.fly.threshold_default, 48);
        assert_eq!(cfg.decoy.offsets.len(), 2);
        assert_eq!(cfg.decoy.initial_invisible_ticks, 900);
        assert_eq!(cfg.decoy.visible_cooldown_ticks, 1800);
        assert!(!cfg.kill_aura.clamp_decay_at_zero);
    }

    #[test]
    fn test_inverted_bands_rejected() {
        let mut cfg = DetectionConfig::default();
        cfg.decoy.low_band_max_triggers = 9;
        assert!(cfg.validate().is_err());

        let mut cfg = DetectionConfig::default();
        cfg.fly.rise_slow = 0.7;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_overflowing_percent_rejected() {
        let mut cfg = DetectionConfig::default();
        cfg.decoy.high_reveal_percent = 101;
        assert!(cfg.validate().is_err());
    }
}
