//! # Kill-Aura Decoy
//!
//! A non-corporeal actor that shadows a watched player and is rendered only
//! to them, flipping between invisible and briefly-visible states on a
//! randomized schedule. A legitimate client never swings at it; an automated
//! combat client locks onto any nearby target and hits it, handing the
//! session ground-truth evidence.
//!
//! ## States
//!
//! - **Invisible**: counting down to the next reveal roll. The more triggers
//!   the session has banked, the likelier and longer the next reveal.
//! - **Visible**: counting down the reveal window; expiry returns to a long
//!   invisible cooldown.
//!
//! Confirmed hits feed back into the timers so that detection increases
//! exposure: a hidden decoy that gets hit will show for longer next time,
//! and a visible one shortens its upcoming cooldown.

use crate::config::DecoyConfig;
use crate::host::HostServer;
use rand::Rng;
use vigil_shared::{ActorId, BlockPos, PlayerId, Vec3};

/// Render state of a decoy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    /// Rendered to the target.
    Visible,
    /// Hidden from everyone.
    Invisible,
}

/// Outcome of a reveal roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibilityDecision {
    /// Become visible for this many ticks.
    Reveal {
        /// Duration of the reveal window.
        duration_ticks: u32,
    },
    /// Stay hidden and roll again after this many ticks.
    StayHidden {
        /// Wait before the next roll.
        wait_ticks: u32,
    },
}

/// Decides the next visibility window from the suspicion level and a uniform
/// roll in `1..=100`.
///
/// Pure on purpose: tests pin the roll instead of seeding an RNG.
#[must_use]
pub fn roll_visibility(triggers: i32, roll: u8, cfg: &DecoyConfig) -> VisibilityDecision {
    let (percent, base_ticks, retry_ticks) = if triggers <= cfg.low_band_max_triggers {
        (
            cfg.low_reveal_percent,
            cfg.low_reveal_base_ticks,
            cfg.low_retry_ticks,
        )
    } else if triggers >= cfg.high_band_min_triggers {
        (
            cfg.high_reveal_percent,
            cfg.high_reveal_base_ticks,
            cfg.high_retry_ticks,
        )
    } else {
        (
            cfg.medium_reveal_percent,
            cfg.medium_reveal_base_ticks,
            cfg.medium_retry_ticks,
        )
    };

    if roll <= percent {
        VisibilityDecision::Reveal {
            duration_ticks: reveal_duration(triggers, base_ticks, cfg),
        }
    } else {
        VisibilityDecision::StayHidden {
            wait_ticks: retry_ticks,
        }
    }
}

/// Reveal window length: grows with banked triggers, floored at zero for a
/// decayed-negative trigger count.
fn reveal_duration(triggers: i32, base_ticks: u32, cfg: &DecoyConfig) -> u32 {
    let ticks =
        i64::from(cfg.reveal_ticks_per_trigger) * i64::from(triggers) + i64::from(base_ticks);
    u32::try_from(ticks.max(0)).unwrap_or(u32::MAX)
}

/// A decoy actor bound to one detection session.
///
/// The session owns the decoy; the decoy only keeps the target's identity as
/// a lookup key, never a reference into session state.
pub struct Decoy {
    actor: ActorId,
    target: PlayerId,
    offset: Vec3,
    visibility: Visibility,
    /// Remaining reveal window while visible; accumulated hit-extension for
    /// the *next* reveal while invisible.
    visible_ticks: u32,
    /// Remaining wait while invisible.
    invisible_ticks: u32,
    /// Cooldown reduction banked from hits taken while visible, applied when
    /// the next cooldown starts.
    pending_cooldown_cut: u32,
    position: Vec3,
    chunk: (i32, i32),
}

impl Decoy {
    /// Creates a decoy at its initial position, hidden.
    #[must_use]
    pub fn new(
        actor: ActorId,
        target: PlayerId,
        offset: Vec3,
        position: Vec3,
        cfg: &DecoyConfig,
    ) -> Self {
        Self {
            actor,
            target,
            offset,
            visibility: Visibility::Invisible,
            visible_ticks: 0,
            invisible_ticks: cfg.initial_invisible_ticks,
            pending_cooldown_cut: 0,
            position,
            chunk: chunk_of(position),
        }
    }

    /// Host handle of the underlying actor.
    #[must_use]
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Chunk currently pinned for this decoy.
    #[must_use]
    pub fn chunk(&self) -> (i32, i32) {
        self.chunk
    }

    /// Current render state.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Remaining reveal window (visible) or banked extension (invisible).
    #[must_use]
    pub fn visible_ticks(&self) -> u32 {
        self.visible_ticks
    }

    /// Remaining invisible wait.
    #[must_use]
    pub fn invisible_ticks(&self) -> u32 {
        self.invisible_ticks
    }

    /// Runs one tick: shadow the target, then advance the visibility machine.
    ///
    /// The caller has already confirmed the target is online; `triggers` is
    /// the owning session's current kill-aura count.
    pub fn tick<R: Rng>(
        &mut self,
        host: &mut dyn HostServer,
        triggers: i32,
        rng: &mut R,
        cfg: &DecoyConfig,
    ) {
        // Geometry first, in every state, so a reveal never exposes a stale
        // position.
        if let Some(target_pos) = host.position_of(self.target) {
            let next = target_pos + self.offset;
            if next != self.position {
                self.position = next;
                host.move_actor(self.actor, next);
                let next_chunk = chunk_of(next);
                if next_chunk != self.chunk {
                    host.anchor_chunk(self.actor, next_chunk);
                    host.release_chunk(self.actor, self.chunk);
                    self.chunk = next_chunk;
                }
            }
        }

        match self.visibility {
            Visibility::Visible => {
                self.visible_ticks = self.visible_ticks.saturating_sub(1);
                if self.visible_ticks == 0 {
                    self.hide(host, cfg);
                }
            }
            Visibility::Invisible => {
                self.invisible_ticks = self.invisible_ticks.saturating_sub(1);
                if self.invisible_ticks == 0 {
                    let roll = rng.gen_range(1..=100u8);
                    match roll_visibility(triggers, roll, cfg) {
                        VisibilityDecision::Reveal { duration_ticks } => {
                            self.reveal(host, duration_ticks);
                        }
                        VisibilityDecision::StayHidden { wait_ticks } => {
                            self.invisible_ticks = wait_ticks.max(1);
                        }
                    }
                }
            }
        }
    }

    /// Records a confirmed hit from the target.
    ///
    /// Hidden decoy: the next reveal window grows. Visible decoy: the
    /// upcoming cooldown shrinks. Either way the cheat sees more of us.
    pub fn register_hit(&mut self, cfg: &DecoyConfig) {
        match self.visibility {
            Visibility::Invisible => {
                self.visible_ticks = self
                    .visible_ticks
                    .saturating_add(cfg.hit_reveal_extension_ticks);
            }
            Visibility::Visible => {
                self.pending_cooldown_cut = self
                    .pending_cooldown_cut
                    .saturating_add(cfg.hit_cooldown_cut_ticks);
            }
        }
    }

    /// Removes the actor from the world and releases its chunk pin.
    pub fn despawn(&mut self, host: &mut dyn HostServer) {
        host.release_chunk(self.actor, self.chunk);
        host.despawn_actor(self.actor);
    }

    fn reveal(&mut self, host: &mut dyn HostServer, duration_ticks: u32) {
        // Any extension banked from hits while hidden rides on top of the
        // rolled window.
        self.visible_ticks = self.visible_ticks.saturating_add(duration_ticks);
        self.visibility = Visibility::Visible;
        host.set_actor_visible(self.actor, self.target, true);
        tracing::debug!(
            "decoy {} revealed to {} for {} ticks",
            self.actor,
            self.target,
            self.visible_ticks
        );
    }

    fn hide(&mut self, host: &mut dyn HostServer, cfg: &DecoyConfig) {
        self.invisible_ticks = cfg
            .visible_cooldown_ticks
            .saturating_sub(self.pending_cooldown_cut)
            .max(1);
        self.pending_cooldown_cut = 0;
        self.visibility = Visibility::Invisible;
        host.set_actor_visible(self.actor, self.target, false);
        tracing::debug!(
            "decoy {} hidden for {} ticks",
            self.actor,
            self.invisible_ticks
        );
    }
}

fn chunk_of(position: Vec3) -> (i32, i32) {
    BlockPos::new(position.floor_x(), position.y.floor() as i32, position.floor_z()).chunk()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ActorSpec, MockHost};
    use rand::rngs::mock::StepRng;

    fn test_cfg() -> DecoyConfig {
        DecoyConfig::default()
    }

    #[test]
    fn test_reveal_durations_per_band_boundary() {
        let cfg = test_cfg();
        // Low band: 0 and 3 triggers.
        assert_eq!(
            roll_visibility(0, 15, &cfg),
            VisibilityDecision::Reveal { duration_ticks: 20 }
        );
        assert_eq!(
            roll_visibility(3, 1, &cfg),
            VisibilityDecision::Reveal { duration_ticks: 80 }
        );
        // Medium band: 4 triggers.
        assert_eq!(
            roll_visibility(4, 40, &cfg),
            VisibilityDecision::Reveal {
                duration_ticks: 120
            }
        );
        // High band: 7 and 10 triggers.
        assert_eq!(
            roll_visibility(7, 80, &cfg),
            VisibilityDecision::Reveal {
                duration_ticks: 220
            }
        );
        assert_eq!(
            roll_visibility(10, 80, &cfg),
            VisibilityDecision::Reveal {
                duration_ticks: 280
            }
        );
    }

    #[test]
    fn test_failed_rolls_pick_band_wait() {
        let cfg = test_cfg();
        assert_eq!(
            roll_visibility(0, 16, &cfg),
            VisibilityDecision::StayHidden { wait_ticks: 800 }
        );
        assert_eq!(
            roll_visibility(5, 41, &cfg),
            VisibilityDecision::StayHidden { wait_ticks: 800 }
        );
        assert_eq!(
            roll_visibility(9, 81, &cfg),
            VisibilityDecision::StayHidden { wait_ticks: 200 }
        );
    }

    #[test]
    fn test_negative_triggers_floor_reveal_at_zero() {
        let cfg = test_cfg();
        // A long-clean session can decay below zero; the window never
        // underflows.
        assert_eq!(
            roll_visibility(-5, 1, &cfg),
            VisibilityDecision::Reveal { duration_ticks: 0 }
        );
    }

    fn spawn_decoy(host: &mut MockHost, target: PlayerId, cfg: &DecoyConfig) -> Decoy {
        let position = host.position_of(target).unwrap() + Vec3::new(0.0, 3.0, 0.0);
        let actor = host
            .spawn_actor(&ActorSpec {
                mimic: target,
                position,
                scale: cfg.scale,
            })
            .unwrap();
        Decoy::new(actor, target, Vec3::new(0.0, 3.0, 0.0), position, cfg)
    }

    #[test]
    fn test_shadows_target_movement() {
        let mut cfg = test_cfg();
        cfg.initial_invisible_ticks = 1000;
        let mut host = MockHost::new();
        let target = PlayerId::new(1);
        host.connect(target, "steve");
        host.set_position(target, Vec3::new(0.0, 64.0, 0.0));
        let mut decoy = spawn_decoy(&mut host, target, &cfg);
        let mut rng = StepRng::new(0, 0);

        host.set_position(target, Vec3::new(20.0, 64.0, 20.0));
        decoy.tick(&mut host, 0, &mut rng, &cfg);

        assert_eq!(
            host.actor_position(decoy.actor()),
            Some(Vec3::new(20.0, 67.0, 20.0))
        );
        // Crossed a chunk boundary: the pin followed.
        assert_eq!(host.anchored_chunk(decoy.actor()), Some((1, 1)));
    }

    #[test]
    fn test_reveal_and_cooldown_cycle() {
        let mut cfg = test_cfg();
        cfg.initial_invisible_ticks = 2;
        cfg.low_reveal_percent = 100; // force the reveal branch
        let mut host = MockHost::new();
        let target = PlayerId::new(1);
        host.connect(target, "steve");
        let mut decoy = spawn_decoy(&mut host, target, &cfg);
        let mut rng = StepRng::new(0, 0);

        decoy.tick(&mut host, 0, &mut rng, &cfg);
        assert_eq!(decoy.visibility(), Visibility::Invisible);

        decoy.tick(&mut host, 0, &mut rng, &cfg);
        assert_eq!(decoy.visibility(), Visibility::Visible);
        assert_eq!(decoy.visible_ticks(), 20);
        assert_eq!(host.actor_visible_to(decoy.actor()), Some(target));

        for _ in 0..20 {
            decoy.tick(&mut host, 0, &mut rng, &cfg);
        }
        assert_eq!(decoy.visibility(), Visibility::Invisible);
        assert_eq!(decoy.invisible_ticks(), cfg.visible_cooldown_ticks);
        assert_eq!(host.actor_visible_to(decoy.actor()), None);
    }

    #[test]
    fn test_hit_while_hidden_extends_next_reveal() {
        let mut cfg = test_cfg();
        cfg.initial_invisible_ticks = 1;
        cfg.low_reveal_percent = 100;
        let mut host = MockHost::new();
        let target = PlayerId::new(1);
        host.connect(target, "steve");
        let mut decoy = spawn_decoy(&mut host, target, &cfg);
        let mut rng = StepRng::new(0, 0);

        decoy.register_hit(&cfg);
        decoy.tick(&mut host, 0, &mut rng, &cfg);

        assert_eq!(decoy.visibility(), Visibility::Visible);
        // 20 rolled + 20 banked from the hit.
        assert_eq!(decoy.visible_ticks(), 40);
    }

    #[test]
    fn test_hit_while_visible_cuts_cooldown() {
        let mut cfg = test_cfg();
        cfg.initial_invisible_ticks = 1;
        cfg.low_reveal_percent = 100;
        let mut host = MockHost::new();
        let target = PlayerId::new(1);
        host.connect(target, "steve");
        let mut decoy = spawn_decoy(&mut host, target, &cfg);
        let mut rng = StepRng::new(0, 0);

        decoy.tick(&mut host, 0, &mut rng, &cfg);
        assert_eq!(decoy.visibility(), Visibility::Visible);

        decoy.register_hit(&cfg);
        for _ in 0..20 {
            decoy.tick(&mut host, 0, &mut rng, &cfg);
        }
        assert_eq!(decoy.visibility(), Visibility::Invisible);
        assert_eq!(
            decoy.invisible_ticks(),
            cfg.visible_cooldown_ticks - cfg.hit_cooldown_cut_ticks
        );
    }

    #[test]
    fn test_despawn_releases_world_state() {
        let cfg = test_cfg();
        let mut host = MockHost::new();
        let target = PlayerId::new(1);
        host.connect(target, "steve");
        let mut decoy = spawn_decoy(&mut host, target, &cfg);
        host.anchor_chunk(decoy.actor(), (0, 0));

        decoy.despawn(&mut host);
        assert_eq!(host.actor_count(), 0);
        assert_eq!(host.anchored_chunk(decoy.actor()), None);
    }
}
