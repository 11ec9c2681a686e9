//! # Detection Session
//!
//! Per-player aggregate of cheat-detection state: one session per online
//! player, owning the scoring counters, the suppression timestamps and the
//! decoy actors baiting that player. Sessions are driven entirely by the
//! dispatcher on the tick thread.
//!
//! Scoring is deliberately slow to anger: every heuristic decays on
//! legitimate behavior, and enforcement only fires when sustained abuse
//! pushes a counter over its threshold. One kick per session, ever.

use crate::config::DetectionConfig;
use crate::decoy::Decoy;
use crate::host::{ActorSpec, BlockKind, HostServer};
use crate::scheduler::TaskHandle;
use crate::staff::StaffRegistry;
use rand::Rng;
use vigil_shared::{ceil_to_block, ActorId, BlockPos, DeviceClass, PlayerId, Vec3};

/// Kick reason shown to an enforced player.
pub const KICK_MESSAGE: &str = "You have been kicked for using a modified client!";

/// Cheat category an enforcement is raised for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Infraction {
    /// Automated combat against decoy actors.
    KillAura,
    /// Attack distance beyond legitimate reach.
    Reach,
    /// Unauthorized flight.
    Flight,
}

impl Infraction {
    /// Label used in staff alerts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::KillAura => "kill-aura",
            Self::Reach => "reach",
            Self::Flight => "flight",
        }
    }
}

/// Cheat-detection state for one online player.
pub struct DetectionSession {
    player: PlayerId,
    device: DeviceClass,
    kill_aura_triggers: i32,
    fly_chances: i32,
    reach_chances: i32,
    last_jump_secs: f64,
    last_damaged_secs: f64,
    last_move_secs: f64,
    debug_fly: bool,
    decoys: Vec<Decoy>,
    decay_task: Option<TaskHandle>,
    enforced: bool,
    closed: bool,
}

impl DetectionSession {
    /// Creates a fresh session with all counters at zero.
    #[must_use]
    pub fn new(player: PlayerId, device: DeviceClass) -> Self {
        Self {
            player,
            device,
            kill_aura_triggers: 0,
            fly_chances: 0,
            reach_chances: 0,
            last_jump_secs: 0.0,
            last_damaged_secs: 0.0,
            last_move_secs: 0.0,
            debug_fly: false,
            decoys: Vec::new(),
            decay_task: None,
            enforced: false,
            closed: false,
        }
    }

    /// The watched player.
    #[must_use]
    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// Device class informing the fly threshold.
    #[must_use]
    pub fn device(&self) -> DeviceClass {
        self.device
    }

    /// Upgrades an unknown device class once login metadata arrives.
    ///
    /// A class learned at open time is never overwritten: metadata that
    /// races in later must not loosen a stricter threshold mid-session.
    pub fn upgrade_device(&mut self, device: DeviceClass) {
        if self.device == DeviceClass::Unknown {
            self.device = device;
        }
    }

    /// Accumulated kill-aura triggers (may be negative under decay).
    #[must_use]
    pub fn kill_aura_triggers(&self) -> i32 {
        self.kill_aura_triggers
    }

    /// Accumulated fly chances.
    #[must_use]
    pub fn fly_chances(&self) -> i32 {
        self.fly_chances
    }

    /// Accumulated reach chances.
    #[must_use]
    pub fn reach_chances(&self) -> i32 {
        self.reach_chances
    }

    /// Whether enforcement already fired for this session.
    #[must_use]
    pub fn is_enforced(&self) -> bool {
        self.enforced
    }

    /// Whether the session has been torn down.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of live decoys.
    #[must_use]
    pub fn decoy_count(&self) -> usize {
        self.decoys.len()
    }

    /// Toggles verbose heuristic telemetry to the watched player.
    pub fn set_debug_fly(&mut self, enabled: bool) {
        self.debug_fly = enabled;
    }

    /// Whether debug telemetry is enabled.
    #[must_use]
    pub fn debug_fly(&self) -> bool {
        self.debug_fly
    }

    /// Stores the cancellation handle of this session's decay task.
    pub fn set_decay_task(&mut self, handle: TaskHandle) {
        self.decay_task = Some(handle);
    }

    /// Cancellation handle of the decay task, if still scheduled.
    #[must_use]
    pub fn decay_task(&self) -> Option<TaskHandle> {
        self.decay_task
    }

    /// Records that the player took damage.
    pub fn record_damage(&mut self, now_secs: f64) {
        if !self.closed {
            self.last_damaged_secs = now_secs;
        }
    }

    /// Records that the player jumped.
    pub fn record_jump(&mut self, now_secs: f64) {
        if !self.closed {
            self.last_jump_secs = now_secs;
        }
    }

    /// Records that the player moved.
    pub fn record_move(&mut self, now_secs: f64) {
        if !self.closed {
            self.last_move_secs = now_secs;
        }
    }

    /// Banks one kill-aura trigger and evaluates the threshold.
    pub fn register_kill_aura_trigger(
        &mut self,
        host: &mut dyn HostServer,
        staff: &StaffRegistry,
        cfg: &DetectionConfig,
    ) {
        if self.closed || self.enforced {
            return;
        }
        self.kill_aura_triggers += 1;
        if self.kill_aura_triggers >= cfg.kill_aura.threshold {
            self.enforce(host, staff, Infraction::KillAura);
        }
    }

    /// Periodic suspicion decay (driven by the scheduler).
    pub fn decay_kill_aura(&mut self, cfg: &DetectionConfig) {
        if self.closed {
            return;
        }
        self.kill_aura_triggers -= cfg.kill_aura.decay_amount;
        if cfg.kill_aura.clamp_decay_at_zero && self.kill_aura_triggers < 0 {
            self.kill_aura_triggers = 0;
        }
    }

    /// Scores one melee hit by this player at the given distance and ping.
    ///
    /// Tiers are checked in order; a hit matching none of them decays the
    /// counter instead and skips threshold evaluation.
    pub fn update_reach_triggers(
        &mut self,
        host: &mut dyn HostServer,
        staff: &StaffRegistry,
        distance: f64,
        ping_ms: u32,
        cfg: &DetectionConfig,
    ) {
        if self.closed || self.enforced {
            return;
        }
        let r = &cfg.reach;
        if distance >= r.close_distance && ping_ms <= r.close_max_ping_ms {
            self.reach_chances += r.close_points;
        } else if distance >= r.mid_distance && ping_ms <= r.mid_max_ping_ms {
            self.reach_chances += r.mid_points;
        } else if distance >= r.far_distance {
            self.reach_chances += r.far_points;
        } else {
            self.reach_chances = (self.reach_chances - 1).max(0);
            return;
        }

        if self.reach_chances >= r.threshold {
            self.enforce(host, staff, Infraction::Reach);
        }
    }

    /// Scores one movement update against the flight heuristic.
    ///
    /// `to` is the post-move position and `y_delta` the vertical change of
    /// this move. Skipped outright when the host grants flight, and for this
    /// tick only when a world query fails.
    #[allow(clippy::too_many_lines)]
    pub fn update_fly_triggers(
        &mut self,
        host: &mut dyn HostServer,
        staff: &StaffRegistry,
        to: Vec3,
        y_delta: f64,
        now_secs: f64,
        cfg: &DetectionConfig,
    ) {
        if self.closed || self.enforced || host.flight_allowed(self.player) {
            return;
        }

        let x = to.floor_x();
        let z = to.floor_z();
        let sample = |dy: f64| BlockPos::new(x, ceil_to_block(to.y + dy), z);

        // Feet, standing surface, and the block beneath it. A slab or stair
        // in any of the three means the player is on partial terrain, not
        // hovering.
        let (Ok(block_in), Ok(block_on), Ok(block_below)) = (
            host.block_kind(sample(1.0)),
            host.block_kind(sample(-0.5)),
            host.block_kind(sample(-1.0)),
        ) else {
            tracing::debug!("fly update for {} skipped: world query failed", self.player);
            return;
        };
        let Ok(near_liquid) = host.near_liquid(self.player) else {
            tracing::debug!("fly update for {} skipped: liquid query failed", self.player);
            return;
        };
        let in_air = block_in.is_open() && block_on.is_open() && block_below.is_open();
        let air_ticks = host.air_ticks(self.player).unwrap_or(0);

        if self.debug_fly {
            self.send_fly_telemetry(
                host, air_ticks, y_delta, in_air, block_in, block_on, block_below, near_liquid,
            );
        }

        // Recent damage means knockback; near liquid means buoyancy. Either
        // way the vertical motion proves nothing.
        if now_secs - self.last_damaged_secs >= cfg.fly.damage_grace_secs || near_liquid {
            let rising = y_delta >= cfg.fly.min_rise
                || (air_ticks >= cfg.fly.sustained_air_ticks && y_delta >= 0.0);
            if rising && self.last_move_secs - self.last_jump_secs >= cfg.fly.jump_grace_secs {
                if in_air {
                    // Deeper air columns are stronger evidence.
                    if matches!(host.block_kind(sample(-2.0)), Ok(BlockKind::Air)) {
                        if matches!(host.block_kind(sample(-3.0)), Ok(BlockKind::Air)) {
                            self.fly_chances += 2;
                        } else {
                            self.fly_chances += 1;
                        }
                    }
                    if y_delta >= cfg.fly.rise_fast {
                        self.fly_chances += cfg.fly.rise_fast_points;
                    } else if y_delta >= cfg.fly.rise_steady {
                        self.fly_chances += cfg.fly.rise_steady_points;
                    } else if y_delta >= cfg.fly.rise_slow {
                        self.fly_chances += cfg.fly.rise_slow_points;
                    }
                } else {
                    self.fly_chances = (self.fly_chances - 1).max(0);
                }
            } else {
                // A normal jump arc or downward motion.
                self.fly_chances = (self.fly_chances - 2).max(0);
            }
        }

        let threshold = self.fly_threshold(cfg);
        if self.fly_chances >= threshold {
            self.enforce(host, staff, Infraction::Flight);
        }
    }

    /// Spawns the configured decoy set around the player.
    pub fn spawn_decoys(&mut self, host: &mut dyn HostServer, cfg: &DetectionConfig) {
        if self.closed || !cfg.decoy.enabled {
            return;
        }
        let Some(origin) = host.position_of(self.player) else {
            return;
        };
        for offset in &cfg.decoy.offsets {
            let position = origin + *offset;
            let spec = ActorSpec {
                mimic: self.player,
                position,
                scale: cfg.decoy.scale,
            };
            match host.spawn_actor(&spec) {
                Ok(actor) => {
                    host.set_actor_visible(actor, self.player, false);
                    let decoy = Decoy::new(actor, self.player, *offset, position, &cfg.decoy);
                    host.anchor_chunk(actor, decoy.chunk());
                    self.decoys.push(decoy);
                }
                Err(err) => {
                    tracing::warn!("decoy spawn for {} rejected: {}", self.player, err);
                }
            }
        }
        if !self.decoys.is_empty() {
            tracing::info!("{} decoys shadowing {}", self.decoys.len(), self.player);
        }
    }

    /// Runs one tick of every owned decoy.
    ///
    /// If the target went offline the decoys self-terminate instead of
    /// updating.
    pub fn tick_decoys<R: Rng>(
        &mut self,
        host: &mut dyn HostServer,
        rng: &mut R,
        cfg: &DetectionConfig,
    ) {
        if self.closed || self.decoys.is_empty() {
            return;
        }
        if !host.is_online(self.player) {
            for decoy in &mut self.decoys {
                decoy.despawn(host);
            }
            self.decoys.clear();
            return;
        }
        let triggers = self.kill_aura_triggers;
        for decoy in &mut self.decoys {
            decoy.tick(host, triggers, rng, &cfg.decoy);
        }
    }

    /// Whether this session owns the given decoy actor.
    #[must_use]
    pub fn owns_decoy(&self, actor: ActorId) -> bool {
        self.decoys.iter().any(|d| d.actor() == actor)
    }

    /// Handles a damage event against one of this session's decoys.
    ///
    /// Only hits from the watched player count: a decoy standing in a crowd
    /// must never attribute someone else's swing to its target.
    pub fn on_decoy_hit(
        &mut self,
        host: &mut dyn HostServer,
        staff: &StaffRegistry,
        actor: ActorId,
        attacker: PlayerId,
        cfg: &DetectionConfig,
    ) {
        if self.closed || attacker != self.player {
            return;
        }
        self.register_kill_aura_trigger(host, staff, cfg);
        if let Some(decoy) = self.decoys.iter_mut().find(|d| d.actor() == actor) {
            decoy.register_hit(&cfg.decoy);
        }
    }

    /// Tears the session down: kills decoys and blocks further mutation.
    ///
    /// Idempotent. The caller must cancel the decay task *before* calling
    /// this so a late firing cannot touch a dead session.
    pub fn close(&mut self, host: &mut dyn HostServer) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.decay_task = None;
        for decoy in &mut self.decoys {
            decoy.despawn(host);
        }
        self.decoys.clear();
        tracing::info!("detection session for {} closed", self.player);
    }

    fn fly_threshold(&self, cfg: &DetectionConfig) -> i32 {
        match self.device {
            DeviceClass::Android => cfg.fly.threshold_android,
            DeviceClass::Ios | DeviceClass::Windows10 => cfg.fly.threshold_ios_win10,
            _ => cfg.fly.threshold_default,
        }
    }

    fn enforce(&mut self, host: &mut dyn HostServer, staff: &StaffRegistry, infraction: Infraction) {
        if self.enforced {
            return;
        }
        self.enforced = true;
        let name = host
            .player_name(self.player)
            .unwrap_or_else(|| self.player.to_string());
        tracing::warn!(
            "{} enforced for {} (aura={}, fly={}, reach={})",
            name,
            infraction.label(),
            self.kill_aura_triggers,
            self.fly_chances,
            self.reach_chances
        );
        host.kick(self.player, KICK_MESSAGE);
        staff.broadcast(
            host,
            &format!("{} has been kicked for suspected {}!", name, infraction.label()),
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn send_fly_telemetry(
        &self,
        host: &mut dyn HostServer,
        air_ticks: u32,
        y_delta: f64,
        in_air: bool,
        block_in: BlockKind,
        block_on: BlockKind,
        block_below: BlockKind,
        near_liquid: bool,
    ) {
        let yes_no = |v: bool| if v { "yes" } else { "no" };
        host.send_tip(
            self.player,
            &format!(
                "Air ticks: {air_ticks}, y-distance: {y_delta}, In air: {}, Fly chances: {}",
                yes_no(in_air),
                self.fly_chances
            ),
        )
        .ok();
        host.send_popup(
            self.player,
            &format!(
                "Block on: {block_on:?}, Block in: {block_in:?}, Block below: {block_below:?}, Near liquid: {}",
                yes_no(near_liquid)
            ),
        )
        .ok();
    }
}
