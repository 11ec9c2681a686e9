//! # Detection Engine
//!
//! The dispatcher between the host's event stream and the per-player
//! sessions. Owns every piece of mutable state in the crate (sessions,
//! device-class hints, the staff registry, the scheduler and the RNG) and
//! is driven exclusively from the host's tick thread:
//!
//! ```text
//! host callbacks ──► EventQueue ──┐
//! host damage pipe ──────────────►│  DetectionEngine ──► kick / staff alert
//! host tick ─────────────────────►│        │
//!                                 │        └─► sessions ──► decoys
//! ```
//!
//! The engine holds no reference to the host; every operation borrows it for
//! the duration of the call, so teardown order can never dangle.

use crate::config::DetectionConfig;
use crate::events::{DamageVerdict, EntityRef, EventQueue, HostEvent, HostEventSender};
use crate::host::HostServer;
use crate::scheduler::{TaskKind, TickScheduler};
use crate::session::DetectionSession;
use crate::staff::StaffRegistry;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use vigil_shared::{ticks_from_secs, DeviceClass, PlayerId, Vec3, TICKS_PER_SECOND};

/// Per-process detection dispatcher: at most one session per player.
pub struct DetectionEngine {
    config: DetectionConfig,
    sessions: HashMap<PlayerId, DetectionSession>,
    /// Device classes learned from login metadata, kept until disconnect so
    /// a session opened later (startup sweep, rejoin race) still sees them.
    device_hints: HashMap<PlayerId, DeviceClass>,
    staff: StaffRegistry,
    scheduler: TickScheduler,
    rng: ChaCha8Rng,
    intake: Option<EventQueue>,
    tick: u64,
}

impl DetectionEngine {
    /// Creates an engine with the given tuning and RNG seed.
    ///
    /// The seed only drives decoy visibility rolls; any value works, a
    /// fixed one makes a whole server run reproducible.
    #[must_use]
    pub fn new(config: DetectionConfig, rng_seed: u64) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
            device_hints: HashMap::new(),
            staff: StaffRegistry::new(),
            scheduler: TickScheduler::new(),
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
            intake: None,
            tick: 0,
        }
    }

    /// Creates the bounded intake queue and returns its sending half.
    ///
    /// Host callbacks push events through the sender from wherever they
    /// fire; the engine drains them at the start of each [`Self::tick`].
    pub fn attach_intake(&mut self, capacity: usize) -> HostEventSender {
        let (sender, queue) = EventQueue::new(capacity);
        self.intake = Some(queue);
        sender
    }

    /// Monotonic seconds derived from the tick counter.
    #[must_use]
    pub fn now_secs(&self) -> f64 {
        self.tick as f64 / f64::from(TICKS_PER_SECOND)
    }

    /// The active tuning tables.
    #[must_use]
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// The staff registry (observers receiving enforcement alerts).
    #[must_use]
    pub fn staff(&self) -> &StaffRegistry {
        &self.staff
    }

    /// The session watching a player, if one is open.
    #[must_use]
    pub fn session(&self, player: PlayerId) -> Option<&DetectionSession> {
        self.sessions.get(&player)
    }

    /// Number of open sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Toggles heuristic telemetry for a watched player.
    ///
    /// Returns `false` when no session is open for them.
    pub fn set_debug_fly(&mut self, player: PlayerId, enabled: bool) -> bool {
        if let Some(session) = self.sessions.get_mut(&player) {
            session.set_debug_fly(enabled);
            true
        } else {
            false
        }
    }

    /// Opens sessions for every player already connected.
    ///
    /// Run once at plugin startup: players who joined before the engine
    /// existed would otherwise never be watched.
    pub fn sweep_online_players(&mut self, host: &mut dyn HostServer) {
        for player in host.online_players() {
            self.admit_player(host, player);
        }
    }

    /// Routes one host event.
    pub fn handle_event(&mut self, host: &mut dyn HostServer, event: HostEvent) {
        match event {
            HostEvent::Joined { player } => self.admit_player(host, player),
            HostEvent::Quit { player } | HostEvent::Kicked { player } => {
                self.cleanup_player(host, player);
            }
            HostEvent::LoginMetadata { player, device } => {
                self.device_hints.insert(player, device);
                // The metadata can race a session opened at startup with an
                // unknown class; upgrade in place.
                if let Some(session) = self.sessions.get_mut(&player) {
                    session.upgrade_device(device);
                }
            }
            HostEvent::Moved { player, from, to } => self.handle_move(host, player, from, to),
            HostEvent::Jumped { player } => {
                let now = self.now_secs();
                if let Some(session) = self.sessions.get_mut(&player) {
                    session.record_jump(now);
                }
            }
        }
    }

    /// Adjudicates a damage event before the host applies it.
    ///
    /// Decoy victims always cancel; player victims feed the timestamp and
    /// reach heuristics and proceed. Missing sessions are no-ops; startup
    /// races must not crash the dispatcher.
    pub fn intercept_damage(
        &mut self,
        host: &mut dyn HostServer,
        victim: EntityRef,
        attacker: Option<EntityRef>,
    ) -> DamageVerdict {
        match victim {
            EntityRef::Actor(actor) => {
                let Some(session) = self.sessions.values_mut().find(|s| s.owns_decoy(actor))
                else {
                    // Not one of our decoys; none of our business.
                    return DamageVerdict::Allow;
                };
                if let Some(EntityRef::Player(attacker)) = attacker {
                    session.on_decoy_hit(host, &self.staff, actor, attacker, &self.config);
                }
                DamageVerdict::Cancel
            }
            EntityRef::Player(victim) => {
                let now = self.now_secs();
                if let Some(session) = self.sessions.get_mut(&victim) {
                    session.record_damage(now);
                }
                if let Some(EntityRef::Player(attacker)) = attacker {
                    self.score_reach(host, victim, attacker);
                }
                DamageVerdict::Allow
            }
        }
    }

    /// Advances one game tick: drains the intake queue, fires due scheduler
    /// tasks, updates every decoy.
    pub fn tick(&mut self, host: &mut dyn HostServer) {
        self.tick += 1;

        let events = match &self.intake {
            Some(queue) => queue.drain(),
            None => Vec::new(),
        };
        for event in events {
            self.handle_event(host, event);
        }

        for kind in self.scheduler.tick() {
            match kind {
                TaskKind::KillAuraDecay { player } => {
                    if let Some(session) = self.sessions.get_mut(&player) {
                        session.decay_kill_aura(&self.config);
                    }
                }
            }
        }

        for session in self.sessions.values_mut() {
            session.tick_decoys(host, &mut self.rng, &self.config);
        }
    }

    /// Opens a session for a player (idempotent).
    pub fn open_session(&mut self, host: &mut dyn HostServer, player: PlayerId) {
        if self.sessions.contains_key(&player) {
            tracing::debug!("session for {} already open", player);
            return;
        }
        let device = self.device_hints.get(&player).copied().unwrap_or_default();
        let mut session = DetectionSession::new(player, device);
        let handle = self.scheduler.schedule_repeating(
            TaskKind::KillAuraDecay { player },
            ticks_from_secs(self.config.kill_aura.decay_interval_secs),
        );
        session.set_decay_task(handle);
        session.spawn_decoys(host, &self.config);
        tracing::info!("detection session opened for {} ({:?})", player, device);
        self.sessions.insert(player, session);
    }

    /// Closes a player's session (idempotent, no-op when absent).
    pub fn close_session(&mut self, host: &mut dyn HostServer, player: PlayerId) {
        if let Some(mut session) = self.sessions.remove(&player) {
            // The decay task dies first so a due firing cannot touch the
            // session mid-teardown.
            if let Some(handle) = session.decay_task() {
                self.scheduler.cancel(handle);
            }
            session.close(host);
        }
    }

    /// Closes every open session (plugin shutdown).
    pub fn close_all(&mut self, host: &mut dyn HostServer) {
        let players: Vec<PlayerId> = self.sessions.keys().copied().collect();
        for player in players {
            self.close_session(host, player);
        }
    }

    fn admit_player(&mut self, host: &mut dyn HostServer, player: PlayerId) {
        self.open_session(host, player);
        if host.has_permission(player, &self.config.permissions.staff) {
            self.staff.add(player);
        }
    }

    fn cleanup_player(&mut self, host: &mut dyn HostServer, player: PlayerId) {
        self.close_session(host, player);
        self.staff.remove(player);
        self.device_hints.remove(&player);
    }

    fn handle_move(&mut self, host: &mut dyn HostServer, player: PlayerId, from: Vec3, to: Vec3) {
        let now = self.now_secs();
        let exempt = host.has_permission(player, &self.config.permissions.fly_exempt);
        let Some(session) = self.sessions.get_mut(&player) else {
            return;
        };
        session.record_move(now);
        if exempt {
            return;
        }
        session.update_fly_triggers(host, &self.staff, to, round_milli(to.y - from.y), now, &self.config);
    }

    fn score_reach(&mut self, host: &mut dyn HostServer, victim: PlayerId, attacker: PlayerId) {
        let (Some(victim_pos), Some(attacker_pos)) =
            (host.position_of(victim), host.position_of(attacker))
        else {
            return;
        };
        let distance = victim_pos.distance(attacker_pos);
        let ping = host.ping_ms(attacker).unwrap_or(u32::MAX);
        if let Some(session) = self.sessions.get_mut(&attacker) {
            session.update_reach_triggers(host, &self.staff, distance, ping, &self.config);
        }
    }
}

/// Vertical deltas arrive from the host as raw float subtraction; round to
/// millimeters the way movement packets quantize them.
fn round_milli(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
