//! # VIGIL - Plugin Bootstrap
//!
//! Glue between a host game server and the detection engine: configuration
//! loading, startup sweep, event plumbing and shutdown. The host owns the
//! tick loop and the event sources; this crate owns nothing but the wiring.
//!
//! ## Embedding
//!
//! ```no_run
//! use std::path::Path;
//! use vigil::{Plugin, PluginConfig};
//! use vigil_core::{HostEvent, MockHost};
//! use vigil_shared::PlayerId;
//!
//! let mut host = MockHost::new(); // your HostServer implementation
//! let config = PluginConfig::load(Path::new("vigil.toml")).unwrap();
//! let mut plugin = Plugin::enable(&mut host, config);
//!
//! // From host callbacks:
//! let events = plugin.event_sender();
//! events.send(HostEvent::Joined { player: PlayerId::new(1) });
//!
//! // Once per game tick:
//! plugin.on_tick(&mut host);
//! ```

pub mod config;

pub use config::{PluginConfig, PluginError};

use std::hash::{BuildHasher, Hasher};
use vigil_core::{
    DamageVerdict, DetectionEngine, EntityRef, HostEvent, HostEventSender, HostServer,
};
use vigil_shared::PlayerId;

/// The enabled plugin: a configured engine plus its intake queue.
pub struct Plugin {
    engine: DetectionEngine,
    events: HostEventSender,
}

impl Plugin {
    /// Builds the engine, attaches the intake queue and opens sessions for
    /// every player already connected.
    pub fn enable(host: &mut dyn HostServer, config: PluginConfig) -> Self {
        let seed = config.rng_seed.unwrap_or_else(process_seed);
        let mut engine = DetectionEngine::new(config.detection, seed);
        let events = engine.attach_intake(config.event_queue_capacity);
        engine.sweep_online_players(host);
        tracing::info!("VIGIL enabled, watching {} players", engine.session_count());
        Self { engine, events }
    }

    /// Closes every session and releases all decoys.
    pub fn disable(&mut self, host: &mut dyn HostServer) {
        self.engine.close_all(host);
        tracing::info!("VIGIL disabled");
    }

    /// Sender half of the intake queue, for host callbacks (clone freely).
    #[must_use]
    pub fn event_sender(&self) -> HostEventSender {
        self.events.clone()
    }

    /// Delivers one event synchronously (hosts that already run callbacks on
    /// the tick thread can skip the queue).
    pub fn handle_event(&mut self, host: &mut dyn HostServer, event: HostEvent) {
        self.engine.handle_event(host, event);
    }

    /// Adjudicates a damage event; the host must honor the verdict before
    /// applying damage.
    pub fn intercept_damage(
        &mut self,
        host: &mut dyn HostServer,
        victim: EntityRef,
        attacker: Option<EntityRef>,
    ) -> DamageVerdict {
        self.engine.intercept_damage(host, victim, attacker)
    }

    /// Advances the engine one game tick.
    pub fn on_tick(&mut self, host: &mut dyn HostServer) {
        self.engine.tick(host);
    }

    /// Toggles live heuristic telemetry for a watched player.
    pub fn set_debug_fly(&mut self, player: PlayerId, enabled: bool) -> bool {
        self.engine.set_debug_fly(player, enabled)
    }

    /// Read access to the engine (sessions, staff, config).
    #[must_use]
    pub fn engine(&self) -> &DetectionEngine {
        &self.engine
    }
}

/// Per-process random seed without dragging in an entropy crate: the std
/// hasher is randomly keyed at process start.
fn process_seed() -> u64 {
    std::collections::hash_map::RandomState::new()
        .build_hasher()
        .finish()
}
