//! # VIGIL Core - The Detection Engine
//!
//! Behavioral anti-cheat for a tick-driven multiplayer game server. Watches
//! each connected player's movement, combat and login telemetry, and kicks
//! (with a staff alert) when accumulated evidence crosses a per-category
//! threshold.
//!
//! ## Architecture
//!
//! ```text
//! HOST SERVER                              VIGIL CORE
//!     │                                        │
//!     │── join/quit/move/jump events ─────────►│ DetectionEngine
//!     │── damage events (verdict back) ───────►│     │
//!     │── tick ───────────────────────────────►│     ├─► DetectionSession (1/player)
//!     │                                        │     │      ├─ fly heuristic
//!     │◄── kick(player, reason) ───────────────│     │      ├─ reach heuristic
//!     │◄── staff broadcast ────────────────────│     │      └─ kill-aura counter
//!     │◄── actor spawn/move/visibility ────────│     └─► Decoy actors (bait)
//! ```
//!
//! ## Detection methods
//!
//! - **Flight**: block-context scoring of upward motion with decay, damage
//!   and liquid suppression, and per-device thresholds
//! - **Reach**: distance/ping-tiered scoring of melee hits
//! - **Kill-aura**: invisible decoy actors that only automated combat ever
//!   touches
//!
//! Everything runs on the host's tick thread; there is no locking and no
//! blocking I/O anywhere in the crate.

pub mod config;
pub mod decoy;
pub mod engine;
pub mod error;
pub mod events;
pub mod host;
pub mod scheduler;
pub mod session;
pub mod staff;

pub use config::{DecoyConfig, DetectionConfig, FlyConfig, KillAuraConfig, ReachConfig};
pub use decoy::{roll_visibility, Decoy, Visibility, VisibilityDecision};
pub use engine::DetectionEngine;
pub use error::{ConfigError, ConfigResult, HostError, HostResult};
pub use events::{DamageVerdict, EntityRef, EventQueue, HostEvent, HostEventSender};
pub use host::{ActorSpec, BlockKind, HostServer, MockHost};
pub use session::{DetectionSession, Infraction, KICK_MESSAGE};
pub use staff::StaffRegistry;
