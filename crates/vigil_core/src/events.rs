//! # Host Event Stream
//!
//! Lifecycle and gameplay events the host delivers to the engine.
//!
//! Two delivery paths exist:
//!
//! - [`EventQueue`]: a bounded channel for events that need no reply
//!   (join/quit/movement/...). Host callbacks push from wherever they fire;
//!   the engine drains the queue at the start of each tick, so all mutation
//!   still happens on the tick thread.
//! - Damage stays a direct call ([`crate::engine::DetectionEngine::intercept_damage`])
//!   because the host needs the cancellation verdict before it applies the
//!   damage pipeline.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use vigil_shared::{ActorId, DeviceClass, PlayerId, Vec3};

/// A lifecycle or gameplay event from the host.
#[derive(Clone, Debug)]
pub enum HostEvent {
    /// A player finished connecting.
    Joined {
        /// The player that joined.
        player: PlayerId,
    },
    /// A player disconnected normally.
    Quit {
        /// The player that left.
        player: PlayerId,
    },
    /// A player was forcibly disconnected.
    Kicked {
        /// The player that was kicked.
        player: PlayerId,
    },
    /// Login handshake metadata arrived (may precede or follow `Joined`).
    LoginMetadata {
        /// The player the metadata belongs to.
        player: PlayerId,
        /// Reported platform.
        device: DeviceClass,
    },
    /// A player moved.
    Moved {
        /// The player that moved.
        player: PlayerId,
        /// Position before the move.
        from: Vec3,
        /// Position after the move.
        to: Vec3,
    },
    /// A player jumped.
    Jumped {
        /// The player that jumped.
        player: PlayerId,
    },
}

/// A participant in a damage event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityRef {
    /// A connected player.
    Player(PlayerId),
    /// An engine-spawned actor (decoy).
    Actor(ActorId),
}

/// The engine's answer to an intercepted damage event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageVerdict {
    /// Let the host's damage pipeline proceed.
    Allow,
    /// Cancel before any damage is applied (always the case for decoys).
    Cancel,
}

/// Bounded intake queue between host callbacks and the engine tick.
pub struct EventQueue {
    receiver: Receiver<HostEvent>,
}

impl EventQueue {
    /// Creates a queue and its sending half.
    ///
    /// `capacity` bounds in-flight events; overflow drops the event rather
    /// than blocking the host (a dropped lifecycle event is recovered by the
    /// startup-sweep/no-op-on-missing-session discipline).
    #[must_use]
    pub fn new(capacity: usize) -> (HostEventSender, Self) {
        let (sender, receiver) = bounded(capacity);
        (HostEventSender { sender }, Self { receiver })
    }

    /// Takes all pending events, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<HostEvent> {
        let mut events = Vec::with_capacity(self.receiver.len());
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Handle host callbacks use to push events (clone freely).
#[derive(Clone)]
pub struct HostEventSender {
    sender: Sender<HostEvent>,
}

impl HostEventSender {
    /// Enqueues an event (non-blocking).
    ///
    /// Returns `false` if the queue is full or the engine is gone.
    pub fn send(&self, event: HostEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => false,
        }
    }
}
