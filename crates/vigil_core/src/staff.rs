//! # Staff Registry
//!
//! The set of currently-online privileged observers. Owned by the engine and
//! injected where needed, never ambient global state, so its lifetime is
//! exactly the server process and tests can build as many as they like.

use crate::host::HostServer;
use std::collections::BTreeSet;
use vigil_shared::PlayerId;

/// Currently-online privileged observers.
#[derive(Debug, Default)]
pub struct StaffRegistry {
    /// Ordered so broadcast delivery is deterministic.
    members: BTreeSet<PlayerId>,
}

impl StaffRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a privileged observer.
    pub fn add(&mut self, player: PlayerId) {
        self.members.insert(player);
    }

    /// Removes an observer (no-op if absent).
    pub fn remove(&mut self, player: PlayerId) {
        self.members.remove(&player);
    }

    /// Whether a player is registered.
    #[must_use]
    pub fn contains(&self, player: PlayerId) -> bool {
        self.members.contains(&player)
    }

    /// Number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no observers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Sends a message to every registered observer, best effort.
    ///
    /// Delivery failures are logged and skipped; an alert must never take
    /// down the tick that raised it.
    pub fn broadcast(&self, host: &mut dyn HostServer, message: &str) {
        for member in &self.members {
            if let Err(err) = host.send_message(*member, message) {
                tracing::debug!("staff broadcast to {} failed: {}", member, err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MockHost;

    #[test]
    fn test_membership() {
        let mut staff = StaffRegistry::new();
        let p = PlayerId::new(1);
        assert!(staff.is_empty());

        staff.add(p);
        staff.add(p);
        assert_eq!(staff.len(), 1);
        assert!(staff.contains(p));

        staff.remove(p);
        staff.remove(p);
        assert!(staff.is_empty());
    }

    #[test]
    fn test_broadcast_reaches_every_member() {
        let mut staff = StaffRegistry::new();
        let mut host = MockHost::new();
        for raw in 1..=3 {
            let p = PlayerId::new(raw);
            host.connect(p, "mod");
            staff.add(p);
        }

        staff.broadcast(&mut host, "alert");
        assert_eq!(host.messages().len(), 3);
    }

    #[test]
    fn test_broadcast_survives_offline_member() {
        let mut staff = StaffRegistry::new();
        let mut host = MockHost::new();
        let online = PlayerId::new(1);
        let offline = PlayerId::new(2);
        host.connect(online, "mod");
        staff.add(online);
        staff.add(offline);

        staff.broadcast(&mut host, "alert");
        assert_eq!(host.messages().len(), 1);
        assert_eq!(host.messages()[0].0, online);
    }
}
