//! # Host Interface
//!
//! The contract between the detection engine and the game server that embeds
//! it. The engine does not simulate a world, decode packets or manage
//! permissions; it consumes those capabilities through this trait.
//!
//! ```text
//! Engine defines:       Host implements:
//! ┌───────────────┐     ┌───────────────┐
//! │ trait         │ ←── │ impl          │
//! │ HostServer    │     │ HostServer    │
//! └───────────────┘     └───────────────┘
//! ```
//!
//! All calls happen on the host's tick thread. Query methods that can fail
//! for transient reasons (chunk not loaded, player mid-transfer) return
//! [`HostResult`]; callers skip the affected heuristic update and recover on
//! the next event.

use crate::error::{HostError, HostResult};
use vigil_shared::{ActorId, BlockPos, PlayerId, Vec3};

/// Classification of a block for the fly heuristic.
///
/// Slabs, stairs and liquids are distinguished from full solids because a
/// player standing on a partial block reports a fractional Y position that
/// would otherwise read as hovering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Nothing there.
    #[default]
    Air,
    /// A full solid block.
    Solid,
    /// A half-height slab.
    Slab,
    /// A stair block.
    Stairs,
    /// Water or lava, still or flowing.
    Liquid,
}

impl BlockKind {
    /// Whether this block counts as open space for airborne classification.
    ///
    /// Only true air qualifies: partial blocks and liquids are terrain a
    /// player can legitimately rest on or float in.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Air)
    }
}

/// Description of a decoy actor for the host to materialize.
#[derive(Clone, Debug)]
pub struct ActorSpec {
    /// Player whose appearance the actor clones (and the only observer it
    /// will ever be rendered to).
    pub mimic: PlayerId,
    /// Initial world position.
    pub position: Vec3,
    /// Render scale (decoys are small to sit inside the hit jitter of
    /// automated clients without obstructing the player).
    pub scale: f64,
}

/// Capabilities the embedding game server provides to the engine.
pub trait HostServer {
    /// All currently-connected players, in host order.
    fn online_players(&self) -> Vec<PlayerId>;

    /// Whether a player is currently connected.
    fn is_online(&self, player: PlayerId) -> bool;

    /// Display name for alerts; `None` if the player is unknown.
    fn player_name(&self, player: PlayerId) -> Option<String>;

    /// Current world position of a player.
    fn position_of(&self, player: PlayerId) -> Option<Vec3>;

    /// Current network round-trip time in milliseconds.
    fn ping_ms(&self, player: PlayerId) -> Option<u32>;

    /// Consecutive ticks the player has been airborne.
    fn air_ticks(&self, player: PlayerId) -> Option<u32>;

    /// Permission check against the host's permission system.
    fn has_permission(&self, player: PlayerId, node: &str) -> bool;

    /// Whether the host has granted this player legitimate flight.
    fn flight_allowed(&self, player: PlayerId) -> bool;

    /// Forcibly disconnects a player with an operator-visible reason.
    ///
    /// Fire-and-forget: the host will deliver the matching quit/kick event
    /// through the normal lifecycle stream.
    fn kick(&mut self, player: PlayerId, reason: &str);

    /// Sends a chat message to a player.
    fn send_message(&mut self, player: PlayerId, message: &str) -> HostResult<()>;

    /// Sends a screen-tip overlay line (diagnostic telemetry).
    fn send_tip(&mut self, player: PlayerId, message: &str) -> HostResult<()>;

    /// Sends a popup overlay line (diagnostic telemetry).
    fn send_popup(&mut self, player: PlayerId, message: &str) -> HostResult<()>;

    /// Classifies the block at an integer world coordinate.
    fn block_kind(&self, pos: BlockPos) -> HostResult<BlockKind>;

    /// Whether any block in the player's bounding-box neighborhood is liquid.
    fn near_liquid(&self, player: PlayerId) -> HostResult<bool>;

    /// Spawns a controlled actor and returns its handle.
    fn spawn_actor(&mut self, spec: &ActorSpec) -> HostResult<ActorId>;

    /// Removes a spawned actor from the world.
    fn despawn_actor(&mut self, actor: ActorId);

    /// Moves a spawned actor to a new position.
    fn move_actor(&mut self, actor: ActorId, position: Vec3);

    /// Toggles whether `observer` can see the actor.
    ///
    /// Decoys are never rendered to anyone but their target; the engine only
    /// ever passes the owning session's player here.
    fn set_actor_visible(&mut self, actor: ActorId, observer: PlayerId, visible: bool);

    /// Pins the chunk containing an actor so the host keeps it simulated.
    fn anchor_chunk(&mut self, actor: ActorId, chunk: (i32, i32));

    /// Releases a previously-pinned chunk.
    fn release_chunk(&mut self, actor: ActorId, chunk: (i32, i32));
}

// ============================================================================
// MOCK IMPLEMENTATION (For Testing)
// ============================================================================

/// A spawned actor as the mock host tracks it.
#[derive(Clone, Debug)]
struct MockActor {
    position: Vec3,
    visible_to: Option<PlayerId>,
}

/// In-memory [`HostServer`] for unit and integration tests.
///
/// Every mutation the engine performs is recorded for inspection; world
/// state is seeded through the `set_*` helpers.
#[derive(Default)]
pub struct MockHost {
    online: Vec<PlayerId>,
    names: std::collections::HashMap<PlayerId, String>,
    positions: std::collections::HashMap<PlayerId, Vec3>,
    pings: std::collections::HashMap<PlayerId, u32>,
    air_ticks: std::collections::HashMap<PlayerId, u32>,
    permissions: std::collections::HashSet<(PlayerId, String)>,
    flight: std::collections::HashSet<PlayerId>,
    liquid_near: std::collections::HashSet<PlayerId>,
    blocks: std::collections::HashMap<BlockPos, BlockKind>,
    world_down: bool,
    reject_spawns: bool,
    actors: std::collections::HashMap<ActorId, MockActor>,
    anchors: std::collections::HashMap<ActorId, (i32, i32)>,
    next_actor: u64,
    kicked: Vec<(PlayerId, String)>,
    messages: Vec<(PlayerId, String)>,
    tips: Vec<(PlayerId, String)>,
    popups: Vec<(PlayerId, String)>,
}

impl MockHost {
    /// Creates an empty mock world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects a player at the world origin.
    pub fn connect(&mut self, player: PlayerId, name: &str) {
        if !self.online.contains(&player) {
            self.online.push(player);
        }
        self.names.insert(player, name.to_string());
        self.positions.entry(player).or_insert(Vec3::ZERO);
        self.pings.entry(player).or_insert(50);
    }

    /// Disconnects a player.
    pub fn disconnect(&mut self, player: PlayerId) {
        self.online.retain(|p| *p != player);
    }

    /// Places a player in the world.
    pub fn set_position(&mut self, player: PlayerId, position: Vec3) {
        self.positions.insert(player, position);
    }

    /// Sets a player's reported round-trip time.
    pub fn set_ping(&mut self, player: PlayerId, ping_ms: u32) {
        self.pings.insert(player, ping_ms);
    }

    /// Sets a player's consecutive airborne ticks.
    pub fn set_air_ticks(&mut self, player: PlayerId, ticks: u32) {
        self.air_ticks.insert(player, ticks);
    }

    /// Grants a permission node.
    pub fn grant(&mut self, player: PlayerId, node: &str) {
        self.permissions.insert((player, node.to_string()));
    }

    /// Marks the player as allowed to fly.
    pub fn allow_flight(&mut self, player: PlayerId) {
        self.flight.insert(player);
    }

    /// Sets the block classification at a coordinate (unset blocks are air).
    pub fn set_block(&mut self, pos: BlockPos, kind: BlockKind) {
        self.blocks.insert(pos, kind);
    }

    /// Marks the player as adjacent to liquid.
    pub fn set_near_liquid(&mut self, player: PlayerId, near: bool) {
        if near {
            self.liquid_near.insert(player);
        } else {
            self.liquid_near.remove(&player);
        }
    }

    /// Makes every world query fail (simulates unloaded chunks).
    pub fn set_world_down(&mut self, down: bool) {
        self.world_down = down;
    }

    /// Makes actor spawning fail.
    pub fn set_reject_spawns(&mut self, reject: bool) {
        self.reject_spawns = reject;
    }

    /// Players kicked so far, in order.
    #[must_use]
    pub fn kicked(&self) -> &[(PlayerId, String)] {
        &self.kicked
    }

    /// Chat messages delivered so far, in order.
    #[must_use]
    pub fn messages(&self) -> &[(PlayerId, String)] {
        &self.messages
    }

    /// Tip overlay lines delivered so far, in order.
    #[must_use]
    pub fn tips(&self) -> &[(PlayerId, String)] {
        &self.tips
    }

    /// Popup overlay lines delivered so far, in order.
    #[must_use]
    pub fn popups(&self) -> &[(PlayerId, String)] {
        &self.popups
    }

    /// Number of live actors.
    #[must_use]
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Position of a live actor.
    #[must_use]
    pub fn actor_position(&self, actor: ActorId) -> Option<Vec3> {
        self.actors.get(&actor).map(|a| a.position)
    }

    /// Which observer, if any, can currently see the actor.
    #[must_use]
    pub fn actor_visible_to(&self, actor: ActorId) -> Option<PlayerId> {
        self.actors.get(&actor).and_then(|a| a.visible_to)
    }

    /// Chunk currently anchored by an actor.
    #[must_use]
    pub fn anchored_chunk(&self, actor: ActorId) -> Option<(i32, i32)> {
        self.anchors.get(&actor).copied()
    }
}

impl HostServer for MockHost {
    fn online_players(&self) -> Vec<PlayerId> {
        self.online.clone()
    }

    fn is_online(&self, player: PlayerId) -> bool {
        self.online.contains(&player)
    }

    fn player_name(&self, player: PlayerId) -> Option<String> {
        self.names.get(&player).cloned()
    }

    fn position_of(&self, player: PlayerId) -> Option<Vec3> {
        if self.is_online(player) {
            self.positions.get(&player).copied()
        } else {
            None
        }
    }

    fn ping_ms(&self, player: PlayerId) -> Option<u32> {
        self.pings.get(&player).copied()
    }

    fn air_ticks(&self, player: PlayerId) -> Option<u32> {
        self.air_ticks.get(&player).copied()
    }

    fn has_permission(&self, player: PlayerId, node: &str) -> bool {
        self.permissions.contains(&(player, node.to_string()))
    }

    fn flight_allowed(&self, player: PlayerId) -> bool {
        self.flight.contains(&player)
    }

    fn kick(&mut self, player: PlayerId, reason: &str) {
        self.kicked.push((player, reason.to_string()));
        self.disconnect(player);
    }

    fn send_message(&mut self, player: PlayerId, message: &str) -> HostResult<()> {
        if !self.is_online(player) {
            return Err(HostError::SendFailed(player));
        }
        self.messages.push((player, message.to_string()));
        Ok(())
    }

    fn send_tip(&mut self, player: PlayerId, message: &str) -> HostResult<()> {
        if !self.is_online(player) {
            return Err(HostError::SendFailed(player));
        }
        self.tips.push((player, message.to_string()));
        Ok(())
    }

    fn send_popup(&mut self, player: PlayerId, message: &str) -> HostResult<()> {
        if !self.is_online(player) {
            return Err(HostError::SendFailed(player));
        }
        self.popups.push((player, message.to_string()));
        Ok(())
    }

    fn block_kind(&self, pos: BlockPos) -> HostResult<BlockKind> {
        if self.world_down {
            return Err(HostError::WorldUnavailable(pos));
        }
        Ok(self.blocks.get(&pos).copied().unwrap_or_default())
    }

    fn near_liquid(&self, player: PlayerId) -> HostResult<bool> {
        if self.world_down {
            return Err(HostError::WorldUnavailable(BlockPos::new(0, 0, 0)));
        }
        Ok(self.liquid_near.contains(&player))
    }

    fn spawn_actor(&mut self, spec: &ActorSpec) -> HostResult<ActorId> {
        if self.reject_spawns {
            return Err(HostError::SpawnRejected);
        }
        self.next_actor += 1;
        let actor = ActorId::new(self.next_actor);
        self.actors.insert(
            actor,
            MockActor {
                position: spec.position,
                visible_to: None,
            },
        );
        Ok(actor)
    }

    fn despawn_actor(&mut self, actor: ActorId) {
        self.actors.remove(&actor);
    }

    fn move_actor(&mut self, actor: ActorId, position: Vec3) {
        if let Some(a) = self.actors.get_mut(&actor) {
            a.position = position;
        }
    }

    fn set_actor_visible(&mut self, actor: ActorId, observer: PlayerId, visible: bool) {
        if let Some(a) = self.actors.get_mut(&actor) {
            a.visible_to = visible.then_some(observer);
        }
    }

    fn anchor_chunk(&mut self, actor: ActorId, chunk: (i32, i32)) {
        self.anchors.insert(actor, chunk);
    }

    fn release_chunk(&mut self, actor: ActorId, chunk: (i32, i32)) {
        if self.anchors.get(&actor) == Some(&chunk) {
            self.anchors.remove(&actor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_kind_openness() {
        assert!(BlockKind::Air.is_open());
        assert!(!BlockKind::Solid.is_open());
        assert!(!BlockKind::Slab.is_open());
        assert!(!BlockKind::Stairs.is_open());
        assert!(!BlockKind::Liquid.is_open());
    }

    #[test]
    fn test_mock_world_queries() {
        let mut host = MockHost::new();
        let pos = BlockPos::new(1, 64, 1);
        assert_eq!(host.block_kind(pos), Ok(BlockKind::Air));

        host.set_block(pos, BlockKind::Slab);
        assert_eq!(host.block_kind(pos), Ok(BlockKind::Slab));

        host.set_world_down(true);
        assert!(host.block_kind(pos).is_err());
    }

    #[test]
    fn test_mock_kick_disconnects() {
        let mut host = MockHost::new();
        let p = PlayerId::new(7);
        host.connect(p, "steve");
        assert!(host.is_online(p));

        host.kick(p, "bye");
        assert!(!host.is_online(p));
        assert_eq!(host.kicked().len(), 1);
        assert!(host.send_message(p, "late").is_err());
    }

    #[test]
    fn test_mock_actor_lifecycle() {
        let mut host = MockHost::new();
        let target = PlayerId::new(1);
        let spec = ActorSpec {
            mimic: target,
            position: Vec3::new(0.0, 67.0, 0.0),
            scale: 0.2,
        };
        let actor = host.spawn_actor(&spec).unwrap();
        assert_eq!(host.actor_count(), 1);
        assert_eq!(host.actor_visible_to(actor), None);

        host.set_actor_visible(actor, target, true);
        assert_eq!(host.actor_visible_to(actor), Some(target));

        host.despawn_actor(actor);
        assert_eq!(host.actor_count(), 0);
    }
}
