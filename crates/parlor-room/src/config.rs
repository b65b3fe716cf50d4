//! Room actor configuration.

/// Configuration for a room actor's command channel.
///
/// A generic `RoomConfig` (min/max players, tick rate, reconnect grace,
/// spectators — game-agnostic knobs for an arbitrary `GameLogic`) would
/// carry much more. This game has exactly one set of player-count and
/// timing rules, and those live in [`parlor_engine::GameConfig`] instead.
/// What's left at the room-actor level is the plumbing knob a generic
/// backend would also expose at this layer: channel backpressure.
#[derive(Debug, Clone, Copy)]
pub struct RoomConfig {
    /// Bound on the room actor's inbound command channel.
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self { channel_size: 64 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_channel_size_is_positive() {
        assert!(RoomConfig::default().channel_size > 0);
    }
}
