//! Stats-persistence collaborator. Long-term match history lives outside
//! the core game loop, but the core still needs to call out to something
//! idempotent on `gameId` when a match ends — this module is that
//! interface seam plus a small in-memory reference implementation.

use std::collections::HashSet;
use std::sync::Mutex;

use parlor_protocol::{GameEndRecord, GameId};

/// Records completed games. Implementations must be idempotent on
/// `game_id` — the room layer may emit the same `GameEndRecord` more than
/// once (e.g. a disconnect-forced win racing the tick-driven path), and a
/// duplicate record must not be recorded twice. Failures here must never
/// affect gameplay, so the trait has no `Result` to propagate.
pub trait StatsSink: Send + Sync + 'static {
    fn record_game_end(&self, record: GameEndRecord);
}

/// In-memory reference `StatsSink`. Good enough for a single process;
/// a real deployment would swap this for one backed by durable storage
/// behind the same trait.
#[derive(Debug, Default)]
pub struct InMemoryStatsSink {
    seen: Mutex<HashSet<GameId>>,
    recorded: Mutex<Vec<GameEndRecord>>,
}

impl StatsSink for InMemoryStatsSink {
    fn record_game_end(&self, record: GameEndRecord) {
        let mut seen = self.seen.lock().expect("stats sink mutex poisoned");
        if !seen.insert(record.game_id) {
            tracing::debug!(game_id = %record.game_id, "duplicate recordGameEnd ignored");
            return;
        }
        tracing::info!(game_id = %record.game_id, winner = %record.winner, "game ended");
        drop(seen);
        self.recorded.lock().expect("stats sink mutex poisoned").push(record);
    }
}

impl InMemoryStatsSink {
    /// All records accepted so far, for tests and diagnostics.
    pub fn recorded(&self) -> Vec<GameEndRecord> {
        self.recorded.lock().expect("stats sink mutex poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_protocol::SessionId;

    fn record(id: GameId) -> GameEndRecord {
        GameEndRecord {
            game_id: id,
            winner: "CITIZENS".into(),
            players: vec![SessionId("s1".into())],
            category: None,
            room_id: None,
            duration_seconds: Some(42),
        }
    }

    #[test]
    fn test_duplicate_game_id_recorded_once() {
        let sink = InMemoryStatsSink::default();
        let id = GameId::new();
        sink.record_game_end(record(id));
        sink.record_game_end(record(id));
        assert_eq!(sink.recorded().len(), 1);
    }

    #[test]
    fn test_distinct_game_ids_both_recorded() {
        let sink = InMemoryStatsSink::default();
        sink.record_game_end(record(GameId::new()));
        sink.record_game_end(record(GameId::new()));
        assert_eq!(sink.recorded().len(), 2);
    }
}
