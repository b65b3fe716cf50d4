//! Per-event rate limiting. `RateLimiter` is the collaborator seam; this
//! crate ships a token-bucket reference implementation so the event
//! handlers in the `parlor` crate are fully exercised in tests without a
//! real rate-limit service.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use parlor_protocol::{SessionId, UserId};

/// `allow` is consulted before dispatching every inbound event. A `false`
/// return means the caller should reject with `RATE_LIMITED` and perform
/// no other side effect.
pub trait RateLimiter: Send + Sync + 'static {
    fn allow(&self, event: &str, session_id: &SessionId, user_id: Option<&UserId>) -> bool;
}

/// Which identity a window is keyed by.
#[derive(Debug, Clone, Copy)]
enum KeyedBy {
    Session,
    User,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    max_count: u32,
    period: Duration,
    keyed_by: KeyedBy,
}

struct Bucket {
    count: u32,
    window_start: Instant,
}

/// A fixed-window token-bucket limiter: each `(event, key)` pair gets
/// `max_count` allowances per `period`, reset once the period elapses
/// since the first allowance in the current window.
pub struct TokenBucketRateLimiter {
    windows: HashMap<&'static str, Window>,
    buckets: Mutex<HashMap<(String, String), Bucket>>,
}

impl Default for TokenBucketRateLimiter {
    /// Defaults matching the external interface's example windows:
    /// `join_game` 3/60s per session, `create_room` 5/60s per user.
    fn default() -> Self {
        let mut windows = HashMap::new();
        windows.insert(
            "join_game",
            Window { max_count: 3, period: Duration::from_secs(60), keyed_by: KeyedBy::Session },
        );
        windows.insert(
            "create_room",
            Window { max_count: 5, period: Duration::from_secs(60), keyed_by: KeyedBy::User },
        );
        Self { windows, buckets: Mutex::new(HashMap::new()) }
    }
}

impl TokenBucketRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or overrides the window for `event`.
    pub fn with_window(mut self, event: &'static str, max_count: u32, period: Duration, keyed_by_user: bool) -> Self {
        let keyed_by = if keyed_by_user { KeyedBy::User } else { KeyedBy::Session };
        self.windows.insert(event, Window { max_count, period, keyed_by });
        self
    }
}

impl RateLimiter for TokenBucketRateLimiter {
    fn allow(&self, event: &str, session_id: &SessionId, user_id: Option<&UserId>) -> bool {
        let Some(window) = self.windows.get(event) else {
            // No configured window means this event is unrestricted.
            return true;
        };
        let key = match window.keyed_by {
            KeyedBy::Session => session_id.0.clone(),
            // A user-keyed window with no authenticated user falls back
            // to the session — guests still get their own bucket.
            KeyedBy::User => user_id.map(|u| u.0.clone()).unwrap_or_else(|| session_id.0.clone()),
        };

        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");
        let now = Instant::now();
        let entry = buckets.entry((event.to_string(), key)).or_insert(Bucket {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= window.period {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count >= window.max_count {
            false
        } else {
            entry.count += 1;
            true
        }
    }
}
