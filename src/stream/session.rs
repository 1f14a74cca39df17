//! Stream session tokens.
//!
//! At most one stream session is live per registry. Beginning a new session
//! invalidates the previous token; the streaming read loop checks its token
//! at every suspension point and stops silently once superseded. Tokens can
//! also be awaited, so a read loop blocked on a quiet connection wakes and
//! releases it as soon as its session ends.

use std::time::Instant;
use tokio::sync::watch;

/// Token identifying one stream session.
///
/// Cheap to clone; all clones share liveness with the issuing registry.
#[derive(Debug, Clone)]
pub struct SessionToken {
    id: u64,
    live: watch::Receiver<u64>,
    started_at: Instant,
}

impl SessionToken {
    /// True while this token is the registry's current session.
    pub fn is_live(&self) -> bool {
        *self.live.borrow() == self.id
    }

    /// Resolves once this token is no longer the current session.
    ///
    /// Also resolves if the registry is dropped.
    pub async fn superseded(&self) {
        let mut live = self.live.clone();
        let _ = live.wait_for(|current| *current != self.id).await;
    }

    /// When this session was issued.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}

/// Issues session tokens, one live at a time.
#[derive(Debug)]
pub struct SessionRegistry {
    next_id: u64,
    live: watch::Sender<u64>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self {
            next_id: 0,
            live: watch::channel(0).0,
        }
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins a new session, invalidating any previously issued token.
    pub fn begin(&mut self) -> SessionToken {
        self.next_id += 1;
        self.live.send_replace(self.next_id);
        SessionToken {
            id: self.next_id,
            live: self.live.subscribe(),
            started_at: Instant::now(),
        }
    }

    /// Cancels the current session without starting a new one.
    ///
    /// Used at pipeline teardown; id 0 is never issued.
    pub fn cancel_all(&mut self) {
        self.live.send_replace(0);
    }
}
