//! Runtime for executing sessions
//!
//! One spawned task per chat identity with an ordered inbound queue, a
//! process-wide map of session handles, and idle-TTL eviction for abandoned
//! conversations.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;
pub use traits::*;

use crate::backend::BackendClient;
use crate::photos::DiskPhotoStore;
use crate::state_machine::state::{ChatId, Session};
use crate::state_machine::Event;
use crate::transport::HttpTransport;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

/// Type alias for the production manager with concrete implementations.
pub type ProductionManager = SessionManager<BackendClient, HttpTransport, DiskPhotoStore>;

/// Handle to a running session's inbound queue.
struct SessionHandle {
    event_tx: mpsc::Sender<Event>,
}

/// Manager for all session runtimes, keyed by chat identity.
///
/// Per-chat ordering comes from the queue: a session's runtime finishes one
/// event (effects included) before taking the next. Different chats run
/// concurrently; a slow backend call only occupies its own task.
pub struct SessionManager<B, T, P>
where
    B: Backend + 'static,
    T: Transport + 'static,
    P: PhotoStore + 'static,
{
    backend: Arc<B>,
    transport: Arc<T>,
    photos: Arc<P>,
    idle_ttl: Duration,
    sessions: RwLock<HashMap<ChatId, SessionHandle>>,
}

impl<B, T, P> SessionManager<B, T, P>
where
    B: Backend + 'static,
    T: Transport + 'static,
    P: PhotoStore + 'static,
{
    pub fn new(backend: B, transport: T, photos: P, idle_ttl: Duration) -> Self {
        Self {
            backend: Arc::new(backend),
            transport: Arc::new(transport),
            photos: Arc::new(photos),
            idle_ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Route an inbound event to its session, creating the session on first
    /// contact. An expired runtime's dead handle is pruned and the event is
    /// redelivered to a fresh session.
    pub async fn dispatch(&self, chat_id: ChatId, event: Event) {
        let mut event = event;
        for _ in 0..2 {
            let event_tx = self.get_or_spawn(chat_id).await;
            match event_tx.send(event).await {
                Ok(()) => return,
                Err(mpsc::error::SendError(returned)) => {
                    let mut sessions = self.sessions.write().await;
                    if sessions
                        .get(&chat_id)
                        .is_some_and(|handle| handle.event_tx.is_closed())
                    {
                        sessions.remove(&chat_id);
                    }
                    event = returned;
                }
            }
        }
        tracing::error!(chat_id = %chat_id, "Failed to dispatch inbound event");
    }

    async fn get_or_spawn(&self, chat_id: ChatId) -> mpsc::Sender<Event> {
        {
            let sessions = self.sessions.read().await;
            if let Some(handle) = sessions.get(&chat_id) {
                return handle.event_tx.clone();
            }
        }

        let mut sessions = self.sessions.write().await;
        // Double-check under the write lock.
        if let Some(handle) = sessions.get(&chat_id) {
            return handle.event_tx.clone();
        }

        let (event_tx, event_rx) = mpsc::channel(32);
        let runtime = SessionRuntime::new(
            Session::new(chat_id),
            Arc::clone(&self.backend),
            Arc::clone(&self.transport),
            Arc::clone(&self.photos),
            event_rx,
            self.idle_ttl,
        );
        tokio::spawn(runtime.run());

        sessions.insert(
            chat_id,
            SessionHandle {
                event_tx: event_tx.clone(),
            },
        );
        event_tx
    }

    /// Number of live sessions, for diagnostics.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
