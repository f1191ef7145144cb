//! Session lifecycle and turn execution

use crate::agents::{Agent, CoordinatorAgent};
use crate::artifacts::ArtifactStore;
use crate::session::{Event, EventSink, Session, Turn, TurnStatus};
use dashmap::DashMap;
use futures_util::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Owns live sessions and drives turns through the coordinator. Each `run`
/// call executes one turn on a spawned task and hands back a stream of the
/// events as they happen.
pub struct SessionRuntime {
    sessions: DashMap<String, Arc<Session>>,
    coordinator: Arc<CoordinatorAgent>,
    artifacts: Arc<ArtifactStore>,
}

impl SessionRuntime {
    pub fn new(coordinator: Arc<CoordinatorAgent>, artifacts: Arc<ArtifactStore>) -> Self {
        SessionRuntime {
            sessions: DashMap::new(),
            coordinator,
            artifacts,
        }
    }

    pub fn create_session(
        &self,
        app_name: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Arc<Session> {
        let session = Arc::new(Session::new(app_name, user_id));
        log::info!(
            "[RUNTIME] created session {} (app={}, user={})",
            session.id,
            session.app_name,
            session.user_id
        );
        self.sessions.insert(session.id.clone(), session.clone());
        session
    }

    pub fn get_session(&self, session_id: &str) -> Option<Arc<Session>> {
        self.sessions.get(session_id).map(|s| s.clone())
    }

    /// Remove a session and every artifact it owns.
    pub fn delete_session(&self, session_id: &str) {
        self.sessions.remove(session_id);
        self.artifacts.delete_session(session_id);
        log::info!("[RUNTIME] deleted session {}", session_id);
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn artifacts(&self) -> Arc<ArtifactStore> {
        self.artifacts.clone()
    }

    /// Run one turn. The returned stream yields events live; the turn is
    /// appended to the session before the stream ends.
    pub fn run(&self, session_id: &str, message: &str) -> Result<EventStream, String> {
        let session = self
            .get_session(session_id)
            .ok_or_else(|| format!("Session not found: {}", session_id))?;

        let coordinator = self.coordinator.clone();
        let message = message.to_string();
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let mut sink = EventSink::new(tx);
            let result = coordinator.respond(&session, &message, &mut sink).await;

            let status = if result.success {
                TurnStatus::Completed
            } else {
                TurnStatus::Failed
            };
            log::info!(
                "[RUNTIME] turn finished for session {} ({:?})",
                session.id,
                status
            );

            // Record the turn before the sink (and its sender) drops, so a
            // caller that drains the stream sees the appended turn.
            let events = sink.events().to_vec();
            session.push_turn(Turn::new(message, events, status));
            drop(sink);
        });

        Ok(EventStream { rx })
    }
}

/// Live event feed for one running turn. Ends when the turn completes.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<Event>,
}

impl EventStream {
    pub async fn next_event(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

impl Stream for EventStream {
    type Item = Event;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
