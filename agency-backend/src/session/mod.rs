//! Sessions, turns and the event log

pub mod runtime;

pub use runtime::{EventStream, SessionRuntime};

use crate::ai::Message;
use crate::tools::ToolResult;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

/// One entry in a turn's event log. Events carry the author so a transcript
/// reader can tell which agent produced what.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Text {
        author: String,
        content: String,
    },
    ToolCallRequest {
        author: String,
        tool: String,
        arguments: Value,
    },
    ToolCallResult {
        author: String,
        tool: String,
        result: ToolResult,
    },
}

impl Event {
    pub fn text(author: impl Into<String>, content: impl Into<String>) -> Self {
        Event::Text {
            author: author.into(),
            content: content.into(),
        }
    }

    pub fn tool_call_request(
        author: impl Into<String>,
        tool: impl Into<String>,
        arguments: Value,
    ) -> Self {
        Event::ToolCallRequest {
            author: author.into(),
            tool: tool.into(),
            arguments,
        }
    }

    pub fn tool_call_result(
        author: impl Into<String>,
        tool: impl Into<String>,
        result: ToolResult,
    ) -> Self {
        Event::ToolCallResult {
            author: author.into(),
            tool: tool.into(),
            result,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    Completed,
    Failed,
}

/// One user message plus everything the coordinator produced in response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub user_message: String,
    pub events: Vec<Event>,
    pub status: TurnStatus,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(user_message: impl Into<String>, events: Vec<Event>, status: TurnStatus) -> Self {
        Turn {
            user_message: user_message.into(),
            events,
            status,
            created_at: Utc::now(),
        }
    }

    /// The last non-empty text event of the turn, which is what a chat surface
    /// would render as the reply.
    pub fn final_text(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|event| match event {
            Event::Text { content, .. } if !content.trim().is_empty() => Some(content.as_str()),
            _ => None,
        })
    }
}

/// A conversation scoped to one app/user pair. Turns and scratch state are
/// behind locks so the runtime can share sessions across tasks.
pub struct Session {
    pub id: String,
    pub app_name: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    turns: RwLock<Vec<Turn>>,
    state: RwLock<HashMap<String, Value>>,
}

impl Session {
    pub fn new(app_name: impl Into<String>, user_id: impl Into<String>) -> Self {
        Session {
            id: Uuid::new_v4().to_string(),
            app_name: app_name.into(),
            user_id: user_id.into(),
            created_at: Utc::now(),
            turns: RwLock::new(Vec::new()),
            state: RwLock::new(HashMap::new()),
        }
    }

    /// Scratch state lookup, cloned out so callers never hold the lock.
    pub fn get_state(&self, key: &str) -> Option<Value> {
        self.state.read().get(key).cloned()
    }

    pub fn set_state(&self, key: impl Into<String>, value: Value) {
        self.state.write().insert(key.into(), value);
    }

    pub fn state_snapshot(&self) -> HashMap<String, Value> {
        self.state.read().clone()
    }

    pub fn turns(&self) -> Vec<Turn> {
        self.turns.read().clone()
    }

    /// Replay the last `max_turns` completed turns as model history, one user
    /// message plus one assistant reply per turn.
    pub fn recent_messages(&self, max_turns: usize) -> Vec<Message> {
        let turns = self.turns.read();
        let skip = turns.len().saturating_sub(max_turns);
        let mut messages = Vec::new();
        for turn in turns.iter().skip(skip) {
            messages.push(Message::user(turn.user_message.clone()));
            if let Some(reply) = turn.final_text() {
                messages.push(Message::assistant(reply));
            }
        }
        messages
    }

    pub fn turn_count(&self) -> usize {
        self.turns.read().len()
    }

    pub fn push_turn(&self, turn: Turn) {
        self.turns.write().push(turn);
    }
}

/// Collects a turn's events and forwards them to a live subscriber when one
/// is attached. The recorded copy is authoritative; a dropped receiver only
/// stops the live feed.
pub struct EventSink {
    tx: Option<mpsc::Sender<Event>>,
    events: Vec<Event>,
}

impl EventSink {
    pub fn new(tx: mpsc::Sender<Event>) -> Self {
        EventSink {
            tx: Some(tx),
            events: Vec::new(),
        }
    }

    /// Sink that only records, for callers that do not stream.
    pub fn detached() -> Self {
        EventSink {
            tx: None,
            events: Vec::new(),
        }
    }

    pub async fn emit(&mut self, event: Event) {
        self.events.push(event.clone());
        if let Some(tx) = &self.tx {
            // Receiver may have gone away; the recorded log still stands.
            let _ = tx.send(event).await;
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}
